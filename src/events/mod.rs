//! Outward notifications and deferred work.
//!
//! Mutations queue [`GridEvent`]s in an [`EventCoalescer`] keyed by
//! [`EventKey`]; the host drains them in low-frequency batches. Frame and
//! retry helpers cover work the host defers to a later turn.

mod clock;
mod coalescer;
mod event;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coalescer::{EventCoalescer, Listener};
pub use event::{EventKey, EventKind, GridEvent};
pub use scheduler::{FrameId, FrameRequests, PendingFocus, RetryQueue};

/// Coalescer used by the grid.
pub type GridEvents = EventCoalescer<EventKey, GridEvent>;
