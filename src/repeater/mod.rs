//! View recycling for virtualized lists.
//!
//! A [`Repeater`] keeps one host view per item of an ordered collection.
//! On every change it diffs the new collection against the previous one by
//! key, applies the edits to its live views and parks removed views in a
//! bounded [`ViewPool`] so later insertions can rebind them instead of
//! constructing new ones.

mod diff;
mod pool;

use std::hash::Hash;

pub use diff::{diff, DiffOp};
pub use pool::ViewPool;

use crate::types::Rect;

/// Per-item context handed to the view factory.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a, T> {
    pub item: &'a T,
    pub index: usize,
    pub count: usize,
    pub rect: Rect,
}

impl<T> ViewContext<'_, T> {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }
}

/// Host-side construction and binding of views.
pub trait ViewFactory<T> {
    type View;

    /// Construct a new view for an item.
    fn create(&mut self, context: &ViewContext<'_, T>) -> Self::View;

    /// Bind a recycled view to a different item. Every item-derived field
    /// must be overwritten.
    fn rebind(&mut self, view: &mut Self::View, context: &ViewContext<'_, T>);

    /// Refresh transient fields (index, rect) of a view whose item is unchanged.
    fn update(&mut self, view: &mut Self::View, context: &ViewContext<'_, T>);

    /// Called when a view leaves the live list, before it is pooled or destroyed.
    fn detach(&mut self, _view: &mut Self::View) {}

    /// Release a view for good.
    fn destroy(&mut self, view: Self::View);
}

/// Kind of change applied to the live views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeaterOperation {
    /// A pooled view was rebound to a new item.
    Inserted,
    /// No pooled view was available; a view was constructed.
    Replaced,
    Removed,
    Moved,
}

/// One applied change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeaterChange {
    pub operation: RepeaterOperation,
    /// Index in the live list before the change (removals, moves).
    pub previous_index: Option<usize>,
    /// Index in the live list after the change (insertions, moves).
    pub current_index: Option<usize>,
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepeaterStats {
    pub created: usize,
    pub reused: usize,
    pub destroyed: usize,
}

/// Keeps a list of views in sync with a keyed collection.
pub struct Repeater<T, K, F>
where
    F: ViewFactory<T>,
{
    factory: F,
    key_fn: Box<dyn Fn(&T) -> K>,
    keys: Vec<K>,
    views: Vec<F::View>,
    pool: ViewPool<F::View>,
    stats: RepeaterStats,
}

impl<T, K, F> Repeater<T, K, F>
where
    K: Hash + Eq,
    F: ViewFactory<T>,
{
    pub fn new(factory: F, cache_size: usize, key_fn: impl Fn(&T) -> K + 'static) -> Self {
        Self {
            factory,
            key_fn: Box::new(key_fn),
            keys: Vec::new(),
            views: Vec::new(),
            pool: ViewPool::new(cache_size),
            stats: RepeaterStats::default(),
        }
    }

    /// Reconcile the live views with `items`.
    ///
    /// `rect_of` supplies the layout rectangle of the item at an index.
    pub fn apply(
        &mut self,
        items: &[T],
        rect_of: impl Fn(usize, &T) -> Rect,
    ) -> Vec<RepeaterChange> {
        let new_keys: Vec<K> = items.iter().map(|item| (self.key_fn)(item)).collect();
        let ops = diff(&self.keys, &new_keys);
        let count = items.len();
        let mut changes = Vec::with_capacity(ops.len());

        for op in ops {
            match op {
                DiffOp::Remove { index } => {
                    if index >= self.views.len() {
                        continue;
                    }
                    let mut view = self.views.remove(index);
                    self.factory.detach(&mut view);
                    if let Some(evicted) = self.pool.put(view) {
                        self.factory.destroy(evicted);
                        self.stats.destroyed += 1;
                    }
                    changes.push(RepeaterChange {
                        operation: RepeaterOperation::Removed,
                        previous_index: Some(index),
                        current_index: None,
                    });
                }
                DiffOp::Insert { index, item } => {
                    let Some(value) = items.get(item) else {
                        continue;
                    };
                    let context = ViewContext {
                        item: value,
                        index,
                        count,
                        rect: rect_of(item, value),
                    };
                    let index = index.min(self.views.len());
                    let operation = if let Some(mut view) = self.pool.take() {
                        self.factory.rebind(&mut view, &context);
                        self.views.insert(index, view);
                        self.stats.reused += 1;
                        RepeaterOperation::Inserted
                    } else {
                        let view = self.factory.create(&context);
                        self.views.insert(index, view);
                        self.stats.created += 1;
                        RepeaterOperation::Replaced
                    };
                    changes.push(RepeaterChange {
                        operation,
                        previous_index: None,
                        current_index: Some(index),
                    });
                }
                DiffOp::Move { from, to, .. } => {
                    if from >= self.views.len() {
                        continue;
                    }
                    let view = self.views.remove(from);
                    let to = to.min(self.views.len());
                    self.views.insert(to, view);
                    changes.push(RepeaterChange {
                        operation: RepeaterOperation::Moved,
                        previous_index: Some(from),
                        current_index: Some(to),
                    });
                }
            }
        }

        // Positions shift even for views whose item did not change.
        for (index, (view, item)) in self.views.iter_mut().zip(items).enumerate() {
            let context = ViewContext {
                item,
                index,
                count,
                rect: rect_of(index, item),
            };
            self.factory.update(view, &context);
        }

        self.keys = new_keys;
        tracing::trace!(
            target: "xlgrid::repeater",
            live = self.views.len(),
            pooled = self.pool.len(),
            changes = changes.len(),
            "repeater applied"
        );
        changes
    }

    pub fn views(&self) -> &[F::View] {
        &self.views
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    pub fn stats(&self) -> RepeaterStats {
        self.stats
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Change the pool capacity, destroying views that no longer fit.
    pub fn set_cache_size(&mut self, cache_size: usize) {
        for view in self.pool.set_capacity(cache_size) {
            self.factory.destroy(view);
            self.stats.destroyed += 1;
        }
    }

    /// Destroy every live and pooled view.
    pub fn clear(&mut self) {
        self.keys.clear();
        let pooled: Vec<F::View> = self.pool.drain().collect();
        for mut view in self.views.drain(..) {
            self.factory.detach(&mut view);
            self.factory.destroy(view);
            self.stats.destroyed += 1;
        }
        for view in pooled {
            self.factory.destroy(view);
            self.stats.destroyed += 1;
        }
    }
}
