//! Hierarchical grouping of rows.
//!
//! [`group_by`] partitions a flat item list into a tree of [`Group`]s, one
//! level per grouping column. Every non-leaf node's items are the
//! concatenation of its children's items in child order; the mutation
//! operations on [`GroupRef`] keep that true without a rebuild.
//!
//! The tree root is replaced (via [`GroupRef::clone_group`]) after every
//! mutation a consumer must observe, so identity comparison of the root is
//! enough to detect a change.

mod group;
mod key;

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

pub use group::{Group, GroupId, GroupMetadata, GroupRef};
pub use key::GroupKey;

/// Id of a tree root.
pub const ROOT_GROUP_ID: GroupId = 0;

/// Id of the group for `key` below `parent`. `salt` separates distinct keys
/// whose hashes collide.
fn group_id<K: Hash>(parent: GroupId, key: &K, salt: u32) -> GroupId {
    let mut hasher = FxHasher::default();
    parent.hash(&mut hasher);
    key.hash(&mut hasher);
    salt.hash(&mut hasher);
    hasher.finish()
}

struct Bucket<K, T> {
    id: GroupId,
    key: K,
    items: Vec<T>,
}

/// Partition `items` by key, in first-seen order. Keys are compared for
/// equality whenever two of them hash to the same id.
fn partition<T, K>(
    parent: GroupId,
    items: Vec<T>,
    key_of: impl Fn(&T) -> K,
) -> Vec<Bucket<K, T>>
where
    K: Hash + Eq,
{
    let mut buckets: Vec<Bucket<K, T>> = Vec::new();
    let mut by_id: FxHashMap<GroupId, usize> = FxHashMap::default();
    for item in items {
        let key = key_of(&item);
        let mut salt = 0u32;
        loop {
            let id = group_id(parent, &key, salt);
            match by_id.get(&id).copied() {
                Some(index) => {
                    let Some(bucket) = buckets.get_mut(index) else {
                        break;
                    };
                    if bucket.key == key {
                        bucket.items.push(item);
                        break;
                    }
                    tracing::trace!(target: "xlgrid::grouping", id, salt, "group id collision");
                    salt += 1;
                }
                None => {
                    by_id.insert(id, buckets.len());
                    buckets.push(Bucket {
                        id,
                        key,
                        items: vec![item],
                    });
                    break;
                }
            }
        }
    }
    buckets
}

/// Build a grouping tree `depth` levels deep.
///
/// * `key_fn(item, level)` returns the grouping key of `item` for level
///   `level` (0 is the outermost grouping column).
/// * `compare(a, b, level)` orders sibling groups.
/// * `metadata_fn(node)` runs once per node after its items and children
///   are final.
///
/// With `depth == 0` the root is a single leaf holding every item.
pub fn group_by<T, K>(
    items: Vec<T>,
    key_fn: impl Fn(&T, usize) -> K,
    compare: impl Fn(&K, &K, usize) -> Ordering,
    metadata_fn: impl Fn(&Group<T>) -> GroupMetadata,
    depth: usize,
) -> GroupRef<T>
where
    T: Clone,
    K: Hash + Eq,
{
    let builder = Builder {
        key_fn,
        compare,
        metadata_fn,
        depth,
    };
    let count = items.len();
    let root = builder.build(ROOT_GROUP_ID, items, 0);
    tracing::debug!(
        target: "xlgrid::grouping",
        items = count,
        depth,
        groups = root.children().len(),
        "built grouping tree"
    );
    root
}

struct Builder<KF, CF, MF> {
    key_fn: KF,
    compare: CF,
    metadata_fn: MF,
    depth: usize,
}

impl<KF, CF, MF> Builder<KF, CF, MF> {
    fn build<T, K>(&self, id: GroupId, items: Vec<T>, level: usize) -> GroupRef<T>
    where
        T: Clone,
        K: Hash + Eq,
        KF: Fn(&T, usize) -> K,
        CF: Fn(&K, &K, usize) -> Ordering,
        MF: Fn(&Group<T>) -> GroupMetadata,
    {
        let node = GroupRef::new(Group::new(id, level, self.depth - level));

        if level >= self.depth {
            node.borrow_mut().items = std::rc::Rc::new(items);
        } else {
            let mut buckets = partition(id, items, |item| (self.key_fn)(item, level));
            buckets.sort_by(|a, b| (self.compare)(&a.key, &b.key, level));

            let mut children: Vec<GroupRef<T>> = Vec::with_capacity(buckets.len());
            for (index, bucket) in buckets.into_iter().enumerate() {
                let child = self.build(bucket.id, bucket.items, level + 1);
                {
                    let mut c = child.borrow_mut();
                    c.parent = node.downgrade();
                    if let Some(prev) = children.last() {
                        c.previous = prev.downgrade();
                    }
                    c.view_props.index = index;
                }
                children.push(child);
            }
            node.borrow_mut().children = children;
            node.refresh_items();
        }

        let metadata = (self.metadata_fn)(&node.borrow());
        node.borrow_mut().metadata = metadata;
        node
    }
}
