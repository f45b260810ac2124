//! Group tree nodes.
//!
//! Nodes are shared (`Rc<RefCell<_>>`); `parent` and `previous` are weak
//! back references used for lookups only. A node's `items` vector is itself
//! reference counted so that a shallow clone shares it until one side
//! mutates (`Rc::make_mut`).

use std::cell::{Ref, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::types::{CellValue, ColumnId, GroupViewProps};

pub type GroupId = u64;

/// Per-node data computed once the node's items and children are final.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMetadata {
    /// Grouping column this node was partitioned by (`None` for the root).
    pub column_id: Option<ColumnId>,
    /// Representative value of the grouping column (first item's value).
    pub value: CellValue,
    pub is_empty: bool,
    pub collapsed: bool,
    /// Aggregates per calculating column.
    pub calculated: HashMap<ColumnId, CellValue>,
}

/// One node of the grouping hierarchy.
#[derive(Debug)]
pub struct Group<T> {
    pub id: GroupId,
    pub depth: usize,
    /// Number of grouping levels below this node (0 for leaves).
    pub total_children_depth: usize,
    pub(crate) items: Rc<Vec<T>>,
    /// Item order before the first sort (leaves only).
    pub(crate) sort_backup: Option<Rc<Vec<T>>>,
    pub(crate) children: Vec<GroupRef<T>>,
    pub(crate) parent: Weak<RefCell<Group<T>>>,
    pub(crate) previous: Weak<RefCell<Group<T>>>,
    pub metadata: GroupMetadata,
    pub view_props: GroupViewProps,
}

impl<T> Group<T> {
    pub(crate) fn new(id: GroupId, depth: usize, total_children_depth: usize) -> Self {
        Self {
            id,
            depth,
            total_children_depth,
            items: Rc::new(Vec::new()),
            sort_backup: None,
            children: Vec::new(),
            parent: Weak::new(),
            previous: Weak::new(),
            metadata: GroupMetadata::default(),
            view_props: GroupViewProps::default(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn children(&self) -> &[GroupRef<T>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        self.metadata.collapsed
    }
}

/// Shared handle to a [`Group`].
#[derive(Debug)]
pub struct GroupRef<T>(Rc<RefCell<Group<T>>>);

impl<T> Clone for GroupRef<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> GroupRef<T> {
    pub(crate) fn new(group: Group<T>) -> Self {
        Self(Rc::new(RefCell::new(group)))
    }

    fn from_rc(rc: Rc<RefCell<Group<T>>>) -> Self {
        Self(rc)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Group<T>>> {
        Rc::downgrade(&self.0)
    }

    pub fn borrow(&self) -> Ref<'_, Group<T>> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> std::cell::RefMut<'_, Group<T>> {
        self.0.borrow_mut()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &GroupRef<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn id(&self) -> GroupId {
        self.0.borrow().id
    }

    pub fn depth(&self) -> usize {
        self.0.borrow().depth
    }

    /// The shared items vector.
    pub fn items(&self) -> Rc<Vec<T>> {
        Rc::clone(&self.0.borrow().items)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().items.is_empty()
    }

    pub fn children(&self) -> Vec<GroupRef<T>> {
        self.0.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<GroupRef<T>> {
        self.0.borrow().parent.upgrade().map(GroupRef::from_rc)
    }

    pub fn previous(&self) -> Option<GroupRef<T>> {
        self.0.borrow().previous.upgrade().map(GroupRef::from_rc)
    }

    pub fn is_leaf(&self) -> bool {
        self.0.borrow().children.is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        self.0.borrow().metadata.collapsed
    }

    pub fn set_collapsed(&self, collapsed: bool) {
        self.0.borrow_mut().metadata.collapsed = collapsed;
    }

    pub fn metadata(&self) -> GroupMetadata {
        self.0.borrow().metadata.clone()
    }

    pub fn view_props(&self) -> GroupViewProps {
        self.0.borrow().view_props
    }

    pub(crate) fn set_view_props(&self, view_props: GroupViewProps) {
        self.0.borrow_mut().view_props = view_props;
    }

    /// Shallow copy with direct children re-parented to the copy.
    ///
    /// The copy shares `items` and the child nodes with `self`; only its
    /// identity differs.
    pub fn clone_group(&self) -> GroupRef<T> {
        let copy = {
            let g = self.0.borrow();
            Group {
                id: g.id,
                depth: g.depth,
                total_children_depth: g.total_children_depth,
                items: Rc::clone(&g.items),
                sort_backup: g.sort_backup.as_ref().map(Rc::clone),
                children: g.children.clone(),
                parent: Weak::clone(&g.parent),
                previous: Weak::clone(&g.previous),
                metadata: g.metadata.clone(),
                view_props: g.view_props,
            }
        };
        let copy = GroupRef::new(copy);
        for child in copy.borrow().children.iter() {
            child.borrow_mut().parent = copy.downgrade();
        }
        copy
    }

    /// Ancestors from the root down to the parent, optionally followed by `self`.
    pub fn find_closest(&self, include_self: bool) -> Vec<GroupRef<T>> {
        let mut chain = Vec::new();
        if include_self {
            chain.push(self.clone());
        }
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            cursor = node.parent();
            chain.push(node);
        }
        chain.reverse();
        chain
    }

    /// Depth-first pre-order visit of this subtree.
    pub fn walk(&self, visit: &mut impl FnMut(&GroupRef<T>)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn find(&self, id: GroupId) -> Option<GroupRef<T>> {
        if self.id() == id {
            return Some(self.clone());
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Leaf groups in display order.
    pub fn leaves(&self) -> Vec<GroupRef<T>> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if node.is_leaf() {
                out.push(node.clone());
            }
        });
        out
    }

    /// Rebuild every node's items from its children, bottom-up.
    pub(crate) fn refresh_items(&self)
    where
        T: Clone,
    {
        let children = self.children();
        if children.is_empty() {
            return;
        }
        let mut items = Vec::with_capacity(self.len());
        for child in &children {
            child.refresh_items();
            items.extend(child.items().iter().cloned());
        }
        self.0.borrow_mut().items = Rc::new(items);
    }

    /// Drop empty descendants and relink sibling back references.
    pub fn remove_empty_children(&self) {
        let children = self.children();
        if children.is_empty() {
            return;
        }
        let kept: Vec<GroupRef<T>> = children.into_iter().filter(|c| !c.is_empty()).collect();
        let mut previous: Option<&GroupRef<T>> = None;
        for (index, child) in kept.iter().enumerate() {
            child.remove_empty_children();
            let mut c = child.borrow_mut();
            c.previous = previous.map_or_else(Weak::new, GroupRef::downgrade);
            c.view_props.index = index;
            drop(c);
            previous = Some(child);
        }
        self.0.borrow_mut().children = kept;
    }
}

impl<T: Clone + PartialEq> GroupRef<T> {
    /// Stable-sort the items of every leaf below this node.
    ///
    /// The original order is saved once per leaf; sorting again before
    /// [`unsort_items`](Self::unsort_items) starts from the same saved order.
    pub fn sort_items(&self, compare: &impl Fn(&T, &T) -> Ordering) {
        let children = self.children();
        if children.is_empty() {
            let mut guard = self.0.borrow_mut();
            let g = &mut *guard;
            let backup = Rc::clone(g.sort_backup.get_or_insert_with(|| Rc::clone(&g.items)));
            let mut sorted: Vec<T> = backup.as_ref().clone();
            sorted.sort_by(|a, b| compare(a, b));
            g.items = Rc::new(sorted);
            return;
        }
        for child in &children {
            child.sort_items(compare);
        }
        self.concat_children();
    }

    /// Restore the order saved by the first [`sort_items`](Self::sort_items).
    pub fn unsort_items(&self) {
        let children = self.children();
        if children.is_empty() {
            let mut g = self.0.borrow_mut();
            if let Some(backup) = g.sort_backup.take() {
                g.items = backup;
            }
            return;
        }
        for child in &children {
            child.unsort_items();
        }
        self.concat_children();
    }

    pub fn is_sorted(&self) -> bool {
        self.leaves()
            .iter()
            .any(|leaf| leaf.borrow().sort_backup.is_some())
    }

    fn concat_children(&self) {
        let mut items = Vec::with_capacity(self.len());
        for child in self.children() {
            items.extend(child.items().iter().cloned());
        }
        self.0.borrow_mut().items = Rc::new(items);
    }

    /// Insert `new_items` at `position` and propagate to every ancestor.
    ///
    /// Ancestors receive the block right after the predecessor item (or
    /// before the successor item) of the insertion point. When this node
    /// has neither, the end of the nearest non-empty previous sibling is used.
    pub fn add_items(&self, new_items: &[T], position: usize) {
        if new_items.is_empty() {
            return;
        }
        let position = {
            let mut g = self.0.borrow_mut();
            let items = Rc::make_mut(&mut g.items);
            let at = position.min(items.len());
            items.splice(at..at, new_items.iter().cloned());
            if let Some(backup) = g.sort_backup.as_mut() {
                Rc::make_mut(backup).extend(new_items.iter().cloned());
            }
            at
        };
        self.propagate_insert(new_items, position);
    }

    fn propagate_insert(&self, new_items: &[T], position: usize) {
        let Some(parent) = self.parent() else {
            return;
        };
        let (predecessor, successor) = {
            let g = self.0.borrow();
            let predecessor = position
                .checked_sub(1)
                .and_then(|p| g.items.get(p))
                .cloned();
            let successor = g.items.get(position + new_items.len()).cloned();
            (predecessor, successor)
        };

        let located = {
            let p = parent.borrow();
            match (&predecessor, &successor) {
                (Some(pred), _) => p.items.iter().position(|x| x == pred).map(|i| i + 1),
                (None, Some(succ)) => p.items.iter().position(|x| x == succ),
                (None, None) => None,
            }
        };
        let parent_position = located.unwrap_or_else(|| self.previous_sibling_end(&parent));

        {
            let mut p = parent.borrow_mut();
            let items = Rc::make_mut(&mut p.items);
            let at = parent_position.min(items.len());
            items.splice(at..at, new_items.iter().cloned());
        }
        parent.propagate_insert(new_items, parent_position);
    }

    /// Index in `parent.items` right after the last item of the closest
    /// previous non-empty sibling, or 0.
    fn previous_sibling_end(&self, parent: &GroupRef<T>) -> usize {
        let mut cursor = self.previous();
        while let Some(sibling) = cursor {
            let last = sibling.borrow().items.last().cloned();
            if let Some(last) = last {
                return parent
                    .borrow()
                    .items
                    .iter()
                    .position(|x| *x == last)
                    .map_or(0, |i| i + 1);
            }
            cursor = sibling.previous();
        }
        0
    }

    /// Remove every item equal to one of `targets` from this subtree.
    ///
    /// Children are visited until as many removals as this node saw have
    /// been accounted for. Returns whether anything was removed.
    pub fn remove_items(&self, targets: &[T]) -> bool {
        self.remove_counted(targets) > 0
    }

    fn remove_counted(&self, targets: &[T]) -> usize {
        let removed = {
            let mut g = self.0.borrow_mut();
            let before = g.items.len();
            if !g.items.iter().any(|x| targets.contains(x)) {
                return 0;
            }
            Rc::make_mut(&mut g.items).retain(|x| !targets.contains(x));
            if let Some(backup) = g.sort_backup.as_mut() {
                Rc::make_mut(backup).retain(|x| !targets.contains(x));
            }
            before - g.items.len()
        };

        let mut accounted = 0;
        for child in self.children() {
            if accounted >= removed {
                break;
            }
            accounted += child.remove_counted(targets);
        }
        removed
    }

    /// Leaf group holding `item`.
    pub fn find_leaf_of(&self, item: &T) -> Option<GroupRef<T>> {
        if !self.borrow().items.contains(item) {
            return None;
        }
        let children = self.children();
        if children.is_empty() {
            return Some(self.clone());
        }
        children.iter().find_map(|child| child.find_leaf_of(item))
    }

    /// Whether every non-leaf node's items equal the concatenation of its
    /// children's items and every child points back at its parent.
    pub fn is_consistent(&self) -> bool {
        let children = self.children();
        if children.is_empty() {
            return true;
        }
        let g = self.borrow();
        let mut offset = 0;
        for child in &children {
            let c = child.borrow();
            let parent_ok = c.parent.upgrade().is_some_and(|p| Rc::ptr_eq(&p, &self.0));
            let end = offset + c.items.len();
            let span_ok = g.items.get(offset..end) == Some(c.items.as_slice());
            if !parent_ok || !span_ok {
                return false;
            }
            offset = end;
        }
        drop(g);
        offset == self.len() && children.iter().all(GroupRef::is_consistent)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    /// root -> [a: 1 2, b: 3, c: 4 5]
    fn sample() -> GroupRef<u32> {
        let root = GroupRef::new(Group::new(0, 0, 1));
        let mut children = Vec::new();
        let mut previous: Option<GroupRef<u32>> = None;
        for (id, items) in [(1, vec![1, 2]), (2, vec![3]), (3, vec![4, 5])] {
            let mut g = Group::new(id, 1, 0);
            g.items = Rc::new(items);
            g.parent = root.downgrade();
            if let Some(prev) = &previous {
                g.previous = prev.downgrade();
            }
            let node = GroupRef::new(g);
            previous = Some(node.clone());
            children.push(node);
        }
        root.borrow_mut().children = children;
        root.refresh_items();
        root
    }

    #[test]
    fn test_clone_shares_items_and_reparents() {
        let root = sample();
        let copy = root.clone_group();
        assert!(!copy.ptr_eq(&root));
        assert!(Rc::ptr_eq(&copy.items(), &root.items()));
        for child in copy.children() {
            assert!(child.parent().unwrap().ptr_eq(&copy));
        }
    }

    #[test]
    fn test_add_into_middle_leaf() {
        let root = sample();
        let b = root.children()[1].clone();
        b.add_items(&[9], 0);
        assert_eq!(*root.items(), vec![1, 2, 9, 3, 4, 5]);
        assert!(root.is_consistent());
    }

    #[test]
    fn test_add_into_empty_leaf_uses_previous_sibling() {
        let root = sample();
        let b = root.children()[1].clone();
        b.remove_items(&[3]);
        root.remove_items(&[3]);
        assert!(b.is_empty());
        b.add_items(&[7, 8], 0);
        assert_eq!(*root.items(), vec![1, 2, 7, 8, 4, 5]);
        assert!(root.is_consistent());
    }

    #[test]
    fn test_remove_across_children() {
        let root = sample();
        assert!(root.remove_items(&[2, 4]));
        assert_eq!(*root.items(), vec![1, 3, 5]);
        assert!(root.is_consistent());
        assert!(!root.remove_items(&[42]));
    }

    #[test]
    fn test_sort_and_unsort() {
        let root = sample();
        root.sort_items(&|a: &u32, b: &u32| b.cmp(a));
        assert_eq!(*root.items(), vec![2, 1, 3, 5, 4]);
        assert!(root.is_sorted());
        root.sort_items(&|a: &u32, b: &u32| b.cmp(a));
        assert_eq!(*root.items(), vec![2, 1, 3, 5, 4]);
        root.unsort_items();
        assert_eq!(*root.items(), vec![1, 2, 3, 4, 5]);
        assert!(!root.is_sorted());
        assert!(root.is_consistent());
    }

    #[test]
    fn test_find_closest() {
        let root = sample();
        let c = root.children()[2].clone();
        let chain = c.find_closest(true);
        assert_eq!(chain.len(), 2);
        assert!(chain[0].ptr_eq(&root));
        assert!(chain[1].ptr_eq(&c));
        assert_eq!(c.find_closest(false).len(), 1);
    }

    #[test]
    fn test_remove_empty_children_relinks() {
        let root = sample();
        root.remove_items(&[3]);
        root.remove_empty_children();
        let children = root.children();
        assert_eq!(children.len(), 2);
        assert!(children[1].previous().unwrap().ptr_eq(&children[0]));
    }
}
