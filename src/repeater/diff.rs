//! Keyed list diff.
//!
//! Produces a sequence of operations that, applied in order to a `Vec`
//! holding the old list, yields the new list. Kept items on the longest
//! increasing run of target positions never move; every other kept item
//! moves exactly once.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// One edit against the list as it stands when the edit is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    /// Remove the element at `index`.
    Remove { index: usize },
    /// Insert `new[item]` at `index`.
    Insert { index: usize, item: usize },
    /// `let x = list.remove(from); list.insert(to, x);` where `x` is `new[item]`.
    Move { from: usize, to: usize, item: usize },
}

/// Compute the operations transforming `old` into `new`.
///
/// Duplicate keys are matched in order of appearance.
pub fn diff<K: Hash + Eq>(old: &[K], new: &[K]) -> Vec<DiffOp> {
    let mut ops = Vec::new();

    let mut targets: HashMap<&K, VecDeque<usize>> = HashMap::new();
    for (i, key) in new.iter().enumerate() {
        targets.entry(key).or_default().push_back(i);
    }

    // Removals. `current` holds the target index (in `new`) of every kept item.
    let mut current: Vec<usize> = Vec::with_capacity(old.len());
    for key in old {
        match targets.get_mut(key).and_then(VecDeque::pop_front) {
            Some(target) => current.push(target),
            None => ops.push(DiffOp::Remove {
                index: current.len(),
            }),
        }
    }

    let mut kept = vec![false; new.len()];
    for &target in &current {
        if let Some(flag) = kept.get_mut(target) {
            *flag = true;
        }
    }

    let mut stable = vec![false; new.len()];
    for target in longest_increasing(&current) {
        if let Some(flag) = stable.get_mut(target) {
            *flag = true;
        }
    }

    // Place every non-stable item right after its predecessor in `new`.
    for item in 0..new.len() {
        if stable.get(item).copied().unwrap_or(false) {
            continue;
        }
        let anchor = match item.checked_sub(1) {
            Some(pred) => current.iter().position(|&t| t == pred),
            None => None,
        };
        if kept.get(item).copied().unwrap_or(false) {
            let Some(from) = current.iter().position(|&t| t == item) else {
                continue;
            };
            let to = match anchor {
                Some(p) if from < p => p,
                Some(p) => p + 1,
                None => 0,
            };
            if from != to {
                current.remove(from);
                current.insert(to, item);
                ops.push(DiffOp::Move { from, to, item });
            }
        } else {
            let index = anchor.map_or(0, |p| p + 1);
            current.insert(index, item);
            ops.push(DiffOp::Insert { index, item });
        }
    }

    debug_assert!(current.iter().copied().eq(0..new.len()));
    ops
}

/// Values of one longest strictly increasing subsequence of `seq`.
fn longest_increasing(seq: &[usize]) -> Vec<usize> {
    // tails[k] = position in `seq` of the smallest tail of an increasing run of length k+1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (pos, &value) in seq.iter().enumerate() {
        let k = tails.partition_point(|&t| seq.get(t).is_some_and(|&v| v < value));
        if k > 0 {
            if let Some(p) = prev.get_mut(pos) {
                *p = tails.get(k - 1).copied();
            }
        }
        if k == tails.len() {
            tails.push(pos);
        } else if let Some(slot) = tails.get_mut(k) {
            *slot = pos;
        }
    }

    let mut out = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(pos) = cursor {
        if let Some(&v) = seq.get(pos) {
            out.push(v);
        }
        cursor = prev.get(pos).copied().flatten();
    }
    out.reverse();
    out
}
