//! Read-only queries over the difference of two versions.
//!
//! Every traversal walks the `lo` and `hi` trees in lock-step: the same
//! `[low, high]` window is applied to both at each step and only the count
//! difference `count(hi) - count(lo)` is ever used. This keeps the cost at
//! O(log V) no matter how many versions separate the two roots.
//!
//! The callers guarantee that `lo` is an ancestor version of `hi`, so no
//! difference is ever negative.

use smallvec::SmallVec;

use crate::arena::{NodeArena, NodeId};
use crate::build::PathStack;

/// Sort direction used by [`select`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Order {
    /// k = 1 is the largest key.
    Descending,
    /// k = 1 is the smallest key.
    Ascending,
}

#[inline]
fn diff(arena: &NodeArena, lo: NodeId, hi: NodeId) -> u32 {
    if lo == hi {
        return 0;
    }
    let (lo_count, hi_count) = (arena.count(lo), arena.count(hi));
    debug_assert!(hi_count >= lo_count, "lo must be an ancestor of hi");
    hi_count - lo_count
}

/// Number of keys in the window.
pub(crate) fn window_len(arena: &NodeArena, lo: NodeId, hi: NodeId) -> usize {
    diff(arena, lo, hi) as usize
}

/// Position of the `k`-th key of the window in the given order.
///
/// Requires `1 <= k <= window_len(lo, hi)`.
pub(crate) fn select(
    arena: &NodeArena,
    mut lo: NodeId,
    mut hi: NodeId,
    mut k: usize,
    mut low: usize,
    mut high: usize,
    order: Order,
) -> usize {
    debug_assert!(k >= 1 && k <= window_len(arena, lo, hi));
    while low < high {
        let mid = low + (high - low) / 2;
        let (lo_node, hi_node) = (arena.get(lo), arena.get(hi));
        match order {
            Order::Descending => {
                let upper = diff(arena, lo_node.right, hi_node.right) as usize;
                if k <= upper {
                    (lo, hi) = (lo_node.right, hi_node.right);
                    low = mid + 1;
                } else {
                    k -= upper;
                    (lo, hi) = (lo_node.left, hi_node.left);
                    high = mid;
                }
            }
            Order::Ascending => {
                let lower = diff(arena, lo_node.left, hi_node.left) as usize;
                if k <= lower {
                    (lo, hi) = (lo_node.left, hi_node.left);
                    high = mid;
                } else {
                    k -= lower;
                    (lo, hi) = (lo_node.right, hi_node.right);
                    low = mid + 1;
                }
            }
        }
    }
    low
}

/// Number of keys of the window whose position lies in `[ql, qr]`.
pub(crate) fn count_range(
    arena: &NodeArena,
    lo: NodeId,
    hi: NodeId,
    ql: usize,
    qr: usize,
    low: usize,
    high: usize,
) -> u64 {
    let mut total = 0u64;
    let mut stack: PathStack<(NodeId, NodeId, usize, usize)> = SmallVec::new();
    stack.push((lo, hi, low, high));
    while let Some((lo, hi, low, high)) = stack.pop() {
        // Shared subtrees contribute nothing.
        if lo == hi || qr < low || high < ql {
            continue;
        }
        if ql <= low && high <= qr {
            total += u64::from(diff(arena, lo, hi));
            continue;
        }
        let mid = low + (high - low) / 2;
        let (lo_node, hi_node) = (arena.get(lo), arena.get(hi));
        stack.push((lo_node.right, hi_node.right, mid + 1, high));
        stack.push((lo_node.left, hi_node.left, low, mid));
    }
    total
}

/// `(position, multiplicity)` for every position present in the window,
/// ascending.
pub(crate) fn entries(
    arena: &NodeArena,
    lo: NodeId,
    hi: NodeId,
    low: usize,
    high: usize,
) -> Vec<(usize, u32)> {
    let mut out = Vec::new();
    let mut stack: PathStack<(NodeId, NodeId, usize, usize)> = SmallVec::new();
    stack.push((lo, hi, low, high));
    while let Some((lo, hi, low, high)) = stack.pop() {
        let count = diff(arena, lo, hi);
        if count == 0 {
            continue;
        }
        if low == high {
            out.push((low, count));
            continue;
        }
        let mid = low + (high - low) / 2;
        let (lo_node, hi_node) = (arena.get(lo), arena.get(hi));
        stack.push((lo_node.right, hi_node.right, mid + 1, high));
        stack.push((lo_node.left, hi_node.left, low, mid));
    }
    out
}
