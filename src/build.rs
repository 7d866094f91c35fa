//! Path-copying insert.
//!
//! Inserting one position into a version copies exactly the root-to-leaf path
//! over the static domain range and aliases every other subtree from the
//! previous version. The previous version is never written to.

use smallvec::SmallVec;

use crate::arena::{Node, NodeArena, NodeId};
use crate::error::Result;

/// Direction taken at an internal node while descending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Enough for any domain with up to 2^31 positions without spilling.
pub(crate) type PathStack<T> = SmallVec<[T; 32]>;

/// Build the root of a new version holding one more key at `position`.
///
/// `prev_root` is the root of the version being extended (the sentinel for an
/// empty tree) and `[low, high]` is the full domain range. Returns the new
/// root; on error the arena is unchanged.
pub(crate) fn build(
    arena: &mut NodeArena,
    prev_root: NodeId,
    position: usize,
    low: usize,
    high: usize,
) -> Result<NodeId> {
    debug_assert!(low <= position && position <= high);

    let mut path: PathStack<(NodeId, Side)> = SmallVec::new();
    let (mut low, mut high) = (low, high);
    let mut prev = prev_root;
    while low < high {
        let mid = low + (high - low) / 2;
        let node = arena.get(prev);
        if position <= mid {
            path.push((prev, Side::Left));
            prev = node.left;
            high = mid;
        } else {
            path.push((prev, Side::Right));
            prev = node.right;
            low = mid + 1;
        }
    }

    // The descent allocates nothing; reserve the whole path before writing.
    arena.ensure_room(path.len() + 1)?;

    // Counts cannot overflow: every insert allocates at least one node and
    // node ids are 32-bit.
    let mut child = arena.allocate(Node {
        left: NodeId::EMPTY,
        right: NodeId::EMPTY,
        count: arena.count(prev) + 1,
    })?;

    while let Some((prev, side)) = path.pop() {
        let old = *arena.get(prev);
        let node = match side {
            Side::Left => Node {
                left: child,
                right: old.right,
                count: old.count + 1,
            },
            Side::Right => Node {
                left: old.left,
                right: child,
                count: old.count + 1,
            },
        };
        child = arena.allocate(node)?;
    }

    Ok(child)
}
