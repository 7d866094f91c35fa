//! Append-only node arena.
//!
//! Nodes are addressed by 32-bit ids instead of pointers. Ids are handed out
//! monotonically and never reused or freed individually; the whole arena is
//! dropped at once. Id 0 is the permanent empty-subtree sentinel.

/// Index of a node in a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The all-zero subtree. Its children are itself.
    pub const EMPTY: NodeId = NodeId(0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Immutable tree node: two children and the number of keys below it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Node {
    pub left: NodeId,
    pub right: NodeId,
    pub count: u32,
}

impl Node {
    const EMPTY: Node = Node {
        left: NodeId::EMPTY,
        right: NodeId::EMPTY,
        count: 0,
    };
}

/// Largest number of nodes addressable by a `u32` id.
const MAX_IDS: usize = (u32::MAX as usize).saturating_add(1);

#[derive(Clone, Debug)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
    /// Fixed node budget (including the sentinel); `None` means growable.
    max_nodes: Option<usize>,
}

impl NodeArena {
    pub(crate) fn new(max_nodes: Option<usize>) -> Self {
        let mut nodes = Vec::new();
        nodes.push(Node::EMPTY);
        Self { nodes, max_nodes }
    }

    /// Upper bound on the number of nodes for `insertions` inserts over a
    /// domain of `domain_len` positions, sentinel included.
    pub(crate) fn nodes_for(insertions: usize, domain_len: usize) -> usize {
        insertions
            .saturating_mul(path_len(domain_len))
            .saturating_add(1)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Maximum number of nodes this arena will ever hold.
    #[inline]
    pub(crate) fn limit(&self) -> usize {
        self.max_nodes.map_or(MAX_IDS, |max| max.min(MAX_IDS))
    }

    /// The fixed node budget, if one was configured.
    #[inline]
    pub(crate) fn budget(&self) -> Option<usize> {
        self.max_nodes.map(|max| max.min(MAX_IDS))
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.limit().saturating_sub(self.nodes.len())
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let additional = additional.min(self.remaining());
        self.nodes.reserve(additional);
    }

    /// Fail unless `additional` more nodes fit.
    pub(crate) fn ensure_room(&self, additional: usize) -> crate::Result<()> {
        if additional > self.remaining() {
            return Err(crate::Error::ArenaExhausted {
                capacity: self.limit(),
            });
        }
        Ok(())
    }

    pub(crate) fn allocate(&mut self, node: Node) -> crate::Result<NodeId> {
        self.ensure_room(1)?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        Ok(id)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn count(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].count
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node>()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }
}

/// Nodes on a root-to-leaf path over `domain_len` positions.
pub(crate) fn path_len(domain_len: usize) -> usize {
    let mut len = 1;
    let mut width = domain_len.max(1);
    while width > 1 {
        // The left half `[low, mid]` is never narrower than the right one.
        width = width.div_ceil(2);
        len += 1;
    }
    len
}
