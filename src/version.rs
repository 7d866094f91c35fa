//! Version index: version id -> root node, plus the parent each version was
//! built from.

use crate::arena::NodeId;
use crate::error::{Error, Result};

/// Version number. Version 0 is the empty tree.
pub type VersionId = usize;

#[derive(Clone, Debug)]
pub(crate) struct VersionIndex {
    roots: Vec<NodeId>,
    parents: Vec<VersionId>,
    /// First version of the run of consecutive ids ending at each version.
    /// Versions `run_start[v]..=v` are all ancestors of `v`.
    run_start: Vec<VersionId>,
}

impl VersionIndex {
    pub(crate) fn new() -> Self {
        Self {
            roots: vec![NodeId::EMPTY],
            parents: vec![0],
            run_start: vec![0],
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.roots.reserve(additional);
        self.parents.reserve(additional);
        self.run_start.reserve(additional);
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    pub(crate) fn latest(&self) -> VersionId {
        self.roots.len() - 1
    }

    pub(crate) fn check(&self, version: VersionId) -> Result<()> {
        if version >= self.roots.len() {
            return Err(Error::VersionOutOfRange {
                version,
                count: self.roots.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn root(&self, version: VersionId) -> Result<NodeId> {
        self.check(version)?;
        Ok(self.roots[version])
    }

    pub(crate) fn parent(&self, version: VersionId) -> Result<Option<VersionId>> {
        self.check(version)?;
        Ok((version != 0).then(|| self.parents[version]))
    }

    /// Record a fully built root as a new version.
    pub(crate) fn publish(&mut self, parent: VersionId, root: NodeId) -> VersionId {
        debug_assert!(parent < self.roots.len());
        let latest = self.latest();
        let start = if parent == latest {
            self.run_start[latest]
        } else {
            latest + 1
        };
        self.roots.push(root);
        self.run_start.push(start);
        self.parents.push(parent);
        self.latest()
    }

    /// Roots of a valid `(lo, hi]` window.
    ///
    /// Both versions must exist and `lo` must be an ancestor of (or equal to)
    /// `hi`. The ancestor walk jumps a whole run of consecutive versions at a
    /// time, so it only costs one step per branch point between `lo` and `hi`.
    pub(crate) fn window(&self, lo: VersionId, hi: VersionId) -> Result<(NodeId, NodeId)> {
        self.check(lo)?;
        self.check(hi)?;
        if lo > hi {
            return Err(Error::InvalidWindow { lo, hi });
        }
        if !self.is_ancestor(lo, hi) {
            return Err(Error::InvalidWindow { lo, hi });
        }
        Ok((self.roots[lo], self.roots[hi]))
    }

    /// Whether `lo` is `hi` or one of its ancestors. Both must exist.
    fn is_ancestor(&self, lo: VersionId, hi: VersionId) -> bool {
        let mut v = hi;
        while v >= lo {
            let start = self.run_start[v];
            if start <= lo {
                return true;
            }
            // `start > lo >= 0`, so the run head has a strictly older parent.
            v = self.parents[start];
        }
        false
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.roots.capacity() * std::mem::size_of::<NodeId>()
            + (self.parents.capacity() + self.run_start.capacity())
                * std::mem::size_of::<VersionId>()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.roots.shrink_to_fit();
        self.parents.shrink_to_fit();
        self.run_start.shrink_to_fit();
    }
}
