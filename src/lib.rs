//! # pseg-rs
//!
//! A persistent (versioned) segment tree over a discretized key domain.
//!
//! Every insert produces a new version that shares all untouched subtrees
//! with the version it was built on, so any historical version stays
//! queryable. Queries run over the multiset difference of two versions
//! `(lo, hi]` in O(log V), independent of how far apart the versions are.
//!
//! ## Example
//!
//! ```rust
//! use pseg_rs::PersistentSegTree;
//!
//! let keys = [3i64, 1, 4, 1, 5, 9, 2, 6];
//! let mut tree = PersistentSegTree::new(keys).unwrap();
//! for key in &keys {
//!     tree.push(key).unwrap();
//! }
//!
//! // Keys inserted by versions 2..=5 are {1, 4, 1, 5}.
//! assert_eq!(tree.kth_largest(1, 5, 2), Ok(&4));
//! assert_eq!(tree.count_in_range(1, 5, 1..=4), Ok(3));
//! assert_eq!(tree.count_in_range(0, 8, ..), Ok(8));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod arena;
mod build;
mod debug;
mod domain;
mod error;
mod query;
pub mod shared;
mod version;

pub use arena::{Node, NodeId};
pub use domain::Domain;
pub use error::{Error, Result};
pub use shared::SharedSegTree;
pub use version::VersionId;

use std::fmt;
use std::ops::RangeBounds;

use tracing::{debug, trace, warn};

use crate::arena::NodeArena;
use crate::query::Order;
use crate::version::VersionIndex;

// =============================================================================
// Configuration
// =============================================================================

/// Sizing options for a [`PersistentSegTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Expected number of inserts; used to reserve arena and version storage.
    pub expected_insertions: usize,
    /// Fixed node budget (sentinel included). `None` lets the arena grow up to
    /// the 32-bit id space.
    pub max_nodes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_insertions: 1024,
            max_nodes: None,
        }
    }
}

impl Config {
    /// Growable arena reserved for `insertions` inserts.
    pub fn for_insertions(insertions: usize) -> Self {
        Self {
            expected_insertions: insertions,
            max_nodes: None,
        }
    }

    /// Cap the arena at `max_nodes` nodes.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }
}

/// Share of a fixed node budget (in percent) past which a warning is logged.
const BUDGET_WARN_PERCENT: usize = 90;

// =============================================================================
// PersistentSegTree
// =============================================================================

/// Versioned multiset of keys drawn from a fixed domain.
///
/// Owns the value domain, the node arena and the version index. Version 0 is
/// the empty multiset; every [`insert`](Self::insert) publishes a new version.
#[derive(Clone)]
pub struct PersistentSegTree<K = i64> {
    domain: Domain<K>,
    arena: NodeArena,
    versions: VersionIndex,
    budget_warned: bool,
}

impl<K: Ord + fmt::Debug> PersistentSegTree<K> {
    /// Discretize `domain_keys` and create a tree holding only version 0.
    pub fn new(domain_keys: impl IntoIterator<Item = K>) -> Result<Self> {
        Self::with_config(domain_keys, Config::default())
    }

    pub fn with_config(domain_keys: impl IntoIterator<Item = K>, config: Config) -> Result<Self> {
        let domain = Domain::new(domain_keys)?;
        let mut arena = NodeArena::new(config.max_nodes);
        arena.reserve(NodeArena::nodes_for(
            config.expected_insertions,
            domain.len(),
        ));
        let mut versions = VersionIndex::new();
        versions.reserve(config.expected_insertions);

        debug!(
            domain_len = domain.len(),
            expected_insertions = config.expected_insertions,
            max_nodes = ?config.max_nodes,
            "initialized persistent segment tree"
        );

        Ok(Self {
            domain,
            arena,
            versions,
            budget_warned: false,
        })
    }

    /// Upper bound on arena nodes needed for `insertions` inserts over a
    /// domain of `domain_len` keys. Useful for sizing [`Config::max_nodes`].
    pub fn nodes_required(insertions: usize, domain_len: usize) -> usize {
        NodeArena::nodes_for(insertions, domain_len)
    }

    // -------------------------------------------------------------------------
    // Version management
    // -------------------------------------------------------------------------

    #[inline]
    pub fn domain(&self) -> &Domain<K> {
        &self.domain
    }

    /// Number of versions, including version 0.
    #[inline]
    pub fn version_count(&self) -> usize {
        self.versions.count()
    }

    /// Most recently created version.
    #[inline]
    pub fn latest(&self) -> VersionId {
        self.versions.latest()
    }

    /// Root node of `version`.
    pub fn root(&self, version: VersionId) -> Result<NodeId> {
        self.versions.root(version)
    }

    /// Version `version` was built on; `None` for version 0.
    pub fn parent(&self, version: VersionId) -> Result<Option<VersionId>> {
        self.versions.parent(version)
    }

    /// Number of keys in the multiset of `version`.
    pub fn len(&self, version: VersionId) -> Result<usize> {
        let root = self.versions.root(version)?;
        Ok(self.arena.count(root) as usize)
    }

    /// Read-only view of an arena node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        (id.index() < self.arena.len()).then(|| self.arena.get(id))
    }

    /// Number of allocated nodes, sentinel included.
    #[inline]
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    pub fn memory_usage(&self) -> usize {
        self.domain.memory_usage() + self.arena.memory_usage() + self.versions.memory_usage()
    }

    pub fn shrink_to_fit(&mut self) {
        self.arena.shrink_to_fit();
        self.versions.shrink_to_fit();
    }

    // -------------------------------------------------------------------------
    // Inserts
    // -------------------------------------------------------------------------

    /// Insert `key` on top of `version`, publishing and returning a new
    /// version. `version` itself is left untouched.
    pub fn insert(&mut self, version: VersionId, key: &K) -> Result<VersionId> {
        let prev_root = self.versions.root(version)?;
        let position = self.domain.rank(key)?;
        let before = self.arena.len();

        let root = build::build(&mut self.arena, prev_root, position, 1, self.domain.len())?;
        let new_version = self.versions.publish(version, root);

        debug!(
            version = new_version,
            parent = version,
            position,
            nodes = self.arena.len() - before,
            "published version"
        );
        self.check_budget();
        Ok(new_version)
    }

    /// Insert `key` on top of the latest version.
    pub fn push(&mut self, key: &K) -> Result<VersionId> {
        self.insert(self.latest(), key)
    }

    /// Push every key in order and return the last version created.
    ///
    /// Stops at the first failing key; versions created before it stay
    /// published.
    pub fn extend<'a, I>(&mut self, keys: I) -> Result<VersionId>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut version = self.latest();
        for key in keys {
            version = self.push(key)?;
        }
        Ok(version)
    }

    fn check_budget(&mut self) {
        if self.budget_warned {
            return;
        }
        let Some(budget) = self.arena.budget() else {
            return;
        };
        if self.arena.len().saturating_mul(100) >= budget.saturating_mul(BUDGET_WARN_PERCENT) {
            warn!(
                nodes = self.arena.len(),
                capacity = budget,
                "node arena is nearly exhausted"
            );
            self.budget_warned = true;
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Number of keys inserted by versions `(lo, hi]`.
    pub fn window_len(&self, lo: VersionId, hi: VersionId) -> Result<usize> {
        let (lo_root, hi_root) = self.versions.window(lo, hi)?;
        Ok(query::window_len(&self.arena, lo_root, hi_root))
    }

    /// The `k`-th largest key (1-based, descending order) inserted by
    /// versions `(lo, hi]`.
    pub fn kth_largest(&self, lo: VersionId, hi: VersionId, k: usize) -> Result<&K> {
        self.select(lo, hi, k, Order::Descending)
    }

    /// The `k`-th smallest key (1-based, ascending order) inserted by
    /// versions `(lo, hi]`.
    pub fn kth_smallest(&self, lo: VersionId, hi: VersionId, k: usize) -> Result<&K> {
        self.select(lo, hi, k, Order::Ascending)
    }

    fn select(&self, lo: VersionId, hi: VersionId, k: usize, order: Order) -> Result<&K> {
        let (lo_root, hi_root) = self.versions.window(lo, hi)?;
        let len = query::window_len(&self.arena, lo_root, hi_root);
        if k == 0 || k > len {
            return Err(Error::RankOutOfRange { k, len });
        }
        let position = query::select(
            &self.arena,
            lo_root,
            hi_root,
            k,
            1,
            self.domain.len(),
            order,
        );
        trace!(lo, hi, k, ?order, position, "order statistic");
        Ok(self.domain.value_at(position))
    }

    /// Number of keys inserted by versions `(lo, hi]` that fall in `range`.
    ///
    /// The range bounds need not be domain keys; `..` counts the whole window.
    pub fn count_in_range<R: RangeBounds<K>>(
        &self,
        lo: VersionId,
        hi: VersionId,
        range: R,
    ) -> Result<u64> {
        let (lo_root, hi_root) = self.versions.window(lo, hi)?;
        let Some((ql, qr)) = self.domain.position_range(range) else {
            return Ok(0);
        };
        let count = query::count_range(
            &self.arena,
            lo_root,
            hi_root,
            ql,
            qr,
            1,
            self.domain.len(),
        );
        trace!(lo, hi, ql, qr, count, "range count");
        Ok(count)
    }

    /// How many times `key` was inserted by versions `(lo, hi]`.
    pub fn multiplicity(&self, lo: VersionId, hi: VersionId, key: &K) -> Result<u64> {
        self.count_in_range(lo, hi, key..=key)
    }

    /// Distinct keys inserted by versions `(lo, hi]` with their
    /// multiplicities, in ascending key order.
    pub fn entries(&self, lo: VersionId, hi: VersionId) -> Result<Vec<(&K, u32)>> {
        let (lo_root, hi_root) = self.versions.window(lo, hi)?;
        Ok(
            query::entries(&self.arena, lo_root, hi_root, 1, self.domain.len())
                .into_iter()
                .map(|(position, count)| (self.domain.value_at(position), count))
                .collect(),
        )
    }
}

impl<K> fmt::Debug for PersistentSegTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentSegTree")
            .field("domain_len", &self.domain.len())
            .field("versions", &self.versions.count())
            .field("nodes", &self.arena.len())
            .finish()
    }
}


#[cfg(test)]
mod proptests;
