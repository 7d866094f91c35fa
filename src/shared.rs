//! Single-writer / multi-reader access to a [`PersistentSegTree`].
//!
//! Nodes never change once built, so readers of historical versions only need
//! the guarantee that a version id is not visible before its whole subtree
//! exists. The writer builds under the write lock and publishes the new
//! version count (Release) before releasing it; readers load the count
//! (Acquire) and reject any version at or beyond it.

use std::fmt;
use std::ops::RangeBounds;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::{Config, Error, PersistentSegTree, Result, VersionId};

/// Thread-safe wrapper around a [`PersistentSegTree`].
pub struct SharedSegTree<K = i64> {
    inner: RwLock<PersistentSegTree<K>>,
    /// Number of versions readers may address.
    published: AtomicUsize,
}

impl<K: Ord + fmt::Debug> SharedSegTree<K> {
    pub fn new(domain_keys: impl IntoIterator<Item = K>) -> Result<Self> {
        PersistentSegTree::new(domain_keys).map(Self::from_tree)
    }

    pub fn with_config(domain_keys: impl IntoIterator<Item = K>, config: Config) -> Result<Self> {
        PersistentSegTree::with_config(domain_keys, config).map(Self::from_tree)
    }

    /// Wrap an existing tree; all of its versions are published immediately.
    pub fn from_tree(tree: PersistentSegTree<K>) -> Self {
        let published = AtomicUsize::new(tree.version_count());
        Self {
            inner: RwLock::new(tree),
            published,
        }
    }

    pub fn into_inner(self) -> PersistentSegTree<K> {
        self.inner.into_inner()
    }

    /// Number of versions visible to readers, including version 0.
    #[inline]
    pub fn published_versions(&self) -> usize {
        self.published.load(Ordering::Acquire)
    }

    /// Latest version visible to readers.
    #[inline]
    pub fn latest(&self) -> VersionId {
        self.published_versions() - 1
    }

    /// Insert `key` on top of `version` and publish the result.
    pub fn insert(&self, version: VersionId, key: &K) -> Result<VersionId> {
        let mut tree = self.inner.write();
        let new_version = tree.insert(version, key)?;
        self.published
            .store(tree.version_count(), Ordering::Release);
        Ok(new_version)
    }

    /// Insert `key` on top of the latest version.
    pub fn push(&self, key: &K) -> Result<VersionId> {
        let mut tree = self.inner.write();
        let new_version = tree.push(key)?;
        self.published
            .store(tree.version_count(), Ordering::Release);
        Ok(new_version)
    }

    fn check_published(&self, versions: &[VersionId]) -> Result<()> {
        let count = self.published_versions();
        match versions.iter().find(|&&v| v >= count) {
            Some(&version) => Err(Error::VersionOutOfRange { version, count }),
            None => Ok(()),
        }
    }

    pub fn len(&self, version: VersionId) -> Result<usize> {
        self.check_published(&[version])?;
        self.inner.read().len(version)
    }

    pub fn window_len(&self, lo: VersionId, hi: VersionId) -> Result<usize> {
        self.check_published(&[lo, hi])?;
        self.inner.read().window_len(lo, hi)
    }

    pub fn kth_largest(&self, lo: VersionId, hi: VersionId, k: usize) -> Result<K>
    where
        K: Clone,
    {
        self.check_published(&[lo, hi])?;
        self.inner.read().kth_largest(lo, hi, k).cloned()
    }

    pub fn kth_smallest(&self, lo: VersionId, hi: VersionId, k: usize) -> Result<K>
    where
        K: Clone,
    {
        self.check_published(&[lo, hi])?;
        self.inner.read().kth_smallest(lo, hi, k).cloned()
    }

    pub fn count_in_range<R: RangeBounds<K>>(
        &self,
        lo: VersionId,
        hi: VersionId,
        range: R,
    ) -> Result<u64> {
        self.check_published(&[lo, hi])?;
        self.inner.read().count_in_range(lo, hi, range)
    }

    /// Run `f` against the tree under a read lock.
    pub fn read<R>(&self, f: impl FnOnce(&PersistentSegTree<K>) -> R) -> R {
        f(&self.inner.read())
    }
}

impl<K> fmt::Debug for SharedSegTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSegTree")
            .field("published", &self.published.load(Ordering::Relaxed))
            .finish()
    }
}
