//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

use crate::VersionId;

/// Caller-precondition violations reported at the API boundary.
///
/// None of these leave the tree in a partially updated state: every check
/// runs before the arena or the version index is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The key was not part of the batch the domain was built from.
    #[error("key {key} is not part of the discretized domain")]
    DomainLookup {
        /// `Debug` rendering of the missing key.
        key: String,
    },

    /// The domain was initialized from an empty batch of keys.
    #[error("cannot build a domain from an empty key batch")]
    EmptyDomain,

    /// The version id has not been created yet.
    #[error("version {version} does not exist ({count} versions created)")]
    VersionOutOfRange {
        /// Requested version.
        version: VersionId,
        /// Number of versions currently addressable.
        count: usize,
    },

    /// `lo` is newer than `hi`, or is not an ancestor of `hi`.
    #[error("version {lo} is not an ancestor of version {hi}")]
    InvalidWindow {
        /// Lower (older) version of the window.
        lo: VersionId,
        /// Upper (newer) version of the window.
        hi: VersionId,
    },

    /// `k` is outside `[1, len]` for the queried window.
    #[error("rank {k} is out of range for a window holding {len} keys")]
    RankOutOfRange {
        /// Requested rank.
        k: usize,
        /// Number of keys in the window.
        len: usize,
    },

    /// The node budget (or the 32-bit id space) is used up.
    #[error("node arena exhausted (capacity {capacity} nodes)")]
    ArenaExhausted {
        /// Maximum number of nodes the arena may hold.
        capacity: usize,
    },
}

impl Error {
    pub(crate) fn domain_lookup<K: std::fmt::Debug>(key: &K) -> Self {
        Self::DomainLookup {
            key: format!("{key:?}"),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
