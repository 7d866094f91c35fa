//! Debug utilities: version rendering and integrity checks.

use std::fmt;

use crate::arena::NodeId;
use crate::{PersistentSegTree, Result, VersionId};

impl<K: Ord + fmt::Debug> PersistentSegTree<K> {
    /// Render the non-empty nodes of `version`, one per line, as
    /// `node <id> [<low>,<high>] count=<n>` indented by depth. Leaves also
    /// show their key.
    pub fn render_version(&self, version: VersionId) -> Result<String> {
        let root = self.versions.root(version)?;
        let mut out = format!("version {version} (root {})\n", root.index());
        if root.is_empty() {
            out.push_str("(empty)\n");
            return Ok(out);
        }

        let mut stack = vec![(root, 1usize, self.domain.len(), 0usize)];
        while let Some((id, low, high, depth)) = stack.pop() {
            if id.is_empty() {
                continue;
            }
            let node = self.arena.get(id);
            let indent = "  ".repeat(depth);
            if low == high {
                out.push_str(&format!(
                    "{indent}node {} [{low},{high}] count={} key={:?}\n",
                    id.index(),
                    node.count,
                    self.domain.value_at(low)
                ));
                continue;
            }
            out.push_str(&format!(
                "{indent}node {} [{low},{high}] count={}\n",
                id.index(),
                node.count
            ));
            let mid = low + (high - low) / 2;
            stack.push((node.right, mid + 1, high, depth + 1));
            stack.push((node.left, low, mid, depth + 1));
        }
        Ok(out)
    }

    /// Verify structural invariants - returns the list of issues found.
    ///
    /// Checks that the sentinel is intact, that every node only references
    /// older nodes, that internal counts are the sum of their children, and
    /// that each version holds exactly one key more than its parent.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let sentinel = self.arena.get(NodeId::EMPTY);
        if sentinel.count != 0 || !sentinel.left.is_empty() || !sentinel.right.is_empty() {
            issues.push(format!("sentinel was modified: {sentinel:?}"));
        }

        for (id, node) in self.arena.iter().skip(1) {
            if node.left >= id || node.right >= id {
                issues.push(format!(
                    "node {} references a node that is not older: {node:?}",
                    id.index()
                ));
                continue;
            }
            if node.count == 0 {
                issues.push(format!("node {} has a zero count", id.index()));
            }
            if node.left.is_empty() && node.right.is_empty() {
                // Leaf: the count is the multiplicity.
                continue;
            }
            let sum =
                u64::from(self.arena.count(node.left)) + u64::from(self.arena.count(node.right));
            if u64::from(node.count) != sum {
                issues.push(format!(
                    "node {} count {} != children sum {sum}",
                    id.index(),
                    node.count
                ));
            }
        }

        for version in 1..self.versions.count() {
            let (Ok(root), Ok(Some(parent))) =
                (self.versions.root(version), self.versions.parent(version))
            else {
                issues.push(format!("version {version} is not addressable"));
                continue;
            };
            let Ok(parent_root) = self.versions.root(parent) else {
                issues.push(format!("version {version} has a missing parent {parent}"));
                continue;
            };
            if parent >= version {
                issues.push(format!("version {version} has a newer parent {parent}"));
            }
            let (count, parent_count) = (self.arena.count(root), self.arena.count(parent_root));
            if u64::from(count) != u64::from(parent_count) + 1 {
                issues.push(format!(
                    "version {version} holds {count} keys, parent {parent} holds {parent_count}"
                ));
            }
        }

        issues
    }
}
