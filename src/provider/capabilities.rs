//! provider::capabilities
//!
//! Capability model for provider feature gating.
//!
//! # Architecture
//!
//! A capability is a named optional feature a backend may or may not
//! support. A capability either exists or does not - there is no "partial"
//! capability. Providers declare their set statically at construction;
//! the factory refuses to hand out a provider whose set does not cover a
//! caller's requirements. A provider must never advertise a capability it
//! cannot execute.
//!
//! # Example
//!
//! ```
//! use gitbridge::provider::capabilities::{Capability, CapabilitySet};
//!
//! let caps = CapabilitySet::with([Capability::Blame, Capability::Reflog]);
//!
//! assert!(caps.has(&Capability::Blame));
//! assert!(!caps.has(&Capability::Worktree));
//!
//! let missing = caps.missing(&[Capability::Blame, Capability::Worktree]);
//! assert_eq!(missing, vec![Capability::Worktree]);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A named optional feature of a provider backend.
///
/// The base operation surface (status, commit, diff, log, ...) is mandatory
/// for every provider and is not capability-gated; capabilities cover the
/// operations an alternative backend could legitimately lack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Per-line authorship annotation.
    Blame,

    /// Reference log access.
    Reflog,

    /// Linked worktree management.
    Worktree,

    /// Stash save/apply/list.
    Stash,

    /// Commit signing.
    Signing,

    /// Applying individual commits onto the current branch.
    CherryPick,

    /// Removing untracked files from the working tree.
    Clean,
}

impl Capability {
    /// Human-readable description of the capability.
    pub fn description(&self) -> &'static str {
        match self {
            Capability::Blame => "per-line authorship annotation",
            Capability::Reflog => "reference log access",
            Capability::Worktree => "linked worktree management",
            Capability::Stash => "stash management",
            Capability::Signing => "commit signing",
            Capability::CherryPick => "cherry-picking commits",
            Capability::Clean => "removing untracked files",
        }
    }

    /// Stable name used in selection requests and reporting.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Blame => "blame",
            Capability::Reflog => "reflog",
            Capability::Worktree => "worktree",
            Capability::Stash => "stash",
            Capability::Signing => "signing",
            Capability::CherryPick => "cherry-pick",
            Capability::Clean => "clean",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The set of capabilities a provider declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    capabilities: HashSet<Capability>,
}

impl CapabilitySet {
    /// Create an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a capability set with the given capabilities.
    pub fn with<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }

    /// The full set every capability-complete backend declares.
    pub fn all() -> Self {
        Self::with([
            Capability::Blame,
            Capability::Reflog,
            Capability::Worktree,
            Capability::Stash,
            Capability::Signing,
            Capability::CherryPick,
            Capability::Clean,
        ])
    }

    /// Insert a capability into the set.
    pub fn insert(&mut self, cap: Capability) {
        self.capabilities.insert(cap);
    }

    /// Check if a capability is present.
    pub fn has(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Check if all given capabilities are present.
    ///
    /// Returns true for an empty slice.
    pub fn has_all(&self, caps: &[Capability]) -> bool {
        caps.iter().all(|c| self.capabilities.contains(c))
    }

    /// Capabilities from `required` that are absent from this set,
    /// in the order they were required.
    pub fn missing(&self, required: &[Capability]) -> Vec<Capability> {
        required
            .iter()
            .filter(|c| !self.capabilities.contains(c))
            .copied()
            .collect()
    }

    /// Number of capabilities in the set.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Iterate over the capabilities.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod capability {
        use super::*;

        #[test]
        fn names_are_stable_and_distinct() {
            let caps = CapabilitySet::all();
            let names: HashSet<_> = caps.iter().map(|c| c.name()).collect();
            assert_eq!(names.len(), caps.len());
        }

        #[test]
        fn display_uses_name() {
            assert_eq!(format!("{}", Capability::CherryPick), "cherry-pick");
        }

        #[test]
        fn descriptions_are_nonempty() {
            for cap in CapabilitySet::all().iter() {
                assert!(!cap.description().is_empty());
            }
        }
    }

    mod capability_set {
        use super::*;

        #[test]
        fn new_is_empty() {
            assert!(CapabilitySet::new().is_empty());
        }

        #[test]
        fn all_contains_every_variant() {
            let caps = CapabilitySet::all();
            assert!(caps.has_all(&[
                Capability::Blame,
                Capability::Reflog,
                Capability::Worktree,
                Capability::Stash,
                Capability::Signing,
                Capability::CherryPick,
                Capability::Clean,
            ]));
        }

        #[test]
        fn has_all_with_empty_required() {
            assert!(CapabilitySet::new().has_all(&[]));
        }

        #[test]
        fn missing_preserves_required_order() {
            let caps = CapabilitySet::with([Capability::Stash]);
            let missing = caps.missing(&[
                Capability::Blame,
                Capability::Stash,
                Capability::Reflog,
            ]);
            assert_eq!(missing, vec![Capability::Blame, Capability::Reflog]);
        }

        #[test]
        fn missing_is_empty_when_satisfied() {
            let caps = CapabilitySet::all();
            assert!(caps.missing(&[Capability::Blame, Capability::Clean]).is_empty());
        }

        #[test]
        fn insert_deduplicates() {
            let mut caps = CapabilitySet::new();
            caps.insert(Capability::Blame);
            caps.insert(Capability::Blame);
            assert_eq!(caps.len(), 1);
        }

        #[test]
        fn equality_ignores_order() {
            let a = CapabilitySet::with([Capability::Blame, Capability::Stash]);
            let b = CapabilitySet::with([Capability::Stash, Capability::Blame]);
            assert_eq!(a, b);
        }

        #[test]
        fn serializes_as_a_list() {
            let caps = CapabilitySet::with([Capability::Blame]);
            let json = serde_json::to_string(&caps).unwrap();
            assert!(json.contains("blame"));
        }
    }
}
