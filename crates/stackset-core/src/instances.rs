//! Stack instance flattening, diffing and aggregation.
//!
//! Templates declare instances compactly as `accounts × regions` groups with
//! shared parameter overrides. To work out what changed between two versions
//! of a template we expand both into a flat `(account, region) → overrides`
//! map, compare the maps key by key, and then fold each resulting key set
//! back into as few `accounts × regions` groups as possible so that every
//! group costs exactly one API call.
//!
//! ```text
//! specs ──flatten──▶ FlatInstances ──diff──▶ InstanceDiff
//!                          │                      │
//!                          └──────aggregate◀──────┘
//!                                    │
//!                                    ▼
//!                           Vec<InstanceGroup>
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use stackset_model::{KeyValue, StackInstancesSpec};

use crate::error::{StackSetError, StackSetResult};

/// One stack instance location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey {
    /// Target account id.
    pub account: String,
    /// Target region.
    pub region: String,
}

impl InstanceKey {
    /// Create a new key.
    #[must_use]
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.region)
    }
}

/// A set of instances that can be handled by a single API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceGroup {
    /// Accounts, sorted.
    pub accounts: Vec<String>,
    /// Regions, sorted.
    pub regions: Vec<String>,
    /// Overrides shared by every cell of the group.
    pub overrides: Vec<KeyValue>,
}

impl InstanceGroup {
    /// The group declared by `spec`, without blank accounts or regions.
    #[must_use]
    pub fn from_spec(spec: &StackInstancesSpec) -> Self {
        Self {
            accounts: non_blank(&spec.accounts),
            regions: non_blank(&spec.regions),
            overrides: spec.overrides().to_vec(),
        }
    }

    /// Expand the group back into its `(account, region)` cells.
    pub fn keys(&self) -> impl Iterator<Item = InstanceKey> + '_ {
        self.accounts.iter().flat_map(move |account| {
            self.regions
                .iter()
                .map(move |region| InstanceKey::new(account.clone(), region.clone()))
        })
    }
}

fn non_blank(values: &[String]) -> Vec<String> {
    values.iter().filter(|v| !v.is_empty()).cloned().collect()
}

/// Flat `(account, region) → overrides` view of a template's instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatInstances {
    cells: BTreeMap<InstanceKey, Vec<KeyValue>>,
}

impl FlatInstances {
    /// Expand every spec into its cells.
    ///
    /// Empty account or region strings are not instances and are skipped. A
    /// cell declared twice, in the same spec or across specs, is an error.
    pub fn flatten(specs: &[StackInstancesSpec]) -> StackSetResult<Self> {
        let mut cells = BTreeMap::new();
        for spec in specs {
            for account in spec.accounts.iter().filter(|a| !a.is_empty()) {
                for region in spec.regions.iter().filter(|r| !r.is_empty()) {
                    let key = InstanceKey::new(account.clone(), region.clone());
                    if cells.contains_key(&key) {
                        return Err(StackSetError::DuplicateInstance {
                            account: key.account,
                            region: key.region,
                        });
                    }
                    cells.insert(key, spec.overrides().to_vec());
                }
            }
        }
        Ok(Self { cells })
    }

    /// Overrides for one cell.
    #[must_use]
    pub fn get(&self, key: &InstanceKey) -> Option<&[KeyValue]> {
        self.cells.get(key).map(Vec::as_slice)
    }

    /// Whether the cell is declared.
    #[must_use]
    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.cells.contains_key(key)
    }

    /// All cells, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &InstanceKey> {
        self.cells.keys()
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Compare `old` against `new`.
    #[must_use]
    pub fn diff(old: &Self, new: &Self) -> InstanceDiff {
        let mut diff = InstanceDiff::default();

        for (key, overrides) in &new.cells {
            match old.cells.get(key) {
                None => diff.added.push(key.clone()),
                Some(previous) if previous == overrides => diff.unchanged.push(key.clone()),
                Some(_) => diff.changed.push(key.clone()),
            }
        }
        diff.removed = old
            .cells
            .keys()
            .filter(|key| !new.cells.contains_key(*key))
            .cloned()
            .collect();

        diff
    }

    /// Fold `keys` into the fewest groups of identical regions and overrides.
    ///
    /// Regions are first collected per `(account, overrides)`; accounts that
    /// end up with the same region set and overrides then share one group.
    /// Keys that are not part of this map are ignored.
    pub fn aggregate<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a InstanceKey>,
    ) -> Vec<InstanceGroup> {
        let mut by_account: BTreeMap<(&str, &[KeyValue]), BTreeSet<&str>> = BTreeMap::new();
        for key in keys {
            if let Some(overrides) = self.cells.get(key) {
                by_account
                    .entry((key.account.as_str(), overrides.as_slice()))
                    .or_default()
                    .insert(key.region.as_str());
            }
        }

        let mut by_shape: BTreeMap<(BTreeSet<&str>, &[KeyValue]), Vec<&str>> = BTreeMap::new();
        for ((account, overrides), regions) in by_account {
            by_shape.entry((regions, overrides)).or_default().push(account);
        }

        by_shape
            .into_iter()
            .map(|((regions, overrides), accounts)| InstanceGroup {
                accounts: accounts.into_iter().map(ToOwned::to_owned).collect(),
                regions: regions.into_iter().map(ToOwned::to_owned).collect(),
                overrides: overrides.to_vec(),
            })
            .collect()
    }
}

/// Result of comparing two [`FlatInstances`].
///
/// The four lists are disjoint and together cover every key of both maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceDiff {
    /// Only in the new map.
    pub added: Vec<InstanceKey>,
    /// Only in the old map.
    pub removed: Vec<InstanceKey>,
    /// In both, same overrides.
    pub unchanged: Vec<InstanceKey>,
    /// In both, different overrides.
    pub changed: Vec<InstanceKey>,
}

impl InstanceDiff {
    /// Whether any instance must be added, removed or updated.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty())
    }
}
