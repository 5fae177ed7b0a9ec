//! Aggregation result types.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Grouping key for per-entity aggregation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EntityKey {
    pub id: String,
    pub name: String,
}

/// Grouping key for per-(entity, counterpart) aggregation.
///
/// Distinct from [`EntityKey`] on purpose: collapsing the pair grouping
/// into entity-only grouping silently changes "multiple roles on the same
/// film" into "multiple roles across a career".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PairKey {
    pub entity_id: String,
    pub entity_name: String,
    pub counterpart_id: String,
    pub counterpart_name: String,
}

/// One aggregated group: a key, its distinct role set, and a count.
///
/// Groups are ordered count descending, then by name ascending, with the
/// full key as the final disambiguator so the order is total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedGroup<K> {
    pub key: K,
    pub roles: BTreeSet<String>,
    pub count: usize,
}

/// Canonical string form of a role set: sorted tokens joined with `+`.
///
/// Two role sets with the same members always map to the same signature,
/// whatever order the underlying rows arrived in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CombinationSignature(String);

impl CombinationSignature {
    pub fn from_roles(roles: &BTreeSet<String>) -> Self {
        Self(roles.iter().cloned().collect::<Vec<_>>().join("+"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombinationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A combination signature with the number of groups exhibiting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureCount {
    pub signature: CombinationSignature,
    pub frequency: usize,
}

/// One top-N entry: a caller-defined key and its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyGroup<K> {
    pub key: K,
    pub count: usize,
}
