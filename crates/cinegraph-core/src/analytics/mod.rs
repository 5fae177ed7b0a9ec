//! Role-combination analytics engine.
//!
//! Groups fact rows by entity or by (entity, counterpart) pair, collects
//! each group's distinct role set, and ranks the surviving groups. All
//! operations are single in-memory passes over already-fetched rows; no
//! per-group re-queries against the store.

pub mod model;
pub mod topn;

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::facts::FactRow;
use model::{CombinationSignature, EntityKey, PairKey, RankedGroup, SignatureCount};

/// Resolve the usable role token of a row, excluding malformed rows.
///
/// Rows without an `entity_id` are logged and skipped; rows without a role
/// token are skipped silently (the original dataset carries NULL categories).
fn usable_role(row: &FactRow) -> Option<&str> {
    if let Err(err) = row.validate() {
        warn!(%err, counterpart = %row.counterpart_name, "Excluding malformed fact row");
        return None;
    }
    row.role_token()
}

/// Entities holding more than one distinct role across their whole history.
///
/// Returns one group per entity with `|roles| > 1`, ordered by role count
/// descending, then entity name ascending, then entity id. The order is
/// total, so any permutation of the input yields the same output.
pub fn aggregate_roles_by_entity(rows: &[FactRow]) -> Vec<RankedGroup<EntityKey>> {
    let mut groups: BTreeMap<String, (String, BTreeSet<String>)> = BTreeMap::new();

    for row in rows {
        let Some(role) = usable_role(row) else { continue };
        let entry = groups
            .entry(row.entity_id.clone())
            .or_insert_with(|| (row.entity_name.clone(), BTreeSet::new()));
        entry.1.insert(role.to_string());
    }

    let mut ranked: Vec<RankedGroup<EntityKey>> = groups
        .into_iter()
        .filter(|(_, (_, roles))| roles.len() > 1)
        .map(|(id, (name, roles))| {
            let count = roles.len();
            RankedGroup {
                key: EntityKey { id, name },
                roles,
                count,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.key.name.cmp(&b.key.name))
            .then_with(|| a.key.id.cmp(&b.key.id))
    });
    ranked
}

/// Entities holding more than one distinct role on the *same* counterpart.
///
/// The grouping key is strictly `(entity_id, counterpart_id)`. This is a
/// different granularity from [`aggregate_roles_by_entity`]: an actor who
/// directed one film and acted in another shows up there but not here.
pub fn aggregate_roles_by_entity_and_counterpart(rows: &[FactRow]) -> Vec<RankedGroup<PairKey>> {
    let mut groups: BTreeMap<(String, String), (String, String, BTreeSet<String>)> =
        BTreeMap::new();

    for row in rows {
        let Some(role) = usable_role(row) else { continue };
        let entry = groups
            .entry((row.entity_id.clone(), row.counterpart_id.clone()))
            .or_insert_with(|| {
                (
                    row.entity_name.clone(),
                    row.counterpart_name.clone(),
                    BTreeSet::new(),
                )
            });
        entry.2.insert(role.to_string());
    }

    let mut ranked: Vec<RankedGroup<PairKey>> = groups
        .into_iter()
        .filter(|(_, (_, _, roles))| roles.len() > 1)
        .map(|((entity_id, counterpart_id), (entity_name, counterpart_name, roles))| {
            let count = roles.len();
            RankedGroup {
                key: PairKey {
                    entity_id,
                    entity_name,
                    counterpart_id,
                    counterpart_name,
                },
                roles,
                count,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.key.entity_name.cmp(&b.key.entity_name))
            .then_with(|| a.key.counterpart_name.cmp(&b.key.counterpart_name))
            .then_with(|| a.key.entity_id.cmp(&b.key.entity_id))
            .then_with(|| a.key.counterpart_id.cmp(&b.key.counterpart_id))
    });
    ranked
}

/// Tally how often each exact role combination recurs across groups.
///
/// Reuses the already-grouped role sets in one pass instead of re-fetching
/// role lists per group. Ordered frequency descending, signature ascending.
pub fn rank_combination_signatures<K>(groups: &[RankedGroup<K>]) -> Vec<SignatureCount> {
    let mut tally: BTreeMap<CombinationSignature, usize> = BTreeMap::new();
    for group in groups {
        *tally
            .entry(CombinationSignature::from_roles(&group.roles))
            .or_insert(0) += 1;
    }

    // BTreeMap iteration is signature-ascending; the stable sort keeps that
    // order within equal frequencies.
    let mut ranked: Vec<SignatureCount> = tally
        .into_iter()
        .map(|(signature, frequency)| SignatureCount { signature, frequency })
        .collect();
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked
}
