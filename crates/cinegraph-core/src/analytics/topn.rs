//! Generic top-N frequency windowing.
//!
//! The caller supplies the grouping policy; the engine counts distinct
//! entities per key and keeps everything tied with the Nth entry, since
//! downstream reports want "all films with the maximum actor count", not
//! an arbitrary fixed-size slice.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::facts::FactRow;
use super::model::FrequencyGroup;

/// Rank keys by how many distinct entities map to them, keeping the top N.
///
/// `key_fn` returns the grouping key for a row, or `None` to exclude it.
/// Entries tied with the Nth count are all included. Order is count
/// descending, key ascending on ties; `n == 0` yields an empty result.
pub fn top_n_by_frequency<K, F>(rows: &[FactRow], key_fn: F, n: usize) -> Vec<FrequencyGroup<K>>
where
    K: Ord + Clone,
    F: Fn(&FactRow) -> Option<K>,
{
    let mut buckets: BTreeMap<K, BTreeSet<&str>> = BTreeMap::new();
    for row in rows {
        if let Err(err) = row.validate() {
            warn!(%err, "Excluding malformed fact row from top-N");
            continue;
        }
        if let Some(key) = key_fn(row) {
            buckets.entry(key).or_default().insert(row.entity_id.as_str());
        }
    }

    // BTreeMap iteration is key-ascending; the stable sort preserves that
    // within equal counts.
    let mut ranked: Vec<FrequencyGroup<K>> = buckets
        .into_iter()
        .map(|(key, entities)| FrequencyGroup {
            key,
            count: entities.len(),
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    if n == 0 {
        return Vec::new();
    }
    if ranked.len() > n {
        let boundary = ranked[n - 1].count;
        let cut = ranked
            .iter()
            .position(|g| g.count < boundary)
            .unwrap_or(ranked.len());
        ranked.truncate(cut);
    }
    ranked
}

/// Strict top-N: errors instead of widening the window on a boundary tie.
pub fn top_n_strict<K, F>(
    rows: &[FactRow],
    key_fn: F,
    n: usize,
) -> AnalyticsResult<Vec<FrequencyGroup<K>>>
where
    K: Ord + Clone,
    F: Fn(&FactRow) -> Option<K>,
{
    let ranked = top_n_by_frequency(rows, key_fn, n);
    if ranked.len() > n {
        return Err(AnalyticsError::AmbiguousTieBreak {
            n,
            count: ranked[n - 1].count,
            candidates: ranked.len(),
        });
    }
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_row(entity_id: &str, film: &str) -> FactRow {
        FactRow::new(
            entity_id,
            format!("Artist {entity_id}"),
            film,
            format!("Movie {film}"),
            Some("acted in".to_string()),
            None,
        )
    }

    fn film_key(row: &FactRow) -> Option<String> {
        Some(row.counterpart_id.clone())
    }

    #[test]
    fn test_boundary_ties_are_included() {
        // Film A and B each have 5 distinct actors, film C has 3.
        let mut rows = Vec::new();
        for i in 0..5 {
            rows.push(actor_row(&format!("a{i}"), "A"));
            rows.push(actor_row(&format!("b{i}"), "B"));
        }
        for i in 0..3 {
            rows.push(actor_row(&format!("c{i}"), "C"));
        }

        let top = top_n_by_frequency(&rows, film_key, 1);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].key, "A");
        assert_eq!(top[1].key, "B");
        assert!(top.iter().all(|g| g.count == 5));
    }

    #[test]
    fn test_distinct_entities_per_key() {
        // The same actor credited twice on one film counts once.
        let rows = vec![actor_row("a1", "A"), actor_row("a1", "A"), actor_row("a2", "A")];
        let top = top_n_by_frequency(&rows, film_key, 3);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].count, 2);
    }

    #[test]
    fn test_key_order_breaks_count_ties() {
        let rows = vec![actor_row("a1", "B"), actor_row("a2", "A"), actor_row("a3", "C")];
        let top = top_n_by_frequency(&rows, film_key, 3);
        let keys: Vec<&str> = top.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_excluded_rows_and_empty_input() {
        assert!(top_n_by_frequency(&[], film_key, 5).is_empty());

        let rows = vec![actor_row("a1", "A")];
        assert!(top_n_by_frequency(&rows, |_| None::<String>, 5).is_empty());
        assert!(top_n_by_frequency(&rows, film_key, 0).is_empty());
    }

    #[test]
    fn test_strict_rejects_boundary_tie() {
        let rows = vec![actor_row("a1", "A"), actor_row("a2", "B")];
        let err = top_n_strict(&rows, film_key, 1).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::AmbiguousTieBreak { n: 1, count: 1, candidates: 2 }
        ));

        let ok = top_n_strict(&rows, film_key, 2).unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn test_year_keyed_frequency() {
        // Birth-year style grouping: key on the optional year field.
        let mut rows: Vec<FactRow> = (0..4)
            .map(|i| {
                FactRow::new(
                    format!("p{i}"),
                    format!("Artist {i}"),
                    "",
                    "",
                    None,
                    Some(if i < 3 { 1960 } else { 1971 }),
                )
            })
            .collect();
        rows.push(FactRow::new("p9", "No Year", "", "", None, None));

        let top = top_n_by_frequency(&rows, |r| r.year, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, 1960);
        assert_eq!(top[0].count, 3);
    }
}
