//! # Cinegraph Core
//!
//! Data model and role-combination analytics for the film dataset.
//!
//! Consumes fact rows produced by the relational adapter and derives
//! per-entity and per-pair role statistics with a deterministic order.

pub mod analytics;
pub mod error;
pub mod facts;

pub use analytics::model::{
    CombinationSignature, EntityKey, FrequencyGroup, PairKey, RankedGroup, SignatureCount,
};
pub use analytics::{
    aggregate_roles_by_entity, aggregate_roles_by_entity_and_counterpart,
    rank_combination_signatures,
};
pub use analytics::topn::{top_n_by_frequency, top_n_strict};
pub use error::{AnalyticsError, AnalyticsResult};
pub use facts::FactRow;
