//! Fact row model.
//!
//! A `FactRow` is one relational assignment: one artist holding one role
//! on one film. Rows are read-only snapshots fetched per analytics run;
//! the engine never mutates them.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// One role assignment from the relational store.
///
/// `entity_id` and `counterpart_id` are opaque stable identifiers
/// (the original dataset's artist/film ids). `role` is a small closed-ish
/// token such as `"acted in"` or `"directed"`; `year` is optional display
/// data and never participates in grouping keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
    pub entity_id: String,
    pub entity_name: String,
    pub counterpart_id: String,
    pub counterpart_name: String,
    pub role: Option<String>,
    pub year: Option<i32>,
}

impl FactRow {
    pub fn new(
        entity_id: impl Into<String>,
        entity_name: impl Into<String>,
        counterpart_id: impl Into<String>,
        counterpart_name: impl Into<String>,
        role: Option<String>,
        year: Option<i32>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_name: entity_name.into(),
            counterpart_id: counterpart_id.into(),
            counterpart_name: counterpart_name.into(),
            role,
            year,
        }
    }

    /// Validate the required key field.
    ///
    /// A row without an `entity_id` cannot be grouped; adapters log the
    /// returned error and exclude the row, aggregation continues.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.entity_id.is_empty() {
            return Err(AnalyticsError::malformed("entity_id", &self.entity_name));
        }
        Ok(())
    }

    /// The role token if present and non-empty.
    pub fn role_token(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.is_empty())
    }
}
