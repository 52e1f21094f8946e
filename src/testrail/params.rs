//! Typed filter sets for TestRail list and lookup endpoints.
//!
//! Each filter set names the path parameter it is scoped to and renders the
//! remaining, caller-supplied fields through [`Query`]. Zero identifiers are
//! rejected at deserialization time by `NonZeroU64`.

use super::query::Query;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Largest page TestRail serves for `get_cases`
pub const MAX_CASES_LIMIT: u32 = 250;

fn ids(values: &Option<Vec<NonZeroU64>>) -> Option<&[NonZeroU64]> {
    values.as_deref()
}

/// Filters for `get_cases/{project_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaseFilters {
    /// TestRail project ID
    pub project_id: NonZeroU64,
    /// Suite ID (required for multi-suite projects)
    #[serde(default)]
    pub suite_id: Option<NonZeroU64>,
    /// Only cases created after this UNIX timestamp
    #[serde(default)]
    pub created_after: Option<i64>,
    /// Only cases created before this UNIX timestamp
    #[serde(default)]
    pub created_before: Option<i64>,
    /// Creator user IDs
    #[serde(default)]
    pub created_by: Option<Vec<NonZeroU64>>,
    /// Only cases whose title contains this text
    #[serde(default)]
    pub filter: Option<String>,
    /// Page size (at most 250)
    #[schemars(range(min = 1, max = 250))]
    #[serde(default)]
    pub limit: Option<u32>,
    /// Milestone IDs
    #[serde(default)]
    pub milestone_id: Option<Vec<NonZeroU64>>,
    /// Number of cases to skip
    #[serde(default)]
    pub offset: Option<u32>,
    /// Priority IDs
    #[serde(default)]
    pub priority_id: Option<Vec<NonZeroU64>>,
    /// Only cases with one of these references
    #[serde(default)]
    pub refs: Option<String>,
    /// Section ID
    #[serde(default)]
    pub section_id: Option<NonZeroU64>,
    /// Template IDs
    #[serde(default)]
    pub template_id: Option<Vec<NonZeroU64>>,
    /// Case type IDs
    #[serde(default)]
    pub type_id: Option<Vec<NonZeroU64>>,
    /// Only cases updated after this UNIX timestamp
    #[serde(default)]
    pub updated_after: Option<i64>,
    /// Only cases updated before this UNIX timestamp
    #[serde(default)]
    pub updated_before: Option<i64>,
    /// Updater user ID
    #[serde(default)]
    pub updated_by: Option<NonZeroU64>,
    /// Label IDs
    #[serde(default)]
    pub label_id: Option<Vec<NonZeroU64>>,
}

impl CaseFilters {
    pub fn for_project(project_id: NonZeroU64) -> Self {
        Self {
            project_id,
            suite_id: None,
            created_after: None,
            created_before: None,
            created_by: None,
            filter: None,
            limit: None,
            milestone_id: None,
            offset: None,
            priority_id: None,
            refs: None,
            section_id: None,
            template_id: None,
            type_id: None,
            updated_after: None,
            updated_before: None,
            updated_by: None,
            label_id: None,
        }
    }

    /// Range checks serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        match self.limit {
            Some(0) => Err("limit must be a positive integer".to_string()),
            Some(limit) if limit > MAX_CASES_LIMIT => {
                Err(format!("limit must not exceed {}", MAX_CASES_LIMIT))
            }
            _ => Ok(()),
        }
    }

    pub fn query(&self) -> Query {
        Query::new()
            .opt("suite_id", self.suite_id)
            .opt("created_after", self.created_after)
            .opt("created_before", self.created_before)
            .list("created_by", ids(&self.created_by))
            .opt("filter", self.filter.as_deref())
            .list("milestone_id", ids(&self.milestone_id))
            .list("priority_id", ids(&self.priority_id))
            .opt("refs", self.refs.as_deref())
            .opt("section_id", self.section_id)
            .list("template_id", ids(&self.template_id))
            .list("type_id", ids(&self.type_id))
            .opt("updated_after", self.updated_after)
            .opt("updated_before", self.updated_before)
            .opt("updated_by", self.updated_by)
            .list("label_id", ids(&self.label_id))
            .opt("limit", self.limit)
            .opt("offset", self.offset)
    }
}

/// Filters for `get_sections/{project_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SectionFilters {
    /// TestRail project ID
    pub project_id: NonZeroU64,
    /// Suite ID (required for multi-suite projects)
    #[serde(default)]
    pub suite_id: Option<NonZeroU64>,
    /// Page size
    #[serde(default)]
    pub limit: Option<NonZeroU64>,
    /// Number of sections to skip
    #[serde(default)]
    pub offset: Option<u64>,
}

impl SectionFilters {
    pub fn for_project(project_id: NonZeroU64, suite_id: Option<NonZeroU64>) -> Self {
        Self {
            project_id,
            suite_id,
            limit: None,
            offset: None,
        }
    }

    pub fn query(&self) -> Query {
        Query::new()
            .opt("suite_id", self.suite_id)
            .opt("limit", self.limit)
            .opt("offset", self.offset)
    }
}

/// Filters for `get_runs/{project_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunFilters {
    /// TestRail project ID
    pub project_id: NonZeroU64,
    /// Only runs created after this UNIX timestamp
    #[serde(default)]
    pub created_after: Option<i64>,
    /// Only runs created before this UNIX timestamp
    #[serde(default)]
    pub created_before: Option<i64>,
    /// Creator user IDs
    #[serde(default)]
    pub created_by: Option<Vec<NonZeroU64>>,
    /// true for completed runs only, false for active runs only
    #[serde(default)]
    pub is_completed: Option<bool>,
    /// Page size
    #[serde(default)]
    pub limit: Option<NonZeroU64>,
    /// Number of runs to skip
    #[serde(default)]
    pub offset: Option<u64>,
    /// Milestone IDs
    #[serde(default)]
    pub milestone_id: Option<Vec<NonZeroU64>>,
    /// Only runs with one of these references
    #[serde(default)]
    pub refs_filter: Option<String>,
    /// Suite IDs
    #[serde(default)]
    pub suite_id: Option<Vec<NonZeroU64>>,
}

impl RunFilters {
    pub fn query(&self) -> Query {
        Query::new()
            .opt("created_after", self.created_after)
            .opt("created_before", self.created_before)
            .list("created_by", ids(&self.created_by))
            .flag("is_completed", self.is_completed)
            .opt("limit", self.limit)
            .opt("offset", self.offset)
            .list("milestone_id", ids(&self.milestone_id))
            .opt("refs_filter", self.refs_filter.as_deref().filter(|r| !r.is_empty()))
            .list("suite_id", ids(&self.suite_id))
    }
}

/// Filters for `get_tests/{run_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestFilters {
    /// TestRail run ID
    pub run_id: NonZeroU64,
    /// Status IDs
    #[serde(default)]
    pub status_id: Option<Vec<NonZeroU64>>,
    /// Page size
    #[serde(default)]
    pub limit: Option<NonZeroU64>,
    /// Number of tests to skip
    #[serde(default)]
    pub offset: Option<u64>,
    /// Label IDs
    #[serde(default)]
    pub label_id: Option<Vec<NonZeroU64>>,
}

impl TestFilters {
    pub fn query(&self) -> Query {
        Query::new()
            .list("status_id", ids(&self.status_id))
            .opt("limit", self.limit)
            .opt("offset", self.offset)
            .list("label_id", ids(&self.label_id))
    }
}

/// Parameters for `get_test/{test_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestLookup {
    /// TestRail test ID
    pub test_id: NonZeroU64,
    /// Request additional data with the test
    #[serde(default)]
    pub with_data: Option<String>,
}

impl TestLookup {
    pub fn query(&self) -> Query {
        Query::new().opt("with_data", self.with_data.as_deref())
    }
}
