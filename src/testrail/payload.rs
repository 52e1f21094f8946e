//! Write payloads for create and update operations.
//!
//! Standard fields serialize as-is. The caller's `custom` map is flattened to
//! the top level of the outgoing body with every key carrying the `custom_`
//! prefix exactly once, which is how TestRail recognises extension fields on
//! write.

use super::error::TestRailError;
use super::model::{nullable, CustomFields, CUSTOM_PREFIX};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::num::NonZeroU64;

/// Rewrite an extension key to carry the reserved prefix (idempotent)
pub fn prefix_custom_key(key: &str) -> String {
    if key.starts_with(CUSTOM_PREFIX) {
        key.to_string()
    } else {
        format!("{}{}", CUSTOM_PREFIX, key)
    }
}

/// A request body with an optional extension map
pub trait WritePayload: Serialize {
    fn custom(&self) -> Option<&CustomFields>;

    /// Build the JSON body sent to TestRail.
    ///
    /// Extension keys never overwrite a standard field of the same wire name.
    fn to_wire(&self) -> Result<Value, TestRailError> {
        let mut body = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(TestRailError::local(format!("failed to encode payload: {}", e))),
        };

        if let Some(custom) = self.custom() {
            for (key, value) in custom {
                body.entry(prefix_custom_key(key))
                    .or_insert_with(|| value.clone());
            }
        }

        Ok(Value::Object(body))
    }
}

/// Body of `add_case`; the target section travels in the path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaseCreate {
    /// Test case title, descriptive and unique within the section
    #[schemars(length(min = 1))]
    pub title: String,
    /// Case type id (e.g. 1=Acceptance, 6=Functional, 7=Other, 9=Regression)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<NonZeroU64>,
    /// Priority id (1=Low, 2=Medium, 3=High, 4=Critical)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<NonZeroU64>,
    /// References such as ticket keys, comma-separated. `null` clears them.
    // `Some(None)` sends an explicit `null`
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub refs: Option<Option<String>>,
    /// Custom fields. Must include every field with is_required=true in
    /// get_case_fields, e.g. {"custom_automation_type": 0, "custom_steps_separated":
    /// [{"content": "Do X", "expected": "Y happens"}]}. Keys get the custom_
    /// prefix when missing.
    #[serde(default, skip_serializing)]
    pub custom: Option<CustomFields>,
}

impl WritePayload for CaseCreate {
    fn custom(&self) -> Option<&CustomFields> {
        self.custom.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaseUpdate {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Move the case to this section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<NonZeroU64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<NonZeroU64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<NonZeroU64>,
    /// References, comma-separated. `null` clears them.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub refs: Option<Option<String>>,
    /// Custom fields to change; keys get the custom_ prefix when missing
    #[serde(default, skip_serializing)]
    pub custom: Option<CustomFields>,
}

impl WritePayload for CaseUpdate {
    fn custom(&self) -> Option<&CustomFields> {
        self.custom.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<NonZeroU64>,
    /// Include every case of the suite instead of `case_ids`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_all: Option<bool>,
    /// Cases to include when include_all is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_ids: Option<Vec<NonZeroU64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_ids: Option<Vec<NonZeroU64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<String>,
    /// Unix timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_on: Option<i64>,
    /// Unix timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<i64>,
    /// Custom fields; keys get the custom_ prefix when missing
    #[serde(default, skip_serializing)]
    pub custom: Option<CustomFields>,
}

impl WritePayload for RunUpdate {
    fn custom(&self) -> Option<&CustomFields> {
        self.custom.as_ref()
    }
}

/// A label reference: numeric id or title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LabelRef {
    Id(NonZeroU64),
    Title(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestUpdate {
    /// Label ids or titles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<LabelRef>>,
    /// Custom fields; keys get the custom_ prefix when missing
    #[serde(default, skip_serializing)]
    pub custom: Option<CustomFields>,
}

impl WritePayload for TestUpdate {
    fn custom(&self) -> Option<&CustomFields> {
        self.custom.as_ref()
    }
}

/// Outcome of one executed step
///
/// Keys beyond the common ones are kept and sent back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<NonZeroU64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `add_result`; the test id travels in the path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResultCreate {
    /// Status id (1=Passed, 2=Blocked, 3=Untested, 4=Retest, 5=Failed)
    pub status_id: NonZeroU64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Build or version tested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Time spent, e.g. "30s" or "1m 45s"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<String>,
    /// Defect ids, comma-separated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defects: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignedto_id: Option<NonZeroU64>,
    /// Per-step outcomes for cases with separated steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_step_results: Option<Vec<StepResult>>,
    /// Custom fields; keys get the custom_ prefix when missing
    #[serde(default, skip_serializing)]
    pub custom: Option<CustomFields>,
}

impl ResultCreate {
    pub fn new(status_id: NonZeroU64) -> Self {
        Self {
            status_id,
            comment: None,
            version: None,
            elapsed: None,
            defects: None,
            assignedto_id: None,
            custom_step_results: None,
            custom: None,
        }
    }
}

impl WritePayload for ResultCreate {
    fn custom(&self) -> Option<&CustomFields> {
        self.custom.as_ref()
    }
}
