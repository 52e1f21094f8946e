//! TestRail Entity Shapes and Normalization
//!
//! Raw TestRail records mix schema fields with dynamically named extension
//! fields. Each entity type here declares its standard keys and how its
//! extension fields are recognised; [`normalize_record`] promotes the standard
//! keys to typed attributes and gathers the rest into the `custom` map.
//!
//! # Extension rules
//!
//! - [`ExtensionRule::Prefixed`]: only keys beginning with `custom_` are kept.
//! - [`ExtensionRule::Remaining`]: every key outside the standard list is kept.
//!
//! `custom` is `None` (absent from the serialized output) when nothing was
//! collected. It is never an empty map.
//!
//! # Collections
//!
//! List endpoints answer either with a bare array or with a paginated
//! envelope (`offset`, `limit`, `size`, `_links`, plus a named array).
//! [`normalize_collection`] accepts both and produces the same per-element
//! shape either way.

use super::error::TestRailError;
use serde::de::{DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved prefix marking extension fields
pub const CUSTOM_PREFIX: &str = "custom_";

/// Extension map attached to every entity
pub type CustomFields = Map<String, Value>;

/// How an entity recognises its extension fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionRule {
    /// Keep only leftover keys carrying [`CUSTOM_PREFIX`]
    Prefixed,

    /// Keep every leftover key
    Remaining,
}

/// A TestRail record type with a fixed schema plus extension fields
pub trait Entity: DeserializeOwned {
    /// Human-readable name used in shape-violation messages
    const NAME: &'static str;

    /// Keys defined by the entity's schema
    const STANDARD_FIELDS: &'static [&'static str];

    const EXTENSION_RULE: ExtensionRule;

    fn set_custom(&mut self, custom: Option<CustomFields>);
}

/// An entity that can arrive inside a paginated envelope
pub trait Listed: Entity {
    /// Name of the array inside the envelope (`cases`, `sections`, ...)
    const COLLECTION_KEY: &'static str;
}

/// Collect the extension fields of a raw record.
///
/// Returns `None` when no key qualifies.
pub fn split_extensions(
    raw: &Map<String, Value>,
    standard: &[&str],
    rule: ExtensionRule,
) -> Option<CustomFields> {
    let custom: CustomFields = raw
        .iter()
        .filter(|(key, _)| !standard.contains(&key.as_str()))
        .filter(|(key, _)| match rule {
            ExtensionRule::Prefixed => key.starts_with(CUSTOM_PREFIX),
            ExtensionRule::Remaining => true,
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if custom.is_empty() {
        None
    } else {
        Some(custom)
    }
}

/// Normalize one raw record into its entity shape
pub fn normalize_record<E: Entity>(raw: Value) -> Result<E, TestRailError> {
    let Value::Object(map) = raw else {
        return Err(TestRailError::bad_shape(format!(
            "expected {} object, got {}",
            E::NAME,
            json_type(&raw)
        )));
    };

    let custom = split_extensions(&map, E::STANDARD_FIELDS, E::EXTENSION_RULE);
    let mut entity: E = serde_json::from_value(Value::Object(map)).map_err(|e| {
        TestRailError::bad_shape(format!("invalid {} record: {}", E::NAME, e))
    })?;
    entity.set_custom(custom);
    Ok(entity)
}

/// Cursor links of a paginated envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub prev: Option<String>,
}

/// A normalized collection response
///
/// Pagination metadata is carried through unchanged; it is `None` when the
/// upstream answered with a bare array.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub size: Option<u64>,
    pub links: Option<Links>,
    pub items: Vec<T>,
}

impl<T> Envelope<T> {
    /// Envelope for a bare-array response
    pub fn bare(items: Vec<T>) -> Self {
        Self {
            offset: None,
            limit: None,
            size: None,
            links: None,
            items,
        }
    }
}

impl<T: Listed + Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(offset) = self.offset {
            map.serialize_entry("offset", &offset)?;
        }
        if let Some(limit) = self.limit {
            map.serialize_entry("limit", &limit)?;
        }
        if let Some(size) = self.size {
            map.serialize_entry("size", &size)?;
        }
        if let Some(links) = &self.links {
            map.serialize_entry("_links", links)?;
        }
        map.serialize_entry(T::COLLECTION_KEY, &self.items)?;
        map.end()
    }
}

/// Normalize a collection response (bare array or paginated envelope)
pub fn normalize_collection<T: Listed>(body: Value) -> Result<Envelope<T>, TestRailError> {
    match body {
        Value::Array(elements) => Ok(Envelope::bare(normalize_elements(elements)?)),
        Value::Object(mut map) => {
            let Some(collection) = map.remove(T::COLLECTION_KEY) else {
                return Err(TestRailError::bad_shape(format!(
                    "response has no `{}` field",
                    T::COLLECTION_KEY
                )));
            };
            let Value::Array(elements) = collection else {
                return Err(TestRailError::bad_shape(format!(
                    "response field `{}` is {}, expected an array",
                    T::COLLECTION_KEY,
                    json_type(&collection)
                )));
            };

            Ok(Envelope {
                offset: metadata(&map, "offset")?,
                limit: metadata(&map, "limit")?,
                size: metadata(&map, "size")?,
                links: metadata(&map, "_links")?,
                items: normalize_elements(elements)?,
            })
        }
        other => Err(TestRailError::bad_shape(format!(
            "expected {} collection, got {}",
            T::NAME,
            json_type(&other)
        ))),
    }
}

fn normalize_elements<T: Entity>(elements: Vec<Value>) -> Result<Vec<T>, TestRailError> {
    elements.into_iter().map(normalize_record).collect()
}

fn metadata<M: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
) -> Result<Option<M>, TestRailError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| TestRailError::bad_shape(format!("invalid `{}` field: {}", key, e))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Keep `null` distinct from an absent key: absent -> `None`, null -> `Some(None)`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<u64>,
    /// Always present in the output; `null` when missing upstream
    #[serde(default)]
    pub refs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<i64>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Entity for Case {
    const NAME: &'static str = "case";
    const STANDARD_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "section_id",
        "type_id",
        "priority_id",
        "refs",
        "created_on",
        "updated_on",
    ];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Prefixed;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

impl Listed for Case {
    const COLLECTION_KEY: &'static str = "cases";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_announcement: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_mode: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<u64>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Entity for Project {
    const NAME: &'static str = "project";
    const STANDARD_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "announcement",
        "show_announcement",
        "is_completed",
        "completed_on",
        "suite_mode",
        "url",
        "created_on",
        "created_by",
    ];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Prefixed;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

impl Listed for Project {
    const COLLECTION_KEY: &'static str = "projects";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_baseline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_master: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<u64>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Entity for Suite {
    const NAME: &'static str = "suite";
    const STANDARD_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "project_id",
        "url",
        "is_baseline",
        "is_master",
        "is_completed",
        "completed_on",
        "created_on",
        "created_by",
        "updated_on",
        "updated_by",
    ];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Prefixed;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

impl Listed for Suite {
    const COLLECTION_KEY: &'static str = "suites";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u32>,
    pub id: u64,
    pub name: String,
    /// `null` for top-level sections
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_id: Option<u64>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Section {
    /// Top-level section: depth 0 and no parent
    pub fn is_root(&self) -> bool {
        self.depth == Some(0) && self.parent_id.is_none()
    }
}

impl Entity for Section {
    const NAME: &'static str = "section";
    const STANDARD_FIELDS: &'static [&'static str] =
        &["depth", "display_order", "id", "name", "parent_id", "suite_id"];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Prefixed;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

impl Listed for Section {
    const COLLECTION_KEY: &'static str = "sections";
}

/// A test run as listed by `get_runs`; everything beyond id/name is extension data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Entity for Run {
    const NAME: &'static str = "run";
    const STANDARD_FIELDS: &'static [&'static str] = &["id", "name"];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Remaining;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

impl Listed for Run {
    const COLLECTION_KEY: &'static str = "runs";
}

/// A single test run with its status counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDetail {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignedto_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_all: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untested_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retest_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status1_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status2_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status3_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status4_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status5_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status6_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_status7_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Entity for RunDetail {
    const NAME: &'static str = "run";
    const STANDARD_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "suite_id",
        "milestone_id",
        "assignedto_id",
        "include_all",
        "is_completed",
        "completed_on",
        "config",
        "config_ids",
        "passed_count",
        "blocked_count",
        "untested_count",
        "retest_count",
        "failed_count",
        "custom_status1_count",
        "custom_status2_count",
        "custom_status3_count",
        "custom_status4_count",
        "custom_status5_count",
        "custom_status6_count",
        "custom_status7_count",
        "project_id",
        "plan_id",
        "created_on",
        "updated_on",
        "refs",
        "start_on",
        "due_on",
        "url",
    ];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Remaining;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

/// A test as listed by `get_tests`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Entity for Test {
    const NAME: &'static str = "test";
    const STANDARD_FIELDS: &'static [&'static str] = &["id", "title"];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Remaining;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

impl Listed for Test {
    const COLLECTION_KEY: &'static str = "tests";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: u64,
    pub title: String,
}

/// A single test (an instance of a case inside a run)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDetail {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignedto_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_preconds: Option<String>,
    /// Step objects exactly as TestRail returned them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_steps_separated: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_forecast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Entity for TestDetail {
    const NAME: &'static str = "test";
    const STANDARD_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "assignedto_id",
        "case_id",
        "custom_expected",
        "custom_preconds",
        "custom_steps_separated",
        "estimate",
        "estimate_forecast",
        "priority_id",
        "run_id",
        "status_id",
        "type_id",
        "milestone_id",
        "refs",
        "labels",
    ];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Remaining;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

/// A test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: u64,
    pub test_id: u64,
    pub status_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignedto_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defects: Option<String>,
    /// Step results exactly as TestRail returned them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_step_results: Option<Vec<Value>>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomFields>,
}

impl Entity for TestResult {
    const NAME: &'static str = "result";
    const STANDARD_FIELDS: &'static [&'static str] = &[
        "id",
        "test_id",
        "status_id",
        "created_by",
        "created_on",
        "assignedto_id",
        "comment",
        "version",
        "elapsed",
        "defects",
        "custom_step_results",
    ];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Remaining;

    fn set_custom(&mut self, custom: Option<CustomFields>) {
        self.custom = custom;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldContext {
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub project_ids: Option<Vec<u64>>,
}

/// One project-scoped configuration of a case field
///
/// `options` is kept verbatim: its keys vary by field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub context: FieldContext,
    pub id: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl FieldConfig {
    pub fn is_required(&self) -> bool {
        self.options
            .get("is_required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A test-case field definition from `get_case_fields`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseField {
    pub id: u64,
    pub label: String,
    pub name: String,
    pub system_name: String,
    pub type_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default)]
    pub configs: Vec<FieldConfig>,
}

impl Entity for CaseField {
    const NAME: &'static str = "case field";
    const STANDARD_FIELDS: &'static [&'static str] = &[
        "id",
        "label",
        "name",
        "system_name",
        "type_id",
        "description",
        "display_order",
        "configs",
    ];
    const EXTENSION_RULE: ExtensionRule = ExtensionRule::Prefixed;

    // Field definitions expose no extension data.
    fn set_custom(&mut self, _custom: Option<CustomFields>) {}
}

impl Listed for CaseField {
    const COLLECTION_KEY: &'static str = "case_fields";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: u64,
}
