//! TestRail Tool Catalogue
//!
//! Every TestRail operation is published as an MCP tool. Its JSON Schema is
//! derived from the type its arguments decode into, so the published contract
//! and the accepted input cannot drift apart. A call goes through three steps:
//!
//! 1. Arguments are decoded into the typed parameter set and range-checked.
//!    Failures become JSON-RPC `invalid params` errors before anything is
//!    sent to TestRail.
//! 2. The matching [`TestRailService`] operation runs.
//! 3. Success is returned as pretty-printed JSON text. A classified failure is
//!    translated into an actionable sentence and returned with `isError: true`.

use crate::mcp::protocol::{McpError, Tool, ToolResult};
use crate::testrail::error::{ErrorKind, TestRailError};
use crate::testrail::params::{CaseFilters, RunFilters, SectionFilters, TestFilters, TestLookup};
use crate::testrail::payload::{CaseCreate, CaseUpdate, ResultCreate, RunUpdate, TestUpdate};
use crate::testrail::service::TestRailService;
use crate::testrail::transport::Transport;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Display;
use std::num::NonZeroU64;
use std::path::PathBuf;

pub const AUTH_FAILED: &str = "Authentication failed: check TESTRAIL_USERNAME/TESTRAIL_API_KEY";
pub const RATE_LIMITED: &str = "Rate limited by TestRail; try again later";
pub const SERVER_ERROR: &str = "TestRail server error";
pub const NETWORK_ERROR: &str = "Network error contacting TestRail";

/// Published tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetCase,
    AddCase,
    UpdateCase,
    GetProjects,
    GetProject,
    GetSuites,
    GetSuite,
    GetCases,
    AddAttachmentToCase,
    GetSections,
    GetRuns,
    GetRun,
    UpdateRun,
    GetTests,
    GetTest,
    UpdateTest,
    AddResult,
    GetCaseFields,
}

impl ToolName {
    pub const ALL: [ToolName; 18] = [
        Self::GetCase,
        Self::AddCase,
        Self::UpdateCase,
        Self::GetProjects,
        Self::GetProject,
        Self::GetSuites,
        Self::GetSuite,
        Self::GetCases,
        Self::AddAttachmentToCase,
        Self::GetSections,
        Self::GetRuns,
        Self::GetRun,
        Self::UpdateRun,
        Self::GetTests,
        Self::GetTest,
        Self::UpdateTest,
        Self::AddResult,
        Self::GetCaseFields,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetCase => "get_case",
            Self::AddCase => "add_case",
            Self::UpdateCase => "update_case",
            Self::GetProjects => "get_projects",
            Self::GetProject => "get_project",
            Self::GetSuites => "get_suites",
            Self::GetSuite => "get_suite",
            Self::GetCases => "get_cases",
            Self::AddAttachmentToCase => "add_attachment_to_case",
            Self::GetSections => "get_sections",
            Self::GetRuns => "get_runs",
            Self::GetRun => "get_run",
            Self::UpdateRun => "update_run",
            Self::GetTests => "get_tests",
            Self::GetTest => "get_test",
            Self::UpdateTest => "update_test",
            Self::AddResult => "add_result",
            Self::GetCaseFields => "get_case_fields",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::GetCase => "Fetch a TestRail test case by ID.",
            Self::AddCase => ADD_CASE_DESCRIPTION,
            Self::UpdateCase => "Update fields of an existing TestRail test case. Only supplied fields change; custom field keys are sent with the custom_ prefix.",
            Self::GetProjects => "List all TestRail projects visible to the configured user.",
            Self::GetProject => "Fetch a TestRail project by ID.",
            Self::GetSuites => "List the test suites of a TestRail project.",
            Self::GetSuite => "Fetch a TestRail test suite by ID.",
            Self::GetCases => "List test cases of a project, optionally filtered. Returns pagination metadata (offset, limit, size, _links) with the cases.",
            Self::AddAttachmentToCase => "Upload a local file as an attachment to a TestRail test case.",
            Self::GetSections => "List the sections of a project (and suite, for multi-suite projects).",
            Self::GetRuns => "List test runs of a project, optionally filtered.",
            Self::GetRun => "Fetch a test run by ID, including its status counters.",
            Self::UpdateRun => "Update an existing test run.",
            Self::GetTests => "List the tests of a test run, optionally filtered by status or label.",
            Self::GetTest => "Fetch a single test (a case instance inside a run) by ID.",
            Self::UpdateTest => "Update the labels or custom fields of an existing test.",
            Self::AddResult => "Record a result (status, comment, elapsed time, defects, step results) for a test.",
            Self::GetCaseFields => "List test case field definitions. Fields whose configs[].options.is_required is true must be supplied in add_case's custom object.",
        }
    }

    /// Argument schema, derived from the type the arguments decode into
    fn input_schema(self) -> Value {
        match self {
            Self::GetCase => schema_of::<CaseArgs>(),
            Self::AddCase => schema_of::<AddCaseArgs>(),
            Self::UpdateCase => schema_of::<UpdateCaseArgs>(),
            Self::GetProjects | Self::GetCaseFields => schema_of::<NoArgs>(),
            Self::GetProject | Self::GetSuites => schema_of::<ProjectArgs>(),
            Self::GetSuite => schema_of::<SuiteArgs>(),
            Self::GetCases => schema_of::<CaseFilters>(),
            Self::AddAttachmentToCase => schema_of::<AttachmentArgs>(),
            Self::GetSections => schema_of::<SectionFilters>(),
            Self::GetRuns => schema_of::<RunFilters>(),
            Self::GetRun => schema_of::<RunArgs>(),
            Self::UpdateRun => schema_of::<UpdateRunArgs>(),
            Self::GetTests => schema_of::<TestFilters>(),
            Self::GetTest => schema_of::<TestLookup>(),
            Self::UpdateTest => schema_of::<UpdateTestArgs>(),
            Self::AddResult => schema_of::<AddResultArgs>(),
        }
    }

    /// MCP tool definition
    pub fn definition(self) -> Tool {
        Tool {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

const ADD_CASE_DESCRIPTION: &str = "Create a new TestRail test case.

Workflow:
1. Call get_cases with section_id and limit=1 to see an existing case's field format.
2. Call get_case_fields to find required fields (configs[].options.is_required=true).
3. Include every required custom field in `custom`, matching the format from step 1.

Custom keys may be given with or without the custom_ prefix.

Section resolution: provide section_id directly, or project_id (+ suite_id for multi-suite projects) to use the project's first top-level section.";

/// All tool definitions, in catalogue order
pub fn definitions() -> Vec<Tool> {
    ToolName::ALL.iter().map(|t| t.definition()).collect()
}

fn schema_of<A: JsonSchema>() -> Value {
    let mut schema = schemars::schema_for!(A).to_value();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.entry("properties").or_insert_with(|| json!({}));
    }
    schema
}

#[derive(Debug, Deserialize, JsonSchema)]
struct NoArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
struct CaseArgs {
    /// TestRail case ID
    case_id: NonZeroU64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AddCaseArgs {
    /// Section to create the case in. If omitted, project_id is used to
    /// resolve a section.
    #[serde(default)]
    section_id: Option<NonZeroU64>,
    /// Project ID. Required when section_id is omitted.
    #[serde(default)]
    project_id: Option<NonZeroU64>,
    /// Suite ID, for multi-suite projects when section_id is omitted
    #[serde(default)]
    suite_id: Option<NonZeroU64>,
    #[serde(flatten)]
    case: CaseCreate,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateCaseArgs {
    /// TestRail case ID
    case_id: NonZeroU64,
    #[serde(flatten)]
    update: CaseUpdate,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ProjectArgs {
    /// TestRail project ID
    project_id: NonZeroU64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SuiteArgs {
    /// TestRail suite ID
    suite_id: NonZeroU64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AttachmentArgs {
    /// TestRail case ID
    case_id: NonZeroU64,
    /// Path of a local file to upload
    file_path: PathBuf,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RunArgs {
    /// TestRail run ID
    run_id: NonZeroU64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateRunArgs {
    /// TestRail run ID
    run_id: NonZeroU64,
    #[serde(flatten)]
    update: RunUpdate,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateTestArgs {
    /// TestRail test ID
    test_id: NonZeroU64,
    #[serde(flatten)]
    update: TestUpdate,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AddResultArgs {
    /// TestRail test ID
    test_id: NonZeroU64,
    #[serde(flatten)]
    result: ResultCreate,
}

/// Dispatch a `tools/call`
///
/// `Err` is reserved for protocol-level problems (unknown tool, invalid
/// arguments). TestRail failures come back as an error [`ToolResult`].
pub async fn call_tool<T: Transport>(
    service: &TestRailService<T>,
    name: &str,
    arguments: Option<Value>,
) -> Result<ToolResult, McpError> {
    let tool = ToolName::parse(name)
        .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {}", name)))?;
    let arguments = arguments.unwrap_or_else(|| json!({}));

    tracing::debug!(tool = name, "Tool called");

    match tool {
        ToolName::GetCase => {
            let args: CaseArgs = parse(tool, arguments)?;
            respond(tool, service.get_case(args.case_id).await, |e| {
                default_message(e, || format!("Case {} not found", args.case_id))
            })
        }
        ToolName::AddCase => {
            let args: AddCaseArgs = parse(tool, arguments)?;
            require_text(tool, "title", Some(&args.case.title))?;
            add_case(service, args).await
        }
        ToolName::UpdateCase => {
            let args: UpdateCaseArgs = parse(tool, arguments)?;
            require_text(tool, "title", args.update.title.as_deref())?;
            respond(tool, service.update_case(args.case_id, &args.update).await, |e| {
                default_message(e, || format!("Case {} not found", args.case_id))
            })
        }
        ToolName::GetProjects => {
            let NoArgs {} = parse(tool, arguments)?;
            respond(tool, service.get_projects().await, |e| {
                default_message(e, || e.message.clone())
            })
        }
        ToolName::GetProject => {
            let args: ProjectArgs = parse(tool, arguments)?;
            respond(tool, service.get_project(args.project_id).await, |e| {
                default_message(e, || format!("Project {} not found", args.project_id))
            })
        }
        ToolName::GetSuites => {
            let args: ProjectArgs = parse(tool, arguments)?;
            respond(tool, service.get_suites(args.project_id).await, |e| {
                default_message(e, || format!("Project {} not found", args.project_id))
            })
        }
        ToolName::GetSuite => {
            let args: SuiteArgs = parse(tool, arguments)?;
            respond(tool, service.get_suite(args.suite_id).await, |e| {
                default_message(e, || format!("Suite {} not found", args.suite_id))
            })
        }
        ToolName::GetCases => {
            let filters: CaseFilters = parse(tool, arguments)?;
            filters.validate().map_err(|reason| invalid_arguments(tool, reason))?;
            respond(tool, service.get_cases(&filters).await, |e| {
                default_message(e, || project_or_suite(filters.project_id, filters.suite_id))
            })
        }
        ToolName::AddAttachmentToCase => {
            let args: AttachmentArgs = parse(tool, arguments)?;
            require_text(tool, "file_path", Some(&args.file_path.to_string_lossy()))?;
            respond(
                tool,
                service.add_attachment_to_case(args.case_id, &args.file_path).await,
                |e| default_message(e, || format!("Case {} not found", args.case_id)),
            )
        }
        ToolName::GetSections => {
            let filters: SectionFilters = parse(tool, arguments)?;
            respond(tool, service.get_sections(&filters).await, |e| {
                default_message(e, || project_or_suite(filters.project_id, filters.suite_id))
            })
        }
        ToolName::GetRuns => {
            let filters: RunFilters = parse(tool, arguments)?;
            respond(tool, service.get_runs(&filters).await, |e| {
                default_message(e, || format!("Project {} not found", filters.project_id))
            })
        }
        ToolName::GetRun => {
            let args: RunArgs = parse(tool, arguments)?;
            respond(tool, service.get_run(args.run_id).await, |e| {
                default_message(e, || format!("Run {} not found", args.run_id))
            })
        }
        ToolName::UpdateRun => {
            let args: UpdateRunArgs = parse(tool, arguments)?;
            require_text(tool, "name", args.update.name.as_deref())?;
            respond(tool, service.update_run(args.run_id, &args.update).await, |e| {
                default_message(e, || format!("Run {} not found", args.run_id))
            })
        }
        ToolName::GetTests => {
            let filters: TestFilters = parse(tool, arguments)?;
            respond(tool, service.get_tests(&filters).await, |e| {
                default_message(e, || format!("Run {} not found", filters.run_id))
            })
        }
        ToolName::GetTest => {
            let lookup: TestLookup = parse(tool, arguments)?;
            respond(tool, service.get_test(&lookup).await, |e| {
                default_message(e, || format!("Test {} not found", lookup.test_id))
            })
        }
        ToolName::UpdateTest => {
            let args: UpdateTestArgs = parse(tool, arguments)?;
            respond(tool, service.update_test(args.test_id, &args.update).await, |e| {
                default_message(e, || format!("Test {} not found", args.test_id))
            })
        }
        ToolName::AddResult => {
            let args: AddResultArgs = parse(tool, arguments)?;
            respond(tool, service.add_result(args.test_id, &args.result).await, |e| {
                default_message(e, || format!("Test {} not found", args.test_id))
            })
        }
        ToolName::GetCaseFields => {
            let NoArgs {} = parse(tool, arguments)?;
            respond(tool, service.get_case_fields().await, |e| {
                default_message(e, || e.message.clone())
            })
        }
    }
}

async fn add_case<T: Transport>(
    service: &TestRailService<T>,
    args: AddCaseArgs,
) -> Result<ToolResult, McpError> {
    let tool = ToolName::AddCase;

    let section_id = match (args.section_id, args.project_id) {
        (Some(section_id), _) => section_id,
        (None, None) => {
            return Ok(ToolResult::error(
                "Either section_id or project_id must be provided. With project_id, a suitable \
                 section is chosen automatically. Use get_projects and get_sections to find IDs.",
            ))
        }
        (None, Some(project_id)) => match service.resolve_section(project_id, args.suite_id).await {
            Ok(Some(section)) => match NonZeroU64::new(section.id) {
                Some(id) => id,
                None => return Ok(ToolResult::error(SERVER_ERROR)),
            },
            Ok(None) => {
                let suite = args
                    .suite_id
                    .map(|s| format!(" and suite {}", s))
                    .unwrap_or_default();
                return Ok(ToolResult::error(format!(
                    "No sections found for project {}{}. Create a section first or use get_sections to verify available sections.",
                    project_id, suite
                )));
            }
            Err(e) => {
                return respond::<()>(tool, Err(e), |e| {
                    add_case_message(e, None, Some(project_id), args.suite_id)
                })
            }
        },
    };

    respond(tool, service.add_case(section_id, &args.case).await, |e| {
        add_case_message(e, args.section_id, args.project_id, args.suite_id)
    })
}

fn add_case_message(
    e: &TestRailError,
    section_id: Option<NonZeroU64>,
    project_id: Option<NonZeroU64>,
    suite_id: Option<NonZeroU64>,
) -> String {
    match e.kind {
        ErrorKind::NotFound => match (section_id, project_id) {
            (Some(section_id), _) => format!(
                "Section {} not found. Use get_sections to find valid section IDs for your project.",
                section_id
            ),
            (None, Some(project_id)) => format!(
                "{}. Use get_projects and get_suites to find valid IDs.",
                project_or_suite(project_id, suite_id)
            ),
            (None, None) => e.message.clone(),
        },
        ErrorKind::ValidationError => format!(
            "Validation error (HTTP {}): {}. This usually means required custom fields are missing. \
             To fix: 1) call get_case_fields, 2) find fields where configs[].options.is_required=true, \
             3) include all of them in the \"custom\" argument. Commonly required: \
             custom_automation_type (integer, e.g. 0=None, 1=Automated), \
             custom_case_complexity (integer, e.g. 0=Simple, 1=Medium, 2=Complex), \
             custom_version (integer, project-specific version ID).",
            e.status.unwrap_or(400),
            e.message
        ),
        ErrorKind::PermissionDenied => {
            "Permission denied. Try a different project or section using get_projects and get_sections."
                .to_string()
        }
        _ => default_message(e, || e.message.clone()),
    }
}

/// Actionable text for a classified failure
///
/// `not_found` supplies the sentence naming the missing entity.
pub fn default_message(e: &TestRailError, not_found: impl FnOnce() -> String) -> String {
    match e.kind {
        ErrorKind::Auth => AUTH_FAILED.to_string(),
        ErrorKind::NotFound => not_found(),
        ErrorKind::RateLimited => RATE_LIMITED.to_string(),
        ErrorKind::Server => SERVER_ERROR.to_string(),
        ErrorKind::Network => NETWORK_ERROR.to_string(),
        ErrorKind::ValidationError | ErrorKind::PermissionDenied | ErrorKind::Unknown => {
            e.message.clone()
        }
    }
}

fn project_or_suite(project_id: NonZeroU64, suite_id: Option<NonZeroU64>) -> String {
    match suite_id {
        Some(suite_id) => format!("Project {} or suite {} not found", project_id, suite_id),
        None => format!("Project {} not found", project_id),
    }
}

fn invalid_arguments(tool: ToolName, reason: impl Display) -> McpError {
    McpError::invalid_params(format!("Invalid arguments for {}: {}", tool.as_str(), reason))
}

fn parse<A: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<A, McpError> {
    serde_json::from_value(arguments).map_err(|e| invalid_arguments(tool, e))
}

/// Reject a supplied but blank string argument
fn require_text(tool: ToolName, name: &str, value: Option<&str>) -> Result<(), McpError> {
    match value {
        Some(text) if text.trim().is_empty() => {
            Err(invalid_arguments(tool, format!("`{}` must not be empty", name)))
        }
        _ => Ok(()),
    }
}

fn respond<R: Serialize>(
    tool: ToolName,
    result: Result<R, TestRailError>,
    describe: impl FnOnce(&TestRailError) -> String,
) -> Result<ToolResult, McpError> {
    match result {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| McpError::internal_error(format!("Failed to encode result: {}", e)))?;
            tracing::debug!(tool = tool.as_str(), "Tool completed");
            Ok(ToolResult::text(text))
        }
        Err(e) => {
            tracing::warn!(
                tool = tool.as_str(),
                kind = %e.kind,
                status = ?e.status,
                "Tool call failed"
            );
            Ok(ToolResult::error(describe(&e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testrail::fake::{Call, FakeTransport};

    fn service(fake: FakeTransport) -> TestRailService<FakeTransport> {
        TestRailService::new(fake)
    }

    #[test]
    fn test_catalogue_names_are_unique_and_parse_back() {
        let defs = definitions();
        assert_eq!(defs.len(), 18);
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
        }
        let mut names: Vec<_> = defs.iter().map(|d| d.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 18);
    }

    #[test]
    fn test_every_schema_is_an_object_schema() {
        for tool in definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(tool.input_schema["properties"].is_object(), "{}", tool.name);
            assert!(tool.input_schema.get("$schema").is_none(), "{}", tool.name);
        }
    }

    #[test]
    fn test_schemas_follow_argument_types() {
        let schema = ToolName::GetCase.input_schema();
        assert_eq!(schema["properties"]["case_id"]["minimum"], 1);
        assert_eq!(schema["properties"]["case_id"]["description"], "TestRail case ID");
        assert_eq!(schema["required"], json!(["case_id"]));

        let schema = ToolName::AddCase.input_schema();
        let properties = schema["properties"].as_object().unwrap();
        for name in ["title", "section_id", "project_id", "suite_id", "refs", "custom"] {
            assert!(properties.contains_key(name), "add_case lacks {}", name);
        }
        assert_eq!(schema["required"], json!(["title"]));
        assert!(properties["refs"].to_string().contains("null"));
        assert!(properties["custom"]["description"]
            .as_str()
            .unwrap()
            .contains("is_required=true"));

        let schema = ToolName::GetCases.input_schema();
        assert!(schema["properties"]["limit"].to_string().contains("250"));

        let schema = ToolName::AddResult.input_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("test_id")));
        assert!(required.contains(&json!("status_id")));
        assert!(schema["properties"]["custom_step_results"].is_object());
    }

    async fn rejected(tool: &str, args: Value) -> McpError {
        let svc = service(FakeTransport::new());
        let err = call_tool(&svc, tool, Some(args)).await.unwrap_err();
        assert!(svc.transport().calls().is_empty(), "{} reached the transport", tool);
        err
    }

    #[tokio::test]
    async fn test_argument_errors_are_invalid_params() {
        let err = rejected("get_case", json!({})).await;
        assert_eq!(err.code, -32602);
        assert!(err.message.contains("get_case"));
        assert!(err.message.contains("`case_id`"));

        let err = rejected("get_case", json!({"case_id": 0})).await;
        assert!(err.message.contains("nonzero"));

        let err = rejected("get_case", json!({"case_id": "7"})).await;
        assert_eq!(err.code, -32602);

        let err = rejected("get_cases", json!({"project_id": 1, "limit": 251})).await;
        assert!(err.message.contains("limit must not exceed 250"));

        let err = rejected("get_cases", json!({"project_id": 1, "type_id": [1, -2]})).await;
        assert_eq!(err.code, -32602);

        let err = rejected("add_case", json!({"title": "  ", "section_id": 7})).await;
        assert!(err.message.contains("`title` must not be empty"));

        let err = rejected("update_test", json!({"test_id": 1, "labels": [true]})).await;
        assert_eq!(err.code, -32602);

        let err = rejected("get_projects", json!("all")).await;
        assert_eq!(err.code, -32602);
    }

    #[tokio::test]
    async fn test_optional_nulls_are_omitted() {
        let svc = service(FakeTransport::new().ok(json!({"id": 1, "title": "T"})));
        call_tool(&svc, "update_case", Some(json!({"case_id": 1, "type_id": null, "title": "T"})))
            .await
            .unwrap();
        assert_eq!(
            svc.transport().calls()[0],
            Call::Post("update_case/1".into(), json!({"title": "T"}))
        );
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_transport() {
        let svc = service(FakeTransport::new());
        let err = call_tool(&svc, "get_case", Some(json!({"case_id": -1})))
            .await
            .unwrap_err();
        assert_eq!(err.code, -32602);
        assert!(svc.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let svc = service(FakeTransport::new());
        let err = call_tool(&svc, "delete_everything", None).await.unwrap_err();
        assert_eq!(err.code, -32602);
        assert!(err.message.contains("delete_everything"));
    }

    #[tokio::test]
    async fn test_success_is_pretty_json() {
        let svc = service(FakeTransport::new().ok(json!({"id": 123, "title": "Sample", "custom_field": "x"})));
        let result = call_tool(&svc, "get_case", Some(json!({"case_id": 123}))).await.unwrap();
        assert!(!result.is_error);
        let parsed: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
        assert_eq!(parsed["custom"]["custom_field"], "x");
        assert_eq!(parsed["refs"], Value::Null);
    }

    #[tokio::test]
    async fn test_error_texts_by_kind() {
        let cases = [
            (TestRailError::from_status(401), AUTH_FAILED.to_string()),
            (TestRailError::from_status(404), "Case 42 not found".to_string()),
            (TestRailError::from_status(429), RATE_LIMITED.to_string()),
            (TestRailError::from_status(502), SERVER_ERROR.to_string()),
            (TestRailError::network("refused"), NETWORK_ERROR.to_string()),
            (TestRailError::from_status(409).with_detail(Some("Conflict".into())), "Conflict".to_string()),
        ];
        for (error, expected) in cases {
            let svc = service(FakeTransport::new().respond(Err(error)));
            let result = call_tool(&svc, "get_case", Some(json!({"case_id": 42}))).await.unwrap();
            assert!(result.is_error);
            assert_eq!(result.first_text().unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_get_cases_rejects_zero_limit_before_call() {
        let svc = service(FakeTransport::new());
        let err = call_tool(&svc, "get_cases", Some(json!({"project_id": 1, "limit": 0})))
            .await
            .unwrap_err();
        assert_eq!(err.code, -32602);
        assert!(svc.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_case_requires_section_or_project() {
        let svc = service(FakeTransport::new());
        let result = call_tool(&svc, "add_case", Some(json!({"title": "T"}))).await.unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("section_id or project_id"));
        assert!(svc.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_case_resolves_section_from_project() {
        let svc = service(
            FakeTransport::new()
                .ok(json!({"sections": [
                    {"id": 4, "name": "Nested", "depth": 1, "parent_id": 5},
                    {"id": 5, "name": "Root", "depth": 0, "parent_id": null}
                ]}))
                .ok(json!({"id": 99, "title": "T", "section_id": 5})),
        );
        let result = call_tool(
            &svc,
            "add_case",
            Some(json!({"title": "T", "project_id": 2, "suite_id": 3, "custom": {"severity": "high"}})),
        )
        .await
        .unwrap();
        assert!(!result.is_error, "{:?}", result);

        let calls = svc.transport().calls();
        assert_eq!(calls[0], Call::Get("get_sections/2&suite_id=3".into()));
        assert_eq!(
            calls[1],
            Call::Post("add_case/5".into(), json!({"title": "T", "custom_severity": "high"}))
        );
    }

    #[tokio::test]
    async fn test_add_case_no_sections() {
        let svc = service(FakeTransport::new().ok(json!([])));
        let result = call_tool(&svc, "add_case", Some(json!({"title": "T", "project_id": 2})))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.first_text().unwrap().starts_with("No sections found for project 2"));
    }

    #[tokio::test]
    async fn test_add_case_validation_error_explains_remediation() {
        let svc = service(FakeTransport::new().respond(Err(
            TestRailError::from_status(400).with_detail(Some("Field :custom_version is required".into())),
        )));
        let result = call_tool(&svc, "add_case", Some(json!({"title": "T", "section_id": 7})))
            .await
            .unwrap();
        let text = result.first_text().unwrap();
        assert!(text.contains("Field :custom_version is required"));
        assert!(text.contains("get_case_fields"));
        assert!(text.contains("is_required=true"));
        for field in ["custom_automation_type", "custom_case_complexity", "custom_version ("] {
            assert!(text.contains(field), "missing {}", field);
        }
    }

    #[tokio::test]
    async fn test_add_case_section_not_found() {
        let svc = service(FakeTransport::new().respond(Err(TestRailError::from_status(404))));
        let result = call_tool(&svc, "add_case", Some(json!({"title": "T", "section_id": 7})))
            .await
            .unwrap();
        assert!(result.first_text().unwrap().starts_with("Section 7 not found"));
    }

    #[tokio::test]
    async fn test_update_case_sends_explicit_null_refs() {
        let svc = service(FakeTransport::new().ok(json!({"id": 1, "title": "T"})));
        call_tool(&svc, "update_case", Some(json!({"case_id": 1, "refs": null})))
            .await
            .unwrap();
        assert_eq!(
            svc.transport().calls()[0],
            Call::Post("update_case/1".into(), json!({"refs": null}))
        );
    }

    #[tokio::test]
    async fn test_add_result_flattens_custom() {
        let svc = service(FakeTransport::new().ok(json!({"id": 1, "test_id": 3, "status_id": 5})));
        call_tool(
            &svc,
            "add_result",
            Some(json!({"test_id": 3, "status_id": 5, "comment": "broken", "custom": {"browser": "firefox"}})),
        )
        .await
        .unwrap();
        assert_eq!(
            svc.transport().calls()[0],
            Call::Post(
                "add_result/3".into(),
                json!({"status_id": 5, "comment": "broken", "custom_browser": "firefox"})
            )
        );
    }

    #[tokio::test]
    async fn test_tools_route_to_their_endpoints() {
        let cases = [
            ("get_project", json!({"project_id": 1}), json!({"id": 1, "name": "Web"}), "get_project/1"),
            ("get_suites", json!({"project_id": 1}), json!([]), "get_suites/1"),
            ("get_suite", json!({"suite_id": 2}), json!({"id": 2, "name": "Smoke"}), "get_suite/2"),
            ("get_sections", json!({"project_id": 1, "suite_id": 2}), json!([]), "get_sections/1&suite_id=2"),
            ("get_runs", json!({"project_id": 1, "is_completed": false}), json!([]), "get_runs/1&is_completed=0"),
            ("get_run", json!({"run_id": 3}), json!({"id": 3, "name": "Nightly"}), "get_run/3"),
            ("get_tests", json!({"run_id": 3, "status_id": [1, 5]}), json!([]), "get_tests/3&status_id=1%2C5"),
            ("get_test", json!({"test_id": 4}), json!({"id": 4, "title": "T"}), "get_test/4"),
            ("get_case_fields", json!({}), json!([]), "get_case_fields"),
        ];

        for (tool, args, body, endpoint) in cases {
            let svc = service(FakeTransport::new().ok(body));
            let result = call_tool(&svc, tool, Some(args)).await.unwrap();
            assert!(!result.is_error, "{}: {:?}", tool, result.first_text());
            assert_eq!(svc.transport().calls(), vec![Call::Get(endpoint.to_string())], "{}", tool);
        }
    }

    #[tokio::test]
    async fn test_write_tools_post_their_payloads() {
        let svc = service(
            FakeTransport::new()
                .ok(json!({"id": 3, "name": "Renamed"}))
                .ok(json!({"id": 4, "title": "T"}))
                .ok(json!({"attachment_id": 443})),
        );

        call_tool(&svc, "update_run", Some(json!({"run_id": 3, "name": "Renamed", "case_ids": [1, 2]})))
            .await
            .unwrap();
        call_tool(&svc, "update_test", Some(json!({"test_id": 4, "labels": [7, "smoke"]})))
            .await
            .unwrap();
        let result = call_tool(
            &svc,
            "add_attachment_to_case",
            Some(json!({"case_id": 9, "file_path": "/tmp/report.log"})),
        )
        .await
        .unwrap();
        assert!(result.first_text().unwrap().contains("443"));

        let calls = svc.transport().calls();
        assert_eq!(
            calls[0],
            Call::Post("update_run/3".into(), json!({"name": "Renamed", "case_ids": [1, 2]}))
        );
        assert_eq!(
            calls[1],
            Call::Post("update_test/4".into(), json!({"labels": [7, "smoke"]}))
        );
        assert_eq!(
            calls[2],
            Call::Upload("add_attachment_to_case/9".into(), PathBuf::from("/tmp/report.log"))
        );
    }

    #[tokio::test]
    async fn test_get_projects_without_arguments() {
        let svc = service(FakeTransport::new().ok(json!([{"id": 1, "name": "Web"}])));
        let result = call_tool(&svc, "get_projects", None).await.unwrap();
        assert!(!result.is_error);
        assert!(result.first_text().unwrap().contains("\"Web\""));
    }
}
