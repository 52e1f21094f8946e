//! TestRail Operations
//!
//! [`TestRailService`] is the typed face of the TestRail API: one method per
//! remote operation, each composed of request construction, a single call
//! through the [`Transport`], and shape normalization of the result.
//!
//! Errors arrive already classified from the transport. Normalization
//! failures are classified as `server` here. Nothing is re-wrapped.

use super::error::TestRailError;
use super::model::{
    normalize_collection, normalize_record, Attachment, Case, CaseField, Envelope, Project, Run,
    RunDetail, Section, Suite, Test, TestDetail, TestResult,
};
use super::params::{CaseFilters, RunFilters, SectionFilters, TestFilters, TestLookup};
use super::payload::{CaseCreate, CaseUpdate, ResultCreate, RunUpdate, TestUpdate, WritePayload};
use super::transport::Transport;
use std::num::NonZeroU64;
use std::path::Path;

/// Typed TestRail operations over a [`Transport`]
///
/// Holds no per-call state; a single instance may serve concurrent calls.
#[derive(Debug)]
pub struct TestRailService<T> {
    transport: T,
}

impl<T: Transport> TestRailService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get_case(&self, case_id: NonZeroU64) -> Result<Case, TestRailError> {
        let body = self.transport.get(&format!("get_case/{}", case_id)).await?;
        let case = normalize_record(body)?;
        tracing::debug!(case_id = case_id.get(), "Fetched case");
        Ok(case)
    }

    /// Create a case in `section_id`
    pub async fn add_case(
        &self,
        section_id: NonZeroU64,
        payload: &CaseCreate,
    ) -> Result<Case, TestRailError> {
        let body = self
            .transport
            .post(&format!("add_case/{}", section_id), payload.to_wire()?)
            .await?;
        let case: Case = normalize_record(body)?;
        tracing::info!(case_id = case.id, section_id = section_id.get(), "Created case");
        Ok(case)
    }

    pub async fn update_case(
        &self,
        case_id: NonZeroU64,
        payload: &CaseUpdate,
    ) -> Result<Case, TestRailError> {
        let body = self
            .transport
            .post(&format!("update_case/{}", case_id), payload.to_wire()?)
            .await?;
        let case = normalize_record(body)?;
        tracing::info!(case_id = case_id.get(), "Updated case");
        Ok(case)
    }

    pub async fn get_projects(&self) -> Result<Vec<Project>, TestRailError> {
        let body = self.transport.get("get_projects").await?;
        Ok(normalize_collection::<Project>(body)?.items)
    }

    pub async fn get_project(&self, project_id: NonZeroU64) -> Result<Project, TestRailError> {
        let body = self
            .transport
            .get(&format!("get_project/{}", project_id))
            .await?;
        normalize_record(body)
    }

    pub async fn get_suites(&self, project_id: NonZeroU64) -> Result<Vec<Suite>, TestRailError> {
        let body = self
            .transport
            .get(&format!("get_suites/{}", project_id))
            .await?;
        Ok(normalize_collection::<Suite>(body)?.items)
    }

    pub async fn get_suite(&self, suite_id: NonZeroU64) -> Result<Suite, TestRailError> {
        let body = self.transport.get(&format!("get_suite/{}", suite_id)).await?;
        normalize_record(body)
    }

    pub async fn get_cases(&self, filters: &CaseFilters) -> Result<Envelope<Case>, TestRailError> {
        let query = filters.query();
        tracing::debug!(project_id = filters.project_id.get(), filters = ?query.keys(), "Listing cases");
        let endpoint = query.apply(&format!("get_cases/{}", filters.project_id));
        normalize_collection(self.transport.get(&endpoint).await?)
    }

    pub async fn add_attachment_to_case(
        &self,
        case_id: NonZeroU64,
        file_path: &Path,
    ) -> Result<Attachment, TestRailError> {
        let body = self
            .transport
            .upload(&format!("add_attachment_to_case/{}", case_id), file_path)
            .await?;
        let attachment: Attachment = serde_json::from_value(body)
            .map_err(|e| TestRailError::bad_shape(format!("invalid attachment response: {}", e)))?;
        tracing::info!(
            case_id = case_id.get(),
            attachment_id = attachment.attachment_id,
            "Attached file to case"
        );
        Ok(attachment)
    }

    pub async fn get_sections(
        &self,
        filters: &SectionFilters,
    ) -> Result<Envelope<Section>, TestRailError> {
        let endpoint = filters
            .query()
            .apply(&format!("get_sections/{}", filters.project_id));
        normalize_collection(self.transport.get(&endpoint).await?)
    }

    /// Pick a default section for a new case in a project (and suite).
    ///
    /// Prefers the first top-level section (depth 0, no parent) and falls back
    /// to the first section returned. `None` when the project has no sections.
    pub async fn resolve_section(
        &self,
        project_id: NonZeroU64,
        suite_id: Option<NonZeroU64>,
    ) -> Result<Option<Section>, TestRailError> {
        let sections = self
            .get_sections(&SectionFilters::for_project(project_id, suite_id))
            .await?
            .items;

        let chosen = match sections.iter().position(Section::is_root) {
            Some(index) => sections.into_iter().nth(index),
            None => sections.into_iter().next(),
        };

        if let Some(section) = &chosen {
            tracing::debug!(
                project_id = project_id.get(),
                section_id = section.id,
                "Resolved default section"
            );
        }
        Ok(chosen)
    }

    pub async fn get_runs(&self, filters: &RunFilters) -> Result<Envelope<Run>, TestRailError> {
        let endpoint = filters
            .query()
            .apply(&format!("get_runs/{}", filters.project_id));
        normalize_collection(self.transport.get(&endpoint).await?)
    }

    pub async fn get_run(&self, run_id: NonZeroU64) -> Result<RunDetail, TestRailError> {
        let body = self.transport.get(&format!("get_run/{}", run_id)).await?;
        normalize_record(body)
    }

    pub async fn update_run(
        &self,
        run_id: NonZeroU64,
        payload: &RunUpdate,
    ) -> Result<RunDetail, TestRailError> {
        let body = self
            .transport
            .post(&format!("update_run/{}", run_id), payload.to_wire()?)
            .await?;
        let run = normalize_record(body)?;
        tracing::info!(run_id = run_id.get(), "Updated run");
        Ok(run)
    }

    pub async fn get_tests(&self, filters: &TestFilters) -> Result<Envelope<Test>, TestRailError> {
        let endpoint = filters
            .query()
            .apply(&format!("get_tests/{}", filters.run_id));
        normalize_collection(self.transport.get(&endpoint).await?)
    }

    pub async fn get_test(&self, lookup: &TestLookup) -> Result<TestDetail, TestRailError> {
        let endpoint = lookup
            .query()
            .apply(&format!("get_test/{}", lookup.test_id));
        normalize_record(self.transport.get(&endpoint).await?)
    }

    pub async fn update_test(
        &self,
        test_id: NonZeroU64,
        payload: &TestUpdate,
    ) -> Result<TestDetail, TestRailError> {
        let body = self
            .transport
            .post(&format!("update_test/{}", test_id), payload.to_wire()?)
            .await?;
        let test = normalize_record(body)?;
        tracing::info!(test_id = test_id.get(), "Updated test");
        Ok(test)
    }

    pub async fn add_result(
        &self,
        test_id: NonZeroU64,
        payload: &ResultCreate,
    ) -> Result<TestResult, TestRailError> {
        let body = self
            .transport
            .post(&format!("add_result/{}", test_id), payload.to_wire()?)
            .await?;
        let result: TestResult = normalize_record(body)?;
        tracing::info!(
            test_id = test_id.get(),
            result_id = result.id,
            status_id = result.status_id,
            "Added result"
        );
        Ok(result)
    }

    pub async fn get_case_fields(&self) -> Result<Vec<CaseField>, TestRailError> {
        let body = self.transport.get("get_case_fields").await?;
        Ok(normalize_collection::<CaseField>(body)?.items)
    }
}
