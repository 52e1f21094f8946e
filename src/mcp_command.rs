//! Command Module
//!
//! Operations behind the CLI subcommands. `main.rs` only parses arguments,
//! loads configuration and dispatches here.

use crate::config::Config;
use crate::mcp::{transport, McpServer};
use crate::testrail::{HttpTransport, TestRailService, Transport};
use anyhow::{Context, Result};
use tracing::info;

/// Outcome of a connectivity check
#[derive(Debug)]
pub struct CheckReport {
    /// Number of projects visible to the configured account
    pub project_count: usize,

    /// Project names, in the order TestRail returned them
    pub project_names: Vec<String>,
}

/// Build the TestRail service for `config`
pub fn build_service(config: &Config) -> Result<TestRailService<HttpTransport>> {
    let transport = HttpTransport::new(config.transport_config())
        .context("Failed to build TestRail HTTP client")?;
    Ok(TestRailService::new(transport))
}

/// Run the MCP server on stdio until the client closes input or a shutdown
/// signal arrives.
pub async fn execute_serve(config: &Config) -> Result<()> {
    let server = McpServer::new(build_service(config)?);
    let (reader, writer) = transport::stdio();

    info!(url = %config.testrail.url, "Starting TestRail MCP server");

    tokio::select! {
        result = server.serve(reader, writer) => {
            result.context("MCP server failed")?;
            info!("MCP server stopped");
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, stopping MCP server");
        }
    }

    Ok(())
}

/// Verify credentials by listing projects
pub async fn execute_check<T: Transport>(service: &TestRailService<T>) -> Result<CheckReport> {
    let projects = service
        .get_projects()
        .await
        .context("TestRail connectivity check failed")?;

    info!(projects = projects.len(), "TestRail connectivity check succeeded");

    Ok(CheckReport {
        project_count: projects.len(),
        project_names: projects.into_iter().map(|p| p.name).collect(),
    })
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
