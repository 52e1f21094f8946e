//! TestRail MCP Server Library
//!
//! This library provides the core functionality for the TestRail MCP server,
//! including the TestRail REST client, the MCP stdio server and its tool
//! catalogue, configuration loading and logging setup.

pub mod config;
pub mod logging;
pub mod mcp;
pub mod mcp_command;
pub mod testrail;
