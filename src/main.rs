// TestRail MCP Server - Main Entry Point
//
// Exposes the TestRail REST API as MCP tools over stdio.
// Stdout is reserved for the protocol stream; logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use testrail_mcp::config::Config;
use testrail_mcp::{logging, mcp_command};
use tracing::info;

/// TestRail MCP server
#[derive(Parser, Debug)]
#[command(name = "testrail-mcp")]
#[command(author = "TestRail MCP Contributors")]
#[command(version)]
#[command(about = "MCP server exposing the TestRail REST API as tools", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "TESTRAIL_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Command to run (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve MCP over stdio
    Serve,
    /// Check TestRail credentials by listing projects
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    logging::init(&config.logging, args.verbose)?;

    info!("TestRail MCP v{} starting", env!("CARGO_PKG_VERSION"));

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => mcp_command::execute_serve(&config).await?,
        Commands::Check => {
            let service = mcp_command::build_service(&config)?;
            let report = mcp_command::execute_check(&service).await?;
            // Human-facing output; `check` does not speak MCP.
            println!(
                "Connected to {} ({} projects)",
                config.testrail.url, report.project_count
            );
            for name in &report.project_names {
                println!("  - {}", name);
            }
        }
    }

    Ok(())
}
