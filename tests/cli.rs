//! Binary-level tests: argument handling, configuration failures and a full
//! stdio session against a scripted TestRail server.

mod common;

use assert_cmd::Command;
use common::{MockTestRail, API_KEY, USERNAME};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("testrail-mcp").unwrap();
    for var in [
        "TESTRAIL_URL",
        "TESTRAIL_USERNAME",
        "TESTRAIL_API_KEY",
        "TESTRAIL_TIMEOUT_MS",
        "TESTRAIL_MAX_RETRIES",
        "TESTRAIL_MCP_CONFIG",
        "LOG_LEVEL",
        "LOG_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--config").arg("/nonexistent/testrail-mcp.toml");
    cmd
}

#[test]
fn test_cli_version() {
    bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("testrail-mcp ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_cli_help() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MCP server exposing the TestRail REST API"));
}

#[test]
fn test_cli_missing_credentials_fails() {
    bin()
        .env("TESTRAIL_URL", "https://example.testrail.io")
        .env("TESTRAIL_USERNAME", USERNAME)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TESTRAIL_API_KEY"));
}

#[test]
fn test_cli_invalid_url_fails() {
    bin()
        .env("TESTRAIL_URL", "example.testrail.io")
        .env("TESTRAIL_USERNAME", USERNAME)
        .env("TESTRAIL_API_KEY", API_KEY)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TESTRAIL_URL"));
}

fn responses_by_id(stdout: &[u8]) -> HashMap<String, Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap())
        .map(|value| (value["id"].to_string(), value))
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stdio_session_against_testrail() {
    let mock = MockTestRail::start().await;
    mock.push_json(
        200,
        json!({"id": 1, "title": "Login works", "refs": null, "custom_automated": true}),
    );
    let base_url = mock.base_url();

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
               "params": {"protocolVersion": "2024-11-05", "capabilities": {},
                          "clientInfo": {"name": "cli-test", "version": "0"}}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "get_case", "arguments": {"case_id": 1}}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
               "params": {"name": "get_case", "arguments": {"case_id": 0}}}),
    ]
    .iter()
    .map(|v| v.to_string() + "\n")
    .collect::<String>()
        + "not json\n";

    let output = tokio::task::spawn_blocking(move || {
        bin()
            .env("TESTRAIL_URL", base_url)
            .env("TESTRAIL_USERNAME", USERNAME)
            .env("TESTRAIL_API_KEY", API_KEY)
            .env("TESTRAIL_MAX_RETRIES", "0")
            .arg("serve")
            .write_stdin(input)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let responses = responses_by_id(&output.stdout);
    // initialize, tools/list, two calls, one parse error; no reply to the notification
    assert_eq!(responses.len(), 5);

    let init = &responses["1"]["result"];
    assert_eq!(init["protocolVersion"], "2024-11-05");
    assert_eq!(init["serverInfo"]["name"], "testrail-mcp");

    let tools = responses["2"]["result"]["tools"].as_array().unwrap();
    assert!(tools.iter().any(|t| t["name"] == "add_result"));

    let call = &responses["3"]["result"];
    assert!(call.get("isError").is_none());
    let case: Value = serde_json::from_str(call["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(case["title"], "Login works");
    assert_eq!(case["custom"]["custom_automated"], true);

    assert_eq!(responses["4"]["error"]["code"], -32602);
    assert_eq!(responses["null"]["error"]["code"], -32700);

    assert_eq!(mock.requests().len(), 1);
    assert_eq!(mock.requests()[0].query, "/api/v2/get_case/1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_lists_projects() {
    let mock = MockTestRail::start().await;
    mock.push_json(200, json!([{"id": 1, "name": "Web"}, {"id": 2, "name": "Mobile"}]));
    let base_url = mock.base_url();

    let output = tokio::task::spawn_blocking(move || {
        bin()
            .env("TESTRAIL_URL", base_url)
            .env("TESTRAIL_USERNAME", USERNAME)
            .env("TESTRAIL_API_KEY", API_KEY)
            .arg("check")
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 projects"));
    assert!(stdout.contains("Mobile"));
}
