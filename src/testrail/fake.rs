//! Scripted in-memory transport for unit tests.

use super::error::TestRailError;
use super::transport::Transport;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    Post(String, Value),
    Upload(String, PathBuf),
}

impl Call {
    pub fn endpoint(&self) -> &str {
        match self {
            Call::Get(e) | Call::Post(e, _) | Call::Upload(e, _) => e,
        }
    }
}

/// Replays queued responses in order and records every call
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<Value, TestRailError>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Result<Value, TestRailError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn ok(self, body: Value) -> Self {
        self.respond(Ok(body))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: Call) -> Result<Value, TestRailError> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TestRailError::local("no scripted response")))
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, endpoint: &str) -> Result<Value, TestRailError> {
        self.next(Call::Get(endpoint.to_string()))
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Value, TestRailError> {
        self.next(Call::Post(endpoint.to_string(), body))
    }

    async fn upload(&self, endpoint: &str, file_path: &Path) -> Result<Value, TestRailError> {
        self.next(Call::Upload(endpoint.to_string(), file_path.to_path_buf()))
    }
}
