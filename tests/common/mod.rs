//! Shared helpers for router tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use fs_api_server::auth::{CredentialStore, StaticAuthenticator};
use fs_api_server::config::ServerConfig;
use fs_api_server::error::ExecError;
use fs_api_server::shell::{CommandOutput, CommandRunner, CommandSpec};
use fs_api_server::{AppState, create_router};
use http_body_util::BodyExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const USER: &str = "alice";
pub const PASSWORD: &str = "alice123";
/// `alice:alice123`
pub const BASIC_AUTH: &str = "Basic YWxpY2U6YWxpY2UxMjM=";
/// `alice:wrong`
pub const BAD_AUTH: &str = "Basic YWxpY2U6d3Jvbmc=";

/// Replays canned command results and records every invocation.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<Result<CommandOutput, ExecError>>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new(responses: Vec<Result<CommandOutput, ExecError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::default(),
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, ExecError> {
        self.calls.lock().unwrap().push(spec);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CommandOutput::default()))
    }
}

pub fn ok(stdout: &str) -> Result<CommandOutput, ExecError> {
    Ok(CommandOutput {
        stdout: stdout.as_bytes().to_vec(),
        ..Default::default()
    })
}

pub fn fail(stderr: &str) -> Result<CommandOutput, ExecError> {
    Err(ExecError::Failed {
        code: 1,
        stderr: stderr.into(),
    })
}

/// Configuration allowing `roots`, with impersonation disabled.
pub fn test_config(roots: &[&str]) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.filesystem.supported_paths = roots.iter().map(|r| r.to_string()).collect();
    config.filesystem.impersonate = false;
    config
}

pub fn router(config: ServerConfig, runner: Arc<dyn CommandRunner>) -> Router {
    let authenticator = Arc::new(StaticAuthenticator::new(
        CredentialStore::from([(USER, PASSWORD)]),
        256,
    ));
    create_router(AppState::new(config, runner, authenticator))
}

pub fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, BASIC_AUTH)
}

/// Multipart request sending `files` under the `files` field.
pub fn multipart(method: &str, uri: &str, files: &[(&str, &str)]) -> Request<Body> {
    const BOUNDARY: &str = "X-TEST-BOUNDARY";
    let mut body = Vec::new();
    for (name, content) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, BASIC_AUTH)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
