use std::time::Duration;

use anyhow::{Result, bail};
use serde::Serialize;

use crate::config::{EngineConfig, LanguageProfile};
use crate::routes::{ExecutionRequest, ExecutionResult};

use super::{EngineResponse, normalize};

/// Source file name used when the language has no profile entry.
const FALLBACK_FILE_NAME: &str = "main.txt";

/// Version wildcard sent when no pinned version is known.
const VERSION_WILDCARD: &str = "*";

/// Memory ceilings are delegated entirely to the engine.
const UNBOUNDED_MEMORY: i64 = -1;

#[derive(Serialize)]
struct SubmissionFile<'a> {
    name: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Submission<'a> {
    language: &'a str,
    version: &'a str,
    files: Vec<SubmissionFile<'a>>,
    stdin: &'a str,
    args: &'a [String],
    compile_timeout: u64,
    run_timeout: u64,
    compile_memory_limit: i64,
    run_memory_limit: i64,
}

/// Client for the external sandbox execution engine.
///
/// One outbound call per execution request; no caching, no retries. Every
/// transport or engine failure is folded into a failed [`ExecutionResult`]
/// rather than propagated to the HTTP layer.
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
    compile_timeout: u64,
    run_timeout: u64,
    languages: Vec<LanguageProfile>,
}

impl EngineClient {
    pub fn new(config: &EngineConfig, languages: Vec<LanguageProfile>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            compile_timeout: config.compile_timeout_ms,
            run_timeout: config.run_timeout_ms,
            languages,
        }
    }

    /// Dispatch one submission and reduce the engine's answer to a uniform
    /// report. An unknown language id is forwarded to the engine unchanged
    /// with a wildcard version; the engine's own error is what the caller
    /// sees if it rejects the runtime.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let profile = self.languages.iter().find(|l| l.id == request.language);

        let (runtime, version, file_name) = match profile {
            Some(p) => (p.runtime.as_str(), p.version.as_str(), p.file_name.as_str()),
            None => (request.language.as_str(), VERSION_WILDCARD, FALLBACK_FILE_NAME),
        };

        let submission = Submission {
            language: runtime,
            version,
            files: vec![SubmissionFile {
                name: file_name,
                content: &request.code,
            }],
            stdin: &request.stdin,
            args: &request.args,
            compile_timeout: self.compile_timeout,
            run_timeout: self.run_timeout,
            compile_memory_limit: UNBOUNDED_MEMORY,
            run_memory_limit: UNBOUNDED_MEMORY,
        };

        match self.submit(&submission).await {
            Ok(response) => normalize(response.compile, response.run),
            Err(e) => {
                log::error!("Engine execution failed for {}: {e}", request.language);
                ExecutionResult::engine_failure(e.to_string())
            }
        }
    }

    /// Pass-through listing of the runtimes the engine has installed.
    pub async fn runtimes(&self) -> Result<serde_json::Value> {
        let url = format!("{}/api/v2/runtimes", self.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_millis(self.run_timeout + 2000))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("engine returned {}", response.status());
        }

        Ok(response.json().await?)
    }

    async fn submit(&self, submission: &Submission<'_>) -> Result<EngineResponse> {
        let url = format!("{}/api/v2/execute", self.base_url);

        // The engine enforces the per-stage timeouts; the transport timeout
        // only bounds a hung connection.
        let transport_timeout =
            Duration::from_millis(self.compile_timeout + self.run_timeout + 2000);

        let response = self
            .http
            .post(&url)
            .timeout(transport_timeout)
            .json(submission)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("execution rejected");
            bail!("engine returned {status}: {message}");
        }

        Ok(response.json().await?)
    }
}
