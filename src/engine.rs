mod client;
mod normalize;

pub use client::EngineClient;
pub use normalize::normalize;

use serde::Deserialize;

/// Output of a single engine stage (compile or run).
///
/// The engine omits the compile stage for interpreted languages and the run
/// stage when compilation fails, so both appear as options on the response.
/// `code` is absent when the process was killed by a signal.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct StageOutput {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub signal: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct EngineResponse {
    pub compile: Option<StageOutput>,
    pub run: Option<StageOutput>,
}
