use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "codebench", version = "1.0", about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file; built-in defaults are used when omitted
    #[arg(long = "config", short = 'c')]
    pub config_path: Option<String>,

    /// Whether to flush the existing database
    #[arg(long = "flush-data", short = 'f', default_value_t = false)]
    pub flush_data: bool,
}

impl CliArgs {
    /// Load the configuration from the specified file, or fall back to defaults
    pub fn to_config(&self) -> anyhow::Result<Config> {
        match &self.config_path {
            Some(path) => {
                let file = std::fs::File::open(path)?;
                let reader = std::io::BufReader::new(file);
                Ok(serde_json::from_reader(reader)?)
            }
            None => Ok(Config::default()),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default = "builtin_languages")]
    pub languages: Vec<LanguageProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            engine: EngineConfig::default(),
            languages: builtin_languages(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the sandbox execution engine
    #[serde(default = "default_engine_url")]
    pub base_url: String,
    #[serde(default = "default_stage_timeout_ms")]
    pub compile_timeout_ms: u64,
    #[serde(default = "default_stage_timeout_ms")]
    pub run_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_engine_url(),
            compile_timeout_ms: default_stage_timeout_ms(),
            run_timeout_ms: default_stage_timeout_ms(),
        }
    }
}

fn default_engine_url() -> String {
    "http://localhost:2000".to_string()
}

fn default_stage_timeout_ms() -> u64 {
    3000
}

/// Static mapping from an editor language id to the engine runtime that
/// executes it, the version to pin, and the canonical source file name.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LanguageProfile {
    pub id: String,
    pub runtime: String,
    pub version: String,
    pub file_name: String,
}

impl LanguageProfile {
    fn new(id: &str, runtime: &str, version: &str, file_name: &str) -> Self {
        Self {
            id: id.to_string(),
            runtime: runtime.to_string(),
            version: version.to_string(),
            file_name: file_name.to_string(),
        }
    }
}

/// The built-in language table. C and C++ both run on the engine's gcc
/// runtime, C# on dotnet; entry-point file names are capitalized where the
/// toolchain requires a matching public class.
pub fn builtin_languages() -> Vec<LanguageProfile> {
    vec![
        LanguageProfile::new("javascript", "javascript", "18.15.0", "main.js"),
        LanguageProfile::new("typescript", "typescript", "5.0.3", "main.ts"),
        LanguageProfile::new("python", "python", "3.10.0", "main.py"),
        LanguageProfile::new("java", "java", "15.0.2", "Main.java"),
        LanguageProfile::new("cpp", "gcc", "10.2.0", "main.cpp"),
        LanguageProfile::new("c", "gcc", "10.2.0", "main.c"),
        LanguageProfile::new("csharp", "dotnet", "6.12.0", "Main.cs"),
        LanguageProfile::new("go", "go", "1.16.2", "main.go"),
        LanguageProfile::new("rust", "rust", "1.68.2", "main.rs"),
        LanguageProfile::new("ruby", "ruby", "3.0.1", "main.rb"),
        LanguageProfile::new("php", "php", "8.2.3", "main.php"),
        LanguageProfile::new("swift", "swift", "5.3.3", "main.swift"),
        LanguageProfile::new("kotlin", "kotlin", "1.8.20", "Main.kt"),
        LanguageProfile::new("bash", "bash", "5.2.0", "main.sh"),
    ]
}
