//! Engine configuration.
//!
//! Plain structs with serde defaults, so they work equally as literal Rust
//! values and as sections of a TOML file.  Timeouts and delays are written
//! as integer seconds in config files.
//!
//! ```toml
//! [task_service]
//! max_iterations = 10
//! parallel_tool_calls = false
//!
//! [llm]
//! base_url = "http://localhost:8080"
//! model = "gpt-4o-mini"
//! llm_timeout = 120
//!
//! [store]
//! backend = { kind = "json_file", path = "/var/lib/axle/state.json" }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AgentError, Result};
use crate::hooks::Hooks;

/// (De)serialize a [`Duration`] as integer seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// ---------------------------------------------------------------------------
// Task service
// ---------------------------------------------------------------------------

/// Configuration for the task service.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TaskServiceConfig {
    /// Iteration bound stamped onto agents whose own cap is unset (0).
    pub max_iterations: u32,

    /// Dispatch all tool calls of one assistant turn concurrently.
    pub parallel_tool_calls: bool,

    /// Lifecycle hooks.  Not configurable from files.
    #[serde(skip)]
    pub hooks: Hooks,
}

impl Default for TaskServiceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            parallel_tool_calls: false,
            hooks: Hooks::none(),
        }
    }
}

// ---------------------------------------------------------------------------
// LLM client
// ---------------------------------------------------------------------------

/// Configuration for the OpenAI-compatible chat client.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the endpoint; `/v1/chat/completions` is appended.
    pub base_url: String,

    /// Bearer token.  Empty disables the Authorization header (local
    /// servers).
    pub api_key: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Timeout applied by the HTTP client itself.
    #[serde(with = "duration_secs")]
    pub http_timeout: Duration,

    /// Overall per-call timeout (outermost wrapper input).
    #[serde(with = "duration_secs")]
    pub llm_timeout: Duration,

    /// Total attempts per call (1 = no retries).
    pub retry_attempts: u32,

    /// Delay between attempts.
    #[serde(with = "duration_secs")]
    pub retry_delay: Duration,

    /// Consecutive failures before the circuit opens (0 disables).
    pub breaker_threshold: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: String::new(),
            http_timeout: Duration::from_secs(60),
            llm_timeout: Duration::from_secs(120),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
            breaker_threshold: 5,
        }
    }
}

/// Configuration for the OpenAI-compatible embeddings client.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of the endpoint; `/v1/embeddings` is appended.
    pub base_url: String,

    /// Bearer token.  Empty disables the Authorization header.
    pub api_key: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Per-call timeout.
    #[serde(with = "duration_secs")]
    pub embed_timeout: Duration,

    /// Total attempts per call (1 = no retries).
    pub retry_attempts: u32,

    /// Delay between attempts.
    #[serde(with = "duration_secs")]
    pub retry_delay: Duration,

    /// Consecutive failures before the circuit opens (0 disables).
    pub breaker_threshold: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: String::new(),
            embed_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
            breaker_threshold: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Tool executor
// ---------------------------------------------------------------------------

/// Configuration for the tool executor.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ToolExecutorConfig {
    /// Per-invocation timeout for tool handlers.
    #[serde(with = "duration_secs")]
    pub tool_timeout: Duration,
}

impl Default for ToolExecutorConfig {
    fn default() -> Self {
        Self {
            tool_timeout: Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Which backend the stores run on.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local, lost on restart.
    InMemory,
    /// Whole-map JSON file.
    JsonFile { path: PathBuf },
    /// Whole-map YAML file.
    YamlFile { path: PathBuf },
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::InMemory
    }
}

/// Configuration for the storage layer.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Selected backend.
    pub backend: StoreBackend,
}

// ---------------------------------------------------------------------------
// Top-level file shape
// ---------------------------------------------------------------------------

/// Every engine config section under one roof, for TOML loading.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AxleConfig {
    pub task_service: TaskServiceConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub tool_executor: ToolExecutorConfig,
    pub store: StoreConfig,
}

impl AxleConfig {
    /// Parse a TOML document; absent sections and fields keep defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| AgentError::Config {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = AxleConfig::default();
        assert_eq!(config.task_service.max_iterations, 10);
        assert!(!config.task_service.parallel_tool_calls);
        assert_eq!(config.llm.http_timeout, Duration::from_secs(60));
        assert_eq!(config.llm.llm_timeout, Duration::from_secs(120));
        assert_eq!(config.llm.retry_attempts, 3);
        assert_eq!(config.llm.breaker_threshold, 5);
        assert_eq!(config.embedding.embed_timeout, Duration::from_secs(30));
        assert_eq!(config.tool_executor.tool_timeout, Duration::from_secs(30));
        assert_eq!(config.store.backend, StoreBackend::InMemory);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = AxleConfig::from_toml_str(
            r#"
            [task_service]
            max_iterations = 3
            parallel_tool_calls = true

            [llm]
            base_url = "http://localhost:8080"
            model = "local-model"
            llm_timeout = 30

            [store]
            backend = { kind = "yaml_file", path = "/tmp/axle.yaml" }
            "#,
        )
        .unwrap();

        assert_eq!(config.task_service.max_iterations, 3);
        assert!(config.task_service.parallel_tool_calls);
        assert_eq!(config.llm.base_url, "http://localhost:8080");
        assert_eq!(config.llm.llm_timeout, Duration::from_secs(30));
        // Untouched sections keep defaults.
        assert_eq!(config.tool_executor.tool_timeout, Duration::from_secs(30));
        assert_eq!(
            config.store.backend,
            StoreBackend::YamlFile {
                path: PathBuf::from("/tmp/axle.yaml")
            }
        );
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = AxleConfig::from_toml_str("not = [valid").unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
