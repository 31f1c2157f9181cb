//! Configuration management for Syllabus.
//!
//! Configuration is merged from several layers, lowest precedence first:
//! - Built-in defaults
//! - The workspace config file (`.syllabus/config.yaml`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the completion factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["anthropic", "claude", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .syllabus/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider ("anthropic", "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// API key for the completion provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Folder of course documents loaded at startup
    pub docs_path: PathBuf,

    /// Retrieval and generation tuning
    pub rag: RagSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider configurations from the config file
    pub providers: HashMap<String, ProviderConfig>,
}

/// Tuning knobs for ingestion, retrieval and generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Maximum characters per chunk
    #[serde(rename = "chunkSize")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    #[serde(rename = "chunkOverlap")]
    pub chunk_overlap: usize,

    /// Passages returned by one search
    #[serde(rename = "maxResults")]
    pub max_results: usize,

    /// Exchanges remembered per session
    #[serde(rename = "maxHistory")]
    pub max_history: usize,

    /// Completion token cap
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Caller-side timeout around a whole query
    #[serde(rename = "queryTimeoutSecs")]
    pub query_timeout_secs: u64,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            max_results: 5,
            max_history: 2,
            max_tokens: 800,
            temperature: 0.0,
            query_timeout_secs: 60,
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Anthropic {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Anthropic { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// `anthropic-version` header override, if any.
    pub fn api_version(&self) -> Option<&str> {
        match self {
            Self::Anthropic { api_version, .. } => api_version.as_deref(),
            Self::Ollama { .. } => None,
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Anthropic { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
    rag: Option<RagSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    #[serde(rename = "activeProvider")]
    active_provider: String,
    #[serde(default)]
    providers: HashMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
    docs: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: None,
            docs_path: PathBuf::from("docs"),
            rag: RagSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
            providers: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment.
    ///
    /// Environment variables:
    /// - `SYLLABUS_WORKSPACE`: Override workspace path
    /// - `SYLLABUS_CONFIG`: Path to config file
    /// - `SYLLABUS_PROVIDER`: Completion provider
    /// - `SYLLABUS_MODEL`: Model identifier
    /// - `SYLLABUS_DOCS`: Course documents folder
    /// - `ANTHROPIC_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("SYLLABUS_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("SYLLABUS_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.syllabus_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        if let Ok(provider) = std::env::var("SYLLABUS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("SYLLABUS_MODEL") {
            config.model = model;
        }

        if let Ok(docs) = std::env::var("SYLLABUS_DOCS") {
            config.docs_path = PathBuf::from(docs);
        }

        config.api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok().or(config.log_level);

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
            if let Some(docs) = ws.docs {
                result.docs_path = PathBuf::from(docs);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(rag) = config_file.rag {
            result.rag = rag;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }
            result.providers = llm.providers;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        docs: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(docs) = docs {
            self.docs_path = docs;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .syllabus directory.
    pub fn syllabus_dir(&self) -> PathBuf {
        self.workspace.join(".syllabus")
    }

    /// Course documents folder, resolved against the workspace when relative.
    pub fn resolved_docs_path(&self) -> PathBuf {
        if self.docs_path.is_absolute() {
            self.docs_path.clone()
        } else {
            self.workspace.join(&self.docs_path)
        }
    }

    /// Get the configuration block for a provider.
    pub fn provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }

    /// Resolve the API key: explicit key first, then the provider's `apiKeyEnv`.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.provider_config(provider) {
            Some(ProviderConfig::Anthropic { api_key_env, .. }) => std::env::var(api_key_env).ok(),
            _ => None,
        }
    }

    /// Validate configuration for the active provider and tuning values.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.rag.max_results == 0 {
            return Err(AppError::Config(
                "maxResults must be greater than 0, otherwise every search comes back empty"
                    .to_string(),
            ));
        }

        if self.rag.chunk_size == 0 || self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than a non-zero chunkSize ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }

        Ok(())
    }
}
