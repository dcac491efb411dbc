//! Triplex Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for local runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Instruction sent ahead of the document text to the generative model.
pub const DEFAULT_PROMPT_PREFIX: &str = "Read the following text and extract triplets of \
(Subject, Relation, Object), where each of them is a span of text. The Subject and Object \
slot fillers are names (proper nouns), and the Relation slot filler is a verb or a verb \
along with a preposition. Return only the relations you find, each in a separate line and \
formatted as follows: [Subject, Relation, Object]. The text is: ";

/// Field separator the prompt asks the model to use inside each bracketed line.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Article source configuration
    pub article: ArticleConfig,

    /// External-model extraction contract
    pub extraction: ExtractionConfig,

    /// Evaluation harness configuration
    pub evaluation: EvaluationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // LLM
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider.parse()?;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.llm.gemini_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.openai_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.llm.ollama_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.llm.model = Some(model);
        }

        // Article source
        if let Ok(url) = std::env::var("WIKIPEDIA_URL") {
            config.article.wikipedia_url = url;
        }

        // Evaluation
        if let Ok(samples) = std::env::var("EVAL_SAMPLES") {
            config.evaluation.num_samples =
                samples.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "EVAL_SAMPLES".to_string(),
                    value: samples,
                })?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError { path, message },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.llm.provider != defaults.llm.provider {
            self.llm.provider = env_config.llm.provider;
        }
        if env_config.llm.model.is_some() {
            self.llm.model = env_config.llm.model;
        }
        if env_config.llm.ollama_url != defaults.llm.ollama_url {
            self.llm.ollama_url = env_config.llm.ollama_url;
        }
        if env_config.article.wikipedia_url != defaults.article.wikipedia_url {
            self.article.wikipedia_url = env_config.article.wikipedia_url;
        }
        if env_config.evaluation.num_samples != defaults.evaluation.num_samples {
            self.evaluation.num_samples = env_config.evaluation.num_samples;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }

        // Always use env for sensitive values
        if env_config.llm.gemini_api_key.is_some() {
            self.llm.gemini_api_key = env_config.llm.gemini_api_key;
        }
        if env_config.llm.openai_api_key.is_some() {
            self.llm.openai_api_key = env_config.llm.openai_api_key;
        }

        Ok(self)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM provider to use
    pub provider: LlmProvider,

    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Gemini API base URL
    pub gemini_base_url: String,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for compatible APIs)
    pub openai_base_url: Option<String>,

    /// Ollama server URL
    pub ollama_url: String,

    /// Model name; the provider's default model when unset
    pub model: Option<String>,

    /// Maximum tokens for completion
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Whether the configured provider has the credentials it needs
    pub fn is_usable(&self) -> bool {
        match self.provider {
            LlmProvider::Gemini => self.gemini_api_key.is_some(),
            LlmProvider::OpenAI => self.openai_api_key.is_some(),
            LlmProvider::Ollama => true,
        }
    }

    /// Configured model, or the provider's default
    pub fn resolved_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            openai_api_key: None,
            openai_base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
            model: None,
            max_tokens: 2048,
            temperature: 0.1,
            timeout_secs: 60,
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    OpenAI,
    Ollama,
}

impl LlmProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash",
            Self::OpenAI => "gpt-4o-mini",
            Self::Ollama => "llama3",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAI => write!(f, "openai"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// Article source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    /// Base URL of the MediaWiki site
    pub wikipedia_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            wikipedia_url: "https://en.wikipedia.org".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Prompt and reply format for the external-model extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Instruction placed before the document text
    pub prompt_prefix: String,

    /// Separator between the three fields of a reply line
    pub separator: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            prompt_prefix: DEFAULT_PROMPT_PREFIX.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// Evaluation harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Records sampled per extractor and document
    pub num_samples: usize,

    /// Articles `fetch` downloads when no title is given
    pub titles: Vec<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            num_samples: 5,
            titles: vec![
                "Bradley Pitt".to_string(),
                "Donald Trump".to_string(),
                "J.K. Rowling".to_string(),
            ],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
