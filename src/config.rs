//! Configuration types for both batch tools.
//!
//! [`IndexConfig`] drives the receipt indexer and [`ArchiveConfig`] the email
//! archive converter. Both are built via a builder so callers set only what
//! they care about and rely on documented defaults for the rest.

use crate::error::IndexError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::llm::CompletionClient;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Model used when neither the caller nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Provider used when neither the caller nor the environment names one.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Configuration for a receipt-index build.
///
/// # Example
/// ```rust
/// use docbatch::IndexConfig;
///
/// let config = IndexConfig::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 150);
/// ```
#[derive(Clone)]
pub struct IndexConfig {
    /// LLM model identifier. If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, uses [`DEFAULT_PROVIDER`].
    pub provider_name: Option<String>,

    /// Pre-constructed completion client. Takes precedence over `provider_name`.
    pub client: Option<Arc<dyn CompletionClient>>,

    /// Text extractor. If None, uses [`crate::pipeline::extract::PdfTextExtractor`].
    pub extractor: Option<Arc<dyn TextExtractor>>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Field extraction wants the same answer for the same receipt, so this
    /// stays close to zero.
    pub temperature: f32,

    /// Maximum tokens the model may generate per receipt. Default: 150.
    ///
    /// The expected reply is a four-key JSON object; 150 tokens fits it with
    /// room for a long merchant description.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses [`crate::prompts::SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// File extension of source documents, compared case-insensitively. Default: "pdf".
    pub extension: String,

    /// Per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            client: None,
            extractor: None,
            temperature: 0.2,
            max_tokens: 150,
            system_prompt: None,
            api_timeout_secs: 60,
            extension: "pdf".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for IndexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("client", &self.client.as_ref().map(|_| "<dyn CompletionClient>"))
            .field(
                "extractor",
                &self.extractor.as_ref().map(|_| "<dyn TextExtractor>"),
            )
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("extension", &self.extension)
            .finish()
    }
}

impl IndexConfig {
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn provider_or_default(&self) -> &str {
        self.provider_name.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }
}

/// Builder for [`IndexConfig`].
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl fmt::Debug for IndexConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl IndexConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.config.extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<IndexConfig, IndexError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(IndexError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(IndexError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.extension.is_empty() {
            return Err(IndexError::InvalidConfig(
                "Document extension must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Email archive ────────────────────────────────────────────────────────

/// Configuration for an email archive conversion.
#[derive(Clone)]
pub struct ArchiveConfig {
    /// TrueType font used for every PDF. Default: None (built-in Helvetica).
    ///
    /// Helvetica only covers Latin-1, so text is folded to ASCII when no
    /// font is given. Point this at e.g. `DejaVuSans.ttf` to keep accents and
    /// non-Latin scripts.
    pub font_path: Option<PathBuf>,

    /// File name of the archive index inside the output directory. Default: "index.pdf".
    pub index_file_name: String,

    /// Per-message progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            index_file_name: "index.pdf".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ArchiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveConfig")
            .field("font_path", &self.font_path)
            .field("index_file_name", &self.index_file_name)
            .finish()
    }
}

impl ArchiveConfig {
    pub fn builder() -> ArchiveConfigBuilder {
        ArchiveConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ArchiveConfig`].
pub struct ArchiveConfigBuilder {
    config: ArchiveConfig,
}

impl ArchiveConfigBuilder {
    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn index_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_file_name = name.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn build(self) -> ArchiveConfig {
        self.config
    }
}
