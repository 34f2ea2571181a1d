//! LLM interaction: ask the model for receipt fields and parse its reply.
//!
//! The network boundary is the [`CompletionClient`] trait. Production code
//! uses [`LlmCompletionClient`], a thin adapter over an `edgequake-llm`
//! provider; tests inject a fake that returns canned replies, so the whole
//! pipeline runs without an API key. All prompt text lives in
//! [`crate::prompts`] and all reply parsing in [`super::parse`].
//!
//! There is no retry: a failed or timed-out call is one failed document,
//! recorded as an all-`N/A` row by the orchestrator.

use crate::config::IndexConfig;
use crate::error::{DocumentError, IndexError};
use crate::output::ParsedReceipt;
use crate::pipeline::parse::parse_reply;
use crate::prompts::{receipt_prompt, SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// One completion request: a system message, a user message and sampling knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A remote text-completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `request` and return the raw reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DocumentError>;
}

/// [`CompletionClient`] backed by an `edgequake-llm` provider.
pub struct LlmCompletionClient {
    provider: Arc<dyn LLMProvider>,
}

impl LlmCompletionClient {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CompletionClient for LlmCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DocumentError> {
        let messages = vec![
            ChatMessage::system(request.system.as_str()),
            ChatMessage::user(request.user.as_str()),
        ];
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| DocumentError::LlmFailed {
                detail: e.to_string(),
            })?;

        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Build the request for one receipt's text.
pub fn build_request(text: &str, config: &IndexConfig) -> CompletionRequest {
    CompletionRequest {
        system: config
            .system_prompt
            .clone()
            .unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
        user: receipt_prompt(text),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Ask the model for the fields of one receipt.
///
/// The call and the parse form one failure unit: any error here means the
/// whole row is `N/A`.
pub async fn extract_fields(
    client: &Arc<dyn CompletionClient>,
    text: &str,
    config: &IndexConfig,
) -> Result<ParsedReceipt, DocumentError> {
    let start = Instant::now();
    let request = build_request(text, config);

    let reply = timeout(
        Duration::from_secs(config.api_timeout_secs),
        client.complete(&request),
    )
    .await
    .map_err(|_| DocumentError::Timeout {
        secs: config.api_timeout_secs,
    })??;

    debug!("Reply in {:?}: {} chars", start.elapsed(), reply.len());

    parse_reply(&reply).inspect_err(|e| {
        warn!("Unusable reply ({}): {:?}", e, truncate(&reply, 200));
    })
}

/// Environment variable holding the API key for `provider`, if it needs one.
pub fn credential_env_var(provider: &str) -> Option<&'static str> {
    match provider.to_ascii_lowercase().as_str() {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "gemini" => Some("GEMINI_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        _ => None,
    }
}

/// Resolve the completion client, from most-specific to least-specific.
///
/// 1. **Pre-built client** (`config.client`): used as-is. This is how tests
///    and embedding applications inject a fake or a wrapped client.
/// 2. **Named provider + model**: `config.provider_name` (default
///    `openai`) and `config.model` (default `gpt-4o-mini`) go through
///    [`ProviderFactory::create_llm_provider`], which reads the provider's
///    API key from the environment. A missing key is reported here, before
///    any output file is touched.
pub fn resolve_client(config: &IndexConfig) -> Result<Arc<dyn CompletionClient>, IndexError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    let provider_name = config.provider_or_default();
    let model = config.model_or_default();

    if let Some(var) = credential_env_var(provider_name) {
        let present = std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false);
        if !present {
            return Err(IndexError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("API key not found. Please set the {var} environment variable."),
            });
        }
    }

    let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        IndexError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })?;

    debug!("Using provider '{}' with model '{}'", provider_name, model);
    Ok(Arc::new(LlmCompletionClient::new(provider)))
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\u{2026}", &s[..idx]),
        None => s.to_string(),
    }
}
