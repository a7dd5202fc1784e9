//! LLM Router - selects the provider from configuration

use std::sync::Arc;

use crate::provider::*;
use crate::types::*;

/// Selects and holds the configured LLM provider.
pub struct LlmRouter {
    provider: Arc<dyn LlmProvider>,
    kind: ProviderKind,
}

impl LlmRouter {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let kind = provider.kind();
        Self { provider, kind }
    }

    /// Create a router from environment variables.
    ///
    /// Reads `ZKREDEEM_LLM_PROVIDER` (`openai` by default); falls back to
    /// the deterministic provider when credentials are missing.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let provider_name =
            std::env::var("ZKREDEEM_LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let kind = ProviderKind::parse(&provider_name).unwrap_or(ProviderKind::OpenAi);

        Self::from_kind(kind)
    }

    pub fn from_kind(kind: ProviderKind) -> Self {
        let provider: Arc<dyn LlmProvider> = match kind {
            ProviderKind::OpenAi => {
                if let Some(p) = OpenAiProvider::from_env() {
                    Arc::new(p)
                } else {
                    tracing::warn!("OPENAI_API_KEY not found, using deterministic fallback");
                    Arc::new(DeterministicProvider::new())
                }
            }
            ProviderKind::Deterministic => Arc::new(DeterministicProvider::new()),
        };

        Self { provider, kind }
    }

    pub fn provider(&self) -> Arc<dyn LlmProvider> {
        self.provider.clone()
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }

    pub async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.provider.complete(request).await
    }
}

impl Default for LlmRouter {
    fn default() -> Self {
        Self::from_env()
    }
}
