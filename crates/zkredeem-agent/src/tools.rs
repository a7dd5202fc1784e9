//! The concrete toolsets
//!
//! Two registries exist, built per run:
//! - chat runs get the two proof-request tools only;
//! - disbursement runs additionally get `transfer_reward`.
//!
//! The system prompts mirror the split: the chat prompt tells the model it
//! cannot transfer and should offer proof generation instead.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use zkredeem_llm::ToolSpec;
use zkredeem_types::{EventKind, Platform};

use crate::tool::{AgentTool, ToolError, ToolRegistry};
use crate::wallet::{TransferRequest, WalletClient};

/// System prompt for chat-originated runs (no transfer capability).
pub const CHAT_PROMPT: &str = "You are a helpful agent that redeems loyalty rewards for on-chain tokens. \
You cannot transfer rewards yourself. Help users redeem their Amazon or Flipkart reward balance: \
ask them to choose a platform, then call generate_proof_request_amazon or \
generate_proof_request_flipkart to produce a proof request they can scan.";

/// System prompt for proof-driven disbursement runs.
pub const DISBURSEMENT_PROMPT: &str = "You are a helpful agent that redeems loyalty rewards for on-chain tokens. \
A verified balance proof has been received. Use the transfer_reward tool to send the reward \
to the user's address, then report the transaction link.";

// ============================================================================
// transfer_reward
// ============================================================================

/// The transfer capability, exposed to disbursement runs only.
pub struct TransferRewardTool {
    wallet: Arc<dyn WalletClient>,
}

impl TransferRewardTool {
    pub fn new(wallet: Arc<dyn WalletClient>) -> Self {
        Self { wallet }
    }
}

#[derive(Deserialize)]
struct TransferArgs {
    platform: Platform,
    amount: String,
    address: String,
}

#[async_trait]
impl AgentTool for TransferRewardTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "transfer_reward".to_string(),
            description: "Transfers a reward to a specified address".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "platform": {
                        "type": "string",
                        "enum": ["amazon", "flipkart"],
                        "description": "The platform from which the reward is to be transferred"
                    },
                    "amount": {
                        "type": "string",
                        "description": "The amount of reward to be transferred"
                    },
                    "address": {
                        "type": "string",
                        "description": "The address to which the reward is to be transferred"
                    }
                },
                "required": ["platform", "amount", "address"]
            }),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let args: TransferArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let receipt = self
            .wallet
            .transfer(&TransferRequest {
                platform: args.platform,
                amount: args.amount,
                address: args.address,
            })
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        Ok(receipt.link)
    }
}

// ============================================================================
// generate_proof_request_{amazon,flipkart}
// ============================================================================

/// Proof-provider settings shared by the proof-request tools.
#[derive(Debug, Clone)]
pub struct ProofRequestSettings {
    pub app_id: String,
    pub amazon_provider_id: String,
    pub flipkart_provider_id: String,
    /// Public URL of this server's `/receive-proofs` endpoint
    pub callback_url: String,
}

impl ProofRequestSettings {
    pub fn from_env() -> Self {
        Self {
            app_id: std::env::var("RECLAIM_APP_ID").unwrap_or_default(),
            amazon_provider_id: std::env::var("AMAZON_PROVIDER_ID").unwrap_or_default(),
            flipkart_provider_id: std::env::var("FLIPKART_PROVIDER_ID").unwrap_or_default(),
            callback_url: std::env::var("ZKREDEEM_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:3000/receive-proofs".to_string()),
        }
    }
}

/// Produces the proof-request configuration a client renders as a QR code.
///
/// Output is surfaced as a `Qr` event: the kind is the explicit signal that
/// the payload is a proof-request config, so clients never sniff content.
pub struct GenerateProofRequestTool {
    platform: Platform,
    settings: ProofRequestSettings,
}

impl GenerateProofRequestTool {
    pub fn new(platform: Platform, settings: ProofRequestSettings) -> Self {
        Self { platform, settings }
    }
}

#[async_trait]
impl AgentTool for GenerateProofRequestTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: format!("generate_proof_request_{}", self.platform),
            description: format!("Generates a balance proof request for {}", self.platform),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }

    fn event_kind(&self) -> EventKind {
        EventKind::Qr
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        let provider_id = match self.platform {
            Platform::Amazon => &self.settings.amazon_provider_id,
            Platform::Flipkart => &self.settings.flipkart_provider_id,
        };

        let config = serde_json::json!({
            "applicationId": self.settings.app_id,
            "providerId": provider_id,
            "sessionId": Uuid::new_v4().to_string(),
            "callbackUrl": self.settings.callback_url,
            "platform": self.platform,
        });

        serde_json::to_string(&config).map_err(|e| ToolError::Execution(e.to_string()))
    }
}

// ============================================================================
// Registry builders
// ============================================================================

/// Toolset for chat-originated runs. No transfer capability.
pub fn chat_tools(settings: &ProofRequestSettings) -> ToolRegistry {
    ToolRegistry::new()
        .register(Arc::new(GenerateProofRequestTool::new(
            Platform::Amazon,
            settings.clone(),
        )))
        .register(Arc::new(GenerateProofRequestTool::new(
            Platform::Flipkart,
            settings.clone(),
        )))
}

/// Toolset for proof-driven disbursement runs.
pub fn disbursement_tools(
    settings: &ProofRequestSettings,
    wallet: Arc<dyn WalletClient>,
) -> ToolRegistry {
    chat_tools(settings).register(Arc::new(TransferRewardTool::new(wallet)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::MockWallet;

    fn settings() -> ProofRequestSettings {
        ProofRequestSettings {
            app_id: "app-1".to_string(),
            amazon_provider_id: "prov-amazon".to_string(),
            flipkart_provider_id: "prov-flipkart".to_string(),
            callback_url: "https://example.test/receive-proofs".to_string(),
        }
    }

    #[test]
    fn test_chat_tools_never_include_transfer() {
        let registry = chat_tools(&settings());
        assert!(!registry.contains("transfer_reward"));
        assert!(registry.contains("generate_proof_request_amazon"));
        assert!(registry.contains("generate_proof_request_flipkart"));
    }

    #[test]
    fn test_disbursement_tools_include_transfer() {
        let registry = disbursement_tools(&settings(), Arc::new(MockWallet::new()));
        assert!(registry.contains("transfer_reward"));
    }

    #[tokio::test]
    async fn test_transfer_tool_executes_wallet_transfer() {
        let wallet = Arc::new(MockWallet::new());
        let tool = TransferRewardTool::new(wallet.clone());

        let link = tool
            .execute(serde_json::json!({
                "platform": "amazon",
                "amount": "1500",
                "address": "0xABC"
            }))
            .await
            .unwrap();

        assert!(link.starts_with("https://"));
        let transfers = wallet.transfers();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].amount, "1500");
        assert_eq!(transfers[0].platform, Platform::Amazon);
    }

    #[tokio::test]
    async fn test_transfer_tool_rejects_bad_arguments() {
        let tool = TransferRewardTool::new(Arc::new(MockWallet::new()));
        let err = tool
            .execute(serde_json::json!({"platform": "ebay", "amount": "1", "address": "0x1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_proof_request_tool_emits_qr_payload() {
        let tool = GenerateProofRequestTool::new(Platform::Amazon, settings());
        assert_eq!(tool.event_kind(), EventKind::Qr);

        let payload = tool.execute(serde_json::json!({})).await.unwrap();
        let config: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(config["providerId"], "prov-amazon");
        assert_eq!(config["callbackUrl"], "https://example.test/receive-proofs");
        assert_eq!(config["platform"], "amazon");
    }
}
