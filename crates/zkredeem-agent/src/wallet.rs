//! Wallet capability
//!
//! The blockchain side of a disbursement, behind a trait. The production
//! client talks to the wallet platform's REST API and invokes the reward
//! token's `transfer(to, amount)`; tests use `MockWallet`. Transfer
//! idempotency is the platform's concern - this layer submits once and
//! reports the outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use zkredeem_types::Platform;

/// Reward token contract invoked for every disbursement.
pub const REWARD_TOKEN_ADDRESS: &str = "0x9c19f922ea67698098d81154e113350810c96422";

/// Errors raised by the wallet capability
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid amount '{0}': expected a decimal token quantity")]
    InvalidAmount(String),

    #[error("Wallet platform request failed: {0}")]
    Request(String),

    #[error("Wallet platform rejected the transfer: {0}")]
    Rejected(String),
}

/// A transfer the agent has authorized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Platform the reward was redeemed from
    pub platform: Platform,
    /// Token quantity as a decimal string
    pub amount: String,
    /// Destination address
    pub address: String,
}

/// Outcome of a submitted transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Transaction hash on the target network
    pub transaction_hash: String,
    /// Explorer link clients can follow
    pub link: String,
}

/// The on-chain transfer capability.
#[async_trait]
pub trait WalletClient: Send + Sync {
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, WalletError>;
}

/// Scale a decimal token amount to an 18-decimal integer string.
///
/// Accepts `"1500"` and `"1500.25"`; rejects empty, non-numeric, and
/// over-precise inputs.
pub fn to_wei(amount: &str) -> Result<String, WalletError> {
    let invalid = || WalletError::InvalidAmount(amount.to_string());

    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || fraction.len() > 18
    {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction_scaled: u128 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{fraction:0<18}");
        padded.parse().map_err(|_| invalid())?
    };

    let wei = whole
        .checked_mul(1_000_000_000_000_000_000)
        .and_then(|w| w.checked_add(fraction_scaled))
        .ok_or_else(invalid)?;
    Ok(wei.to_string())
}

// ============================================================================
// Wallet platform client
// ============================================================================

/// Configuration for the wallet platform client
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub api_key_name: String,
    pub api_key_secret: String,
    pub wallet_id: String,
    /// Network the transfer executes on
    pub network_id: String,
    pub base_url: String,
}

impl WalletConfig {
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_key_name: std::env::var("CDP_API_KEY_NAME").ok()?,
            api_key_secret: std::env::var("CDP_API_KEY_PRIVATE_KEY").ok()?,
            wallet_id: std::env::var("WALLET_ID").unwrap_or_default(),
            network_id: std::env::var("NETWORK_ID")
                .unwrap_or_else(|_| "base-sepolia".to_string()),
            base_url: std::env::var("ZKREDEEM_WALLET_URL")
                .unwrap_or_else(|_| "https://api.cdp.coinbase.com/platform".to_string()),
        })
    }
}

/// HTTP client for the wallet platform's contract-invocation API.
pub struct PlatformWalletClient {
    config: WalletConfig,
    client: reqwest::Client,
}

impl PlatformWalletClient {
    pub fn new(config: WalletConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn explorer_link(&self, hash: &str) -> String {
        match self.config.network_id.as_str() {
            "base-sepolia" => format!("https://sepolia.basescan.org/tx/{hash}"),
            "base-mainnet" => format!("https://basescan.org/tx/{hash}"),
            network => format!("https://{network}/tx/{hash}"),
        }
    }
}

#[derive(Serialize)]
struct InvocationRequest<'a> {
    contract_address: &'a str,
    method: &'a str,
    network_id: &'a str,
    args: InvocationArgs<'a>,
}

#[derive(Serialize)]
struct InvocationArgs<'a> {
    to: &'a str,
    amount: String,
}

#[derive(Deserialize)]
struct InvocationResponse {
    transaction_hash: String,
}

#[async_trait]
impl WalletClient for PlatformWalletClient {
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, WalletError> {
        let amount = to_wei(&request.amount)?;

        let url = format!(
            "{}/v2/wallets/{}/invocations",
            self.config.base_url, self.config.wallet_id
        );
        let body = InvocationRequest {
            contract_address: REWARD_TOKEN_ADDRESS,
            method: "transfer",
            network_id: &self.config.network_id,
            args: InvocationArgs {
                to: &request.address,
                amount,
            },
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.api_key_name, Some(&self.config.api_key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::Rejected(format!("HTTP {status}: {body}")));
        }

        let invocation: InvocationResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Request(e.to_string()))?;

        tracing::info!(
            tx = %invocation.transaction_hash,
            to = %request.address,
            amount = %request.amount,
            platform = %request.platform,
            "reward transfer submitted"
        );

        Ok(TransferReceipt {
            link: self.explorer_link(&invocation.transaction_hash),
            transaction_hash: invocation.transaction_hash,
        })
    }
}

// ============================================================================
// Mock wallet (tests, local development)
// ============================================================================

/// Records transfers instead of executing them.
#[derive(Debug, Default)]
pub struct MockWallet {
    transfers: std::sync::Mutex<Vec<TransferRequest>>,
    fail_with: Option<String>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A wallet whose every transfer fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            transfers: std::sync::Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().expect("mock wallet lock").clone()
    }
}

#[async_trait]
impl WalletClient for MockWallet {
    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, WalletError> {
        if let Some(ref message) = self.fail_with {
            return Err(WalletError::Rejected(message.clone()));
        }
        to_wei(&request.amount)?;
        self.transfers
            .lock()
            .expect("mock wallet lock")
            .push(request.clone());
        Ok(TransferReceipt {
            transaction_hash: "0xmock".to_string(),
            link: "https://sepolia.basescan.org/tx/0xmock".to_string(),
        })
    }
}
