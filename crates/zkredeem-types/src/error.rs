//! Error types for zkredeem
//!
//! Every failure in the redemption pipeline is explicit and terminal for
//! the run that raised it: proofs are single-use and externally
//! timestamped, so nothing here is retried internally. Resubmission is a
//! decision for the proof provider or the user, never this layer.

use thiserror::Error;

/// Result type for zkredeem operations
pub type Result<T> = std::result::Result<T, RedeemError>;

/// zkredeem error taxonomy
#[derive(Debug, Clone, Error)]
pub enum RedeemError {
    // ========================================================================
    // Callback boundary
    // ========================================================================
    /// Callback body could not be decoded into a proof document
    #[error("Failed to decode proof payload: {0}")]
    Decode(String),

    // ========================================================================
    // Verification & extraction
    // ========================================================================
    /// Proof failed structural or cryptographic verification
    #[error("Invalid proofs data")]
    InvalidProof,

    /// Claim URL matched no supported platform
    #[error("Platform value not found in proof (url: {url})")]
    UnsupportedPlatform { url: String },

    /// Platform matched but claim fields were missing or unparseable
    #[error("Malformed claim: {detail}")]
    MalformedClaim { detail: String },

    // ========================================================================
    // Agent execution
    // ========================================================================
    /// The agent or a tool raised mid-run
    #[error("Agent execution failed: {0}")]
    AgentExecution(String),

    /// The wallet capability failed to execute a transfer
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// The language-model capability failed
    #[error("LLM request failed: {0}")]
    Llm(String),
}

impl RedeemError {
    /// Whether this failure belongs to the HTTP callback's 400 class
    /// (caller error) rather than its 500 class (internal error).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Decode(_)
                | Self::InvalidProof
                | Self::UnsupportedPlatform { .. }
                | Self::MalformedClaim { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(RedeemError::InvalidProof.is_rejection());
        assert!(RedeemError::Decode("bad".into()).is_rejection());
        assert!(RedeemError::UnsupportedPlatform { url: "x".into() }.is_rejection());
        assert!(!RedeemError::AgentExecution("boom".into()).is_rejection());
        assert!(!RedeemError::Transfer("boom".into()).is_rejection());
    }

    #[test]
    fn test_display_messages() {
        let err = RedeemError::MalformedClaim {
            detail: "missing contextMessage".into(),
        };
        assert!(err.to_string().contains("missing contextMessage"));
    }
}
