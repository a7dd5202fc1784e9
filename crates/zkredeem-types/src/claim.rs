//! Verified claims and the platform descriptor registry
//!
//! Platform support is data, not branching code: each supported platform is
//! a `PlatformDescriptor` naming the URL substring that classifies it, the
//! field inside `extractedParameters` that carries the amount, and any HTML
//! entities to strip before the amount is numeric. Adding a platform means
//! adding a descriptor, not touching the orchestrator.

use serde::{Deserialize, Serialize};

/// A reward platform supported for redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Amazon,
    Flipkart,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amazon => write!(f, "amazon"),
            Self::Flipkart => write!(f, "flipkart"),
        }
    }
}

/// The canonical output of proof extraction: what to pay, where.
///
/// Only produced after verification succeeds. `amount` stays a decimal
/// string end-to-end; the wallet capability owns numeric interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedClaim {
    /// Platform the balance was proven on
    pub platform: Platform,
    /// Claimed balance, decimal string with entities stripped
    pub amount: String,
    /// Destination address for the on-chain transfer
    pub address: String,
}

/// How to read one platform's claim out of a proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Platform this descriptor classifies
    pub platform: Platform,
    /// Substring of `parameters.url` that selects this platform
    pub url_pattern: String,
    /// Field inside `extractedParameters` carrying the amount
    pub amount_field: String,
    /// Entities stripped from the amount before numeric interpretation
    pub strip_entities: Vec<String>,
}

/// Registry of supported platforms.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    descriptors: Vec<PlatformDescriptor>,
}

impl PlatformRegistry {
    pub fn new(descriptors: Vec<PlatformDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Classify a claim URL. First matching descriptor wins.
    pub fn classify(&self, url: &str) -> Option<&PlatformDescriptor> {
        self.descriptors
            .iter()
            .find(|d| url.contains(d.url_pattern.as_str()))
    }

    pub fn descriptors(&self) -> &[PlatformDescriptor] {
        &self.descriptors
    }
}

impl Default for PlatformRegistry {
    /// The two platforms shipped today. Amazon balances arrive as currency
    /// strings prefixed with the rupee entity; Flipkart amounts arrive as
    /// plain text.
    fn default() -> Self {
        Self::new(vec![
            PlatformDescriptor {
                platform: Platform::Amazon,
                url_pattern: "amazon".to_string(),
                amount_field: "balance".to_string(),
                strip_entities: vec!["&#x20b9;".to_string()],
            },
            PlatformDescriptor {
                platform: Platform::Flipkart,
                url_pattern: "flipkart".to_string(),
                amount_field: "text".to_string(),
                strip_entities: vec![],
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_amazon() {
        let registry = PlatformRegistry::default();
        let d = registry
            .classify("https://www.amazon.in/gp/css/gc/balance")
            .unwrap();
        assert_eq!(d.platform, Platform::Amazon);
        assert_eq!(d.amount_field, "balance");
    }

    #[test]
    fn test_classify_flipkart() {
        let registry = PlatformRegistry::default();
        let d = registry
            .classify("https://www.flipkart.com/account/wallet")
            .unwrap();
        assert_eq!(d.platform, Platform::Flipkart);
        assert!(d.strip_entities.is_empty());
    }

    #[test]
    fn test_classify_unsupported() {
        let registry = PlatformRegistry::default();
        assert!(registry.classify("https://www.myntra.com/wallet").is_none());
    }

    #[test]
    fn test_platform_display_matches_serde() {
        let json = serde_json::to_string(&Platform::Amazon).unwrap();
        assert_eq!(json, format!("\"{}\"", Platform::Amazon));
    }
}
