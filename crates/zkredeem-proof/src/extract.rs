//! Claim extraction
//!
//! Turns a verified proof into a `VerifiedClaim` by reading its claim
//! documents through the platform descriptor registry. Pure and
//! synchronous: the same proof always extracts the same way, which is why
//! extraction failures are terminal rather than retried.

use serde_json::Value;

use zkredeem_types::{PlatformRegistry, Proof, RedeemError, Result, VerifiedClaim};

/// Registry-driven platform extractor.
#[derive(Debug, Clone, Default)]
pub struct ClaimExtractor {
    registry: PlatformRegistry,
}

impl ClaimExtractor {
    pub fn new(registry: PlatformRegistry) -> Self {
        Self { registry }
    }

    /// Extract the platform, claimed amount, and destination address.
    ///
    /// Fails with `UnsupportedPlatform` when the claim URL matches no
    /// registered descriptor and `MalformedClaim` when any required field
    /// is missing or unparseable after the platform matched.
    pub fn extract(&self, proof: &Proof) -> Result<VerifiedClaim> {
        let parameters: Value =
            serde_json::from_str(&proof.claim_data.parameters).map_err(|e| {
                RedeemError::MalformedClaim {
                    detail: format!("claimData.parameters is not valid JSON: {e}"),
                }
            })?;

        let url = parameters
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| RedeemError::MalformedClaim {
                detail: "claimData.parameters has no url field".to_string(),
            })?;

        let descriptor = self
            .registry
            .classify(url)
            .ok_or_else(|| RedeemError::UnsupportedPlatform {
                url: url.to_string(),
            })?;

        let context: Value =
            serde_json::from_str(&proof.claim_data.context).map_err(|e| {
                RedeemError::MalformedClaim {
                    detail: format!("claimData.context is not valid JSON: {e}"),
                }
            })?;

        let raw_amount = context
            .get("extractedParameters")
            .and_then(|p| p.get(&descriptor.amount_field))
            .and_then(Value::as_str)
            .ok_or_else(|| RedeemError::MalformedClaim {
                detail: format!(
                    "extractedParameters.{} missing for {}",
                    descriptor.amount_field, descriptor.platform
                ),
            })?;

        let mut amount = raw_amount.to_string();
        for entity in &descriptor.strip_entities {
            amount = amount.replace(entity.as_str(), "");
        }
        if amount.is_empty() {
            return Err(RedeemError::MalformedClaim {
                detail: format!("empty amount for {}", descriptor.platform),
            });
        }

        let address = context
            .get("contextMessage")
            .and_then(Value::as_str)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| RedeemError::MalformedClaim {
                detail: "contextMessage (destination address) missing".to_string(),
            })?;

        Ok(VerifiedClaim {
            platform: descriptor.platform,
            amount,
            address: address.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkredeem_types::{ClaimData, Platform};

    fn proof_with(parameters: &str, context: &str) -> Proof {
        Proof {
            identifier: "0xabc".to_string(),
            claim_data: ClaimData {
                provider: "http".to_string(),
                parameters: parameters.to_string(),
                context: context.to_string(),
                owner: String::new(),
                timestamp_s: 0,
                epoch: 1,
                identifier: "0xabc".to_string(),
            },
            signatures: vec!["0xsig".to_string()],
            witnesses: vec![],
            epoch: 1,
        }
    }

    #[test]
    fn test_amazon_strips_currency_entity() {
        let proof = proof_with(
            r#"{"url":"https://www.amazon.in/gp/css/gc/balance"}"#,
            r#"{"extractedParameters":{"balance":"&#x20b9;1500"},"contextMessage":"0xABC"}"#,
        );
        let claim = ClaimExtractor::default().extract(&proof).unwrap();
        assert_eq!(claim.platform, Platform::Amazon);
        assert_eq!(claim.amount, "1500");
        assert_eq!(claim.address, "0xABC");
    }

    #[test]
    fn test_flipkart_passes_text_through() {
        let proof = proof_with(
            r#"{"url":"https://www.flipkart.com/account"}"#,
            r#"{"extractedParameters":{"text":"750"},"contextMessage":"0xDEF"}"#,
        );
        let claim = ClaimExtractor::default().extract(&proof).unwrap();
        assert_eq!(claim.platform, Platform::Flipkart);
        assert_eq!(claim.amount, "750");
    }

    #[test]
    fn test_unsupported_platform() {
        let proof = proof_with(
            r#"{"url":"https://www.myntra.com/wallet"}"#,
            r#"{"extractedParameters":{"text":"10"},"contextMessage":"0x1"}"#,
        );
        let err = ClaimExtractor::default().extract(&proof).unwrap_err();
        assert!(matches!(err, RedeemError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn test_missing_url_is_malformed() {
        let proof = proof_with(
            r#"{"method":"GET"}"#,
            r#"{"extractedParameters":{"text":"10"},"contextMessage":"0x1"}"#,
        );
        let err = ClaimExtractor::default().extract(&proof).unwrap_err();
        assert!(matches!(err, RedeemError::MalformedClaim { .. }));
    }

    #[test]
    fn test_missing_amount_field_is_malformed() {
        let proof = proof_with(
            r#"{"url":"https://www.amazon.in"}"#,
            r#"{"extractedParameters":{"text":"10"},"contextMessage":"0x1"}"#,
        );
        let err = ClaimExtractor::default().extract(&proof).unwrap_err();
        assert!(matches!(err, RedeemError::MalformedClaim { .. }));
    }

    #[test]
    fn test_missing_address_is_malformed() {
        let proof = proof_with(
            r#"{"url":"https://www.flipkart.com"}"#,
            r#"{"extractedParameters":{"text":"10"}}"#,
        );
        let err = ClaimExtractor::default().extract(&proof).unwrap_err();
        assert!(matches!(err, RedeemError::MalformedClaim { .. }));
    }

    #[test]
    fn test_unparseable_context_is_malformed() {
        let proof = proof_with(r#"{"url":"https://www.amazon.in"}"#, "not json");
        let err = ClaimExtractor::default().extract(&proof).unwrap_err();
        assert!(matches!(err, RedeemError::MalformedClaim { .. }));
    }
}
