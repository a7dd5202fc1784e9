//! Proof verification
//!
//! `ProofVerifier` wraps the external proof-verification capability. The
//! contract is `verify(proof) -> bool` and it never errors: structurally
//! broken proofs, unparseable signatures, and recovery failures all map to
//! `false`. A `false` result is terminal for the current redemption
//! attempt - proofs are single-use and externally timestamped, so there is
//! nothing to retry.
//!
//! `AttestorVerifier` performs the SDK-local half of verification: it
//! recovers the secp256k1 signer of each claim signature and requires the
//! recovered address to be one of the proof's witnesses.

use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use zkredeem_types::Proof;

/// The proof-verification capability.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    /// Validate a proof. Returns `false` for any structurally or
    /// cryptographically invalid input; never errors.
    async fn verify(&self, proof: &Proof) -> bool;
}

/// Verifies claim signatures against the proof's witness set.
#[derive(Debug, Default, Clone)]
pub struct AttestorVerifier;

impl AttestorVerifier {
    pub fn new() -> Self {
        Self
    }

    /// keccak256 of the claim identifier under the Ethereum signed-message
    /// prefix, the digest attestors sign.
    fn signed_digest(identifier: &str) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(format!("\x19Ethereum Signed Message:\n{}", identifier.len()));
        hasher.update(identifier.as_bytes());
        hasher.finalize().into()
    }

    /// Recover the signer address of a 65-byte r||s||v signature.
    fn recover_signer(digest: &[u8; 32], signature_hex: &str) -> Option<String> {
        let bytes = hex::decode(signature_hex.trim_start_matches("0x")).ok()?;
        if bytes.len() != 65 {
            return None;
        }

        let signature = Signature::from_slice(&bytes[..64]).ok()?;
        // Ethereum encodes the recovery id as 27/28
        let v = match bytes[64] {
            27 | 28 => bytes[64] - 27,
            v @ 0..=1 => v,
            _ => return None,
        };
        let recovery_id = RecoveryId::from_byte(v)?;

        let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id).ok()?;
        let point = key.to_encoded_point(false);
        let hash = Keccak256::digest(&point.as_bytes()[1..]);
        Some(format!("0x{}", hex::encode(&hash[12..])))
    }

    fn check(&self, proof: &Proof) -> bool {
        if proof.signatures.is_empty() || proof.witnesses.is_empty() {
            return false;
        }
        if proof.identifier.is_empty() {
            return false;
        }
        // Claim documents must at least be well-formed JSON for the proof
        // to mean anything downstream.
        if serde_json::from_str::<serde_json::Value>(&proof.claim_data.parameters).is_err()
            || serde_json::from_str::<serde_json::Value>(&proof.claim_data.context).is_err()
        {
            return false;
        }

        let digest = Self::signed_digest(&proof.identifier);
        proof.signatures.iter().all(|sig| {
            match Self::recover_signer(&digest, sig) {
                Some(signer) => proof
                    .witnesses
                    .iter()
                    .any(|w| w.id.eq_ignore_ascii_case(&signer)),
                None => false,
            }
        })
    }
}

#[async_trait]
impl ProofVerifier for AttestorVerifier {
    async fn verify(&self, proof: &Proof) -> bool {
        let valid = self.check(proof);
        if !valid {
            tracing::warn!(identifier = %proof.identifier, "proof failed verification");
        }
        valid
    }
}

/// Fixed-outcome verifier for tests and local development.
#[derive(Debug, Clone, Copy)]
pub struct StaticVerifier(pub bool);

#[async_trait]
impl ProofVerifier for StaticVerifier {
    async fn verify(&self, _proof: &Proof) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use zkredeem_types::{ClaimData, Witness};

    fn base_proof() -> Proof {
        Proof {
            identifier: "0x0123abc".to_string(),
            claim_data: ClaimData {
                provider: "http".to_string(),
                parameters: r#"{"url":"https://www.amazon.in"}"#.to_string(),
                context: r#"{"extractedParameters":{"balance":"1"},"contextMessage":"0xB9"}"#
                    .to_string(),
                owner: String::new(),
                timestamp_s: 1714000000,
                epoch: 1,
                identifier: "0x0123abc".to_string(),
            },
            signatures: vec![],
            witnesses: vec![],
            epoch: 1,
        }
    }

    fn sign(proof: &Proof, key: &SigningKey) -> (String, String) {
        let digest = AttestorVerifier::signed_digest(&proof.identifier);
        let (signature, recovery_id) = key.sign_prehash_recoverable(&digest).unwrap();
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(27 + recovery_id.to_byte());

        let point = key.verifying_key().to_encoded_point(false);
        let hash = Keccak256::digest(&point.as_bytes()[1..]);
        let address = format!("0x{}", hex::encode(&hash[12..]));

        (format!("0x{}", hex::encode(bytes)), address)
    }

    #[tokio::test]
    async fn test_valid_signature_from_witness_passes() {
        let key = SigningKey::from_bytes(&[7u8; 32].into()).unwrap();
        let mut proof = base_proof();
        let (signature, address) = sign(&proof, &key);
        proof.signatures = vec![signature];
        proof.witnesses = vec![Witness {
            id: address,
            url: "wss://witness".to_string(),
        }];

        assert!(AttestorVerifier::new().verify(&proof).await);
    }

    #[tokio::test]
    async fn test_signer_not_in_witness_set_fails() {
        let key = SigningKey::from_bytes(&[7u8; 32].into()).unwrap();
        let mut proof = base_proof();
        let (signature, _) = sign(&proof, &key);
        proof.signatures = vec![signature];
        proof.witnesses = vec![Witness {
            id: "0x0000000000000000000000000000000000000001".to_string(),
            url: String::new(),
        }];

        assert!(!AttestorVerifier::new().verify(&proof).await);
    }

    #[tokio::test]
    async fn test_missing_signatures_fail() {
        let proof = base_proof();
        assert!(!AttestorVerifier::new().verify(&proof).await);
    }

    #[tokio::test]
    async fn test_garbage_signature_fails_without_panic() {
        let mut proof = base_proof();
        proof.signatures = vec!["0xnot-hex".to_string()];
        proof.witnesses = vec![Witness {
            id: "0x01".to_string(),
            url: String::new(),
        }];
        assert!(!AttestorVerifier::new().verify(&proof).await);
    }

    #[tokio::test]
    async fn test_unparseable_claim_documents_fail() {
        let key = SigningKey::from_bytes(&[7u8; 32].into()).unwrap();
        let mut proof = base_proof();
        proof.claim_data.parameters = "not json".to_string();
        let (signature, address) = sign(&proof, &key);
        proof.signatures = vec![signature];
        proof.witnesses = vec![Witness {
            id: address,
            url: String::new(),
        }];
        assert!(!AttestorVerifier::new().verify(&proof).await);
    }
}
