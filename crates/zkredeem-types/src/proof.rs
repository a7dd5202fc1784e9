//! Proof wire model
//!
//! A `Proof` is the attestation object POSTed to the callback endpoint by
//! the identity-proof provider. It is consumed exactly once: verified,
//! extracted, then discarded. Nothing in this crate persists it.
//!
//! `claim_data.parameters` and `claim_data.context` are JSON documents
//! encoded as strings, exactly as the provider delivers them. They are only
//! parsed at extraction time; the outer object round-trips byte-exact.

use serde::{Deserialize, Serialize};

/// An attestation from the identity-proof provider.
///
/// Immutable once received. Unknown provider fields are dropped on
/// deserialization; the fields below are the ones verification and
/// extraction depend on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// Claim identifier, a 0x-prefixed keccak256 digest of the claim info
    pub identifier: String,
    /// The claim body
    #[serde(rename = "claimData")]
    pub claim_data: ClaimData,
    /// Attestor signatures over the claim (0x-prefixed, 65 bytes each)
    #[serde(default)]
    pub signatures: Vec<String>,
    /// Witnesses that attested the claim
    #[serde(default)]
    pub witnesses: Vec<Witness>,
    /// Attestor epoch the proof was issued under
    #[serde(default)]
    pub epoch: u64,
}

/// The claim carried inside a proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimData {
    /// Provider template the claim was generated from (e.g. "http")
    #[serde(default)]
    pub provider: String,
    /// JSON document (as a string) holding the request parameters,
    /// including the `url` used to classify the platform
    pub parameters: String,
    /// JSON document (as a string) holding the extracted parameters and
    /// the `contextMessage` destination address
    pub context: String,
    /// Address of the proof owner
    #[serde(default)]
    pub owner: String,
    /// Unix timestamp (seconds) at which the claim was made
    #[serde(rename = "timestampS", default)]
    pub timestamp_s: u64,
    /// Epoch echoed inside the claim body
    #[serde(default)]
    pub epoch: u64,
    /// Claim identifier echoed inside the claim body
    #[serde(default)]
    pub identifier: String,
}

/// A witness that attested a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    /// Witness address (0x-prefixed, 20 bytes)
    pub id: String,
    /// Witness endpoint
    #[serde(default)]
    pub url: String,
}
