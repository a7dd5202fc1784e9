//! Callback transport codec
//!
//! The proof provider POSTs the proof document to `/receive-proofs` as a
//! URL-percent-encoded JSON body. Decoding recovers the exact original
//! document, nested string payloads included; both failure modes map to
//! `RedeemError::Decode`.

use std::borrow::Cow;

use zkredeem_types::{Proof, RedeemError, Result};

/// Decode a callback body into a proof document.
pub fn decode_callback_body(body: &str) -> Result<Proof> {
    let decoded: Cow<'_, str> =
        urlencoding::decode(body).map_err(|e| RedeemError::Decode(e.to_string()))?;
    serde_json::from_str(&decoded).map_err(|e| RedeemError::Decode(e.to_string()))
}

/// Encode a proof document the way the provider transmits it.
pub fn encode_callback_body(proof: &Proof) -> Result<String> {
    let json = serde_json::to_string(proof).map_err(|e| RedeemError::Decode(e.to_string()))?;
    Ok(urlencoding::encode(&json).into_owned())
}
