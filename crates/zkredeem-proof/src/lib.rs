//! zkredeem Proof - verification, extraction, and transport decoding
//!
//! The first half of the redemption pipeline:
//!
//! ```text
//! callback body → decode → ProofVerifier → ClaimExtractor → VerifiedClaim
//! ```
//!
//! Verification wraps the external attestor capability behind a trait and
//! never errors - an invalid proof is `false`, terminal for the attempt.
//! Extraction is pure: it reads the verified proof's claim documents
//! through the platform descriptor registry and produces a canonical
//! `VerifiedClaim` or a typed failure.

pub mod callback;
pub mod extract;
pub mod verify;

pub use callback::{decode_callback_body, encode_callback_body};
pub use extract::ClaimExtractor;
pub use verify::{AttestorVerifier, ProofVerifier, StaticVerifier};
