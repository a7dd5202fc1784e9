//! zkredeem Types - Canonical domain types for proof-gated reward redemption
//!
//! This crate contains all foundational types for zkredeem with zero
//! dependencies on other zkredeem crates:
//!
//! - The `Proof` wire model as delivered by the identity-proof provider
//! - `Platform` classification and the platform descriptor registry
//! - `VerifiedClaim`, the canonical output of proof extraction
//! - `AgentEvent`, the unit streamed to every connected chat client
//! - The `RedeemError` taxonomy
//!
//! # Flow
//!
//! ```text
//! Proof → verify → extract → VerifiedClaim → disburse → AgentEvent stream
//! ```

pub mod claim;
pub mod error;
pub mod event;
pub mod proof;

pub use claim::*;
pub use error::*;
pub use event::*;
pub use proof::*;

/// Version of the zkredeem types schema
pub const TYPES_VERSION: &str = "0.1.0";
