//! zkredeem LLM - tool-calling language-model capability
//!
//! Thin provider abstraction over chat-completion APIs with function
//! calling. The agent runtime drives this trait in a loop: complete, run
//! the requested tools, feed results back, repeat until the model stops
//! calling tools.
//!
//! Providers:
//! - `OpenAiProvider` - the production path (gpt-4o-mini by default)
//! - `DeterministicProvider` - no-LLM fallback so the server still boots
//!   and answers without credentials

pub mod provider;
pub mod router;
pub mod types;

pub use provider::{DeterministicProvider, LlmProvider, OpenAiConfig, OpenAiProvider};
pub use router::LlmRouter;
pub use types::*;
