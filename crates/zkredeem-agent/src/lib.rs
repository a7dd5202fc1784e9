//! zkredeem Agent - the tool-augmented runtime behind redemption
//!
//! The agent layer owns the second half of the pipeline: given either a
//! chat message or a disbursement instruction, it drives the LLM capability
//! through a tool-enabled loop and emits every step as an `AgentEvent`.
//!
//! # Capability scoping
//!
//! Tool registries are built per run. The transfer tool is attached only by
//! the disbursement orchestrator; chat-originated runs can never reach it,
//! no matter what the user's text asks for. The LLM proposes tool calls,
//! validated Rust executes them.
//!
//! # Conversation state
//!
//! `ThreadStore` keys conversation memory by logical thread: one thread per
//! chat session, one per disbursement run. Runs never share mutable
//! conversational context.

pub mod orchestrator;
pub mod runtime;
pub mod thread;
pub mod tool;
pub mod tools;
pub mod wallet;

pub use orchestrator::DisbursementOrchestrator;
pub use runtime::AgentRuntime;
pub use thread::ThreadStore;
pub use tool::{AgentTool, ToolError, ToolRegistry};
pub use tools::{
    chat_tools, disbursement_tools, GenerateProofRequestTool, ProofRequestSettings,
    TransferRewardTool, CHAT_PROMPT, DISBURSEMENT_PROMPT,
};
pub use wallet::{
    to_wei, MockWallet, PlatformWalletClient, TransferReceipt, TransferRequest, WalletClient,
    WalletConfig, WalletError,
};
