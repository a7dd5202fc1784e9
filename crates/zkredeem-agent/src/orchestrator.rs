//! Proof-driven disbursement
//!
//! Turns a verified claim into an agent run with the transfer-enabled
//! toolset and relays every step to connected chat sessions. Events flow
//! through a bounded channel: the runtime produces, a drain task consumes
//! and broadcasts, so a burst of steps never blocks the hub and the hub's
//! sessions never stall the run indefinitely.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use zkredeem_stream::EventHub;
use zkredeem_types::{AgentEvent, Result, VerifiedClaim};

use crate::runtime::AgentRuntime;
use crate::tool::ToolRegistry;
use crate::tools::DISBURSEMENT_PROMPT;

/// Capacity of the per-run event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Runs the disbursement pipeline for verified claims.
pub struct DisbursementOrchestrator {
    runtime: Arc<AgentRuntime>,
    hub: Arc<EventHub>,
    tools: ToolRegistry,
}

impl DisbursementOrchestrator {
    /// `tools` must be the transfer-enabled registry; chat toolsets would
    /// leave the agent unable to complete any disbursement.
    pub fn new(runtime: Arc<AgentRuntime>, hub: Arc<EventHub>, tools: ToolRegistry) -> Self {
        Self {
            runtime,
            hub,
            tools,
        }
    }

    /// Drive one verified claim to disbursement, streaming steps to every
    /// connected session. A failed run surfaces exactly one `error` event,
    /// after all steps that preceded the failure.
    pub async fn disburse(&self, claim: &VerifiedClaim) -> Result<()> {
        let thread_id = format!("disbursement-{}", Uuid::new_v4());
        let instruction = instruction_for(claim);
        tracing::info!(
            thread = %thread_id,
            platform = %claim.platform,
            amount = %claim.amount,
            address = %claim.address,
            "starting disbursement run"
        );

        let (tx, mut rx) = mpsc::channel::<AgentEvent>(EVENT_CHANNEL_CAPACITY);
        let hub = self.hub.clone();
        let drain = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                hub.broadcast(event);
            }
        });

        let result = self
            .runtime
            .run(&thread_id, DISBURSEMENT_PROMPT, &instruction, &self.tools, &tx)
            .await;

        drop(tx);
        let _ = drain.await;

        self.runtime.threads().remove(&thread_id);

        if let Err(ref error) = result {
            tracing::error!(thread = %thread_id, %error, "disbursement run failed");
            self.hub
                .broadcast(AgentEvent::error(format!("Disbursement failed: {error}")));
        }
        result
    }
}

fn instruction_for(claim: &VerifiedClaim) -> String {
    format!(
        "User submitted proof for {}. Please send the reward to the user. \
         The amount is {} and the address is {}.",
        claim.platform, claim.amount, claim.address
    )
}
