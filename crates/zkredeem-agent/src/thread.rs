//! Per-logical-thread conversation state
//!
//! Each chat session and each disbursement run owns its own conversation
//! thread, keyed by a thread id. Runs never read or append to another
//! run's context, which keeps concurrent chat and disbursement traffic
//! from racing on shared memory.

use dashmap::DashMap;

use zkredeem_llm::Message;

/// Conversation memory, one entry per logical thread.
#[derive(Debug, Default)]
pub struct ThreadStore {
    threads: DashMap<String, Vec<Message>>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self {
            threads: DashMap::new(),
        }
    }

    /// Append one message to a thread, creating it on first use.
    pub fn append(&self, thread_id: &str, message: Message) {
        self.threads
            .entry(thread_id.to_string())
            .or_default()
            .push(message);
    }

    /// Snapshot of a thread's history, oldest first.
    pub fn history(&self, thread_id: &str) -> Vec<Message> {
        self.threads
            .get(thread_id)
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Drop a thread entirely (e.g. when its chat session disconnects).
    pub fn remove(&self, thread_id: &str) {
        self.threads.remove(thread_id);
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
