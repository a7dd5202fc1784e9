//! zkredeem Stream - fan-out of agent events to live sessions
//!
//! `EventHub` is the ordering and delivery layer between agent runs and
//! WebSocket connections. Sessions register an unbounded sender on connect
//! and are removed on disconnect (or on the first failed send). Delivery is
//! at-most-once and best-effort: an event reaches every session present at
//! call time and is never replayed to sessions that connect later.
//!
//! Ordering: each sender is a FIFO channel, so events from one run arrive
//! in emission order. Concurrent runs interleave arbitrarily - the hub
//! imposes no ordering across sources.

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;

use zkredeem_types::{AgentEvent, SessionId};

/// Errors surfaced by the hub
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Session {0} is not connected")]
    SessionGone(SessionId),
}

/// Fan-out registry of live chat sessions.
#[derive(Debug, Default)]
pub struct EventHub {
    sessions: DashMap<SessionId, mpsc::UnboundedSender<AgentEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a session and return the receiving half of its channel.
    pub fn register(&self, session: SessionId) -> mpsc::UnboundedReceiver<AgentEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.insert(session, tx);
        tracing::debug!(%session, "session registered");
        rx
    }

    /// Remove a session on disconnect.
    pub fn unregister(&self, session: SessionId) {
        self.sessions.remove(&session);
        tracing::debug!(%session, "session unregistered");
    }

    /// Number of currently connected sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Deliver an event to every session connected right now.
    ///
    /// Sessions whose receiver is gone are pruned; nothing is queued for
    /// sessions that connect afterwards.
    pub fn broadcast(&self, event: AgentEvent) {
        let mut dead = Vec::new();
        for entry in self.sessions.iter() {
            if entry.value().send(event.clone()).is_err() {
                dead.push(*entry.key());
            }
        }
        for session in dead {
            self.sessions.remove(&session);
            tracing::debug!(%session, "pruned dead session during broadcast");
        }
    }

    /// Deliver an event to exactly one session.
    pub fn unicast(&self, session: SessionId, event: AgentEvent) -> Result<(), StreamError> {
        let sender = self
            .sessions
            .get(&session)
            .ok_or(StreamError::SessionGone(session))?;
        sender
            .send(event)
            .map_err(|_| StreamError::SessionGone(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_all_connected() {
        let hub = EventHub::new();
        let a = SessionId::generate();
        let b = SessionId::generate();
        let mut rx_a = hub.register(a);
        let mut rx_b = hub.register(b);

        hub.broadcast(AgentEvent::agent("step one"));

        assert_eq!(rx_a.recv().await.unwrap().content, "step one");
        assert_eq!(rx_b.recv().await.unwrap().content, "step one");
    }

    #[tokio::test]
    async fn test_no_replay_for_late_joiners() {
        let hub = EventHub::new();
        let early = SessionId::generate();
        let mut rx_early = hub.register(early);

        hub.broadcast(AgentEvent::agent("before"));

        let late = SessionId::generate();
        let mut rx_late = hub.register(late);
        hub.broadcast(AgentEvent::agent("after"));

        assert_eq!(rx_early.recv().await.unwrap().content, "before");
        assert_eq!(rx_early.recv().await.unwrap().content, "after");
        // the late session sees only what was broadcast after it joined
        assert_eq!(rx_late.recv().await.unwrap().content, "after");
        assert!(rx_late.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unicast_targets_one_session() {
        let hub = EventHub::new();
        let a = SessionId::generate();
        let b = SessionId::generate();
        let mut rx_a = hub.register(a);
        let mut rx_b = hub.register(b);

        hub.unicast(a, AgentEvent::tools("only for a")).unwrap();

        assert_eq!(rx_a.recv().await.unwrap().content, "only for a");
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unicast_to_unknown_session_errors() {
        let hub = EventHub::new();
        let ghost = SessionId::generate();
        assert!(hub.unicast(ghost, AgentEvent::agent("hello")).is_err());
    }

    #[tokio::test]
    async fn test_order_preserved_per_source() {
        let hub = EventHub::new();
        let s = SessionId::generate();
        let mut rx = hub.register(s);

        for i in 0..10 {
            hub.broadcast(AgentEvent::agent(format!("step {i}")));
        }
        for i in 0..10 {
            assert_eq!(rx.recv().await.unwrap().content, format!("step {i}"));
        }
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let hub = EventHub::new();
        let s = SessionId::generate();
        let rx = hub.register(s);
        drop(rx);

        hub.broadcast(AgentEvent::agent("into the void"));
        assert_eq!(hub.session_count(), 0);
    }
}
