//! Agent events: the canonical unit streamed to chat clients
//!
//! Every client-visible occurrence - agent reasoning, tool output, proof
//! request configurations, errors - is one `AgentEvent`. The wire form is
//! `{"type": ..., "content": ..., "timestamp": ...}`; `Qr` is an explicit
//! discriminator for proof-request payloads so clients never have to sniff
//! message content to decide how to render it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator for `AgentEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A reasoning step produced by the agent
    Agent,
    /// Output of a tool execution
    Tools,
    /// A terminal failure for the current run
    Error,
    /// A proof-request configuration, rendered client-side as a QR code
    Qr,
    /// Echo of user input
    User,
}

/// One client-visible occurrence.
///
/// Within a single run, events are delivered in emission order, never
/// reordered or deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Event discriminator
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Event payload
    pub content: String,
    /// Emission time
    pub timestamp: DateTime<Utc>,
}

impl AgentEvent {
    pub fn new(kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(EventKind::Agent, content)
    }

    pub fn tools(content: impl Into<String>) -> Self {
        Self::new(EventKind::Tools, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(EventKind::Error, content)
    }

    pub fn qr(content: impl Into<String>) -> Self {
        Self::new(EventKind::Qr, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(EventKind::User, content)
    }
}

/// Identity of one live chat session.
///
/// A session owns no state beyond being a fan-out target; it is created on
/// connect and destroyed on disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = AgentEvent::agent("thinking");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "agent");
        assert_eq!(json["content"], "thinking");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        for (kind, wire) in [
            (EventKind::Agent, "\"agent\""),
            (EventKind::Tools, "\"tools\""),
            (EventKind::Error, "\"error\""),
            (EventKind::Qr, "\"qr\""),
            (EventKind::User, "\"user\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), wire);
        }
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
