//! Relay WebSocket protocol definitions.
//!
//! All communication uses JSON frames over WebSocket. The server only ever
//! sends one shape, the [`Envelope`]; the client sends free-form JSON objects
//! from which a user message is extracted via a fixed alias-priority rule.

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

/// Inbound field names accepted as the user message, in priority order.
/// `message` is the documented protocol; the rest absorb older clients.
pub const MESSAGE_KEY_ALIASES: &[&str] = &["message", "text", "userMessage", "m"];

// ── Outbound envelope ────────────────────────────────────────────────────────

/// Discriminant for the outbound envelope, serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Greeting,
    Typing,
    Message,
    Error,
}

/// Who a frame speaks for: the bot itself or the relay machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    System,
}

/// The single shape sent to the client: `{type, role, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub role: Role,
    pub message: String,
}

impl Envelope {
    /// Sent once, immediately after the connection is accepted.
    pub fn greeting(message: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Greeting,
            role: Role::Assistant,
            message: message.into(),
        }
    }

    /// Sent before each outbound bot call.
    pub fn typing(message: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Typing,
            role: Role::System,
            message: message.into(),
        }
    }

    /// A bot reply.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Message,
            role: Role::Assistant,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Error,
            role: Role::System,
            message: message.into(),
        }
    }
}

// ── Inbound parsing ──────────────────────────────────────────────────────────

/// Parse a raw text frame into a JSON payload.
///
/// Frames that are not valid JSON are absorbed as `{"message": <raw text>}`
/// so plain-text clients keep working.
pub fn parse_inbound(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({ "message": raw }))
}

/// Extract the user message from an inbound payload.
///
/// Checks the alias keys in priority order and returns the first value that
/// is a string with non-whitespace content, trimmed. Anything else — a
/// non-object payload, non-string values, blank strings — yields `None`.
pub fn extract_user_message(payload: &serde_json::Value) -> Option<String> {
    for key in MESSAGE_KEY_ALIASES {
        if let Some(value) = payload.get(key).and_then(|v| v.as_str()) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ── Envelope serialization ─────────────────────────────────────────

    #[test]
    fn envelope_wire_field_is_type() {
        let env = Envelope::message("hi");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["message"], "hi");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn greeting_is_assistant() {
        let json = serde_json::to_value(Envelope::greeting("hello")).unwrap();
        assert_eq!(json["type"], "greeting");
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn typing_and_error_are_system() {
        let typing = serde_json::to_value(Envelope::typing("...")).unwrap();
        assert_eq!(typing["type"], "typing");
        assert_eq!(typing["role"], "system");

        let error = serde_json::to_value(Envelope::error("boom")).unwrap();
        assert_eq!(error["type"], "error");
        assert_eq!(error["role"], "system");
    }

    #[test]
    fn envelope_round_trip() {
        let env = Envelope::error("봇 호출 실패");
        let json = serde_json::to_string(&env).unwrap();
        let parsed: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, env);
    }

    // ── Inbound parsing ────────────────────────────────────────────────

    #[test]
    fn parse_inbound_valid_json() {
        let payload = parse_inbound(r#"{"message":"hello"}"#);
        assert_eq!(payload["message"], "hello");
    }

    #[test]
    fn parse_inbound_plain_text_becomes_message() {
        let payload = parse_inbound("hello there");
        assert_eq!(payload["message"], "hello there");
    }

    #[test]
    fn parse_inbound_keeps_non_object_json() {
        // `5` is valid JSON; it parses but carries no usable keys.
        let payload = parse_inbound("5");
        assert_eq!(payload, serde_json::json!(5));
    }

    // ── Message extraction ─────────────────────────────────────────────

    #[test]
    fn extract_prefers_message_over_aliases() {
        let payload = serde_json::json!({
            "message": "primary",
            "text": "alias-1",
            "userMessage": "alias-2",
            "m": "alias-3",
        });
        assert_eq!(extract_user_message(&payload).as_deref(), Some("primary"));
    }

    #[test]
    fn extract_alias_priority_order() {
        let payload = serde_json::json!({ "m": "last", "userMessage": "mid", "text": "first" });
        assert_eq!(extract_user_message(&payload).as_deref(), Some("first"));

        let payload = serde_json::json!({ "m": "last", "userMessage": "mid" });
        assert_eq!(extract_user_message(&payload).as_deref(), Some("mid"));

        let payload = serde_json::json!({ "m": "last" });
        assert_eq!(extract_user_message(&payload).as_deref(), Some("last"));
    }

    #[test]
    fn extract_skips_blank_message_in_favor_of_alias() {
        let payload = serde_json::json!({ "message": "   ", "text": "fallback" });
        assert_eq!(extract_user_message(&payload).as_deref(), Some("fallback"));
    }

    #[test]
    fn extract_trims_whitespace() {
        let payload = serde_json::json!({ "message": "  hello  " });
        assert_eq!(extract_user_message(&payload).as_deref(), Some("hello"));
    }

    #[test]
    fn extract_ignores_non_string_values() {
        let payload = serde_json::json!({ "message": 42, "text": true });
        assert_eq!(extract_user_message(&payload), None);
    }

    #[test]
    fn extract_empty_object_is_none() {
        assert_eq!(extract_user_message(&serde_json::json!({})), None);
    }

    #[test]
    fn extract_non_object_payload_is_none() {
        assert_eq!(extract_user_message(&serde_json::json!(5)), None);
        assert_eq!(extract_user_message(&serde_json::json!("hi")), None);
        assert_eq!(extract_user_message(&serde_json::json!(["hi"])), None);
    }
}
