//! Event types exchanged over the chat WebSocket.

use serde::{Deserialize, Serialize};

use crate::rest::chat::ChatResponse;
use crate::rest::member::MemberResponse;
use crate::rest::message::MessageResponse;

/// Client events received from a WebSocket connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatClientEvent {
    /// Heartbeat to keep the connection alive
    Ping,
    /// Opt into typing indicators for an open chat
    Subscribe { chat_id: String },
    /// Stop receiving typing indicators for a chat
    Unsubscribe { chat_id: String },
    /// Typing indicator, relayed to the chat's members
    Typing { chat_id: String, is_typing: bool },
}

/// Server events sent to WebSocket clients.
///
/// Domain events (`ChatCreated`, `MessageCreated`, ...) are delivered to
/// every connected member of the affected chat; the control events at the
/// top only ever go to the connection that triggered them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatServerEvent {
    /// Welcome message after a successful connection
    Hello { user_id: String },
    /// Heartbeat response
    Pong,
    /// Subscription confirmation
    Subscribed { chat_id: String },
    /// Unsubscription confirmation
    Unsubscribed { chat_id: String },
    /// Error response to a client event
    Error { code: String, message: String },
    /// A chat the user belongs to was created
    ChatCreated { chat: ChatResponse },
    /// Chat metadata changed
    ChatUpdated { chat: ChatResponse },
    /// The chat was deleted
    ChatDeleted { chat_id: String },
    /// New message in a chat
    MessageCreated {
        chat_id: String,
        message: MessageResponse,
    },
    /// A message was edited
    MessageUpdated {
        chat_id: String,
        message: MessageResponse,
    },
    /// A message was deleted
    MessageDeleted {
        chat_id: String,
        message_id: String,
    },
    /// A member joined the chat
    MemberAdded {
        chat_id: String,
        member: MemberResponse,
    },
    /// A member left or was removed
    MemberRemoved { chat_id: String, user_id: String },
    /// A member is typing
    UserTyping {
        chat_id: String,
        user_id: String,
        is_typing: bool,
    },
}

impl ChatServerEvent {
    /// The chat this event belongs to, if any
    pub fn chat_id(&self) -> Option<&str> {
        match self {
            ChatServerEvent::ChatCreated { chat } | ChatServerEvent::ChatUpdated { chat } => {
                Some(&chat.id)
            }
            ChatServerEvent::ChatDeleted { chat_id }
            | ChatServerEvent::MessageCreated { chat_id, .. }
            | ChatServerEvent::MessageUpdated { chat_id, .. }
            | ChatServerEvent::MessageDeleted { chat_id, .. }
            | ChatServerEvent::MemberAdded { chat_id, .. }
            | ChatServerEvent::MemberRemoved { chat_id, .. }
            | ChatServerEvent::UserTyping { chat_id, .. }
            | ChatServerEvent::Subscribed { chat_id }
            | ChatServerEvent::Unsubscribed { chat_id } => Some(chat_id),
            ChatServerEvent::Hello { .. }
            | ChatServerEvent::Pong
            | ChatServerEvent::Error { .. } => None,
        }
    }

    /// Event type name for logging
    pub fn event_type_name(&self) -> &'static str {
        match self {
            ChatServerEvent::Hello { .. } => "hello",
            ChatServerEvent::Pong => "pong",
            ChatServerEvent::Subscribed { .. } => "subscribed",
            ChatServerEvent::Unsubscribed { .. } => "unsubscribed",
            ChatServerEvent::Error { .. } => "error",
            ChatServerEvent::ChatCreated { .. } => "chat_created",
            ChatServerEvent::ChatUpdated { .. } => "chat_updated",
            ChatServerEvent::ChatDeleted { .. } => "chat_deleted",
            ChatServerEvent::MessageCreated { .. } => "message_created",
            ChatServerEvent::MessageUpdated { .. } => "message_updated",
            ChatServerEvent::MessageDeleted { .. } => "message_deleted",
            ChatServerEvent::MemberAdded { .. } => "member_added",
            ChatServerEvent::MemberRemoved { .. } => "member_removed",
            ChatServerEvent::UserTyping { .. } => "user_typing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_deserialize_from_tagged_json() {
        let ping: ChatClientEvent = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, ChatClientEvent::Ping));

        let subscribe: ChatClientEvent =
            serde_json::from_str(r#"{"type":"subscribe","chat_id":"c1"}"#).unwrap();
        assert!(matches!(subscribe, ChatClientEvent::Subscribe { chat_id } if chat_id == "c1"));

        let typing: ChatClientEvent =
            serde_json::from_str(r#"{"type":"typing","chat_id":"c1","is_typing":true}"#).unwrap();
        assert!(matches!(typing, ChatClientEvent::Typing { is_typing: true, .. }));
    }

    #[test]
    fn server_events_serialize_with_type_tag() {
        let event = ChatServerEvent::MessageDeleted {
            chat_id: "c1".to_string(),
            message_id: "m1".to_string(),
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["type"], "message_deleted");
        assert_eq!(json["chat_id"], "c1");
        assert_eq!(json["message_id"], "m1");
    }

    #[test]
    fn chat_id_accessor_covers_domain_events() {
        let typing = ChatServerEvent::UserTyping {
            chat_id: "c9".to_string(),
            user_id: "u1".to_string(),
            is_typing: false,
        };
        assert_eq!(typing.chat_id(), Some("c9"));
        assert_eq!(ChatServerEvent::Pong.chat_id(), None);
    }
}
