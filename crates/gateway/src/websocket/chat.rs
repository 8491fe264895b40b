//! Chat WebSocket handler.
//!
//! Each connection authenticates via a `token` query parameter, then
//! receives every domain event fanned out to its user by the [`ChatHub`].
//! Client frames control typing-indicator subscriptions and heartbeats;
//! messages themselves are sent over REST.
//!
//! [`ChatHub`]: crate::hub::ChatHub

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use parley_database::User;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;
use crate::websocket::events::{ChatClientEvent, ChatServerEvent};

#[derive(Debug, Deserialize)]
pub struct WebSocketQuery {
    token: Option<String>,
}

/// Chat WebSocket connection handler
pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WebSocketQuery>,
) -> GatewayResult<Response> {
    let token = query.token.ok_or_else(|| {
        GatewayError::AuthenticationFailed("missing authentication token".to_string())
    })?;

    let session = state.session_service.validate(&token).await?;
    let user = state.user_service.get(session.user_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_chat_socket(socket, state, user)))
}

async fn handle_chat_socket(socket: WebSocket, state: Arc<GatewayState>, user: User) {
    let mut events = state.hub.subscribe(user.id).await;
    let _ = state.user_service.touch_last_seen(user.id).await;

    info!(user_id = user.id, "chat websocket connected");

    let (mut sink, mut stream) = socket.split();

    let hello = ChatServerEvent::Hello {
        user_id: user.public_id.clone(),
    };
    if send_event(&mut sink, &hello).await.is_err() {
        state.hub.disconnect(user.id).await;
        return;
    }

    // Chats this connection wants typing indicators for.
    let mut subscriptions: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ChatClientEvent>(&text) {
                            Ok(event) => {
                                handle_client_event(&state, &user, event, &mut subscriptions).await
                            }
                            Err(_) => Some(ChatServerEvent::Error {
                                code: "malformed_event".to_string(),
                                message: "could not parse client event".to_string(),
                            }),
                        };

                        if let Some(reply) = reply {
                            if send_event(&mut sink, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        debug!(user_id = user.id, ?error, "websocket receive error");
                        break;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        // Typing indicators are opt-in per connection; every
                        // other event always goes through so the chat list
                        // stays current.
                        if let ChatServerEvent::UserTyping { chat_id, .. } = &event {
                            if !subscriptions.contains(chat_id) {
                                continue;
                            }
                        }

                        if send_event(&mut sink, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // No delivery guarantee; the client re-syncs over REST.
                        warn!(user_id = user.id, skipped = skipped, "websocket receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    state.hub.disconnect(user.id).await;
    let _ = state.user_service.touch_last_seen(user.id).await;

    info!(user_id = user.id, "chat websocket disconnected");
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &ChatServerEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(text) => sink.send(Message::Text(text)).await,
        Err(error) => {
            warn!(?error, "failed to serialize server event");
            Ok(())
        }
    }
}

/// Handle one client event, returning the direct reply for this connection
/// if there is one
async fn handle_client_event(
    state: &Arc<GatewayState>,
    user: &User,
    event: ChatClientEvent,
    subscriptions: &mut HashSet<String>,
) -> Option<ChatServerEvent> {
    match event {
        ChatClientEvent::Ping => Some(ChatServerEvent::Pong),
        ChatClientEvent::Subscribe { chat_id } => {
            match state.member_service.require_member(&chat_id, user.id).await {
                Ok(_) => {
                    subscriptions.insert(chat_id.clone());
                    Some(ChatServerEvent::Subscribed { chat_id })
                }
                Err(error) => Some(ChatServerEvent::Error {
                    code: "access_denied".to_string(),
                    message: error.to_string(),
                }),
            }
        }
        ChatClientEvent::Unsubscribe { chat_id } => {
            subscriptions.remove(&chat_id);
            Some(ChatServerEvent::Unsubscribed { chat_id })
        }
        ChatClientEvent::Typing { chat_id, is_typing } => {
            match state.member_service.require_member(&chat_id, user.id).await {
                Ok(_) => {
                    let recipients = state
                        .member_service
                        .member_ids(&chat_id)
                        .await
                        .unwrap_or_default();

                    state
                        .hub
                        .publish(
                            &recipients,
                            &ChatServerEvent::UserTyping {
                                chat_id,
                                user_id: user.public_id.clone(),
                                is_typing,
                            },
                        )
                        .await;
                    None
                }
                Err(error) => Some(ChatServerEvent::Error {
                    code: "access_denied".to_string(),
                    message: error.to_string(),
                }),
            }
        }
    }
}
