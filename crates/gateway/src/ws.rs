//! The per-connection relay loop.
//!
//! One greeting on accept, then strictly sequential request/response
//! forwarding: receive a text frame, extract the user message, send a typing
//! notice, call the bot endpoint, relay the reply (or the failure). The next
//! inbound frame is not read until the in-flight call has resolved.

use std::{net::SocketAddr, sync::Arc};

use {
    axum::extract::ws::{Message, WebSocket},
    tracing::{Instrument, debug, info, warn},
};

use probot_protocol::{Envelope, extract_user_message, parse_inbound};

use crate::state::GatewayState;

/// Error envelope text for a blank or unextractable user message.
const EMPTY_MESSAGE_ERROR: &str = "빈 메시지는 처리할 수 없습니다.";

/// Substituted when the bot returns a reply that trims to nothing.
const EMPTY_REPLY_FALLBACK: &str = "응답을 생성하지 못했습니다. 다시 시도해 주세요.";

/// Drive one WebSocket connection from accept to disconnect.
///
/// A clean disconnect ends the loop silently. Any other failure gets one
/// best-effort `error` envelope; if that send fails too, the failure is
/// discarded. Nothing here is ever fatal to the process.
pub async fn handle_connection(mut socket: WebSocket, state: Arc<GatewayState>, addr: SocketAddr) {
    let conn_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("ws", %conn_id, %addr);

    async move {
        info!("client connected");

        if let Err(e) = relay_loop(&mut socket, &state).await {
            warn!("connection loop failed: {e}");
            let envelope = Envelope::error(format!("서버 오류: {e}"));
            if let Ok(json) = serde_json::to_string(&envelope) {
                let _ = socket.send(Message::Text(json.into())).await;
            }
        }

        info!("client disconnected");
    }
    .instrument(span)
    .await
}

async fn relay_loop(socket: &mut WebSocket, state: &GatewayState) -> anyhow::Result<()> {
    let greeting = format!("{}입니다. 무엇을 도와드릴까요?", state.config.bot_name);
    if !send_envelope(socket, &Envelope::greeting(greeting)).await? {
        return Ok(());
    }

    while let Some(frame) = socket.recv().await {
        let Ok(message) = frame else {
            // A transport-level failure is a disconnect, not an error.
            return Ok(());
        };
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => return Ok(()),
            // Binary, ping and pong frames don't drive the loop.
            _ => continue,
        };

        let payload = parse_inbound(&text);
        let Some(user_text) = extract_user_message(&payload) else {
            debug!("inbound frame carried no user message");
            if !send_envelope(socket, &Envelope::error(EMPTY_MESSAGE_ERROR)).await? {
                return Ok(());
            }
            continue;
        };

        let typing = format!("{}이(가) 입력 중입니다…", state.config.bot_name);
        if !send_envelope(socket, &Envelope::typing(typing)).await? {
            return Ok(());
        }

        let reply = match state.bot.ask(&user_text).await {
            Ok(reply) => {
                let reply = reply.trim();
                if reply.is_empty() {
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    reply.to_string()
                }
            },
            Err(e) => {
                warn!("bot call failed: {e}");
                if !send_envelope(socket, &Envelope::error(format!("봇 호출 실패: {e}"))).await? {
                    return Ok(());
                }
                continue;
            },
        };

        if !send_envelope(socket, &Envelope::message(reply)).await? {
            return Ok(());
        }
    }

    Ok(())
}

/// Serialize and send one envelope.
///
/// `Ok(false)` means the client is gone and the loop should end quietly;
/// a serialization failure bubbles up as the unexpected-error path.
async fn send_envelope(socket: &mut WebSocket, envelope: &Envelope) -> anyhow::Result<bool> {
    let json = serde_json::to_string(envelope)?;
    Ok(socket.send(Message::Text(json.into())).await.is_ok())
}
