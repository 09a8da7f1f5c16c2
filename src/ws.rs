//! WebSocket endpoint: the operation surface plus the subscription surface.
//!
//! Each connection is bound to one resolved user (device id and display
//! name arrive as query parameters). A connection watches at most one room
//! at a time; creating or joining a room implicitly subscribes to it, and
//! every event on that stream is projected per-viewer before it goes out.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::GameError;
use crate::notify::RoomEvent;
use crate::protocol::{ClientMessage, RoomView, ServerMessage};
use crate::state::AppState;
use crate::types::User;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Opaque device identity minted by the client and persisted there.
    pub device: String,
    pub name: String,
    pub photo: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!(device = %params.device, name = %params.name, "WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let user = state
        .identity
        .resolve(&params.device, &params.name, params.photo)
        .await;

    let welcome = ServerMessage::Welcome {
        protocol: "1.0".to_string(),
        user: user.clone(),
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if let Ok(msg) = serde_json::to_string(&welcome) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            tracing::error!("Failed to send welcome message");
            return;
        }
    }

    // The room stream this connection is watching, if any. Replaced on
    // create/join/subscribe; cleared when the room is deleted.
    let mut room_rx: Option<broadcast::Receiver<RoomEvent>> = None;

    loop {
        tokio::select! {
            event = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending::<Result<RoomEvent, broadcast::error::RecvError>>().await,
                }
            } => {
                match event {
                    Ok(RoomEvent::Updated(room)) => {
                        let msg = ServerMessage::RoomUpdate {
                            room: RoomView::project(&room, &user.id),
                        };
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(RoomEvent::Deleted { room_id }) => {
                        room_rx = None;
                        let msg = ServerMessage::RoomDeleted { room_id };
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // The next recv yields the oldest retained snapshot;
                        // snapshots are full state so nothing is lost for good.
                        tracing::warn!(skipped, "subscriber lagged behind room updates");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        room_rx = None;
                    }
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                let watch = match &client_msg {
                                    ClientMessage::Subscribe { room_id } => Some(room_id.clone()),
                                    _ => None,
                                };

                                if let Some(response) =
                                    handle_message(client_msg, &user, &state).await
                                {
                                    // Entering a room implicitly watches it.
                                    if let ServerMessage::RoomJoined { room, .. } = &response {
                                        room_rx = Some(state.notifier.subscribe(&room.id).await);
                                    }
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            tracing::error!("Failed to send response");
                                            break;
                                        }
                                    }
                                }

                                if let Some(room_id) = watch {
                                    room_rx = Some(state.notifier.subscribe(&room_id).await);
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!(user_id = %user.id, "WebSocket connection closed");
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    user: &User,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateRoom => match state.create_room(user).await {
            Ok((room, player)) => Some(ServerMessage::RoomJoined {
                room: RoomView::project(&room, &user.id),
                player_id: player.id,
            }),
            Err(err) => Some(error_message(err)),
        },

        ClientMessage::JoinRoom { invite_code } => {
            match state.join_room(user, &invite_code).await {
                Ok((room, player)) => Some(ServerMessage::RoomJoined {
                    room: RoomView::project(&room, &user.id),
                    player_id: player.id,
                }),
                Err(err) => Some(error_message(err)),
            }
        }

        ClientMessage::UpdateTimer { room_id, minutes } => {
            match state.update_timer(&room_id, &user.id, minutes).await {
                Ok(room) => Some(room_update(&room, user)),
                Err(err) => Some(error_message(err)),
            }
        }

        ClientMessage::StartGame { room_id } => {
            match state.start_game(&room_id, &user.id).await {
                Ok(room) => Some(room_update(&room, user)),
                Err(err) => Some(error_message(err)),
            }
        }

        ClientMessage::LeaveRoom { room_id, player_id } => {
            match state.leave_room(&room_id, &player_id, &user.id).await {
                Ok(Some(room)) => Some(room_update(&room, user)),
                Ok(None) => Some(ServerMessage::RoomDeleted { room_id }),
                Err(err) => Some(error_message(err)),
            }
        }

        ClientMessage::SubmitVote {
            room_id,
            player_id,
            voted_player_id,
        } => {
            match state
                .submit_vote(&room_id, &player_id, &voted_player_id, &user.id)
                .await
            {
                Ok(room) => Some(room_update(&room, user)),
                Err(err) => Some(error_message(err)),
            }
        }

        // Subscription swap happens at the socket layer.
        ClientMessage::Subscribe { .. } => None,

        ClientMessage::UpdateProfile {
            name,
            profile_photo_url,
        } => {
            let mut updated = state.identity.update_name(&user.id, &name).await;
            if let Some(url) = profile_photo_url {
                updated = state.identity.set_photo(&user.id, url).await;
            }
            match updated {
                Some(user) => Some(ServerMessage::ProfileUpdated { user }),
                None => Some(error_message(GameError::NotAuthorized)),
            }
        }
    }
}

fn room_update(room: &crate::types::Room, user: &User) -> ServerMessage {
    ServerMessage::RoomUpdate {
        room: RoomView::project(room, &user.id),
    }
}

fn error_message(err: GameError) -> ServerMessage {
    ServerMessage::Error {
        code: err.code().to_string(),
        msg: err.to_string(),
    }
}
