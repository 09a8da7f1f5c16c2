use serde::{Deserialize, Serialize};

use crate::types::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom,
    JoinRoom {
        invite_code: String,
    },
    UpdateTimer {
        room_id: RoomId,
        minutes: u32,
    },
    StartGame {
        room_id: RoomId,
    },
    LeaveRoom {
        room_id: RoomId,
        player_id: PlayerId,
    },
    SubmitVote {
        room_id: RoomId,
        player_id: PlayerId,
        voted_player_id: PlayerId,
    },
    /// Watch a room's update stream (handled at the socket layer).
    Subscribe {
        room_id: RoomId,
    },
    UpdateProfile {
        name: String,
        profile_photo_url: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        user: User,
        server_now: String,
    },
    RoomJoined {
        room: RoomView,
        player_id: PlayerId,
    },
    RoomUpdate {
        room: RoomView,
    },
    RoomDeleted {
        room_id: RoomId,
    },
    ProfileUpdated {
        user: User,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// Public player info: the spy flag never appears here, each recipient only
/// learns their own role through `RoomView::you_are_spy`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub user_id: UserId,
    pub name: String,
    pub profile_photo_url: Option<String>,
    pub is_host: bool,
    pub has_voted: bool,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            user_id: p.user_id.clone(),
            name: p.name.clone(),
            profile_photo_url: p.profile_photo_url.clone(),
            is_host: p.is_host,
            has_voted: p.has_voted,
        }
    }
}

/// What one recipient is allowed to see of a room.
///
/// While a round runs, the location is withheld from the spy (and from
/// anyone not in the room), and nobody can see who the spy is. Once the
/// room is finished both are revealed for the results screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomView {
    pub id: RoomId,
    pub invite_code: String,
    pub host_id: UserId,
    pub players: Vec<PlayerView>,
    pub game_state: GameState,
    pub current_word: Option<String>,
    pub timer_seconds: u32,
    pub started_at: Option<String>,
    pub you_are_spy: bool,
    pub spy_player_id: Option<PlayerId>,
    pub version: u64,
    pub updated_at: String,
}

impl RoomView {
    pub fn project(room: &Room, viewer_user_id: &str) -> Self {
        let viewer = room.player_for_user(viewer_user_id);
        let viewer_is_spy = viewer.map(|p| p.is_spy).unwrap_or(false);
        let finished = room.game_state == GameState::Finished;

        let current_word = match room.game_state {
            GameState::Waiting => None,
            GameState::Finished => room.current_word.clone(),
            GameState::Playing | GameState::Voting => {
                if viewer.is_some() && !viewer_is_spy {
                    room.current_word.clone()
                } else {
                    None
                }
            }
        };

        Self {
            id: room.id.clone(),
            invite_code: room.invite_code.clone(),
            host_id: room.host_id.clone(),
            players: room.players.iter().map(PlayerView::from).collect(),
            game_state: room.game_state,
            current_word,
            timer_seconds: room.timer_seconds,
            started_at: room.started_at.clone(),
            you_are_spy: viewer_is_spy,
            spy_player_id: if finished {
                room.spy().map(|p| p.id.clone())
            } else {
                None
            },
            version: room.version,
            updated_at: room.updated_at.clone(),
        }
    }
}
