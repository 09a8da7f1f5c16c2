use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type UserId = String;
pub type PlayerId = String;
pub type RoomId = String;

/// Room capacity limits
pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 10;

/// Default round duration (8 minutes)
pub const DEFAULT_TIMER_SECONDS: u32 = 480;

/// Timer durations the host may pick, in minutes
pub const ALLOWED_TIMER_MINUTES: &[u32] = &[5, 8, 10, 15];

/// Invite code alphabet: uppercase alphanumeric, 6 characters
pub const INVITE_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const INVITE_CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Waiting,
    Playing,
    Voting,
    Finished,
}

/// A device-scoped user record. The id is minted once per device and never
/// changes; name and photo are mutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub profile_photo_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A user's membership record within one room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub user_id: UserId,
    pub name: String,
    pub profile_photo_url: Option<String>,
    pub is_host: bool,
    pub is_spy: bool,
    pub has_voted: bool,
}

impl Player {
    pub fn from_user(user: &User, is_host: bool) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            user_id: user.id.clone(),
            name: user.name.clone(),
            profile_photo_url: user.profile_photo_url.clone(),
            is_host,
            is_spy: false,
            has_voted: false,
        }
    }
}

/// One game session. The full player list is held inline because every
/// transition rewrites it atomically as a single value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub invite_code: String,
    pub host_id: UserId,
    pub players: Vec<Player>,
    pub game_state: GameState,
    pub current_word: Option<String>,
    pub timer_seconds: u32,
    /// Set when the round starts; clients derive the round deadline from
    /// this plus `timer_seconds`. There is no server-side countdown.
    pub started_at: Option<String>,
    /// Optimistic concurrency token, bumped on every committed update.
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl Room {
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_for_user(&self, user_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn spy(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_spy)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn all_voted(&self) -> bool {
        self.players.iter().all(|p| p.has_voted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: format!("user-{id}"),
            profile_photo_url: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn player_from_user_copies_profile() {
        let u = user("u1");
        let p = Player::from_user(&u, true);
        assert_eq!(p.user_id, "u1");
        assert_eq!(p.name, "user-u1");
        assert!(p.is_host);
        assert!(!p.is_spy);
        assert!(!p.has_voted);
    }

    #[test]
    fn game_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GameState::Waiting).unwrap(),
            "\"waiting\""
        );
        assert_eq!(
            serde_json::to_string(&GameState::Finished).unwrap(),
            "\"finished\""
        );
    }
}
