//! Per-screen client adapter.
//!
//! Thin convenience layer a presentation layer drives: who am I in this
//! room, which screen should be showing, when does the round end. Also the
//! defensive decoder for room snapshots arriving over a transport.

use chrono::{DateTime, Duration, Utc};

use crate::types::{GameState, Player, Room, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Lobby,
    Game,
    Results,
}

/// One user's view of their membership in a room.
pub struct RoomSession {
    pub room: Room,
    pub user_id: UserId,
}

/// What the results screen shows once a round is over.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub spy: Player,
    pub location: Option<String>,
}

impl RoomSession {
    pub fn new(room: Room, user_id: impl Into<UserId>) -> Self {
        Self {
            room,
            user_id: user_id.into(),
        }
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.room.player_for_user(&self.user_id)
    }

    pub fn is_host(&self) -> bool {
        self.current_player().map(|p| p.is_host).unwrap_or(false)
    }

    pub fn is_spy(&self) -> bool {
        self.current_player().map(|p| p.is_spy).unwrap_or(false)
    }

    /// Which screen the presentation layer should be on.
    pub fn screen(&self) -> Screen {
        match self.room.game_state {
            GameState::Waiting => Screen::Lobby,
            GameState::Playing | GameState::Voting => Screen::Game,
            GameState::Finished => Screen::Results,
        }
    }

    /// Round deadline derived from the start marker plus the configured
    /// duration; the server never counts down.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        let started = self.room.started_at.as_deref()?;
        let started = DateTime::parse_from_rfc3339(started)
            .ok()?
            .with_timezone(&Utc);
        Some(started + Duration::seconds(i64::from(self.room.timer_seconds)))
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        if self.room.game_state != GameState::Finished {
            return None;
        }
        Some(RoundOutcome {
            spy: self.room.spy()?.clone(),
            location: self.room.current_word.clone(),
        })
    }
}

/// Decode a room snapshot from a loosely-typed transport payload.
///
/// Payloads that fail the schema or are missing identifiers are dropped
/// whole; a partial apply is never an option.
pub fn decode_snapshot(value: serde_json::Value) -> Option<Room> {
    let room: Room = match serde_json::from_value(value) {
        Ok(room) => room,
        Err(err) => {
            tracing::warn!(%err, "dropping malformed room snapshot");
            return None;
        }
    };
    if room.id.is_empty() || room.invite_code.is_empty() {
        tracing::warn!("dropping room snapshot with missing identifiers");
        return None;
    }
    Some(room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn room_in(state: GameState) -> Room {
        let player = |id: &str, user: &str, host: bool, spy: bool| Player {
            id: id.to_string(),
            user_id: user.to_string(),
            name: user.to_string(),
            profile_photo_url: None,
            is_host: host,
            is_spy: spy,
            has_voted: false,
        };
        Room {
            id: "r1".to_string(),
            invite_code: "AB12CD".to_string(),
            host_id: "u1".to_string(),
            players: vec![
                player("p1", "u1", true, false),
                player("p2", "u2", false, true),
                player("p3", "u3", false, false),
            ],
            game_state: state,
            current_word: Some("Lighthouse".to_string()),
            timer_seconds: 480,
            started_at: Some("2026-02-01T12:00:00+00:00".to_string()),
            version: 3,
            created_at: "2026-02-01T11:00:00+00:00".to_string(),
            updated_at: "2026-02-01T12:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn screen_follows_game_state() {
        assert_eq!(RoomSession::new(room_in(GameState::Waiting), "u1").screen(), Screen::Lobby);
        assert_eq!(RoomSession::new(room_in(GameState::Playing), "u1").screen(), Screen::Game);
        assert_eq!(RoomSession::new(room_in(GameState::Voting), "u1").screen(), Screen::Game);
        assert_eq!(RoomSession::new(room_in(GameState::Finished), "u1").screen(), Screen::Results);
    }

    #[test]
    fn deadline_is_start_plus_timer() {
        let session = RoomSession::new(room_in(GameState::Playing), "u1");
        let deadline = session.deadline().unwrap();
        assert_eq!(deadline.to_rfc3339(), "2026-02-01T12:08:00+00:00");
    }

    #[test]
    fn no_deadline_before_start() {
        let mut room = room_in(GameState::Waiting);
        room.started_at = None;
        assert!(RoomSession::new(room, "u1").deadline().is_none());
    }

    #[test]
    fn host_and_spy_lookups() {
        let session = RoomSession::new(room_in(GameState::Playing), "u2");
        assert!(!session.is_host());
        assert!(session.is_spy());
        assert_eq!(session.current_player().unwrap().id, "p2");
    }

    #[test]
    fn outcome_only_once_finished() {
        assert!(RoomSession::new(room_in(GameState::Voting), "u1").outcome().is_none());

        let outcome = RoomSession::new(room_in(GameState::Finished), "u1")
            .outcome()
            .unwrap();
        assert_eq!(outcome.spy.id, "p2");
        assert_eq!(outcome.location.as_deref(), Some("Lighthouse"));
    }

    #[test]
    fn decode_snapshot_accepts_well_formed_rooms() {
        let value = serde_json::to_value(room_in(GameState::Playing)).unwrap();
        let room = decode_snapshot(value).unwrap();
        assert_eq!(room.id, "r1");
        assert_eq!(room.players.len(), 3);
    }

    #[test]
    fn decode_snapshot_drops_missing_fields() {
        assert!(decode_snapshot(serde_json::json!({ "id": "r1" })).is_none());
    }

    #[test]
    fn decode_snapshot_drops_empty_identifiers() {
        let mut value = serde_json::to_value(room_in(GameState::Playing)).unwrap();
        value["invite_code"] = serde_json::json!("");
        assert!(decode_snapshot(value).is_none());
    }

    #[test]
    fn decode_snapshot_drops_malformed_player_lists() {
        let mut value = serde_json::to_value(room_in(GameState::Playing)).unwrap();
        value["players"] = serde_json::json!([{ "id": "p1" }]);
        assert!(decode_snapshot(value).is_none());
    }
}
