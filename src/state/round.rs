//! Round configuration and start: host-only operations.

use super::{AppState, Applied, Transition};
use crate::error::GameError;
use crate::types::*;
use crate::{catalog, randomizer};

impl AppState {
    /// Change the round duration. Host-only, lobby-only.
    pub async fn update_timer(
        &self,
        room_id: &str,
        host_user_id: &str,
        minutes: u32,
    ) -> Result<Room, GameError> {
        if !ALLOWED_TIMER_MINUTES.contains(&minutes) {
            return Err(GameError::InvalidArgument(format!(
                "timer must be one of {ALLOWED_TIMER_MINUTES:?} minutes"
            )));
        }

        let applied = self
            .transact(room_id, |current| {
                if current.host_id != host_user_id {
                    return Err(GameError::NotAuthorized);
                }
                if current.game_state != GameState::Waiting {
                    return Err(GameError::InvalidState(current.game_state));
                }
                let mut next = current.clone();
                next.timer_seconds = minutes * 60;
                Ok(Transition::Update(next))
            })
            .await?;

        match applied {
            Applied::Committed(room) | Applied::Unchanged(room) => Ok(room),
            Applied::Deleted => Err(GameError::NotFound),
        }
    }

    /// Start the round: assign one spy uniformly at random, reset votes,
    /// draw a location, and stamp the start marker clients derive the
    /// deadline from. The configured timer is preserved.
    pub async fn start_game(&self, room_id: &str, host_user_id: &str) -> Result<Room, GameError> {
        let applied = self
            .transact(room_id, |current| {
                if current.host_id != host_user_id {
                    return Err(GameError::NotAuthorized);
                }
                if current.game_state != GameState::Waiting {
                    return Err(GameError::InvalidState(current.game_state));
                }
                if current.players.len() < MIN_PLAYERS {
                    return Err(GameError::NotEnoughPlayers);
                }

                let mut next = current.clone();
                let spy_index = randomizer::pick_spy(next.players.len());
                for (idx, player) in next.players.iter_mut().enumerate() {
                    player.is_spy = idx == spy_index;
                    player.has_voted = false;
                }
                next.current_word = Some(randomizer::pick_location(catalog::LOCATIONS));
                next.game_state = GameState::Playing;
                next.started_at = Some(chrono::Utc::now().to_rfc3339());
                Ok(Transition::Update(next))
            })
            .await?;

        match applied {
            Applied::Committed(room) | Applied::Unchanged(room) => {
                tracing::info!(room_id = %room.id, players = room.players.len(), "round started");
                Ok(room)
            }
            Applied::Deleted => Err(GameError::NotFound),
        }
    }
}
