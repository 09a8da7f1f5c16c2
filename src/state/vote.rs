//! Vote submission and quorum.

use super::{AppState, Applied, Transition};
use crate::error::GameError;
use crate::types::*;

impl AppState {
    /// Record that a player has voted. The room flips to `Finished` once
    /// every player has voted, `Voting` otherwise.
    ///
    /// The chosen target only matters for quorum bookkeeping outside the
    /// core; here it is validated and logged. Voting twice, or voting in a
    /// finished room, is an idempotent no-op.
    pub async fn submit_vote(
        &self,
        room_id: &str,
        player_id: &str,
        voted_player_id: &str,
        caller_user_id: &str,
    ) -> Result<Room, GameError> {
        let applied = self
            .transact(room_id, |current| {
                let Some(player) = current.player(player_id) else {
                    return Err(GameError::NotAuthorized);
                };
                if player.user_id != caller_user_id {
                    return Err(GameError::NotAuthorized);
                }
                if current.game_state == GameState::Finished {
                    return Ok(Transition::Noop);
                }
                if current.game_state == GameState::Waiting {
                    return Err(GameError::InvalidState(GameState::Waiting));
                }
                if current.player(voted_player_id).is_none() {
                    return Err(GameError::InvalidArgument(
                        "voted player is not in this room".to_string(),
                    ));
                }
                if player.has_voted {
                    return Ok(Transition::Noop);
                }

                let mut next = current.clone();
                for p in next.players.iter_mut() {
                    if p.id == player_id {
                        p.has_voted = true;
                    }
                }
                next.game_state = if next.all_voted() {
                    GameState::Finished
                } else {
                    GameState::Voting
                };
                Ok(Transition::Update(next))
            })
            .await?;

        match applied {
            Applied::Committed(room) => {
                tracing::info!(
                    room_id = %room.id,
                    voter = player_id,
                    target = voted_player_id,
                    state = ?room.game_state,
                    "vote recorded"
                );
                Ok(room)
            }
            Applied::Unchanged(room) => Ok(room),
            Applied::Deleted => Err(GameError::NotFound),
        }
    }
}
