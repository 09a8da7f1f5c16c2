//! Room membership operations: create, join, leave.

use super::{AppState, Applied, Transition};
use crate::error::GameError;
use crate::store::StoreError;
use crate::types::*;

impl AppState {
    /// Create a new room with the caller as host.
    ///
    /// Only fails when the store is down; an invite-code collision with a
    /// live room just draws a fresh code.
    pub async fn create_room(&self, user: &User) -> Result<(Room, Player), GameError> {
        let host = Player::from_user(user, true);
        let now = chrono::Utc::now().to_rfc3339();

        let room = loop {
            let candidate = Room {
                id: ulid::Ulid::new().to_string(),
                invite_code: Self::generate_invite_code(),
                host_id: user.id.clone(),
                players: vec![host.clone()],
                game_state: GameState::Waiting,
                current_word: None,
                timer_seconds: DEFAULT_TIMER_SECONDS,
                started_at: None,
                version: 1,
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            match self.store.create(candidate).await {
                Ok(created) => break created,
                // Code already taken - try again (rare with 36^6 combinations)
                Err(StoreError::Conflict) => continue,
                Err(err) => return Err(err.into()),
            }
        };

        tracing::info!(room_id = %room.id, invite_code = %room.invite_code, "room created");
        self.notifier.room_updated(&room).await;
        Ok((room, host))
    }

    /// Join a room by invite code (case-insensitive).
    ///
    /// Rejoining a room the user is already in returns the existing player
    /// unchanged.
    pub async fn join_room(&self, user: &User, invite_code: &str) -> Result<(Room, Player), GameError> {
        let room = self.store.get_by_invite_code(invite_code).await?;
        let joiner = Player::from_user(user, false);
        let user_id = user.id.clone();

        let room = match self
            .transact(&room.id, |current| {
                if current.is_full() {
                    return Err(GameError::RoomFull);
                }
                if current.game_state != GameState::Waiting {
                    return Err(GameError::GameAlreadyStarted);
                }
                if current.player_for_user(&user_id).is_some() {
                    return Ok(Transition::Noop);
                }
                let mut next = current.clone();
                next.players.push(joiner.clone());
                Ok(Transition::Update(next))
            })
            .await?
        {
            Applied::Committed(room) | Applied::Unchanged(room) => room,
            // join never deletes
            Applied::Deleted => return Err(GameError::NotFound),
        };

        let player = room
            .player_for_user(&user.id)
            .cloned()
            .ok_or(GameError::NotFound)?;
        tracing::info!(room_id = %room.id, player_id = %player.id, "player joined");
        Ok((room, player))
    }

    /// Remove a player from a room. Idempotent: leaving a room the player
    /// is no longer in (or that no longer exists) is not an error.
    ///
    /// Returns `None` when the last player left and the room was deleted.
    pub async fn leave_room(
        &self,
        room_id: &str,
        player_id: &str,
        caller_user_id: &str,
    ) -> Result<Option<Room>, GameError> {
        let outcome = self
            .transact(room_id, |current| {
                let Some(player) = current.player(player_id) else {
                    // Already gone, possibly a duplicate leave
                    return Ok(Transition::Noop);
                };
                if player.user_id != caller_user_id {
                    return Err(GameError::NotAuthorized);
                }

                let was_host = player.is_host;
                let was_spy = player.is_spy;
                let mut next = current.clone();
                next.players.retain(|p| p.id != player_id);

                if next.players.is_empty() {
                    return Ok(Transition::Delete);
                }
                if was_host {
                    for (idx, p) in next.players.iter_mut().enumerate() {
                        p.is_host = idx == 0;
                    }
                    next.host_id = next.players[0].user_id.clone();
                }
                // A mid-round departure can end the round: without the spy
                // there is nothing left to guess, and during voting the
                // remaining ballots may now be complete.
                if matches!(next.game_state, GameState::Playing | GameState::Voting)
                    && (was_spy || (next.game_state == GameState::Voting && next.all_voted()))
                {
                    next.game_state = GameState::Finished;
                }
                Ok(Transition::Update(next))
            })
            .await;

        match outcome {
            Ok(Applied::Deleted) => Ok(None),
            Ok(Applied::Committed(room)) | Ok(Applied::Unchanged(room)) => Ok(Some(room)),
            // The room vanished underneath us; leaving it is moot.
            Err(GameError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
