use thiserror::Error;

use crate::store::StoreError;
use crate::types::{GameState, MIN_PLAYERS};

/// Validation and infrastructure failures surfaced by room operations.
///
/// Every kind except `StoreUnavailable` is a logical rejection that must not
/// be retried; `StoreUnavailable` is transient and safe to retry with
/// backoff.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("room not found")]
    NotFound,
    #[error("room is full")]
    RoomFull,
    #[error("game has already started")]
    GameAlreadyStarted,
    #[error("you are not allowed to do that")]
    NotAuthorized,
    #[error("at least {MIN_PLAYERS} players are required to start the game")]
    NotEnoughPlayers,
    #[error("operation not allowed while the room is {0:?}")]
    InvalidState(GameState),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("store unavailable, try again later")]
    StoreUnavailable,
}

impl GameError {
    /// Stable wire code for the protocol's `Error` message.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotFound => "ROOM_NOT_FOUND",
            GameError::RoomFull => "ROOM_FULL",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::NotAuthorized => "NOT_AUTHORIZED",
            GameError::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            GameError::InvalidState(_) => "INVALID_STATE",
            GameError::InvalidArgument(_) => "INVALID_ARGUMENT",
            GameError::StoreUnavailable => "STORE_UNAVAILABLE",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::StoreUnavailable)
    }
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => GameError::NotFound,
            // A Conflict that escapes the state machine's retry loop is
            // indistinguishable from an unavailable store to the caller.
            StoreError::Conflict | StoreError::Unavailable => GameError::StoreUnavailable,
        }
    }
}
