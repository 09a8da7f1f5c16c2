mod room;
mod round;
mod vote;

use std::sync::Arc;

use rand::Rng;

use crate::error::GameError;
use crate::identity::IdentityResolver;
use crate::notify::ChangeNotifier;
use crate::store::{MemoryStore, RoomStore, StoreError};
use crate::types::*;

/// Shared application state
///
/// Every room operation follows the same shape: load the current room,
/// validate, compute the next room, commit via `compare_and_update`, notify
/// subscribers. Losing a commit race reloads and revalidates a bounded
/// number of times before surfacing `StoreUnavailable`.
pub struct AppState {
    pub store: Arc<dyn RoomStore>,
    pub notifier: ChangeNotifier,
    pub identity: IdentityResolver,
    commit_retries: u32,
}

/// What a transition step decided against the freshly loaded room.
pub(crate) enum Transition {
    /// Commit this as the next room state.
    Update(Room),
    /// The operation is already satisfied; nothing to commit or notify.
    Noop,
    /// Remove the room entirely (last player left).
    Delete,
}

pub(crate) enum Applied {
    Committed(Room),
    Unchanged(Room),
    Deleted,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), 3)
    }

    pub fn with_store(store: Arc<dyn RoomStore>, commit_retries: u32) -> Self {
        Self {
            store,
            notifier: ChangeNotifier::new(),
            identity: IdentityResolver::new(),
            commit_retries,
        }
    }

    /// Generate a random invite code (6 uppercase alphanumerics).
    /// Uniqueness is enforced by the store at create time.
    pub(crate) fn generate_invite_code() -> String {
        let mut rng = rand::rng();
        (0..INVITE_CODE_LENGTH)
            .map(|_| INVITE_CODE_CHARS[rng.random_range(0..INVITE_CODE_CHARS.len())] as char)
            .collect()
    }

    /// Run one load-validate-commit cycle, retrying on commit races.
    ///
    /// `step` sees the latest committed room and either produces the next
    /// state or rejects. Validation errors pass through untouched; only a
    /// store-level `Conflict` triggers a reload.
    pub(crate) async fn transact<F>(&self, room_id: &str, mut step: F) -> Result<Applied, GameError>
    where
        F: FnMut(&Room) -> Result<Transition, GameError>,
    {
        let mut attempts = 0;
        loop {
            let current = self.store.get(room_id).await?;
            let base_version = current.version;

            match step(&current)? {
                Transition::Noop => return Ok(Applied::Unchanged(current)),
                Transition::Delete => {
                    self.store.delete(room_id).await?;
                    tracing::info!(room_id, "room deleted");
                    self.notifier.room_deleted(room_id).await;
                    return Ok(Applied::Deleted);
                }
                Transition::Update(next) => {
                    match self
                        .store
                        .compare_and_update(room_id, base_version, next)
                        .await
                    {
                        Ok(committed) => {
                            self.notifier.room_updated(&committed).await;
                            return Ok(Applied::Committed(committed));
                        }
                        Err(StoreError::Conflict) => {
                            attempts += 1;
                            if attempts >= self.commit_retries {
                                tracing::warn!(room_id, attempts, "commit retries exhausted");
                                return Err(GameError::StoreUnavailable);
                            }
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
