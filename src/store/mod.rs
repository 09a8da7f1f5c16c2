//! Room persistence abstraction.
//!
//! One record per room, keyed by id with a secondary unique index on the
//! invite code. `compare_and_update` is the single concurrency primitive the
//! rest of the system relies on: a commit only lands if the caller's base
//! version is still current, so two racing writers can never both win
//! silently.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Room;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("room does not exist")]
    NotFound,
    #[error("room was modified concurrently")]
    Conflict,
    #[error("store unavailable")]
    Unavailable,
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get(&self, room_id: &str) -> Result<Room, StoreError>;

    /// Lookup by invite code. Input is normalized to uppercase.
    async fn get_by_invite_code(&self, code: &str) -> Result<Room, StoreError>;

    /// Insert a new room. Fails with `Conflict` if the invite code is
    /// already held by a live room.
    async fn create(&self, room: Room) -> Result<Room, StoreError>;

    /// Commit `next` iff the stored version still equals `base_version`.
    /// The committed room gets a bumped version and a fresh `updated_at`.
    async fn compare_and_update(
        &self,
        room_id: &str,
        base_version: u64,
        next: Room,
    ) -> Result<Room, StoreError>;

    /// Remove the room and release its invite code. Terminal.
    async fn delete(&self, room_id: &str) -> Result<(), StoreError>;
}
