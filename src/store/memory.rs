use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RoomStore, StoreError};
use crate::types::{Room, RoomId};

/// In-memory room store with optimistic versioning.
///
/// All mutation goes through a single write lock, so version checks and
/// commits are atomic per call. The invite-code index is kept in lockstep
/// with the room table.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    rooms: HashMap<RoomId, Room>,
    by_code: HashMap<String, RoomId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn get(&self, room_id: &str) -> Result<Room, StoreError> {
        self.inner
            .read()
            .await
            .rooms
            .get(room_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_invite_code(&self, code: &str) -> Result<Room, StoreError> {
        let tables = self.inner.read().await;
        tables
            .by_code
            .get(&code.to_ascii_uppercase())
            .and_then(|id| tables.rooms.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, room: Room) -> Result<Room, StoreError> {
        let mut tables = self.inner.write().await;
        if tables.by_code.contains_key(&room.invite_code) {
            return Err(StoreError::Conflict);
        }
        tables
            .by_code
            .insert(room.invite_code.clone(), room.id.clone());
        tables.rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn compare_and_update(
        &self,
        room_id: &str,
        base_version: u64,
        mut next: Room,
    ) -> Result<Room, StoreError> {
        let mut tables = self.inner.write().await;
        let current = tables.rooms.get(room_id).ok_or(StoreError::NotFound)?;
        if current.version != base_version {
            return Err(StoreError::Conflict);
        }
        next.version = base_version + 1;
        next.updated_at = chrono::Utc::now().to_rfc3339();
        tables.rooms.insert(room_id.to_string(), next.clone());
        Ok(next)
    }

    async fn delete(&self, room_id: &str) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        if let Some(room) = tables.rooms.remove(room_id) {
            tables.by_code.remove(&room.invite_code);
        }
        Ok(())
    }
}
