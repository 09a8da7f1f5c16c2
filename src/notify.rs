//! Change notification: fan-out of committed room state to subscribers.
//!
//! One broadcast channel per room id. Delivery is at-least-once and FIFO per
//! room; a receiver that falls behind observes `Lagged` and resumes with the
//! freshest value, which is acceptable because every event carries a full
//! snapshot.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};

use crate::types::{Room, RoomId};

const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub enum RoomEvent {
    Updated(Room),
    Deleted { room_id: RoomId },
}

#[derive(Default)]
pub struct ChangeNotifier {
    channels: RwLock<HashMap<RoomId, broadcast::Sender<RoomEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a room's event stream. The channel is created on demand
    /// so a client may subscribe before the first commit it will observe.
    pub async fn subscribe(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub async fn room_updated(&self, room: &Room) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&room.id) {
            // No receivers connected is fine
            let _ = tx.send(RoomEvent::Updated(room.clone()));
        }
    }

    /// Emit the deletion signal and drop the channel; the room id is dead.
    pub async fn room_deleted(&self, room_id: &str) {
        let tx = self.channels.write().await.remove(room_id);
        if let Some(tx) = tx {
            let _ = tx.send(RoomEvent::Deleted {
                room_id: room_id.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameState;

    fn sample_room(id: &str, version: u64) -> Room {
        let now = chrono::Utc::now().to_rfc3339();
        Room {
            id: id.to_string(),
            invite_code: "AB12CD".to_string(),
            host_id: "host".to_string(),
            players: Vec::new(),
            game_state: GameState::Waiting,
            current_word: None,
            timer_seconds: 480,
            started_at: None,
            version,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn delivers_updates_in_commit_order() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe("r1").await;

        notifier.room_updated(&sample_room("r1", 1)).await;
        notifier.room_updated(&sample_room("r1", 2)).await;

        match rx.recv().await.unwrap() {
            RoomEvent::Updated(room) => assert_eq!(room.version, 1),
            other => panic!("expected update, got {other:?}"),
        }
        match rx.recv().await.unwrap() {
            RoomEvent::Updated(room) => assert_eq!(room.version, 2),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn updates_for_other_rooms_are_not_delivered() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe("r1").await;

        notifier.room_updated(&sample_room("r2", 1)).await;
        notifier.room_updated(&sample_room("r1", 1)).await;

        match rx.recv().await.unwrap() {
            RoomEvent::Updated(room) => assert_eq!(room.id, "r1"),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deletion_is_terminal() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe("r1").await;

        notifier.room_deleted("r1").await;

        match rx.recv().await.unwrap() {
            RoomEvent::Deleted { room_id } => assert_eq!(room_id, "r1"),
            other => panic!("expected deletion, got {other:?}"),
        }
        // The channel is gone; the sender side is closed.
        assert!(rx.recv().await.is_err());
    }
}
