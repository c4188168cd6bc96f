//! Lazily-created map of conversation id to room handle.
//!
//! Handles are `Arc<Mutex<Room>>`: callers lock exactly the room they
//! are working on, so distinct conversations never contend. Rooms are
//! never evicted within the process lifetime.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::room::Room;

pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Mutex<Room>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Handle for `room_id`, created on first reference
    pub fn get_or_create(&self, room_id: &str) -> Arc<Mutex<Room>> {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(room = room_id, "room created");
                Arc::new(Mutex::new(Room::new(room_id)))
            })
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_id_returns_the_same_room() {
        let registry = RoomRegistry::new();
        let first = registry.get_or_create("room-1");
        let second = registry.get_or_create("room-1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn distinct_ids_get_distinct_rooms() {
        let registry = RoomRegistry::new();
        let a = registry.get_or_create("room-a");
        let b = registry.get_or_create("room-b");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);

        a.lock().await.outsider_warnings.insert("u".into(), 1);
        assert!(b.lock().await.outsider_warnings.is_empty());
    }
}
