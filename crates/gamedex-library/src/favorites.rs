//! Persisted favorites

use crate::record::{GameId, GameRecord};
use gamedex_storage::{KeyValueStore, load_json, save_json};
use std::collections::HashSet;
use std::sync::Arc;

/// Storage key holding the JSON array of favorite snapshots
pub const FAVORITES_KEY: &str = "favorites";

/// Favorite games, mirrored in memory and written through on every change.
///
/// Each favorite is a full snapshot of the record at the time it was added.
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<GameRecord>,
    ids: HashSet<String>,
}

impl FavoritesStore {
    /// Load favorites from `store`. Missing or unreadable data yields an empty set.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let stored: Vec<GameRecord> = match load_json(store.as_ref(), FAVORITES_KEY) {
            Ok(Some(favorites)) => favorites,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable favorites: {}", e);
                Vec::new()
            }
        };

        let mut favorites = Vec::with_capacity(stored.len());
        let mut ids = HashSet::with_capacity(stored.len());
        for record in stored {
            if ids.insert(record.key()) {
                favorites.push(record);
            } else {
                tracing::warn!("Dropping duplicate favorite {}", record.id);
            }
        }

        tracing::debug!("Loaded {} favorites", favorites.len());

        Self {
            store,
            favorites,
            ids,
        }
    }

    pub fn is_favorite(&self, id: &GameId) -> bool {
        self.ids.contains(&id.key())
    }

    /// Add `record` if absent, remove it if present.
    ///
    /// Returns whether the game is a favorite afterwards. The new set is
    /// persisted immediately; a failed write is logged and otherwise ignored.
    pub fn toggle(&mut self, record: &GameRecord) -> bool {
        let key = record.key();

        let now_favorite = if self.ids.remove(&key) {
            self.favorites.retain(|fav| fav.key() != key);
            false
        } else {
            self.ids.insert(key);
            self.favorites.push(record.clone());
            true
        };

        self.persist();
        now_favorite
    }

    /// Favorites in the order they were added
    pub fn list(&self) -> &[GameRecord] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), FAVORITES_KEY, &self.favorites) {
            tracing::warn!("Failed to persist favorites: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedex_storage::{FileStore, MemoryStore};

    fn zelda() -> GameRecord {
        GameRecord::new(42, "The Legend of Zelda")
            .with_genres(["Adventure"])
            .with_rating(4.8)
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone());
        assert!(favorites.is_empty());

        assert!(favorites.toggle(&zelda()));
        assert!(favorites.is_favorite(&GameId::Number(42)));
        assert_eq!(favorites.len(), 1);

        assert!(!favorites.toggle(&zelda()));
        assert!(!favorites.is_favorite(&GameId::Number(42)));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_double_toggle_restores_persisted_content() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone());
        favorites.toggle(&GameRecord::new(1, "Celeste"));
        let before = store.get_raw(FAVORITES_KEY).unwrap();

        favorites.toggle(&zelda());
        favorites.toggle(&zelda());

        assert_eq!(store.get_raw(FAVORITES_KEY).unwrap(), before);
        assert_eq!(favorites.len(), 1);
    }

    #[test]
    fn test_snapshot_is_kept_as_favorited() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone());
        favorites.toggle(&zelda());

        // The remote record changes later; the favorite does not follow
        let updated = zelda().with_rating(1.0);
        assert!(favorites.is_favorite(&updated.id));
        assert_eq!(favorites.list()[0].rating, Some(4.8));
    }

    #[test]
    fn test_favorites_survive_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let store = Arc::new(FileStore::open(dir.path()).unwrap());
            let mut favorites = FavoritesStore::load(store);
            favorites.toggle(&zelda());
            favorites.toggle(&GameRecord::new("abc", "Hades"));
        }

        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let favorites = FavoritesStore::load(store);
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites.list()[0], zelda());
        assert!(favorites.is_favorite(&GameId::Text("abc".into())));
    }

    #[test]
    fn test_persisted_layout_is_json_array() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone());
        favorites.toggle(&GameRecord::new(7, "Celeste"));

        let raw = store.get_raw(FAVORITES_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], 7);
        assert_eq!(value[0]["name"], "Celeste");
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set_raw(FAVORITES_KEY, "{not json").unwrap();

        let favorites = FavoritesStore::load(store);
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_duplicate_snapshots_are_collapsed() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_raw(FAVORITES_KEY, r#"[{"id":1,"name":"A"},{"id":1,"name":"B"}]"#)
            .unwrap();

        let favorites = FavoritesStore::load(store);
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites.list()[0].name.as_deref(), Some("A"));
    }

    #[test]
    fn test_unavailable_storage_is_best_effort() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone());
        store.set_unavailable(true);

        // In-memory state still changes
        assert!(favorites.toggle(&zelda()));
        assert!(favorites.is_favorite(&GameId::Number(42)));
        assert!(store.get_raw(FAVORITES_KEY).unwrap().is_none());
    }
}
