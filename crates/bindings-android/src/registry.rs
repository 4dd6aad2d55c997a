// Handle registry backing the jlong handles given to Java

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use vlc_facade_core::{PlayerError, Result};

/// Maps handles to players. Handles are never reused within a process.
pub struct PlayerRegistry<T> {
    players: Mutex<HashMap<i64, Arc<T>>>,
    next_id: AtomicI64,
}

impl<T> PlayerRegistry<T> {
    pub fn new() -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn register(&self, player: T) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.players.lock().insert(id, Arc::new(player));
        log::info!("Player registered with handle {}", id);
        id
    }

    /// Look up a player. The registry lock is dropped before returning so
    /// callers never hold it while talking to the engine.
    pub fn get(&self, id: i64) -> Result<Arc<T>> {
        self.players
            .lock()
            .get(&id)
            .cloned()
            .ok_or(PlayerError::InvalidHandle(id))
    }

    pub fn with_player<R>(&self, id: i64, f: impl FnOnce(&T) -> Result<R>) -> Result<R> {
        let player = self.get(id)?;
        f(&player)
    }

    pub fn remove(&self, id: i64) -> Result<Arc<T>> {
        self.players
            .lock()
            .remove(&id)
            .ok_or(PlayerError::InvalidHandle(id))
    }

    pub fn len(&self) -> usize {
        self.players.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for PlayerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique_and_not_reused() {
        let registry = PlayerRegistry::new();
        let a = registry.register("a");
        let b = registry.register("b");
        assert_ne!(a, b);

        registry.remove(a).unwrap();
        let c = registry.register("c");
        assert!(c != a && c != b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_handle_is_an_error() {
        let registry: PlayerRegistry<&str> = PlayerRegistry::new();
        assert_eq!(registry.get(7).err(), Some(PlayerError::InvalidHandle(7)));
        assert_eq!(registry.remove(7).err(), Some(PlayerError::InvalidHandle(7)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_with_player_runs_against_registered_value() {
        let registry = PlayerRegistry::new();
        let id = registry.register(String::from("player"));
        let len = registry.with_player(id, |p| Ok(p.len())).unwrap();
        assert_eq!(len, 6);

        // Removed players are still usable by whoever already holds them.
        let held = registry.get(id).unwrap();
        registry.remove(id).unwrap();
        assert_eq!(held.as_str(), "player");
        assert!(registry.with_player(id, |p| Ok(p.len())).is_err());
    }
}
