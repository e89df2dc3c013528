//! Persistence seam: load/save games and players by key.
//!
//! The engine holds no process-wide registry. Callers pick a [`GameStore`]
//! and are responsible for serializing mutations of one game.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{GameId, TakGame};

#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display("no such game found: {id}")]
    GameNotFound { id: GameId },

    #[display("no such player found: {name}")]
    PlayerNotFound { name: String },

    #[display("storage backend failure: {message}")]
    Backend { message: String },

    #[display("stored record could not be decoded: {source}")]
    Codec { source: serde_json::Error },
}

impl From<serde_json::Error> for StoreError {
    fn from(source: serde_json::Error) -> Self {
        StoreError::Codec { source }
    }
}

/// A known player and the games they created or sat at.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub played_games: Vec<GameId>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Player {
        Player {
            name: name.into(),
            played_games: Vec::new(),
        }
    }

    /// Remember `id`, once.
    pub fn record_game(&mut self, id: &GameId) {
        if !self.played_games.contains(id) {
            self.played_games.push(id.clone());
        }
    }
}

pub trait GameStore: Send + Sync {
    /// Insert or replace a game under its id.
    fn save_game(&self, game: &TakGame) -> Result<(), StoreError>;
    fn load_game(&self, id: &GameId) -> Result<TakGame, StoreError>;
    /// Insert or replace a player under their name.
    fn save_player(&self, player: &Player) -> Result<(), StoreError>;
    fn load_player(&self, name: &str) -> Result<Player, StoreError>;
    fn player_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Load a player, or a fresh record if they have never been seen.
    fn load_or_new_player(&self, name: &str) -> Result<Player, StoreError> {
        match self.load_player(name) {
            Err(StoreError::PlayerNotFound { .. }) => Ok(Player::new(name)),
            other => other,
        }
    }
}

// ========== In-memory store ==========

/// Process-local store, used by tests and embedders without a database.
#[derive(Default)]
pub struct MemoryStore {
    games: Mutex<HashMap<GameId, TakGame>>,
    players: Mutex<HashMap<String, Player>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Backend {
        message: "store lock poisoned".to_string(),
    })
}

impl GameStore for MemoryStore {
    #[instrument(skip(self, game), fields(game = %game.game_id))]
    fn save_game(&self, game: &TakGame) -> Result<(), StoreError> {
        lock(&self.games)?.insert(game.game_id.clone(), game.clone());
        debug!("game saved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load_game(&self, id: &GameId) -> Result<TakGame, StoreError> {
        lock(&self.games)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::GameNotFound { id: id.clone() })
    }

    fn save_player(&self, player: &Player) -> Result<(), StoreError> {
        lock(&self.players)?.insert(player.name.clone(), player.clone());
        Ok(())
    }

    fn load_player(&self, name: &str) -> Result<Player, StoreError> {
        lock(&self.players)?
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::PlayerNotFound {
                name: name.to_string(),
            })
    }

    fn player_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(lock(&self.players)?.contains_key(name))
    }
}
