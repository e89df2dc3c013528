//! SQLite-backed [`GameStore`]: one JSON blob per game, one row per player.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, instrument};

use tak_core::{GameId, GameStore, Player, StoreError, TakGame};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS games (
        guid TEXT PRIMARY KEY,
        game_blob TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS players (
        username TEXT PRIMARY KEY,
        played_games TEXT NOT NULL
    );
";

fn backend(err: rusqlite::Error) -> StoreError {
    StoreError::Backend {
        message: err.to_string(),
    }
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`. `:memory:` gives a
    /// private in-memory database.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(backend)?;
        conn.execute_batch(SCHEMA).map_err(backend)?;
        info!(path = %path.display(), "opened game database");
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        SqliteStore::open(Path::new(":memory:"))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Backend {
            message: "database lock poisoned".to_string(),
        })
    }
}

impl GameStore for SqliteStore {
    #[instrument(skip(self, game), fields(game = %game.game_id))]
    fn save_game(&self, game: &TakGame) -> Result<(), StoreError> {
        let blob = serde_json::to_string(game)?;
        self.conn()?
            .execute(
                "INSERT INTO games (guid, game_blob) VALUES (?1, ?2)
                 ON CONFLICT(guid) DO UPDATE SET game_blob = excluded.game_blob",
                params![game.game_id.as_str(), blob],
            )
            .map_err(backend)?;
        debug!("game saved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load_game(&self, id: &GameId) -> Result<TakGame, StoreError> {
        let blob: Option<String> = self
            .conn()?
            .query_row(
                "SELECT game_blob FROM games WHERE guid = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        let blob = blob.ok_or_else(|| StoreError::GameNotFound { id: id.clone() })?;
        Ok(serde_json::from_str(&blob)?)
    }

    #[instrument(skip(self, player), fields(player = %player.name))]
    fn save_player(&self, player: &Player) -> Result<(), StoreError> {
        let games = serde_json::to_string(&player.played_games)?;
        self.conn()?
            .execute(
                "INSERT INTO players (username, played_games) VALUES (?1, ?2)
                 ON CONFLICT(username) DO UPDATE SET played_games = excluded.played_games",
                params![player.name, games],
            )
            .map_err(backend)?;
        Ok(())
    }

    fn load_player(&self, name: &str) -> Result<Player, StoreError> {
        let games: Option<String> = self
            .conn()?
            .query_row(
                "SELECT played_games FROM players WHERE username = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        let games = games.ok_or_else(|| StoreError::PlayerNotFound {
            name: name.to_string(),
        })?;
        Ok(Player {
            name: name.to_string(),
            played_games: serde_json::from_str(&games)?,
        })
    }

    fn player_exists(&self, name: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn()?
            .query_row(
                "SELECT 1 FROM players WHERE username = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tak_core::{Color, Piece, Placement};

    #[test]
    fn test_game_upsert() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut game = TakGame::with_first_turn(5, Color::Black).unwrap();
        store.save_game(&game).unwrap();

        game.place(Placement::new(Piece::BLACK_FLAT, "e5")).unwrap();
        store.save_game(&game).unwrap();

        assert_eq!(store.load_game(&game.game_id).unwrap(), game);
    }

    #[test]
    fn test_unknown_game() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.load_game(&GameId::generate()).unwrap_err();
        assert!(matches!(err, StoreError::GameNotFound { .. }));
    }

    #[test]
    fn test_corrupt_blob_is_codec_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = GameId::generate();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO games (guid, game_blob) VALUES (?1, 'not json')",
                params![id.as_str()],
            )
            .unwrap();
        assert!(matches!(
            store.load_game(&id),
            Err(StoreError::Codec { .. })
        ));
    }

    #[test]
    fn test_mismatched_board_is_codec_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let game = TakGame::with_first_turn(3, Color::Black).unwrap();
        let mut blob = serde_json::to_value(&game).unwrap();
        blob["size"] = 8.into();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO games (guid, game_blob) VALUES (?1, ?2)",
                params![game.game_id.as_str(), blob.to_string()],
            )
            .unwrap();
        assert!(matches!(
            store.load_game(&game.game_id),
            Err(StoreError::Codec { .. })
        ));
    }

    #[test]
    fn test_players() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(!store.player_exists("alice").unwrap());

        let mut alice = Player::new("alice");
        alice.record_game(&GameId::generate());
        store.save_player(&alice).unwrap();
        alice.record_game(&GameId::generate());
        store.save_player(&alice).unwrap();

        assert!(store.player_exists("alice").unwrap());
        assert_eq!(store.load_player("alice").unwrap(), alice);
        assert!(matches!(
            store.load_player("bob"),
            Err(StoreError::PlayerNotFound { .. })
        ));
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tak.db");
        let game = TakGame::new(6).unwrap();

        SqliteStore::open(&path).unwrap().save_game(&game).unwrap();
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.load_game(&game.game_id).unwrap(), game);
    }
}
