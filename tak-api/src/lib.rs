//! Tak game service
//!
//! Thin HTTP plumbing around `tak-core`: every request loads one game from the
//! store, runs exactly one engine operation on it and saves it back. Callers
//! identify themselves with an `X-Player` header; checking who they really
//! are is left to whatever sits in front of this service.

pub mod config;
pub mod error;
pub mod store;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument};

use tak_core::{Color, GameId, GameStore, Movement, Placement, TakError, TakGame};

pub use crate::config::Config;
pub use crate::error::{ApiError, ErrorModel};
pub use crate::store::SqliteStore;

// =============================================================================
// Shared State
// =============================================================================

/// Shared application state
pub struct AppStateInner {
    store: Box<dyn GameStore>,
    /// One async mutex per game id; a mutation holds it from load to save.
    game_locks: Mutex<HashMap<GameId, Arc<tokio::sync::Mutex<()>>>>,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(store: impl GameStore + 'static) -> AppState {
        Arc::new(AppStateInner {
            store: Box::new(store),
            game_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn store(&self) -> &dyn GameStore {
        self.store.as_ref()
    }

    /// Hold the game's mutex until the returned guard drops.
    async fn lock_game(&self, id: &GameId) -> GameGuard<'_> {
        let mutex = {
            let mut locks = self.locks();
            locks.entry(id.clone()).or_default().clone()
        };
        GameGuard {
            state: self,
            id: id.clone(),
            guard: Some(mutex.lock_owned().await),
        }
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<GameId, Arc<tokio::sync::Mutex<()>>>> {
        self.game_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Forget the game's mutex once nobody holds or waits on it.
    fn release(&self, id: &GameId) {
        let mut locks = self.locks();
        if locks.get(id).is_some_and(|mutex| Arc::strong_count(mutex) == 1) {
            locks.remove(id);
        }
    }

    /// Add `id` to the player's record, creating the record on first sight.
    fn remember_game(&self, player: &str, id: &GameId) -> Result<(), ApiError> {
        let mut record = self.store.load_or_new_player(player)?;
        record.record_game(id);
        self.store.save_player(&record)?;
        Ok(())
    }
}

/// Exclusive hold on one game; the map entry is dropped with the last holder.
struct GameGuard<'a> {
    state: &'a AppStateInner,
    id: GameId,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for GameGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.state.release(&self.id);
    }
}

// =============================================================================
// Request / Response Models
// =============================================================================

/// Caller identity taken from the `X-Player` header.
pub struct Caller(pub String);

pub const PLAYER_HEADER: &str = "x-player";

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(PLAYER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| Caller(name.to_string()))
            .ok_or(ApiError::MissingPlayer)
    }
}

#[derive(Deserialize)]
struct NewGameParams {
    public: Option<String>,
}

#[derive(Deserialize)]
struct ShowParams {
    #[serde(default)]
    showtops: bool,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct TopsModel {
    tops: Vec<String>,
}

#[derive(Serialize)]
struct SeatModel {
    color: Color,
    game: TakGame,
}

fn parse_game_id(raw: &str) -> Result<GameId, ApiError> {
    GameId::parse(raw).ok_or_else(|| ApiError::BadGameId {
        id: raw.to_string(),
    })
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadBody {
            message: rejection.body_text(),
        })
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

#[instrument(skip_all, fields(player = %player, size = size))]
async fn new_game(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path(size): Path<usize>,
    Query(params): Query<NewGameParams>,
) -> Result<(StatusCode, Json<TakGame>), ApiError> {
    let mut game = TakGame::new(size)?;
    game.owner = Some(player.clone());
    game.is_public = params
        .public
        .is_some_and(|p| matches!(p.to_ascii_lowercase().as_str(), "true" | "yes"));

    state.store.save_game(&game)?;
    state.remember_game(&player, &game.game_id)?;
    info!(game = %game.game_id, size, public = game.is_public, "game created");
    Ok((StatusCode::CREATED, Json(game)))
}

#[instrument(skip_all, fields(player = %player, game = %id))]
async fn show_game(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path(id): Path<String>,
    Query(params): Query<ShowParams>,
) -> Result<Response, ApiError> {
    let id = parse_game_id(&id)?;
    let game = state.store.load_game(&id)?;
    if !game.can_show(&player) {
        return Err(ApiError::Forbidden {
            player,
            id: id.to_string(),
        });
    }

    if params.showtops {
        return Ok(Json(TopsModel {
            tops: game.draw_stack_tops(),
        })
        .into_response());
    }
    Ok(Json(game).into_response())
}

#[instrument(skip_all, fields(player = %player, game = %id))]
async fn take_seat(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path(id): Path<String>,
) -> Result<Json<SeatModel>, ApiError> {
    let id = parse_game_id(&id)?;
    state.store.load_game(&id)?;
    let _guard = state.lock_game(&id).await;

    let mut game = state.store.load_game(&id)?;
    let color = game.take_seat(&player)?;
    state.store.save_game(&game)?;
    state.remember_game(&player, &id)?;
    Ok(Json(SeatModel { color, game }))
}

/// Load, check the caller holds the seat to move, run `action`, save.
async fn play<F>(state: &AppState, raw_id: &str, player: String, action: F) -> Result<TakGame, ApiError>
where
    F: FnOnce(&mut TakGame) -> Result<(), TakError>,
{
    let id = parse_game_id(raw_id)?;
    // Unknown ids never get a lock entry.
    state.store.load_game(&id)?;
    let _guard = state.lock_game(&id).await;

    let mut game = state.store.load_game(&id)?;
    if !game.players_turn(&player) {
        return Err(ApiError::NotYourTurn { player });
    }
    action(&mut game)?;
    state.store.save_game(&game)?;
    debug!(game = %id, over = game.game_over, "turn stored");
    Ok(game)
}

#[instrument(skip_all, fields(player = %player, game = %id))]
async fn place(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path(id): Path<String>,
    payload: Result<Json<Placement>, JsonRejection>,
) -> Result<Json<TakGame>, ApiError> {
    let placement = body(payload)?;
    let game = play(&state, &id, player, |game| game.place(placement)).await?;
    Ok(Json(game))
}

#[instrument(skip_all, fields(player = %player, game = %id))]
async fn move_stack(
    State(state): State<AppState>,
    Caller(player): Caller,
    Path(id): Path<String>,
    payload: Result<Json<Movement>, JsonRejection>,
) -> Result<Json<TakGame>, ApiError> {
    let movement = body(payload)?;
    let game = play(&state, &id, player, |game| game.move_stack(movement)).await?;
    Ok(Json(game))
}

// =============================================================================
// Router
// =============================================================================

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/games/new/{size}", post(new_game))
        .route("/games/{id}", get(show_game))
        .route("/games/{id}/seat", post(take_seat))
        .route("/games/{id}/place", put(place))
        .route("/games/{id}/move", put(move_stack))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
