//! One game's full state: board, turn, seats, outcome flags and history.

use chrono::{DateTime, Utc};
use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Action, Board, Color, Coords, Outcome, TakError, MAX_SIZE, MIN_SIZE};

// ========== Game ID ==========

/// Opaque 128-bit game identifier, rendered as 32 lowercase hex digits.
#[derive(Clone, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn generate() -> GameId {
        GameId(format!("{:032x}", rand::rng().random::<u128>()))
    }

    /// Accept only well-formed ids, normalizing to lowercase.
    pub fn parse(s: &str) -> Option<GameId> {
        let well_formed = s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit());
        well_formed.then(|| GameId(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ========== Game ==========

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "GameRecord")]
pub struct TakGame {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(rename = "gameBoard")]
    pub board: Board,
    pub size: usize,
    pub is_black_turn: bool,

    pub game_over: bool,
    pub black_winner: bool,
    pub white_winner: bool,
    pub road_win: bool,
    pub flat_win: bool,
    pub draw_game: bool,
    /// How the game ended; `None` while it is in progress.
    pub result: Option<Outcome>,
    pub winning_path: Vec<Coords>,

    pub start_time: DateTime<Utc>,
    pub win_time: Option<DateTime<Utc>>,

    pub black_player: Option<String>,
    pub white_player: Option<String>,
    #[serde(rename = "gameOwner")]
    pub owner: Option<String>,
    pub is_public: bool,

    pub turn_history: Vec<Action>,
}

/// Wire form of [`TakGame`] before the board is checked against `size`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameRecord {
    #[serde(rename = "gameID")]
    game_id: GameId,
    #[serde(rename = "gameBoard")]
    board: Board,
    size: usize,
    is_black_turn: bool,
    game_over: bool,
    black_winner: bool,
    white_winner: bool,
    road_win: bool,
    flat_win: bool,
    draw_game: bool,
    #[serde(default)]
    result: Option<Outcome>,
    #[serde(default)]
    winning_path: Vec<Coords>,
    start_time: DateTime<Utc>,
    #[serde(default)]
    win_time: Option<DateTime<Utc>>,
    black_player: Option<String>,
    white_player: Option<String>,
    #[serde(rename = "gameOwner")]
    owner: Option<String>,
    is_public: bool,
    #[serde(default)]
    turn_history: Vec<Action>,
}

impl TryFrom<GameRecord> for TakGame {
    type Error = TakError;

    fn try_from(record: GameRecord) -> Result<TakGame, TakError> {
        if record.board.size() != record.size {
            return Err(TakError::MalformedBoard { size: record.size });
        }
        if let Some(&at) = record.winning_path.iter().find(|at| at.x >= record.size || at.y >= record.size) {
            return Err(TakError::OutOfBounds {
                coords: format!("({}, {})", at.x, at.y),
                size: record.size,
            });
        }

        Ok(TakGame {
            game_id: record.game_id,
            board: record.board,
            size: record.size,
            is_black_turn: record.is_black_turn,
            game_over: record.game_over,
            black_winner: record.black_winner,
            white_winner: record.white_winner,
            road_win: record.road_win,
            flat_win: record.flat_win,
            draw_game: record.draw_game,
            result: record.result,
            winning_path: record.winning_path,
            start_time: record.start_time,
            win_time: record.win_time,
            black_player: record.black_player,
            white_player: record.white_player,
            owner: record.owner,
            is_public: record.is_public,
            turn_history: record.turn_history,
        })
    }
}

impl TakGame {
    /// Start a game on an empty `size x size` board; the first player is a coin flip.
    pub fn new(size: usize) -> Result<TakGame, TakError> {
        let first = if rand::rng().random_bool(0.5) {
            Color::Black
        } else {
            Color::White
        };
        TakGame::with_first_turn(size, first)
    }

    /// Start a game where `first` moves first.
    pub fn with_first_turn(size: usize, first: Color) -> Result<TakGame, TakError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(TakError::InvalidSize { size });
        }

        let game = TakGame {
            game_id: GameId::generate(),
            board: Board::new(size),
            size,
            is_black_turn: first == Color::Black,
            game_over: false,
            black_winner: false,
            white_winner: false,
            road_win: false,
            flat_win: false,
            draw_game: false,
            result: None,
            winning_path: Vec::new(),
            start_time: Utc::now(),
            win_time: None,
            black_player: None,
            white_player: None,
            owner: None,
            is_public: false,
            turn_history: Vec::new(),
        };
        info!(game = %game.game_id, size, first = %first, "new game");
        Ok(game)
    }

    /// Color whose turn it is.
    #[inline]
    pub fn current_color(&self) -> Color {
        if self.is_black_turn {
            Color::Black
        } else {
            Color::White
        }
    }

    fn seat(&self, color: Color) -> Option<&str> {
        match color {
            Color::Black => self.black_player.as_deref(),
            Color::White => self.white_player.as_deref(),
        }
    }

    /// Color `player` is seated as, if any.
    pub fn seat_of(&self, player: &str) -> Option<Color> {
        Color::all().find(|&c| self.seat(c) == Some(player))
    }

    /// Whether `player` holds the seat whose turn it is.
    pub fn players_turn(&self, player: &str) -> bool {
        self.seat(self.current_color()) == Some(player)
    }

    /// Whether `player` may view this game.
    pub fn can_show(&self, player: &str) -> bool {
        self.is_public
            || self.black_player.as_deref() == Some(player)
            || self.white_player.as_deref() == Some(player)
            || self.owner.as_deref() == Some(player)
    }

    /// Seat `player` in an open chair. With both open, the chair is random.
    pub fn take_seat(&mut self, player: &str) -> Result<Color, TakError> {
        if self.seat_of(player).is_some() {
            return Err(TakError::AlreadySeated {
                player: player.to_string(),
            });
        }

        let color = match (&self.black_player, &self.white_player) {
            (Some(_), Some(_)) => return Err(TakError::SeatsTaken),
            (None, None) => {
                if rand::rng().random_bool(0.5) {
                    Color::Black
                } else {
                    Color::White
                }
            }
            (None, Some(_)) => Color::Black,
            (Some(_), None) => Color::White,
        };

        let seat = match color {
            Color::Black => &mut self.black_player,
            Color::White => &mut self.white_player,
        };
        *seat = Some(player.to_string());
        debug!(game = %self.game_id, player, color = %color, "seat taken");
        Ok(color)
    }

    /// Apply a placement or movement, as recorded in the turn history.
    pub fn apply(&mut self, action: Action) -> Result<(), TakError> {
        match action {
            Action::Place(placement) => self.place(placement),
            Action::Move(movement) => self.move_stack(movement),
        }
    }

    /// Stack-top view with the winning road highlighted.
    pub fn draw_stack_tops(&self) -> Vec<String> {
        self.board.draw_tops(&self.winning_path)
    }

    /// Reject further play once the game has ended.
    pub(crate) fn ensure_in_progress(&mut self) -> Result<(), TakError> {
        if self.is_game_over() {
            let outcome = self.who_wins()?;
            return Err(TakError::GameAlreadyOver { outcome });
        }
        Ok(())
    }

    /// Record an applied action, pass the turn and settle any win it produced.
    pub(crate) fn finish_turn(&mut self, action: Action) {
        self.turn_history.push(action);
        self.is_black_turn = !self.is_black_turn;
        self.is_game_over();
    }
}
