//! Tak rules engine: one game's authoritative state plus every legality check
//! for placing pieces, moving stacks and declaring a winner.
//!
//! # Board Layout
//!
//! ```text
//! Squares are addressed (x, y) with x = file, y = rank - 1:
//!
//!   rank 3 | a3=(0,2)  b3=(1,2)  c3=(2,2)
//!   rank 2 | a2=(0,1)  b2=(1,1)  c2=(2,1)
//!   rank 1 | a1=(0,0)  b1=(1,0)  c1=(2,0)
//!            ---------------------------
//!            file a    file b    file c
//! ```
//!
//! # Stacks
//!
//! ```text
//! Index 0 is the TOP of a stack (the piece placed or dropped most recently).
//! An empty square is the zero-length stack.
//! ```
//!
//! # Directions
//!
//! ```text
//! '+' north (y + 1)   '-' south (y - 1)   '>' east (x + 1)   '<' west (x - 1)
//! ```

pub mod board;
pub mod coords;
pub mod error;
pub mod game;
pub mod movement;
pub mod placement;
pub mod store;
pub mod win;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use crate::board::{Board, Stack};
pub use crate::coords::{translate, untranslate, Coords, MAX_SIZE, MIN_SIZE};
pub use crate::error::TakError;
pub use crate::game::{GameId, TakGame};
pub use crate::store::{GameStore, MemoryStore, Player, StoreError};
pub use crate::win::{Outcome, PieceCounts};

/// Piece color, which is also the player identity on the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Get the opposing color.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Capitalized name, as used in outcome messages.
    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::White => "White",
        }
    }

    /// Single-letter marker used by the stack-top view.
    pub fn initial(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    pub fn all() -> impl Iterator<Item = Color> {
        [Color::Black, Color::White].into_iter()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

impl FromStr for Color {
    type Err = TakError;

    fn from_str(s: &str) -> Result<Color, TakError> {
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::Black),
            "white" => Ok(Color::White),
            _ => Err(TakError::InvalidPieceColor {
                color: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = TakError;

    fn try_from(s: String) -> Result<Color, TakError> {
        s.parse()
    }
}

/// How a piece sits on the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Orientation {
    /// Counts for roads and can be covered.
    Flat,
    /// Standing stone: nothing may be dropped on it except a lone capstone.
    Wall,
    /// Can flatten a wall, can never be covered or flattened.
    Capstone,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Flat => f.write_str("flat"),
            Orientation::Wall => f.write_str("wall"),
            Orientation::Capstone => f.write_str("capstone"),
        }
    }
}

impl FromStr for Orientation {
    type Err = TakError;

    fn from_str(s: &str) -> Result<Orientation, TakError> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(Orientation::Flat),
            "wall" => Ok(Orientation::Wall),
            "capstone" => Ok(Orientation::Capstone),
            _ => Err(TakError::InvalidPieceOrientation {
                orientation: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = TakError;

    fn try_from(s: String) -> Result<Orientation, TakError> {
        s.parse()
    }
}

/// A single piece. Immutable value; a flattened wall is replaced, not mutated.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub orientation: Orientation,
}

impl Piece {
    pub const BLACK_FLAT: Piece = Piece::new(Color::Black, Orientation::Flat);
    pub const WHITE_FLAT: Piece = Piece::new(Color::White, Orientation::Flat);
    pub const BLACK_WALL: Piece = Piece::new(Color::Black, Orientation::Wall);
    pub const WHITE_WALL: Piece = Piece::new(Color::White, Orientation::Wall);
    pub const BLACK_CAP: Piece = Piece::new(Color::Black, Orientation::Capstone);
    pub const WHITE_CAP: Piece = Piece::new(Color::White, Orientation::Capstone);

    #[inline]
    pub const fn new(color: Color, orientation: Orientation) -> Piece {
        Piece { color, orientation }
    }

    /// Parse a piece from its wire strings (case-insensitive).
    /// Color is checked before orientation.
    pub fn parse(color: &str, orientation: &str) -> Result<Piece, TakError> {
        Ok(Piece {
            color: color.parse()?,
            orientation: orientation.parse()?,
        })
    }

    #[inline]
    pub fn is_capstone(&self) -> bool {
        self.orientation == Orientation::Capstone
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.orientation == Orientation::Wall
    }

    /// The same piece lying flat.
    #[inline]
    pub fn flattened(self) -> Piece {
        Piece {
            orientation: Orientation::Flat,
            ..self
        }
    }
}

/// Direction of a stack movement.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    /// `+`: toward higher ranks.
    North,
    /// `-`: toward lower ranks.
    South,
    /// `>`: toward later files.
    East,
    /// `<`: toward earlier files.
    West,
}

impl Direction {
    /// Wire symbol for this direction.
    pub fn symbol(self) -> char {
        match self {
            Direction::North => '+',
            Direction::South => '-',
            Direction::East => '>',
            Direction::West => '<',
        }
    }

    /// Unit step as (dx, dy).
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Name of the board edge this direction runs into.
    pub fn edge(self) -> &'static str {
        match self {
            Direction::North => "top",
            Direction::South => "bottom",
            Direction::East => "right",
            Direction::West => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Direction {
    type Err = TakError;

    fn from_str(s: &str) -> Result<Direction, TakError> {
        match s {
            "+" => Ok(Direction::North),
            "-" => Ok(Direction::South),
            ">" => Ok(Direction::East),
            "<" => Ok(Direction::West),
            _ => Err(TakError::InvalidDirection {
                direction: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = TakError;

    fn try_from(s: String) -> Result<Direction, TakError> {
        s.parse()
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> String {
        direction.symbol().to_string()
    }
}

/// Places a new piece from the reserve onto an empty square.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Placement {
    pub piece: Piece,
    pub coords: String,
}

impl Placement {
    pub fn new(piece: Piece, coords: impl Into<String>) -> Placement {
        Placement {
            piece,
            coords: coords.into(),
        }
    }
}

/// Picks up `carry` pieces from the top of a stack and drops them one square
/// at a time in `direction`, `drops[k]` pieces on the k-th square.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Movement {
    pub coords: String,
    pub direction: Direction,
    pub carry: usize,
    pub drops: Vec<usize>,
}

impl Movement {
    pub fn new(
        coords: impl Into<String>,
        direction: Direction,
        carry: usize,
        drops: Vec<usize>,
    ) -> Movement {
        Movement {
            coords: coords.into(),
            direction,
            carry,
            drops,
        }
    }
}

/// One entry of a game's turn history.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Place(Placement),
    Move(Movement),
}

/// Pieces each player may put on a board of the given size.
///
/// Sizes outside 3-8 have no reserve.
pub fn piece_limit(size: usize) -> Option<usize> {
    match size {
        3 => Some(10),
        4 => Some(15),
        5 => Some(21),
        6 => Some(30),
        7 => Some(40),
        8 => Some(50),
        _ => None,
    }
}

/// Capstones each player may have on a board of the given size.
pub fn capstone_limit(size: usize) -> usize {
    match size {
        8 => 2,
        5..=7 => 1,
        _ => 0,
    }
}
