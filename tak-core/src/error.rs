//! Rule violations reported by the engine.
//!
//! Every rejected operation leaves the game untouched and returns exactly one
//! of these kinds. Messages name the offending square or count so they can be
//! shown to a player as-is.

use derive_more::{Display, Error};

use crate::{Color, Direction, Outcome};

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TakError {
    // ========== Coordinates ==========
    #[display("Could not interpret coordinates '{coords}'")]
    InvalidCoordinate { coords: String },

    #[display("coordinates '{coords}' larger than board size: {size}")]
    OutOfBounds { coords: String, size: usize },

    #[display("invalid board size {size}: must be between 3 and 8")]
    InvalidSize { size: usize },

    #[display("board is not {size}x{size}")]
    MalformedBoard { size: usize },

    // ========== Placement ==========
    #[display("square {coords} is already occupied")]
    SquareOccupied { coords: String },

    #[display("cannot play a {color} piece on {}'s turn", color.opponent())]
    WrongTurnColor { color: Color },

    #[display("invalid piece color '{color}'")]
    InvalidPieceColor { color: String },

    #[display("invalid piece orientation '{orientation}'")]
    InvalidPieceOrientation { orientation: String },

    #[display("capstones are not allowed on a {size}x{size} board")]
    CapstoneNotAllowedOnSmallBoard { size: usize },

    #[display("{color} already has {limit} capstone(s) on the board")]
    CapstoneLimitExceeded { color: Color, limit: usize },

    #[display("{color} has already placed all {limit} pieces")]
    PieceLimitExceeded { color: Color, limit: usize },

    // ========== Movement ==========
    #[display("Cannot move non-existent stack: unoccupied square {coords}")]
    SquareEmpty { coords: String },

    #[display("Stack at {coords} is {height} high - cannot carry {carry} pieces")]
    CarryExceedsStackHeight {
        coords: String,
        height: usize,
        carry: usize,
    },

    #[display("Requested carry of {carry} pieces exceeds board carry limit: {limit}")]
    CarryExceedsBoardLimit { carry: usize, limit: usize },

    #[display("Drop counts {drops:?} do not add up to carry of {carry} pieces")]
    DropsExceedCarry { drops: Vec<usize>, carry: usize },

    #[display("Cannot drop less than 1 piece: {drops:?}")]
    DropBelowOne { drops: Vec<usize> },

    #[display("a movement must carry at least one piece")]
    NoPiecesCarried,

    #[display("Invalid movement direction '{direction}'")]
    InvalidDirection { direction: String },

    #[display("Stack movement ({drops:?}) would exceed {} board edge", direction.edge())]
    MoveExceedsBoardBoundary {
        drops: Vec<usize>,
        direction: Direction,
    },

    // ========== Walls and capstones in the path ==========
    #[display("cannot drop onto the capstone at {coords}")]
    CantFlattenCapstone { coords: String },

    #[display("only a capstone can flatten the wall at {coords}")]
    CantFlattenWallNoCapstone { coords: String },

    #[display("a capstone must drop alone to flatten the wall at {coords}, not {count} pieces")]
    CantFlattenWallWrongCount { coords: String, count: usize },

    #[display("the wall at {coords} can only be flattened on the last step of a move")]
    CantFlattenWallNotLastStep { coords: String },

    // ========== Game lifecycle ==========
    #[display("game is already over: {outcome}")]
    GameAlreadyOver { outcome: Outcome },

    #[display("game is not over")]
    GameNotOver,

    #[display("{player} already has a seat in this game")]
    AlreadySeated { player: String },

    #[display("both seats in this game are taken")]
    SeatsTaken,
}
