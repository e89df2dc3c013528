//! End-of-game detection: roads, full boards and exhausted reserves.
//!
//! # Precedence
//!
//! ```text
//! 1. road for the color that just moved
//! 2. road for the other color
//! 3. board full       -> more stack tops wins, equal is a draw
//! 4. reserve exhausted -> same tie-break as 3
//! ```

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{piece_limit, Board, Color, Coords, TakError, TakGame};

// ========== Outcome ==========

/// How a finished game ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    Road { winner: Color },
    Flat { winner: Color },
    FlatDraw,
    PieceLimit { winner: Color },
    PieceLimitDraw,
}

impl Outcome {
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Road { winner } | Outcome::Flat { winner } | Outcome::PieceLimit { winner } => {
                Some(winner)
            }
            Outcome::FlatDraw | Outcome::PieceLimitDraw => None,
        }
    }

    pub fn is_draw(self) -> bool {
        self.winner().is_none()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Road { winner } => write!(f, "{} makes a road win!", winner.name()),
            Outcome::Flat { winner } => write!(f, "{} makes a Flat Win!", winner.name()),
            Outcome::FlatDraw => f.write_str("Game ends in a draw!"),
            Outcome::PieceLimit { winner } => {
                write!(f, "{} makes a Flat win: piece limit reached!", winner.name())
            }
            Outcome::PieceLimitDraw => f.write_str("Draw game: piece limit reached!"),
        }
    }
}

// ========== Piece counts ==========

/// Per-color tallies over the whole board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct PieceCounts {
    pub black_tops: usize,
    pub white_tops: usize,
    /// Every piece of the color in every stack.
    pub black_placed: usize,
    pub white_placed: usize,
    pub black_capstones: usize,
    pub white_capstones: usize,
}

impl PieceCounts {
    pub fn of(board: &Board) -> PieceCounts {
        let mut counts = PieceCounts::default();
        for (_, stack) in board.squares() {
            match stack.controller() {
                Some(Color::Black) => counts.black_tops += 1,
                Some(Color::White) => counts.white_tops += 1,
                None => {}
            }
            for piece in &stack.pieces {
                let (placed, capstones) = match piece.color {
                    Color::Black => (&mut counts.black_placed, &mut counts.black_capstones),
                    Color::White => (&mut counts.white_placed, &mut counts.white_capstones),
                };
                *placed += 1;
                if piece.is_capstone() {
                    *capstones += 1;
                }
            }
        }
        counts
    }

    pub fn tops(&self, color: Color) -> usize {
        match color {
            Color::Black => self.black_tops,
            Color::White => self.white_tops,
        }
    }

    pub fn placed(&self, color: Color) -> usize {
        match color {
            Color::Black => self.black_placed,
            Color::White => self.white_placed,
        }
    }

    pub fn capstones(&self, color: Color) -> usize {
        match color {
            Color::Black => self.black_capstones,
            Color::White => self.white_capstones,
        }
    }

    /// Color with more stack tops, `None` on a tie.
    fn top_leader(&self) -> Option<Color> {
        match self.black_tops.cmp(&self.white_tops) {
            std::cmp::Ordering::Greater => Some(Color::Black),
            std::cmp::Ordering::Less => Some(Color::White),
            std::cmp::Ordering::Equal => None,
        }
    }
}

// ========== Road search ==========

#[derive(Clone, Copy)]
enum Axis {
    /// Rank 1 to the last rank.
    NorthSouth,
    /// File a to the last file.
    WestEast,
}

impl Axis {
    fn start_edge(self, size: usize) -> impl Iterator<Item = Coords> {
        (0..size).map(move |i| match self {
            Axis::NorthSouth => Coords::new(i, 0),
            Axis::WestEast => Coords::new(0, i),
        })
    }

    fn reaches_far_edge(self, at: Coords, size: usize) -> bool {
        match self {
            Axis::NorthSouth => at.y == size - 1,
            Axis::WestEast => at.x == size - 1,
        }
    }
}

impl Board {
    /// A chain of `color` stack tops joining two opposite edges, seed first.
    pub fn road(&self, color: Color) -> Option<Vec<Coords>> {
        let size = self.size();
        for axis in [Axis::NorthSouth, Axis::WestEast] {
            let mut visited = vec![false; size * size];
            for seed in axis.start_edge(size) {
                if visited[seed.x * size + seed.y] || !self.controlled_by(seed, color) {
                    continue;
                }
                let mut path = Vec::new();
                if self.extend_road(seed, color, axis, &mut visited, &mut path) {
                    return Some(path);
                }
            }
        }
        None
    }

    /// Depth-first step: `path` holds the chain from the seed to `at` and is
    /// left as the full road on success. A square that failed once cannot
    /// reach the far edge from any other seed, so `visited` is never cleared.
    fn extend_road(
        &self,
        at: Coords,
        color: Color,
        axis: Axis,
        visited: &mut [bool],
        path: &mut Vec<Coords>,
    ) -> bool {
        let size = self.size();
        visited[at.x * size + at.y] = true;
        path.push(at);
        if axis.reaches_far_edge(at, size) {
            return true;
        }
        for next in self.neighbors(at) {
            if !visited[next.x * size + next.y]
                && self.controlled_by(next, color)
                && self.extend_road(next, color, axis, visited, path)
            {
                return true;
            }
        }
        path.pop();
        false
    }
}

// ========== Game state ==========

impl TakGame {
    pub fn count_pieces(&self) -> PieceCounts {
        PieceCounts::of(&self.board)
    }

    /// Every square is occupied.
    pub fn is_flat_win(&self) -> bool {
        self.board.is_full()
    }

    /// Either color has put its whole reserve on the board.
    pub fn hit_piece_limit(&self) -> bool {
        let Some(limit) = piece_limit(self.size) else {
            return false;
        };
        let counts = self.count_pieces();
        Color::all().any(|c| counts.placed(c) >= limit)
    }

    pub fn is_road_win(&self, color: Color) -> bool {
        self.board.road(color).is_some()
    }

    /// Whether the game has ended. The first time this finds an ending it
    /// records the outcome, winner flags and win time; later calls only read
    /// them back.
    pub fn is_game_over(&mut self) -> bool {
        if self.game_over && self.result.is_some() {
            return true;
        }
        let Some((outcome, path)) = self.decide_outcome() else {
            return false;
        };
        self.record(outcome, path);
        true
    }

    /// The outcome of a finished game.
    #[instrument(skip(self), fields(game = %self.game_id))]
    pub fn who_wins(&mut self) -> Result<Outcome, TakError> {
        if !self.is_game_over() {
            return Err(TakError::GameNotOver);
        }
        self.result.ok_or(TakError::GameNotOver)
    }

    fn decide_outcome(&self) -> Option<(Outcome, Vec<Coords>)> {
        let mover = self.current_color().opponent();
        for color in [mover, mover.opponent()] {
            if let Some(path) = self.board.road(color) {
                return Some((Outcome::Road { winner: color }, path));
            }
        }

        let counts = self.count_pieces();
        if self.is_flat_win() {
            let outcome = match counts.top_leader() {
                Some(winner) => Outcome::Flat { winner },
                None => Outcome::FlatDraw,
            };
            return Some((outcome, Vec::new()));
        }
        if self.hit_piece_limit() {
            let outcome = match counts.top_leader() {
                Some(winner) => Outcome::PieceLimit { winner },
                None => Outcome::PieceLimitDraw,
            };
            return Some((outcome, Vec::new()));
        }
        None
    }

    fn record(&mut self, outcome: Outcome, path: Vec<Coords>) {
        self.game_over = true;
        self.result = Some(outcome);
        self.winning_path = path;
        self.black_winner = outcome.winner() == Some(Color::Black);
        self.white_winner = outcome.winner() == Some(Color::White);
        self.road_win = matches!(outcome, Outcome::Road { .. });
        self.flat_win = matches!(outcome, Outcome::Flat { .. } | Outcome::PieceLimit { .. });
        self.draw_game = outcome.is_draw();
        self.win_time.get_or_insert_with(Utc::now);
        info!(game = %self.game_id, %outcome, "game over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Piece;

    fn board_with(size: usize, squares: &[((usize, usize), Piece)]) -> Board {
        let mut board = Board::new(size);
        for &((x, y), piece) in squares {
            board.set(Coords::new(x, y), vec![piece]);
        }
        board
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            Outcome::Road { winner: Color::Black }.to_string(),
            "Black makes a road win!"
        );
        assert_eq!(
            Outcome::Flat { winner: Color::White }.to_string(),
            "White makes a Flat Win!"
        );
        assert_eq!(Outcome::FlatDraw.to_string(), "Game ends in a draw!");
        assert_eq!(
            Outcome::PieceLimit { winner: Color::Black }.to_string(),
            "Black makes a Flat win: piece limit reached!"
        );
        assert_eq!(
            Outcome::PieceLimitDraw.to_string(),
            "Draw game: piece limit reached!"
        );
    }

    #[test]
    fn test_road_north_south() {
        let b = Piece::BLACK_FLAT;
        let board = board_with(3, &[((0, 0), b), ((0, 1), b), ((1, 1), b), ((2, 1), b), ((1, 2), b)]);
        let path = board.road(Color::Black).unwrap();
        assert_eq!(path.first().unwrap().y, 0);
        assert_eq!(path.last().unwrap().y, 2);
        for pair in path.windows(2) {
            let dx = pair[0].x.abs_diff(pair[1].x);
            let dy = pair[0].y.abs_diff(pair[1].y);
            assert_eq!(dx + dy, 1, "path steps must be orthogonal");
        }
        assert!(board.road(Color::White).is_none());
    }

    #[test]
    fn test_road_west_east() {
        let w = Piece::WHITE_FLAT;
        let board = board_with(4, &[((0, 2), w), ((1, 2), w), ((2, 2), w), ((3, 2), w)]);
        assert_eq!(
            board.road(Color::White).unwrap(),
            vec![Coords::new(0, 2), Coords::new(1, 2), Coords::new(2, 2), Coords::new(3, 2)]
        );
    }

    #[test]
    fn test_diagonal_is_not_a_road() {
        let w = Piece::WHITE_FLAT;
        let board = board_with(3, &[((0, 0), w), ((1, 1), w), ((2, 2), w)]);
        assert!(board.road(Color::White).is_none());
    }

    #[test]
    fn test_road_counts_any_top_orientation() {
        let board = board_with(
            3,
            &[
                ((1, 0), Piece::BLACK_FLAT),
                ((1, 1), Piece::BLACK_WALL),
                ((1, 2), Piece::BLACK_CAP),
            ],
        );
        assert!(board.road(Color::Black).is_some());
    }

    #[test]
    fn test_buried_pieces_do_not_count() {
        let mut board = board_with(3, &[((1, 0), Piece::WHITE_FLAT), ((1, 2), Piece::WHITE_FLAT)]);
        board.set(Coords::new(1, 1), vec![Piece::BLACK_FLAT, Piece::WHITE_FLAT]);
        assert!(board.road(Color::White).is_none());
    }

    #[test]
    fn test_dead_end_branch_backtracks() {
        // a1-a2-b2 dead end from the a1 seed; d1-d4 is the road.
        let w = Piece::WHITE_FLAT;
        let board = board_with(
            4,
            &[((0, 0), w), ((0, 1), w), ((1, 1), w), ((3, 0), w), ((3, 1), w), ((3, 2), w), ((3, 3), w)],
        );
        let path = board.road(Color::White).unwrap();
        assert_eq!(path, (0..4).map(|y| Coords::new(3, y)).collect::<Vec<_>>());
        assert!(path.iter().all(|c| board.controlled_by(*c, Color::White)));
    }

    #[test]
    fn test_piece_counts() {
        let mut board = Board::new(5);
        board.set(Coords::new(0, 0), vec![Piece::WHITE_CAP, Piece::BLACK_FLAT, Piece::WHITE_FLAT]);
        board.set(Coords::new(1, 0), vec![Piece::BLACK_WALL]);
        let counts = PieceCounts::of(&board);
        assert_eq!(counts.tops(Color::White), 1);
        assert_eq!(counts.tops(Color::Black), 1);
        assert_eq!(counts.placed(Color::White), 2);
        assert_eq!(counts.placed(Color::Black), 2);
        assert_eq!(counts.capstones(Color::White), 1);
        assert_eq!(counts.capstones(Color::Black), 0);
    }

    #[test]
    fn test_who_wins_before_end() {
        let mut game = TakGame::with_first_turn(4, Color::White).unwrap();
        assert!(!game.is_game_over());
        assert_eq!(game.who_wins().unwrap_err(), TakError::GameNotOver);
        assert!(game.win_time.is_none());
    }

    #[test]
    fn test_outcome_is_frozen() {
        let mut game = TakGame::with_first_turn(3, Color::White).unwrap();
        for y in 0..3 {
            game.board.set(Coords::new(1, y), vec![Piece::BLACK_FLAT]);
        }
        assert_eq!(game.who_wins().unwrap(), Outcome::Road { winner: Color::Black });
        let won_at = game.win_time;
        assert!(won_at.is_some());
        assert!(game.black_winner && game.road_win && !game.white_winner);
        assert_eq!(game.winning_path.len(), 3);

        // A later board change does not rewrite a settled result.
        for y in 0..3 {
            game.board.set(Coords::new(0, y), vec![Piece::WHITE_FLAT]);
        }
        assert_eq!(game.who_wins().unwrap(), Outcome::Road { winner: Color::Black });
        assert_eq!(game.win_time, won_at);
    }

    #[test]
    fn test_mover_road_reported_first() {
        let mut game = TakGame::with_first_turn(3, Color::White).unwrap();
        for y in 0..3 {
            game.board.set(Coords::new(0, y), vec![Piece::WHITE_FLAT]);
            game.board.set(Coords::new(2, y), vec![Piece::BLACK_FLAT]);
        }
        // White to move, so Black made the last action.
        assert_eq!(game.who_wins().unwrap(), Outcome::Road { winner: Color::Black });
    }

    #[test]
    fn test_stack_tops_view_highlights_road() {
        let mut game = TakGame::with_first_turn(3, Color::White).unwrap();
        game.board.set(
            Coords::new(1, 0),
            vec![Piece::BLACK_CAP, Piece::WHITE_FLAT, Piece::BLACK_FLAT],
        );
        game.board.set(
            Coords::new(1, 1),
            vec![Piece::BLACK_WALL, Piece::WHITE_FLAT, Piece::BLACK_FLAT],
        );
        let tall = vec![
            Piece::BLACK_FLAT,
            Piece::BLACK_FLAT,
            Piece::WHITE_FLAT,
            Piece::WHITE_FLAT,
        ];
        game.board.set(Coords::new(2, 1), tall.clone());
        game.board.set(Coords::new(2, 2), tall);

        assert!(game.is_game_over());
        assert_eq!(
            game.draw_stack_tops(),
            vec![" ---------", "| .  . (B)|", "| . (B)(B)|", "| . (B) . |", " ---------"]
        );
    }
}
