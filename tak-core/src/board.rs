//! Square grid of piece stacks.

use serde::{Deserialize, Serialize};

use crate::{translate, Color, Coords, Piece, TakError, MAX_SIZE, MIN_SIZE};

// ========== Stack ==========

/// Pieces on one square, top first.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    pub pieces: Vec<Piece>,
}

impl Stack {
    pub fn new() -> Stack {
        Stack::default()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[inline]
    pub fn top(&self) -> Option<&Piece> {
        self.pieces.first()
    }

    /// Color of the top piece, which controls the stack.
    #[inline]
    pub fn controller(&self) -> Option<Color> {
        self.top().map(|p| p.color)
    }

    pub fn push_top(&mut self, piece: Piece) {
        self.pieces.insert(0, piece);
    }

    /// Remove the top `n` pieces, keeping their order.
    pub fn take_top(&mut self, n: usize) -> Vec<Piece> {
        let n = n.min(self.pieces.len());
        self.pieces.drain(..n).collect()
    }

    /// Put `pieces` on top of this stack, keeping their order.
    pub fn drop_on(&mut self, pieces: &[Piece]) {
        self.pieces.splice(0..0, pieces.iter().copied());
    }

    /// Replace a standing top with its flat form.
    pub fn flatten_top(&mut self) {
        if let Some(top) = self.pieces.first_mut() {
            *top = top.flattened();
        }
    }
}

impl From<Vec<Piece>> for Stack {
    fn from(pieces: Vec<Piece>) -> Stack {
        Stack { pieces }
    }
}

// ========== Board ==========

/// `size x size` squares indexed `[x][y]`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Stack>>", into = "Vec<Vec<Stack>>")]
pub struct Board {
    squares: Vec<Vec<Stack>>,
}

/// Decoded boards must be square and of a playable size.
impl TryFrom<Vec<Vec<Stack>>> for Board {
    type Error = TakError;

    fn try_from(squares: Vec<Vec<Stack>>) -> Result<Board, TakError> {
        let size = squares.len();
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(TakError::InvalidSize { size });
        }
        if squares.iter().any(|file| file.len() != size) {
            return Err(TakError::MalformedBoard { size });
        }
        Ok(Board { squares })
    }
}

impl From<Board> for Vec<Vec<Stack>> {
    fn from(board: Board) -> Vec<Vec<Stack>> {
        board.squares
    }
}

impl Board {
    /// An empty board. Callers check the size range.
    pub fn new(size: usize) -> Board {
        Board {
            squares: vec![vec![Stack::new(); size]; size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.squares.len()
    }

    #[inline]
    pub fn stack(&self, at: Coords) -> &Stack {
        &self.squares[at.x][at.y]
    }

    #[inline]
    pub fn stack_mut(&mut self, at: Coords) -> &mut Stack {
        &mut self.squares[at.x][at.y]
    }

    /// Replace the stack on a square.
    pub fn set(&mut self, at: Coords, stack: impl Into<Stack>) {
        self.squares[at.x][at.y] = stack.into();
    }

    /// Contents of the square named in algebraic notation.
    pub fn square_contents(&self, notation: &str) -> Result<&Stack, TakError> {
        let at = translate(notation, self.size())?;
        Ok(self.stack(at))
    }

    pub fn is_empty(&self, notation: &str) -> Result<bool, TakError> {
        Ok(self.square_contents(notation)?.is_empty())
    }

    /// Whether (x, y) holds any piece. Off-board positions are never occupied.
    pub fn is_occupied_at(&self, x: usize, y: usize) -> bool {
        self.squares
            .get(x)
            .and_then(|file| file.get(y))
            .is_some_and(|stack| !stack.is_empty())
    }

    /// All squares with their coordinates, file by file.
    pub fn squares(&self) -> impl Iterator<Item = (Coords, &Stack)> + '_ {
        self.squares.iter().enumerate().flat_map(|(x, file)| {
            file.iter()
                .enumerate()
                .map(move |(y, stack)| (Coords::new(x, y), stack))
        })
    }

    /// Orthogonal neighbors that are on the board.
    pub fn neighbors(&self, at: Coords) -> impl Iterator<Item = Coords> {
        let size = self.size();
        [(0, 1), (1, 0), (0, -1), (-1, 0)]
            .into_iter()
            .filter_map(move |delta| at.offset(delta, 1, size))
    }

    /// Whether the top piece at `at` belongs to `color`.
    #[inline]
    pub fn controlled_by(&self, at: Coords, color: Color) -> bool {
        self.stack(at).controller() == Some(color)
    }

    pub fn is_full(&self) -> bool {
        self.squares().all(|(_, stack)| !stack.is_empty())
    }

    /// Render stack tops with `highlight` squares drawn as `(B)` / `(W)`.
    ///
    /// ```text
    ///  ---------
    /// | .  . (B)|    highest rank first
    /// | . (B)(B)|
    /// | . (B) . |
    ///  ---------
    /// ```
    pub fn draw_tops(&self, highlight: &[Coords]) -> Vec<String> {
        let size = self.size();
        let border = format!(" {}", "---".repeat(size));

        let mut lines = Vec::with_capacity(size + 2);
        lines.push(border.clone());
        for y in (0..size).rev() {
            let mut row = String::from("|");
            for x in 0..size {
                let at = Coords::new(x, y);
                let cell = match self.stack(at).controller() {
                    None => " . ".to_string(),
                    Some(color) if highlight.contains(&at) => format!("({})", color.initial()),
                    Some(color) => format!(" {} ", color.initial()),
                };
                row.push_str(&cell);
            }
            row.push('|');
            lines.push(row);
        }
        lines.push(border);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_top_first() {
        let mut stack = Stack::new();
        stack.push_top(Piece::WHITE_FLAT);
        stack.push_top(Piece::BLACK_WALL);
        assert_eq!(stack.top(), Some(&Piece::BLACK_WALL));
        assert_eq!(stack.controller(), Some(Color::Black));
        assert_eq!(stack.height(), 2);
    }

    #[test]
    fn test_stack_take_and_drop_keep_order() {
        let mut from = Stack::from(vec![
            Piece::WHITE_CAP,
            Piece::BLACK_FLAT,
            Piece::WHITE_FLAT,
        ]);
        let carried = from.take_top(2);
        assert_eq!(carried, vec![Piece::WHITE_CAP, Piece::BLACK_FLAT]);
        assert_eq!(from.pieces, vec![Piece::WHITE_FLAT]);

        let mut to = Stack::from(vec![Piece::BLACK_FLAT]);
        to.drop_on(&carried);
        assert_eq!(
            to.pieces,
            vec![Piece::WHITE_CAP, Piece::BLACK_FLAT, Piece::BLACK_FLAT]
        );
    }

    #[test]
    fn test_flatten_top() {
        let mut stack = Stack::from(vec![Piece::BLACK_WALL, Piece::WHITE_FLAT]);
        stack.flatten_top();
        assert_eq!(stack.pieces, vec![Piece::BLACK_FLAT, Piece::WHITE_FLAT]);
    }

    #[test]
    fn test_square_contents_and_occupancy() {
        let mut board = Board::new(4);
        board.set(Coords::new(1, 2), vec![Piece::WHITE_FLAT]);

        assert_eq!(
            board.square_contents("b3").unwrap().pieces,
            vec![Piece::WHITE_FLAT]
        );
        assert!(!board.is_empty("b3").unwrap());
        assert!(board.is_empty("a1").unwrap());
        assert!(board.is_empty("e1").is_err());

        assert!(board.is_occupied_at(1, 2));
        assert!(!board.is_occupied_at(0, 0));
        assert!(!board.is_occupied_at(9, 9));
    }

    #[test]
    fn test_neighbors_clip_at_edges() {
        let board = Board::new(3);
        assert_eq!(board.neighbors(Coords::new(0, 0)).count(), 2);
        assert_eq!(board.neighbors(Coords::new(1, 0)).count(), 3);
        assert_eq!(board.neighbors(Coords::new(1, 1)).count(), 4);
    }

    #[test]
    fn test_is_full() {
        let mut board = Board::new(3);
        assert!(!board.is_full());
        for x in 0..3 {
            for y in 0..3 {
                board.set(Coords::new(x, y), vec![Piece::BLACK_FLAT]);
            }
        }
        assert!(board.is_full());
    }

    #[test]
    fn test_draw_tops_plain() {
        let mut board = Board::new(3);
        board.set(Coords::new(0, 0), vec![Piece::WHITE_FLAT]);
        board.set(Coords::new(2, 2), vec![Piece::BLACK_CAP]);
        assert_eq!(
            board.draw_tops(&[]),
            vec![" ---------", "| .  .  B |", "| .  .  . |", "| W  .  . |", " ---------"]
        );
    }

    #[test]
    fn test_board_json_is_nested_arrays() {
        let mut board = Board::new(3);
        board.set(Coords::new(0, 1), vec![Piece::WHITE_FLAT]);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json[0][1][0]["color"], "white");
        assert_eq!(json[0][0].as_array().unwrap().len(), 0);
        let back: Board = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
        assert_eq!(back.size(), 3);
    }

    #[test]
    fn test_decoded_board_must_be_square() {
        let ragged = r#"[[[], [], []], [[], []], [[], [], []]]"#;
        assert!(serde_json::from_str::<Board>(ragged)
            .unwrap_err()
            .to_string()
            .contains("board is not 3x3"));

        let tiny = r#"[[[], []], [[], []]]"#;
        assert!(serde_json::from_str::<Board>(tiny)
            .unwrap_err()
            .to_string()
            .contains("invalid board size 2"));
    }
}
