//! Algebraic square notation ("a1" .. "h8") to zero-based (x, y) and back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TakError;

pub const MIN_SIZE: usize = 3;
pub const MAX_SIZE: usize = 8;

const FILES: &[u8; MAX_SIZE] = b"abcdefgh";

/// Zero-based square position: x is the file, y is the rank minus one.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coords {
    pub x: usize,
    pub y: usize,
}

impl Coords {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Coords {
        Coords { x, y }
    }

    /// The square `n` steps away along (dx, dy), if it is on a board of `size`.
    pub fn offset(self, (dx, dy): (isize, isize), n: usize, size: usize) -> Option<Coords> {
        let n = isize::try_from(n).ok()?;
        let x = self.x.checked_add_signed(dx * n)?;
        let y = self.y.checked_add_signed(dy * n)?;
        (x < size && y < size).then_some(Coords { x, y })
    }
}

impl fmt::Display for Coords {
    /// Algebraic form, without a board-size check.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match FILES.get(self.x) {
            Some(&file) => write!(f, "{}{}", file as char, self.y + 1),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

/// Parse `notation` (case-insensitive) into coordinates on a board of `size`.
pub fn translate(notation: &str, size: usize) -> Result<Coords, TakError> {
    let lower = notation.to_ascii_lowercase();
    let (file, rank) = match lower.as_bytes() {
        &[file @ b'a'..=b'h', rank @ b'1'..=b'8'] => (file, rank),
        _ => {
            return Err(TakError::InvalidCoordinate {
                coords: notation.to_string(),
            })
        }
    };

    let coords = Coords::new(usize::from(file - b'a'), usize::from(rank - b'1'));
    if coords.x >= size || coords.y >= size {
        return Err(TakError::OutOfBounds {
            coords: notation.to_string(),
            size,
        });
    }
    Ok(coords)
}

/// Format (x, y) as algebraic notation on a board of `size`.
pub fn untranslate(x: usize, y: usize, size: usize) -> Result<String, TakError> {
    if x >= size || y >= size {
        return Err(TakError::OutOfBounds {
            coords: format!("({x}, {y})"),
            size,
        });
    }
    Ok(Coords::new(x, y).to_string())
}
