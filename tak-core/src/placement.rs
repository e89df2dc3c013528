//! Placing a new piece from a player's reserve.

use tracing::{debug, instrument};

use crate::{capstone_limit, piece_limit, translate, Action, Coords, Placement, TakError, TakGame};

impl TakGame {
    /// Place `placement.piece` on an empty square and pass the turn.
    ///
    /// On error the game is unchanged.
    #[instrument(skip(self, placement), fields(game = %self.game_id, coords = %placement.coords))]
    pub fn place(&mut self, placement: Placement) -> Result<(), TakError> {
        self.ensure_in_progress()?;

        let at = match self.validate_placement(&placement) {
            Ok(at) => at,
            Err(err) => {
                debug!(%err, "placement rejected");
                return Err(err);
            }
        };

        self.board.stack_mut(at).push_top(placement.piece);
        debug!(piece = ?placement.piece, "placed");
        self.finish_turn(Action::Place(placement));
        Ok(())
    }

    fn validate_placement(&self, placement: &Placement) -> Result<Coords, TakError> {
        let piece = placement.piece;
        let at = translate(&placement.coords, self.size)?;

        if !self.board.stack(at).is_empty() {
            return Err(TakError::SquareOccupied {
                coords: placement.coords.clone(),
            });
        }

        let counts = self.count_pieces();
        if piece.is_capstone() {
            let limit = capstone_limit(self.size);
            if limit == 0 {
                return Err(TakError::CapstoneNotAllowedOnSmallBoard { size: self.size });
            }
            if counts.capstones(piece.color) >= limit {
                return Err(TakError::CapstoneLimitExceeded {
                    color: piece.color,
                    limit,
                });
            }
        }

        let limit = piece_limit(self.size).unwrap_or(0);
        if counts.placed(piece.color) >= limit {
            return Err(TakError::PieceLimitExceeded {
                color: piece.color,
                limit,
            });
        }

        if piece.color != self.current_color() {
            return Err(TakError::WrongTurnColor { color: piece.color });
        }

        Ok(at)
    }
}
