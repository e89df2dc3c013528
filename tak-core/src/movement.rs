//! Carrying part of a stack across the board.
//!
//! ```text
//! carry 3, drops [1, 2], direction '>':
//!
//!   origin        step 1       step 2
//!   [A B C D]     [C ..]       [A B ..]
//!    ^^^^^ picked up; each step drops the BOTTOM of what is still carried
//! ```

use tracing::{debug, instrument};

use crate::{translate, Action, Coords, Movement, Piece, TakError, TakGame};

impl TakGame {
    /// Move part of the stack at `movement.coords` and pass the turn.
    ///
    /// On error the game is unchanged.
    #[instrument(skip(self, movement), fields(game = %self.game_id, coords = %movement.coords))]
    pub fn move_stack(&mut self, movement: Movement) -> Result<(), TakError> {
        self.ensure_in_progress()?;

        let (origin, path) = match self.validate_movement(&movement) {
            Ok(route) => route,
            Err(err) => {
                debug!(%err, "movement rejected");
                return Err(err);
            }
        };

        let mut carried = self.board.stack_mut(origin).take_top(movement.carry);
        for (&at, &drop) in path.iter().zip(&movement.drops) {
            let target = self.board.stack_mut(at);
            if carried.len() == 1
                && carried[0].is_capstone()
                && target.top().is_some_and(|p| p.is_wall())
            {
                target.flatten_top();
                debug!(%at, "wall flattened");
            }
            let landing = carried.split_off(carried.len() - drop);
            target.drop_on(&landing);
        }

        debug!(direction = %movement.direction, carry = movement.carry, "moved");
        self.finish_turn(Action::Move(movement));
        Ok(())
    }

    /// Check every movement precondition, returning the origin and the squares
    /// the carried group passes over.
    fn validate_movement(&self, movement: &Movement) -> Result<(Coords, Vec<Coords>), TakError> {
        let origin = translate(&movement.coords, self.size)?;
        let stack = self.board.stack(origin);
        let Some(top) = stack.top() else {
            return Err(TakError::SquareEmpty {
                coords: movement.coords.clone(),
            });
        };

        if movement.carry > stack.height() {
            return Err(TakError::CarryExceedsStackHeight {
                coords: movement.coords.clone(),
                height: stack.height(),
                carry: movement.carry,
            });
        }
        if movement.carry > self.size {
            return Err(TakError::CarryExceedsBoardLimit {
                carry: movement.carry,
                limit: self.size,
            });
        }
        if movement.carry == 0 || movement.drops.is_empty() {
            return Err(TakError::NoPiecesCarried);
        }
        let dropped = movement
            .drops
            .iter()
            .try_fold(0usize, |total, &drop| total.checked_add(drop));
        if dropped != Some(movement.carry) {
            return Err(TakError::DropsExceedCarry {
                drops: movement.drops.clone(),
                carry: movement.carry,
            });
        }
        if movement.drops.contains(&0) {
            return Err(TakError::DropBelowOne {
                drops: movement.drops.clone(),
            });
        }

        let delta = movement.direction.delta();
        let path = (1..=movement.drops.len())
            .map(|k| origin.offset(delta, k, self.size))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| TakError::MoveExceedsBoardBoundary {
                drops: movement.drops.clone(),
                direction: movement.direction,
            })?;

        if top.color != self.current_color() {
            return Err(TakError::WrongTurnColor { color: top.color });
        }

        self.check_path(*top, movement, &path)?;
        Ok((origin, path))
    }

    /// Walls and capstones along the path. `leading` is the top carried piece,
    /// the last one to be dropped.
    fn check_path(&self, leading: Piece, movement: &Movement, path: &[Coords]) -> Result<(), TakError> {
        for (step, (&at, &drop)) in path.iter().zip(&movement.drops).enumerate() {
            let Some(&target) = self.board.stack(at).top() else {
                continue;
            };
            let coords = at.to_string();

            if target.is_capstone() {
                return Err(TakError::CantFlattenCapstone { coords });
            }
            if target.is_wall() {
                if !leading.is_capstone() {
                    return Err(TakError::CantFlattenWallNoCapstone { coords });
                }
                if drop != 1 {
                    return Err(TakError::CantFlattenWallWrongCount { coords, count: drop });
                }
                if step + 1 != path.len() {
                    return Err(TakError::CantFlattenWallNotLastStep { coords });
                }
            }
        }
        Ok(())
    }
}
