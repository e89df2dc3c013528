//! WASM bindings for tak-core
//!
//! Provides a JavaScript-friendly API over [`TakGame`]. Rule violations come
//! back as thrown `Error`s carrying the engine's message.

use wasm_bindgen::prelude::*;

use crate::{Direction, Movement, Piece, Placement, TakGame};

fn js_err(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// WASM-friendly wrapper around TakGame
#[wasm_bindgen]
pub struct WasmGame {
    inner: TakGame,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a game on a `size x size` board with a random first player
    #[wasm_bindgen(constructor)]
    pub fn new(size: usize) -> Result<WasmGame, JsError> {
        Ok(WasmGame {
            inner: TakGame::new(size).map_err(js_err)?,
        })
    }

    /// Restore a game from its JSON form
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<WasmGame, JsError> {
        Ok(WasmGame {
            inner: serde_json::from_str(json).map_err(js_err)?,
        })
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.inner).map_err(js_err)
    }

    /// Full game state as a plain JS object
    pub fn state(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_err)
    }

    /// "black" or "white"
    #[wasm_bindgen(js_name = currentColor)]
    pub fn current_color(&self) -> String {
        self.inner.current_color().to_string()
    }

    /// Place a piece, e.g. place("white", "flat", "c3")
    pub fn place(&mut self, color: &str, orientation: &str, coords: &str) -> Result<(), JsError> {
        let piece = Piece::parse(color, orientation).map_err(js_err)?;
        self.inner
            .place(Placement::new(piece, coords))
            .map_err(js_err)
    }

    /// Move a stack, e.g. moveStack("c3", "+", 2, [1, 1])
    #[wasm_bindgen(js_name = moveStack)]
    pub fn move_stack(
        &mut self,
        coords: &str,
        direction: &str,
        carry: usize,
        drops: Vec<usize>,
    ) -> Result<(), JsError> {
        let direction: Direction = direction.parse().map_err(js_err)?;
        self.inner
            .move_stack(Movement::new(coords, direction, carry, drops))
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&mut self) -> bool {
        self.inner.is_game_over()
    }

    /// Outcome message, throws if the game is still running
    #[wasm_bindgen(js_name = whoWins)]
    pub fn who_wins(&mut self) -> Result<String, JsError> {
        self.inner.who_wins().map(|o| o.to_string()).map_err(js_err)
    }

    /// Winning road as [x, y, x, y, ...], empty unless a road was made
    #[wasm_bindgen(js_name = winningPath)]
    pub fn winning_path(&self) -> Vec<usize> {
        self.inner
            .winning_path
            .iter()
            .flat_map(|c| [c.x, c.y])
            .collect()
    }

    /// Text view of stack tops, one line per rank
    #[wasm_bindgen(js_name = stackTops)]
    pub fn stack_tops(&self) -> Vec<String> {
        self.inner.draw_stack_tops()
    }
}
