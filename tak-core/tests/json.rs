//! Stored games must come back exactly as they were saved and keep playing
//! the same way.

use serde_json::{json, Value};
use tak_core::{
    Color, Direction, GameStore, MemoryStore, Movement, Outcome, Piece, Placement, TakGame,
};

fn played_game() -> TakGame {
    let mut game = TakGame::with_first_turn(5, Color::White).unwrap();
    game.owner = Some("olive".into());
    game.white_player = Some("wendy".into());
    game.black_player = Some("bert".into());
    game.place(Placement::new(Piece::WHITE_FLAT, "c3")).unwrap();
    game.place(Placement::new(Piece::BLACK_WALL, "c4")).unwrap();
    game.place(Placement::new(Piece::WHITE_CAP, "b3")).unwrap();
    game.place(Placement::new(Piece::BLACK_FLAT, "a1")).unwrap();
    game.move_stack(Movement::new("b3", Direction::East, 1, vec![1]))
        .unwrap();
    game
}

#[test]
fn test_played_game_round_trip() {
    let game = played_game();
    let text = serde_json::to_string(&game).unwrap();
    let back: TakGame = serde_json::from_str(&text).unwrap();
    assert_eq!(back, game);
}

#[test]
fn test_wire_shape() {
    let game = played_game();
    let value = serde_json::to_value(&game).unwrap();

    assert_eq!(value["size"], 5);
    assert_eq!(value["isBlackTurn"], true);
    assert_eq!(value["gameOwner"], "olive");
    assert_eq!(value["gameBoard"].as_array().unwrap().len(), 5);
    // c3 holds the capstone on the white flat.
    assert_eq!(
        value["gameBoard"][2][2],
        json!([
            {"color": "white", "orientation": "capstone"},
            {"color": "white", "orientation": "flat"}
        ])
    );
    let history = value["turnHistory"].as_array().unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(
        history[4],
        json!({"action": "move", "coords": "b3", "direction": ">", "carry": 1, "drops": [1]})
    );
    assert_eq!(value["winningPath"], json!([]));
    assert_eq!(value["result"], Value::Null);
}

#[test]
fn test_finished_game_round_trip() {
    let mut game = TakGame::with_first_turn(3, Color::White).unwrap();
    for coords in ["a1", "b1", "a2", "b2", "a3"] {
        let piece = match game.current_color() {
            Color::White => Piece::WHITE_FLAT,
            Color::Black => Piece::BLACK_FLAT,
        };
        game.place(Placement::new(piece, coords)).unwrap();
    }
    assert!(game.game_over);

    let value = serde_json::to_value(&game).unwrap();
    assert_eq!(value["result"], json!({"kind": "road", "winner": "white"}));
    assert_eq!(
        value["winningPath"],
        json!([{"x": 0, "y": 0}, {"x": 0, "y": 1}, {"x": 0, "y": 2}])
    );

    let mut back: TakGame = serde_json::from_value(value).unwrap();
    assert_eq!(back.who_wins().unwrap(), Outcome::Road { winner: Color::White });
    assert_eq!(back.win_time, game.win_time);
}

#[test]
fn test_mixed_case_input_normalizes() {
    let placement: Placement = serde_json::from_value(json!({
        "piece": {"color": "WHITE", "orientation": "Flat"},
        "coords": "C3"
    }))
    .unwrap();
    assert_eq!(placement.piece, Piece::WHITE_FLAT);

    let mut game = TakGame::with_first_turn(5, Color::White).unwrap();
    game.place(placement).unwrap();
    assert!(!game.board.is_empty("c3").unwrap());

    let bad = serde_json::from_value::<Placement>(json!({
        "piece": {"color": "green", "orientation": "flat"},
        "coords": "c3"
    }));
    let message = bad.unwrap_err().to_string();
    assert!(message.contains("invalid piece color 'green'"), "{message}");
}

#[test]
fn test_store_then_continue() {
    let store = MemoryStore::new();
    let game = played_game();
    store.save_game(&game).unwrap();

    let mut original = game;
    let mut loaded = store.load_game(&original.game_id).unwrap();
    let next = Placement::new(Piece::BLACK_FLAT, "e5");
    original.place(next.clone()).unwrap();
    loaded.place(next).unwrap();
    assert_eq!(loaded, original);
}
