// Integration tests for the per-turn text protocol
//
// Feeds scripted multi-turn input through the async reader and the live
// game state, the same path the driver uses.

use tokio::io::{AsyncBufReadExt, BufReader};

use tron_bot::bot::Bot;
use tron_bot::config::Config;
use tron_bot::debug_logger::DebugLogger;
use tron_bot::protocol::{read_turn, GameState};
use tron_bot::types::{Cell, Coord};

const MULTI_TURN_INPUT: &str = "\
2 0
9 5 9 5
10 7 10 7
2 0
10 5 10 5
11 7 11 7
2 0
15 10 15 10
14 9 14 9
2 0
0 0 0 0
1 1 1 1
2 0
28 19 28 19
29 18 29 18
";

fn fixed_depth_bot(depth: u8) -> Bot {
    let mut config = Config::default_hardcoded();
    config.timing.iterative_deepening = false;
    config.timing.max_search_depth = depth;
    Bot::new(config)
}

#[tokio::test]
async fn test_reads_every_turn_then_stops_cleanly() {
    let mut lines = BufReader::new(MULTI_TURN_INPUT.as_bytes()).lines();
    let mut state = GameState::new(30, 20);
    let mut turns = 0;

    while let Some(turn) = read_turn(&mut lines).await.unwrap() {
        assert_eq!(turn.me, 0);
        assert_eq!(turn.agents.len(), 2);
        state.apply_turn(&turn.agents).unwrap();
        turns += 1;
    }

    assert_eq!(turns, 5);
    assert_eq!(state.turn(), 4);
    assert_eq!(state.position(0), Some(Coord::new(28, 19)));
    assert_eq!(state.position(1), Some(Coord::new(29, 18)));
    // One head per agent per turn
    assert_eq!(state.board().cells_owned_by(0), 5);
    assert_eq!(state.board().cells_owned_by(1), 5);
}

#[tokio::test]
async fn test_end_of_input_mid_turn_is_clean_shutdown() {
    let input = "2 1\n3 3 3 3\n";
    let mut lines = BufReader::new(input.as_bytes()).lines();

    assert_eq!(read_turn(&mut lines).await.unwrap(), None);
}

#[tokio::test]
async fn test_empty_input_is_clean_shutdown() {
    let mut lines = BufReader::new("".as_bytes()).lines();
    assert_eq!(read_turn(&mut lines).await.unwrap(), None);
}

#[tokio::test]
async fn test_malformed_header_is_error() {
    let mut lines = BufReader::new("2 zero\n".as_bytes()).lines();
    assert!(read_turn(&mut lines).await.is_err());
}

#[tokio::test]
async fn test_elimination_releases_trail() {
    let input = "\
3 0
2 2 2 2
5 5 5 5
8 8 8 8
3 0
2 2 2 3
5 5 5 6
8 8 8 9
3 0
2 3 2 4
-1 -1 -1 -1
8 9 8 10
";
    let mut lines = BufReader::new(input.as_bytes()).lines();
    let mut state = GameState::new(30, 20);

    while let Some(turn) = read_turn(&mut lines).await.unwrap() {
        state.apply_turn(&turn.agents).unwrap();
    }

    assert_eq!(state.board().cells_owned_by(1), 0);
    assert_eq!(state.board().get(&Coord::new(5, 5)), Some(Cell::Free));
    assert_eq!(state.board().get(&Coord::new(5, 6)), Some(Cell::Free));
    assert_eq!(state.position(1), None);
    assert_eq!(state.board().cells_owned_by(2), 3);

    // The search now plays against agent 2
    let opp = Bot::choose_opponent(state.positions(), 0).unwrap();
    assert_eq!(opp.index, 2);
}

#[tokio::test]
async fn test_get_move_answers_every_turn() {
    let mut lines = BufReader::new(MULTI_TURN_INPUT.as_bytes()).lines();
    let mut state = GameState::new(30, 20);
    let bot = fixed_depth_bot(3);
    let logger = DebugLogger::disabled();

    while let Some(turn) = read_turn(&mut lines).await.unwrap() {
        state.apply_turn(&turn.agents).unwrap();

        let decision = bot.get_move(&state, turn.me, &logger).await.unwrap();
        let me = state.position(turn.me).unwrap();
        let direction = decision.direction.expect("open board always has a move");

        assert!(state.board().is_free(&direction.apply(&me)));
        assert_eq!(decision.depth, 3);
    }
}
