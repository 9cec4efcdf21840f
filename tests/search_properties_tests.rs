//! Alpha-Beta Search Property Tests
//!
//! Checks the pruned search against a plain minimax over the same tree,
//! plus determinism, stuck-agent handling and the open-board duel scenario.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tron_bot::search::{Players, SearchOutcome, Searcher, SCORE_NEG_INF, SCORE_POS_INF};
use tron_bot::space::{evaluate, reachable_count, FloodFillParams};
use tron_bot::types::{Board, Cell, Coord, Direction};

const PLAYERS: Players = Players { me: 0, opp: 1 };

/// Random board with scattered obstacles and both agents on free cells
fn random_duel(rng: &mut StdRng, width: i32, height: i32, density: f64) -> (Board, Coord, Coord) {
    let mut board = Board::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if rng.random_bool(density) {
                board.set(&Coord::new(x, y), Cell::Blocked);
            }
        }
    }

    let mut place = |board: &mut Board, agent: u8| loop {
        let c = Coord::new(rng.random_range(0..width), rng.random_range(0..height));
        if board.is_free(&c) {
            board.set(&c, Cell::Owned(agent));
            return c;
        }
    };

    let me = place(&mut board, 0);
    let opp = place(&mut board, 1);
    (board, me, opp)
}

/// Minimax without pruning, same move order and tie-breaking as the searcher
fn plain_minimax(
    board: &Board,
    me: Coord,
    opp: Coord,
    depth: u8,
    maximizing: bool,
    params: &FloodFillParams,
    ply: u32,
) -> SearchOutcome {
    let leaf = || SearchOutcome {
        score: evaluate(board, me, opp, params, ply),
        best_move: None,
    };

    if depth == 0 {
        return leaf();
    }

    let (mover, index) = if maximizing { (me, PLAYERS.me) } else { (opp, PLAYERS.opp) };
    let moves = board.legal_moves(&mover);
    if moves.is_empty() {
        return leaf();
    }

    let mut best = SearchOutcome {
        score: if maximizing { SCORE_NEG_INF } else { SCORE_POS_INF },
        best_move: None,
    };

    for (dir, next) in moves {
        let child_board = board.with_move(index, &next);
        let child = if maximizing {
            plain_minimax(&child_board, next, opp, depth - 1, false, params, ply + 1)
        } else {
            plain_minimax(&child_board, me, next, depth - 1, true, params, ply + 1)
        };

        let better = if maximizing { child.score > best.score } else { child.score < best.score };
        if better {
            best = SearchOutcome {
                score: child.score,
                best_move: Some(dir),
            };
        }
    }

    best
}

#[test]
fn test_pruning_matches_plain_minimax_exhaustive_fill() {
    let mut rng = StdRng::seed_from_u64(0x7206);
    let params = FloodFillParams::exhaustive();

    for _ in 0..40 {
        let (board, me, opp) = random_duel(&mut rng, 8, 6, 0.2);
        for depth in 1..=4 {
            let pruned = Searcher::new(PLAYERS, params)
                .search_root(&board, me, opp, depth)
                .unwrap();
            let plain = plain_minimax(&board, me, opp, depth, true, &params, 0);

            assert_eq!(
                pruned, plain,
                "depth {} me {:?} opp {:?}\n{}",
                depth, me, opp, board
            );
        }
    }
}

#[test]
fn test_pruning_matches_plain_minimax_bounded_fill() {
    let mut rng = StdRng::seed_from_u64(42);
    let params = FloodFillParams::bounded(0.1);

    for _ in 0..30 {
        let (board, me, opp) = random_duel(&mut rng, 15, 10, 0.15);
        for depth in 1..=4 {
            let pruned = Searcher::new(PLAYERS, params)
                .search_root(&board, me, opp, depth)
                .unwrap();
            let plain = plain_minimax(&board, me, opp, depth, true, &params, 0);

            assert_eq!(pruned.best_move, plain.best_move, "depth {}\n{}", depth, board);
            assert_eq!(pruned.score, plain.score, "depth {}\n{}", depth, board);
        }
    }
}

#[test]
fn test_pruning_does_less_work_on_open_board() {
    let mut board = Board::new(30, 20);
    let me = Coord::new(9, 5);
    let opp = Coord::new(20, 12);
    board.set(&me, Cell::Owned(0));
    board.set(&opp, Cell::Owned(1));

    let mut searcher = Searcher::new(PLAYERS, FloodFillParams::bounded(0.1));
    searcher.search_root(&board, me, opp, 4).unwrap();

    // Plain minimax would visit 1 + 4 + 16 + 64 + 256 nodes here
    assert!(searcher.stats().cutoffs > 0);
    assert!(searcher.stats().nodes < 341);
}

#[test]
fn test_search_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let (board, me, opp) = random_duel(&mut rng, 30, 20, 0.1);
    let params = FloodFillParams::bounded(0.1);

    let first = Searcher::new(PLAYERS, params).search_root(&board, me, opp, 5).unwrap();
    let second = Searcher::new(PLAYERS, params).search_root(&board, me, opp, 5).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_boxed_in_agent_has_no_move_at_any_depth() {
    let mut board = Board::new(30, 20);
    let me = Coord::new(5, 5);
    let opp = Coord::new(15, 10);
    board.set(&me, Cell::Owned(0));
    board.set(&opp, Cell::Owned(1));
    board.set(&Coord::new(6, 5), Cell::Owned(1));
    board.set(&Coord::new(4, 5), Cell::Owned(1));
    board.set(&Coord::new(5, 4), Cell::Blocked);
    board.set(&Coord::new(5, 6), Cell::Owned(2));

    for params in &[FloodFillParams::bounded(0.1), FloodFillParams::exhaustive()] {
        let opp_reach = reachable_count(&board, opp, params, 0) as i32;

        for depth in 0..=5 {
            let outcome = Searcher::new(PLAYERS, *params)
                .search_root(&board, me, opp, depth)
                .unwrap();

            assert_eq!(outcome.best_move, None, "depth {}", depth);
            assert_eq!(outcome.score, 1 - opp_reach, "depth {}", depth);
        }
    }
}

#[test]
fn test_stuck_minimizer_is_scored_as_is() {
    let mut board = Board::new(10, 10);
    let me = Coord::new(5, 5);
    let opp = Coord::new(0, 0);
    board.set(&me, Cell::Owned(0));
    board.set(&opp, Cell::Owned(1));
    board.set(&Coord::new(1, 0), Cell::Blocked);
    board.set(&Coord::new(0, 1), Cell::Blocked);
    let params = FloodFillParams::exhaustive();

    let outcome = Searcher::new(PLAYERS, params)
        .minimax(&board, me, opp, 3, false, SCORE_NEG_INF, SCORE_POS_INF, 0)
        .unwrap();

    assert_eq!(outcome.best_move, None);
    assert_eq!(outcome.score, evaluate(&board, me, opp, &params, 0));
    // 96 free cells + origin for us, just the origin for them
    assert_eq!(outcome.score, 97 - 1);
}

#[test]
fn test_adjacent_duel_on_open_board() {
    let mut board = Board::new(30, 20);
    let me = Coord::new(9, 5);
    let opp = Coord::new(10, 5);
    board.set(&me, Cell::Owned(0));
    board.set(&opp, Cell::Owned(1));

    let legal: Vec<Direction> = board.legal_moves(&me).iter().map(|(d, _)| *d).collect();
    assert_eq!(legal, vec![Direction::Down, Direction::Left, Direction::Up]);

    for params in &[FloodFillParams::exhaustive(), FloodFillParams::bounded(0.1)] {
        // Score of each first move, seen one ply deep
        let scores: Vec<(Direction, i32)> = board
            .legal_moves(&me)
            .into_iter()
            .map(|(d, next)| (d, evaluate(&board.with_move(0, &next), next, opp, params, 1)))
            .collect();
        let best = scores.iter().map(|(_, s)| *s).max().unwrap();

        let left = scores.iter().find(|(d, _)| *d == Direction::Left).unwrap().1;
        assert_eq!(left, best, "moving away should be among the best moves");

        let outcome = Searcher::new(PLAYERS, *params)
            .search_root(&board, me, opp, 1)
            .unwrap();
        assert_eq!(outcome.score, best);

        // Both agents still share one open region, so every move ties and
        // the earliest legal direction wins
        assert!(scores.iter().all(|(_, s)| *s == best));
        assert_eq!(outcome.best_move, Some(Direction::Down));
    }
}

#[test]
fn test_caller_board_unchanged_and_siblings_isolated() {
    let mut rng = StdRng::seed_from_u64(99);
    let (board, me, opp) = random_duel(&mut rng, 12, 12, 0.1);
    let snapshot = board.clone();
    let free_before = board.free_cells();

    Searcher::new(PLAYERS, FloodFillParams::bounded(0.2))
        .search_root(&board, me, opp, 5)
        .unwrap();

    assert_eq!(board, snapshot);
    assert_eq!(board.free_cells(), free_before);
}
