// Per-turn decision making
//
// The bot wraps the alpha-beta searcher with time management: iterative
// deepening under a hard deadline, keeping the move from the deepest
// iteration that completed. The search itself stays single-threaded; the
// async entry point only moves it off the reactor onto the blocking pool.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::protocol::GameState;
use crate::search::{Players, SearchAborted, SearchOutcome, SearchStats, Searcher};
use crate::space::{reachable_count, FloodFillParams};
use crate::types::{Board, Coord, Direction};

/// The agent the search plays against
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opponent {
    pub index: u8,
    pub position: Coord,
}

/// Result of one turn's deliberation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// `None` when the controlled agent has no legal move
    pub direction: Option<Direction>,
    pub score: i32,
    /// Deepest fully completed search depth
    pub depth: u8,
    pub nodes: u64,
    /// Leaf positions scored with the flood-fill heuristic
    pub evaluations: u64,
    pub cutoffs: u64,
    pub elapsed_ms: u64,
}

/// Light-cycle bot holding static configuration for its lifetime
#[derive(Debug, Clone)]
pub struct Bot {
    config: Config,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Computes the move for the agent at `me` without blocking on I/O.
    ///
    /// # Arguments
    /// * `board` - Live board, left untouched
    /// * `me_index` - Index of the controlled agent
    /// * `me` - Head of the controlled agent
    /// * `opponent` - Agent to search against, or `None` when nobody else is alive
    /// * `budget_ms` - Search budget, enforced only with iterative deepening
    pub fn decide(
        &self,
        board: &Board,
        me_index: u8,
        me: Coord,
        opponent: Option<Opponent>,
        budget_ms: u64,
    ) -> Decision {
        if !self.config.timing.iterative_deepening {
            return self.decide_at_depth(board, me_index, me, opponent, self.config.timing.max_search_depth);
        }

        let start_time = Instant::now();

        let opponent = match opponent {
            Some(o) => o,
            None => return Self::solo_decision(board, me_index, me, start_time),
        };

        let players = Players {
            me: me_index,
            opp: opponent.index,
        };
        let params = self.config.flood_fill.params();

        let (outcome, depth, stats) =
            self.iterative_deepening(board, players, me, opponent.position, params, start_time, budget_ms);
        Self::finish(outcome, depth, stats, start_time)
    }

    /// Searches exactly `depth` plies with no deadline, ignoring the timing
    /// config. This is the search a deepening run keeps when `depth` was the
    /// deepest iteration it completed.
    pub fn decide_at_depth(
        &self,
        board: &Board,
        me_index: u8,
        me: Coord,
        opponent: Option<Opponent>,
        depth: u8,
    ) -> Decision {
        let start_time = Instant::now();

        let opponent = match opponent {
            Some(o) => o,
            None => return Self::solo_decision(board, me_index, me, start_time),
        };

        let players = Players {
            me: me_index,
            opp: opponent.index,
        };
        let params = self.config.flood_fill.params();
        let (outcome, stats) = Self::search_to_completion(board, players, me, opponent.position, params, depth);
        Self::finish(outcome, depth, stats, start_time)
    }

    fn finish(outcome: SearchOutcome, depth: u8, stats: SearchStats, start_time: Instant) -> Decision {
        let decision = Decision {
            direction: outcome.best_move,
            score: outcome.score,
            depth,
            nodes: stats.nodes,
            evaluations: stats.leaf_evaluations,
            cutoffs: stats.cutoffs,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        debug!("Decision: {:?}", decision);
        decision
    }

    /// Deepens one ply at a time until the deadline, the depth cap, or a
    /// forced result. Falls back to an unbounded depth-1 search if not even
    /// depth 1 finished in time.
    #[allow(clippy::too_many_arguments)]
    fn iterative_deepening(
        &self,
        board: &Board,
        players: Players,
        me: Coord,
        opp: Coord,
        params: FloodFillParams,
        start_time: Instant,
        budget_ms: u64,
    ) -> (SearchOutcome, u8, SearchStats) {
        let deadline = start_time + Duration::from_millis(budget_ms);
        let timing = &self.config.timing;

        let mut best: Option<(SearchOutcome, u8)> = None;
        let mut totals = SearchStats::default();
        let mut last_iteration_ms = 0.0_f64;

        for depth in 1..=timing.max_search_depth {
            let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
            let remaining_ms = budget_ms as f64 - elapsed_ms;

            if remaining_ms <= 0.0 {
                info!("Stopping search: budget exhausted before depth {}", depth);
                break;
            }

            let estimate_ms = last_iteration_ms * timing.depth_growth_factor;
            if best.is_some() && estimate_ms > remaining_ms {
                info!(
                    "Stopping search: depth {} estimated at {:.1}ms, {:.1}ms remaining",
                    depth, estimate_ms, remaining_ms
                );
                break;
            }

            let iteration_start = Instant::now();
            let mut searcher = Searcher::new(players, params).with_deadline(deadline);
            let result = searcher.search_root(board, me, opp, depth);
            Self::accumulate(&mut totals, searcher.stats());
            last_iteration_ms = iteration_start.elapsed().as_secs_f64() * 1000.0;

            match result {
                Ok(outcome) => {
                    debug!(
                        "Depth {} complete: {:?} (score: {}, {:.1}ms)",
                        depth,
                        outcome.best_move.map(|d| d.as_str()),
                        outcome.score,
                        last_iteration_ms
                    );
                    best = Some((outcome, depth));

                    if outcome.best_move.is_none() {
                        // Stuck at the root: deeper searches see the same position
                        break;
                    }
                }
                Err(SearchAborted) => {
                    info!("Depth {} aborted at deadline", depth);
                    break;
                }
            }
        }

        match best {
            Some((outcome, depth)) => (outcome, depth, totals),
            None => {
                warn!("No search depth completed within {}ms, running depth 1 unbounded", budget_ms);
                let (outcome, stats) = Self::search_to_completion(board, players, me, opp, params, 1);
                Self::accumulate(&mut totals, stats);
                (outcome, 1, totals)
            }
        }
    }

    /// Fixed-depth search with no deadline
    fn search_to_completion(
        board: &Board,
        players: Players,
        me: Coord,
        opp: Coord,
        params: FloodFillParams,
        depth: u8,
    ) -> (SearchOutcome, SearchStats) {
        let mut searcher = Searcher::new(players, params);
        match searcher.search_root(board, me, opp, depth) {
            Ok(outcome) => (outcome, searcher.stats()),
            // Unreachable without a deadline
            Err(SearchAborted) => (
                SearchOutcome {
                    score: 0,
                    best_move: None,
                },
                searcher.stats(),
            ),
        }
    }

    fn accumulate(totals: &mut SearchStats, stats: SearchStats) {
        totals.nodes += stats.nodes;
        totals.leaf_evaluations += stats.leaf_evaluations;
        totals.cutoffs += stats.cutoffs;
    }

    /// With no opponent left, take the move that keeps the most room,
    /// measured with an exhaustive flood fill
    fn solo_decision(board: &Board, me_index: u8, me: Coord, start_time: Instant) -> Decision {
        let params = FloodFillParams::exhaustive();
        let mut best: Option<(Direction, usize)> = None;
        let mut evaluations = 0;

        for (dir, next) in board.legal_moves(&me) {
            evaluations += 1;
            let room = reachable_count(&board.with_move(me_index, &next), next, &params, 0);
            if best.map_or(true, |(_, best_room)| room > best_room) {
                best = Some((dir, room));
            }
        }

        Decision {
            direction: best.map(|(d, _)| d),
            score: best.map_or(1, |(_, room)| room as i32),
            depth: 1,
            nodes: 0,
            evaluations,
            cutoffs: 0,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Picks the nearest living agent other than `me_index` (Manhattan
    /// distance, lowest index on ties). Others stay on the board as obstacles.
    pub fn choose_opponent(positions: &[Option<Coord>], me_index: usize) -> Option<Opponent> {
        let me = positions.get(me_index).copied().flatten()?;

        positions
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != me_index)
            .filter_map(|(idx, pos)| pos.map(|p| (idx, p)))
            .min_by_key(|(idx, p)| (me.manhattan(p), *idx))
            .map(|(idx, p)| Opponent {
                index: idx as u8,
                position: p,
            })
    }

    /// Direction to print when there is no legal move: the first direction
    /// that at least stays on the board
    pub fn fallback_direction(board: &Board, me: Coord) -> Direction {
        Direction::all()
            .iter()
            .copied()
            .find(|dir| board.in_bounds(&dir.apply(&me)))
            .unwrap_or(Direction::Up)
    }

    /// Computes the move for the controlled agent of `state`
    /// Runs the search on the blocking pool and logs the turn when debug logging is on
    ///
    /// # Arguments
    /// * `state` - Live game state after this turn's input was applied
    /// * `me_index` - Index of the controlled agent
    /// * `logger` - Debug logger (no-op when disabled)
    ///
    /// # Returns
    /// * `Result<Decision, String>` - Decision, or an error if the search task failed
    pub async fn get_move(
        &self,
        state: &GameState,
        me_index: usize,
        logger: &DebugLogger,
    ) -> Result<Decision, String> {
        let turn = state.turn();
        let me = state
            .position(me_index)
            .ok_or_else(|| format!("Controlled agent {} is not on the board", me_index))?;
        let opponent = Self::choose_opponent(state.positions(), me_index);
        let budget = self.config.timing.effective_budget_ms(turn);

        info!(
            "Turn {}: Computing move for agent {} at ({}, {}) against {:?}, {} free cells",
            turn,
            me_index,
            me.x,
            me.y,
            opponent,
            state.board().free_cells()
        );

        let bot = self.clone();
        let board = state.board().clone();
        let me_index = me_index as u8;

        let (decision, board) = tokio::task::spawn_blocking(move || {
            let decision = bot.decide(&board, me_index, me, opponent, budget);
            crate::simple_profiler::merge_thread_local();
            (decision, board)
        })
        .await
        .map_err(|e| format!("Search task failed: {}", e))?;

        crate::simple_profiler::end_turn(decision.elapsed_ms);

        info!(
            "Turn {}: Chose {} (score: {}, depth: {}, nodes: {}, evaluations: {}, cutoffs: {}, time: {}ms)",
            turn,
            decision.direction.map_or("none", |d| d.as_str()),
            decision.score,
            decision.depth,
            decision.nodes,
            decision.evaluations,
            decision.cutoffs,
            decision.elapsed_ms
        );

        logger.log_turn(turn, me_index, me, opponent, board, &decision);

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn fixed_depth_bot(depth: u8) -> Bot {
        let mut config = Config::default_hardcoded();
        config.timing.iterative_deepening = false;
        config.timing.max_search_depth = depth;
        Bot::new(config)
    }

    #[test]
    fn test_choose_opponent_nearest_alive() {
        let positions = vec![
            Some(Coord::new(0, 0)),
            Some(Coord::new(20, 15)),
            None,
            Some(Coord::new(3, 1)),
        ];

        let opp = Bot::choose_opponent(&positions, 0).unwrap();
        assert_eq!(opp.index, 3);
        assert_eq!(opp.position, Coord::new(3, 1));
    }

    #[test]
    fn test_choose_opponent_tie_prefers_lower_index() {
        let positions = vec![Some(Coord::new(5, 5)), Some(Coord::new(7, 5)), Some(Coord::new(3, 5))];
        assert_eq!(Bot::choose_opponent(&positions, 0).unwrap().index, 1);
    }

    #[test]
    fn test_choose_opponent_none_when_alone() {
        let positions = vec![None, Some(Coord::new(2, 2))];
        assert_eq!(Bot::choose_opponent(&positions, 1), None);
        // Controlled agent eliminated
        assert_eq!(Bot::choose_opponent(&positions, 0), None);
    }

    #[test]
    fn test_fallback_direction_stays_in_bounds() {
        let board = Board::new(30, 20);
        // Right edge: RIGHT would leave the board
        assert_eq!(Bot::fallback_direction(&board, Coord::new(29, 19)), Direction::Left);
        assert_eq!(Bot::fallback_direction(&board, Coord::new(0, 0)), Direction::Right);
    }

    #[test]
    fn test_solo_prefers_larger_region() {
        // Wall at x = 2 with a gap: going left leads into a 2-wide strip
        let mut board = Board::new(10, 5);
        for y in 0..5 {
            board.set(&Coord::new(2, y), Cell::Blocked);
        }
        let me = Coord::new(2, 2);
        board.set(&me, Cell::Owned(0));

        let decision = fixed_depth_bot(3).decide(&board, 0, me, None, 100);
        assert_eq!(decision.direction, Some(Direction::Right));
        assert_eq!(decision.score, 35);
    }

    #[test]
    fn test_boxed_in_returns_no_direction() {
        let mut board = Board::new(30, 20);
        let me = Coord::new(10, 10);
        let opp = Coord::new(20, 10);
        board.set(&me, Cell::Owned(0));
        board.set(&opp, Cell::Owned(1));
        for (_, n) in board.legal_moves(&me) {
            board.set(&n, Cell::Owned(1));
        }

        let decision = Bot::new(Config::default_hardcoded()).decide(
            &board,
            0,
            me,
            Some(Opponent { index: 1, position: opp }),
            50,
        );

        assert_eq!(decision.direction, None);
    }

    #[test]
    fn test_decide_at_depth_matches_fixed_depth_config() {
        let mut board = Board::new(30, 20);
        let me = Coord::new(4, 4);
        let opp = Coord::new(12, 9);
        board.set(&me, Cell::Owned(0));
        board.set(&opp, Cell::Owned(1));
        let opponent = Some(Opponent { index: 1, position: opp });

        let deepening = Bot::new(Config::default_hardcoded());
        let at_depth = deepening.decide_at_depth(&board, 0, me, opponent, 3);
        let fixed = fixed_depth_bot(3).decide(&board, 0, me, opponent, 0);

        assert_eq!(at_depth.depth, 3);
        assert_eq!(at_depth.direction, fixed.direction);
        assert_eq!(at_depth.score, fixed.score);
        assert_eq!(at_depth.nodes, fixed.nodes);
        assert!(at_depth.evaluations > 0);
        assert!(at_depth.evaluations <= at_depth.nodes);
    }

    #[test]
    fn test_zero_budget_still_returns_a_move() {
        let mut board = Board::new(30, 20);
        let me = Coord::new(9, 5);
        let opp = Coord::new(10, 5);
        board.set(&me, Cell::Owned(0));
        board.set(&opp, Cell::Owned(1));

        let decision = Bot::new(Config::default_hardcoded()).decide(
            &board,
            0,
            me,
            Some(Opponent { index: 1, position: opp }),
            0,
        );

        assert!(decision.direction.is_some());
        assert_eq!(decision.depth, 1);
    }
}
