// Two-player minimax with alpha-beta pruning over the territory heuristic
//
// One maximizing agent (us) against one minimizing agent (the opponent). Any
// other agents on the board are plain obstacles. Each branch searches its own
// copy of the board, so siblings never observe each other's moves.

use std::time::Instant;

use crate::space::{evaluate, FloodFillParams};
use crate::types::{Board, Coord, Direction};

/// Stand-in for negative infinity as the initial alpha
pub const SCORE_NEG_INF: i32 = i32::MIN;
/// Stand-in for positive infinity as the initial beta
pub const SCORE_POS_INF: i32 = i32::MAX;

/// Agent indices written onto the board when each side moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Players {
    pub me: u8,
    pub opp: u8,
}

/// Score of a node and the move that achieves it.
/// `best_move` is `None` at leaves and when the side to move is stuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub score: i32,
    pub best_move: Option<Direction>,
}

/// Work counters for a single search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaf_evaluations: u64,
    pub cutoffs: u64,
}

/// Raised when the deadline passes before the search finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchAborted;

pub struct Searcher {
    players: Players,
    params: FloodFillParams,
    deadline: Option<Instant>,
    stats: SearchStats,
}

impl Searcher {
    pub fn new(players: Players, params: FloodFillParams) -> Self {
        Searcher {
            players,
            params,
            deadline: None,
            stats: SearchStats::default(),
        }
    }

    /// Abort any search still expanding nodes after `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Top-level search for the maximizing agent with a full window
    pub fn search_root(
        &mut self,
        board: &Board,
        me: Coord,
        opp: Coord,
        depth: u8,
    ) -> Result<SearchOutcome, SearchAborted> {
        self.minimax(board, me, opp, depth, true, SCORE_NEG_INF, SCORE_POS_INF, 0)
    }

    /// Depth-limited minimax with alpha-beta pruning.
    ///
    /// Leaves (depth exhausted, or the side to move has no legal move) are
    /// scored with `evaluate`. Children are visited in `Direction::all()`
    /// order and only a strictly better score replaces the current best, so
    /// ties go to the earliest move.
    #[allow(clippy::too_many_arguments)]
    pub fn minimax(
        &mut self,
        board: &Board,
        me: Coord,
        opp: Coord,
        depth: u8,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
        ply: u32,
    ) -> Result<SearchOutcome, SearchAborted> {
        let _prof = crate::simple_profiler::ProfileGuard::new("alpha_beta");
        self.stats.nodes += 1;

        if depth == 0 {
            return Ok(self.leaf(board, me, opp, ply));
        }

        let (mover_pos, mover_index) = if maximizing {
            (me, self.players.me)
        } else {
            (opp, self.players.opp)
        };

        let moves = board.legal_moves(&mover_pos);
        if moves.is_empty() {
            return Ok(self.leaf(board, me, opp, ply));
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(SearchAborted);
            }
        }

        let mut best_score = if maximizing { SCORE_NEG_INF } else { SCORE_POS_INF };
        let mut best_move = None;

        for (dir, next) in moves {
            let child_board = board.with_move(mover_index, &next);

            let child = if maximizing {
                self.minimax(&child_board, next, opp, depth - 1, false, alpha, beta, ply + 1)?
            } else {
                self.minimax(&child_board, me, next, depth - 1, true, alpha, beta, ply + 1)?
            };

            if maximizing {
                if child.score > best_score {
                    best_score = child.score;
                    best_move = Some(dir);
                }
                alpha = alpha.max(best_score);
            } else {
                if child.score < best_score {
                    best_score = child.score;
                    best_move = Some(dir);
                }
                beta = beta.min(best_score);
            }

            if alpha >= beta {
                self.stats.cutoffs += 1;
                crate::simple_profiler::record_alpha_beta_cutoff();
                break;
            }
        }

        Ok(SearchOutcome {
            score: best_score,
            best_move,
        })
    }

    fn leaf(&mut self, board: &Board, me: Coord, opp: Coord, ply: u32) -> SearchOutcome {
        self.stats.leaf_evaluations += 1;
        SearchOutcome {
            score: evaluate(board, me, opp, &self.params, ply),
            best_move: None,
        }
    }
}
