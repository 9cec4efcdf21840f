// Territory estimation: bounded breadth-first flood fill and the leaf heuristic
//
// The search calls `evaluate` at every leaf, so the flood fill is capped in
// bounded mode. The cap shrinks as the hypothetical game advances (`ply`),
// since every ply claims one more cell of the board.

use std::collections::VecDeque;

use crate::types::{Board, Coord};

/// Smallest cap a bounded flood fill ever uses
pub const MIN_FLOOD_FILL_CAP: usize = 10;

/// How a flood fill is allowed to spend its work
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloodFillParams {
    /// Fraction of the remaining board a bounded fill may visit, in [0, 1]
    pub scale_factor: f64,
    /// When false, the fill is exhaustive and `scale_factor` is ignored
    pub bounded: bool,
}

impl FloodFillParams {
    pub fn bounded(scale_factor: f64) -> Self {
        FloodFillParams {
            scale_factor,
            bounded: true,
        }
    }

    pub fn exhaustive() -> Self {
        FloodFillParams {
            scale_factor: 1.0,
            bounded: false,
        }
    }
}

/// Cap for a bounded flood fill at the given ply:
/// `max(10, floor(scale * max(0, total_cells - 2 * ply)))`
pub fn flood_fill_cap(total_cells: usize, scale_factor: f64, ply: u32) -> usize {
    let cells_left = total_cells.saturating_sub(2 * ply as usize);
    let scaled = (cells_left as f64 * scale_factor).floor() as usize;
    scaled.max(MIN_FLOOD_FILL_CAP)
}

/// Counts the cells reachable from `origin`, including `origin` itself.
///
/// Expansion follows `Board::legal_moves`, so it only walks through free cells.
/// In bounded mode the cap is checked before each dequeue and after each newly
/// visited cell; the count grows by one per visit, so it never exceeds the cap.
///
/// # Panics
/// If `params.scale_factor` lies outside `[0, 1]`.
pub fn reachable_count(board: &Board, origin: Coord, params: &FloodFillParams, ply: u32) -> usize {
    assert!(
        (0.0..=1.0).contains(&params.scale_factor),
        "flood fill scale factor must be within [0, 1], got {}",
        params.scale_factor
    );

    let _prof = crate::simple_profiler::ProfileGuard::new("flood_fill");

    let cap = if params.bounded {
        flood_fill_cap(board.total_cells(), params.scale_factor, ply)
    } else {
        usize::MAX
    };

    let mut visited = vec![false; board.total_cells()];
    if let Some(idx) = board.index_of(&origin) {
        visited[idx] = true;
    }

    let mut queue = VecDeque::new();
    queue.push_back(origin);
    let mut count = 1;

    'fill: while count < cap {
        let current = match queue.pop_front() {
            Some(c) => c,
            None => break,
        };

        for (_, next) in board.legal_moves(&current) {
            // legal_moves only yields in-bounds cells
            let idx = match board.index_of(&next) {
                Some(i) => i,
                None => continue,
            };
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            queue.push_back(next);
            count += 1;

            if count >= cap {
                break 'fill;
            }
        }
    }

    count
}

/// Leaf heuristic: my reachable area minus the opponent's.
/// Positive scores favour the maximizing agent.
pub fn evaluate(board: &Board, me: Coord, opp: Coord, params: &FloodFillParams, ply: u32) -> i32 {
    crate::profile!("eval", {
        let mine = reachable_count(board, me, params, ply) as i32;
        let theirs = reachable_count(board, opp, params, ply) as i32;
        mine - theirs
    })
}
