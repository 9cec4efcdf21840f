// Board and movement types for the light-cycle arena
// Coordinates are screen-style: x grows to the right, y grows downward.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Calculates Manhattan distance between two coordinates
    pub fn manhattan(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Represents the four possible movement directions for a light cycle
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Returns all directions in enumeration order.
    /// Search tie-breaks resolve to the earliest direction in this order.
    pub fn all() -> [Direction; 4] {
        [Direction::Right, Direction::Down, Direction::Left, Direction::Up]
    }

    /// Converts direction to the action name expected on stdout
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Up => "UP",
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::Right => Coord { x: coord.x + 1, y: coord.y },
            Direction::Down => Coord { x: coord.x, y: coord.y + 1 },
            Direction::Left => Coord { x: coord.x - 1, y: coord.y },
            Direction::Up => Coord { x: coord.x, y: coord.y - 1 },
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RIGHT" => Ok(Direction::Right),
            "DOWN" => Ok(Direction::Down),
            "LEFT" => Ok(Direction::Left),
            "UP" => Ok(Direction::Up),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single board cell
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Free,
    /// Trail (or head) of the agent with this index
    Owned(u8),
    /// Permanent obstacle that no agent can enter
    Blocked,
}

/// Fixed-size grid of cells, stored row-major
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board where every cell is free
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be positive");
        Board {
            width,
            height,
            cells: vec![Cell::Free; (width * height) as usize],
        }
    }

    /// Fixed grid capacity, used as the base for the flood-fill cap
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn free_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Free).count()
    }

    pub fn cells_owned_by(&self, agent: u8) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Owned(agent)).count()
    }

    pub fn in_bounds(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    /// Row-major index of an in-bounds coordinate
    #[inline]
    pub fn index_of(&self, coord: &Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some((coord.y * self.width + coord.x) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, coord: &Coord) -> Option<Cell> {
        self.index_of(coord).map(|idx| self.cells[idx])
    }

    /// Sets a cell, ignoring out-of-bounds coordinates.
    /// Returns whether the cell was written.
    pub fn set(&mut self, coord: &Coord, cell: Cell) -> bool {
        match self.index_of(coord) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_free(&self, coord: &Coord) -> bool {
        matches!(self.get(coord), Some(Cell::Free))
    }

    /// Legal single-step moves from `pos`, in `Direction::all()` order.
    /// A move is legal iff its destination is in bounds and free.
    /// An empty result means the agent at `pos` is eliminated on its next move.
    pub fn legal_moves(&self, pos: &Coord) -> Vec<(Direction, Coord)> {
        let _prof = crate::simple_profiler::ProfileGuard::new("move_gen");

        Direction::all()
            .iter()
            .filter_map(|dir| {
                let next = dir.apply(pos);
                if self.is_free(&next) {
                    Some((*dir, next))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Copy of this board with `coord` claimed by `agent`
    pub fn with_move(&self, agent: u8, coord: &Coord) -> Board {
        let _prof = crate::simple_profiler::ProfileGuard::new("apply_move");

        let mut next = self.clone();
        next.set(coord, Cell::Owned(agent));
        next
    }

    /// Frees every cell owned by an eliminated agent.
    /// Returns the number of cells released.
    pub fn vacate(&mut self, agent: u8) -> usize {
        let mut released = 0;
        for cell in self.cells.iter_mut() {
            if *cell == Cell::Owned(agent) {
                *cell = Cell::Free;
                released += 1;
            }
        }
        released
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for cell in row {
                let ch = match cell {
                    Cell::Free => '.',
                    Cell::Blocked => '#',
                    Cell::Owned(k) => std::char::from_digit(u32::from(*k) % 36, 36).unwrap_or('?'),
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
