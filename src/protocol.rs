// Per-turn text protocol and the live game state it drives
//
// Each turn arrives as a header line `n p` (agent count, controlled agent)
// followed by `n` lines `x_prev y_prev x_cur y_cur`. A previous x of -1 marks
// an agent that has been eliminated; its trail is released.

use log::info;
use tokio::io::{AsyncBufRead, Lines};

use crate::types::{Board, Cell, Coord};

/// Maximum number of agents the protocol allows
pub const MAX_AGENTS: usize = 4;

/// One agent's line of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentLine {
    pub prev: Coord,
    pub current: Coord,
}

impl AgentLine {
    pub fn is_eliminated(&self) -> bool {
        self.prev.x == -1
    }
}

/// A complete turn of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnInput {
    pub me: usize,
    pub agents: Vec<AgentLine>,
}

fn parse_ints(line: &str, expected: usize) -> Result<Vec<i32>, String> {
    let values = line
        .split_whitespace()
        .map(|tok| {
            tok.parse::<i32>()
                .map_err(|e| format!("Invalid integer '{}': {}", tok, e))
        })
        .collect::<Result<Vec<i32>, String>>()?;

    if values.len() != expected {
        return Err(format!(
            "Expected {} integers, got {} in line '{}'",
            expected,
            values.len(),
            line.trim()
        ));
    }
    Ok(values)
}

/// Parses the header line into (agent count, controlled agent index)
pub fn parse_header(line: &str) -> Result<(usize, usize), String> {
    let values = parse_ints(line, 2)?;
    let (n, p) = (values[0], values[1]);

    if n < 1 || n as usize > MAX_AGENTS {
        return Err(format!("Agent count must be within 1..={}, got {}", MAX_AGENTS, n));
    }
    if p < 0 || p >= n {
        return Err(format!("Controlled agent {} out of range for {} agents", p, n));
    }
    Ok((n as usize, p as usize))
}

pub fn parse_agent_line(line: &str) -> Result<AgentLine, String> {
    let v = parse_ints(line, 4)?;
    Ok(AgentLine {
        prev: Coord::new(v[0], v[1]),
        current: Coord::new(v[2], v[3]),
    })
}

/// Reads one full turn. Returns `Ok(None)` on end of input, which is a
/// normal shutdown whether it happens before the header or mid-turn.
pub async fn read_turn<R>(lines: &mut Lines<R>) -> Result<Option<TurnInput>, String>
where
    R: AsyncBufRead + Unpin,
{
    let header = match next_line(lines).await? {
        Some(line) => line,
        None => return Ok(None),
    };
    let (n, me) = parse_header(&header)?;

    let mut agents = Vec::with_capacity(n);
    for _ in 0..n {
        match next_line(lines).await? {
            Some(line) => agents.push(parse_agent_line(&line)?),
            None => return Ok(None),
        }
    }

    Ok(Some(TurnInput { me, agents }))
}

async fn next_line<R>(lines: &mut Lines<R>) -> Result<Option<String>, String>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read input: {}", e))?
        {
            Some(line) if line.trim().is_empty() => continue,
            other => return Ok(other),
        }
    }
}

/// Live board plus every agent's current head, rebuilt from each turn's input
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    positions: Vec<Option<Coord>>,
    turn: u32,
}

impl GameState {
    pub fn new(width: i32, height: i32) -> Self {
        GameState {
            board: Board::new(width, height),
            positions: Vec::new(),
            turn: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Head of each agent, `None` once eliminated
    pub fn positions(&self) -> &[Option<Coord>] {
        &self.positions
    }

    pub fn position(&self, agent: usize) -> Option<Coord> {
        self.positions.get(agent).copied().flatten()
    }

    /// Zero-based index of the most recently applied turn
    pub fn turn(&self) -> u32 {
        self.turn.saturating_sub(1)
    }

    /// Applies one turn of input. Eliminated agents are vacated, everyone
    /// else claims their current cell.
    pub fn apply_turn(&mut self, agents: &[AgentLine]) -> Result<(), String> {
        if agents.len() > MAX_AGENTS {
            return Err(format!("Too many agents: {}", agents.len()));
        }
        if self.positions.len() < agents.len() {
            self.positions.resize(agents.len(), None);
        }

        for (idx, line) in agents.iter().enumerate() {
            let agent = idx as u8;

            if line.is_eliminated() {
                let released = self.board.vacate(agent);
                if self.positions[idx].take().is_some() {
                    info!("Agent {} eliminated, released {} cells", idx, released);
                }
                continue;
            }

            if !self.board.in_bounds(&line.current) {
                return Err(format!(
                    "Agent {} position ({}, {}) is outside the {}x{} board",
                    idx, line.current.x, line.current.y, self.board.width, self.board.height
                ));
            }
            self.board.set(&line.current, Cell::Owned(agent));
            self.positions[idx] = Some(line.current);
        }

        self.turn += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(parse_header("2 0").unwrap(), (2, 0));
        assert_eq!(parse_header(" 4 3 \n").unwrap(), (4, 3));
        assert!(parse_header("2").is_err());
        assert!(parse_header("2 2").is_err());
        assert!(parse_header("5 0").is_err());
        assert!(parse_header("two 0").is_err());
    }

    #[test]
    fn test_parse_agent_line() {
        let line = parse_agent_line("9 5 10 5").unwrap();
        assert_eq!(line.prev, Coord::new(9, 5));
        assert_eq!(line.current, Coord::new(10, 5));
        assert!(!line.is_eliminated());

        assert!(parse_agent_line("-1 -1 -1 -1").unwrap().is_eliminated());
        assert!(parse_agent_line("1 2 3").is_err());
    }

    #[test]
    fn test_apply_turn_marks_heads() {
        let mut state = GameState::new(30, 20);
        state
            .apply_turn(&[
                parse_agent_line("9 5 9 5").unwrap(),
                parse_agent_line("10 7 10 7").unwrap(),
            ])
            .unwrap();

        assert_eq!(state.board().get(&Coord::new(9, 5)), Some(Cell::Owned(0)));
        assert_eq!(state.board().get(&Coord::new(10, 7)), Some(Cell::Owned(1)));
        assert_eq!(state.position(1), Some(Coord::new(10, 7)));
        assert_eq!(state.turn(), 0);
    }

    #[test]
    fn test_apply_turn_vacates_eliminated_agent() {
        let mut state = GameState::new(30, 20);
        state
            .apply_turn(&[
                parse_agent_line("0 0 0 0").unwrap(),
                parse_agent_line("5 5 5 5").unwrap(),
            ])
            .unwrap();
        state
            .apply_turn(&[
                parse_agent_line("0 0 1 0").unwrap(),
                parse_agent_line("5 5 5 6").unwrap(),
            ])
            .unwrap();
        state
            .apply_turn(&[
                parse_agent_line("1 0 2 0").unwrap(),
                parse_agent_line("-1 -1 -1 -1").unwrap(),
            ])
            .unwrap();

        assert_eq!(state.board().cells_owned_by(1), 0);
        assert_eq!(state.board().cells_owned_by(0), 3);
        assert_eq!(state.position(1), None);
        assert_eq!(state.turn(), 2);
    }

    #[test]
    fn test_apply_turn_rejects_out_of_bounds() {
        let mut state = GameState::new(30, 20);
        let result = state.apply_turn(&[parse_agent_line("30 0 30 0").unwrap()]);
        assert!(result.is_err());
    }
}
