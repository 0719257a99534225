//! Reference programs with known results.
//!
//! Each demo builds a small board, feeds it a fixed input, and steps it
//! until an output has collected the expected number of values. They
//! double as end-to-end checks of the lexer, validator, cores and tick
//! order.

use std::fmt;

use thiserror::Error;

use crate::device::{Board, BoardError, Position};
use crate::emu::Direction;
use crate::parser::ValidationError;

/// Demo failure.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Board(#[from] BoardError),

    /// A shipped program failed validation.
    #[error("{name}: {count} validation errors, first: {first}")]
    Invalid {
        name: &'static str,
        count: usize,
        first: ValidationError,
    },

    /// The wait condition was not met within the tick budget.
    #[error("{name}: gave up after {ticks} ticks")]
    TickBudget { name: &'static str, ticks: u64 },
}

/// Result of one demo run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub name: &'static str,
    pub source: &'static str,
    /// Input queues as they were before the run.
    pub inputs: Vec<(&'static str, Vec<i32>)>,
    /// Output queues after the run.
    pub outputs: Vec<(&'static str, Vec<i32>)>,
    /// Final ACC of each core, in column-major order.
    pub acc: Vec<i32>,
}

impl fmt::Display for DemoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name)?;
        writeln!(f)?;
        writeln!(f, "{}", self.source)?;
        writeln!(f)?;
        for (name, values) in &self.inputs {
            writeln!(f, "Input {}: {}", name, join(values))?;
        }
        for (i, acc) in self.acc.iter().enumerate() {
            writeln!(f, "Core {} ACC: {}", i, acc)?;
        }
        for (name, values) in &self.outputs {
            writeln!(f, "Output {}: {}", name, join(values))?;
        }
        Ok(())
    }
}

fn join(values: &[i32]) -> String {
    values
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub const SIMPLE: &str = "MOV 8, ACC
MOV LEFT, RIGHT
MOV UP, NIL";

pub const DOUBLER: &str = "MOV LEFT ACC
ADD ACC
MOV ACC RIGHT";

pub const SORTER: &str = "START:
MOV UP ACC
 JGZ POSITIVE
 JLZ NEGATIVE
JMP START
POSITIVE:
 MOV ACC RIGHT
 JMP START
NEGATIVE:
 MOV ACC LEFT
 JMP START";

/// Load `source` at (col,row), failing on any validation error.
fn load(
    board: &mut Board,
    name: &'static str,
    col: i32,
    row: i32,
    source: &str,
) -> Result<(), DemoError> {
    let errors = board.load(col, row, source)?;
    match errors.first() {
        None => Ok(()),
        Some(first) => Err(DemoError::Invalid {
            name,
            count: errors.len(),
            first: first.clone(),
        }),
    }
}

/// Step until the output at `pos` holds `count` values.
fn run_until(
    board: &mut Board,
    name: &'static str,
    pos: Position,
    count: usize,
    max_ticks: u64,
) -> Result<(), DemoError> {
    while board.get_output(pos).map_or(0, |link| link.len()) < count {
        if board.ticks() >= max_ticks {
            return Err(DemoError::TickBudget {
                name,
                ticks: board.ticks(),
            });
        }
        board.step();
    }
    log::debug!("{} finished in {} ticks", name, board.ticks());
    Ok(())
}

fn accumulators(board: &Board) -> Vec<i32> {
    let mut acc = Vec::new();
    for col in 0..board.width() as i32 {
        for row in 0..board.height() as i32 {
            if let Some(core) = board.core(col, row) {
                acc.push(core.acc());
            }
        }
    }
    acc
}

/// One node: stores 8 in ACC, forwards LEFT to RIGHT and discards UP.
pub fn simple(max_ticks: u64) -> Result<DemoReport, DemoError> {
    let name = "Simple";
    let left = vec![1, 2, 3];
    let up = vec![5, 6, 7];

    let mut board = Board::new(1, 1);
    board.fill();
    board.add_input(-1, 0, Direction::Right, left.clone());
    board.add_input(0, -1, Direction::Down, up.clone());
    let right = board.add_output(1, 0, Direction::Left);
    load(&mut board, name, 0, 0, SIMPLE)?;

    run_until(&mut board, name, right, 3, max_ticks)?;

    Ok(DemoReport {
        name,
        source: SIMPLE,
        inputs: vec![("Left", left), ("Up", up)],
        acc: accumulators(&board),
        outputs: vec![("Right", board.drain_output(right))],
    })
}

/// Two nodes in a row, each doubling what passes through.
pub fn doubler(max_ticks: u64) -> Result<DemoReport, DemoError> {
    let name = "Doubler";
    let left = vec![1, 2, 3];

    let mut board = Board::new(2, 1);
    board.fill();
    board.add_input(-1, 0, Direction::Right, left.clone());
    let right = board.add_output(2, 0, Direction::Left);
    load(&mut board, name, 0, 0, DOUBLER)?;
    load(&mut board, name, 1, 0, DOUBLER)?;

    run_until(&mut board, name, right, 3, max_ticks)?;

    Ok(DemoReport {
        name,
        source: DOUBLER,
        inputs: vec![("Left", left)],
        acc: accumulators(&board),
        outputs: vec![("Right", board.drain_output(right))],
    })
}

/// One node sorting by sign: positives RIGHT, negatives LEFT, zeros dropped.
pub fn sorter(max_ticks: u64) -> Result<DemoReport, DemoError> {
    let name = "Sorter";
    let up = vec![5, -6, 0, -2, 3];

    let mut board = Board::new(1, 1);
    board.fill();
    board.add_input(0, -1, Direction::Down, up.clone());
    let right = board.add_output(1, 0, Direction::Left);
    let left = board.add_output(-1, 0, Direction::Right);
    load(&mut board, name, 0, 0, SORTER)?;

    run_until(&mut board, name, right, 2, max_ticks)?;

    Ok(DemoReport {
        name,
        source: SORTER,
        inputs: vec![("Up", up)],
        acc: accumulators(&board),
        outputs: vec![
            ("Left", board.drain_output(left)),
            ("Right", board.drain_output(right)),
        ],
    })
}

/// Run every demo in order, stopping at the first failure.
pub fn all(max_ticks: u64) -> Result<Vec<DemoReport>, DemoError> {
    Ok(vec![simple(max_ticks)?, doubler(max_ticks)?, sorter(max_ticks)?])
}
