//! Grid of cores and the global tick.
//!
//! The board is the top-level emulation object. It owns a fixed
//! width x height grid where each cell is either empty or holds one
//! [`Core`], plus input and output [`Link`]s attached at the grid edge.
//!
//! # Layout
//!
//! ```text
//!             input (0,-1) DOWN
//!                   |
//!        +--------+--------+
//!  row 0 | (0,0)  | (1,0)  | --> output (2,0) LEFT
//!        +--------+--------+
//!  row 1 | (0,1)  | (1,1)  |
//!        +--------+--------+
//!          col 0    col 1
//! ```
//!
//! Cells are stored in a flat Vec at `col * height + row`, the same order
//! the tick visits them in.
//!
//! # Tick
//!
//! 1. Each input link offers its oldest value to the core it points at. If
//!    that mailbox is full the value stays at the front of the queue.
//! 2. Columns left to right, rows top to bottom: step the core, then push
//!    every pending output to the neighbouring core and to any output link
//!    registered at that position.
//!
//! Step and propagation happen in the same pass, so a value sent to a core
//! later in visiting order is read in the same tick, while one sent to a core
//! earlier in the order waits for the next tick. Callers rely on this order.

use indexmap::IndexMap;
use thiserror::Error;

use super::link::{Link, Position};
use crate::emu::core::Core;
use crate::emu::instruction::Direction;
use crate::parser::{self, ParseError, ValidationError};

/// Board operation error.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Coordinates outside the grid.
    #[error("Position ({col},{row}) is outside the {width}x{height} grid")]
    OutOfBounds {
        col: i32,
        row: i32,
        width: usize,
        height: usize,
    },

    /// The cell exists but holds no core.
    #[error("No core placed at ({col},{row})")]
    NoCore { col: i32, row: i32 },

    /// Program text could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Grid of cores with edge links.
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    /// Cells stored as cells[col * height + row].
    cells: Vec<Option<Core>>,
    /// Input links by position, in registration order.
    inputs: IndexMap<Position, Link>,
    /// Output links by position, in registration order.
    outputs: IndexMap<Position, Link>,
    /// Completed ticks.
    ticks: u64,
}

/// Flat index of `pos` on a `width` x `height` grid.
#[inline]
fn cell_index(width: usize, height: usize, pos: Position) -> Option<usize> {
    let col = usize::try_from(pos.col).ok()?;
    let row = usize::try_from(pos.row).ok()?;
    (col < width && row < height).then(|| col * height + row)
}

impl Board {
    /// Create an empty board. No cells hold a core yet.
    pub fn new(width: usize, height: usize) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        cells.resize_with(width * height, || None);

        Self {
            width,
            height,
            cells,
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            ticks: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells (width x height).
    #[inline]
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Number of completed [`Board::step`] calls.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        cell_index(self.width, self.height, pos)
    }

    fn checked_index(&self, col: i32, row: i32) -> Result<usize, BoardError> {
        self.index(Position::new(col, row)).ok_or(BoardError::OutOfBounds {
            col,
            row,
            width: self.width,
            height: self.height,
        })
    }

    /// Get the core at a cell.
    ///
    /// Returns None for holes and coordinates outside the grid.
    pub fn core(&self, col: i32, row: i32) -> Option<&Core> {
        let idx = self.index(Position::new(col, row))?;
        self.cells[idx].as_ref()
    }

    /// Get the core at a cell mutably.
    pub fn core_mut(&mut self, col: i32, row: i32) -> Option<&mut Core> {
        let idx = self.index(Position::new(col, row))?;
        self.cells[idx].as_mut()
    }

    /// Put a fresh core at a cell and link it with its neighbours.
    ///
    /// Both sides of each link are updated. Only existing cores are linked;
    /// edge links registered earlier are not picked up.
    pub fn place(&mut self, col: i32, row: i32) -> Result<(), BoardError> {
        let idx = self.checked_index(col, row)?;
        let pos = Position::new(col, row);

        let mut core = Core::new();
        for dir in Direction::ALL {
            let neighbour = pos.step(dir);
            if let Some(other) = self.core_mut(neighbour.col, neighbour.row) {
                other.add_direction(dir.invert());
                core.add_direction(dir);
            }
        }

        self.cells[idx] = Some(core);
        Ok(())
    }

    /// Place a core in every cell.
    pub fn fill(&mut self) {
        for col in 0..self.width as i32 {
            for row in 0..self.height as i32 {
                // In range by construction.
                let _ = self.place(col, row);
            }
        }
    }

    /// Parse `code`, install it on the core at (col,row), and validate it.
    ///
    /// The program is installed even when validation finds errors; an empty
    /// list means the program is clean.
    pub fn load(
        &mut self,
        col: i32,
        row: i32,
        code: &str,
    ) -> Result<Vec<ValidationError>, BoardError> {
        let idx = self.checked_index(col, row)?;
        let commands = parser::parse(code)?;

        let Some(core) = self.cells[idx].as_mut() else {
            log::warn!("load into empty cell ({},{})", col, row);
            return Err(BoardError::NoCore { col, row });
        };

        let count = commands.len();
        core.set_commands(commands);
        let errors = core.validate();

        log::debug!(
            "Loaded {} commands into ({},{}), {} validation errors",
            count,
            col,
            row,
            errors.len()
        );

        Ok(errors)
    }

    /// Link the core next to an edge endpoint back towards it.
    fn add_link(&mut self, pos: Position, dir: Direction) {
        let target = pos.step(dir);
        if let Some(core) = self.core_mut(target.col, target.row) {
            core.add_direction(dir.invert());
        }
    }

    /// Attach an input queue at `(col,row)` feeding the grid in `dir`.
    ///
    /// Re-adding at the same position keeps the link id and replaces its
    /// direction and values.
    pub fn add_input(
        &mut self,
        col: i32,
        row: i32,
        dir: Direction,
        values: impl IntoIterator<Item = i32>,
    ) -> Position {
        let pos = Position::new(col, row);
        self.add_link(pos, dir);

        let id = self.inputs.get(&pos).map_or(self.inputs.len(), Link::id);
        let link = Link::new(id, dir, values);
        log::debug!("Input {} at {} {} with {} values", id, pos, dir, link.len());
        self.inputs.insert(pos, link);

        pos
    }

    /// Attach an empty output queue at `(col,row)` fed from the grid.
    ///
    /// `dir` points from the output into the grid. Re-adding at the same
    /// position keeps the link id and clears its values.
    pub fn add_output(&mut self, col: i32, row: i32, dir: Direction) -> Position {
        let pos = Position::new(col, row);
        self.add_link(pos, dir);

        let id = self.outputs.get(&pos).map_or(self.outputs.len(), Link::id);
        log::debug!("Output {} at {} {}", id, pos, dir);
        self.outputs.insert(pos, Link::new(id, dir, Vec::new()));

        pos
    }

    pub fn get_input(&self, pos: Position) -> Option<&Link> {
        self.inputs.get(&pos)
    }

    pub fn get_output(&self, pos: Position) -> Option<&Link> {
        self.outputs.get(&pos)
    }

    /// Remove and return everything collected by an output so far.
    pub fn drain_output(&mut self, pos: Position) -> Vec<i32> {
        self.outputs
            .get_mut(&pos)
            .map(|link| link.values.drain(..).collect())
            .unwrap_or_default()
    }

    /// Advance every input, core and output by one tick.
    pub fn step(&mut self) {
        self.buffer_inputs();
        self.execute();
        self.ticks += 1;
    }

    /// Offer one value from each input link to its core.
    fn buffer_inputs(&mut self) {
        for (pos, link) in self.inputs.iter_mut() {
            let Some(value) = link.values.pop_front() else {
                continue;
            };

            let target = pos.step(link.direction);
            let delivered = cell_index(self.width, self.height, target)
                .and_then(|idx| self.cells[idx].as_mut())
                .is_some_and(|core| core.set_direction(link.direction.invert(), value));

            if !delivered {
                log::debug!("Input {} stalled on {}", link.id, target);
                link.values.push_front(value);
            }
        }
    }

    /// Step every core in visiting order and propagate its outputs.
    fn execute(&mut self) {
        for col in 0..self.width as i32 {
            for row in 0..self.height as i32 {
                let pos = Position::new(col, row);
                let Some(core) = self.core_mut(col, row) else {
                    continue;
                };

                core.step();

                let mut sent = [None; 4];
                for dir in Direction::ALL {
                    if core.link(dir) {
                        sent[dir.index()] = core.get_direction(dir).map(|value| (dir, value));
                    }
                }

                for (dir, value) in sent.into_iter().flatten() {
                    self.propagate(pos.step(dir), dir, value);
                }
            }
        }
    }

    /// Deliver a value leaving a core in `dir` towards `target`.
    ///
    /// The neighbouring core gets it if its mailbox is free, otherwise it is
    /// dropped. An output link at `target` always records it.
    fn propagate(&mut self, target: Position, dir: Direction, value: i32) {
        if let Some(neighbour) = self.core_mut(target.col, target.row) {
            if !neighbour.set_direction(dir.invert(), value) {
                log::trace!("{} dropped at {}, mailbox full", value, target);
            }
        }

        if let Some(output) = self.outputs.get_mut(&target) {
            log::trace!("{} -> output {} at {}", value, output.id, target);
            output.values.push_back(value);
        }
    }
}
