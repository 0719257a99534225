//! Node execution.
//!
//! This module provides the per-node virtual machine:
//! - [`instruction`]: mnemonics, typed operands, parsed commands
//! - [`core`]: registers, port mailboxes, and the step function
//!
//! Nodes do not talk to each other directly. A core only fills its own
//! output mailboxes and drains its own input mailboxes; moving values across
//! the grid is the job of [`Board`](crate::device::Board).
//!
//! # Example
//!
//! ```
//! use tis_emu::emu::{Core, Direction};
//! use tis_emu::parser::parse;
//!
//! let mut core = Core::new();
//! core.set_directions([Direction::Up]);
//! core.set_commands(parse("MOV UP ACC").unwrap());
//!
//! core.step(); // blocked, nothing to read
//! assert_eq!(core.pc(), 0);
//!
//! core.set_direction(Direction::Up, 7);
//! core.step();
//! assert_eq!(core.acc(), 7);
//! ```

pub mod instruction;
pub mod core;

pub use instruction::{Command, Direction, DirectionSet, Instruction, NameError, Parameter};
pub use self::core::{Core, StepOutcome};
