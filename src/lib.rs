//! tis-emu library
//!
//! Emulation of a grid of small assembly nodes that talk to their
//! neighbours over single-value mailboxes.
//!
//! - [`parser`]: source text to commands, plus static validation
//! - [`emu`]: instruction model and the single-node interpreter
//! - [`device`]: the board grid, edge links and the global tick
//! - [`demos`]: reference programs with known results

pub mod config;
pub mod parser;
pub mod emu;
pub mod device;
pub mod demos;
