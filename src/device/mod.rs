//! The node grid.
//!
//! This module provides:
//! - [`Board`]: the grid of cores and the global tick
//! - [`Link`]/[`Position`]: edge input and output queues
//!
//! # Example
//!
//! ```
//! use tis_emu::device::Board;
//! use tis_emu::emu::Direction;
//!
//! // Two nodes side by side, each doubling what it receives
//! let mut board = Board::new(2, 1);
//! board.fill();
//! board.add_input(-1, 0, Direction::Right, [1, 2, 3]);
//! let out = board.add_output(2, 0, Direction::Left);
//!
//! for col in 0..2 {
//!     let errors = board.load(col, 0, "MOV LEFT ACC\nADD ACC\nMOV ACC RIGHT").unwrap();
//!     assert!(errors.is_empty());
//! }
//!
//! while board.get_output(out).unwrap().len() < 3 {
//!     board.step();
//! }
//! assert_eq!(board.drain_output(out), vec![4, 8, 12]);
//! ```

pub mod link;
pub mod board;

pub use link::{Link, Position};
pub use board::{Board, BoardError};
