//! Source text to validated commands.
//!
//! The pipeline has three independent stages:
//!
//! ```text
//! text --lex--> [Symbol] --instruct--> [Command] --validate--> [ValidationError]
//! ```
//!
//! Lexing never fails. Parsing only fails when an instruction is cut short
//! by the end of the input. Everything else is left to [`validate`], which
//! reports problems without stopping at the first one.

pub mod lexer;
pub mod instruct;
pub mod validator;

pub use lexer::{lex, join, tokenize, Symbol, Token};
pub use instruct::{convert, instruct, parse};
pub use validator::{validate, ValidationError};

use thiserror::Error;

use crate::emu::instruction::Instruction;

/// Parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input ended before all operands of an instruction were read.
    #[error("{instruction} on line {line} needs {expected} operand(s), found {found}")]
    MissingOperand {
        instruction: Instruction,
        line: usize,
        expected: usize,
        found: usize,
    },
}
