//! Instruction set of the node assembly language.
//!
//! Every node runs a flat list of [`Command`]s. A command is one of fourteen
//! [`Instruction`]s plus up to two typed [`Parameter`]s and the source line
//! it came from. Line numbers are what jumps resolve against, so they are
//! kept on the command rather than recomputed from list positions.
//!
//! # Operand kinds
//!
//! | Kind        | Example        | Produced from                       |
//! |-------------|----------------|-------------------------------------|
//! | `Empty`     |                | no operand supplied                 |
//! | `Label`     | `START:`       | a text run followed by `:`          |
//! | `Text`      | `NIL`, `START` | any other text run                  |
//! | `Number`    | `-12`          | a run of digits and `-`             |
//! | `Acc`       | `ACC`          | the literal `ACC`                   |
//! | `Direction` | `UP`           | one of `UP`, `RIGHT`, `DOWN`, `LEFT`|

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Literal that reads as zero and discards writes.
pub const NIL: &str = "NIL";

/// Literal naming the accumulator register.
pub const ACC: &str = "ACC";

/// Unknown mnemonic or direction name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Not one of `UP`, `RIGHT`, `DOWN`, `LEFT`.
    #[error("Unknown direction: {0:?}")]
    Direction(String),

    /// Not one of the fourteen mnemonics.
    #[error("Unknown instruction: {0:?}")]
    Instruction(String),
}

/// Grid direction of a node port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in port order. Board propagation visits ports in this order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// The same edge seen from the neighbouring node.
    ///
    /// A RIGHT port on one node is the LEFT port on the other.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Slot index into per-direction buffers.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Assembly spelling.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
        }
    }
}

impl FromStr for Direction {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(Direction::Up),
            "RIGHT" => Ok(Direction::Right),
            "DOWN" => Ok(Direction::Down),
            "LEFT" => Ok(Direction::Left),
            _ => Err(NameError::Direction(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of directions a node is physically linked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionSet {
    bits: u8,
}

impl DirectionSet {
    /// Empty set.
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    #[inline]
    fn mask(direction: Direction) -> u8 {
        1 << direction.index()
    }

    /// Add a direction. Adding twice is a no-op.
    pub fn insert(&mut self, direction: Direction) {
        self.bits |= Self::mask(direction);
    }

    /// Check membership.
    #[inline]
    pub fn contains(&self, direction: Direction) -> bool {
        self.bits & Self::mask(direction) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Members in [`Direction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::new();
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

/// Instruction mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Label marker (jump target, executes as a no-op).
    Lbl,
    Nop,
    /// Move source to destination.
    Mov,
    /// Swap ACC and BAK.
    Swp,
    /// Copy ACC into BAK.
    Sav,
    Add,
    Sub,
    /// Negate ACC.
    Neg,
    /// Unconditional jump.
    Jmp,
    /// Jump if ACC == 0.
    Jez,
    /// Jump if ACC != 0.
    Jnz,
    /// Jump if ACC > 0.
    Jgz,
    /// Jump if ACC < 0.
    Jlz,
    /// Jump relative by an offset.
    Jro,
}

impl Instruction {
    /// Number of operand symbols the parser consumes after the mnemonic.
    pub fn operand_count(self) -> usize {
        match self {
            Instruction::Lbl
            | Instruction::Nop
            | Instruction::Swp
            | Instruction::Sav
            | Instruction::Neg => 0,
            Instruction::Mov => 2,
            Instruction::Add
            | Instruction::Sub
            | Instruction::Jmp
            | Instruction::Jez
            | Instruction::Jnz
            | Instruction::Jgz
            | Instruction::Jlz
            | Instruction::Jro => 1,
        }
    }

    /// Label jumps (everything in the jump family except JRO).
    pub fn is_label_jump(self) -> bool {
        matches!(
            self,
            Instruction::Jmp | Instruction::Jez | Instruction::Jnz | Instruction::Jgz | Instruction::Jlz
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Instruction::Lbl => "LBL",
            Instruction::Nop => "NOP",
            Instruction::Mov => "MOV",
            Instruction::Swp => "SWP",
            Instruction::Sav => "SAV",
            Instruction::Add => "ADD",
            Instruction::Sub => "SUB",
            Instruction::Neg => "NEG",
            Instruction::Jmp => "JMP",
            Instruction::Jez => "JEZ",
            Instruction::Jnz => "JNZ",
            Instruction::Jgz => "JGZ",
            Instruction::Jlz => "JLZ",
            Instruction::Jro => "JRO",
        }
    }
}

impl FromStr for Instruction {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let instruction = match s {
            "LBL" => Instruction::Lbl,
            "NOP" => Instruction::Nop,
            "MOV" => Instruction::Mov,
            "SWP" => Instruction::Swp,
            "SAV" => Instruction::Sav,
            "ADD" => Instruction::Add,
            "SUB" => Instruction::Sub,
            "NEG" => Instruction::Neg,
            "JMP" => Instruction::Jmp,
            "JEZ" => Instruction::Jez,
            "JNZ" => Instruction::Jnz,
            "JGZ" => Instruction::Jgz,
            "JLZ" => Instruction::Jlz,
            "JRO" => Instruction::Jro,
            _ => return Err(NameError::Instruction(s.to_string())),
        };
        Ok(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A typed operand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Parameter {
    /// No operand supplied.
    #[default]
    Empty,
    Label(String),
    Text(String),
    Number(i32),
    Acc,
    Direction(Direction),
}

impl Parameter {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Parameter::Empty)
    }

    /// Operand usable as a numeric source (Number, ACC or a port).
    #[inline]
    pub fn is_numeric_source(&self) -> bool {
        matches!(self, Parameter::Number(_) | Parameter::Acc | Parameter::Direction(_))
    }

    /// `NIL` written as plain text.
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Parameter::Text(text) if text == NIL)
    }

    /// Literal of a Label or Text operand.
    pub fn text(&self) -> Option<&str> {
        match self {
            Parameter::Label(text) | Parameter::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Empty => Ok(()),
            Parameter::Label(text) | Parameter::Text(text) => f.write_str(text),
            Parameter::Number(n) => write!(f, "{}", n),
            Parameter::Acc => f.write_str(ACC),
            Parameter::Direction(d) => write!(f, "{}", d),
        }
    }
}

/// A parsed instruction with its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Source line index used by jumps.
    pub line: usize,
    pub instruction: Instruction,
    pub primary: Parameter,
    pub secondary: Parameter,
}

impl Command {
    /// Command with both operand slots empty.
    pub fn new(instruction: Instruction, line: usize) -> Self {
        Self {
            line,
            instruction,
            primary: Parameter::Empty,
            secondary: Parameter::Empty,
        }
    }

    pub fn with_primary(mut self, primary: Parameter) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_secondary(mut self, secondary: Parameter) -> Self {
        self.secondary = secondary;
        self
    }

    /// Label name if this is an `LBL` command.
    pub fn label(&self) -> Option<&str> {
        match (self.instruction, &self.primary) {
            (Instruction::Lbl, Parameter::Label(name)) => Some(name),
            _ => None,
        }
    }

    /// Operand by slot index (0 = primary, 1 = secondary).
    pub fn operand(&self, slot: usize) -> Option<&Parameter> {
        match slot {
            0 => Some(&self.primary),
            1 => Some(&self.secondary),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.label() {
            return write!(f, "{}:", name);
        }
        write!(f, "{}", self.instruction)?;
        if !self.primary.is_empty() {
            write!(f, " {}", self.primary)?;
        }
        if !self.secondary.is_empty() {
            write!(f, " {}", self.secondary)?;
        }
        Ok(())
    }
}
