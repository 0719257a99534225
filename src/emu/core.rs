//! Single node executor.
//!
//! A core holds two registers (ACC, BAK), a program counter, and one
//! single-value mailbox per direction for each of input and output. It can
//! run on its own (feed it with [`Core::set_direction`], drain it with
//! [`Core::get_direction`]) but is normally hosted on a
//! [`Board`](crate::device::Board), which moves values between neighbours.
//!
//! # Blocking
//!
//! Execution never waits. A step that cannot complete is a no-op and the
//! same instruction is retried on the next step:
//! - **write blocking**: while any output mailbox is still full nothing runs
//! - **read blocking**: a read from an empty input mailbox leaves PC in place

use super::instruction::{Command, Direction, DirectionSet, Instruction, Parameter};
use crate::parser::validator::{validate, ValidationError};

/// What a call to [`Core::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No program loaded.
    Idle,
    /// An earlier write has not been drained yet.
    WriteBlocked,
    /// The current instruction is waiting for an input value.
    ReadBlocked,
    /// The current instruction completed.
    Executed,
}

/// Register file and port mailboxes.
#[derive(Debug, Clone, Default)]
struct Registers {
    /// Accumulator: the working register.
    acc: i32,
    /// Backup: only reachable through SWP and SAV.
    bak: i32,
    /// Pending value received per direction.
    input: [Option<i32>; 4],
    /// Pending value to send per direction.
    output: [Option<i32>; 4],
}

impl Registers {
    /// Read a numeric source operand.
    ///
    /// Reading a port consumes its mailbox. `None` means the read must be
    /// retried.
    fn read(&mut self, param: &Parameter) -> Option<i32> {
        match param {
            Parameter::Number(n) => Some(*n),
            Parameter::Acc => Some(self.acc),
            Parameter::Direction(d) => self.input[d.index()].take(),
            p if p.is_nil() => Some(0),
            _ => None,
        }
    }

    fn write(&mut self, param: &Parameter, value: i32) {
        match param {
            Parameter::Acc => self.acc = value,
            Parameter::Direction(d) => self.output[d.index()] = Some(value),
            // NIL and anything invalid discard.
            _ => {}
        }
    }

    fn write_pending(&self) -> bool {
        self.output.iter().any(Option::is_some)
    }
}

/// A processing node.
#[derive(Debug, Clone, Default)]
pub struct Core {
    regs: Registers,
    /// Index into `commands` of the next command to run.
    pc: usize,
    directions: DirectionSet,
    commands: Vec<Command>,
}

impl Core {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator.
    pub fn acc(&self) -> i32 {
        self.regs.acc
    }

    /// Backup register.
    pub fn bak(&self) -> i32 {
        self.regs.bak
    }

    /// Program counter.
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Is this core linked on `direction`?
    pub fn link(&self, direction: Direction) -> bool {
        self.directions.contains(direction)
    }

    pub fn directions(&self) -> DirectionSet {
        self.directions
    }

    /// Replace the linked direction set.
    pub fn set_directions(&mut self, directions: impl IntoIterator<Item = Direction>) {
        self.directions = directions.into_iter().collect();
    }

    pub fn add_direction(&mut self, direction: Direction) {
        self.directions.insert(direction);
    }

    /// Install a program. Registers and mailboxes are left as they are.
    pub fn set_commands(&mut self, commands: Vec<Command>) {
        self.commands = commands;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Validate the installed program against this core's links.
    pub fn validate(&self) -> Vec<ValidationError> {
        validate(self.directions, &self.commands)
    }

    /// Deliver a value into the input mailbox for `direction`.
    ///
    /// Returns false, leaving the mailbox untouched, if it is already full.
    pub fn set_direction(&mut self, direction: Direction, value: i32) -> bool {
        let slot = &mut self.regs.input[direction.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Drain the output mailbox for `direction`.
    pub fn get_direction(&mut self, direction: Direction) -> Option<i32> {
        self.regs.output[direction.index()].take()
    }

    /// Peek at the input mailbox for `direction`.
    pub fn input(&self, direction: Direction) -> Option<i32> {
        self.regs.input[direction.index()]
    }

    /// Peek at the output mailbox for `direction`.
    pub fn output(&self, direction: Direction) -> Option<i32> {
        self.regs.output[direction.index()]
    }

    /// Step until PC runs off the end of the program.
    ///
    /// Does not return for programs that loop or block forever; looping
    /// programs must be driven with [`Core::step`].
    pub fn run_once(&mut self) {
        if self.commands.is_empty() {
            return;
        }

        while self.pc < self.commands.len() {
            self.step();
        }
    }

    /// Execute the command at PC and move PC.
    pub fn step(&mut self) -> StepOutcome {
        if self.pc >= self.commands.len() {
            self.pc = 0;
        }

        if self.regs.write_pending() {
            log::trace!("pc={} write blocked", self.pc);
            return StepOutcome::WriteBlocked;
        }

        let Some(command) = self.commands.get(self.pc) else {
            return StepOutcome::Idle;
        };

        let offset = execute(&mut self.regs, command, &self.commands, self.pc);
        log::trace!("pc={} {} -> offset {}", self.pc, command, offset);

        let outcome = if offset == 0 && command.instruction != Instruction::Jro {
            StepOutcome::ReadBlocked
        } else {
            StepOutcome::Executed
        };

        // Past-the-end is wrapped on the next step; before-the-start clamps to 0.
        self.pc = self.pc.saturating_add_signed(offset);

        outcome
    }
}

/// Run one command and return the PC offset to apply.
fn execute(regs: &mut Registers, command: &Command, commands: &[Command], pc: usize) -> isize {
    match command.instruction {
        Instruction::Lbl | Instruction::Nop => 1,
        Instruction::Mov => match regs.read(&command.primary) {
            Some(value) => {
                regs.write(&command.secondary, value);
                1
            }
            None => 0,
        },
        Instruction::Swp => {
            std::mem::swap(&mut regs.acc, &mut regs.bak);
            1
        }
        Instruction::Sav => {
            regs.bak = regs.acc;
            1
        }
        Instruction::Add => match regs.read(&command.primary) {
            Some(value) => {
                regs.acc = regs.acc.wrapping_add(value);
                1
            }
            None => 0,
        },
        Instruction::Sub => match regs.read(&command.primary) {
            Some(value) => {
                regs.acc = regs.acc.wrapping_sub(value);
                1
            }
            None => 0,
        },
        Instruction::Neg => {
            regs.acc = regs.acc.wrapping_neg();
            1
        }
        Instruction::Jmp => jump_offset(true, &command.primary, commands, pc),
        Instruction::Jez => jump_offset(regs.acc == 0, &command.primary, commands, pc),
        Instruction::Jnz => jump_offset(regs.acc != 0, &command.primary, commands, pc),
        Instruction::Jgz => jump_offset(regs.acc > 0, &command.primary, commands, pc),
        Instruction::Jlz => jump_offset(regs.acc < 0, &command.primary, commands, pc),
        // A failed read counts as 0, which holds PC in place.
        Instruction::Jro => regs.read(&command.primary).unwrap_or(0) as isize,
    }
}

/// Offset from `pc` to the line of the target label, or 1 when not taken.
fn jump_offset(taken: bool, target: &Parameter, commands: &[Command], pc: usize) -> isize {
    if !taken {
        return 1;
    }

    let label = target.text();
    match commands.iter().find(|c| c.label().is_some() && c.label() == label) {
        Some(lbl) => lbl.line as isize - pc as isize,
        None => {
            log::warn!("jump to undefined label {:?} at pc={}", label.unwrap_or_default(), pc);
            1
        }
    }
}
