//! Static checks over a parsed program.
//!
//! Two things are checked in one pass:
//! - operand kinds per instruction (`JMP START` is fine, `JMP 3` is not)
//! - ports used by an instruction are actually linked on this node
//!
//! Errors are collected, never short-circuited, in command order and then
//! operand order.

use std::fmt;

use crate::emu::instruction::{Command, DirectionSet, Instruction, Parameter};

pub const INVALID_PARAMETER: &str = "invalid parameter";
pub const INVALID_DIRECTION: &str = "invalid direction";
pub const INVALID_LABEL: &str = "invalid label";
pub const DUPLICATE_LABEL: &str = "duplicate label";

/// A semantic error tied to one operand slot of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The offending command.
    pub command: Command,
    /// Source line of `command`.
    pub line: usize,
    pub message: String,
    /// Operand slot (0 = primary, 1 = secondary).
    pub slot: usize,
}

impl ValidationError {
    pub fn new(command: &Command, message: &str, slot: usize) -> Self {
        Self {
            command: command.clone(),
            line: command.line,
            message: message.to_string(),
            slot,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} (operand {}) in `{}`",
            self.line, self.message, self.slot, self.command
        )
    }
}

/// Validate `commands` for a node linked on `links`.
pub fn validate(links: DirectionSet, commands: &[Command]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for command in commands {
        match command.instruction {
            Instruction::Nop | Instruction::Swp | Instruction::Sav | Instruction::Neg => {
                if !command.primary.is_empty() {
                    errors.push(ValidationError::new(command, INVALID_PARAMETER, 0));
                }
                if !command.secondary.is_empty() {
                    errors.push(ValidationError::new(command, INVALID_PARAMETER, 1));
                }
            }
            Instruction::Mov => {
                if !command.primary.is_numeric_source() {
                    errors.push(ValidationError::new(command, INVALID_PARAMETER, 0));
                }
                if let Parameter::Direction(d) = command.primary {
                    if !links.contains(d) {
                        errors.push(ValidationError::new(command, INVALID_DIRECTION, 0));
                    }
                }

                match &command.secondary {
                    Parameter::Direction(d) => {
                        if !links.contains(*d) {
                            errors.push(ValidationError::new(command, INVALID_DIRECTION, 1));
                        }
                    }
                    Parameter::Acc => {}
                    other if other.is_nil() => {}
                    _ => errors.push(ValidationError::new(command, INVALID_PARAMETER, 1)),
                }
            }
            Instruction::Add | Instruction::Sub => {
                if !command.secondary.is_empty() {
                    errors.push(ValidationError::new(command, INVALID_PARAMETER, 1));
                }

                if !command.primary.is_numeric_source() {
                    errors.push(ValidationError::new(command, INVALID_PARAMETER, 0));
                } else if let Parameter::Direction(d) = command.primary {
                    if !links.contains(d) {
                        errors.push(ValidationError::new(command, INVALID_DIRECTION, 0));
                    }
                }
            }
            Instruction::Jmp
            | Instruction::Jez
            | Instruction::Jnz
            | Instruction::Jgz
            | Instruction::Jlz => {
                match &command.primary {
                    Parameter::Text(target) => {
                        if !commands.iter().any(|c| c.label() == Some(target.as_str())) {
                            errors.push(ValidationError::new(command, INVALID_LABEL, 0));
                        }
                    }
                    _ => errors.push(ValidationError::new(command, INVALID_PARAMETER, 0)),
                }
                if !command.secondary.is_empty() {
                    errors.push(ValidationError::new(command, INVALID_PARAMETER, 1));
                }
            }
            Instruction::Jro => {
                if !command.primary.is_numeric_source() {
                    errors.push(ValidationError::new(command, INVALID_PARAMETER, 0));
                } else if let Parameter::Number(offset) = command.primary {
                    let last_line = commands.iter().map(|c| c.line).max().unwrap_or(0) as i64;
                    let target = command.line as i64 + offset as i64;
                    if target < 0 || target > last_line {
                        errors.push(ValidationError::new(command, INVALID_PARAMETER, 0));
                    }
                }

                if !command.secondary.is_empty() {
                    errors.push(ValidationError::new(command, INVALID_PARAMETER, 1));
                }
            }
            Instruction::Lbl => {
                // Reported from both sides: each copy flags the other one.
                let name = command.label();
                for other in commands {
                    if other.label().is_some() && other.label() == name && other.line != command.line {
                        errors.push(ValidationError::new(other, DUPLICATE_LABEL, 0));
                    }
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emu::instruction::Direction;
    use crate::parser::instruct::parse;

    fn all_links() -> DirectionSet {
        Direction::ALL.into_iter().collect()
    }

    fn check(links: DirectionSet, source: &str) -> Vec<ValidationError> {
        validate(links, &parse(source).expect("program should parse"))
    }

    fn slots(errors: &[ValidationError]) -> Vec<(usize, &str)> {
        errors.iter().map(|e| (e.slot, e.message.as_str())).collect()
    }

    #[test]
    fn test_validate_empty() {
        assert!(validate(DirectionSet::new(), &[]).is_empty());
    }

    #[test]
    fn test_error_carries_command_line() {
        let command = Command::new(Instruction::Nop, 7).with_primary(Parameter::Number(1));
        let error = ValidationError::new(&command, INVALID_PARAMETER, 0);
        assert_eq!(error.line, 7);
        assert_eq!(error.command, command);
        assert_eq!(error.to_string(), "line 7: invalid parameter (operand 0) in `NOP 1`");
    }

    #[test]
    fn test_no_operand_instructions() {
        for mnemonic in [Instruction::Nop, Instruction::Swp, Instruction::Sav, Instruction::Neg] {
            assert!(validate(all_links(), &[Command::new(mnemonic, 0)]).is_empty());

            let bad = Command::new(mnemonic, 0)
                .with_primary(Parameter::Number(1))
                .with_secondary(Parameter::Acc);
            let errors = validate(all_links(), &[bad]);
            assert_eq!(slots(&errors), vec![(0, INVALID_PARAMETER), (1, INVALID_PARAMETER)]);
        }
    }

    #[test]
    fn test_mov_missing_operands() {
        let errors = validate(all_links(), &[Command::new(Instruction::Mov, 0)]);
        assert_eq!(slots(&errors), vec![(0, INVALID_PARAMETER), (1, INVALID_PARAMETER)]);
    }

    #[test]
    fn test_mov_valid_forms() {
        assert!(check(all_links(), "MOV 1 ACC").is_empty());
        assert!(check(all_links(), "MOV ACC UP").is_empty());
        assert!(check(all_links(), "MOV LEFT RIGHT").is_empty());
        assert!(check(all_links(), "MOV UP NIL").is_empty());
    }

    #[test]
    fn test_mov_invalid_forms() {
        assert_eq!(slots(&check(all_links(), "MOV NIL ACC")), vec![(0, INVALID_PARAMETER)]);
        assert_eq!(slots(&check(all_links(), "MOV 1 2")), vec![(1, INVALID_PARAMETER)]);
        assert_eq!(slots(&check(all_links(), "MOV 1 FOO")), vec![(1, INVALID_PARAMETER)]);
    }

    #[test]
    fn test_mov_unlinked_directions() {
        let links: DirectionSet = [Direction::Up].into_iter().collect();
        assert!(check(links, "MOV UP ACC").is_empty());
        assert_eq!(slots(&check(links, "MOV DOWN ACC")), vec![(0, INVALID_DIRECTION)]);
        assert_eq!(slots(&check(links, "MOV 1 LEFT")), vec![(1, INVALID_DIRECTION)]);
        assert_eq!(
            slots(&check(DirectionSet::new(), "MOV UP DOWN")),
            vec![(0, INVALID_DIRECTION), (1, INVALID_DIRECTION)]
        );
    }

    #[test]
    fn test_math_operands() {
        assert!(check(all_links(), "ADD 1\nSUB ACC\nADD UP").is_empty());
        assert_eq!(slots(&check(all_links(), "ADD ADD")), vec![(0, INVALID_PARAMETER)]);
        assert_eq!(
            slots(&check(DirectionSet::new(), "ADD RIGHT")),
            vec![(0, INVALID_DIRECTION)]
        );
    }

    #[test]
    fn test_math_secondary_reported_first() {
        let bad = Command::new(Instruction::Add, 0)
            .with_primary(Parameter::Text("X".into()))
            .with_secondary(Parameter::Number(1));
        let errors = validate(all_links(), &[bad]);
        assert_eq!(slots(&errors), vec![(1, INVALID_PARAMETER), (0, INVALID_PARAMETER)]);
    }

    #[test]
    fn test_jump_to_existing_label() {
        for mnemonic in ["JMP", "JEZ", "JNZ", "JGZ", "JLZ"] {
            let source = format!("START:\n{} START", mnemonic);
            assert!(check(all_links(), &source).is_empty(), "{}", mnemonic);
        }
    }

    #[test]
    fn test_jump_to_missing_label() {
        assert_eq!(slots(&check(all_links(), "JMP NOWHERE")), vec![(0, INVALID_LABEL)]);
    }

    #[test]
    fn test_jump_parameter_kinds() {
        let bad = Command::new(Instruction::Jmp, 0).with_primary(Parameter::Number(2));
        assert_eq!(slots(&validate(all_links(), &[bad])), vec![(0, INVALID_PARAMETER)]);

        let bad = Command::new(Instruction::Jez, 0)
            .with_primary(Parameter::Text("A".into()))
            .with_secondary(Parameter::Acc);
        let lbl = Command::new(Instruction::Lbl, 1).with_primary(Parameter::Label("A".into()));
        assert_eq!(slots(&validate(all_links(), &[bad, lbl])), vec![(1, INVALID_PARAMETER)]);
    }

    #[test]
    fn test_jro_offsets() {
        assert!(check(all_links(), "ADD 1\nJRO -1").is_empty());
        assert!(check(all_links(), "JRO 0").is_empty());
        assert!(check(all_links(), "JRO ACC").is_empty());
        assert!(check(all_links(), "JRO UP").is_empty());
        assert_eq!(slots(&check(all_links(), "JRO -1")), vec![(0, INVALID_PARAMETER)]);
        assert_eq!(slots(&check(all_links(), "JRO 2\nNOP")), vec![(0, INVALID_PARAMETER)]);
        assert_eq!(slots(&check(all_links(), "JRO FOO")), vec![(0, INVALID_PARAMETER)]);
    }

    #[test]
    fn test_duplicate_labels_are_symmetric() {
        let errors = check(all_links(), "A:\nNOP\nA:\nNOP");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.message == DUPLICATE_LABEL));
        // First LBL reports the second one and vice versa
        assert_eq!(errors[0].line, 2);
        assert_eq!(errors[1].line, 0);
    }

    #[test]
    fn test_errors_follow_command_order() {
        let mut commands = parse("NEG\nMOV 1 2\nJMP X").unwrap();
        commands[0].primary = Parameter::Number(1);
        let errors = validate(all_links(), &commands);
        let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![0, 1, 2]);
    }
}
