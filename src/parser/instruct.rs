//! Symbol list to command list.
//!
//! The parser is deliberately naive: it trusts the mnemonic to say how many
//! operands follow and converts whatever symbols are there. `MOV MOV MOV`
//! becomes one MOV with two text operands. Catching that is the validator's
//! job. The one thing it refuses is running off the end of the input.

use super::lexer::{Symbol, Token};
use super::ParseError;
use crate::emu::instruction::{Command, Direction, Instruction, Parameter, ACC};

/// Convert a symbol into a typed operand.
///
/// Purely syntactic, in priority order: `ACC`, integer, direction name,
/// then by token kind (label, text, anything else is empty).
pub fn convert(token: Token, literal: &str) -> Parameter {
    if literal == ACC {
        return Parameter::Acc;
    }

    if let Ok(number) = literal.parse::<i32>() {
        return Parameter::Number(number);
    }

    if let Ok(direction) = literal.parse::<Direction>() {
        return Parameter::Direction(direction);
    }

    match token {
        Token::Label => Parameter::Label(literal.to_string()),
        Token::Text => Parameter::Text(literal.to_string()),
        _ => Parameter::Empty,
    }
}

/// Build the commands for a lexed program.
///
/// Line counting: every instruction and every comment advances the line.
/// A label advances it only when it sits alone on its line.
pub fn instruct(symbols: &[Symbol]) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    let mut line = 0;
    let mut i = 0;

    while i < symbols.len() {
        let symbol = &symbols[i];

        match symbol.token {
            Token::Label => {
                commands.push(
                    Command::new(Instruction::Lbl, line)
                        .with_primary(Parameter::Label(symbol.value.clone())),
                );
                i += 1;
                if symbols.get(i).is_some_and(|next| next.token == Token::Newline) {
                    line += 1;
                }
            }
            Token::Comment => {
                line += 1;
                i += 1;
            }
            Token::Text => {
                let instruction = match symbol.value.parse::<Instruction>() {
                    Ok(Instruction::Lbl) | Err(_) => {
                        i += 1;
                        continue;
                    }
                    Ok(instruction) => instruction,
                };

                let count = instruction.operand_count();
                let operands = symbols.get(i + 1..i + 1 + count).ok_or_else(|| {
                    ParseError::MissingOperand {
                        instruction,
                        line,
                        expected: count,
                        found: symbols.len() - i - 1,
                    }
                })?;

                commands.push(build(instruction, line, operands));
                line += 1;
                i += 1 + count;
            }
            _ => i += 1,
        }
    }

    Ok(commands)
}

/// Lex and parse in one go.
pub fn parse(source: &str) -> Result<Vec<Command>, ParseError> {
    instruct(&super::lexer::lex(source))
}

fn build(instruction: Instruction, line: usize, operands: &[Symbol]) -> Command {
    let command = Command::new(instruction, line);

    // Jump targets are taken verbatim so a label named like a register or
    // a direction still resolves.
    if instruction.is_label_jump() {
        return match operands.first() {
            Some(target) => command.with_primary(Parameter::Text(target.value.clone())),
            None => command,
        };
    }

    let mut params = operands.iter().map(|s| convert(s.token, &s.value));
    let primary = params.next().unwrap_or_default();
    let secondary = params.next().unwrap_or_default();

    command.with_primary(primary).with_secondary(secondary)
}
