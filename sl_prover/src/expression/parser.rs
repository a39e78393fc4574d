//! Shunting-yard parser for the surface syntax: lowercase variables `a`-`z`,
//! unary prefix `!`, binary `* | + = >`, and parens. Emits directly into the
//! flat `Expression` buffer rather than building an intermediate AST.

use super::{Expression, Op, Term};
use crate::error::{ProverError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpToken {
    Negation,
    Binary(Op),
    OpenParen,
}

impl OpToken {
    fn precedence(self) -> u8 {
        match self {
            OpToken::Negation => 5,
            OpToken::Binary(op) => op.precedence(),
            OpToken::OpenParen => 0,
        }
    }
}

pub fn parse(text: &str) -> Result<Expression> {
    let mut operands: Vec<Expression> = Vec::new();
    let mut operators: Vec<OpToken> = Vec::new();
    let mut expect_operand = true;

    for (pos, ch) in text.char_indices() {
        if ch.is_whitespace() {
            continue;
        }
        match ch {
            '(' => {
                operators.push(OpToken::OpenParen);
                expect_operand = true;
            }
            ')' => {
                loop {
                    match operators.last() {
                        Some(OpToken::OpenParen) => {
                            operators.pop();
                            break;
                        }
                        Some(_) => reduce(&mut operands, &mut operators, pos)?,
                        None => {
                            return Err(ProverError::Parse {
                                message: "unmatched closing parenthesis".to_string(),
                                position: pos,
                            })
                        }
                    }
                }
                expect_operand = false;
            }
            '!' => {
                operators.push(OpToken::Negation);
                expect_operand = true;
            }
            '*' | '|' | '+' | '=' | '>' => {
                if expect_operand {
                    return Err(ProverError::Parse {
                        message: format!("unexpected binary operator '{ch}'"),
                        position: pos,
                    });
                }
                let op = char_to_op(ch);
                while matches!(operators.last(), Some(top) if top.precedence() >= op.precedence())
                {
                    reduce(&mut operands, &mut operators, pos)?;
                }
                operators.push(OpToken::Binary(op));
                expect_operand = true;
            }
            'a'..='z' => {
                let id = ch as i32 - 'a' as i32 + 1;
                operands.push(Expression::from_term(Term::variable(id)));
                expect_operand = false;
            }
            other => {
                return Err(ProverError::Parse {
                    message: format!("unexpected character '{other}'"),
                    position: pos,
                })
            }
        }
    }

    while !operators.is_empty() {
        reduce(&mut operands, &mut operators, text.len())?;
    }

    match operands.len() {
        1 => Ok(operands.pop().expect("checked len == 1")),
        0 => Err(ProverError::Parse {
            message: "empty expression".to_string(),
            position: text.len(),
        }),
        _ => Err(ProverError::Parse {
            message: "too many operands for the given operators".to_string(),
            position: text.len(),
        }),
    }
}

fn char_to_op(ch: char) -> Op {
    match ch {
        '*' => Op::Conjunction,
        '|' => Op::Disjunction,
        '+' => Op::Xor,
        '=' => Op::Equivalent,
        '>' => Op::Implication,
        _ => unreachable!("char_to_op called with non-operator char"),
    }
}

fn reduce(operands: &mut Vec<Expression>, operators: &mut Vec<OpToken>, pos: usize) -> Result<()> {
    match operators.pop() {
        Some(OpToken::Negation) => {
            let mut operand = operands.pop().ok_or_else(|| ProverError::Parse {
                message: "negation with no operand".to_string(),
                position: pos,
            })?;
            operand.negate();
            operands.push(operand);
            Ok(())
        }
        Some(OpToken::Binary(op)) => {
            let rhs = operands.pop().ok_or_else(|| ProverError::Parse {
                message: "binary operator missing right operand".to_string(),
                position: pos,
            })?;
            let lhs = operands.pop().ok_or_else(|| ProverError::Parse {
                message: "binary operator missing left operand".to_string(),
                position: pos,
            })?;
            operands.push(Expression::construct(&lhs, op, &rhs));
            Ok(())
        }
        Some(OpToken::OpenParen) => Err(ProverError::Parse {
            message: "unmatched opening parenthesis".to_string(),
            position: pos,
        }),
        None => Err(ProverError::Parse {
            message: "unbalanced expression".to_string(),
            position: pos,
        }),
    }
}
