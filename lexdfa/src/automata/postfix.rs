//! Infix → postfix conversion (shunting-yard).
//!
//! Precedence is `Union(1) < Concat(2) < Star, Plus(3)`, all
//! left-associative. Parentheses are structural: `(` is a barrier on the
//! operator stack and neither parenthesis reaches the output.

use super::pattern::{Operator, Symbol};
use crate::error::{DfaError, Result};

/// Convert an infix symbol stream to postfix order.
///
/// # Errors
///
/// Returns [`DfaError::MalformedPattern`] for an unmatched `)` or an
/// unclosed `(`, positioned at the offending symbol.
pub fn to_postfix(symbols: &[Symbol]) -> Result<Vec<Symbol>> {
    let mut output: Vec<Symbol> = Vec::with_capacity(symbols.len());
    // Pending operators with the symbol index they came from.
    let mut stack: Vec<(Operator, usize)> = Vec::new();

    for (position, &symbol) in symbols.iter().enumerate() {
        match symbol {
            Symbol::Literal(_) => output.push(symbol),
            Symbol::Operator(Operator::LParen) => stack.push((Operator::LParen, position)),
            Symbol::Operator(Operator::RParen) => loop {
                match stack.pop() {
                    Some((Operator::LParen, _)) => break,
                    Some((op, _)) => output.push(Symbol::Operator(op)),
                    None => return Err(DfaError::malformed(position, "unmatched ')'")),
                }
            },
            Symbol::Operator(op) => {
                while let Some(&(top, _)) = stack.last() {
                    if top == Operator::LParen || top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(Symbol::Operator(top));
                    stack.pop();
                }
                stack.push((op, position));
            },
        }
    }

    while let Some((op, position)) = stack.pop() {
        if op == Operator::LParen {
            return Err(DfaError::malformed(position, "unclosed '('"));
        }
        output.push(Symbol::Operator(op));
    }

    Ok(output)
}
