//! Pattern tokenizer: flat pattern string → symbol stream.
//!
//! Classifies every position of a resolved pattern as an operator or a
//! literal, decodes escapes, and materializes implicit concatenation as an
//! explicit [`Operator::Concat`] so later stages never have to infer it.
//!
//! ## Syntax
//!
//! | Input | Meaning |
//! |-------|---------|
//! | <code>&#124;</code> | union |
//! | `.` | explicit concatenation (usually implicit) |
//! | `*` `+` | Kleene star / plus |
//! | `(` `)` | grouping |
//! | `\n` `\t` `\r` | control characters |
//! | `\+` `\*` <code>\\&#124;</code> `\(` `\)` `\.` `\\` | escaped metacharacters |
//! | `\0` | epsilon, the empty string |
//! | whitespace | ignored |
//!
//! Any other backslash sequence keeps the backslash as a literal and
//! processes the following character normally.

use std::collections::BTreeSet;
use std::fmt;

use super::{postfix, Label};
use crate::error::{DfaError, Result};

/// Pattern operators. Parentheses only exist before postfix conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Union,
    Concat,
    Star,
    Plus,
    LParen,
    RParen,
}

impl Operator {
    /// Binding strength used by the postfix converter; parentheses have none.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Union => 1,
            Operator::Concat => 2,
            Operator::Star | Operator::Plus => 3,
            Operator::LParen | Operator::RParen => 0,
        }
    }

    fn as_char(self) -> char {
        match self {
            Operator::Union => '|',
            Operator::Concat => '.',
            Operator::Star => '*',
            Operator::Plus => '+',
            Operator::LParen => '(',
            Operator::RParen => ')',
        }
    }
}

/// One token of a parsed pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Operator(Operator),
    Literal(Label),
}

impl Symbol {
    /// Symbols after which a following atom is concatenated implicitly.
    fn is_closable(self) -> bool {
        matches!(
            self,
            Symbol::Literal(_)
                | Symbol::Operator(Operator::RParen)
                | Symbol::Operator(Operator::Star)
                | Symbol::Operator(Operator::Plus)
        )
    }

    /// Symbols that start a new atom.
    fn is_opening(self) -> bool {
        matches!(self, Symbol::Literal(_) | Symbol::Operator(Operator::LParen))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Operator(op) => write!(f, "{}", op.as_char()),
            Symbol::Literal(Label::Epsilon) => f.write_str("ε"),
            Symbol::Literal(Label::Char(c)) => match c {
                '\n' => f.write_str("\\n"),
                '\t' => f.write_str("\\t"),
                '\r' => f.write_str("\\r"),
                '+' | '*' | '|' | '(' | ')' | '.' | '\\' => write!(f, "\\{}", c),
                _ => write!(f, "{}", c),
            },
        }
    }
}

/// A tokenized pattern with implicit concatenation made explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    symbols: Vec<Symbol>,
}

impl Pattern {
    /// Tokenize a flat pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`DfaError::EmptyPattern`] when the source contains nothing
    /// but whitespace. Structural problems (unbalanced parentheses, dangling
    /// operators) are reported later by [`Pattern::to_postfix`] and NFA
    /// construction.
    pub fn parse(source: &str) -> Result<Self> {
        let symbols = tokenize(source);
        if symbols.is_empty() {
            return Err(DfaError::EmptyPattern);
        }
        Ok(Pattern { symbols })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Concrete characters appearing as literals.
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.symbols
            .iter()
            .filter_map(|s| match s {
                Symbol::Literal(Label::Char(c)) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Convert to postfix order (see [`postfix::to_postfix`]).
    pub fn to_postfix(&self) -> Result<Vec<Symbol>> {
        postfix::to_postfix(&self.symbols)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

/// Decode one position of the pattern. Returns the symbol and how many
/// characters it consumed.
fn classify(c: char, next: Option<char>) -> (Symbol, usize) {
    if c == '\\' {
        let escaped = match next {
            Some('n') => Some(Label::Char('\n')),
            Some('t') => Some(Label::Char('\t')),
            Some('r') => Some(Label::Char('\r')),
            Some('0') => Some(Label::Epsilon),
            Some(e @ ('+' | '*' | '|' | '(' | ')' | '.' | '\\')) => Some(Label::Char(e)),
            _ => None,
        };
        return match escaped {
            Some(label) => (Symbol::Literal(label), 2),
            None => (Symbol::Literal(Label::Char('\\')), 1),
        };
    }

    let symbol = match c {
        '|' => Symbol::Operator(Operator::Union),
        '.' => Symbol::Operator(Operator::Concat),
        '*' => Symbol::Operator(Operator::Star),
        '+' => Symbol::Operator(Operator::Plus),
        '(' => Symbol::Operator(Operator::LParen),
        ')' => Symbol::Operator(Operator::RParen),
        _ => Symbol::Literal(Label::Char(c)),
    };
    (symbol, 1)
}

/// Scan the pattern left to right, inserting `Concat` between a closable
/// symbol and an opening one.
fn tokenize(source: &str) -> Vec<Symbol> {
    let chars: Vec<char> = source.chars().collect();
    let mut symbols: Vec<Symbol> = Vec::with_capacity(chars.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let (symbol, consumed) = classify(c, chars.get(i + 1).copied());
        i += consumed;

        if let Some(&prev) = symbols.last() {
            if prev.is_closable() && symbol.is_opening() {
                symbols.push(Symbol::Operator(Operator::Concat));
            }
        }
        symbols.push(symbol);
    }

    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> Symbol {
        Symbol::Literal(Label::Char(c))
    }

    const CONCAT: Symbol = Symbol::Operator(Operator::Concat);

    #[test]
    fn test_implicit_concat_between_literals() {
        let pattern = Pattern::parse("ab").unwrap();
        assert_eq!(pattern.symbols(), &[lit('a'), CONCAT, lit('b')]);
    }

    #[test]
    fn test_implicit_concat_around_groups_and_closures() {
        let pattern = Pattern::parse("a(b|c)*d+(e)").unwrap();
        assert_eq!(pattern.to_string(), "a.(b|c)*.d+.(e)");
    }

    #[test]
    fn test_no_concat_before_operators() {
        let pattern = Pattern::parse("a|b*").unwrap();
        assert_eq!(pattern.to_string(), "a|b*");
    }

    #[test]
    fn test_explicit_concat_is_not_doubled() {
        let pattern = Pattern::parse("a.b").unwrap();
        assert_eq!(pattern.symbols(), &[lit('a'), CONCAT, lit('b')]);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let pattern = Pattern::parse(" a |\tb \n").unwrap();
        assert_eq!(pattern.to_string(), "a|b");
    }

    #[test]
    fn test_escapes_yield_literals() {
        let pattern = Pattern::parse(r"\+\*\|\(\)\.\\").unwrap();
        let literals: Vec<Symbol> = pattern
            .symbols()
            .iter()
            .copied()
            .filter(|s| *s != CONCAT)
            .collect();
        assert_eq!(
            literals,
            vec![lit('+'), lit('*'), lit('|'), lit('('), lit(')'), lit('.'), lit('\\')]
        );
    }

    #[test]
    fn test_control_escapes() {
        let pattern = Pattern::parse(r"\n\t\r").unwrap();
        assert_eq!(pattern.symbols(), &[lit('\n'), CONCAT, lit('\t'), CONCAT, lit('\r')]);
    }

    #[test]
    fn test_epsilon_escape_is_distinct_from_zero() {
        let pattern = Pattern::parse(r"\0|0").unwrap();
        assert_eq!(
            pattern.symbols(),
            &[Symbol::Literal(Label::Epsilon), Symbol::Operator(Operator::Union), lit('0')]
        );
        assert_eq!(pattern.alphabet().into_iter().collect::<Vec<_>>(), vec!['0']);
    }

    #[test]
    fn test_unknown_escape_keeps_backslash() {
        // `\q` is the backslash literal followed by a separate `q` literal.
        let pattern = Pattern::parse(r"\q").unwrap();
        assert_eq!(pattern.symbols(), &[lit('\\'), CONCAT, lit('q')]);

        let trailing = Pattern::parse(r"a\").unwrap();
        assert_eq!(trailing.symbols(), &[lit('a'), CONCAT, lit('\\')]);
    }

    #[test]
    fn test_display_escapes_metacharacters() {
        let pattern = Pattern::parse(r"\+a\0").unwrap();
        assert_eq!(pattern.to_string(), r"\+.a.ε");
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(Pattern::parse(""), Err(DfaError::EmptyPattern)));
        assert!(matches!(Pattern::parse("  \n\t "), Err(DfaError::EmptyPattern)));
    }
}
