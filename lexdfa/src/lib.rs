//! # lexdfa: regular grammars to minimal DFAs
//!
//! Compiles a small named-definition regular grammar into a minimal
//! deterministic automaton and matches strings against it, either as a
//! whole or by maximal munch.
//!
//! ```text
//!  name -> body lines
//!        │
//!        ▼
//!  ┌───────────────┐    ┌──────────────────────────────────────────┐
//!  │    grammar     │───▶│              automata                    │
//!  │ (resolve refs) │    │  Pattern → Postfix → NFA → DFA → Minimize │
//!  └───────────────┘    └──────────────────────────────────────────┘
//!                                        │
//!                                        ▼
//!                     all_match / longest_match, export / import
//! ```
//!
//! ```
//! use lexdfa::compile_grammar;
//!
//! let dfa = compile_grammar("num -> digit+\ndigit -> 0|1|2").unwrap();
//! assert!(dfa.all_match("120", 0));
//! assert_eq!(dfa.longest_match("12a", 0), 2);
//! ```
//!
//! A finished [`Dfa`] is immutable plain data and can be shared across
//! threads.

pub mod automata;
pub mod error;
pub mod grammar;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use automata::persist::DfaTable;
pub use automata::Dfa;
pub use error::{DfaError, Result};
pub use grammar::{Definition, Grammar};
pub use pipeline::{compile_grammar, compile_grammar_with, compile_pattern, compile_pattern_with, CompileConfig};
