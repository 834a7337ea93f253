//! End-to-end compilation.
//!
//! ```text
//! grammar text ──→ [Resolve] ──→ flat pattern ──→ [Tokenize] ──→ symbols
//!   ──→ [Postfix] ──→ [Thompson] ──→ NFA ──→ [Subset] ──→ DFA ──→ [Minimize] ──→ DFA
//! ```
//!
//! Every stage either succeeds or aborts the whole compilation with a
//! [`DfaError`](crate::error::DfaError).

use log::debug;

use crate::automata::minimize::minimize_dfa;
use crate::automata::nfa::build_nfa;
use crate::automata::pattern::Pattern;
use crate::automata::subset::subset_construction;
use crate::automata::Dfa;
use crate::error::Result;
use crate::grammar::Grammar;

// ══════════════════════════════════════════════════════════════════════════════
// Configuration
// ══════════════════════════════════════════════════════════════════════════════

/// Knobs for the compile pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    /// Abort determinization once the DFA would need more states than this.
    pub state_limit: Option<usize>,
    /// Run minimization after determinization. Import always minimizes.
    pub minimize: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig { state_limit: None, minimize: true }
    }
}

impl CompileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = Some(limit);
        self
    }

    pub fn with_minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════════════════════

/// Compile a multi-line `name -> body` grammar into a minimal DFA for its
/// start symbol.
pub fn compile_grammar(text: &str) -> Result<Dfa> {
    compile_grammar_with(text, &CompileConfig::default())
}

pub fn compile_grammar_with(text: &str, config: &CompileConfig) -> Result<Dfa> {
    let grammar = Grammar::parse(text)?;
    debug!(
        "grammar: {} definitions, start symbol {:?}",
        grammar.definitions().len(),
        grammar.start_symbol()
    );
    let pattern = grammar.resolve()?;
    compile_pattern_with(&pattern, config)
}

/// Compile a single flat pattern (no named references) into a minimal DFA.
pub fn compile_pattern(source: &str) -> Result<Dfa> {
    compile_pattern_with(source, &CompileConfig::default())
}

pub fn compile_pattern_with(source: &str, config: &CompileConfig) -> Result<Dfa> {
    let pattern = Pattern::parse(source)?;
    let postfix = pattern.to_postfix()?;
    debug!("pattern: {} symbols, {} in postfix", pattern.symbols().len(), postfix.len());

    let nfa = build_nfa(&postfix)?;
    debug!("thompson: {} NFA states", nfa.states.len());

    let dfa = subset_construction(&nfa, config.state_limit)?;
    if !config.minimize {
        return Ok(dfa);
    }
    Ok(minimize_dfa(&dfa))
}
