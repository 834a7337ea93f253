//! Automata infrastructure for pattern compilation.
//!
//! Provides the NFA/DFA arena types and the compilation stages:
//! `Pattern -> Postfix -> NFA -> DFA -> Minimize`, plus matching and
//! persistence over the finished DFA.
//!
//! Every automaton owns its states in a flat `Vec`; edges are `StateId`
//! indices into that arena. Cycles introduced by star and plus are just
//! back-edges between indices, so there is nothing to leak or dangle.

pub mod matcher;
pub mod minimize;
pub mod nfa;
pub mod pattern;
pub mod persist;
pub mod postfix;
pub mod subset;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifier for an automaton state (index into the owning arena).
pub type StateId = u32;

/// Transition label: a concrete character or the empty string.
///
/// `Epsilon` sorts before every character, which keeps transition lists and
/// alphabets in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// Consumes nothing (written `\0` in patterns).
    Epsilon,
    /// Consumes exactly this character.
    Char(char),
}

impl Label {
    /// The concrete character, or `None` for epsilon.
    pub fn as_char(self) -> Option<char> {
        match self {
            Label::Char(c) => Some(c),
            Label::Epsilon => None,
        }
    }

    pub fn is_epsilon(self) -> bool {
        matches!(self, Label::Epsilon)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Epsilon => f.write_str("ε"),
            Label::Char(c) => write!(f, "{}", c.escape_debug()),
        }
    }
}

/// NFA state: a multiset of labeled transitions plus a finality flag.
#[derive(Debug, Clone, Default)]
pub struct NfaState {
    /// Outgoing edges `(label, target)`. Several edges may share a label.
    pub transitions: Vec<(Label, StateId)>,
    pub is_final: bool,
}

impl NfaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepting() -> Self {
        NfaState { transitions: Vec::new(), is_final: true }
    }
}

/// A complete NFA: the state arena with one start and one final state.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: StateId,
    pub accept: StateId,
}

impl Nfa {
    /// Create an empty arena. `start`/`accept` are set once the final
    /// fragment is known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self, state: NfaState) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(state);
        id
    }

    /// Add an epsilon transition from `from` to `to`.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from as usize].transitions.push((Label::Epsilon, to));
    }

    /// Add a labeled transition from `from` to `to`.
    pub fn add_transition(&mut self, from: StateId, to: StateId, label: Label) {
        self.states[from as usize].transitions.push((label, to));
    }

    /// All concrete characters labeling any transition, in sorted order.
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.iter())
            .filter_map(|(label, _)| label.as_char())
            .collect()
    }
}

/// An NFA fragment (sub-automaton) with a designated start and final state.
/// Used during Thompson's construction to build up the NFA incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfaFragment {
    pub start: StateId,
    pub accept: StateId,
}

/// DFA state with at most one target per character.
///
/// A character with no entry leads to the implicit dead state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfaState {
    pub transitions: BTreeMap<char, StateId>,
    pub is_final: bool,
}

/// A deterministic automaton.
///
/// Built once (by subset construction, minimization, or import) and
/// immutable afterwards, so a finished `Dfa` can be shared freely between
/// threads for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<DfaState>,
    start: StateId,
    alphabet: BTreeSet<char>,
}

impl Dfa {
    /// Assemble a DFA from a finished state arena. The alphabet is derived
    /// from the transitions.
    pub(crate) fn from_states(states: Vec<DfaState>, start: StateId) -> Self {
        let alphabet = states
            .iter()
            .flat_map(|s| s.transitions.keys().copied())
            .collect();
        Dfa { states, start, alphabet }
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    /// Characters labeling at least one transition.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Whether `state` accepts.
    ///
    /// # Panics
    ///
    /// If `state` is not below [`Dfa::state_count`]. Ids returned by
    /// [`Dfa::start`] and [`Dfa::transition`] on the same DFA are always valid.
    pub fn is_final(&self, state: StateId) -> bool {
        self.states[state as usize].is_final
    }

    /// Transition lookup: `None` means the implicit dead state.
    ///
    /// # Panics
    ///
    /// If `state` is not below [`Dfa::state_count`], as for [`Dfa::is_final`].
    #[inline]
    pub fn transition(&self, state: StateId, c: char) -> Option<StateId> {
        self.states[state as usize].transitions.get(&c).copied()
    }
}
