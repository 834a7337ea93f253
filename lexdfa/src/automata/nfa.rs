//! Thompson NFA construction from a postfix symbol stream.
//!
//! The postfix stream is evaluated on an explicit stack of fragments. Each
//! combinator consumes its operand fragments by value and returns a new
//! fragment in the same arena:
//!
//! ```text
//!   literal c      s --c--> f
//!   union A|B      s --ε--> A.s, B.s      A.f, B.f --ε--> f
//!   concat A.B     A.f --ε--> B.s
//!   star A*        s --ε--> A.s, f        A.f --ε--> A.s, f
//!   plus A+        A . (clone of A)*
//! ```
//!
//! Only plus needs a structural copy, because the same sub-automaton is
//! traversed twice.

use std::collections::HashMap;

use super::pattern::{Operator, Symbol};
use super::{Label, Nfa, NfaFragment, NfaState, StateId};
use crate::error::{DfaError, Result};

/// Build an NFA from a postfix symbol stream.
///
/// The resulting NFA has exactly one final state (`nfa.accept`).
///
/// # Errors
///
/// Returns [`DfaError::MalformedPattern`] if an operator finds too few
/// operands on the stack, if the stream is empty, if parentheses are
/// present (postfix streams never contain them), or if more than one
/// fragment is left over at the end.
pub fn build_nfa(postfix: &[Symbol]) -> Result<Nfa> {
    let mut nfa = Nfa::new();
    let mut stack: Vec<NfaFragment> = Vec::with_capacity(postfix.len());

    for (position, &symbol) in postfix.iter().enumerate() {
        let frag = match symbol {
            Symbol::Literal(label) => build_literal(&mut nfa, label),
            Symbol::Operator(Operator::Union) => {
                let (a, b) = pop_pair(&mut stack, position, "union")?;
                build_union(&mut nfa, a, b)
            },
            Symbol::Operator(Operator::Concat) => {
                let (a, b) = pop_pair(&mut stack, position, "concatenation")?;
                build_concat(&mut nfa, a, b)
            },
            Symbol::Operator(Operator::Star) => {
                let a = pop_one(&mut stack, position, "'*'")?;
                build_star(&mut nfa, a)
            },
            Symbol::Operator(Operator::Plus) => {
                let a = pop_one(&mut stack, position, "'+'")?;
                build_plus(&mut nfa, a)
            },
            Symbol::Operator(Operator::LParen | Operator::RParen) => {
                return Err(DfaError::malformed(position, "parenthesis in postfix stream"));
            },
        };
        stack.push(frag);
    }

    let frag = match (stack.pop(), stack.is_empty()) {
        (Some(frag), true) => frag,
        (None, _) => return Err(DfaError::malformed(0, "nothing to build")),
        (Some(_), false) => {
            return Err(DfaError::malformed(
                postfix.len(),
                format!("{} operands left without an operator", stack.len() + 1),
            ));
        },
    };

    nfa.start = frag.start;
    nfa.accept = frag.accept;
    Ok(nfa)
}

fn pop_one(stack: &mut Vec<NfaFragment>, position: usize, what: &str) -> Result<NfaFragment> {
    stack
        .pop()
        .ok_or_else(|| DfaError::malformed(position, format!("{} has no operand", what)))
}

fn pop_pair(
    stack: &mut Vec<NfaFragment>,
    position: usize,
    what: &str,
) -> Result<(NfaFragment, NfaFragment)> {
    match (stack.pop(), stack.pop()) {
        (Some(b), Some(a)) => Ok((a, b)),
        _ => Err(DfaError::malformed(position, format!("{} needs two operands", what))),
    }
}

/// `start --label--> accept`. An epsilon label yields a fragment accepting
/// only the empty string.
pub fn build_literal(nfa: &mut Nfa, label: Label) -> NfaFragment {
    let start = nfa.add_state(NfaState::new());
    let accept = nfa.add_state(NfaState::accepting());
    nfa.add_transition(start, accept, label);
    NfaFragment { start, accept }
}

/// Alternation of two fragments through a fresh start/final pair.
pub fn build_union(nfa: &mut Nfa, a: NfaFragment, b: NfaFragment) -> NfaFragment {
    let start = nfa.add_state(NfaState::new());
    let accept = nfa.add_state(NfaState::accepting());
    nfa.add_epsilon(start, a.start);
    nfa.add_epsilon(start, b.start);
    demote(nfa, a.accept);
    demote(nfa, b.accept);
    nfa.add_epsilon(a.accept, accept);
    nfa.add_epsilon(b.accept, accept);
    NfaFragment { start, accept }
}

/// Sequence: `a` then `b`.
pub fn build_concat(nfa: &mut Nfa, a: NfaFragment, b: NfaFragment) -> NfaFragment {
    demote(nfa, a.accept);
    nfa.add_epsilon(a.accept, b.start);
    NfaFragment { start: a.start, accept: b.accept }
}

/// Zero or more repetitions of `a`.
pub fn build_star(nfa: &mut Nfa, a: NfaFragment) -> NfaFragment {
    let start = nfa.add_state(NfaState::new());
    let accept = nfa.add_state(NfaState::accepting());
    nfa.add_epsilon(start, a.start);
    nfa.add_epsilon(start, accept);
    demote(nfa, a.accept);
    nfa.add_epsilon(a.accept, a.start);
    nfa.add_epsilon(a.accept, accept);
    NfaFragment { start, accept }
}

/// One or more repetitions of `a`: one mandatory pass through `a`, then a
/// starred structural copy.
pub fn build_plus(nfa: &mut Nfa, a: NfaFragment) -> NfaFragment {
    let copy = clone_fragment(nfa, a);
    let repeat = build_star(nfa, copy);
    build_concat(nfa, a, repeat)
}

fn demote(nfa: &mut Nfa, state: StateId) {
    nfa.states[state as usize].is_final = false;
}

/// Clone a fragment by allocating fresh states for everything reachable
/// from `frag.start` and remapping every internal edge.
///
/// A finished fragment is closed: its final state has no outgoing edges
/// yet, so the reachable set is exactly the fragment.
pub fn clone_fragment(nfa: &mut Nfa, frag: NfaFragment) -> NfaFragment {
    let mut visited: Vec<StateId> = Vec::new();
    let mut queue: Vec<StateId> = vec![frag.start];
    let mut mapping: HashMap<StateId, StateId> = HashMap::new();

    while let Some(state) = queue.pop() {
        if mapping.contains_key(&state) {
            continue;
        }
        let is_final = nfa.states[state as usize].is_final;
        let copy = nfa.add_state(NfaState { transitions: Vec::new(), is_final });
        mapping.insert(state, copy);
        visited.push(state);
        for &(_, target) in &nfa.states[state as usize].transitions {
            if !mapping.contains_key(&target) {
                queue.push(target);
            }
        }
    }

    for &old_id in &visited {
        let new_id = mapping[&old_id];
        let transitions: Vec<(Label, StateId)> = nfa.states[old_id as usize]
            .transitions
            .iter()
            .map(|&(label, target)| (label, mapping[&target]))
            .collect();
        nfa.states[new_id as usize].transitions = transitions;
    }

    NfaFragment {
        start: mapping[&frag.start],
        accept: mapping[&frag.accept],
    }
}

/// Every state reachable from `states` through zero or more `\0` edges, as a
/// sorted set without repeats. Subset construction keys DFA states by it, so
/// inputs that differ only in order or duplicates close to the same key.
pub fn epsilon_closure(nfa: &Nfa, states: &[StateId]) -> Vec<StateId> {
    let mut member = vec![false; nfa.states.len()];
    let mut closure: Vec<StateId> = Vec::with_capacity(states.len());
    for &s in states {
        if !std::mem::replace(&mut member[s as usize], true) {
            closure.push(s);
        }
    }

    // `closure` is also the worklist: entries before `next` are expanded.
    let mut next = 0;
    while let Some(&state) = closure.get(next) {
        next += 1;
        let targets = nfa.states[state as usize]
            .transitions
            .iter()
            .filter(|(label, _)| label.is_epsilon())
            .map(|&(_, target)| target);
        for target in targets {
            if !std::mem::replace(&mut member[target as usize], true) {
                closure.push(target);
            }
        }
    }

    closure.sort_unstable();
    closure
}

/// States reachable from `states` through a single `c`-labeled edge.
/// No epsilon expansion is performed.
pub fn move_set(nfa: &Nfa, states: &[StateId], c: char) -> Vec<StateId> {
    let mut targets: Vec<StateId> = states
        .iter()
        .flat_map(|&s| nfa.states[s as usize].transitions.iter())
        .filter(|(label, _)| *label == Label::Char(c))
        .map(|&(_, target)| target)
        .collect();
    targets.sort_unstable();
    targets.dedup();
    targets
}
