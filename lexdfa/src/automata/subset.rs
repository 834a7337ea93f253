//! Subset construction: NFA → DFA conversion.
//!
//! 1. The epsilon-closure of the NFA start state is DFA state 0.
//! 2. For each unprocessed DFA state and each alphabet character (in sorted
//!    order), `closure(move(set, c))` is looked up or allocated.
//! 3. A DFA state is final iff any member NFA state is final.
//!
//! Empty target sets are never materialized; they are the implicit dead
//! state. Epsilon transitions disappear in the process.

use std::collections::{HashMap, VecDeque};

use log::{debug, trace};

use super::nfa::{epsilon_closure, move_set};
use super::{Dfa, DfaState, Nfa, StateId};
use crate::error::{DfaError, Result};

/// Convert an NFA to a DFA.
///
/// Sets are processed first-in first-out, so state ids follow discovery
/// order and two runs over the same NFA produce identical automata.
///
/// # Errors
///
/// Returns [`DfaError::StateLimitExceeded`] when `state_limit` is set and
/// the DFA would need more states than that.
pub fn subset_construction(nfa: &Nfa, state_limit: Option<usize>) -> Result<Dfa> {
    let alphabet: Vec<char> = nfa.alphabet().into_iter().collect();

    // Map from sorted set of NFA states → DFA state ID
    let mut state_map: HashMap<Vec<StateId>, StateId> = HashMap::new();
    let mut states: Vec<DfaState> = Vec::new();
    let mut worklist: VecDeque<Vec<StateId>> = VecDeque::new();

    let start_set = epsilon_closure(nfa, &[nfa.start]);
    states.push(DfaState {
        transitions: Default::default(),
        is_final: any_final(nfa, &start_set),
    });
    state_map.insert(start_set.clone(), 0);
    worklist.push_back(start_set);

    while let Some(current_set) = worklist.pop_front() {
        let current = state_map[&current_set];
        trace!("processing DFA state {} = {:?}", current, current_set);

        for &c in &alphabet {
            let moved = move_set(nfa, &current_set, c);
            if moved.is_empty() {
                continue;
            }
            let target_set = epsilon_closure(nfa, &moved);

            let target = match state_map.get(&target_set) {
                Some(&existing) => existing,
                None => {
                    if let Some(limit) = state_limit {
                        if states.len() >= limit {
                            return Err(DfaError::StateLimitExceeded { limit });
                        }
                    }
                    let id = states.len() as StateId;
                    states.push(DfaState {
                        transitions: Default::default(),
                        is_final: any_final(nfa, &target_set),
                    });
                    state_map.insert(target_set.clone(), id);
                    worklist.push_back(target_set);
                    id
                },
            };

            states[current as usize].transitions.insert(c, target);
        }
    }

    debug!(
        "subset construction: {} NFA states -> {} DFA states over {} symbols",
        nfa.states.len(),
        states.len(),
        alphabet.len()
    );

    Ok(Dfa::from_states(states, 0))
}

fn any_final(nfa: &Nfa, states: &[StateId]) -> bool {
    states.iter().any(|&s| nfa.states[s as usize].is_final)
}
