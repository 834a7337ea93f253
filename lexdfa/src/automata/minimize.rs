//! Table-filling DFA minimization.
//!
//! 1. States unreachable from the start are pruned.
//! 2. A pair of states starts out distinguished iff their finality differs.
//!    The table is refined to a fixed point: a pair becomes distinguished if
//!    on some character exactly one of them has a transition, or both move
//!    to an already distinguished pair.
//! 3. Pairs still undistinguished are merged with a union-find; each class
//!    becomes one state.
//! 4. States are renumbered breadth-first from the start (start = 0), so the
//!    result is canonical and minimizing twice changes nothing.
//!
//! **Complexity:** O(n² × k) per refinement round on n states and k alphabet
//! symbols. Grammars of the size this crate targets stay in the low hundreds
//! of states.

use std::collections::{BTreeMap, VecDeque};

use log::debug;

use super::{Dfa, DfaState, StateId};

/// Minimize a DFA. The result accepts exactly the same language.
pub fn minimize_dfa(dfa: &Dfa) -> Dfa {
    let pruned = prune_unreachable(dfa);
    let n = pruned.state_count();
    if n <= 1 {
        return pruned;
    }

    let table = distinguishability_table(&pruned);

    let mut classes = DisjointSets::new(n);
    for i in 0..n {
        for j in 0..i {
            if !table.get(i, j) {
                classes.union_sets(i, j);
            }
        }
    }

    // Quotient automaton indexed by pruned id; only class roots are kept
    // reachable once transitions are rewritten to point at roots.
    let mut merged: Vec<DfaState> = vec![DfaState::default(); n];
    for (i, state) in pruned.states().iter().enumerate() {
        let root = classes.find_set(i);
        merged[root].is_final |= state.is_final;
        if root == i {
            merged[root].transitions = state
                .transitions
                .iter()
                .map(|(&c, &target)| (c, classes.find_set(target as usize) as StateId))
                .collect();
        }
    }
    let start = classes.find_set(pruned.start() as usize) as StateId;

    let minimized = renumber_breadth_first(&merged, start);
    debug!(
        "minimization: {} states -> {} reachable -> {} classes",
        dfa.state_count(),
        n,
        minimized.state_count()
    );
    minimized
}

/// Drop every state not reachable from the start. Surviving states are
/// renumbered in breadth-first order from the start.
pub fn prune_unreachable(dfa: &Dfa) -> Dfa {
    renumber_breadth_first(dfa.states(), dfa.start())
}

/// Copy the states reachable from `start`, assigning ids in breadth-first
/// discovery order. Transitions are visited in character order.
fn renumber_breadth_first(states: &[DfaState], start: StateId) -> Dfa {
    let mut new_id: Vec<Option<StateId>> = vec![None; states.len()];
    let mut order: Vec<StateId> = Vec::new();
    let mut queue: VecDeque<StateId> = VecDeque::new();

    new_id[start as usize] = Some(0);
    order.push(start);
    queue.push_back(start);

    while let Some(state) = queue.pop_front() {
        for &target in states[state as usize].transitions.values() {
            if new_id[target as usize].is_none() {
                new_id[target as usize] = Some(order.len() as StateId);
                order.push(target);
                queue.push_back(target);
            }
        }
    }

    let renumbered = order
        .iter()
        .map(|&old| {
            let state = &states[old as usize];
            let transitions: BTreeMap<char, StateId> = state
                .transitions
                .iter()
                .filter_map(|(&c, &target)| new_id[target as usize].map(|t| (c, t)))
                .collect();
            DfaState { transitions, is_final: state.is_final }
        })
        .collect();

    Dfa::from_states(renumbered, 0)
}

/// Lower-triangular matrix of "distinguished" flags.
struct PairTable {
    cells: Vec<bool>,
}

impl PairTable {
    fn new(n: usize) -> Self {
        PairTable { cells: vec![false; n * (n.saturating_sub(1)) / 2] }
    }

    fn index(i: usize, j: usize) -> usize {
        let (hi, lo) = if i > j { (i, j) } else { (j, i) };
        hi * (hi - 1) / 2 + lo
    }

    fn get(&self, i: usize, j: usize) -> bool {
        i != j && self.cells[Self::index(i, j)]
    }

    fn set(&mut self, i: usize, j: usize) {
        self.cells[Self::index(i, j)] = true;
    }
}

fn distinguishability_table(dfa: &Dfa) -> PairTable {
    let n = dfa.state_count();
    let states = dfa.states();
    let mut table = PairTable::new(n);

    for i in 0..n {
        for j in 0..i {
            if states[i].is_final != states[j].is_final {
                table.set(i, j);
            }
        }
    }

    let mut rounds = 0;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for i in 0..n {
            for j in 0..i {
                if table.get(i, j) {
                    continue;
                }
                let split = dfa.alphabet().iter().any(|&c| {
                    match (states[i].transitions.get(&c), states[j].transitions.get(&c)) {
                        (Some(&a), Some(&b)) => table.get(a as usize, b as usize),
                        (None, None) => false,
                        _ => true,
                    }
                });
                if split {
                    table.set(i, j);
                    changed = true;
                }
            }
        }
    }

    debug!("distinguishability table stable after {} rounds", rounds);
    table
}

/// Union-find over `0..n` with path compression and union by rank.
struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        DisjointSets { parent: (0..n).collect(), rank: vec![0; n] }
    }

    fn find_set(&mut self, x: usize) -> usize {
        let p = self.parent[x];
        if p != x {
            let root = self.find_set(p);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union_sets(&mut self, x: usize, y: usize) {
        let x = self.find_set(x);
        let y = self.find_set(y);
        if x == y {
            return;
        }
        match self.rank[x].cmp(&self.rank[y]) {
            std::cmp::Ordering::Less => self.parent[x] = y,
            std::cmp::Ordering::Greater => self.parent[y] = x,
            std::cmp::Ordering::Equal => {
                self.parent[y] = x;
                self.rank[x] += 1;
            },
        }
    }
}
