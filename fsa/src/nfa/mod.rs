//! Nondeterministic finite automata: arena-indexed states, Thompson-style construction
//! from a [`RegexTree`], simulation, subset construction, and (via [`gtg`]) regex
//! synthesis.
//!
//! States live in a flat `Vec<NfaState>` owned by the [`Nfa`]; every reference between
//! states is a plain [`StateId`] index rather than a shared/cyclic pointer, so the whole
//! structure is trivially `Clone` and has no lifetime parameters.

pub mod eval;
pub mod gtg;

use crate::dfa::{Dfa, DfaState};
use crate::graph::{self, GraphError, GraphSymbol, TransitionGraph};
use crate::regex::RegexTree;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Index into an [`Nfa`]'s state arena. Not meaningful across different automata.
pub type StateId = usize;

/// A transition symbol: an ordinary character, or an epsilon (`λ`) move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Char(char),
    Epsilon,
}

#[derive(Debug, Clone, Default)]
pub struct NfaState {
    pub label: Rc<str>,
    pub(crate) outgoing: HashMap<Symbol, HashSet<StateId>>,
    pub(crate) incoming: HashMap<Symbol, HashSet<StateId>>,
}

impl NfaState {
    fn has_outgoing(&self) -> bool {
        self.outgoing.values().any(|set| !set.is_empty())
    }

    fn has_incoming(&self) -> bool {
        self.incoming.values().any(|set| !set.is_empty())
    }
}

/// A nondeterministic finite automaton over `char`, with optional epsilon moves.
#[derive(Debug, Clone)]
pub struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) initial: StateId,
    pub(crate) finals: HashSet<StateId>,
}

/// One subresult of the recursive NFA builder: an automaton fragment with a single
/// initial state and a nonempty set of final states, all owned by the enclosing `Nfa`.
struct Frag {
    initial: StateId,
    finals: HashSet<StateId>,
}

impl Nfa {
    /// Builds an `Nfa` from a pre-populated state arena, e.g. one lifted from a
    /// [`crate::dfa::Dfa`]. Callers must follow up with [`Self::rebuild_incoming`]
    /// unless `states` already carries a consistent reverse index.
    pub(crate) fn from_raw_parts(states: Vec<NfaState>, initial: StateId, finals: HashSet<StateId>) -> Nfa {
        Nfa {
            states,
            initial,
            finals,
        }
    }

    /// Recomputes every state's `incoming` map from the `outgoing` maps, restoring the
    /// symmetric reverse-index invariant.
    pub(crate) fn rebuild_incoming(&mut self) {
        for state in &mut self.states {
            state.incoming.clear();
        }
        let edges: Vec<(StateId, Symbol, StateId)> = self
            .states
            .iter()
            .enumerate()
            .flat_map(|(u, state)| {
                state
                    .outgoing
                    .iter()
                    .flat_map(move |(&sym, targets)| targets.iter().map(move |&v| (u, sym, v)))
            })
            .collect();
        for (u, sym, v) in edges {
            self.states[v].incoming.entry(sym).or_default().insert(u);
        }
    }

    pub fn initial_state(&self) -> StateId {
        self.initial
    }

    pub fn final_states(&self) -> &HashSet<StateId> {
        &self.finals
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn label(&self, state: StateId) -> &str {
        &self.states[state].label
    }

    /// Multi-path simulation: accepts iff some epsilon-closed path consumes all
    /// of `input` and lands on a final state.
    pub fn accepts(&self, input: &str) -> bool {
        eval::test(self, input)
    }

    /// Backtracking DFS simulation: accepts the same language as [`Self::accepts`],
    /// provided for pedagogical tracing via [`Self::accepts_with_trace`].
    pub fn accepts_backtrack(&self, input: &str) -> bool {
        eval::test_backtrack(self, input)
    }

    /// As [`Self::accepts_backtrack`], but writes a step-by-step trace to `sink`. The
    /// trace is a side effect only; it never influences the returned verdict.
    pub fn accepts_with_trace(&self, input: &str, sink: &mut dyn std::fmt::Write) -> bool {
        eval::test_backtrack_with_trace(self, input, sink)
    }

    /// The union of all non-epsilon transition symbols used anywhere in the automaton.
    pub fn alphabet(&self) -> Vec<char> {
        let mut set = HashSet::new();
        for state in &self.states {
            for sym in state.outgoing.keys() {
                if let Symbol::Char(c) = sym {
                    set.insert(*c);
                }
            }
        }
        let mut alphabet: Vec<char> = set.into_iter().collect();
        alphabet.sort_unstable();
        alphabet
    }

    /// States reachable from the initial state, in depth-first order (neighbours
    /// visited in a deterministic, symbol-then-target order so the traversal is
    /// reproducible).
    pub fn state_list(&self) -> Vec<StateId> {
        let mut visited = vec![false; self.states.len()];
        let mut order = Vec::new();
        let mut stack = vec![self.initial];
        visited[self.initial] = true;
        while let Some(state) = stack.pop() {
            order.push(state);
            let mut neighbours: Vec<(Symbol, StateId)> = self.states[state]
                .outgoing
                .iter()
                .flat_map(|(&sym, targets)| targets.iter().map(move |&t| (sym, t)))
                .collect();
            neighbours.sort_by(|a, b| symbol_order(a.0).cmp(&symbol_order(b.0)).then(a.1.cmp(&b.1)));
            for (_, target) in neighbours.into_iter().rev() {
                if !visited[target] {
                    visited[target] = true;
                    stack.push(target);
                }
            }
        }
        order
    }

    /// Assigns a unique numeric label to every state, reachable states first in DFS
    /// order, then any remaining unreachable states in arena order.
    pub fn label_states(&mut self) {
        let mut order = self.state_list();
        let reached: HashSet<StateId> = order.iter().copied().collect();
        order.extend((0..self.states.len()).filter(|i| !reached.contains(i)));
        for (label, &state) in order.iter().enumerate() {
            self.states[state].label = Rc::from(label.to_string());
        }
    }

    fn fresh_state(&mut self) -> StateId {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn add_edge(&mut self, from: StateId, sym: Symbol, to: StateId) {
        self.states[from].outgoing.entry(sym).or_default().insert(to);
        self.states[to].incoming.entry(sym).or_default().insert(from);
    }

    fn remove_edge(&mut self, from: StateId, sym: Symbol, to: StateId) {
        if let Some(set) = self.states[from].outgoing.get_mut(&sym) {
            set.remove(&to);
        }
        if let Some(set) = self.states[to].incoming.get_mut(&sym) {
            set.remove(&from);
        }
    }

    /// Transplants every edge touching `src` onto `dst` (including a self-loop, which
    /// becomes a self-loop on `dst`), then leaves `src` isolated. `src` is not removed
    /// from the arena; it becomes unreachable and is simply excluded from
    /// [`Self::state_list`] going forward.
    fn merge(&mut self, dst: StateId, src: StateId) {
        if dst == src {
            return;
        }
        let mut edges: Vec<(StateId, Symbol, StateId)> = Vec::new();
        for (&sym, targets) in &self.states[src].outgoing {
            for &to in targets {
                edges.push((src, sym, to));
            }
        }
        for (&sym, sources) in &self.states[src].incoming {
            for &from in sources {
                if from == src {
                    continue; // already captured as a self-loop above
                }
                edges.push((from, sym, src));
            }
        }
        for &(from, sym, to) in &edges {
            self.remove_edge(from, sym, to);
        }
        for (from, sym, to) in edges {
            let from = if from == src { dst } else { from };
            let to = if to == src { dst } else { to };
            self.add_edge(from, sym, to);
        }
    }

    /// Builds a fresh NFA from a regex tree via Thompson-style construction with the
    /// merge optimizations described in the crate's design notes.
    pub fn from_regex_tree(tree: &RegexTree) -> Nfa {
        let mut nfa = Nfa {
            states: Vec::new(),
            initial: 0,
            finals: HashSet::new(),
        };
        let frag = nfa.build(tree);
        nfa.initial = frag.initial;
        nfa.finals = frag.finals;
        nfa.label_states();
        nfa
    }

    fn build(&mut self, tree: &RegexTree) -> Frag {
        match tree {
            RegexTree::Character(c) => {
                let u = self.fresh_state();
                let v = self.fresh_state();
                self.add_edge(u, Symbol::Char(*c), v);
                Frag {
                    initial: u,
                    finals: HashSet::from([v]),
                }
            }
            RegexTree::Lambda => {
                let u = self.fresh_state();
                Frag {
                    initial: u,
                    finals: HashSet::from([u]),
                }
            }
            RegexTree::Null => {
                let u = self.fresh_state();
                Frag {
                    initial: u,
                    finals: HashSet::new(),
                }
            }
            RegexTree::Star(child) => self.build_star(child),
            RegexTree::Cat(left, right) => self.build_cat(left, right),
            RegexTree::Union(left, right) => self.build_union(left, right),
        }
    }

    fn build_star(&mut self, child: &RegexTree) -> Frag {
        let child = self.build(child);
        let initial = if self.states[child.initial].has_incoming() {
            let new_initial = self.fresh_state();
            self.add_edge(new_initial, Symbol::Epsilon, child.initial);
            new_initial
        } else {
            child.initial
        };
        for f in child.finals {
            if self.states[f].has_outgoing() {
                self.add_edge(f, Symbol::Epsilon, initial);
            } else {
                self.merge(initial, f);
            }
        }
        Frag {
            initial,
            finals: HashSet::from([initial]),
        }
    }

    fn build_cat(&mut self, left: &RegexTree, right: &RegexTree) -> Frag {
        let left = self.build(left);
        let right = self.build(right);

        let to_merge: Vec<StateId> = if left.finals.len() == 1 {
            let only = *left.finals.iter().next().unwrap();
            let forbidden =
                self.states[right.initial].has_incoming() && self.states[only].has_outgoing();
            if forbidden {
                vec![self.safe_final(only)]
            } else {
                vec![only]
            }
        } else {
            left.finals.iter().map(|&f| self.safe_final(f)).collect()
        };

        let combined_initial = if to_merge.contains(&left.initial) {
            right.initial
        } else {
            left.initial
        };
        for f in to_merge {
            self.merge(right.initial, f);
        }
        Frag {
            initial: combined_initial,
            finals: right.finals,
        }
    }

    /// Ensures `f` can be merged safely into the following fragment: if `f` already has
    /// outgoing transitions, inserts a fresh epsilon-successor to merge instead.
    fn safe_final(&mut self, f: StateId) -> StateId {
        if self.states[f].has_outgoing() {
            let fresh = self.fresh_state();
            self.add_edge(f, Symbol::Epsilon, fresh);
            fresh
        } else {
            f
        }
    }

    fn build_union(&mut self, left: &RegexTree, right: &RegexTree) -> Frag {
        let mut left = self.build(left);
        let mut right = self.build(right);

        left.initial = self.guard_initial(left.initial);
        right.initial = self.guard_initial(right.initial);

        let mut finals: HashSet<StateId> = left
            .finals
            .iter()
            .chain(right.finals.iter())
            .map(|&s| if s == right.initial { left.initial } else { s })
            .collect();

        self.merge(left.initial, right.initial);

        self.merge_final_states(left.initial, &mut finals);

        Frag {
            initial: left.initial,
            finals,
        }
    }

    /// If `state` has any incoming transition, introduces a fresh predecessor linked by
    /// epsilon so that merging `state` away cannot absorb a real incoming edge.
    fn guard_initial(&mut self, state: StateId) -> StateId {
        if self.states[state].has_incoming() {
            let fresh = self.fresh_state();
            self.add_edge(fresh, Symbol::Epsilon, state);
            fresh
        } else {
            state
        }
    }

    /// If two or more of `finals` are mergeable (not `initial`, no outgoing edges),
    /// merges all but one survivor together and updates `finals` in place.
    fn merge_final_states(&mut self, initial: StateId, finals: &mut HashSet<StateId>) {
        let mergeable: Vec<StateId> = finals
            .iter()
            .copied()
            .filter(|&f| f != initial && !self.states[f].has_outgoing())
            .collect();
        if mergeable.len() > 1 {
            let survivor = mergeable[0];
            for &other in &mergeable[1..] {
                self.merge(survivor, other);
                finals.remove(&other);
            }
        }
    }

    /// Converts this NFA into an equivalent DFA via subset construction: the
    /// initial DFA state is the epsilon-closure of the NFA's initial state, and the
    /// transition function is computed lazily over reachable subsets, so an NFA subset
    /// that maps to the empty set still yields a well-defined non-final sink state.
    pub fn to_dfa(&self) -> Dfa {
        let alphabet = self.alphabet();
        let mut complete: HashMap<Vec<StateId>, StateId> = HashMap::new();
        let mut subsets: Vec<HashSet<StateId>> = Vec::new();
        let mut pending: Vec<Vec<StateId>> = Vec::new();
        let mut transitions: Vec<Vec<StateId>> = Vec::new();

        let init_subset = eval::epsilon_closure_of(self, &HashSet::from([self.initial]));
        let init_key = freeze(&init_subset);
        complete.insert(init_key.clone(), 0);
        subsets.push(init_subset);
        pending.push(init_key);
        transitions.push(Vec::new());

        while let Some(key) = pending.pop() {
            let id = complete[&key];
            let subset = subsets[id].clone();
            let mut row = Vec::with_capacity(alphabet.len());
            for &c in &alphabet {
                let mut next = HashSet::new();
                for &s in &subset {
                    next.extend(eval::find_all_reachable(self, s, Symbol::Char(c)));
                }
                let next_key = freeze(&next);
                let next_id = if let Some(&existing) = complete.get(&next_key) {
                    existing
                } else {
                    let new_id = subsets.len();
                    complete.insert(next_key.clone(), new_id);
                    subsets.push(next);
                    pending.push(next_key);
                    transitions.push(Vec::new());
                    new_id
                };
                row.push(next_id);
            }
            transitions[id] = row;
        }

        let finals: HashSet<StateId> = (0..subsets.len())
            .filter(|&id| subsets[id].iter().any(|s| self.finals.contains(s)))
            .collect();
        let states = (0..subsets.len())
            .map(|id| DfaState {
                label: Rc::from(id.to_string()),
                transitions: transitions[id].clone(),
            })
            .collect();

        Dfa::from_parts(Rc::from(alphabet.into_boxed_slice()), states, 0, finals)
    }

    /// Builds a regex tree synthesizing this automaton's language via GTG
    /// state-elimination, already run through the simplifier.
    pub fn to_regex(&self) -> RegexTree {
        gtg::synthesize(self).simplify()
    }
}

fn symbol_order(sym: Symbol) -> (u8, u32) {
    match sym {
        Symbol::Epsilon => (0, 0),
        Symbol::Char(c) => (1, c as u32),
    }
}

fn freeze(set: &HashSet<StateId>) -> Vec<StateId> {
    let mut v: Vec<StateId> = set.iter().copied().collect();
    v.sort_unstable();
    v
}

impl TryFrom<TransitionGraph> for Nfa {
    type Error = GraphError;

    fn try_from(source: TransitionGraph) -> Result<Self, Self::Error> {
        let initial_idx = graph::validate_shape(&source)?;
        let index_of: HashMap<&str, StateId> = source
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.label.as_str(), i))
            .collect();

        let mut nfa = Nfa {
            states: source
                .states
                .iter()
                .map(|s| NfaState {
                    label: Rc::from(s.label.as_str()),
                    outgoing: HashMap::new(),
                    incoming: HashMap::new(),
                })
                .collect(),
            initial: initial_idx,
            finals: source
                .states
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_final)
                .map(|(i, _)| i)
                .collect(),
        };

        for (i, state) in source.states.iter().enumerate() {
            for (sym, dest) in &state.edges {
                let dest_idx = index_of[dest.as_str()];
                let sym = match sym {
                    GraphSymbol::Char(c) => Symbol::Char(*c),
                    GraphSymbol::Epsilon => Symbol::Epsilon,
                };
                nfa.add_edge(i, sym, dest_idx);
            }
        }
        Ok(nfa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn build(src: &str) -> Nfa {
        parser::regex(src).unwrap().to_nfa()
    }

    #[test]
    fn character_leaf_has_two_states() {
        let nfa = build("a");
        assert_eq!(nfa.state_count(), 2);
        assert!(eval::test(&nfa, "a"));
        assert!(!eval::test(&nfa, ""));
        assert!(!eval::test(&nfa, "aa"));
    }

    #[test]
    fn lambda_accepts_only_empty_string() {
        let nfa = build("^");
        assert!(eval::test(&nfa, ""));
        assert!(!eval::test(&nfa, "a"));
    }

    #[test]
    fn null_accepts_nothing() {
        let nfa = build("~");
        assert!(!eval::test(&nfa, ""));
        assert!(!eval::test(&nfa, "a"));
    }

    #[test]
    fn star_accepts_any_repetition() {
        let nfa = build("a*");
        for s in ["", "a", "aaaa"] {
            assert!(eval::test(&nfa, s), "expected {s:?} to be accepted");
        }
        for s in ["b", "ab"] {
            assert!(!eval::test(&nfa, s), "expected {s:?} to be rejected");
        }
    }

    #[test]
    fn scenario_union_star_concat() {
        let nfa = build("(a+b)*abb");
        for s in ["abb", "aabb", "babb", "ababb"] {
            assert!(eval::test(&nfa, s), "expected {s:?} to be accepted");
        }
        for s in ["ab", "a", ""] {
            assert!(!eval::test(&nfa, s), "expected {s:?} to be rejected");
        }
    }

    #[test]
    fn graph_invariant_holds_after_construction() {
        let nfa = build("((a*(b+((c*+d)e*)*))*fg)*");
        for (u, state) in nfa.states.iter().enumerate() {
            for (&sym, targets) in &state.outgoing {
                for &v in targets {
                    assert!(nfa.states[v].incoming.get(&sym).is_some_and(|s| s.contains(&u)));
                }
            }
            for (&sym, sources) in &state.incoming {
                for &v in sources {
                    assert!(nfa.states[v].outgoing.get(&sym).is_some_and(|s| s.contains(&u)));
                }
            }
        }
    }

    #[test]
    fn try_from_transition_graph_builds_expected_language() {
        use crate::graph::{GraphState, GraphSymbol};
        let g = TransitionGraph::new(vec![
            GraphState {
                label: "q0".into(),
                initial: true,
                is_final: false,
                edges: vec![
                    (GraphSymbol::Char('0'), "q0".into()),
                    (GraphSymbol::Char('1'), "q1".into()),
                ],
            },
            GraphState {
                label: "q1".into(),
                initial: false,
                is_final: false,
                edges: vec![(GraphSymbol::Char('1'), "q2".into())],
            },
            GraphState {
                label: "q2".into(),
                initial: false,
                is_final: true,
                edges: vec![
                    (GraphSymbol::Char('0'), "q2".into()),
                    (GraphSymbol::Char('1'), "q2".into()),
                ],
            },
        ]);
        let nfa: Nfa = g.try_into().unwrap();
        assert!(eval::test(&nfa, "11"));
        assert!(eval::test(&nfa, "0110"));
        assert!(!eval::test(&nfa, "0"));
        assert!(!eval::test(&nfa, "1"));
        assert!(!eval::test(&nfa, "10"));
    }
}
