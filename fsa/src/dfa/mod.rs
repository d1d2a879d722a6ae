//! Deterministic finite automata: a totalized transition function over a fixed `char`
//! alphabet, simulation, and Moore-style partition-refinement minimization.
//!
//! A [`Dfa`] is built either from an [`crate::nfa::Nfa`] via subset construction
//! ([`crate::nfa::Nfa::to_dfa`]) or directly from a [`crate::graph::TransitionGraph`]
//! that satisfies the DFA predicate ([`crate::graph::TransitionGraph::is_dfa`]).

pub mod eval;

use crate::graph::{self, GraphError, GraphSymbol, TransitionGraph};
use crate::nfa::{Nfa, NfaState, StateId as NfaStateId, Symbol};
pub use eval::DfaEvaluator;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Index into a [`Dfa`]'s state arena. Not meaningful across different automata.
pub type StateId = usize;

/// A DFA state: its label and, for each symbol of the owning [`Dfa`]'s alphabet (in the
/// same order), the single state transitioned to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaState {
    pub label: Rc<str>,
    pub(crate) transitions: Vec<StateId>,
}

impl DfaState {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Transitions indexed in the same order as the owning [`Dfa`]'s alphabet.
    pub fn transitions(&self) -> &[StateId] {
        &self.transitions
    }
}

/// A deterministic finite automaton: a fixed alphabet, an owned arena of states, an
/// initial state, and a set of final states. The transition function is total over the
/// declared alphabet for every state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) alphabet: Rc<[char]>,
    pub(crate) states: Vec<DfaState>,
    pub(crate) initial: StateId,
    pub(crate) finals: HashSet<StateId>,
}

impl Dfa {
    pub(crate) fn from_parts(
        alphabet: Rc<[char]>,
        states: Vec<DfaState>,
        initial: StateId,
        finals: HashSet<StateId>,
    ) -> Dfa {
        Dfa {
            alphabet,
            states,
            initial,
            finals,
        }
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
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

    /// Simulates `input` against the totalized transition function: rejects as
    /// soon as a symbol outside the alphabet is seen, and accepts iff the state reached
    /// after consuming all of `input` is final. A bare λ input is treated as empty.
    pub fn accepts(&self, input: &str) -> bool {
        eval::accepts(self, input)
    }

    pub fn evaluator(&self) -> DfaEvaluator<'_> {
        self.into()
    }

    /// Lifts this DFA into an equivalent [`Nfa`] by giving each transition a singleton
    /// target set; no new states are introduced.
    pub fn to_nfa(&self) -> Nfa {
        let states = self
            .states
            .iter()
            .map(|s| {
                let mut outgoing: HashMap<Symbol, HashSet<NfaStateId>> = HashMap::new();
                for (&c, &target) in self.alphabet.iter().zip(&s.transitions) {
                    outgoing.insert(Symbol::Char(c), HashSet::from([target]));
                }
                NfaState {
                    label: s.label.clone(),
                    outgoing,
                    incoming: HashMap::new(),
                }
            })
            .collect::<Vec<_>>();
        let mut nfa = Nfa::from_raw_parts(states, self.initial, self.finals.clone());
        nfa.rebuild_incoming();
        nfa
    }

    /// Minimizes this DFA in place: prunes unreachable states, then repeatedly
    /// splits each block of non-distinguishable states by representative comparison
    /// until a full pass produces no new block.
    pub fn minimize(&mut self) {
        let reachable = self.reachable_subset();
        let pruned = self.restrict_to(&reachable);
        let blocks = pruned.partition_refine();
        *self = pruned.quotient(blocks);
    }

    fn reachable_subset(&self) -> Vec<StateId> {
        let mut seen = vec![false; self.states.len()];
        let mut stack = vec![self.initial];
        seen[self.initial] = true;
        let mut order = vec![self.initial];
        while let Some(s) = stack.pop() {
            for &t in &self.states[s].transitions {
                if !seen[t] {
                    seen[t] = true;
                    stack.push(t);
                    order.push(t);
                }
            }
        }
        order.sort_unstable();
        order
    }

    fn restrict_to(&self, keep: &[StateId]) -> Dfa {
        let index_of: HashMap<StateId, StateId> =
            keep.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        let states = keep
            .iter()
            .map(|&s| DfaState {
                label: self.states[s].label.clone(),
                transitions: self.states[s]
                    .transitions
                    .iter()
                    .map(|t| index_of[t])
                    .collect(),
            })
            .collect();
        let initial = index_of[&self.initial];
        let finals = self
            .finals
            .iter()
            .filter_map(|s| index_of.get(s).copied())
            .collect();
        Dfa {
            alphabet: self.alphabet.clone(),
            states,
            initial,
            finals,
        }
    }

    /// Partition refinement (Moore's algorithm): starts from {finals,
    /// non-finals}, then repeatedly picks a representative of each block of size > 1
    /// and splits off every member distinguishable from it on some symbol, until a
    /// full pass over all blocks produces no split.
    fn partition_refine(&self) -> Vec<Vec<StateId>> {
        let n = self.states.len();
        let (finals, nonfinals): (Vec<StateId>, Vec<StateId>) =
            (0..n).partition(|s| self.finals.contains(s));
        let mut blocks: Vec<Vec<StateId>> = [finals, nonfinals]
            .into_iter()
            .filter(|b| !b.is_empty())
            .collect();

        loop {
            let mut class_of = vec![0usize; n];
            for (bi, block) in blocks.iter().enumerate() {
                for &s in block {
                    class_of[s] = bi;
                }
            }

            let mut new_blocks = Vec::with_capacity(blocks.len());
            let mut changed = false;
            for block in &blocks {
                if block.len() <= 1 {
                    new_blocks.push(block.clone());
                    continue;
                }
                let rep = block[0];
                let (same, diff): (Vec<StateId>, Vec<StateId>) = block.iter().copied().partition(|&m| {
                    (0..self.alphabet.len()).all(|c| {
                        class_of[self.states[m].transitions[c]] == class_of[self.states[rep].transitions[c]]
                    })
                });
                if diff.is_empty() {
                    new_blocks.push(same);
                } else {
                    changed = true;
                    new_blocks.push(same);
                    new_blocks.push(diff);
                }
            }
            blocks = new_blocks;
            if !changed {
                return blocks;
            }
        }
    }

    /// Builds the reduced DFA with one state per block. A block's label is the
    /// (sorted, deterministic) concatenation of its members' labels; transitions are
    /// lifted from an arbitrary representative, since all members agree on every
    /// symbol's target block by construction.
    fn quotient(&self, blocks: Vec<Vec<StateId>>) -> Dfa {
        let mut class_of = vec![0usize; self.states.len()];
        for (bi, block) in blocks.iter().enumerate() {
            for &s in block {
                class_of[s] = bi;
            }
        }

        let states = blocks
            .iter()
            .map(|block| {
                let mut labels: Vec<&str> = block.iter().map(|&s| self.states[s].label.as_ref()).collect();
                labels.sort_unstable();
                let rep = block[0];
                DfaState {
                    label: Rc::from(labels.concat()),
                    transitions: self.states[rep].transitions.iter().map(|&t| class_of[t]).collect(),
                }
            })
            .collect();

        let initial = class_of[self.initial];
        let finals = (0..blocks.len())
            .filter(|&bi| blocks[bi].iter().any(|s| self.finals.contains(s)))
            .collect();

        Dfa {
            alphabet: self.alphabet.clone(),
            states,
            initial,
            finals,
        }
    }
}

impl TryFrom<TransitionGraph> for Dfa {
    type Error = GraphError;

    fn try_from(source: TransitionGraph) -> Result<Self, Self::Error> {
        let initial_idx = graph::validate_shape(&source)?;
        if !source.is_dfa() {
            return Err(GraphError::NotADfa);
        }

        let alphabet = source.alphabet();
        let index_of: HashMap<&str, StateId> = source
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.label.as_str(), i))
            .collect();

        let states = source
            .states
            .iter()
            .map(|s| {
                let mut by_char: HashMap<char, StateId> = HashMap::new();
                for (sym, dest) in &s.edges {
                    if let GraphSymbol::Char(c) = sym {
                        by_char.insert(*c, index_of[dest.as_str()]);
                    }
                }
                DfaState {
                    label: Rc::from(s.label.as_str()),
                    transitions: alphabet.iter().map(|c| by_char[c]).collect(),
                }
            })
            .collect();

        let finals = source
            .states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_final)
            .map(|(i, _)| i)
            .collect();

        Ok(Dfa {
            alphabet: Rc::from(alphabet.into_boxed_slice()),
            states,
            initial: initial_idx,
            finals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphState;
    use crate::parser;

    fn build_dfa(src: &str) -> Dfa {
        parser::regex(src).unwrap().to_nfa().to_dfa()
    }

    #[test]
    fn subset_construction_accepts_same_language_as_nfa() {
        let nfa = parser::regex("(a+b)*abb").unwrap().to_nfa();
        let dfa = nfa.to_dfa();
        for s in ["abb", "aabb", "babb", "ababb", "ab", "a", ""] {
            assert_eq!(nfa.accepts(s), dfa.accepts(s), "mismatch on {s:?}");
        }
    }

    #[test]
    fn minimizes_to_four_states() {
        let mut dfa = build_dfa("(a+b)*abb");
        dfa.minimize();
        assert_eq!(dfa.states().len(), 4);
    }

    #[test]
    fn minimization_is_idempotent_in_state_count() {
        let mut dfa = build_dfa("((a*(b+((c*+d)e*)*))*fg)*");
        dfa.minimize();
        let once = dfa.states().len();
        dfa.minimize();
        assert_eq!(dfa.states().len(), once);
    }

    #[test]
    fn minimization_preserves_language() {
        let dfa = build_dfa("(a+b)*abb");
        let mut minimized = dfa.clone();
        minimized.minimize();
        for s in ["abb", "aabb", "babb", "ababb", "ab", "a", "", "bbbabb"] {
            assert_eq!(dfa.accepts(s), minimized.accepts(s), "mismatch on {s:?}");
        }
    }

    #[test]
    fn totality_holds_for_every_reachable_state_and_symbol() {
        let dfa = build_dfa("((a*(b+((c*+d)e*)*))*fg)*");
        for state in dfa.states() {
            assert_eq!(state.transitions().len(), dfa.alphabet().len());
            for &t in state.transitions() {
                assert!(t < dfa.states().len());
            }
        }
    }

    #[test]
    fn builds_from_transition_graph_and_rejects_non_dfa_shapes() {
        use crate::graph::{GraphSymbol, TransitionGraph};

        let total = TransitionGraph::new(vec![
            GraphState {
                label: "q0".into(),
                initial: true,
                is_final: false,
                edges: vec![(GraphSymbol::Char('a'), "q1".into()), (GraphSymbol::Char('b'), "q0".into())],
            },
            GraphState {
                label: "q1".into(),
                initial: false,
                is_final: true,
                edges: vec![(GraphSymbol::Char('a'), "q1".into()), (GraphSymbol::Char('b'), "q0".into())],
            },
        ]);
        let dfa: Dfa = total.clone().try_into().unwrap();
        assert!(dfa.accepts("ab"));
        assert!(!dfa.accepts("a"));

        let with_epsilon = TransitionGraph::new(vec![GraphState {
            label: "q0".into(),
            initial: true,
            is_final: true,
            edges: vec![(GraphSymbol::Epsilon, "q0".into())],
        }]);
        assert_eq!(Dfa::try_from(with_epsilon), Err(GraphError::NotADfa));
    }
}
