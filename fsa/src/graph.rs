//! The in-memory transition-graph record consumed by [`crate::nfa::Nfa`] and
//! [`crate::dfa::Dfa`] construction.
//!
//! This is the shape a transition-graph text file or a JFLAP XML document would be
//! tokenized into; producing a [`TransitionGraph`] from either external format is
//! outside this crate's scope (see the crate root docs) — callers who need a file or
//! XML front end build one on top of this record type.

use std::collections::HashSet;
use thiserror::Error;

/// A transition symbol in a [`TransitionGraph`] edge: either an ordinary character or
/// an epsilon move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphSymbol {
    Char(char),
    Epsilon,
}

/// One state declaration: its label, whether it is the initial state, whether it is
/// accepting, and its outgoing edges by (symbol, destination label).
#[derive(Debug, Clone)]
pub struct GraphState {
    pub label: String,
    pub initial: bool,
    pub is_final: bool,
    pub edges: Vec<(GraphSymbol, String)>,
}

/// A flat, unvalidated description of an automaton's states and transitions.
#[derive(Debug, Clone, Default)]
pub struct TransitionGraph {
    pub states: Vec<GraphState>,
}

impl TransitionGraph {
    pub fn new(states: Vec<GraphState>) -> TransitionGraph {
        TransitionGraph { states }
    }

    /// The declared alphabet: every non-epsilon symbol mentioned by any edge.
    pub fn alphabet(&self) -> Vec<char> {
        let mut set = HashSet::new();
        for state in &self.states {
            for (sym, _) in &state.edges {
                if let GraphSymbol::Char(c) = sym {
                    set.insert(*c);
                }
            }
        }
        let mut alphabet: Vec<char> = set.into_iter().collect();
        alphabet.sort_unstable();
        alphabet
    }

    /// True iff no state has an epsilon edge and every state has exactly one outgoing
    /// edge per symbol of [`Self::alphabet`] — the predicate a graph must satisfy to be
    /// built directly into a [`crate::dfa::Dfa`] rather than an [`crate::nfa::Nfa`].
    pub fn is_dfa(&self) -> bool {
        let alphabet = self.alphabet();
        self.states.iter().all(|state| {
            let mut seen = HashSet::new();
            for (sym, _) in &state.edges {
                match sym {
                    GraphSymbol::Epsilon => return false,
                    GraphSymbol::Char(c) => {
                        if !seen.insert(*c) {
                            return false; // ambiguous: two edges for the same symbol
                        }
                    }
                }
            }
            alphabet.iter().all(|c| seen.contains(c))
        })
    }
}

/// Graph validation errors, surfaced when converting a [`TransitionGraph`] into an
/// [`crate::nfa::Nfa`] or [`crate::dfa::Dfa`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("no state is marked as the initial state")]
    MissingInitial,
    #[error("more than one state is marked as the initial state")]
    MultipleInitial,
    #[error("a state has an empty label")]
    MissingLabel,
    #[error("the label {0:?} is used by more than one state")]
    DuplicateLabel(String),
    #[error("state {0:?} has a transition to undeclared state {1:?}")]
    UndefinedDestination(String, String),
    #[error("the graph is not deterministic: it has an epsilon edge or an incomplete/ambiguous transition function")]
    NotADfa,
}

/// Validates labels, uniqueness, and initial-state arity shared by NFA/DFA conversion,
/// returning the index of the single initial state on success.
pub(crate) fn validate_shape(graph: &TransitionGraph) -> Result<usize, GraphError> {
    let mut labels = HashSet::new();
    for state in &graph.states {
        if state.label.is_empty() {
            return Err(GraphError::MissingLabel);
        }
        if !labels.insert(state.label.as_str()) {
            return Err(GraphError::DuplicateLabel(state.label.clone()));
        }
    }
    for state in &graph.states {
        for (_, dest) in &state.edges {
            if !labels.contains(dest.as_str()) {
                return Err(GraphError::UndefinedDestination(
                    state.label.clone(),
                    dest.clone(),
                ));
            }
        }
    }
    let initials: Vec<usize> = graph
        .states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.initial)
        .map(|(i, _)| i)
        .collect();
    match initials.len() {
        0 => Err(GraphError::MissingInitial),
        1 => Ok(initials[0]),
        _ => Err(GraphError::MultipleInitial),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(label: &str, initial: bool, is_final: bool, edges: Vec<(GraphSymbol, &str)>) -> GraphState {
        GraphState {
            label: label.to_string(),
            initial,
            is_final,
            edges: edges.into_iter().map(|(s, d)| (s, d.to_string())).collect(),
        }
    }

    #[test]
    fn detects_missing_and_multiple_initial() {
        let g = TransitionGraph::new(vec![state("q0", false, false, vec![])]);
        assert_eq!(validate_shape(&g), Err(GraphError::MissingInitial));

        let g = TransitionGraph::new(vec![
            state("q0", true, false, vec![]),
            state("q1", true, false, vec![]),
        ]);
        assert_eq!(validate_shape(&g), Err(GraphError::MultipleInitial));
    }

    #[test]
    fn detects_undefined_destination() {
        let g = TransitionGraph::new(vec![state(
            "q0",
            true,
            true,
            vec![(GraphSymbol::Char('a'), "q1")],
        )]);
        assert_eq!(
            validate_shape(&g),
            Err(GraphError::UndefinedDestination("q0".to_string(), "q1".to_string()))
        );
    }

    #[test]
    fn is_dfa_rejects_epsilon_and_incompleteness() {
        let with_eps = TransitionGraph::new(vec![state(
            "q0",
            true,
            true,
            vec![(GraphSymbol::Epsilon, "q0")],
        )]);
        assert!(!with_eps.is_dfa());

        let incomplete = TransitionGraph::new(vec![
            state("q0", true, false, vec![(GraphSymbol::Char('a'), "q1")]),
            state("q1", false, true, vec![]),
        ]);
        assert!(!incomplete.is_dfa());
    }

    #[test]
    fn is_dfa_accepts_total_deterministic_graph() {
        let g = TransitionGraph::new(vec![
            state(
                "q0",
                true,
                false,
                vec![(GraphSymbol::Char('a'), "q1"), (GraphSymbol::Char('b'), "q0")],
            ),
            state(
                "q1",
                false,
                true,
                vec![(GraphSymbol::Char('a'), "q1"), (GraphSymbol::Char('b'), "q0")],
            ),
        ]);
        assert!(g.is_dfa());
    }
}
