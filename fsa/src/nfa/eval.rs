//! NFA simulation: multi-path epsilon-closure evaluation, a backtracking DFS
//! evaluator used for tracing, and the `find_all_reachable` primitive subset
//! construction is built on.

use crate::nfa::{Nfa, StateId, Symbol};
use std::collections::HashSet;
use std::fmt;

/// An input consisting solely of the bare λ character is normalized to the empty
/// string at the simulation entry point, matching [`crate::dfa::Dfa::accepts`]'s rule.
fn normalize_lambda_input(input: &str) -> &str {
    if input.chars().count() == 1 && input.chars().next() == Some(crate::regex::LAMBDA_CHAR) {
        ""
    } else {
        input
    }
}

/// The λ-closure of `states`: every state reachable from some member by zero or more
/// epsilon transitions, including the members themselves.
pub fn epsilon_closure_of(nfa: &Nfa, states: &HashSet<StateId>) -> HashSet<StateId> {
    let mut closure: HashSet<StateId> = states.clone();
    let mut stack: Vec<StateId> = states.iter().copied().collect();
    while let Some(s) = stack.pop() {
        if let Some(targets) = nfa.states[s].outgoing.get(&Symbol::Epsilon) {
            for &t in targets {
                if closure.insert(t) {
                    stack.push(t);
                }
            }
        }
    }
    closure
}

/// The dual-semantic reachability primitive: for [`Symbol::Epsilon`], the
/// λ-closure of `state` (including `state`); for any other symbol `c`, the λ-closure of
/// the `c`-successors of the λ-closure of `state` — i.e. any number of λ steps, exactly
/// one `c` step, any number of λ steps.
pub fn find_all_reachable(nfa: &Nfa, state: StateId, sym: Symbol) -> HashSet<StateId> {
    match sym {
        Symbol::Epsilon => epsilon_closure_of(nfa, &HashSet::from([state])),
        Symbol::Char(_) => {
            let before = epsilon_closure_of(nfa, &HashSet::from([state]));
            let mut stepped = HashSet::new();
            for s in before {
                if let Some(targets) = nfa.states[s].outgoing.get(&sym) {
                    stepped.extend(targets.iter().copied());
                }
            }
            epsilon_closure_of(nfa, &stepped)
        }
    }
}

/// Multi-path (subset-style) simulation: maintains the epsilon-closed set of current
/// states, consuming one input character at a time. Runs in time polynomial in
/// `|states| * |input|`.
pub fn test(nfa: &Nfa, input: &str) -> bool {
    let input = normalize_lambda_input(input);
    let mut current = epsilon_closure_of(nfa, &HashSet::from([nfa.initial_state()]));
    for c in input.chars() {
        if current.is_empty() {
            return false;
        }
        let mut next = HashSet::new();
        for &s in &current {
            next.extend(find_all_reachable(nfa, s, Symbol::Char(c)));
        }
        current = next;
    }
    current.iter().any(|&s| nfa.is_final(s))
}

struct NullSink;

impl fmt::Write for NullSink {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

/// Backtracking DFS simulation: explores epsilon-successors before consuming
/// input, tracking a per-branch `visited` set to detect λ-cycles, and short-circuits on
/// the first accepting path. Accepts the same language as [`test`]; used for
/// pedagogical step tracing via `sink`, which is never consulted for the verdict.
pub fn test_backtrack_with_trace(nfa: &Nfa, input: &str, sink: &mut dyn fmt::Write) -> bool {
    let input = normalize_lambda_input(input);
    let chars: Vec<char> = input.chars().collect();
    let mut visited = HashSet::from([nfa.initial_state()]);
    backtrack(nfa, nfa.initial_state(), &chars, 0, &mut visited, sink)
}

pub fn test_backtrack(nfa: &Nfa, input: &str) -> bool {
    test_backtrack_with_trace(nfa, input, &mut NullSink)
}

fn backtrack(
    nfa: &Nfa,
    state: StateId,
    chars: &[char],
    idx: usize,
    visited: &mut HashSet<StateId>,
    sink: &mut dyn fmt::Write,
) -> bool {
    if idx == chars.len() && nfa.is_final(state) {
        return true;
    }

    if let Some(eps_targets) = nfa.states[state].outgoing.get(&Symbol::Epsilon) {
        for &next in eps_targets {
            if visited.insert(next) {
                let _ = writeln!(
                    sink,
                    "λ -> {} (remaining {:?})",
                    nfa.label(next),
                    &chars[idx..]
                );
                if backtrack(nfa, next, chars, idx, visited, sink) {
                    return true;
                }
                visited.remove(&next);
            }
        }
    }

    if idx == chars.len() {
        return false;
    }

    if let Some(targets) = nfa.states[state].outgoing.get(&Symbol::Char(chars[idx])) {
        for &next in targets {
            let mut fresh_visited = HashSet::from([next]);
            let _ = writeln!(
                sink,
                "{} -> {} (remaining {:?})",
                chars[idx],
                nfa.label(next),
                &chars[idx + 1..]
            );
            if backtrack(nfa, next, chars, idx + 1, &mut fresh_visited, sink) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn build(src: &str) -> Nfa {
        parser::regex(src).unwrap().to_nfa()
    }

    #[test]
    fn multi_path_and_backtracking_agree() {
        let nfa = build("((a*(b+((c*+d)e*)*))*fg)*");
        for s in ["", "fg", "bfg", "aabfg", "fgfg", "f", "g", "ax"] {
            assert_eq!(test(&nfa, s), test_backtrack(&nfa, s), "mismatch on {s:?}");
        }
    }

    #[test]
    fn bare_lambda_input_normalizes_to_empty_string() {
        let nfa = build("a*");
        assert!(test(&nfa, &crate::regex::LAMBDA_CHAR.to_string()));
        assert!(test_backtrack(&nfa, &crate::regex::LAMBDA_CHAR.to_string()));
    }

    #[test]
    fn find_all_reachable_epsilon_is_self_inclusive_closure() {
        let nfa = build("a*b");
        let closure = epsilon_closure_of(&nfa, &HashSet::from([nfa.initial_state()]));
        assert!(closure.contains(&nfa.initial_state()));
    }

    #[test]
    fn trace_sink_receives_steps_without_affecting_verdict() {
        let nfa = build("ab");
        let mut trace = String::new();
        let accepted = test_backtrack_with_trace(&nfa, "ab", &mut trace);
        assert!(accepted);
        assert!(!trace.is_empty());
    }
}
