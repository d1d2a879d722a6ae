//! `fsa` is a regex and finite-state-automaton engine: an operator-precedence regex
//! parser and algebraic simplifier, Thompson-style NFA construction, NFA/DFA
//! simulation, subset construction, Moore-style DFA minimization, and GTG-based regex
//! synthesis (automaton → regex).
//!
//! ## Usage
//!
//! ```rust
//! use fsa::parser;
//!
//! let tree = parser::regex("(a+b)*abb").unwrap();
//! let nfa = tree.to_nfa();
//! assert!(nfa.accepts("abb"));
//! assert!(!nfa.accepts("ab"));
//!
//! let mut dfa = nfa.to_dfa();
//! assert!(dfa.accepts("aabb"));
//! dfa.minimize();
//! assert_eq!(dfa.states().len(), 4);
//!
//! // Synthesizing a regex back from the automaton accepts the same language.
//! let synthesized = nfa.to_regex();
//! let round_tripped = parser::regex(&synthesized.to_string()).unwrap().to_nfa();
//! assert_eq!(nfa.accepts("abb"), round_tripped.accepts("abb"));
//! ```
//!
//! ## Regex grammar
//!
//! ```text
//! regex   := union
//! union   := cat ('+' cat)*
//! cat     := star (('.' | implicit) star)*
//! star    := atom '*'*
//! atom    := CHAR | LAMBDA | NULL | '(' regex ')'
//! ```
//!
//! `~` denotes the empty language, `^` the empty string. Parentheses and implicit
//! concatenation (`ab` meaning `a.b`) are both supported; see [`parser`] for the full
//! grammar notes and error vocabulary.
//!
//! ## Transition graphs
//!
//! The crate also accepts automata described as an already-tokenized
//! [`graph::TransitionGraph`] — the in-memory record a text-file or JFLAP loader would
//! hand to this core (those loaders are out of this crate's scope; see [`graph`]).
//! `TryFrom<TransitionGraph>` is implemented for both [`nfa::Nfa`] and [`dfa::Dfa`],
//! the latter additionally requiring the graph to be deterministic and total.
//!
//! ## Module map
//!
//! * [`regex`] — the algebraic regex tree, its simplifier, and canonical serializer.
//! * [`parser`] — the regex string parser.
//! * [`graph`] — the transition-graph record type and its shape validation.
//! * [`nfa`] — nondeterministic automata: construction, simulation, subset
//!   construction (`to_dfa`), and regex synthesis (`to_regex`).
//! * [`dfa`] — deterministic automata: simulation and minimization.

pub mod dfa;
pub mod graph;
pub mod nfa;
pub mod parser;
pub mod regex;
