//! State-elimination regex synthesis: builds a generalized transition graph
//! (GTG) over any [`Nfa`] whose edge labels are [`RegexTree`]s, augments it with an
//! auxiliary source/sink, and iteratively suppresses every original state until only
//! source → sink parallel edges remain.
//!
//! The GTG overlay (`GTG_in`/`GTG_out` sets on each state) is entirely local to this
//! module: it is built fresh from the NFA's reachable states and never written back
//! onto [`crate::nfa::NfaState`].

use crate::nfa::{Nfa, Symbol};
use crate::regex::RegexTree;
use std::collections::HashMap;

/// Index into the local GTG node list built for one synthesis run. `0..n` are the
/// NFA's reachable states (in [`Nfa::state_list`] order); `n` is the fresh source, `n+1`
/// the fresh sink.
type GtgId = usize;

type EdgeList = Vec<(RegexTree, GtgId)>;

pub(crate) fn synthesize(nfa: &Nfa) -> RegexTree {
    let order = nfa.state_list();
    let n = order.len();
    let index_of: HashMap<usize, GtgId> = order.iter().enumerate().map(|(i, &s)| (s, i)).collect();

    let source = n;
    let sink = n + 1;
    let total = n + 2;

    let mut out_edges: Vec<EdgeList> = vec![Vec::new(); total];
    let mut in_edges: Vec<EdgeList> = vec![Vec::new(); total];

    // Step 1: wrap every original transition (including epsilon) as a regex-labeled edge.
    for (&orig, &gi) in &index_of {
        for (&sym, targets) in &nfa.states[orig].outgoing {
            let label = match sym {
                Symbol::Char(c) => RegexTree::Character(c),
                Symbol::Epsilon => RegexTree::Lambda,
            };
            for &target in targets {
                if let Some(&gj) = index_of.get(&target) {
                    add_edge(&mut out_edges, &mut in_edges, gi, label.clone(), gj);
                }
            }
        }
    }

    // Step 2: auxiliary source/sink, linked by λ to the old initial/final states.
    add_edge(&mut out_edges, &mut in_edges, source, RegexTree::Lambda, index_of[&nfa.initial_state()]);
    for &f in nfa.final_states() {
        if let Some(&gi) = index_of.get(&f) {
            add_edge(&mut out_edges, &mut in_edges, gi, RegexTree::Lambda, sink);
        }
    }

    // Step 3: suppress every original state, one at a time.
    for gi in 0..n {
        suppress(gi, &mut out_edges, &mut in_edges);
    }

    // Step 4: the remaining graph is source -> sink with zero or more parallel edges.
    let edges: Vec<RegexTree> = out_edges[source]
        .iter()
        .filter(|&&(_, to)| to == sink)
        .map(|(label, _)| label.clone())
        .collect();

    RegexTree::union_all(edges)
}

fn add_edge(out_edges: &mut [EdgeList], in_edges: &mut [EdgeList], from: GtgId, label: RegexTree, to: GtgId) {
    out_edges[from].push((label.clone(), to));
    in_edges[to].push((label, from));
}

/// Removes `state` from the graph, rerouting every (origin -> state -> dest) path
/// through a new direct edge labeled with the self-loop-starred concatenation.
fn suppress(state: GtgId, out_edges: &mut [EdgeList], in_edges: &mut [EdgeList]) {
    let outs = std::mem::take(&mut out_edges[state]);
    let ins = std::mem::take(&mut in_edges[state]);

    let (loops, nonloop_out): (Vec<_>, Vec<_>) = outs.into_iter().partition(|&(_, to)| to == state);
    let (_, nonloop_in): (Vec<_>, Vec<_>) = ins.into_iter().partition(|&(_, from)| from == state);

    let loop_labels: Vec<RegexTree> = loops.into_iter().map(|(label, _)| label).collect();
    let l = RegexTree::star(RegexTree::union_all(loop_labels));

    for (label, origin) in &nonloop_in {
        out_edges[*origin].retain(|(l2, to)| !(*to == state && l2 == label));
    }
    for (label, dest) in &nonloop_out {
        in_edges[*dest].retain(|(l2, from)| !(*from == state && l2 == label));
    }

    for (in_label, origin) in &nonloop_in {
        for (out_label, dest) in &nonloop_out {
            let combined = RegexTree::cat(RegexTree::cat(in_label.clone(), l.clone()), out_label.clone());
            add_edge(out_edges, in_edges, *origin, combined, *dest);
        }
    }
}
