//! The regex tree: an algebraic expression type together with a simplifier and a
//! canonicalizing serializer.
//!
//! A [`RegexTree`] is built by [`crate::parser::regex`] and consumed by
//! [`RegexTree::to_nfa`]. It is also the result type of [`crate::nfa::Nfa::to_regex`],
//! which builds one via state-elimination synthesis (see `crate::nfa::gtg`).

use crate::nfa::Nfa;
use std::fmt;

/// The two reserved leaf symbols, printed verbatim by the serializer.
pub const NULL_CHAR: char = '~';
pub const LAMBDA_CHAR: char = '^';

/// An algebraic regular-expression tree.
///
/// Values are compared structurally (`PartialEq`/`Eq`), which is what the simplifier's
/// `Union(a, a) -> a` rule relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegexTree {
    /// Matches the single symbol `c`. `c` is never one of the reserved/operator
    /// characters (`~ ^ + . * ( )`) — the parser never produces such a leaf, and
    /// callers constructing a tree directly are expected to respect the same rule.
    Character(char),
    /// Matches the empty string.
    Lambda,
    /// Matches no string.
    Null,
    /// Kleene closure of `child`.
    Star(Box<RegexTree>),
    /// Concatenation of `left` then `right`.
    Cat(Box<RegexTree>, Box<RegexTree>),
    /// Alternation between `left` and `right`.
    Union(Box<RegexTree>, Box<RegexTree>),
}

impl RegexTree {
    pub fn star(child: RegexTree) -> RegexTree {
        RegexTree::Star(Box::new(child))
    }

    pub fn cat(left: RegexTree, right: RegexTree) -> RegexTree {
        RegexTree::Cat(Box::new(left), Box::new(right))
    }

    pub fn union(left: RegexTree, right: RegexTree) -> RegexTree {
        RegexTree::Union(Box::new(left), Box::new(right))
    }

    /// Folds an iterator of trees into a single tree with `Union`, starting from `Null`
    /// (`Null` is `Union`'s identity, so folding over an empty iterator yields `Null`).
    pub fn union_all(nodes: impl IntoIterator<Item = RegexTree>) -> RegexTree {
        nodes
            .into_iter()
            .fold(RegexTree::Null, |acc, node| RegexTree::union(acc, node))
    }

    /// Runs the bottom-up simplification rewrites of the tree to a fixpoint.
    pub fn simplify(self) -> RegexTree {
        simplify(self, false)
    }

    /// Converts this tree into a fresh [`Nfa`] via Thompson-style construction with the
    /// merge optimizations described in the crate's design notes.
    pub fn to_nfa(&self) -> Nfa {
        Nfa::from_regex_tree(self)
    }

    /// True if this node is a `Cat` or `Union` (the two binary operators), used by the
    /// serializer to decide whether a child needs parenthesizing.
    fn is_bin_op(&self) -> bool {
        matches!(self, RegexTree::Cat(..) | RegexTree::Union(..))
    }

    fn is_union(&self) -> bool {
        matches!(self, RegexTree::Union(..))
    }

    /// Renders the canonical regex string for this tree, adding parentheses only where
    /// precedence requires: around a `Union` operand of `Cat`, and around a binary
    /// operand of `Star`.
    fn write_to(&self, out: &mut String) {
        match self {
            RegexTree::Character(c) => out.push(*c),
            RegexTree::Lambda => out.push(LAMBDA_CHAR),
            RegexTree::Null => out.push(NULL_CHAR),
            RegexTree::Star(child) => {
                if child.is_bin_op() {
                    out.push('(');
                    child.write_to(out);
                    out.push(')');
                } else {
                    child.write_to(out);
                }
                out.push('*');
            }
            RegexTree::Cat(left, right) => {
                if left.is_union() {
                    out.push('(');
                    left.write_to(out);
                    out.push(')');
                } else {
                    left.write_to(out);
                }
                if right.is_union() {
                    out.push('(');
                    right.write_to(out);
                    out.push(')');
                } else {
                    right.write_to(out);
                }
            }
            RegexTree::Union(left, right) => {
                left.write_to(out);
                out.push('+');
                right.write_to(out);
            }
        }
    }
}

impl fmt::Display for RegexTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        self.write_to(&mut s);
        f.write_str(&s)
    }
}

/// Bottom-up simplification, threading the `descendant_of_star` context flag: inside a
/// star's child, a `Union`-operand `Lambda` is redundant because the enclosing star
/// already supplies the empty string.
fn simplify(node: RegexTree, descendant_of_star: bool) -> RegexTree {
    match node {
        RegexTree::Star(child) => {
            let child = simplify(*child, true);
            if child == RegexTree::Lambda || child == RegexTree::Null {
                return RegexTree::Lambda;
            }
            if descendant_of_star {
                // Star(Star(x)) collapses: the caller's own Star wrapper is the one
                // that survives, so this inner one returns its child unwrapped.
                return child;
            }
            RegexTree::star(child)
        }
        RegexTree::Cat(left, right) => {
            // A star's child being a Lambda-dropping Union only holds for the
            // union immediately inside the star, not across an intervening Cat:
            // the dropped Lambda would otherwise silently remove the other
            // Cat operand's contribution to the language. Reset the flag here.
            let left = simplify(*left, false);
            let right = simplify(*right, false);
            if left == RegexTree::Null || right == RegexTree::Null {
                return RegexTree::Null;
            }
            if left == RegexTree::Lambda {
                return right;
            }
            if right == RegexTree::Lambda {
                return left;
            }
            RegexTree::cat(left, right)
        }
        RegexTree::Union(left, right) => {
            let left = simplify(*left, descendant_of_star);
            let right = simplify(*right, descendant_of_star);
            if left == RegexTree::Null {
                return right;
            }
            if right == RegexTree::Null {
                return left;
            }
            if left == right {
                return left;
            }
            if descendant_of_star {
                if left == RegexTree::Lambda {
                    return right;
                }
                if right == RegexTree::Lambda {
                    return left;
                }
            }
            RegexTree::union(left, right)
        }
        leaf => leaf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(c: char) -> RegexTree {
        RegexTree::Character(c)
    }

    #[test]
    fn star_of_star_collapses() {
        let tree = RegexTree::star(RegexTree::star(ch('a')));
        assert_eq!(tree.simplify(), RegexTree::star(ch('a')));
    }

    #[test]
    fn star_of_lambda_is_lambda() {
        assert_eq!(RegexTree::star(RegexTree::Lambda).simplify(), RegexTree::Lambda);
        assert_eq!(RegexTree::star(RegexTree::Null).simplify(), RegexTree::Lambda);
    }

    #[test]
    fn cat_absorbs_lambda_and_annihilates_on_null() {
        let tree = RegexTree::cat(RegexTree::Lambda, ch('a'));
        assert_eq!(tree.simplify(), ch('a'));

        let tree = RegexTree::cat(ch('a'), RegexTree::Null);
        assert_eq!(tree.simplify(), RegexTree::Null);
    }

    #[test]
    fn union_drops_null_and_duplicates() {
        let tree = RegexTree::union(ch('a'), RegexTree::Null);
        assert_eq!(tree.simplify(), ch('a'));

        let tree = RegexTree::union(ch('a'), ch('a'));
        assert_eq!(tree.simplify(), ch('a'));
    }

    #[test]
    fn union_drops_lambda_only_under_star() {
        let tree = RegexTree::union(RegexTree::Lambda, ch('a'));
        assert_eq!(tree.clone().simplify(), tree); // not under a star: kept

        let starred = RegexTree::star(tree);
        assert_eq!(starred.simplify(), RegexTree::star(ch('a')));
    }

    #[test]
    fn union_lambda_drop_does_not_cross_an_intervening_cat() {
        // Star(Cat(Union(Lambda, a), b)) accepts "b" (take the Lambda branch, then b).
        // If the star's Lambda-dropping rule leaked across the Cat it would collapse
        // to Star(Cat(a, b)), which rejects "b" — so the Cat operands must be
        // simplified with a fresh (non-star-descendant) context.
        let tree = RegexTree::star(RegexTree::cat(
            RegexTree::union(RegexTree::Lambda, ch('a')),
            ch('b'),
        ));
        let simplified = tree.simplify();
        assert_eq!(
            simplified,
            RegexTree::star(RegexTree::cat(
                RegexTree::union(RegexTree::Lambda, ch('a')),
                ch('b'),
            ))
        );
        assert!(simplified.to_nfa().accepts("b"));
    }

    #[test]
    fn serializes_with_minimal_parens() {
        let tree = RegexTree::cat(RegexTree::union(ch('a'), ch('b')), ch('c'));
        assert_eq!(tree.to_string(), "(a+b)c");

        let tree = RegexTree::star(RegexTree::union(ch('a'), ch('b')));
        assert_eq!(tree.to_string(), "(a+b)*");

        let tree = RegexTree::star(ch('a'));
        assert_eq!(tree.to_string(), "a*");
    }

    #[test]
    fn union_all_of_empty_is_null() {
        assert_eq!(RegexTree::union_all(Vec::new()), RegexTree::Null);
    }
}
