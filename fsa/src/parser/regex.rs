//! Hand-rolled operator-precedence parser for the regex grammar.
//!
//! The parser reads the input through a one-character lookahead buffer and maintains a
//! stack holding alternating operands (subtrees) and pending binary operators (`Union`
//! or `Cat`). A `(` begins a nested parse that consumes its own stack and returns on the
//! matching `)`; the position of every unmatched delimiter and missing operand is
//! threaded through so callers get exact error locations.

use crate::regex::{RegexTree, LAMBDA_CHAR, NULL_CHAR};
use thiserror::Error;

const UNION_SYM: char = '+';
const CAT_SYM: char = '.';
const STAR_SYM: char = '*';

/// A structured regex parse error, carrying the character position at which the
/// problem was detected where that is meaningful.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexParseError {
    #[error("missing operand for operator at position {0}")]
    MissingOperand(usize),
    #[error("empty expression")]
    EmptyExpression,
    #[error("unmatched '(' at position {0}")]
    UnmatchedOpenParen(usize),
    #[error("unmatched ')' at position {0}")]
    UnmatchedCloseParen(usize),
    #[error("malformed expression: operator left on the stack")]
    ResidualOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Union,
    Cat,
}

impl Op {
    fn priority(self) -> u8 {
        match self {
            Op::Union => 1,
            Op::Cat => 2,
        }
    }
}

#[derive(Debug, Clone)]
enum StackItem {
    Operand(RegexTree),
    Operator(Op),
}

struct Parser<'a> {
    buf: &'a [char],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.buf.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Priority of the next pending operator, as seen by lookahead: `)` and
    /// end-of-input act as the lowest possible priority so any pending operator
    /// reduces against them; `*` binds tighter than `+`/implicit-or-explicit `.`.
    fn next_priority(&self) -> Option<u8> {
        match self.peek() {
            None | Some(')') => None,
            Some(c) if c == UNION_SYM => Some(1),
            Some(c) if c == STAR_SYM => Some(3),
            _ => Some(2),
        }
    }

    /// Parses one expression. `paren_open_pos` is `Some(pos)` when this call is
    /// nested inside a `(` opened at `pos` (so that a `)` ends this call and an
    /// unexpected end-of-input is reported against that `(`), or `None` at the
    /// top level (so a stray `)` is an error and end-of-input ends the parse).
    fn parse_expr(&mut self, paren_open_pos: Option<usize>) -> Result<RegexTree, RegexParseError> {
        let mut stack: Vec<StackItem> = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some('(') => {
                    let open_pos = self.pos;
                    self.advance();
                    push_implied_cat(&mut stack);
                    let inner = self.parse_expr(Some(open_pos))?;
                    push_node(&mut stack, inner, self, open_pos)?;
                }
                Some(')') => {
                    if paren_open_pos.is_none() {
                        return Err(RegexParseError::UnmatchedCloseParen(self.pos));
                    }
                    self.advance();
                    return get_result(&mut stack);
                }
                Some(c) if c == UNION_SYM || c == CAT_SYM || c == STAR_SYM => {
                    let pos = self.pos;
                    self.advance();
                    push_operator(&mut stack, c, pos, self)?;
                }
                Some(c) => {
                    let pos = self.pos;
                    self.advance();
                    push_node(&mut stack, make_leaf(c), self, pos)?;
                }
            }
        }
        match paren_open_pos {
            Some(open_pos) => Err(RegexParseError::UnmatchedOpenParen(open_pos)),
            None => get_result(&mut stack),
        }
    }
}

fn make_leaf(c: char) -> RegexTree {
    match c {
        LAMBDA_CHAR => RegexTree::Lambda,
        NULL_CHAR => RegexTree::Null,
        _ => RegexTree::Character(c),
    }
}

/// Inserts an implicit `Cat` between two adjacent operands (`ab` means `a.b`).
fn push_implied_cat(stack: &mut Vec<StackItem>) {
    if matches!(stack.last(), Some(StackItem::Operand(_))) {
        stack.push(StackItem::Operator(Op::Cat));
    }
}

/// Pushes a freshly-built operand, first resolving any pending operator whose
/// priority is at least that of the next incoming operator (reduce-before-shift).
fn push_node(
    stack: &mut Vec<StackItem>,
    node: RegexTree,
    parser: &Parser,
    pos: usize,
) -> Result<(), RegexParseError> {
    push_implied_cat(stack);

    let prev_op = match stack.last() {
        Some(StackItem::Operator(op)) => Some(*op),
        _ => None,
    };
    let should_reduce = match (prev_op, parser.next_priority()) {
        (Some(_), None) => true,
        (Some(op), Some(next)) => op.priority() >= next,
        (None, _) => false,
    };

    if should_reduce {
        let op = match stack.pop() {
            Some(StackItem::Operator(op)) => op,
            _ => unreachable!("prev_op was Some"),
        };
        let lhs = match stack.pop() {
            Some(StackItem::Operand(tree)) => tree,
            _ => return Err(RegexParseError::MissingOperand(pos)),
        };
        let combined = match op {
            Op::Cat => RegexTree::cat(lhs, node),
            Op::Union => RegexTree::union(lhs, node),
        };
        push_node(stack, combined, parser, pos)
    } else {
        stack.push(StackItem::Operand(node));
        Ok(())
    }
}

/// Pushes an operator character: `+`/`.` are deferred onto the stack, `*` applies
/// immediately to the top operand (it binds tighter than any binary operator).
fn push_operator(
    stack: &mut Vec<StackItem>,
    c: char,
    pos: usize,
    parser: &Parser,
) -> Result<(), RegexParseError> {
    if !matches!(stack.last(), Some(StackItem::Operand(_))) {
        return Err(RegexParseError::MissingOperand(pos));
    }
    if c == UNION_SYM {
        stack.push(StackItem::Operator(Op::Union));
        Ok(())
    } else if c == CAT_SYM {
        stack.push(StackItem::Operator(Op::Cat));
        Ok(())
    } else {
        let operand = match stack.pop() {
            Some(StackItem::Operand(tree)) => tree,
            _ => unreachable!("checked above"),
        };
        push_node(stack, RegexTree::star(operand), parser, pos)
    }
}

fn get_result(stack: &mut Vec<StackItem>) -> Result<RegexTree, RegexParseError> {
    match stack.pop() {
        None => Err(RegexParseError::EmptyExpression),
        Some(StackItem::Operator(_)) => Err(RegexParseError::ResidualOperator),
        Some(StackItem::Operand(tree)) => {
            if stack.is_empty() {
                Ok(tree)
            } else {
                Err(RegexParseError::ResidualOperator)
            }
        }
    }
}

pub fn full_regex(input: &str) -> Result<RegexTree, RegexParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut parser = Parser { buf: &chars, pos: 0 };
    parser.parse_expr(None)
}
