//! Formula AST: construction, evaluation and expression rebuilding
//!
//! Nodes are built bottom-up from a post-order event stream (see
//! [`TreeBuilder`]). Redundant parentheses are erased at construction
//! time, so a rebuilt expression is already in minimal form.

use crate::cache::{CellRefCache, CellSlot};
use tally_sheets_core::error::Error;
use tally_sheets_core::{CellError, CellValue, Position, Result};

/// Where formula evaluation reads cell values from.
///
/// Returning `None` means the cell does not exist; evaluation treats it
/// as zero.
pub trait CellSource {
    fn cell_value(&self, pos: Position) -> Option<CellValue>;
}

/// Outcome of evaluating a formula or subexpression
pub type EvalResult = std::result::Result<f64, CellError>;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn symbol(&self) -> char {
        match self {
            UnaryOp::Plus => '+',
            UnaryOp::Minus => '-',
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    fn is_additive(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub)
    }
}

/// Formula expression node
#[derive(Debug, PartialEq)]
pub enum Node {
    /// Numeric literal, kept as source text
    Literal(String),
    /// Reference to a shared position slot
    Ref(CellSlot),
    /// Parentheses that survived simplification
    Parens(Box<Node>),
    /// Unary sign
    Unary { op: UnaryOp, child: Box<Node> },
    /// Binary arithmetic
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
}

impl Node {
    /// Wrap `child` in parentheses unless they can never matter
    /// (literals, references and already-parenthesized expressions).
    pub fn parens(child: Node) -> Node {
        match child {
            Node::Literal(_) | Node::Ref(_) | Node::Parens(_) => child,
            other => Node::Parens(Box::new(other)),
        }
    }

    /// Build a unary node, erasing operand parentheses where the sign
    /// binds tighter anyway.
    pub fn unary(op: UnaryOp, child: Node) -> Node {
        let child = Self::simplify_unary_operand(child);
        Node::Unary {
            op,
            child: Box::new(child),
        }
    }

    /// Build a binary node, erasing operand parentheses that precedence
    /// and associativity make redundant.
    pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
        let lhs = Self::simplify_binary_operand(op, lhs, false);
        let rhs = Self::simplify_binary_operand(op, rhs, true);
        Node::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    // A parenthesized additive expression changes meaning under a sign:
    // -(1+2) is not -1+2. Everything else unwraps.
    fn simplify_unary_operand(child: Node) -> Node {
        match child {
            Node::Parens(inner) => match *inner {
                Node::Binary { op, .. } if op.is_additive() => Node::Parens(inner),
                other => other,
            },
            other => other,
        }
    }

    fn simplify_binary_operand(parent: BinaryOp, child: Node, right: bool) -> Node {
        match child {
            Node::Parens(inner) => {
                let keep = match *inner {
                    Node::Binary { op, .. } => match parent {
                        BinaryOp::Add => false,
                        BinaryOp::Sub => right && op.is_additive(),
                        BinaryOp::Mul => op.is_additive(),
                        BinaryOp::Div => right || op.is_additive(),
                    },
                    _ => false,
                };
                if keep {
                    Node::Parens(inner)
                } else {
                    *inner
                }
            }
            other => other,
        }
    }

    /// Evaluate the subtree against `source`.
    pub fn evaluate(&self, source: &dyn CellSource) -> EvalResult {
        match self {
            Node::Literal(text) => text.parse().map_err(|_| CellError::Value),
            Node::Ref(slot) => {
                let pos = match *slot.borrow() {
                    Some(pos) => pos,
                    None => return Err(CellError::Ref),
                };
                match source.cell_value(pos) {
                    None => Ok(0.0),
                    Some(CellValue::Number(n)) => Ok(n),
                    Some(CellValue::Text(s)) => {
                        if s.is_empty() {
                            Ok(0.0)
                        } else {
                            s.parse().map_err(|_| CellError::Value)
                        }
                    }
                    Some(CellValue::Error(e)) => Err(e),
                }
            }
            Node::Parens(inner) => inner.evaluate(source),
            Node::Unary { op, child } => {
                let value = child.evaluate(source)?;
                Ok(match op {
                    UnaryOp::Plus => value,
                    UnaryOp::Minus => -value,
                })
            }
            Node::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(source)?;
                let rhs = rhs.evaluate(source)?;
                let result = match op {
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Sub => lhs - rhs,
                    BinaryOp::Mul => lhs * rhs,
                    BinaryOp::Div => lhs / rhs,
                };
                if result.is_finite() {
                    Ok(result)
                } else {
                    Err(CellError::Div0)
                }
            }
        }
    }

    /// Rebuild the canonical textual form of the subtree.
    pub fn build_expression(&self) -> String {
        let mut out = String::new();
        self.write_expression(&mut out);
        out
    }

    fn write_expression(&self, out: &mut String) {
        match self {
            Node::Literal(text) => out.push_str(text),
            Node::Ref(slot) => match *slot.borrow() {
                Some(pos) => out.push_str(&pos.to_a1_string()),
                None => out.push_str(CellError::Ref.as_str()),
            },
            Node::Parens(inner) => {
                out.push('(');
                inner.write_expression(out);
                out.push(')');
            }
            Node::Unary { op, child } => {
                out.push(op.symbol());
                child.write_expression(out);
            }
            Node::Binary { op, lhs, rhs } => {
                lhs.write_expression(out);
                out.push(op.symbol());
                rhs.write_expression(out);
            }
        }
    }
}

/// Bottom-up AST builder fed by post-order construction events.
///
/// The parser pushes leaves with [`add_literal`](Self::add_literal) and
/// [`add_cell`](Self::add_cell); operators pop their operands off the
/// node stack. Cell names share slots through the [`CellRefCache`] that
/// ends up owned by the finished [`crate::Formula`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Node>,
    refs: CellRefCache,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_literal(&mut self, text: impl Into<String>) {
        self.stack.push(Node::Literal(text.into()));
    }

    pub fn add_cell(&mut self, name: &str) -> Result<()> {
        let pos =
            Position::parse(name).map_err(|e| Error::FormulaParse(e.to_string()))?;
        let slot = self.refs.get_or_insert(pos);
        self.stack.push(Node::Ref(slot));
        Ok(())
    }

    pub fn add_parens(&mut self) {
        let child = self.pop();
        self.stack.push(Node::parens(child));
    }

    pub fn add_unary(&mut self, op: UnaryOp) {
        let child = self.pop();
        self.stack.push(Node::unary(op, child));
    }

    pub fn add_binary(&mut self, op: BinaryOp) {
        let rhs = self.pop();
        let lhs = self.pop();
        self.stack.push(Node::binary(op, lhs, rhs));
    }

    /// Finish construction, yielding the root and the reference cache.
    pub fn build(mut self) -> (Node, CellRefCache) {
        let root = self.pop();
        (root, self.refs)
    }

    fn pop(&mut self) -> Node {
        self.stack.pop().expect("construction event underflow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource(HashMap<Position, CellValue>);

    impl MapSource {
        fn new(entries: &[(&str, CellValue)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(name, v)| (Position::parse(name).unwrap(), v.clone()))
                    .collect(),
            )
        }
    }

    impl CellSource for MapSource {
        fn cell_value(&self, pos: Position) -> Option<CellValue> {
            self.0.get(&pos).cloned()
        }
    }

    fn empty() -> MapSource {
        MapSource(HashMap::new())
    }

    fn build_binary(op: BinaryOp, lhs: &str, rhs: &str) -> Node {
        Node::binary(op, Node::Literal(lhs.into()), Node::Literal(rhs.into()))
    }

    #[test]
    fn test_literal_evaluation() {
        assert_eq!(Node::Literal("2.5".into()).evaluate(&empty()), Ok(2.5));
        assert_eq!(Node::Literal("1e3".into()).evaluate(&empty()), Ok(1000.0));
    }

    #[test]
    fn test_arithmetic() {
        let sum = build_binary(BinaryOp::Add, "2", "3");
        assert_eq!(sum.evaluate(&empty()), Ok(5.0));

        let neg = Node::unary(UnaryOp::Minus, Node::Literal("4".into()));
        assert_eq!(neg.evaluate(&empty()), Ok(-4.0));

        let plus = Node::unary(UnaryOp::Plus, Node::Literal("4".into()));
        assert_eq!(plus.evaluate(&empty()), Ok(4.0));
    }

    #[test]
    fn test_division_by_zero() {
        let div = build_binary(BinaryOp::Div, "1", "0");
        assert_eq!(div.evaluate(&empty()), Err(CellError::Div0));

        let div = build_binary(BinaryOp::Div, "0", "0");
        assert_eq!(div.evaluate(&empty()), Err(CellError::Div0));
    }

    #[test]
    fn test_reference_evaluation() {
        let mut refs = CellRefCache::new();
        let slot = refs.get_or_insert(Position::parse("A1").unwrap());
        let node = Node::Ref(slot.clone());

        // Missing cell reads as zero
        assert_eq!(node.evaluate(&empty()), Ok(0.0));

        let source = MapSource::new(&[("A1", CellValue::Number(7.0))]);
        assert_eq!(node.evaluate(&source), Ok(7.0));

        let source = MapSource::new(&[("A1", CellValue::Text("12".into()))]);
        assert_eq!(node.evaluate(&source), Ok(12.0));

        let source = MapSource::new(&[("A1", CellValue::Text("".into()))]);
        assert_eq!(node.evaluate(&source), Ok(0.0));

        let source = MapSource::new(&[("A1", CellValue::Text("abc".into()))]);
        assert_eq!(node.evaluate(&source), Err(CellError::Value));

        let source = MapSource::new(&[("A1", CellValue::Error(CellError::Div0))]);
        assert_eq!(node.evaluate(&source), Err(CellError::Div0));

        // Cleared slot is a dangling reference
        slot.borrow_mut().take();
        assert_eq!(node.evaluate(&empty()), Err(CellError::Ref));
        assert_eq!(node.build_expression(), "#REF!");
    }

    #[test]
    fn test_left_error_wins() {
        let mut refs = CellRefCache::new();
        let a1 = Node::Ref(refs.get_or_insert(Position::parse("A1").unwrap()));
        let b1 = Node::Ref(refs.get_or_insert(Position::parse("B1").unwrap()));
        let sum = Node::binary(BinaryOp::Add, a1, b1);

        let source = MapSource::new(&[
            ("A1", CellValue::Error(CellError::Value)),
            ("B1", CellValue::Error(CellError::Div0)),
        ]);
        assert_eq!(sum.evaluate(&source), Err(CellError::Value));
    }

    #[test]
    fn test_parens_dropped_around_leaves() {
        let lit = Node::parens(Node::Literal("1".into()));
        assert_eq!(lit, Node::Literal("1".into()));

        let nested = Node::parens(Node::parens(build_binary(BinaryOp::Add, "1", "2")));
        assert_eq!(nested.build_expression(), "(1+2)");
    }

    #[test]
    fn test_parens_under_unary() {
        let kept = Node::unary(
            UnaryOp::Minus,
            Node::parens(build_binary(BinaryOp::Add, "1", "2")),
        );
        assert_eq!(kept.build_expression(), "-(1+2)");

        let dropped = Node::unary(
            UnaryOp::Minus,
            Node::parens(build_binary(BinaryOp::Mul, "1", "2")),
        );
        assert_eq!(dropped.build_expression(), "-1*2");
    }

    #[test]
    fn test_parens_under_binary() {
        let cases = [
            (BinaryOp::Add, BinaryOp::Add, false, "1+2+3"),
            (BinaryOp::Add, BinaryOp::Mul, false, "1*2+3"),
            (BinaryOp::Sub, BinaryOp::Add, false, "1+2-3"),
            (BinaryOp::Sub, BinaryOp::Sub, true, "3-(1-2)"),
            (BinaryOp::Sub, BinaryOp::Mul, true, "3-1*2"),
            (BinaryOp::Mul, BinaryOp::Add, false, "(1+2)*3"),
            (BinaryOp::Mul, BinaryOp::Div, false, "1/2*3"),
            (BinaryOp::Div, BinaryOp::Sub, false, "(1-2)/3"),
            (BinaryOp::Div, BinaryOp::Mul, true, "3/(1*2)"),
            (BinaryOp::Div, BinaryOp::Div, false, "1/2/3"),
        ];

        for (parent, child, child_on_right, expected) in cases {
            let inner = Node::parens(build_binary(child, "1", "2"));
            let outer = Node::Literal("3".into());
            let node = if child_on_right {
                Node::binary(parent, outer, inner)
            } else {
                Node::binary(parent, inner, outer)
            };
            assert_eq!(node.build_expression(), expected, "{:?}/{:?}", parent, child);
        }
    }

    #[test]
    fn test_builder_post_order() {
        // 1+2*3 arrives as: 1 2 3 * +
        let mut builder = TreeBuilder::new();
        builder.add_literal("1");
        builder.add_literal("2");
        builder.add_literal("3");
        builder.add_binary(BinaryOp::Mul);
        builder.add_binary(BinaryOp::Add);

        let (root, _) = builder.build();
        assert_eq!(root.build_expression(), "1+2*3");
        assert_eq!(root.evaluate(&empty()), Ok(7.0));
    }

    #[test]
    fn test_builder_shares_slots() {
        let mut builder = TreeBuilder::new();
        builder.add_cell("A1").unwrap();
        builder.add_cell("A1").unwrap();
        builder.add_binary(BinaryOp::Add);

        let (root, refs) = builder.build();
        assert_eq!(refs.referenced_cells().len(), 1);

        let source = MapSource::new(&[("A1", CellValue::Number(3.0))]);
        assert_eq!(root.evaluate(&source), Ok(6.0));
    }

    #[test]
    fn test_builder_rejects_bad_cell_names() {
        let mut builder = TreeBuilder::new();
        assert!(builder.add_cell("A0").is_err());
        assert!(builder.add_cell("ZZZ1").is_err());
    }
}
