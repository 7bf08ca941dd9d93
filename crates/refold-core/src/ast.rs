//! Imperative input AST.
//!
//! This is the boundary type: an external parser produces a C-like AST and
//! hands it to the pipeline as JSON. The core never sees source text. The
//! enum is deliberately exhaustive — every construct the pipeline can meet
//! has a variant, and anything the translator has no mapping for is dropped
//! with a diagnostic rather than failing the run.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A node of the imperative source AST.
///
/// Statement-position variants: `Decl`, `Assignment`, `If`, `For`, `While`,
/// `Block`, plus a trailing bare `Id`/`ExprList` acting as the block's
/// return marker. Expression-position variants: `Constant`, `Id`,
/// `BinaryOp`, `ArrayRef`, `FuncCall`, `ExprList`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Literal constant. The payload is the raw JSON scalar as produced by
    /// the external parser; it is validated into a [`Literal`] on first use.
    Constant(serde_json::Value),
    /// Identifier reference.
    Id(String),
    /// `left op right`. The operator is the parser's token text (`+`, `<`,
    /// `&&`, ...); the pipeline carries it through without interpretation.
    BinaryOp {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `base[subscript]`.
    ArrayRef {
        base: Box<Node>,
        subscript: Box<Node>,
    },
    /// `lvalue = rvalue;` — lvalue is an `Id` or an `ArrayRef` with an `Id`
    /// base; anything else is an unsupported statement.
    Assignment { lvalue: Box<Node>, rvalue: Box<Node> },
    /// `int name = init;` — the initializer may be absent (`int name;`).
    Decl {
        name: String,
        init: Option<Box<Node>>,
    },
    /// `if (cond) { then } else { otherwise }`.
    If {
        cond: Box<Node>,
        then: Box<Node>,
        #[serde(default)]
        otherwise: Option<Box<Node>>,
    },
    /// `for (init; cond; next) { body }` — all three header slots optional.
    For {
        #[serde(default)]
        init: Option<Box<Node>>,
        #[serde(default)]
        cond: Option<Box<Node>>,
        #[serde(default)]
        next: Option<Box<Node>>,
        body: Box<Node>,
    },
    /// `while (cond) { body }`.
    While { cond: Box<Node>, body: Box<Node> },
    /// `name(args...)`.
    FuncCall { name: Box<Node>, args: Vec<Node> },
    /// A `{ ... }` statement sequence. One top-level block is one
    /// translation unit.
    Block(Vec<Node>),
    /// `(a, b, c)` — also covers array initializer lists and tuple returns.
    ExprList(Vec<Node>),
}

impl Node {
    /// The statement sequence of a block, or the node itself as a
    /// one-statement sequence.
    pub fn as_block_items(&self) -> &[Node] {
        match self {
            Node::Block(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// The bound name of an lvalue: the identifier itself, or the base of
    /// an array reference. `None` for anything that cannot be written to.
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            Node::Id(name) => Some(name.as_str()),
            Node::ArrayRef { base, .. } => match base.as_ref() {
                Node::Id(name) => Some(name.as_str()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A validated terminal literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Literal {
    /// Validate a raw JSON scalar into a terminal value.
    ///
    /// Arrays and objects in literal position mean the external parser
    /// produced a malformed AST; that is the one fatal fault in the
    /// pipeline.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CoreError> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(Literal::Null),
            Value::Bool(b) => Ok(Literal::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Literal::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Literal::Float(f))
                } else {
                    Err(CoreError::Value {
                        found: n.to_string(),
                    })
                }
            }
            Value::String(s) => Ok(Literal::Str(s.clone())),
            other => Err(CoreError::Value {
                found: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}
