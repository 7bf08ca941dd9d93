//! Imperative-to-functional AST translation.
//!
//! One imperative node maps to one functional term via an exhaustive match
//! over the node enum. Unsupported constructs never abort a run: the
//! statement is dropped, a [`Diagnostic`] records what happened, and the
//! caller treats the gap as "statement omitted" — best-effort degradation,
//! not an error. The one fatal fault is a malformed literal.

use crate::analysis::{analyze_scope, loop_counter};
use crate::ast::{Literal, Node};
use crate::error::CoreError;
use crate::func::Term;

/// A report about a construct the translator dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The node kind, e.g. `"Block"`.
    pub construct: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported {}: {}", self.construct, self.message)
    }
}

/// Translates one block's statements into functional terms, collecting
/// diagnostics for whatever it had to drop.
#[derive(Debug, Default)]
pub struct Translator {
    diagnostics: Vec<Diagnostic>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Translate a top-level block's statement sequence. A trailing bare
    /// `Id`/`ExprList` is the return marker — already folded into the
    /// output args by the analyzer, so it produces no term here.
    pub fn translate_block(&mut self, items: &[Node]) -> Result<Vec<Term>, CoreError> {
        self.translate_items(items, true)
    }

    fn translate_items(&mut self, items: &[Node], top: bool) -> Result<Vec<Term>, CoreError> {
        let mut terms = Vec::new();
        for (index, node) in items.iter().enumerate() {
            let last = top && index + 1 == items.len();
            if last && matches!(node, Node::Id(_) | Node::ExprList(_)) {
                continue;
            }
            if let Some(term) = self.translate_stmt(node)? {
                terms.push(term);
            }
        }
        Ok(terms)
    }

    /// Map one statement to one functional term, or `None` when the
    /// statement is dropped.
    pub fn translate_stmt(&mut self, node: &Node) -> Result<Option<Term>, CoreError> {
        match node {
            Node::Decl { name, init } => {
                let rhs = match init {
                    Some(expr) => Some(Box::new(self.translate_expr(expr)?)),
                    None => None,
                };
                Ok(Some(Term::Let {
                    lhs: Box::new(Term::Var(name.clone())),
                    rhs,
                }))
            }
            Node::Assignment { lvalue, rvalue } => {
                if lvalue.binding_name().is_none() {
                    self.drop_construct("Assignment", "lvalue is not a writable location");
                    return Ok(None);
                }
                let lhs = self.translate_expr(lvalue)?;
                let rhs = self.translate_expr(rvalue)?;
                Ok(Some(Term::Let {
                    lhs: Box::new(lhs),
                    rhs: Some(Box::new(rhs)),
                }))
            }
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                // Each branch is analyzed on its own: the join's formal
                // parameters are exactly the variables either branch reads
                // or writes, so both branches can be read as functions of
                // the same signature.
                let then_analysis = analyze_scope(then.as_block_items())?;
                let mut in_args = then_analysis.referenced();
                let mut out_args = then_analysis.written.clone();

                let else_terms = match otherwise {
                    Some(branch) => {
                        let else_analysis = analyze_scope(branch.as_block_items())?;
                        for name in else_analysis.referenced() {
                            if !in_args.iter().any(|n| *n == name) {
                                in_args.push(name);
                            }
                        }
                        for name in &else_analysis.written {
                            if !out_args.iter().any(|n| n == name) {
                                out_args.push(name.clone());
                            }
                        }
                        Some(self.translate_items(branch.as_block_items(), false)?)
                    }
                    None => None,
                };

                Ok(Some(Term::If {
                    cond: Box::new(self.translate_expr(cond)?),
                    then: self.translate_items(then.as_block_items(), false)?,
                    otherwise: else_terms,
                    in_args,
                    out_args,
                }))
            }
            Node::For {
                init,
                cond,
                next,
                body,
            } => {
                let counter = loop_counter(init.as_deref());
                let args = closure_args(counter.as_deref(), body)?;
                let init_term = match init {
                    Some(stmt) => self.translate_stmt(stmt)?.map(Box::new),
                    None => None,
                };
                let step = match next {
                    Some(stmt) => self.translate_stmt(stmt)?.map(Box::new),
                    None => None,
                };
                let cond_term = match cond {
                    Some(expr) => Some(Box::new(self.translate_expr(expr)?)),
                    None => None,
                };
                Ok(Some(Term::LetRec {
                    init: init_term,
                    args,
                    cond: cond_term,
                    step,
                    body: self.translate_items(body.as_block_items(), false)?,
                }))
            }
            Node::While { cond, body } => Ok(Some(Term::LetRec {
                init: None,
                args: closure_args(None, body)?,
                cond: Some(Box::new(self.translate_expr(cond)?)),
                step: None,
                body: self.translate_items(body.as_block_items(), false)?,
            })),
            Node::FuncCall { .. } => {
                let call = self.translate_expr(node)?;
                Ok(Some(call))
            }
            Node::Block(_) => {
                self.drop_construct("Block", "nested block in statement position");
                Ok(None)
            }
            Node::Constant(_) | Node::Id(_) | Node::BinaryOp { .. } | Node::ArrayRef { .. }
            | Node::ExprList(_) => {
                self.drop_construct(kind_name(node), "bare expression in statement position");
                Ok(None)
            }
        }
    }

    /// Map one expression node to a functional term. Statement nodes in
    /// expression position degrade to the unit value with a diagnostic so
    /// the enclosing statement keeps its place in the record.
    pub fn translate_expr(&mut self, node: &Node) -> Result<Term, CoreError> {
        match node {
            Node::Constant(value) => Ok(Term::Literal(Literal::from_value(value)?)),
            Node::Id(name) => Ok(Term::Var(name.clone())),
            Node::BinaryOp { op, left, right } => Ok(Term::Binary {
                op: op.clone(),
                left: Box::new(self.translate_expr(left)?),
                right: Box::new(self.translate_expr(right)?),
            }),
            Node::ArrayRef { base, subscript } => Ok(Term::Index {
                base: Box::new(self.translate_expr(base)?),
                subscript: Box::new(self.translate_expr(subscript)?),
            }),
            Node::FuncCall { name, args } => {
                let mut call_args = Vec::with_capacity(args.len());
                for arg in args {
                    call_args.push(self.translate_expr(arg)?);
                }
                match name.as_ref() {
                    Node::Id(name) => Ok(Term::Call {
                        name: name.clone(),
                        args: call_args,
                    }),
                    other => {
                        self.drop_construct(kind_name(other), "call target is not a name");
                        Ok(Term::Tuple(call_args))
                    }
                }
            }
            Node::ExprList(items) => {
                let mut terms = Vec::with_capacity(items.len());
                for item in items {
                    terms.push(self.translate_expr(item)?);
                }
                Ok(Term::Tuple(terms))
            }
            other => {
                self.drop_construct(kind_name(other), "statement in expression position");
                Ok(Term::Tuple(Vec::new()))
            }
        }
    }

    fn drop_construct(&mut self, construct: &str, message: &str) {
        self.diagnostics.push(Diagnostic {
            construct: construct.to_string(),
            message: message.to_string(),
        });
    }
}

/// The argument list a generated recursive function closes over: the loop
/// counter first, then every name the body mutates, so each recursive call
/// can thread the updated state.
fn closure_args(counter: Option<&str>, body: &Node) -> Result<Vec<String>, CoreError> {
    let mut args = Vec::new();
    if let Some(counter) = counter {
        args.push(counter.to_string());
    }
    let body_analysis = analyze_scope(body.as_block_items())?;
    for name in body_analysis.written {
        if !args.iter().any(|n| *n == name) {
            args.push(name);
        }
    }
    Ok(args)
}

fn kind_name(node: &Node) -> &'static str {
    match node {
        Node::Constant(_) => "Constant",
        Node::Id(_) => "Id",
        Node::BinaryOp { .. } => "BinaryOp",
        Node::ArrayRef { .. } => "ArrayRef",
        Node::Assignment { .. } => "Assignment",
        Node::Decl { .. } => "Decl",
        Node::If { .. } => "If",
        Node::For { .. } => "For",
        Node::While { .. } => "While",
        Node::FuncCall { .. } => "FuncCall",
        Node::Block(_) => "Block",
        Node::ExprList(_) => "ExprList",
    }
}
