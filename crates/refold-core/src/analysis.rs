//! Dataflow analysis over an imperative statement sequence.
//!
//! One pass over a block produces a [`BlockAnalysis`]: the ordered event
//! record the classifier and renderer both key off, the accumulated
//! per-variable reference info, and the read/written name sets used to form
//! the enclosing function's signature. The walk is a pure fold — callers
//! get an immutable result, and analyzing the same block twice yields the
//! same record.

use std::collections::HashMap;

use crate::ast::{Literal, Node};
use crate::error::CoreError;

/// Reference info for one right-hand side: which identifiers and array
/// bases it reads, and which literal constants it mentions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefInfo {
    pub ids: Vec<String>,
    pub array_bases: Vec<String>,
    pub constants: Vec<Literal>,
}

impl RefInfo {
    /// Build reference info by recursive descent over an expression.
    ///
    /// Statement nodes reached in expression position contribute nothing —
    /// the lookup silently yields empty info rather than failing, matching
    /// the unknown-dependency policy. Malformed literals are the one fault.
    pub fn of(expr: &Node) -> Result<Self, CoreError> {
        let mut info = RefInfo::default();
        info.collect(expr)?;
        Ok(info)
    }

    fn collect(&mut self, expr: &Node) -> Result<(), CoreError> {
        match expr {
            Node::Constant(value) => {
                self.constants.push(Literal::from_value(value)?);
            }
            Node::Id(name) => {
                self.ids.push(name.clone());
            }
            Node::BinaryOp { left, right, .. } => {
                self.collect(left)?;
                self.collect(right)?;
            }
            Node::ArrayRef { base, subscript } => {
                self.collect(subscript)?;
                match base.as_ref() {
                    Node::Id(name) => self.array_bases.push(name.clone()),
                    other => self.collect(other)?,
                }
            }
            Node::FuncCall { args, .. } => {
                for arg in args {
                    self.collect(arg)?;
                }
            }
            Node::ExprList(items) => {
                for item in items {
                    self.collect(item)?;
                }
            }
            // Statement nodes in expression position: no known dependency.
            _ => {}
        }
        Ok(())
    }

    /// Append another record's contents to this one.
    pub fn merge(&mut self, other: RefInfo) {
        self.ids.extend(other.ids);
        self.array_bases.extend(other.array_bases);
        self.constants.extend(other.constants);
    }

    /// Does this record read `name`, directly or as an array base?
    pub fn mentions(&self, name: &str) -> bool {
        self.ids.iter().any(|n| n == name) || self.array_bases.iter().any(|n| n == name)
    }

    /// True when the expression reads no variables at all — a literal or a
    /// literal-only tree.
    pub fn is_literal_only(&self) -> bool {
        self.ids.is_empty() && self.array_bases.is_empty()
    }
}

/// One entry of the ordered dataflow record.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A declaration or assignment binding `name`. `depth` is 0 for direct
    /// children of the top-level block and grows inside if-branches.
    Binding {
        name: String,
        dep: Option<RefInfo>,
        depth: usize,
    },
    /// A bare identifier read in conditional position. Acts as a barrier:
    /// nothing before it may be elided as a dead store.
    Cond { name: String },
    /// A loop construct. The body is opaque to the classifier; `rebinds`
    /// lists the names the loop mutates.
    Loop { rebinds: Vec<String> },
}

impl Event {
    pub fn is_binding(&self) -> bool {
        matches!(self, Event::Binding { .. })
    }

    /// Does this event (re)bind `name`?
    pub fn rebinds(&self, name: &str) -> bool {
        match self {
            Event::Binding { name: n, .. } => n == name,
            Event::Loop { rebinds } => rebinds.iter().any(|n| n == name),
            Event::Cond { .. } => false,
        }
    }
}

/// The analysis record for one block.
#[derive(Debug, Clone, Default)]
pub struct BlockAnalysis {
    /// Ordered event record, the classifier's and renderer's shared key.
    pub events: Vec<Event>,
    /// Accumulated reference info per written name — every occurrence is
    /// appended, so a variable assigned twice has two entries.
    pub writes: HashMap<String, Vec<RefInfo>>,
    /// Written names in first-write order.
    pub written: Vec<String>,
    /// Read names in first-read order (loop counters excluded — their
    /// lifetime is local to the generated recursive function).
    pub reads: Vec<String>,
    /// Names of a trailing bare `Id`/`ExprList` statement, consumed as the
    /// block's return marker.
    pub returns: Vec<String>,
}

impl BlockAnalysis {
    fn note_read(&mut self, name: &str) {
        if !self.reads.iter().any(|n| n == name) {
            self.reads.push(name.to_string());
        }
    }

    fn note_reads(&mut self, info: &RefInfo, skip: Option<&str>) {
        for name in info.ids.iter().chain(info.array_bases.iter()) {
            if Some(name.as_str()) != skip {
                self.note_read(name);
            }
        }
    }

    fn note_write(&mut self, name: &str, info: RefInfo) {
        self.writes
            .entry(name.to_string())
            .or_default()
            .push(info);
        if !self.written.iter().any(|n| n == name) {
            self.written.push(name.to_string());
        }
    }

    /// The enclosing function's output args: the written names the return
    /// marker mentions, or every written name when there is no marker.
    pub fn output_args(&self) -> Vec<String> {
        if self.returns.is_empty() {
            self.written.clone()
        } else {
            self.returns
                .iter()
                .filter(|name| self.written.iter().any(|w| w == *name))
                .cloned()
                .collect()
        }
    }

    /// Every variable this block touches: written names first, then reads
    /// not already present. Used for conditional join signatures.
    pub fn referenced(&self) -> Vec<String> {
        let mut names = self.written.clone();
        for name in &self.reads {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Analyze a top-level block's statement sequence.
pub fn analyze_block(items: &[Node]) -> Result<BlockAnalysis, CoreError> {
    let mut analysis = BlockAnalysis::default();
    walk_items(items, 0, true, &mut analysis)?;
    Ok(analysis)
}

/// Analyze a nested scope (loop body, branch) as its own record. Trailing
/// bare identifiers are not return markers here.
pub fn analyze_scope(items: &[Node]) -> Result<BlockAnalysis, CoreError> {
    let mut analysis = BlockAnalysis::default();
    walk_items(items, 0, false, &mut analysis)?;
    Ok(analysis)
}

fn walk_items(
    items: &[Node],
    depth: usize,
    top: bool,
    acc: &mut BlockAnalysis,
) -> Result<(), CoreError> {
    for (index, node) in items.iter().enumerate() {
        let last = top && index + 1 == items.len();
        match node {
            Node::Decl { name, init } => {
                let dep = match init {
                    Some(expr) => Some(RefInfo::of(expr)?),
                    None => None,
                };
                if let Some(info) = &dep {
                    acc.note_reads(info, None);
                }
                acc.note_write(name, dep.clone().unwrap_or_default());
                acc.events.push(Event::Binding {
                    name: name.clone(),
                    dep,
                    depth,
                });
            }
            Node::Assignment { lvalue, rvalue } => {
                // Unwritable lvalues produce no event; the translator drops
                // the statement with a diagnostic, keeping the two in step.
                let Some(name) = lvalue.binding_name() else {
                    continue;
                };
                let name = name.to_string();
                let mut dep = RefInfo::of(rvalue)?;
                if let Node::ArrayRef { subscript, .. } = lvalue.as_ref() {
                    dep.merge(RefInfo::of(subscript)?);
                }
                acc.note_reads(&dep, None);
                acc.note_write(&name, dep.clone());
                acc.events.push(Event::Binding {
                    name,
                    dep: Some(dep),
                    depth,
                });
            }
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                let cond_info = RefInfo::of(cond)?;
                acc.note_reads(&cond_info, None);
                for name in cond_info.ids.iter().chain(cond_info.array_bases.iter()) {
                    acc.events.push(Event::Cond { name: name.clone() });
                }
                walk_items(then.as_block_items(), depth + 1, false, acc)?;
                if let Some(branch) = otherwise {
                    walk_items(branch.as_block_items(), depth + 1, false, acc)?;
                }
            }
            Node::For {
                init,
                cond,
                next,
                body,
            } => {
                let counter = loop_counter(init.as_deref());
                let rebinds = walk_loop(
                    counter.as_deref(),
                    init.as_deref(),
                    cond.as_deref(),
                    next.as_deref(),
                    body,
                    acc,
                )?;
                acc.events.push(Event::Loop { rebinds });
            }
            Node::While { cond, body } => {
                let rebinds = walk_loop(None, None, Some(cond.as_ref()), None, body, acc)?;
                acc.events.push(Event::Loop { rebinds });
            }
            Node::Id(name) if last => {
                acc.returns.push(name.clone());
            }
            Node::ExprList(exprs) if last => {
                for expr in exprs {
                    if let Node::Id(name) = expr {
                        acc.returns.push(name.clone());
                    }
                }
            }
            Node::FuncCall { args, .. } => {
                for arg in args {
                    let info = RefInfo::of(arg)?;
                    acc.note_reads(&info, None);
                }
            }
            // Nested blocks and bare expressions in statement position are
            // unsupported; they contribute nothing to the record and the
            // translator drops them with a diagnostic.
            _ => {}
        }
    }
    Ok(())
}

/// The counter variable a `for` initializer binds, if any.
pub(crate) fn loop_counter(init: Option<&Node>) -> Option<String> {
    match init {
        Some(Node::Decl { name, .. }) => Some(name.clone()),
        Some(Node::Assignment { lvalue, .. }) => {
            lvalue.binding_name().map(|n| n.to_string())
        }
        _ => None,
    }
}

/// Fold a loop's header and body into the enclosing record.
///
/// The counter never reaches the enclosing scope; the body's declarations
/// and assignments count as writes of the enclosing scope but produce no
/// events of their own — the loop is one opaque barrier. Returns the names
/// the loop rebinds.
fn walk_loop(
    counter: Option<&str>,
    init: Option<&Node>,
    cond: Option<&Node>,
    next: Option<&Node>,
    body: &Node,
    acc: &mut BlockAnalysis,
) -> Result<Vec<String>, CoreError> {
    // Initializer right-hand side reads come from the enclosing scope.
    if let Some(init) = init {
        let info = match init {
            Node::Decl {
                init: Some(expr), ..
            } => RefInfo::of(expr)?,
            Node::Assignment { rvalue, .. } => RefInfo::of(rvalue)?,
            other => RefInfo::of(other)?,
        };
        acc.note_reads(&info, counter);
    }
    if let Some(cond) = cond {
        acc.note_reads(&RefInfo::of(cond)?, counter);
    }

    let mut rebinds = Vec::new();
    if let Some(next) = next {
        match next {
            Node::Assignment { lvalue, rvalue } => {
                acc.note_reads(&RefInfo::of(rvalue)?, counter);
                if let Some(name) = lvalue.binding_name() {
                    if Some(name) != counter {
                        acc.note_write(name, RefInfo::of(rvalue)?);
                        rebinds.push(name.to_string());
                    }
                }
            }
            other => acc.note_reads(&RefInfo::of(other)?, counter),
        }
    }

    let body_analysis = analyze_scope(body.as_block_items())?;
    for name in &body_analysis.written {
        if Some(name.as_str()) == counter {
            continue;
        }
        for info in body_analysis.writes.get(name).into_iter().flatten() {
            acc.note_write(name, info.clone());
        }
        if !rebinds.iter().any(|n| n == name) {
            rebinds.push(name.clone());
        }
    }
    for name in &body_analysis.reads {
        if Some(name.as_str()) != counter {
            acc.note_read(name);
        }
    }
    Ok(rebinds)
}
