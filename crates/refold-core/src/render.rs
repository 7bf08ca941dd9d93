//! Functional renderer.
//!
//! Serializes a [`FuncDef`] bottom-up into `let ... in` source text. The
//! renderer owns all per-render state — the optimization cursor, the
//! cross-scope constant table, the loop-name counter, the collected free
//! reads — so independent blocks can be rendered concurrently with one
//! `Renderer` each.
//!
//! The load-bearing invariant: the cursor advances once per `let` binding
//! visited, in exactly the order the analyzer assigned sequence indices
//! (pruned of conditional/loop barriers). Elision decisions are looked up
//! by cursor position, so any reordering between analysis and rendering
//! would misapply them.

use std::collections::HashMap;
use std::fmt::Write;

use crate::classify::UsageSets;
use crate::config::PassConfig;
use crate::func::{FuncDef, FunctionPrototype, Term};

/// Which elision applies at a cursor position. Dead-store elision wins when
/// both do — the statement is dropped either way, and a dead value has no
/// later use sites to inline into.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Elision {
    DeadStore,
    Constant,
}

/// Bindings elided within one scope: name → rendered right-hand side.
/// Used to substitute values into the scope's result tuples.
#[derive(Debug, Default)]
struct Scope {
    subst: HashMap<String, String>,
}

/// One-shot renderer for a single function definition.
pub struct Renderer<'a> {
    config: &'a PassConfig,
    /// Eligible cursor positions, in the pruned (bindings-only) numbering.
    sets: &'a UsageSets,
    cursor: usize,
    loop_names: usize,
    /// Cross-scope constant table: inlined literals visible to nested
    /// scopes. Entries recorded inside a branch are reverted when the
    /// branch closes — a conditional assignment must not leak outward.
    consts: HashMap<String, String>,
    /// Names the rendered body reads, first-occurrence order. Becomes the
    /// function's input list.
    free_reads: Vec<String>,
    /// Loop counters currently in scope; local to their recursive function,
    /// never free.
    shadowed: Vec<String>,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a PassConfig, sets: &'a UsageSets) -> Self {
        Self {
            config,
            sets,
            cursor: 0,
            loop_names: 0,
            consts: HashMap::new(),
            free_reads: Vec::new(),
            shadowed: Vec::new(),
        }
    }

    /// Render the function to its textual form.
    pub fn render(mut self, def: &FuncDef) -> String {
        let mut scope = Scope::default();
        let mut body = String::new();
        let collapsed = self.items(&def.items, &mut body, 1, true, true, &mut scope);
        if !collapsed {
            let _ = write!(body, "\t({})", self.tuple(&def.outputs, Some(&scope)));
        }
        let proto = FunctionPrototype {
            name: "block_function".to_string(),
            inputs: self.free_reads.clone(),
            outputs: def.outputs.clone(),
        };
        format!("{proto} =\n{body}")
    }

    /// Render a statement list. `active` is false inside loop bodies, where
    /// the cursor stands still and nothing is elided. Returns true when a
    /// sole top-level conditional collapsed into the result expression.
    fn items(
        &mut self,
        items: &[Term],
        out: &mut String,
        depth: usize,
        active: bool,
        top: bool,
        scope: &mut Scope,
    ) -> bool {
        let sole = items.len() == 1;
        for term in items {
            match term {
                Term::Let { .. } => self.let_binding(term, out, depth, active, scope),
                Term::If { .. } => {
                    if top && sole && active && self.ternary(term, out, depth, scope) {
                        return true;
                    }
                    self.conditional(term, out, depth, active);
                }
                Term::LetRec { .. } => self.letrec(term, out, depth),
                // Side-effecting calls (and any stray expression in
                // statement position) are sequenced under a throwaway
                // binding.
                other => {
                    let text = self.expr(other, true);
                    let _ = writeln!(out, "{}let _ = {} in ", tabs(depth), text);
                }
            }
        }
        false
    }

    /// Emit or elide one `let` binding.
    fn let_binding(
        &mut self,
        term: &Term,
        out: &mut String,
        depth: usize,
        active: bool,
        scope: &mut Scope,
    ) {
        let Term::Let { lhs, rhs } = term else {
            return;
        };
        let elision = if active { self.decide(self.cursor) } else { None };
        if active {
            self.cursor += 1;
        }
        match elision {
            Some(kind) => {
                let name = binding_name(lhs);
                let value = self.substitution_text(rhs.as_deref());
                if kind == Elision::Constant {
                    self.consts.insert(name.clone(), value.clone());
                }
                scope.subst.insert(name, value);
            }
            None => {
                // The right-hand side still sees the previous value of the
                // bound name; the emitted binding then shadows any earlier
                // substitution for it.
                let rhs_text = match rhs {
                    Some(term) => self.expr(term, true),
                    None => "()".to_string(),
                };
                let lhs_text = self.lvalue(lhs);
                let name = binding_name(lhs);
                scope.subst.remove(&name);
                self.consts.remove(&name);
                let _ = writeln!(out, "{}let {} = {} in ", tabs(depth), lhs_text, rhs_text);
            }
        }
    }

    /// The elision for a cursor position, honoring the pass config.
    fn decide(&self, position: usize) -> Option<Elision> {
        if self.config.dead_store_elision && self.sets.dead.contains(&position) {
            Some(Elision::DeadStore)
        } else if self.config.constant_inlining && self.sets.consts.contains(&position) {
            Some(Elision::Constant)
        } else {
            None
        }
    }

    /// Try the ternary collapse: a sole single-branch conditional whose
    /// then-branch elides completely renders as one expression — the
    /// then-arm the substituted argument tuple, the else-arm the arguments
    /// unchanged. Returns false (emitting nothing) when the shape does not
    /// qualify.
    fn ternary(&mut self, term: &Term, out: &mut String, depth: usize, _scope: &mut Scope) -> bool {
        let Term::If {
            cond,
            then,
            otherwise: None,
            in_args,
            ..
        } = term
        else {
            return false;
        };
        let all_lets = then.iter().all(|t| matches!(t, Term::Let { .. }));
        if !all_lets {
            return false;
        }
        let all_elided = (0..then.len()).all(|k| self.decide(self.cursor + k).is_some());
        if !all_elided {
            return false;
        }

        let cond_text = self.expr(cond, true);
        let saved = self.consts.clone();
        let mut branch = Scope::default();
        let mut sink = String::new();
        self.items(then, &mut sink, depth, true, false, &mut branch);
        self.consts = saved;
        let _ = write!(
            out,
            "{}if {} then ({}) else ({})",
            tabs(depth),
            cond_text,
            self.tuple(in_args, Some(&branch)),
            self.tuple(in_args, None),
        );
        true
    }

    /// Render a conditional in full join form:
    /// `let (in) = if cond then <then> else <else> in (out)`.
    fn conditional(&mut self, term: &Term, out: &mut String, depth: usize, active: bool) {
        let Term::If {
            cond,
            then,
            otherwise,
            in_args,
            out_args,
        } = term
        else {
            return;
        };
        let cond_text = self.expr(cond, true);
        let _ = writeln!(
            out,
            "{}let ({}) = if {} then",
            tabs(depth),
            in_args.join(", "),
            cond_text
        );

        let saved = self.consts.clone();
        let mut then_scope = Scope::default();
        self.items(then, out, depth + 1, active, false, &mut then_scope);
        let _ = writeln!(out, "{}({})", tabs(depth + 1), self.tuple(in_args, Some(&then_scope)));
        self.consts = saved;

        let _ = writeln!(out, "{}else", tabs(depth));
        match otherwise {
            Some(branch) => {
                let saved = self.consts.clone();
                let mut else_scope = Scope::default();
                self.items(branch, out, depth + 1, active, false, &mut else_scope);
                let _ = writeln!(
                    out,
                    "{}({})",
                    tabs(depth + 1),
                    self.tuple(in_args, Some(&else_scope))
                );
                self.consts = saved;
            }
            None => {
                let _ = writeln!(out, "{}({})", tabs(depth + 1), self.tuple(in_args, None));
            }
        }
        let _ = writeln!(out, "{}in ({})", tabs(depth), out_args.join(", "));
    }

    /// Render a loop as a named recursive function. The body is opaque to
    /// the optimizer: the cursor stands still and every binding is emitted.
    fn letrec(&mut self, term: &Term, out: &mut String, depth: usize) {
        let Term::LetRec {
            init,
            args,
            cond,
            step,
            body,
        } = term
        else {
            return;
        };
        let name = format!("loop{}", self.loop_names);
        self.loop_names += 1;

        // The counter lives only inside the generated function.
        let counter = init.as_deref().and_then(|t| match t {
            Term::Let { lhs, .. } => Some(binding_name(lhs)),
            _ => None,
        });
        if let Some(counter) = &counter {
            self.shadowed.push(counter.clone());
        }

        let arg_list = args.join(", ");
        let cond_text = match cond {
            Some(term) => self.expr(term, true),
            None => "true".to_string(),
        };
        let _ = writeln!(
            out,
            "{}let rec {}({}) = if {} then",
            tabs(depth),
            name,
            arg_list,
            cond_text
        );

        let mut loop_scope = Scope::default();
        self.items(body, out, depth + 1, false, false, &mut loop_scope);
        if let Some(step) = step {
            self.let_binding(step, out, depth + 1, false, &mut loop_scope);
        }
        let _ = writeln!(out, "{}{}({})", tabs(depth + 1), name, arg_list);
        let _ = writeln!(out, "{}else", tabs(depth));
        let _ = writeln!(out, "{}({})", tabs(depth + 1), arg_list);
        let _ = writeln!(out, "{}in ", tabs(depth));

        if let Some(init) = init {
            self.let_binding(init, out, depth, false, &mut loop_scope);
        }
        let _ = writeln!(out, "{}let ({}) = {}({}) in ", tabs(depth), arg_list, name, arg_list);

        if counter.is_some() {
            self.shadowed.pop();
        }
    }

    /// Render an expression. Identifier reads render their inlined literal
    /// when the cross-scope constant table has one; otherwise the name is
    /// rendered and, when `collect` is set, recorded as a free read.
    fn expr(&mut self, term: &Term, collect: bool) -> String {
        match term {
            Term::Literal(value) => value.to_string(),
            Term::Var(name) => {
                if let Some(value) = self.consts.get(name) {
                    return value.clone();
                }
                if collect {
                    self.note_read(name);
                }
                name.clone()
            }
            Term::Binary { op, left, right } => {
                format!("{} {} {}", self.expr(left, collect), op, self.expr(right, collect))
            }
            Term::Index { base, subscript } => {
                format!(
                    "{}[{}]",
                    self.expr(base, collect),
                    self.expr(subscript, collect)
                )
            }
            Term::Call { name, args } => {
                let args: Vec<String> = args.iter().map(|a| self.expr(a, collect)).collect();
                format!("{}({})", name, args.join(", "))
            }
            Term::Tuple(items) => {
                let items: Vec<String> = items.iter().map(|t| self.expr(t, collect)).collect();
                format!("({})", items.join(", "))
            }
            // Binding forms never appear in expression position.
            Term::Let { .. } | Term::If { .. } | Term::LetRec { .. } => "()".to_string(),
        }
    }

    /// Render a binding position: always the raw name, never a
    /// substitution. Subscripts are ordinary reads.
    fn lvalue(&mut self, term: &Term) -> String {
        match term {
            Term::Var(name) => name.clone(),
            Term::Index { base, subscript } => {
                let base = match base.as_ref() {
                    Term::Var(name) => name.clone(),
                    other => self.expr(other, true),
                };
                format!("{}[{}]", base, self.expr(subscript, true))
            }
            other => self.expr(other, false),
        }
    }

    /// The text an elided binding substitutes at its use sites. Composite
    /// expressions are parenthesized so inlining cannot change precedence.
    fn substitution_text(&mut self, rhs: Option<&Term>) -> String {
        match rhs {
            None => "()".to_string(),
            Some(term @ Term::Binary { .. }) => format!("({})", self.expr(term, false)),
            Some(term) => self.expr(term, false),
        }
    }

    /// Render an argument tuple, substituting elided values: the local
    /// scope's bindings first, then the cross-scope constant table. Tuple
    /// re-emissions are threading, not reads — nothing is collected.
    fn tuple(&self, names: &[String], scope: Option<&Scope>) -> String {
        names
            .iter()
            .map(|name| {
                scope
                    .and_then(|s| s.subst.get(name))
                    .or_else(|| self.consts.get(name))
                    .cloned()
                    .unwrap_or_else(|| name.clone())
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn note_read(&mut self, name: &str) {
        if self.shadowed.iter().any(|n| n == name) {
            return;
        }
        if !self.free_reads.iter().any(|n| n == name) {
            self.free_reads.push(name.to_string());
        }
    }
}

fn tabs(depth: usize) -> String {
    "\t".repeat(depth)
}

/// The name a `let` left-hand side binds.
fn binding_name(lhs: &Term) -> String {
    match lhs {
        Term::Var(name) => name.clone(),
        Term::Index { base, .. } => match base.as_ref() {
            Term::Var(name) => name.clone(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}
