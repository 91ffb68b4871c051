//! Single-pass traversal dispatching nodes to subscribed matchers.
//!
//! The walk starts at the unit's top-level declarations and descends into
//! scope members, function parameters and bodies, statements, expressions,
//! lambda closure types and friend definitions. Compiler-produced template
//! instantiations are walked after their template and only reported to
//! matchers that asked for them.

use std::collections::HashSet;

use ccguard_ast::{DeclId, DeclKind, ExprId, ExprKind, FriendTarget, StmtId, StmtKind, TranslationUnit};

use crate::pattern::{Matcher, MatchResult, Node};

/// Walks a translation unit and reports every node a matcher subscribes to.
pub struct MatchFinder<'m> {
    matchers: &'m [(usize, Matcher)],
}

impl<'m> MatchFinder<'m> {
    /// Creates a finder over `(owner, matcher)` pairs; `owner` is passed back
    /// with every match.
    pub fn new(matchers: &'m [(usize, Matcher)]) -> Self {
        Self { matchers }
    }

    /// Walks `tu`, calling `on_match(owner, result)` for every match.
    ///
    /// Returns the number of matches delivered.
    pub fn run<F>(&self, tu: &TranslationUnit, on_match: F) -> usize
    where
        F: FnMut(usize, &MatchResult<'_>),
    {
        let mut walker = Walker {
            tu,
            matchers: self.matchers,
            stack: Vec::new(),
            visited: HashSet::new(),
            instantiation_depth: 0,
            on_match,
            delivered: 0,
        };
        for &id in &tu.top_level {
            walker.visit_decl(id);
        }
        walker.delivered
    }
}

struct Walker<'a, F> {
    tu: &'a TranslationUnit,
    matchers: &'a [(usize, Matcher)],
    stack: Vec<Node>,
    visited: HashSet<DeclId>,
    instantiation_depth: u32,
    on_match: F,
    delivered: usize,
}

impl<F> Walker<'_, F>
where
    F: FnMut(usize, &MatchResult<'_>),
{
    fn dispatch(&mut self, node: Node) {
        let in_instantiation = self.instantiation_depth > 0;
        for (owner, matcher) in self.matchers {
            if in_instantiation && !matcher.in_instantiations {
                continue;
            }
            if !matcher.pattern.matches(self.tu, node) {
                continue;
            }
            let result = MatchResult {
                key: matcher.key,
                node,
                ancestors: &self.stack,
                in_instantiation,
            };
            (self.on_match)(*owner, &result);
            self.delivered += 1;
        }
    }

    fn visit_decl(&mut self, id: DeclId) {
        if !self.tu.decls.contains(id) || !self.visited.insert(id) {
            return;
        }
        let tu = self.tu;
        let decl = tu.decl(id);
        self.dispatch(Node::Decl(id));
        self.stack.push(Node::Decl(id));
        match &decl.kind {
            DeclKind::Namespace(ns) => ns.members.iter().for_each(|&m| self.visit_decl(m)),
            DeclKind::LinkageSpec(spec) => spec.members.iter().for_each(|&m| self.visit_decl(m)),
            DeclKind::Record(record) => record.members.iter().for_each(|&m| self.visit_decl(m)),
            DeclKind::Function(function) => {
                for &param in &function.params {
                    self.visit_decl(param);
                }
                if let Some(body) = function.body {
                    self.visit_stmt(body);
                }
            }
            DeclKind::Var(var) => {
                if let Some(init) = var.init {
                    self.visit_expr(init);
                }
            }
            DeclKind::Friend(friend) => {
                // Friend functions defined inside the class body.
                if let Some(FriendTarget::Decl(target)) = &friend.target {
                    let defined_here = tu
                        .decls
                        .try_get(*target)
                        .is_some_and(|t| t.lexical_parent == decl.parent);
                    if defined_here {
                        self.visit_decl(*target);
                    }
                }
            }
            DeclKind::ClassTemplate(template) | DeclKind::FunctionTemplate(template) => {
                self.visit_decl(template.templated);
                for &spec in &template.specializations {
                    if is_instantiation(tu, spec) {
                        self.instantiation_depth += 1;
                        self.visit_decl(spec);
                        self.instantiation_depth -= 1;
                    }
                }
            }
            DeclKind::StaticAssert(sa) => {
                self.visit_expr(sa.condition);
                if let Some(message) = sa.message {
                    self.visit_expr(message);
                }
            }
            DeclKind::Enum(_)
            | DeclKind::Field(_)
            | DeclKind::AccessSpec
            | DeclKind::Typedef(_) => {}
        }
        self.stack.pop();
    }

    fn visit_stmt(&mut self, id: StmtId) {
        if !self.tu.stmts.contains(id) {
            return;
        }
        let tu = self.tu;
        self.dispatch(Node::Stmt(id));
        self.stack.push(Node::Stmt(id));
        match &tu.stmt(id).kind {
            StmtKind::Compound { body } => body.iter().for_each(|&s| self.visit_stmt(s)),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(*condition);
                self.visit_stmt(*then_branch);
                if let Some(e) = else_branch {
                    self.visit_stmt(*e);
                }
            }
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                if let Some(s) = init {
                    self.visit_stmt(*s);
                }
                if let Some(e) = condition {
                    self.visit_expr(*e);
                }
                if let Some(e) = increment {
                    self.visit_expr(*e);
                }
                self.visit_stmt(*body);
            }
            StmtKind::RangeFor { var, range, body } => {
                self.visit_decl(*var);
                self.visit_expr(*range);
                self.visit_stmt(*body);
            }
            StmtKind::While { condition, body } | StmtKind::Switch { condition, body } => {
                self.visit_expr(*condition);
                self.visit_stmt(*body);
            }
            StmtKind::Do { body, condition } => {
                self.visit_stmt(*body);
                self.visit_expr(*condition);
            }
            StmtKind::Case { value, sub, .. } => {
                if let Some(v) = value {
                    self.visit_expr(*v);
                }
                self.visit_stmt(*sub);
            }
            StmtKind::Return { value } => {
                if let Some(v) = value {
                    self.visit_expr(*v);
                }
            }
            StmtKind::Expr { expr } => self.visit_expr(*expr),
            StmtKind::Decl { decls } => decls.iter().for_each(|&d| self.visit_decl(d)),
            StmtKind::Break | StmtKind::Continue | StmtKind::Null => {}
        }
        self.stack.pop();
    }

    fn visit_expr(&mut self, id: ExprId) {
        if !self.tu.exprs.contains(id) {
            return;
        }
        let tu = self.tu;
        self.dispatch(Node::Expr(id));
        self.stack.push(Node::Expr(id));
        let kind = &tu.expr(id).kind;
        for child in kind.children() {
            self.visit_expr(child);
        }
        if let ExprKind::Lambda { class, .. } = kind {
            self.visit_decl(*class);
        }
        self.stack.pop();
    }
}

fn is_instantiation(tu: &TranslationUnit, id: DeclId) -> bool {
    let Some(decl) = tu.decls.try_get(id) else {
        return false;
    };
    let spec = match &decl.kind {
        DeclKind::Record(r) => r.specialization,
        DeclKind::Function(f) => f.specialization,
        DeclKind::Var(v) => v.specialization,
        _ => None,
    };
    spec.is_some_and(|s| s.kind.is_instantiation())
}
