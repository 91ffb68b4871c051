//! Declarative node-kind subscriptions.

use ccguard_ast::{
    BinaryOp, DeclId, DeclKind, ExprId, ExprKind, StmtId, StmtKind, TranslationUnit,
};

/// A node of the translation unit a pattern matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    /// A declaration.
    Decl(DeclId),
    /// A statement.
    Stmt(StmtId),
    /// An expression.
    Expr(ExprId),
}

/// Declaration shapes a check can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclPattern {
    /// Any class, struct or union declaration.
    Record,
    /// Class, struct or union definitions only.
    RecordDefinition,
    /// Enumerations.
    Enum,
    /// Functions of every kind.
    Function,
    /// Variables and parameters.
    Var,
    /// Non-static data members.
    Field,
    /// Friend declarations.
    Friend,
    /// Access specifier labels.
    AccessSpec,
    /// Class templates.
    ClassTemplate,
    /// Function templates.
    FunctionTemplate,
}

/// Statement shapes a check can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StmtPattern {
    /// `case` and `default` labels.
    Case,
    /// `return` statements.
    Return,
}

/// Expression shapes a check can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprPattern {
    /// Binary operators; an empty list matches every operator.
    Binary(&'static [BinaryOp]),
    /// `?:`
    Conditional,
    /// Casts of every spelling, including implicit conversions.
    Cast,
    /// Function calls.
    Call,
    /// Lambda expressions.
    Lambda,
    /// String literals.
    StringLiteral,
    /// `va_arg(...)`
    VaArg,
}

/// A closed description of an AST shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Match declarations.
    Decl(DeclPattern),
    /// Match statements.
    Stmt(StmtPattern),
    /// Match expressions.
    Expr(ExprPattern),
}

impl Pattern {
    /// Returns `true` if `node` has the shape this pattern describes.
    pub fn matches(&self, tu: &TranslationUnit, node: Node) -> bool {
        match (self, node) {
            (Pattern::Decl(p), Node::Decl(id)) => p.matches(&tu.decl(id).kind),
            (Pattern::Stmt(p), Node::Stmt(id)) => p.matches(&tu.stmt(id).kind),
            (Pattern::Expr(p), Node::Expr(id)) => p.matches(&tu.expr(id).kind),
            _ => false,
        }
    }
}

impl DeclPattern {
    fn matches(&self, kind: &DeclKind) -> bool {
        match (self, kind) {
            (DeclPattern::Record, DeclKind::Record(_)) => true,
            (DeclPattern::RecordDefinition, DeclKind::Record(r)) => r.is_definition,
            (DeclPattern::Enum, DeclKind::Enum(_))
            | (DeclPattern::Function, DeclKind::Function(_))
            | (DeclPattern::Var, DeclKind::Var(_))
            | (DeclPattern::Field, DeclKind::Field(_))
            | (DeclPattern::Friend, DeclKind::Friend(_))
            | (DeclPattern::AccessSpec, DeclKind::AccessSpec)
            | (DeclPattern::ClassTemplate, DeclKind::ClassTemplate(_))
            | (DeclPattern::FunctionTemplate, DeclKind::FunctionTemplate(_)) => true,
            _ => false,
        }
    }
}

impl StmtPattern {
    fn matches(&self, kind: &StmtKind) -> bool {
        matches!(
            (self, kind),
            (StmtPattern::Case, StmtKind::Case { .. }) | (StmtPattern::Return, StmtKind::Return { .. })
        )
    }
}

impl ExprPattern {
    fn matches(&self, kind: &ExprKind) -> bool {
        match (self, kind) {
            (ExprPattern::Binary(ops), ExprKind::Binary { op, .. }) => {
                ops.is_empty() || ops.contains(op)
            }
            (ExprPattern::Conditional, ExprKind::Conditional { .. })
            | (ExprPattern::Cast, ExprKind::Cast { .. })
            | (ExprPattern::Call, ExprKind::Call { .. })
            | (ExprPattern::Lambda, ExprKind::Lambda { .. })
            | (ExprPattern::StringLiteral, ExprKind::StringLiteral { .. })
            | (ExprPattern::VaArg, ExprKind::VaArg { .. }) => true,
            _ => false,
        }
    }
}

/// A pattern together with the key its matches are reported under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Matcher {
    /// The subscribed shape.
    pub pattern: Pattern,
    /// Distinguishes the patterns of one check in [`MatchResult::key`].
    pub key: &'static str,
    /// Whether nodes inside compiler-instantiated templates are delivered.
    pub in_instantiations: bool,
}

impl Matcher {
    /// Subscribes to `pattern` outside template instantiations.
    pub fn new(pattern: Pattern, key: &'static str) -> Self {
        Self {
            pattern,
            key,
            in_instantiations: false,
        }
    }

    /// Also delivers matches found inside template instantiations.
    pub fn with_instantiations(mut self) -> Self {
        self.in_instantiations = true;
        self
    }
}

/// One match delivered to a check.
#[derive(Clone, Copy, Debug)]
pub struct MatchResult<'a> {
    /// The key of the matcher that fired.
    pub key: &'static str,
    /// The matched node.
    pub node: Node,
    /// The enclosing nodes, outermost first.
    pub ancestors: &'a [Node],
    /// Whether the node sits inside a template instantiation.
    pub in_instantiation: bool,
}

impl MatchResult<'_> {
    /// The matched declaration, if a declaration matched.
    pub fn decl(&self) -> Option<DeclId> {
        match self.node {
            Node::Decl(id) => Some(id),
            _ => None,
        }
    }

    /// The matched statement, if a statement matched.
    pub fn stmt(&self) -> Option<StmtId> {
        match self.node {
            Node::Stmt(id) => Some(id),
            _ => None,
        }
    }

    /// The matched expression, if an expression matched.
    pub fn expr(&self) -> Option<ExprId> {
        match self.node {
            Node::Expr(id) => Some(id),
            _ => None,
        }
    }

    /// The innermost enclosing node.
    pub fn parent(&self) -> Option<Node> {
        self.ancestors.last().copied()
    }
}
