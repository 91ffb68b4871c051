//! Expressions.

use crate::ids::{DeclId, ExprId};
use crate::types::QualType;
use ccguard_source::Span;
use serde::{Deserialize, Serialize};

/// An expression node with its type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expr {
    /// The expression kind and its operands.
    #[serde(flatten)]
    pub kind: ExprKind,
    /// The type of the expression. For casts, the destination type.
    pub ty: QualType,
    /// The full source range.
    pub span: Span,
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Minus,
    /// `~x`
    Not,
    /// `!x`
    LNot,
    /// `*x`
    Deref,
    /// `&x`
    AddrOf,
    /// `++x`
    PreInc,
    /// `--x`
    PreDec,
    /// `x++`
    PostInc,
    /// `x--`
    PostDec,
}

/// Binary operators, including assignments and the comma operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Cmp,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Xor,
    Or,
    LAnd,
    LOr,
    Assign,
    MulAssign,
    DivAssign,
    RemAssign,
    AddAssign,
    SubAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    Comma,
}

impl BinaryOp {
    /// Returns the operator token.
    pub fn token(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Mul => "*",
            Div => "/",
            Rem => "%",
            Add => "+",
            Sub => "-",
            Shl => "<<",
            Shr => ">>",
            Cmp => "<=>",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            Eq => "==",
            Ne => "!=",
            And => "&",
            Xor => "^",
            Or => "|",
            LAnd => "&&",
            LOr => "||",
            Assign => "=",
            MulAssign => "*=",
            DivAssign => "/=",
            RemAssign => "%=",
            AddAssign => "+=",
            SubAssign => "-=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            AndAssign => "&=",
            XorAssign => "^=",
            OrAssign => "|=",
            Comma => ",",
        }
    }
}

/// How a cast is spelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastKind {
    /// Inserted by the language's conversion rules.
    Implicit,
    /// `static_cast<T>(x)`
    Static,
    /// `dynamic_cast<T>(x)`
    Dynamic,
    /// `reinterpret_cast<T>(x)`
    Reinterpret,
    /// `const_cast<T>(x)`
    Const,
    /// `(T)x`
    CStyle,
    /// `T(x)`
    Functional,
}

impl CastKind {
    /// Returns the keyword of a named cast.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            CastKind::Static => Some("static_cast"),
            CastKind::Dynamic => Some("dynamic_cast"),
            CastKind::Reinterpret => Some("reinterpret_cast"),
            CastKind::Const => Some("const_cast"),
            CastKind::Implicit | CastKind::CStyle | CastKind::Functional => None,
        }
    }
}

/// A lambda's capture default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureDefault {
    /// No default.
    #[default]
    None,
    /// `[=]`
    ByCopy,
    /// `[&]`
    ByRef,
}

/// Expression kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprKind {
    /// `42`
    IntegerLiteral {
        /// The literal value.
        value: u64,
    },
    /// `1.5`
    FloatingLiteral {
        /// The literal value.
        value: f64,
    },
    /// `"text"`
    StringLiteral {
        /// The literal contents without quotes.
        value: String,
    },
    /// `'c'`
    CharacterLiteral {
        /// The code point.
        value: u32,
    },
    /// `true` / `false`
    BoolLiteral {
        /// The literal value.
        value: bool,
    },
    /// `nullptr`
    NullPtrLiteral,
    /// `"text"_suffix` or `12_km`
    UserDefinedLiteral {
        /// The literal operator called.
        operator: DeclId,
        /// The cooked literal passed to it.
        operand: ExprId,
    },
    /// A name referring to a declaration.
    DeclRef {
        /// The referenced declaration.
        decl: DeclId,
    },
    /// `this`
    This,
    /// A unary operator application.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: ExprId,
    },
    /// A binary operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left-hand side.
        lhs: ExprId,
        /// Right-hand side.
        rhs: ExprId,
        /// Location of the operator token.
        op_span: Span,
    },
    /// `cond ? a : b`
    Conditional {
        /// The condition.
        condition: ExprId,
        /// Value if true.
        then_expr: ExprId,
        /// Value if false.
        else_expr: ExprId,
    },
    /// A function call, including overloaded operator calls.
    Call {
        /// The called function; `None` when the callee is dependent or indirect.
        #[serde(default)]
        callee: Option<DeclId>,
        /// The arguments.
        #[serde(default)]
        args: Vec<ExprId>,
    },
    /// A conversion, implicit or written.
    Cast {
        /// How the cast is spelled.
        cast_kind: CastKind,
        /// The converted operand.
        operand: ExprId,
    },
    /// A lambda expression.
    Lambda {
        /// The closure type.
        class: DeclId,
        /// The capture default, if any.
        #[serde(default)]
        capture_default: CaptureDefault,
        /// Location of the `=` or `&` capture default.
        #[serde(default)]
        capture_default_span: Option<Span>,
        /// Whether `-> T` is written.
        #[serde(default)]
        explicit_result_type: bool,
    },
    /// `va_arg(list, T)`
    VaArg {
        /// The `va_list` operand.
        operand: ExprId,
    },
    /// `(x)`
    Paren {
        /// The parenthesized expression.
        inner: ExprId,
    },
    /// `base.member` or `base->member`
    Member {
        /// The object expression.
        base: ExprId,
        /// The accessed member.
        member: DeclId,
        /// `->` rather than `.`.
        #[serde(default)]
        is_arrow: bool,
    },
    /// `T{...}` or `T(...)` constructing an object.
    Construct {
        /// The constructor called.
        #[serde(default)]
        constructor: Option<DeclId>,
        /// The arguments.
        #[serde(default)]
        args: Vec<ExprId>,
    },
    /// `{a, b, c}`
    InitList {
        /// The initializers.
        #[serde(default)]
        inits: Vec<ExprId>,
    },
}

impl ExprKind {
    /// Returns the direct child expressions in source order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::UserDefinedLiteral { operand, .. }
            | ExprKind::Unary { operand, .. }
            | ExprKind::Cast { operand, .. }
            | ExprKind::VaArg { operand } => vec![*operand],
            ExprKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => vec![*condition, *then_expr, *else_expr],
            ExprKind::Call { args, .. } | ExprKind::Construct { args, .. } => args.clone(),
            ExprKind::InitList { inits } => inits.clone(),
            ExprKind::Paren { inner } => vec![*inner],
            ExprKind::Member { base, .. } => vec![*base],
            ExprKind::IntegerLiteral { .. }
            | ExprKind::FloatingLiteral { .. }
            | ExprKind::StringLiteral { .. }
            | ExprKind::CharacterLiteral { .. }
            | ExprKind::BoolLiteral { .. }
            | ExprKind::NullPtrLiteral
            | ExprKind::DeclRef { .. }
            | ExprKind::This
            | ExprKind::Lambda { .. } => Vec::new(),
        }
    }
}
