//! Statements.

use crate::ids::{DeclId, ExprId, StmtId};
use ccguard_source::Span;
use serde::{Deserialize, Serialize};

/// A statement node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stmt {
    /// The statement kind and its children.
    #[serde(flatten)]
    pub kind: StmtKind,
    /// The full source range.
    pub span: Span,
}

/// Statement kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StmtKind {
    /// `{ ... }`
    Compound {
        /// Statements in order.
        #[serde(default)]
        body: Vec<StmtId>,
    },
    /// `if (cond) then else otherwise`
    If {
        /// The condition.
        condition: ExprId,
        /// The then-branch.
        then_branch: StmtId,
        /// The else-branch.
        #[serde(default)]
        else_branch: Option<StmtId>,
    },
    /// `for (init; cond; inc) body`
    For {
        /// The init statement.
        #[serde(default)]
        init: Option<StmtId>,
        /// The condition.
        #[serde(default)]
        condition: Option<ExprId>,
        /// The increment.
        #[serde(default)]
        increment: Option<ExprId>,
        /// The loop body.
        body: StmtId,
    },
    /// `for (var : range) body`
    RangeFor {
        /// The loop variable.
        var: DeclId,
        /// The range expression.
        range: ExprId,
        /// The loop body.
        body: StmtId,
    },
    /// `while (cond) body`
    While {
        /// The condition.
        condition: ExprId,
        /// The loop body.
        body: StmtId,
    },
    /// `do body while (cond);`
    Do {
        /// The loop body.
        body: StmtId,
        /// The condition.
        condition: ExprId,
    },
    /// `switch (cond) body`
    Switch {
        /// The controlling expression.
        condition: ExprId,
        /// The body, usually a compound statement of cases.
        body: StmtId,
    },
    /// `case value: sub` or, without a value, `default: sub`.
    Case {
        /// The case value; `None` for `default`.
        #[serde(default)]
        value: Option<ExprId>,
        /// Location of the colon.
        colon: Span,
        /// The labelled sub-statement.
        sub: StmtId,
    },
    /// `return value;`
    Return {
        /// The returned expression.
        #[serde(default)]
        value: Option<ExprId>,
    },
    /// An expression statement.
    Expr {
        /// The expression.
        expr: ExprId,
    },
    /// A declaration statement.
    Decl {
        /// The declared entities.
        decls: Vec<DeclId>,
    },
    /// `break;`
    Break,
    /// `continue;`
    Continue,
    /// `;`
    Null,
}

impl StmtKind {
    /// Returns `true` for `{ ... }`.
    pub fn is_compound(&self) -> bool {
        matches!(self, StmtKind::Compound { .. })
    }

    /// Returns the direct child statements in source order.
    pub fn child_stmts(&self) -> Vec<StmtId> {
        match self {
            StmtKind::Compound { body } => body.clone(),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => std::iter::once(*then_branch).chain(*else_branch).collect(),
            StmtKind::For { init, body, .. } => init.iter().copied().chain([*body]).collect(),
            StmtKind::RangeFor { body, .. }
            | StmtKind::While { body, .. }
            | StmtKind::Do { body, .. }
            | StmtKind::Switch { body, .. } => vec![*body],
            StmtKind::Case { sub, .. } => vec![*sub],
            StmtKind::Return { .. }
            | StmtKind::Expr { .. }
            | StmtKind::Decl { .. }
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Null => Vec::new(),
        }
    }

    /// Returns the direct child expressions in source order.
    pub fn child_exprs(&self) -> Vec<ExprId> {
        match self {
            StmtKind::If { condition, .. }
            | StmtKind::While { condition, .. }
            | StmtKind::Do { condition, .. }
            | StmtKind::Switch { condition, .. } => vec![*condition],
            StmtKind::For {
                condition,
                increment,
                ..
            } => condition.iter().chain(increment.iter()).copied().collect(),
            StmtKind::RangeFor { range, .. } => vec![*range],
            StmtKind::Case { value, .. } | StmtKind::Return { value } => {
                value.iter().copied().collect()
            }
            StmtKind::Expr { expr } => vec![*expr],
            StmtKind::Compound { .. }
            | StmtKind::Decl { .. }
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Null => Vec::new(),
        }
    }

    /// Returns declarations introduced directly by this statement.
    pub fn child_decls(&self) -> Vec<DeclId> {
        match self {
            StmtKind::Decl { decls } => decls.clone(),
            StmtKind::RangeFor { var, .. } => vec![*var],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_children_in_order() {
        let kind = StmtKind::If {
            condition: ExprId::from_raw(0),
            then_branch: StmtId::from_raw(1),
            else_branch: Some(StmtId::from_raw(2)),
        };
        assert_eq!(
            kind.child_stmts(),
            vec![StmtId::from_raw(1), StmtId::from_raw(2)]
        );
        assert_eq!(kind.child_exprs(), vec![ExprId::from_raw(0)]);
    }

    #[test]
    fn default_label_has_no_value() {
        let json = r#"{"kind": "case", "colon": {"file": 0, "start": 8, "end": 9},
                       "sub": 3, "span": {"file": 0, "start": 0, "end": 12}}"#;
        let stmt: Stmt = serde_json::from_str(json).unwrap();
        match stmt.kind {
            StmtKind::Case { value, sub, .. } => {
                assert!(value.is_none());
                assert_eq!(sub, StmtId::from_raw(3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn leaves_have_no_children() {
        assert!(StmtKind::Break.child_stmts().is_empty());
        assert!(StmtKind::Null.child_exprs().is_empty());
    }
}
