//! The translation-unit model the checks run against.
//!
//! A host compiler exports one [`TranslationUnit`] per compilation: arena
//! allocated declarations, statements and expressions referenced by opaque
//! IDs, an interned [`TypeDb`], and the preprocessor event stream. The model
//! is immutable once built and serializes to JSON for out-of-process hosts.
//! Semantic queries (canonical types, inheritance, special members,
//! qualified names) live on [`TranslationUnit`] and [`TypeDb`].

#![warn(missing_docs)]

pub mod arena;
pub mod builder;
pub mod decl;
pub mod expr;
pub mod ids;
pub mod inheritance;
pub mod pp;
pub mod stmt;
pub mod types;
pub mod unit;

pub use arena::{Arena, ArenaId};
pub use builder::TuBuilder;
pub use decl::{
    AccessSpecifier, AttrKind, Attribute, BaseSpecifier, Decl, DeclKind, EnumDecl, FieldDecl,
    FriendDecl, FriendTarget, FunctionDecl, FunctionKind, LinkageSpecDecl, NamespaceDecl,
    OverloadedOperator, RecordDecl, SpecializationInfo, SpecializationKind, StaticAssertDecl,
    TagKind, TemplateDecl, TypedefDecl, VarDecl,
};
pub use expr::{BinaryOp, CaptureDefault, CastKind, Expr, ExprKind, UnaryOp};
pub use ids::{DeclId, ExprId, StmtId, TypeId};
pub use inheritance::{BaseEdge, InheritanceGraph};
pub use pp::{ConditionalDirective, FileChangeReason, InclusionDirective, PpEvent};
pub use stmt::{Stmt, StmtKind};
pub use types::{BuiltinKind, QualType, TargetInfo, Type, TypeDb};
pub use unit::{BaseResolution, FileEntry, FileKind, ParamPassing, TranslationUnit};
