//! Coding-standard checks and the engine that runs them over a translation unit.
//!
//! Each check subscribes to AST shapes through [`Matcher`]s and, where it
//! needs them, to preprocessor events through [`PpCallbacks`]. The
//! [`CheckEngine`] walks every node of a unit once, hands matches to the
//! subscribed checks, then replays the preprocessor event stream.
//!
//! # Check Categories
//!
//! - **C-series (classes):** special members, inheritance, access, friends, unions
//! - **D-series (declarations):** `auto`, enums, local linkage, specializations, attributes
//! - **E-series (expressions):** comma, ternary, float equality, lambdas, strings, `switch`
//! - **T-series (types):** implicit and explicit numeric conversions
//! - **P-series (preprocessor):** include order and directive use

#![warn(missing_docs)]

mod engine;
mod finder;
mod helpers;
mod pattern;
mod rules;
#[cfg(test)]
mod testing;

pub use engine::CheckEngine;
pub use finder::MatchFinder;
pub use helpers::{
    is_auto_placeholder, is_generic_lambda, is_header, is_interface, is_source_file,
    strip_implicit, strip_parens,
};
pub use pattern::{DeclPattern, ExprPattern, MatchResult, Matcher, Node, Pattern, StmtPattern};
pub use rules::register_builtin_checks;
pub use rules::{
    AssignmentOperators, Auto, ClassMethods, CommaOperator, DerivedClasses, EnumClass,
    FloatingPointComparison, FriendDeclarations, IncludeOrder, LambdaImplicitCapture,
    LambdaReturnType, LocalMethodsAndTypes, OperatorOverloading, PreprocessingDirectives,
    ProtectedAccess, Strings, StructsAndClasses, SwitchStatement, TemplateSpecializations,
    TernaryOperator, TypeConversions, Unions, UseNodiscard, UseNoexcept, VarargFunctions,
};

use ccguard_ast::{ConditionalDirective, FileChangeReason, InclusionDirective, TranslationUnit};
use ccguard_config::GuardConfig;
use ccguard_diagnostics::{DiagnosticCode, DiagnosticSink, Severity};
use ccguard_source::{FileId, SourceDb, Span};

/// Everything a check may consult while handling a match or an event.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    /// The unit being checked.
    pub tu: &'a TranslationUnit,
    /// File contents, with the same file ids as the unit.
    pub sources: &'a SourceDb,
    /// Check options.
    pub config: &'a GuardConfig,
    /// Where diagnostics go.
    pub sink: &'a DiagnosticSink,
}

/// A single coding-standard rule.
///
/// Each check has a unique diagnostic code, a kebab-case name, a description
/// and a default severity. AST checks return their subscriptions from
/// [`register_patterns`](Check::register_patterns) and receive every match in
/// [`on_match`](Check::on_match); preprocessor checks return a fresh
/// [`PpCallbacks`] object for each unit.
pub trait Check: Send + Sync {
    /// Returns the diagnostic code for this check (e.g., C103, P501).
    fn code(&self) -> DiagnosticCode;

    /// Returns the short kebab-case name of this check (e.g., "derived-classes").
    fn name(&self) -> &str;

    /// Returns a human-readable description of what this check enforces.
    fn description(&self) -> &str;

    /// Returns the default severity for diagnostics emitted by this check.
    fn default_severity(&self) -> Severity;

    /// The AST shapes this check wants to see.
    fn register_patterns(&self) -> Vec<Matcher> {
        Vec::new()
    }

    /// Handles one match of a registered pattern.
    fn on_match(&self, _m: &MatchResult<'_>, _cx: &CheckContext<'_>) {}

    /// Creates the per-unit preprocessor observer, if this check has one.
    fn preprocessor_callbacks(&self) -> Option<Box<dyn PpCallbacks>> {
        None
    }
}

/// Observer of the preprocessor event stream of one unit.
///
/// Created when the unit starts and dropped after
/// [`end_of_main_file`](PpCallbacks::end_of_main_file); all state a check
/// accumulates across events lives here.
pub trait PpCallbacks {
    /// The preprocessor entered or left `file`.
    fn file_changed(
        &mut self,
        _file: FileId,
        _reason: FileChangeReason,
        _loc: Span,
        _cx: &CheckContext<'_>,
    ) {
    }

    /// An `#include` was processed.
    fn inclusion_directive(&mut self, _directive: &InclusionDirective, _cx: &CheckContext<'_>) {}

    /// `#define name`
    fn macro_defined(&mut self, _name: &str, _span: Span, _cx: &CheckContext<'_>) {}

    /// `#undef name`
    fn macro_undefined(&mut self, _name: &str, _span: Span, _cx: &CheckContext<'_>) {}

    /// A use of macro `name` was expanded.
    fn macro_expands(&mut self, _name: &str, _span: Span, _cx: &CheckContext<'_>) {}

    /// A conditional directive (`#if` ... `#endif`).
    fn conditional(
        &mut self,
        _directive: ConditionalDirective,
        _span: Span,
        _cx: &CheckContext<'_>,
    ) {
    }

    /// A `#pragma` directive.
    fn pragma(&mut self, _span: Span, _cx: &CheckContext<'_>) {}

    /// The main file has been fully read; flush accumulated state.
    fn end_of_main_file(&mut self, _cx: &CheckContext<'_>) {}
}
