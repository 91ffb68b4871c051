//! All built-in check implementations.
//!
//! This module re-exports all individual check types and provides
//! `register_builtin_checks` to add all 25 checks to a `CheckEngine`.

mod c101;
mod c102;
mod c103;
mod c104;
mod c105;
mod c106;
mod c107;
mod c108;
mod d201;
mod d202;
mod d203;
mod d204;
mod d205;
mod d206;
mod d207;
mod e301;
mod e302;
mod e303;
mod e304;
mod e305;
mod e306;
mod e307;
mod p501;
mod p502;
mod t401;

pub use c101::AssignmentOperators;
pub use c102::ClassMethods;
pub use c103::DerivedClasses;
pub use c104::StructsAndClasses;
pub use c105::OperatorOverloading;
pub use c106::ProtectedAccess;
pub use c107::FriendDeclarations;
pub use c108::Unions;
pub use d201::Auto;
pub use d202::EnumClass;
pub use d203::LocalMethodsAndTypes;
pub use d204::TemplateSpecializations;
pub use d205::UseNodiscard;
pub use d206::UseNoexcept;
pub use d207::VarargFunctions;
pub use e301::CommaOperator;
pub use e302::TernaryOperator;
pub use e303::FloatingPointComparison;
pub use e304::LambdaImplicitCapture;
pub use e305::LambdaReturnType;
pub use e306::Strings;
pub use e307::SwitchStatement;
pub use p501::IncludeOrder;
pub use p502::PreprocessingDirectives;
pub use t401::TypeConversions;

use crate::CheckEngine;

/// Registers all 25 built-in checks with the engine.
///
/// This adds checks C101-C108, D201-D207, E301-E307, T401, P501 and P502.
pub fn register_builtin_checks(engine: &mut CheckEngine) {
    engine.register(Box::new(AssignmentOperators));
    engine.register(Box::new(ClassMethods));
    engine.register(Box::new(DerivedClasses));
    engine.register(Box::new(StructsAndClasses));
    engine.register(Box::new(OperatorOverloading));
    engine.register(Box::new(ProtectedAccess));
    engine.register(Box::new(FriendDeclarations));
    engine.register(Box::new(Unions));
    engine.register(Box::new(Auto));
    engine.register(Box::new(EnumClass));
    engine.register(Box::new(LocalMethodsAndTypes));
    engine.register(Box::new(TemplateSpecializations));
    engine.register(Box::new(UseNodiscard));
    engine.register(Box::new(UseNoexcept));
    engine.register(Box::new(VarargFunctions));
    engine.register(Box::new(CommaOperator));
    engine.register(Box::new(TernaryOperator));
    engine.register(Box::new(FloatingPointComparison));
    engine.register(Box::new(LambdaImplicitCapture));
    engine.register(Box::new(LambdaReturnType));
    engine.register(Box::new(Strings));
    engine.register(Box::new(SwitchStatement));
    engine.register(Box::new(TypeConversions));
    engine.register(Box::new(IncludeOrder));
    engine.register(Box::new(PreprocessingDirectives));
}
