//! Declarations: namespaces, records, enums, functions, variables and the
//! smaller pieces that hang off them.

use crate::ids::{DeclId, ExprId, StmtId};
use crate::types::QualType;
use ccguard_source::Span;
use serde::{Deserialize, Serialize};

/// A declaration as resolved by the host compiler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Decl {
    /// What kind of declaration this is, with kind-specific data.
    #[serde(flatten)]
    pub kind: DeclKind,
    /// The declared name. Empty for anonymous entities.
    #[serde(default)]
    pub name: String,
    /// The location of the name (or of the keyword for unnamed entities).
    pub span: Span,
    /// The full source range of the declaration.
    pub range: Span,
    /// The semantic parent (declaration context).
    #[serde(default)]
    pub parent: Option<DeclId>,
    /// The lexical parent, which differs from `parent` for out-of-line definitions.
    #[serde(default)]
    pub lexical_parent: Option<DeclId>,
    /// The access specifier in effect for a class member.
    #[serde(default)]
    pub access: AccessSpecifier,
    /// Whether the compiler generated this declaration.
    #[serde(default)]
    pub is_implicit: bool,
    /// The first declaration of the same entity, when this is a redeclaration.
    #[serde(default)]
    pub first_decl: Option<DeclId>,
    /// Attributes and virt-specifiers written on the declaration.
    #[serde(default)]
    pub attrs: Vec<Attribute>,
}

impl Decl {
    /// Returns the attribute of the given kind, if present.
    pub fn attr(&self, kind: AttrKind) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.kind == kind)
    }

    /// Returns `true` if an attribute of the given kind is present.
    pub fn has_attr(&self, kind: AttrKind) -> bool {
        self.attr(kind).is_some()
    }

    /// Returns the record data if this is a class, struct or union.
    pub fn as_record(&self) -> Option<&RecordDecl> {
        match &self.kind {
            DeclKind::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the function data if this is a function of any kind.
    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            DeclKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Returns the variable data if this is a variable or parameter.
    pub fn as_var(&self) -> Option<&VarDecl> {
        match &self.kind {
            DeclKind::Var(var) => Some(var),
            _ => None,
        }
    }

    /// Returns the namespace data if this is a namespace.
    pub fn as_namespace(&self) -> Option<&NamespaceDecl> {
        match &self.kind {
            DeclKind::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    /// Returns the template data if this is a class or function template.
    pub fn as_template(&self) -> Option<&TemplateDecl> {
        match &self.kind {
            DeclKind::ClassTemplate(template) | DeclKind::FunctionTemplate(template) => {
                Some(template)
            }
            _ => None,
        }
    }

    /// Returns the member declarations of a declaration context.
    pub fn members(&self) -> &[DeclId] {
        match &self.kind {
            DeclKind::Namespace(ns) => &ns.members,
            DeclKind::Record(record) => &record.members,
            DeclKind::LinkageSpec(spec) => &spec.members,
            _ => &[],
        }
    }
}

/// Declaration kinds with their kind-specific data.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    /// `namespace N { ... }`
    Namespace(NamespaceDecl),
    /// `class`, `struct` or `union`.
    Record(RecordDecl),
    /// `enum` or `enum class`.
    Enum(EnumDecl),
    /// A free function, method, constructor, destructor or conversion.
    Function(FunctionDecl),
    /// A variable or function parameter.
    Var(VarDecl),
    /// A non-static data member.
    Field(FieldDecl),
    /// `friend ...;`
    Friend(FriendDecl),
    /// `public:`, `protected:` or `private:`; the label is the decl's `access`.
    AccessSpec,
    /// `template <...> class C`
    ClassTemplate(TemplateDecl),
    /// `template <...> R f(...)`
    FunctionTemplate(TemplateDecl),
    /// `static_assert(cond, "message")`
    StaticAssert(StaticAssertDecl),
    /// `typedef` or `using` alias.
    Typedef(TypedefDecl),
    /// `extern "C" { ... }`
    LinkageSpec(LinkageSpecDecl),
}

/// Member access level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSpecifier {
    /// Not a class member.
    #[default]
    None,
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
}

impl AccessSpecifier {
    /// Returns the keyword for this access level.
    pub fn keyword(self) -> &'static str {
        match self {
            AccessSpecifier::None => "",
            AccessSpecifier::Public => "public",
            AccessSpecifier::Protected => "protected",
            AccessSpecifier::Private => "private",
        }
    }
}

/// Attribute and virt-specifier kinds the checks look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    /// `final`
    Final,
    /// `override`
    Override,
    /// `[[nodiscard]]`
    NoDiscard,
    /// `[[noreturn]]`
    NoReturn,
}

/// An attribute together with the location of its spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Which attribute.
    pub kind: AttrKind,
    /// Where it is written.
    pub span: Span,
}

/// Data of a namespace declaration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NamespaceDecl {
    /// `true` for `namespace { ... }`.
    #[serde(default)]
    pub anonymous: bool,
    /// `true` for `inline namespace`.
    #[serde(default)]
    pub is_inline: bool,
    /// Declarations lexically inside this namespace block.
    #[serde(default)]
    pub members: Vec<DeclId>,
}

/// Which keyword introduced a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// `struct`
    Struct,
    /// `class`
    Class,
    /// `union`
    Union,
}

impl TagKind {
    /// Returns the keyword spelling.
    pub fn keyword(self) -> &'static str {
        match self {
            TagKind::Struct => "struct",
            TagKind::Class => "class",
            TagKind::Union => "union",
        }
    }
}

/// How a specialization came to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecializationKind {
    /// Instantiated by the compiler from the primary template.
    ImplicitInstantiation,
    /// `template class C<int>;`
    ExplicitInstantiation,
    /// `template <> class C<int> { ... };`
    ExplicitSpecialization,
    /// `template <typename T> class C<T *> { ... };`
    PartialSpecialization,
}

impl SpecializationKind {
    /// Returns `true` for compiler-produced instantiations.
    pub fn is_instantiation(self) -> bool {
        matches!(
            self,
            SpecializationKind::ImplicitInstantiation | SpecializationKind::ExplicitInstantiation
        )
    }
}

/// Links a specialization to the template it specializes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecializationInfo {
    /// The `ClassTemplate` or `FunctionTemplate` declaration.
    pub template: DeclId,
    /// How the specialization was produced.
    pub kind: SpecializationKind,
}

/// One entry of a class's base clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseSpecifier {
    /// The base type as written.
    pub ty: QualType,
    /// The access level of the inheritance.
    pub access: AccessSpecifier,
    /// Whether the base is `virtual`.
    #[serde(default)]
    pub is_virtual: bool,
    /// The range of the specifier (`public virtual Base`).
    pub span: Span,
}

/// Data of a class, struct or union declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordDecl {
    /// The introducing keyword.
    pub tag: TagKind,
    /// Location of the keyword.
    pub tag_span: Span,
    /// Whether this declaration is the definition.
    #[serde(default)]
    pub is_definition: bool,
    /// Whether this is the closure type of a lambda.
    #[serde(default)]
    pub is_lambda: bool,
    /// Whether the type is an aggregate.
    #[serde(default)]
    pub is_aggregate: bool,
    /// Whether the type has unimplemented pure virtual functions.
    #[serde(default)]
    pub is_abstract: bool,
    /// Whether the record sits in a dependent (template) context.
    #[serde(default)]
    pub is_templated: bool,
    /// The base clause.
    #[serde(default)]
    pub bases: Vec<BaseSpecifier>,
    /// Member declarations in declaration order, including implicit ones.
    #[serde(default)]
    pub members: Vec<DeclId>,
    /// The braces of the body, when this is a definition.
    #[serde(default)]
    pub brace_range: Option<Span>,
    /// The class template this record is the pattern of.
    #[serde(default)]
    pub described_template: Option<DeclId>,
    /// Set when this record is a specialization of a class template.
    #[serde(default)]
    pub specialization: Option<SpecializationInfo>,
}

/// Data of an enumeration declaration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnumDecl {
    /// `true` for `enum class` / `enum struct`.
    #[serde(default)]
    pub scoped: bool,
    /// The fixed or deduced underlying type.
    #[serde(default)]
    pub underlying: Option<QualType>,
    /// Location of the `enum` keyword.
    #[serde(default)]
    pub keyword_span: Option<Span>,
}

/// The flavour of a function declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// A namespace-scope function.
    #[default]
    Free,
    /// A non-special member function.
    Method,
    /// A constructor.
    Constructor,
    /// A destructor.
    Destructor,
    /// A conversion operator.
    Conversion,
    /// A class template argument deduction guide.
    DeductionGuide,
}

/// Overloadable operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum OverloadedOperator {
    New,
    Delete,
    ArrayNew,
    ArrayDelete,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Exclaim,
    Equal,
    Less,
    Greater,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    CaretEqual,
    AmpEqual,
    PipeEqual,
    LessLess,
    GreaterGreater,
    LessLessEqual,
    GreaterGreaterEqual,
    EqualEqual,
    ExclaimEqual,
    LessEqual,
    GreaterEqual,
    Spaceship,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Comma,
    ArrowStar,
    Arrow,
    Call,
    Subscript,
    Coawait,
}

impl OverloadedOperator {
    /// Returns the operator token, e.g. `==`.
    pub fn token(self) -> &'static str {
        use OverloadedOperator::*;
        match self {
            New => "new",
            Delete => "delete",
            ArrayNew => "new[]",
            ArrayDelete => "delete[]",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Caret => "^",
            Amp => "&",
            Pipe => "|",
            Tilde => "~",
            Exclaim => "!",
            Equal => "=",
            Less => "<",
            Greater => ">",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            CaretEqual => "^=",
            AmpEqual => "&=",
            PipeEqual => "|=",
            LessLess => "<<",
            GreaterGreater => ">>",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            EqualEqual => "==",
            ExclaimEqual => "!=",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Spaceship => "<=>",
            AmpAmp => "&&",
            PipePipe => "||",
            PlusPlus => "++",
            MinusMinus => "--",
            Comma => ",",
            ArrowStar => "->*",
            Arrow => "->",
            Call => "()",
            Subscript => "[]",
            Coawait => "co_await",
        }
    }

    /// Returns `true` for `=` and every compound assignment operator.
    pub fn is_assignment(self) -> bool {
        use OverloadedOperator::*;
        matches!(
            self,
            Equal
                | PlusEqual
                | MinusEqual
                | StarEqual
                | SlashEqual
                | PercentEqual
                | CaretEqual
                | AmpEqual
                | PipeEqual
                | LessLessEqual
                | GreaterGreaterEqual
        )
    }
}

/// Data of a function declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Free function, method, constructor, ...
    #[serde(default)]
    pub function_kind: FunctionKind,
    /// The parameters, as `Var` declarations.
    #[serde(default)]
    pub params: Vec<DeclId>,
    /// The declared return type.
    pub return_type: QualType,
    /// Where the return type is written, if anywhere.
    #[serde(default)]
    pub return_type_span: Option<Span>,
    /// Whether the return type is written after `->`.
    #[serde(default)]
    pub trailing_return: bool,
    /// The parameter list including both parentheses.
    pub params_range: Span,
    /// The body, when this declaration is a definition.
    #[serde(default)]
    pub body: Option<StmtId>,
    /// Set for `operator@` declarations.
    #[serde(default)]
    pub operator: Option<OverloadedOperator>,
    /// `virtual`, explicitly or by overriding.
    #[serde(default)]
    pub is_virtual: bool,
    /// `= 0`
    #[serde(default)]
    pub is_pure: bool,
    /// `const`-qualified method.
    #[serde(default)]
    pub is_const: bool,
    /// `static` member or internal-linkage function.
    #[serde(default)]
    pub is_static: bool,
    /// `= default`
    #[serde(default)]
    pub is_defaulted: bool,
    /// `= delete`
    #[serde(default)]
    pub is_deleted: bool,
    /// Has a non-throwing exception specification.
    #[serde(default)]
    pub is_noexcept: bool,
    /// Ends in a C-style ellipsis.
    #[serde(default)]
    pub is_variadic: bool,
    /// Declared with `extern "C"` language linkage.
    #[serde(default)]
    pub is_extern_c: bool,
    /// The methods this one overrides, one per base it comes from.
    #[serde(default)]
    pub overridden: Vec<DeclId>,
    /// The function template this function is the pattern of.
    #[serde(default)]
    pub described_template: Option<DeclId>,
    /// Set when this function is a specialization of a function template.
    #[serde(default)]
    pub specialization: Option<SpecializationInfo>,
    /// Whether the function sits in a dependent (template) context.
    #[serde(default)]
    pub is_templated: bool,
}

impl FunctionDecl {
    /// Returns `true` for compiler-produced template instantiations.
    pub fn is_template_instantiation(&self) -> bool {
        self.specialization
            .is_some_and(|spec| spec.kind.is_instantiation())
    }
}

/// Data of a variable or parameter declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VarDecl {
    /// The declared type (sugared as written).
    pub ty: QualType,
    /// Where the type is written.
    #[serde(default)]
    pub type_span: Option<Span>,
    /// The initializer.
    #[serde(default)]
    pub init: Option<ExprId>,
    /// Function parameter.
    #[serde(default)]
    pub is_param: bool,
    /// Lambda init-capture (`[x = 1]`).
    #[serde(default)]
    pub is_init_capture: bool,
    /// Structured binding declaration.
    #[serde(default)]
    pub is_decomposition: bool,
    /// Declared with `extern "C"` language linkage.
    #[serde(default)]
    pub is_extern_c: bool,
    /// Set for variable template specializations.
    #[serde(default)]
    pub specialization: Option<SpecializationInfo>,
}

/// Data of a non-static data member.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDecl {
    /// The member type.
    pub ty: QualType,
}

/// What a friend declaration befriends.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendTarget {
    /// `friend class C;` or `friend C;`
    Type(QualType),
    /// `friend void f();` or `template <...> friend class C;`
    Decl(DeclId),
}

/// Data of a friend declaration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FriendDecl {
    /// The befriended entity, if the host could resolve it.
    #[serde(default)]
    pub target: Option<FriendTarget>,
}

/// Data shared by class and function templates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateDecl {
    /// The templated record or function.
    pub templated: DeclId,
    /// Known specializations and instantiations.
    #[serde(default)]
    pub specializations: Vec<DeclId>,
}

/// Data of a `static_assert`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticAssertDecl {
    /// The asserted condition.
    pub condition: ExprId,
    /// The message literal, if given.
    #[serde(default)]
    pub message: Option<ExprId>,
}

/// Data of a typedef or alias declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypedefDecl {
    /// The aliased type.
    pub underlying: QualType,
}

/// Data of an `extern "C"` block.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LinkageSpecDecl {
    /// Declarations inside the block.
    #[serde(default)]
    pub members: Vec<DeclId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TypeId;
    use ccguard_source::FileId;

    fn span(start: u32) -> Span {
        Span::new(FileId::from_raw(0), start, start + 1)
    }

    #[test]
    fn attributes_are_looked_up_by_kind() {
        let decl = Decl {
            kind: DeclKind::Field(FieldDecl {
                ty: QualType::new(TypeId::from_raw(0)),
            }),
            name: "x".into(),
            span: span(0),
            range: span(0),
            parent: None,
            lexical_parent: None,
            access: AccessSpecifier::Public,
            is_implicit: false,
            first_decl: None,
            attrs: vec![Attribute {
                kind: AttrKind::Final,
                span: span(4),
            }],
        };
        assert!(decl.has_attr(AttrKind::Final));
        assert!(!decl.has_attr(AttrKind::Override));
        assert_eq!(decl.attr(AttrKind::Final).map(|a| a.span), Some(span(4)));
        assert!(decl.members().is_empty());
    }

    #[test]
    fn operator_tokens() {
        assert_eq!(OverloadedOperator::EqualEqual.token(), "==");
        assert_eq!(OverloadedOperator::Subscript.token(), "[]");
        assert!(OverloadedOperator::PlusEqual.is_assignment());
        assert!(OverloadedOperator::Equal.is_assignment());
        assert!(!OverloadedOperator::EqualEqual.is_assignment());
    }

    #[test]
    fn flattened_decl_json() {
        let json = r#"{
            "kind": "enum",
            "scoped": false,
            "name": "Color",
            "span": {"file": 0, "start": 5, "end": 10},
            "range": {"file": 0, "start": 0, "end": 20}
        }"#;
        let decl: Decl = serde_json::from_str(json).unwrap();
        assert_eq!(decl.name, "Color");
        assert!(matches!(decl.kind, DeclKind::Enum(EnumDecl { scoped: false, .. })));
        assert_eq!(decl.access, AccessSpecifier::None);
    }
}
