//! The translation unit: every node the host exported for one compilation,
//! plus the semantic queries the checks run against it.

use crate::arena::Arena;
use crate::decl::{
    BaseSpecifier, Decl, DeclKind, FieldDecl, FriendTarget, FunctionDecl, FunctionKind,
    OverloadedOperator, RecordDecl,
};
use crate::expr::{Expr, ExprKind};
use crate::ids::{DeclId, ExprId, StmtId, TypeId};
use crate::inheritance::{BaseEdge, InheritanceGraph};
use crate::pp::PpEvent;
use crate::stmt::Stmt;
use crate::types::{QualType, TargetInfo, Type, TypeDb};
use ccguard_common::{GuardResult, InternalError};
use ccguard_source::{FileId, SourceDb, Span};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Where a file comes from, as far as the checks care.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A file of the project being checked.
    #[default]
    User,
    /// A system header.
    System,
    /// A compiler pseudo-file such as `<built-in>` or `<command line>`.
    Builtin,
}

/// One file of the translation unit. Its position in
/// [`TranslationUnit::files`] is its [`FileId`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileEntry {
    /// The path as the host resolved it.
    pub path: PathBuf,
    /// User, system or builtin.
    #[serde(default)]
    pub kind: FileKind,
    /// The file text, if the host exported it.
    #[serde(default)]
    pub content: Option<String>,
}

/// The outcome of resolving a base specifier to a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BaseResolution {
    /// The base names this record (its definition when one is visible).
    Record(DeclId),
    /// The base is a template specialization whose template is unknown.
    UnresolvedTemplate(String),
    /// The base is neither a record nor a template specialization.
    Unresolved(String),
}

/// How a single-parameter special member takes its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamPassing {
    /// `T`
    Value,
    /// `T &` or `const T &`
    LValueRef {
        /// Whether the referent is `const`.
        is_const: bool,
    },
    /// `T &&`
    RValueRef,
}

/// All AST nodes, types and preprocessor events of one compilation.
///
/// Built once by the host and never mutated by the checks. Derived indexes
/// (definitions, the inheritance graph) are computed on first use, so the
/// unit must not be modified after it has been queried.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// The file the compiler was invoked on.
    pub main_file: FileId,
    /// Every file seen, indexed by `FileId`.
    pub files: Vec<FileEntry>,
    /// Target data model.
    #[serde(default)]
    pub target: TargetInfo,
    /// Interned types.
    #[serde(default)]
    pub types: TypeDb,
    /// All declarations.
    #[serde(default)]
    pub decls: Arena<DeclId, Decl>,
    /// All statements.
    #[serde(default)]
    pub stmts: Arena<StmtId, Stmt>,
    /// All expressions.
    #[serde(default)]
    pub exprs: Arena<ExprId, Expr>,
    /// Declarations at translation-unit scope, in source order.
    #[serde(default)]
    pub top_level: Vec<DeclId>,
    /// Preprocessor events in source order.
    #[serde(default)]
    pub pp_events: Vec<PpEvent>,
    #[serde(skip)]
    index: OnceLock<SemaIndex>,
}

#[derive(Clone, Debug)]
struct SemaIndex {
    definitions: HashMap<DeclId, DeclId>,
    inheritance: InheritanceGraph,
}

impl TranslationUnit {
    /// Creates an empty unit whose main file is `main_path`.
    pub fn new(main_path: impl Into<PathBuf>) -> Self {
        Self {
            main_file: FileId::from_raw(0),
            files: vec![FileEntry {
                path: main_path.into(),
                kind: FileKind::User,
                content: None,
            }],
            target: TargetInfo::default(),
            types: TypeDb::new(),
            decls: Arena::new(),
            stmts: Arena::new(),
            exprs: Arena::new(),
            top_level: Vec::new(),
            pp_events: Vec::new(),
            index: OnceLock::new(),
        }
    }

    /// Returns the declaration with the given id.
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id]
    }

    /// Returns the statement with the given id.
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }

    /// Returns the expression with the given id.
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    /// Returns the record data of `id`, if it is a record.
    pub fn record(&self, id: DeclId) -> Option<&RecordDecl> {
        self.decls.try_get(id)?.as_record()
    }

    /// Returns the function data of `id`, if it is a function.
    pub fn function(&self, id: DeclId) -> Option<&FunctionDecl> {
        self.decls.try_get(id)?.as_function()
    }

    /// Returns the file entry for `id`.
    pub fn file(&self, id: FileId) -> Option<&FileEntry> {
        self.files.get(id.as_raw() as usize)
    }

    /// Returns the path of file `id`.
    pub fn file_path(&self, id: FileId) -> Option<&Path> {
        self.file(id).map(|f| f.path.as_path())
    }

    /// Returns the kind of file `id`; unknown files count as builtin.
    pub fn file_kind(&self, id: FileId) -> FileKind {
        self.file(id).map_or(FileKind::Builtin, |f| f.kind)
    }

    /// Builds a source database whose file ids match this unit's.
    pub fn source_db(&self) -> SourceDb {
        let mut db = SourceDb::new();
        for file in &self.files {
            db.add_source(file.path.clone(), file.content.clone().unwrap_or_default());
        }
        db
    }

    fn index(&self) -> &SemaIndex {
        self.index.get_or_init(|| SemaIndex::build(self))
    }

    /// Returns the first declaration of the entity `id` declares.
    pub fn canonical_decl(&self, id: DeclId) -> DeclId {
        self.decls
            .try_get(id)
            .and_then(|d| d.first_decl)
            .unwrap_or(id)
    }

    /// Returns the defining declaration of the entity `id` declares.
    pub fn definition(&self, id: DeclId) -> Option<DeclId> {
        self.index()
            .definitions
            .get(&self.canonical_decl(id))
            .copied()
    }

    /// Returns `true` if `a` and `b` declare the same entity.
    pub fn same_entity(&self, a: DeclId, b: DeclId) -> bool {
        self.canonical_decl(a) == self.canonical_decl(b)
    }

    /// Returns the record a type names, preferring its definition.
    pub fn record_of_type(&self, qt: QualType) -> Option<DeclId> {
        let decl = self.types.as_record(qt)?;
        Some(self.definition(decl).unwrap_or(decl))
    }

    /// Returns `true` if `qt` (canonical, ignoring qualifiers) is the record `record`.
    pub fn is_record_type(&self, qt: QualType, record: DeclId) -> bool {
        self.types
            .as_record(qt)
            .is_some_and(|decl| self.same_entity(decl, record))
    }

    /// Resolves a base specifier to the record it names.
    ///
    /// Specializations of a known class template resolve to the template's
    /// pattern when the host did not export an instantiated record.
    pub fn resolve_base(&self, base: &BaseSpecifier) -> BaseResolution {
        resolve_base_with(self, &self.index().definitions, base)
    }

    /// Returns the inheritance graph of the unit.
    pub fn inheritance(&self) -> &InheritanceGraph {
        &self.index().inheritance
    }

    /// Returns `true` if `base` is a direct or indirect base of `derived`.
    pub fn is_derived_from(&self, derived: DeclId, base: DeclId) -> bool {
        let derived = self.definition(derived).unwrap_or(derived);
        let base = self.definition(base).unwrap_or(base);
        self.inheritance().is_derived_from(derived, base)
    }

    /// Iterates over the methods (including special members) of a record.
    pub fn methods(
        &self,
        record: DeclId,
    ) -> impl Iterator<Item = (DeclId, &Decl, &FunctionDecl)> + '_ {
        self.decl(record).members().iter().filter_map(move |&id| {
            let decl = self.decls.try_get(id)?;
            decl.as_function().map(|f| (id, decl, f))
        })
    }

    /// Iterates over the non-static data members of a record.
    pub fn fields(&self, record: DeclId) -> impl Iterator<Item = (DeclId, &Decl, &FieldDecl)> + '_ {
        self.decl(record).members().iter().filter_map(move |&id| {
            let decl = self.decls.try_get(id)?;
            match &decl.kind {
                DeclKind::Field(field) => Some((id, decl, field)),
                _ => None,
            }
        })
    }

    /// Returns the destructor of a record, if declared.
    pub fn destructor(&self, record: DeclId) -> Option<DeclId> {
        self.methods(record)
            .find(|(_, _, f)| f.function_kind == FunctionKind::Destructor)
            .map(|(id, _, _)| id)
    }

    /// Returns `true` if the record or its destructor is marked `final`.
    pub fn is_effectively_final(&self, record: DeclId) -> bool {
        use crate::decl::AttrKind;
        let def = self.definition(record).unwrap_or(record);
        if self.decl(def).has_attr(AttrKind::Final) {
            return true;
        }
        self.destructor(def)
            .is_some_and(|dtor| self.decl(dtor).has_attr(AttrKind::Final))
    }

    /// Returns the declared type of parameter `index` of `function`.
    pub fn param_type(&self, function: &FunctionDecl, index: usize) -> Option<QualType> {
        let param = *function.params.get(index)?;
        self.decls.try_get(param)?.as_var().map(|v| v.ty)
    }

    /// Returns the record that declares `id` as a member.
    pub fn parent_record(&self, id: DeclId) -> Option<DeclId> {
        let parent = self.decls.try_get(id)?.parent?;
        self.record(parent).map(|_| parent)
    }

    /// Classifies how a one-parameter member of `record` takes a `record` argument.
    ///
    /// Returns `None` unless the function has exactly one parameter whose
    /// reference-stripped, unqualified canonical type is the record itself.
    pub fn record_param_passing(
        &self,
        function: &FunctionDecl,
        record: DeclId,
    ) -> Option<ParamPassing> {
        if function.params.len() != 1 {
            return None;
        }
        let ty = self.param_type(function, 0)?;
        if !self.is_record_type(self.types.non_reference(ty), record) {
            return None;
        }
        let canonical = self.types.canonical(ty);
        Some(match self.types.get(canonical.ty) {
            Type::LValueReference { pointee } => ParamPassing::LValueRef {
                is_const: self.types.canonical(*pointee).is_const,
            },
            Type::RValueReference { .. } => ParamPassing::RValueRef,
            _ => ParamPassing::Value,
        })
    }

    fn special_member_passing(&self, id: DeclId, kind: FunctionKind) -> Option<ParamPassing> {
        let function = self.function(id)?;
        let record = self.parent_record(id)?;
        let matches_kind = match kind {
            FunctionKind::Constructor => function.function_kind == FunctionKind::Constructor,
            _ => function.operator == Some(OverloadedOperator::Equal),
        };
        if !matches_kind {
            return None;
        }
        self.record_param_passing(function, record)
    }

    /// `X(const X &)` or `X(X &)`
    pub fn is_copy_constructor(&self, id: DeclId) -> bool {
        matches!(
            self.special_member_passing(id, FunctionKind::Constructor),
            Some(ParamPassing::LValueRef { .. })
        )
    }

    /// `X(X &&)`
    pub fn is_move_constructor(&self, id: DeclId) -> bool {
        self.special_member_passing(id, FunctionKind::Constructor) == Some(ParamPassing::RValueRef)
    }

    /// `operator=(const X &)`, `operator=(X &)` or `operator=(X)`
    pub fn is_copy_assignment(&self, id: DeclId) -> bool {
        matches!(
            self.special_member_passing(id, FunctionKind::Method),
            Some(ParamPassing::LValueRef { .. } | ParamPassing::Value)
        )
    }

    /// `operator=(X &&)`
    pub fn is_move_assignment(&self, id: DeclId) -> bool {
        self.special_member_passing(id, FunctionKind::Method) == Some(ParamPassing::RValueRef)
    }

    /// Returns `true` if the function is user-declared and neither defaulted
    /// nor deleted on its first declaration.
    pub fn is_user_provided(&self, id: DeclId) -> bool {
        let first = self.canonical_decl(id);
        let (Some(decl), Some(function)) = (self.decls.try_get(first), self.function(first)) else {
            return false;
        };
        !decl.is_implicit && !function.is_defaulted && !function.is_deleted
    }

    /// Returns `true` for the `operator()` of a lambda closure type.
    pub fn is_lambda_call_operator(&self, id: DeclId) -> bool {
        let is_call = self
            .function(id)
            .is_some_and(|f| f.operator == Some(OverloadedOperator::Call));
        is_call
            && self
                .parent_record(id)
                .and_then(|r| self.record(r))
                .is_some_and(|r| r.is_lambda)
    }

    /// Returns the call operator of a lambda closure type.
    pub fn lambda_call_operator(&self, class: DeclId) -> Option<DeclId> {
        self.methods(class)
            .find(|(_, _, f)| f.operator == Some(OverloadedOperator::Call))
            .map(|(id, _, _)| id)
            .or_else(|| {
                // Generic lambdas declare their call operator as a template.
                self.decl(class).members().iter().find_map(|&m| {
                    let template = self.decls.try_get(m)?.as_template()?;
                    let f = self.function(template.templated)?;
                    (f.operator == Some(OverloadedOperator::Call)).then_some(template.templated)
                })
            })
    }

    /// Returns the class template whose pattern is `record`, or that
    /// `record` specializes.
    pub fn class_template_of(&self, record: DeclId) -> Option<DeclId> {
        let r = self.record(record)?;
        r.described_template
            .or_else(|| r.specialization.map(|s| s.template))
    }

    /// Returns the unqualified name used for `id` in qualified names.
    pub fn display_name(&self, id: DeclId) -> String {
        let Some(decl) = self.decls.try_get(id) else {
            return String::from("<invalid>");
        };
        match &decl.kind {
            DeclKind::Record(r) if r.is_lambda => String::from("(lambda)"),
            DeclKind::Namespace(ns) if ns.anonymous => String::from("(anonymous namespace)"),
            DeclKind::Record(_) | DeclKind::Enum(_) if decl.name.is_empty() => {
                String::from("(anonymous)")
            }
            _ => decl.name.clone(),
        }
    }

    /// Returns the fully qualified name of a declaration, e.g. `ns::Outer::Inner`.
    pub fn qualified_name(&self, id: DeclId) -> String {
        let mut parts = vec![self.display_name(id)];
        let mut current = self.decls.try_get(id).and_then(|d| d.parent);
        let mut budget = self.decls.len();
        while let Some(parent) = current {
            if budget == 0 {
                break;
            }
            budget -= 1;
            let Some(decl) = self.decls.try_get(parent) else {
                break;
            };
            match &decl.kind {
                DeclKind::LinkageSpec(_) => {}
                DeclKind::Namespace(ns) if ns.is_inline => {}
                _ => parts.push(self.display_name(parent)),
            }
            current = decl.parent;
        }
        parts.reverse();
        parts.join("::")
    }

    /// Iterates over the semantic parents of `id`, innermost first.
    pub fn ancestors(&self, id: DeclId) -> impl Iterator<Item = DeclId> + '_ {
        let mut current = self.decls.try_get(id).and_then(|d| d.parent);
        let mut budget = self.decls.len();
        std::iter::from_fn(move || {
            let next = current?;
            if budget == 0 {
                return None;
            }
            budget -= 1;
            current = self.decls.try_get(next).and_then(|d| d.parent);
            Some(next)
        })
    }

    /// Prints a type the way the compiler spells it in diagnostics, e.g. `const int &`.
    pub fn type_name(&self, qt: QualType) -> String {
        let mut out = String::new();
        self.write_type(qt, &mut out, 0);
        out
    }

    fn write_type(&self, qt: QualType, out: &mut String, depth: u32) {
        if depth > 32 || !self.types.contains(qt.ty) {
            out.push_str("<type>");
            return;
        }
        let next = depth + 1;
        match self.types.get(qt.ty) {
            Type::Pointer { pointee } => {
                self.write_type(*pointee, out, next);
                out.push_str(" *");
                if qt.is_const {
                    out.push_str("const");
                }
                return;
            }
            Type::LValueReference { pointee } => {
                self.write_type(*pointee, out, next);
                out.push_str(" &");
                return;
            }
            Type::RValueReference { pointee } => {
                self.write_type(*pointee, out, next);
                out.push_str(" &&");
                return;
            }
            _ => {}
        }
        if qt.is_const {
            out.push_str("const ");
        }
        if qt.is_volatile {
            out.push_str("volatile ");
        }
        match self.types.get(qt.ty) {
            Type::Builtin { builtin } => out.push_str(builtin.spelling()),
            Type::Array { element, size } => {
                self.write_type(*element, out, next);
                match size {
                    Some(n) => out.push_str(&format!("[{n}]")),
                    None => out.push_str("[]"),
                }
            }
            Type::Function {
                ret,
                params,
                variadic,
            } => {
                self.write_type(*ret, out, next);
                out.push_str(" (");
                let mut rendered: Vec<String> = params
                    .iter()
                    .map(|p| {
                        let mut s = String::new();
                        self.write_type(*p, &mut s, next);
                        s
                    })
                    .collect();
                if *variadic {
                    rendered.push(String::from("..."));
                }
                out.push_str(&rendered.join(", "));
                out.push(')');
            }
            Type::Record { decl } | Type::Enum { decl } => {
                out.push_str(&self.qualified_name(*decl));
            }
            Type::Typedef { name, .. } => out.push_str(name),
            Type::Auto {
                deduced: Some(deduced),
                ..
            } => self.write_type(*deduced, out, next),
            Type::Auto { deduced: None, .. } => out.push_str("auto"),
            Type::TemplateTypeParm { name } | Type::TemplateSpecialization { name, .. } => {
                out.push_str(name)
            }
            Type::VaList => out.push_str("va_list"),
            Type::Pointer { .. } | Type::LValueReference { .. } | Type::RValueReference { .. } => {}
        }
    }

    /// Checks that every id the unit refers to exists.
    pub fn validate(&self) -> GuardResult<()> {
        if self.file(self.main_file).is_none() {
            return Err(InternalError::new(format!(
                "main file {} is not in the file table",
                self.main_file.as_raw()
            )));
        }
        for (id, ty) in self.types.iter() {
            let ctx = format!("type {}", id.as_raw());
            self.validate_type(&ctx, ty)?;
        }
        for &id in &self.top_level {
            self.check_decl("top-level list", id)?;
        }
        for (id, decl) in self.decls.iter() {
            self.validate_decl(id, decl)?;
        }
        for (id, stmt) in self.stmts.iter() {
            let ctx = format!("statement {}", id.as_raw());
            self.check_span(&ctx, stmt.span)?;
            for child in stmt.kind.child_stmts() {
                self.check_stmt(&ctx, child)?;
            }
            for child in stmt.kind.child_exprs() {
                self.check_expr(&ctx, child)?;
            }
            for child in stmt.kind.child_decls() {
                self.check_decl(&ctx, child)?;
            }
        }
        for (id, expr) in self.exprs.iter() {
            let ctx = format!("expression {}", id.as_raw());
            self.check_span(&ctx, expr.span)?;
            self.check_type(&ctx, expr.ty)?;
            for child in expr.kind.children() {
                self.check_expr(&ctx, child)?;
            }
            match &expr.kind {
                ExprKind::UserDefinedLiteral { operator: decl, .. }
                | ExprKind::DeclRef { decl }
                | ExprKind::Lambda { class: decl, .. }
                | ExprKind::Member { member: decl, .. } => self.check_decl(&ctx, *decl)?,
                ExprKind::Call {
                    callee: Some(decl), ..
                }
                | ExprKind::Construct {
                    constructor: Some(decl),
                    ..
                } => self.check_decl(&ctx, *decl)?,
                _ => {}
            }
        }
        for event in &self.pp_events {
            if let PpEvent::InclusionDirective(inc) = event {
                if let Some(file) = inc.resolved {
                    if self.file(file).is_none() {
                        return Err(InternalError::new(format!(
                            "include of '{}' resolves to unknown file {}",
                            inc.file_name,
                            file.as_raw()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_type(&self, ctx: &str, ty: &Type) -> GuardResult<()> {
        match ty {
            Type::Builtin { .. } | Type::TemplateTypeParm { .. } | Type::VaList => Ok(()),
            Type::Pointer { pointee }
            | Type::LValueReference { pointee }
            | Type::RValueReference { pointee } => self.check_type(ctx, *pointee),
            Type::Array { element, .. } => self.check_type(ctx, *element),
            Type::Function { ret, params, .. } => {
                self.check_type(ctx, *ret)?;
                params.iter().try_for_each(|p| self.check_type(ctx, *p))
            }
            Type::Record { decl } | Type::Enum { decl } => self.check_decl(ctx, *decl),
            Type::Typedef { underlying, .. } => self.check_type(ctx, *underlying),
            Type::Auto { deduced, .. } => deduced.map_or(Ok(()), |d| self.check_type(ctx, d)),
            Type::TemplateSpecialization {
                template,
                canonical,
                ..
            } => {
                if let Some(t) = template {
                    self.check_decl(ctx, *t)?;
                }
                canonical.map_or(Ok(()), |c| self.check_type(ctx, c))
            }
        }
    }

    fn validate_decl(&self, id: DeclId, decl: &Decl) -> GuardResult<()> {
        let ctx = format!("declaration {} ('{}')", id.as_raw(), decl.name);
        self.check_span(&ctx, decl.span)?;
        self.check_span(&ctx, decl.range)?;
        for link in [decl.parent, decl.lexical_parent, decl.first_decl]
            .into_iter()
            .flatten()
        {
            self.check_decl(&ctx, link)?;
        }
        for &member in decl.members() {
            self.check_decl(&ctx, member)?;
        }
        match &decl.kind {
            DeclKind::Record(record) => {
                for base in &record.bases {
                    self.check_type(&ctx, base.ty)?;
                }
                for link in [
                    record.described_template,
                    record.specialization.map(|s| s.template),
                ]
                .into_iter()
                .flatten()
                {
                    self.check_decl(&ctx, link)?;
                }
            }
            DeclKind::Enum(e) => {
                if let Some(underlying) = e.underlying {
                    self.check_type(&ctx, underlying)?;
                }
            }
            DeclKind::Function(f) => {
                self.check_type(&ctx, f.return_type)?;
                for &link in f.params.iter().chain(&f.overridden) {
                    self.check_decl(&ctx, link)?;
                }
                for link in [f.described_template, f.specialization.map(|s| s.template)]
                    .into_iter()
                    .flatten()
                {
                    self.check_decl(&ctx, link)?;
                }
                if let Some(body) = f.body {
                    self.check_stmt(&ctx, body)?;
                }
            }
            DeclKind::Var(v) => {
                self.check_type(&ctx, v.ty)?;
                if let Some(init) = v.init {
                    self.check_expr(&ctx, init)?;
                }
            }
            DeclKind::Field(field) => self.check_type(&ctx, field.ty)?,
            DeclKind::Friend(friend) => match &friend.target {
                Some(FriendTarget::Type(ty)) => self.check_type(&ctx, *ty)?,
                Some(FriendTarget::Decl(target)) => self.check_decl(&ctx, *target)?,
                None => {}
            },
            DeclKind::ClassTemplate(t) | DeclKind::FunctionTemplate(t) => {
                self.check_decl(&ctx, t.templated)?;
                for &spec in &t.specializations {
                    self.check_decl(&ctx, spec)?;
                }
            }
            DeclKind::StaticAssert(sa) => {
                self.check_expr(&ctx, sa.condition)?;
                if let Some(message) = sa.message {
                    self.check_expr(&ctx, message)?;
                }
            }
            DeclKind::Typedef(td) => self.check_type(&ctx, td.underlying)?,
            DeclKind::Namespace(_) | DeclKind::AccessSpec | DeclKind::LinkageSpec(_) => {}
        }
        Ok(())
    }

    fn check_decl(&self, ctx: &str, id: DeclId) -> GuardResult<()> {
        if self.decls.contains(id) {
            Ok(())
        } else {
            Err(InternalError::new(format!(
                "{ctx} refers to missing declaration {}",
                id.as_raw()
            )))
        }
    }

    fn check_stmt(&self, ctx: &str, id: StmtId) -> GuardResult<()> {
        if self.stmts.contains(id) {
            Ok(())
        } else {
            Err(InternalError::new(format!(
                "{ctx} refers to missing statement {}",
                id.as_raw()
            )))
        }
    }

    fn check_expr(&self, ctx: &str, id: ExprId) -> GuardResult<()> {
        if self.exprs.contains(id) {
            Ok(())
        } else {
            Err(InternalError::new(format!(
                "{ctx} refers to missing expression {}",
                id.as_raw()
            )))
        }
    }

    fn check_type(&self, ctx: &str, qt: QualType) -> GuardResult<()> {
        self.check_type_id(ctx, qt.ty)
    }

    fn check_type_id(&self, ctx: &str, id: TypeId) -> GuardResult<()> {
        if self.types.contains(id) {
            Ok(())
        } else {
            Err(InternalError::new(format!(
                "{ctx} refers to missing type {}",
                id.as_raw()
            )))
        }
    }

    fn check_span(&self, ctx: &str, span: Span) -> GuardResult<()> {
        if span.is_dummy() || self.file(span.file).is_some() {
            Ok(())
        } else {
            Err(InternalError::new(format!(
                "{ctx} points into unknown file {}",
                span.file.as_raw()
            )))
        }
    }
}

impl SemaIndex {
    fn build(tu: &TranslationUnit) -> Self {
        let mut definitions = HashMap::new();
        for (id, decl) in tu.decls.iter() {
            let is_definition = match &decl.kind {
                DeclKind::Record(record) => record.is_definition,
                DeclKind::Function(function) => {
                    function.body.is_some() || function.is_defaulted || function.is_deleted
                }
                _ => false,
            };
            if is_definition {
                definitions
                    .entry(decl.first_decl.unwrap_or(id))
                    .or_insert(id);
            }
        }

        let mut inheritance = InheritanceGraph::new();
        for (id, decl) in tu.decls.iter() {
            let Some(record) = decl.as_record() else {
                continue;
            };
            if !record.is_definition {
                continue;
            }
            inheritance.add_record(id);
            for (specifier, base) in record.bases.iter().enumerate() {
                if let BaseResolution::Record(target) = resolve_base_with(tu, &definitions, base) {
                    inheritance.add_base(
                        id,
                        target,
                        BaseEdge {
                            specifier,
                            is_virtual: base.is_virtual,
                        },
                    );
                }
            }
        }

        Self {
            definitions,
            inheritance,
        }
    }
}

fn resolve_base_with(
    tu: &TranslationUnit,
    definitions: &HashMap<DeclId, DeclId>,
    base: &BaseSpecifier,
) -> BaseResolution {
    let prefer_definition = |decl: DeclId| {
        definitions
            .get(&tu.canonical_decl(decl))
            .copied()
            .unwrap_or(decl)
    };
    if let Some(decl) = tu.types.as_record(base.ty) {
        return BaseResolution::Record(prefer_definition(decl));
    }
    // Look through aliases for a specialization of a known template.
    let mut qt = base.ty;
    for _ in 0..64 {
        match tu.types.get(qt.ty) {
            Type::Typedef { underlying, .. } => qt = *underlying,
            Type::TemplateSpecialization { name, template, .. } => {
                let pattern = template
                    .and_then(|t| tu.decls.try_get(t))
                    .and_then(|t| match &t.kind {
                        DeclKind::ClassTemplate(t) => Some(t.templated),
                        _ => None,
                    });
                return match pattern {
                    Some(record) => BaseResolution::Record(prefer_definition(record)),
                    None => BaseResolution::UnresolvedTemplate(name.clone()),
                };
            }
            _ => break,
        }
    }
    BaseResolution::Unresolved(tu.type_name(base.ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TuBuilder;
    use crate::decl::{AccessSpecifier, TagKind};
    use crate::types::BuiltinKind;

    #[test]
    fn qualified_names_follow_parents() {
        let mut b = TuBuilder::new("main.cc");
        let ns = b.namespace(None, "outer");
        let anon = b.anonymous_namespace(Some(ns));
        let rec = b.record(Some(anon), TagKind::Class, "Widget");
        let tu = b.finish();
        assert_eq!(
            tu.qualified_name(rec),
            "outer::(anonymous namespace)::Widget"
        );
    }

    #[test]
    fn type_names_match_compiler_spelling() {
        let mut b = TuBuilder::new("main.cc");
        let int = b.builtin(BuiltinKind::Int);
        let cref = b.lvalue_ref(int.with_const());
        let ptr = b.pointer(int);
        let const_ptr = ptr.with_const();
        let unsigned = b.builtin(BuiltinKind::UnsignedLong);
        let rec = b.record(None, TagKind::Struct, "Point");
        let rec_ty = b.record_type(rec);
        let rref = b.rvalue_ref(rec_ty);
        let tu = b.finish();
        assert_eq!(tu.type_name(cref), "const int &");
        assert_eq!(tu.type_name(ptr), "int *");
        assert_eq!(tu.type_name(const_ptr), "int *const");
        assert_eq!(tu.type_name(unsigned), "unsigned long");
        assert_eq!(tu.type_name(rref), "Point &&");
    }

    #[test]
    fn special_members_are_classified() {
        let mut b = TuBuilder::new("main.cc");
        let rec = b.record(None, TagKind::Class, "Buffer");
        let rec_ty = b.record_type(rec);
        let cref = b.lvalue_ref(rec_ty.with_const());
        let rref = b.rvalue_ref(rec_ty);
        let void = b.builtin(BuiltinKind::Void);
        let self_ref = b.lvalue_ref(rec_ty);
        let copy_ctor = b.constructor(rec, &[cref]);
        let move_ctor = b.constructor(rec, &[rref]);
        let copy_assign = b.operator_method(rec, OverloadedOperator::Equal, self_ref, &[cref]);
        let move_assign = b.operator_method(rec, OverloadedOperator::Equal, self_ref, &[rref]);
        let other = b.method(rec, "reset", void, &[]);
        let tu = b.finish();
        assert!(tu.is_copy_constructor(copy_ctor));
        assert!(!tu.is_copy_constructor(move_ctor));
        assert!(tu.is_move_constructor(move_ctor));
        assert!(tu.is_copy_assignment(copy_assign));
        assert!(tu.is_move_assignment(move_assign));
        assert!(!tu.is_copy_assignment(other));
        assert!(tu.is_user_provided(copy_ctor));
    }

    #[test]
    fn base_resolution_and_derivation() {
        let mut b = TuBuilder::new("main.cc");
        let base = b.record(None, TagKind::Class, "Base");
        let mid = b.record(None, TagKind::Class, "Mid");
        let leaf = b.record(None, TagKind::Class, "Leaf");
        b.base(mid, base, AccessSpecifier::Public, false);
        b.base(leaf, mid, AccessSpecifier::Public, false);
        let tu = b.finish();
        let spec = tu.record(leaf).unwrap().bases[0];
        assert_eq!(tu.resolve_base(&spec), BaseResolution::Record(mid));
        assert!(tu.is_derived_from(leaf, base));
        assert!(!tu.is_derived_from(base, leaf));
    }

    #[test]
    fn template_specialization_base_resolves_to_pattern() {
        let mut b = TuBuilder::new("main.cc");
        let pattern = b.record(None, TagKind::Class, "Box");
        let template = b.class_template(None, pattern);
        let spec_ty = b.intern(Type::TemplateSpecialization {
            name: "Box<T>".into(),
            template: Some(template),
            canonical: None,
            dependent: true,
        });
        let unknown_ty = b.intern(Type::TemplateSpecialization {
            name: "Mystery<T>".into(),
            template: None,
            canonical: None,
            dependent: true,
        });
        let derived = b.record(None, TagKind::Class, "Derived");
        b.base_type(derived, spec_ty, AccessSpecifier::Public, false);
        b.base_type(derived, unknown_ty, AccessSpecifier::Public, false);
        let tu = b.finish();
        let bases = tu.record(derived).unwrap().bases.clone();
        assert_eq!(tu.resolve_base(&bases[0]), BaseResolution::Record(pattern));
        assert_eq!(
            tu.resolve_base(&bases[1]),
            BaseResolution::UnresolvedTemplate("Mystery<T>".into())
        );
    }

    #[test]
    fn definitions_are_indexed_by_first_declaration() {
        let mut b = TuBuilder::new("main.cc");
        let forward = b.record(None, TagKind::Class, "Late");
        b.edit_record(forward, |r| r.is_definition = false);
        let def = b.record(None, TagKind::Class, "Late");
        b.edit_decl(def, |d| d.first_decl = Some(forward));
        let tu = b.finish();
        assert_eq!(tu.definition(forward), Some(def));
        assert!(tu.same_entity(forward, def));
    }

    #[test]
    fn validate_reports_dangling_ids() {
        let mut b = TuBuilder::new("main.cc");
        let rec = b.record(None, TagKind::Class, "Broken");
        b.edit_decl(rec, |d| d.parent = Some(DeclId::from_raw(99)));
        let tu = b.finish();
        let err = tu.validate().unwrap_err();
        assert!(err.message.contains("missing declaration 99"), "{}", err.message);
    }

    #[test]
    fn source_db_ids_match_file_table() {
        let mut b = TuBuilder::new("main.cc");
        let header = b.add_file("widget.hh", FileKind::User, Some("#pragma once\n".into()));
        let tu = b.finish();
        let db = tu.source_db();
        assert_eq!(db.len(), 2);
        assert_eq!(db.get_file(header).content, "#pragma once\n");
        assert!(tu.validate().is_ok());
    }

    #[test]
    fn json_round_trip_keeps_queries_working() {
        let mut b = TuBuilder::new("main.cc");
        let base = b.record(None, TagKind::Class, "Base");
        let leaf = b.record(None, TagKind::Class, "Leaf");
        b.base(leaf, base, AccessSpecifier::Public, false);
        let tu = b.finish();
        let json = serde_json::to_string(&tu).unwrap();
        let back: TranslationUnit = serde_json::from_str(&json).unwrap();
        assert!(back.validate().is_ok());
        assert!(back.is_derived_from(leaf, base));
        assert_eq!(back.qualified_name(leaf), "Leaf");
    }
}
