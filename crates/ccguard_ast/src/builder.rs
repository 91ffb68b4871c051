//! Programmatic construction of translation units.
//!
//! Host exporters that link against ccguard build units in-process with
//! [`TuBuilder`]; the test suites use it to describe small C++ programs.
//! Declarations get fresh, distinct one-byte spans in the current file so
//! diagnostics can be told apart; callers that care about exact positions
//! overwrite them with [`TuBuilder::edit_decl`].

use crate::decl::{
    AccessSpecifier, Attribute, AttrKind, BaseSpecifier, Decl, DeclKind, EnumDecl, FieldDecl,
    FunctionDecl, FunctionKind, NamespaceDecl, OverloadedOperator, RecordDecl,
    SpecializationInfo, SpecializationKind, TagKind, TemplateDecl, VarDecl,
};
use crate::expr::{Expr, ExprKind};
use crate::ids::{DeclId, ExprId, StmtId};
use crate::pp::PpEvent;
use crate::stmt::{Stmt, StmtKind};
use crate::types::{BuiltinKind, QualType, Type};
use crate::unit::{FileEntry, FileKind, TranslationUnit};
use ccguard_source::{FileId, Span};
use std::collections::HashMap;
use std::path::PathBuf;

/// Incrementally assembles a [`TranslationUnit`].
pub struct TuBuilder {
    tu: TranslationUnit,
    cursor: FileId,
    offsets: HashMap<FileId, u32>,
}

impl TuBuilder {
    /// Starts a unit whose main file is `main_path`, without file content.
    pub fn new(main_path: impl Into<PathBuf>) -> Self {
        let tu = TranslationUnit::new(main_path);
        let cursor = tu.main_file;
        Self {
            tu,
            cursor,
            offsets: HashMap::new(),
        }
    }

    /// Starts a unit whose main file has the given text.
    pub fn with_source(main_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let mut builder = Self::new(main_path);
        builder.tu.files[0].content = Some(content.into());
        builder
    }

    /// Returns the main file.
    pub fn main_file(&self) -> FileId {
        self.tu.main_file
    }

    /// Adds a file to the file table.
    pub fn add_file(
        &mut self,
        path: impl Into<PathBuf>,
        kind: FileKind,
        content: Option<String>,
    ) -> FileId {
        let id = FileId::from_raw(self.tu.files.len() as u32);
        self.tu.files.push(FileEntry {
            path: path.into(),
            kind,
            content,
        });
        id
    }

    /// Places subsequently created nodes in `file`.
    pub fn in_file(&mut self, file: FileId) -> &mut Self {
        self.cursor = file;
        self
    }

    /// Returns a fresh one-byte span in the current file.
    pub fn span(&mut self) -> Span {
        let file = self.cursor;
        let offset = self.offsets.entry(file).or_insert(0);
        let start = *offset;
        *offset += 2;
        Span::new(file, start, start + 1)
    }

    /// Read access to the unit under construction.
    pub fn unit(&self) -> &TranslationUnit {
        &self.tu
    }

    /// Finishes construction.
    pub fn finish(self) -> TranslationUnit {
        self.tu
    }

    // -- types -----------------------------------------------------------

    /// Interns a type.
    pub fn intern(&mut self, ty: Type) -> QualType {
        QualType::new(self.tu.types.intern(ty))
    }

    /// Interns a builtin type.
    pub fn builtin(&mut self, builtin: BuiltinKind) -> QualType {
        self.intern(Type::Builtin { builtin })
    }

    /// Interns `T *`.
    pub fn pointer(&mut self, pointee: QualType) -> QualType {
        self.intern(Type::Pointer { pointee })
    }

    /// Interns `T &`.
    pub fn lvalue_ref(&mut self, pointee: QualType) -> QualType {
        self.intern(Type::LValueReference { pointee })
    }

    /// Interns `T &&`.
    pub fn rvalue_ref(&mut self, pointee: QualType) -> QualType {
        self.intern(Type::RValueReference { pointee })
    }

    /// Interns the type of a record.
    pub fn record_type(&mut self, record: DeclId) -> QualType {
        let decl = self.tu.canonical_decl(record);
        self.intern(Type::Record { decl })
    }

    /// Interns the type of an enum.
    pub fn enum_type(&mut self, decl: DeclId) -> QualType {
        let decl = self.tu.canonical_decl(decl);
        self.intern(Type::Enum { decl })
    }

    // -- declarations ----------------------------------------------------

    fn alloc_decl(&mut self, parent: Option<DeclId>, name: &str, kind: DeclKind) -> DeclId {
        let span = self.span();
        let access = match parent.and_then(|p| self.tu.record(p)) {
            Some(r) if r.tag == TagKind::Class => AccessSpecifier::Private,
            Some(_) => AccessSpecifier::Public,
            None => AccessSpecifier::None,
        };
        self.tu.decls.alloc(Decl {
            kind,
            name: name.to_string(),
            span,
            range: span,
            parent,
            lexical_parent: parent,
            access,
            is_implicit: false,
            first_decl: None,
            attrs: Vec::new(),
        })
    }

    /// Adds a declaration and lists it as a member of `parent`, or at top level.
    pub fn add_decl(&mut self, parent: Option<DeclId>, name: &str, kind: DeclKind) -> DeclId {
        let id = self.alloc_decl(parent, name, kind);
        self.push_member(parent, id);
        id
    }

    fn push_member(&mut self, parent: Option<DeclId>, id: DeclId) {
        match parent {
            None => self.tu.top_level.push(id),
            Some(p) => match &mut self.tu.decls.get_mut(p).kind {
                DeclKind::Namespace(ns) => ns.members.push(id),
                DeclKind::Record(r) => r.members.push(id),
                DeclKind::LinkageSpec(spec) => spec.members.push(id),
                _ => {}
            },
        }
    }

    fn replace_member(&mut self, parent: Option<DeclId>, old: DeclId, new: DeclId) {
        let list = match parent {
            None => &mut self.tu.top_level,
            Some(p) => match &mut self.tu.decls.get_mut(p).kind {
                DeclKind::Namespace(ns) => &mut ns.members,
                DeclKind::Record(r) => &mut r.members,
                DeclKind::LinkageSpec(spec) => &mut spec.members,
                _ => return,
            },
        };
        match list.iter().position(|&m| m == old) {
            Some(pos) => list[pos] = new,
            None => list.push(new),
        }
    }

    fn remove_member(&mut self, parent: Option<DeclId>, id: DeclId) {
        let list = match parent {
            None => &mut self.tu.top_level,
            Some(p) => match &mut self.tu.decls.get_mut(p).kind {
                DeclKind::Namespace(ns) => &mut ns.members,
                DeclKind::Record(r) => &mut r.members,
                DeclKind::LinkageSpec(spec) => &mut spec.members,
                _ => return,
            },
        };
        list.retain(|&m| m != id);
    }

    /// Applies `f` to a declaration.
    pub fn edit_decl(&mut self, id: DeclId, f: impl FnOnce(&mut Decl)) -> &mut Self {
        f(self.tu.decls.get_mut(id));
        self
    }

    /// Applies `f` to a record's data; does nothing for other declarations.
    pub fn edit_record(&mut self, id: DeclId, f: impl FnOnce(&mut RecordDecl)) -> &mut Self {
        if let DeclKind::Record(r) = &mut self.tu.decls.get_mut(id).kind {
            f(r);
        }
        self
    }

    /// Applies `f` to a function's data; does nothing for other declarations.
    pub fn edit_function(&mut self, id: DeclId, f: impl FnOnce(&mut FunctionDecl)) -> &mut Self {
        if let DeclKind::Function(func) = &mut self.tu.decls.get_mut(id).kind {
            f(func);
        }
        self
    }

    /// Applies `f` to a variable's data; does nothing for other declarations.
    pub fn edit_var(&mut self, id: DeclId, f: impl FnOnce(&mut VarDecl)) -> &mut Self {
        if let DeclKind::Var(v) = &mut self.tu.decls.get_mut(id).kind {
            f(v);
        }
        self
    }

    /// Adds an attribute at a fresh span.
    pub fn attr(&mut self, id: DeclId, kind: AttrKind) -> Span {
        let span = self.span();
        self.tu.decls.get_mut(id).attrs.push(Attribute { kind, span });
        span
    }

    /// `namespace name { }`
    pub fn namespace(&mut self, parent: Option<DeclId>, name: &str) -> DeclId {
        self.add_decl(parent, name, DeclKind::Namespace(NamespaceDecl::default()))
    }

    /// `namespace { }`
    pub fn anonymous_namespace(&mut self, parent: Option<DeclId>) -> DeclId {
        self.add_decl(
            parent,
            "",
            DeclKind::Namespace(NamespaceDecl {
                anonymous: true,
                ..NamespaceDecl::default()
            }),
        )
    }

    /// A record definition. Classes start out as non-aggregates, structs
    /// and unions as aggregates.
    pub fn record(&mut self, parent: Option<DeclId>, tag: TagKind, name: &str) -> DeclId {
        let tag_span = self.span();
        let brace = self.span();
        self.add_decl(
            parent,
            name,
            DeclKind::Record(RecordDecl {
                tag,
                tag_span,
                is_definition: true,
                is_lambda: false,
                is_aggregate: tag != TagKind::Class,
                is_abstract: false,
                is_templated: false,
                bases: Vec::new(),
                members: Vec::new(),
                brace_range: Some(brace),
                described_template: None,
                specialization: None,
            }),
        )
    }

    /// Adds a base specifier naming another record; returns its index.
    pub fn base(
        &mut self,
        derived: DeclId,
        base: DeclId,
        access: AccessSpecifier,
        is_virtual: bool,
    ) -> usize {
        let ty = self.record_type(base);
        self.base_type(derived, ty, access, is_virtual)
    }

    /// Adds a base specifier of an arbitrary type; returns its index.
    pub fn base_type(
        &mut self,
        derived: DeclId,
        ty: QualType,
        access: AccessSpecifier,
        is_virtual: bool,
    ) -> usize {
        let span = self.span();
        let mut index = 0;
        self.edit_record(derived, |r| {
            index = r.bases.len();
            r.bases.push(BaseSpecifier {
                ty,
                access,
                is_virtual,
                span,
            });
        });
        index
    }

    /// `enum name { }` or `enum class name { }`
    pub fn enumeration(&mut self, parent: Option<DeclId>, name: &str, scoped: bool) -> DeclId {
        let keyword_span = self.span();
        self.add_decl(
            parent,
            name,
            DeclKind::Enum(EnumDecl {
                scoped,
                underlying: None,
                keyword_span: Some(keyword_span),
            }),
        )
    }

    /// A non-static data member.
    pub fn field(&mut self, record: DeclId, name: &str, ty: QualType) -> DeclId {
        self.add_decl(Some(record), name, DeclKind::Field(FieldDecl { ty }))
    }

    /// `public:`, `protected:` or `private:`
    pub fn access_spec(&mut self, record: DeclId, access: AccessSpecifier) -> DeclId {
        let id = self.add_decl(Some(record), "", DeclKind::AccessSpec);
        self.tu.decls.get_mut(id).access = access;
        id
    }

    /// A variable declared in `parent` (a namespace, function, or the unit).
    pub fn var(&mut self, parent: Option<DeclId>, name: &str, ty: QualType) -> DeclId {
        let type_span = self.span();
        self.add_decl(
            parent,
            name,
            DeclKind::Var(VarDecl {
                ty,
                type_span: Some(type_span),
                init: None,
                is_param: false,
                is_init_capture: false,
                is_decomposition: false,
                is_extern_c: false,
                specialization: None,
            }),
        )
    }

    fn param(&mut self, function: DeclId, ty: QualType) -> DeclId {
        let type_span = self.span();
        self.alloc_decl(
            Some(function),
            "",
            DeclKind::Var(VarDecl {
                ty,
                type_span: Some(type_span),
                init: None,
                is_param: true,
                is_init_capture: false,
                is_decomposition: false,
                is_extern_c: false,
                specialization: None,
            }),
        )
    }

    fn new_function(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        function_kind: FunctionKind,
        return_type: QualType,
        params: &[QualType],
        listed: bool,
    ) -> DeclId {
        let return_type_span = self.span();
        let params_range = self.span();
        let kind = DeclKind::Function(FunctionDecl {
            function_kind,
            params: Vec::new(),
            return_type,
            return_type_span: Some(return_type_span),
            trailing_return: false,
            params_range,
            body: None,
            operator: None,
            is_virtual: false,
            is_pure: false,
            is_const: false,
            is_static: false,
            is_defaulted: false,
            is_deleted: false,
            is_noexcept: false,
            is_variadic: false,
            is_extern_c: false,
            overridden: Vec::new(),
            described_template: None,
            specialization: None,
            is_templated: false,
        });
        let id = if listed {
            self.add_decl(parent, name, kind)
        } else {
            self.alloc_decl(parent, name, kind)
        };
        let param_ids: Vec<DeclId> = params.iter().map(|&ty| self.param(id, ty)).collect();
        self.edit_function(id, |f| f.params = param_ids);
        id
    }

    /// A free function declared in `parent`.
    pub fn function(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        ret: QualType,
        params: &[QualType],
    ) -> DeclId {
        self.new_function(parent, name, FunctionKind::Free, ret, params, true)
    }

    /// A free `operator@` declared in `parent`.
    pub fn free_operator(
        &mut self,
        parent: Option<DeclId>,
        op: OverloadedOperator,
        ret: QualType,
        params: &[QualType],
    ) -> DeclId {
        let name = format!("operator{}", op.token());
        let id = self.new_function(parent, &name, FunctionKind::Free, ret, params, true);
        self.edit_function(id, |f| f.operator = Some(op));
        id
    }

    /// A member function of `record`.
    pub fn method(
        &mut self,
        record: DeclId,
        name: &str,
        ret: QualType,
        params: &[QualType],
    ) -> DeclId {
        self.new_function(Some(record), name, FunctionKind::Method, ret, params, true)
    }

    /// A member `operator@` of `record`.
    pub fn operator_method(
        &mut self,
        record: DeclId,
        op: OverloadedOperator,
        ret: QualType,
        params: &[QualType],
    ) -> DeclId {
        let name = format!("operator{}", op.token());
        let id = self.new_function(Some(record), &name, FunctionKind::Method, ret, params, true);
        self.edit_function(id, |f| f.operator = Some(op));
        id
    }

    /// A pure virtual method; marks the record abstract.
    pub fn pure_method(
        &mut self,
        record: DeclId,
        name: &str,
        ret: QualType,
        params: &[QualType],
    ) -> DeclId {
        let id = self.method(record, name, ret, params);
        self.edit_function(id, |f| {
            f.is_virtual = true;
            f.is_pure = true;
        });
        self.edit_record(record, |r| r.is_abstract = true);
        id
    }

    /// A constructor of `record`.
    pub fn constructor(&mut self, record: DeclId, params: &[QualType]) -> DeclId {
        let void = self.builtin(BuiltinKind::Void);
        let name = self.tu.decl(record).name.clone();
        self.new_function(
            Some(record),
            &name,
            FunctionKind::Constructor,
            void,
            params,
            true,
        )
    }

    /// A destructor of `record`.
    pub fn destructor(&mut self, record: DeclId) -> DeclId {
        let void = self.builtin(BuiltinKind::Void);
        let name = format!("~{}", self.tu.decl(record).name);
        self.new_function(
            Some(record),
            &name,
            FunctionKind::Destructor,
            void,
            &[],
            true,
        )
    }

    /// `virtual ~R() = default;`
    pub fn virtual_default_destructor(&mut self, record: DeclId) -> DeclId {
        let id = self.destructor(record);
        self.edit_function(id, |f| {
            f.is_virtual = true;
            f.is_defaulted = true;
        });
        id
    }

    /// Declares `pattern` as the pattern of a class template, which takes
    /// its place in the enclosing scope.
    pub fn class_template(&mut self, parent: Option<DeclId>, pattern: DeclId) -> DeclId {
        let name = self.tu.decl(pattern).name.clone();
        let template = self.alloc_decl(
            parent,
            &name,
            DeclKind::ClassTemplate(TemplateDecl {
                templated: pattern,
                specializations: Vec::new(),
            }),
        );
        self.replace_member(parent, pattern, template);
        self.edit_record(pattern, |r| {
            r.described_template = Some(template);
            r.is_templated = true;
        });
        template
    }

    /// Declares `pattern` as the pattern of a function template.
    pub fn function_template(&mut self, parent: Option<DeclId>, pattern: DeclId) -> DeclId {
        let name = self.tu.decl(pattern).name.clone();
        let template = self.alloc_decl(
            parent,
            &name,
            DeclKind::FunctionTemplate(TemplateDecl {
                templated: pattern,
                specializations: Vec::new(),
            }),
        );
        self.replace_member(parent, pattern, template);
        self.edit_function(pattern, |f| {
            f.described_template = Some(template);
            f.is_templated = true;
        });
        template
    }

    /// Registers `decl` (a record or function) as a specialization of `template`.
    ///
    /// Instantiations are removed from their scope's member list, since the
    /// compiler produces them without a declaration in the source.
    pub fn specialize(&mut self, template: DeclId, decl: DeclId, kind: SpecializationKind) {
        let info = SpecializationInfo { template, kind };
        match &mut self.tu.decls.get_mut(decl).kind {
            DeclKind::Record(r) => r.specialization = Some(info),
            DeclKind::Function(f) => f.specialization = Some(info),
            DeclKind::Var(v) => v.specialization = Some(info),
            _ => {}
        }
        if let DeclKind::ClassTemplate(t) | DeclKind::FunctionTemplate(t) =
            &mut self.tu.decls.get_mut(template).kind
        {
            t.specializations.push(decl);
        }
        if kind.is_instantiation() {
            let parent = self.tu.decl(decl).parent;
            self.remove_member(parent, decl);
        }
    }

    /// A lambda closure type with its call operator. The closure is not
    /// listed in any scope; it is reached through its lambda expression.
    pub fn lambda_class(
        &mut self,
        parent: Option<DeclId>,
        ret: QualType,
        params: &[QualType],
    ) -> (DeclId, DeclId) {
        let tag_span = self.span();
        let class = self.alloc_decl(
            parent,
            "",
            DeclKind::Record(RecordDecl {
                tag: TagKind::Class,
                tag_span,
                is_definition: true,
                is_lambda: true,
                is_aggregate: false,
                is_abstract: false,
                is_templated: false,
                bases: Vec::new(),
                members: Vec::new(),
                brace_range: None,
                described_template: None,
                specialization: None,
            }),
        );
        let call = self.operator_method(class, OverloadedOperator::Call, ret, params);
        self.edit_decl(call, |d| d.access = AccessSpecifier::Public);
        self.edit_function(call, |f| f.is_const = true);
        (class, call)
    }

    // -- statements and expressions ---------------------------------------

    /// Adds a statement with a fresh span.
    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.span();
        self.tu.stmts.alloc(Stmt { kind, span })
    }

    /// Adds a statement with an explicit span.
    pub fn stmt_at(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.tu.stmts.alloc(Stmt { kind, span })
    }

    /// `{ body... }`
    pub fn compound(&mut self, body: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Compound { body })
    }

    /// Adds an expression with a fresh span.
    pub fn expr(&mut self, kind: ExprKind, ty: QualType) -> ExprId {
        let span = self.span();
        self.tu.exprs.alloc(Expr { kind, ty, span })
    }

    /// Adds an expression with an explicit span.
    pub fn expr_at(&mut self, kind: ExprKind, ty: QualType, span: Span) -> ExprId {
        self.tu.exprs.alloc(Expr { kind, ty, span })
    }

    /// An expression statement.
    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr { expr })
    }

    /// A reference to a declaration, typed as `ty`.
    pub fn decl_ref(&mut self, decl: DeclId, ty: QualType) -> ExprId {
        self.expr(ExprKind::DeclRef { decl }, ty)
    }

    /// Gives `function` a body.
    pub fn set_body(&mut self, function: DeclId, body: StmtId) -> &mut Self {
        self.edit_function(function, |f| f.body = Some(body))
    }

    /// Records a preprocessor event.
    pub fn pp(&mut self, event: PpEvent) -> &mut Self {
        self.tu.pp_events.push(event);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_are_listed_in_order() {
        let mut b = TuBuilder::new("main.cc");
        let int = b.builtin(BuiltinKind::Int);
        let rec = b.record(None, TagKind::Class, "Counter");
        let f = b.field(rec, "count_", int);
        let m = b.method(rec, "get", int, &[]);
        let tu = b.finish();
        assert_eq!(tu.top_level, vec![rec]);
        assert_eq!(tu.decl(rec).members(), &[f, m]);
        assert_eq!(tu.decl(f).access, AccessSpecifier::Private);
    }

    #[test]
    fn parameters_are_not_members() {
        let mut b = TuBuilder::new("main.cc");
        let int = b.builtin(BuiltinKind::Int);
        let func = b.function(None, "add", int, &[int, int]);
        let tu = b.finish();
        let params = &tu.function(func).unwrap().params;
        assert_eq!(params.len(), 2);
        assert!(tu.decl(params[0]).as_var().unwrap().is_param);
        assert_eq!(tu.top_level, vec![func]);
    }

    #[test]
    fn class_template_replaces_pattern_in_scope() {
        let mut b = TuBuilder::new("main.cc");
        let ns = b.namespace(None, "lib");
        let pattern = b.record(Some(ns), TagKind::Class, "Box");
        let template = b.class_template(Some(ns), pattern);
        let tu = b.finish();
        assert_eq!(tu.decl(ns).members(), &[template]);
        assert_eq!(tu.record(pattern).unwrap().described_template, Some(template));
    }

    #[test]
    fn spans_are_distinct_per_file() {
        let mut b = TuBuilder::new("main.cc");
        let header = b.add_file("a.hh", FileKind::User, None);
        let first = b.span();
        let second = b.span();
        b.in_file(header);
        let third = b.span();
        assert_ne!(first, second);
        assert_eq!(third.file, header);
        assert_eq!(third.start, 0);
    }
}
