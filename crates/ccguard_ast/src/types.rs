//! C++ types as exported by the host compiler.
//!
//! Types are interned in a [`TypeDb`] and referenced through a
//! qualifier-carrying [`QualType`]. Sugar (typedefs, deduced `auto`,
//! resolved template specializations) is kept so diagnostics can print what
//! the user wrote, while every comparison goes through [`TypeDb::canonical`].

use crate::ids::{DeclId, TypeId};
use serde::{Deserialize, Serialize};

/// A type reference together with its top-level cv-qualifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct QualType {
    /// The referenced type.
    pub ty: TypeId,
    /// Whether the type is `const`-qualified at this level.
    #[serde(default)]
    pub is_const: bool,
    /// Whether the type is `volatile`-qualified at this level.
    #[serde(default)]
    pub is_volatile: bool,
}

impl QualType {
    /// Creates an unqualified reference to `ty`.
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            is_const: false,
            is_volatile: false,
        }
    }

    /// Returns the same type with `const` added.
    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Returns the same type with all top-level qualifiers dropped.
    pub fn unqualified(self) -> Self {
        Self::new(self.ty)
    }

    /// Returns `true` if this type carries every qualifier `other` carries.
    pub fn has_quals_of(self, other: QualType) -> bool {
        (self.is_const || !other.is_const) && (self.is_volatile || !other.is_volatile)
    }

    fn merge_quals(self, outer: QualType) -> Self {
        Self {
            ty: self.ty,
            is_const: self.is_const || outer.is_const,
            is_volatile: self.is_volatile || outer.is_volatile,
        }
    }
}

/// Builtin scalar types.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinKind {
    /// `void`
    Void,
    /// `bool`
    Bool,
    /// `char` (signedness follows the target)
    Char,
    /// `signed char`
    SignedChar,
    /// `unsigned char`
    UnsignedChar,
    /// `wchar_t`
    WChar,
    /// `char8_t`
    Char8,
    /// `char16_t`
    Char16,
    /// `char32_t`
    Char32,
    /// `short`
    Short,
    /// `unsigned short`
    UnsignedShort,
    /// `int`
    Int,
    /// `unsigned int`
    UnsignedInt,
    /// `long`
    Long,
    /// `unsigned long`
    UnsignedLong,
    /// `long long`
    LongLong,
    /// `unsigned long long`
    UnsignedLongLong,
    /// `__int128`
    Int128,
    /// `unsigned __int128`
    UnsignedInt128,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `long double`
    LongDouble,
    /// `std::nullptr_t`
    NullPtr,
}

impl BuiltinKind {
    /// Returns `true` for `bool`, the character types, and the integer types.
    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            BuiltinKind::Void
                | BuiltinKind::Float
                | BuiltinKind::Double
                | BuiltinKind::LongDouble
                | BuiltinKind::NullPtr
        )
    }

    /// Returns `true` for `float`, `double`, and `long double`.
    pub fn is_floating(self) -> bool {
        matches!(
            self,
            BuiltinKind::Float | BuiltinKind::Double | BuiltinKind::LongDouble
        )
    }

    /// Returns `true` for signed integer types.
    pub fn is_signed(self, target: &TargetInfo) -> bool {
        match self {
            BuiltinKind::Char => target.char_is_signed,
            BuiltinKind::WChar => target.wchar_is_signed,
            BuiltinKind::SignedChar
            | BuiltinKind::Short
            | BuiltinKind::Int
            | BuiltinKind::Long
            | BuiltinKind::LongLong
            | BuiltinKind::Int128 => true,
            _ => false,
        }
    }

    /// Returns the storage width in bits for arithmetic types.
    pub fn bit_width(self, target: &TargetInfo) -> Option<u32> {
        let width = match self {
            BuiltinKind::Void | BuiltinKind::NullPtr => return None,
            BuiltinKind::Bool => 1,
            BuiltinKind::Char
            | BuiltinKind::SignedChar
            | BuiltinKind::UnsignedChar
            | BuiltinKind::Char8 => 8,
            BuiltinKind::Char16 | BuiltinKind::Short | BuiltinKind::UnsignedShort => 16,
            BuiltinKind::Char32 => 32,
            BuiltinKind::WChar => target.wchar_width,
            BuiltinKind::Int | BuiltinKind::UnsignedInt => target.int_width,
            BuiltinKind::Long | BuiltinKind::UnsignedLong => target.long_width,
            BuiltinKind::LongLong | BuiltinKind::UnsignedLongLong => 64,
            BuiltinKind::Int128 | BuiltinKind::UnsignedInt128 => 128,
            BuiltinKind::Float => 32,
            BuiltinKind::Double => 64,
            BuiltinKind::LongDouble => target.long_double_width,
        };
        Some(width)
    }

    /// Number of value bits an integer type carries, excluding the sign bit.
    pub fn value_bits(self, target: &TargetInfo) -> Option<u32> {
        let width = self.bit_width(target)?;
        if self.is_signed(target) {
            Some(width - 1)
        } else {
            Some(width)
        }
    }

    /// Number of mantissa digits of a floating point type.
    pub fn mantissa_digits(self, target: &TargetInfo) -> Option<u32> {
        match self {
            BuiltinKind::Float => Some(24),
            BuiltinKind::Double => Some(53),
            BuiltinKind::LongDouble if target.long_double_width <= 64 => Some(53),
            BuiltinKind::LongDouble if target.long_double_width == 80 => Some(64),
            BuiltinKind::LongDouble => Some(113),
            _ => None,
        }
    }

    /// Returns the C++ spelling of this type.
    pub fn spelling(self) -> &'static str {
        match self {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "bool",
            BuiltinKind::Char => "char",
            BuiltinKind::SignedChar => "signed char",
            BuiltinKind::UnsignedChar => "unsigned char",
            BuiltinKind::WChar => "wchar_t",
            BuiltinKind::Char8 => "char8_t",
            BuiltinKind::Char16 => "char16_t",
            BuiltinKind::Char32 => "char32_t",
            BuiltinKind::Short => "short",
            BuiltinKind::UnsignedShort => "unsigned short",
            BuiltinKind::Int => "int",
            BuiltinKind::UnsignedInt => "unsigned int",
            BuiltinKind::Long => "long",
            BuiltinKind::UnsignedLong => "unsigned long",
            BuiltinKind::LongLong => "long long",
            BuiltinKind::UnsignedLongLong => "unsigned long long",
            BuiltinKind::Int128 => "__int128",
            BuiltinKind::UnsignedInt128 => "unsigned __int128",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
            BuiltinKind::LongDouble => "long double",
            BuiltinKind::NullPtr => "std::nullptr_t",
        }
    }
}

/// Widths of the target-dependent builtin types.
///
/// Defaults to the LP64 data model used by 64-bit Linux and macOS.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetInfo {
    /// Whether plain `char` is signed.
    pub char_is_signed: bool,
    /// Whether `wchar_t` is signed.
    pub wchar_is_signed: bool,
    /// Width of `wchar_t` in bits.
    pub wchar_width: u32,
    /// Width of `int` in bits.
    pub int_width: u32,
    /// Width of `long` in bits.
    pub long_width: u32,
    /// Storage width of `long double` in bits (64, 80 or 128).
    pub long_double_width: u32,
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self {
            char_is_signed: true,
            wchar_is_signed: true,
            wchar_width: 32,
            int_width: 32,
            long_width: 64,
            long_double_width: 80,
        }
    }
}

/// A C++ type.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Type {
    /// A builtin scalar type.
    Builtin {
        /// Which builtin.
        builtin: BuiltinKind,
    },
    /// `T *`
    Pointer {
        /// The pointee.
        pointee: QualType,
    },
    /// `T &`
    LValueReference {
        /// The referent.
        pointee: QualType,
    },
    /// `T &&`
    RValueReference {
        /// The referent.
        pointee: QualType,
    },
    /// `T[N]` or `T[]`
    Array {
        /// The element type.
        element: QualType,
        /// The bound, if known.
        size: Option<u64>,
    },
    /// A function prototype.
    Function {
        /// The return type.
        ret: QualType,
        /// The parameter types.
        params: Vec<QualType>,
        /// Whether the prototype ends in a C-style ellipsis.
        #[serde(default)]
        variadic: bool,
    },
    /// A class, struct or union, named by its first declaration.
    Record {
        /// The record declaration.
        decl: DeclId,
    },
    /// An enumeration, named by its first declaration.
    Enum {
        /// The enum declaration.
        decl: DeclId,
    },
    /// A typedef or alias declaration.
    Typedef {
        /// The alias name as written.
        name: String,
        /// The aliased type.
        underlying: QualType,
    },
    /// `auto` or `decltype(auto)`.
    Auto {
        /// The deduced type, once known.
        deduced: Option<QualType>,
        /// Whether the placeholder is constrained by a concept.
        #[serde(default)]
        constrained: bool,
    },
    /// A template type parameter. Always dependent.
    TemplateTypeParm {
        /// The parameter name.
        name: String,
    },
    /// A template specialization such as `Base<T>` or `Base<int>`.
    TemplateSpecialization {
        /// The specialization as written.
        name: String,
        /// The class template being specialized, if resolved.
        template: Option<DeclId>,
        /// The type this specialization stands for, once instantiated.
        canonical: Option<QualType>,
        /// Whether any template argument depends on a template parameter.
        #[serde(default)]
        dependent: bool,
    },
    /// The builtin `va_list` type.
    VaList,
}

/// Central type database: interned types for cheap reference.
///
/// Each unique [`Type`] is stored once and referenced by [`TypeId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDb {
    types: Vec<Type>,
}

impl TypeDb {
    /// Creates a new, empty type database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type, returning its [`TypeId`].
    ///
    /// If an identical type already exists, returns the existing ID.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(i) = self.types.iter().position(|existing| existing == &ty) {
            return TypeId::from_raw(i as u32);
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Returns a reference to the type with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.as_raw() as usize]
    }

    /// Returns `true` if `id` refers to an interned type.
    pub fn contains(&self, id: TypeId) -> bool {
        (id.as_raw() as usize) < self.types.len()
    }

    /// Returns the number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are interned.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over all interned types.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| (TypeId::from_raw(i as u32), ty))
    }

    /// Strips typedefs, deduced `auto` and resolved specializations.
    ///
    /// Qualifiers written on the sugar are carried over to the result.
    pub fn canonical(&self, mut qt: QualType) -> QualType {
        // Sugar chains are acyclic in valid input; the bound guards hand-made dumps.
        for _ in 0..64 {
            let next = match self.get(qt.ty) {
                Type::Typedef { underlying, .. } => *underlying,
                Type::Auto {
                    deduced: Some(deduced),
                    ..
                } => *deduced,
                Type::TemplateSpecialization {
                    canonical: Some(canonical),
                    ..
                } => *canonical,
                _ => return qt,
            };
            qt = next.merge_quals(qt);
        }
        qt
    }

    /// Returns the canonical form of `qt`'s type.
    pub fn canonical_type(&self, qt: QualType) -> &Type {
        self.get(self.canonical(qt).ty)
    }

    /// Returns the builtin kind of the canonical type, if it is a builtin.
    pub fn builtin(&self, qt: QualType) -> Option<BuiltinKind> {
        match self.canonical_type(qt) {
            Type::Builtin { builtin } => Some(*builtin),
            _ => None,
        }
    }

    /// Returns `true` if the canonical type is `float`, `double` or `long double`.
    pub fn is_floating(&self, qt: QualType) -> bool {
        self.builtin(qt).is_some_and(BuiltinKind::is_floating)
    }

    /// Returns `true` if the canonical type is a builtin integer type.
    pub fn is_integer(&self, qt: QualType) -> bool {
        self.builtin(qt).is_some_and(BuiltinKind::is_integer)
    }

    /// Returns `true` if the canonical type is `void`.
    pub fn is_void(&self, qt: QualType) -> bool {
        self.builtin(qt) == Some(BuiltinKind::Void)
    }

    /// Returns `true` if the canonical type is `va_list`.
    pub fn is_va_list(&self, qt: QualType) -> bool {
        matches!(self.canonical_type(qt), Type::VaList)
    }

    /// Returns `true` if the type is a reference of either kind.
    pub fn is_reference(&self, qt: QualType) -> bool {
        matches!(
            self.canonical_type(qt),
            Type::LValueReference { .. } | Type::RValueReference { .. }
        )
    }

    /// Returns `true` if the type is an lvalue reference.
    pub fn is_lvalue_reference(&self, qt: QualType) -> bool {
        matches!(self.canonical_type(qt), Type::LValueReference { .. })
    }

    /// Returns `true` if the type is an rvalue reference.
    pub fn is_rvalue_reference(&self, qt: QualType) -> bool {
        matches!(self.canonical_type(qt), Type::RValueReference { .. })
    }

    /// Returns the canonical referent of a reference, or the canonical type itself.
    pub fn non_reference(&self, qt: QualType) -> QualType {
        let canonical = self.canonical(qt);
        match self.get(canonical.ty) {
            Type::LValueReference { pointee } | Type::RValueReference { pointee } => {
                self.canonical(*pointee)
            }
            _ => canonical,
        }
    }

    /// Returns the canonical pointee of a pointer type.
    pub fn pointee(&self, qt: QualType) -> Option<QualType> {
        match self.canonical_type(qt) {
            Type::Pointer { pointee } => Some(self.canonical(*pointee)),
            _ => None,
        }
    }

    /// Returns the record declaration named by the canonical type.
    pub fn as_record(&self, qt: QualType) -> Option<DeclId> {
        match self.canonical_type(qt) {
            Type::Record { decl } => Some(*decl),
            _ => None,
        }
    }

    /// Returns `true` if the type is an `auto` placeholder that was never deduced.
    pub fn is_undeduced_auto(&self, qt: QualType) -> bool {
        matches!(self.canonical_type(qt), Type::Auto { deduced: None, .. })
    }

    /// Returns `true` if the type as written is an `auto` placeholder.
    ///
    /// Unlike the canonical queries this looks through typedef-free sugar only,
    /// so `auto` deduced to `int` still counts.
    pub fn is_written_auto(&self, qt: QualType) -> bool {
        self.written_auto(qt).is_some()
    }

    /// Returns the `auto` placeholder as written, looking through references
    /// and pointers (`const auto &x`, `auto *p`).
    pub fn written_auto(&self, qt: QualType) -> Option<&Type> {
        match self.get(qt.ty) {
            ty @ Type::Auto { .. } => Some(ty),
            Type::LValueReference { pointee }
            | Type::RValueReference { pointee }
            | Type::Pointer { pointee } => self.written_auto(*pointee),
            _ => None,
        }
    }

    /// Returns `true` if the type depends on a template parameter.
    pub fn is_dependent(&self, qt: QualType) -> bool {
        self.is_dependent_bounded(qt, 0)
    }

    fn is_dependent_bounded(&self, qt: QualType, depth: u32) -> bool {
        if depth > 64 {
            return false;
        }
        let next = depth + 1;
        match self.get(qt.ty) {
            Type::TemplateTypeParm { .. } => true,
            Type::TemplateSpecialization {
                dependent,
                canonical,
                ..
            } => *dependent || canonical.is_some_and(|c| self.is_dependent_bounded(c, next)),
            Type::Pointer { pointee }
            | Type::LValueReference { pointee }
            | Type::RValueReference { pointee } => self.is_dependent_bounded(*pointee, next),
            Type::Array { element, .. } => self.is_dependent_bounded(*element, next),
            Type::Function { ret, params, .. } => {
                self.is_dependent_bounded(*ret, next)
                    || params.iter().any(|p| self.is_dependent_bounded(*p, next))
            }
            Type::Typedef { underlying, .. } => self.is_dependent_bounded(*underlying, next),
            Type::Auto { deduced, .. } => deduced.is_some_and(|d| self.is_dependent_bounded(d, next)),
            Type::Builtin { .. } | Type::Record { .. } | Type::Enum { .. } | Type::VaList => false,
        }
    }

    /// Compares two types by canonical structure, including qualifiers at every level.
    pub fn same_type(&self, a: QualType, b: QualType) -> bool {
        self.same_type_bounded(a, b, true, 0)
    }

    /// Compares two types by canonical structure, ignoring top-level qualifiers.
    pub fn same_unqualified(&self, a: QualType, b: QualType) -> bool {
        self.same_type_bounded(a, b, false, 0)
    }

    fn same_type_bounded(&self, a: QualType, b: QualType, quals: bool, depth: u32) -> bool {
        if depth > 64 {
            return false;
        }
        let a = self.canonical(a);
        let b = self.canonical(b);
        if quals && (a.is_const != b.is_const || a.is_volatile != b.is_volatile) {
            return false;
        }
        if a.ty == b.ty {
            return true;
        }
        let next = depth + 1;
        match (self.get(a.ty), self.get(b.ty)) {
            (Type::Builtin { builtin: x }, Type::Builtin { builtin: y }) => x == y,
            (Type::Pointer { pointee: x }, Type::Pointer { pointee: y })
            | (Type::LValueReference { pointee: x }, Type::LValueReference { pointee: y })
            | (Type::RValueReference { pointee: x }, Type::RValueReference { pointee: y }) => {
                self.same_type_bounded(*x, *y, true, next)
            }
            (
                Type::Array {
                    element: x,
                    size: sx,
                },
                Type::Array {
                    element: y,
                    size: sy,
                },
            ) => sx == sy && self.same_type_bounded(*x, *y, true, next),
            (
                Type::Function {
                    ret: rx,
                    params: px,
                    variadic: vx,
                },
                Type::Function {
                    ret: ry,
                    params: py,
                    variadic: vy,
                },
            ) => {
                vx == vy
                    && px.len() == py.len()
                    && self.same_type_bounded(*rx, *ry, true, next)
                    && px
                        .iter()
                        .zip(py)
                        .all(|(x, y)| self.same_unqualified_bounded(*x, *y, next))
            }
            (Type::Record { decl: x }, Type::Record { decl: y })
            | (Type::Enum { decl: x }, Type::Enum { decl: y }) => x == y,
            (Type::TemplateTypeParm { name: x }, Type::TemplateTypeParm { name: y }) => x == y,
            (
                Type::TemplateSpecialization {
                    name: x,
                    template: tx,
                    ..
                },
                Type::TemplateSpecialization {
                    name: y,
                    template: ty,
                    ..
                },
            ) => x == y && tx == ty,
            (Type::Auto { deduced: None, .. }, Type::Auto { deduced: None, .. }) => true,
            (Type::VaList, Type::VaList) => true,
            _ => false,
        }
    }

    fn same_unqualified_bounded(&self, a: QualType, b: QualType, depth: u32) -> bool {
        self.same_type_bounded(a, b, false, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin(db: &mut TypeDb, builtin: BuiltinKind) -> QualType {
        QualType::new(db.intern(Type::Builtin { builtin }))
    }

    #[test]
    fn intern_dedups() {
        let mut db = TypeDb::new();
        let a = db.intern(Type::Builtin {
            builtin: BuiltinKind::Int,
        });
        let b = db.intern(Type::Builtin {
            builtin: BuiltinKind::Int,
        });
        assert_eq!(a, b);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn canonical_strips_typedef_and_keeps_quals() {
        let mut db = TypeDb::new();
        let int = builtin(&mut db, BuiltinKind::Int);
        let alias = QualType::new(db.intern(Type::Typedef {
            name: "Count".into(),
            underlying: int,
        }))
        .with_const();
        let canonical = db.canonical(alias);
        assert_eq!(canonical.ty, int.ty);
        assert!(canonical.is_const);
        assert!(db.same_type(alias, int.with_const()));
        assert!(!db.same_type(alias, int));
        assert!(db.same_unqualified(alias, int));
    }

    #[test]
    fn deduced_auto_is_transparent() {
        let mut db = TypeDb::new();
        let double = builtin(&mut db, BuiltinKind::Double);
        let auto = QualType::new(db.intern(Type::Auto {
            deduced: Some(double),
            constrained: false,
        }));
        assert!(db.is_floating(auto));
        assert!(db.is_written_auto(auto));
        assert!(!db.is_undeduced_auto(auto));
    }

    #[test]
    fn references_and_pointers() {
        let mut db = TypeDb::new();
        let int = builtin(&mut db, BuiltinKind::Int);
        let cref = QualType::new(db.intern(Type::LValueReference {
            pointee: int.with_const(),
        }));
        assert!(db.is_lvalue_reference(cref));
        let referent = db.non_reference(cref);
        assert!(referent.is_const);
        assert_eq!(referent.ty, int.ty);

        let ptr = QualType::new(db.intern(Type::Pointer { pointee: int }));
        assert_eq!(db.pointee(ptr), Some(int));
        assert_eq!(db.pointee(int), None);
    }

    #[test]
    fn pointee_qualifiers_distinguish_types() {
        let mut db = TypeDb::new();
        let int = builtin(&mut db, BuiltinKind::Int);
        let p = QualType::new(db.intern(Type::Pointer { pointee: int }));
        let pc = QualType::new(db.intern(Type::Pointer {
            pointee: int.with_const(),
        }));
        assert!(!db.same_unqualified(p, pc));
    }

    #[test]
    fn dependence_propagates() {
        let mut db = TypeDb::new();
        let t = QualType::new(db.intern(Type::TemplateTypeParm { name: "T".into() }));
        let ptr = QualType::new(db.intern(Type::Pointer { pointee: t }));
        let int = builtin(&mut db, BuiltinKind::Int);
        assert!(db.is_dependent(ptr));
        assert!(!db.is_dependent(int));
    }

    #[test]
    fn widths_follow_target() {
        let lp64 = TargetInfo::default();
        let llp64 = TargetInfo {
            long_width: 32,
            ..TargetInfo::default()
        };
        assert_eq!(BuiltinKind::Long.bit_width(&lp64), Some(64));
        assert_eq!(BuiltinKind::Long.bit_width(&llp64), Some(32));
        assert_eq!(BuiltinKind::Int.value_bits(&lp64), Some(31));
        assert_eq!(BuiltinKind::UnsignedInt.value_bits(&lp64), Some(32));
        assert_eq!(BuiltinKind::Void.bit_width(&lp64), None);
        assert_eq!(BuiltinKind::Double.mantissa_digits(&lp64), Some(53));
    }

    #[test]
    fn serde_tagged_form() {
        let ty = Type::Pointer {
            pointee: QualType::new(TypeId::from_raw(0)).with_const(),
        };
        let json = serde_json::to_string(&ty).unwrap();
        assert!(json.contains(r#""type":"pointer""#));
        let back: Type = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }
}
