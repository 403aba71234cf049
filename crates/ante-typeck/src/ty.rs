//! The type arena: every constructed type is hash-consed so that structural
//! equality implies identity (spec section 4.1, invariant I1).
//!
//! Grounded on `snow_typeck::ty`'s `Ty`/`TyVar`/`Scheme` shapes, generalized
//! from that file's five-variant type language to the full product/sum/ptr/
//! array/modifier data model of spec section 3. Unlike the teacher, type
//! variables here are not mutated in place by a union-find table — the
//! arena is the single source of truth, and unification (see `unify.rs`)
//! produces an explicit, appendable substitution list instead.

use std::cell::Cell;
use std::fmt;

use ena::unify::{UnifyKey, UnifyValue};
use rustc_hash::FxHashMap;

/// Index into the arena's type table. Equality of two `TypeId`s is a
/// correct structural-equality check for interned types (I1, I5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Exposes the raw arena index so an `ante_ast::Slot` (which the AST
    /// crate keeps opaque) can carry it between pipeline stages.
    pub fn index(self) -> u32 {
        self.0
    }

    pub fn from_index(i: u32) -> Self {
        TypeId(i)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SumId(u32);

/// A fresh, unsolved type variable. Distinct `TyVar`s always intern to
/// distinct `Ty::Var` entries; their relative age (creation order) is used
/// by the unifier's tie-breaking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TyVar(u32);

impl UnifyKey for TyVar {
    type Value = ();
    fn index(&self) -> u32 {
        self.0
    }
    fn from_index(i: u32) -> Self {
        TyVar(i)
    }
    fn tag() -> &'static str {
        "TyVar"
    }
}

impl UnifyValue for () {
    type Error = std::convert::Infallible;
    fn unify_values(_: &(), _: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl TyVar {
    pub fn age(self) -> u32 {
        self.0
    }

    /// True for row variables (extensible-record variables), written with
    /// a leading rho mark. Referenced by spec section 9 but not yet
    /// consumed by any unifier rule.
    pub fn is_row_var(self, ctx: &TypeContext) -> bool {
        ctx.var_names.get(&self).map(|n| n.starts_with(ROW_MARK)).unwrap_or(false)
    }
}

pub const ROW_MARK: char = 'ρ';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum PrimitiveTag {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Isz,
    Usz,
    F16,
    F32,
    F64,
    C8,
    Bool,
    Unit,
}

impl fmt::Display for PrimitiveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveTag::I8 => "i8",
            PrimitiveTag::I16 => "i16",
            PrimitiveTag::I32 => "i32",
            PrimitiveTag::I64 => "i64",
            PrimitiveTag::U8 => "u8",
            PrimitiveTag::U16 => "u16",
            PrimitiveTag::U32 => "u32",
            PrimitiveTag::U64 => "u64",
            PrimitiveTag::Isz => "isz",
            PrimitiveTag::Usz => "usz",
            PrimitiveTag::F16 => "f16",
            PrimitiveTag::F32 => "f32",
            PrimitiveTag::F64 => "f64",
            PrimitiveTag::C8 => "c8",
            PrimitiveTag::Bool => "bool",
            PrimitiveTag::Unit => "unit",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    Mut,
    Const,
    Let,
    Global,
    Ante,
    /// An arbitrary compiler-directive token, e.g. `#[inline]`-style
    /// markers the surface syntax attaches to a type.
    CompilerDirective(String),
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierKind::Mut => write!(f, "mut"),
            ModifierKind::Const => write!(f, "const"),
            ModifierKind::Let => write!(f, "let"),
            ModifierKind::Global => write!(f, "global"),
            ModifierKind::Ante => write!(f, "ante"),
            ModifierKind::CompilerDirective(tok) => write!(f, "#{tok}"),
        }
    }
}

/// A required trait instance attached to a function type. `impl_ptr` is
/// filled in by trait resolution (section 4.6) and deliberately excluded
/// from equality/hash so two otherwise-identical function types intern to
/// the same `TypeId` regardless of resolution order.
#[derive(Debug, Clone)]
pub struct TraitRef {
    pub trait_name: String,
    pub type_args: Vec<TypeId>,
    pub impl_ptr: Cell<Option<u32>>,
}

impl TraitRef {
    pub fn new(trait_name: impl Into<String>, type_args: Vec<TypeId>) -> Self {
        Self { trait_name: trait_name.into(), type_args, impl_ptr: Cell::new(None) }
    }
}

impl PartialEq for TraitRef {
    fn eq(&self, other: &Self) -> bool {
        self.trait_name == other.trait_name && self.type_args == other.type_args
    }
}
impl Eq for TraitRef {}

impl std::hash::Hash for TraitRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.trait_name.hash(state);
        self.type_args.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Primitive(PrimitiveTag),
    Ptr(TypeId),
    Array(TypeId, u64),
    /// Positional when `field_names` is empty; an anonymous record
    /// otherwise, in which case `field_names.len() == fields.len()`.
    Tuple(Vec<TypeId>, Vec<String>),
    Function(TypeId, Vec<TypeId>, Vec<TraitRef>, bool),
    Var(TyVar),
    Product(ProductId),
    Sum(SumId),
    Modifier(TypeId, ModifierKind),
}

/// `ProductType` data, per spec section 3: a named record/struct, or the
/// payload of one sum-type variant.
#[derive(Debug, Clone)]
pub struct ProductTypeData {
    pub name: String,
    pub fields: Vec<TypeId>,
    pub field_names: Vec<String>,
    pub type_args: Vec<TypeId>,
    pub is_alias: bool,
    /// `this.tags[i].parent_sum == this` (I3) — set when this product is a
    /// sum-type variant.
    pub parent_sum: Option<SumId>,
    /// Template this is a concrete variant of, if any (I2).
    pub unbound_ref: Option<ProductId>,
    pub generic_variants: Vec<ProductId>,
}

#[derive(Debug, Clone)]
pub struct SumTypeData {
    pub name: String,
    pub tags: Vec<ProductId>,
    pub type_args: Vec<TypeId>,
    pub unbound_ref: Option<SumId>,
    pub generic_variants: Vec<SumId>,
}

/// The arena. One instance lives for a single compilation (spec section 9:
/// "prefer making it a first-class `TypeContext` value threaded through the
/// pipeline; keep a single instance per compilation").
#[derive(Debug, Default)]
pub struct TypeContext {
    types: Vec<Ty>,
    interner: FxHashMap<Ty, TypeId>,
    products: Vec<ProductTypeData>,
    sums: Vec<SumTypeData>,
    var_names: FxHashMap<TyVar, String>,
    next_var: u32,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, ty: Ty) -> TypeId {
        if let Some(id) = self.interner.get(&ty) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        self.interner.insert(ty.clone(), id);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Ty {
        &self.types[id.0 as usize]
    }

    pub fn product(&self, id: ProductId) -> &ProductTypeData {
        &self.products[id.0 as usize]
    }

    pub fn sum(&self, id: SumId) -> &SumTypeData {
        &self.sums[id.0 as usize]
    }

    // -- constructors (spec 4.1) --------------------------------------

    pub fn prim(&mut self, tag: PrimitiveTag) -> TypeId {
        self.intern(Ty::Primitive(tag))
    }

    pub fn unit(&mut self) -> TypeId {
        self.prim(PrimitiveTag::Unit)
    }

    pub fn ptr(&mut self, inner: TypeId) -> TypeId {
        self.intern(Ty::Ptr(inner))
    }

    pub fn array(&mut self, inner: TypeId, len: u64) -> TypeId {
        self.intern(Ty::Array(inner, len))
    }

    /// A positional tuple; arity 0 is the unique `Unit` value (spec
    /// section 8's boundary case: `Tuple([]) == Unit`), so it's returned
    /// directly rather than interned as its own `Ty::Tuple` entry.
    pub fn tuple(&mut self, fields: Vec<TypeId>) -> TypeId {
        if fields.is_empty() {
            return self.unit();
        }
        self.intern(Ty::Tuple(fields, Vec::new()))
    }

    pub fn record(&mut self, fields: Vec<TypeId>, names: Vec<String>) -> TypeId {
        debug_assert_eq!(fields.len(), names.len());
        self.intern(Ty::Tuple(fields, names))
    }

    pub fn tuple_or_record(&mut self, fields: Vec<TypeId>, names: Vec<String>) -> TypeId {
        if names.is_empty() {
            self.tuple(fields)
        } else {
            self.record(fields, names)
        }
    }

    /// Empty `params` is normalised to `[Unit]` (spec section 4.3 table,
    /// section 8 boundary case).
    pub fn func(
        &mut self,
        ret: TypeId,
        mut params: Vec<TypeId>,
        constraints: Vec<TraitRef>,
        is_meta: bool,
    ) -> TypeId {
        if params.is_empty() {
            params.push(self.unit());
        }
        self.intern(Ty::Function(ret, params, constraints, is_meta))
    }

    pub fn fresh_var(&mut self, name: impl Into<String>) -> TypeId {
        let var = TyVar(self.next_var);
        self.next_var += 1;
        self.var_names.insert(var, name.into());
        self.intern(Ty::Var(var))
    }

    pub fn typevar_named(&mut self, name: impl Into<String>) -> TypeId {
        self.fresh_var(name)
    }

    pub fn var_name(&self, var: TyVar) -> &str {
        self.var_names.get(&var).map(String::as_str).unwrap_or("?")
    }

    /// Looks up (or re-interns) the arena entry for an existing `TyVar`.
    /// Every `TyVar` is created through `fresh_var`, which already interns
    /// its `Ty::Var` entry, so this never allocates a new one.
    pub fn var_type(&mut self, var: TyVar) -> TypeId {
        self.intern(Ty::Var(var))
    }

    pub fn product_template(
        &mut self,
        name: impl Into<String>,
        fields: Vec<TypeId>,
        field_names: Vec<String>,
        type_args: Vec<TypeId>,
    ) -> TypeId {
        let id = ProductId(self.products.len() as u32);
        self.products.push(ProductTypeData {
            name: name.into(),
            fields,
            field_names,
            type_args,
            is_alias: false,
            parent_sum: None,
            unbound_ref: None,
            generic_variants: Vec::new(),
        });
        self.intern(Ty::Product(id))
    }

    pub fn sum_template(
        &mut self,
        name: impl Into<String>,
        tags: Vec<ProductId>,
        type_args: Vec<TypeId>,
    ) -> TypeId {
        let id = SumId(self.sums.len() as u32);
        self.sums.push(SumTypeData {
            name: name.into(),
            tags,
            type_args,
            unbound_ref: None,
            generic_variants: Vec::new(),
        });
        self.intern(Ty::Sum(id))
    }

    /// Fills in a product declared with placeholder (empty) fields by
    /// `product_template`, once its declaration's field types are known.
    /// Lets the declaration scan (spec 4.8) forward-reference a type by
    /// name before its body has been lowered, since a `Ty::Product(id)`'s
    /// interned identity depends only on `id`, not on `self.products[id]`.
    pub fn set_product_fields(&mut self, id: ProductId, fields: Vec<TypeId>, field_names: Vec<String>) {
        let data = &mut self.products[id.0 as usize];
        data.fields = fields;
        data.field_names = field_names;
    }

    pub fn set_product_type_args(&mut self, id: ProductId, type_args: Vec<TypeId>) {
        self.products[id.0 as usize].type_args = type_args;
    }

    /// Fills in a sum's tags once its variants' products exist, setting
    /// each variant's `parent_sum` back-reference (I3).
    pub fn set_sum_tags(&mut self, id: SumId, tags: Vec<ProductId>) {
        for tag in &tags {
            self.products[tag.0 as usize].parent_sum = Some(id);
        }
        self.sums[id.0 as usize].tags = tags;
    }

    /// Records a freshly-built concrete instantiation of a generic
    /// product template, so a later request for the same ground argument
    /// list reuses it instead of minting a second `ProductId` (I1/I2).
    pub fn push_product_generic_variant(&mut self, template: ProductId, variant: ProductId) {
        self.products[template.0 as usize].generic_variants.push(variant);
    }

    pub fn push_sum_generic_variant(&mut self, template: SumId, variant: SumId) {
        self.sums[template.0 as usize].generic_variants.push(variant);
    }

    pub fn set_product_unbound_ref(&mut self, variant: ProductId, template: ProductId) {
        self.products[variant.0 as usize].unbound_ref = Some(template);
    }

    pub fn set_sum_unbound_ref(&mut self, variant: SumId, template: SumId) {
        self.sums[variant.0 as usize].unbound_ref = Some(template);
    }

    /// Re-obtains the interned `TypeId` for an already-created `ProductId`.
    /// `intern` is idempotent, so this never allocates a second entry; it
    /// exists so callers holding a bare handle (e.g. a generic-variant
    /// cache hit) can get back the arena value without re-deriving it.
    pub fn product_type(&mut self, id: ProductId) -> TypeId {
        self.intern(Ty::Product(id))
    }

    pub fn sum_type(&mut self, id: SumId) -> TypeId {
        self.intern(Ty::Sum(id))
    }

    /// `addModifier`: idempotent modifier stacking (spec 4.1).
    pub fn add_modifier(&mut self, ty: TypeId, kind: ModifierKind) -> TypeId {
        if kind == ModifierKind::Let {
            return ty;
        }
        if let Ty::Modifier(_, existing) = self.get(ty) {
            if *existing == kind {
                return ty;
            }
            if *existing == ModifierKind::Const && kind == ModifierKind::Mut {
                return ty;
            }
        }
        self.intern(Ty::Modifier(ty, kind))
    }

    /// `addModifiersTo`: re-wraps `other` with the modifier chain present
    /// on `this`.
    pub fn add_modifiers_to(&mut self, this: TypeId, other: TypeId) -> TypeId {
        let mut stack = Vec::new();
        let mut cur = this;
        while let Ty::Modifier(inner, kind) = self.get(cur) {
            stack.push(kind.clone());
            cur = *inner;
        }
        let mut result = other;
        for kind in stack.into_iter().rev() {
            result = self.add_modifier(result, kind);
        }
        result
    }

    /// Strip every modifier, returning the bare underlying type.
    pub fn strip_modifiers(&self, mut ty: TypeId) -> TypeId {
        while let Ty::Modifier(inner, _) = self.get(ty) {
            ty = *inner;
        }
        ty
    }

    /// I4: true iff `ty` mentions a `TypeVar` anywhere in its structure.
    pub fn is_generic(&self, ty: TypeId) -> bool {
        match self.get(ty) {
            Ty::Primitive(_) => false,
            Ty::Var(_) => true,
            Ty::Ptr(inner) => self.is_generic(*inner),
            Ty::Array(inner, _) => self.is_generic(*inner),
            Ty::Tuple(fields, _) => fields.iter().any(|f| self.is_generic(*f)),
            Ty::Function(ret, params, _, _) => {
                self.is_generic(*ret) || params.iter().any(|p| self.is_generic(*p))
            }
            Ty::Modifier(inner, _) => self.is_generic(*inner),
            Ty::Product(id) => {
                let data = self.product(*id);
                data.type_args.iter().any(|a| self.is_generic(*a))
                    || data.fields.iter().any(|f| self.is_generic(*f))
            }
            Ty::Sum(id) => self.sum(*id).type_args.iter().any(|a| self.is_generic(*a)),
        }
    }

    /// I2: walk the unbound chain from a product variant to its template.
    pub fn is_variant_of_product(&self, variant: ProductId, template: ProductId) -> bool {
        let mut cur = Some(variant);
        while let Some(id) = cur {
            if id == template {
                return true;
            }
            cur = self.product(id).unbound_ref;
        }
        false
    }

    pub fn is_variant_of_sum(&self, variant: SumId, template: SumId) -> bool {
        let mut cur = Some(variant);
        while let Some(id) = cur {
            if id == template {
                return true;
            }
            cur = self.sum(id).unbound_ref;
        }
        false
    }

    /// I5: `TypeVar` matches anything; otherwise structural equality
    /// including type-arg lists and field names, recursing through
    /// modifiers and named-type type args.
    pub fn approx_eq(&self, a: TypeId, b: TypeId) -> bool {
        if matches!(self.get(a), Ty::Var(_)) || matches!(self.get(b), Ty::Var(_)) {
            return true;
        }
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (Ty::Ptr(x), Ty::Ptr(y)) => self.approx_eq(*x, *y),
            (Ty::Array(x, n), Ty::Array(y, m)) => n == m && self.approx_eq(*x, *y),
            (Ty::Tuple(xs, xn), Ty::Tuple(ys, yn)) => {
                xn == yn && xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| self.approx_eq(*x, *y))
            }
            (Ty::Function(r1, p1, _, m1), Ty::Function(r2, p2, _, m2)) => {
                m1 == m2
                    && p1.len() == p2.len()
                    && self.approx_eq(*r1, *r2)
                    && p1.iter().zip(p2).all(|(x, y)| self.approx_eq(*x, *y))
            }
            (Ty::Product(p1), Ty::Product(p2)) => {
                let d1 = self.product(*p1);
                let d2 = self.product(*p2);
                d1.name == d2.name
                    && d1.type_args.len() == d2.type_args.len()
                    && d1.type_args.iter().zip(&d2.type_args).all(|(x, y)| self.approx_eq(*x, *y))
            }
            (Ty::Sum(s1), Ty::Sum(s2)) => {
                let d1 = self.sum(*s1);
                let d2 = self.sum(*s2);
                d1.name == d2.name
                    && d1.type_args.len() == d2.type_args.len()
                    && d1.type_args.iter().zip(&d2.type_args).all(|(x, y)| self.approx_eq(*x, *y))
            }
            (Ty::Modifier(i1, k1), Ty::Modifier(i2, k2)) => k1 == k2 && self.approx_eq(*i1, *i2),
            (Ty::Primitive(t1), Ty::Primitive(t2)) => t1 == t2,
            _ => false,
        }
    }

    /// A deterministic, human-readable rendering used both in diagnostics
    /// and as the basis for name mangling (spec section 6).
    pub fn display(&self, ty: TypeId) -> String {
        match self.get(ty) {
            Ty::Primitive(tag) => tag.to_string(),
            Ty::Ptr(inner) => format!("Ptr {}", self.display(*inner)),
            Ty::Array(inner, n) => format!("[{} {}]", n, self.display(*inner)),
            Ty::Tuple(fields, names) if names.is_empty() => {
                if fields.is_empty() {
                    "Unit".to_string()
                } else {
                    let parts: Vec<String> = fields.iter().map(|f| self.display(*f)).collect();
                    format!("({})", parts.join(", "))
                }
            }
            Ty::Tuple(fields, names) => {
                let parts: Vec<String> = names
                    .iter()
                    .zip(fields)
                    .map(|(n, f)| format!("{}: {}", n, self.display(*f)))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Ty::Function(ret, params, _, _) => {
                let parts: Vec<String> = params.iter().map(|p| self.display(*p)).collect();
                format!("({}) -> {}", parts.join(", "), self.display(*ret))
            }
            Ty::Var(v) => format!("'{}", self.var_name(*v)),
            Ty::Product(id) => {
                let data = self.product(*id);
                if data.type_args.is_empty() {
                    data.name.clone()
                } else {
                    let args: Vec<String> = data.type_args.iter().map(|a| self.display(*a)).collect();
                    format!("{} {}", data.name, args.join(" "))
                }
            }
            Ty::Sum(id) => {
                let data = self.sum(*id);
                if data.type_args.is_empty() {
                    data.name.clone()
                } else {
                    let args: Vec<String> = data.type_args.iter().map(|a| self.display(*a)).collect();
                    format!("{} {}", data.name, args.join(" "))
                }
            }
            Ty::Modifier(inner, kind) => format!("{} {}", kind, self.display(*inner)),
        }
    }
}

/// A type scheme: a type with a list of generalized (universally
/// quantified) variables, per standard let-polymorphism.
#[derive(Debug, Clone)]
pub struct Scheme {
    pub vars: Vec<TyVar>,
    pub ty: TypeId,
}

impl Scheme {
    pub fn mono(ty: TypeId) -> Self {
        Self { vars: Vec::new(), ty }
    }
}
