//! Trait resolution and monomorphisation (spec section 4.6/4.6a).
//!
//! `TraitRegistry` is grounded on `snow_typeck::traits`'s `TraitDef`/
//! `ImplDef`/`TraitRegistry` shapes, generalized from that file's
//! string-keyed `type_to_key` approach to arena `TypeId` equality (arena
//! interning already gives us structural equality for free, so there is no
//! need to hash a rendered key). Builtin synthesis (4.6a) and the
//! `(FunctionId, Vec<TypeId>)` monomorphisation cache have no teacher
//! counterpart and are grounded directly on spec section 4.6/4.6a.

use rustc_hash::FxHashMap;

use ante_common::Location;

use crate::error::TypeError;
use crate::ty::{PrimitiveTag, Ty, TyVar, TypeContext, TypeId};
use crate::unify::{unify, SubstList};

#[derive(Debug, Clone)]
pub struct TraitMethodSig {
    pub name: String,
    pub has_self: bool,
    pub param_count: usize,
}

#[derive(Debug, Clone)]
pub struct TraitDef {
    pub name: String,
    pub type_params: Vec<String>,
    pub methods: Vec<TraitMethodSig>,
}

#[derive(Debug, Clone)]
pub struct ImplMethodSig {
    pub has_self: bool,
    pub param_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImplDef {
    pub trait_name: String,
    pub type_args: Vec<TypeId>,
    pub methods: FxHashMap<String, ImplMethodSig>,
    /// Declaration order among imports, used to keep candidate search
    /// deterministic (spec section 5).
    pub declaration_order: u32,
    pub source_name: String,
}

#[derive(Debug, Default)]
pub struct TraitRegistry {
    traits: FxHashMap<String, TraitDef>,
    impls: Vec<ImplDef>,
}

impl TraitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_trait(&mut self, def: TraitDef) {
        self.traits.insert(def.name.clone(), def);
    }

    pub fn get_trait(&self, name: &str) -> Option<&TraitDef> {
        self.traits.get(name)
    }

    /// Validates the impl's methods against its trait's stubs, returning
    /// one error per missing or arity-mismatched method.
    pub fn register_impl(&mut self, def: ImplDef, location: &Location) -> Vec<TypeError> {
        let mut errors = Vec::new();
        if let Some(trait_def) = self.traits.get(&def.trait_name) {
            for stub in &trait_def.methods {
                match def.methods.get(&stub.name) {
                    None => errors.push(TypeError::MissingTraitMethod {
                        trait_name: def.trait_name.clone(),
                        method: stub.name.clone(),
                        location: location.clone(),
                    }),
                    Some(found) => {
                        if found.has_self != stub.has_self || found.param_count != stub.param_count
                        {
                            errors.push(TypeError::TraitMethodSignatureMismatch {
                                trait_name: def.trait_name.clone(),
                                method: stub.name.clone(),
                                location: location.clone(),
                            });
                        }
                    }
                }
            }
        }
        self.impls.push(def);
        errors
    }

    pub fn has_impl(&self, ctx: &TypeContext, trait_name: &str, type_args: &[TypeId]) -> bool {
        self.find_impl(ctx, trait_name, type_args, &Location::synthetic()).is_ok()
    }

    /// `lookupTraitImpl`/4.6 step 2: exact name match, type args
    /// structurally equal (arena identity), candidates searched in
    /// declaration order then alphabetically by source name; ambiguity if
    /// more than one matches.
    pub fn find_impl<'a>(
        &'a self,
        _ctx: &TypeContext,
        trait_name: &str,
        type_args: &[TypeId],
        location: &Location,
    ) -> Result<&'a ImplDef, TypeError> {
        let mut candidates: Vec<&ImplDef> = self
            .impls
            .iter()
            .filter(|i| {
                i.trait_name == trait_name
                    && i.type_args.len() == type_args.len()
                    && i.type_args.iter().zip(type_args).all(|(a, b)| a == b)
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.declaration_order.cmp(&b.declaration_order).then_with(|| a.source_name.cmp(&b.source_name))
        });

        match candidates.len() {
            0 => Err(TypeError::TraitNotSatisfied {
                trait_name: trait_name.to_string(),
                location: location.clone(),
            }),
            1 => Ok(candidates[0]),
            _ => Err(TypeError::AmbiguousTraitImpl {
                trait_name: trait_name.to_string(),
                location: location.clone(),
            }),
        }
    }
}

// -- 4.6a builtin trait synthesis ---------------------------------------

pub const BUILTIN_TRAITS: &[&str] =
    &["Add", "Sub", "Mul", "Div", "Mod", "Cmp", "Eq", "Is", "Neg", "Cast", "Extract", "Insert", "Deref", "Not"];

/// What a builtin trait instance actually computes, handed to the codegen
/// adapter as an opaque descriptor (spec section 9: "abstract this behind a
/// small interface the core can hand typed, monomorphised call descriptors
/// to").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinOp {
    IntArith(&'static str),
    FloatArith(&'static str),
    Cmp,
    Eq,
    Neg,
    Not,
    CastIntToInt { sign_extend: bool, truncate: bool },
    CastIntToFloat { signed: bool },
    CastFloatToInt { signed: bool },
    CastPtrToPtr,
    CastPtrToInt,
    CastIntToPtr,
    /// `Is`, `Extract`, `Insert`, `Deref` have runtime semantics owned by
    /// the backend; the core only certifies that an instance exists.
    Opaque(&'static str),
}

#[derive(Debug, Clone)]
pub struct BuiltinImpl {
    pub trait_name: String,
    pub type_args: Vec<TypeId>,
    pub op: BuiltinOp,
}

fn is_signed(tag: PrimitiveTag) -> bool {
    matches!(
        tag,
        PrimitiveTag::I8
            | PrimitiveTag::I16
            | PrimitiveTag::I32
            | PrimitiveTag::I64
            | PrimitiveTag::Isz
    )
}

fn is_integer(tag: PrimitiveTag) -> bool {
    is_signed(tag)
        || matches!(
            tag,
            PrimitiveTag::U8 | PrimitiveTag::U16 | PrimitiveTag::U32 | PrimitiveTag::U64 | PrimitiveTag::Usz
        )
}

fn is_float(tag: PrimitiveTag) -> bool {
    matches!(tag, PrimitiveTag::F16 | PrimitiveTag::F32 | PrimitiveTag::F64)
}

fn bit_width(tag: PrimitiveTag) -> u32 {
    match tag {
        PrimitiveTag::I8 | PrimitiveTag::U8 => 8,
        PrimitiveTag::I16 | PrimitiveTag::U16 | PrimitiveTag::F16 => 16,
        PrimitiveTag::I32 | PrimitiveTag::U32 | PrimitiveTag::F32 => 32,
        PrimitiveTag::I64 | PrimitiveTag::U64 | PrimitiveTag::F64 | PrimitiveTag::Isz | PrimitiveTag::Usz => 64,
        PrimitiveTag::C8 | PrimitiveTag::Bool | PrimitiveTag::Unit => 8,
    }
}

/// Synthesizes a trivial implementation for a builtin trait applied to
/// primitive type arguments, per 4.6a. Returns `None` if `trait_name` is
/// not builtin, or the arguments are not primitives.
pub fn synthesize_builtin(ctx: &TypeContext, trait_name: &str, type_args: &[TypeId]) -> Option<BuiltinImpl> {
    if !BUILTIN_TRAITS.contains(&trait_name) {
        return None;
    }
    let tags: Vec<PrimitiveTag> = type_args
        .iter()
        .map(|t| match ctx.get(*t) {
            Ty::Primitive(tag) => Some(*tag),
            _ => None,
        })
        .collect::<Option<_>>()?;

    let op = match trait_name {
        "Add" | "Sub" | "Mul" | "Div" | "Mod" => {
            let tag = *tags.first()?;
            if is_integer(tag) {
                BuiltinOp::IntArith(leak_op_name(trait_name))
            } else if is_float(tag) {
                BuiltinOp::FloatArith(leak_op_name(trait_name))
            } else {
                return None;
            }
        }
        "Cmp" => BuiltinOp::Cmp,
        "Eq" => BuiltinOp::Eq,
        "Neg" => BuiltinOp::Neg,
        "Not" => BuiltinOp::Not,
        "Cast" => {
            if tags.len() != 2 {
                return None;
            }
            let (from, to) = (tags[0], tags[1]);
            if is_integer(from) && is_integer(to) {
                BuiltinOp::CastIntToInt {
                    sign_extend: is_signed(from),
                    truncate: bit_width(to) < bit_width(from),
                }
            } else if is_integer(from) && is_float(to) {
                BuiltinOp::CastIntToFloat { signed: is_signed(from) }
            } else if is_float(from) && is_integer(to) {
                BuiltinOp::CastFloatToInt { signed: is_signed(to) }
            } else {
                return None;
            }
        }
        "Is" | "Extract" | "Insert" | "Deref" => BuiltinOp::Opaque(leak_op_name(trait_name)),
        _ => return None,
    };

    Some(BuiltinImpl { trait_name: trait_name.to_string(), type_args: type_args.to_vec(), op })
}

/// Builtin trait names are always `&'static str` literals from
/// `BUILTIN_TRAITS`; this just reborrows one instead of allocating.
fn leak_op_name(name: &str) -> &'static str {
    BUILTIN_TRAITS.iter().find(|n| **n == name).copied().unwrap_or("?")
}

/// `Cast` between pointer types, handled separately since it is not keyed
/// on `PrimitiveTag` the way arithmetic/compare traits are.
pub fn synthesize_pointer_cast(ctx: &TypeContext, from: TypeId, to: TypeId) -> Option<BuiltinImpl> {
    match (ctx.get(from), ctx.get(to)) {
        (Ty::Ptr(_), Ty::Ptr(_)) => Some(BuiltinImpl {
            trait_name: "Cast".to_string(),
            type_args: vec![from, to],
            op: BuiltinOp::CastPtrToPtr,
        }),
        (Ty::Ptr(_), Ty::Primitive(tag)) if is_integer(*tag) => Some(BuiltinImpl {
            trait_name: "Cast".to_string(),
            type_args: vec![from, to],
            op: BuiltinOp::CastPtrToInt,
        }),
        (Ty::Primitive(tag), Ty::Ptr(_)) if is_integer(*tag) => Some(BuiltinImpl {
            trait_name: "Cast".to_string(),
            type_args: vec![from, to],
            op: BuiltinOp::CastIntToPtr,
        }),
        _ => None,
    }
}

// -- monomorphisation -----------------------------------------------------

pub type FunctionId = u32;

#[derive(Debug, Clone)]
pub struct MonoInstance {
    pub mangled_name: String,
    /// σ: the ground binding recorded for every generalized variable of the
    /// callee's declared scheme (spec 4.6 step 3's "monomorphisation
    /// mappings").
    pub bindings: FxHashMap<TyVar, TypeId>,
    /// The callee's declared type with every `bindings` entry substituted
    /// in — what the codegen adapter receives as `EmitRequest::signature`.
    pub ground_ty: TypeId,
}

#[derive(Debug, Default)]
pub struct Monomorphiser {
    cache: FxHashMap<(FunctionId, Vec<TypeId>), MonoInstance>,
}

impl Monomorphiser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps 1-3 of spec section 4.6. `decl_vars` are the generalized
    /// variables of the callee's scheme; `decl_ty`/`call_site_ty` are its
    /// declared and call-site-inferred function types. On success returns
    /// the (possibly cached) instance and whether it was freshly compiled.
    pub fn instantiate(
        &mut self,
        function: FunctionId,
        decl_vars: &[TyVar],
        decl_ty: TypeId,
        call_site_ty: TypeId,
        mangled_name_base: impl Fn(&TypeContext, &FxHashMap<TyVar, TypeId>) -> String,
        ctx: &mut TypeContext,
        location: &Location,
    ) -> Result<(MonoInstance, bool), TypeError> {
        let mut subs = SubstList::new();
        unify(ctx, &mut subs, decl_ty, call_site_ty, location)
            .map_err(|e| TypeError::MonomorphisationFailed {
                function: function.to_string(),
                cause: Box::new(e),
                location: location.clone(),
            })?;

        let mut bindings = FxHashMap::default();
        for var in decl_vars {
            let var_ty = ctx.var_type(*var);
            let resolved_var_ty = crate::unify::resolve(ctx, &subs, var_ty);
            bindings.insert(*var, resolved_var_ty);
        }

        let ground_args: Vec<TypeId> = {
            let mut keys: Vec<TyVar> = bindings.keys().copied().collect();
            keys.sort_by_key(|v| v.age());
            keys.iter().map(|v| bindings[v]).collect()
        };

        let key = (function, ground_args);
        if let Some(cached) = self.cache.get(&key) {
            return Ok((cached.clone(), false));
        }

        let ground_ty = crate::unify::resolve(ctx, &subs, decl_ty);
        let mangled_name = mangled_name_base(ctx, &bindings);
        let instance = MonoInstance { mangled_name, bindings, ground_ty };
        self.cache.insert(key, instance.clone());
        Ok((instance, true))
    }
}
