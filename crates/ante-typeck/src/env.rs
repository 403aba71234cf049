//! Type environment with a scope stack (used during constraint collection,
//! spec section 4.3).
//!
//! Grounded on `snow_typeck::env`'s `TypeEnv`, generalized from a bare
//! `Scheme` lookup table to also carry each binding's declaration slot id,
//! since `Expr::Var`/`BinOp` need to resolve a name to the same declaration
//! the codegen adapter will later see filled into their `decl` slot.

use rustc_hash::FxHashMap;

use crate::ty::{Scheme, TyVar, TypeContext, TypeId};

#[derive(Debug, Clone)]
pub struct Binding {
    pub scheme: Scheme,
    pub decl: u32,
}

pub struct TypeEnv {
    scopes: Vec<FxHashMap<String, Binding>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self { scopes: vec![FxHashMap::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// # Panics
    /// Panics if called when only the global scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    pub fn insert(&mut self, name: impl Into<String>, scheme: Scheme, decl: u32) {
        self.scopes
            .last_mut()
            .expect("scope stack should never be empty")
            .insert(name.into(), Binding { scheme, decl });
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Instantiates a scheme: replaces each generalized variable with a fresh
/// one, leaving ungeneralized (monomorphic) variables shared. Standard
/// let-polymorphism instantiation, applied at every `Var` reference.
pub fn instantiate(ctx: &mut TypeContext, scheme: &Scheme) -> TypeId {
    if scheme.vars.is_empty() {
        return scheme.ty;
    }
    let mut subs: Vec<(TyVar, TypeId)> = Vec::with_capacity(scheme.vars.len());
    for v in &scheme.vars {
        let name = ctx.var_name(*v).to_string();
        subs.push((*v, ctx.fresh_var(name)));
    }
    instantiate_rewrite(ctx, &subs, scheme.ty)
}

fn instantiate_rewrite(ctx: &mut TypeContext, subs: &[(TyVar, TypeId)], ty: TypeId) -> TypeId {
    use crate::ty::Ty;
    match ctx.get(ty).clone() {
        Ty::Var(v) => subs.iter().find(|(old, _)| *old == v).map(|(_, new)| *new).unwrap_or(ty),
        Ty::Ptr(inner) => {
            let inner = instantiate_rewrite(ctx, subs, inner);
            ctx.ptr(inner)
        }
        Ty::Array(inner, n) => {
            let inner = instantiate_rewrite(ctx, subs, inner);
            ctx.array(inner, n)
        }
        Ty::Tuple(fields, names) => {
            let fields: Vec<TypeId> =
                fields.iter().map(|f| instantiate_rewrite(ctx, subs, *f)).collect();
            ctx.tuple_or_record(fields, names)
        }
        Ty::Function(ret, params, constraints, is_meta) => {
            let ret = instantiate_rewrite(ctx, subs, ret);
            let params: Vec<TypeId> =
                params.iter().map(|p| instantiate_rewrite(ctx, subs, *p)).collect();
            let constraints: Vec<crate::ty::TraitRef> = constraints
                .into_iter()
                .map(|c| {
                    let type_args =
                        c.type_args.iter().map(|a| instantiate_rewrite(ctx, subs, *a)).collect();
                    crate::ty::TraitRef::new(c.trait_name, type_args)
                })
                .collect();
            ctx.func(ret, params, constraints, is_meta)
        }
        Ty::Modifier(inner, kind) => {
            let inner = instantiate_rewrite(ctx, subs, inner);
            ctx.add_modifier(inner, kind)
        }
        // Product/Sum type-argument substitution during instantiation
        // mirrors the same scope cut as lowering's generic instantiation
        // (section 4.2): a field that is itself a still-generic named
        // type is left bound to its template until monomorphisation.
        Ty::Primitive(_) | Ty::Product(_) | Ty::Sum(_) => ty,
    }
}
