//! Robinson unification with occurs check, producing an explicit,
//! ordered substitution list (spec section 4.4).
//!
//! Grounded on `snow_typeck::unify`'s `InferCtx::unify`, but reworked around
//! the arena model: the teacher mutates an `ena::InPlaceUnificationTable` in
//! place, whereas here every substitution is recorded as an entry appended
//! to a plain `Vec` and types are resolved by walking that list, per this
//! codebase's choice to make the arena, not a union-find table, the source
//! of truth (spec section 9's `TypeContext` note).

use ante_common::Location;

use crate::error::TypeError;
use crate::ty::{ModifierKind, TraitRef, Ty, TyVar, TypeContext, TypeId};

#[derive(Debug, Clone)]
pub struct Substitution {
    pub var: TyVar,
    pub ty: TypeId,
}

pub type SubstList = Vec<Substitution>;

/// Chase a chain of variable bindings without descending into compound
/// types. Used internally by `unify` before comparing two types.
pub fn resolve(ctx: &TypeContext, subs: &SubstList, mut ty: TypeId) -> TypeId {
    loop {
        if let Ty::Var(v) = ctx.get(ty) {
            if let Some(found) = subs.iter().rev().find(|s| s.var == *v) {
                ty = found.ty;
                continue;
            }
        }
        return ty;
    }
}

fn occurs_in(ctx: &TypeContext, subs: &SubstList, var: TyVar, ty: TypeId) -> bool {
    let resolved = resolve(ctx, subs, ty);
    match ctx.get(resolved) {
        Ty::Var(v) => *v == var,
        Ty::Primitive(_) => false,
        Ty::Ptr(inner) => occurs_in(ctx, subs, var, *inner),
        Ty::Array(inner, _) => occurs_in(ctx, subs, var, *inner),
        Ty::Tuple(fields, _) => fields.iter().any(|f| occurs_in(ctx, subs, var, *f)),
        Ty::Function(ret, params, _, _) => {
            occurs_in(ctx, subs, var, *ret) || params.iter().any(|p| occurs_in(ctx, subs, var, *p))
        }
        Ty::Modifier(inner, _) => occurs_in(ctx, subs, var, *inner),
        Ty::Product(id) => ctx.product(*id).type_args.iter().any(|a| occurs_in(ctx, subs, var, *a)),
        Ty::Sum(id) => ctx.sum(*id).type_args.iter().any(|a| occurs_in(ctx, subs, var, *a)),
    }
}

fn strip_modifiers(ctx: &TypeContext, mut ty: TypeId) -> (TypeId, Vec<ModifierKind>) {
    let mut mods = Vec::new();
    while let Ty::Modifier(inner, kind) = ctx.get(ty) {
        mods.push(kind.clone());
        ty = *inner;
    }
    (ty, mods)
}

fn mismatch(a: TypeId, b: TypeId, location: &Location) -> TypeError {
    TypeError::Mismatch { expected: a, found: b, location: location.clone() }
}

fn product_root(ctx: &TypeContext, mut id: crate::ty::ProductId) -> crate::ty::ProductId {
    while let Some(parent) = ctx.product(id).unbound_ref {
        id = parent;
    }
    id
}

fn sum_root(ctx: &TypeContext, mut id: crate::ty::SumId) -> crate::ty::SumId {
    while let Some(parent) = ctx.sum(id).unbound_ref {
        id = parent;
    }
    id
}

/// Unify `a` and `b`, appending any new bindings to `subs` in generation
/// order. Returns trait obligations surfaced by unifying two `Function`
/// types (rule 6: constraint sets are merged, not unified pairwise) so the
/// caller can feed them back into trait resolution.
pub fn unify(
    ctx: &mut TypeContext,
    subs: &mut SubstList,
    a: TypeId,
    b: TypeId,
    location: &Location,
) -> Result<Vec<TraitRef>, TypeError> {
    let a = resolve(ctx, subs, a);
    let b = resolve(ctx, subs, b);
    if a == b {
        return Ok(Vec::new());
    }

    let (a_bare, a_mods) = strip_modifiers(ctx, a);
    let (b_bare, b_mods) = strip_modifiers(ctx, b);
    if !a_mods.is_empty() && !b_mods.is_empty() && a_mods != b_mods {
        return Err(mismatch(a, b, location));
    }
    if a_bare == b_bare {
        return Ok(Vec::new());
    }

    match (ctx.get(a_bare).clone(), ctx.get(b_bare).clone()) {
        (Ty::Var(v1), Ty::Var(v2)) => {
            if v1.age() < v2.age() {
                subs.push(Substitution { var: v2, ty: a_bare });
            } else {
                subs.push(Substitution { var: v1, ty: b_bare });
            }
            Ok(Vec::new())
        }
        (Ty::Var(v), _) => {
            if occurs_in(ctx, subs, v, b_bare) {
                return Err(TypeError::InfiniteType { var: v, ty: b_bare, location: location.clone() });
            }
            subs.push(Substitution { var: v, ty: b_bare });
            Ok(Vec::new())
        }
        (_, Ty::Var(v)) => {
            if occurs_in(ctx, subs, v, a_bare) {
                return Err(TypeError::InfiniteType { var: v, ty: a_bare, location: location.clone() });
            }
            subs.push(Substitution { var: v, ty: a_bare });
            Ok(Vec::new())
        }
        (Ty::Primitive(t1), Ty::Primitive(t2)) => {
            if t1 == t2 {
                Ok(Vec::new())
            } else {
                Err(mismatch(a_bare, b_bare, location))
            }
        }
        (Ty::Ptr(x), Ty::Ptr(y)) => unify(ctx, subs, x, y, location),
        (Ty::Array(x, n), Ty::Array(y, m)) => {
            if n != m {
                return Err(mismatch(a_bare, b_bare, location));
            }
            unify(ctx, subs, x, y, location)
        }
        (Ty::Tuple(xs, xn), Ty::Tuple(ys, yn)) => {
            if xs.len() != ys.len() || xn != yn {
                return Err(mismatch(a_bare, b_bare, location));
            }
            let mut obligations = Vec::new();
            for (x, y) in xs.iter().zip(ys.iter()) {
                obligations.extend(unify(ctx, subs, *x, *y, location)?);
            }
            Ok(obligations)
        }
        (Ty::Function(r1, p1, c1, m1), Ty::Function(r2, p2, c2, m2)) => {
            if p1.len() != p2.len() {
                return Err(TypeError::ArityMismatch {
                    expected: p1.len(),
                    found: p2.len(),
                    location: location.clone(),
                });
            }
            if m1 != m2 {
                return Err(mismatch(a_bare, b_bare, location));
            }
            let mut obligations = unify(ctx, subs, r1, r2, location)?;
            for (x, y) in p1.iter().zip(p2.iter()) {
                obligations.extend(unify(ctx, subs, *x, *y, location)?);
            }
            obligations.extend(c1);
            obligations.extend(c2);
            Ok(obligations)
        }
        (Ty::Product(p1), Ty::Product(p2)) => {
            if product_root(ctx, p1) != product_root(ctx, p2) {
                return Err(mismatch(a_bare, b_bare, location));
            }
            let args1 = ctx.product(p1).type_args.clone();
            let args2 = ctx.product(p2).type_args.clone();
            if args1.len() != args2.len() {
                return Err(TypeError::ArityMismatch {
                    expected: args1.len(),
                    found: args2.len(),
                    location: location.clone(),
                });
            }
            let mut obligations = Vec::new();
            for (x, y) in args1.iter().zip(args2.iter()) {
                obligations.extend(unify(ctx, subs, *x, *y, location)?);
            }
            Ok(obligations)
        }
        (Ty::Sum(s1), Ty::Sum(s2)) => {
            if sum_root(ctx, s1) != sum_root(ctx, s2) {
                return Err(mismatch(a_bare, b_bare, location));
            }
            let args1 = ctx.sum(s1).type_args.clone();
            let args2 = ctx.sum(s2).type_args.clone();
            if args1.len() != args2.len() {
                return Err(TypeError::ArityMismatch {
                    expected: args1.len(),
                    found: args2.len(),
                    location: location.clone(),
                });
            }
            let mut obligations = Vec::new();
            for (x, y) in args1.iter().zip(args2.iter()) {
                obligations.extend(unify(ctx, subs, *x, *y, location)?);
            }
            Ok(obligations)
        }
        // `Ty::Tuple([], _)` is unreachable here: `TypeContext::tuple` returns
        // the interned `Unit` value directly for an empty field list (spec
        // section 8's `Tuple([]) == Unit`), so a zero-arity tuple and `Unit`
        // are always the same `TypeId` and never reach this match at all.
        _ => Err(mismatch(a_bare, b_bare, location)),
    }
}

/// Deeply applies every binding in `subs` to `ty`, re-interning compound
/// types with their solved children (spec section 4.4's `applySubstitutions`
/// and section 4.5's substitution-application pass both bottom out here).
/// `Product`/`Sum` handles are returned unchanged: their own type-argument
/// substitution happens during monomorphisation (section 4.6), not this
/// generic pass, since their identity is carried by a handle rather than
/// inline structure.
pub fn apply_substitutions(ctx: &mut TypeContext, subs: &SubstList, ty: TypeId) -> TypeId {
    let resolved = resolve(ctx, subs, ty);
    match ctx.get(resolved).clone() {
        Ty::Primitive(_) | Ty::Var(_) | Ty::Product(_) | Ty::Sum(_) => resolved,
        Ty::Ptr(inner) => {
            let inner = apply_substitutions(ctx, subs, inner);
            ctx.ptr(inner)
        }
        Ty::Array(inner, n) => {
            let inner = apply_substitutions(ctx, subs, inner);
            ctx.array(inner, n)
        }
        Ty::Tuple(fields, names) => {
            let fields: Vec<TypeId> =
                fields.iter().map(|f| apply_substitutions(ctx, subs, *f)).collect();
            ctx.tuple_or_record(fields, names)
        }
        Ty::Function(ret, params, constraints, is_meta) => {
            let ret = apply_substitutions(ctx, subs, ret);
            let params: Vec<TypeId> =
                params.iter().map(|p| apply_substitutions(ctx, subs, *p)).collect();
            let constraints: Vec<TraitRef> = constraints
                .into_iter()
                .map(|c| {
                    let type_args =
                        c.type_args.iter().map(|a| apply_substitutions(ctx, subs, *a)).collect();
                    let resolved = TraitRef::new(c.trait_name, type_args);
                    resolved.impl_ptr.set(c.impl_ptr.get());
                    resolved
                })
                .collect();
            ctx.func(ret, params, constraints, is_meta)
        }
        Ty::Modifier(inner, kind) => {
            let inner = apply_substitutions(ctx, subs, inner);
            ctx.add_modifier(inner, kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::PrimitiveTag;

    fn loc() -> Location {
        Location::synthetic()
    }

    #[test]
    fn identical_interned_types_unify_without_substitution() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let obligations = unify(&mut ctx, &mut subs, i32_ty, i32_ty, &loc()).unwrap();
        assert!(obligations.is_empty());
        assert!(subs.is_empty());
    }

    #[test]
    fn var_binds_to_concrete_type() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let var = ctx.fresh_var("a");
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        unify(&mut ctx, &mut subs, var, i32_ty, &loc()).unwrap();
        assert_eq!(resolve(&ctx, &subs, var), i32_ty);
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let var = ctx.fresh_var("a");
        let ptr_var = ctx.ptr(var);
        let err = unify(&mut ctx, &mut subs, var, ptr_var, &loc()).unwrap_err();
        assert!(matches!(err, TypeError::InfiniteType { .. }));
    }

    #[test]
    fn mismatched_primitives_fail() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let bool_ty = ctx.prim(PrimitiveTag::Bool);
        let err = unify(&mut ctx, &mut subs, i32_ty, bool_ty, &loc()).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn array_length_mismatch_fails() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let a = ctx.array(i32_ty, 3);
        let b = ctx.array(i32_ty, 4);
        let err = unify(&mut ctx, &mut subs, a, b, &loc()).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn function_arity_mismatch_fails() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let f1 = ctx.func(i32_ty, vec![i32_ty], Vec::new(), false);
        let f2 = ctx.func(i32_ty, vec![i32_ty, i32_ty], Vec::new(), false);
        let err = unify(&mut ctx, &mut subs, f1, f2, &loc()).unwrap_err();
        assert!(matches!(err, TypeError::ArityMismatch { .. }));
    }

    #[test]
    fn function_unification_merges_trait_constraints() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let c1 = TraitRef::new("Add", vec![i32_ty]);
        let c2 = TraitRef::new("Show", vec![i32_ty]);
        let f1 = ctx.func(i32_ty, vec![i32_ty], vec![c1], false);
        let f2 = ctx.func(i32_ty, vec![i32_ty], vec![c2], false);
        let obligations = unify(&mut ctx, &mut subs, f1, f2, &loc()).unwrap();
        assert_eq!(obligations.len(), 2);
    }

    #[test]
    fn tie_break_prefers_substituting_younger_variable() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let older = ctx.fresh_var("a");
        let younger = ctx.fresh_var("b");
        unify(&mut ctx, &mut subs, older, younger, &loc()).unwrap();
        assert_eq!(resolve(&ctx, &subs, younger), older);
    }

    #[test]
    fn modifier_stacks_must_match_when_both_sides_carry_one() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let mut_ty = ctx.add_modifier(i32_ty, ModifierKind::Mut);
        let const_ty = ctx.add_modifier(i32_ty, ModifierKind::Const);
        let err = unify(&mut ctx, &mut subs, mut_ty, const_ty, &loc()).unwrap_err();
        assert!(matches!(err, TypeError::Mismatch { .. }));
    }

    #[test]
    fn modifier_on_one_side_only_is_stripped_before_comparing() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let mut_ty = ctx.add_modifier(i32_ty, ModifierKind::Mut);
        unify(&mut ctx, &mut subs, mut_ty, i32_ty, &loc()).unwrap();
    }

    #[test]
    fn apply_substitutions_resolves_nested_vars() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let var = ctx.fresh_var("a");
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        unify(&mut ctx, &mut subs, var, i32_ty, &loc()).unwrap();
        let arr = ctx.array(var, 3);
        let solved = apply_substitutions(&mut ctx, &subs, arr);
        assert_eq!(solved, ctx.array(i32_ty, 3));
    }

    #[test]
    fn apply_substitutions_is_idempotent() {
        let mut ctx = TypeContext::new();
        let mut subs = SubstList::new();
        let var = ctx.fresh_var("a");
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        unify(&mut ctx, &mut subs, var, i32_ty, &loc()).unwrap();
        let arr = ctx.array(var, 3);
        let once = apply_substitutions(&mut ctx, &subs, arr);
        let twice = apply_substitutions(&mut ctx, &subs, once);
        assert_eq!(once, twice);
    }
}
