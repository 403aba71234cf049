//! Pipeline entry point (spec section 9's data-flow diagram): declaration
//! scan → constraint collection → unification → substitution application →
//! trait resolution → pattern exhaustiveness, run once per compilation
//! unit.
//!
//! Grounded on `snow_typeck::lib`'s `check`/`TypeckResult` shape,
//! generalized from a rowan-CST single-file checker to this arena-based,
//! plain-AST, whole-`Root` design — there is no incremental per-file
//! re-check here, since this AST has no notion of a file boundary beyond
//! one `Root`.

pub mod apply;
pub mod builtins;
pub mod constraints;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod exhaustiveness;
pub mod lowering;
pub mod mangle;
pub mod module;
pub mod traits;
pub mod ty;
pub mod unify;

use rustc_hash::FxHashMap;

use ante_ast::{DataBody, Expr, FuncDecl, Root, TraitNode, TypeTag};
use ante_common::Location;

use constraints::{Collector, Constraint, Obligation};
use env::TypeEnv;
use error::TypeError;
use exhaustiveness::DecisionTree;
use lowering::VarScope;
use module::{ModuleId, ModuleTable};
use traits::{FunctionId, ImplDef, ImplMethodSig, MonoInstance, Monomorphiser, TraitDef, TraitMethodSig, TraitRegistry};
use ty::{ProductId, Scheme, TraitRef, TyVar, Ty, TypeContext, TypeId};
use unify::{unify, SubstList};

/// Everything produced by a full run: the arena and module table (needed
/// by a diagnostic renderer or codegen adapter to interpret any `TypeId`
/// still reachable from the checked AST) plus every error and warning.
pub struct TypeckResult {
    pub ctx: TypeContext,
    pub table: ModuleTable,
    pub errors: Vec<TypeError>,
    /// Every distinct ground instantiation of each generic top-level
    /// function that a real call site forced (spec section 4.6 step 3),
    /// keyed by the callee's `FunctionId`. Absent entirely for a function
    /// that is never called, or that was never generic in the first place
    /// (see `func_types` for that one's own ground signature instead).
    pub mono: FxHashMap<FunctionId, Vec<MonoInstance>>,
    /// Every top-level function that was never generic, keyed by
    /// `FunctionId`, with its own declared type fully substituted. A
    /// generic function has no entry here — its ground instantiations (if
    /// any call site produced one) live in `mono` instead.
    pub func_types: FxHashMap<FunctionId, TypeId>,
    /// One compiled `DecisionTree` per `Match` expression that passed
    /// exhaustiveness checking (spec section 4.7), keyed by the match's own
    /// location — what the codegen adapter walks instead of re-deriving
    /// coverage from the raw arm patterns. A match that failed exhaustiveness
    /// has no entry; there is nothing ground to hand a backend.
    pub decision_trees: FxHashMap<Location, DecisionTree>,
}

impl TypeckResult {
    /// True if nothing but warnings (spec section 4.7: redundant arms are
    /// warnings, not failures) was collected.
    pub fn is_ok(&self) -> bool {
        self.errors.iter().all(TypeError::is_warning)
    }
}

/// Runs the full pipeline over one compilation unit.
pub fn check(root: &Root) -> TypeckResult {
    let mut ctx = TypeContext::new();
    let mut table = ModuleTable::new("Main");
    let module = table.root();
    builtins::register(&mut ctx, &mut table);

    let mut errors = Vec::new();
    declare_types(&mut ctx, &mut table, module, root, &mut errors);

    let mut env = TypeEnv::new();
    let mut next_id: u32 = 0;
    // Every `FuncDecl` whose body must actually be constraint-collected:
    // top-level functions and `impl` method bodies. Trait method stubs
    // have no body of their own (signature-only) and are never collected.
    let mut checkable: Vec<(&FuncDecl, TypeId)> = Vec::new();
    let mut func_types: FxHashMap<FunctionId, TypeId> = FxHashMap::default();

    for func in &root.funcs {
        let fn_ty = declare_function_scheme(&mut ctx, &table, module, func, &mut errors);
        let vars = free_vars(&ctx, fn_ty);
        // Only a function that was never generic to begin with gets a
        // `func_types` entry — a generic one is only ever emittable once a
        // real call site has pinned its type variables to something
        // ground (see `mono` below).
        if vars.is_empty() {
            func_types.insert(next_id, fn_ty);
        }
        env.insert(func.name.clone(), Scheme { vars, ty: fn_ty }, next_id);
        table.declare_func(module, func.name.clone(), next_id);
        next_id += 1;
        checkable.push((func, fn_ty));
    }

    // Trait declarations (spec section 4.6): each stub's scheme is bound
    // under its own name exactly like a top-level function, generalized
    // over its trait-constrained type variable, so a call-site reference
    // obligates the trait rather than binding to one concrete `impl`.
    let mut registry = TraitRegistry::new();
    for trait_decl in &root.traits {
        registry.register_trait(build_trait_def(trait_decl));
        for stub in &trait_decl.fns {
            let fn_ty = declare_function_scheme(&mut ctx, &table, module, stub, &mut errors);
            let vars = free_vars(&ctx, fn_ty);
            env.insert(stub.name.clone(), Scheme { vars, ty: fn_ty }, next_id);
            table.declare_func(module, stub.name.clone(), next_id);
            next_id += 1;
        }
    }

    // Extensions (`impl Trait for Type { … }`, spec section 3's
    // `TraitImpl`): register the impl for trait resolution, and
    // constraint-collect each method's own body against its declared
    // concrete signature. Methods are deliberately NOT bound into `env`
    // under their own name — that would shadow the trait stub's generic
    // scheme, which is what a call site must resolve through to dispatch
    // on the argument's type rather than binding to whichever `impl`
    // happened to be declared last.
    for (order, ext) in root.extensions.iter().enumerate() {
        let mut self_scope = VarScope::default();
        let self_ty = match lowering::lower_type_scoped(&mut ctx, &table, module, &ext.type_expr, &mut self_scope) {
            Ok(t) => t,
            Err(e) => {
                errors.push(e);
                ctx.fresh_var("?")
            }
        };

        for tr in &ext.traits {
            let mut type_args = vec![self_ty];
            for a in &tr.args {
                match lowering::lower_type_scoped(&mut ctx, &table, module, a, &mut self_scope) {
                    Ok(t) => type_args.push(t),
                    Err(e) => errors.push(e),
                }
            }
            let methods: FxHashMap<String, ImplMethodSig> = ext
                .methods
                .iter()
                .map(|m| (m.name.clone(), build_impl_method_sig(m, &ext.type_expr.name)))
                .collect();
            let impl_errors = registry.register_impl(
                ImplDef {
                    trait_name: tr.name.clone(),
                    type_args: type_args.clone(),
                    methods,
                    declaration_order: order as u32,
                    source_name: ext.type_expr.name.clone(),
                },
                &ext.location,
            );
            errors.extend(impl_errors);
        }

        for method in &ext.methods {
            let fn_ty = declare_function_scheme(&mut ctx, &table, module, method, &mut errors);
            checkable.push((method, fn_ty));
        }
    }

    let mut all_constraints: Vec<Constraint> = Vec::new();
    let mut all_obligations: Vec<Obligation> = Vec::new();
    let mut all_call_sites: Vec<constraints::CallSite> = Vec::new();
    for (func, fn_ty) in &checkable {
        let mut collector = Collector::new(&mut ctx, &table, module);
        collector.collect_function(&mut env, func, *fn_ty);
        all_constraints.append(&mut collector.constraints);
        all_obligations.append(&mut collector.obligations);
        all_call_sites.append(&mut collector.call_sites);
        errors.append(&mut collector.errors);
    }

    if let Some(main_expr) = &root.main {
        let mut collector = Collector::new(&mut ctx, &table, module);
        collector.visit_expr(&mut env, main_expr);
        all_constraints.append(&mut collector.constraints);
        all_obligations.append(&mut collector.obligations);
        all_call_sites.append(&mut collector.call_sites);
        errors.append(&mut collector.errors);
    }

    let mut subs = SubstList::new();
    for c in &all_constraints {
        if let Err(e) = unify(&mut ctx, &mut subs, c.a, c.b, &c.location) {
            errors.push(e);
        }
    }

    for (func, _) in &checkable {
        apply::apply_to_expr(&mut ctx, &subs, &func.body);
    }
    if let Some(main_expr) = &root.main {
        apply::apply_to_expr(&mut ctx, &subs, main_expr);
    }

    for ob in &all_obligations {
        let args: Vec<TypeId> =
            ob.trait_ref.type_args.iter().map(|t| unify::resolve(&ctx, &subs, *t)).collect();
        if traits::synthesize_builtin(&ctx, &ob.trait_ref.trait_name, &args).is_some() {
            continue;
        }
        if registry.has_impl(&ctx, &ob.trait_ref.trait_name, &args) {
            continue;
        }
        errors.push(TypeError::TraitNotSatisfied {
            trait_name: ob.trait_ref.trait_name.clone(),
            location: ob.location.clone(),
        });
    }

    let mut decision_trees: FxHashMap<Location, DecisionTree> = FxHashMap::default();
    for (func, _) in &checkable {
        check_matches(&ctx, &func.body, &mut errors, &mut decision_trees);
    }
    if let Some(main_expr) = &root.main {
        check_matches(&ctx, main_expr, &mut errors, &mut decision_trees);
    }

    // Monomorphisation (spec section 4.6 step 3): every recorded call site
    // pins its callee's generalized scheme down to one ground instance.
    // Distinct call sites to the same function with the same ground
    // arguments share an instance (`Monomorphiser`'s own cache), so only
    // freshly-compiled instances are recorded here.
    let mut monomorphiser = Monomorphiser::new();
    let mut mono: FxHashMap<FunctionId, Vec<MonoInstance>> = FxHashMap::default();
    for site in &all_call_sites {
        let call_site_ty = unify::resolve(&ctx, &subs, site.callee_ty);
        let function_name = &site.function_name;
        match monomorphiser.instantiate(
            site.function,
            &site.decl_vars,
            site.decl_ty,
            call_site_ty,
            |ctx, bindings| {
                let mut keys: Vec<TyVar> = bindings.keys().copied().collect();
                keys.sort_by_key(|v| v.age());
                let params: Vec<TypeId> = keys.iter().map(|v| bindings[v]).collect();
                mangle::mangle(ctx, function_name, &params)
            },
            &mut ctx,
            &site.location,
        ) {
            Ok((instance, true)) => mono.entry(site.function).or_default().push(instance),
            Ok((_, false)) => {}
            Err(e) => errors.push(e),
        }
    }

    for ty in func_types.values_mut() {
        *ty = unify::resolve(&ctx, &subs, *ty);
    }

    TypeckResult { ctx, table, errors, mono, func_types, decision_trees }
}

/// Two-pass declaration scan for data types (spec section 4.2/4.8): every
/// name is registered before any body is lowered, so mutually-recursive
/// and self-referential types resolve regardless of declaration order.
fn declare_types(ctx: &mut TypeContext, table: &mut ModuleTable, module: ModuleId, root: &Root, errors: &mut Vec<TypeError>) {
    let mut product_decls = Vec::new();
    let mut sum_decls = Vec::new();

    for decl in &root.types {
        let mut scope = VarScope::default();
        let type_args: Vec<TypeId> = decl
            .params
            .iter()
            .map(|p| {
                let v = ctx.typevar_named(p.clone());
                scope.insert(p.clone(), v);
                v
            })
            .collect();
        match &decl.body {
            DataBody::Product(fields) => {
                let placeholder = ctx.product_template(decl.name.clone(), Vec::new(), Vec::new(), type_args);
                table.declare_type(module, decl.name.clone(), placeholder);
                let pid = product_id_of(ctx, placeholder);
                product_decls.push((pid, fields, scope));
            }
            DataBody::Sum(variants) => {
                let placeholder = ctx.sum_template(decl.name.clone(), Vec::new(), type_args.clone());
                table.declare_type(module, decl.name.clone(), placeholder);
                let sid = match ctx.get(placeholder) {
                    Ty::Sum(id) => *id,
                    _ => unreachable!(),
                };
                sum_decls.push((sid, type_args, variants, scope));
            }
            DataBody::Alias(type_expr) => {
                // Lowered directly on this pass: an alias is a transparent
                // pointer to its target, never its own arena entry (see
                // `lowering.rs`'s header comment).
                match lowering::lower_type(ctx, table, module, type_expr) {
                    Ok(ty) => table.declare_type(module, decl.name.clone(), ty),
                    Err(e) => errors.push(e),
                }
            }
        }
    }

    for (pid, fields, mut scope) in product_decls {
        let field_tys: Vec<TypeId> = fields
            .iter()
            .map(|f| match &f.type_expr {
                Some(te) => lowering::lower_type_scoped(ctx, table, module, te, &mut scope).unwrap_or_else(|e| {
                    errors.push(e);
                    ctx.fresh_var("?")
                }),
                None => ctx.fresh_var("?"),
            })
            .collect();
        let field_names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
        ctx.set_product_fields(pid, field_tys, field_names);
    }

    for (sid, type_args, variants, scope) in sum_decls {
        let mut tags = Vec::with_capacity(variants.len());
        for variant in variants {
            // Each variant shares the sum's own type-parameter scope (its
            // fields may mention the same `'a`), but gets its own copy so
            // sibling variants don't see each other's incidental fresh
            // variables for unrelated, unannotated fields.
            let mut variant_scope = scope.clone();
            let field_tys: Vec<TypeId> = variant
                .fields
                .iter()
                .map(|f| match &f.type_expr {
                    Some(te) => lowering::lower_type_scoped(ctx, table, module, te, &mut variant_scope)
                        .unwrap_or_else(|e| {
                            errors.push(e);
                            ctx.fresh_var("?")
                        }),
                    None => ctx.fresh_var("?"),
                })
                .collect();
            let field_names: Vec<String> = variant.fields.iter().map(|f| f.name.clone()).collect();
            let variant_ty =
                ctx.product_template(variant.name.clone(), field_tys, field_names, type_args.clone());
            table.declare_type(module, variant.name.clone(), variant_ty);
            tags.push(product_id_of(ctx, variant_ty));
        }
        ctx.set_sum_tags(sid, tags);
    }
}

fn product_id_of(ctx: &TypeContext, ty: TypeId) -> ProductId {
    match ctx.get(ty) {
        Ty::Product(id) => *id,
        _ => unreachable!("product_template always interns a Ty::Product"),
    }
}

/// Builds (and declares, but does not yet generalize) a function's type
/// from its declared signature, or from fresh variables for whatever its
/// signature omits (spec section 4.2: an absent parameter/return
/// annotation lowers to a fresh type variable).
fn declare_function_scheme(
    ctx: &mut TypeContext,
    table: &ModuleTable,
    module: ModuleId,
    func: &FuncDecl,
    errors: &mut Vec<TypeError>,
) -> TypeId {
    // One scope for the whole signature: `'a` in a parameter, the return
    // type, and a `tccs` trait-constraint argument must all lower to the
    // same variable (spec section 4.2) — a repeated mention is the same
    // generic, not three unrelated fresh ones.
    let mut scope = VarScope::default();

    let params: Vec<TypeId> = func
        .params
        .iter()
        .map(|p| match &p.type_expr {
            Some(te) => lowering::lower_type_scoped(ctx, table, module, te, &mut scope).unwrap_or_else(|e| {
                errors.push(e);
                ctx.fresh_var("?")
            }),
            None => ctx.fresh_var(p.name.clone()),
        })
        .collect();

    let ret = match &func.type_expr {
        Some(te) => lowering::lower_type_scoped(ctx, table, module, te, &mut scope).unwrap_or_else(|e| {
            errors.push(e);
            ctx.fresh_var("?")
        }),
        None => ctx.fresh_var("ret"),
    };

    let constraints: Vec<TraitRef> = func
        .trait_constraints
        .iter()
        .map(|tc| {
            let args: Vec<TypeId> = tc
                .args
                .iter()
                .map(|a| {
                    lowering::lower_type_scoped(ctx, table, module, a, &mut scope).unwrap_or_else(|e| {
                        errors.push(e);
                        ctx.fresh_var("?")
                    })
                })
                .collect();
            TraitRef::new(tc.name.clone(), args)
        })
        .collect();

    ctx.func(ret, params, constraints, false)
}

/// Builds a `TraitDef` from a trait declaration: a stub method has
/// `has_self` when its first parameter is annotated with the trait's own
/// generic (spec section 3's `TraitImpl` shape has no separate boolean
/// flag for this — it falls out of the stub's own parameter list).
fn build_trait_def(trait_decl: &TraitNode) -> TraitDef {
    let methods = trait_decl
        .fns
        .iter()
        .map(|f| TraitMethodSig {
            name: f.name.clone(),
            has_self: f.params.first().is_some_and(|p| {
                p.type_expr.as_ref().is_some_and(|te| {
                    te.tag == TypeTag::TypeVar && trait_decl.generics.iter().any(|g| *g == te.name)
                })
            }),
            param_count: f.params.len(),
        })
        .collect();
    TraitDef { name: trait_decl.name.clone(), type_params: trait_decl.generics.clone(), methods }
}

/// Mirrors `build_trait_def`'s `has_self` rule for one `impl` method: its
/// first parameter is annotated with the type being extended.
fn build_impl_method_sig(method: &FuncDecl, self_type_name: &str) -> ImplMethodSig {
    ImplMethodSig {
        has_self: method
            .params
            .first()
            .is_some_and(|p| p.type_expr.as_ref().is_some_and(|te| te.name == self_type_name)),
        param_count: method.params.len(),
    }
}

/// Every `TyVar` reachable from `ty`, in first-encountered order — the
/// set a top-level function's scheme generalizes over (spec section 4.3:
/// "module-level function schemes", consumed by `env::instantiate` at
/// every call site).
fn free_vars(ctx: &TypeContext, ty: TypeId) -> Vec<TyVar> {
    let mut out = Vec::new();
    collect_free_vars(ctx, ty, &mut out);
    out
}

fn collect_free_vars(ctx: &TypeContext, ty: TypeId, out: &mut Vec<TyVar>) {
    match ctx.get(ty) {
        Ty::Var(v) => {
            if !out.contains(v) {
                out.push(*v);
            }
        }
        Ty::Ptr(inner) => collect_free_vars(ctx, *inner, out),
        Ty::Array(inner, _) => collect_free_vars(ctx, *inner, out),
        Ty::Tuple(fields, _) => {
            for f in fields {
                collect_free_vars(ctx, *f, out);
            }
        }
        Ty::Function(ret, params, _, _) => {
            collect_free_vars(ctx, *ret, out);
            for p in params {
                collect_free_vars(ctx, *p, out);
            }
        }
        Ty::Modifier(inner, _) => collect_free_vars(ctx, *inner, out),
        // Named (Product/Sum) types are generalized through their own
        // `type_args`, handled at instantiation time by `lowering.rs`'s
        // generic-instantiation cache rather than by the let-binding
        // scheme here — see `env.rs`'s matching scope cut.
        Ty::Primitive(_) | Ty::Product(_) | Ty::Sum(_) => {}
    }
}

/// Walks a checked function body looking for `Match` expressions, checking
/// each one's exhaustiveness and arm redundancy against its (already
/// substituted) scrutinee type, and — for every match that passes — compiling
/// its arms to a `DecisionTree` keyed by the match's own location.
fn check_matches(
    ctx: &TypeContext,
    expr: &Expr,
    errors: &mut Vec<TypeError>,
    decision_trees: &mut FxHashMap<Location, DecisionTree>,
) {
    if let Expr::Match { scrutinee, branches, location, .. } = expr {
        check_matches(ctx, scrutinee, errors, decision_trees);
        for branch in branches {
            check_matches(ctx, &branch.branch, errors, decision_trees);
        }
        if let Some(id) = scrutinee.ty_slot().get() {
            let ty = TypeId::from_index(id);
            let patterns: Vec<_> = branches.iter().map(|b| b.pattern.clone()).collect();
            let exhaustive = exhaustiveness::check_exhaustiveness(ctx, ty, &patterns);
            if let Err(witness) = &exhaustive {
                errors.push(TypeError::NonExhaustiveMatch { missing: witness.clone(), location: location.clone() });
            }
            for idx in exhaustiveness::check_redundancy(ctx, ty, &patterns) {
                errors.push(TypeError::RedundantArm { location: branches[idx].location.clone() });
            }
            if exhaustive.is_ok() {
                let tree = exhaustiveness::compile_decision_tree(ctx, ty, &patterns);
                decision_trees.insert(location.clone(), tree);
            }
        }
        return;
    }

    match expr {
        Expr::Array { elems, .. } | Expr::Tuple { elems, .. } | Expr::Seq { stmts: elems, .. } => {
            for e in elems {
                check_matches(ctx, e, errors, decision_trees);
            }
        }
        Expr::TypeCast { args, .. } => {
            for a in args {
                check_matches(ctx, a, errors, decision_trees);
            }
        }
        Expr::UnOp { operand, .. } => check_matches(ctx, operand, errors, decision_trees),
        Expr::BinOp { lhs, rhs, .. } => {
            check_matches(ctx, lhs, errors, decision_trees);
            check_matches(ctx, rhs, errors, decision_trees);
        }
        Expr::Block { inner, .. } => check_matches(ctx, inner, errors, decision_trees),
        Expr::Ret { expr: inner, .. } | Expr::Jump { expr: inner, .. } => {
            if let Some(inner) = inner {
                check_matches(ctx, inner, errors, decision_trees);
            }
        }
        Expr::If { cond, then_branch, else_branch, .. } => {
            check_matches(ctx, cond, errors, decision_trees);
            check_matches(ctx, then_branch, errors, decision_trees);
            if let Some(else_branch) = else_branch {
                check_matches(ctx, else_branch, errors, decision_trees);
            }
        }
        Expr::While { cond, body, .. } => {
            check_matches(ctx, cond, errors, decision_trees);
            check_matches(ctx, body, errors, decision_trees);
        }
        Expr::For { range, body, .. } => {
            check_matches(ctx, range, errors, decision_trees);
            check_matches(ctx, body, errors, decision_trees);
        }
        Expr::VarAssign { target, value, .. } => {
            check_matches(ctx, target, errors, decision_trees);
            check_matches(ctx, value, errors, decision_trees);
        }
        Expr::Match { .. } => unreachable!("handled above"),
        Expr::IntLit { .. }
        | Expr::FltLit { .. }
        | Expr::StrLit { .. }
        | Expr::CharLit { .. }
        | Expr::BoolLit { .. }
        | Expr::Var { .. } => {}
    }
}
