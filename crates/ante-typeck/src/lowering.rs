//! AST → Type Lowering (spec section 4.2).
//!
//! A pure translator from a parsed `ante_ast::TypeNode` to an arena type.
//! Named types resolve against the module table; by the time a name
//! reaches here, an alias has already been registered by the declaration
//! scan as a direct pointer to its underlying `TypeId` (so "a type alias
//! to a primitive returns that primitive directly" falls out of module
//! lookup for free, with no separate alias-unwrapping step needed here).

use rustc_hash::FxHashMap;

use ante_ast::{Modifier as AstModifier, TypeNode, TypeTag};

use crate::error::TypeError;
use crate::module::{ModuleId, ModuleTable};
use crate::ty::{ModifierKind, ProductId, SumId, Ty, TypeContext, TypeId};
use crate::unify::{apply_substitutions, Substitution, SubstList};

/// Maps a type-variable name to the single `TypeId` every mention of it
/// resolves to within one declaration's signature — `'a` in `'a -> 'a`
/// must lower to the same variable both times, not two unrelated fresh
/// ones (spec section 4.2).
pub type VarScope = FxHashMap<String, TypeId>;

fn lower_modifier(m: AstModifier) -> ModifierKind {
    match m {
        AstModifier::Mut => ModifierKind::Mut,
        AstModifier::Const => ModifierKind::Const,
        AstModifier::Let => ModifierKind::Let,
        AstModifier::Global => ModifierKind::Global,
        AstModifier::Ante => ModifierKind::Ante,
        // The surface directive's token text is not carried by this AST
        // node; every compiler-directive modifier collapses to one kind.
        AstModifier::CompilerDirective => ModifierKind::CompilerDirective("directive".to_string()),
    }
}

/// Lowers `node`, threading `scope` through every recursive call so that
/// repeated mentions of the same type-variable name within one
/// declaration resolve to the same `TypeId` (spec section 4.2).
pub fn lower_type_scoped(
    ctx: &mut TypeContext,
    table: &ModuleTable,
    module: ModuleId,
    node: &TypeNode,
    scope: &mut VarScope,
) -> Result<TypeId, TypeError> {
    let missing_child = |what: &str| TypeError::Internal {
        message: format!("{what} type node is missing its child"),
        location: node.location.clone(),
    };

    let base = match node.tag {
        TypeTag::TypeVar => {
            if let Some(existing) = scope.get(&node.name) {
                *existing
            } else {
                let fresh = ctx.typevar_named(node.name.clone());
                scope.insert(node.name.clone(), fresh);
                fresh
            }
        }
        TypeTag::Ptr => {
            let inner = node.params.first().ok_or_else(|| missing_child("Ptr"))?;
            let inner_ty = lower_type_scoped(ctx, table, module, inner, scope)?;
            ctx.ptr(inner_ty)
        }
        TypeTag::Array => {
            let inner = node.params.first().ok_or_else(|| missing_child("Array"))?;
            let inner_ty = lower_type_scoped(ctx, table, module, inner, scope)?;
            let len: u64 = node.name.parse().unwrap_or(0);
            ctx.array(inner_ty, len)
        }
        TypeTag::Tuple => {
            let mut fields = Vec::with_capacity(node.params.len());
            for p in &node.params {
                fields.push(lower_type_scoped(ctx, table, module, p, scope)?);
            }
            ctx.tuple(fields)
        }
        TypeTag::Function => {
            let (ret_node, param_nodes) =
                node.params.split_last().ok_or_else(|| missing_child("Function"))?;
            let ret = lower_type_scoped(ctx, table, module, ret_node, scope)?;
            let mut params = Vec::with_capacity(param_nodes.len());
            for p in param_nodes {
                params.push(lower_type_scoped(ctx, table, module, p, scope)?);
            }
            ctx.func(ret, params, Vec::new(), false)
        }
        TypeTag::Named => lower_named_scoped(ctx, table, module, node, scope)?,
    };

    let mut result = base;
    for m in &node.modifiers {
        result = ctx.add_modifier(result, lower_modifier(*m));
    }
    Ok(result)
}

/// A single type expression with no sibling nodes to share variables
/// with (a cast target, an alias body). Equivalent to
/// `lower_type_scoped` with a scope scoped to just this call.
pub fn lower_type(
    ctx: &mut TypeContext,
    table: &ModuleTable,
    module: ModuleId,
    node: &TypeNode,
) -> Result<TypeId, TypeError> {
    let mut scope = VarScope::default();
    lower_type_scoped(ctx, table, module, node, &mut scope)
}

fn declared_type_args(ctx: &TypeContext, declared: TypeId) -> Vec<TypeId> {
    match ctx.get(declared) {
        Ty::Product(id) => ctx.product(*id).type_args.clone(),
        Ty::Sum(id) => ctx.sum(*id).type_args.clone(),
        _ => Vec::new(),
    }
}

fn lower_named_scoped(
    ctx: &mut TypeContext,
    table: &ModuleTable,
    module: ModuleId,
    node: &TypeNode,
    scope: &mut VarScope,
) -> Result<TypeId, TypeError> {
    let declared = table.lookup_type(module, &node.name).ok_or_else(|| TypeError::UnknownType {
        name: node.name.clone(),
        location: node.location.clone(),
    })?;

    let expected_arity = declared_type_args(ctx, declared).len();
    let given = node.params.len();
    if given > expected_arity {
        return Err(TypeError::ArityMismatch {
            expected: expected_arity,
            found: given,
            location: node.location.clone(),
        });
    }

    let mut args = Vec::with_capacity(expected_arity);
    for p in &node.params {
        args.push(lower_type_scoped(ctx, table, module, p, scope)?);
    }
    // Under-applied generics are auto-completed with fresh type variables.
    for _ in given..expected_arity {
        args.push(ctx.fresh_var("_"));
    }

    if args.is_empty() {
        return Ok(declared);
    }

    match ctx.get(declared) {
        Ty::Product(id) => {
            let id = *id;
            Ok(instantiate_product(ctx, id, args))
        }
        Ty::Sum(id) => {
            let id = *id;
            Ok(instantiate_sum(ctx, id, args))
        }
        _ => Ok(declared),
    }
}

fn binding_subs(ctx: &TypeContext, template_args: &[TypeId], args: &[TypeId]) -> SubstList {
    template_args
        .iter()
        .zip(args)
        .filter_map(|(t, a)| match ctx.get(*t) {
            Ty::Var(v) => Some(Substitution { var: *v, ty: *a }),
            _ => None,
        })
        .collect()
}

/// Instantiates a generic product template with concrete `args`,
/// substituting its declared type-parameter variables through each
/// field's type (spec section 4.2). A field whose own declared type is
/// itself another still-generic product/sum is left as that template's
/// reference rather than recursively re-instantiated — that binding is
/// settled during monomorphisation (section 4.6) instead.
fn instantiate_product(ctx: &mut TypeContext, template: ProductId, args: Vec<TypeId>) -> TypeId {
    if let Some(existing) = ctx
        .product(template)
        .generic_variants
        .iter()
        .find(|v| ctx.product(**v).type_args == args)
        .copied()
    {
        return ctx.product_type(existing);
    }

    let template_args = ctx.product(template).type_args.clone();
    let subs = binding_subs(ctx, &template_args, &args);
    let name = ctx.product(template).name.clone();
    let fields = ctx.product(template).fields.clone();
    let field_names = ctx.product(template).field_names.clone();
    let new_fields: Vec<TypeId> =
        fields.iter().map(|f| apply_substitutions(ctx, &subs, *f)).collect();

    let new_ty = ctx.product_template(name, new_fields, field_names, args.clone());
    let new_id = match ctx.get(new_ty) {
        Ty::Product(id) => *id,
        _ => unreachable!("product_template always interns a Ty::Product"),
    };
    ctx.set_product_unbound_ref(new_id, template);
    ctx.push_product_generic_variant(template, new_id);
    new_ty
}

/// As `instantiate_product`, but for a sum's tags: each tag is itself
/// instantiated against the same concrete `args`, since a sum's variants
/// share its type parameters.
fn instantiate_sum(ctx: &mut TypeContext, template: SumId, args: Vec<TypeId>) -> TypeId {
    if let Some(existing) = ctx
        .sum(template)
        .generic_variants
        .iter()
        .find(|v| ctx.sum(**v).type_args == args)
        .copied()
    {
        return ctx.sum_type(existing);
    }

    let name = ctx.sum(template).name.clone();
    let tags = ctx.sum(template).tags.clone();
    let new_tags: Vec<ProductId> = tags
        .iter()
        .map(|t| {
            let instantiated = instantiate_product(ctx, *t, args.clone());
            match ctx.get(instantiated) {
                Ty::Product(id) => *id,
                _ => unreachable!("instantiate_product always returns a Ty::Product"),
            }
        })
        .collect();

    let new_ty = ctx.sum_template(name, Vec::new(), args.clone());
    let new_id = match ctx.get(new_ty) {
        Ty::Sum(id) => *id,
        _ => unreachable!("sum_template always interns a Ty::Sum"),
    };
    ctx.set_sum_tags(new_id, new_tags);
    ctx.set_sum_unbound_ref(new_id, template);
    ctx.push_sum_generic_variant(template, new_id);
    new_ty
}
