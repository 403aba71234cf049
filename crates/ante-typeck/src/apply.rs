//! The substitution-application pass (spec section 4.5): walks a function
//! body calling `apply_substitutions` on every node's cached type slot.
//!
//! This AST has no node kind for a locally nested function or `impl` (those
//! only ever exist at `Root` level), so the "deliberately not re-walked
//! here" carve-out from section 4.5 has no expression-level counterpart to
//! skip; every `Expr` this pass reaches is solved in place.

use ante_ast::{Expr, MatchBranch, Pattern};

use crate::ty::TypeContext;
use crate::unify::{apply_substitutions, SubstList};

fn solve_slot(ctx: &mut TypeContext, subs: &SubstList, expr: &Expr) {
    let slot = expr.ty_slot();
    if let Some(id) = slot.get() {
        let solved = apply_substitutions(ctx, subs, crate::ty::TypeId::from_index(id));
        slot.fill(solved.index());
    }
}

fn apply_pattern(ctx: &mut TypeContext, subs: &SubstList, pattern: &Pattern) {
    match pattern {
        Pattern::Wildcard { .. } | Pattern::Literal { .. } => {}
        Pattern::Variable { .. } => {}
        Pattern::Tuple { elements, .. } => {
            for e in elements {
                apply_pattern(ctx, subs, e);
            }
        }
        Pattern::Constructor { args, ty, .. } => {
            if let Some(id) = ty.get() {
                let solved = apply_substitutions(ctx, subs, crate::ty::TypeId::from_index(id));
                ty.fill(solved.index());
            }
            for a in args {
                apply_pattern(ctx, subs, a);
            }
        }
    }
}

/// Recursively solve every type slot reachable from `expr`.
pub fn apply_to_expr(ctx: &mut TypeContext, subs: &SubstList, expr: &Expr) {
    solve_slot(ctx, subs, expr);
    match expr {
        Expr::IntLit { .. }
        | Expr::FltLit { .. }
        | Expr::StrLit { .. }
        | Expr::CharLit { .. }
        | Expr::BoolLit { .. }
        | Expr::Var { .. } => {}
        Expr::Array { elems, .. } | Expr::Tuple { elems, .. } | Expr::Seq { stmts: elems, .. } => {
            for e in elems {
                apply_to_expr(ctx, subs, e);
            }
        }
        Expr::TypeCast { args, .. } => {
            for a in args {
                apply_to_expr(ctx, subs, a);
            }
        }
        Expr::UnOp { operand, .. } => apply_to_expr(ctx, subs, operand),
        Expr::BinOp { lhs, rhs, .. } => {
            apply_to_expr(ctx, subs, lhs);
            apply_to_expr(ctx, subs, rhs);
        }
        Expr::Block { inner, .. } => apply_to_expr(ctx, subs, inner),
        Expr::Ret { expr: inner, .. } | Expr::Jump { expr: inner, .. } => {
            if let Some(inner) = inner {
                apply_to_expr(ctx, subs, inner);
            }
        }
        Expr::If { cond, then_branch, else_branch, .. } => {
            apply_to_expr(ctx, subs, cond);
            apply_to_expr(ctx, subs, then_branch);
            if let Some(else_branch) = else_branch {
                apply_to_expr(ctx, subs, else_branch);
            }
        }
        Expr::While { cond, body, .. } => {
            apply_to_expr(ctx, subs, cond);
            apply_to_expr(ctx, subs, body);
        }
        Expr::For { pattern, range, body, .. } => {
            apply_pattern(ctx, subs, pattern);
            apply_to_expr(ctx, subs, range);
            apply_to_expr(ctx, subs, body);
        }
        Expr::Match { scrutinee, branches, .. } => {
            apply_to_expr(ctx, subs, scrutinee);
            for MatchBranch { pattern, branch, .. } in branches {
                apply_pattern(ctx, subs, pattern);
                apply_to_expr(ctx, subs, branch);
            }
        }
        Expr::VarAssign { target, value, .. } => {
            apply_to_expr(ctx, subs, target);
            apply_to_expr(ctx, subs, value);
        }
    }
}
