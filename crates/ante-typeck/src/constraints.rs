//! Constraint Collection (spec section 4.3).
//!
//! A visitor over the AST that fills every node's `ty` slot with a fresh
//! type variable, then emits an ordered list of `(Type, Type, location,
//! message)` pairs plus `(TraitRef, location)` obligations, in source
//! order. Grounded rule-by-rule on `constraintfindingvisitor.cpp`'s
//! `ConstraintFindingVisitor` (the call-site arity/fresh-function-type
//! logic for `BinOpKind::Call` is a direct translation of its `'('` case),
//! generalized onto the arena/`TypeId` model instead of raw `AnType*`.
//!
//! A field-access rule appears in the distilled constraint table but no
//! corresponding AST node is part of this crate's contract (spec section
//! 6's node list has none); it is treated as inapplicable rather than
//! implemented against a node that doesn't exist.

use ante_ast::{BinOpKind, Expr, FuncDecl, LiteralPattern, MatchBranch, Pattern, UnOpKind};
use ante_common::Location;

use crate::builtins::STR_NAME;
use crate::env::{instantiate, TypeEnv};
use crate::error::TypeError;
use crate::module::{ModuleId, ModuleTable};
use crate::traits::FunctionId;
use crate::ty::{PrimitiveTag, Scheme, TraitRef, TyVar, Ty, TypeContext, TypeId};

#[derive(Debug, Clone)]
pub struct Constraint {
    pub a: TypeId,
    pub b: TypeId,
    pub location: Location,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Obligation {
    pub trait_ref: TraitRef,
    pub location: Location,
}

/// A named function's callee position at one `f(args)` call site (spec
/// section 4.6 step 1): `decl_vars`/`decl_ty` are the callee's own
/// generalized scheme, unchanged across every call; `callee_ty` is the
/// fresh instantiation minted for this particular reference, which later
/// unification pins to a ground type. Recorded only when the callee is a
/// direct reference to a declared top-level function — monomorphisation
/// has no notion of instantiating an anonymous or indirect callee.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub function: FunctionId,
    pub function_name: String,
    pub decl_vars: Vec<TyVar>,
    pub decl_ty: TypeId,
    pub callee_ty: TypeId,
    pub location: Location,
}

/// Owns the running declaration-id counter and the emitted constraint/
/// obligation/error lists for one collection pass. One `Collector` is
/// shared across every function body in a module so declaration ids stay
/// unique module-wide.
pub struct Collector<'ctx, 'tbl> {
    ctx: &'ctx mut TypeContext,
    table: &'tbl ModuleTable,
    module: ModuleId,
    next_decl: u32,
    pub constraints: Vec<Constraint>,
    pub obligations: Vec<Obligation>,
    pub errors: Vec<TypeError>,
    pub call_sites: Vec<CallSite>,
    return_stack: Vec<TypeId>,
}

impl<'ctx, 'tbl> Collector<'ctx, 'tbl> {
    pub fn new(ctx: &'ctx mut TypeContext, table: &'tbl ModuleTable, module: ModuleId) -> Self {
        Self {
            ctx,
            table,
            module,
            next_decl: 0,
            constraints: Vec::new(),
            obligations: Vec::new(),
            errors: Vec::new(),
            call_sites: Vec::new(),
            return_stack: Vec::new(),
        }
    }

    fn fresh_decl(&mut self) -> u32 {
        let id = self.next_decl;
        self.next_decl += 1;
        id
    }

    fn push(&mut self, a: TypeId, b: TypeId, location: &Location, message: impl Into<String>) {
        self.constraints.push(Constraint { a, b, location: location.clone(), message: message.into() });
    }

    fn obligate(&mut self, trait_name: &str, args: Vec<TypeId>, location: &Location) {
        self.obligations
            .push(Obligation { trait_ref: TraitRef::new(trait_name, args), location: location.clone() });
    }

    fn named(&mut self, name: &str, location: &Location) -> TypeId {
        match self.table.lookup_type(self.module, name) {
            Some(ty) => ty,
            None => {
                self.errors.push(TypeError::UnknownType {
                    name: name.to_string(),
                    location: location.clone(),
                });
                self.ctx.fresh_var("?")
            }
        }
    }

    fn str_ty(&mut self, location: &Location) -> TypeId {
        self.named(STR_NAME, location)
    }

    /// Collects constraints over a top-level function's body. `env` must
    /// already contain every sibling function's scheme (so mutual
    /// recursion resolves), plus this function's own scheme bound
    /// monomorphically for recursive calls within its own body.
    pub fn collect_function(&mut self, env: &mut TypeEnv, func: &FuncDecl, fn_ty: TypeId) {
        let (ret_ty, param_tys) = match self.ctx.get(fn_ty).clone() {
            Ty::Function(ret, params, _, _) => (ret, params),
            _ => {
                self.errors.push(TypeError::NotAFunction { ty: fn_ty, location: func.location.clone() });
                return;
            }
        };

        env.push_scope();
        for (param, param_ty) in func.params.iter().zip(param_tys.iter()) {
            let decl = self.fresh_decl();
            env.insert(param.name.clone(), Scheme::mono(*param_ty), decl);
        }

        self.return_stack.push(ret_ty);
        let body_ty = self.visit_expr(env, &func.body);
        self.return_stack.pop();
        self.push(ret_ty, body_ty, &func.location, "function body must match its declared return type");
        env.pop_scope();
    }

    pub fn visit_expr(&mut self, env: &mut TypeEnv, expr: &Expr) -> TypeId {
        let ty = match expr {
            Expr::IntLit { .. } => self.ctx.prim(PrimitiveTag::I32),
            Expr::FltLit { .. } => self.ctx.prim(PrimitiveTag::F64),
            Expr::BoolLit { .. } => self.ctx.prim(PrimitiveTag::Bool),
            Expr::CharLit { .. } => self.ctx.prim(PrimitiveTag::C8),
            Expr::StrLit { location, .. } => self.str_ty(location),

            Expr::Array { elems, location, .. } => {
                let elem_ty = self.ctx.fresh_var("t");
                for e in elems {
                    let e_ty = self.visit_expr(env, e);
                    self.push(elem_ty, e_ty, location, "array elements must share a type");
                }
                self.ctx.array(elem_ty, elems.len() as u64)
            }
            Expr::Tuple { elems, .. } => {
                let field_tys: Vec<TypeId> = elems.iter().map(|e| self.visit_expr(env, e)).collect();
                self.ctx.tuple(field_tys)
            }

            Expr::TypeCast { type_expr, args, .. } => {
                let cast_ty =
                    crate::lowering::lower_type(self.ctx, self.table, self.module, type_expr)
                        .unwrap_or_else(|e| {
                            self.errors.push(e);
                            self.ctx.fresh_var("?")
                        });
                for a in args {
                    self.visit_expr(env, a);
                }
                cast_ty
            }

            Expr::UnOp { op, operand, location, .. } => self.unop(env, *op, operand, location),
            Expr::BinOp { op, lhs, rhs, location, .. } => self.binop(env, *op, lhs, rhs, location),

            Expr::Seq { stmts, .. } => {
                let mut last = self.ctx.unit();
                for s in stmts {
                    last = self.visit_expr(env, s);
                }
                last
            }
            Expr::Block { inner, .. } => self.visit_expr(env, inner),

            Expr::Ret { expr, location, .. } => {
                let e_ty = match expr {
                    Some(e) => self.visit_expr(env, e),
                    None => self.ctx.unit(),
                };
                if let Some(ret_ty) = self.return_stack.last().copied() {
                    self.push(ret_ty, e_ty, location, "returned value must match the function's return type");
                }
                e_ty
            }

            Expr::If { cond, then_branch, else_branch, location, .. } => {
                let cond_ty = self.visit_expr(env, cond);
                let bool_ty = self.ctx.prim(PrimitiveTag::Bool);
                self.push(cond_ty, bool_ty, location, "if condition must be Bool");
                let then_ty = self.visit_expr(env, then_branch);
                match else_branch {
                    Some(e) => {
                        let else_ty = self.visit_expr(env, e);
                        self.push(then_ty, else_ty, location, "if branches must have the same type");
                        then_ty
                    }
                    None => {
                        let unit = self.ctx.unit();
                        self.push(then_ty, unit, location, "if with no else must have a Unit body");
                        unit
                    }
                }
            }
            Expr::While { cond, body, location, .. } => {
                let cond_ty = self.visit_expr(env, cond);
                let bool_ty = self.ctx.prim(PrimitiveTag::Bool);
                self.push(cond_ty, bool_ty, location, "while condition must be Bool");
                self.visit_expr(env, body);
                self.ctx.unit()
            }
            Expr::For { pattern, range, body, location, .. } => {
                let range_ty = self.visit_expr(env, range);
                self.obligate("Iterable", vec![range_ty], location);
                let elem_ty = self.ctx.fresh_var("t");
                env.push_scope();
                self.bind_irrefutable(env, pattern, elem_ty);
                self.visit_expr(env, body);
                env.pop_scope();
                self.ctx.unit()
            }

            Expr::Match { scrutinee, branches, .. } => self.match_expr(env, scrutinee, branches),

            Expr::Var { name, location, decl, .. } => match env.lookup(name) {
                Some(binding) => {
                    let scheme = binding.scheme.clone();
                    decl.fill(binding.decl);
                    let ty = instantiate(self.ctx, &scheme);
                    // A reference to a function declared with trait
                    // constraints (e.g. a trait method stub's own `'a`
                    // bound) obligates those constraints here, against the
                    // freshly-instantiated type variables a later call-site
                    // unification will pin down (spec section 4.6 step 1).
                    if let Ty::Function(_, _, constraints, _) = self.ctx.get(ty).clone() {
                        for c in constraints {
                            self.obligate(&c.trait_name, c.type_args.clone(), location);
                        }
                    }
                    ty
                }
                None => match self.table.lookup_func(self.module, name) {
                    Some(fid) => {
                        decl.fill(fid);
                        self.ctx.fresh_var(name.clone())
                    }
                    None => {
                        self.errors.push(TypeError::UnboundVariable {
                            name: name.clone(),
                            location: location.clone(),
                        });
                        self.ctx.fresh_var("?")
                    }
                },
            },

            Expr::VarAssign { target, value, modifiers, location, .. } => {
                let value_ty = self.visit_expr(env, value);
                let is_let = modifiers.iter().any(|m| matches!(m, ante_ast::Modifier::Let));
                if is_let {
                    if let Expr::Var { name, decl, .. } = target.as_ref() {
                        let id = self.fresh_decl();
                        decl.fill(id);
                        env.insert(name.clone(), Scheme::mono(value_ty), id);
                    }
                } else {
                    let target_ty = self.visit_expr(env, target);
                    self.push(target_ty, value_ty, location, "assigned value must match the target's type");
                }
                self.ctx.unit()
            }

            Expr::Jump { expr, location, .. } => {
                if let Some(e) = expr {
                    let e_ty = self.visit_expr(env, e);
                    let i32_ty = self.ctx.prim(PrimitiveTag::I32);
                    self.push(e_ty, i32_ty, location, "jump count must be I32");
                }
                self.ctx.unit()
            }
        };
        expr.ty_slot().fill(ty.index());
        ty
    }

    fn unop(&mut self, env: &mut TypeEnv, op: UnOpKind, operand: &Expr, location: &Location) -> TypeId {
        match op {
            UnOpKind::Ref => {
                let operand_ty = self.visit_expr(env, operand);
                self.ctx.ptr(operand_ty)
            }
            UnOpKind::Deref => {
                let operand_ty = self.visit_expr(env, operand);
                let inner = self.ctx.fresh_var("t");
                let ptr_ty = self.ctx.ptr(inner);
                self.push(operand_ty, ptr_ty, location, "@ requires a pointer operand");
                inner
            }
            UnOpKind::Neg => {
                let operand_ty = self.visit_expr(env, operand);
                self.obligate("Neg", vec![operand_ty], location);
                operand_ty
            }
            UnOpKind::Not => {
                let operand_ty = self.visit_expr(env, operand);
                let bool_ty = self.ctx.prim(PrimitiveTag::Bool);
                self.push(operand_ty, bool_ty, location, "not requires a Bool operand");
                bool_ty
            }
        }
    }

    fn binop(&mut self, env: &mut TypeEnv, op: BinOpKind, lhs: &Expr, rhs: &Expr, location: &Location) -> TypeId {
        if op == BinOpKind::Call {
            return self.call(env, lhs, rhs, location);
        }

        let lhs_ty = self.visit_expr(env, lhs);
        let rhs_ty = self.visit_expr(env, rhs);

        match op {
            BinOpKind::Add | BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod
            | BinOpKind::Concat => {
                self.push(lhs_ty, rhs_ty, location, "operands must share a type");
                let trait_name = match op {
                    BinOpKind::Add | BinOpKind::Concat => "Add",
                    BinOpKind::Sub => "Sub",
                    BinOpKind::Mul => "Mul",
                    BinOpKind::Div => "Div",
                    BinOpKind::Mod => "Mod",
                    _ => unreachable!(),
                };
                self.obligate(trait_name, vec![lhs_ty], location);
                lhs_ty
            }
            BinOpKind::Lt | BinOpKind::Gt | BinOpKind::Le | BinOpKind::Ge => {
                self.push(lhs_ty, rhs_ty, location, "compared operands must share a type");
                self.obligate("Cmp", vec![lhs_ty], location);
                self.ctx.prim(PrimitiveTag::Bool)
            }
            BinOpKind::Eq | BinOpKind::NotEq => {
                self.push(lhs_ty, rhs_ty, location, "compared operands must share a type");
                self.obligate("Eq", vec![lhs_ty], location);
                self.ctx.prim(PrimitiveTag::Bool)
            }
            BinOpKind::And | BinOpKind::Or => {
                let bool_ty = self.ctx.prim(PrimitiveTag::Bool);
                self.push(lhs_ty, bool_ty, location, "logical operand must be Bool");
                self.push(rhs_ty, bool_ty, location, "logical operand must be Bool");
                bool_ty
            }
            BinOpKind::Call => unreachable!("handled above"),
        }
    }

    /// `f(args)`, modelled as `BinOp { op: Call, lhs: f, rhs: Tuple(args) }`
    /// (spec section 4.3's `f(args)` rule; grounded on the original
    /// `BinOpNode` `'('`-case: try the callee's type as a `Function`
    /// directly, else build a fresh one and unify it in).
    fn call(&mut self, env: &mut TypeEnv, callee: &Expr, args: &Expr, location: &Location) -> TypeId {
        let callee_ty = self.visit_expr(env, callee);
        if let Expr::Var { name, decl, .. } = callee {
            if let (Some(function), Some(binding)) = (decl.get(), env.lookup(name)) {
                self.call_sites.push(CallSite {
                    function,
                    function_name: name.clone(),
                    decl_vars: binding.scheme.vars.clone(),
                    decl_ty: binding.scheme.ty,
                    callee_ty,
                    location: location.clone(),
                });
            }
        }
        let args_ty = self.visit_expr(env, args);
        let arg_tys: Vec<TypeId> = match self.ctx.get(args_ty).clone() {
            Ty::Tuple(fields, _) => fields,
            _ => vec![args_ty],
        };

        match self.ctx.get(callee_ty).clone() {
            Ty::Function(ret, params, _, _) => {
                if params.len() != arg_tys.len() {
                    self.errors.push(TypeError::ArityMismatch {
                        expected: params.len(),
                        found: arg_tys.len(),
                        location: location.clone(),
                    });
                    return self.ctx.fresh_var("?");
                }
                for (p, a) in params.iter().zip(arg_tys.iter()) {
                    self.push(*p, *a, location, "argument type must match the parameter's declared type");
                }
                ret
            }
            _ => {
                let ret_ty = self.ctx.fresh_var("ret");
                let fn_ty = self.ctx.func(ret_ty, arg_tys, Vec::new(), false);
                self.push(callee_ty, fn_ty, location, "callee must be a function of matching arity");
                ret_ty
            }
        }
    }

    fn match_expr(&mut self, env: &mut TypeEnv, scrutinee: &Expr, branches: &[MatchBranch]) -> TypeId {
        let scrutinee_ty = self.visit_expr(env, scrutinee);
        let body_ty = self.ctx.fresh_var("match");
        for branch in branches {
            env.push_scope();
            self.pattern_constraints(env, &branch.pattern, scrutinee_ty);
            let branch_ty = self.visit_expr(env, &branch.branch);
            self.push(body_ty, branch_ty, &branch.location, "match arms must have the same type");
            env.pop_scope();
        }
        body_ty
    }

    /// Binds an irrefutable pattern (as used by `for`) into `env`, ignoring
    /// shape mismatches since loop patterns aren't checked for
    /// exhaustiveness.
    fn bind_irrefutable(&mut self, env: &mut TypeEnv, pattern: &Pattern, ty: TypeId) {
        match pattern {
            Pattern::Wildcard { .. } => {}
            Pattern::Variable { name, decl, .. } => {
                let id = self.fresh_decl();
                decl.fill(id);
                env.insert(name.clone(), Scheme::mono(ty), id);
            }
            Pattern::Tuple { elements, location } => {
                let field_tys: Vec<TypeId> = (0..elements.len()).map(|_| self.ctx.fresh_var("t")).collect();
                let tuple_ty = self.ctx.tuple(field_tys.clone());
                self.push(ty, tuple_ty, location, "for-pattern must match the range element's shape");
                for (elem, elem_ty) in elements.iter().zip(field_tys) {
                    self.bind_irrefutable(env, elem, elem_ty);
                }
            }
            Pattern::Literal { .. } | Pattern::Constructor { .. } => {}
        }
    }

    /// Emits unification constraints linking a `match` pattern's shape to
    /// the scrutinee's type and binds every variable it introduces.
    fn pattern_constraints(&mut self, env: &mut TypeEnv, pattern: &Pattern, scrutinee_ty: TypeId) {
        match pattern {
            Pattern::Wildcard { .. } => {}
            Pattern::Variable { name, decl, .. } => {
                let id = self.fresh_decl();
                decl.fill(id);
                env.insert(name.clone(), Scheme::mono(scrutinee_ty), id);
            }
            Pattern::Literal { value, location } => {
                let lit_ty = match value {
                    LiteralPattern::Int(_) => self.ctx.prim(PrimitiveTag::I32),
                    LiteralPattern::Float(_) => self.ctx.prim(PrimitiveTag::F64),
                    LiteralPattern::Str(_) => self.str_ty(location),
                    LiteralPattern::Char(_) => self.ctx.prim(PrimitiveTag::C8),
                };
                self.push(scrutinee_ty, lit_ty, location, "pattern literal must match the scrutinee's type");
            }
            Pattern::Tuple { elements, location } => {
                let field_tys: Vec<TypeId> = (0..elements.len()).map(|_| self.ctx.fresh_var("t")).collect();
                let tuple_ty = self.ctx.tuple(field_tys.clone());
                self.push(scrutinee_ty, tuple_ty, location, "tuple pattern arity must match the scrutinee");
                for (elem, elem_ty) in elements.iter().zip(field_tys) {
                    self.pattern_constraints(env, elem, elem_ty);
                }
            }
            Pattern::Constructor { name, args, location, ty } => {
                let ctor_ty = self.named(name, location);
                let pid = match self.ctx.get(ctor_ty) {
                    Ty::Product(pid) => Some(*pid),
                    _ => None,
                };
                match pid {
                    Some(pid) => {
                        let parent_sum = self.ctx.product(pid).parent_sum;
                        let owner = match parent_sum {
                            Some(sum_id) => self.ctx.sum_type(sum_id),
                            None => ctor_ty,
                        };
                        ty.fill(ctor_ty.index());
                        self.push(scrutinee_ty, owner, location, "constructor pattern must match the scrutinee's type");
                        let fields = self.ctx.product(pid).fields.clone();
                        for (arg, field_ty) in args.iter().zip(fields.iter()) {
                            self.pattern_constraints(env, arg, *field_ty);
                        }
                    }
                    None => {
                        self.errors.push(TypeError::UnknownVariant {
                            name: name.clone(),
                            location: location.clone(),
                        });
                    }
                }
            }
        }
    }
}
