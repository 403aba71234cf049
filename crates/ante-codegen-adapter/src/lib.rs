//! The codegen adapter contract (spec section 6): "a thin codegen adapter
//! is treated as a black box offering a minimal API the core consumes."
//!
//! Grounded on `snow_codegen`'s `compile(&Parse, &TypeckResult) -> Result<(),
//! String>` entry point, narrowed from a whole-program LLVM backend down to
//! the single per-function callback the core actually promises to drive:
//! by the time `emit_function` is called, every type slot reachable from
//! `body` is solved and ground, and `mono_mapping` carries exact bindings
//! for every type variable a generic callee's `decl-ptr` might reference.
//! No `inkwell`/LLVM dependency belongs here — lowering AST to a concrete
//! backend's IR is the adapter implementation's job, not this crate's.

use rustc_hash::FxHashMap;

use ante_ast::{Expr, NamedVal, Root};
use ante_common::Location;
use ante_typeck::exhaustiveness::DecisionTree;
use ante_typeck::ty::{TyVar, TypeId};
use ante_typeck::{mangle, TypeckResult};

/// One concrete, fully-monomorphised function the core has decided to
/// emit. `signature` is its ground function type; `mono_mapping` is empty
/// for a function that was never generic. `decision_trees` carries every
/// `Match` expression's compiled tree reachable from `body`, keyed by that
/// match's own location — the adapter looks one up when it reaches the
/// corresponding `Expr::Match` while lowering `body` rather than
/// re-deriving coverage from the arm patterns itself.
pub struct EmitRequest<'a> {
    pub name: &'a str,
    pub mangled_name: &'a str,
    pub signature: TypeId,
    pub param_decls: &'a [NamedVal],
    pub body: &'a Expr,
    pub mono_mapping: &'a FxHashMap<TyVar, TypeId>,
    pub decision_trees: &'a FxHashMap<Location, DecisionTree>,
}

/// Implemented by whatever backend turns a typed, ground AST into
/// something runnable. The core never inspects an implementation's
/// internals — it only ever calls `emit_function` once per function it
/// decides to compile (spec section 6).
pub trait CodegenAdapter {
    fn emit_function(&mut self, request: EmitRequest<'_>) -> Result<(), String>;
}

/// A test double that records every request it receives instead of
/// lowering anything. Lets the core's pipeline tests assert "exactly
/// these functions, with exactly these mono bindings, were handed off"
/// without depending on a real backend.
#[derive(Default)]
pub struct NullAdapter {
    pub emitted: Vec<String>,
}

impl CodegenAdapter for NullAdapter {
    fn emit_function(&mut self, request: EmitRequest<'_>) -> Result<(), String> {
        self.emitted.push(request.mangled_name.to_string());
        Ok(())
    }
}

/// Drives `adapter` over every checked top-level function in `root` (spec
/// section 6): a function with at least one recorded call-site
/// instantiation is emitted once per distinct ground instance; a function
/// that was never generic is emitted once under its own declared
/// signature. A declared-but-never-called generic function is emitted zero
/// times — there is no ground type to compile it against.
pub fn emit_checked(adapter: &mut dyn CodegenAdapter, root: &Root, result: &TypeckResult) -> Result<(), String> {
    let root_module = result.table.root();
    for func in &root.funcs {
        let Some(fid) = result.table.lookup_func(root_module, &func.name) else { continue };

        if let Some(instances) = result.mono.get(&fid) {
            for instance in instances {
                adapter.emit_function(EmitRequest {
                    name: &func.name,
                    mangled_name: &instance.mangled_name,
                    signature: instance.ground_ty,
                    param_decls: &func.params,
                    body: &func.body,
                    mono_mapping: &instance.bindings,
                    decision_trees: &result.decision_trees,
                })?;
            }
            continue;
        }

        let Some(&signature) = result.func_types.get(&fid) else { continue };
        let mangled_name = mangle::mangle(&result.ctx, &func.name, &[]);
        let mono_mapping = FxHashMap::default();
        adapter.emit_function(EmitRequest {
            name: &func.name,
            mangled_name: &mangled_name,
            signature,
            param_decls: &func.params,
            body: &func.body,
            mono_mapping: &mono_mapping,
            decision_trees: &result.decision_trees,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ante_common::Location;
    use ante_ast::Slot;

    #[test]
    fn null_adapter_records_the_mangled_name() {
        let mut adapter = NullAdapter::default();
        let body = Expr::IntLit { text: "0".into(), location: Location::synthetic(), ty: Slot::empty() };
        let mono_mapping = FxHashMap::default();
        let decision_trees = FxHashMap::default();
        let signature = TypeId::from_index(0);
        adapter
            .emit_function(EmitRequest {
                name: "id",
                mangled_name: "id\u{1}i32",
                signature,
                param_decls: &[],
                body: &body,
                mono_mapping: &mono_mapping,
                decision_trees: &decision_trees,
            })
            .unwrap();
        assert_eq!(adapter.emitted, vec!["id\u{1}i32".to_string()]);
    }
}
