//! Drives `emit_checked` off a real `ante_typeck::check` run, the way a
//! backend crate would: type-check a small program, then hand the result
//! to the adapter contract and confirm it actually receives ground,
//! monomorphised requests rather than being exercised only by a
//! hand-built `EmitRequest`.

use ante_ast::{BinOpKind, Expr, FuncDecl, MatchBranch, NamedVal, Pattern, Root, Slot, TypeNode};
use ante_codegen_adapter::{emit_checked, NullAdapter};
use ante_common::Location;
use ante_typeck::check;
use ante_typeck::exhaustiveness::DecisionTree;

fn loc() -> Location {
    Location::synthetic()
}

fn var_expr(name: &str) -> Expr {
    Expr::Var { name: name.to_string(), location: loc(), ty: Slot::empty(), decl: Slot::empty() }
}

fn int_lit(text: &str) -> Expr {
    Expr::IntLit { text: text.to_string(), location: loc(), ty: Slot::empty() }
}

fn empty_root() -> Root {
    Root {
        imports: Vec::new(),
        types: Vec::new(),
        traits: Vec::new(),
        extensions: Vec::new(),
        funcs: Vec::new(),
        main: None,
        location: loc(),
    }
}

/// `id 'a : 'a -> 'a = x -> x`, called once as `id 3`. Expect exactly one
/// emitted request, mangled for its `I32` instantiation.
#[test]
fn generic_function_emits_one_request_per_call_site_instantiation() {
    let mut root = empty_root();

    let id_decl = FuncDecl {
        name: "id".to_string(),
        params: vec![NamedVal {
            name: "x".to_string(),
            type_expr: Some(TypeNode::type_var("a", loc())),
            location: loc(),
        }],
        type_expr: Some(TypeNode::type_var("a", loc())),
        trait_constraints: Vec::new(),
        body: Box::new(var_expr("x")),
        location: loc(),
        decl: Slot::empty(),
    };
    root.funcs.push(id_decl);

    let call = Expr::BinOp {
        op: BinOpKind::Call,
        lhs: Box::new(var_expr("id")),
        rhs: Box::new(Expr::Tuple { elems: vec![int_lit("3")], location: loc(), ty: Slot::empty() }),
        location: loc(),
        ty: Slot::empty(),
        decl: Slot::empty(),
    };
    root.main = Some(Box::new(call));

    let result = check(&root);
    assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);

    let mut adapter = NullAdapter::default();
    emit_checked(&mut adapter, &root, &result).expect("emission should not fail");

    assert_eq!(adapter.emitted.len(), 1);
    assert!(adapter.emitted[0].starts_with("id\u{1}"));
}

/// A non-generic function with no call sites at all still gets emitted
/// once, under its own bare declared signature.
#[test]
fn non_generic_function_emits_even_without_a_call_site() {
    let mut root = empty_root();

    let answer_decl = FuncDecl {
        name: "answer".to_string(),
        params: Vec::new(),
        type_expr: Some(TypeNode::named("I32", loc())),
        trait_constraints: Vec::new(),
        body: Box::new(int_lit("42")),
        location: loc(),
        decl: Slot::empty(),
    };
    root.funcs.push(answer_decl);

    let result = check(&root);
    assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);

    let mut adapter = NullAdapter::default();
    emit_checked(&mut adapter, &root, &result).expect("emission should not fail");

    assert_eq!(adapter.emitted, vec!["answer".to_string()]);
}

fn bool_ctor(name: &str) -> Pattern {
    Pattern::Constructor { name: name.to_string(), args: Vec::new(), location: loc(), ty: Slot::empty() }
}

/// `flag : Bool -> I32 = b -> match b { True -> 1, False -> 0 }`. The match
/// is exhaustive, so `check` must hand back a compiled `DecisionTree` the
/// adapter can reach through `EmitRequest::decision_trees` alongside the
/// function's own signature and body.
#[test]
fn exhaustive_match_compiles_to_a_decision_tree_the_request_carries() {
    let mut root = empty_root();

    let body = Expr::Match {
        scrutinee: Box::new(var_expr("b")),
        branches: vec![
            MatchBranch { pattern: bool_ctor("True"), branch: Box::new(int_lit("1")), location: loc() },
            MatchBranch { pattern: bool_ctor("False"), branch: Box::new(int_lit("0")), location: loc() },
        ],
        location: loc(),
        ty: Slot::empty(),
    };
    let flag_decl = FuncDecl {
        name: "flag".to_string(),
        params: vec![NamedVal { name: "b".to_string(), type_expr: Some(TypeNode::named("Bool", loc())), location: loc() }],
        type_expr: Some(TypeNode::named("I32", loc())),
        trait_constraints: Vec::new(),
        body: Box::new(body),
        location: loc(),
        decl: Slot::empty(),
    };
    root.funcs.push(flag_decl);

    let result = check(&root);
    assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.decision_trees.len(), 1);
    let tree = result.decision_trees.values().next().unwrap();
    assert!(matches!(tree, DecisionTree::Switch { .. }));

    let mut adapter = NullAdapter::default();
    emit_checked(&mut adapter, &root, &result).expect("emission should not fail");
    assert_eq!(adapter.emitted, vec!["flag".to_string()]);
}
