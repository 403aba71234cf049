//! Pattern exhaustiveness and redundancy checking (spec section 4.7).
//!
//! `snow_typeck::exhaustiveness` ships the vocabulary this module is
//! grounded on — `PatternMatrix`, `ConstructorSig`, `TypeInfo` — but every
//! function in that file is a `todo!()` behind an otherwise complete test
//! suite. This is a real implementation of Maranget's usefulness algorithm
//! (Algorithm U) specialized to a single scrutinee column: because this
//! pattern grammar has no or-patterns and a `match` only ever destructures
//! one value, tuple/constructor fields are the only source of multiple
//! "columns", so the matrix's first column is always the thing currently
//! being asked about and specialization only ever grows columns to its
//! left. `compile_decision_tree` below reuses the same specialization
//! machinery to compile a matrix to a `DecisionTree` rather than just
//! answer a yes/no question about it.

use ante_ast::{LiteralPattern, Pattern};

use crate::ty::{PrimitiveTag, Ty, TypeContext, TypeId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKey {
    Int(String),
    Float(String),
    Str(String),
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SimplePat {
    Wildcard,
    Literal(LiteralKey),
    /// A tuple (synthetic name `"(tuple)"`) or a named sum-type variant,
    /// with its sub-patterns.
    Ctor(String, Vec<SimplePat>),
}

type Row = Vec<SimplePat>;

/// The portion of the scrutinee's type structure exhaustiveness cares
/// about: either a finite, enumerable set of constructors (a sum type, a
/// tuple with its single synthetic constructor, or `Bool`'s two implicit
/// variants) or an infinite, literal-patterned domain that only a wildcard
/// can cover.
#[derive(Debug, Clone)]
enum TypeShape {
    Finite(Vec<CtorShape>),
    Infinite,
}

#[derive(Debug, Clone)]
struct CtorShape {
    name: String,
    fields: Vec<TypeShape>,
}

fn to_literal_key(lit: &LiteralPattern) -> LiteralKey {
    match lit {
        LiteralPattern::Int(s) => LiteralKey::Int(s.clone()),
        LiteralPattern::Float(s) => LiteralKey::Float(s.clone()),
        LiteralPattern::Str(s) => LiteralKey::Str(s.clone()),
        LiteralPattern::Char(c) => LiteralKey::Char(*c),
    }
}

fn to_simple(pat: &Pattern) -> SimplePat {
    match pat {
        Pattern::Wildcard { .. } | Pattern::Variable { .. } => SimplePat::Wildcard,
        Pattern::Literal { value, .. } => SimplePat::Literal(to_literal_key(value)),
        Pattern::Tuple { elements, .. } => {
            SimplePat::Ctor("(tuple)".to_string(), elements.iter().map(to_simple).collect())
        }
        Pattern::Constructor { name, args, .. } => {
            SimplePat::Ctor(name.clone(), args.iter().map(to_simple).collect())
        }
    }
}

/// Bool patterns use the bare-constructor grammar (`True`, `False`) rather
/// than a dedicated literal kind, since spec section 4.7's literal patterns
/// are only int/float/string/char; this is the one place that convention
/// gets interpreted.
fn type_shape_of(ctx: &TypeContext, ty: TypeId) -> TypeShape {
    match ctx.get(ty) {
        Ty::Primitive(PrimitiveTag::Bool) => TypeShape::Finite(vec![
            CtorShape { name: "True".to_string(), fields: Vec::new() },
            CtorShape { name: "False".to_string(), fields: Vec::new() },
        ]),
        Ty::Primitive(_) => TypeShape::Infinite,
        Ty::Tuple(fields, _) => TypeShape::Finite(vec![CtorShape {
            name: "(tuple)".to_string(),
            fields: fields.iter().map(|f| type_shape_of(ctx, *f)).collect(),
        }]),
        Ty::Sum(id) => {
            let data = ctx.sum(*id);
            TypeShape::Finite(
                data.tags
                    .iter()
                    .map(|tag| {
                        let product = ctx.product(*tag);
                        CtorShape {
                            name: product.name.clone(),
                            fields: product.fields.iter().map(|f| type_shape_of(ctx, *f)).collect(),
                        }
                    })
                    .collect(),
            )
        }
        // Type variables become wildcards (spec 4.7); bare products, ptrs,
        // arrays and functions have no pattern grammar reaching into them.
        Ty::Var(_) | Ty::Ptr(_) | Ty::Array(_, _) | Ty::Function(..) | Ty::Product(_) | Ty::Modifier(_, _) => {
            TypeShape::Infinite
        }
    }
}

fn specialize_ctor(matrix: &[Row], ctor: &str, arity: usize) -> Vec<Row> {
    matrix
        .iter()
        .filter_map(|row| match &row[0] {
            SimplePat::Ctor(name, args) if name == ctor => {
                let mut new_row = args.clone();
                new_row.extend_from_slice(&row[1..]);
                Some(new_row)
            }
            SimplePat::Wildcard => {
                let mut new_row = vec![SimplePat::Wildcard; arity];
                new_row.extend_from_slice(&row[1..]);
                Some(new_row)
            }
            _ => None,
        })
        .collect()
}

fn specialize_literal(matrix: &[Row], lit: &LiteralKey) -> Vec<Row> {
    matrix
        .iter()
        .filter_map(|row| match &row[0] {
            SimplePat::Literal(l) if l == lit => Some(row[1..].to_vec()),
            SimplePat::Wildcard => Some(row[1..].to_vec()),
            _ => None,
        })
        .collect()
}

fn default_matrix(matrix: &[Row]) -> Vec<Row> {
    matrix
        .iter()
        .filter_map(|row| match &row[0] {
            SimplePat::Wildcard => Some(row[1..].to_vec()),
            _ => None,
        })
        .collect()
}

fn used_ctor_names(matrix: &[Row]) -> std::collections::BTreeSet<String> {
    matrix
        .iter()
        .filter_map(|row| match &row[0] {
            SimplePat::Ctor(name, _) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

/// Algorithm U: is `query` useful (does it match some value not already
/// covered by `matrix`)? Used to flag a redundant/unreachable arm (spec
/// 4.7: "a branch fully subsumed by earlier ones").
fn is_useful(shapes: &[TypeShape], matrix: &[Row], query: &Row) -> bool {
    if query.is_empty() {
        return matrix.is_empty();
    }
    match &shapes[0] {
        TypeShape::Infinite => match &query[0] {
            SimplePat::Literal(lit) => {
                let spec = specialize_literal(matrix, lit);
                is_useful(&shapes[1..], &spec, &query[1..].to_vec())
            }
            SimplePat::Wildcard => {
                let spec = default_matrix(matrix);
                is_useful(&shapes[1..], &spec, &query[1..].to_vec())
            }
            SimplePat::Ctor(name, args) => {
                let spec = specialize_ctor(matrix, name, args.len());
                let mut new_query = args.clone();
                new_query.extend_from_slice(&query[1..]);
                is_useful(&shapes[1..], &spec, &new_query)
            }
        },
        TypeShape::Finite(ctors) => match &query[0] {
            SimplePat::Ctor(name, args) => {
                let fields = ctors
                    .iter()
                    .find(|c| &c.name == name)
                    .map(|c| c.fields.clone())
                    .unwrap_or_default();
                let spec = specialize_ctor(matrix, name, args.len());
                let mut new_shapes = fields;
                new_shapes.extend_from_slice(&shapes[1..]);
                let mut new_query = args.clone();
                new_query.extend_from_slice(&query[1..]);
                is_useful(&new_shapes, &spec, &new_query)
            }
            SimplePat::Literal(_) => false,
            SimplePat::Wildcard => {
                let used = used_ctor_names(matrix);
                let complete = ctors.iter().all(|c| used.contains(&c.name));
                if complete {
                    ctors.iter().any(|c| {
                        let spec = specialize_ctor(matrix, &c.name, c.fields.len());
                        let mut new_shapes = c.fields.clone();
                        new_shapes.extend_from_slice(&shapes[1..]);
                        let mut new_query = vec![SimplePat::Wildcard; c.fields.len()];
                        new_query.extend_from_slice(&query[1..]);
                        is_useful(&new_shapes, &spec, &new_query)
                    })
                } else {
                    let spec = default_matrix(matrix);
                    is_useful(&shapes[1..], &spec, &query[1..].to_vec())
                }
            }
        },
    }
}

/// Tries every constructor of every finite shape along the way; if some
/// combination remains entirely unmatched, returns a concrete witness row.
fn missing_witness(shapes: &[TypeShape], matrix: &[Row]) -> Option<Row> {
    if shapes.is_empty() {
        return if matrix.is_empty() { Some(Vec::new()) } else { None };
    }
    match &shapes[0] {
        TypeShape::Infinite => {
            let spec = default_matrix(matrix);
            missing_witness(&shapes[1..], &spec).map(|mut rest| {
                rest.insert(0, SimplePat::Wildcard);
                rest
            })
        }
        TypeShape::Finite(ctors) => {
            for c in ctors {
                let spec = specialize_ctor(matrix, &c.name, c.fields.len());
                let mut new_shapes = c.fields.clone();
                new_shapes.extend_from_slice(&shapes[1..]);
                if let Some(mut witness) = missing_witness(&new_shapes, &spec) {
                    let field_witnesses: Vec<SimplePat> = witness.drain(..c.fields.len()).collect();
                    let mut result = vec![SimplePat::Ctor(c.name.clone(), field_witnesses)];
                    result.extend(witness);
                    return Some(result);
                }
            }
            None
        }
    }
}

fn render(pat: &SimplePat) -> String {
    match pat {
        SimplePat::Wildcard => "_".to_string(),
        SimplePat::Literal(_) => "_".to_string(),
        SimplePat::Ctor(name, fields) if name == "(tuple)" => {
            format!("({})", fields.iter().map(render).collect::<Vec<_>>().join(", "))
        }
        SimplePat::Ctor(name, fields) if fields.is_empty() => name.clone(),
        SimplePat::Ctor(name, fields) => {
            format!("{} {}", name, fields.iter().map(render).collect::<Vec<_>>().join(" "))
        }
    }
}

/// What a `DecisionTree::Switch` node discriminates on at one occurrence
/// (spec section 4.7's "discriminator extraction"): either a literal value
/// or a named constructor together with how many sub-occurrences its
/// fields extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discriminator {
    Literal(LiteralKey),
    Ctor(String, usize),
}

/// A pattern matrix compiled to conditional branches (spec section 4.7):
/// a backend-agnostic tree the codegen adapter walks instead of
/// re-deriving coverage from the raw patterns itself. `path` names an
/// occurrence as a sequence of field indices from the scrutinee root, so a
/// backend can turn it into however it addresses nested fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionTree {
    /// Branch `index` (position in the original arm list) matches.
    Leaf(usize),
    /// Unreachable once `check_exhaustiveness` has passed; kept so
    /// `compile_decision_tree` is total over any matrix it's handed.
    Fail,
    /// Test the occurrence at `path`, branching to whichever `cases` entry
    /// its discriminator matches, or to `default` if none do.
    Switch { path: Vec<usize>, cases: Vec<(Discriminator, DecisionTree)>, default: Option<Box<DecisionTree>> },
}

type IndexedRow = (usize, Row);

/// Maranget's compilation (as opposed to usefulness) pass: same
/// specialize-and-recurse shape as `is_useful`/`missing_witness`, but
/// instead of a yes/no or a witness it emits one tree node per column
/// tested and joins each constructor's sub-patterns back in as freshly
/// addressed occurrences (the "φ-join" of the fields compiled so far with
/// the columns still waiting to their right).
fn compile(shapes: &[TypeShape], occurrences: &[Vec<usize>], rows: &[IndexedRow]) -> DecisionTree {
    if rows.is_empty() {
        return DecisionTree::Fail;
    }
    if shapes.is_empty() || rows[0].1.iter().all(|p| matches!(p, SimplePat::Wildcard)) {
        return DecisionTree::Leaf(rows[0].0);
    }
    match &shapes[0] {
        TypeShape::Finite(ctors) => {
            let cases = ctors
                .iter()
                .map(|c| {
                    let spec: Vec<IndexedRow> = rows
                        .iter()
                        .filter_map(|(i, row)| match &row[0] {
                            SimplePat::Ctor(name, args) if name == &c.name => {
                                let mut new_row = args.clone();
                                new_row.extend_from_slice(&row[1..]);
                                Some((*i, new_row))
                            }
                            SimplePat::Wildcard => {
                                let mut new_row = vec![SimplePat::Wildcard; c.fields.len()];
                                new_row.extend_from_slice(&row[1..]);
                                Some((*i, new_row))
                            }
                            _ => None,
                        })
                        .collect();
                    let mut new_shapes = c.fields.clone();
                    new_shapes.extend_from_slice(&shapes[1..]);
                    let mut new_occurrences: Vec<Vec<usize>> = (0..c.fields.len())
                        .map(|field| {
                            let mut path = occurrences[0].clone();
                            path.push(field);
                            path
                        })
                        .collect();
                    new_occurrences.extend_from_slice(&occurrences[1..]);
                    let subtree = compile(&new_shapes, &new_occurrences, &spec);
                    (Discriminator::Ctor(c.name.clone(), c.fields.len()), subtree)
                })
                .collect();
            DecisionTree::Switch { path: occurrences[0].clone(), cases, default: None }
        }
        TypeShape::Infinite => {
            let mut literals: Vec<LiteralKey> = Vec::new();
            for (_, row) in rows {
                if let SimplePat::Literal(l) = &row[0] {
                    if !literals.contains(l) {
                        literals.push(l.clone());
                    }
                }
            }
            let cases = literals
                .iter()
                .map(|lit| {
                    let spec: Vec<IndexedRow> = rows
                        .iter()
                        .filter_map(|(i, row)| match &row[0] {
                            SimplePat::Literal(l) if l == lit => Some((*i, row[1..].to_vec())),
                            SimplePat::Wildcard => Some((*i, row[1..].to_vec())),
                            _ => None,
                        })
                        .collect();
                    let subtree = compile(&shapes[1..], &occurrences[1..], &spec);
                    (Discriminator::Literal(lit.clone()), subtree)
                })
                .collect();
            let default_rows: Vec<IndexedRow> = rows
                .iter()
                .filter_map(|(i, row)| match &row[0] {
                    SimplePat::Wildcard => Some((*i, row[1..].to_vec())),
                    _ => None,
                })
                .collect();
            let default = Some(Box::new(compile(&shapes[1..], &occurrences[1..], &default_rows)));
            DecisionTree::Switch { path: occurrences[0].clone(), cases, default }
        }
    }
}

/// Compiles `branch_patterns` matched against `scrutinee_ty` into a
/// `DecisionTree`. Meant to be called only once `check_exhaustiveness` has
/// already confirmed full coverage — an arm list this misses a case for
/// will compile to a tree with a reachable `Fail`, which a caller that
/// skipped the exhaustiveness check deserves.
pub fn compile_decision_tree(ctx: &TypeContext, scrutinee_ty: TypeId, branch_patterns: &[Pattern]) -> DecisionTree {
    let shape = type_shape_of(ctx, scrutinee_ty);
    let rows: Vec<IndexedRow> = branch_patterns.iter().enumerate().map(|(i, p)| (i, vec![to_simple(p)])).collect();
    compile(std::slice::from_ref(&shape), &[Vec::new()], &rows)
}

/// `Ok(())` if every value of `scrutinee_ty` is covered by some branch;
/// otherwise `Err(witness)` naming one concrete uncovered value.
pub fn check_exhaustiveness(
    ctx: &TypeContext,
    scrutinee_ty: TypeId,
    branch_patterns: &[Pattern],
) -> Result<(), String> {
    let shape = type_shape_of(ctx, scrutinee_ty);
    let matrix: Vec<Row> = branch_patterns.iter().map(|p| vec![to_simple(p)]).collect();
    match missing_witness(std::slice::from_ref(&shape), &matrix) {
        None => Ok(()),
        Some(witness) => Err(render(&witness[0])),
    }
}

/// Returns the index of every branch that is fully subsumed by the
/// branches before it.
pub fn check_redundancy(
    ctx: &TypeContext,
    scrutinee_ty: TypeId,
    branch_patterns: &[Pattern],
) -> Vec<usize> {
    let shape = type_shape_of(ctx, scrutinee_ty);
    let mut matrix: Vec<Row> = Vec::new();
    let mut redundant = Vec::new();
    for (i, pat) in branch_patterns.iter().enumerate() {
        let row = vec![to_simple(pat)];
        if !is_useful(std::slice::from_ref(&shape), &matrix, &row) {
            redundant.push(i);
        }
        matrix.push(row);
    }
    redundant
}

#[cfg(test)]
mod tests {
    use super::*;
    use ante_common::Location;
    use ante_ast::Slot;

    fn loc() -> Location {
        Location::synthetic()
    }

    fn wildcard() -> Pattern {
        Pattern::Wildcard { location: loc() }
    }

    fn variable(name: &str) -> Pattern {
        Pattern::Variable { name: name.to_string(), location: loc(), decl: Slot::empty() }
    }

    fn ctor(name: &str, args: Vec<Pattern>) -> Pattern {
        Pattern::Constructor { name: name.to_string(), args, location: loc(), ty: Slot::empty() }
    }

    fn int_lit(text: &str) -> Pattern {
        Pattern::Literal { value: LiteralPattern::Int(text.to_string()), location: loc() }
    }

    fn bool_ty(ctx: &mut TypeContext) -> TypeId {
        ctx.prim(PrimitiveTag::Bool)
    }

    fn option_ty(ctx: &mut TypeContext) -> TypeId {
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let some = ctx.product_template("Some", vec![i32_ty], vec![], vec![]);
        let none = ctx.product_template("None", vec![], vec![], vec![]);
        let some_id = match ctx.get(some) {
            Ty::Product(id) => *id,
            _ => unreachable!(),
        };
        let none_id = match ctx.get(none) {
            Ty::Product(id) => *id,
            _ => unreachable!(),
        };
        ctx.sum_template("Option", vec![some_id, none_id], vec![])
    }

    #[test]
    fn bool_exhaustive_with_both_variants() {
        let mut ctx = TypeContext::new();
        let ty = bool_ty(&mut ctx);
        let branches = vec![ctor("True", vec![]), ctor("False", vec![])];
        assert!(check_exhaustiveness(&ctx, ty, &branches).is_ok());
    }

    #[test]
    fn bool_non_exhaustive_missing_false() {
        let mut ctx = TypeContext::new();
        let ty = bool_ty(&mut ctx);
        let branches = vec![ctor("True", vec![])];
        let err = check_exhaustiveness(&ctx, ty, &branches).unwrap_err();
        assert_eq!(err, "False");
    }

    #[test]
    fn bool_exhaustive_via_wildcard() {
        let mut ctx = TypeContext::new();
        let ty = bool_ty(&mut ctx);
        let branches = vec![ctor("True", vec![]), wildcard()];
        assert!(check_exhaustiveness(&ctx, ty, &branches).is_ok());
    }

    #[test]
    fn option_exhaustive_with_both_tags() {
        let mut ctx = TypeContext::new();
        let ty = option_ty(&mut ctx);
        let branches = vec![ctor("Some", vec![variable("x")]), ctor("None", vec![])];
        assert!(check_exhaustiveness(&ctx, ty, &branches).is_ok());
    }

    #[test]
    fn option_non_exhaustive_missing_none() {
        let mut ctx = TypeContext::new();
        let ty = option_ty(&mut ctx);
        let branches = vec![ctor("Some", vec![variable("x")])];
        let err = check_exhaustiveness(&ctx, ty, &branches).unwrap_err();
        assert_eq!(err, "None");
    }

    #[test]
    fn redundancy_after_wildcard_is_flagged() {
        let mut ctx = TypeContext::new();
        let ty = bool_ty(&mut ctx);
        let branches = vec![wildcard(), ctor("True", vec![])];
        assert_eq!(check_redundancy(&ctx, ty, &branches), vec![1]);
    }

    #[test]
    fn duplicate_arm_is_redundant() {
        let mut ctx = TypeContext::new();
        let ty = bool_ty(&mut ctx);
        let branches = vec![ctor("True", vec![]), ctor("True", vec![])];
        assert_eq!(check_redundancy(&ctx, ty, &branches), vec![1]);
    }

    #[test]
    fn no_redundancy_when_each_arm_adds_coverage() {
        let mut ctx = TypeContext::new();
        let ty = bool_ty(&mut ctx);
        let branches = vec![ctor("True", vec![]), ctor("False", vec![])];
        assert!(check_redundancy(&ctx, ty, &branches).is_empty());
    }

    #[test]
    fn literal_int_without_wildcard_is_non_exhaustive() {
        let mut ctx = TypeContext::new();
        let ty = ctx.prim(PrimitiveTag::I32);
        let branches = vec![int_lit("0"), int_lit("1")];
        assert!(check_exhaustiveness(&ctx, ty, &branches).is_err());
    }

    #[test]
    fn literal_int_with_trailing_wildcard_is_exhaustive() {
        let mut ctx = TypeContext::new();
        let ty = ctx.prim(PrimitiveTag::I32);
        let branches = vec![int_lit("0"), wildcard()];
        assert!(check_exhaustiveness(&ctx, ty, &branches).is_ok());
    }

    #[test]
    fn multi_field_tuple_needs_joint_coverage() {
        let mut ctx = TypeContext::new();
        let bool_ty = ctx.prim(PrimitiveTag::Bool);
        let ty = ctx.tuple(vec![bool_ty, bool_ty]);
        let branches = vec![
            Pattern::Tuple { elements: vec![ctor("True", vec![]), wildcard()], location: loc() },
            Pattern::Tuple { elements: vec![ctor("False", vec![]), wildcard()], location: loc() },
        ];
        assert!(check_exhaustiveness(&ctx, ty, &branches).is_ok());
    }

    #[test]
    fn multi_field_tuple_missing_one_corner_is_non_exhaustive() {
        let mut ctx = TypeContext::new();
        let bool_ty = ctx.prim(PrimitiveTag::Bool);
        let ty = ctx.tuple(vec![bool_ty, bool_ty]);
        let branches = vec![Pattern::Tuple {
            elements: vec![ctor("True", vec![]), wildcard()],
            location: loc(),
        }];
        assert!(check_exhaustiveness(&ctx, ty, &branches).is_err());
    }

    #[test]
    fn nested_option_inside_tuple() {
        let mut ctx = TypeContext::new();
        let option = option_ty(&mut ctx);
        let ty = ctx.tuple(vec![option]);
        let branches = vec![
            Pattern::Tuple {
                elements: vec![ctor("Some", vec![variable("x")])],
                location: loc(),
            },
            Pattern::Tuple { elements: vec![ctor("None", vec![])], location: loc() },
        ];
        assert!(check_exhaustiveness(&ctx, ty, &branches).is_ok());
    }

    #[test]
    fn bool_decision_tree_switches_on_root_occurrence() {
        let mut ctx = TypeContext::new();
        let ty = bool_ty(&mut ctx);
        let branches = vec![ctor("True", vec![]), ctor("False", vec![])];
        let tree = compile_decision_tree(&ctx, ty, &branches);
        match tree {
            DecisionTree::Switch { path, cases, default } => {
                assert!(path.is_empty());
                assert_eq!(cases.len(), 2);
                assert!(default.is_none());
                assert_eq!(cases[0].0, Discriminator::Ctor("True".to_string(), 0));
                assert!(matches!(cases[0].1, DecisionTree::Leaf(0)));
                assert_eq!(cases[1].0, Discriminator::Ctor("False".to_string(), 0));
                assert!(matches!(cases[1].1, DecisionTree::Leaf(1)));
            }
            other => panic!("expected a Switch, got {other:?}"),
        }
    }

    #[test]
    fn wildcard_arm_compiles_straight_to_its_leaf() {
        let mut ctx = TypeContext::new();
        let ty = bool_ty(&mut ctx);
        let branches = vec![ctor("True", vec![]), wildcard()];
        let tree = compile_decision_tree(&ctx, ty, &branches);
        match tree {
            DecisionTree::Switch { cases, default, .. } => {
                assert!(matches!(cases[0].1, DecisionTree::Leaf(0)));
                assert!(matches!(cases[1].1, DecisionTree::Leaf(1)));
                assert!(default.is_none());
            }
            other => panic!("expected a Switch, got {other:?}"),
        }
    }

    #[test]
    fn tuple_decision_tree_addresses_nested_occurrences() {
        let mut ctx = TypeContext::new();
        let bool_ty = ctx.prim(PrimitiveTag::Bool);
        let ty = ctx.tuple(vec![bool_ty, bool_ty]);
        let branches = vec![
            Pattern::Tuple { elements: vec![ctor("True", vec![]), wildcard()], location: loc() },
            Pattern::Tuple { elements: vec![ctor("False", vec![]), wildcard()], location: loc() },
        ];
        let tree = compile_decision_tree(&ctx, ty, &branches);
        // The tuple itself has one constructor, so the outer switch tests
        // occurrence `[]` and immediately hands off to its two fields at
        // `[0]` and `[1]`.
        match tree {
            DecisionTree::Switch { path, cases, .. } => {
                assert!(path.is_empty());
                assert_eq!(cases.len(), 1);
                match &cases[0].1 {
                    DecisionTree::Switch { path, .. } => assert_eq!(path, &vec![0]),
                    other => panic!("expected the tuple's field switch, got {other:?}"),
                }
            }
            other => panic!("expected a Switch, got {other:?}"),
        }
    }

    #[test]
    fn literal_match_with_wildcard_default_compiles_a_fallthrough() {
        let mut ctx = TypeContext::new();
        let ty = ctx.prim(PrimitiveTag::I32);
        let branches = vec![int_lit("0"), wildcard()];
        let tree = compile_decision_tree(&ctx, ty, &branches);
        match tree {
            DecisionTree::Switch { cases, default, .. } => {
                assert_eq!(cases.len(), 1);
                assert!(matches!(cases[0].1, DecisionTree::Leaf(0)));
                assert!(matches!(default.as_deref(), Some(DecisionTree::Leaf(1))));
            }
            other => panic!("expected a Switch, got {other:?}"),
        }
    }
}
