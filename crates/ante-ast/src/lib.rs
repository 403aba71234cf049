//! AST node kinds consumed by the type system core.
//!
//! This crate owns no lexer, parser, or source text — it is the contract
//! spec section 6 describes: a plain data model the (out-of-scope) parser
//! builds and the core reads. Dispatch over node kinds is by `match`, not
//! virtual dispatch (spec section 9's Design Notes), so there is no visitor
//! trait here; callers write their own recursive matches.

pub mod expr;
pub mod item;
pub mod pattern;
pub mod slot;
pub mod type_expr;

pub use expr::{BinOpKind, Expr, JumpKind, MatchBranch, UnOpKind};
pub use item::{
    DataBody, DataDecl, Ext, FuncDecl, Import, Mod, ModKind, NamedVal, Root, TraitNode,
    TraitRefExpr, Variant,
};
pub use pattern::{LiteralPattern, Pattern};
pub use slot::{Slot, SlotId};
pub use type_expr::{Modifier, TypeNode, TypeTag};
