//! Expression-carrying node kinds (spec section 6).
//!
//! Every variant here carries a `Location` and a `ty: Slot` — the mutable,
//! nullable type slot the core fills in during constraint collection and
//! substitution application. `BinOp` and `Var` additionally carry a `decl`
//! slot pointing at whatever declaration they resolved to.

use ante_common::Location;

use crate::pattern::Pattern;
use crate::slot::Slot;
use crate::type_expr::{Modifier, TypeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOpKind {
    Neg,
    Not,
    /// `&x`
    Ref,
    /// `@p`
    Deref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    /// `f(args)` — application, with `lhs` the callee and `rhs` the
    /// argument tuple. Not a dedicated node: the surface grammar treats
    /// a call as just another infix operator on the callee and its
    /// parenthesised argument list.
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Break,
    Continue,
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit { text: String, location: Location, ty: Slot },
    FltLit { text: String, location: Location, ty: Slot },
    StrLit { text: String, location: Location, ty: Slot },
    CharLit { text: String, location: Location, ty: Slot },
    BoolLit { value: bool, location: Location, ty: Slot },

    Array { elems: Vec<Expr>, location: Location, ty: Slot },
    Tuple { elems: Vec<Expr>, location: Location, ty: Slot },

    /// `typeExpr(args…)` — constructor application or a primitive cast.
    TypeCast { type_expr: TypeNode, args: Vec<Expr>, location: Location, ty: Slot },

    UnOp { op: UnOpKind, operand: Box<Expr>, location: Location, ty: Slot },
    BinOp {
        op: BinOpKind,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        location: Location,
        ty: Slot,
        decl: Slot,
    },

    Seq { stmts: Vec<Expr>, location: Location, ty: Slot },
    Block { inner: Box<Expr>, location: Location, ty: Slot },
    Ret { expr: Option<Box<Expr>>, location: Location, ty: Slot },

    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
        location: Location,
        ty: Slot,
    },
    While { cond: Box<Expr>, body: Box<Expr>, location: Location, ty: Slot },
    For { pattern: Pattern, range: Box<Expr>, body: Box<Expr>, location: Location, ty: Slot },

    Match { scrutinee: Box<Expr>, branches: Vec<MatchBranch>, location: Location, ty: Slot },

    Var { name: String, location: Location, ty: Slot, decl: Slot },
    VarAssign {
        target: Box<Expr>,
        value: Box<Expr>,
        modifiers: Vec<Modifier>,
        location: Location,
        ty: Slot,
    },

    Jump { kind: JumpKind, expr: Option<Box<Expr>>, location: Location, ty: Slot },
}

#[derive(Debug, Clone)]
pub struct MatchBranch {
    pub pattern: Pattern,
    pub branch: Box<Expr>,
    pub location: Location,
}

impl Expr {
    pub fn location(&self) -> &Location {
        match self {
            Expr::IntLit { location, .. }
            | Expr::FltLit { location, .. }
            | Expr::StrLit { location, .. }
            | Expr::CharLit { location, .. }
            | Expr::BoolLit { location, .. }
            | Expr::Array { location, .. }
            | Expr::Tuple { location, .. }
            | Expr::TypeCast { location, .. }
            | Expr::UnOp { location, .. }
            | Expr::BinOp { location, .. }
            | Expr::Seq { location, .. }
            | Expr::Block { location, .. }
            | Expr::Ret { location, .. }
            | Expr::If { location, .. }
            | Expr::While { location, .. }
            | Expr::For { location, .. }
            | Expr::Match { location, .. }
            | Expr::Var { location, .. }
            | Expr::VarAssign { location, .. }
            | Expr::Jump { location, .. } => location,
        }
    }

    /// The mutable type slot every expression-carrying node exposes.
    pub fn ty_slot(&self) -> &Slot {
        match self {
            Expr::IntLit { ty, .. }
            | Expr::FltLit { ty, .. }
            | Expr::StrLit { ty, .. }
            | Expr::CharLit { ty, .. }
            | Expr::BoolLit { ty, .. }
            | Expr::Array { ty, .. }
            | Expr::Tuple { ty, .. }
            | Expr::TypeCast { ty, .. }
            | Expr::UnOp { ty, .. }
            | Expr::BinOp { ty, .. }
            | Expr::Seq { ty, .. }
            | Expr::Block { ty, .. }
            | Expr::Ret { ty, .. }
            | Expr::If { ty, .. }
            | Expr::While { ty, .. }
            | Expr::For { ty, .. }
            | Expr::Match { ty, .. }
            | Expr::Var { ty, .. }
            | Expr::VarAssign { ty, .. }
            | Expr::Jump { ty, .. } => ty,
        }
    }
}
