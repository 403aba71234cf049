//! Type errors produced anywhere in the pipeline.
//!
//! Grounded on `snow_typeck::error`'s manual-`Display`, no-`thiserror` style
//! and its `ConstraintOrigin`-carrying variants, trimmed to the seven error
//! kinds spec section 7 actually calls for (the teacher's actor/supervisor
//! variants have no counterpart here and are dropped).

use std::fmt;

use ante_common::{ErrorKind, Location};

use crate::ty::{TyVar, TypeContext, TypeId};

#[derive(Debug, Clone)]
pub enum TypeError {
    Mismatch { expected: TypeId, found: TypeId, location: Location },
    InfiniteType { var: TyVar, ty: TypeId, location: Location },
    ArityMismatch { expected: usize, found: usize, location: Location },
    UnboundVariable { name: String, location: Location },
    UnknownType { name: String, location: Location },
    NotAFunction { ty: TypeId, location: Location },
    TraitNotSatisfied { trait_name: String, location: Location },
    AmbiguousTraitImpl { trait_name: String, location: Location },
    MissingTraitMethod { trait_name: String, method: String, location: Location },
    TraitMethodSignatureMismatch { trait_name: String, method: String, location: Location },
    UnknownField { field: String, location: Location },
    UnknownVariant { name: String, location: Location },
    NonExhaustiveMatch { missing: String, location: Location },
    RedundantArm { location: Location },
    MonomorphisationFailed { function: String, cause: Box<TypeError>, location: Location },
    Internal { message: String, location: Location },
}

impl TypeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TypeError::Mismatch { .. } | TypeError::InfiniteType { .. } => ErrorKind::Unification,
            TypeError::ArityMismatch { .. } => ErrorKind::Arity,
            TypeError::UnboundVariable { .. } | TypeError::UnknownType { .. } => ErrorKind::Name,
            TypeError::NotAFunction { .. } => ErrorKind::Unification,
            TypeError::TraitNotSatisfied { .. }
            | TypeError::AmbiguousTraitImpl { .. }
            | TypeError::MissingTraitMethod { .. }
            | TypeError::TraitMethodSignatureMismatch { .. } => ErrorKind::TraitResolution,
            TypeError::UnknownField { .. } | TypeError::UnknownVariant { .. } => ErrorKind::Name,
            TypeError::NonExhaustiveMatch { .. } | TypeError::RedundantArm { .. } => {
                ErrorKind::Exhaustiveness
            }
            TypeError::MonomorphisationFailed { .. } => ErrorKind::Monomorphisation,
            TypeError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            TypeError::Mismatch { location, .. }
            | TypeError::InfiniteType { location, .. }
            | TypeError::ArityMismatch { location, .. }
            | TypeError::UnboundVariable { location, .. }
            | TypeError::UnknownType { location, .. }
            | TypeError::NotAFunction { location, .. }
            | TypeError::TraitNotSatisfied { location, .. }
            | TypeError::AmbiguousTraitImpl { location, .. }
            | TypeError::MissingTraitMethod { location, .. }
            | TypeError::TraitMethodSignatureMismatch { location, .. }
            | TypeError::UnknownField { location, .. }
            | TypeError::UnknownVariant { location, .. }
            | TypeError::NonExhaustiveMatch { location, .. }
            | TypeError::RedundantArm { location, .. }
            | TypeError::MonomorphisationFailed { location, .. }
            | TypeError::Internal { location, .. } => location,
        }
    }

    /// Is this reportable as a warning rather than a fatal error (spec
    /// section 4.7: "Overlapping/unreachable branches ... are warned").
    pub fn is_warning(&self) -> bool {
        matches!(self, TypeError::RedundantArm { .. })
    }

    /// A one-sentence, type-rendering summary, for use by a diagnostic
    /// renderer. Requires the arena to render involved `TypeId`s.
    pub fn render(&self, ctx: &TypeContext) -> String {
        match self {
            TypeError::Mismatch { expected, found, .. } => {
                format!("expected `{}`, found `{}`", ctx.display(*expected), ctx.display(*found))
            }
            TypeError::InfiniteType { var, ty, .. } => {
                format!("infinite type: `'{}` occurs in `{}`", ctx.var_name(*var), ctx.display(*ty))
            }
            TypeError::ArityMismatch { expected, found, .. } => {
                format!("expected {expected} argument(s), found {found}")
            }
            TypeError::UnboundVariable { name, .. } => format!("unbound variable `{name}`"),
            TypeError::UnknownType { name, .. } => format!("unknown type `{name}`"),
            TypeError::NotAFunction { ty, .. } => {
                format!("`{}` is not a function", ctx.display(*ty))
            }
            TypeError::TraitNotSatisfied { trait_name, .. } => {
                format!("no implementation of `{trait_name}` satisfies this call")
            }
            TypeError::AmbiguousTraitImpl { trait_name, .. } => {
                format!("multiple implementations of `{trait_name}` match")
            }
            TypeError::MissingTraitMethod { trait_name, method, .. } => {
                format!("implementation of `{trait_name}` is missing method `{method}`")
            }
            TypeError::TraitMethodSignatureMismatch { trait_name, method, .. } => {
                format!("method `{method}` does not match the signature required by `{trait_name}`")
            }
            TypeError::UnknownField { field, .. } => format!("no field named `{field}`"),
            TypeError::UnknownVariant { name, .. } => format!("unknown variant `{name}`"),
            TypeError::NonExhaustiveMatch { missing, .. } => {
                format!("non-exhaustive match: missing `{missing}`")
            }
            TypeError::RedundantArm { .. } => "this arm is unreachable".to_string(),
            TypeError::MonomorphisationFailed { function, cause, .. } => {
                format!("cannot instantiate `{function}`: {}", cause.render(ctx))
            }
            TypeError::Internal { message, .. } => format!("internal error: {message}"),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}", self.kind(), self.location())
    }
}
