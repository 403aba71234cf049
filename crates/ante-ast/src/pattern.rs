//! Patterns, as they appear in `match` branches and `for` bindings.
//!
//! Supported shapes per spec section 4.7: literal, variable (including the
//! `_` wildcard, which introduces no binding), tuple, constructor with
//! payload, and a bare type name (a bodyless constructor).

use ante_common::Location;

use crate::slot::Slot;

#[derive(Debug, Clone)]
pub enum LiteralPattern {
    Int(String),
    Float(String),
    Str(String),
    Char(char),
}

#[derive(Debug, Clone)]
pub enum Pattern {
    /// `_` — matches anything, binds nothing.
    Wildcard { location: Location },
    /// A bare identifier — matches anything, binds `name`.
    Variable { name: String, location: Location, decl: Slot },
    Literal { value: LiteralPattern, location: Location },
    Tuple { elements: Vec<Pattern>, location: Location },
    /// `Ctor p1 … pn`, or a bare `Ctor` when `args` is empty.
    Constructor { name: String, args: Vec<Pattern>, location: Location, ty: Slot },
}

impl Pattern {
    pub fn location(&self) -> &Location {
        match self {
            Pattern::Wildcard { location }
            | Pattern::Variable { location, .. }
            | Pattern::Literal { location, .. }
            | Pattern::Tuple { location, .. }
            | Pattern::Constructor { location, .. } => location,
        }
    }

    pub fn is_wildcard_like(&self) -> bool {
        matches!(self, Pattern::Wildcard { .. } | Pattern::Variable { .. })
    }
}
