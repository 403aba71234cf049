//! Name mangling for monomorphised functions (spec section 6).
//!
//! `canonical_type_string` is just `TypeContext::display` — the same
//! rendering diagnostics use, so a mangled name and an error message agree
//! on what a type is called. `mangle` concatenates `base` with each
//! parameter's canonical string, joined by a separator no identifier can
//! contain.

use crate::ty::{TypeContext, TypeId};

/// A byte no Ante-style identifier can contain, used to keep concatenated
/// type strings from colliding across a parameter boundary.
pub const SEPARATOR: char = '\u{1}';

pub fn canonical_type_string(ctx: &TypeContext, ty: TypeId) -> String {
    ctx.display(ty)
}

/// Produces `base` followed by an unambiguous encoding of `params`. The
/// codegen adapter treats the result opaquely — it is not expected to be
/// demangled.
pub fn mangle(ctx: &TypeContext, base: &str, params: &[TypeId]) -> String {
    let mut name = base.to_string();
    for p in params {
        name.push(SEPARATOR);
        name.push_str(&canonical_type_string(ctx, *p));
    }
    name
}
