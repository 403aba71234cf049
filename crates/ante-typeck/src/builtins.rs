//! Pre-declared names every compilation needs before the declaration scan
//! sees any user source. Named-type lookup (spec section 4.2) says that
//! "if the name resolves to a type alias to a primitive, it returns that
//! primitive directly" — so every primitive tag needs a standing alias
//! under its source-level name the same way a prelude would declare one,
//! or no program could ever write a concrete primitive type annotation.
//! `Str` is modelled the way Ante historically represented it: a C-style
//! string, `Ptr C8`. Declared under the root module so every
//! `lookupType("Str")`/`lookupType("I32")` call resolves the same way a
//! user-visible alias declared in the standard library would.

use crate::module::ModuleTable;
use crate::ty::{PrimitiveTag, TypeContext};

pub const STR_NAME: &str = "Str";

/// Canonical source-level name for each `PrimitiveTag` variant, in
/// declaration order.
const PRIMITIVE_NAMES: &[(PrimitiveTag, &str)] = &[
    (PrimitiveTag::I8, "I8"),
    (PrimitiveTag::I16, "I16"),
    (PrimitiveTag::I32, "I32"),
    (PrimitiveTag::I64, "I64"),
    (PrimitiveTag::U8, "U8"),
    (PrimitiveTag::U16, "U16"),
    (PrimitiveTag::U32, "U32"),
    (PrimitiveTag::U64, "U64"),
    (PrimitiveTag::Isz, "Isz"),
    (PrimitiveTag::Usz, "Usz"),
    (PrimitiveTag::F16, "F16"),
    (PrimitiveTag::F32, "F32"),
    (PrimitiveTag::F64, "F64"),
    (PrimitiveTag::C8, "C8"),
    (PrimitiveTag::Bool, "Bool"),
    (PrimitiveTag::Unit, "Unit"),
];

/// Registers builtin type aliases into `table`'s root module. Must run
/// once per compilation, before constraint collection references `Str`
/// or any bare primitive name.
pub fn register(ctx: &mut TypeContext, table: &mut ModuleTable) {
    let root = table.root();
    for &(tag, name) in PRIMITIVE_NAMES {
        let ty = ctx.prim(tag);
        table.declare_type(root, name, ty);
    }
    let c8 = ctx.prim(PrimitiveTag::C8);
    let str_ty = ctx.ptr(c8);
    table.declare_type(root, STR_NAME, str_ty);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_resolves_to_a_pointer_to_c8() {
        let mut ctx = TypeContext::new();
        let mut table = ModuleTable::new("Main");
        register(&mut ctx, &mut table);
        let c8 = ctx.prim(PrimitiveTag::C8);
        let expected = ctx.ptr(c8);
        assert_eq!(table.lookup_type(table.root(), STR_NAME), Some(expected));
    }

    #[test]
    fn every_primitive_tag_resolves_under_its_canonical_name() {
        let mut ctx = TypeContext::new();
        let mut table = ModuleTable::new("Main");
        register(&mut ctx, &mut table);
        for &(tag, name) in PRIMITIVE_NAMES {
            let expected = ctx.prim(tag);
            assert_eq!(table.lookup_type(table.root(), name), Some(expected), "{name}");
        }
    }
}
