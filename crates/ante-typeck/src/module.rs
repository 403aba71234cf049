//! The module tree (spec section 4.8) and its path-to-segments helper
//! (spec section 4.9).
//!
//! Grounded on `snow_typeck::lib`'s `collect_exports`/`ImportContext`
//! (single-sweep declaration scan, modules as namespaces of exported
//! symbols) and `ante_common::module_graph` for the file-to-module-name
//! translation; generalized into a live, queryable tree rather than a
//! one-shot export snapshot, since spec 4.8 calls for `lookupType` and
//! `lookupTraitImpl` as ongoing operations during constraint collection.

use rustc_hash::FxHashMap;

use ante_common::Location;

use crate::error::TypeError;
use crate::traits::{FunctionId, TraitRegistry};
use crate::ty::TypeId;

pub type ModuleId = u32;

/// A transient child module, introduced by a nested scope within a single
/// file (spec 4.8: "string-interpolation expressions compile into a
/// transient child module") as opposed to one declared by `import`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleOrigin {
    File,
    Transient,
}

#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub origin: ModuleOrigin,
    pub parent: Option<ModuleId>,
    /// Declaration order, so trait-impl candidates inherit it (spec
    /// section 5).
    types: FxHashMap<String, TypeId>,
    funcs: FxHashMap<String, FunctionId>,
    submodules: FxHashMap<String, ModuleId>,
    /// Imported modules, in declaration order (spec 4.8: "searches imports
    /// left-to-right; the first match wins").
    imports: Vec<ModuleId>,
}

impl Module {
    fn new(name: impl Into<String>, origin: ModuleOrigin, parent: Option<ModuleId>) -> Self {
        Self {
            name: name.into(),
            origin,
            parent,
            types: FxHashMap::default(),
            funcs: FxHashMap::default(),
            submodules: FxHashMap::default(),
            imports: Vec::new(),
        }
    }
}

/// The module tree for a single compilation (spec section 5: "owned by
/// the root `Module`; constructed once during declaration scan per
/// compilation").
#[derive(Debug)]
pub struct ModuleTable {
    modules: Vec<Module>,
    root: ModuleId,
}

impl ModuleTable {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = Module::new(root_name, ModuleOrigin::File, None);
        Self { modules: vec![root], root }
    }

    pub fn root(&self) -> ModuleId {
        self.root
    }

    fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id as usize]
    }

    fn get_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id as usize]
    }

    /// Declares a submodule under `parent`. If one already exists with
    /// this name it is reused (a file imported from two places should not
    /// fork its module).
    pub fn add_submodule(&mut self, parent: ModuleId, name: impl Into<String>, origin: ModuleOrigin) -> ModuleId {
        let name = name.into();
        if let Some(existing) = self.get(parent).submodules.get(&name) {
            return *existing;
        }
        let id = self.modules.len() as ModuleId;
        self.modules.push(Module::new(name.clone(), origin, Some(parent)));
        self.get_mut(parent).submodules.insert(name, id);
        id
    }

    pub fn add_import(&mut self, module: ModuleId, imported: ModuleId) {
        self.get_mut(module).imports.push(imported);
    }

    pub fn declare_type(&mut self, module: ModuleId, name: impl Into<String>, ty: TypeId) {
        self.get_mut(module).types.insert(name.into(), ty);
    }

    pub fn declare_func(&mut self, module: ModuleId, name: impl Into<String>, func: FunctionId) {
        self.get_mut(module).funcs.insert(name.into(), func);
    }

    /// `lookupType`: walk from `module` up through enclosing modules,
    /// checking only each module's own declarations; if the whole chain
    /// misses, fall back to `module`'s own import list, searched
    /// left-to-right. Imports are not walked transitively — an import's
    /// own imports are not visible unless re-exported (Open Question,
    /// resolved in DESIGN.md).
    pub fn lookup_type(&self, module: ModuleId, name: &str) -> Option<TypeId> {
        let mut cur = Some(module);
        while let Some(id) = cur {
            let m = self.get(id);
            if let Some(ty) = m.types.get(name) {
                return Some(*ty);
            }
            cur = m.parent;
        }
        for imported in &self.get(module).imports {
            if let Some(ty) = self.get(*imported).types.get(name) {
                return Some(*ty);
            }
        }
        None
    }

    pub fn lookup_func(&self, module: ModuleId, name: &str) -> Option<FunctionId> {
        let mut cur = Some(module);
        while let Some(id) = cur {
            let m = self.get(id);
            if let Some(f) = m.funcs.get(name) {
                return Some(*f);
            }
            cur = m.parent;
        }
        for imported in &self.get(module).imports {
            if let Some(f) = self.get(*imported).funcs.get(name) {
                return Some(*f);
            }
        }
        None
    }

    /// `lookupTraitImpl`: the module table names this operation (spec
    /// 4.8), but the candidate multi-map itself lives in `TraitRegistry`
    /// (section 4.6) to avoid keeping two copies of the same data; this
    /// just forwards with the module's own ordering context.
    pub fn lookup_trait_impl<'a>(
        &self,
        registry: &'a TraitRegistry,
        ctx: &crate::ty::TypeContext,
        trait_name: &str,
        type_args: &[TypeId],
        location: &Location,
    ) -> Result<&'a crate::traits::ImplDef, TypeError> {
        registry.find_impl(ctx, trait_name, type_args, location)
    }
}

/// Converts a filesystem-style import path into an ordered sequence of
/// module-name segments (spec section 4.9): the separator may be `/` or
/// `\`, a leading `.` segment is skipped, and a trailing source-extension
/// segment (anything after the last `.` in the final component) is
/// stripped.
pub fn path_segments(path: &str) -> Vec<String> {
    let mut segments: Vec<&str> =
        path.split(|c| c == '/' || c == '\\').filter(|s| !s.is_empty()).collect();

    if segments.first() == Some(&".") {
        segments.remove(0);
    }

    let mut segments: Vec<String> = segments.into_iter().map(str::to_string).collect();
    if let Some(last) = segments.last_mut() {
        if let Some(dot) = last.rfind('.') {
            last.truncate(dot);
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{PrimitiveTag, TypeContext};

    #[test]
    fn own_declaration_found_before_parent() {
        let mut ctx = TypeContext::new();
        let mut table = ModuleTable::new("Main");
        let root = table.root();
        let child = table.add_submodule(root, "Inner", ModuleOrigin::Transient);
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let bool_ty = ctx.prim(PrimitiveTag::Bool);
        table.declare_type(root, "T", i32_ty);
        table.declare_type(child, "T", bool_ty);
        assert_eq!(table.lookup_type(child, "T"), Some(bool_ty));
    }

    #[test]
    fn lookup_walks_up_to_parent_when_missing_locally() {
        let mut ctx = TypeContext::new();
        let mut table = ModuleTable::new("Main");
        let root = table.root();
        let child = table.add_submodule(root, "Inner", ModuleOrigin::Transient);
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        table.declare_type(root, "T", i32_ty);
        assert_eq!(table.lookup_type(child, "T"), Some(i32_ty));
    }

    #[test]
    fn lookup_falls_back_to_imports_left_to_right() {
        let mut ctx = TypeContext::new();
        let mut table = ModuleTable::new("Main");
        let root = table.root();
        let lib_a = table.add_submodule(root, "A", ModuleOrigin::File);
        let lib_b = table.add_submodule(root, "B", ModuleOrigin::File);
        let i32_ty = ctx.prim(PrimitiveTag::I32);
        let bool_ty = ctx.prim(PrimitiveTag::Bool);
        table.declare_type(lib_a, "Shared", i32_ty);
        table.declare_type(lib_b, "Shared", bool_ty);
        table.add_import(root, lib_a);
        table.add_import(root, lib_b);
        assert_eq!(table.lookup_type(root, "Shared"), Some(i32_ty));
    }

    #[test]
    fn unknown_name_is_none() {
        let table = ModuleTable::new("Main");
        assert_eq!(table.lookup_type(table.root(), "Nope"), None);
    }

    #[test]
    fn resubmoduling_the_same_name_is_idempotent() {
        let mut table = ModuleTable::new("Main");
        let root = table.root();
        let a = table.add_submodule(root, "Inner", ModuleOrigin::File);
        let b = table.add_submodule(root, "Inner", ModuleOrigin::File);
        assert_eq!(a, b);
    }

    #[test]
    fn path_segments_strips_leading_dot_and_extension() {
        assert_eq!(path_segments("./Math/Vector.an"), vec!["Math", "Vector"]);
    }

    #[test]
    fn path_segments_handles_backslashes() {
        assert_eq!(path_segments(r".\Math\Vector.an"), vec!["Math", "Vector"]);
    }

    #[test]
    fn path_segments_without_leading_dot_or_extension() {
        assert_eq!(path_segments("Std/Io"), vec!["Std", "Io"]);
    }
}
