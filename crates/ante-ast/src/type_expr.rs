//! Parsed type expressions, as handed down from the (out-of-scope) parser.
//!
//! `TypeNode` is lowered into an arena type by the core's AST-to-type
//! translator; it never appears as a value in its own right past that
//! point.

use ante_common::Location;

/// What shape of type `TypeNode` describes. The parser tags the node so the
/// lowering pass doesn't have to re-derive it from `name`/`params`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Named,
    TypeVar,
    Function,
    Tuple,
    Array,
    Ptr,
}

/// A modifier decoration on a type, per the data model's `Modifier` kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Mut,
    Const,
    Let,
    Global,
    Ante,
    CompilerDirective,
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub tag: TypeTag,
    pub name: String,
    /// Present only when `tag == TypeTag::Named` and the name was written
    /// qualified, e.g. `Math.Vector`.
    pub extension: Option<String>,
    pub params: Vec<TypeNode>,
    pub modifiers: Vec<Modifier>,
    pub location: Location,
}

impl TypeNode {
    pub fn named(name: impl Into<String>, location: Location) -> Self {
        Self {
            tag: TypeTag::Named,
            name: name.into(),
            extension: None,
            params: Vec::new(),
            modifiers: Vec::new(),
            location,
        }
    }

    pub fn type_var(name: impl Into<String>, location: Location) -> Self {
        Self {
            tag: TypeTag::TypeVar,
            name: name.into(),
            extension: None,
            params: Vec::new(),
            modifiers: Vec::new(),
            location,
        }
    }

    pub fn with_params(mut self, params: Vec<TypeNode>) -> Self {
        self.params = params;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}
