//! Shared types used across the type system core: source locations,
//! backend-agnostic diagnostics, and the physical file dependency graph.

pub mod diagnostic;
pub mod module_graph;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticSink, ErrorKind, Note, Severity};
pub use module_graph::{CycleError, FileGraph, FileId, FileInfo, topological_order};
pub use span::{Location, Position};
