//! High-level IR: the document model.
//!
//! A parsed file becomes an [`MSBuildDocument`]: a case-insensitive
//! [`SymbolTable`] of everything the file mentions, the [`Import`]s it
//! pulls in, and, for the file being edited, diagnostics and node
//! [`Annotations`].
//!
//! ## Key Types
//!
//! - [`MSBuildDocument`] - one file's symbols, imports and errors
//! - [`SymbolTable`] / [`Symbol`] - names seen, and queries over them
//! - [`Import`] - an edge of the import graph, reusable across edits
//! - [`build_document`] - the schema builder walk
//! - [`ImportContext`] - what the builder asks of the resolution engine
//! - [`PropertyValueCollector`] - values seen for watched properties
//!
//! ## Build Flow
//!
//! ```text
//! XDocument ──walk──▶ SchemaBuilder ──▶ SymbolTable
//!                          │
//!                          ├── Import / Sdk ──▶ ImportContext::resolve_import
//!                          └── watched property ──▶ ImportContext::collect_property
//! ```

mod annotations;
mod builder;
mod diagnostics;
mod document;
mod import;
mod property_values;
mod symbols;

pub use annotations::{Annotation, AnnotationKind, Annotations};
pub use builder::{ImportContext, ImportRequest, build_document};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use document::MSBuildDocument;
pub use import::{Import, SdkReference};
pub use property_values::{DEFAULT_WATCHED_PROPERTIES, PropertyValueCollector};
pub use symbols::{
    ItemInfo, MetadataInfo, PropertyInfo, Symbol, SymbolKind, SymbolTable, TargetInfo, TaskInfo,
    TaskParameterInfo,
};
