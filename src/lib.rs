//! # msbuild-base
//!
//! Semantic front-end for MSBuild project files: expression parsing,
//! schema-driven analysis, import resolution and editor queries.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Validation, references, navigation, resolve-at-offset
//!   ↓
//! project   → Sessions, evaluation, import resolution, RootDocument
//!   ↓
//! hir       → Per-file document model: symbols, imports, diagnostics
//!   ↓
//! visitor   → Schema-driven walk over the XML tree
//!   ↓
//! schema    → Element/attribute tables, value kinds, builtins
//!   ↓
//! dom       → Lossless XML tree with absolute ranges
//!   ↓
//! parser    → Expression and condition parser with error recovery
//!   ↓
//! base      → Primitives (TextRange, LineIndex, SymbolName)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → dom → schema → visitor → hir → project → ide)
// ============================================================================

/// Foundation types: TextRange, LineIndex, case-insensitive names
pub mod base;

/// Expression parser: `$(...)`, `@(...)`, `%(...)`, property functions, conditions
pub mod parser;

/// XML document model with source ranges
pub mod dom;

/// Static schema: elements, attributes, value kinds, builtin symbols
pub mod schema;

/// Schema-aware document walker
pub mod visitor;

/// Document model built from one file
pub mod hir;

/// Project building: sessions, evaluation, import graph
pub mod project;

/// Editor queries over a root document
pub mod ide;

// Re-export foundation types
pub use base::{LineCol, LineIndex, SymbolName, TextRange, TextSize};

// Re-export the entry points
pub use hir::{Diagnostic, MSBuildDocument, Severity, Symbol};
pub use project::{DocumentError, ParseSession, RootDocument, SessionOptions};
