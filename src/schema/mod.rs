//! Declarative schema for build-script elements
//!
//! Elements are classified by name *and* position: a `Target` child of
//! `Project` is a target, but any child of an item element is metadata
//! whatever its tag. [`resolve_element`] implements that rule over the
//! static [`SchemaElement`] table, which also declares each element's
//! attributes and the [`ValueKind`] of every value.
//!
//! - [`elements`]: the element/attribute table
//! - [`value`]: value kinds, known values and literal validation
//! - [`builtins`]: reserved properties, well-known metadata, common tasks
//! - [`provided`]: host-supplied per-file schemas

pub mod builtins;
pub mod elements;
pub mod provided;
pub mod value;

pub use builtins::{BuiltinParameter, BuiltinSymbol, BuiltinTask, builtin_metadata, builtin_property, builtin_task};
pub use elements::{AttributeRole, ElementKind, SchemaAttribute, SchemaElement, element, resolve_element};
pub use provided::{DocumentSchema, SchemaProvider, SchemaSymbol};
pub use value::{InvalidValue, ValueFlags, ValueKind};
