//! Editor-facing queries over a built [`RootDocument`](crate::project::RootDocument).
//!
//! Each query is a free function that takes the root document and returns
//! plain data. Nothing here mutates the document or touches the
//! filesystem, apart from navigation checking whether a path exists.
//!
//! ```text
//! RootDocument
//!   ├─ validate            → Vec<Diagnostic>
//!   ├─ find_references     → Vec<SymbolReference>
//!   ├─ navigation_targets  → Vec<NavigationTarget>
//!   └─ resolve_at(offset)  → ResolveResult (element, attribute, reference)
//! ```

mod navigation;
mod references;
mod resolve;
mod validator;

pub use navigation::{NavigationTarget, navigation_targets};
pub use references::{ReferenceCollector, ReferenceUsage, SymbolReference, find_references};
pub use resolve::{ReferenceKind, ResolveResult, ResolvedReference, resolve_at};
pub use validator::validate;

#[cfg(test)]
mod tests;
