//! Project-level building: sessions, evaluation, import resolution and
//! the root document.
//!
//! ```text
//! ParseSession ──► RootDocument::parse
//!                     │
//!                     ├─ hir::build_document(root, BuildContext)
//!                     │     └─ BuildContext::resolve_import
//!                     │           evaluate × permutations → paths
//!                     │           wildcard expansion
//!                     │           reuse previous generation | build nested
//!                     └─ task metadata from the host
//! ```

mod error;
mod evaluate;
mod resolver;
mod root;
mod sdk;
mod session;

pub use error::DocumentError;
pub use evaluate::{evaluate, evaluate_node, file_property, permutations, unescape};
pub(crate) use evaluate::{normalize, to_native};
pub use root::RootDocument;
pub use sdk::{DirectorySdkResolver, SdkResolver};
pub use session::{ParseSession, SessionOptions, TaskMetadataProvider};
