//! MSBuild expression parser
//!
//! Attribute and element values in a build script are expressions: plain
//! text interleaved with `$(Property)`, `@(Item)` and `%(Metadata)`
//! references, optionally split into `;` or `,` separated lists.
//! Conditions use a small boolean grammar on top of the same operands.
//!
//! ```text
//! value text + ExpressionOptions + base offset
//!     ↓
//! parse / parse_condition
//!     ↓
//! ExpressionTree (arena of ExprNode, absolute ranges, parent links)
//! ```
//!
//! Parsing never fails. Malformed input produces `Error` and
//! `IncompleteError` nodes that keep whatever was recognised before the
//! problem, which is what completion and navigation need when the user is
//! halfway through typing a reference.

mod arguments;
mod ast;
mod condition;
mod error;
mod expression;
mod options;
mod reference;
mod walk;

pub use ast::{ConditionOperator, ExprKind, ExprNode, ExpressionTree, NamePart, NodeId};
pub use condition::parse_condition;
pub use error::ExpressionErrorKind;
pub use expression::parse;
pub use options::ExpressionOptions;

#[cfg(test)]
mod tests;
