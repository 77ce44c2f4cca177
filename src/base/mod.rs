//! Foundation types for the MSBuild toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`SymbolName`] - Case-insensitive symbol keys
//!
//! This module has NO dependencies on other msbuild modules.

mod name;
mod span;

pub use name::SymbolName;
pub(crate) use name::eq_ignore_case;
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use ::text_size;

/// Map from case-insensitive symbol names, preserving insertion order.
pub type SymbolMap<V> = indexmap::IndexMap<SymbolName, V, rustc_hash::FxBuildHasher>;

/// Converts a `usize` offset into a [`TextSize`], saturating at `u32::MAX`.
#[inline]
pub fn text_size(offset: usize) -> TextSize {
    TextSize::new(u32::try_from(offset).unwrap_or(u32::MAX))
}

/// Builds a [`TextRange`] from `usize` bounds.
#[inline]
pub fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(text_size(start), text_size(end.max(start)))
}
