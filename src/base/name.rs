//! Case-insensitive symbol names.
//!
//! MSBuild compares item, property, metadata, task, and target names
//! ignoring case. [`SymbolName`] keeps the spelling it was created with
//! for display but hashes and compares case-insensitively, so it can key
//! the document symbol tables directly.

use std::fmt;
use std::hash::{Hash, Hasher};

use smol_str::SmolStr;

#[derive(Clone)]
pub struct SymbolName(SmolStr);

impl SymbolName {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    /// The name as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_smol_str(&self) -> &SmolStr {
        &self.0
    }

    /// Case-insensitive comparison against a plain string.
    pub fn matches(&self, other: &str) -> bool {
        eq_ignore_case(&self.0, other)
    }
}

/// Ordinal case-insensitive string equality.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl PartialEq for SymbolName {
    fn eq(&self, other: &Self) -> bool {
        eq_ignore_case(&self.0, &other.0)
    }
}

impl Eq for SymbolName {}

impl Hash for SymbolName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.0.chars().flat_map(char::to_lowercase) {
            state.write_u32(c as u32);
        }
        state.write_u8(0xff);
    }
}

impl fmt::Debug for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<SmolStr> for SymbolName {
    fn from(name: SmolStr) -> Self {
        Self(name)
    }
}
