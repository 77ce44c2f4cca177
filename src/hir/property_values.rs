//! Values observed for a watched set of properties.
//!
//! Import paths often depend on a handful of properties such as
//! `TargetFramework`. The collector records every value a watched
//! property is assigned, in order and without duplicates, so import
//! evaluation can try each combination.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{SymbolMap, SymbolName};

/// Properties watched when the session does not say otherwise.
pub const DEFAULT_WATCHED_PROPERTIES: &[&str] = &[
    "TargetFramework",
    "TargetFrameworks",
    "TargetFrameworkIdentifier",
    "TargetFrameworkVersion",
    "Configuration",
    "Platform",
    "MSBuildProjectExtensionsPath",
    "BaseIntermediateOutputPath",
];

#[derive(Debug, Clone, Default)]
pub struct PropertyValueCollector {
    watched: FxHashSet<SymbolName>,
    values: SymbolMap<Vec<SmolStr>>,
}

impl PropertyValueCollector {
    pub fn new<I, S>(watched: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            watched: watched.into_iter().map(|name| SymbolName::new(name)).collect(),
            values: SymbolMap::default(),
        }
    }

    pub fn with_default_properties() -> Self {
        Self::new(DEFAULT_WATCHED_PROPERTIES.iter().copied())
    }

    pub fn is_watched(&self, name: &str) -> bool {
        self.watched.contains(&SymbolName::new(name))
    }

    /// Record `value` for `name`. Returns whether anything new was learned.
    ///
    /// Each entry of a `TargetFrameworks` list is also a value of
    /// `TargetFramework`.
    pub fn add(&mut self, name: &str, value: &str) -> bool {
        if !self.is_watched(name) {
            return false;
        }
        let mut added = self.insert(name, value);
        if SymbolName::new(name).matches("TargetFrameworks") && self.is_watched("TargetFramework") {
            for framework in value.split(';') {
                added |= self.insert("TargetFramework", framework);
            }
        }
        added
    }

    fn insert(&mut self, name: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let values = self.values.entry(SymbolName::new(name)).or_default();
        if values.iter().any(|v| v == value) {
            return false;
        }
        values.push(value.into());
        true
    }

    /// Values seen for `name`, in first-seen order.
    pub fn values(&self, name: &str) -> &[SmolStr] {
        self.values
            .get(&SymbolName::new(name))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Watched properties that have at least one value.
    pub fn iter(&self) -> impl Iterator<Item = (&SymbolName, &[SmolStr])> {
        self.values.iter().map(|(name, values)| (name, values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
