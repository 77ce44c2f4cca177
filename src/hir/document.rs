//! The per-file document model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::annotations::Annotations;
use super::diagnostics::Diagnostic;
use super::import::Import;
use super::symbols::{Symbol, SymbolTable};
use crate::base::eq_ignore_case;

/// Symbols, imports and (for the toplevel file) diagnostics of one file.
///
/// Built once by [`build_document`](super::build_document) and immutable
/// afterwards; imported documents are shared between generations through
/// [`Arc`].
#[derive(Debug)]
pub struct MSBuildDocument {
    filename: PathBuf,
    is_toplevel: bool,
    pub(crate) symbols: SymbolTable,
    pub(crate) imports: IndexMap<PathBuf, Arc<Import>>,
    pub(crate) errors: Vec<Diagnostic>,
    pub(crate) annotations: Annotations,
    /// Watched property values this file contributed, replayed when the
    /// file is reused from an earlier generation.
    pub(crate) collected_values: Vec<(SmolStr, SmolStr)>,
}

impl MSBuildDocument {
    pub fn new(filename: impl Into<PathBuf>, is_toplevel: bool) -> Self {
        Self {
            filename: filename.into(),
            is_toplevel,
            symbols: SymbolTable::new(),
            imports: IndexMap::new(),
            errors: Vec::new(),
            annotations: Annotations::new(),
            collected_values: Vec::new(),
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn is_toplevel(&self) -> bool {
        self.is_toplevel
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Imports keyed by resolved filename (or expression text for stubs),
    /// in the order they were first seen.
    pub fn imports(&self) -> impl Iterator<Item = &Arc<Import>> {
        self.imports.values()
    }

    pub fn import(&self, filename: &Path) -> Option<&Arc<Import>> {
        self.imports.get(filename)
    }

    /// Record an import unless one with the same filename is already here.
    pub(crate) fn add_import(&mut self, import: Arc<Import>) -> bool {
        if self.imports.contains_key(import.filename()) {
            return false;
        }
        self.imports.insert(import.filename().to_path_buf(), import);
        true
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn collected_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.collected_values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn get_items(&self) -> impl Iterator<Item = &str> {
        self.symbols.items().map(|info| info.name.as_str())
    }

    pub fn get_properties(&self) -> impl Iterator<Item = &str> {
        self.symbols.properties().map(|info| info.name.as_str())
    }

    pub fn get_tasks(&self) -> impl Iterator<Item = &str> {
        self.symbols.tasks().map(|info| info.name.as_str())
    }

    pub fn get_targets(&self) -> impl Iterator<Item = &str> {
        self.symbols.targets().map(|info| info.name.as_str())
    }

    pub fn get_metadata(&self, item: &str) -> impl Iterator<Item = &str> {
        self.symbols
            .item(item)
            .into_iter()
            .flat_map(|info| info.metadata.values().map(|m| m.name.as_str()))
    }

    pub fn get_task_parameters(&self, task: &str) -> impl Iterator<Item = &str> {
        self.symbols
            .task(task)
            .into_iter()
            .flat_map(|info| info.parameters.values().map(|p| p.name.as_str()))
    }

    pub fn contains(&self, symbol: Symbol<'_>) -> bool {
        self.symbols.contains(symbol)
    }

    /// Documents this one imports directly, skipping stubs and files that
    /// were already parsed elsewhere in the graph.
    pub fn imported_documents(&self) -> impl Iterator<Item = &Arc<MSBuildDocument>> {
        self.imports.values().filter_map(|import| import.document())
    }

    pub(crate) fn record_value(&mut self, name: &str, value: SmolStr) {
        if !self
            .collected_values
            .iter()
            .any(|(n, v)| eq_ignore_case(n, name) && *v == value)
        {
            self.collected_values.push((name.into(), value));
        }
    }
}
