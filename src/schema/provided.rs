//! Schemas supplied by the host for particular files.
//!
//! A host may know more about a file than the file itself says, for
//! example the properties and items that an SDK documents. Such knowledge
//! enriches completion and stops the validator from flagging names the
//! host knows are defined elsewhere.

use std::path::Path;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{SymbolMap, SymbolName};

use super::value::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSymbol {
    pub name: SmolStr,
    pub description: Option<SmolStr>,
    pub kind: Option<ValueKind>,
}

impl SchemaSymbol {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<SmolStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Known symbols for one file.
#[derive(Debug, Clone, Default)]
pub struct DocumentSchema {
    pub properties: SymbolMap<SchemaSymbol>,
    pub items: SymbolMap<SchemaSymbol>,
    pub targets: SymbolMap<SchemaSymbol>,
    pub tasks: SymbolMap<SchemaSymbol>,
}

impl DocumentSchema {
    pub fn add_property(&mut self, symbol: SchemaSymbol) {
        self.properties.insert(SymbolName::new(symbol.name.clone()), symbol);
    }

    pub fn add_item(&mut self, symbol: SchemaSymbol) {
        self.items.insert(SymbolName::new(symbol.name.clone()), symbol);
    }

    pub fn add_target(&mut self, symbol: SchemaSymbol) {
        self.targets.insert(SymbolName::new(symbol.name.clone()), symbol);
    }

    pub fn add_task(&mut self, symbol: SchemaSymbol) {
        self.tasks.insert(SymbolName::new(symbol.name.clone()), symbol);
    }

    pub fn property(&self, name: &str) -> Option<&SchemaSymbol> {
        self.properties.get(&SymbolName::new(name))
    }

    pub fn item(&self, name: &str) -> Option<&SchemaSymbol> {
        self.items.get(&SymbolName::new(name))
    }

    pub fn target(&self, name: &str) -> Option<&SchemaSymbol> {
        self.targets.get(&SymbolName::new(name))
    }

    pub fn task(&self, name: &str) -> Option<&SchemaSymbol> {
        self.tasks.get(&SymbolName::new(name))
    }
}

/// Supplies the [`DocumentSchema`] for a file, if the host has one.
pub trait SchemaProvider: Send + Sync {
    fn schema_for(&self, path: &Path) -> Option<Arc<DocumentSchema>>;
}

impl<F> SchemaProvider for F
where
    F: Fn(&Path) -> Option<Arc<DocumentSchema>> + Send + Sync,
{
    fn schema_for(&self, path: &Path) -> Option<Arc<DocumentSchema>> {
        self(path)
    }
}
