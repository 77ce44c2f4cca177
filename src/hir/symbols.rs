//! Per-document symbol table.
//!
//! Names are keyed case-insensitively by [`SymbolName`]. Insertion never
//! overwrites: the first occurrence of a name in document order fixes its
//! spelling and description.

use smol_str::SmolStr;

use crate::base::{SymbolMap, SymbolName};

/// The kinds of named things a build script can mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Item,
    Property,
    Metadata,
    Task,
    TaskParameter,
    Target,
}

impl SymbolKind {
    pub fn display(&self) -> &'static str {
        match self {
            SymbolKind::Item => "item",
            SymbolKind::Property => "property",
            SymbolKind::Metadata => "metadata",
            SymbolKind::Task => "task",
            SymbolKind::TaskParameter => "task parameter",
            SymbolKind::Target => "target",
        }
    }
}

/// A symbol query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol<'a> {
    Item(&'a str),
    Property(&'a str),
    /// Metadata of `item`, or of any item when `item` is `None`.
    Metadata { item: Option<&'a str>, name: &'a str },
    Task(&'a str),
    TaskParameter { task: &'a str, name: &'a str },
    Target(&'a str),
}

impl<'a> Symbol<'a> {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Item(_) => SymbolKind::Item,
            Symbol::Property(_) => SymbolKind::Property,
            Symbol::Metadata { .. } => SymbolKind::Metadata,
            Symbol::Task(_) => SymbolKind::Task,
            Symbol::TaskParameter { .. } => SymbolKind::TaskParameter,
            Symbol::Target(_) => SymbolKind::Target,
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            Symbol::Item(name)
            | Symbol::Property(name)
            | Symbol::Task(name)
            | Symbol::Target(name)
            | Symbol::Metadata { name, .. }
            | Symbol::TaskParameter { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: SmolStr,
    pub description: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataInfo {
    pub name: SmolStr,
    pub description: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub name: SmolStr,
    pub description: Option<SmolStr>,
    pub metadata: SymbolMap<MetadataInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub name: SmolStr,
    pub description: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskParameterInfo {
    pub name: SmolStr,
    /// Declared .NET type, for `UsingTask` parameter groups.
    pub parameter_type: Option<SmolStr>,
    pub required: bool,
    pub output: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub name: SmolStr,
    pub description: Option<SmolStr>,
    pub parameters: SymbolMap<TaskParameterInfo>,
}

/// Items, properties, tasks and targets seen in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    pub(crate) items: SymbolMap<ItemInfo>,
    pub(crate) properties: SymbolMap<PropertyInfo>,
    pub(crate) tasks: SymbolMap<TaskInfo>,
    pub(crate) targets: SymbolMap<TargetInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // INSERTION (first seen wins)
    // ========================================================================

    pub fn add_item(&mut self, name: &str) -> &mut ItemInfo {
        self.items
            .entry(SymbolName::new(name))
            .or_insert_with(|| ItemInfo {
                name: name.into(),
                description: None,
                metadata: SymbolMap::default(),
            })
    }

    pub fn add_property(&mut self, name: &str) -> &mut PropertyInfo {
        self.properties
            .entry(SymbolName::new(name))
            .or_insert_with(|| PropertyInfo {
                name: name.into(),
                description: None,
            })
    }

    /// Add `name` as metadata of `item`, adding the item too if needed.
    pub fn add_metadata(&mut self, item: &str, name: &str) -> &mut MetadataInfo {
        self.add_item(item)
            .metadata
            .entry(SymbolName::new(name))
            .or_insert_with(|| MetadataInfo {
                name: name.into(),
                description: None,
            })
    }

    pub fn add_task(&mut self, name: &str) -> &mut TaskInfo {
        self.tasks
            .entry(SymbolName::new(name))
            .or_insert_with(|| TaskInfo {
                name: name.into(),
                description: None,
                parameters: SymbolMap::default(),
            })
    }

    pub fn add_task_parameter(&mut self, task: &str, name: &str) -> &mut TaskParameterInfo {
        self.add_task(task)
            .parameters
            .entry(SymbolName::new(name))
            .or_insert_with(|| TaskParameterInfo {
                name: name.into(),
                ..TaskParameterInfo::default()
            })
    }

    pub fn add_target(&mut self, name: &str) -> &mut TargetInfo {
        self.targets
            .entry(SymbolName::new(name))
            .or_insert_with(|| TargetInfo {
                name: name.into(),
                description: None,
            })
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    pub fn item(&self, name: &str) -> Option<&ItemInfo> {
        self.items.get(&SymbolName::new(name))
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(&SymbolName::new(name))
    }

    pub fn metadata(&self, item: &str, name: &str) -> Option<&MetadataInfo> {
        self.item(item)?.metadata.get(&SymbolName::new(name))
    }

    pub fn task(&self, name: &str) -> Option<&TaskInfo> {
        self.tasks.get(&SymbolName::new(name))
    }

    pub fn target(&self, name: &str) -> Option<&TargetInfo> {
        self.targets.get(&SymbolName::new(name))
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemInfo> {
        self.items.values()
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.properties.values()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskInfo> {
        self.tasks.values()
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetInfo> {
        self.targets.values()
    }

    pub fn contains(&self, symbol: Symbol<'_>) -> bool {
        match symbol {
            Symbol::Item(name) => self.item(name).is_some(),
            Symbol::Property(name) => self.property(name).is_some(),
            Symbol::Metadata { item: Some(item), name } => self.metadata(item, name).is_some(),
            Symbol::Metadata { item: None, name } => {
                let key = SymbolName::new(name);
                self.items.values().any(|item| item.metadata.contains_key(&key))
            }
            Symbol::Task(name) => self.task(name).is_some(),
            Symbol::TaskParameter { task, name } => self
                .task(task)
                .is_some_and(|t| t.parameters.contains_key(&SymbolName::new(name))),
            Symbol::Target(name) => self.target(name).is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.properties.is_empty()
            && self.tasks.is_empty()
            && self.targets.is_empty()
    }
}
