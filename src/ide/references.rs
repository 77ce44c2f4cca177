//! Occurrences of one symbol in a root document.

use crate::base::{TextRange, eq_ignore_case};
use crate::dom::XNodeId;
use crate::hir::Symbol;
use crate::parser::{ExprKind, ExpressionTree};
use crate::project::RootDocument;
use crate::schema::{AttributeRole, ElementKind, ValueKind};
use crate::visitor::{
    DocumentVisitor, ResolvedAttribute, ResolvedElement, ValueSite, VisitContext, literal_entries, walk_document,
    walk_resolved_attribute, walk_resolved_element,
};

/// How an occurrence uses the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceUsage {
    /// Introduces the name: `Target/@Name`, `UsingTask/@TaskName`, a
    /// `ParameterGroup` child, an item definition.
    Declaration,
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolReference {
    pub range: TextRange,
    pub usage: ReferenceUsage,
}

/// Finds every occurrence of one symbol, matching names without regard
/// to case.
#[derive(Debug)]
pub struct ReferenceCollector<'s> {
    symbol: Symbol<'s>,
    references: Vec<SymbolReference>,
}

impl<'s> ReferenceCollector<'s> {
    pub fn new(symbol: Symbol<'s>) -> Self {
        Self {
            symbol,
            references: Vec::new(),
        }
    }

    /// Walk `root` and return the occurrences in document order.
    pub fn run(mut self, root: &RootDocument) -> Vec<SymbolReference> {
        let cx = VisitContext::new(root.xml(), root.text(), root.filename());
        walk_document(&mut self, &cx);
        self.references.sort_by_key(|r| (r.range.start(), r.usage));
        self.references.dedup();
        self.references
    }

    fn add(&mut self, range: TextRange, usage: ReferenceUsage) {
        self.references.push(SymbolReference { range, usage });
    }

    // ========================================================================
    // MATCHING
    // ========================================================================

    fn is_property(&self, name: &str) -> bool {
        matches!(self.symbol, Symbol::Property(p) if eq_ignore_case(p, name))
    }

    fn is_item(&self, name: &str) -> bool {
        matches!(self.symbol, Symbol::Item(i) if eq_ignore_case(i, name))
    }

    fn is_target(&self, name: &str) -> bool {
        matches!(self.symbol, Symbol::Target(t) if eq_ignore_case(t, name))
    }

    fn is_task(&self, name: &str) -> bool {
        matches!(self.symbol, Symbol::Task(t) if eq_ignore_case(t, name))
    }

    /// An unknown owner on either side matches any item.
    fn is_metadata(&self, item: Option<&str>, name: &str) -> bool {
        match self.symbol {
            Symbol::Metadata { item: wanted, name: n } => {
                eq_ignore_case(n, name)
                    && match (wanted, item) {
                        (Some(wanted), Some(item)) => eq_ignore_case(wanted, item),
                        _ => true,
                    }
            }
            _ => false,
        }
    }

    fn is_task_parameter(&self, task: &str, name: &str) -> bool {
        matches!(
            self.symbol,
            Symbol::TaskParameter { task: t, name: n } if eq_ignore_case(t, task) && eq_ignore_case(n, name)
        )
    }

    // ========================================================================
    // VALUES
    // ========================================================================

    /// A literal entry that names a symbol by the site's value kind.
    fn literal(&mut self, cx: &VisitContext<'_>, site: &ValueSite, value: &str, range: TextRange) {
        let element = site.element();
        let attribute = attribute_name(cx, site);
        let declared_by = |kind: ElementKind, name: &str| {
            element.kind() == kind && attribute.is_some_and(|a| eq_ignore_case(a, name))
        };
        match site.kind() {
            ValueKind::TargetName if self.is_target(value) => {
                let usage = if declared_by(ElementKind::Target, "Name") {
                    ReferenceUsage::Declaration
                } else {
                    ReferenceUsage::Read
                };
                self.add(range, usage);
            }
            ValueKind::TaskName if self.is_task(value) => {
                let usage = if declared_by(ElementKind::UsingTask, "TaskName") {
                    ReferenceUsage::Declaration
                } else {
                    ReferenceUsage::Read
                };
                self.add(range, usage);
            }
            ValueKind::PropertyName if self.is_property(value) => {
                let usage = if element.kind() == ElementKind::Output {
                    ReferenceUsage::Write
                } else {
                    ReferenceUsage::Read
                };
                self.add(range, usage);
            }
            ValueKind::ItemName if self.is_item(value) => {
                let usage = if element.kind() == ElementKind::Output {
                    ReferenceUsage::Write
                } else {
                    ReferenceUsage::Read
                };
                self.add(range, usage);
            }
            ValueKind::TaskOutputParameterName => {
                let task = element.parent.map(|parent| cx.xml.element(parent).name.as_str());
                if task.is_some_and(|task| self.is_task_parameter(task, value)) {
                    self.add(range, ReferenceUsage::Read);
                }
            }
            _ => {}
        }
    }
}

fn attribute_name<'x>(cx: &VisitContext<'x>, site: &ValueSite) -> Option<&'x str> {
    match site.node() {
        XNodeId::Attribute(id) => Some(cx.xml.attribute(id).name.as_str()),
        XNodeId::Element(_) => None,
    }
}

/// The item that an element's own metadata belongs to.
fn owning_item<'x>(cx: &VisitContext<'x>, element: &ResolvedElement) -> Option<&'x str> {
    match element.kind() {
        ElementKind::Item | ElementKind::ItemDefinition => Some(cx.xml.element(element.id).name.as_str()),
        ElementKind::Metadata => element.parent.map(|parent| cx.xml.element(parent).name.as_str()),
        _ => None,
    }
}

impl DocumentVisitor for ReferenceCollector<'_> {
    fn visit_resolved_element(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        let xml_element = cx.xml.element(element.id);
        let name = xml_element.name.as_str();
        let range = xml_element.name_range;
        match element.kind() {
            ElementKind::Property if self.is_property(name) => self.add(range, ReferenceUsage::Write),
            ElementKind::Item if self.is_item(name) => self.add(range, ReferenceUsage::Write),
            ElementKind::ItemDefinition if self.is_item(name) => self.add(range, ReferenceUsage::Declaration),
            ElementKind::Metadata => {
                let item = element.parent.map(|parent| cx.xml.element(parent).name.as_str());
                if self.is_metadata(item, name) {
                    self.add(range, ReferenceUsage::Write);
                }
            }
            ElementKind::Task if self.is_task(name) => self.add(range, ReferenceUsage::Read),
            ElementKind::Parameter => {
                // Parameter → ParameterGroup → UsingTask
                let task = element
                    .parent
                    .and_then(|group| cx.xml.element(group).parent)
                    .and_then(|using_task| cx.xml.element(using_task).attribute_value("TaskName"));
                if task.is_some_and(|task| self.is_task_parameter(task.trim(), name)) {
                    self.add(range, ReferenceUsage::Declaration);
                }
            }
            _ => {}
        }
        walk_resolved_element(self, cx, element);
    }

    fn visit_resolved_attribute(&mut self, cx: &VisitContext<'_>, attribute: &ResolvedAttribute) {
        let owner = cx.xml.element(attribute.element.id).name.as_str();
        let xattr = cx.xml.attribute(attribute.id);
        let matched = match attribute.role() {
            AttributeRole::Metadata => self.is_metadata(Some(owner), &xattr.name),
            AttributeRole::TaskParameter => self.is_task_parameter(owner, &xattr.name),
            AttributeRole::Declared => false,
        };
        if matched {
            self.add(xattr.name_range, ReferenceUsage::Write);
        }
        walk_resolved_attribute(self, cx, attribute);
    }

    fn visit_value_expression(&mut self, cx: &VisitContext<'_>, site: &ValueSite, tree: &ExpressionTree) {
        let implicit_item = owning_item(cx, site.element());
        for id in tree.nodes() {
            match tree.kind(id) {
                ExprKind::PropertyName { name } if self.is_property(name) => {
                    self.add(tree.range(id), ReferenceUsage::Read);
                }
                ExprKind::ItemName { name } if self.is_item(name) => {
                    self.add(tree.range(id), ReferenceUsage::Read);
                }
                ExprKind::Metadata { item, name, .. } => {
                    let qualified = item.as_ref().filter(|item| !item.is_empty());
                    if let Some(item) = qualified {
                        if self.is_item(&item.name) {
                            self.add(item.range, ReferenceUsage::Read);
                        }
                    }
                    let owner = qualified
                        .map(|item| item.name.as_str())
                        .or_else(|| tree.enclosing_item_name(id).map(|name| name.as_str()))
                        .or(implicit_item);
                    if !name.is_empty() && self.is_metadata(owner, &name.name) {
                        self.add(name.range, ReferenceUsage::Read);
                    }
                }
                ExprKind::Text { value, .. } if tree.is_whole_value(id) => {
                    self.literal(cx, site, value.trim(), tree.range(id));
                }
                _ => {}
            }
        }
    }

    fn visit_literal_value(&mut self, cx: &VisitContext<'_>, site: &ValueSite, value: &str, range: TextRange) {
        for (entry, entry_range) in literal_entries(site, value, range) {
            self.literal(cx, site, entry, entry_range);
        }
    }
}

/// Every occurrence of `symbol` in `root`.
pub fn find_references(root: &RootDocument, symbol: Symbol<'_>) -> Vec<SymbolReference> {
    ReferenceCollector::new(symbol).run(root)
}
