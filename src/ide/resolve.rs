//! What sits at an offset: the element, attribute and symbol reference a
//! host needs for completion, hover and go-to.

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::dom::{ElementId, XDocument};
use crate::hir::Symbol;
use crate::parser::ExprKind;
use crate::project::RootDocument;
use crate::schema::{AttributeRole, ElementKind, ValueKind};
use crate::visitor::{
    ResolvedAttribute, ResolvedElement, ValueSite, literal_entries, resolve_attribute_in,
    resolve_element_in,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Property,
    Item,
    Metadata,
    Target,
    Task,
    TaskParameter,
    PropertyFunction,
    ItemFunction,
    ClassName,
}

/// A name under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub kind: ReferenceKind,
    pub name: SmolStr,
    /// The item of a metadata reference or the task of a parameter, when
    /// known.
    pub owner: Option<SmolStr>,
    pub range: TextRange,
}

impl ResolvedReference {
    fn new(kind: ReferenceKind, name: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            kind,
            name: name.into(),
            owner: None,
            range,
        }
    }

    fn owned_by(mut self, owner: Option<&str>) -> Self {
        self.owner = owner.map(SmolStr::from);
        self
    }

    /// The symbol to look up or collect references for. `None` for
    /// function and class names.
    pub fn symbol(&self) -> Option<Symbol<'_>> {
        let name = self.name.as_str();
        Some(match self.kind {
            ReferenceKind::Property => Symbol::Property(name),
            ReferenceKind::Item => Symbol::Item(name),
            ReferenceKind::Target => Symbol::Target(name),
            ReferenceKind::Task => Symbol::Task(name),
            ReferenceKind::Metadata => Symbol::Metadata {
                item: self.owner.as_deref(),
                name,
            },
            ReferenceKind::TaskParameter => Symbol::TaskParameter {
                task: self.owner.as_deref()?,
                name,
            },
            ReferenceKind::PropertyFunction
            | ReferenceKind::ItemFunction
            | ReferenceKind::ClassName => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResolveResult {
    pub element: ResolvedElement,
    pub attribute: Option<ResolvedAttribute>,
    /// Declared kind of the value the offset is in, if any.
    pub value_kind: Option<ValueKind>,
    pub reference: Option<ResolvedReference>,
}

/// Resolve the node and reference at `offset`. `None` when the offset is
/// outside the document element or inside an element the schema does not
/// know.
pub fn resolve_at(root: &RootDocument, offset: TextSize) -> Option<ResolveResult> {
    let xml = root.xml();
    let id = xml.element_at(offset)?;
    let element = resolve_element_in(xml, id)?;
    let xml_element = xml.element(id);
    let mut result = ResolveResult {
        element,
        attribute: None,
        value_kind: None,
        reference: None,
    };

    if xml_element.name_range.contains_inclusive(offset) {
        result.reference = element_reference(xml, &element);
        return Some(result);
    }

    if let Some(attribute_id) = xml.attribute_at(id, offset) {
        let Some(attribute) = resolve_attribute_in(xml, &element, attribute_id) else {
            return Some(result);
        };
        let xattr = xml.attribute(attribute_id);
        result.attribute = Some(attribute);
        if xattr.name_range.contains_inclusive(offset) {
            result.reference = attribute_reference(xml, &attribute);
        } else {
            let site = ValueSite::Attribute(attribute);
            result.value_kind = Some(site.kind());
            result.reference = value_reference(xml, &site, &xattr.value, xattr.value_range, offset);
        }
        return Some(result);
    }

    if let Some(value) = &xml_element.value {
        if element.schema.value.is_some() && value.range.contains_inclusive(offset) {
            let site = ValueSite::Element(element);
            result.value_kind = Some(site.kind());
            result.reference = value_reference(xml, &site, &value.text, value.range, offset);
        }
    }
    Some(result)
}

fn element_name(xml: &XDocument, id: Option<ElementId>) -> Option<&str> {
    id.map(|id| xml.element(id).name.as_str())
}

fn element_reference(xml: &XDocument, element: &ResolvedElement) -> Option<ResolvedReference> {
    let xml_element = xml.element(element.id);
    let (name, range) = (xml_element.name.as_str(), xml_element.name_range);
    let reference = match element.kind() {
        ElementKind::Property => ResolvedReference::new(ReferenceKind::Property, name, range),
        ElementKind::Item | ElementKind::ItemDefinition => {
            ResolvedReference::new(ReferenceKind::Item, name, range)
        }
        ElementKind::Metadata => ResolvedReference::new(ReferenceKind::Metadata, name, range)
            .owned_by(element_name(xml, element.parent)),
        ElementKind::Task => ResolvedReference::new(ReferenceKind::Task, name, range),
        ElementKind::Parameter => {
            // Parameter → ParameterGroup → UsingTask
            let task = element
                .parent
                .and_then(|group| xml.element(group).parent)
                .and_then(|using_task| xml.element(using_task).attribute_value("TaskName"))
                .map(str::trim);
            ResolvedReference::new(ReferenceKind::TaskParameter, name, range).owned_by(task)
        }
        _ => return None,
    };
    Some(reference)
}

fn attribute_reference(
    xml: &XDocument,
    attribute: &ResolvedAttribute,
) -> Option<ResolvedReference> {
    let xattr = xml.attribute(attribute.id);
    let owner = Some(xml.element(attribute.element.id).name.as_str());
    let kind = match attribute.role() {
        AttributeRole::Metadata => ReferenceKind::Metadata,
        AttributeRole::TaskParameter => ReferenceKind::TaskParameter,
        AttributeRole::Declared => return None,
    };
    Some(ResolvedReference::new(kind, xattr.name.clone(), xattr.name_range).owned_by(owner))
}

/// A reference named by a literal, by the kind of its site.
fn literal_reference(
    xml: &XDocument,
    site: &ValueSite,
    value: &str,
    range: TextRange,
) -> Option<ResolvedReference> {
    let kind = match site.kind() {
        ValueKind::TargetName => ReferenceKind::Target,
        ValueKind::ItemName => ReferenceKind::Item,
        ValueKind::PropertyName => ReferenceKind::Property,
        ValueKind::TaskName => ReferenceKind::Task,
        ValueKind::MetadataName => ReferenceKind::Metadata,
        ValueKind::TaskOutputParameterName => {
            let task = element_name(xml, site.element().parent);
            return Some(
                ResolvedReference::new(ReferenceKind::TaskParameter, value, range).owned_by(task),
            );
        }
        _ => return None,
    };
    Some(ResolvedReference::new(kind, value, range))
}

fn value_reference(
    xml: &XDocument,
    site: &ValueSite,
    text: &str,
    range: TextRange,
    offset: TextSize,
) -> Option<ResolvedReference> {
    if !site.allows_expressions() {
        return literal_entries(site, text, range)
            .into_iter()
            .find(|(_, entry_range)| entry_range.contains_inclusive(offset))
            .and_then(|(entry, entry_range)| literal_reference(xml, site, entry, entry_range));
    }

    let tree = site.parse(text, range.start());
    let id = tree.node_at(offset)?;
    let node_range = tree.range(id);
    if let Some(name) = tree.property_name(id) {
        return Some(ResolvedReference::new(ReferenceKind::Property, name.clone(), node_range));
    }
    if let Some(name) = tree.item_name(id) {
        return Some(ResolvedReference::new(ReferenceKind::Item, name.clone(), node_range));
    }
    match tree.kind(id) {
        ExprKind::Metadata { item, name, .. } => {
            let qualified = item.as_ref().filter(|item| !item.is_empty());
            if let Some(item) = qualified {
                if item.range.contains_inclusive(offset) {
                    return Some(ResolvedReference::new(
                        ReferenceKind::Item,
                        item.name.clone(),
                        item.range,
                    ));
                }
            }
            let element = site.element();
            let implicit = match element.kind() {
                ElementKind::Item | ElementKind::ItemDefinition => {
                    Some(xml.element(element.id).name.as_str())
                }
                ElementKind::Metadata => element_name(xml, element.parent),
                _ => None,
            };
            let owner = qualified
                .map(|item| item.name.as_str())
                .or_else(|| tree.enclosing_item_name(id).map(|name| name.as_str()))
                .or(implicit);
            Some(
                ResolvedReference::new(ReferenceKind::Metadata, name.name.clone(), name.range)
                    .owned_by(owner),
            )
        }
        ExprKind::FunctionName { name } => {
            let kind = match tree.parent(id).map(|parent| tree.kind(parent)) {
                Some(ExprKind::ItemFunction { .. }) => ReferenceKind::ItemFunction,
                _ => ReferenceKind::PropertyFunction,
            };
            Some(ResolvedReference::new(kind, name.clone(), node_range))
        }
        ExprKind::ClassReference { name } => Some(ResolvedReference::new(
            ReferenceKind::ClassName,
            name.clone(),
            node_range,
        )),
        ExprKind::Text { value, .. } if tree.is_whole_value(id) => {
            literal_reference(xml, site, value.trim(), node_range)
        }
        _ => None,
    }
}
