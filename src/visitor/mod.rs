//! Schema-driven document walking.
//!
//! [`walk_document`] resolves every element against the schema, using the
//! parent's resolved kind, and dispatches to a [`DocumentVisitor`]. The
//! default hook bodies call back into the `walk_*` functions, so an
//! implementation overrides a hook to act on a node and calls the matching
//! `walk_*` to keep descending:
//!
//! ```ignore
//! fn visit_resolved_element(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
//!     self.count += 1;
//!     walk_resolved_element(self, cx, element);
//! }
//! ```
//!
//! Values whose declared kind permits expressions are parsed and handed to
//! [`DocumentVisitor::visit_value_expression`]; literal values go to
//! [`DocumentVisitor::visit_literal_value`].

use std::path::Path;

use crate::base::{TextRange, TextSize};
use crate::dom::{AttributeId, ElementId, XDocument, XNodeId};
use crate::parser::{ExpressionOptions, ExpressionTree, parse, parse_condition};
use crate::schema::{
    AttributeRole, ElementKind, SchemaAttribute, SchemaElement, ValueFlags, ValueKind, resolve_element,
};

/// What a walk is looking at.
#[derive(Debug, Clone, Copy)]
pub struct VisitContext<'a> {
    pub xml: &'a XDocument,
    pub text: &'a str,
    pub filename: &'a Path,
}

impl<'a> VisitContext<'a> {
    pub fn new(xml: &'a XDocument, text: &'a str, filename: &'a Path) -> Self {
        Self { xml, text, filename }
    }
}

/// An element classified against the schema.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedElement {
    pub id: ElementId,
    pub schema: &'static SchemaElement,
    pub parent: Option<ElementId>,
    pub parent_kind: Option<ElementKind>,
    /// Inside a `Target`, where item and metadata references are legal
    /// in every value.
    pub in_target: bool,
}

impl ResolvedElement {
    pub fn kind(&self) -> ElementKind {
        self.schema.kind
    }

    fn child(&self, id: ElementId, schema: &'static SchemaElement) -> Self {
        Self {
            id,
            schema,
            parent: Some(self.id),
            parent_kind: Some(self.kind()),
            in_target: self.in_target || self.kind() == ElementKind::Target,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedAttribute {
    pub id: AttributeId,
    pub schema: &'static SchemaAttribute,
    pub element: ResolvedElement,
}

impl ResolvedAttribute {
    pub fn role(&self) -> AttributeRole {
        self.schema.role
    }
}

/// Where a value came from.
#[derive(Debug, Clone, Copy)]
pub enum ValueSite {
    Element(ResolvedElement),
    Attribute(ResolvedAttribute),
}

impl ValueSite {
    pub fn element(&self) -> &ResolvedElement {
        match self {
            ValueSite::Element(element) => element,
            ValueSite::Attribute(attribute) => &attribute.element,
        }
    }

    pub fn node(&self) -> XNodeId {
        match self {
            ValueSite::Element(element) => XNodeId::Element(element.id),
            ValueSite::Attribute(attribute) => XNodeId::Attribute(attribute.id),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ValueSite::Element(element) => element.schema.value.map_or(ValueKind::Unknown, |(kind, _)| kind),
            ValueSite::Attribute(attribute) => attribute.schema.kind,
        }
    }

    pub fn flags(&self) -> ValueFlags {
        match self {
            ValueSite::Element(element) => element.schema.value.map_or(ValueFlags::empty(), |(_, flags)| flags),
            ValueSite::Attribute(attribute) => attribute.schema.flags,
        }
    }

    pub fn allows_expressions(&self) -> bool {
        match self {
            ValueSite::Element(element) => {
                !element.schema.opaque
                    && !self.flags().contains(ValueFlags::LITERAL)
                    && !matches!(self.kind(), ValueKind::Data | ValueKind::Nothing | ValueKind::Unknown)
            }
            ValueSite::Attribute(attribute) => attribute.schema.allows_expressions(),
        }
    }

    /// Parser options for this value.
    pub fn options(&self) -> ExpressionOptions {
        let mut options = match self {
            ValueSite::Element(element) if element.kind() == ElementKind::Metadata => {
                ExpressionOptions::METADATA
            }
            ValueSite::Element(_) => ExpressionOptions::empty(),
            ValueSite::Attribute(attribute) => attribute.schema.allow,
        };
        if self.element().in_target {
            options |= ExpressionOptions::ITEMS_AND_METADATA;
        }
        let flags = self.flags();
        if flags.contains(ValueFlags::LIST) {
            options |= ExpressionOptions::LISTS;
        }
        if flags.contains(ValueFlags::COMMA_LIST) {
            options |= ExpressionOptions::COMMA_LISTS;
        }
        options
    }

    /// Parse `text`, which starts at `base` in the document.
    pub fn parse(&self, text: &str, base: TextSize) -> ExpressionTree {
        if self.kind() == ValueKind::Condition {
            parse_condition(text, base)
        } else {
            parse(text, self.options(), base)
        }
    }
}

/// Hooks called by the walk. Every default either does nothing or keeps
/// walking.
pub trait DocumentVisitor {
    fn visit_unknown_element(&mut self, _cx: &VisitContext<'_>, _element: ElementId) {}

    fn visit_unknown_attribute(
        &mut self,
        _cx: &VisitContext<'_>,
        _element: &ResolvedElement,
        _attribute: AttributeId,
    ) {
    }

    fn visit_resolved_element(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        walk_resolved_element(self, cx, element);
    }

    fn visit_resolved_attribute(&mut self, cx: &VisitContext<'_>, attribute: &ResolvedAttribute) {
        walk_resolved_attribute(self, cx, attribute);
    }

    fn visit_element_value(&mut self, cx: &VisitContext<'_>, element: &ResolvedElement) {
        walk_element_value(self, cx, element);
    }

    fn visit_value_expression(
        &mut self,
        _cx: &VisitContext<'_>,
        _site: &ValueSite,
        _tree: &ExpressionTree,
    ) {
    }

    fn visit_literal_value(
        &mut self,
        _cx: &VisitContext<'_>,
        _site: &ValueSite,
        _value: &str,
        _range: TextRange,
    ) {
    }
}

/// Walk from the document element.
pub fn walk_document<V: DocumentVisitor + ?Sized>(visitor: &mut V, cx: &VisitContext<'_>) {
    let Some(root) = cx.xml.root() else {
        return;
    };
    let name = &cx.xml.element(root).name;
    match resolve_element(name, None) {
        Some(schema) => {
            let element = ResolvedElement {
                id: root,
                schema,
                parent: None,
                parent_kind: None,
                in_target: false,
            };
            visitor.visit_resolved_element(cx, &element);
        }
        None => visitor.visit_unknown_element(cx, root),
    }
}

/// Visit attributes, the value, then child elements, unless the element
/// is opaque.
pub fn walk_resolved_element<V: DocumentVisitor + ?Sized>(
    visitor: &mut V,
    cx: &VisitContext<'_>,
    element: &ResolvedElement,
) {
    walk_attributes(visitor, cx, element);
    if element.schema.opaque {
        return;
    }
    if cx.xml.element(element.id).value.is_some() && element.schema.value.is_some() {
        visitor.visit_element_value(cx, element);
    }
    walk_children(visitor, cx, element);
}

pub fn walk_attributes<V: DocumentVisitor + ?Sized>(
    visitor: &mut V,
    cx: &VisitContext<'_>,
    element: &ResolvedElement,
) {
    for id in cx.xml.attribute_ids(element.id) {
        let name = &cx.xml.attribute(id).name;
        if name.starts_with("xmlns:") {
            continue;
        }
        match element.schema.attribute(name) {
            Some(schema) => {
                let attribute = ResolvedAttribute {
                    id,
                    schema,
                    element: *element,
                };
                visitor.visit_resolved_attribute(cx, &attribute);
            }
            None => visitor.visit_unknown_attribute(cx, element, id),
        }
    }
}

pub fn walk_children<V: DocumentVisitor + ?Sized>(
    visitor: &mut V,
    cx: &VisitContext<'_>,
    element: &ResolvedElement,
) {
    for &child in cx.xml.children(element.id) {
        let name = &cx.xml.element(child).name;
        match element.schema.child(name) {
            Some(kind) => {
                let resolved = element.child(child, crate::schema::element(kind));
                visitor.visit_resolved_element(cx, &resolved);
            }
            None => visitor.visit_unknown_element(cx, child),
        }
    }
}

pub fn walk_resolved_attribute<V: DocumentVisitor + ?Sized>(
    visitor: &mut V,
    cx: &VisitContext<'_>,
    attribute: &ResolvedAttribute,
) {
    let xattr = cx.xml.attribute(attribute.id);
    walk_value(
        visitor,
        cx,
        &ValueSite::Attribute(*attribute),
        &xattr.value,
        xattr.value_range,
    );
}

pub fn walk_element_value<V: DocumentVisitor + ?Sized>(
    visitor: &mut V,
    cx: &VisitContext<'_>,
    element: &ResolvedElement,
) {
    if let Some(value) = &cx.xml.element(element.id).value {
        walk_value(visitor, cx, &ValueSite::Element(*element), &value.text, value.range);
    }
}

/// Parse a value if its site permits expressions, and dispatch it.
pub fn walk_value<V: DocumentVisitor + ?Sized>(
    visitor: &mut V,
    cx: &VisitContext<'_>,
    site: &ValueSite,
    text: &str,
    range: TextRange,
) {
    if site.allows_expressions() {
        let tree = site.parse(text, range.start());
        visitor.visit_value_expression(cx, site, &tree);
    } else {
        visitor.visit_literal_value(cx, site, text, range);
    }
}

/// Entries of a literal value, trimmed, with their ranges. Values that
/// are not lists have a single entry. Blank entries are dropped.
pub fn literal_entries<'t>(site: &ValueSite, value: &'t str, range: TextRange) -> Vec<(&'t str, TextRange)> {
    let flags = site.flags();
    let separator = if flags.contains(ValueFlags::COMMA_LIST) {
        Some(',')
    } else if flags.contains(ValueFlags::LIST) {
        Some(';')
    } else {
        None
    };
    let pieces: Vec<&str> = match separator {
        Some(c) => value.split(c).collect(),
        None => vec![value],
    };

    let mut entries = Vec::new();
    let mut start = 0;
    for piece in pieces {
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            let leading = piece.len() - piece.trim_start().len();
            let offset = range.start() + TextSize::from((start + leading) as u32);
            entries.push((trimmed, TextRange::at(offset, TextSize::from(trimmed.len() as u32))));
        }
        start += piece.len() + 1;
    }
    entries
}

/// Resolve an arbitrary element by resolving its ancestors first.
pub fn resolve_element_in(xml: &XDocument, id: ElementId) -> Option<ResolvedElement> {
    let mut chain = vec![id];
    let mut current = id;
    while let Some(parent) = xml.element(current).parent {
        chain.push(parent);
        current = parent;
    }

    let mut resolved: Option<ResolvedElement> = None;
    for &element_id in chain.iter().rev() {
        let name = &xml.element(element_id).name;
        resolved = Some(match resolved {
            None => ResolvedElement {
                id: element_id,
                schema: resolve_element(name, None)?,
                parent: None,
                parent_kind: None,
                in_target: false,
            },
            Some(parent) => {
                let kind = parent.schema.child(name)?;
                parent.child(element_id, crate::schema::element(kind))
            }
        });
    }
    resolved
}

/// Resolve an attribute of an already resolved element.
pub fn resolve_attribute_in(
    xml: &XDocument,
    element: &ResolvedElement,
    id: AttributeId,
) -> Option<ResolvedAttribute> {
    let schema = element.schema.attribute(&xml.attribute(id).name)?;
    Some(ResolvedAttribute {
        id,
        schema,
        element: *element,
    })
}
