//! Element tree with source ranges
//!
//! A build script is XML. The analysis layers only need elements,
//! attributes and raw values with exact byte ranges, so the DOM here is a
//! small arena of [`XElement`]s filled in by a tolerant reader. It never
//! rejects a document: unterminated or mismatched elements are closed
//! where the reader gives up, and the problem is recorded in
//! [`XDocument::errors`].

mod reader;

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize, eq_ignore_case};

/// Index of an element in its [`XDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An attribute, addressed by its element and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId {
    pub element: ElementId,
    pub index: u32,
}

/// Any DOM node that can carry annotations or be resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum XNodeId {
    Element(ElementId),
    Attribute(AttributeId),
}

impl From<ElementId> for XNodeId {
    fn from(id: ElementId) -> Self {
        XNodeId::Element(id)
    }
}

impl From<AttributeId> for XNodeId {
    fn from(id: AttributeId) -> Self {
        XNodeId::Attribute(id)
    }
}

/// Raw (unescaped) text and where it sits in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XText {
    pub text: SmolStr,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAttribute {
    pub name: SmolStr,
    pub name_range: TextRange,
    /// Value exactly as written between the quotes.
    pub value: SmolStr,
    /// Range of the value, excluding the quotes.
    pub value_range: TextRange,
}

impl XAttribute {
    /// From the start of the name to the end of the value.
    pub fn range(&self) -> TextRange {
        self.name_range.cover(self.value_range)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XElement {
    pub name: SmolStr,
    pub name_range: TextRange,
    /// From `<` to the end of the closing tag (or wherever reading stopped).
    pub range: TextRange,
    pub start_tag_range: TextRange,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub attributes: Vec<XAttribute>,
    /// Content between the tags, for elements without child elements.
    pub value: Option<XText>,
    pub is_closed: bool,
    pub is_self_closing: bool,
}

impl XElement {
    pub fn attribute(&self, name: &str) -> Option<&XAttribute> {
        self.attributes.iter().find(|a| eq_ignore_case(&a.name, name))
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| eq_ignore_case(&a.name, name))
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|a| a.value.as_str())
    }

    pub fn is_named(&self, name: &str) -> bool {
        eq_ignore_case(&self.name, name)
    }
}

/// A well-formedness problem found while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError {
    pub message: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XDocument {
    elements: Vec<XElement>,
    roots: Vec<ElementId>,
    errors: Vec<XmlError>,
}

impl XDocument {
    /// Read `text`. Always succeeds.
    pub fn parse(text: &str) -> Self {
        reader::read(text)
    }

    /// The document element.
    pub fn root(&self) -> Option<ElementId> {
        self.roots.first().copied()
    }

    pub fn element(&self, id: ElementId) -> &XElement {
        &self.elements[id.index()]
    }

    pub fn attribute(&self, id: AttributeId) -> &XAttribute {
        &self.element(id.element).attributes[id.index as usize]
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len() as u32).map(ElementId)
    }

    pub fn attribute_ids(&self, element: ElementId) -> impl Iterator<Item = AttributeId> + '_ {
        (0..self.element(element).attributes.len() as u32).map(move |index| AttributeId {
            element,
            index,
        })
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.element(id).children
    }

    pub fn errors(&self) -> &[XmlError] {
        &self.errors
    }

    pub fn range(&self, node: XNodeId) -> TextRange {
        match node {
            XNodeId::Element(id) => self.element(id).range,
            XNodeId::Attribute(id) => self.attribute(id).range(),
        }
    }

    /// Deepest element whose range covers `offset`.
    pub fn element_at(&self, offset: TextSize) -> Option<ElementId> {
        // Arena order is start-tag order, so the last covering element is
        // the innermost one.
        self.elements()
            .filter(|&id| {
                let range = self.element(id).range;
                range.start() <= offset && offset <= range.end()
            })
            .last()
    }

    /// Attribute of `element` whose name or value covers `offset`.
    pub fn attribute_at(&self, element: ElementId, offset: TextSize) -> Option<AttributeId> {
        self.attribute_ids(element).find(|&id| {
            let attribute = self.attribute(id);
            attribute.name_range.contains_inclusive(offset)
                || attribute.value_range.contains_inclusive(offset)
        })
    }

    pub(crate) fn push(&mut self, element: XElement) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        match element.parent {
            Some(parent) => self.elements[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        self.elements.push(element);
        id
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> &mut XElement {
        &mut self.elements[id.index()]
    }

    pub(crate) fn push_error(&mut self, message: impl Into<String>, range: TextRange) {
        self.errors.push(XmlError {
            message: message.into(),
            range,
        });
    }
}
