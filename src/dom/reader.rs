//! quick-xml driven reader that fills an [`XDocument`].

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smol_str::SmolStr;

use super::{ElementId, XAttribute, XDocument, XElement, XText};
use crate::base::text_range;

/// Byte offset of `part` inside `source`, when `part` borrows from it.
fn offset_in(source: &str, part: &[u8]) -> Option<usize> {
    let base = source.as_ptr() as usize;
    let ptr = part.as_ptr() as usize;
    (ptr >= base && ptr + part.len() <= base + source.len()).then(|| ptr - base)
}

struct Open {
    id: ElementId,
    content_start: usize,
    has_child_elements: bool,
}

struct DomReader<'a> {
    source: &'a str,
    doc: XDocument,
    stack: Vec<Open>,
}

pub(super) fn read(source: &str) -> XDocument {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;

    let mut dom = DomReader {
        source,
        doc: XDocument::default(),
        stack: Vec::new(),
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let end = reader.buffer_position() as usize;
                dom.start_element(e, end, false);
            }
            Ok(Event::Empty(ref e)) => {
                let end = reader.buffer_position() as usize;
                dom.start_element(e, end, true);
            }
            Ok(Event::End(ref e)) => {
                let end = reader.buffer_position() as usize;
                let name = e.name();
                let name_start = offset_in(source, name.as_ref()).unwrap_or(end);
                let tag_start = name_start.saturating_sub(2);
                dom.end_element(name.as_ref(), tag_start, end);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                let at = reader.error_position() as usize;
                dom.doc
                    .push_error(format!("XML error: {e}"), text_range(at, at.saturating_add(1).min(source.len())));
                break;
            }
            _ => {}
        }
    }

    dom.close_remaining();
    dom.doc
}

impl<'a> DomReader<'a> {
    fn start_element(&mut self, e: &BytesStart<'_>, tag_end: usize, self_closing: bool) {
        let name_bytes = e.name();
        let name = String::from_utf8_lossy(name_bytes.as_ref());
        let name_start = offset_in(self.source, name_bytes.as_ref()).unwrap_or(tag_end);
        let tag_start = name_start.saturating_sub(1);
        let name_range = text_range(name_start, name_start + name_bytes.as_ref().len());

        let attributes = self.read_attributes(e, tag_end);

        let parent = self.stack.last_mut().map(|open| {
            open.has_child_elements = true;
            open.id
        });

        let id = self.doc.push(XElement {
            name: SmolStr::new(name),
            name_range,
            range: text_range(tag_start, tag_end),
            start_tag_range: text_range(tag_start, tag_end),
            parent,
            children: Vec::new(),
            attributes,
            value: None,
            is_closed: self_closing,
            is_self_closing: self_closing,
        });

        if !self_closing {
            self.stack.push(Open {
                id,
                content_start: tag_end,
                has_child_elements: false,
            });
        }
    }

    fn read_attributes(&mut self, e: &BytesStart<'_>, tag_end: usize) -> Vec<XAttribute> {
        let mut result = Vec::new();
        let mut attributes = e.attributes();
        attributes.with_checks(false);

        for attribute in attributes {
            let attribute = match attribute {
                Ok(attribute) => attribute,
                Err(err) => {
                    self.doc
                        .push_error(format!("Malformed attribute: {err}"), text_range(tag_end, tag_end));
                    break;
                }
            };
            let key = attribute.key.as_ref();
            let Some(name_start) = offset_in(self.source, key) else {
                continue;
            };
            let name_end = name_start + key.len();
            let (value_start, value_end) = self.locate_value(name_end, tag_end);
            result.push(XAttribute {
                name: SmolStr::new(String::from_utf8_lossy(key)),
                name_range: text_range(name_start, name_end),
                value: SmolStr::new(&self.source[value_start..value_end]),
                value_range: text_range(value_start, value_end),
            });
        }
        result
    }

    /// Find the quoted value following an attribute name.
    fn locate_value(&self, name_end: usize, limit: usize) -> (usize, usize) {
        let bytes = self.source.as_bytes();
        let limit = limit.min(bytes.len());
        let mut i = name_end;
        while i < limit && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < limit && bytes[i] == b'=' {
            i += 1;
        }
        while i < limit && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= limit || !matches!(bytes[i], b'"' | b'\'') {
            return (name_end, name_end);
        }
        let quote = bytes[i];
        let start = i + 1;
        let end = bytes[start..limit]
            .iter()
            .position(|&b| b == quote)
            .map_or(limit, |n| start + n);
        (start, end)
    }

    fn end_element(&mut self, name: &[u8], tag_start: usize, tag_end: usize) {
        let name = String::from_utf8_lossy(name);
        let matching = self
            .stack
            .iter()
            .rposition(|open| self.doc.element(open.id).is_named(&name));

        let Some(depth) = matching else {
            self.doc.push_error(
                format!("Unexpected closing tag '{name}'"),
                text_range(tag_start, tag_end),
            );
            return;
        };

        // Anything opened after the matching element was never closed.
        while self.stack.len() > depth + 1 {
            if let Some(open) = self.stack.pop() {
                let element = self.doc.element(open.id);
                let message = format!("Element '{}' is not closed", element.name);
                let range = element.name_range;
                self.doc.push_error(message, range);
                self.finish(open, tag_start, tag_start, false);
            }
        }
        if let Some(open) = self.stack.pop() {
            self.finish(open, tag_start, tag_end, true);
        }
    }

    fn finish(&mut self, open: Open, content_end: usize, end: usize, closed: bool) {
        let source = self.source;
        let element = self.doc.element_mut(open.id);
        let start = usize::from(element.range.start());
        element.range = text_range(start, end);
        element.is_closed = closed;
        if !open.has_child_elements && open.content_start <= content_end {
            element.value = Some(XText {
                text: SmolStr::new(&source[open.content_start..content_end]),
                range: text_range(open.content_start, content_end),
            });
        }
    }

    fn close_remaining(&mut self) {
        let end = self.source.len();
        while let Some(open) = self.stack.pop() {
            let element = self.doc.element(open.id);
            let message = format!("Element '{}' is not closed", element.name);
            let range = element.name_range;
            self.doc.push_error(message, range);
            self.finish(open, end, end, false);
        }
    }
}
