//! Expression parser entry point and the shared cursor.
//!
//! The parser makes a single left-to-right pass over the text. Plain
//! characters accumulate into a pending literal run; `$(`, `@(` and `%(`
//! hand control to the reference sub-parsers in [`super::reference`],
//! which return with the cursor just past the matching `)`. List
//! separators flush the current entry.
//!
//! Syntax errors are never returned as `Err` to callers. Sub-parsers that
//! stop early hand back a [`Partial`] carrying the node built so far, and
//! the reference parser that owns it wraps everything in an
//! [`ExprKind::IncompleteError`].

use smol_str::SmolStr;

use super::ast::{ExprKind, ExpressionTree, NodeId, TreeBuilder};
use super::error::ExpressionErrorKind;
use super::options::ExpressionOptions;
use crate::base::{TextRange, TextSize, text_size};

/// Parse `text` as an MSBuild expression.
///
/// `base_offset` is the absolute position of `text[0]` in the enclosing
/// document; every node range in the result is shifted by it.
pub fn parse(text: &str, options: ExpressionOptions, base_offset: TextSize) -> ExpressionTree {
    let mut parser = Parser::new(text, base_offset);
    let root = match parser.parse_region(options) {
        Ok(node) | Err(node) => node,
    };
    parser.finish(root)
}

/// What a sub-parser had built when it hit something it did not expect.
#[derive(Debug)]
pub(super) struct Partial {
    pub(super) node: Option<NodeId>,
    pub(super) kind: ExpressionErrorKind,
    pub(super) was_eof: bool,
}

pub(super) type Step<T = NodeId> = Result<T, Partial>;

pub(super) fn is_name_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

pub(super) fn is_name_continue(c: char) -> bool {
    c == '-' || unicode_ident::is_xid_continue(c)
}

pub(super) fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`')
}

pub(super) struct Parser<'a> {
    text: &'a str,
    base: TextSize,
    /// Cursor, a byte offset into `text`.
    pub(super) pos: usize,
    /// Exclusive end of the region being parsed.
    pub(super) end: usize,
    pub(super) builder: TreeBuilder,
}

enum Part {
    Literal(usize, usize),
    Node(NodeId),
}

/// Parts of the list entry (or whole value) currently being built.
struct Entry {
    literal_start: usize,
    parts: Vec<Part>,
}

impl Entry {
    fn new(start: usize) -> Self {
        Self {
            literal_start: start,
            parts: Vec::new(),
        }
    }

    fn flush_literal(&mut self, end: usize) {
        if self.literal_start < end {
            self.parts.push(Part::Literal(self.literal_start, end));
        }
        self.literal_start = end;
    }
}

impl<'a> Parser<'a> {
    pub(super) fn new(text: &'a str, base: TextSize) -> Self {
        Self {
            text,
            base,
            pos: 0,
            end: text.len(),
            builder: TreeBuilder::default(),
        }
    }

    pub(super) fn finish(self, root: NodeId) -> ExpressionTree {
        self.builder.finish(root)
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    pub(super) fn peek(&self) -> Option<char> {
        self.text.get(self.pos..self.end)?.chars().next()
    }

    pub(super) fn peek_byte(&self, n: usize) -> Option<u8> {
        let i = self.pos + n;
        (i < self.end).then(|| self.text.as_bytes()[i])
    }

    pub(super) fn at_eof(&self) -> bool {
        self.pos >= self.end
    }

    pub(super) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(super) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub(super) fn at_str(&self, s: &str) -> bool {
        self.text
            .get(self.pos..self.end)
            .is_some_and(|rest| rest.starts_with(s))
    }

    pub(super) fn eat_str(&mut self, s: &str) -> bool {
        let found = self.at_str(s);
        if found {
            self.pos += s.len();
        }
        found
    }

    pub(super) fn at_str_ignore_case(&self, s: &str) -> bool {
        let rest = &self.text.as_bytes()[self.pos.min(self.end)..self.end];
        rest.len() >= s.len() && rest[..s.len()].eq_ignore_ascii_case(s.as_bytes())
    }

    /// At `keyword` (ASCII, case-insensitive) not followed by a name character.
    pub(super) fn at_keyword(&self, keyword: &str) -> bool {
        if !self.at_str_ignore_case(keyword) {
            return false;
        }
        let after = self.pos + keyword.len();
        !self
            .text
            .get(after..self.end)
            .and_then(|rest| rest.chars().next())
            .is_some_and(is_name_continue)
    }

    pub(super) fn at_reference(&self, sigil: u8) -> bool {
        self.peek_byte(0) == Some(sigil) && self.peek_byte(1) == Some(b'(')
    }

    pub(super) fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    pub(super) fn scan_name(&mut self) -> Option<SmolStr> {
        let start = self.pos;
        if !self.peek().is_some_and(is_name_start) {
            return None;
        }
        self.bump();
        while let Some(c) = self.peek() {
            if c == '-' && self.peek_byte(1) == Some(b'>') {
                break;
            }
            if !is_name_continue(c) {
                break;
            }
            self.bump();
        }
        Some(SmolStr::new(self.slice(start, self.pos)))
    }

    /// A name that may contain `.` between segments (`System.IO.Path`).
    pub(super) fn scan_dotted_name(&mut self) -> Option<SmolStr> {
        let start = self.pos;
        self.scan_name()?;
        while self.peek() == Some('.') {
            let dot = self.pos;
            self.bump();
            if self.scan_name().is_none() {
                self.pos = dot;
                break;
            }
        }
        Some(SmolStr::new(self.slice(start, self.pos)))
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub(super) fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start..end]
    }

    pub(super) fn range(&self, start: usize, end: usize) -> TextRange {
        TextRange::new(self.base + text_size(start), self.base + text_size(end.max(start)))
    }

    pub(super) fn alloc(&mut self, start: usize, end: usize, kind: ExprKind) -> NodeId {
        let range = self.range(start, end);
        self.builder.alloc(range, kind)
    }

    pub(super) fn alloc_range(&mut self, range: TextRange, kind: ExprKind) -> NodeId {
        self.builder.alloc(range, kind)
    }

    /// Local offset of a node's start.
    pub(super) fn node_start(&self, id: NodeId) -> usize {
        u32::from(self.builder.range(id).start() - self.base) as usize
    }

    pub(super) fn partial(&self, node: Option<NodeId>, kind: ExpressionErrorKind) -> Partial {
        Partial {
            node,
            kind,
            was_eof: self.at_eof(),
        }
    }

    // =========================================================================
    // Regions
    // =========================================================================

    /// Parse `[self.pos, self.end)`. `Err` carries the node built so far
    /// when a sub-parser stopped on a syntax error.
    pub(super) fn parse_region(&mut self, options: ExpressionOptions) -> Result<NodeId, NodeId> {
        let region_start = self.pos;
        let splits = options.splits_lists();
        let mut entries = Vec::new();
        let mut saw_separator = false;
        let mut entry = Entry::new(self.pos);
        let mut failed = false;

        while let Some(c) = self.peek() {
            if options.is_list_separator(c) {
                let separator = self.pos;
                let finished = std::mem::replace(&mut entry, Entry::new(separator + 1));
                let node = match self.finish_entry(finished, separator, true) {
                    Some(node) => node,
                    None => self.alloc(
                        separator,
                        separator + 1,
                        ExprKind::Error {
                            kind: ExpressionErrorKind::EmptyListEntry,
                        },
                    ),
                };
                entries.push(node);
                saw_separator = true;
                self.pos = separator + 1;
                continue;
            }

            match c {
                '$' | '@' | '%' if self.peek_byte(1) == Some(b'(') => {
                    entry.flush_literal(self.pos);
                    let result = match c {
                        '$' => self.parse_property(options),
                        '@' if options.contains(ExpressionOptions::ITEMS) => {
                            self.parse_item(options)
                        }
                        '%' if options.contains(ExpressionOptions::METADATA) => {
                            self.parse_metadata()
                        }
                        '@' => Ok(self.disallowed(ExpressionErrorKind::ItemsDisallowed)),
                        _ => Ok(self.disallowed(ExpressionErrorKind::MetadataDisallowed)),
                    };
                    let node = match result {
                        Ok(node) => node,
                        Err(node) => {
                            failed = true;
                            node
                        }
                    };
                    entry.parts.push(Part::Node(node));
                    entry.literal_start = self.pos;
                    if failed {
                        break;
                    }
                }
                '&' => self.skip_entity(),
                _ => {
                    self.bump();
                }
            }
        }

        let end = self.pos;
        let node = if splits && saw_separator {
            // A trailing separator or whitespace-only tail is not an entry.
            if let Some(last) = self.finish_entry(entry, end, true) {
                entries.push(last);
            }
            self.alloc(region_start, end, ExprKind::List { entries })
        } else {
            match self.finish_entry(entry, end, splits) {
                Some(node) => node,
                None => self.alloc(
                    region_start,
                    region_start,
                    ExprKind::Text {
                        value: SmolStr::default(),
                        is_pure: true,
                    },
                ),
            }
        };

        if failed { Err(node) } else { Ok(node) }
    }

    /// Collapse an entry's parts into a single node. List entries have
    /// surrounding whitespace trimmed. Returns `None` for an empty entry.
    fn finish_entry(&mut self, mut entry: Entry, end: usize, in_list: bool) -> Option<NodeId> {
        entry.flush_literal(end);
        let mut parts = entry.parts;

        if in_list {
            let bytes = self.text.as_bytes();
            if let Some(Part::Literal(start, end)) = parts.first_mut() {
                while *start < *end && bytes[*start].is_ascii_whitespace() {
                    *start += 1;
                }
            }
            if let Some(Part::Literal(start, end)) = parts.last_mut() {
                while *end > *start && bytes[*end - 1].is_ascii_whitespace() {
                    *end -= 1;
                }
            }
            parts.retain(|part| !matches!(part, Part::Literal(start, end) if start == end));
        }

        if parts.len() <= 1 {
            return match parts.pop()? {
                Part::Node(node) => Some(node),
                Part::Literal(start, end) => {
                    let value = SmolStr::new(self.slice(start, end));
                    Some(self.alloc(start, end, ExprKind::Text { value, is_pure: true }))
                }
            };
        }

        let ids: Vec<NodeId> = parts
            .into_iter()
            .map(|part| match part {
                Part::Node(node) => node,
                Part::Literal(start, end) => {
                    let value = SmolStr::new(self.slice(start, end));
                    self.alloc(start, end, ExprKind::Text { value, is_pure: false })
                }
            })
            .collect();
        let first = self.builder.range(ids[0]);
        let last = self.builder.range(ids[ids.len() - 1]);
        let range = TextRange::new(first.start(), last.end());
        Some(self.alloc_range(range, ExprKind::Concat { parts: ids }))
    }

    /// Parse `[start, end)` as a nested expression and restore the cursor.
    pub(super) fn parse_nested(
        &mut self,
        start: usize,
        end: usize,
        options: ExpressionOptions,
    ) -> NodeId {
        let (saved_pos, saved_end) = (self.pos, self.end);
        self.pos = start;
        self.end = end;
        let node = match self.parse_region(options.without_lists()) {
            Ok(node) | Err(node) => node,
        };
        self.pos = saved_pos;
        self.end = saved_end;
        node
    }

    /// `&name;` or `&#NN;` is consumed whole so `&#59;` never splits a list.
    fn skip_entity(&mut self) {
        let rest = &self.text.as_bytes()[self.pos + 1..self.end];
        let terminator = rest.iter().take(12).position(|&b| b == b';');
        match terminator {
            Some(n) if n > 0 && rest[..n].iter().all(|b| b.is_ascii_alphanumeric() || *b == b'#') => {
                self.pos += n + 2;
            }
            _ => self.pos += 1,
        }
    }

    /// A reference form that is not allowed here: skip to its closing
    /// paren and record it as an error.
    fn disallowed(&mut self, kind: ExpressionErrorKind) -> NodeId {
        let start = self.pos;
        self.pos += 2;
        let mut depth = 1usize;
        let mut quote = None;
        while let Some(c) = self.bump() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None => match c {
                    c if is_quote(c) => quote = Some(c),
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                },
            }
        }
        self.alloc(start, self.pos, ExprKind::Error { kind })
    }

    /// Find the quote closing a string that starts at `from`, skipping over
    /// quotes nested inside `$(...)`, `@(...)` and `%(...)`.
    pub(super) fn find_closing_quote(&self, from: usize, quote: char) -> Option<usize> {
        let bytes = self.text.as_bytes();
        let quote = quote as u8;
        let mut i = from;
        let mut depth = 0usize;
        let mut inner_quote: Option<u8> = None;
        while i < self.end {
            let b = bytes[i];
            if let Some(q) = inner_quote {
                if b == q {
                    inner_quote = None;
                }
                i += 1;
                continue;
            }
            if depth == 0 {
                if b == quote {
                    return Some(i);
                }
                if matches!(b, b'$' | b'@' | b'%') && bytes.get(i + 1) == Some(&b'(') && i + 1 < self.end {
                    depth = 1;
                    i += 2;
                    continue;
                }
            } else {
                match b {
                    b'(' => depth += 1,
                    b')' => depth -= 1,
                    b'\'' | b'"' | b'`' => inner_quote = Some(b),
                    _ => {}
                }
            }
            i += 1;
        }
        None
    }
}
