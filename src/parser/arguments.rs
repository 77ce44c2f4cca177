//! Function arguments: lists, numbers, quoted strings and bare words.

use super::ast::{ExprKind, NodeId};
use super::error::ExpressionErrorKind;
use super::expression::{Parser, Partial, Step, is_name_start, is_quote};
use super::options::ExpressionOptions;

/// Map a bare word to a boolean literal, if it is one.
pub(super) fn bool_literal(word: &str) -> Option<bool> {
    const TRUE: [&str; 3] = ["true", "on", "yes"];
    const FALSE: [&str; 3] = ["false", "off", "no"];
    if TRUE.iter().any(|w| w.eq_ignore_ascii_case(word)) {
        Some(true)
    } else if FALSE.iter().any(|w| w.eq_ignore_ascii_case(word)) {
        Some(false)
    } else {
        None
    }
}

impl<'a> Parser<'a> {
    /// `(a, b, c)` or `[a, b]`. The cursor is on `open`.
    pub(super) fn parse_argument_list(
        &mut self,
        open: char,
        close: char,
        options: ExpressionOptions,
    ) -> Step {
        let start = self.pos;
        self.eat(open);
        let mut arguments = Vec::new();

        self.skip_ws();
        if self.eat(close) {
            return Ok(self.alloc(start, self.pos, ExprKind::ArgumentList { arguments }));
        }

        loop {
            match self.parse_argument(options) {
                Ok(argument) => arguments.push(argument),
                Err(Partial {
                    node,
                    kind,
                    was_eof,
                }) => {
                    arguments.extend(node);
                    let list = self.alloc(start, self.pos, ExprKind::ArgumentList { arguments });
                    return Err(Partial {
                        node: Some(list),
                        kind,
                        was_eof,
                    });
                }
            }

            self.skip_ws();
            if self.eat(close) {
                return Ok(self.alloc(start, self.pos, ExprKind::ArgumentList { arguments }));
            }
            if self.eat(',') {
                continue;
            }

            let kind = if close == ')' {
                ExpressionErrorKind::ExpectingRightParenOrComma
            } else {
                ExpressionErrorKind::ExpectingRightBracket
            };
            let partial = self.partial(None, kind);
            let list = self.alloc(start, self.pos, ExprKind::ArgumentList { arguments });
            return Err(Partial {
                node: Some(list),
                ..partial
            });
        }
    }

    pub(super) fn parse_argument(&mut self, options: ExpressionOptions) -> Step {
        self.skip_ws();
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Err(self.partial(None, ExpressionErrorKind::ExpectingValue));
        };

        match c {
            c if is_quote(c) => self.parse_quoted(options.without_lists()),
            '$' if self.at_reference(b'$') => self.nested_reference(|p| p.parse_property(options)),
            '@' if self.at_reference(b'@') && options.contains(ExpressionOptions::ITEMS) => {
                self.nested_reference(|p| p.parse_item(options))
            }
            '%' if self.at_reference(b'%') && options.contains(ExpressionOptions::METADATA) => {
                self.nested_reference(|p| p.parse_metadata())
            }
            _ if self.at_number() => self.parse_number(),
            c if is_name_start(c) => {
                let Some(word) = self.scan_dotted_name() else {
                    return Err(self.partial(None, ExpressionErrorKind::ExpectingValue));
                };
                let kind = match bool_literal(&word) {
                    Some(value) => ExprKind::ArgumentBool(value),
                    None => ExprKind::Text {
                        value: word,
                        is_pure: true,
                    },
                };
                Ok(self.alloc(start, self.pos, kind))
            }
            _ => Err(self.partial(None, ExpressionErrorKind::ExpectingValue)),
        }
    }

    /// Run a reference parser in argument position, turning its error
    /// node into a [`Partial`] so the enclosing parser stops too.
    pub(super) fn nested_reference(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<NodeId, NodeId>,
    ) -> Step {
        match parse(self) {
            Ok(node) => Ok(node),
            Err(node) => {
                let (kind, was_eof) = match self.builder.kind(node) {
                    ExprKind::IncompleteError { kind, was_eof, .. } => (*kind, *was_eof),
                    other => (
                        other
                            .error_kind()
                            .unwrap_or(ExpressionErrorKind::UnexpectedCharacter),
                        false,
                    ),
                };
                Err(Partial {
                    node: Some(node),
                    kind,
                    was_eof,
                })
            }
        }
    }

    pub(super) fn at_number(&self) -> bool {
        match self.peek_byte(0) {
            Some(b) if b.is_ascii_digit() => true,
            Some(b'-' | b'+') => self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()),
            _ => false,
        }
    }

    /// Integer, or float when the literal contains `.`. A dotted version
    /// such as `4.5.1` stays a text literal.
    pub(super) fn parse_number(&mut self) -> Step {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.')
        {
            self.bump();
        }

        let text = self.slice(start, self.pos);
        let kind = if is_version(text) {
            Some(ExprKind::Text {
                value: text.into(),
                is_pure: true,
            })
        } else if text.contains('.') {
            text.parse::<f64>().ok().map(ExprKind::ArgumentFloat)
        } else {
            text.parse::<i64>().ok().map(ExprKind::ArgumentInt)
        };

        match kind {
            Some(kind) => Ok(self.alloc(start, self.pos, kind)),
            None => {
                let partial = self.partial(None, ExpressionErrorKind::CouldNotParseNumber);
                let error = self.alloc(
                    start,
                    self.pos,
                    ExprKind::Error {
                        kind: ExpressionErrorKind::CouldNotParseNumber,
                    },
                );
                Err(Partial {
                    node: Some(error),
                    ..partial
                })
            }
        }
    }

    /// A quoted string whose contents are parsed as a nested expression.
    /// The cursor is on the opening quote.
    pub(super) fn parse_quoted(&mut self, options: ExpressionOptions) -> Step {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.partial(None, ExpressionErrorKind::ExpectingValue));
        };
        let content_start = self.pos;

        match self.find_closing_quote(content_start, quote) {
            Some(close) => {
                let expression = self.parse_nested(content_start, close, options);
                self.pos = close + 1;
                Ok(self.alloc(start, self.pos, ExprKind::QuotedString { quote, expression }))
            }
            None => {
                let end = self.end;
                let expression = self.parse_nested(content_start, end, options);
                self.pos = end;
                let node = self.alloc(start, end, ExprKind::QuotedString { quote, expression });
                Err(Partial {
                    node: Some(node),
                    kind: ExpressionErrorKind::IncompleteString,
                    was_eof: true,
                })
            }
        }
    }
}

/// `major.minor.build[.revision]`: at least three numeric parts.
fn is_version(text: &str) -> bool {
    let parts: Vec<&str> = text.split('.').collect();
    parts.len() >= 3 && parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}
