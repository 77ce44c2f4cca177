//! `$(...)`, `@(...)` and `%(...)` sub-parsers.

use smol_str::SmolStr;

use super::ast::{ExprKind, NamePart, NodeId};
use super::error::ExpressionErrorKind;
use super::expression::{Parser, Partial, Step, is_name_start, is_quote};
use super::options::ExpressionOptions;

/// Which function node a method call on a target produces.
#[derive(Clone, Copy)]
pub(super) enum Flavor {
    Property,
    Item,
}

impl Flavor {
    fn function(self, target: NodeId, method: Option<NodeId>, arguments: Option<NodeId>) -> ExprKind {
        match self {
            Flavor::Property => ExprKind::PropertyFunction {
                target,
                method,
                arguments,
                is_indexer: false,
            },
            Flavor::Item => ExprKind::ItemFunction {
                target,
                method,
                arguments,
            },
        }
    }
}

impl<'a> Parser<'a> {
    /// `$(` ... `)`. The cursor is on `$`.
    pub(super) fn parse_property(&mut self, options: ExpressionOptions) -> Result<NodeId, NodeId> {
        let start = self.pos;
        self.pos += 2;
        self.skip_ws();
        let result = self.parse_property_body(options.without_lists());
        self.finish_reference(
            start,
            result,
            |body| ExprKind::Property { body },
            || ExprKind::PropertyName {
                name: SmolStr::default(),
            },
        )
    }

    /// `@(` ... `)`. The cursor is on `@`.
    pub(super) fn parse_item(&mut self, options: ExpressionOptions) -> Result<NodeId, NodeId> {
        let start = self.pos;
        self.pos += 2;
        self.skip_ws();
        let result = self.parse_item_body(options.without_lists() | ExpressionOptions::ITEMS);
        self.finish_reference(
            start,
            result,
            |body| ExprKind::Item { body },
            || ExprKind::ItemName {
                name: SmolStr::default(),
            },
        )
    }

    /// `%(` ... `)`. The cursor is on `%`.
    pub(super) fn parse_metadata(&mut self) -> Result<NodeId, NodeId> {
        let start = self.pos;
        self.pos += 2;
        self.skip_ws();

        let first_start = self.pos;
        let Some(first) = self.scan_name() else {
            let empty = NamePart::new("", self.range(self.pos, self.pos));
            return Err(self.incomplete_metadata(
                start,
                None,
                empty,
                false,
                ExpressionErrorKind::ExpectingMetadataOrItemName,
            ));
        };
        let first = NamePart::new(first, self.range(first_start, self.pos));
        self.skip_ws();

        let uses_arrow = match self.peek() {
            Some(')') => {
                self.bump();
                let kind = ExprKind::Metadata {
                    item: None,
                    name: first,
                    uses_arrow: false,
                };
                return Ok(self.alloc(start, self.pos, kind));
            }
            Some('.') => {
                self.bump();
                false
            }
            Some('-') if self.peek_byte(1) == Some(b'>') => {
                self.pos += 2;
                true
            }
            _ => {
                return Err(self.incomplete_metadata(
                    start,
                    None,
                    first,
                    false,
                    ExpressionErrorKind::ExpectingRightParenOrPeriod,
                ));
            }
        };

        self.skip_ws();
        let name_start = self.pos;
        let Some(name) = self.scan_name() else {
            let empty = NamePart::new("", self.range(self.pos, self.pos));
            return Err(self.incomplete_metadata(
                start,
                Some(first),
                empty,
                uses_arrow,
                ExpressionErrorKind::ExpectingMetadataName,
            ));
        };
        let name = NamePart::new(name, self.range(name_start, self.pos));
        self.skip_ws();

        if self.eat(')') {
            let kind = ExprKind::Metadata {
                item: Some(first),
                name,
                uses_arrow,
            };
            Ok(self.alloc(start, self.pos, kind))
        } else {
            Err(self.incomplete_metadata(
                start,
                Some(first),
                name,
                uses_arrow,
                ExpressionErrorKind::ExpectingRightParen,
            ))
        }
    }

    fn incomplete_metadata(
        &mut self,
        start: usize,
        item: Option<NamePart>,
        name: NamePart,
        uses_arrow: bool,
        kind: ExpressionErrorKind,
    ) -> NodeId {
        let was_eof = self.at_eof();
        let node = self.alloc(
            start,
            self.pos,
            ExprKind::Metadata {
                item,
                name,
                uses_arrow,
            },
        );
        self.alloc(start, self.pos, ExprKind::IncompleteError { kind, was_eof, node })
    }

    /// Wrap a reference body, or whatever of it was built before an error.
    fn finish_reference(
        &mut self,
        start: usize,
        result: Step,
        wrap: impl FnOnce(NodeId) -> ExprKind,
        empty: impl FnOnce() -> ExprKind,
    ) -> Result<NodeId, NodeId> {
        match result {
            Ok(body) => Ok(self.alloc(start, self.pos, wrap(body))),
            Err(Partial {
                node,
                kind,
                was_eof,
            }) => {
                let body = match node {
                    Some(node) => node,
                    None => {
                        let at = self.pos;
                        self.alloc(at, at, empty())
                    }
                };
                let reference = self.alloc(start, self.pos, wrap(body));
                Err(self.alloc(
                    start,
                    self.pos,
                    ExprKind::IncompleteError {
                        kind,
                        was_eof,
                        node: reference,
                    },
                ))
            }
        }
    }

    // =========================================================================
    // Property bodies
    // =========================================================================

    fn parse_property_body(&mut self, options: ExpressionOptions) -> Step {
        if self.at_str_ignore_case("registry:") {
            return self.parse_registry_value();
        }

        let mut target = if self.peek() == Some('[') {
            self.parse_static_function(options)?
        } else {
            let start = self.pos;
            match self.scan_name() {
                Some(name) => self.alloc(start, self.pos, ExprKind::PropertyName { name }),
                None => {
                    return Err(self.partial(None, ExpressionErrorKind::ExpectingPropertyName));
                }
            }
        };

        loop {
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.bump();
                    return Ok(target);
                }
                Some('.') => {
                    self.bump();
                    target = self.parse_method(target, options, Flavor::Property)?;
                }
                Some('[') => target = self.parse_indexer(target, options)?,
                _ => {
                    return Err(
                        self.partial(Some(target), ExpressionErrorKind::ExpectingRightParenOrPeriod)
                    );
                }
            }
        }
    }

    fn parse_registry_value(&mut self) -> Step {
        let start = self.pos;
        self.pos += "registry:".len();
        let key_start = self.pos;
        while self.peek().is_some_and(|c| c != ')') {
            self.bump();
        }
        let key = SmolStr::new(self.slice(key_start, self.pos).trim());
        let node = self.alloc(start, self.pos, ExprKind::PropertyRegistryValue { key });
        if self.eat(')') {
            Ok(node)
        } else {
            Err(self.partial(Some(node), ExpressionErrorKind::ExpectingRightParen))
        }
    }

    /// `[Class]::Method(args)`
    fn parse_static_function(&mut self, options: ExpressionOptions) -> Step {
        let start = self.pos;
        self.bump();
        self.skip_ws();

        let Some(name) = self.scan_dotted_name() else {
            let class = self.alloc(
                start,
                self.pos,
                ExprKind::ClassReference {
                    name: SmolStr::default(),
                },
            );
            return Err(self.partial(Some(class), ExpressionErrorKind::ExpectingClassName));
        };
        self.skip_ws();

        let closed = self.eat(']');
        let class = self.alloc(start, self.pos, ExprKind::ClassReference { name });
        if !closed {
            return Err(self.partial(Some(class), ExpressionErrorKind::ExpectingRightBracket));
        }
        if !self.eat_str("::") {
            return Err(self.partial(Some(class), ExpressionErrorKind::ExpectingBracketColonColon));
        }
        self.parse_method(class, options, Flavor::Property)
    }

    /// The method name and optional argument list after `.`, `::` or `->`.
    fn parse_method(&mut self, target: NodeId, options: ExpressionOptions, flavor: Flavor) -> Step {
        let start = self.node_start(target);
        self.skip_ws();

        let name_start = self.pos;
        let Some(name) = self.scan_name() else {
            let partial = self.partial(None, ExpressionErrorKind::ExpectingMethodName);
            let function = self.alloc(start, self.pos, flavor.function(target, None, None));
            return Err(Partial {
                node: Some(function),
                ..partial
            });
        };
        let method = self.alloc(name_start, self.pos, ExprKind::FunctionName { name });

        let after_name = self.pos;
        self.skip_ws();
        let arguments = if self.peek() == Some('(') {
            match self.parse_argument_list('(', ')', options) {
                Ok(arguments) => Some(arguments),
                Err(Partial {
                    node,
                    kind,
                    was_eof,
                }) => {
                    let function =
                        self.alloc(start, self.pos, flavor.function(target, Some(method), node));
                    return Err(Partial {
                        node: Some(function),
                        kind,
                        was_eof,
                    });
                }
            }
        } else {
            self.pos = after_name;
            None
        };

        Ok(self.alloc(start, self.pos, flavor.function(target, Some(method), arguments)))
    }

    /// `target[args]`
    fn parse_indexer(&mut self, target: NodeId, options: ExpressionOptions) -> Step {
        let start = self.node_start(target);
        let (arguments, failure) = match self.parse_argument_list('[', ']', options) {
            Ok(arguments) => (Some(arguments), None),
            Err(Partial {
                node,
                kind,
                was_eof,
            }) => (node, Some((kind, was_eof))),
        };
        let function = self.alloc(
            start,
            self.pos,
            ExprKind::PropertyFunction {
                target,
                method: None,
                arguments,
                is_indexer: true,
            },
        );
        match failure {
            None => Ok(function),
            Some((kind, was_eof)) => Err(Partial {
                node: Some(function),
                kind,
                was_eof,
            }),
        }
    }

    // =========================================================================
    // Item bodies
    // =========================================================================

    fn parse_item_body(&mut self, options: ExpressionOptions) -> Step {
        let name_start = self.pos;
        let Some(name) = self.scan_name() else {
            return Err(self.partial(None, ExpressionErrorKind::ExpectingItemName));
        };
        let mut target = self.alloc(name_start, self.pos, ExprKind::ItemName { name });

        loop {
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.bump();
                    return Ok(target);
                }
                Some('-') if self.peek_byte(1) == Some(b'>') => {
                    self.pos += 2;
                    self.skip_ws();
                    target = match self.peek() {
                        Some(c) if is_quote(c) => self.parse_transform(target)?,
                        Some(c) if is_name_start(c) => {
                            self.parse_method(target, options, Flavor::Item)?
                        }
                        _ => {
                            return Err(self.partial(
                                Some(target),
                                ExpressionErrorKind::ExpectingMethodOrTransform,
                            ));
                        }
                    };
                }
                Some('.') => {
                    self.bump();
                    target = self.parse_method(target, options, Flavor::Item)?;
                }
                _ => {
                    return Err(
                        self.partial(Some(target), ExpressionErrorKind::ExpectingRightParenOrDash)
                    );
                }
            }
        }
    }

    /// `->'transform'` with an optional `, 'separator'`.
    fn parse_transform(&mut self, target: NodeId) -> Step {
        let start = self.node_start(target);
        let transform = match self.parse_quoted(ExpressionOptions::ITEMS_AND_METADATA) {
            Ok(transform) => transform,
            Err(Partial {
                node,
                kind,
                was_eof,
            }) => {
                let node = self.alloc(
                    start,
                    self.pos,
                    ExprKind::ItemTransform {
                        target,
                        transform: node,
                        separator: None,
                    },
                );
                return Err(Partial {
                    node: Some(node),
                    kind,
                    was_eof,
                });
            }
        };

        let after_transform = self.pos;
        self.skip_ws();
        if !self.eat(',') {
            self.pos = after_transform;
            return Ok(self.alloc(
                start,
                self.pos,
                ExprKind::ItemTransform {
                    target,
                    transform: Some(transform),
                    separator: None,
                },
            ));
        }

        self.skip_ws();
        let separator = match self.peek() {
            Some(c) if is_quote(c) => self.parse_quoted(ExpressionOptions::ITEMS_AND_METADATA),
            _ => Err(self.partial(None, ExpressionErrorKind::ExpectingValue)),
        };
        let (separator, failure) = match separator {
            Ok(separator) => (Some(separator), None),
            Err(Partial {
                node,
                kind,
                was_eof,
            }) => (node, Some((kind, was_eof))),
        };
        let node = self.alloc(
            start,
            self.pos,
            ExprKind::ItemTransform {
                target,
                transform: Some(transform),
                separator,
            },
        );
        match failure {
            None => Ok(node),
            Some((kind, was_eof)) => Err(Partial {
                node: Some(node),
                kind,
                was_eof,
            }),
        }
    }
}
