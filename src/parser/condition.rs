//! Condition grammar.
//!
//! ```text
//! or         := and ('or' and)*
//! and        := unary ('and' unary)*
//! unary      := ('!' | 'not') unary | comparison
//! comparison := operand (op operand)?
//! operand    := '(' or ')' | quoted | $() | @() | %() | number | func '(' args ')' | word
//! ```
//!
//! Keywords are case-insensitive. `&lt;` and `&gt;` are accepted for the
//! relational operators since conditions often come straight out of XML.

use smol_str::SmolStr;

use super::arguments::bool_literal;
use super::ast::{ConditionOperator, ExprKind, ExpressionTree, NodeId};
use super::error::ExpressionErrorKind;
use super::expression::{Parser, Partial, Step, is_name_start, is_quote};
use super::options::ExpressionOptions;
use crate::base::TextSize;

const COMPARISONS: &[(&str, ConditionOperator)] = &[
    ("==", ConditionOperator::Equal),
    ("!=", ConditionOperator::NotEqual),
    ("<=", ConditionOperator::LessOrEqual),
    (">=", ConditionOperator::GreaterOrEqual),
    ("&lt;=", ConditionOperator::LessOrEqual),
    ("&gt;=", ConditionOperator::GreaterOrEqual),
    ("<", ConditionOperator::Less),
    (">", ConditionOperator::Greater),
    ("&lt;", ConditionOperator::Less),
    ("&gt;", ConditionOperator::Greater),
];

const OPERAND_OPTIONS: ExpressionOptions = ExpressionOptions::ITEMS_AND_METADATA;

/// Parse a `Condition` attribute value.
pub fn parse_condition(text: &str, base_offset: TextSize) -> ExpressionTree {
    let mut parser = Parser::new(text, base_offset);
    let root = parser.parse_condition_root();
    parser.finish(root)
}

impl<'a> Parser<'a> {
    fn parse_condition_root(&mut self) -> NodeId {
        self.skip_ws();
        let start = self.pos;
        if self.at_eof() {
            return self.alloc(
                start,
                start,
                ExprKind::Text {
                    value: SmolStr::default(),
                    is_pure: true,
                },
            );
        }

        match self.parse_or() {
            Ok(node) => {
                self.skip_ws();
                if self.at_eof() {
                    return node;
                }
                let range = self.builder.range(node);
                self.alloc_range(
                    range,
                    ExprKind::IncompleteError {
                        kind: ExpressionErrorKind::UnexpectedCharacter,
                        was_eof: false,
                        node,
                    },
                )
            }
            Err(Partial {
                node: Some(node),
                kind,
                was_eof,
            }) => {
                if self.builder.kind(node).is_error() {
                    return node;
                }
                let range = self.builder.range(node);
                self.alloc_range(range, ExprKind::IncompleteError { kind, was_eof, node })
            }
            Err(Partial { node: None, kind, .. }) => {
                let at = self.pos;
                let end = if self.at_eof() { at } else { at + self.peek().map_or(0, char::len_utf8) };
                self.alloc(at, end, ExprKind::Error { kind })
            }
        }
    }

    fn parse_or(&mut self) -> Step {
        self.parse_logical("or", ConditionOperator::Or, Self::parse_and)
    }

    fn parse_and(&mut self) -> Step {
        self.parse_logical("and", ConditionOperator::And, Self::parse_unary)
    }

    fn parse_logical(
        &mut self,
        keyword: &str,
        op: ConditionOperator,
        operand: fn(&mut Self) -> Step,
    ) -> Step {
        let mut left = operand(self)?;
        loop {
            let before = self.pos;
            self.skip_ws();
            if !self.at_keyword(keyword) {
                self.pos = before;
                return Ok(left);
            }
            self.pos += keyword.len();

            let start = self.node_start(left);
            match operand(self) {
                Ok(right) => {
                    left = self.alloc(
                        start,
                        self.pos,
                        ExprKind::ConditionBinary {
                            op,
                            left,
                            right: Some(right),
                        },
                    );
                }
                Err(Partial {
                    node,
                    kind,
                    was_eof,
                }) => {
                    let binary = self.alloc(
                        start,
                        self.pos,
                        ExprKind::ConditionBinary {
                            op,
                            left,
                            right: node,
                        },
                    );
                    return Err(Partial {
                        node: Some(binary),
                        kind,
                        was_eof,
                    });
                }
            }
        }
    }

    fn parse_unary(&mut self) -> Step {
        self.skip_ws();
        let start = self.pos;
        let negated = if self.peek() == Some('!') && self.peek_byte(1) != Some(b'=') {
            self.bump();
            true
        } else if self.at_keyword("not") {
            self.pos += 3;
            true
        } else {
            false
        };
        if !negated {
            return self.parse_comparison();
        }

        match self.parse_unary() {
            Ok(operand) => Ok(self.alloc(
                start,
                self.pos,
                ExprKind::ConditionNot {
                    operand: Some(operand),
                },
            )),
            Err(Partial {
                node,
                kind,
                was_eof,
            }) => {
                let not = self.alloc(start, self.pos, ExprKind::ConditionNot { operand: node });
                Err(Partial {
                    node: Some(not),
                    kind,
                    was_eof,
                })
            }
        }
    }

    fn parse_comparison(&mut self) -> Step {
        let left = self.parse_operand()?;
        let before = self.pos;
        self.skip_ws();
        let Some(&(token, op)) = COMPARISONS.iter().find(|(token, _)| self.at_str(token)) else {
            self.pos = before;
            return Ok(left);
        };
        self.pos += token.len();

        let start = self.node_start(left);
        let (right, failure) = match self.parse_operand() {
            Ok(right) => (Some(right), None),
            Err(Partial {
                node,
                kind,
                was_eof,
            }) => (node, Some((kind, was_eof))),
        };
        let binary = self.alloc(start, self.pos, ExprKind::ConditionBinary { op, left, right });
        match failure {
            None => Ok(binary),
            Some((kind, was_eof)) => Err(Partial {
                node: Some(binary),
                kind,
                was_eof,
            }),
        }
    }

    fn parse_operand(&mut self) -> Step {
        self.skip_ws();
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Err(self.partial(None, ExpressionErrorKind::ExpectingValue));
        };

        match c {
            '(' => self.parse_group(),
            c if is_quote(c) => self.parse_quoted(OPERAND_OPTIONS),
            '$' if self.at_reference(b'$') => {
                self.nested_reference(|p| p.parse_property(OPERAND_OPTIONS))
            }
            '@' if self.at_reference(b'@') => self.nested_reference(|p| p.parse_item(OPERAND_OPTIONS)),
            '%' if self.at_reference(b'%') => self.nested_reference(|p| p.parse_metadata()),
            _ if self.at_number() => self.parse_number(),
            c if is_name_start(c) => {
                let Some(word) = self.scan_dotted_name() else {
                    return Err(self.partial(None, ExpressionErrorKind::UnexpectedCharacter));
                };
                let word_end = self.pos;
                self.skip_ws();
                if self.peek() == Some('(') {
                    return self.parse_condition_function(start, word_end, word);
                }
                self.pos = word_end;
                let kind = match bool_literal(&word) {
                    Some(value) => ExprKind::ArgumentBool(value),
                    None => ExprKind::Text {
                        value: word,
                        is_pure: true,
                    },
                };
                Ok(self.alloc(start, word_end, kind))
            }
            _ => Err(self.partial(None, ExpressionErrorKind::UnexpectedCharacter)),
        }
    }

    fn parse_group(&mut self) -> Step {
        let start = self.pos;
        self.bump();
        let (inner, failure) = match self.parse_or() {
            Ok(inner) => {
                self.skip_ws();
                if self.eat(')') {
                    (Some(inner), None)
                } else {
                    let partial = self.partial(None, ExpressionErrorKind::ExpectingRightParen);
                    (Some(inner), Some((partial.kind, partial.was_eof)))
                }
            }
            Err(Partial {
                node,
                kind,
                was_eof,
            }) => (node, Some((kind, was_eof))),
        };
        let group = self.alloc(start, self.pos, ExprKind::ConditionGroup { inner });
        match failure {
            None => Ok(group),
            Some((kind, was_eof)) => Err(Partial {
                node: Some(group),
                kind,
                was_eof,
            }),
        }
    }

    fn parse_condition_function(&mut self, start: usize, name_end: usize, name: SmolStr) -> Step {
        let name = self.alloc(start, name_end, ExprKind::FunctionName { name });
        let (arguments, failure) = match self.parse_argument_list('(', ')', OPERAND_OPTIONS) {
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
            ExprKind::ConditionFunction { name, arguments },
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
}
