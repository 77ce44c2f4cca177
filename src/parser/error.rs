//! Expression syntax error kinds.
//!
//! These never surface as `Err`: the parser records them in
//! [`ExprKind::Error`](super::ExprKind::Error) and
//! [`ExprKind::IncompleteError`](super::ExprKind::IncompleteError) nodes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionErrorKind {
    EmptyListEntry,
    ItemsDisallowed,
    MetadataDisallowed,
    ExpectingPropertyName,
    ExpectingItemName,
    ExpectingMetadataName,
    ExpectingMetadataOrItemName,
    ExpectingRightParen,
    ExpectingRightParenOrPeriod,
    ExpectingRightParenOrDash,
    ExpectingRightParenOrComma,
    ExpectingRightBracket,
    ExpectingClassName,
    ExpectingBracketColonColon,
    ExpectingMethodName,
    ExpectingMethodOrTransform,
    ExpectingValue,
    IncompleteString,
    CouldNotParseNumber,
    UnexpectedCharacter,
}

impl ExpressionErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::EmptyListEntry => "Empty list value",
            Self::ItemsDisallowed => "Item references are not allowed in this context",
            Self::MetadataDisallowed => "Metadata references are not allowed in this context",
            Self::ExpectingPropertyName => "Expecting property name",
            Self::ExpectingItemName => "Expecting item name",
            Self::ExpectingMetadataName => "Expecting metadata name",
            Self::ExpectingMetadataOrItemName => "Expecting metadata or item name",
            Self::ExpectingRightParen => "Expecting ')'",
            Self::ExpectingRightParenOrPeriod => "Expecting ')' or '.'",
            Self::ExpectingRightParenOrDash => "Expecting ')' or '->'",
            Self::ExpectingRightParenOrComma => "Expecting ')' or ','",
            Self::ExpectingRightBracket => "Expecting ']'",
            Self::ExpectingClassName => "Expecting class name",
            Self::ExpectingBracketColonColon => "Expecting ']::'",
            Self::ExpectingMethodName => "Expecting method name",
            Self::ExpectingMethodOrTransform => "Expecting item function or transform",
            Self::ExpectingValue => "Expecting value",
            Self::IncompleteString => "Incomplete string literal",
            Self::CouldNotParseNumber => "Invalid numeric value",
            Self::UnexpectedCharacter => "Unexpected character",
        }
    }
}

impl fmt::Display for ExpressionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
