//! Arena-allocated expression AST.
//!
//! Every node lives in the [`ExpressionTree`] that produced it and is
//! addressed by a [`NodeId`]. Nodes carry absolute source ranges and a
//! parent link that is assigned exactly once, when the parent node is
//! allocated. Once [`TreeBuilder::finish`] runs the tree is immutable.

use smol_str::SmolStr;

use super::error::ExpressionErrorKind;
use crate::base::{TextRange, TextSize};

/// Index of a node inside its [`ExpressionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A name fragment with its own source range (used by metadata references).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePart {
    pub name: SmolStr,
    pub range: TextRange,
}

impl NamePart {
    pub fn new(name: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Binary operators of the condition grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    And,
    Or,
}

impl ConditionOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    pub fn is_comparison(self) -> bool {
        !matches!(self, Self::And | Self::Or)
    }
}

/// The closed set of expression node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal text. `is_pure` is set when the text is the whole value (or
    /// the whole list entry) rather than one part of a concatenation.
    Text { value: SmolStr, is_pure: bool },
    /// Implicit juxtaposition of literal text and references.
    Concat { parts: Vec<NodeId> },
    /// Entries of a `;` or `,` separated list.
    List { entries: Vec<NodeId> },

    /// `$(...)`
    Property { body: NodeId },
    PropertyName { name: SmolStr },
    /// `target.Method(args)`, `target.Getter`, `target[args]`, or
    /// `[Class]::Method(args)` when the target is a [`ExprKind::ClassReference`].
    PropertyFunction {
        target: NodeId,
        method: Option<NodeId>,
        arguments: Option<NodeId>,
        is_indexer: bool,
    },
    /// `$(registry:Key@Value)`
    PropertyRegistryValue { key: SmolStr },
    /// `[System.IO.Path]`
    ClassReference { name: SmolStr },

    /// `@(...)`
    Item { body: NodeId },
    ItemName { name: SmolStr },
    /// `@(Name->Method(args))` or `@(Name.Method(args))`
    ItemFunction {
        target: NodeId,
        method: Option<NodeId>,
        arguments: Option<NodeId>,
    },
    /// `@(Name->'transform', 'separator')`
    ItemTransform {
        target: NodeId,
        transform: Option<NodeId>,
        separator: Option<NodeId>,
    },

    /// `%(Item.Name)`, `%(Item->Name)` or `%(Name)`
    Metadata {
        item: Option<NamePart>,
        name: NamePart,
        uses_arrow: bool,
    },

    FunctionName { name: SmolStr },
    ArgumentList { arguments: Vec<NodeId> },
    ArgumentBool(bool),
    ArgumentInt(i64),
    ArgumentFloat(f64),
    /// A quoted string whose contents are parsed as a nested expression.
    QuotedString { quote: char, expression: NodeId },

    ConditionBinary {
        op: ConditionOperator,
        left: NodeId,
        right: Option<NodeId>,
    },
    ConditionNot { operand: Option<NodeId> },
    ConditionGroup { inner: Option<NodeId> },
    /// `Exists('...')`, `HasTrailingSlash('...')`
    ConditionFunction {
        name: NodeId,
        arguments: Option<NodeId>,
    },

    Error { kind: ExpressionErrorKind },
    /// A node that stopped early. `node` is everything built before the
    /// parser hit the problem; `was_eof` is set when that happened because
    /// the input ran out.
    IncompleteError {
        kind: ExpressionErrorKind,
        was_eof: bool,
        node: NodeId,
    },
}

impl ExprKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Text { .. }
            | Self::PropertyName { .. }
            | Self::PropertyRegistryValue { .. }
            | Self::ClassReference { .. }
            | Self::ItemName { .. }
            | Self::Metadata { .. }
            | Self::FunctionName { .. }
            | Self::ArgumentBool(_)
            | Self::ArgumentInt(_)
            | Self::ArgumentFloat(_)
            | Self::Error { .. } => Vec::new(),
            Self::Concat { parts } => parts.clone(),
            Self::List { entries } => entries.clone(),
            Self::ArgumentList { arguments } => arguments.clone(),
            Self::Property { body } | Self::Item { body } => vec![*body],
            Self::QuotedString { expression, .. } => vec![*expression],
            Self::IncompleteError { node, .. } => vec![*node],
            Self::PropertyFunction {
                target,
                method,
                arguments,
                ..
            }
            | Self::ItemFunction {
                target,
                method,
                arguments,
            } => std::iter::once(*target)
                .chain(*method)
                .chain(*arguments)
                .collect(),
            Self::ItemTransform {
                target,
                transform,
                separator,
            } => std::iter::once(*target)
                .chain(*transform)
                .chain(*separator)
                .collect(),
            Self::ConditionBinary { left, right, .. } => {
                std::iter::once(*left).chain(*right).collect()
            }
            Self::ConditionNot { operand } => operand.iter().copied().collect(),
            Self::ConditionGroup { inner } => inner.iter().copied().collect(),
            Self::ConditionFunction { name, arguments } => {
                std::iter::once(*name).chain(*arguments).collect()
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::IncompleteError { .. })
    }

    /// The error kind, for either flavour of error node.
    pub fn error_kind(&self) -> Option<ExpressionErrorKind> {
        match self {
            Self::Error { kind } | Self::IncompleteError { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// A single node: its absolute range, parent link, and variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    range: TextRange,
    parent: Option<NodeId>,
    kind: ExprKind,
}

impl ExprNode {
    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn offset(&self) -> TextSize {
        self.range.start()
    }

    pub fn length(&self) -> TextSize {
        self.range.len()
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }
}

/// An immutable parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    nodes: Vec<ExprNode>,
    root: NodeId,
}

impl ExpressionTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &ExprNode {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> &ExprNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &ExprKind {
        &self.node(id).kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Allocates nodes bottom-up and wires parent links.
#[derive(Debug, Default)]
pub(super) struct TreeBuilder {
    nodes: Vec<ExprNode>,
}

impl TreeBuilder {
    pub(super) fn alloc(&mut self, range: TextRange, kind: ExprKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in kind.children() {
            let slot = &mut self.nodes[child.index()].parent;
            debug_assert!(slot.is_none(), "expression node re-parented");
            *slot = Some(id);
        }
        self.nodes.push(ExprNode {
            range,
            parent: None,
            kind,
        });
        id
    }

    pub(super) fn kind(&self, id: NodeId) -> &ExprKind {
        &self.nodes[id.index()].kind
    }

    pub(super) fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.index()].range
    }

    pub(super) fn finish(self, root: NodeId) -> ExpressionTree {
        ExpressionTree {
            nodes: self.nodes,
            root,
        }
    }
}
