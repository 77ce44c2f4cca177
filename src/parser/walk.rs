//! Navigation helpers over a finished [`ExpressionTree`].

use smol_str::SmolStr;

use super::ast::{ExprKind, ExpressionTree, NodeId};
use crate::base::TextSize;

impl ExpressionTree {
    /// Pre-order walk starting at (and including) `id`.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![id];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.kind(next).children().into_iter().rev());
            Some(next)
        })
    }

    /// Every node in the tree, pre-order from the root.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root())
    }

    /// Parents of `id`, nearest first. Does not include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&node| self.parent(node))
    }

    /// The deepest node whose range covers `offset`. Range ends are
    /// inclusive so a cursor sitting just after a name still finds it.
    pub fn node_at(&self, offset: TextSize) -> Option<NodeId> {
        let covers = |id: NodeId| {
            let range = self.range(id);
            range.start() <= offset && offset <= range.end()
        };
        let root = self.root();
        if !covers(root) {
            return None;
        }

        let mut current = root;
        loop {
            let children = self.kind(current).children();
            let strict = children.iter().copied().find(|&child| {
                let range = self.range(child);
                range.start() <= offset && offset < range.end()
            });
            match strict.or_else(|| children.iter().copied().find(|&child| covers(child))) {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Error and incomplete nodes, in pre-order.
    pub fn errors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().filter(|&id| self.kind(id).is_error())
    }

    /// Error nodes that are not nested inside another error node.
    pub fn outermost_errors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.errors()
            .filter(|&id| !self.ancestors(id).any(|a| self.kind(a).is_error()))
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// The name of an `ItemName` node, or of the item an `Item` references.
    pub fn item_name(&self, id: NodeId) -> Option<&SmolStr> {
        match self.kind(id) {
            ExprKind::ItemName { name } => Some(name),
            ExprKind::Item { body } => self.item_name(*body),
            ExprKind::ItemFunction { target, .. } | ExprKind::ItemTransform { target, .. } => {
                self.item_name(*target)
            }
            _ => None,
        }
    }

    /// The name of a `PropertyName` node or of a plain `$(Name)`.
    pub fn property_name(&self, id: NodeId) -> Option<&SmolStr> {
        match self.kind(id) {
            ExprKind::PropertyName { name } => Some(name),
            ExprKind::Property { body } => self.property_name(*body),
            _ => None,
        }
    }

    /// For an unqualified `%(Name)` inside an item transform or item
    /// function argument, the item the metadata implicitly belongs to.
    pub fn enclosing_item_name(&self, id: NodeId) -> Option<&SmolStr> {
        self.ancestors(id).find_map(|ancestor| match self.kind(ancestor) {
            ExprKind::ItemTransform { target, .. } | ExprKind::ItemFunction { target, .. } => {
                self.item_name(*target)
            }
            _ => None,
        })
    }

    /// Whether `id` is the whole value or a whole list entry, as opposed
    /// to a fragment of a larger concatenation.
    pub fn is_whole_value(&self, id: NodeId) -> bool {
        match self.parent(id) {
            None => true,
            Some(parent) => matches!(self.kind(parent), ExprKind::List { .. }),
        }
    }
}
