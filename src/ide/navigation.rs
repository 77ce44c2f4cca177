//! Jump targets: file paths written in values, and the files behind
//! imports and SDK references.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use crate::base::TextRange;
use crate::dom::{XDocument, XNodeId};
use crate::hir::{Annotation, AnnotationKind};
use crate::parser::{ExprKind, ExpressionTree};
use crate::project::{RootDocument, evaluate_node, file_property, normalize, to_native, unescape};
use crate::visitor::{DocumentVisitor, ValueSite, VisitContext, literal_entries, walk_document};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub range: TextRange,
    pub paths: Vec<PathBuf>,
}

/// Navigable spans of `root`, ordered by position.
pub fn navigation_targets(root: &RootDocument) -> Vec<NavigationTarget> {
    let mut collector = NavigationCollector {
        root,
        base: root.filename().parent().map(Path::to_path_buf).unwrap_or_default(),
        targets: Vec::new(),
    };
    let cx = VisitContext::new(root.xml(), root.text(), root.filename());
    walk_document(&mut collector, &cx);

    let mut targets = collector.targets;
    let annotations = root.document().annotations();
    for (node, annotation) in annotations.nodes(AnnotationKind::Imports) {
        if let Annotation::Imports(imports) = annotation {
            let paths: Vec<PathBuf> = imports
                .iter()
                .filter(|import| import.is_resolved())
                .map(|import| import.filename().to_path_buf())
                .collect();
            if !paths.is_empty() {
                targets.push(NavigationTarget {
                    range: node_range(root.xml(), node),
                    paths,
                });
            }
        }
    }
    for (node, annotation) in annotations.nodes(AnnotationKind::Sdk) {
        if let Annotation::Sdk { path: Some(path), .. } = annotation {
            targets.push(NavigationTarget {
                range: node_range(root.xml(), node),
                paths: vec![path.clone()],
            });
        }
    }
    targets.sort_by_key(|target| (target.range.start(), target.range.end()));
    targets.dedup();
    targets
}

fn node_range(xml: &XDocument, node: XNodeId) -> TextRange {
    match node {
        XNodeId::Element(id) => xml.element(id).name_range,
        XNodeId::Attribute(id) => xml.attribute(id).value_range,
    }
}

struct NavigationCollector<'a> {
    root: &'a RootDocument,
    base: PathBuf,
    targets: Vec<NavigationTarget>,
}

impl NavigationCollector<'_> {
    fn wants(&self, site: &ValueSite) -> bool {
        site.kind().is_path()
            && self
                .root
                .document()
                .annotations()
                .get(site.node(), AnnotationKind::Imports)
                .is_none()
    }

    fn add_if_exists(&mut self, path: &str, range: TextRange) {
        if path.trim().is_empty() {
            return;
        }
        let path = normalize(&self.base.join(to_native(path.trim())));
        if path.exists() {
            self.targets.push(NavigationTarget {
                range,
                paths: vec![path],
            });
        }
    }

    fn lookup(&self, name: &str) -> Option<SmolStr> {
        file_property(name, self.root.filename())
            .map(SmolStr::from)
            .or_else(|| self.root.property_values().values(name).first().cloned())
    }
}

impl DocumentVisitor for NavigationCollector<'_> {
    fn visit_value_expression(&mut self, _cx: &VisitContext<'_>, site: &ValueSite, tree: &ExpressionTree) {
        if !self.wants(site) || tree.has_errors() {
            return;
        }
        let entries = match tree.kind(tree.root()) {
            ExprKind::List { entries } => entries.clone(),
            _ => vec![tree.root()],
        };
        for entry in entries {
            if let Some(path) = evaluate_node(tree, entry, |name| self.lookup(name)) {
                self.add_if_exists(&path, tree.range(entry));
            }
        }
    }

    fn visit_literal_value(&mut self, _cx: &VisitContext<'_>, site: &ValueSite, value: &str, range: TextRange) {
        if !self.wants(site) {
            return;
        }
        for (entry, entry_range) in literal_entries(site, value, range) {
            self.add_if_exists(&unescape(entry), entry_range);
        }
    }
}
