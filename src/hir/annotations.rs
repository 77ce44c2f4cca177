//! Side table of facts attached to DOM nodes.
//!
//! Keyed by [`XNodeId`] and owned by the document generation that produced
//! it, so the whole table goes away with the document. A node holds at
//! most one annotation per [`AnnotationKind`]; inserting another of the
//! same kind replaces it.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::import::{Import, SdkReference};
use crate::dom::XNodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Imports,
    Sdk,
}

#[derive(Debug, Clone)]
pub enum Annotation {
    /// Imports contributed by an `Import` element or an SDK reference.
    Imports(Vec<Arc<Import>>),
    /// The SDK a node refers to and its resolved directory.
    Sdk {
        reference: SdkReference,
        path: Option<PathBuf>,
    },
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Imports(_) => AnnotationKind::Imports,
            Annotation::Sdk { .. } => AnnotationKind::Sdk,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Annotations {
    map: FxHashMap<XNodeId, Vec<Annotation>>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: impl Into<XNodeId>, annotation: Annotation) {
        let kind = annotation.kind();
        let slot = self.map.entry(node.into()).or_default();
        match slot.iter_mut().find(|a| a.kind() == kind) {
            Some(existing) => *existing = annotation,
            None => slot.push(annotation),
        }
    }

    pub fn get(&self, node: impl Into<XNodeId>, kind: AnnotationKind) -> Option<&Annotation> {
        self.map.get(&node.into())?.iter().find(|a| a.kind() == kind)
    }

    pub fn all(&self, node: impl Into<XNodeId>) -> &[Annotation] {
        self.map.get(&node.into()).map_or(&[][..], Vec::as_slice)
    }

    pub fn imports(&self, node: impl Into<XNodeId>) -> &[Arc<Import>] {
        match self.get(node, AnnotationKind::Imports) {
            Some(Annotation::Imports(imports)) => imports,
            _ => &[],
        }
    }

    /// Nodes carrying an annotation of `kind`, in no particular order.
    pub fn nodes(&self, kind: AnnotationKind) -> impl Iterator<Item = (XNodeId, &Annotation)> + '_ {
        self.map.iter().filter_map(move |(node, annotations)| {
            annotations.iter().find(|a| a.kind() == kind).map(|a| (*node, a))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
