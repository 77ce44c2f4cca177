//! The root document: a project file plus its resolved import graph.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::error::DocumentError;
use super::resolver::BuildContext;
use super::session::ParseSession;
use crate::base::{LineIndex, SymbolName};
use crate::dom::XDocument;
use crate::hir::{Diagnostic, MSBuildDocument, PropertyValueCollector, Symbol, build_document};
use crate::schema::DocumentSchema;

/// A toplevel project file after a full build.
///
/// Keeps the source text and XML tree so that position queries
/// ([`resolve_at`](crate::ide::resolve_at)) and validation can run without
/// reparsing. Pass it as `previous` to the next [`RootDocument::parse`] to
/// reuse unchanged imports.
#[derive(Debug)]
pub struct RootDocument {
    document: MSBuildDocument,
    text: String,
    xml: XDocument,
    line_index: LineIndex,
    property_values: PropertyValueCollector,
    schema: Option<Arc<DocumentSchema>>,
}

impl RootDocument {
    /// Build the document for `text`, resolving its imports.
    ///
    /// Fails only when the session is cancelled; everything else ends up
    /// in [`errors`](Self::errors).
    pub fn parse(
        filename: impl Into<PathBuf>,
        text: impl Into<String>,
        previous: Option<&RootDocument>,
        session: &ParseSession,
    ) -> Result<Self, DocumentError> {
        let filename = filename.into();
        let text = text.into();
        if session.is_cancelled() {
            return Err(DocumentError::Cancelled);
        }

        let xml = XDocument::parse(&text);
        let mut context = BuildContext::new(session, &filename, previous.map(|p| &p.document));
        let mut document = build_document(&filename, &text, &xml, true, &mut context);
        if context.is_cancelled() {
            return Err(DocumentError::Cancelled);
        }
        apply_task_metadata(&mut document, session);

        tracing::debug!(
            path = %filename.display(),
            imports = document.imports().count(),
            errors = document.errors().len(),
            "built root document"
        );
        let line_index = LineIndex::new(&text);
        let schema = session.schema_for(&filename);
        Ok(Self {
            document,
            text,
            xml,
            line_index,
            property_values: context.into_property_values(),
            schema,
        })
    }

    /// Read `path` and [`parse`](Self::parse) it.
    pub fn load(
        path: impl AsRef<Path>,
        previous: Option<&RootDocument>,
        session: &ParseSession,
    ) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, text, previous, session)
    }

    pub fn document(&self) -> &MSBuildDocument {
        &self.document
    }

    pub fn filename(&self) -> &Path {
        self.document.filename()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn xml(&self) -> &XDocument {
        &self.xml
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Values of watched properties learned across the whole graph.
    pub fn property_values(&self) -> &PropertyValueCollector {
        &self.property_values
    }

    /// The schema the host supplied for this file, if any.
    pub fn schema(&self) -> Option<&DocumentSchema> {
        self.schema.as_deref()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        self.document.errors()
    }

    // ========================================================================
    // GRAPH QUERIES
    // ========================================================================

    /// The root document followed by every document in its import graph,
    /// depth first in import order. Each file appears once.
    pub fn all_documents(&self) -> Vec<&MSBuildDocument> {
        let mut seen: FxHashSet<&Path> = FxHashSet::default();
        let mut documents = Vec::new();
        let mut stack = vec![&self.document];
        while let Some(document) = stack.pop() {
            if !seen.insert(document.filename()) {
                continue;
            }
            documents.push(document);
            let mut nested: Vec<&MSBuildDocument> = document.imported_documents().map(Arc::as_ref).collect();
            nested.reverse();
            stack.extend(nested);
        }
        documents
    }

    pub fn get_items(&self) -> Vec<&str> {
        self.collect_names(|document| document.get_items())
    }

    pub fn get_properties(&self) -> Vec<&str> {
        self.collect_names(|document| document.get_properties())
    }

    pub fn get_tasks(&self) -> Vec<&str> {
        self.collect_names(|document| document.get_tasks())
    }

    pub fn get_targets(&self) -> Vec<&str> {
        self.collect_names(|document| document.get_targets())
    }

    pub fn get_metadata(&self, item: &str) -> Vec<&str> {
        self.collect_names(|document| document.get_metadata(item))
    }

    pub fn get_task_parameters(&self, task: &str) -> Vec<&str> {
        self.collect_names(|document| document.get_task_parameters(task))
    }

    pub fn contains(&self, symbol: Symbol<'_>) -> bool {
        self.all_documents().iter().any(|document| document.contains(symbol))
    }

    /// Files in the graph whose table contains `symbol`.
    pub fn files_seen_in(&self, symbol: Symbol<'_>) -> Vec<PathBuf> {
        self.all_documents()
            .into_iter()
            .filter(|document| document.contains(symbol))
            .map(|document| document.filename().to_path_buf())
            .collect()
    }

    fn collect_names<'a, I, F>(&'a self, names: F) -> Vec<&'a str>
    where
        F: Fn(&'a MSBuildDocument) -> I,
        I: Iterator<Item = &'a str>,
    {
        let mut seen = FxHashSet::default();
        self.all_documents()
            .into_iter()
            .flat_map(names)
            .filter(|name| seen.insert(SymbolName::new(*name)))
            .collect()
    }
}

/// Fill in task declarations the host knows about from compiled task
/// assemblies.
fn apply_task_metadata(document: &mut MSBuildDocument, session: &ParseSession) {
    let names: Vec<SmolStr> = document.symbols.tasks().map(|task| task.name.clone()).collect();
    for name in names {
        let Some(info) = session.task_metadata(&name, document.filename()) else {
            continue;
        };
        let task = document.symbols.add_task(&name);
        if task.description.is_none() {
            task.description = info.description;
        }
        for (key, parameter) in info.parameters {
            task.parameters.entry(key).or_insert(parameter);
        }
    }
}
