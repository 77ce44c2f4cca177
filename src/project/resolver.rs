//! The import resolution engine.
//!
//! [`BuildContext`] is the [`ImportContext`] used for real builds. It
//! evaluates import expressions against the property values collected so
//! far, expands wildcards, and parses each imported file into a nested
//! document, reusing unchanged documents from the previous generation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use glob::{MatchOptions, Pattern};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::evaluate::{evaluate, file_property, is_separator, normalize, permutations, to_native};
use super::session::ParseSession;
use crate::base::eq_ignore_case;
use crate::dom::XDocument;
use crate::hir::{
    Import, ImportContext, ImportRequest, MSBuildDocument, PropertyValueCollector, build_document,
};
use crate::parser::{ExprKind, ExpressionTree};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// State for one toplevel build: the files already in the graph, the
/// property values learned so far, and the previous generation's imports.
pub(crate) struct BuildContext<'s> {
    session: &'s ParseSession,
    project: PathBuf,
    previous: FxHashMap<PathBuf, Arc<Import>>,
    seen_files: FxHashSet<PathBuf>,
    collector: PropertyValueCollector,
    cancelled: bool,
}

impl<'s> BuildContext<'s> {
    pub(crate) fn new(session: &'s ParseSession, project: &Path, previous: Option<&MSBuildDocument>) -> Self {
        let project = normalize(project);
        let mut seen_files = FxHashSet::default();
        seen_files.insert(project.clone());
        Self {
            session,
            project,
            previous: previous.map(index_imports).unwrap_or_default(),
            seen_files,
            collector: PropertyValueCollector::new(session.options().watched_properties.iter().cloned()),
            cancelled: false,
        }
    }

    pub(crate) fn is_cancelled(&mut self) -> bool {
        if self.session.is_cancelled() {
            self.cancelled = true;
        }
        self.cancelled
    }

    pub(crate) fn into_property_values(self) -> PropertyValueCollector {
        self.collector
    }

    // ========================================================================
    // EVALUATION
    // ========================================================================

    fn lookup(&self, importer: &Path, permutation: &[(SmolStr, SmolStr)], name: &str) -> Option<SmolStr> {
        if let Some((_, value)) = permutation.iter().find(|(n, _)| eq_ignore_case(n, name)) {
            return Some(value.clone());
        }
        let is_project_property = name
            .get(.."MSBuildProject".len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("MSBuildProject"));
        let file = if is_project_property { self.project.as_path() } else { importer };
        if let Some(value) = file_property(name, file) {
            return Some(value.into());
        }
        self.session
            .options()
            .property(name)
            .cloned()
            .or_else(|| self.collector.values(name).first().cloned())
    }

    /// Evaluate `tree` once per combination of the values of the
    /// multi-valued properties it references. Results are deduplicated.
    fn evaluate_all(&self, importer: &Path, tree: &ExpressionTree) -> Vec<String> {
        let mut dimensions: Vec<(SmolStr, Vec<SmolStr>)> = Vec::new();
        for id in tree.nodes() {
            if let ExprKind::PropertyName { name } = tree.kind(id) {
                let values = self.collector.values(name);
                if values.len() > 1 && !dimensions.iter().any(|(n, _)| eq_ignore_case(n, name)) {
                    dimensions.push((name.clone(), values.to_vec()));
                }
            }
        }

        let mut results: Vec<String> = Vec::new();
        for permutation in permutations(&dimensions, self.session.options().max_permutations) {
            let Some(value) = evaluate(tree, |name| self.lookup(importer, &permutation, name)) else {
                continue;
            };
            if !results.contains(&value) {
                results.push(value);
            }
        }
        results
    }

    // ========================================================================
    // FILES
    // ========================================================================

    /// The files `candidate` stands for, relative to `base`. `None` if it
    /// names nothing; an empty list for a wildcard over an existing
    /// directory with no matches.
    ///
    /// The wildcard test looks at the evaluated text as written, before it
    /// is joined to `base`, so a pattern whose directory part evaluated to
    /// nothing (`$(Unset)/*.targets`) is not expanded.
    fn expand(&self, base: &Path, candidate: &str) -> Option<Vec<PathBuf>> {
        let options = self.session.options();
        match (candidate.find('*'), candidate.rfind(is_separator)) {
            (Some(star), Some(separator))
                if star >= options.wildcard_min_star
                    && separator >= options.wildcard_min_separator
                    && separator < star =>
            {
                let pattern = Pattern::new(&candidate[separator + 1..]).ok()?;
                let directory = normalize(&base.join(to_native(&candidate[..separator])));
                let entries = std::fs::read_dir(&directory).ok()?;
                let mut matches: Vec<PathBuf> = entries
                    .filter_map(Result::ok)
                    .map(|entry| entry.path())
                    .filter(|file| {
                        file.is_file()
                            && file
                                .file_name()
                                .and_then(|name| name.to_str())
                                .is_some_and(|name| pattern.matches_with(name, MATCH_OPTIONS))
                    })
                    .collect();
                matches.sort();
                Some(matches)
            }
            _ => {
                let path = normalize(&base.join(to_native(candidate)));
                path.is_file().then(|| vec![path])
            }
        }
    }

    fn import_file(&mut self, path: PathBuf, sdk: Option<SmolStr>) -> Option<Arc<Import>> {
        let time_stamp = match modified(&path) {
            Ok(time_stamp) => time_stamp,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "could not read import");
                return Some(Arc::new(Import::unresolved(&path.to_string_lossy(), sdk)));
            }
        };
        // Already in this graph: record the edge without descending again.
        if !self.seen_files.insert(path.clone()) {
            return Some(Arc::new(Import::resolved(path, sdk, time_stamp, None)));
        }

        let reusable = self
            .previous
            .get(&path)
            .filter(|previous| previous.is_reusable_for(&path, time_stamp) && is_fresh(previous))
            .cloned();
        if let Some(previous) = reusable {
            tracing::trace!(path = %path.display(), "reusing import from previous generation");
            self.replay(&previous);
            return Some(previous);
        }

        if self.is_cancelled() {
            return None;
        }
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "could not read import");
                return Some(Arc::new(Import::unresolved(&path.to_string_lossy(), sdk)));
            }
        };
        let xml = XDocument::parse(&text);
        let document = build_document(&path, &text, &xml, false, self);
        tracing::debug!(
            path = %path.display(),
            imports = document.imports().count(),
            "resolved import"
        );
        Some(Arc::new(Import::resolved(path, sdk, time_stamp, Some(Arc::new(document)))))
    }

    /// Account for a reused subgraph as if it had been parsed again.
    fn replay(&mut self, import: &Import) {
        let mut stack = vec![import];
        while let Some(import) = stack.pop() {
            if import.is_resolved() {
                self.seen_files.insert(import.filename().to_path_buf());
            }
            if let Some(document) = import.document() {
                for (name, value) in document.collected_values() {
                    self.collector.add(name, value);
                }
                stack.extend(document.imports().map(Arc::as_ref));
            }
        }
    }
}

impl ImportContext for BuildContext<'_> {
    fn resolve_import(&mut self, request: &ImportRequest<'_>) -> Vec<Arc<Import>> {
        if self.is_cancelled() {
            return Vec::new();
        }
        let sdk_name = request.sdk.map(|sdk| sdk.name.clone());
        let base = match request.sdk {
            Some(sdk) => match self.session.resolve_sdk(sdk, &self.project) {
                Some(directory) => directory,
                None => {
                    self.session.log_unresolved_once(&sdk.to_string(), request.importer);
                    return vec![Arc::new(Import::unresolved(request.text, sdk_name))];
                }
            },
            None => request.importer.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        let mut found = false;
        let mut files: Vec<PathBuf> = Vec::new();
        for candidate in self.evaluate_all(request.importer, request.expression) {
            let candidate = candidate.trim();
            if candidate.is_empty() {
                continue;
            }
            if let Some(expanded) = self.expand(&base, candidate) {
                found = true;
                for file in expanded {
                    if !files.contains(&file) {
                        files.push(file);
                    }
                }
            }
        }

        if !found {
            self.session.log_unresolved_once(request.text, request.importer);
            return vec![Arc::new(Import::unresolved(request.text, sdk_name))];
        }
        files
            .into_iter()
            .filter_map(|file| self.import_file(file, sdk_name.clone()))
            .collect()
    }

    fn is_watched(&self, property: &str) -> bool {
        self.collector.is_watched(property)
    }

    fn collect_property(&mut self, importer: &Path, name: &str, value: &ExpressionTree) -> Vec<SmolStr> {
        let mut learned = Vec::new();
        for value in self.evaluate_all(importer, value) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            self.collector.add(name, value);
            learned.push(SmolStr::from(value));
        }
        learned
    }
}

fn modified(path: &Path) -> std::io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

/// Whether every file below `import` still has the time stamp it was
/// parsed with.
fn is_fresh(import: &Import) -> bool {
    let Some(document) = import.document() else {
        return false;
    };
    document.imports().filter(|nested| nested.is_resolved()).all(|nested| {
        modified(nested.filename()).is_ok_and(|time| nested.is_reusable_for(nested.filename(), time))
            && nested.document().is_none_or(|_| is_fresh(nested))
    })
}

/// Resolved, parsed imports anywhere in `document`'s graph, by filename.
pub(crate) fn index_imports(document: &MSBuildDocument) -> FxHashMap<PathBuf, Arc<Import>> {
    let mut index = FxHashMap::default();
    let mut stack = vec![document];
    while let Some(document) = stack.pop() {
        for import in document.imports() {
            if let Some(nested) = import.document() {
                if index.insert(import.filename().to_path_buf(), import.clone()).is_none() {
                    stack.push(nested.as_ref());
                }
            }
        }
    }
    index
}
