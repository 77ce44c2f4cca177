//! Configuration and shared state for a series of document builds.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use super::sdk::SdkResolver;
use crate::base::{SymbolMap, SymbolName};
use crate::hir::{DEFAULT_WATCHED_PROPERTIES, SdkReference, TaskInfo};
use crate::schema::{DocumentSchema, SchemaProvider};

/// Options for a [`ParseSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Global and toolset properties (`MSBuildExtensionsPath`,
    /// `MSBuildBinPath`, ...) visible to every evaluation.
    pub properties: SymbolMap<SmolStr>,
    /// Properties whose values drive import evaluation.
    pub watched_properties: Vec<SmolStr>,
    /// Upper bound on property value combinations tried per import.
    pub max_permutations: usize,
    /// Smallest index at which a `*` makes an evaluated import path a
    /// wildcard.
    pub wildcard_min_star: usize,
    /// Smallest index of the last separator in a wildcard import path.
    /// Together with `wildcard_min_star` this keeps patterns with an empty
    /// or one-letter directory part (`/*.props`, `a/*`) from expanding.
    pub wildcard_min_separator: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            properties: SymbolMap::default(),
            watched_properties: DEFAULT_WATCHED_PROPERTIES.iter().map(|&p| SmolStr::new(p)).collect(),
            max_permutations: 64,
            wildcard_min_star: 3,
            wildcard_min_separator: 3,
        }
    }
}

impl SessionOptions {
    pub fn with_property(mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.properties.insert(SymbolName::new(name), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&SmolStr> {
        self.properties.get(&SymbolName::new(name))
    }
}

/// Supplies task and parameter declarations from compiled task assemblies.
pub trait TaskMetadataProvider: Send + Sync {
    fn task(&self, name: &str, project_file: &Path) -> Option<TaskInfo>;
}

impl<F> TaskMetadataProvider for F
where
    F: Fn(&str, &Path) -> Option<TaskInfo> + Send + Sync,
{
    fn task(&self, name: &str, project_file: &Path) -> Option<TaskInfo> {
        self(name, project_file)
    }
}

/// Shared context for building documents: options, injected providers,
/// the unresolved-import log guard and a cancellation token.
///
/// A session is `Sync`; several documents may be built against it at
/// once.
pub struct ParseSession {
    options: SessionOptions,
    sdk_resolver: Option<Arc<dyn SdkResolver>>,
    task_metadata: Option<Arc<dyn TaskMetadataProvider>>,
    schema_provider: Option<Arc<dyn SchemaProvider>>,
    logged_unresolved: Mutex<FxHashSet<String>>,
    cancel: CancellationToken,
}

impl Default for ParseSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl std::fmt::Debug for ParseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseSession")
            .field("options", &self.options)
            .field("has_sdk_resolver", &self.sdk_resolver.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl ParseSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            sdk_resolver: None,
            task_metadata: None,
            schema_provider: None,
            logged_unresolved: Mutex::new(FxHashSet::default()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_sdk_resolver(mut self, resolver: impl SdkResolver + 'static) -> Self {
        self.sdk_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_task_metadata(mut self, provider: impl TaskMetadataProvider + 'static) -> Self {
        self.task_metadata = Some(Arc::new(provider));
        self
    }

    pub fn with_schema_provider(mut self, provider: impl SchemaProvider + 'static) -> Self {
        self.schema_provider = Some(Arc::new(provider));
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn resolve_sdk(&self, sdk: &SdkReference, project_file: &Path) -> Option<std::path::PathBuf> {
        self.sdk_resolver.as_ref()?.resolve_sdk(sdk, project_file)
    }

    pub fn task_metadata(&self, name: &str, project_file: &Path) -> Option<TaskInfo> {
        self.task_metadata.as_ref()?.task(name, project_file)
    }

    pub fn schema_for(&self, path: &Path) -> Option<Arc<DocumentSchema>> {
        self.schema_provider.as_ref()?.schema_for(path)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Log an unresolved import the first time `expression` is seen.
    /// Returns whether it was logged.
    pub(crate) fn log_unresolved_once(&self, expression: &str, importer: &Path) -> bool {
        let first = self.logged_unresolved.lock().insert(expression.to_string());
        if first {
            tracing::warn!(
                expression,
                importer = %importer.display(),
                "could not resolve import"
            );
        }
        first
    }
}
