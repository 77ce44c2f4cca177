//! SDK resolution.
//!
//! Locating an SDK on disk is the host's business. The engine only needs
//! a directory containing `Sdk.props` and `Sdk.targets`, supplied through
//! an [`SdkResolver`].

use std::path::{Path, PathBuf};

use crate::hir::SdkReference;

/// Finds the directory of an SDK for a project.
pub trait SdkResolver: Send + Sync {
    fn resolve_sdk(&self, sdk: &SdkReference, project_file: &Path) -> Option<PathBuf>;
}

impl<F> SdkResolver for F
where
    F: Fn(&SdkReference, &Path) -> Option<PathBuf> + Send + Sync,
{
    fn resolve_sdk(&self, sdk: &SdkReference, project_file: &Path) -> Option<PathBuf> {
        self(sdk, project_file)
    }
}

/// Looks for `<root>/<Name>/Sdk` under each root in turn, the layout of
/// an `MSBuildSDKsPath` directory.
#[derive(Debug, Clone, Default)]
pub struct DirectorySdkResolver {
    roots: Vec<PathBuf>,
}

impl DirectorySdkResolver {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }
}

impl SdkResolver for DirectorySdkResolver {
    fn resolve_sdk(&self, sdk: &SdkReference, _project_file: &Path) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(sdk.name.as_str()).join("Sdk"))
            .find(|dir| dir.is_dir())
    }
}
