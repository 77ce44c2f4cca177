//! Import records and SDK references.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use smol_str::SmolStr;

use super::document::MSBuildDocument;

/// One edge of the import graph.
///
/// A resolved import carries the file's modification time, which together
/// with the filename is the reuse key across edits. An unresolved import
/// is a stub: its filename is the unevaluated expression text and it has
/// no timestamp.
#[derive(Debug)]
pub struct Import {
    filename: PathBuf,
    sdk: Option<SmolStr>,
    time_stamp: Option<SystemTime>,
    document: Option<Arc<MSBuildDocument>>,
}

impl Import {
    pub fn resolved(
        filename: impl Into<PathBuf>,
        sdk: Option<SmolStr>,
        time_stamp: SystemTime,
        document: Option<Arc<MSBuildDocument>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            sdk,
            time_stamp: Some(time_stamp),
            document,
        }
    }

    pub fn unresolved(expression: &str, sdk: Option<SmolStr>) -> Self {
        Self {
            filename: PathBuf::from(expression),
            sdk,
            time_stamp: None,
            document: None,
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn sdk(&self) -> Option<&str> {
        self.sdk.as_deref()
    }

    /// Modification time of the file; `None` for stubs.
    pub fn time_stamp(&self) -> Option<SystemTime> {
        self.time_stamp
    }

    /// The parsed file. `None` for stubs and for files already present
    /// elsewhere in the graph.
    pub fn document(&self) -> Option<&Arc<MSBuildDocument>> {
        self.document.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.time_stamp.is_some()
    }

    /// Whether this import may stand in for `filename` last modified at
    /// `time_stamp`.
    pub fn is_reusable_for(&self, filename: &Path, time_stamp: SystemTime) -> bool {
        self.filename == filename && self.time_stamp == Some(time_stamp)
    }
}

/// `Name`, `Name/Version`, or a `<Sdk Name Version MinimumVersion/>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SdkReference {
    pub name: SmolStr,
    pub version: Option<SmolStr>,
    pub minimum_version: Option<SmolStr>,
}

impl SdkReference {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            version: None,
            minimum_version: None,
        }
    }

    /// Parse one `Name[/Version]` entry. Returns `None` for a blank name.
    pub fn parse(text: &str) -> Option<Self> {
        let (name, version) = match text.split_once('/') {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (text.trim(), None),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            version: version.filter(|v| !v.is_empty()).map(SmolStr::from),
            minimum_version: None,
        })
    }

    /// Parse a `;` separated `Project/@Sdk` value.
    pub fn parse_list(text: &str) -> Vec<Self> {
        text.split(';').filter_map(Self::parse).collect()
    }
}

impl fmt::Display for SdkReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}/{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}
