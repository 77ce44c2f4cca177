//! Temporary project trees on disk.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use msbuild::project::{ParseSession, RootDocument};
use tempfile::TempDir;

/// A temporary directory holding project files.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `text` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, text).expect("write file");
        path
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("create dir");
        path
    }

    /// Set the modification time of `relative` to `seconds` after the epoch.
    pub fn touch(&self, relative: &str, seconds: u64) {
        let file = fs::File::options()
            .write(true)
            .open(self.path(relative))
            .expect("open file");
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds))
            .expect("set mtime");
    }

    pub fn load(&self, relative: &str, previous: Option<&RootDocument>, session: &ParseSession) -> RootDocument {
        RootDocument::load(self.path(relative), previous, session).expect("load root document")
    }
}

/// File names of every document in the graph, root first.
pub fn document_names(root: &RootDocument) -> Vec<String> {
    root.all_documents()
        .iter()
        .map(|document| {
            document
                .filename()
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}
