//! Test staging helpers for duffel.
//!
//! A [`Workspace`] is a temp directory with builders for the on-disk shapes
//! duffel cares about: plain files, directories, notebooks, and bundles.
//! Everything here is synchronous std I/O; these helpers run in test setup,
//! before any router is involved.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use duffel_types::Notebook;

/// A temporary on-disk workspace, removed on drop.
pub struct Workspace {
    td: TempDir,
}

impl Workspace {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            td: TempDir::new()?,
        })
    }

    /// Absolute root of the workspace.
    pub fn root(&self) -> &Path {
        self.td.path()
    }

    /// Absolute path for a workspace-relative path.
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.td.path().join(rel)
    }

    /// Write a file, creating parent directories as needed.
    pub fn write_file(&self, rel: impl AsRef<Path>, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    /// Create a directory (and parents).
    pub fn create_dir(&self, rel: impl AsRef<Path>) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("create dir");
        path
    }

    /// Stage a plain bundle: a directory containing a payload file of the
    /// same name. Returns the bundle directory path.
    pub fn stage_bundle(&self, rel: impl AsRef<Path>, payload: &str) -> PathBuf {
        let dir = self.create_dir(rel);
        let name = dir.file_name().expect("bundle name").to_os_string();
        fs::write(dir.join(name), payload).expect("write payload");
        dir
    }

    /// Stage a notebook bundle with the given document. Returns the bundle
    /// directory path.
    pub fn stage_notebook_bundle(&self, rel: impl AsRef<Path>, nb: &Notebook) -> PathBuf {
        let dir = self.create_dir(rel);
        let name = dir.file_name().expect("bundle name").to_os_string();
        fs::write(dir.join(name), nb.to_bytes()).expect("write notebook payload");
        dir
    }

    /// Stage a regular (non-bundle) notebook file.
    pub fn stage_notebook(&self, rel: impl AsRef<Path>, nb: &Notebook) -> PathBuf {
        self.write_file(rel, nb.to_bytes())
    }
}

/// Stage the canonical bundle fixture used across router tests:
///
/// ```text
/// regular.ipynb                  plain notebook file
/// sup.txt                        plain file ("sups")
/// example.txt/example.txt        plain bundle ("regular ole bundle")
/// subdir/example.ipynb/          notebook bundle
///     example.ipynb              payload (metadata.howdy = "hi")
///     howdy.txt                  sidecar ("howdy")
/// ```
pub fn stage_bundle_workspace(ws: &Workspace) {
    ws.stage_notebook("regular.ipynb", &Notebook::new());
    ws.write_file("sup.txt", "sups");
    ws.stage_bundle("example.txt", "regular ole bundle");

    let mut nb = Notebook::new();
    nb.metadata
        .insert("howdy".to_string(), serde_json::json!("hi"));
    ws.stage_notebook_bundle("subdir/example.ipynb", &nb);
    ws.write_file("subdir/example.ipynb/howdy.txt", "howdy");
}
