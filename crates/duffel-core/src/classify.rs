//! Path classification: what an on-disk entry *is*.
//!
//! Classification is a pure function of current disk state. Results are
//! never cached; the disk is the source of truth, so callers re-classify
//! after any mutation.

use std::path::{Path, PathBuf};

/// Kind of on-disk entry, as presented to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Classification result for one os path.
///
/// `kind == File` with `is_bundle == true` means: a directory on disk that
/// must be presented as a single logical file.
#[derive(Debug, Clone)]
pub struct PathEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub is_bundle: bool,
}

impl PathEntry {
    /// A plain file: not a directory, not a bundle.
    pub fn is_regular_file(&self) -> bool {
        self.kind == EntryKind::File && !self.is_bundle
    }
}

/// Is this directory a bundle? True iff a regular file named after the
/// directory itself exists directly inside it.
pub fn is_bundle_dir(os_path: &Path) -> bool {
    if !os_path.is_dir() {
        return false;
    }
    let Some(name) = os_path.file_name() else {
        return false;
    };
    os_path.join(name).is_file()
}

/// Classify one os path.
///
/// Non-directories (including missing paths) classify as plain files;
/// directories classify as bundles when they carry a payload file.
pub fn classify(os_path: &Path) -> PathEntry {
    let mut kind = EntryKind::File;
    let mut is_bundle = false;

    if os_path.is_dir() {
        if is_bundle_dir(os_path) {
            is_bundle = true;
        } else {
            kind = EntryKind::Directory;
        }
    }

    PathEntry {
        path: os_path.to_path_buf(),
        kind,
        is_bundle,
    }
}
