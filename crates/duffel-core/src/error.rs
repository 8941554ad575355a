//! Error taxonomy for contents operations.
//!
//! One enum covers the whole routing core. Every user-visible failure names
//! the offending path; conversion from `std::io::Error` goes through
//! [`ContentsError::from_io`] so the path survives the mapping.

use std::io;
use std::path::Path;

use duffel_types::ModelKind;
use thiserror::Error;

/// Result type for contents operations.
pub type ContentsResult<T> = Result<T, ContentsError>;

/// Contents operation errors.
#[derive(Debug, Clone, Error)]
pub enum ContentsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("type mismatch at {path}: expected {expected}, found {actual}")]
    TypeMismatch {
        path: String,
        expected: ModelKind,
        actual: ModelKind,
    },

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The two-step bundle rename moved the payload file but failed to move
    /// the directory, leaving the bundle inconsistent. No rollback is
    /// attempted; callers repair manually.
    #[error(
        "partial bundle rename: payload moved {payload_from} -> {payload_to} \
         but directory rename {dir_from} -> {dir_to} failed: {detail}"
    )]
    RenamePartial {
        payload_from: String,
        payload_to: String,
        dir_from: String,
        dir_to: String,
        detail: String,
    },

    #[error("unknown mount: {0:?}")]
    UnknownMount(String),

    #[error("cannot rename across mounts: {from} -> {to}")]
    CrossMountRename { from: String, to: String },

    #[error("operation {operation} requires configuration: {missing}")]
    ConfigurationMissing {
        operation: &'static str,
        missing: &'static str,
    },

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("bad format for {path}: {reason}")]
    BadFormat { path: String, reason: String },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("io error at {path}: {detail}")]
    Io { path: String, detail: String },
}

impl ContentsError {
    /// Map an io error onto the taxonomy, keeping the offending path.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let p = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => ContentsError::NotFound(p),
            io::ErrorKind::AlreadyExists => ContentsError::AlreadyExists(p),
            io::ErrorKind::PermissionDenied => ContentsError::PermissionDenied(p),
            _ => ContentsError::Io {
                path: p,
                detail: err.to_string(),
            },
        }
    }

    pub fn bad_format(path: &Path, reason: impl Into<String>) -> Self {
        ContentsError::BadFormat {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}
