//! The contents interface and its request options.

use async_trait::async_trait;

use duffel_types::{CheckpointModel, Format, Model, ModelKind};

use crate::error::{ContentsError, ContentsResult};

/// Options for a [`Contents::get`] request.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Include content (file body, document, directory children).
    pub content: bool,
    /// Fail with `TypeMismatch` unless the entry has this kind.
    pub kind: Option<ModelKind>,
    /// Requested content encoding for plain files.
    pub format: Option<Format>,
}

impl GetOptions {
    /// Content included, no type expectation.
    pub fn with_content() -> Self {
        Self {
            content: true,
            ..Self::default()
        }
    }

    /// Metadata only.
    pub fn shallow() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ModelKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}

/// Abstract contents interface.
///
/// All operations take `/`-separated api paths relative to the
/// implementation's root. The empty string names the root itself.
#[async_trait]
pub trait Contents: Send + Sync {
    /// Fetch the model at `path`.
    async fn get(&self, path: &str, options: &GetOptions) -> ContentsResult<Model>;

    /// Persist `model` at `path`, returning the saved model without content.
    async fn save(&self, path: &str, model: &Model) -> ContentsResult<Model>;

    /// Permanently delete the entry at `path`.
    async fn delete(&self, path: &str) -> ContentsResult<()>;

    /// Move `old_path` to `new_path`. Fails if the destination exists.
    async fn rename(&self, old_path: &str, new_path: &str) -> ContentsResult<()>;

    /// Does `path` resolve to something file-like? Bundles count as files.
    async fn file_exists(&self, path: &str) -> bool;

    /// Does `path` resolve to a plain directory? Bundles do not count.
    async fn dir_exists(&self, path: &str) -> bool;

    /// Is the terminal segment of `path` hidden by name or policy?
    fn is_hidden(&self, path: &str) -> bool;

    /// Snapshot the entry at `path` as a new checkpoint.
    async fn create_checkpoint(&self, path: &str) -> ContentsResult<CheckpointModel>;

    /// Checkpoints recorded for `path`, oldest first.
    async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<CheckpointModel>>;

    /// Replace the entry at `path` with the named checkpoint.
    async fn restore_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()> {
        let _ = (path, checkpoint_id);
        Err(ContentsError::NotImplemented("restore_checkpoint"))
    }

    /// Remove the named checkpoint for `path`.
    async fn delete_checkpoint(&self, path: &str, checkpoint_id: &str) -> ContentsResult<()> {
        let _ = (path, checkpoint_id);
        Err(ContentsError::NotImplemented("delete_checkpoint"))
    }
}
