//! Plain-file contents backend.
//!
//! `FileContents` serves files, notebook files, and directories under one
//! on-disk root. It knows nothing about bundles; [`super::BundleContents`]
//! layers those on top.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use duffel_types::{
    CheckpointModel, DirectoryModel, FileModel, Format, Model, ModelBase, ModelKind, Notebook,
    NotebookModel,
};

use crate::checkpoints::{self, CHECKPOINT_DIR};
use crate::config::ListingOptions;
use crate::error::{ContentsError, ContentsResult};
use crate::fileio::{
    guess_mimetype, is_hidden_name, is_writable, path_metadata, read_file, should_list,
    to_os_path, write_file,
};
use crate::glob::glob_match;
use crate::vfs::traits::{Contents, GetOptions};

/// Contents backend over plain files below `root`.
pub struct FileContents {
    root: PathBuf,
    listing: ListingOptions,
}

impl FileContents {
    pub fn new(root: impl Into<PathBuf>, listing: ListingOptions) -> Self {
        Self {
            root: root.into(),
            listing,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn os_path(&self, path: &str) -> PathBuf {
        to_os_path(&self.root, path)
    }

    /// Model base for an existing entry, stat included.
    async fn base_for(&self, path: &str, os_path: &Path) -> ContentsResult<ModelBase> {
        let meta = path_metadata(os_path).await?;
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Ok(ModelBase {
            name,
            path: path.to_string(),
            created: meta.created,
            last_modified: meta.last_modified,
            size: meta.size,
            writable: Some(is_writable(os_path).await),
            mimetype: None,
            format: None,
            message: None,
        })
    }

    async fn file_model(
        &self,
        path: &str,
        os_path: &Path,
        options: &GetOptions,
    ) -> ContentsResult<FileModel> {
        let mut base = self.base_for(path, os_path).await?;
        base.mimetype = guess_mimetype(os_path);

        let content = if options.content {
            let (content, format) = read_file(os_path, options.format).await?;
            base.format = Some(format);
            Some(content)
        } else {
            None
        };
        Ok(FileModel::new(base, content))
    }

    async fn notebook_model(
        &self,
        path: &str,
        os_path: &Path,
        options: &GetOptions,
    ) -> ContentsResult<NotebookModel> {
        let mut base = self.base_for(path, os_path).await?;
        base.mimetype = guess_mimetype(os_path);

        let content = if options.content {
            let bytes = fs::read(os_path)
                .await
                .map_err(|e| ContentsError::from_io(e, os_path))?;
            let nb = Notebook::from_bytes(&bytes)
                .map_err(|e| ContentsError::bad_format(os_path, e.to_string()))?;
            base.format = Some(Format::Json);
            Some(nb)
        } else {
            None
        };
        Ok(NotebookModel::new(base, content))
    }

    async fn dir_model(
        &self,
        path: &str,
        os_path: &Path,
        options: &GetOptions,
    ) -> ContentsResult<DirectoryModel> {
        let mut base = self.base_for(path, os_path).await?;

        let content = if options.content {
            base.format = Some(Format::Json);
            Some(self.list_dir(path, os_path).await?)
        } else {
            None
        };
        Ok(DirectoryModel::new(base, content))
    }

    /// Shallow children of a directory, filtered by listing policy and
    /// sorted by name. A child whose stat fails is skipped, not fatal.
    async fn list_dir(&self, path: &str, os_path: &Path) -> ContentsResult<Vec<Model>> {
        let mut children = Vec::new();
        let mut dir = fs::read_dir(os_path)
            .await
            .map_err(|e| ContentsError::from_io(e, os_path))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ContentsError::from_io(e, os_path))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !should_list(&name, &self.listing.hide_globs) {
                continue;
            }
            if is_hidden_name(&name) && !self.listing.allow_hidden {
                continue;
            }

            let child_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}/{name}")
            };
            let child_os = entry.path();

            match self.shallow_model(&child_path, &child_os).await {
                Ok(model) => children.push(model),
                Err(e) => {
                    tracing::debug!(path = %child_os.display(), error = %e, "skipping unstatable entry");
                }
            }
        }

        children.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(children)
    }

    /// Content-less model for one entry, by on-disk shape.
    async fn shallow_model(&self, path: &str, os_path: &Path) -> ContentsResult<Model> {
        let shallow = GetOptions::shallow();
        if os_path.is_dir() {
            let base = self.base_for(path, os_path).await?;
            Ok(Model::Directory(DirectoryModel::new(base, None)))
        } else if path.ends_with(".ipynb") {
            Ok(Model::Notebook(
                self.notebook_model(path, os_path, &shallow).await?,
            ))
        } else {
            Ok(Model::File(self.file_model(path, os_path, &shallow).await?))
        }
    }

    fn check_kind(path: &str, expected: Option<ModelKind>, actual: ModelKind) -> ContentsResult<()> {
        match expected {
            Some(expected) if expected != actual => Err(ContentsError::TypeMismatch {
                path: path.to_string(),
                expected,
                actual,
            }),
            _ => Ok(()),
        }
    }

    fn checkpoint_dir(&self, os_path: &Path) -> PathBuf {
        os_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone())
            .join(CHECKPOINT_DIR)
    }

    fn entry_name(path: &str) -> &str {
        path.rsplit('/').next().unwrap_or(path)
    }
}

#[async_trait]
impl Contents for FileContents {
    async fn get(&self, path: &str, options: &GetOptions) -> ContentsResult<Model> {
        let os_path = self.os_path(path);

        if os_path.is_dir() {
            Self::check_kind(path, options.kind, ModelKind::Directory)?;
            return Ok(Model::Directory(
                self.dir_model(path, &os_path, options).await?,
            ));
        }
        if !os_path.is_file() {
            return Err(ContentsError::NotFound(path.to_string()));
        }

        // A regular .ipynb file is a notebook unless the caller insists on
        // raw file semantics.
        if path.ends_with(".ipynb") && options.kind != Some(ModelKind::File) {
            Self::check_kind(path, options.kind, ModelKind::Notebook)?;
            return Ok(Model::Notebook(
                self.notebook_model(path, &os_path, options).await?,
            ));
        }

        Self::check_kind(path, options.kind, ModelKind::File)?;
        Ok(Model::File(self.file_model(path, &os_path, options).await?))
    }

    async fn save(&self, path: &str, model: &Model) -> ContentsResult<Model> {
        let os_path = self.os_path(path);

        match model {
            Model::File(file) => {
                let content = file.content.as_deref().ok_or_else(|| {
                    ContentsError::bad_format(&os_path, "file save requires content")
                })?;
                let format = file.base.format.unwrap_or(Format::Text);
                write_file(&os_path, content, format).await?;
            }
            Model::Notebook(nb) => {
                let document = nb.content.as_ref().ok_or_else(|| {
                    ContentsError::bad_format(&os_path, "notebook save requires content")
                })?;
                crate::fileio::atomic_write(&os_path, &document.to_bytes()).await?;
            }
            Model::Directory(_) => {
                fs::create_dir_all(&os_path)
                    .await
                    .map_err(|e| ContentsError::from_io(e, &os_path))?;
            }
            Model::Bundle(_) | Model::NotebookBundle(_) => {
                return Err(ContentsError::NotImplemented(
                    "bundle models require a bundle-aware backend",
                ));
            }
        }

        self.get(path, &GetOptions::shallow()).await
    }

    async fn delete(&self, path: &str) -> ContentsResult<()> {
        let os_path = self.os_path(path);
        let result = if os_path.is_dir() {
            fs::remove_dir(&os_path).await
        } else {
            fs::remove_file(&os_path).await
        };
        result.map_err(|e| ContentsError::from_io(e, &os_path))
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> ContentsResult<()> {
        let old_os = self.os_path(old_path);
        let new_os = self.os_path(new_path);

        if new_os.exists() {
            return Err(ContentsError::AlreadyExists(new_path.to_string()));
        }
        fs::rename(&old_os, &new_os)
            .await
            .map_err(|e| ContentsError::from_io(e, &old_os))
    }

    async fn file_exists(&self, path: &str) -> bool {
        self.os_path(path).is_file()
    }

    async fn dir_exists(&self, path: &str) -> bool {
        self.os_path(path).is_dir()
    }

    fn is_hidden(&self, path: &str) -> bool {
        let name = Self::entry_name(path);
        is_hidden_name(name)
            || self
                .listing
                .hide_globs
                .iter()
                .any(|g| glob_match(g, name))
    }

    async fn create_checkpoint(&self, path: &str) -> ContentsResult<CheckpointModel> {
        let os_path = self.os_path(path);
        if !os_path.is_file() {
            return Err(ContentsError::NotFound(path.to_string()));
        }
        let cp_dir = self.checkpoint_dir(&os_path);
        checkpoints::create_checkpoint_file(&cp_dir, &os_path, Self::entry_name(path)).await
    }

    async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<CheckpointModel>> {
        let os_path = self.os_path(path);
        let cp_dir = self.checkpoint_dir(&os_path);
        checkpoints::list_checkpoint_files(&cp_dir, Self::entry_name(path)).await
    }
}
