//! Bundle-aware contents backend for one on-disk root.
//!
//! `BundleContents` resolves each path by its on-disk shape: bundle
//! directories become file-like models, everything else is delegated to the
//! plain [`FileContents`] layer. It also owns the root's trash and
//! checkpoint behavior and fires post-save hooks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;

use duffel_types::{CheckpointModel, Model, ModelKind};

use crate::bundle::{Bundle, NotebookBundle};
use crate::checkpoints::{self, CHECKPOINT_DIR};
use crate::classify::classify;
use crate::config::ListingOptions;
use crate::error::{ContentsError, ContentsResult};
use crate::fileio::{is_hidden_name, should_list, split_name, to_os_path};
use crate::hooks::{fire_post_save, PostSaveHook};
use crate::vfs::file::FileContents;
use crate::vfs::traits::{Contents, GetOptions};

/// Contents backend under one root, with bundle resolution layered over
/// plain files.
pub struct BundleContents {
    root: PathBuf,
    fm: FileContents,
    listing: ListingOptions,
    trash_dir: Option<PathBuf>,
    hooks: Vec<Arc<dyn PostSaveHook>>,
}

impl BundleContents {
    pub fn new(root: impl Into<PathBuf>, listing: ListingOptions) -> Self {
        let root = root.into();
        Self {
            fm: FileContents::new(root.clone(), listing.clone()),
            root,
            listing,
            trash_dir: None,
            hooks: Vec::new(),
        }
    }

    pub fn with_trash_dir(mut self, trash_dir: impl Into<PathBuf>) -> Self {
        self.trash_dir = Some(trash_dir.into());
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn PostSaveHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn os_path(&self, path: &str) -> PathBuf {
        to_os_path(&self.root, path)
    }

    fn entry_name(path: &str) -> &str {
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Resolve a bundle directory into its file-like model.
    async fn bundle_model(
        &self,
        path: &str,
        os_path: &Path,
        options: &GetOptions,
    ) -> ContentsResult<Model> {
        if NotebookBundle::valid_path(os_path) {
            Self::check_kind(path, options.kind, ModelKind::Notebook)?;
            let bundle = NotebookBundle::new(os_path);
            let model = bundle.get_model(&self.root, options.content, None).await?;
            Ok(Model::NotebookBundle(model))
        } else {
            Self::check_kind(path, options.kind, ModelKind::File)?;
            let bundle = Bundle::new(os_path);
            let model = bundle.get_model(&self.root, options.content, None).await?;
            Ok(Model::Bundle(model))
        }
    }

    /// Directory model whose children go through bundle resolution, so a
    /// nested bundle lists as a file-like entry rather than a directory.
    async fn dir_model(
        &self,
        path: &str,
        os_path: &Path,
        options: &GetOptions,
    ) -> ContentsResult<Model> {
        let mut model = self.fm.get(path, &GetOptions::shallow()).await?;
        if !options.content {
            return Ok(model);
        }

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
            match self.get(&child_path, &GetOptions::shallow()).await {
                Ok(child) => children.push(child),
                Err(e) => {
                    tracing::debug!(path = child_path, error = %e, "skipping unresolvable entry");
                }
            }
        }
        children.sort_by(|a, b| a.name().cmp(b.name()));

        if let Model::Directory(dir) = &mut model {
            dir.base.format = Some(duffel_types::Format::Json);
            dir.content = Some(children);
        }
        Ok(model)
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

    /// Write the model's payload (and sidecars) to disk, returning a
    /// secondary-artifact message when one applies.
    async fn write_model(
        &self,
        path: &str,
        os_path: &Path,
        model: &Model,
    ) -> ContentsResult<Option<String>> {
        match model {
            Model::NotebookBundle(m) => {
                let document = m.content.as_ref().ok_or_else(|| {
                    ContentsError::bad_format(os_path, "notebook bundle save requires content")
                })?;
                let bundle = NotebookBundle::new(os_path);
                let message = bundle.save(document).await?;
                bundle.write_sidecars(&m.sidecar_files).await?;
                Ok(message)
            }
            Model::Bundle(m) => {
                let content = m.content.as_deref().ok_or_else(|| {
                    ContentsError::bad_format(os_path, "bundle save requires content")
                })?;
                let bundle = Bundle::new(os_path);
                bundle.save_payload(content).await?;
                bundle.write_sidecars(&m.sidecar_files).await?;
                Ok(None)
            }
            Model::Notebook(m) => {
                // Existing regular notebook files stay flat; everything else
                // (an existing bundle, or a brand-new path) saves as a
                // notebook bundle.
                if os_path.is_file() {
                    self.fm.save(path, model).await?;
                    return Ok(None);
                }
                let document = m.content.as_ref().ok_or_else(|| {
                    ContentsError::bad_format(os_path, "notebook save requires content")
                })?;
                NotebookBundle::new(os_path).save(document).await
            }
            _ => {
                self.fm.save(path, model).await?;
                Ok(None)
            }
        }
    }

    /// Move the entry at `path` into the configured trash directory instead
    /// of deleting it. Non-bundle entries fall back to permanent delete.
    ///
    /// The trashed name flattens the api path with `__` so entries from
    /// nested directories cannot collide with each other; a residual
    /// collision with something already in the trash gets a `-N` counter
    /// spliced in before the extension.
    pub async fn move_to_trash(&self, path: &str) -> ContentsResult<()> {
        let os_path = self.os_path(path);
        if !os_path.exists() {
            return Err(ContentsError::NotFound(path.to_string()));
        }

        let entry = classify(&os_path);
        if !entry.is_bundle {
            return self.fm.delete(path).await;
        }

        let trash_dir = self.trash_dir.as_ref().ok_or(
            ContentsError::ConfigurationMissing {
                operation: "move_to_trash",
                missing: "trash_dir",
            },
        )?;
        fs::create_dir_all(trash_dir)
            .await
            .map_err(|e| ContentsError::from_io(e, trash_dir))?;

        let flat = path.trim_matches('/').replace('/', "__");
        let (stem, ext) = split_name(&flat);
        let mut target = trash_dir.join(&flat);
        let mut counter = 1u32;
        while target.exists() {
            target = trash_dir.join(format!("{stem}-{counter}{ext}"));
            counter += 1;
        }

        tracing::info!(path, target = %target.display(), "moving bundle to trash");
        fs::rename(&os_path, &target)
            .await
            .map_err(|e| ContentsError::from_io(e, &os_path))
    }
}

#[async_trait]
impl Contents for BundleContents {
    async fn get(&self, path: &str, options: &GetOptions) -> ContentsResult<Model> {
        let os_path = self.os_path(path);
        let entry = classify(&os_path);

        if entry.is_bundle {
            return self.bundle_model(path, &os_path, options).await;
        }
        if os_path.is_dir() {
            Self::check_kind(path, options.kind, ModelKind::Directory)?;
            return self.dir_model(path, &os_path, options).await;
        }
        self.fm.get(path, options).await
    }

    async fn save(&self, path: &str, model: &Model) -> ContentsResult<Model> {
        let os_path = self.os_path(path);
        let message = self.write_model(path, &os_path, model).await?;

        let mut saved = self.get(path, &GetOptions::shallow()).await?;
        saved.base_mut().message = message;

        fire_post_save(&self.hooks, &saved, &os_path).await;
        Ok(saved)
    }

    async fn delete(&self, path: &str) -> ContentsResult<()> {
        let os_path = self.os_path(path);
        if classify(&os_path).is_bundle {
            return Err(ContentsError::NotImplemented(
                "bundle delete; use move_to_trash",
            ));
        }
        self.fm.delete(path).await
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> ContentsResult<()> {
        let old_os = self.os_path(old_path);
        if classify(&old_os).is_bundle {
            let new_name = Self::entry_name(new_path);
            let mut bundle = Bundle::new(&old_os);
            return bundle.rename(new_name).await;
        }
        self.fm.rename(old_path, new_path).await
    }

    async fn file_exists(&self, path: &str) -> bool {
        let os_path = self.os_path(path);
        classify(&os_path).is_bundle || self.fm.file_exists(path).await
    }

    async fn dir_exists(&self, path: &str) -> bool {
        let os_path = self.os_path(path);
        !classify(&os_path).is_bundle && self.fm.dir_exists(path).await
    }

    fn is_hidden(&self, path: &str) -> bool {
        self.fm.is_hidden(path)
    }

    async fn create_checkpoint(&self, path: &str) -> ContentsResult<CheckpointModel> {
        let os_path = self.os_path(path);
        if classify(&os_path).is_bundle {
            let name = Self::entry_name(path);
            let cp_dir = os_path.join(CHECKPOINT_DIR);
            let payload = os_path.join(name);
            return checkpoints::create_checkpoint_file(&cp_dir, &payload, name).await;
        }
        self.fm.create_checkpoint(path).await
    }

    async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<CheckpointModel>> {
        let os_path = self.os_path(path);
        if classify(&os_path).is_bundle {
            let name = Self::entry_name(path);
            let cp_dir = os_path.join(CHECKPOINT_DIR);
            return checkpoints::list_checkpoint_files(&cp_dir, name).await;
        }
        self.fm.list_checkpoints(path).await
    }
}
