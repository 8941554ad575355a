//! Mount routing.
//!
//! `MountContents` owns a table of named mounts and forwards each operation
//! to the backend whose name matches the first path segment. Returned models
//! are reanchored so their paths stay meaningful to the caller: a directory
//! gets its children's paths prefixed with the mount name, any other model
//! gets its own path prefixed.
//!
//! The empty path is the synthetic root: a read-only listing with one
//! directory entry per mount. Nothing else can be done to it.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use duffel_types::{CheckpointModel, DirectoryModel, Model, ModelKind};

use crate::config::{ContentsConfig, ListingOptions};
use crate::error::{ContentsError, ContentsResult};
use crate::vfs::local::BundleContents;
use crate::vfs::traits::{Contents, GetOptions};

/// Routes api paths to named mounts.
pub struct MountContents {
    mounts: BTreeMap<String, Arc<dyn Contents>>,
}

impl Default for MountContents {
    fn default() -> Self {
        Self::new()
    }
}

impl MountContents {
    pub fn new() -> Self {
        Self {
            mounts: BTreeMap::new(),
        }
    }

    /// One [`BundleContents`] per configured mount, sharing the config's
    /// listing policy and trash directory.
    pub fn from_config(config: &ContentsConfig) -> Self {
        let listing = ListingOptions::from_config(config);
        let mut router = Self::new();
        for (name, root) in &config.mounts {
            let mut backend = BundleContents::new(root, listing.clone());
            if let Some(trash_dir) = &config.trash_dir {
                backend = backend.with_trash_dir(trash_dir);
            }
            router = router.mount(name, backend);
        }
        router
    }

    pub fn mount(self, name: impl Into<String>, backend: impl Contents + 'static) -> Self {
        self.mount_arc(name, Arc::new(backend))
    }

    pub fn mount_arc(mut self, name: impl Into<String>, backend: Arc<dyn Contents>) -> Self {
        self.mounts.insert(name.into(), backend);
        self
    }

    pub fn mount_names(&self) -> impl Iterator<Item = &str> {
        self.mounts.keys().map(String::as_str)
    }

    /// Split `path` into its mount and the backend-local remainder.
    ///
    /// An unmatched first segment is fatal: there is no fallback backend.
    fn resolve<'p>(&self, path: &'p str) -> ContentsResult<(&str, &Arc<dyn Contents>, &'p str)> {
        let trimmed = path.trim_matches('/');
        let (mount, local) = trimmed.split_once('/').unwrap_or((trimmed, ""));
        match self.mounts.get_key_value(mount) {
            Some((name, backend)) => Ok((name.as_str(), backend, local)),
            None => Err(ContentsError::UnknownMount(mount.to_string())),
        }
    }

    fn is_root(path: &str) -> bool {
        path.trim_matches('/').is_empty()
    }

    /// The synthetic root listing: one shallow directory entry per mount.
    fn root_model(&self, options: &GetOptions) -> ContentsResult<Model> {
        if let Some(expected) = options.kind {
            if expected != ModelKind::Directory {
                return Err(ContentsError::TypeMismatch {
                    path: String::new(),
                    expected,
                    actual: ModelKind::Directory,
                });
            }
        }

        let content = options.content.then(|| {
            self.mounts
                .keys()
                .map(|name| Model::Directory(DirectoryModel::transient(name.clone(), None)))
                .collect()
        });
        Ok(Model::Directory(DirectoryModel::transient("", content)))
    }

    /// Prefix the model's caller-visible paths with the mount name.
    fn reanchor(mount: &str, mut model: Model) -> Model {
        match &mut model {
            Model::Directory(dir) => {
                if let Some(children) = &mut dir.content {
                    for child in children {
                        let anchored = Self::join_mount(mount, child.path());
                        child.set_path(anchored);
                    }
                }
            }
            other => {
                let anchored = Self::join_mount(mount, other.path());
                other.set_path(anchored);
            }
        }
        model
    }

    fn join_mount(mount: &str, local: &str) -> String {
        if local.is_empty() {
            mount.to_string()
        } else {
            format!("{mount}/{local}")
        }
    }
}

#[async_trait]
impl Contents for MountContents {
    async fn get(&self, path: &str, options: &GetOptions) -> ContentsResult<Model> {
        if Self::is_root(path) {
            return self.root_model(options);
        }
        let (mount, backend, local) = self.resolve(path)?;
        let model = backend.get(local, options).await?;
        Ok(Self::reanchor(mount, model))
    }

    async fn save(&self, path: &str, model: &Model) -> ContentsResult<Model> {
        if Self::is_root(path) {
            return Err(ContentsError::UnknownMount(String::new()));
        }
        let (mount, backend, local) = self.resolve(path)?;
        let saved = backend.save(local, model).await?;
        Ok(Self::reanchor(mount, saved))
    }

    async fn delete(&self, path: &str) -> ContentsResult<()> {
        if Self::is_root(path) {
            return Err(ContentsError::UnknownMount(String::new()));
        }
        let (_, backend, local) = self.resolve(path)?;
        backend.delete(local).await
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> ContentsResult<()> {
        if Self::is_root(old_path) || Self::is_root(new_path) {
            return Err(ContentsError::UnknownMount(String::new()));
        }
        let (old_mount, backend, old_local) = self.resolve(old_path)?;
        let (new_mount, _, new_local) = self.resolve(new_path)?;

        if old_mount != new_mount {
            return Err(ContentsError::CrossMountRename {
                from: old_path.to_string(),
                to: new_path.to_string(),
            });
        }
        backend.rename(old_local, new_local).await
    }

    async fn file_exists(&self, path: &str) -> bool {
        if Self::is_root(path) {
            return false;
        }
        match self.resolve(path) {
            Ok((_, backend, local)) => backend.file_exists(local).await,
            Err(_) => false,
        }
    }

    async fn dir_exists(&self, path: &str) -> bool {
        if Self::is_root(path) {
            return true;
        }
        match self.resolve(path) {
            Ok((_, backend, local)) => backend.dir_exists(local).await,
            Err(_) => false,
        }
    }

    fn is_hidden(&self, path: &str) -> bool {
        if Self::is_root(path) {
            return false;
        }
        match self.resolve(path) {
            Ok((_, backend, local)) => backend.is_hidden(local),
            Err(_) => false,
        }
    }

    async fn create_checkpoint(&self, path: &str) -> ContentsResult<CheckpointModel> {
        if Self::is_root(path) {
            return Err(ContentsError::UnknownMount(String::new()));
        }
        let (_, backend, local) = self.resolve(path)?;
        backend.create_checkpoint(local).await
    }

    async fn list_checkpoints(&self, path: &str) -> ContentsResult<Vec<CheckpointModel>> {
        if Self::is_root(path) {
            return Err(ContentsError::UnknownMount(String::new()));
        }
        let (_, backend, local) = self.resolve(path)?;
        backend.list_checkpoints(local).await
    }
}
