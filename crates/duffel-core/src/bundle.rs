//! Bundles: directories that act like files.
//!
//! A bundle directory contains a payload file with the same name as the
//! directory itself, plus any number of sidecar files:
//!
//! ```text
//! /root/frank.txt              the bundle path; all external logic sees this
//! /root/frank.txt/frank.txt    the payload file
//! /root/frank.txt/metadata.json   a sidecar
//! ```
//!
//! `Bundle` handles plain payloads; [`NotebookBundle`] specializes it for
//! notebook documents and the derived percent-script artifact.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

use duffel_types::{
    BundleModel, Format, ModelBase, Notebook, NotebookBundleModel, SidecarFiles,
};

use crate::classify::is_bundle_dir;
use crate::error::{ContentsError, ContentsResult};
use crate::fileio::{
    atomic_write, guess_mimetype, is_writable, path_metadata, split_name, to_api_path,
};
use crate::script::notebook_to_script;

/// Subdirectory holding the derived percent-script artifact of a notebook
/// bundle.
pub const NORMALIZED_DIR: &str = "_normalized";

/// Transient compiled-cache suffixes excluded from sidecar listings.
const TRANSIENT_SUFFIXES: &[&str] = &[".pyc"];

/// One bundle's backing directory.
#[derive(Debug, Clone)]
pub struct Bundle {
    name: String,
    bundle_path: PathBuf,
}

impl Bundle {
    pub fn new(bundle_path: impl Into<PathBuf>) -> Self {
        let bundle_path = bundle_path.into();
        let name = bundle_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, bundle_path }
    }

    /// Terminal path segment; by invariant also the payload file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bundle_path(&self) -> &Path {
        &self.bundle_path
    }

    /// The payload file: `<bundle_path>/<name>`.
    pub fn payload_path(&self) -> PathBuf {
        self.bundle_path.join(&self.name)
    }

    /// Does `os_path` hold a valid bundle of this flavor?
    pub fn valid_path(os_path: &Path) -> bool {
        is_bundle_dir(os_path)
    }

    /// Bundles directly inside `os_path` (not recursive).
    pub async fn find_in(os_path: &Path) -> io::Result<Vec<Bundle>> {
        let mut bundles = Vec::new();
        let mut dir = fs::read_dir(os_path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if is_bundle_dir(&path) {
                bundles.push(Bundle::new(path));
            }
        }
        bundles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(bundles)
    }

    /// Sidecar names: regular files directly inside the bundle directory,
    /// excluding the payload and transient artifacts. Not recursive.
    pub async fn list_sidecars(&self) -> ContentsResult<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = fs::read_dir(&self.bundle_path)
            .await
            .map_err(|e| ContentsError::from_io(e, &self.bundle_path))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ContentsError::from_io(e, &self.bundle_path))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ContentsError::from_io(e, &entry.path()))?;
            if !file_type.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if name == self.name {
                continue;
            }
            if TRANSIENT_SUFFIXES.iter().any(|s| name.ends_with(s)) {
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    /// Read one sidecar as UTF-8.
    ///
    /// Returns `None` when the bytes are not valid UTF-8: binary sidecars
    /// are invisible to content-bearing operations by policy.
    pub async fn read_sidecar(&self, name: &str) -> ContentsResult<Option<String>> {
        let sidecar_path = self.bundle_path.join(name);
        let bytes = fs::read(&sidecar_path)
            .await
            .map_err(|e| ContentsError::from_io(e, &sidecar_path))?;
        Ok(String::from_utf8(bytes).ok())
    }

    /// Pack sidecars into a model map. Without content, the key set is the
    /// same but every value is `None`.
    pub async fn pack_sidecars(&self, with_content: bool) -> ContentsResult<SidecarFiles> {
        let mut files = SidecarFiles::new();
        for name in self.list_sidecars().await? {
            let data = if with_content {
                self.read_sidecar(&name).await?
            } else {
                None
            };
            files.insert(name, data);
        }
        Ok(files)
    }

    /// Write the payload, creating the bundle directory on first save.
    pub async fn save_payload(&self, content: &str) -> ContentsResult<()> {
        if !self.bundle_path.exists() {
            fs::create_dir_all(&self.bundle_path)
                .await
                .map_err(|e| ContentsError::from_io(e, &self.bundle_path))?;
        }
        atomic_write(&self.payload_path(), content.as_bytes()).await
    }

    /// Read the payload as UTF-8 text.
    pub async fn read_payload(&self) -> ContentsResult<String> {
        let payload = self.payload_path();
        let bytes = fs::read(&payload)
            .await
            .map_err(|e| ContentsError::from_io(e, &payload))?;
        String::from_utf8(bytes)
            .map_err(|_| ContentsError::bad_format(&payload, "payload is not UTF-8 encoded"))
    }

    /// Write every sidecar entry that carries content to its relative path
    /// under the bundle root. No directories are created.
    pub async fn write_sidecars(&self, files: &SidecarFiles) -> ContentsResult<()> {
        for (name, content) in files {
            let Some(content) = content else { continue };
            let sidecar_path = self.bundle_path.join(name);
            atomic_write(&sidecar_path, content.as_bytes()).await?;
        }
        Ok(())
    }

    /// Build the model base shared by plain and notebook bundles: payload
    /// stat for timestamps, path relative to `root_dir` pointing at the
    /// bundle (never the payload file inside it).
    async fn model_base(&self, root_dir: &Path) -> ContentsResult<ModelBase> {
        let payload = self.payload_path();
        let meta = path_metadata(&payload).await?;

        let path = to_api_path(&self.bundle_path, root_dir)
            .unwrap_or_else(|| self.name.clone());
        // Invariant: the computed terminal segment is the bundle's name.
        debug_assert_eq!(path.rsplit('/').next().unwrap_or(&path), self.name);

        Ok(ModelBase {
            name: self.name.clone(),
            path,
            created: meta.created,
            last_modified: meta.last_modified,
            size: meta.size,
            writable: Some(is_writable(&payload).await),
            mimetype: guess_mimetype(&payload),
            format: None,
            message: None,
        })
    }

    /// Snapshot this bundle as a model.
    ///
    /// `sidecar_content` defaults to `content` when unspecified.
    pub async fn get_model(
        &self,
        root_dir: &Path,
        content: bool,
        sidecar_content: Option<bool>,
    ) -> ContentsResult<BundleModel> {
        let sidecar_content = sidecar_content.unwrap_or(content);
        let mut base = self.model_base(root_dir).await?;

        let payload_content = if content {
            base.format = Some(Format::Text);
            Some(self.read_payload().await?)
        } else {
            None
        };

        let sidecar_files = self.pack_sidecars(sidecar_content).await?;
        Ok(BundleModel::new(base, payload_content, sidecar_files))
    }

    /// Rename payload and bundle directory as a pair.
    ///
    /// Two steps, not atomic across the pair: (1) rename the payload inside
    /// the old bundle directory, (2) rename the bundle directory itself.
    /// If the target bundle path exists this fails before any mutation.
    /// If step 2 fails after step 1 succeeded, the bundle is inconsistent
    /// and the error says so. No rollback is attempted, since the rollback
    /// can fail for the same reasons step 2 did.
    pub async fn rename(&mut self, new_name: &str) -> ContentsResult<()> {
        let parent = self
            .bundle_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let new_bundle_path = parent.join(new_name);

        if new_bundle_path.exists() {
            return Err(ContentsError::AlreadyExists(
                new_bundle_path.display().to_string(),
            ));
        }

        // Step 1: payload rename, still within the old bundle directory.
        let new_payload_path = self.bundle_path.join(new_name);
        fs::rename(self.payload_path(), &new_payload_path)
            .await
            .map_err(|e| ContentsError::from_io(e, &self.payload_path()))?;

        // Step 2: bundle directory rename.
        if let Err(e) = fs::rename(&self.bundle_path, &new_bundle_path).await {
            return Err(ContentsError::RenamePartial {
                payload_from: self.payload_path().display().to_string(),
                payload_to: new_payload_path.display().to_string(),
                dir_from: self.bundle_path.display().to_string(),
                dir_to: new_bundle_path.display().to_string(),
                detail: e.to_string(),
            });
        }

        self.name = new_name.to_string();
        self.bundle_path = new_bundle_path;
        Ok(())
    }
}

/// A bundle whose payload is a notebook document.
#[derive(Debug, Clone)]
pub struct NotebookBundle {
    inner: Bundle,
}

impl NotebookBundle {
    pub fn new(bundle_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Bundle::new(bundle_path),
        }
    }

    pub fn bundle(&self) -> &Bundle {
        &self.inner
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// A notebook bundle: a bundle whose name carries the notebook suffix.
    pub fn valid_path(os_path: &Path) -> bool {
        let Some(name) = os_path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.ends_with(".ipynb") && is_bundle_dir(os_path)
    }

    /// Decode the payload document.
    pub async fn read_notebook(&self) -> ContentsResult<Notebook> {
        let payload = self.inner.payload_path();
        let bytes = fs::read(&payload)
            .await
            .map_err(|e| ContentsError::from_io(e, &payload))?;
        Notebook::from_bytes(&bytes).map_err(|e| ContentsError::bad_format(&payload, e.to_string()))
    }

    /// Save the document as the payload, then derive and persist the
    /// percent-script artifact.
    ///
    /// A failure writing the secondary artifact is not a save failure; it
    /// is logged and reported back as a message for the caller's model.
    pub async fn save(&self, nb: &Notebook) -> ContentsResult<Option<String>> {
        if !self.inner.bundle_path.exists() {
            fs::create_dir_all(&self.inner.bundle_path)
                .await
                .map_err(|e| ContentsError::from_io(e, &self.inner.bundle_path))?;
        }
        atomic_write(&self.inner.payload_path(), &nb.to_bytes()).await?;

        match self.save_normalized(nb).await {
            Ok(()) => Ok(None),
            Err(e) => {
                tracing::warn!(
                    bundle = %self.inner.bundle_path.display(),
                    error = %e,
                    "failed to write normalized script artifact"
                );
                Ok(Some(format!("failed to write normalized script: {e}")))
            }
        }
    }

    /// Write the percent-script export under `_normalized/<stem>.py`.
    async fn save_normalized(&self, nb: &Notebook) -> ContentsResult<()> {
        let normalized_dir = self.inner.bundle_path.join(NORMALIZED_DIR);
        fs::create_dir_all(&normalized_dir)
            .await
            .map_err(|e| ContentsError::from_io(e, &normalized_dir))?;

        let (stem, _ext) = split_name(self.inner.name());
        let script_path = normalized_dir.join(format!("{stem}.py"));
        atomic_write(&script_path, notebook_to_script(nb).as_bytes()).await
    }

    pub async fn write_sidecars(&self, files: &SidecarFiles) -> ContentsResult<()> {
        self.inner.write_sidecars(files).await
    }

    /// Snapshot this notebook bundle as a model.
    pub async fn get_model(
        &self,
        root_dir: &Path,
        content: bool,
        sidecar_content: Option<bool>,
    ) -> ContentsResult<NotebookBundleModel> {
        let sidecar_content = sidecar_content.unwrap_or(content);
        let mut base = self.inner.model_base(root_dir).await?;

        let document = if content {
            base.format = Some(Format::Json);
            Some(self.read_notebook().await?)
        } else {
            None
        };

        let sidecar_files = self.inner.pack_sidecars(sidecar_content).await?;
        Ok(NotebookBundleModel::new(base, document, sidecar_files))
    }

    pub async fn rename(&mut self, new_name: &str) -> ContentsResult<()> {
        self.inner.rename(new_name).await
    }
}
