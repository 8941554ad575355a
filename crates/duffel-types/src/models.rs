//! The content model hierarchy.
//!
//! Every read operation returns a `Model`: a typed, serializable snapshot of
//! one on-disk entry. The set of variants is closed: an entry is a plain
//! file, a directory, a notebook, or a bundle (plain or notebook flavored).
//!
//! `content` is present only when the caller requested it; this is a
//! lazy-load contract, not a cache. Serialization via serde is the single
//! uniform access surface for generic sinks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notebook::Notebook;

/// Kind of content model, as reported to callers.
///
/// Bundles report `File` (or `Notebook`); a bundle is presented as a
/// single logical file even though it is a directory on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    File,
    Directory,
    Notebook,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::File => "file",
            ModelKind::Directory => "directory",
            ModelKind::Notebook => "notebook",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content transfer format.
///
/// Set only when content was requested, never guessed for unfetched
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Text,
    Base64,
    Json,
}

/// Fields shared by every model variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBase {
    /// Terminal path segment.
    pub name: String,
    /// Path relative to the declared root (url-style, `/` separated).
    pub path: String,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ModelBase {
    /// Base for entries that aren't backed by a real stat: synthetic
    /// listings like the mount-root view. Timestamps default to now.
    pub fn transient(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or("").to_string();
        let now = Utc::now();
        Self {
            name,
            path,
            created: now,
            last_modified: now,
            size: None,
            writable: None,
            mimetype: None,
            format: None,
            message: None,
        }
    }
}

/// A plain file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileModel {
    #[serde(flatten)]
    pub base: ModelBase,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub content: Option<String>,
}

impl FileModel {
    pub fn new(base: ModelBase, content: Option<String>) -> Self {
        Self {
            base,
            kind: ModelKind::File,
            content,
        }
    }
}

/// A directory listing. `content` holds immediate children only, each
/// built shallow (`content = None`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryModel {
    #[serde(flatten)]
    pub base: ModelBase,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub content: Option<Vec<Model>>,
}

impl DirectoryModel {
    pub fn new(base: ModelBase, content: Option<Vec<Model>>) -> Self {
        Self {
            base,
            kind: ModelKind::Directory,
            content,
        }
    }

    /// Synthetic directory model for listings without a backing stat.
    pub fn transient(path: impl Into<String>, content: Option<Vec<Model>>) -> Self {
        let mut base = ModelBase::transient(path);
        if content.is_some() {
            base.format = Some(Format::Json);
        }
        Self::new(base, content)
    }

    /// Children keyed by path. Handy for tests and generic consumers.
    pub fn children_by_path(&self) -> BTreeMap<String, &Model> {
        let mut dct = BTreeMap::new();
        if let Some(children) = &self.content {
            for child in children {
                dct.insert(child.path().to_string(), child);
            }
        }
        dct
    }
}

/// A regular notebook file (not a bundle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookModel {
    #[serde(flatten)]
    pub base: ModelBase,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub content: Option<Notebook>,
}

impl NotebookModel {
    pub fn new(base: ModelBase, content: Option<Notebook>) -> Self {
        Self {
            base,
            kind: ModelKind::Notebook,
            content,
        }
    }
}

/// Sidecar map: relative name to optional content. `None` means either
/// the caller didn't request sidecar content, or the bytes were not
/// valid UTF-8 (binary sidecars are invisible to content-bearing reads).
pub type SidecarFiles = BTreeMap<String, Option<String>>;

/// A plain bundle: a directory presented as a single logical file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleModel {
    #[serde(flatten)]
    pub base: ModelBase,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub content: Option<String>,
    pub sidecar_files: SidecarFiles,
    pub is_bundle: bool,
}

impl BundleModel {
    pub fn new(base: ModelBase, content: Option<String>, sidecar_files: SidecarFiles) -> Self {
        Self {
            base,
            kind: ModelKind::File,
            content,
            sidecar_files,
            is_bundle: true,
        }
    }
}

/// A notebook bundle: a bundle whose payload is a notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookBundleModel {
    #[serde(flatten)]
    pub base: ModelBase,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub content: Option<Notebook>,
    pub sidecar_files: SidecarFiles,
    pub is_bundle: bool,
}

impl NotebookBundleModel {
    pub fn new(base: ModelBase, content: Option<Notebook>, sidecar_files: SidecarFiles) -> Self {
        Self {
            base,
            kind: ModelKind::Notebook,
            content,
            sidecar_files,
            is_bundle: true,
        }
    }
}

/// The closed set of content models.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Model {
    File(FileModel),
    Directory(DirectoryModel),
    Notebook(NotebookModel),
    Bundle(BundleModel),
    NotebookBundle(NotebookBundleModel),
}

impl Model {
    pub fn base(&self) -> &ModelBase {
        match self {
            Model::File(m) => &m.base,
            Model::Directory(m) => &m.base,
            Model::Notebook(m) => &m.base,
            Model::Bundle(m) => &m.base,
            Model::NotebookBundle(m) => &m.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ModelBase {
        match self {
            Model::File(m) => &mut m.base,
            Model::Directory(m) => &mut m.base,
            Model::Notebook(m) => &mut m.base,
            Model::Bundle(m) => &mut m.base,
            Model::NotebookBundle(m) => &mut m.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn path(&self) -> &str {
        &self.base().path
    }

    /// Rewrite the relative path, leaving the name untouched.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.base_mut().path = path.into();
    }

    /// The kind reported to callers. Bundles report `File`/`Notebook`.
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::File(m) => m.kind,
            Model::Directory(m) => m.kind,
            Model::Notebook(m) => m.kind,
            Model::Bundle(m) => m.kind,
            Model::NotebookBundle(m) => m.kind,
        }
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self, Model::Bundle(_) | Model::NotebookBundle(_))
    }

    pub fn has_content(&self) -> bool {
        match self {
            Model::File(m) => m.content.is_some(),
            Model::Directory(m) => m.content.is_some(),
            Model::Notebook(m) => m.content.is_some(),
            Model::Bundle(m) => m.content.is_some(),
            Model::NotebookBundle(m) => m.content.is_some(),
        }
    }

    /// Immediate children of a directory model, if any were materialized.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Model>> {
        match self {
            Model::Directory(m) => m.content.as_mut(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Notebook;

    fn base(path: &str) -> ModelBase {
        ModelBase::transient(path)
    }

    #[test]
    fn test_transient_base_takes_terminal_segment_as_name() {
        let b = ModelBase::transient("work/sub/x.txt");
        assert_eq!(b.name, "x.txt");
        assert_eq!(b.path, "work/sub/x.txt");
    }

    #[test]
    fn test_model_kind_reporting() {
        let file = Model::File(FileModel::new(base("a.txt"), None));
        assert_eq!(file.kind(), ModelKind::File);
        assert!(!file.is_bundle());

        let bundle = Model::Bundle(BundleModel::new(base("b.txt"), None, SidecarFiles::new()));
        assert_eq!(bundle.kind(), ModelKind::File);
        assert!(bundle.is_bundle());

        let nb_bundle = Model::NotebookBundle(NotebookBundleModel::new(
            base("c.ipynb"),
            Some(Notebook::new()),
            SidecarFiles::new(),
        ));
        assert_eq!(nb_bundle.kind(), ModelKind::Notebook);
        assert!(nb_bundle.is_bundle());
        assert!(nb_bundle.has_content());
    }

    #[test]
    fn test_serialized_type_tag_and_bundle_flag() {
        let bundle = Model::Bundle(BundleModel::new(
            base("example.txt"),
            Some("regular ole bundle".to_string()),
            SidecarFiles::new(),
        ));
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["is_bundle"], true);
        assert_eq!(value["content"], "regular ole bundle");
        assert_eq!(value["name"], "example.txt");
    }

    #[test]
    fn test_plain_file_serializes_without_bundle_fields() {
        let file = Model::File(FileModel::new(base("a.txt"), None));
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["type"], "file");
        assert!(value.get("is_bundle").is_none());
        assert!(value.get("sidecar_files").is_none());
    }

    #[test]
    fn test_set_path_keeps_name() {
        let mut m = Model::File(FileModel::new(base("sub/x.txt"), None));
        m.set_path("work/sub/x.txt");
        assert_eq!(m.path(), "work/sub/x.txt");
        assert_eq!(m.name(), "x.txt");
    }

    #[test]
    fn test_children_by_path() {
        let children = vec![
            Model::File(FileModel::new(base("sub/a.txt"), None)),
            Model::Directory(DirectoryModel::new(base("sub/d"), None)),
        ];
        let dir = DirectoryModel::transient("sub", Some(children));
        let dct = dir.children_by_path();
        assert!(dct.contains_key("sub/a.txt"));
        assert_eq!(dct["sub/d"].kind(), ModelKind::Directory);
    }

    #[test]
    fn test_transient_directory_sets_format_only_with_content() {
        let with = DirectoryModel::transient("x", Some(vec![]));
        assert_eq!(with.base.format, Some(Format::Json));
        let without = DirectoryModel::transient("x", None);
        assert_eq!(without.base.format, None);
    }
}
