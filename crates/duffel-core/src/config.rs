//! Configuration for the contents stack.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration: mount table plus per-root listing policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentsConfig {
    /// Mount name to on-disk root directory.
    pub mounts: BTreeMap<String, PathBuf>,

    /// Destination for trashed entries. Trash is unavailable when unset.
    pub trash_dir: Option<PathBuf>,

    /// Glob patterns excluded from directory listings.
    pub hide_globs: Vec<String>,

    /// List dotfiles despite the hidden-name convention.
    pub allow_hidden: bool,

    /// Names of post-save hooks to enable, resolved by the embedding
    /// application.
    pub post_save_hooks: Vec<String>,
}

impl Default for ContentsConfig {
    fn default() -> Self {
        Self {
            mounts: BTreeMap::new(),
            trash_dir: None,
            hide_globs: default_hide_globs(),
            allow_hidden: false,
            post_save_hooks: Vec::new(),
        }
    }
}

/// Patterns hidden from listings by default: caches, editor droppings, and
/// duffel's own derived artifacts.
pub fn default_hide_globs() -> Vec<String> {
    [
        "__pycache__",
        "*.pyc",
        "*~",
        ".DS_Store",
        ".ipynb_checkpoints",
        ".checkpoints",
        "_normalized",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Listing policy threaded through the backends.
#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub hide_globs: Vec<String>,
    pub allow_hidden: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            hide_globs: default_hide_globs(),
            allow_hidden: false,
        }
    }
}

impl ListingOptions {
    pub fn from_config(config: &ContentsConfig) -> Self {
        Self {
            hide_globs: config.hide_globs.clone(),
            allow_hidden: config.allow_hidden,
        }
    }
}
