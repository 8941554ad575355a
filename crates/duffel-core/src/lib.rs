//! Bundle-aware contents routing for duffel.
//!
//! A *bundle* is a directory containing a payload file of the same name plus
//! sidecar files; external logic addresses the directory as if it were the
//! file. This crate classifies on-disk paths, resolves them into typed
//! models, and routes operations across named mounts:
//!
//! - [`classify`]: what shape does a path have on disk?
//! - [`bundle`]: the bundle abstraction and its notebook specialization
//! - [`vfs`]: the [`Contents`](vfs::Contents) trait and its three backends
//! - [`checkpoints`]: sibling-directory snapshots
//! - [`hooks`]: post-save hooks

pub mod bundle;
pub mod checkpoints;
pub mod classify;
pub mod config;
pub mod error;
pub mod fileio;
pub mod glob;
pub mod hooks;
pub mod script;
pub mod vfs;

pub use bundle::{Bundle, NotebookBundle};
pub use checkpoints::CHECKPOINT_DIR;
pub use classify::{classify, EntryKind, PathEntry};
pub use config::{default_hide_globs, ContentsConfig, ListingOptions};
pub use error::{ContentsError, ContentsResult};
pub use hooks::PostSaveHook;
pub use vfs::{BundleContents, Contents, FileContents, GetOptions, MountContents};
