//! Contents routing for duffel.
//!
//! Three layers implement the same [`Contents`] trait:
//!
//! - **FileContents**: plain files, notebooks, and directories under one root
//! - **BundleContents**: bundle-aware wrapper around FileContents, plus
//!   trash and checkpoints
//! - **MountContents**: routes the first path segment to a named mount
//!
//! ```text
//! ""                      # synthetic root listing (one entry per mount)
//! ├── work/               # BundleContents rooted at /srv/work
//! └── scratch/            # BundleContents rooted at /srv/scratch
//! ```
//!
//! All paths are `/`-separated api paths relative to a root; the empty string
//! names the root itself.

mod file;
mod local;
mod router;
mod traits;

pub use file::FileContents;
pub use local::BundleContents;
pub use router::MountContents;
pub use traits::{Contents, GetOptions};
