//! Pure data types for duffel: content models, notebook documents, checkpoints.
//!
//! This crate is a leaf dependency with no async runtime and no filesystem I/O.
//! It exists so that consumers (API layers, sync tools) can work with duffel's
//! model hierarchy without pulling duffel-core's transitive deps.

pub mod checkpoint;
pub mod models;
pub mod notebook;

// Flat re-exports for convenience
pub use checkpoint::*;
pub use models::*;
pub use notebook::*;
