//! Checkpoint records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One checkpoint of a payload file.
///
/// The id doubles as the timestamp portion of the on-disk checkpoint
/// filename (`{stem}---{id}{ext}`). Listings carry no ordering guarantee
/// beyond filesystem enumeration order; callers wanting chronology sort
/// by id themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointModel {
    pub id: String,
    pub last_modified: DateTime<Utc>,
}
