//! Checkpoint persistence: timestamped snapshot copies of a payload file.
//!
//! Checkpoints live in a `.checkpoints` directory next to the payload they
//! snapshot, named `{stem}---{id}{ext}`. Ids are second-resolution local
//! timestamps. Listing order follows filesystem enumeration; callers sort
//! by id if they want chronology.

use std::path::Path;

use chrono::Local;
use tokio::fs;

use duffel_types::CheckpointModel;

use crate::error::{ContentsError, ContentsResult};
use crate::fileio::{path_metadata, split_name};

/// Directory holding checkpoint snapshots, sibling to the payload file.
pub const CHECKPOINT_DIR: &str = ".checkpoints";

/// Separator between the owning entry's stem and the checkpoint id.
const ID_SEPARATOR: &str = "---";

/// Mint a checkpoint id from the local clock.
pub fn new_checkpoint_id() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Checkpoint filename for an entry name and id.
pub fn checkpoint_filename(name: &str, id: &str) -> String {
    let (stem, ext) = split_name(name);
    format!("{stem}{ID_SEPARATOR}{id}{ext}")
}

/// Snapshot `payload` into `cp_dir` under a fresh id.
pub async fn create_checkpoint_file(
    cp_dir: &Path,
    payload: &Path,
    name: &str,
) -> ContentsResult<CheckpointModel> {
    if !cp_dir.exists() {
        fs::create_dir_all(cp_dir)
            .await
            .map_err(|e| ContentsError::from_io(e, cp_dir))?;
    }

    let id = new_checkpoint_id();
    let cp_path = cp_dir.join(checkpoint_filename(name, &id));
    fs::copy(payload, &cp_path)
        .await
        .map_err(|e| ContentsError::from_io(e, payload))?;

    let meta = path_metadata(&cp_path).await?;
    Ok(CheckpointModel {
        id,
        last_modified: meta.last_modified,
    })
}

/// List the checkpoints belonging to `name` inside `cp_dir`.
///
/// Matches on both the `{stem}---` prefix and the extension, so siblings
/// sharing a stem (`a.txt`, `a.md`) never see each other's snapshots.
pub async fn list_checkpoint_files(
    cp_dir: &Path,
    name: &str,
) -> ContentsResult<Vec<CheckpointModel>> {
    if !cp_dir.is_dir() {
        return Ok(Vec::new());
    }

    let (stem, ext) = split_name(name);
    let prefix = format!("{stem}{ID_SEPARATOR}");

    let mut checkpoints = Vec::new();
    let mut dir = fs::read_dir(cp_dir)
        .await
        .map_err(|e| ContentsError::from_io(e, cp_dir))?;

    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| ContentsError::from_io(e, cp_dir))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| ContentsError::from_io(e, &entry.path()))?;
        if !file_type.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let (cp_stem, cp_ext) = split_name(&file_name);
        if cp_ext != ext {
            continue;
        }
        let Some(id) = cp_stem.strip_prefix(prefix.as_str()) else {
            continue;
        };

        let meta = path_metadata(&entry.path()).await?;
        checkpoints.push(CheckpointModel {
            id: id.to_string(),
            last_modified: meta.last_modified,
        });
    }

    // Id order is chronological order for this id format.
    checkpoints.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(checkpoints)
}
