//! File I/O helpers shared by the plain-file manager and bundles.
//!
//! Path vocabulary, used consistently across the crate:
//! - `os_path`: absolute on-disk path (`PathBuf`)
//! - `path`: url-style path relative to a declared root, `/` separated

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use tokio::fs;

use duffel_types::Format;

use crate::error::{ContentsError, ContentsResult};
use crate::glob::glob_match;

/// Stat snapshot of one on-disk entry.
#[derive(Debug, Clone)]
pub struct PathMetadata {
    /// Byte size for regular files, `None` for directories.
    pub size: Option<u64>,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Stat an os path. Invalid timestamps fall back to the Unix epoch rather
/// than failing the whole model build.
pub async fn path_metadata(os_path: &Path) -> ContentsResult<PathMetadata> {
    let meta = fs::symlink_metadata(os_path)
        .await
        .map_err(|e| ContentsError::from_io(e, os_path))?;

    let size = meta.is_file().then(|| meta.len());
    let last_modified = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::UNIX_EPOCH);
    let created = meta
        .created()
        .map(DateTime::<Utc>::from)
        .unwrap_or(last_modified);

    Ok(PathMetadata {
        size,
        created,
        last_modified,
    })
}

/// Whether the entry accepts writes, as far as its permission bits say.
pub async fn is_writable(os_path: &Path) -> bool {
    match fs::metadata(os_path).await {
        Ok(meta) => !meta.permissions().readonly(),
        Err(_) => false,
    }
}

/// Resolve a root-relative url path to an absolute os path.
///
/// Dot segments are dropped rather than resolved, so no api path can climb
/// above `root`.
pub fn to_os_path(root: &Path, path: &str) -> PathBuf {
    let mut os_path = root.to_path_buf();
    for segment in path.trim_matches('/').split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        os_path.push(segment);
    }
    os_path
}

/// Compute the url path of `os_path` relative to `root`.
///
/// Returns `None` when `os_path` is not under `root`.
pub fn to_api_path(os_path: &Path, root: &Path) -> Option<String> {
    let rel = os_path.strip_prefix(root).ok()?;
    let segments: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(segments.join("/"))
}

/// Read a file as model content.
///
/// With no requested format, tries UTF-8 text first and falls back to
/// base64. Requesting `Text` on non-UTF-8 bytes is an error; requesting
/// `Base64` always succeeds.
pub async fn read_file(os_path: &Path, format: Option<Format>) -> ContentsResult<(String, Format)> {
    let bytes = fs::read(os_path)
        .await
        .map_err(|e| ContentsError::from_io(e, os_path))?;

    match format {
        Some(Format::Base64) => Ok((BASE64.encode(&bytes), Format::Base64)),
        Some(Format::Text) => match String::from_utf8(bytes) {
            Ok(text) => Ok((text, Format::Text)),
            Err(_) => Err(ContentsError::bad_format(os_path, "not UTF-8 encoded")),
        },
        Some(Format::Json) => Err(ContentsError::bad_format(
            os_path,
            "file content format must be 'text' or 'base64'",
        )),
        None => match String::from_utf8(bytes) {
            Ok(text) => Ok((text, Format::Text)),
            Err(err) => Ok((BASE64.encode(err.as_bytes()), Format::Base64)),
        },
    }
}

/// Write model content to a file, decoding base64 when asked.
pub async fn write_file(os_path: &Path, content: &str, format: Format) -> ContentsResult<()> {
    let bytes = match format {
        Format::Text => content.as_bytes().to_vec(),
        Format::Base64 => BASE64
            .decode(content.as_bytes())
            .map_err(|e| ContentsError::bad_format(os_path, format!("invalid base64: {e}")))?,
        Format::Json => {
            return Err(ContentsError::bad_format(
                os_path,
                "file content format must be 'text' or 'base64'",
            ))
        }
    };
    atomic_write(os_path, &bytes).await
}

/// Write bytes via a temporary sibling plus rename, so readers never see a
/// half-written file.
pub async fn atomic_write(os_path: &Path, bytes: &[u8]) -> ContentsResult<()> {
    let tmp = intermediate_path(os_path);
    fs::write(&tmp, bytes)
        .await
        .map_err(|e| ContentsError::from_io(e, &tmp))?;
    fs::rename(&tmp, os_path)
        .await
        .map_err(|e| ContentsError::from_io(e, os_path))
}

fn intermediate_path(os_path: &Path) -> PathBuf {
    let name = os_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    os_path.with_file_name(format!(".~{name}"))
}

/// Should this name appear in a directory listing?
pub fn should_list(name: &str, hide_globs: &[String]) -> bool {
    !hide_globs.iter().any(|glob| glob_match(glob, name))
}

/// Hidden by platform convention: dot-prefixed.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Split a file name at the last extension boundary. The extension keeps
/// its leading dot; dotfiles with no other dot have no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Best-effort mimetype from the file extension. The pack of formats here
/// covers what notebook workspaces usually hold.
pub fn guess_mimetype(os_path: &Path) -> Option<String> {
    let ext = os_path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "py" => "text/x-python",
        "js" => "text/javascript",
        "json" => "application/json",
        "ipynb" => "application/x-ipynb+json",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime.to_string())
}
