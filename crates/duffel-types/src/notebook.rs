//! Notebook document type and codec.
//!
//! A `Notebook` is the decoded payload of a notebook file or notebook bundle.
//! The codec is deterministic: the same document always encodes to the same
//! bytes (struct field order plus sorted metadata maps), so round-trip tests
//! can compare bytes directly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Current major document format version.
pub const NBFORMAT: u32 = 4;
/// Current minor document format version.
pub const NBFORMAT_MINOR: u32 = 5;

/// Errors from decoding a notebook document.
#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("notebook parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported notebook format version {0}")]
    UnsupportedFormat(u32),
}

/// Kind of notebook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

impl CellType {
    /// Lowercase name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CellType::Code => "code",
            CellType::Markdown => "markdown",
            CellType::Raw => "raw",
        }
    }
}

/// One notebook cell.
///
/// `source` is stored as a single string. `outputs` are kept as raw JSON
/// values; duffel never interprets output payloads, it only moves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: String,
    pub cell_type: CellType,
    pub source: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u64>,
}

impl Cell {
    /// Create a code cell with the given id and source.
    pub fn code(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(id, CellType::Code, source)
    }

    /// Create a markdown cell with the given id and source.
    pub fn markdown(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(id, CellType::Markdown, source)
    }

    fn new(id: impl Into<String>, cell_type: CellType, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cell_type,
            source: source.into(),
            metadata: Map::new(),
            outputs: Vec::new(),
            execution_count: None,
        }
    }
}

/// A decoded notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub nbformat: u32,
    pub nbformat_minor: u32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Notebook {
    /// Create an empty notebook at the current format version.
    pub fn new() -> Self {
        Self {
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
            metadata: Map::new(),
            cells: Vec::new(),
        }
    }

    /// Decode a notebook from raw file bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NotebookError> {
        let nb: Notebook = serde_json::from_slice(bytes)?;
        if nb.nbformat < NBFORMAT {
            return Err(NotebookError::UnsupportedFormat(nb.nbformat));
        }
        Ok(nb)
    }

    /// Decode a notebook from a string.
    pub fn from_str(s: &str) -> Result<Self, NotebookError> {
        Self::from_bytes(s.as_bytes())
    }

    /// Encode a notebook to file bytes.
    ///
    /// Deterministic: identical documents produce identical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Struct serialization into a string cannot fail.
        let mut out = serde_json::to_vec_pretty(self).unwrap_or_default();
        out.push(b'\n');
        out
    }

    /// Look up a cell by id.
    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}
