//! Percent-script derivation: the plain-text secondary artifact of a
//! notebook document.
//!
//! Each cell becomes a `# %%` header carrying the cell id (and the cell
//! type for non-code cells), followed by the cell source. The export exists
//! for non-payload consumers (diffing, plain-text viewing) and is derived,
//! never authoritative.

use duffel_types::{Cell, CellType, Notebook};

/// Derive the percent-script export of a notebook.
///
/// Cells with empty (post-munge) source are skipped. Markdown and raw
/// sources are fenced in triple-quoted blocks; magic and shell-escape lines
/// in code cells are commented out so the artifact stays syntactically
/// plausible Python.
pub fn notebook_to_script(nb: &Notebook) -> String {
    let mut blocks = Vec::new();

    for cell in &nb.cells {
        let source = munge_source(&cell.source);
        if source.trim().is_empty() {
            continue;
        }

        let header = cell_header(cell);
        let block = match cell.cell_type {
            CellType::Code => format!("{header}\n\n{source}"),
            CellType::Markdown | CellType::Raw => {
                format!("{header}\n\n\"\"\"\n{source}\n\"\"\"")
            }
        };
        blocks.push(block);
    }

    blocks.join("\n\n")
}

fn cell_header(cell: &Cell) -> String {
    let mut bits = Vec::new();
    if cell.cell_type != CellType::Code {
        bits.push(format!("[{}]", cell.cell_type.as_str()));
    }
    bits.push(format!("id={}", cell.id));
    format!("# %% {}", bits.join(" "))
}

fn munge_source(source: &str) -> String {
    let source = source.trim();

    // Cell magics swallow the whole cell; fence rather than rewrite.
    if source.starts_with("%%") {
        return format!("\"\"\"\n{source}\n\"\"\"");
    }

    let lines: Vec<String> = source
        .split('\n')
        .map(|line| {
            if line.starts_with('!') || line.starts_with('%') {
                format!("# |{line}|")
            } else {
                line.to_string()
            }
        })
        .collect();
    lines.join("\n")
}

/// A parsed `# %%` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHeader {
    pub id: String,
    pub cell_type: CellType,
}

/// Parse a script cell header back out of a line.
///
/// Returns `None` for non-header lines and for headers missing an id.
/// Cell type defaults to code when unmarked.
pub fn parse_script_header(line: &str) -> Option<ScriptHeader> {
    let rest = line.strip_prefix("# %%")?;

    let mut id = None;
    let mut cell_type = CellType::Code;

    for bit in rest.split(' ') {
        let bit = bit.trim();
        if bit.is_empty() {
            continue;
        }
        if let Some(marked) = bit.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
            cell_type = match marked {
                "markdown" => CellType::Markdown,
                "raw" => CellType::Raw,
                _ => CellType::Code,
            };
        } else if let Some(value) = bit.strip_prefix("id=") {
            id = Some(value.to_string());
        }
    }

    Some(ScriptHeader {
        id: id?,
        cell_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_cell_header_carries_id() {
        let mut nb = Notebook::new();
        nb.cells.push(Cell::code("abc123", "x = 1"));
        let script = notebook_to_script(&nb);
        assert_eq!(script, "# %% id=abc123\n\nx = 1");
    }

    #[test]
    fn test_markdown_cell_is_fenced_and_typed() {
        let mut nb = Notebook::new();
        nb.cells.push(Cell::markdown("m1", "# Title"));
        let script = notebook_to_script(&nb);
        assert_eq!(script, "# %% [markdown] id=m1\n\n\"\"\"\n# Title\n\"\"\"");
    }

    #[test]
    fn test_magic_lines_are_commented() {
        let mut nb = Notebook::new();
        nb.cells.push(Cell::code("c1", "%matplotlib inline\nx = 1\n!ls"));
        let script = notebook_to_script(&nb);
        assert!(script.contains("# |%matplotlib inline|"));
        assert!(script.contains("# |!ls|"));
        assert!(script.contains("\nx = 1\n"));
    }

    #[test]
    fn test_cell_magic_source_is_fenced() {
        let mut nb = Notebook::new();
        nb.cells.push(Cell::code("c1", "%%bash\necho hi"));
        let script = notebook_to_script(&nb);
        assert!(script.contains("\"\"\"\n%%bash\necho hi\n\"\"\""));
    }

    #[test]
    fn test_blank_cells_are_skipped() {
        let mut nb = Notebook::new();
        nb.cells.push(Cell::code("c1", "   \n  "));
        nb.cells.push(Cell::code("c2", "y = 2"));
        let script = notebook_to_script(&nb);
        assert_eq!(script, "# %% id=c2\n\ny = 2");
    }

    #[test]
    fn test_parse_header_round_trip() {
        let mut nb = Notebook::new();
        nb.cells.push(Cell::markdown("m1", "hello"));
        let script = notebook_to_script(&nb);
        let header = parse_script_header(script.lines().next().unwrap()).unwrap();
        assert_eq!(header.id, "m1");
        assert_eq!(header.cell_type, CellType::Markdown);
    }

    #[test]
    fn test_parse_header_defaults_to_code() {
        let header = parse_script_header("# %% id=zz").unwrap();
        assert_eq!(header.cell_type, CellType::Code);
    }

    #[test]
    fn test_parse_header_requires_id() {
        assert!(parse_script_header("# %% [markdown]").is_none());
        assert!(parse_script_header("plain line").is_none());
    }
}
