use anyhow::Context;
use std::path::Path;

/// One physical spreadsheet row. `line` is the 1-based row number the user
/// sees in their editor, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn cell(&self, idx: usize) -> &str {
        self.cells.get(idx).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// Untyped grid: the header row plus every data row below it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    /// First non-blank row becomes the header.
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut it = rows.into_iter().skip_while(|r| r.is_blank());
        let Some(header) = it.next() else {
            return RawSheet::default();
        };
        RawSheet {
            header: header.cells.iter().map(|h| h.trim().to_string()).collect(),
            rows: it.collect(),
        }
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Semicolon when the header line uses semicolons and no commas (the usual
/// export from a French-locale spreadsheet), comma otherwise.
pub fn sniff_delimiter(body: &[u8]) -> u8 {
    let first_line = body.split(|b| *b == b'\n').next().unwrap_or(&[]);
    let semis = first_line.iter().filter(|b| **b == b';').count();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    if semis > 0 && commas == 0 {
        b';'
    } else {
        b','
    }
}

pub fn read_csv(path: &Path, delimiter: Option<u8>) -> anyhow::Result<RawSheet> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
    parse_csv(&bytes, delimiter)
}

pub fn parse_csv(bytes: &[u8], delimiter: Option<u8>) -> anyhow::Result<RawSheet> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(body));

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("malformed CSV record #{}", i + 1))?;
        let line = rec
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 1);
        rows.push(RawRow {
            line,
            cells: rec.iter().map(|c| c.to_string()).collect(),
        });
    }
    Ok(RawSheet::from_rows(rows))
}
