//! Minimal reader for the first worksheet of an Office Open XML workbook.
//!
//! Only cell values are read; styles, formulas and dates are not interpreted.

use crate::sheet::{RawRow, RawSheet};
use anyhow::{anyhow, bail, Context};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const WORKBOOK_ENTRY: &str = "xl/workbook.xml";
const WORKBOOK_RELS_ENTRY: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_ENTRY: &str = "xl/sharedStrings.xml";
const DEFAULT_SHEET_ENTRY: &str = "xl/worksheets/sheet1.xml";
/// Column `XFD`, the last one a worksheet may have.
const MAX_COLUMNS: usize = 16_384;
const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub fn read_first_sheet(path: &Path) -> anyhow::Result<RawSheet> {
    let file = File::open(path)
        .with_context(|| format!("failed to open {}", path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(file).context("not an xlsx workbook (zip container)")?;

    let shared = match read_entry(&mut archive, SHARED_STRINGS_ENTRY)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let sheet_entry = first_sheet_entry(&mut archive)?;
    let xml = read_entry(&mut archive, &sheet_entry)?
        .ok_or_else(|| anyhow!("worksheet {} missing from workbook", sheet_entry))?;
    parse_worksheet(&xml, &shared)
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> anyhow::Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut f) => {
            let mut out = String::new();
            f.read_to_string(&mut out)
                .with_context(|| format!("failed to read {}", name))?;
            Ok(Some(out))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(anyhow!(e).context(format!("failed to open {}", name))),
    }
}

/// Resolves the first `<sheet>` of the workbook through its relationship id.
/// Falls back to the conventional sheet1 path for workbooks written without
/// relationship parts.
fn first_sheet_entry<R: Read + Seek>(archive: &mut ZipArchive<R>) -> anyhow::Result<String> {
    let (Some(workbook), Some(rels)) = (
        read_entry(archive, WORKBOOK_ENTRY)?,
        read_entry(archive, WORKBOOK_RELS_ENTRY)?,
    ) else {
        return Ok(DEFAULT_SHEET_ENTRY.to_string());
    };

    let doc = roxmltree::Document::parse(&workbook).context("invalid xl/workbook.xml")?;
    let Some(rel_id) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "sheet")
        .and_then(|n| n.attribute((NS_RELATIONSHIPS, "id")))
    else {
        return Err(anyhow!("workbook has no worksheets"));
    };

    let rels_doc = roxmltree::Document::parse(&rels).context("invalid workbook relationships")?;
    let target = rels_doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        .find(|n| n.attribute("Id") == Some(rel_id))
        .and_then(|n| n.attribute("Target"))
        .ok_or_else(|| anyhow!("relationship {} not found", rel_id))?;

    Ok(match target.strip_prefix('/') {
        Some(abs) => abs.to_string(),
        None => format!("xl/{}", target),
    })
}

fn parse_shared_strings(xml: &str) -> anyhow::Result<Vec<String>> {
    let doc = roxmltree::Document::parse(xml).context("invalid xl/sharedStrings.xml")?;
    Ok(doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "si")
        .map(text_runs)
        .collect())
}

/// Concatenated `<t>` text below a string item, skipping phonetic runs.
fn text_runs(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "t")
        .filter(|n| {
            !n.ancestors()
                .any(|a| a.is_element() && a.tag_name().name() == "rPh")
        })
        .filter_map(|n| n.text())
        .collect()
}

fn parse_worksheet(xml: &str, shared: &[String]) -> anyhow::Result<RawSheet> {
    let doc = roxmltree::Document::parse(xml).context("invalid worksheet xml")?;
    let mut rows = Vec::new();
    let mut next_line = 1usize;

    for row in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "row")
    {
        let line = row
            .attribute("r")
            .and_then(|r| r.parse::<usize>().ok())
            .unwrap_or(next_line);
        next_line = line.saturating_add(1);

        let mut cells: Vec<String> = Vec::new();
        for cell in row
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "c")
        {
            let col = match cell.attribute("r") {
                Some(r) => column_index(r)
                    .with_context(|| format!("bad cell in row {}", line))?
                    .unwrap_or(cells.len()),
                None => cells.len(),
            };
            if col >= MAX_COLUMNS {
                bail!("row {} has more than {} columns", line, MAX_COLUMNS);
            }
            let value = cell_value(cell, shared)
                .with_context(|| format!("bad cell in row {}", line))?;
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = value;
        }
        rows.push(RawRow { line, cells });
    }

    Ok(RawSheet::from_rows(rows))
}

fn cell_value(cell: roxmltree::Node<'_, '_>, shared: &[String]) -> anyhow::Result<String> {
    let v = cell
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "v")
        .and_then(|n| n.text())
        .unwrap_or("");

    Ok(match cell.attribute("t").unwrap_or("n") {
        "s" => {
            let idx = v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("shared string index {:?}", v))?;
            shared
                .get(idx)
                .cloned()
                .ok_or_else(|| anyhow!("shared string {} out of range", idx))?
        }
        "inlineStr" => cell
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "is")
            .map(text_runs)
            .unwrap_or_default(),
        "b" => (if v.trim() == "1" { "TRUE" } else { "FALSE" }).to_string(),
        "str" | "e" => v.to_string(),
        // Numbers come back through f64 so `1.0` and `1` both render as "1".
        _ => match v.trim().parse::<f64>() {
            Ok(n) => n.to_string(),
            Err(_) => v.to_string(),
        },
    })
}

/// "A1" -> 0, "AB12" -> 27. `None` when the reference has no column letters.
fn column_index(cell_ref: &str) -> anyhow::Result<Option<usize>> {
    let mut idx = 0usize;
    for c in cell_ref.chars().take_while(|c| c.is_ascii_alphabetic()) {
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        idx = idx
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .filter(|v| *v <= MAX_COLUMNS)
            .ok_or_else(|| anyhow!("cell reference {:?} is past column XFD", cell_ref))?;
    }
    Ok(idx.checked_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_path(rel: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
    }

    #[test]
    fn column_refs_map_to_zero_based_indexes() {
        assert_eq!(column_index("A1").ok(), Some(Some(0)));
        assert_eq!(column_index("E7").ok(), Some(Some(4)));
        assert_eq!(column_index("AB12").ok(), Some(Some(27)));
        assert_eq!(column_index("XFD1").ok(), Some(Some(MAX_COLUMNS - 1)));
        assert_eq!(column_index("12").ok(), Some(None));
        assert!(column_index("XFE1").is_err());
        assert!(column_index("ZZZZZZZZZZZZZZZ1").is_err());
    }

    #[test]
    fn oversized_cell_reference_is_an_error() {
        for r in ["ZZZZZZZZZZZZZZZ1", "ZZZZZZ1"] {
            let xml = format!(
                r#"<worksheet><sheetData><row r="1"><c r="{}" t="inlineStr"><is><t>Nom</t></is></c></row></sheetData></worksheet>"#,
                r
            );
            assert!(parse_worksheet(&xml, &[]).is_err(), "{}", r);
        }
    }

    #[test]
    fn huge_row_number_does_not_overflow() {
        let xml = format!(
            r#"<worksheet><sheetData><row r="{}"><c t="inlineStr"><is><t>Nom</t></is></c></row><row><c t="inlineStr"><is><t>Dupont</t></is></c></row></sheetData></worksheet>"#,
            usize::MAX
        );
        let sheet = parse_worksheet(&xml, &[]).expect("parse worksheet");
        assert_eq!(sheet.header, vec!["Nom"]);
        assert_eq!(sheet.rows[0].line, usize::MAX);
    }

    #[test]
    fn worksheet_cells_resolve_shared_inline_and_numbers() {
        let shared = vec!["Nom".to_string(), "Dupont".to_string()];
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
            <sheetData>
              <row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1" t="inlineStr"><is><t>Note</t></is></c></row>
              <row r="3"><c r="A3" t="s"><v>1</v></c><c r="C3"><v>12.5</v></c><c r="D3"><v>1.0</v></c></row>
            </sheetData>
        </worksheet>"#;
        let sheet = parse_worksheet(xml, &shared).expect("parse worksheet");
        assert_eq!(sheet.header, vec!["Nom", "", "Note"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].line, 3);
        assert_eq!(sheet.rows[0].cell(0), "Dupont");
        assert_eq!(sheet.rows[0].cell(1), "");
        assert_eq!(sheet.rows[0].cell(2), "12.5");
        assert_eq!(sheet.rows[0].cell(3), "1");
    }

    #[test]
    fn shared_strings_join_rich_text_runs() {
        let xml = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
            <si><t>Matière</t></si>
            <si><r><t>Phy</t></r><r><t>sics</t></r></si>
        </sst>"#;
        let v = parse_shared_strings(xml).expect("parse sst");
        assert_eq!(v, vec!["Matière", "Physics"]);
    }

    #[test]
    fn reads_fixture_workbook() {
        let sheet = read_first_sheet(&fixture_path("fixtures/grades_sample.xlsx"))
            .expect("read xlsx fixture");
        assert_eq!(sheet.header, vec!["Nom", "Prenom", "Matière", "Note", "UE"]);
        assert_eq!(sheet.rows.len(), 6);
        assert_eq!(sheet.rows[0].cell(1), "Jean");
        assert_eq!(sheet.rows[0].cell(3), "8");
    }

    #[test]
    fn non_zip_file_is_rejected() {
        assert!(read_first_sheet(&fixture_path("fixtures/grades_sample.csv")).is_err());
    }
}
