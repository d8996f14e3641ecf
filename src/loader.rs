use crate::error::LoadError;
use crate::sheet::{self, RawSheet};
use crate::table::{
    Dataset, GradeRecord, GradeTable, SheetFormat, COL_FIRST_NAME, COL_GRADE, COL_LAST_NAME,
    COL_SUBJECT, COL_UNIT, REQUIRED_COLUMNS,
};
use crate::xlsx;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// CSV field delimiter; sniffed from the header line when unset.
    pub delimiter: Option<u8>,
}

/// Loads the grade spreadsheet at `path`. Never fails: any problem leaves an
/// empty table and is kept on the dataset (and logged) for the front-end.
pub fn load(path: &Path, opts: &LoadOptions) -> Dataset {
    let format = SheetFormat::from_path(path);
    let (table, load_error) = match try_load(path, format, opts) {
        Ok(table) => {
            info!(
                path = %path.display(),
                records = table.len(),
                "grade table loaded"
            );
            (table, None)
        }
        Err(e) => {
            warn!(path = %path.display(), code = e.code(), "{}", e);
            (GradeTable::default(), Some(e))
        }
    };
    Dataset {
        path: path.to_path_buf(),
        format,
        table,
        load_error,
    }
}

pub fn try_load(
    path: &Path,
    format: SheetFormat,
    opts: &LoadOptions,
) -> Result<GradeTable, LoadError> {
    if !path.is_file() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }
    let parsed = match format {
        SheetFormat::Xlsx => xlsx::read_first_sheet(path),
        SheetFormat::Csv => sheet::read_csv(path, opts.delimiter),
    };
    let raw = parsed.map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    })?;
    table_from_sheet(path, &raw)
}

/// Validates the header and converts every non-blank row. Extra columns are
/// ignored; the first occurrence wins when a header name repeats.
pub fn table_from_sheet(path: &Path, raw: &RawSheet) -> Result<GradeTable, LoadError> {
    let col = |name: &str| raw.header.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| col(**c).is_none())
        .map(|c| c.to_string())
        .collect();
    let (Some(last), Some(first), Some(subject), Some(grade), Some(unit)) = (
        col(COL_LAST_NAME),
        col(COL_FIRST_NAME),
        col(COL_SUBJECT),
        col(COL_GRADE),
        col(COL_UNIT),
    ) else {
        return Err(LoadError::MissingColumns { missing });
    };

    let mut records = Vec::with_capacity(raw.rows.len());
    for row in raw.rows.iter().filter(|r| !r.is_blank()) {
        let cell = row.cell(grade);
        if cell.trim().is_empty() {
            warn!(row = row.line, "no {} value, row skipped", COL_GRADE);
            continue;
        }
        let Some(value) = parse_grade(cell) else {
            return Err(LoadError::Parse {
                path: path.to_path_buf(),
                message: format!(
                    "row {}: {} value {:?} is not a number between -{max} and {max}",
                    row.line,
                    COL_GRADE,
                    cell,
                    max = MAX_GRADE_MAGNITUDE
                ),
            });
        };
        records.push(GradeRecord {
            last_name: row.cell(last).to_string(),
            first_name: row.cell(first).to_string(),
            subject: row.cell(subject).to_string(),
            grade: value,
            unit: row.cell(unit).to_string(),
        });
    }
    Ok(GradeTable::new(records))
}

/// Grades further from zero than this are rejected so sums stay finite.
pub const MAX_GRADE_MAGNITUDE: f64 = 1e6;

/// Accepts `12.5` and the decimal-comma form `12,5`.
fn parse_grade(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= MAX_GRADE_MAGNITUDE)
}
