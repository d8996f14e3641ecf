use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const COL_LAST_NAME: &str = "Nom";
pub const COL_FIRST_NAME: &str = "Prenom";
pub const COL_SUBJECT: &str = "Matière";
pub const COL_GRADE: &str = "Note";
pub const COL_UNIT: &str = "UE";

pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_LAST_NAME,
    COL_FIRST_NAME,
    COL_SUBJECT,
    COL_GRADE,
    COL_UNIT,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub last_name: String,
    pub first_name: String,
    pub subject: String,
    pub grade: f64,
    pub unit: String,
}

/// Every record of the loaded spreadsheet, in file order.
///
/// Built once by the loader and only ever handed out by shared reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeTable {
    records: Vec<GradeRecord>,
}

impl GradeTable {
    pub fn new(records: Vec<GradeRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[GradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn distinct_subjects(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.subject.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn distinct_units(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.unit.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Csv,
    Xlsx,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => SheetFormat::Xlsx,
            _ => SheetFormat::Csv,
        }
    }
}

/// The table plus where it came from. A failed load keeps the path and the
/// reason around so the front-end can show why the selectors are empty.
#[derive(Debug)]
pub struct Dataset {
    pub path: PathBuf,
    pub format: SheetFormat,
    pub table: GradeTable,
    pub load_error: Option<crate::error::LoadError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension_case_insensitively() {
        assert_eq!(SheetFormat::from_path(Path::new("a/b.XLSX")), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::from_path(Path::new("grades.xlsm")), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::from_path(Path::new("grades.csv")), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_path(Path::new("grades")), SheetFormat::Csv);
    }
}
