use crate::error::SelectionError;
use crate::table::{GradeRecord, GradeTable};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    pub first_name: String,
    pub last_name: String,
}

impl StudentIdentity {
    /// "First Last", the value the student dropdown shows and sends back.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One student's rows plus the units they appear in. Replaced wholesale on
/// every student change; statistics only ever read from here.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSelection {
    pub display_name: String,
    pub records: Vec<GradeRecord>,
    pub available_units: Vec<String>,
}

impl StudentSelection {
    pub fn has_unit(&self, unit: &str) -> bool {
        self.available_units.iter().any(|u| u == unit)
    }
}

/// Distinct (first, last) pairs sorted by their rendered "First Last" string.
pub fn student_index(table: &GradeTable) -> Vec<StudentIdentity> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut out: Vec<StudentIdentity> = table
        .records()
        .iter()
        .filter(|r| seen.insert((r.first_name.as_str(), r.last_name.as_str())))
        .map(|r| StudentIdentity {
            first_name: r.first_name.clone(),
            last_name: r.last_name.clone(),
        })
        .collect();
    out.sort_by_cached_key(|s| s.display_name());
    out
}

/// Splits "First Last" on a single space. Anything but exactly two tokens is
/// rejected, so multi-word names cannot be selected.
pub fn split_display_name(display_name: &str) -> Result<(&str, &str), SelectionError> {
    let mut parts = display_name.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(last), None) => Ok((first, last)),
        _ => Err(SelectionError::MalformedKey(display_name.to_string())),
    }
}

/// Exact, case-sensitive match on both name fields.
pub fn resolve_selection(
    table: &GradeTable,
    display_name: &str,
) -> Result<StudentSelection, SelectionError> {
    let (first, last) = split_display_name(display_name)?;

    let records: Vec<GradeRecord> = table
        .records()
        .iter()
        .filter(|r| r.first_name == first && r.last_name == last)
        .cloned()
        .collect();
    if records.is_empty() {
        return Err(SelectionError::NoMatchingStudent(display_name.to_string()));
    }

    let available_units = records
        .iter()
        .map(|r| r.unit.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(StudentSelection {
        display_name: display_name.to_string(),
        records,
        available_units,
    })
}

/// `resolve_selection` for the dropdown path: failures are logged and become
/// "no selection".
pub fn resolve(table: &GradeTable, display_name: &str) -> Option<StudentSelection> {
    match resolve_selection(table, display_name) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(code = e.code(), "{}", e);
            None
        }
    }
}
