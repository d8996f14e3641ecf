use crate::calc::{self, PASS_MARK};
use crate::error::NoData;
use crate::roster::StudentSelection;
use crate::table::GradeTable;
use serde::Serialize;
use serde_json::json;
use tracing::warn;

/// `{"status": "ready", ...fields}` or the placeholder
/// `{"status": "noData", "reason", "code", "title"}`. A value that cannot be
/// serialized becomes `{"status": "error", "code", "message"}`, never a
/// placeholder.
pub fn ready_or_placeholder<T: Serialize>(res: Result<T, NoData>) -> serde_json::Value {
    match res {
        Ok(v) => {
            let mut out = json!({ "status": "ready" });
            match serde_json::to_value(v) {
                Ok(serde_json::Value::Object(fields)) => {
                    for (k, v) in fields {
                        out[k] = v;
                    }
                }
                Ok(other) => out["value"] = other,
                Err(e) => {
                    warn!(error = %e, "statistic could not be serialized");
                    return json!({
                        "status": "error",
                        "code": "serialize_failed",
                        "message": e.to_string(),
                    });
                }
            }
            out
        }
        Err(nd) => placeholder(&nd),
    }
}

pub fn placeholder(nd: &NoData) -> serde_json::Value {
    let mut out = json!({
        "status": "noData",
        "reason": nd.reason(),
        "code": nd.code(),
        "title": nd.title(),
    });
    if let NoData::EmptyFilterResult { unit: Some(u) } = nd {
        out["unit"] = json!(u);
    }
    out
}

pub fn selection_json(selection: Option<&StudentSelection>) -> serde_json::Value {
    match selection {
        Some(s) => json!({
            "displayName": s.display_name,
            "availableUnits": s.available_units,
            "recordCount": s.records.len(),
        }),
        None => serde_json::Value::Null,
    }
}

pub fn subject_comparison_json(
    table: &GradeTable,
    selection: Option<&StudentSelection>,
    unit: Option<&str>,
) -> serde_json::Value {
    let res = selection
        .ok_or(NoData::NoSelection)
        .and_then(|s| calc::subject_comparison(table, s, unit))
        .map(|rows| {
            json!({
                "title": selection.map(|s| format!("Detailed performance of {}", s.display_name)),
                "unitFilter": unit,
                "rows": rows,
            })
        });
    ready_or_placeholder(res)
}

pub fn unit_averages_json(selection: Option<&StudentSelection>) -> serde_json::Value {
    let res = selection
        .ok_or(NoData::NoSelection)
        .and_then(calc::unit_averages)
        .map(|rows| json!({ "title": "Average per unit", "rows": rows }));
    ready_or_placeholder(res)
}

pub fn overall_json(selection: Option<&StudentSelection>) -> serde_json::Value {
    let res = selection
        .ok_or(NoData::NoSelection)
        .and_then(calc::overall)
        .map(|o| {
            json!({
                "meanGrade": o.mean_grade,
                "meanGradeDisplay": o.mean_grade_display(),
                "distinctSubjectCount": o.distinct_subject_count,
                "passing": o.passing(),
            })
        });
    ready_or_placeholder(res)
}

/// Everything one dashboard refresh needs.
pub fn dashboard_json(
    table: &GradeTable,
    selection: Option<&StudentSelection>,
    unit: Option<&str>,
) -> serde_json::Value {
    json!({
        "selection": selection_json(selection),
        "unitFilter": unit,
        "passLine": PASS_MARK,
        "subjectComparison": subject_comparison_json(table, selection, unit),
        "unitAverages": unit_averages_json(selection),
        "overall": overall_json(selection),
    })
}
