use crate::error::NoData;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use crate::view;
use serde_json::json;
use tracing::{debug, warn};

/// Reads an optional string param. Missing and `null` both mean "none";
/// any other type is rejected.
pub(super) fn optional_str(req: &Request, key: &str) -> Result<Option<String>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v.as_str().map(|s| Some(s.to_string())).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a string or null", key),
                None,
            )
        }),
    }
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let students: Vec<serde_json::Value> = roster::student_index(&state.dataset.table)
        .into_iter()
        .map(|s| {
            json!({
                "firstName": s.first_name,
                "lastName": s.last_name,
                "displayName": s.display_name(),
            })
        })
        .collect();
    ok(&req.id, json!({ "students": students }))
}

fn handle_students_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let display_name = match optional_str(req, "displayName") {
        Ok(v) => v,
        Err(e) => return e,
    };

    // A new student always starts from "all units".
    state.unit_filter = None;
    state.selection = None;

    let diagnostic = match display_name.as_deref() {
        None => {
            let nd = NoData::NoSelection;
            Some(json!({ "code": nd.code(), "message": nd.to_string() }))
        }
        Some(name) => match roster::resolve_selection(&state.dataset.table, name) {
            Ok(sel) => {
                debug!(
                    student = %sel.display_name,
                    records = sel.records.len(),
                    units = sel.available_units.len(),
                    "student selected"
                );
                state.selection = Some(sel);
                None
            }
            Err(e) => {
                warn!(code = e.code(), "{}", e);
                Some(json!({ "code": e.code(), "message": e.to_string() }))
            }
        },
    };

    ok(
        &req.id,
        json!({
            "selection": view::selection_json(state.selection.as_ref()),
            "unitFilter": serde_json::Value::Null,
            "diagnostic": diagnostic,
        }),
    )
}

fn handle_units_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let unit = match optional_str(req, "unit") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(selection) = state.selection.as_ref() else {
        return err(&req.id, "no_selection", "select a student first", None);
    };
    if let Some(u) = unit.as_deref() {
        if !selection.has_unit(u) {
            debug!(unit = u, student = %selection.display_name, "unit not taken by student");
        }
    }
    state.unit_filter = unit;
    ok(&req.id, json!({ "unitFilter": state.unit_filter }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.select" => Some(handle_students_select(state, req)),
        "units.select" => Some(handle_units_select(state, req)),
        _ => None,
    }
}
