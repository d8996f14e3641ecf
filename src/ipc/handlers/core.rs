use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::roster;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "dataPath": state.dataset.path.to_string_lossy(),
            "recordCount": state.dataset.table.len(),
        }),
    )
}

fn handle_dataset_info(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ds = &state.dataset;
    let load_error = ds.load_error.as_ref().map(|e| {
        json!({
            "code": e.code(),
            "message": e.to_string(),
        })
    });
    ok(
        &req.id,
        json!({
            "path": ds.path.to_string_lossy(),
            "format": ds.format,
            "recordCount": ds.table.len(),
            "studentCount": roster::student_index(&ds.table).len(),
            "subjectCount": ds.table.distinct_subjects(),
            "unitCount": ds.table.distinct_units(),
            "loadError": load_error,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "dataset.info" => Some(handle_dataset_info(state, req)),
        _ => None,
    }
}
