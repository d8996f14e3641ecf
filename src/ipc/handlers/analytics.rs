use super::students::optional_str;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::view;

/// `params.unit` overrides the session filter when the key is present
/// (`null` meaning all units); otherwise the session filter applies.
fn unit_scope(state: &AppState, req: &Request) -> Result<Option<String>, serde_json::Value> {
    if req.params.get("unit").is_some() {
        optional_str(req, "unit")
    } else {
        Ok(state.unit_filter.clone())
    }
}

fn handle_subject_comparison(state: &mut AppState, req: &Request) -> serde_json::Value {
    let unit = match unit_scope(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        view::subject_comparison_json(
            &state.dataset.table,
            state.selection.as_ref(),
            unit.as_deref(),
        ),
    )
}

fn handle_unit_averages(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, view::unit_averages_json(state.selection.as_ref()))
}

fn handle_overall(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, view::overall_json(state.selection.as_ref()))
}

fn handle_dashboard_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        view::dashboard_json(
            &state.dataset.table,
            state.selection.as_ref(),
            state.unit_filter.as_deref(),
        ),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.subjectComparison" => Some(handle_subject_comparison(state, req)),
        "analytics.unitAverages" => Some(handle_unit_averages(state, req)),
        "analytics.overall" => Some(handle_overall(state, req)),
        "dashboard.open" => Some(handle_dashboard_open(state, req)),
        _ => None,
    }
}
