use crate::roster::StudentSelection;
use crate::table::Dataset;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// One dashboard session. The dataset is read-only for the life of the
/// process; the selection and unit filter change with the dropdowns.
pub struct AppState {
    pub dataset: Dataset,
    pub selection: Option<StudentSelection>,
    pub unit_filter: Option<String>,
}

impl AppState {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            selection: None,
            unit_filter: None,
        }
    }
}
