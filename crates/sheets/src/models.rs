use serde::{Deserialize, Serialize};

use sheetfolio_core::cells::Row;

/// A block of values as read from or written to a range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Omitted by the API for an empty range.
    #[serde(default)]
    pub values: Vec<Row>,
}

impl ValueRange {
    pub fn rows(range: &str, values: Vec<Row>) -> Self {
        Self {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<usize>,
    #[serde(default)]
    pub updated_cells: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: Option<UpdateResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
