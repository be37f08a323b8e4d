//! Chat assistant route: the text-to-SQL bridge.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::services::text_to_sql::{self, TextToSqlRun};
use crate::AppState;

/// Request body for the assistant bridge.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSqlParams {
    pub query: String,
    pub max_rows: Option<u32>,
}

/// POST /api/chat/text-to-sql — forward a natural-language question to the
/// external service and return the translated UI event stream.
///
/// Always responds 200: upstream failures are represented as `data-error`
/// events inside the body, not as HTTP errors.
pub async fn text_to_sql(
    State(state): State<AppState>,
    Json(params): Json<TextToSqlParams>,
) -> Json<TextToSqlRun> {
    let max_rows = params
        .max_rows
        .unwrap_or(state.config.text_to_sql_max_rows);
    let run = text_to_sql::run(
        &state.http,
        &state.config.text_to_sql_url,
        &params.query,
        max_rows,
    )
    .await;
    Json(run)
}
