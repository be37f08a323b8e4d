//! Assistant bridge to the external text-to-SQL service.
//!
//! The service owns the actual natural-language-to-SQL translation and query
//! execution; this module only formats the request, interprets the JSON
//! reply, and turns it into the ordered event stream the chat UI consumes.
//! Failures are never mapped to HTTP errors here: an unreachable or
//! unsuccessful upstream becomes a single `data-error` event plus a
//! user-facing message. No retries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request body forwarded to `POST {base}/api/text-to-sql`.
#[derive(Debug, Serialize)]
struct UpstreamRequest<'a> {
    query: &'a str,
    max_rows: u32,
}

/// Reply shape of the text-to-SQL service.
#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    #[serde(default)]
    success: bool,
    query: Option<String>,
    sql: Option<String>,
    response: Option<String>,
    #[serde(default)]
    results: Vec<Value>,
    row_count: Option<i64>,
    error: Option<String>,
}

/// One UI update event, tagged the way the chat frontend expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum StreamEvent {
    #[serde(rename = "data-sql")]
    Sql(String),
    #[serde(rename = "data-rowCount")]
    RowCount(i64),
    #[serde(rename = "data-kind")]
    Kind(String),
    #[serde(rename = "data-id")]
    Id(Uuid),
    #[serde(rename = "data-title")]
    Title(String),
    #[serde(rename = "data-content")]
    Content(String),
    #[serde(rename = "data-finish")]
    Finish(()),
    #[serde(rename = "data-error")]
    Error(String),
}

/// Final tool result handed back to the chat turn.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

/// Events in emission order plus the tool outcome.
#[derive(Debug, Serialize)]
pub struct TextToSqlRun {
    pub events: Vec<StreamEvent>,
    pub outcome: ToolOutcome,
}

/// Forward a natural-language question to the text-to-SQL service and
/// translate its reply into UI events. Infallible by design: every failure
/// mode collapses into a `data-error` event.
pub async fn run(
    http: &reqwest::Client,
    base_url: &str,
    query: &str,
    max_rows: u32,
) -> TextToSqlRun {
    tracing::debug!(query, max_rows, base_url, "Forwarding text-to-sql request");

    let url = format!("{base_url}/api/text-to-sql");
    let response = match http
        .post(&url)
        .json(&UpstreamRequest { query, max_rows })
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => return transport_failure(e.to_string()),
    };

    if !response.status().is_success() {
        return transport_failure(format!("API error: {}", response.status()));
    }

    let result: UpstreamResponse = match response.json().await {
        Ok(body) => body,
        Err(e) => return transport_failure(format!("Invalid upstream response: {e}")),
    };

    if result.success && result.error.is_none() {
        translate_success(result)
    } else {
        translate_failure(result)
    }
}

fn translate_success(result: UpstreamResponse) -> TextToSqlRun {
    let mut events = Vec::new();

    if let Some(sql) = &result.sql {
        events.push(StreamEvent::Sql(sql.clone()));
    }
    if let Some(row_count) = result.row_count {
        events.push(StreamEvent::RowCount(row_count));
    }

    // Rows become a sheet artifact: CSV content bracketed by metadata events.
    if !result.results.is_empty() {
        let row_count = result.row_count.unwrap_or(result.results.len() as i64);
        events.push(StreamEvent::Kind("sheet".to_string()));
        events.push(StreamEvent::Id(Uuid::new_v4()));
        events.push(StreamEvent::Title(format!(
            "SQL Query Results ({row_count} rows)"
        )));
        events.push(StreamEvent::Content(rows_to_csv(&result.results)));
        events.push(StreamEvent::Finish(()));
    }

    let message = result.response.clone().unwrap_or_else(|| {
        format!(
            "Query executed successfully. Retrieved {} rows.",
            result.row_count.unwrap_or(result.results.len() as i64)
        )
    });

    TextToSqlRun {
        events,
        outcome: ToolOutcome {
            success: true,
            query: result.query,
            sql: result.sql,
            row_count: result.row_count,
            error: None,
            message,
        },
    }
}

fn translate_failure(result: UpstreamResponse) -> TextToSqlRun {
    let error = result
        .error
        .unwrap_or_else(|| "Query execution failed".to_string());
    tracing::warn!(error = %error, "Text-to-sql query failed");

    let sql = result.sql.clone().unwrap_or_default();
    let message = format!(
        "The query could not be executed: {error}\n\nGenerated SQL:\n```sql\n{sql}\n```\n\nTry rephrasing the question or adding more specific details."
    );

    TextToSqlRun {
        events: vec![StreamEvent::Error(error.clone())],
        outcome: ToolOutcome {
            success: false,
            query: result.query,
            sql: result.sql,
            row_count: None,
            error: Some(error),
            message,
        },
    }
}

fn transport_failure(error: String) -> TextToSqlRun {
    tracing::warn!(error = %error, "Text-to-sql service unreachable");
    TextToSqlRun {
        events: vec![StreamEvent::Error(error.clone())],
        outcome: ToolOutcome {
            success: false,
            query: None,
            sql: None,
            row_count: None,
            error: Some(error),
            message: "The database assistant is unavailable right now. Please try again later."
                .to_string(),
        },
    }
}

/// Render result rows as CSV with a header line. Column order follows the
/// first row; NULL and missing values render as empty fields.
fn rows_to_csv(rows: &[Value]) -> String {
    let headers: Vec<String> = match rows.first().and_then(Value::as_object) {
        Some(first) => first.keys().cloned().collect(),
        None => return String::new(),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    if writer.write_record(&headers).is_err() {
        return String::new();
    }
    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|h| match row.get(h) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        if writer.write_record(&record).is_err() {
            return String::new();
        }
    }

    match writer.into_inner() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim_end().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "CSV rendering failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_tags_match_frontend_contract() {
        let sql = serde_json::to_value(StreamEvent::Sql("SELECT 1".into())).unwrap();
        assert_eq!(sql["type"], "data-sql");
        assert_eq!(sql["data"], "SELECT 1");

        let count = serde_json::to_value(StreamEvent::RowCount(42)).unwrap();
        assert_eq!(count["type"], "data-rowCount");
        assert_eq!(count["data"], 42);

        let finish = serde_json::to_value(StreamEvent::Finish(())).unwrap();
        assert_eq!(finish["type"], "data-finish");
        assert!(finish.as_object().unwrap()["data"].is_null());
        assert!(finish.as_object().unwrap().contains_key("data"));

        let error = serde_json::to_value(StreamEvent::Error("boom".into())).unwrap();
        assert_eq!(error["type"], "data-error");
    }

    #[test]
    fn csv_renders_header_and_rows() {
        let rows = vec![
            json!({"name": "Widget", "qty": 3}),
            json!({"name": "Gadget", "qty": 7}),
        ];
        let csv = rows_to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "name,qty");
        assert_eq!(lines[1], "Widget,3");
        assert_eq!(lines[2], "Gadget,7");
    }

    #[test]
    fn csv_quotes_embedded_commas_and_quotes() {
        let rows = vec![json!({"customer": "Acme, Inc.", "note": "said \"ok\""})];
        let csv = rows_to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "\"Acme, Inc.\",\"said \"\"ok\"\"\"");
    }

    #[test]
    fn csv_renders_null_and_missing_as_empty() {
        let rows = vec![
            json!({"a": 1, "b": null}),
            json!({"a": 2}),
        ];
        let csv = rows_to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "1,");
        assert_eq!(lines[2], "2,");
    }

    #[test]
    fn csv_of_no_rows_is_empty() {
        assert_eq!(rows_to_csv(&[]), "");
    }

    #[test]
    fn failure_payload_yields_single_error_event() {
        let run = translate_failure(UpstreamResponse {
            success: false,
            query: Some("how many orders".into()),
            sql: Some("SELECT COUNT(*) FROM orders".into()),
            response: None,
            results: vec![],
            row_count: None,
            error: Some("relation \"orders\" does not exist".into()),
        });

        assert_eq!(run.events.len(), 1);
        assert!(matches!(run.events[0], StreamEvent::Error(_)));
        assert!(!run.outcome.success);
        assert!(run.outcome.message.contains("SELECT COUNT(*) FROM orders"));
        assert!(run
            .outcome
            .message
            .contains("relation \"orders\" does not exist"));
    }

    #[test]
    fn success_with_rows_emits_sheet_burst_ending_in_finish() {
        let run = translate_success(UpstreamResponse {
            success: true,
            query: Some("top customers".into()),
            sql: Some("SELECT customer FROM sales".into()),
            response: Some("Here are the top customers.".into()),
            results: vec![json!({"customer": "Acme"})],
            row_count: Some(1),
            error: None,
        });

        assert!(matches!(run.events[0], StreamEvent::Sql(_)));
        assert!(matches!(run.events[1], StreamEvent::RowCount(1)));
        assert!(run
            .events
            .iter()
            .any(|e| matches!(e, StreamEvent::Content(_))));
        assert_eq!(run.events.last(), Some(&StreamEvent::Finish(())));
        assert!(run.outcome.success);
        assert_eq!(run.outcome.message, "Here are the top customers.");
    }

    #[test]
    fn success_without_rows_skips_the_sheet_burst() {
        let run = translate_success(UpstreamResponse {
            success: true,
            query: Some("delete nothing".into()),
            sql: Some("SELECT 1 WHERE false".into()),
            response: None,
            results: vec![],
            row_count: Some(0),
            error: None,
        });

        assert_eq!(run.events.len(), 2);
        assert!(matches!(run.events[0], StreamEvent::Sql(_)));
        assert!(matches!(run.events[1], StreamEvent::RowCount(0)));
        assert!(run.outcome.message.contains("Retrieved 0 rows"));
    }
}
