//! Row loading via the BigQuery REST API

use animeline_core::{SHARED_RUNTIME, http_client, snippet};
use serde::Serialize;
use serde_json::{Value, json};

use crate::table::{TableRef, WriteMode};

/// BigQuery v2 REST base.
pub const BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Rows per insertAll request. The API caps request payload size, not row
/// count; 500 ranking rows stay well under the limit.
const INSERT_CHUNK: usize = 500;

/// Opaque bearer credential authorizing writes to the destination.
#[derive(Clone)]
pub struct WriteToken(String);

impl WriteToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for WriteToken {
    // keeps the secret out of debug logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WriteToken(..)")
    }
}

/// Failure committing a batch to the destination. Fatal for the run.
#[derive(Debug)]
pub enum LoadError {
    /// Transport failure or non-success HTTP status: unreachable destination,
    /// missing write authorization, unknown table.
    Http {
        status: Option<u16>,
        message: String,
    },
    /// The API accepted the request but rejected rows (schema mismatch).
    Rows { failed: usize, first: String },
    /// A row would not serialize to JSON.
    Encode(serde_json::Error),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "load failed (HTTP {s}): {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "load failed: {message}"),
            Self::Rows { failed, first } => {
                write!(f, "destination rejected {failed} row(s): {first}")
            }
            Self::Encode(e) => write!(f, "row encoding failed: {e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl LoadError {
    fn from_reqwest(e: &reqwest::Error) -> Self {
        let (status, message) = animeline_core::error_parts(e);
        Self::Http { status, message }
    }
}

#[derive(Debug)]
pub struct LoadResult {
    pub rows_loaded: usize,
}

/// Writes row batches to a table.
pub struct BigQueryLoader {
    base_url: String,
    token: WriteToken,
}

impl BigQueryLoader {
    pub fn new(token: WriteToken) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    pub fn with_base_url(token: WriteToken, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
        }
    }

    /// Write `rows` to `table`. Append adds rows without touching existing
    /// content; Replace truncates first. An empty batch is a successful no-op.
    pub fn load<T: Serialize>(
        &self,
        rows: &[T],
        table: &TableRef,
        mode: WriteMode,
    ) -> Result<LoadResult, LoadError> {
        if rows.is_empty() {
            log::info!("{table}: nothing to load");
            return Ok(LoadResult { rows_loaded: 0 });
        }

        if mode == WriteMode::Replace {
            self.truncate(table)?;
        }

        for chunk in rows.chunks(INSERT_CHUNK) {
            self.insert_chunk(chunk, table)?;
        }

        log::info!("{table}: loaded {} rows", rows.len());
        Ok(LoadResult {
            rows_loaded: rows.len(),
        })
    }

    fn insert_chunk<T: Serialize>(&self, rows: &[T], table: &TableRef) -> Result<(), LoadError> {
        let body = insert_request(rows)?;
        let response = self.post_json(&table.insert_all_url(&self.base_url), &body)?;
        if let Some((failed, first)) = row_errors(&response) {
            return Err(LoadError::Rows { failed, first });
        }
        Ok(())
    }

    fn truncate(&self, table: &TableRef) -> Result<(), LoadError> {
        log::info!("{table}: truncating before replace");
        let body = json!({
            "query": format!("TRUNCATE TABLE {}", table.sql_ident()),
            "useLegacySql": false,
        });
        self.post_json(&table.query_url(&self.base_url), &body)?;
        Ok(())
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Value, LoadError> {
        SHARED_RUNTIME.handle().block_on(async {
            let resp = http_client()
                .post(url)
                .bearer_auth(self.token.as_str())
                .header("Content-Type", "application/json")
                .body(body.to_string())
                .send()
                .await
                .map_err(|e| LoadError::from_reqwest(&e))?;

            let status = resp.status();
            let text = resp.text().await.map_err(|e| LoadError::from_reqwest(&e))?;
            if !status.is_success() {
                return Err(LoadError::Http {
                    status: Some(status.as_u16()),
                    message: snippet(&text),
                });
            }

            serde_json::from_str(&text).map_err(|e| LoadError::Http {
                status: None,
                message: format!("invalid response: {e}"),
            })
        })
    }
}

/// insertAll request body for a row chunk.
fn insert_request<T: Serialize>(rows: &[T]) -> Result<Value, LoadError> {
    let entries = rows
        .iter()
        .map(|row| serde_json::to_value(row).map(|json| json!({ "json": json })))
        .collect::<Result<Vec<Value>, _>>()
        .map_err(LoadError::Encode)?;

    Ok(json!({
        "kind": "bigquery#tableDataInsertAllRequest",
        "rows": entries,
    }))
}

/// Count and first message of any `insertErrors` in an insertAll response.
fn row_errors(response: &Value) -> Option<(usize, String)> {
    let errors = response.get("insertErrors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let first = errors[0]["errors"][0]["message"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();
    Some((errors.len(), first))
}
