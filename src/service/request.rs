//! Request envelope parsing.
//!
//! Requests arrive as one JSON object per line. Numeric fields are decimal
//! strings; anything that fails to parse is a bad request.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, TexQueryError};

const DEFAULT_SEARCH_TIMEOUT_SECS: f64 = 10.0;
const DEFAULT_PREPROCESSOR_TIMEOUT_SECS: f64 = 5.0;

/// Response serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Xml,
    Json,
}

/// A validated query request.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub search_term: String,
    pub search_timeout: Duration,
    pub preprocessor_timeout: Duration,
    /// 1-based index of the first document to return.
    pub start_at: usize,
    /// Inclusive index of the last document to return; `None` means
    /// unbounded.
    pub end_at: Option<usize>,
    pub format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    query: RawQuery,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuery {
    search_term: String,
    search_timeout: Option<String>,
    preprocessor_timeout: Option<String>,
    start_at: Option<String>,
    end_at: Option<String>,
    format: Option<String>,
}

/// Parse one request line.
pub fn parse(line: &str) -> Result<QueryRequest> {
    let envelope: Envelope = serde_json::from_str(line)
        .map_err(|e| TexQueryError::bad_request(format!("malformed request: {e}")))?;
    let raw = envelope.query;

    let search_timeout = parse_seconds("searchTimeout", raw.search_timeout.as_deref())?
        .unwrap_or(Duration::from_secs_f64(DEFAULT_SEARCH_TIMEOUT_SECS));
    let preprocessor_timeout =
        parse_seconds("preprocessorTimeout", raw.preprocessor_timeout.as_deref())?
            .unwrap_or(Duration::from_secs_f64(DEFAULT_PREPROCESSOR_TIMEOUT_SECS));
    let start_at = parse_index("startAt", raw.start_at.as_deref())?.unwrap_or(1);
    let end_at = parse_index("endAt", raw.end_at.as_deref())?;

    let format = match raw.format.as_deref() {
        None | Some("xml") => ResponseFormat::Xml,
        Some("json") => ResponseFormat::Json,
        Some(other) => {
            return Err(TexQueryError::bad_request(format!(
                "unknown format {other:?}"
            )));
        }
    };

    Ok(QueryRequest {
        search_term: raw.search_term,
        search_timeout,
        preprocessor_timeout,
        start_at,
        end_at,
        format,
    })
}

fn parse_seconds(field: &str, value: Option<&str>) -> Result<Option<Duration>> {
    let Some(value) = value else { return Ok(None) };
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| TexQueryError::bad_request(format!("invalid {field}: {value:?}")))?;
    // Duration::from_secs_f64 panics beyond Duration::MAX, and
    // Duration::MAX.as_secs_f64() itself rounds up past the limit.
    if !secs.is_finite() || secs < 0.0 || secs >= Duration::MAX.as_secs_f64() {
        return Err(TexQueryError::bad_request(format!(
            "invalid {field}: {value:?}"
        )));
    }
    Ok(Some(Duration::from_secs_f64(secs)))
}

fn parse_index(field: &str, value: Option<&str>) -> Result<Option<usize>> {
    let Some(value) = value else { return Ok(None) };
    let index: usize = value
        .trim()
        .parse()
        .map_err(|_| TexQueryError::bad_request(format!("invalid {field}: {value:?}")))?;
    Ok(Some(index))
}
