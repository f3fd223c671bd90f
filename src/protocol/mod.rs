//! HTTP-level building blocks of the pipeline.
//!
//! - **[headers]** - header and query merge/format policies
//! - **[status]** - status-code validation and [`StatusCodeError`]

pub mod headers;
pub mod status;

pub use headers::{format_query, merge_headers, merge_query, to_header_map};
pub use status::{rejection, StatusCodeError, StatusValidator};

/// Content types the built-in coders produce.
pub mod content_type {
    /// JSON bodies
    pub const JSON: &str = "application/json";
    /// Plain text bodies
    pub const TEXT: &str = "text/plain; charset=utf-8";
    /// Raw binary bodies
    pub const OCTET_STREAM: &str = "application/octet-stream";
    /// Newline-delimited JSON, one message per line
    pub const NDJSON: &str = "application/x-ndjson";

    /// Whether a `Content-Type` value announces one message per line.
    ///
    /// ```
    /// use typed_rest::protocol::content_type::is_line_delimited;
    ///
    /// assert!(is_line_delimited("application/x-ndjson; charset=utf-8"));
    /// assert!(is_line_delimited("Application/JSONL"));
    /// assert!(!is_line_delimited("application/json"));
    /// ```
    pub fn is_line_delimited(value: &str) -> bool {
        let essence = value.split(';').next().unwrap_or_default().trim();
        ["application/x-ndjson", "application/ndjson", "application/jsonl", "application/x-jsonlines"]
            .iter()
            .any(|known| essence.eq_ignore_ascii_case(known))
    }
}
