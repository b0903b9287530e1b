//! Synchronous client for the Markup AI style API.
//!
//! # Overview
//! Exposes style guides, style checks, style suggestions and style rewrites
//! through typed facades on `MarkupClient`. Every call is one blocking HTTP
//! round-trip; server-side jobs are observed by polling `get`.
//!
//! # Design
//! - `Transport` builds `HttpRequest` values, hands them to an `HttpSender`,
//!   and maps the `HttpResponse` to JSON or a typed `Error`. The sender is
//!   injectable; the default uses a blocking `reqwest` client.
//! - Models parse the JSON into immutable entities, tolerating the flat and
//!   workflow-nested shapes the API returns.
//! - No retries happen inside the client. `Error::is_retryable` tells the
//!   caller which failures are worth retrying.
//!
//! ```no_run
//! use markupai_core::MarkupClient;
//! use serde_json::json;
//!
//! let client = MarkupClient::new("your-api-token")?;
//! let check = client.style_checks().create(&json!({
//!     "content": "Some text to check.",
//!     "style_guide": "ap",
//! }))?;
//! println!("{} is {}", check.id(), check.status());
//! # Ok::<(), markupai_core::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod resources;
pub mod sender;
pub mod transport;
pub mod upload;

#[cfg(test)]
mod testing;

pub use client::MarkupClient;
pub use config::Configuration;
pub use error::{BoxError, Error, ErrorContext, ErrorKind, Result};
pub use http::{FilePart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
pub use models::{StyleCheck, StyleGuide, StyleRewrite, StyleSuggestion, WorkflowStatus};
pub use resources::{StyleChecks, StyleGuides, StyleRewrites, StyleSuggestions};
pub use sender::{HttpSender, ReqwestSender};
pub use transport::{handle_response, QueryValue, Transport};
