//! Submit a style check and poll it to completion, retrying only the
//! failures that can succeed on a second attempt.
//!
//! ```sh
//! MARKUPAI_API_TOKEN=... cargo run -p markupai-core --example check_with_retry
//! ```
//!
//! Point `MARKUPAI_BASE_URL` at `http://127.0.0.1:3000/v1` to run it against
//! the mock server.

use std::thread;
use std::time::Duration;

use markupai_core::{MarkupClient, Result, StyleCheck};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const MAX_ATTEMPTS: u32 = 4;
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const MAX_POLLS: u32 = 60;

/// Run `op`, backing off exponentially on rate limits and server errors.
fn with_retry<T>(what: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut delay = Duration::from_millis(250);
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                tracing::warn!(%what, attempt, kind = %e.kind(), error = %e, "retrying");
                thread::sleep(delay);
                delay *= 2;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = MarkupClient::from_env()?;
    let checks = client.style_checks();

    let submitted = with_retry("submit", || {
        checks.create(&json!({
            "content": "We utilize this tool in order to ship very unique products.",
            "style_guide": "ap",
            "dialect": "american_english",
            "tone": "formal",
        }))
    })?;
    tracing::info!(id = submitted.id(), status = %submitted.status(), "submitted");

    let mut check: StyleCheck = submitted;
    for _ in 0..MAX_POLLS {
        if check.status().is_terminal() {
            break;
        }
        thread::sleep(POLL_INTERVAL);
        check = with_retry("poll", || checks.get(check.id()))?;
    }

    match check.results() {
        Some(results) if check.is_completed() => {
            println!("{}", serde_json::to_string_pretty(results).unwrap_or_default());
        }
        _ => tracing::warn!(id = check.id(), status = %check.status(), "no results"),
    }
    Ok(())
}
