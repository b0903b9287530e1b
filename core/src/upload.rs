//! Local checks and encoding for file uploads.

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::FilePart;

/// Largest file the API accepts, 15 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 15 * 1024 * 1024;

/// Multipart field the API reads the file from.
pub const FILE_FIELD: &str = "file_upload";

/// Reject a file before it is sent.
///
/// Files without an extension are always accepted; temp files commonly have
/// none.
pub fn validate_file(path: &Path, allowed_extensions: &[&str]) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        _ => return Err(Error::validation(format!("File not found: {}", path.display()))),
    };

    if let Some(ext) = extension(path) {
        let allowed = allowed_extensions.iter().any(|a| a.to_lowercase() == ext);
        if !allowed {
            return Err(Error::validation(format!(
                "Invalid file type \"{ext}\". Allowed types: {}",
                allowed_extensions.join(", ")
            )));
        }
    }

    if metadata.len() > MAX_UPLOAD_BYTES {
        return Err(Error::validation(format!(
            "File size {} exceeds maximum allowed size of 15MB",
            format_bytes(metadata.len())
        )));
    }
    Ok(())
}

/// Read the file into a `file_upload` part.
pub fn read_file_part(path: &Path) -> Result<FilePart> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::validation(format!("Unable to read file {}: {e}", path.display())).with_source(e)
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(FilePart {
        field_name: FILE_FIELD.to_string(),
        file_name,
        content_type: content_type_for(path).to_string(),
        bytes,
    })
}

/// Text value of a multipart field. Arrays and objects are sent as JSON.
///
/// Booleans go out as `true` / `false`, never as `1` / an empty string.
pub fn form_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Best-effort content type from the extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md" | "markdown") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("json") => "application/json",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Human-readable size using 1024 steps, e.g. `16 MB` or `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 100.0).round() / 100.0;
    let mut text = format!("{rounded:.2}");
    // 16.00 -> 16, 15.50 -> 15.5
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{text} {}", UNITS[unit])
}

/// Lowercased extension. A bare dotfile such as `.exe` counts as having one.
fn extension(path: &Path) -> Option<String> {
    let ext = match path.extension() {
        Some(ext) => ext.to_string_lossy().into_owned(),
        None => {
            let stem = path.file_stem()?.to_string_lossy();
            stem.strip_prefix('.')?.to_string()
        }
    };
    Some(ext.to_lowercase()).filter(|e| !e.is_empty())
}
