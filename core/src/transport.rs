//! Request construction, dispatch, and response handling for the Markup AI
//! API.
//!
//! # Design
//! Each verb is split into a `build_*` method that produces an `HttpRequest`
//! and the shared `handle_response`, which turns an `HttpResponse` into JSON
//! or a typed `Error`. The verb methods (`get`, `post`, ...) join the two
//! through the injected `HttpSender`. Both halves are public so a host can
//! run the network round-trip itself.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
use crate::sender::{HttpSender, ReqwestSender};
use crate::upload;

pub const USER_AGENT: &str = concat!("markupai-rust/", env!("CARGO_PKG_VERSION"));

/// A query string value. Lists encode as `key[0]=..&key[1]=..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    List(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Single(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::List(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        QueryValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Shared HTTP transport. Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct Transport {
    config: Configuration,
    sender: Arc<dyn HttpSender>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Transport using the default `reqwest` sender.
    pub fn new(config: Configuration) -> Result<Self> {
        let sender = ReqwestSender::new(&config)?;
        Ok(Self::with_sender(config, Arc::new(sender)))
    }

    pub fn with_sender(config: Configuration, sender: Arc<dyn HttpSender>) -> Self {
        Self { config, sender }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn get(&self, path: &str, query: &[(&str, QueryValue)]) -> Result<Value> {
        self.dispatch(self.build_get(path, query))
    }

    /// POST `data` as JSON. An empty payload sends no body at all.
    pub fn post(&self, path: &str, data: &Value) -> Result<Value> {
        self.dispatch(self.build_json(HttpMethod::Post, path, data)?)
    }

    pub fn patch(&self, path: &str, data: &Value) -> Result<Value> {
        self.dispatch(self.build_json(HttpMethod::Patch, path, data)?)
    }

    pub fn delete(&self, path: &str) -> Result<Value> {
        self.dispatch(self.build_delete(path))
    }

    /// POST `data` and an optional file as `multipart/form-data`.
    ///
    /// The file is validated first when `allowed_extensions` is non-empty.
    pub fn post_with_file(
        &self,
        path: &str,
        data: &Value,
        file_path: Option<&Path>,
        allowed_extensions: &[&str],
    ) -> Result<Value> {
        self.dispatch(self.build_upload(path, data, file_path, allowed_extensions)?)
    }

    pub fn build_get(&self, path: &str, query: &[(&str, QueryValue)]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path, query),
            headers: self.default_headers(),
            body: None,
        }
    }

    pub fn build_json(&self, method: HttpMethod, path: &str, data: &Value) -> Result<HttpRequest> {
        let mut headers = self.default_headers();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));

        let body = if is_empty_payload(data) {
            None
        } else {
            let json = serde_json::to_string(data).map_err(|e| {
                Error::generic(format!("Failed to encode request body: {e}")).with_source(e)
            })?;
            Some(RequestBody::Json(json))
        };

        Ok(HttpRequest {
            method,
            url: self.url(path, &[]),
            headers,
            body,
        })
    }

    pub fn build_delete(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.url(path, &[]),
            headers: self.default_headers(),
            body: None,
        }
    }

    pub fn build_upload(
        &self,
        path: &str,
        data: &Value,
        file_path: Option<&Path>,
        allowed_extensions: &[&str],
    ) -> Result<HttpRequest> {
        if let Some(file_path) = file_path {
            if !allowed_extensions.is_empty() {
                upload::validate_file(file_path, allowed_extensions)?;
            }
        }

        let fields = match data {
            Value::Null => Vec::new(),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), upload::form_value(v)))
                .collect(),
            _ => return Err(Error::validation("Form data must be a JSON object")),
        };

        let file = match file_path {
            Some(p) if p.is_file() => Some(upload::read_file_part(p)?),
            Some(p) => {
                tracing::warn!(path = %p.display(), "upload file does not exist, sending form without it");
                None
            }
            None => None,
        };

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path, &[]),
            headers: self.default_headers(),
            body: Some(RequestBody::Multipart(MultipartForm { fields, file })),
        })
    }

    fn dispatch(&self, request: HttpRequest) -> Result<Value> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.sender.send(&request).map_err(|e| {
            tracing::debug!(method = %request.method, url = %request.url, error = %e, "request failed");
            let message = format!("HTTP request failed: {e}");
            Error::generic(message).with_source(e)
        })?;
        tracing::debug!(status = response.status, url = %request.url, "received response");
        handle_response(&response)
    }

    fn url(&self, path: &str, query: &[(&str, QueryValue)]) -> String {
        let mut url = format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'));
        if !query.is_empty() {
            url.push('?');
            url.push_str(&encode_query(query));
        }
        url
    }

    fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), self.config.authorization_header()),
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ]
    }
}

/// Turn a response into JSON, or into the error its status code calls for.
///
/// An empty 2xx body yields an empty object.
pub fn handle_response(response: &HttpResponse) -> Result<Value> {
    if (200..300).contains(&response.status) {
        return parse_success_body(&response.body);
    }

    let message = error_message(&response.body);
    tracing::warn!(status = response.status, %message, "API returned an error");
    Err(Error::from_response(response.status, message, response.body.clone()))
}

fn parse_success_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => Ok(Value::Object(Map::new())),
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
        Ok(other) => Err(Error::generic(format!(
            "Invalid JSON response: expected an object or array, got {other}"
        ))),
        Err(e) => Err(Error::generic(format!("Invalid JSON response: {e}")).with_source(e)),
    }
}

/// Pick `message`, then `error`, then `detail` from an error body.
///
/// Bodies that are not JSON objects count as having no message.
fn error_message(body: &str) -> String {
    let payload = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| payload.get(key).filter(|v| !v.is_null()))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}

fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn encode_query(query: &[(&str, QueryValue)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        match value {
            QueryValue::Single(v) => {
                serializer.append_pair(key, v);
            }
            QueryValue::List(values) => {
                for (i, v) in values.iter().enumerate() {
                    serializer.append_pair(&format!("{key}[{i}]"), v);
                }
            }
        }
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{transport, StubSender};

    #[test]
    fn get_builds_url_with_query() {
        let sender = StubSender::replying(200, r#"{"ok":true}"#);
        let t = transport(sender.clone());

        let result = t.get("/path", &[("a", "1".into()), ("b", "2".into())]).unwrap();
        assert_eq!(result, json!({"ok": true}));

        let req = sender.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.example.com/v1/path?a=1&b=2");
        assert!(req.body.is_none());
    }

    #[test]
    fn path_without_leading_slash_joins_once() {
        let t = transport(StubSender::replying(200, ""));
        assert_eq!(t.build_get("style-guides", &[]).url, "https://api.example.com/v1/style-guides");
        assert_eq!(t.build_get("//style-guides", &[]).url, "https://api.example.com/v1/style-guides");
    }

    #[test]
    fn query_values_are_encoded() {
        let t = transport(StubSender::replying(200, ""));
        let req = t.build_get(
            "search",
            &[("q", "two words&more".into()), ("tags", vec!["x", "y"].into())],
        );
        assert_eq!(
            req.url,
            "https://api.example.com/v1/search?q=two+words%26more&tags%5B0%5D=x&tags%5B1%5D=y"
        );
    }

    #[test]
    fn default_headers_are_sent() {
        let t = transport(StubSender::replying(200, ""));
        let req = t.build_get("style-guides", &[]);
        assert_eq!(req.header("authorization"), Some("Bearer test-token"));
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header("user-agent").unwrap().starts_with("markupai-rust/"));
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn post_sends_json_body() {
        let sender = StubSender::replying(201, r#"{"id":"123"}"#);
        let t = transport(sender.clone());

        let result = t.post("style-guides", &json!({"name": "Guide"})).unwrap();
        assert_eq!(result["id"], "123");

        let req = sender.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        match req.body {
            Some(RequestBody::Json(body)) => {
                let parsed: Value = serde_json::from_str(&body).unwrap();
                assert_eq!(parsed, json!({"name": "Guide"}));
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn post_with_empty_data_sends_no_body() {
        let sender = StubSender::replying(200, "{}");
        let t = transport(sender.clone());

        t.post("style-checks", &json!({})).unwrap();
        assert!(sender.last().body.is_none());

        t.post("style-checks", &Value::Null).unwrap();
        assert!(sender.last().body.is_none());
    }

    #[test]
    fn patch_uses_patch_verb() {
        let sender = StubSender::replying(200, "");
        let t = transport(sender.clone());

        let result = t.patch("style-guides/1", &json!({"name": "Renamed"})).unwrap();
        assert_eq!(result, json!({}));
        assert_eq!(sender.last().method, HttpMethod::Patch);
    }

    #[test]
    fn empty_success_bodies_become_empty_objects() {
        let sender = StubSender::replying(200, "");
        let t = transport(sender.clone());

        assert_eq!(t.get("x", &[]).unwrap(), json!({}));
        assert_eq!(t.patch("x", &json!({})).unwrap(), json!({}));
        assert_eq!(t.delete("x").unwrap(), json!({}));
        assert_eq!(sender.last().method, HttpMethod::Delete);
        assert!(sender.last().body.is_none());
    }

    #[test]
    fn invalid_json_is_a_generic_error() {
        let t = transport(StubSender::replying(200, "invalid json"));
        let err = t.get("x", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert!(err.message().contains("Invalid JSON response"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn list_bodies_are_returned_as_arrays() {
        let t = transport(StubSender::replying(200, r#"[{"id":"1"},{"id":"2"}]"#));
        let result = t.get("style-guides", &[]).unwrap();
        assert_eq!(result.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn error_statuses_map_to_kinds() {
        let cases = [
            (401, ErrorKind::Authentication),
            (404, ErrorKind::NotFound),
            (422, ErrorKind::Validation),
            (429, ErrorKind::RateLimit),
            (500, ErrorKind::Server),
            (503, ErrorKind::Server),
            (400, ErrorKind::Generic),
        ];
        for (status, kind) in cases {
            let body = r#"{"message":"boom"}"#;
            let t = transport(StubSender::replying(status, body));
            let err = t.get("x", &[]).unwrap_err();
            assert_eq!(err.kind(), kind, "status {status}");
            assert_eq!(err.status_code(), status);
            let ctx = err.context().unwrap();
            assert_eq!(ctx.status_code, status);
            assert_eq!(ctx.response_body, body);
        }
    }

    #[test]
    fn error_message_precedence() {
        let cases = [
            (r#"{"message":"A","error":"B","detail":"C"}"#, "A"),
            (r#"{"error":"B","detail":"C"}"#, "B"),
            (r#"{"detail":"C"}"#, "C"),
            (r#"{"message":null,"detail":"C"}"#, "C"),
            (r#"{"other":"x"}"#, "Unknown error"),
            ("not json at all", "Unknown error"),
            ("", "Unknown error"),
            (r#"["message"]"#, "Unknown error"),
        ];
        for (body, expected) in cases {
            let err = handle_response(&HttpResponse::new(400, body)).unwrap_err();
            assert_eq!(err.message(), expected, "body {body}");
        }
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let body = r#"{"detail":[{"loc":["body","name"],"msg":"field required"}]}"#;
        let err = handle_response(&HttpResponse::new(422, body)).unwrap_err();
        assert_eq!(err.message(), r#"[{"loc":["body","name"],"msg":"field required"}]"#);
    }

    #[test]
    fn transport_failures_are_wrapped() {
        let t = transport(StubSender::failing("connection refused"));
        let err = t.get("x", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.message(), "HTTP request failed: connection refused");
        assert_eq!(err.status_code(), 0);
        assert!(err.context().is_none());
        assert_eq!(std::error::Error::source(&err).unwrap().to_string(), "connection refused");
    }

    #[test]
    fn upload_builds_multipart_form() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"Some content to check").unwrap();

        let sender = StubSender::replying(200, r#"{"workflow_id":"w1","status":"running"}"#);
        let t = transport(sender.clone());
        let data = json!({"dialect": "american_english", "tone": "formal", "tags": ["a", "b"]});

        t.post_with_file("style-checks", &data, Some(file.path()), &["txt", "pdf", "md"])
            .unwrap();

        let req = sender.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.header("content-type").is_none());
        assert_eq!(req.header("authorization"), Some("Bearer test-token"));
        let form = match req.body {
            Some(RequestBody::Multipart(form)) => form,
            other => panic!("expected multipart body, got {other:?}"),
        };
        assert_eq!(form.field("dialect"), Some("american_english"));
        assert_eq!(form.field("tags"), Some(r#"["a","b"]"#));
        let part = form.file.unwrap();
        assert_eq!(part.field_name, "file_upload");
        assert_eq!(part.content_type, "text/plain");
        assert_eq!(part.bytes, b"Some content to check");
    }

    #[test]
    fn upload_validation_happens_before_sending() {
        let file = tempfile::Builder::new().suffix(".exe").tempfile().unwrap();
        let sender = StubSender::replying(200, "{}");
        let t = transport(sender.clone());

        let err = t
            .post_with_file("style-checks", &json!({}), Some(file.path()), &["txt", "pdf", "md"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(sender.count(), 0);
    }

    #[test]
    fn upload_without_allow_list_skips_missing_file() {
        let sender = StubSender::replying(200, "{}");
        let t = transport(sender.clone());

        t.post_with_file("style-guides", &json!({"name": "x"}), Some(Path::new("/no/such/file.pdf")), &[])
            .unwrap();
        match sender.last().body {
            Some(RequestBody::Multipart(form)) => {
                assert_eq!(form.field("name"), Some("x"));
                assert!(form.file.is_none());
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[test]
    fn upload_rejects_non_object_data() {
        let t = transport(StubSender::replying(200, "{}"));
        let err = t.post_with_file("style-checks", &json!(["x"]), None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
