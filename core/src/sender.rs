//! Executes `HttpRequest` values against the network.

use std::fmt;

use reqwest::blocking::multipart::{Form, Part};

use crate::config::Configuration;
use crate::error::{BoxError, Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// Performs one HTTP round-trip.
///
/// Implementations must return non-2xx responses as `Ok`; status handling
/// belongs to the transport. `Err` is reserved for failures where no
/// response was obtained.
pub trait HttpSender: Send + Sync {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, BoxError>;
}

/// Default sender backed by a blocking `reqwest` client.
#[derive(Clone)]
pub struct ReqwestSender {
    http: reqwest::blocking::Client,
}

impl ReqwestSender {
    /// Build a client whose per-request deadline is the configured timeout.
    pub fn new(config: &Configuration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::generic(format!("failed to build HTTP client: {e}")).with_source(e))?;
        Ok(Self { http })
    }

    pub fn from_client(http: reqwest::blocking::Client) -> Self {
        Self { http }
    }
}

impl fmt::Debug for ReqwestSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestSender").finish_non_exhaustive()
    }
}

impl HttpSender for ReqwestSender {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, BoxError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            None => builder,
            Some(RequestBody::Json(json)) => builder.body(json.clone()),
            Some(RequestBody::Multipart(multipart)) => {
                let mut form = Form::new();
                for (name, value) in &multipart.fields {
                    form = form.text(name.clone(), value.clone());
                }
                if let Some(file) = &multipart.file {
                    let part = Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.content_type)?;
                    form = form.part(file.field_name.clone(), part);
                }
                builder.multipart(form)
            }
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.text()?;

        Ok(HttpResponse { status, headers, body })
    }
}
