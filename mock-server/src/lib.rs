//! In-memory stand-in for the Markup AI REST API.
//!
//! Serves style guides (full CRUD) and the three job resources. Jobs are
//! created `running` and report `completed` from their second poll onward,
//! which is enough to exercise client polling loops. Style-check GETs answer
//! with the workflow-nested shape; suggestions and rewrites stay flat.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_TOKEN: &str = "test-token";
pub const CREATED_AT: &str = "2025-01-20T14:30:00+00:00";

/// Polls a job answers `running` before it reports `completed`.
const RUNNING_POLLS: u32 = 1;

const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StyleGuide {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub created_by: String,
    pub status: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Check,
    Suggestion,
    Rewrite,
}

#[derive(Clone, Debug)]
pub struct Job {
    pub id: String,
    pub kind: JobKind,
    pub polls: u32,
    pub content: String,
    pub config: Map<String, Value>,
    pub file_name: Option<String>,
}

impl Job {
    fn status(&self) -> &'static str {
        if self.polls > RUNNING_POLLS {
            "completed"
        } else {
            "running"
        }
    }
}

#[derive(Default)]
pub struct Store {
    pub guides: HashMap<String, StyleGuide>,
    pub jobs: HashMap<String, Job>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    db: Db,
}

/// Error body in the `{key: message}` form the real API uses.
pub struct ApiError {
    status: StatusCode,
    key: &'static str,
    message: String,
}

impl ApiError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            key: "message",
            message: "Invalid or missing API token".to_string(),
        }
    }

    fn not_found(what: &str, id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            key: "detail",
            message: format!("{what} {id} not found"),
        }
    }

    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            key: "detail",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ self.key: self.message }))).into_response()
    }
}

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        db: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/v1/style-guides", get(list_guides).post(create_guide))
        .route(
            "/v1/style-guides/{id}",
            get(get_guide).patch(update_guide).delete(delete_guide),
        )
        .route("/v1/style-checks", post(create_check))
        .route("/v1/style-checks/{id}", get(get_check))
        .route("/v1/style/suggestions", post(create_suggestion))
        .route("/v1/style/suggestions/{id}", get(get_suggestion))
        .route("/v1/style/rewrites", post(create_rewrite))
        .route("/v1/style/rewrites/{id}", get(get_rewrite))
        .route("/v1/_status/{code}", get(forced_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if presented != Some(expected.as_str()) {
        tracing::debug!(uri = %request.uri(), "rejecting request without a valid token");
        return ApiError::unauthorized().into_response();
    }
    next.run(request).await
}

// --- request bodies ---

#[derive(Debug, Default)]
pub struct Submission {
    pub fields: Map<String, Value>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Submission {
    fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::String(_) | Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Accept either a JSON object, an empty body, or a multipart form whose
/// file arrives under `file_upload`.
async fn read_submission(request: Request) -> Result<Submission, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::unprocessable(e.body_text()))?;
        let mut submission = Submission::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::unprocessable(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file_upload" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::unprocessable(e.to_string()))?;
                submission.file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::unprocessable(e.to_string()))?;
                submission.fields.insert(name, Value::String(text));
            }
        }
        return Ok(submission);
    }

    let bytes = axum::body::to_bytes(request.into_body(), MAX_UPLOAD_BYTES)
        .await
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;
    if bytes.is_empty() {
        return Ok(Submission::default());
    }
    let fields: Map<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::unprocessable(format!("Invalid JSON body: {e}")))?;
    Ok(Submission { fields, file: None })
}

// --- style guides ---

async fn list_guides(State(state): State<AppState>) -> Json<Vec<StyleGuide>> {
    let store = state.db.read().await;
    let mut guides: Vec<StyleGuide> = store.guides.values().cloned().collect();
    guides.sort_by(|a, b| a.name.cmp(&b.name));
    Json(guides)
}

async fn create_guide(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<StyleGuide>), ApiError> {
    let submission = read_submission(request).await?;
    let name = submission
        .text("name")
        .or_else(|| submission.file.as_ref().map(|f| f.file_name.clone()))
        .ok_or_else(|| ApiError::unprocessable("name is required"))?;

    let guide = StyleGuide {
        id: Uuid::new_v4().to_string(),
        name,
        created_at: CREATED_AT.to_string(),
        created_by: "mock-user".to_string(),
        status: "completed".to_string(),
    };
    state.db.write().await.guides.insert(guide.id.clone(), guide.clone());
    Ok((StatusCode::CREATED, Json(guide)))
}

async fn get_guide(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StyleGuide>, ApiError> {
    let store = state.db.read().await;
    store
        .guides
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Style guide", &id))
}

#[derive(Deserialize)]
struct UpdateGuide {
    name: Option<String>,
}

async fn update_guide(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateGuide>,
) -> Result<Json<StyleGuide>, ApiError> {
    let mut store = state.db.write().await;
    let guide = store
        .guides
        .get_mut(&id)
        .ok_or_else(|| ApiError::not_found("Style guide", &id))?;
    if let Some(name) = input.name {
        guide.name = name;
    }
    Ok(Json(guide.clone()))
}

async fn delete_guide(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.db.write().await;
    store
        .guides
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiError::not_found("Style guide", &id))
}

// --- jobs ---

async fn submit_job(state: &AppState, kind: JobKind, request: Request) -> Result<Job, ApiError> {
    let mut submission = read_submission(request).await?;
    let file = submission.file.take();
    let content = match (&file, submission.text("content")) {
        (Some(file), _) => String::from_utf8_lossy(&file.bytes).into_owned(),
        (None, Some(content)) => content,
        (None, None) => return Err(ApiError::unprocessable("content or file_upload is required")),
    };
    submission.fields.remove("content");

    let job = Job {
        id: Uuid::new_v4().to_string(),
        kind,
        polls: 0,
        content,
        config: submission.fields,
        file_name: file.map(|f| f.file_name),
    };
    state.db.write().await.jobs.insert(job.id.clone(), job.clone());
    Ok(job)
}

/// Count a poll and return the job as it now stands.
async fn poll_job(state: &AppState, kind: JobKind, id: &str) -> Result<Job, ApiError> {
    let mut store = state.db.write().await;
    match store.jobs.get_mut(id) {
        Some(job) if job.kind == kind => {
            job.polls += 1;
            Ok(job.clone())
        }
        _ => Err(ApiError::not_found("Workflow", id)),
    }
}

async fn create_check(State(state): State<AppState>, request: Request) -> Result<Json<Value>, ApiError> {
    let job = submit_job(&state, JobKind::Check, request).await?;
    Ok(Json(json!({
        "workflow_id": job.id,
        "status": job.status(),
        "created_at": CREATED_AT,
    })))
}

async fn get_check(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let job = poll_job(&state, JobKind::Check, &id).await?;
    let workflow = json!({
        "id": job.id,
        "status": job.status(),
        "generated_at": CREATED_AT,
    });
    if job.status() != "completed" {
        return Ok(Json(json!({ "workflow": workflow })));
    }
    Ok(Json(json!({
        "workflow": workflow,
        "config": job.config,
        "original": {
            "scores": { "quality": { "score": quality_score(&job.content) } },
            "issues": issues(&job.content),
            "file_name": job.file_name,
        },
    })))
}

async fn create_suggestion(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let job = submit_job(&state, JobKind::Suggestion, request).await?;
    Ok(Json(json!({ "workflow_id": job.id, "status": job.status() })))
}

async fn get_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let job = poll_job(&state, JobKind::Suggestion, &id).await?;
    let suggestions = (job.status() == "completed").then(|| issues(&job.content));
    Ok(Json(json!({
        "workflow_id": job.id,
        "status": job.status(),
        "suggestions": suggestions,
    })))
}

async fn create_rewrite(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let job = submit_job(&state, JobKind::Rewrite, request).await?;
    Ok(Json(json!({
        "id": job.id,
        "status": job.status(),
        "created_at": CREATED_AT,
    })))
}

async fn get_rewrite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let job = poll_job(&state, JobKind::Rewrite, &id).await?;
    let rewritten = (job.status() == "completed").then(|| rewrite(&job.content));
    Ok(Json(json!({
        "id": job.id,
        "status": job.status(),
        "rewritten_content": rewritten,
        "created_at": CREATED_AT,
    })))
}

/// Answer with an arbitrary status so clients can exercise error mapping.
async fn forced_status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "message": format!("forced status {code}") }))).into_response()
}

// --- toy analysis ---

const WORDY: &[(&str, &str)] = &[("utilize", "use"), ("in order to", "to"), ("very unique", "unique")];

fn issues(content: &str) -> Vec<Value> {
    let lower = content.to_lowercase();
    WORDY
        .iter()
        .filter(|(wordy, _)| lower.contains(wordy))
        .map(|(wordy, plain)| json!({ "original": wordy, "suggestion": plain, "category": "clarity" }))
        .collect()
}

fn quality_score(content: &str) -> u32 {
    100u32.saturating_sub(10 * issues(content).len() as u32)
}

fn rewrite(content: &str) -> String {
    WORDY
        .iter()
        .fold(content.to_string(), |text, (wordy, plain)| text.replace(wordy, plain))
}
