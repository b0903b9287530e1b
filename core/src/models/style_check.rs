use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{parse_optional_timestamp, parse_record, require_id, timestamp_value, WorkflowStatus};
use crate::error::Result;

const ENTITY: &str = "style check";

/// An analysis job scoring content against a style guide.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleCheck {
    id: String,
    status: WorkflowStatus,
    results: Option<Value>,
    created_at: Option<DateTime<FixedOffset>>,
}

/// The two shapes the style-check endpoints answer with.
enum StyleCheckShape {
    /// `{id|workflow_id, status, results?, created_at?}`, returned on create.
    Flat(FlatCheck),
    /// `{workflow: {id, status, generated_at?}, original?, config?}`,
    /// returned by some deployments on GET.
    Nested(NestedCheck),
}

#[derive(Deserialize)]
struct FlatCheck {
    id: Option<String>,
    workflow_id: Option<String>,
    status: WorkflowStatus,
    results: Option<Value>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct NestedCheck {
    workflow: WorkflowRecord,
    original: Option<Value>,
    config: Option<Value>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct WorkflowRecord {
    id: String,
    status: WorkflowStatus,
    generated_at: Option<String>,
}

impl StyleCheckShape {
    fn classify(value: &Value) -> Result<Self> {
        let nested = value.get("workflow").is_some_and(|w| !w.is_null());
        if nested {
            parse_record(ENTITY, value).map(StyleCheckShape::Nested)
        } else {
            parse_record(ENTITY, value).map(StyleCheckShape::Flat)
        }
    }
}

impl StyleCheck {
    pub fn from_response(value: &Value) -> Result<Self> {
        match StyleCheckShape::classify(value)? {
            StyleCheckShape::Flat(flat) => Ok(Self {
                id: require_id(ENTITY, flat.id, flat.workflow_id)?,
                status: flat.status,
                results: flat.results,
                created_at: parse_optional_timestamp(flat.created_at.as_deref())?,
            }),
            StyleCheckShape::Nested(nested) => {
                let status = nested.workflow.status;
                // Only a finished job with its source document has results.
                let results = match nested.original {
                    Some(original) if status.is_completed() => Some(json!({
                        "original": original,
                        "config": nested.config.unwrap_or(Value::Null),
                    })),
                    _ => None,
                };
                let created_at = nested.created_at.or(nested.workflow.generated_at);
                Ok(Self {
                    id: nested.workflow.id,
                    status,
                    results,
                    created_at: parse_optional_timestamp(created_at.as_deref())?,
                })
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &WorkflowStatus {
        &self.status
    }

    /// Analysis output. May be absent even after completion.
    pub fn results(&self) -> Option<&Value> {
        self.results.as_ref()
    }

    pub fn created_at(&self) -> Option<&DateTime<FixedOffset>> {
        self.created_at.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("status".into(), json!(self.status.as_str()));
        map.insert("results".into(), self.results.clone().unwrap_or(Value::Null));
        map.insert("created_at".into(), timestamp_value(self.created_at.as_ref()));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format_timestamp;

    #[test]
    fn flat_running_check_has_no_results() {
        let check = StyleCheck::from_response(&json!({
            "id": "x",
            "status": "running",
            "created_at": "2025-01-20T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(check.id(), "x");
        assert!(check.results().is_none());
        assert!(!check.is_completed());
        assert!(check.created_at().is_some());
    }

    #[test]
    fn flat_completed_check_keeps_results() {
        let check = StyleCheck::from_response(&json!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "status": "completed",
            "results": {"score": 85, "issues": []},
            "created_at": "2025-01-20T14:30:00+00:00",
        }))
        .unwrap();
        assert!(check.is_completed());
        assert_eq!(check.results(), Some(&json!({"score": 85, "issues": []})));
    }

    #[test]
    fn flat_check_falls_back_to_workflow_id() {
        let check = StyleCheck::from_response(&json!({
            "workflow_id": "wf-1",
            "status": "running",
        }))
        .unwrap();
        assert_eq!(check.id(), "wf-1");
        assert!(check.created_at().is_none());
    }

    #[test]
    fn nested_completed_check_synthesizes_results() {
        let check = StyleCheck::from_response(&json!({
            "workflow": {"id": "y", "status": "completed"},
            "original": {"scores": {"quality": {"score": 72}}},
        }))
        .unwrap();
        assert_eq!(check.id(), "y");
        assert!(check.is_completed());
        assert_eq!(
            check.results(),
            Some(&json!({"original": {"scores": {"quality": {"score": 72}}}, "config": null}))
        );
        assert!(check.created_at().is_none());
    }

    #[test]
    fn nested_check_carries_config_and_generated_at() {
        let check = StyleCheck::from_response(&json!({
            "workflow": {"id": "y", "status": "completed", "generated_at": "2025-02-01T10:00:00+00:00"},
            "original": {"issues": []},
            "config": {"dialect": "american_english"},
        }))
        .unwrap();
        assert_eq!(check.results().unwrap()["config"]["dialect"], "american_english");
        assert_eq!(format_timestamp(check.created_at().unwrap()), "2025-02-01T10:00:00+00:00");
    }

    #[test]
    fn top_level_created_at_wins_over_generated_at() {
        let check = StyleCheck::from_response(&json!({
            "workflow": {"id": "y", "status": "running", "generated_at": "2025-02-01T10:00:00+00:00"},
            "created_at": "2025-01-01T00:00:00+00:00",
        }))
        .unwrap();
        assert_eq!(format_timestamp(check.created_at().unwrap()), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn nested_running_check_has_no_results() {
        let check = StyleCheck::from_response(&json!({
            "workflow": {"id": "y", "status": "running"},
            "original": {"issues": []},
        }))
        .unwrap();
        assert!(check.results().is_none());
    }

    #[test]
    fn completed_without_original_is_not_an_error() {
        let check = StyleCheck::from_response(&json!({
            "workflow": {"id": "y", "status": "completed"},
            "config": {"tone": "formal"},
        }))
        .unwrap();
        assert!(check.is_completed());
        assert!(check.results().is_none());
    }

    #[test]
    fn null_workflow_is_treated_as_flat() {
        let check = StyleCheck::from_response(&json!({
            "workflow": null,
            "id": "flat",
            "status": "failed",
        }))
        .unwrap();
        assert_eq!(check.id(), "flat");
        assert_eq!(check.status(), &WorkflowStatus::Failed);
    }

    #[test]
    fn missing_id_is_an_error() {
        let err = StyleCheck::from_response(&json!({"status": "running"})).unwrap_err();
        assert!(err.message().contains("workflow_id"));
    }

    #[test]
    fn round_trips_to_map() {
        let input = json!({
            "id": "c1",
            "status": "completed",
            "results": {"score": 85},
            "created_at": "2025-01-20T14:30:00+00:00",
        });
        let check = StyleCheck::from_response(&input).unwrap();
        assert_eq!(Value::Object(check.to_map()), input);
    }
}
