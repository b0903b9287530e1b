use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{parse_optional_timestamp, parse_record, require_id, timestamp_value, WorkflowStatus};
use crate::error::Result;

const ENTITY: &str = "style suggestion";

/// A job producing discrete edit suggestions for content.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSuggestion {
    id: String,
    status: WorkflowStatus,
    suggestions: Option<Value>,
    created_at: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize)]
struct StyleSuggestionRecord {
    id: Option<String>,
    workflow_id: Option<String>,
    status: WorkflowStatus,
    suggestions: Option<Value>,
    created_at: Option<String>,
}

impl StyleSuggestion {
    pub fn from_response(value: &Value) -> Result<Self> {
        let record: StyleSuggestionRecord = parse_record(ENTITY, value)?;
        Ok(Self {
            id: require_id(ENTITY, record.id, record.workflow_id)?,
            status: record.status,
            suggestions: record.suggestions,
            created_at: parse_optional_timestamp(record.created_at.as_deref())?,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &WorkflowStatus {
        &self.status
    }

    pub fn suggestions(&self) -> Option<&Value> {
        self.suggestions.as_ref()
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
        map.insert("suggestions".into(), self.suggestions.clone().unwrap_or(Value::Null));
        map.insert("created_at".into(), timestamp_value(self.created_at.as_ref()));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_completed_suggestion() {
        let suggestion = StyleSuggestion::from_response(&json!({
            "id": "s1",
            "status": "completed",
            "suggestions": [{"original": "utilize", "suggestion": "use"}],
            "created_at": "2025-01-20T14:30:00+00:00",
        }))
        .unwrap();
        assert!(suggestion.is_completed());
        assert_eq!(suggestion.suggestions().unwrap()[0]["suggestion"], "use");
    }

    #[test]
    fn workflow_id_and_missing_fields_are_tolerated() {
        let suggestion = StyleSuggestion::from_response(&json!({
            "workflow_id": "wf-9",
            "status": "running",
        }))
        .unwrap();
        assert_eq!(suggestion.id(), "wf-9");
        assert!(suggestion.suggestions().is_none());
        assert!(suggestion.created_at().is_none());
        assert!(!suggestion.is_completed());
    }

    #[test]
    fn id_takes_precedence_over_workflow_id() {
        let suggestion = StyleSuggestion::from_response(&json!({
            "id": "primary",
            "workflow_id": "secondary",
            "status": "running",
        }))
        .unwrap();
        assert_eq!(suggestion.id(), "primary");
    }

    #[test]
    fn missing_status_is_an_error() {
        assert!(StyleSuggestion::from_response(&json!({"id": "s1"})).is_err());
    }

    #[test]
    fn round_trips_to_map() {
        let input = json!({
            "id": "s1",
            "status": "running",
            "suggestions": null,
            "created_at": "2025-01-20T14:30:00+00:00",
        });
        let suggestion = StyleSuggestion::from_response(&input).unwrap();
        assert_eq!(Value::Object(suggestion.to_map()), input);
    }
}
