use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{format_timestamp, parse_record, parse_timestamp, WorkflowStatus};
use crate::error::Result;

/// A stored ruleset that content is checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleGuide {
    id: String,
    name: String,
    created_at: DateTime<FixedOffset>,
    created_by: String,
    status: WorkflowStatus,
}

// Every field is required; a partial record is a server bug worth surfacing.
#[derive(Deserialize)]
struct StyleGuideRecord {
    id: String,
    name: String,
    created_at: String,
    created_by: String,
    status: WorkflowStatus,
}

impl StyleGuide {
    pub fn from_response(value: &Value) -> Result<Self> {
        let record: StyleGuideRecord = parse_record("style guide", value)?;
        Ok(Self {
            id: record.id,
            name: record.name,
            created_at: parse_timestamp(&record.created_at)?,
            created_by: record.created_by,
            status: record.status,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> &DateTime<FixedOffset> {
        &self.created_at
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn status(&self) -> &WorkflowStatus {
        &self.status
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("name".into(), json!(self.name));
        map.insert("created_at".into(), json!(format_timestamp(&self.created_at)));
        map.insert("created_by".into(), json!(self.created_by));
        map.insert("status".into(), json!(self.status.as_str()));
        map
    }
}
