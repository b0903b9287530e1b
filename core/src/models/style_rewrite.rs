use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{parse_optional_timestamp, parse_record, require_id, timestamp_value, WorkflowStatus};
use crate::error::Result;

const ENTITY: &str = "style rewrite";

/// A job producing a rewritten version of content.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRewrite {
    id: String,
    status: WorkflowStatus,
    rewritten_content: Option<String>,
    created_at: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize)]
struct StyleRewriteRecord {
    id: Option<String>,
    workflow_id: Option<String>,
    status: WorkflowStatus,
    rewritten_content: Option<String>,
    created_at: Option<String>,
}

impl StyleRewrite {
    pub fn from_response(value: &Value) -> Result<Self> {
        let record: StyleRewriteRecord = parse_record(ENTITY, value)?;
        Ok(Self {
            id: require_id(ENTITY, record.id, record.workflow_id)?,
            status: record.status,
            rewritten_content: record.rewritten_content,
            created_at: parse_optional_timestamp(record.created_at.as_deref())?,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &WorkflowStatus {
        &self.status
    }

    pub fn rewritten_content(&self) -> Option<&str> {
        self.rewritten_content.as_deref()
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
        map.insert("rewritten_content".into(), json!(self.rewritten_content));
        map.insert("created_at".into(), timestamp_value(self.created_at.as_ref()));
        map
    }
}
