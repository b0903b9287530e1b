use std::path::Path;

use serde_json::Value;

use super::STYLE_GUIDE_EXTENSIONS;
use crate::error::{Error, Result};
use crate::models::StyleGuide;
use crate::transport::Transport;

const PATH: &str = "style-guides";

/// `style-guides`: the only resource with list, update and delete.
#[derive(Debug, Clone, Copy)]
pub struct StyleGuides<'a> {
    transport: &'a Transport,
}

impl<'a> StyleGuides<'a> {
    pub fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub fn list(&self) -> Result<Vec<StyleGuide>> {
        match self.transport.get(PATH, &[])? {
            Value::Array(items) => items.iter().map(StyleGuide::from_response).collect(),
            // An empty body comes back as an empty object.
            Value::Object(map) if map.is_empty() => Ok(Vec::new()),
            other => Err(Error::generic(format!(
                "Malformed style guide list response: expected an array, got {other}"
            ))),
        }
    }

    pub fn create(&self, data: &Value) -> Result<StyleGuide> {
        StyleGuide::from_response(&self.transport.post(PATH, data)?)
    }

    /// Create a style guide from a PDF.
    pub fn create_with_file(&self, data: &Value, file_path: impl AsRef<Path>) -> Result<StyleGuide> {
        let response = self.transport.post_with_file(
            PATH,
            data,
            Some(file_path.as_ref()),
            STYLE_GUIDE_EXTENSIONS,
        )?;
        StyleGuide::from_response(&response)
    }

    pub fn get(&self, id: &str) -> Result<StyleGuide> {
        StyleGuide::from_response(&self.transport.get(&format!("{PATH}/{id}"), &[])?)
    }

    pub fn update(&self, id: &str, data: &Value) -> Result<StyleGuide> {
        StyleGuide::from_response(&self.transport.patch(&format!("{PATH}/{id}"), data)?)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.transport.delete(&format!("{PATH}/{id}"))?;
        Ok(())
    }
}
