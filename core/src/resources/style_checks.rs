use std::path::Path;

use serde_json::Value;

use super::DOCUMENT_EXTENSIONS;
use crate::error::Result;
use crate::models::StyleCheck;
use crate::transport::Transport;

const PATH: &str = "style-checks";

/// `style-checks`: submit content for analysis and poll the result.
#[derive(Debug, Clone, Copy)]
pub struct StyleChecks<'a> {
    transport: &'a Transport,
}

impl<'a> StyleChecks<'a> {
    pub fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Submit inline content as JSON.
    pub fn create(&self, data: &Value) -> Result<StyleCheck> {
        StyleCheck::from_response(&self.transport.post(PATH, data)?)
    }

    /// Submit a `.txt`, `.pdf` or `.md` document.
    pub fn create_with_file(&self, data: &Value, file_path: impl AsRef<Path>) -> Result<StyleCheck> {
        let response =
            self.transport
                .post_with_file(PATH, data, Some(file_path.as_ref()), DOCUMENT_EXTENSIONS)?;
        StyleCheck::from_response(&response)
    }

    pub fn get(&self, id: &str) -> Result<StyleCheck> {
        StyleCheck::from_response(&self.transport.get(&format!("{PATH}/{id}"), &[])?)
    }
}
