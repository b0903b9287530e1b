use std::path::Path;

use serde_json::Value;

use super::DOCUMENT_EXTENSIONS;
use crate::error::Result;
use crate::models::StyleRewrite;
use crate::transport::Transport;

const PATH: &str = "style/rewrites";

#[derive(Debug, Clone, Copy)]
pub struct StyleRewrites<'a> {
    transport: &'a Transport,
}

impl<'a> StyleRewrites<'a> {
    pub fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub fn create(&self, data: &Value) -> Result<StyleRewrite> {
        StyleRewrite::from_response(&self.transport.post(PATH, data)?)
    }

    pub fn create_with_file(&self, data: &Value, file_path: impl AsRef<Path>) -> Result<StyleRewrite> {
        let response =
            self.transport
                .post_with_file(PATH, data, Some(file_path.as_ref()), DOCUMENT_EXTENSIONS)?;
        StyleRewrite::from_response(&response)
    }

    pub fn get(&self, id: &str) -> Result<StyleRewrite> {
        StyleRewrite::from_response(&self.transport.get(&format!("{PATH}/{id}"), &[])?)
    }
}
