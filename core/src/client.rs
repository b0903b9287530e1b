//! Entry point tying configuration, transport, and resource facades together.

use std::sync::Arc;

use crate::config::Configuration;
use crate::error::Result;
use crate::resources::{StyleChecks, StyleGuides, StyleRewrites, StyleSuggestions};
use crate::sender::HttpSender;
use crate::transport::Transport;

/// Synchronous client for the Markup AI API.
///
/// Holds one `Transport` and no mutable state, so a single client can be
/// shared across threads. Each call is one blocking round-trip.
#[derive(Debug, Clone)]
pub struct MarkupClient {
    transport: Transport,
}

impl MarkupClient {
    /// Client for the default endpoint with the default timeout.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::from_config(Configuration::new(token))
    }

    pub fn from_config(config: Configuration) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }

    /// Client configured from `MARKUPAI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_config(Configuration::from_env()?)
    }

    /// Client that sends requests through a caller-supplied sender.
    pub fn with_sender(config: Configuration, sender: Arc<dyn HttpSender>) -> Self {
        Self {
            transport: Transport::with_sender(config, sender),
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn style_guides(&self) -> StyleGuides<'_> {
        StyleGuides::new(&self.transport)
    }

    pub fn style_checks(&self) -> StyleChecks<'_> {
        StyleChecks::new(&self.transport)
    }

    pub fn style_suggestions(&self) -> StyleSuggestions<'_> {
        StyleSuggestions::new(&self.transport)
    }

    pub fn style_rewrites(&self) -> StyleRewrites<'_> {
        StyleRewrites::new(&self.transport)
    }
}
