//! Configuration system for tail-pubsub.

use std::time::Duration;

use crate::error::{Error, Result};

/// Production Pub/Sub REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://pubsub.googleapis.com";

/// Main configuration structure.
///
/// Built once from the command line and passed into the tailer; nothing
/// mutates it afterwards.
#[derive(Debug, Clone)]
pub struct TailConfig {
    /// GCP project ID.
    pub project: String,
    /// Topic name to subscribe to.
    pub topic: String,
    /// Maximum number of messages per pull.
    pub batch_size: i32,
    /// Sleep between poll cycles.
    pub poll_interval: Duration,
    /// Override API endpoint (emulator); `None` means production.
    pub endpoint: Option<String>,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            topic: String::new(),
            batch_size: 1,
            poll_interval: Duration::from_secs(1),
            endpoint: None,
        }
    }
}

impl TailConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.project.is_empty() {
            return Err(Error::Config("project must not be empty".to_string()));
        }
        if self.topic.is_empty() {
            return Err(Error::Config("topic must not be empty".to_string()));
        }
        if self.batch_size < 1 {
            return Err(Error::Config(format!(
                "batchsize must be at least 1 (got {})",
                self.batch_size
            )));
        }
        Ok(())
    }
}
