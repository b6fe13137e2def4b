// CLI module for tail-pubsub
use std::time::Duration;

use clap::Parser;

use crate::config::TailConfig;

/// Command-line interface for tail-pubsub
#[derive(Parser, Debug)]
#[command(name = "tail-pubsub")]
#[command(author, version, about = "Tail messages from a Google Cloud Pub/Sub topic", long_about = None)]
pub struct Cli {
    /// GCP project ID
    #[arg(long, env = "PUBSUB_PROJECT", default_value = "")]
    pub project: String,

    /// Pub/Sub topic name to subscribe to
    #[arg(long, env = "PUBSUB_TOPIC", default_value = "")]
    pub topic: String,

    /// How many messages to get at once
    #[arg(long, env = "PUBSUB_BATCHSIZE", default_value_t = 1)]
    pub batchsize: i32,

    /// Pub/Sub API endpoint (e.g. an emulator); disables authentication
    #[arg(long, env = "PUBSUB_EMULATOR_HOST")]
    pub endpoint: Option<String>,

    /// Seconds to sleep between polls
    #[arg(long, env = "PUBSUB_POLL_INTERVAL", default_value_t = 1)]
    pub poll_interval: u64,

    /// Log filter (e.g. info, debug, tail_pubsub=debug)
    #[arg(long, env = "TAIL_PUBSUB_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Collapse the parsed arguments into an immutable configuration.
    pub fn into_config(self) -> TailConfig {
        TailConfig {
            project: self.project,
            topic: self.topic,
            batch_size: self.batchsize,
            poll_interval: Duration::from_secs(self.poll_interval),
            endpoint: self.endpoint,
        }
    }
}
