//! GCP Pub/Sub client implementation.
//!
//! This module implements the consumer side of the Google Cloud Pub/Sub
//! HTTP/REST API, covering the four calls the tailer needs:
//! - CreateSubscription / GetSubscription for subscription setup
//! - Pull for fetching message batches
//! - Acknowledge for confirming processed messages

pub mod client;
pub mod types;

pub use client::{HttpPubsubClient, PubsubClient};
pub use types::*;
