//! # tail-pubsub
//!
//! A minimal command-line tail utility for Google Cloud Pub/Sub.
//!
//! tail-pubsub creates (or reuses) a subscription named `tail-pubsub` on a
//! topic, then polls it forever: pull a batch, decode each base64 payload,
//! print it, acknowledge it, sleep, repeat. It is a debugging tool, not a
//! production consumer; there is no backoff, no concurrency, and no local
//! state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod pubsub;
pub mod shutdown;
pub mod tailer;

pub use error::{Error, Result};
