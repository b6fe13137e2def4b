//! The subscription-ensure-and-poll-ack loop.
//!
//! A [`Tailer`] ensures the tool's subscription exists for the configured
//! topic, then loops forever: pull a bounded batch, decode and emit each
//! payload, acknowledge it, sleep, repeat. Transport failures are logged and
//! ride out the next cycle; there is no backoff beyond the fixed poll
//! interval.

use std::io::Write;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::TailConfig;
use crate::error::{Error, Result};
use crate::pubsub::client::PubsubClient;
use crate::pubsub::types::{
    subscription_name, topic_name, AcknowledgeRequest, PullRequest, Subscription,
};

/// What happened to a single received message during a poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Payload decoded, emitted, and acknowledged.
    Acked {
        /// The message's acknowledgment ID.
        ack_id: String,
    },
    /// Payload decoded and emitted, but the acknowledge call failed. The
    /// service may redeliver the message.
    AckFailed {
        /// The message's acknowledgment ID.
        ack_id: String,
    },
    /// Payload was not valid base64; skipped without acknowledging so the
    /// service redelivers it.
    DecodeFailed {
        /// The message's acknowledgment ID.
        ack_id: String,
    },
}

/// Tails a Pub/Sub topic through a [`PubsubClient`].
pub struct Tailer {
    config: TailConfig,
    client: Arc<dyn PubsubClient>,
    sink: Box<dyn Write + Send>,
}

impl Tailer {
    /// Create a tailer that emits payloads to stdout.
    pub fn new(config: TailConfig, client: Arc<dyn PubsubClient>) -> Self {
        Self::with_sink(config, client, Box::new(std::io::stdout()))
    }

    /// Create a tailer emitting payloads to an arbitrary sink.
    pub fn with_sink(
        config: TailConfig,
        client: Arc<dyn PubsubClient>,
        sink: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            config,
            client,
            sink,
        }
    }

    /// Create the tool's subscription to the configured topic, falling back
    /// to fetching it when it already exists.
    ///
    /// Idempotent: a second call finds the subscription created by the first.
    /// An error here means neither create nor get worked and is fatal at the
    /// binary level.
    pub async fn ensure_subscription(&self) -> Result<Subscription> {
        let topic = topic_name(&self.config.project, &self.config.topic);
        let name = subscription_name(&self.config.project);

        debug!("Making subscription to topic ({}) ...", topic);
        match self
            .client
            .create_subscription(&name, Subscription::for_topic(&topic))
            .await
        {
            Ok(subscription) => {
                info!(
                    "Subscription ({}) was created",
                    subscription.name.as_deref().unwrap_or(&name)
                );
                Ok(subscription)
            }
            Err(create_err) => {
                warn!(
                    "Failed to create subscription to topic ({}): {}",
                    topic, create_err
                );
                debug!("Getting existing subscription ({}) ...", name);
                self.client
                    .get_subscription(&name)
                    .await
                    .map_err(|get_err| Error::SubscriptionSetup {
                        name: name.clone(),
                        reason: get_err.to_string(),
                    })
            }
        }
    }

    /// Run one pull cycle against the subscription, returning the outcome of
    /// every received message.
    ///
    /// A message is acknowledged if and only if its payload decoded; decode
    /// failures are skipped so the service redelivers them.
    pub async fn poll_cycle(&mut self, subscription: &str) -> Result<Vec<MessageOutcome>> {
        let request = PullRequest {
            return_immediately: true,
            max_messages: self.config.batch_size,
        };
        let response = self.client.pull(subscription, request).await?;

        let mut outcomes = Vec::new();
        for received in response.into_messages() {
            let encoded = received.message.data.unwrap_or_default();
            let payload = match BASE64.decode(encoded.as_bytes()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Failed to decode message ({}): {}", received.ack_id, e);
                    outcomes.push(MessageOutcome::DecodeFailed {
                        ack_id: received.ack_id,
                    });
                    continue;
                }
            };

            self.emit(&payload)?;

            let ack = AcknowledgeRequest {
                ack_ids: vec![received.ack_id.clone()],
            };
            match self.client.acknowledge(subscription, ack).await {
                Ok(()) => outcomes.push(MessageOutcome::Acked {
                    ack_id: received.ack_id,
                }),
                Err(e) => {
                    warn!("Failed to acknowledge message ({}): {}", received.ack_id, e);
                    outcomes.push(MessageOutcome::AckFailed {
                        ack_id: received.ack_id,
                    });
                }
            }
        }
        Ok(outcomes)
    }

    /// Poll until a shutdown signal arrives.
    ///
    /// Pull and API failures are logged and the loop continues; only a sink
    /// write failure (e.g. stdout closed by a downstream pipe) ends the loop
    /// with an error.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let subscription = subscription_name(&self.config.project);
        loop {
            debug!("Polling for messages ...");
            match self.poll_cycle(&subscription).await {
                Ok(outcomes) => {
                    if !outcomes.is_empty() {
                        debug!("Processed {} messages", outcomes.len());
                    }
                }
                Err(e @ Error::Io(_)) => return Err(e),
                Err(e) => {
                    error!(
                        "Failed to pull messages from subscription ({}): {}",
                        subscription, e
                    );
                }
            }

            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Tail loop stopping");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// Write one raw payload to the output sink, newline-terminated.
    fn emit(&mut self, payload: &[u8]) -> Result<()> {
        self.sink.write_all(payload)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        Ok(())
    }
}
