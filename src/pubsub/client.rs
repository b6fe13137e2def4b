//! Pub/Sub client trait and HTTP implementation.

use async_trait::async_trait;
use google_cloud_auth::credentials::{Builder as CredentialsBuilder, CacheableResource, Credentials};
use http::Extensions;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::DEFAULT_ENDPOINT;
use crate::error::{Error, Result};
use crate::pubsub::types::{
    AcknowledgeRequest, ErrorResponse, PullRequest, PullResponse, Subscription,
};

/// Capability interface over the remote Pub/Sub service.
///
/// The tailer only ever talks to this trait, so tests can substitute an
/// in-memory fake for the live API.
#[async_trait]
pub trait PubsubClient: Send + Sync {
    /// Create a subscription under the given fully-qualified name.
    async fn create_subscription(
        &self,
        name: &str,
        subscription: Subscription,
    ) -> Result<Subscription>;

    /// Fetch an existing subscription by fully-qualified name.
    async fn get_subscription(&self, name: &str) -> Result<Subscription>;

    /// Pull a batch of messages from a subscription.
    async fn pull(&self, subscription: &str, request: PullRequest) -> Result<PullResponse>;

    /// Acknowledge messages on a subscription.
    async fn acknowledge(&self, subscription: &str, request: AcknowledgeRequest) -> Result<()>;
}

/// HTTP client for the Pub/Sub REST API.
pub struct HttpPubsubClient {
    http: reqwest::Client,
    endpoint: String,
    /// `None` when talking to an emulator.
    credentials: Option<Credentials>,
}

impl HttpPubsubClient {
    /// Create a client for the production API using Application Default
    /// Credentials.
    pub fn new() -> Result<Self> {
        let credentials = CredentialsBuilder::default()
            .build()
            .map_err(|e| Error::Auth(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials: Some(credentials),
        })
    }

    /// Create an unauthenticated client against the given endpoint, e.g. a
    /// local emulator.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: normalize_endpoint(endpoint.into()),
            credentials: None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.endpoint, path)
    }

    /// Attach credential headers when running against the production API.
    async fn authorize(&self, mut builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let Some(credentials) = &self.credentials else {
            return Ok(builder);
        };
        let cached = credentials
            .headers(Extensions::new())
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;
        let headers = match cached {
            CacheableResource::New { data, .. } => data,
            // No entity tag is ever passed in, so the headers are always new.
            CacheableResource::NotModified => http::HeaderMap::new(),
        };
        for (key, value) in headers.iter() {
            builder = builder.header(key, value);
        }
        Ok(builder)
    }

    async fn send<B, O>(&self, builder: reqwest::RequestBuilder, body: Option<&B>) -> Result<O>
    where
        B: Serialize + Sync,
        O: DeserializeOwned,
    {
        let mut builder = self.authorize(builder).await?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }
        Ok(response.json().await?)
    }

    /// Like [`send`](Self::send), but for calls whose success carries no
    /// meaningful body. The production API answers acknowledge with `{}`
    /// while emulators may answer with an empty body, so the body is never
    /// parsed.
    async fn send_unit<B>(&self, builder: reqwest::RequestBuilder, body: Option<&B>) -> Result<()>
    where
        B: Serialize + Sync,
    {
        let mut builder = self.authorize(builder).await?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }
        Ok(())
    }
}

#[async_trait]
impl PubsubClient for HttpPubsubClient {
    async fn create_subscription(
        &self,
        name: &str,
        subscription: Subscription,
    ) -> Result<Subscription> {
        debug!("CreateSubscription {}", name);
        let builder = self.http.put(self.url(name));
        self.send(builder, Some(&subscription)).await
    }

    async fn get_subscription(&self, name: &str) -> Result<Subscription> {
        debug!("GetSubscription {}", name);
        let builder = self.http.get(self.url(name));
        self.send(builder, None::<&()>).await
    }

    async fn pull(&self, subscription: &str, request: PullRequest) -> Result<PullResponse> {
        debug!("Pull {} (max {})", subscription, request.max_messages);
        let builder = self.http.post(self.url(&format!("{}:pull", subscription)));
        self.send(builder, Some(&request)).await
    }

    async fn acknowledge(&self, subscription: &str, request: AcknowledgeRequest) -> Result<()> {
        debug!("Acknowledge {} ids on {}", request.ack_ids.len(), subscription);
        let builder = self
            .http
            .post(self.url(&format!("{}:acknowledge", subscription)));
        self.send_unit(builder, Some(&request)).await
    }
}

/// Decode a non-2xx response body into the Google error envelope, falling
/// back to the raw body when it is not JSON.
fn api_error(status: reqwest::StatusCode, body: &str) -> Error {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(envelope) => Error::Api {
            code: envelope.error.code,
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => Error::Api {
            code: status.as_u16(),
            status: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_string(),
            message: body.to_string(),
        },
    }
}

/// Emulator hosts are commonly given as bare `host:port`.
fn normalize_endpoint(endpoint: String) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", endpoint.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(
            normalize_endpoint("localhost:8086".to_string()),
            "http://localhost:8086"
        );
        assert_eq!(
            normalize_endpoint("http://localhost:8086/".to_string()),
            "http://localhost:8086"
        );
        assert_eq!(
            normalize_endpoint("https://pubsub.googleapis.com".to_string()),
            "https://pubsub.googleapis.com"
        );
    }

    #[test]
    fn test_api_error_from_envelope() {
        let body = r#"{"error": {"code": 409, "message": "exists", "status": "ALREADY_EXISTS"}}"#;
        let error = api_error(reqwest::StatusCode::CONFLICT, body);
        assert!(error.is_already_exists());
    }

    /// Emulators may answer a successful acknowledge with no body at all;
    /// the ack must still count as delivered.
    #[tokio::test]
    async fn test_acknowledge_accepts_empty_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept connection");
            let mut buf = vec![0u8; 4096];
            let mut total = 0;
            // Read until the request headers are complete; the tiny JSON
            // body arrives with them.
            loop {
                let n = socket.read(&mut buf[total..]).await.expect("read request");
                total += n;
                if n == 0 || buf[..total].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                .await
                .expect("write response");
        });

        let client = HttpPubsubClient::with_endpoint(addr.to_string());
        client
            .acknowledge(
                "projects/demo/subscriptions/tail-pubsub",
                AcknowledgeRequest {
                    ack_ids: vec!["ack-1".to_string()],
                },
            )
            .await
            .expect("empty-body acknowledge should succeed");
        server.await.expect("server task");
    }

    #[test]
    fn test_api_error_from_plain_body() {
        let error = api_error(reqwest::StatusCode::BAD_GATEWAY, "upstream unavailable");
        match error {
            Error::Api { code, status, message } => {
                assert_eq!(code, 502);
                assert_eq!(status, "Bad Gateway");
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
