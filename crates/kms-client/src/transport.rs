//! HTTP transport seam
//!
//! The client builds URLs and interprets status codes; a transport only moves
//! bytes. Status handling stays in the client so every transport rejects the
//! same way.

use async_trait::async_trait;
use kms_core::{KmsError, KmsResult};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

/// Raw HTTP answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Build a reply
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        HttpReply {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Moves requests to a KMS server
#[async_trait]
pub trait KmsTransport: Send + Sync {
    /// `GET url`
    async fn get(&self, url: Url) -> KmsResult<HttpReply>;

    /// `POST url` with a JSON body
    async fn post_json(&self, url: Url, body: serde_json::Value) -> KmsResult<HttpReply>;
}

#[async_trait]
impl<T: KmsTransport + ?Sized> KmsTransport for Arc<T> {
    async fn get(&self, url: Url) -> KmsResult<HttpReply> {
        (**self).get(url).await
    }

    async fn post_json(&self, url: Url, body: serde_json::Value) -> KmsResult<HttpReply> {
        (**self).post_json(url, body).await
    }
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport, optionally bounding each request
    pub fn new(request_timeout: Option<Duration>) -> KmsResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| KmsError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpTransport { client })
    }

    /// Wrap a preconfigured reqwest client
    pub fn from_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }

    async fn read_reply(response: reqwest::Response) -> KmsResult<HttpReply> {
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(connectivity)?;
        Ok(HttpReply::new(status, body.to_vec()))
    }
}

#[async_trait]
impl KmsTransport for HttpTransport {
    async fn get(&self, url: Url) -> KmsResult<HttpReply> {
        let response = self.client.get(url).send().await.map_err(connectivity)?;
        Self::read_reply(response).await
    }

    async fn post_json(&self, url: Url, body: serde_json::Value) -> KmsResult<HttpReply> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(connectivity)?;
        Self::read_reply(response).await
    }
}

fn connectivity(err: reqwest::Error) -> KmsError {
    KmsError::Connectivity(err.to_string())
}
