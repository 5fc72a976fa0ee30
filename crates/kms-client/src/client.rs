//! KMS client
//!
//! Submits ciphertexts for threshold decryption, polls their status and
//! drives the wait loop until a terminal status or a deadline.

use crate::config::{normalize_server_url, KmsConfig, WaitOptions, DEFAULT_SERVER_URL};
use crate::transport::{HttpReply, HttpTransport, KmsTransport};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kms_core::{
    BigInt, DecryptionOutcome, DecryptionRequest, DecryptionResponse, HealthStatus, KeyGenRequest,
    KeyGenResponse, KmsError, KmsResult, Operation, ThresholdParty,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{sleep, Instant};

/// Key material learned from the server
#[derive(Debug, Default)]
struct KeyCache {
    public_key: Option<String>,
    key_id: Option<String>,
    parties: Vec<ThresholdParty>,
}

/// Client for one KMS server
pub struct KmsClient<T = HttpTransport> {
    server_url: String,
    base_url: Url,
    config: KmsConfig,
    transport: T,
    cache: RwLock<KeyCache>,
}

impl KmsClient<HttpTransport> {
    /// Client over HTTP
    pub fn new(config: KmsConfig) -> KmsResult<Self> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Self::with_transport(config, transport)
    }

    /// Build a client and check the server is healthy before handing it out
    pub async fn connect(config: KmsConfig) -> KmsResult<Self> {
        Self::new(config)?.ensure_healthy().await
    }
}

impl<T: KmsTransport> KmsClient<T> {
    /// Client over an arbitrary transport
    pub fn with_transport(mut config: KmsConfig, transport: T) -> KmsResult<Self> {
        let (server_url, base_url) = normalize_server_url(&config.server_url)?;
        config.server_url = server_url.clone();

        Ok(KmsClient {
            server_url,
            base_url,
            config,
            transport,
            cache: RwLock::new(KeyCache::default()),
        })
    }

    /// Pass the client through only if the server answers its health check
    pub async fn ensure_healthy(self) -> KmsResult<Self> {
        let health = self.health().await?;
        log::info!(
            "Connected to KMS at {} (status={}, parties={})",
            self.server_url,
            health.status,
            health.parties
        );
        Ok(self)
    }

    /// Normalized server URL
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Effective configuration
    pub fn config(&self) -> &KmsConfig {
        &self.config
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn endpoint(&self, segments: &[&str]) -> KmsResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| KmsError::Configuration(format!("{} cannot be a base URL", self.server_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B: Serialize>(&self, segments: &[&str], body: &B) -> KmsResult<HttpReply> {
        let url = self.endpoint(segments)?;
        let body = serde_json::to_value(body)
            .map_err(|e| KmsError::InvalidRequest(format!("Failed to encode request: {}", e)))?;
        self.transport.post_json(url, body).await
    }

    async fn get(&self, segments: &[&str]) -> KmsResult<HttpReply> {
        let url = self.endpoint(segments)?;
        self.transport.get(url).await
    }

    /// Check KMS server health
    pub async fn health(&self) -> KmsResult<HealthStatus> {
        let reply = self.get(&["health"]).await?;
        decode(Operation::Health, reply)
    }

    /// Generate a new threshold key set and remember its key material.
    ///
    /// Missing parameters fall back to the configured defaults, then 3-of-5.
    pub async fn generate_keys(&self, request: Option<KeyGenRequest>) -> KmsResult<KeyGenResponse> {
        let request = self.config.keygen_request(request);
        request.validate()?;

        log::info!(
            "Requesting {}-of-{} key generation from {}",
            request.threshold,
            request.parties,
            self.server_url
        );
        let reply = self.post(&["keygen"], &request).await?;
        let response: KeyGenResponse = decode(Operation::KeyGen, reply)?;

        let mut cache = self.cache.write().await;
        cache.public_key = Some(response.public_key.clone());
        cache.key_id = Some(response.key_id.clone());
        cache.parties = response.parties.clone();

        Ok(response)
    }

    /// Public key, base64-encoded; fetched once then served from cache
    pub async fn get_public_key(&self) -> KmsResult<String> {
        let cached = self.cache.read().await.public_key.clone();
        if let Some(public_key) = cached {
            return Ok(public_key);
        }

        let reply = check(Operation::PublicKey, self.get(&["publickey"]).await?)?;
        let public_key = STANDARD.encode(&reply.body);

        self.cache.write().await.public_key = Some(public_key.clone());
        Ok(public_key)
    }

    /// Threshold party roster; fetched once then served from cache
    pub async fn get_parties(&self) -> KmsResult<Vec<ThresholdParty>> {
        let cached = self.cache.read().await.parties.clone();
        if !cached.is_empty() {
            return Ok(cached);
        }

        let reply = self.get(&["threshold", "parties"]).await?;
        let parties: Vec<ThresholdParty> = decode(Operation::Parties, reply)?;

        self.cache.write().await.parties = parties.clone();
        Ok(parties)
    }

    /// Key id from the last key generation
    pub async fn key_id(&self) -> Option<String> {
        self.cache.read().await.key_id.clone()
    }

    /// Submit a ciphertext for threshold decryption.
    ///
    /// A request without an id gets a fresh UUID. Rejections are reported
    /// immediately and never retried.
    pub async fn request_decryption(&self, request: DecryptionRequest) -> KmsResult<DecryptionResponse> {
        let submission = request.into_submission()?;
        log::info!("Submitting decryption request {}", submission.request_id);

        let reply = self.post(&["threshold", "decrypt"], &submission).await?;
        let response: DecryptionResponse = decode(Operation::Submit, reply)?;

        if response.request_id != submission.request_id {
            log::warn!(
                "KMS assigned request id {} to submission {}",
                response.request_id,
                submission.request_id
            );
        }

        Ok(response)
    }

    /// Fetch the current status of a request (single attempt)
    pub async fn get_decryption_result(&self, request_id: &str) -> KmsResult<DecryptionResponse> {
        let reply = self.get(&["threshold", "result", request_id]).await?;
        let response: DecryptionResponse = decode(Operation::Poll, reply)?;

        if response.request_id != request_id {
            return Err(KmsError::ProtocolViolation(format!(
                "polled {} but server answered for {}",
                request_id, response.request_id
            )));
        }

        Ok(response)
    }

    /// Poll `request_id` every `poll_interval` until it completes, fails, or
    /// `timeout` has elapsed.
    ///
    /// The deadline is checked before each poll; a poll already in flight is
    /// allowed to finish. Dropping the future stops polling without telling
    /// the server.
    pub async fn wait_for_decryption(&self, request_id: &str, options: WaitOptions) -> KmsResult<BigInt> {
        let start = Instant::now();
        let mut polls = 0u32;

        while start.elapsed() < options.timeout {
            polls += 1;
            let response = self.get_decryption_result(request_id).await?;

            match response.into_outcome()? {
                DecryptionOutcome::Completed(value) => {
                    log::info!("Decryption {} completed after {} poll(s)", request_id, polls);
                    return Ok(value);
                }
                DecryptionOutcome::Failed(message) => {
                    log::warn!("Decryption {} failed: {}", request_id, message);
                    return Err(KmsError::DecryptionFailed(message));
                }
                DecryptionOutcome::Pending => {
                    log::debug!("Decryption {} pending (poll {})", request_id, polls);
                    sleep(options.poll_interval).await;
                }
            }
        }

        log::warn!(
            "Decryption {} still pending after {:?} ({} polls)",
            request_id,
            options.timeout,
            polls
        );
        Err(KmsError::WaitTimeout {
            request_id: request_id.to_string(),
            timeout: options.timeout,
        })
    }

    /// Submit and wait. Returns straight away when the submission answer is
    /// already terminal.
    pub async fn decrypt(&self, request: DecryptionRequest, options: WaitOptions) -> KmsResult<BigInt> {
        let initial = self.request_decryption(request).await?;
        let request_id = initial.request_id.clone();

        match initial.into_outcome()? {
            DecryptionOutcome::Completed(value) => Ok(value),
            DecryptionOutcome::Failed(message) => Err(KmsError::DecryptionFailed(message)),
            DecryptionOutcome::Pending => self.wait_for_decryption(&request_id, options).await,
        }
    }
}

/// HTTP client built from `options` (key generation defaults, request
/// timeout). `server_url` overrides the URL in `options`; with neither the
/// public LuxFHE KMS is used.
pub fn create_kms_client(server_url: Option<&str>, options: Option<KmsConfig>) -> KmsResult<KmsClient> {
    let mut config = options.unwrap_or_else(|| KmsConfig::new(DEFAULT_SERVER_URL));
    if let Some(server_url) = server_url {
        config.server_url = server_url.to_string();
    }
    KmsClient::new(config)
}

fn check(operation: Operation, reply: HttpReply) -> KmsResult<HttpReply> {
    if reply.is_success() {
        return Ok(reply);
    }

    log::warn!("{} rejected with HTTP {}", operation, reply.status);
    Err(KmsError::ServerRejection {
        operation,
        status: reply.status,
        body: reply.text(),
    })
}

fn decode<R: DeserializeOwned>(operation: Operation, reply: HttpReply) -> KmsResult<R> {
    let reply = check(operation, reply)?;
    serde_json::from_slice(&reply.body)
        .map_err(|e| KmsError::ProtocolViolation(format!("malformed {} response: {}", operation, e)))
}
