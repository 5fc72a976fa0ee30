//! KMS wire types
//!
//! All payloads are JSON with camelCase field names.

use crate::{KmsError, KmsResult};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Threshold used for key generation when neither the request nor the config sets one
pub const DEFAULT_THRESHOLD: u32 = 3;

/// Party count used for key generation when neither the request nor the config sets one
pub const DEFAULT_PARTIES: u32 = 5;

/// Generate a fresh request identifier (random UUID v4)
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// A ciphertext submitted for threshold decryption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionRequest {
    /// Opaque encoded ciphertext reference
    pub ciphertext: String,

    /// Caller-chosen identifier; generated on submission when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl DecryptionRequest {
    /// Create a request without an identifier
    pub fn new(ciphertext: impl Into<String>) -> Self {
        DecryptionRequest {
            ciphertext: ciphertext.into(),
            request_id: None,
        }
    }

    /// Attach a caller-chosen identifier
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Validate the ciphertext and resolve the identifier.
    ///
    /// An absent or blank identifier is replaced by a fresh UUID, so every
    /// submission carries exactly one id.
    pub fn into_submission(self) -> KmsResult<DecryptionSubmission> {
        if self.ciphertext.trim().is_empty() {
            return Err(KmsError::InvalidRequest("ciphertext must not be empty".to_string()));
        }

        let request_id = match self.request_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => generate_request_id(),
        };

        Ok(DecryptionSubmission {
            ciphertext: self.ciphertext,
            request_id,
        })
    }
}

/// Body of `POST /threshold/decrypt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionSubmission {
    /// Opaque encoded ciphertext reference
    pub ciphertext: String,
    /// Resolved request identifier
    pub request_id: String,
}

/// Server-side lifecycle of a decryption request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecryptionStatus {
    /// Still being processed by the parties
    Pending,
    /// Plaintext reconstructed
    Completed,
    /// Server gave up on the request
    Failed,
}

impl DecryptionStatus {
    /// No further transition is expected
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DecryptionStatus::Pending)
    }
}

impl fmt::Display for DecryptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecryptionStatus::Pending => "pending",
            DecryptionStatus::Completed => "completed",
            DecryptionStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Server view of a decryption request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionResponse {
    /// Echo of the submitted identifier
    pub request_id: String,

    /// Lifecycle status
    pub status: DecryptionStatus,

    /// Decrypted plaintext, only with `completed`
    #[serde(default, with = "plaintext", skip_serializing_if = "Option::is_none")]
    pub result: Option<BigInt>,

    /// Failure description, only with `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Validated reading of a [`DecryptionResponse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptionOutcome {
    /// Keep polling
    Pending,
    /// Decrypted plaintext
    Completed(BigInt),
    /// Server-reported failure text
    Failed(String),
}

impl DecryptionResponse {
    /// Pending response for `request_id`
    pub fn pending(request_id: impl Into<String>) -> Self {
        DecryptionResponse {
            request_id: request_id.into(),
            status: DecryptionStatus::Pending,
            result: None,
            error: None,
        }
    }

    /// Completed response carrying `result`
    pub fn completed(request_id: impl Into<String>, result: impl Into<BigInt>) -> Self {
        DecryptionResponse {
            request_id: request_id.into(),
            status: DecryptionStatus::Completed,
            result: Some(result.into()),
            error: None,
        }
    }

    /// Failed response carrying `error`
    pub fn failed(request_id: impl Into<String>, error: impl Into<String>) -> Self {
        DecryptionResponse {
            request_id: request_id.into(),
            status: DecryptionStatus::Failed,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Check the status/payload pairing and collapse it into an outcome.
    ///
    /// `completed` must carry a result, `failed` must carry non-empty error
    /// text, `pending` must carry neither.
    pub fn into_outcome(self) -> KmsResult<DecryptionOutcome> {
        let error = self.error.filter(|e| !e.trim().is_empty());

        match (self.status, self.result, error) {
            (DecryptionStatus::Pending, None, None) => Ok(DecryptionOutcome::Pending),
            (DecryptionStatus::Completed, Some(value), None) => Ok(DecryptionOutcome::Completed(value)),
            (DecryptionStatus::Failed, None, Some(message)) => Ok(DecryptionOutcome::Failed(message)),
            (DecryptionStatus::Completed, None, _) => Err(KmsError::ProtocolViolation(format!(
                "completed response for {} carries no result",
                self.request_id
            ))),
            (DecryptionStatus::Failed, _, None) => Err(KmsError::ProtocolViolation(format!(
                "failed response for {} carries no error message",
                self.request_id
            ))),
            (status, _, _) => Err(KmsError::ProtocolViolation(format!(
                "{} response for {} carries an unexpected payload",
                status, self.request_id
            ))),
        }
    }
}

/// Arbitrary-precision plaintext: accepted as a JSON integer of any size or a
/// decimal string, emitted as a decimal string.
mod plaintext {
    use num_bigint::BigInt;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Option<BigInt>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_str_radix(10)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BigInt>, D::Error> {
        let digits = match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(D::Error::custom(format!("expected integer result, got {}", other)))
            }
        };

        BigInt::parse_bytes(digits.trim().as_bytes(), 10)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("result is not an integer: {}", digits)))
    }
}

/// Member of the threshold party roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdParty {
    /// Party index
    pub id: u32,

    /// Party public key (encoded)
    pub public_key: String,

    /// Party endpoint, if exposed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Body of `POST /keygen`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGenRequest {
    /// Parties required to decrypt
    pub threshold: u32,
    /// Total parties holding shares
    pub parties: u32,
}

impl KeyGenRequest {
    /// Create and validate key generation parameters
    pub fn new(threshold: u32, parties: u32) -> KmsResult<Self> {
        let request = KeyGenRequest { threshold, parties };
        request.validate()?;
        Ok(request)
    }

    /// Require 1 <= t <= n
    pub fn validate(&self) -> KmsResult<()> {
        if self.threshold == 0 || self.threshold > self.parties {
            return Err(KmsError::InvalidThreshold(self.threshold, self.parties));
        }
        Ok(())
    }
}

impl Default for KeyGenRequest {
    fn default() -> Self {
        KeyGenRequest {
            threshold: DEFAULT_THRESHOLD,
            parties: DEFAULT_PARTIES,
        }
    }
}

/// Result of distributed key generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyGenResponse {
    /// Group public key (encoded)
    pub public_key: String,
    /// Server-side key identifier
    pub key_id: String,
    /// Parties holding shares of the key
    #[serde(default)]
    pub parties: Vec<ThresholdParty>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Server-reported status string
    pub status: String,
    /// Threshold mode enabled
    #[serde(default)]
    pub threshold: bool,
    /// Number of parties
    #[serde(default)]
    pub parties: u32,
}
