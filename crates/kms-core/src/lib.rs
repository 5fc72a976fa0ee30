//! Threshold FHE KMS Protocol Core
//!
//! Wire types and errors shared by every KMS client surface:
//! - Decryption request/response model with the pending → completed/failed lifecycle
//! - Key generation, party roster and health payloads
//! - Legacy ML-KEM key containers as plain value types
//! - A capability trait for native FHE operations the client never calls directly
//!
//! This crate performs no I/O and no cryptography.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod keys;
pub mod types;

pub use backend::{FheBackend, UnavailableBackend};
pub use keys::{EncryptionResult, KeyPair, MlKemPkePk, MlKemPkeSk};
pub use types::*;

pub use num_bigint::BigInt;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Remote operation that produced a server rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /health`
    Health,
    /// `POST /keygen`
    KeyGen,
    /// `GET /publickey`
    PublicKey,
    /// `GET /threshold/parties`
    Parties,
    /// `POST /threshold/decrypt`
    Submit,
    /// `GET /threshold/result/{requestId}`
    Poll,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Health => "KMS health check",
            Operation::KeyGen => "Key generation",
            Operation::PublicKey => "Public key fetch",
            Operation::Parties => "Party roster fetch",
            Operation::Submit => "Decryption request",
            Operation::Poll => "Decryption result fetch",
        };
        f.write_str(name)
    }
}

/// KMS client errors
#[derive(Error, Debug)]
pub enum KmsError {
    /// The server could not be reached
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The server answered with a non-success status
    #[error("{operation} failed: HTTP {status}: {body}")]
    ServerRejection {
        /// Operation that was rejected
        operation: Operation,
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// The server answered with a payload that breaks the protocol
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// The server reported the decryption as failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// The request was still pending when the deadline passed
    #[error("Decryption timeout: request {request_id} still pending after {}ms", .timeout.as_millis())]
    WaitTimeout {
        /// Request that timed out
        request_id: String,
        /// Deadline that was exceeded
        timeout: Duration,
    },

    /// Rejected locally before anything was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid threshold parameters
    #[error("Invalid threshold: t={0}, n={1} (require 1 <= t <= n)")]
    InvalidThreshold(u32, u32),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Capability not provided by this build
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

impl KmsError {
    /// Submission was rejected by the server
    pub fn is_submission_error(&self) -> bool {
        matches!(self, KmsError::ServerRejection { operation: Operation::Submit, .. })
    }

    /// Result poll was rejected by the server
    pub fn is_poll_error(&self) -> bool {
        matches!(self, KmsError::ServerRejection { operation: Operation::Poll, .. })
    }

    /// HTTP status carried by a server rejection
    pub fn status_code(&self) -> Option<u16> {
        match self {
            KmsError::ServerRejection { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for KMS operations
pub type KmsResult<T> = Result<T, KmsError>;
