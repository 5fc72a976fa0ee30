//! Threshold FHE KMS Client
//!
//! Talks to a KMS server over HTTP:
//! - Distributed key generation, public key and party roster (cached per client)
//! - Threshold decryption submission and result polling
//! - A fixed-interval wait loop that blocks until the plaintext is ready,
//!   the server reports failure, or a deadline passes
//!
//! Each [`KmsClient`] is owned by the caller; there is no process-wide
//! default client. Nothing in this crate retries.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod transport;

#[cfg(test)]
mod mock;

pub use client::{create_kms_client, KmsClient};
pub use config::{
    normalize_server_url, KmsConfig, WaitOptions, DEFAULT_POLL_INTERVAL, DEFAULT_SERVER_URL,
    DEFAULT_WAIT_TIMEOUT, MIN_POLL_INTERVAL,
};
pub use transport::{HttpReply, HttpTransport, KmsTransport};

pub use kms_core;
