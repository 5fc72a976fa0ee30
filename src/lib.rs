//! LuxFHE KMS
//!
//! Threshold FHE key management for decentralized decryption. Re-exports the
//! protocol types from `kms-core` and the HTTP client from `kms-client`.
//!
//! ```rust,no_run
//! use luxfhe_kms::{DecryptionRequest, KmsClient, KmsConfig, WaitOptions};
//!
//! # async fn run() -> luxfhe_kms::KmsResult<()> {
//! let client = KmsClient::connect(KmsConfig::new("https://kms.example.com")).await?;
//! let submitted = client.request_decryption(DecryptionRequest::new("Y2lwaGVydGV4dA==")).await?;
//! let plaintext = client
//!     .wait_for_decryption(&submitted.request_id, WaitOptions::default())
//!     .await?;
//! println!("{}", plaintext);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub use kms_client::{
    create_kms_client, normalize_server_url, HttpReply, HttpTransport, KmsClient, KmsConfig,
    KmsTransport, WaitOptions, DEFAULT_POLL_INTERVAL, DEFAULT_SERVER_URL, DEFAULT_WAIT_TIMEOUT,
    MIN_POLL_INTERVAL,
};
pub use kms_core::{
    generate_request_id, BigInt, DecryptionOutcome, DecryptionRequest, DecryptionResponse,
    DecryptionStatus, DecryptionSubmission, EncryptionResult, FheBackend, HealthStatus, KeyGenRequest,
    KeyGenResponse, KeyPair, KmsError, KmsResult, MlKemPkePk, MlKemPkeSk, Operation, ThresholdParty,
    UnavailableBackend, DEFAULT_PARTIES, DEFAULT_THRESHOLD,
};
