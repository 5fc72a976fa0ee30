//! Key containers
//!
//! Byte holders kept for compatibility with TKMS-style bindings. They carry no
//! behavior beyond storing and returning bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// ML-KEM public key bytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MlKemPkePk(Vec<u8>);

impl MlKemPkePk {
    /// Wrap raw key bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        MlKemPkePk(bytes)
    }

    /// Borrow the key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Copy the key bytes out
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.clone()
    }
}

impl From<Vec<u8>> for MlKemPkePk {
    fn from(bytes: Vec<u8>) -> Self {
        MlKemPkePk(bytes)
    }
}

impl From<&[u8]> for MlKemPkePk {
    fn from(bytes: &[u8]) -> Self {
        MlKemPkePk(bytes.to_vec())
    }
}

/// ML-KEM secret key bytes (auto-zeroized on drop)
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MlKemPkeSk(Vec<u8>);

impl MlKemPkeSk {
    /// Wrap raw key bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        MlKemPkeSk(bytes)
    }

    /// Borrow the key bytes (use carefully)
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Copy the key bytes into a zeroizing buffer
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.clone())
    }
}

impl From<Vec<u8>> for MlKemPkeSk {
    fn from(bytes: Vec<u8>) -> Self {
        MlKemPkeSk(bytes)
    }
}

impl fmt::Debug for MlKemPkeSk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MlKemPkeSk([REDACTED; {}])", self.0.len())
    }
}

/// FHE key pair produced by a native backend
#[derive(Clone)]
pub struct KeyPair {
    /// Public key bytes
    pub public_key: Vec<u8>,
    /// Private key bytes
    pub private_key: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key.len())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Ciphertext with the key it was produced under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionResult {
    /// Ciphertext bytes
    pub ciphertext: Vec<u8>,
    /// Public key bytes used for encryption
    pub public_key: Vec<u8>,
}
