//! Native FHE capability
//!
//! Local key generation and encryption belong to a native FHE library, not to
//! the KMS client. Implementations plug in here; the client crate never
//! depends on this trait.

use crate::keys::{EncryptionResult, KeyPair, MlKemPkePk, MlKemPkeSk};
use crate::{KmsError, KmsResult};

/// Local FHE operations
pub trait FheBackend: Send + Sync {
    /// Generate a new FHE key pair
    fn generate_key_pair(&self) -> KmsResult<KeyPair>;

    /// Encrypt `data` under `public_key`
    fn encrypt(&self, data: &[u8], public_key: &[u8]) -> KmsResult<EncryptionResult>;

    /// Decrypt `ciphertext` with `private_key`
    fn decrypt(&self, ciphertext: &[u8], private_key: &[u8]) -> KmsResult<Vec<u8>>;

    /// Generate an ML-KEM key pair for user decryption responses
    fn ml_kem_keygen(&self) -> KmsResult<(MlKemPkePk, MlKemPkeSk)>;
}

/// Backend for builds without a native FHE library
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

impl FheBackend for UnavailableBackend {
    fn generate_key_pair(&self) -> KmsResult<KeyPair> {
        Err(KmsError::NotImplemented("FHE key generation requires a native backend"))
    }

    fn encrypt(&self, _data: &[u8], _public_key: &[u8]) -> KmsResult<EncryptionResult> {
        Err(KmsError::NotImplemented("FHE encryption requires a native backend"))
    }

    fn decrypt(&self, _ciphertext: &[u8], _private_key: &[u8]) -> KmsResult<Vec<u8>> {
        Err(KmsError::NotImplemented("FHE decryption requires a native backend"))
    }

    fn ml_kem_keygen(&self) -> KmsResult<(MlKemPkePk, MlKemPkeSk)> {
        Err(KmsError::NotImplemented("ML-KEM key generation requires a native backend"))
    }
}
