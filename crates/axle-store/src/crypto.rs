//! AES-256-GCM sealing for stored conversation history.
//!
//! Payloads are encrypted with a caller-supplied 256-bit key and a randomly
//! generated 96-bit nonce.  The nonce is prepended to the ciphertext so a
//! sealed payload is self-contained: `nonce || ciphertext || tag`.

use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, OpeningKey, SealingKey, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{StoreError, StoreResult};

/// Length of the AES-256-GCM key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the AES-256-GCM nonce in bytes (96 bits).
pub const NONCE_LEN: usize = aead::NONCE_LEN;

/// AES-256-GCM algorithm from `ring`.
static AEAD_ALG: &aead::Algorithm = &aead::AES_256_GCM;

/// A single-use nonce sequence that yields exactly one nonce and then
/// errors.
///
/// `ring` requires a [`NonceSequence`] for bound keys.  A fresh random nonce
/// is generated per seal, so each key binding is used exactly once.
struct SingleNonce(Option<[u8; NONCE_LEN]>);

impl SingleNonce {
    fn new(bytes: [u8; NONCE_LEN]) -> Self {
        Self(Some(bytes))
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.0
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// Encrypt `plaintext` with AES-256-GCM under the given 32-byte `key`.
///
/// Returns `nonce || ciphertext || tag`.
///
/// # Errors
///
/// Returns [`StoreError::EncryptionFailed`] on a wrong key length or a
/// cipher failure.
pub fn seal(plaintext: &[u8], key: &[u8]) -> StoreResult<Vec<u8>> {
    let unbound = UnboundKey::new(AEAD_ALG, key).map_err(|_| StoreError::EncryptionFailed {
        reason: format!("key must be {KEY_LEN} bytes, got {}", key.len()),
    })?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| StoreError::EncryptionFailed {
            reason: "failed to generate random nonce".into(),
        })?;

    let mut sealing_key = SealingKey::new(unbound, SingleNonce::new(nonce_bytes));

    let mut buffer = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(Aad::empty(), &mut buffer)
        .map_err(|_| StoreError::EncryptionFailed {
            reason: "aead seal failed".into(),
        })?;

    let mut output = Vec::with_capacity(NONCE_LEN + buffer.len());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&buffer);
    Ok(output)
}

/// Decrypt a payload produced by [`seal`] with the same key.
///
/// # Errors
///
/// Returns [`StoreError::DecryptionFailed`] on a wrong key, a truncated
/// payload, or tampered ciphertext (authentication failure).
pub fn open(sealed: &[u8], key: &[u8]) -> StoreResult<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return Err(StoreError::DecryptionFailed {
            reason: "payload shorter than nonce".into(),
        });
    }

    let unbound = UnboundKey::new(AEAD_ALG, key).map_err(|_| StoreError::DecryptionFailed {
        reason: format!("key must be {KEY_LEN} bytes, got {}", key.len()),
    })?;

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce: [u8; NONCE_LEN] = nonce_bytes
        .try_into()
        .map_err(|_| StoreError::DecryptionFailed {
            reason: "invalid nonce".into(),
        })?;

    let mut opening_key = OpeningKey::new(unbound, SingleNonce::new(nonce));

    let mut buffer = ciphertext.to_vec();
    let plaintext = opening_key
        .open_in_place(Aad::empty(), &mut buffer)
        .map_err(|_| StoreError::DecryptionFailed {
            reason: "aead open failed (wrong key or tampered data)".into(),
        })?;

    Ok(plaintext.to_vec())
}
