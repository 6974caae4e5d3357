//! Authenticated encryption stage.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;

use framewire_core::{ByteCursorBuffer, CodecContext, CodecError, Result};

use super::Wrapper;

/// AEAD nonce size shared by both supported algorithms.
const NONCE_LEN: usize = 12;
/// Key size shared by both supported algorithms.
const KEY_LEN: usize = 32;

/// Symmetric cipher used for the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CipherAlgorithm {
    /// AES-256 in Galois/Counter Mode.
    Aes256Gcm,
    /// ChaCha20 stream cipher with Poly1305 authentication.
    ChaCha20Poly1305,
}

enum CipherImpl {
    Aes(Box<Aes256Gcm>),
    ChaCha(Box<ChaCha20Poly1305>),
}

/// Encrypts the already-written body after encoding and decrypts it before
/// decoding. Each message gets a fresh random nonce, prepended to the
/// ciphertext.
///
/// Construction fails when the key is absent or the wrong size, and a failed
/// decryption surfaces as a cipher error rather than silently passing the
/// body through.
pub struct Cipher {
    inner: CipherImpl,
}

impl Cipher {
    /// Creates the stage from a 32-byte key.
    pub fn new(algorithm: CipherAlgorithm, key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(CodecError::Cipher("cipher key is absent".into()));
        }
        if key.len() != KEY_LEN {
            return Err(CodecError::Cipher(format!(
                "cipher key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let inner = match algorithm {
            CipherAlgorithm::Aes256Gcm => CipherImpl::Aes(Box::new(
                Aes256Gcm::new_from_slice(key)
                    .map_err(|e| CodecError::Cipher(format!("AES-256-GCM init failed: {e}")))?,
            )),
            CipherAlgorithm::ChaCha20Poly1305 => CipherImpl::ChaCha(Box::new(
                ChaCha20Poly1305::new_from_slice(key).map_err(|e| {
                    CodecError::Cipher(format!("ChaCha20-Poly1305 init failed: {e}"))
                })?,
            )),
        };
        Ok(Self { inner })
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let (nonce, ciphertext) = match &self.inner {
            CipherImpl::Aes(cipher) => {
                let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
                (nonce, cipher.encrypt(&nonce, plaintext))
            }
            CipherImpl::ChaCha(cipher) => {
                let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
                (nonce, cipher.encrypt(&nonce, plaintext))
            }
        };
        let ciphertext =
            ciphertext.map_err(|_| CodecError::Cipher("encryption failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_LEN {
            return Err(CodecError::Cipher(format!(
                "ciphertext too short: {} bytes, nonce alone is {NONCE_LEN}",
                sealed.len()
            )));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce: &[u8; NONCE_LEN] = nonce.try_into().expect("split length checked");
        match &self.inner {
            CipherImpl::Aes(cipher) => cipher.decrypt(nonce.into(), ciphertext),
            CipherImpl::ChaCha(cipher) => cipher.decrypt(nonce.into(), ciphertext),
        }
        .map_err(|_| {
            CodecError::Cipher("decryption failed: wrong key or tampered ciphertext".into())
        })
    }
}

impl Wrapper for Cipher {
    fn name(&self) -> &'static str {
        "cipher"
    }

    fn after_encode(&self, buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        let raw = buf.take_window();
        let sealed = self.seal(&raw)?;
        buf.replace_window(sealed);
        Ok(())
    }

    fn before_decode(&self, buf: &mut ByteCursorBuffer, _ctx: &mut CodecContext) -> Result<()> {
        let sealed = buf.take_window();
        buf.replace_window(self.open(&sealed)?);
        Ok(())
    }
}
