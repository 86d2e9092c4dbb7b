// Copyright (C) Microsoft Corporation. All rights reserved.

//! AES-GCM cipher registry.
//!
//! Thin adapter over the `aes-gcm` crate keyed by the NIST algorithm OIDs.
//! Ciphertexts carry the 16-byte tag appended; nonces are the standard 96
//! bits.

use std::sync::OnceLock;

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, KeyInit};

use crate::oid::{OID_AES128_GCM, OID_AES192_GCM, OID_AES256_GCM};
use crate::{KeyError, KeyResult};

type Aes192Gcm = AesGcm<Aes192, aes_gcm::aead::consts::U12>;

const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

/// A registered authenticated cipher.
#[derive(Debug)]
pub struct CipherAlgorithm {
    name: &'static str,
    oid: asn1::ObjectIdentifier,
    key_length: usize,
    encrypt_fn: fn(&[u8], &[u8], &[u8], &[u8]) -> KeyResult<Vec<u8>>,
    decrypt_fn: fn(&[u8], &[u8], &[u8], &[u8]) -> KeyResult<Vec<u8>>,
}

fn seal<C: Aead + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> KeyResult<Vec<u8>> {
    let cipher = C::new_from_slice(key).map_err(|_| KeyError::KeyInvalidParameter)?;
    if nonce.len() != NONCE_LENGTH {
        tracing::error!(len = nonce.len(), "wrong nonce length");
        Err(KeyError::KeyInvalidParameter)?;
    }
    cipher
        .encrypt(
            GenericArray::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| KeyError::KeyInvalidParameter)
}

fn open<C: Aead + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> KeyResult<Vec<u8>> {
    let cipher = C::new_from_slice(key).map_err(|_| KeyError::KeyInvalidParameter)?;
    if nonce.len() != NONCE_LENGTH || ciphertext.len() < TAG_LENGTH {
        tracing::error!("malformed nonce or ciphertext");
        Err(KeyError::KeyInvalidParameter)?;
    }
    cipher
        .decrypt(
            GenericArray::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| {
            tracing::error!("authenticated decryption failed");
            KeyError::CipherAuthenticationError
        })
}

impl CipherAlgorithm {
    /// Canonical algorithm name (`aes-256-gcm`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// NIST algorithm OID.
    pub fn oid(&self) -> &asn1::ObjectIdentifier {
        &self.oid
    }

    /// Key length in bytes.
    pub fn key_length(&self) -> usize {
        self.key_length
    }

    /// Nonce length in bytes.
    pub fn nonce_length(&self) -> usize {
        NONCE_LENGTH
    }

    /// Authentication tag length in bytes.
    pub fn tag_length(&self) -> usize {
        TAG_LENGTH
    }

    /// Encrypts and authenticates; the tag is appended to the ciphertext.
    pub fn encrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> KeyResult<Vec<u8>> {
        (self.encrypt_fn)(key, nonce, aad, plaintext)
    }

    /// Verifies the appended tag and decrypts.
    ///
    /// # Errors
    ///
    /// `KeyError::CipherAuthenticationError` - the tag does not verify
    pub fn decrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> KeyResult<Vec<u8>> {
        (self.decrypt_fn)(key, nonce, aad, ciphertext)
    }
}

fn registry() -> &'static Vec<CipherAlgorithm> {
    static REGISTRY: OnceLock<Vec<CipherAlgorithm>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        vec![
            CipherAlgorithm {
                name: "aes-128-gcm",
                oid: OID_AES128_GCM,
                key_length: 16,
                encrypt_fn: seal::<Aes128Gcm>,
                decrypt_fn: open::<Aes128Gcm>,
            },
            CipherAlgorithm {
                name: "aes-192-gcm",
                oid: OID_AES192_GCM,
                key_length: 24,
                encrypt_fn: seal::<Aes192Gcm>,
                decrypt_fn: open::<Aes192Gcm>,
            },
            CipherAlgorithm {
                name: "aes-256-gcm",
                oid: OID_AES256_GCM,
                key_length: 32,
                encrypt_fn: seal::<Aes256Gcm>,
                decrypt_fn: open::<Aes256Gcm>,
            },
        ]
    })
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Looks a cipher up by name.
///
/// # Errors
///
/// `KeyError::CipherUnknownAlgorithm`
pub fn cipher_by_name(name: &str) -> KeyResult<&'static CipherAlgorithm> {
    let wanted = normalize(name);
    registry()
        .iter()
        .find(|c| normalize(c.name) == wanted)
        .ok_or_else(|| {
            tracing::error!(name, "cipher name not in registry");
            KeyError::CipherUnknownAlgorithm
        })
}

/// Looks a cipher up by OID.
///
/// # Errors
///
/// `KeyError::CipherUnknownAlgorithm`
pub fn cipher_by_oid(oid: &asn1::ObjectIdentifier) -> KeyResult<&'static CipherAlgorithm> {
    registry()
        .iter()
        .find(|c| c.oid == *oid)
        .ok_or_else(|| {
            tracing::error!(%oid, "cipher OID not in registry");
            KeyError::CipherUnknownAlgorithm
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcm_zero_vectors() {
        // NIST GCM test vectors for AES-128, all-zero key and nonce.
        let cipher = cipher_by_name("aes-128-gcm").unwrap();
        let key = [0u8; 16];
        let nonce = [0u8; 12];

        let empty = cipher.encrypt(&key, &nonce, b"", b"").unwrap();
        assert_eq!(hex::encode(&empty), "58e2fccefa7e3061367f1d57a4e7455a");

        let out = cipher.encrypt(&key, &nonce, b"", &[0u8; 16]).unwrap();
        assert_eq!(
            hex::encode(&out),
            "0388dace60b6a392f328c2b971b2fe78ab6e47d42cec13bdf53a67b21257bddf"
        );

        let back = cipher.decrypt(&key, &nonce, b"", &out).unwrap();
        assert_eq!(back, [0u8; 16]);
    }

    #[test]
    fn roundtrip_with_aad() {
        for name in ["aes-128-gcm", "aes-192-gcm", "aes-256-gcm"] {
            let cipher = cipher_by_name(name).unwrap();
            let key = vec![0x42u8; cipher.key_length()];
            let nonce = [0x24u8; 12];
            let ct = cipher
                .encrypt(&key, &nonce, b"header", b"payload")
                .unwrap();
            assert_eq!(ct.len(), 7 + cipher.tag_length());
            let pt = cipher.decrypt(&key, &nonce, b"header", &ct).unwrap();
            assert_eq!(pt, b"payload");

            assert_eq!(
                cipher.decrypt(&key, &nonce, b"other", &ct).unwrap_err(),
                KeyError::CipherAuthenticationError,
                "{name}"
            );
        }
    }

    #[test]
    fn tamper_detection() {
        let cipher = cipher_by_oid(&OID_AES256_GCM).unwrap();
        let key = [0x0fu8; 32];
        let nonce = [0u8; 12];
        let mut ct = cipher.encrypt(&key, &nonce, b"", b"secret").unwrap();
        *ct.last_mut().unwrap() ^= 1;
        assert_eq!(
            cipher.decrypt(&key, &nonce, b"", &ct).unwrap_err(),
            KeyError::CipherAuthenticationError
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        let cipher = cipher_by_name("aes-128-gcm").unwrap();
        assert_eq!(
            cipher.encrypt(&[0u8; 15], &[0u8; 12], b"", b"").unwrap_err(),
            KeyError::KeyInvalidParameter
        );
        assert_eq!(
            cipher.encrypt(&[0u8; 16], &[0u8; 8], b"", b"").unwrap_err(),
            KeyError::KeyInvalidParameter
        );
        assert_eq!(
            cipher_by_name("chacha20-poly1305").unwrap_err(),
            KeyError::CipherUnknownAlgorithm
        );
    }
}
