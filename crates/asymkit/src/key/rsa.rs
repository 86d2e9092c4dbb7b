// Copyright (C) Microsoft Corporation. All rights reserved.

//! RSA algorithm and key objects.
//!
//! Signatures are RSASSA-PKCS1-v1_5 over a caller-supplied digest (the
//! `DigestInfo` is built here from the digest OID). Encryption supports
//! OAEP (the default, SHA-1 mask and label hash), PKCS#1 v1.5 and raw
//! blocks. The private exponentiation uses the CRT components when the
//! key carries them.
//!
//! Key generation and generic export are deliberately unimplemented for
//! RSA; keys enter through the DER decoders.

use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa_padding::{RsaDigestKind, RsaEncoding, RsaError};

use super::{ExportOptions, KeyKind, RsaPadding};
use crate::der::{encode_digest_info, DerRsaPrivateKey, DerRsaPublicKey};
use crate::hash::{self, HashAlgorithm};
use crate::{KeyError, KeyResult};

fn os_rand_bytes(buf: &mut [u8]) -> Result<(), ()> {
    OsRng.try_fill_bytes(buf).map_err(|_| ())
}

/// The RSA algorithm. Stateless; key material lives on [`RsaKeyObject`].
#[derive(Debug, Default)]
pub struct RsaKeyAlgorithm {}

impl RsaKeyAlgorithm {
    /// Creates the RSA algorithm instance.
    pub fn new() -> Self {
        Self {}
    }

    /// RSA key pair generation is not implemented.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyNotImplemented`, always.
    pub fn generate_key_pair(&self, _bits: usize) -> KeyResult<(RsaKeyObject, RsaKeyObject)> {
        tracing::error!("RSA key generation is not implemented");
        Err(KeyError::KeyNotImplemented)
    }
}

#[derive(Debug)]
struct RsaPrivateParts {
    d: BigUint,
    p: BigUint,
    q: BigUint,
    dp: BigUint,
    dq: BigUint,
    qi: BigUint,
}

/// One half of an RSA key pair.
#[derive(Debug)]
pub struct RsaKeyObject {
    algorithm: Arc<RsaKeyAlgorithm>,
    kind: KeyKind,
    n: BigUint,
    e: BigUint,
    private: Option<RsaPrivateParts>,
}

impl RsaKeyObject {
    /// Builds a private key object from decoded PKCS#1 components.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyInvalidParameter` - zero modulus or exponent
    pub fn from_der_private(key: &DerRsaPrivateKey) -> KeyResult<Self> {
        let n = BigUint::from_bytes_be(key.n());
        let e = BigUint::from_bytes_be(key.e());
        if n.is_zero() || e.is_zero() {
            tracing::error!("RSA key with zero modulus or exponent");
            Err(KeyError::KeyInvalidParameter)?;
        }
        Ok(Self {
            algorithm: Arc::new(RsaKeyAlgorithm::new()),
            kind: KeyKind::Private,
            n,
            e,
            private: Some(RsaPrivateParts {
                d: BigUint::from_bytes_be(key.d()),
                p: BigUint::from_bytes_be(key.p()),
                q: BigUint::from_bytes_be(key.q()),
                dp: BigUint::from_bytes_be(key.dp()),
                dq: BigUint::from_bytes_be(key.dq()),
                qi: BigUint::from_bytes_be(key.qi()),
            }),
        })
    }

    /// Builds a public key object from decoded PKCS#1 components.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyInvalidParameter` - zero modulus or exponent
    pub fn from_der_public(key: &DerRsaPublicKey) -> KeyResult<Self> {
        let n = BigUint::from_bytes_be(key.n());
        let e = BigUint::from_bytes_be(key.e());
        if n.is_zero() || e.is_zero() {
            tracing::error!("RSA key with zero modulus or exponent");
            Err(KeyError::KeyInvalidParameter)?;
        }
        Ok(Self {
            algorithm: Arc::new(RsaKeyAlgorithm::new()),
            kind: KeyKind::Public,
            n,
            e,
            private: None,
        })
    }

    /// Shared algorithm instance.
    pub fn algorithm(&self) -> &Arc<RsaKeyAlgorithm> {
        &self.algorithm
    }

    /// Which half this object holds.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Modulus length in bytes; the size of every block and signature.
    pub fn key_size(&self) -> usize {
        ((self.n.bits() + 7) / 8) as usize
    }

    /// The public half of this key.
    pub fn to_public_key(&self) -> Self {
        Self {
            algorithm: Arc::clone(&self.algorithm),
            kind: KeyKind::Public,
            n: self.n.clone(),
            e: self.e.clone(),
            private: None,
        }
    }

    /// Compares key material: `n` and `e`, plus `d` when both sides are
    /// private. A private and a public key never compare equal.
    pub fn equals(&self, other: &Self) -> bool {
        if self.kind != other.kind || self.n != other.n || self.e != other.e {
            return false;
        }
        match (&self.private, &other.private) {
            (Some(a), Some(b)) => a.d == b.d,
            (None, None) => true,
            _ => false,
        }
    }

    /// RSA export is not implemented; keys round-trip through their DER
    /// decoders instead.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyNotImplemented`, always.
    pub fn export(&self, _options: &ExportOptions) -> KeyResult<Vec<u8>> {
        tracing::error!("RSA key export is not implemented");
        Err(KeyError::KeyNotImplemented)
    }

    /// Signs a precomputed digest with RSASSA-PKCS1-v1_5.
    ///
    /// # Errors
    ///
    /// * `KeyError::KeyPrivatePartMissing` - public key
    /// * `KeyError::KeyInvalidParameter` - digest length does not match the
    ///   hash, or the key is too small for the encoded block
    pub fn sign(&self, hash: &HashAlgorithm, digest: &[u8]) -> KeyResult<Vec<u8>> {
        if digest.len() != hash.output_length() {
            tracing::error!(len = digest.len(), "digest length does not match hash");
            Err(KeyError::KeyInvalidParameter)?;
        }
        let digest_info = encode_digest_info(hash.oid().clone(), digest)?;
        let em = RsaEncoding::encode_pkcs1_v15_sig(&digest_info, self.key_size())
            .map_err(|_| KeyError::KeyInvalidParameter)?;
        let s = self.private_modpow(&BigUint::from_bytes_be(&em))?;
        Ok(self.pad(&s))
    }

    /// Verifies an RSASSA-PKCS1-v1_5 signature over a precomputed digest.
    /// Malformed signatures verify as `false` rather than erroring.
    pub fn verify(
        &self,
        hash: &HashAlgorithm,
        digest: &[u8],
        signature: &[u8],
    ) -> KeyResult<bool> {
        if digest.len() != hash.output_length() {
            tracing::error!(len = digest.len(), "digest length does not match hash");
            Err(KeyError::KeyInvalidParameter)?;
        }
        if signature.len() != self.key_size() {
            return Ok(false);
        }
        let s = BigUint::from_bytes_be(signature);
        if s >= self.n {
            return Ok(false);
        }
        let em = self.pad(&s.modpow(&self.e, &self.n));
        let digest_info = encode_digest_info(hash.oid().clone(), digest)?;
        Ok(RsaEncoding::verify_pkcs1_v15_sig(&digest_info, &em).unwrap_or(false))
    }

    /// Encrypts with the public key under the selected padding.
    ///
    /// # Errors
    ///
    /// * `KeyError::RsaMessageTooLong` - message exceeds the padding
    ///   capacity for this key size
    /// * `KeyError::RngFailure` - the padding could not draw random bytes
    pub fn public_encrypt(&self, padding: RsaPadding, message: &[u8]) -> KeyResult<Vec<u8>> {
        let k = self.key_size();
        let em = match padding {
            RsaPadding::Oaep => {
                let sha1 = hash::hash_by_name("sha-1")?;
                RsaEncoding::encode_oaep(
                    message,
                    None,
                    k,
                    RsaDigestKind::Sha1,
                    sha1.digest_fn(),
                    os_rand_bytes,
                )
                .map_err(encode_error)?
            }
            RsaPadding::Pkcs1 => {
                RsaEncoding::encode_pkcs1_v15_enc(message, k, os_rand_bytes)
                    .map_err(encode_error)?
            }
            RsaPadding::None => {
                if message.len() != k {
                    tracing::error!(len = message.len(), "raw block has the wrong length");
                    Err(KeyError::RsaMessageTooLong)?;
                }
                message.to_vec()
            }
        };
        let m = BigUint::from_bytes_be(&em);
        if m >= self.n {
            tracing::error!("block does not reduce below the modulus");
            Err(KeyError::KeyInvalidParameter)?;
        }
        Ok(self.pad(&m.modpow(&self.e, &self.n)))
    }

    /// Decrypts with the private key under the selected padding.
    ///
    /// All padding failures surface as a single uninformative
    /// `RsaDecryptionError`.
    pub fn private_decrypt(&self, padding: RsaPadding, ciphertext: &[u8]) -> KeyResult<Vec<u8>> {
        let k = self.key_size();
        if ciphertext.len() != k {
            Err(KeyError::RsaDecryptionError)?;
        }
        let c = BigUint::from_bytes_be(ciphertext);
        if c >= self.n {
            Err(KeyError::RsaDecryptionError)?;
        }
        let mut em = self.pad(&self.private_modpow(&c)?);
        match padding {
            RsaPadding::Oaep => {
                let sha1 = hash::hash_by_name("sha-1")?;
                RsaEncoding::decode_oaep(&mut em, None, k, RsaDigestKind::Sha1, sha1.digest_fn())
                    .map_err(|_| KeyError::RsaDecryptionError)
            }
            RsaPadding::Pkcs1 => RsaEncoding::decode_pkcs1_v15_enc(&em, k)
                .map_err(|_| KeyError::RsaDecryptionError),
            RsaPadding::None => Ok(em),
        }
    }

    /// Private exponentiation, through the CRT when the components are
    /// available.
    fn private_modpow(&self, m: &BigUint) -> KeyResult<BigUint> {
        let parts = self.private.as_ref().ok_or_else(|| {
            tracing::error!("operation requires the private key");
            KeyError::KeyPrivatePartMissing
        })?;
        if parts.p.is_zero() || parts.q.is_zero() {
            return Ok(m.modpow(&parts.d, &self.n));
        }
        let m1 = m.modpow(&parts.dp, &parts.p);
        let m2 = m.modpow(&parts.dq, &parts.q);
        // Garner recombination; signed arithmetic for the difference.
        let diff = BigInt::from(m1) - BigInt::from(m2.clone());
        let h = (BigInt::from(parts.qi.clone()) * diff)
            .mod_floor(&BigInt::from(parts.p.clone()));
        let h = h.to_biguint().unwrap_or_default();
        Ok(&m2 + &h * &parts.q)
    }

    fn pad(&self, v: &BigUint) -> Vec<u8> {
        let bytes = v.to_bytes_be();
        let mut out = vec![0u8; self.key_size().saturating_sub(bytes.len())];
        out.extend_from_slice(&bytes);
        out
    }
}

fn encode_error(err: RsaError) -> KeyError {
    match err {
        RsaError::InvalidParameter => KeyError::RsaMessageTooLong,
        RsaError::RngFailure => KeyError::RngFailure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::der::tests::testvectors::{RSA_PKCS1_PRIV_PEM, RSA_PKCS8_PRIV_PEM};
    use crate::pem::parse_pem;

    fn private_key(pem: &str, pkcs8: bool) -> RsaKeyObject {
        let der = parse_pem(pem).unwrap().der;
        let key = if pkcs8 {
            DerRsaPrivateKey::from_pkcs8_der(&der).unwrap()
        } else {
            DerRsaPrivateKey::from_pkcs1_der(&der).unwrap()
        };
        RsaKeyObject::from_der_private(&key).unwrap()
    }

    #[test]
    fn sign_known_answer() {
        let key = private_key(RSA_PKCS1_PRIV_PEM, false);
        let hash = hash::hash_by_name("sha-256").unwrap();
        let sig = key.sign(hash, &hash.digest(b"hello world")).unwrap();
        assert_eq!(
            hex::encode(&sig),
            "8072c98079c1253de625d60d264ce105520f29aeedf61187e0d55906a75690cf\
             381644ef624aa357d21cd827b06f3f9e3a11946cb8e4bc5b4b1d026642b8ffd7\
             b2c9cad6ec95b4b10e867420b3c69731aedbc9481dd56f37f4182e69f7f6d3df\
             2a652537f9c184c4a5d1ea6e8e83ca11525da36855e22847148100be46b143ac"
        );
    }

    #[test]
    fn verify_accepts_and_rejects() {
        let key = private_key(RSA_PKCS1_PRIV_PEM, false);
        let public = key.to_public_key();
        let hash = hash::hash_by_name("sha-256").unwrap();
        let digest = hash.digest(b"hello world");
        let sig = key.sign(hash, &digest).unwrap();

        assert!(public.verify(hash, &digest, &sig).unwrap());
        assert!(!public
            .verify(hash, &hash.digest(b"hello worle"), &sig)
            .unwrap());

        let mut bad = sig.clone();
        bad[0] ^= 1;
        assert!(!public.verify(hash, &digest, &bad).unwrap());
        assert!(!public.verify(hash, &digest, &sig[..64]).unwrap());
    }

    #[test]
    fn pkcs1_and_pkcs8_are_the_same_key() {
        let a = private_key(RSA_PKCS1_PRIV_PEM, false);
        let b = private_key(RSA_PKCS8_PRIV_PEM, true);
        assert!(a.equals(&b));
        assert!(a.to_public_key().equals(&b.to_public_key()));
        // a private key never equals its own public half
        assert!(!a.equals(&a.to_public_key()));
    }

    #[test]
    fn oaep_roundtrip_is_default() {
        let key = private_key(RSA_PKCS1_PRIV_PEM, false);
        let ct = key
            .public_encrypt(RsaPadding::default(), b"attack at dawn")
            .unwrap();
        assert_eq!(ct.len(), key.key_size());
        let pt = key.private_decrypt(RsaPadding::Oaep, &ct).unwrap();
        assert_eq!(pt, b"attack at dawn");

        // PKCS#1 ciphertext under OAEP unpadding fails uninformatively
        let ct2 = key.public_encrypt(RsaPadding::Pkcs1, b"x").unwrap();
        assert_eq!(
            key.private_decrypt(RsaPadding::Oaep, &ct2).unwrap_err(),
            KeyError::RsaDecryptionError
        );
    }

    #[test]
    fn pkcs1_roundtrip_and_bounds() {
        let key = private_key(RSA_PKCS1_PRIV_PEM, false);
        let ct = key.public_encrypt(RsaPadding::Pkcs1, b"short").unwrap();
        assert_eq!(key.private_decrypt(RsaPadding::Pkcs1, &ct).unwrap(), b"short");

        // 1024-bit key: PKCS#1 capacity is 128 - 11 = 117
        let long = vec![0x61u8; 118];
        assert_eq!(
            key.public_encrypt(RsaPadding::Pkcs1, &long).unwrap_err(),
            KeyError::RsaMessageTooLong
        );
        // OAEP-SHA1 capacity is 128 - 42 = 86
        let long = vec![0x61u8; 87];
        assert_eq!(
            key.public_encrypt(RsaPadding::Oaep, &long).unwrap_err(),
            KeyError::RsaMessageTooLong
        );
    }

    #[test]
    fn raw_padding_is_exact_block() {
        let key = private_key(RSA_PKCS1_PRIV_PEM, false);
        let mut block = vec![0u8; key.key_size()];
        block[0] = 0x00;
        block[key.key_size() - 1] = 0x2a;
        let ct = key.public_encrypt(RsaPadding::None, &block).unwrap();
        assert_eq!(key.private_decrypt(RsaPadding::None, &ct).unwrap(), block);

        assert_eq!(
            key.public_encrypt(RsaPadding::None, b"short").unwrap_err(),
            KeyError::RsaMessageTooLong
        );
    }

    #[test]
    fn public_key_cannot_sign_or_decrypt() {
        let key = private_key(RSA_PKCS1_PRIV_PEM, false);
        let public = key.to_public_key();
        let hash = hash::hash_by_name("sha-256").unwrap();
        assert_eq!(
            public.sign(hash, &hash.digest(b"x")).unwrap_err(),
            KeyError::KeyPrivatePartMissing
        );
        let ct = public.public_encrypt(RsaPadding::Oaep, b"x").unwrap();
        assert_eq!(
            public.private_decrypt(RsaPadding::Oaep, &ct).unwrap_err(),
            KeyError::KeyPrivatePartMissing
        );
    }

    #[test]
    fn stubs_stay_unimplemented() {
        let key = private_key(RSA_PKCS1_PRIV_PEM, false);
        assert_eq!(
            key.export(&ExportOptions::default()).unwrap_err(),
            KeyError::KeyNotImplemented
        );
        assert_eq!(
            key.algorithm().generate_key_pair(2048).unwrap_err(),
            KeyError::KeyNotImplemented
        );
    }
}
