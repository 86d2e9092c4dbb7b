// Copyright (C) Microsoft Corporation. All rights reserved.

//! Hash algorithm registry.
//!
//! Algorithms are looked up by OID or by name; name matching is
//! case-insensitive and ignores hyphens and underscores, so `SHA-256`,
//! `sha256` and `sha_256` all resolve to the same entry. Entries expose a
//! one-shot digest, an incremental hasher and the plain function pointer
//! form that [`rsa_padding`] consumes.

use std::sync::OnceLock;

use digest::DynDigest;
use rsa_padding::RsaDigestKind;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::oid::{OID_SHA1, OID_SHA224, OID_SHA256, OID_SHA384, OID_SHA512};
use crate::{KeyError, KeyResult};

/// A registered hash algorithm.
#[derive(Debug)]
pub struct HashAlgorithm {
    name: &'static str,
    oid: asn1::ObjectIdentifier,
    output_length: usize,
    digest_fn: fn(&[u8]) -> Vec<u8>,
    hasher_fn: fn() -> Box<dyn DynDigest>,
    rsa_digest_kind: Option<RsaDigestKind>,
}

impl HashAlgorithm {
    /// Canonical algorithm name (`sha-256`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Digest algorithm OID.
    pub fn oid(&self) -> &asn1::ObjectIdentifier {
        &self.oid
    }

    /// Digest output length in bytes.
    pub fn output_length(&self) -> usize {
        self.output_length
    }

    /// One-shot digest.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        (self.digest_fn)(data)
    }

    /// One-shot digest as the function pointer form `rsa_padding` takes.
    pub fn digest_fn(&self) -> fn(&[u8]) -> Vec<u8> {
        self.digest_fn
    }

    /// Fresh incremental hasher.
    pub fn hasher(&self) -> Box<dyn DynDigest> {
        (self.hasher_fn)()
    }

    /// The `rsa_padding` digest selector, for the hashes that crate
    /// supports.
    pub fn rsa_digest_kind(&self) -> Option<RsaDigestKind> {
        self.rsa_digest_kind
    }
}

fn do_sha1(data: &[u8]) -> Vec<u8> {
    Sha1::digest(data).to_vec()
}

fn do_sha224(data: &[u8]) -> Vec<u8> {
    Sha224::digest(data).to_vec()
}

fn do_sha256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

fn do_sha384(data: &[u8]) -> Vec<u8> {
    Sha384::digest(data).to_vec()
}

fn do_sha512(data: &[u8]) -> Vec<u8> {
    Sha512::digest(data).to_vec()
}

fn registry() -> &'static Vec<HashAlgorithm> {
    static REGISTRY: OnceLock<Vec<HashAlgorithm>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        vec![
            HashAlgorithm {
                name: "sha-1",
                oid: OID_SHA1,
                output_length: 20,
                digest_fn: do_sha1,
                hasher_fn: || Box::new(Sha1::new()),
                rsa_digest_kind: Some(RsaDigestKind::Sha1),
            },
            HashAlgorithm {
                name: "sha-224",
                oid: OID_SHA224,
                output_length: 28,
                digest_fn: do_sha224,
                hasher_fn: || Box::new(Sha224::new()),
                rsa_digest_kind: None,
            },
            HashAlgorithm {
                name: "sha-256",
                oid: OID_SHA256,
                output_length: 32,
                digest_fn: do_sha256,
                hasher_fn: || Box::new(Sha256::new()),
                rsa_digest_kind: Some(RsaDigestKind::Sha256),
            },
            HashAlgorithm {
                name: "sha-384",
                oid: OID_SHA384,
                output_length: 48,
                digest_fn: do_sha384,
                hasher_fn: || Box::new(Sha384::new()),
                rsa_digest_kind: Some(RsaDigestKind::Sha384),
            },
            HashAlgorithm {
                name: "sha-512",
                oid: OID_SHA512,
                output_length: 64,
                digest_fn: do_sha512,
                hasher_fn: || Box::new(Sha512::new()),
                rsa_digest_kind: Some(RsaDigestKind::Sha512),
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

/// Looks a hash algorithm up by name.
///
/// # Errors
///
/// `KeyError::HashUnknownAlgorithm`
pub fn hash_by_name(name: &str) -> KeyResult<&'static HashAlgorithm> {
    let wanted = normalize(name);
    registry()
        .iter()
        .find(|h| normalize(h.name) == wanted)
        .ok_or_else(|| {
            tracing::error!(name, "hash name not in registry");
            KeyError::HashUnknownAlgorithm
        })
}

/// Looks a hash algorithm up by OID.
///
/// # Errors
///
/// `KeyError::HashUnknownAlgorithm`
pub fn hash_by_oid(oid: &asn1::ObjectIdentifier) -> KeyResult<&'static HashAlgorithm> {
    registry()
        .iter()
        .find(|h| h.oid == *oid)
        .ok_or_else(|| {
            tracing::error!(%oid, "hash OID not in registry");
            KeyError::HashUnknownAlgorithm
        })
}
