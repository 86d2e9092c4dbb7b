// Copyright (C) Microsoft Corporation. All rights reserved.

//! HMAC algorithm registry (RFC 8018 `hmacWithSHAxxx` OIDs).
//!
//! Same lookup rules as the hash registry: by OID, or by name ignoring
//! case, hyphens and underscores.

use std::sync::OnceLock;

use digest::core_api::BlockSizeUser;
use digest::Digest;
use hmac::{Mac, SimpleHmac};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::oid::{
    OID_HMAC_SHA1, OID_HMAC_SHA224, OID_HMAC_SHA256, OID_HMAC_SHA384, OID_HMAC_SHA512,
};
use crate::{KeyError, KeyResult};

/// A registered HMAC algorithm.
#[derive(Debug)]
pub struct MacAlgorithm {
    name: &'static str,
    oid: asn1::ObjectIdentifier,
    output_length: usize,
    compute_fn: fn(&[u8], &[u8]) -> KeyResult<Vec<u8>>,
}

fn compute<D>(key: &[u8], data: &[u8]) -> KeyResult<Vec<u8>>
where
    D: Digest + BlockSizeUser,
{
    let mut mac =
        SimpleHmac::<D>::new_from_slice(key).map_err(|_| KeyError::KeyInvalidParameter)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

impl MacAlgorithm {
    /// Canonical algorithm name (`hmac-sha-256`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// RFC 8018 algorithm OID.
    pub fn oid(&self) -> &asn1::ObjectIdentifier {
        &self.oid
    }

    /// Tag length in bytes.
    pub fn output_length(&self) -> usize {
        self.output_length
    }

    /// Computes the HMAC tag over `data` with `key`.
    pub fn compute(&self, key: &[u8], data: &[u8]) -> KeyResult<Vec<u8>> {
        (self.compute_fn)(key, data)
    }
}

fn registry() -> &'static Vec<MacAlgorithm> {
    static REGISTRY: OnceLock<Vec<MacAlgorithm>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        vec![
            MacAlgorithm {
                name: "hmac-sha-1",
                oid: OID_HMAC_SHA1,
                output_length: 20,
                compute_fn: compute::<Sha1>,
            },
            MacAlgorithm {
                name: "hmac-sha-224",
                oid: OID_HMAC_SHA224,
                output_length: 28,
                compute_fn: compute::<Sha224>,
            },
            MacAlgorithm {
                name: "hmac-sha-256",
                oid: OID_HMAC_SHA256,
                output_length: 32,
                compute_fn: compute::<Sha256>,
            },
            MacAlgorithm {
                name: "hmac-sha-384",
                oid: OID_HMAC_SHA384,
                output_length: 48,
                compute_fn: compute::<Sha384>,
            },
            MacAlgorithm {
                name: "hmac-sha-512",
                oid: OID_HMAC_SHA512,
                output_length: 64,
                compute_fn: compute::<Sha512>,
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

/// Looks an HMAC algorithm up by name.
///
/// # Errors
///
/// `KeyError::MacUnknownAlgorithm`
pub fn mac_by_name(name: &str) -> KeyResult<&'static MacAlgorithm> {
    let wanted = normalize(name);
    registry()
        .iter()
        .find(|m| normalize(m.name) == wanted)
        .ok_or_else(|| {
            tracing::error!(name, "MAC name not in registry");
            KeyError::MacUnknownAlgorithm
        })
}

/// Looks an HMAC algorithm up by OID.
///
/// # Errors
///
/// `KeyError::MacUnknownAlgorithm`
pub fn mac_by_oid(oid: &asn1::ObjectIdentifier) -> KeyResult<&'static MacAlgorithm> {
    registry()
        .iter()
        .find(|m| m.oid == *oid)
        .ok_or_else(|| {
            tracing::error!(%oid, "MAC OID not in registry");
            KeyError::MacUnknownAlgorithm
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4231_case_2() {
        let mac = mac_by_name("HMAC-SHA256").unwrap();
        let tag = mac
            .compute(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn rfc4231_case_1_all_widths() {
        // RFC 4231 test case 1: 20-byte 0x0b key, message "Hi There".
        let key = [0x0bu8; 20];
        let expected = [
            (
                "hmac-sha-224",
                "896fb1128abbdf196832107cd49df33f47b4b1169912ba4f53684b22",
            ),
            (
                "hmac-sha-256",
                "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7",
            ),
            (
                "hmac-sha-384",
                "afd03944d84895626b0825f4ab46907f15f9dadbe4101ec682aa034c7cebc59c\
                 faea9ea9076ede7f4af152e8b2fa9cb6",
            ),
            (
                "hmac-sha-512",
                "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
                 daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854",
            ),
        ];
        for (name, hexval) in expected {
            let mac = mac_by_name(name).unwrap();
            let tag = mac.compute(&key, b"Hi There").unwrap();
            assert_eq!(hex::encode(tag), hexval, "{name}");
        }
    }

    #[test]
    fn lookup_by_oid() {
        let mac = mac_by_oid(&OID_HMAC_SHA512).unwrap();
        assert_eq!(mac.name(), "hmac-sha-512");
        assert_eq!(mac.output_length(), 64);
        assert_eq!(
            mac_by_name("poly1305").unwrap_err(),
            KeyError::MacUnknownAlgorithm
        );
    }
}
