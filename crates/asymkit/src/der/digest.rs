// Copyright (C) Microsoft Corporation. All rights reserved.

//! PKCS#1 `DigestInfo` encoding for RSASSA-PKCS1-v1_5 signatures.

use super::*;

/// ```text
/// DigestInfo ::= SEQUENCE {
///   digestAlgorithm  AlgorithmIdentifier,
///   digest           OCTET STRING
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct DigestInfo<'a> {
    digest_algorithm: DigestAlgorithmIdentifier,
    digest: &'a [u8],
}

/// AlgorithmIdentifier with a mandatory NULL parameter, as RFC 8017 A.2.4
/// prescribes for the hash functions used in `DigestInfo`.
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct DigestAlgorithmIdentifier {
    algorithm: asn1::ObjectIdentifier,
    parameters: asn1::Null,
}

/// Encodes the `DigestInfo` value `T` that RSASSA-PKCS1-v1_5 embeds in the
/// padded message, from a hash OID and the digest bytes.
pub fn encode_digest_info(
    hash_oid: asn1::ObjectIdentifier,
    digest: &[u8],
) -> KeyResult<Vec<u8>> {
    write_single(&DigestInfo {
        digest_algorithm: DigestAlgorithmIdentifier {
            algorithm: hash_oid,
            parameters: (),
        },
        digest,
    })
}
