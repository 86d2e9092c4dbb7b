// Copyright (C) Microsoft Corporation. All rights reserved.

//! Object identifiers used across the crate, and the mapping from key
//! algorithm OIDs to [`AsymmetricAlgorithmType`].

use crate::{KeyError, KeyResult};

/// Object Identifier for rsaEncryption.
///
/// OID: 1.2.840.113549.1.1.1
pub const OID_RSA_ENCRYPTION: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 113549, 1, 1, 1);

/// Object Identifier for id-dsa.
///
/// OID: 1.2.840.10040.4.1
pub const OID_DSA: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 10040, 4, 1);

/// Object Identifier for dhKeyAgreement (PKCS#3).
///
/// OID: 1.2.840.113549.1.3.1
pub const OID_DH_KEY_AGREEMENT: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 113549, 1, 3, 1);

/// Object Identifier for id-ecPublicKey.
///
/// OID: 1.2.840.10045.2.1
pub const OID_EC_PUBLIC_KEY: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 10045, 2, 1);

/// Object Identifier for the prime-field FieldID type.
///
/// OID: 1.2.840.10045.1.1
pub const OID_PRIME_FIELD: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 10045, 1, 1);

/// Object Identifier for X25519 key agreement (RFC 8410).
pub const OID_X25519: asn1::ObjectIdentifier = asn1::oid!(1, 3, 101, 110);

/// Object Identifier for X448 key agreement (RFC 8410).
pub const OID_X448: asn1::ObjectIdentifier = asn1::oid!(1, 3, 101, 111);

/// Object Identifier for Ed25519 signatures (RFC 8410).
pub const OID_ED25519: asn1::ObjectIdentifier = asn1::oid!(1, 3, 101, 112);

/// Object Identifier for Ed448 signatures (RFC 8410).
pub const OID_ED448: asn1::ObjectIdentifier = asn1::oid!(1, 3, 101, 113);

/// secp192r1 / NIST P-192.
pub const OID_SECP192R1: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 10045, 3, 1, 1);

/// secp224r1 / NIST P-224.
pub const OID_SECP224R1: asn1::ObjectIdentifier = asn1::oid!(1, 3, 132, 0, 33);

/// secp256r1 / NIST P-256.
pub const OID_SECP256R1: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 10045, 3, 1, 7);

/// secp384r1 / NIST P-384.
pub const OID_SECP384R1: asn1::ObjectIdentifier = asn1::oid!(1, 3, 132, 0, 34);

/// secp521r1 / NIST P-521.
pub const OID_SECP521R1: asn1::ObjectIdentifier = asn1::oid!(1, 3, 132, 0, 35);

/// secp256k1.
pub const OID_SECP256K1: asn1::ObjectIdentifier = asn1::oid!(1, 3, 132, 0, 10);

/// SHA-1.
pub const OID_SHA1: asn1::ObjectIdentifier = asn1::oid!(1, 3, 14, 3, 2, 26);

/// SHA-224.
pub const OID_SHA224: asn1::ObjectIdentifier = asn1::oid!(2, 16, 840, 1, 101, 3, 4, 2, 4);

/// SHA-256.
pub const OID_SHA256: asn1::ObjectIdentifier = asn1::oid!(2, 16, 840, 1, 101, 3, 4, 2, 1);

/// SHA-384.
pub const OID_SHA384: asn1::ObjectIdentifier = asn1::oid!(2, 16, 840, 1, 101, 3, 4, 2, 2);

/// SHA-512.
pub const OID_SHA512: asn1::ObjectIdentifier = asn1::oid!(2, 16, 840, 1, 101, 3, 4, 2, 3);

/// hmacWithSHA1 (RFC 8018).
pub const OID_HMAC_SHA1: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 113549, 2, 7);

/// hmacWithSHA224.
pub const OID_HMAC_SHA224: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 113549, 2, 8);

/// hmacWithSHA256.
pub const OID_HMAC_SHA256: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 113549, 2, 9);

/// hmacWithSHA384.
pub const OID_HMAC_SHA384: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 113549, 2, 10);

/// hmacWithSHA512.
pub const OID_HMAC_SHA512: asn1::ObjectIdentifier = asn1::oid!(1, 2, 840, 113549, 2, 11);

/// aes128-GCM.
pub const OID_AES128_GCM: asn1::ObjectIdentifier = asn1::oid!(2, 16, 840, 1, 101, 3, 4, 1, 6);

/// aes192-GCM.
pub const OID_AES192_GCM: asn1::ObjectIdentifier = asn1::oid!(2, 16, 840, 1, 101, 3, 4, 1, 26);

/// aes256-GCM.
pub const OID_AES256_GCM: asn1::ObjectIdentifier = asn1::oid!(2, 16, 840, 1, 101, 3, 4, 1, 46);

/// High-level family of an asymmetric key algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsymmetricAlgorithmType {
    /// RSA
    Rsa,
    /// Elliptic curve (short Weierstrass, named or explicit parameters)
    Ec,
    /// DSA (legacy; routed through the RSA-style modular arithmetic path)
    Dsa,
    /// Edwards-curve signatures (Ed25519, Ed448)
    Edwards,
    /// Finite-field Diffie-Hellman
    Dh,
    /// X448 key agreement
    X448,
    /// X25519 key agreement
    X25519,
}

impl AsymmetricAlgorithmType {
    /// Maps a key algorithm OID to its family.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyUnsupportedType` when the OID names no supported family.
    pub fn from_oid(oid: &asn1::ObjectIdentifier) -> KeyResult<Self> {
        if *oid == OID_RSA_ENCRYPTION {
            Ok(Self::Rsa)
        } else if *oid == OID_DSA {
            Ok(Self::Dsa)
        } else if *oid == OID_EC_PUBLIC_KEY
            || *oid == OID_SECP192R1
            || *oid == OID_SECP224R1
            || *oid == OID_SECP256R1
            || *oid == OID_SECP384R1
            || *oid == OID_SECP521R1
            || *oid == OID_SECP256K1
        {
            Ok(Self::Ec)
        } else if *oid == OID_X25519 {
            Ok(Self::X25519)
        } else if *oid == OID_X448 {
            Ok(Self::X448)
        } else if *oid == OID_ED25519 || *oid == OID_ED448 {
            Ok(Self::Edwards)
        } else if *oid == OID_DH_KEY_AGREEMENT {
            Ok(Self::Dh)
        } else {
            Err(KeyError::KeyUnsupportedType)
        }
    }

    /// Returns the canonical key algorithm OID for this family.
    pub fn oid(&self) -> asn1::ObjectIdentifier {
        match self {
            Self::Rsa => OID_RSA_ENCRYPTION,
            Self::Dsa => OID_DSA,
            Self::Ec => OID_EC_PUBLIC_KEY,
            Self::X25519 => OID_X25519,
            Self::X448 => OID_X448,
            Self::Edwards => OID_ED25519,
            Self::Dh => OID_DH_KEY_AGREEMENT,
        }
    }
}
