// Copyright (C) Microsoft Corporation. All rights reserved.

#![forbid(unsafe_code)]

//! Asymmetric key parsing, encoding and primitives.
//!
//! This crate decodes and encodes asymmetric keys in the common DER
//! envelopes (PKCS#1, PKCS#8, SEC1, SPKI and X.509 certificates, with or
//! without a PEM wrapper), dispatches them to an algorithm implementation
//! by OID, and performs the key operations themselves: RSA sign/verify
//! and encrypt/decrypt, ECDSA, EdDSA and Diffie-Hellman key agreement
//! over named or explicit curves.
//!
//! Entry points are the factory functions in [`key`]:
//! [`create_asymmetric_key`], [`create_private_key`], [`create_public_key`]
//! and [`create_certificate`].

use thiserror::Error;

pub mod cert;
pub mod cipher;
pub mod curve;
pub mod der;
pub mod hash;
pub mod key;
pub mod mac;
pub mod oid;
pub mod pem;

pub use cert::{create_certificate, CertificateObject};
pub use key::{
    create_asymmetric_algorithm, create_asymmetric_key, create_private_key, create_public_key,
    AsymmetricAlgorithmType, AsymmetricKeyAlgorithm, AsymmetricKeyObject, EllipticKeyObject,
    ExportOptions, ExportType, KeyFormat, KeyInput, KeySchema, KeyTypeHint, RsaKeyObject,
    RsaPadding,
};

/// Error type for key parsing, encoding and operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    /// ASN.1 decode error
    #[error("ASN.1 decode error")]
    DerAsn1DecodeError,

    /// ASN.1 encode error
    #[error("ASN.1 encode error")]
    DerAsn1EncodeError,

    /// Unexpected object identifier
    #[error("invalid OID")]
    DerInvalidOid,

    /// Invalid DER parameter
    #[error("invalid DER parameter")]
    DerInvalidParameter,

    /// PEM envelope is structurally broken
    #[error("malformed PEM")]
    PemMalformed,

    /// BEGIN/END titles disagree, or the title contradicts the requested type
    #[error("PEM title mismatch")]
    PemTitleMismatch,

    /// The key algorithm OID is recognized but not supported
    #[error("unsupported key type")]
    KeyUnsupportedType,

    /// No decoder in the format cascade accepted the input
    #[error("unknown key type")]
    KeyUnknownType,

    /// The input does not decode under the requested schema
    #[error("key format mismatch")]
    KeyFormatMismatch,

    /// The key exists but does not support the requested operation
    #[error("unsupported operation")]
    KeyUnsupportedOperation,

    /// The operation is recognized but deliberately not implemented
    #[error("not implemented")]
    KeyNotImplemented,

    /// Invalid key material or operation parameter
    #[error("invalid parameter")]
    KeyInvalidParameter,

    /// The private half of the key is required for this operation
    #[error("private key required")]
    KeyPrivatePartMissing,

    /// RSA decryption failed. Deliberately carries no detail.
    #[error("decryption error")]
    RsaDecryptionError,

    /// Message exceeds the capacity of the padding scheme for this key size
    #[error("message too long")]
    RsaMessageTooLong,

    /// Point is not on the curve or has a malformed encoding
    #[error("invalid EC point")]
    EccInvalidPoint,

    /// Explicit curve parameters do not describe a usable curve
    #[error("invalid curve parameters")]
    EccInvalidCurveParameters,

    /// Curve name or OID is not in the registry
    #[error("unknown curve")]
    CurveUnknown,

    /// Hash name or OID is not in the registry
    #[error("unknown hash algorithm")]
    HashUnknownAlgorithm,

    /// HMAC name or OID is not in the registry
    #[error("unknown MAC algorithm")]
    MacUnknownAlgorithm,

    /// Cipher name or OID is not in the registry
    #[error("unknown cipher algorithm")]
    CipherUnknownAlgorithm,

    /// Authenticated decryption failed
    #[error("cipher authentication error")]
    CipherAuthenticationError,

    /// Random generator failure
    #[error("RNG failure")]
    RngFailure,
}

/// Result type used throughout the crate.
pub type KeyResult<T> = Result<T, KeyError>;
