// Copyright (C) Microsoft Corporation. All rights reserved.

//! DER encoding and decoding of asymmetric key structures.
//!
//! Each submodule covers one family of ASN.1 envelopes:
//! - [`rsa`] - PKCS#1 `RSAPublicKey`/`RSAPrivateKey` plus SPKI/PKCS#8 wrappers
//! - [`pkcs8`] - generic `PrivateKeyInfo` / `SubjectPublicKeyInfo` with
//!   algorithm-specific parameters left uninterpreted
//! - [`ecc`] - SEC1 `ECPrivateKey`, `ECParameters` (named and explicit),
//!   uncompressed point codec, ECDSA signature codec
//! - [`digest`] - PKCS#1 `DigestInfo`
//! - [`cert`] - read-only X.509 `Certificate`
//!
//! Integer components cross the module boundary as raw big-endian byte
//! strings; the ASN.1 INTEGER leading-zero rules are applied on the way in
//! and out by the conversion helpers below.

use crate::{KeyError, KeyResult};

pub mod cert;
pub mod digest;
pub mod ecc;
pub mod pkcs8;
pub mod rsa;

#[cfg(test)]
pub(crate) mod tests;

pub use cert::DerCertificate;
pub use digest::encode_digest_info;
pub use ecc::{
    decode_uncompressed_point, encode_uncompressed_point, DerEcParameters, DerEcPrivateKey,
    DerEcdsaSignature, EcExplicitParams,
};
pub use pkcs8::{DerPrivateKeyInfo, DerPublicKeyInfo};
pub use rsa::{DerRsaPrivateKey, DerRsaPublicKey};

/// ASN.1 AlgorithmIdentifier with uninterpreted parameters.
///
/// ```text
/// AlgorithmIdentifier ::= SEQUENCE {
///   algorithm    OBJECT IDENTIFIER,
///   parameters   ANY DEFINED BY algorithm OPTIONAL
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
pub struct AlgorithmIdentifier<'a> {
    /// Algorithm OID.
    pub algorithm: asn1::ObjectIdentifier,
    /// Raw parameters TLV, if present.
    pub parameters: Option<asn1::Tlv<'a>>,
}

pub(crate) struct DerSlice<'a>(pub &'a [u8]);
pub(crate) struct DerBigInt<'a>(pub &'a asn1::OwnedBigInt);

impl<'a> TryFrom<DerSlice<'a>> for asn1::OwnedBigInt {
    type Error = KeyError;

    fn try_from(value: DerSlice<'a>) -> Result<Self, KeyError> {
        let bytes = value.0;
        let bytes = bytes
            .iter()
            .position(|&b| b != 0)
            .map_or(bytes, |pos| &bytes[pos..]);

        let needs_padding = bytes.first().is_some_and(|&b| b & 0x80 == 0x80);

        let mut vec = Vec::with_capacity(bytes.len() + needs_padding as usize);
        if needs_padding {
            vec.push(0);
        }

        vec.extend_from_slice(bytes);

        asn1::OwnedBigInt::new(vec).ok_or(KeyError::DerAsn1EncodeError)
    }
}

impl<'a> TryFrom<DerBigInt<'a>> for Vec<u8> {
    type Error = KeyError;

    fn try_from(value: DerBigInt<'a>) -> Result<Self, KeyError> {
        let bytes = value.0.as_bytes();

        let bytes = if !bytes.is_empty() && bytes[0] == 0 {
            &bytes[1..]
        } else {
            bytes
        };

        Ok(bytes.to_vec())
    }
}

pub(crate) fn parse_single<'a, T: asn1::Asn1Readable<'a>>(bytes: &'a [u8]) -> KeyResult<T> {
    asn1::parse_single(bytes).map_err(|_| KeyError::DerAsn1DecodeError)
}

pub(crate) fn write_single<T: asn1::Asn1Writable>(value: &T) -> KeyResult<Vec<u8>> {
    asn1::write_single(value).map_err(|_| KeyError::DerAsn1EncodeError)
}

/// Reinterprets a freshly written DER buffer as a single TLV so it can be
/// embedded verbatim into an outer structure (e.g. AlgorithmIdentifier
/// parameters).
pub(crate) fn tlv_view(buf: &[u8]) -> KeyResult<asn1::Tlv<'_>> {
    asn1::parse_single(buf).map_err(|_| KeyError::DerAsn1EncodeError)
}
