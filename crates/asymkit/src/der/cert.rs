// Copyright (C) Microsoft Corporation. All rights reserved.

//! Read-only X.509 certificate decoding.
//!
//! Only the fields needed to extract the subject public key and identify
//! the certificate are pulled out; name, validity and extension contents
//! stay as raw TLVs. Certificates are never re-encoded.

use super::*;

/// ```text
/// Certificate ::= SEQUENCE {
///   tbsCertificate       TBSCertificate,
///   signatureAlgorithm   AlgorithmIdentifier,
///   signatureValue       BIT STRING
/// }
/// ```
#[derive(asn1::Asn1Read)]
struct Certificate<'a> {
    tbs_certificate: TbsCertificate<'a>,
    signature_algorithm: AlgorithmIdentifier<'a>,
    signature_value: asn1::BitString<'a>,
}

#[derive(asn1::Asn1Read)]
struct TbsCertificate<'a> {
    #[explicit(0)]
    version: Option<u8>,
    serial_number: asn1::OwnedBigInt,
    _signature: AlgorithmIdentifier<'a>,
    issuer: asn1::Tlv<'a>,
    _validity: asn1::Tlv<'a>,
    subject: asn1::Tlv<'a>,
    subject_public_key_info: asn1::Tlv<'a>,
    #[implicit(1)]
    _issuer_unique_id: Option<asn1::BitString<'a>>,
    #[implicit(2)]
    _subject_unique_id: Option<asn1::BitString<'a>>,
    #[explicit(3)]
    _extensions: Option<asn1::Tlv<'a>>,
}

/// Owned view of the parts of an X.509 certificate this crate uses.
#[derive(Debug)]
pub struct DerCertificate {
    version: u8,
    serial_number: Vec<u8>,
    signature_oid: asn1::ObjectIdentifier,
    issuer_der: Vec<u8>,
    subject_der: Vec<u8>,
    spki_der: Vec<u8>,
    signature: Vec<u8>,
}

impl DerCertificate {
    /// Decodes a DER X.509 certificate.
    ///
    /// # Errors
    ///
    /// `KeyError::DerAsn1DecodeError` - Failed to parse ASN.1 structure
    pub fn from_der(bytes: &[u8]) -> KeyResult<Self> {
        let cert: Certificate<'_> = parse_single(bytes)?;
        let tbs = cert.tbs_certificate;
        Ok(Self {
            version: tbs.version.unwrap_or(0),
            serial_number: DerBigInt(&tbs.serial_number).try_into()?,
            signature_oid: cert.signature_algorithm.algorithm,
            issuer_der: tbs.issuer.full_data().to_vec(),
            subject_der: tbs.subject.full_data().to_vec(),
            spki_der: tbs.subject_public_key_info.full_data().to_vec(),
            signature: cert.signature_value.as_bytes().to_vec(),
        })
    }

    /// X.509 version number (0 = v1, 2 = v3).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Serial number as big-endian bytes.
    pub fn serial_number(&self) -> &[u8] {
        &self.serial_number
    }

    /// Signature algorithm OID from the outer `signatureAlgorithm` field.
    pub fn signature_oid(&self) -> &asn1::ObjectIdentifier {
        &self.signature_oid
    }

    /// Raw DER of the issuer `Name`.
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer_der
    }

    /// Raw DER of the subject `Name`.
    pub fn subject_der(&self) -> &[u8] {
        &self.subject_der
    }

    /// Raw DER of the `subjectPublicKeyInfo`, suitable for the SPKI key
    /// decoders.
    pub fn spki_der(&self) -> &[u8] {
        &self.spki_der
    }

    /// Raw signature bytes from the outer `signatureValue` BIT STRING.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}
