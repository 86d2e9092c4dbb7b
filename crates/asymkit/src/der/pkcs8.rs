// Copyright (C) Microsoft Corporation. All rights reserved.

//! Generic PKCS#8 `PrivateKeyInfo` and X.509 `SubjectPublicKeyInfo`
//! envelopes.
//!
//! These wrappers carry the algorithm OID, the raw algorithm parameters TLV
//! (uninterpreted) and the raw key payload. Interpretation of both is left
//! to the per-algorithm modules, which is what lets a single decode pass
//! serve RSA, EC and the RFC 8410 key families.

use super::*;

/// ```text
/// PrivateKeyInfo ::= SEQUENCE {
///   version         INTEGER,
///   algorithm       AlgorithmIdentifier,
///   privateKey      OCTET STRING,
///   attributes      [0] IMPLICIT Attributes OPTIONAL
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct PrivateKeyInfo<'a> {
    version: u8,
    algorithm: AlgorithmIdentifier<'a>,
    private_key: &'a [u8],
    #[implicit(0)]
    attributes: Option<asn1::SetOf<'a, asn1::Tlv<'a>>>,
}

/// ```text
/// SubjectPublicKeyInfo ::= SEQUENCE {
///   algorithm            AlgorithmIdentifier,
///   subjectPublicKey     BIT STRING
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct PublicKeyInfo<'a> {
    algorithm: AlgorithmIdentifier<'a>,
    subject_public_key: asn1::BitString<'a>,
}

/// Owned, algorithm-agnostic view of a PKCS#8 `PrivateKeyInfo`.
pub struct DerPrivateKeyInfo {
    algorithm: asn1::ObjectIdentifier,
    parameters: Option<Vec<u8>>,
    private_key: Vec<u8>,
}

impl DerPrivateKeyInfo {
    /// Builds a `PrivateKeyInfo` view from its parts. `parameters` is the
    /// complete DER TLV of the algorithm parameters, if any.
    pub fn new(
        algorithm: asn1::ObjectIdentifier,
        parameters: Option<Vec<u8>>,
        private_key: Vec<u8>,
    ) -> Self {
        Self {
            algorithm,
            parameters,
            private_key,
        }
    }

    /// Algorithm OID.
    pub fn algorithm(&self) -> &asn1::ObjectIdentifier {
        &self.algorithm
    }

    /// Raw algorithm parameters TLV, if present.
    pub fn parameters(&self) -> Option<&[u8]> {
        self.parameters.as_deref()
    }

    /// Raw `privateKey` OCTET STRING contents.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// Decodes a DER `PrivateKeyInfo`.
    pub fn from_der(bytes: &[u8]) -> KeyResult<Self> {
        let info: PrivateKeyInfo<'_> = parse_single(bytes)?;
        Ok(Self {
            algorithm: info.algorithm.algorithm,
            parameters: info.algorithm.parameters.map(|tlv| tlv.full_data().to_vec()),
            private_key: info.private_key.to_vec(),
        })
    }

    /// Encodes a DER `PrivateKeyInfo`.
    pub fn to_der(&self) -> KeyResult<Vec<u8>> {
        let parameters = match &self.parameters {
            Some(buf) => Some(tlv_view(buf)?),
            None => None,
        };
        write_single(&PrivateKeyInfo {
            version: 0,
            algorithm: AlgorithmIdentifier {
                algorithm: self.algorithm.clone(),
                parameters,
            },
            private_key: &self.private_key,
            attributes: None,
        })
    }
}

/// Owned, algorithm-agnostic view of a `SubjectPublicKeyInfo`.
pub struct DerPublicKeyInfo {
    algorithm: asn1::ObjectIdentifier,
    parameters: Option<Vec<u8>>,
    public_key: Vec<u8>,
}

impl DerPublicKeyInfo {
    /// Builds a `SubjectPublicKeyInfo` view from its parts. `parameters` is
    /// the complete DER TLV of the algorithm parameters, if any;
    /// `public_key` is the BIT STRING payload with no unused bits.
    pub fn new(
        algorithm: asn1::ObjectIdentifier,
        parameters: Option<Vec<u8>>,
        public_key: Vec<u8>,
    ) -> Self {
        Self {
            algorithm,
            parameters,
            public_key,
        }
    }

    /// Algorithm OID.
    pub fn algorithm(&self) -> &asn1::ObjectIdentifier {
        &self.algorithm
    }

    /// Raw algorithm parameters TLV, if present.
    pub fn parameters(&self) -> Option<&[u8]> {
        self.parameters.as_deref()
    }

    /// Raw `subjectPublicKey` BIT STRING payload.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Decodes a DER `SubjectPublicKeyInfo`.
    ///
    /// # Errors
    ///
    /// * `KeyError::DerAsn1DecodeError` - Failed to parse ASN.1 structure,
    ///   or the BIT STRING has unused bits (key payloads are always whole
    ///   octets)
    pub fn from_der(bytes: &[u8]) -> KeyResult<Self> {
        let info: PublicKeyInfo<'_> = parse_single(bytes)?;
        if info.subject_public_key.padding_bits() != 0 {
            tracing::error!("subjectPublicKey has unused bits");
            Err(KeyError::DerAsn1DecodeError)?;
        }
        Ok(Self {
            algorithm: info.algorithm.algorithm,
            parameters: info.algorithm.parameters.map(|tlv| tlv.full_data().to_vec()),
            public_key: info.subject_public_key.as_bytes().to_vec(),
        })
    }

    /// Encodes a DER `SubjectPublicKeyInfo`.
    pub fn to_der(&self) -> KeyResult<Vec<u8>> {
        let parameters = match &self.parameters {
            Some(buf) => Some(tlv_view(buf)?),
            None => None,
        };
        write_single(&PublicKeyInfo {
            algorithm: AlgorithmIdentifier {
                algorithm: self.algorithm.clone(),
                parameters,
            },
            subject_public_key: asn1::BitString::new(&self.public_key, 0)
                .ok_or(KeyError::DerAsn1EncodeError)?,
        })
    }
}
