// Copyright (C) Microsoft Corporation. All rights reserved.

//! Elliptic curve DER encoding and decoding.
//!
//! Covers the SEC1 `ECPrivateKey` structure, the `ECParameters` choice in
//! both its named-curve and explicit prime-field forms, the uncompressed
//! point codec and the ECDSA signature SEQUENCE.
//!
//! ```text
//! ECPrivateKey ::= SEQUENCE {
//!   version        INTEGER { ecPrivkeyVer1(1) },
//!   privateKey     OCTET STRING,
//!   parameters [0] ECParameters OPTIONAL,
//!   publicKey  [1] BIT STRING OPTIONAL
//! }
//!
//! ECParameters ::= CHOICE {
//!   namedCurve         OBJECT IDENTIFIER,
//!   ecParameters       SpecifiedECDomain,
//!   implicitCurve      NULL
//! }
//! ```

use super::*;
use crate::oid::OID_PRIME_FIELD;

/// SEC1 SpecifiedECDomain, restricted to prime fields.
///
/// ```text
/// SpecifiedECDomain ::= SEQUENCE {
///   version    INTEGER { ecdpVer1(1) },
///   fieldID    FieldID,
///   curve      Curve,
///   base       OCTET STRING,   -- uncompressed generator point
///   order      INTEGER,
///   cofactor   INTEGER OPTIONAL
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct SpecifiedEcDomain<'a> {
    version: u8,
    field_id: FieldId<'a>,
    curve: CurveCoefficients<'a>,
    base: &'a [u8],
    order: asn1::OwnedBigInt,
    cofactor: Option<asn1::OwnedBigInt>,
}

/// ```text
/// FieldID ::= SEQUENCE {
///   fieldType   OBJECT IDENTIFIER,
///   parameters  ANY DEFINED BY fieldType  -- INTEGER p for prime-field
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct FieldId<'a> {
    field_type: asn1::ObjectIdentifier,
    parameters: asn1::Tlv<'a>,
}

/// ```text
/// Curve ::= SEQUENCE {
///   a     OCTET STRING,   -- field element, padded to the field length
///   b     OCTET STRING,
///   seed  BIT STRING OPTIONAL
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct CurveCoefficients<'a> {
    a: &'a [u8],
    b: &'a [u8],
    seed: Option<asn1::BitString<'a>>,
}

#[derive(asn1::Asn1Read, asn1::Asn1Write)]
enum EcParametersChoice<'a> {
    Explicit(SpecifiedEcDomain<'a>),
    NamedCurve(asn1::ObjectIdentifier),
    ImplicitCa(asn1::Null),
}

#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct EcPrivateKeyAsn<'a> {
    version: u8,
    private_key: &'a [u8],
    // The parameters stay an uninterpreted TLV here so an imported
    // encoding can be re-emitted unchanged.
    #[explicit(0)]
    parameters: Option<asn1::Tlv<'a>>,
    #[explicit(1)]
    public_key: Option<asn1::BitString<'a>>,
}

/// Owned explicit prime-field curve domain parameters, as raw big-endian
/// byte strings with leading zeros stripped (except `base`, which is the
/// complete uncompressed point encoding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcExplicitParams {
    /// Field prime $p$.
    pub p: Vec<u8>,
    /// Curve coefficient $a$.
    pub a: Vec<u8>,
    /// Curve coefficient $b$.
    pub b: Vec<u8>,
    /// Generator point, uncompressed SEC1 encoding.
    pub base: Vec<u8>,
    /// Group order $n$.
    pub order: Vec<u8>,
    /// Cofactor $h$, if the encoding carried one.
    pub cofactor: Option<Vec<u8>>,
    /// The complete `ECParameters` TLV as imported. Encoding re-emits
    /// this, so a key exports with exactly the parameter bytes it was
    /// imported with (seed, coefficient padding and all).
    pub der: Vec<u8>,
}

impl EcExplicitParams {
    /// Field length in bytes; also the coordinate length of points on the
    /// curve.
    pub fn field_length(&self) -> usize {
        self.p.len()
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    bytes
        .iter()
        .position(|&b| b != 0)
        .map_or(&bytes[bytes.len()..], |pos| &bytes[pos..])
}

fn left_pad(bytes: &[u8], len: usize) -> KeyResult<Vec<u8>> {
    let bytes = strip_leading_zeros(bytes);
    if bytes.len() > len {
        Err(KeyError::DerInvalidParameter)?;
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(bytes);
    Ok(out)
}

/// EC domain parameters: either a named curve OID or explicit prime-field
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerEcParameters {
    /// namedCurve alternative.
    Named(asn1::ObjectIdentifier),
    /// ecParameters alternative, prime fields only.
    Explicit(EcExplicitParams),
}

impl DerEcParameters {
    /// Decodes a standalone DER `ECParameters` (for example the
    /// AlgorithmIdentifier parameters of an `id-ecPublicKey` key).
    ///
    /// # Errors
    ///
    /// * `KeyError::DerAsn1DecodeError` - Failed to parse ASN.1 structure
    /// * `KeyError::EccInvalidCurveParameters` - implicitCA, a non-prime
    ///   field, or an unsupported domain version
    pub fn from_der(bytes: &[u8]) -> KeyResult<Self> {
        let choice: EcParametersChoice<'_> = parse_single(bytes)?;
        match choice {
            EcParametersChoice::NamedCurve(oid) => Ok(DerEcParameters::Named(oid)),
            EcParametersChoice::Explicit(domain) => {
                if domain.version != 1 {
                    tracing::error!(version = domain.version, "unsupported ECParameters version");
                    Err(KeyError::EccInvalidCurveParameters)?;
                }
                if domain.field_id.field_type != OID_PRIME_FIELD {
                    tracing::error!("only prime-field curves are supported");
                    Err(KeyError::EccInvalidCurveParameters)?;
                }
                let p: asn1::OwnedBigInt = domain
                    .field_id
                    .parameters
                    .parse()
                    .map_err(|_| KeyError::DerAsn1DecodeError)?;
                Ok(DerEcParameters::Explicit(EcExplicitParams {
                    p: DerBigInt(&p).try_into()?,
                    a: strip_leading_zeros(domain.curve.a).to_vec(),
                    b: strip_leading_zeros(domain.curve.b).to_vec(),
                    base: domain.base.to_vec(),
                    order: DerBigInt(&domain.order).try_into()?,
                    cofactor: match &domain.cofactor {
                        Some(h) => Some(DerBigInt(h).try_into()?),
                        None => None,
                    },
                    der: bytes.to_vec(),
                }))
            }
            EcParametersChoice::ImplicitCa(_) => {
                tracing::error!("implicitCA curve parameters are not supported");
                Err(KeyError::EccInvalidCurveParameters)
            }
        }
    }

    /// Encodes as a standalone DER `ECParameters`.
    ///
    /// Explicit parameters come back byte-identical to the TLV they were
    /// decoded from.
    pub fn to_der(&self) -> KeyResult<Vec<u8>> {
        match self {
            DerEcParameters::Named(oid) => {
                write_single(&EcParametersChoice::NamedCurve(oid.clone()))
            }
            DerEcParameters::Explicit(params) => Ok(params.der.clone()),
        }
    }
}

/// Owned SEC1 `ECPrivateKey`.
pub struct DerEcPrivateKey {
    private_key: Vec<u8>,
    parameters: Option<DerEcParameters>,
    public_key: Option<Vec<u8>>,
}

impl DerEcPrivateKey {
    /// Builds an `ECPrivateKey` from its parts. `public_key`, when present,
    /// is the complete uncompressed point encoding.
    pub fn new(
        private_key: Vec<u8>,
        parameters: Option<DerEcParameters>,
        public_key: Option<Vec<u8>>,
    ) -> Self {
        Self {
            private_key,
            parameters,
            public_key,
        }
    }

    /// Raw private scalar bytes.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// Curve parameters, when the encoding carried them.
    pub fn parameters(&self) -> Option<&DerEcParameters> {
        self.parameters.as_ref()
    }

    /// Uncompressed public point, when the encoding carried one.
    pub fn public_key(&self) -> Option<&[u8]> {
        self.public_key.as_deref()
    }

    /// Decodes a DER SEC1 `ECPrivateKey`.
    pub fn from_der(bytes: &[u8]) -> KeyResult<Self> {
        let key: EcPrivateKeyAsn<'_> = parse_single(bytes)?;
        if key.version != 1 {
            tracing::error!(version = key.version, "unsupported ECPrivateKey version");
            Err(KeyError::DerAsn1DecodeError)?;
        }
        let parameters = match key.parameters {
            Some(tlv) => Some(DerEcParameters::from_der(tlv.full_data())?),
            None => None,
        };
        let public_key = match key.public_key {
            Some(bits) => {
                if bits.padding_bits() != 0 {
                    Err(KeyError::DerAsn1DecodeError)?;
                }
                Some(bits.as_bytes().to_vec())
            }
            None => None,
        };
        Ok(Self {
            private_key: key.private_key.to_vec(),
            parameters,
            public_key,
        })
    }

    /// Encodes as a DER SEC1 `ECPrivateKey`, emitting exactly the optional
    /// fields this value carries.
    pub fn to_der(&self) -> KeyResult<Vec<u8>> {
        let params_der = match &self.parameters {
            Some(p) => Some(p.to_der()?),
            None => None,
        };
        let parameters = match &params_der {
            Some(buf) => Some(tlv_view(buf)?),
            None => None,
        };
        let public_key = match &self.public_key {
            Some(point) => {
                Some(asn1::BitString::new(point, 0).ok_or(KeyError::DerAsn1EncodeError)?)
            }
            None => None,
        };
        write_single(&EcPrivateKeyAsn {
            version: 1,
            private_key: &self.private_key,
            parameters,
            public_key,
        })
    }
}

/// Encodes an affine point as an uncompressed SEC1 point
/// (`04 || X || Y`), padding both coordinates to `coordinate_length`.
pub fn encode_uncompressed_point(
    x: &[u8],
    y: &[u8],
    coordinate_length: usize,
) -> KeyResult<Vec<u8>> {
    let mut out = Vec::with_capacity(1 + 2 * coordinate_length);
    out.push(0x04);
    out.extend_from_slice(&left_pad(x, coordinate_length)?);
    out.extend_from_slice(&left_pad(y, coordinate_length)?);
    Ok(out)
}

/// Decodes an uncompressed SEC1 point into its `(x, y)` coordinates.
///
/// Compressed (`02`/`03`) and hybrid (`06`/`07`) forms are rejected.
///
/// # Errors
///
/// `KeyError::EccInvalidPoint` - wrong leading byte or wrong length for the
/// given coordinate size
pub fn decode_uncompressed_point(
    bytes: &[u8],
    coordinate_length: usize,
) -> KeyResult<(Vec<u8>, Vec<u8>)> {
    if bytes.len() != 1 + 2 * coordinate_length || bytes[0] != 0x04 {
        tracing::error!(
            len = bytes.len(),
            "point is not in uncompressed form for this curve"
        );
        Err(KeyError::EccInvalidPoint)?;
    }
    let x = bytes[1..1 + coordinate_length].to_vec();
    let y = bytes[1 + coordinate_length..].to_vec();
    Ok((x, y))
}

/// ```text
/// ECDSA-Sig-Value ::= SEQUENCE {
///   r  INTEGER,
///   s  INTEGER
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct EcdsaSigValue {
    r: asn1::OwnedBigInt,
    s: asn1::OwnedBigInt,
}

/// An ECDSA signature as raw big-endian `r` and `s` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerEcdsaSignature {
    /// Signature component $r$.
    pub r: Vec<u8>,
    /// Signature component $s$.
    pub s: Vec<u8>,
}

impl DerEcdsaSignature {
    /// Decodes a DER `ECDSA-Sig-Value`.
    pub fn from_der(bytes: &[u8]) -> KeyResult<Self> {
        let sig: EcdsaSigValue = parse_single(bytes)?;
        Ok(Self {
            r: DerBigInt(&sig.r).try_into()?,
            s: DerBigInt(&sig.s).try_into()?,
        })
    }

    /// Encodes as a DER `ECDSA-Sig-Value`.
    pub fn to_der(&self) -> KeyResult<Vec<u8>> {
        write_single(&EcdsaSigValue {
            r: DerSlice(&self.r).try_into()?,
            s: DerSlice(&self.s).try_into()?,
        })
    }
}
