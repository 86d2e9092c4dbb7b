// Copyright (C) Microsoft Corporation. All rights reserved.

//! RSA DER encoding and decoding.
//!
//! Supported structures:
//! - **Public keys**: bare PKCS#1 `RSAPublicKey` and X.509
//!   `SubjectPublicKeyInfo` (SPKI) where the subject public key payload is
//!   the PKCS#1 structure.
//! - **Private keys**: bare PKCS#1 `RSAPrivateKey` and the PKCS#8
//!   `PrivateKeyInfo` wrapper around it.

use super::*;
use crate::oid::OID_RSA_ENCRYPTION;

/// DER NULL, the `rsaEncryption` AlgorithmIdentifier parameters.
static NULL_PARAMS: [u8; 2] = [0x05, 0x00];

/// Checks an AlgorithmIdentifier for `rsaEncryption`. The OID is compared
/// first so a foreign algorithm fails as such regardless of what its
/// parameters look like; RFC 3279 then requires NULL parameters, which
/// some encoders omit.
///
/// # Errors
///
/// * `KeyError::DerInvalidOid` - The algorithm is not `rsaEncryption`
/// * `KeyError::DerInvalidParameter` - Parameters present but not NULL
fn check_rsa_algorithm(algorithm: &AlgorithmIdentifier<'_>) -> KeyResult<()> {
    if algorithm.algorithm != OID_RSA_ENCRYPTION {
        tracing::error!(oid = %algorithm.algorithm, "algorithm is not rsaEncryption");
        Err(KeyError::DerInvalidOid)?;
    }
    if let Some(params) = &algorithm.parameters {
        if params.full_data() != NULL_PARAMS {
            tracing::error!("rsaEncryption parameters are not NULL");
            Err(KeyError::DerInvalidParameter)?;
        }
    }
    Ok(())
}

fn rsa_algorithm() -> KeyResult<AlgorithmIdentifier<'static>> {
    Ok(AlgorithmIdentifier {
        algorithm: OID_RSA_ENCRYPTION,
        parameters: Some(tlv_view(&NULL_PARAMS)?),
    })
}

/// ```text
/// SubjectPublicKeyInfo ::= SEQUENCE {
///   algorithm            AlgorithmIdentifier,
///   subjectPublicKey     BIT STRING
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct SubjectPublicKeyInfo<'a> {
    algorithm: AlgorithmIdentifier<'a>,
    subject_public_key: asn1::BitString<'a>,
}

/// ```text
/// RSAPublicKey ::= SEQUENCE {
///   modulus           INTEGER,  -- n
///   publicExponent    INTEGER   -- e
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write, Debug, PartialEq, Eq)]
struct RsaPublicKey {
    modulus: asn1::OwnedBigInt,
    public_exponent: asn1::OwnedBigInt,
}

/// ```text
/// PrivateKeyInfo ::= SEQUENCE {
///   version         Version,
///   algorithm       AlgorithmIdentifier,
///   privateKey      OCTET STRING,
///   attributes      [0] Attributes OPTIONAL
/// }
/// ```
#[derive(asn1::Asn1Read, asn1::Asn1Write)]
struct RsaPrivateKeyInfo<'a> {
    version: u8,
    algorithm: AlgorithmIdentifier<'a>,
    private_key: &'a [u8],
    #[implicit(0)]
    attributes: Option<asn1::SetOf<'a, asn1::Tlv<'a>>>,
}

/// PKCS#1 RSAPrivateKey (RFC 8017).
///
/// ```text
/// RSAPrivateKey ::= SEQUENCE {
///   version           Version,
///   modulus           INTEGER,  -- n
///   publicExponent    INTEGER,  -- e
///   privateExponent   INTEGER,  -- d
///   prime1            INTEGER,  -- p
///   prime2            INTEGER,  -- q
///   exponent1         INTEGER,  -- d mod (p-1)
///   exponent2         INTEGER,  -- d mod (q-1)
///   coefficient       INTEGER,  -- (inverse of q) mod p
///   otherPrimeInfos   OtherPrimeInfos OPTIONAL
/// }
/// ```
///
/// Multi-prime RSA (otherPrimeInfos) is not supported.
#[derive(asn1::Asn1Read, asn1::Asn1Write, Debug, PartialEq, Eq)]
struct RsaPrivateKey {
    version: u8,
    modulus: asn1::OwnedBigInt,
    public_exponent: asn1::OwnedBigInt,
    private_exponent: asn1::OwnedBigInt,
    prime1: asn1::OwnedBigInt,
    prime2: asn1::OwnedBigInt,
    exponent1: asn1::OwnedBigInt,
    exponent2: asn1::OwnedBigInt,
    coefficient: asn1::OwnedBigInt,
}

/// Owned RSA public key components as raw big-endian byte strings.
#[derive(Debug)]
pub struct DerRsaPublicKey {
    n: Vec<u8>,
    e: Vec<u8>,
}

impl DerRsaPublicKey {
    /// Creates a new RSA public key from modulus and exponent bytes.
    pub fn new(n: &[u8], e: &[u8]) -> Self {
        DerRsaPublicKey {
            n: n.to_vec(),
            e: e.to_vec(),
        }
    }

    /// Returns a reference to the modulus ($n$) bytes.
    pub fn n(&self) -> &[u8] {
        &self.n
    }

    /// Returns a reference to the public exponent ($e$) bytes.
    pub fn e(&self) -> &[u8] {
        &self.e
    }

    /// Returns the key size in bytes.
    pub fn key_size(&self) -> usize {
        self.n.len()
    }

    /// Decodes a bare PKCS#1 `RSAPublicKey`.
    pub fn from_pkcs1_der(bytes: &[u8]) -> KeyResult<Self> {
        let key: RsaPublicKey = parse_single(bytes)?;
        Ok(DerRsaPublicKey {
            n: DerBigInt(&key.modulus).try_into()?,
            e: DerBigInt(&key.public_exponent).try_into()?,
        })
    }

    /// Encodes a bare PKCS#1 `RSAPublicKey`.
    pub fn to_pkcs1_der(&self) -> KeyResult<Vec<u8>> {
        write_single(&RsaPublicKey {
            modulus: DerSlice(&self.n).try_into()?,
            public_exponent: DerSlice(&self.e).try_into()?,
        })
    }

    /// Decodes an RSA public key from DER `SubjectPublicKeyInfo`.
    ///
    /// # Errors
    ///
    /// * `KeyError::DerAsn1DecodeError` - Failed to parse ASN.1 structure
    /// * `KeyError::DerInvalidOid` - The algorithm identifier is not `rsaEncryption`
    /// * `KeyError::DerInvalidParameter` - Algorithm parameters present but not NULL
    pub fn from_spki_der(bytes: &[u8]) -> KeyResult<Self> {
        let spki: SubjectPublicKeyInfo<'_> = parse_single(bytes)?;
        check_rsa_algorithm(&spki.algorithm)?;

        Self::from_pkcs1_der(spki.subject_public_key.as_bytes())
    }

    /// Encodes the RSA public key to DER `SubjectPublicKeyInfo`.
    pub fn to_spki_der(&self) -> KeyResult<Vec<u8>> {
        let pub_key_der = self.to_pkcs1_der()?;
        let subject_info = SubjectPublicKeyInfo {
            algorithm: rsa_algorithm()?,
            subject_public_key: asn1::BitString::new(&pub_key_der, 0)
                .ok_or(KeyError::DerAsn1EncodeError)?,
        };
        write_single(&subject_info)
    }
}

/// Owned RSA private key components as raw big-endian byte strings.
#[derive(Debug)]
pub struct DerRsaPrivateKey {
    n: Vec<u8>,
    e: Vec<u8>,
    d: Vec<u8>,
    p: Vec<u8>,
    q: Vec<u8>,
    dp: Vec<u8>,
    dq: Vec<u8>,
    qi: Vec<u8>,
}

impl DerRsaPrivateKey {
    /// Creates a new RSA private key from its CRT components.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        e: &[u8],
        n: &[u8],
        d: &[u8],
        p: &[u8],
        q: &[u8],
        dp: &[u8],
        dq: &[u8],
        qi: &[u8],
    ) -> Self {
        Self {
            e: e.to_vec(),
            n: n.to_vec(),
            d: d.to_vec(),
            p: p.to_vec(),
            q: q.to_vec(),
            dp: dp.to_vec(),
            dq: dq.to_vec(),
            qi: qi.to_vec(),
        }
    }

    /// Returns a reference to the modulus ($n$) bytes.
    pub fn n(&self) -> &[u8] {
        &self.n
    }

    /// Returns a reference to the public exponent ($e$) bytes.
    pub fn e(&self) -> &[u8] {
        &self.e
    }

    /// Returns a reference to the private exponent ($d$) bytes.
    pub fn d(&self) -> &[u8] {
        &self.d
    }

    /// Returns a reference to the first prime factor ($p$) bytes.
    pub fn p(&self) -> &[u8] {
        &self.p
    }

    /// Returns a reference to the second prime factor ($q$) bytes.
    pub fn q(&self) -> &[u8] {
        &self.q
    }

    /// Returns a reference to $d \bmod (p-1)$ bytes.
    pub fn dp(&self) -> &[u8] {
        &self.dp
    }

    /// Returns a reference to $d \bmod (q-1)$ bytes.
    pub fn dq(&self) -> &[u8] {
        &self.dq
    }

    /// Returns a reference to the CRT coefficient ($q^{-1} \bmod p$) bytes.
    pub fn qi(&self) -> &[u8] {
        &self.qi
    }

    /// Returns the key size in bytes.
    pub fn key_size(&self) -> usize {
        self.n.len()
    }

    /// Decodes a bare PKCS#1 `RSAPrivateKey`.
    pub fn from_pkcs1_der(bytes: &[u8]) -> KeyResult<Self> {
        let key: RsaPrivateKey = parse_single(bytes)?;
        Ok(Self {
            n: DerBigInt(&key.modulus).try_into()?,
            e: DerBigInt(&key.public_exponent).try_into()?,
            d: DerBigInt(&key.private_exponent).try_into()?,
            p: DerBigInt(&key.prime1).try_into()?,
            q: DerBigInt(&key.prime2).try_into()?,
            dp: DerBigInt(&key.exponent1).try_into()?,
            dq: DerBigInt(&key.exponent2).try_into()?,
            qi: DerBigInt(&key.coefficient).try_into()?,
        })
    }

    /// Encodes a bare PKCS#1 `RSAPrivateKey`.
    pub fn to_pkcs1_der(&self) -> KeyResult<Vec<u8>> {
        write_single(&RsaPrivateKey {
            version: 0,
            modulus: DerSlice(&self.n).try_into()?,
            public_exponent: DerSlice(&self.e).try_into()?,
            private_exponent: DerSlice(&self.d).try_into()?,
            prime1: DerSlice(&self.p).try_into()?,
            prime2: DerSlice(&self.q).try_into()?,
            exponent1: DerSlice(&self.dp).try_into()?,
            exponent2: DerSlice(&self.dq).try_into()?,
            coefficient: DerSlice(&self.qi).try_into()?,
        })
    }

    /// Decodes an RSA private key from a PKCS#8 `PrivateKeyInfo`.
    ///
    /// # Errors
    ///
    /// * `KeyError::DerAsn1DecodeError` - Failed to parse ASN.1 structure
    /// * `KeyError::DerInvalidOid` - The algorithm identifier is not `rsaEncryption`
    /// * `KeyError::DerInvalidParameter` - Algorithm parameters present but not NULL
    pub fn from_pkcs8_der(bytes: &[u8]) -> KeyResult<Self> {
        let key_info: RsaPrivateKeyInfo<'_> = parse_single(bytes)?;
        check_rsa_algorithm(&key_info.algorithm)?;
        Self::from_pkcs1_der(key_info.private_key)
    }

    /// Encodes the RSA private key as a PKCS#8 `PrivateKeyInfo`.
    pub fn to_pkcs8_der(&self) -> KeyResult<Vec<u8>> {
        let private_key_der = self.to_pkcs1_der()?;
        let private_key_info = RsaPrivateKeyInfo {
            version: 0,
            algorithm: rsa_algorithm()?,
            private_key: &private_key_der,
            attributes: None,
        };
        write_single(&private_key_info)
    }

    /// Public half of the key.
    pub fn to_public(&self) -> DerRsaPublicKey {
        DerRsaPublicKey::new(&self.n, &self.e)
    }
}
