// Copyright (C) Microsoft Corporation. All rights reserved.

//! Key import: the format cascade and the factory functions.
//!
//! [`create_asymmetric_key`] takes PEM or DER bytes and tries the
//! supported envelopes in a fixed order:
//!
//! 1. PKCS#1 `RSAPublicKey`, then `RSAPrivateKey`
//! 2. SEC1 `ECPrivateKey`
//! 3. X.509 `Certificate` (yields the subject public key)
//! 4. PKCS#8 `PrivateKeyInfo`
//! 5. X.509 `SubjectPublicKeyInfo`
//!
//! The first decoder whose outer structure parses wins; decode errors in
//! the structure move to the next candidate, while semantic errors inside
//! a structurally recognized envelope (a missing curve, an unsupported
//! algorithm OID) are reported as-is. When every candidate has been tried
//! the input is [`KeyError::KeyUnknownType`].
//!
//! The cascade is skipped when the schema is already known: an explicit
//! [`KeySchema`] argument, or failing that a recognized PEM title, pins
//! the decoder to that one envelope, and input that does not decode under
//! it fails with [`KeyError::KeyFormatMismatch`]. A pinned import and a
//! cascade import of the same bytes always produce the same key.

use std::sync::Arc;

use super::{
    unframe, AsymmetricKeyAlgorithm, AsymmetricKeyObject, EllipticAlgorithm, EllipticKeyObject,
    KeyInput, KeyKind, KeySchema, KeyTypeHint, RsaKeyAlgorithm, RsaKeyObject,
};
use crate::curve::SpecialCurve;
use crate::der::{
    DerCertificate, DerEcParameters, DerEcPrivateKey, DerPrivateKeyInfo, DerPublicKeyInfo,
    DerRsaPrivateKey, DerRsaPublicKey,
};
use crate::oid::AsymmetricAlgorithmType;
use crate::{KeyError, KeyResult};

/// What a PEM title promises about the payload.
fn title_kind(title: &str) -> Option<KeyKind> {
    match title {
        "PRIVATE KEY" | "EC PRIVATE KEY" | "RSA PRIVATE KEY" => Some(KeyKind::Private),
        "PUBLIC KEY" | "RSA PUBLIC KEY" | "CERTIFICATE" => Some(KeyKind::Public),
        _ => None,
    }
}

/// The schema a PEM title names, for titles that name one.
fn title_schema(title: &str) -> Option<KeySchema> {
    match title {
        "RSA PRIVATE KEY" | "RSA PUBLIC KEY" => Some(KeySchema::Pkcs1),
        "EC PRIVATE KEY" => Some(KeySchema::Sec1),
        "PRIVATE KEY" => Some(KeySchema::Pkcs8),
        "PUBLIC KEY" => Some(KeySchema::Spki),
        "CERTIFICATE" => Some(KeySchema::X509),
        _ => None,
    }
}

/// Imports a key, running the format cascade over `input`.
///
/// `schema`, when given, pins the decoder to that one envelope; otherwise
/// a recognized PEM title does, and only untitled input runs the full
/// cascade. Pinned input that does not decode under its schema fails with
/// [`KeyError::KeyFormatMismatch`].
///
/// `hint` narrows what the caller accepts: a PEM title that contradicts it
/// fails with [`KeyError::PemTitleMismatch`] before any DER is parsed; a
/// successfully decoded key of the wrong kind fails afterwards
/// ([`KeyError::KeyPrivatePartMissing`] when a private key was required,
/// [`KeyError::KeyUnknownType`] otherwise).
pub fn create_asymmetric_key(
    input: &KeyInput<'_>,
    schema: Option<KeySchema>,
    hint: KeyTypeHint,
) -> KeyResult<AsymmetricKeyObject> {
    let (der, title) = unframe(input)?;
    if let Some(promised) = title.as_deref().and_then(title_kind) {
        let conflict = match hint {
            KeyTypeHint::Any => false,
            KeyTypeHint::Private => promised == KeyKind::Public,
            KeyTypeHint::Public => promised == KeyKind::Private,
        };
        if conflict {
            tracing::error!(title = title.as_deref(), "PEM title contradicts requested kind");
            Err(KeyError::PemTitleMismatch)?;
        }
    }

    let pinned = schema.or_else(|| title.as_deref().and_then(title_schema));
    let key = match pinned {
        Some(schema) => match try_schema(schema, &der) {
            Some(result) => result?,
            None => {
                tracing::error!(?schema, "input does not decode under the requested schema");
                return Err(KeyError::KeyFormatMismatch);
            }
        },
        None => run_cascade(&der)?,
    };
    match (hint, key.kind()) {
        (KeyTypeHint::Private, KeyKind::Public) => Err(KeyError::KeyPrivatePartMissing),
        (KeyTypeHint::Public, KeyKind::Private) => Err(KeyError::KeyUnknownType),
        _ => Ok(key),
    }
}

/// Imports a private key. Public-only input fails with
/// [`KeyError::KeyPrivatePartMissing`].
pub fn create_private_key(input: &KeyInput<'_>) -> KeyResult<AsymmetricKeyObject> {
    create_asymmetric_key(input, None, KeyTypeHint::Private)
}

/// Imports a public key. Private input is accepted and the public half is
/// derived from it.
pub fn create_public_key(input: &KeyInput<'_>) -> KeyResult<AsymmetricKeyObject> {
    let key = create_asymmetric_key(input, None, KeyTypeHint::Any)?;
    if key.is_private() {
        return key.to_public_key();
    }
    Ok(key)
}

/// Builds an algorithm instance without any key material.
///
/// `spec` names the curve for the elliptic families and is ignored for
/// RSA.
pub fn create_asymmetric_algorithm(
    algorithm_type: AsymmetricAlgorithmType,
    spec: &str,
) -> KeyResult<AsymmetricKeyAlgorithm> {
    match algorithm_type {
        AsymmetricAlgorithmType::Rsa => {
            Ok(AsymmetricKeyAlgorithm::Rsa(RsaKeyAlgorithm::new()))
        }
        AsymmetricAlgorithmType::Ec | AsymmetricAlgorithmType::Edwards => {
            let algorithm = EllipticAlgorithm::from_named(spec)?;
            if algorithm.algorithm_type() != algorithm_type {
                tracing::error!(spec, "curve name does not belong to the requested family");
                Err(KeyError::CurveUnknown)?;
            }
            Ok(AsymmetricKeyAlgorithm::Elliptic(algorithm))
        }
        AsymmetricAlgorithmType::X25519 => Ok(AsymmetricKeyAlgorithm::Elliptic(
            EllipticAlgorithm::from_special(SpecialCurve::X25519),
        )),
        AsymmetricAlgorithmType::X448 => Ok(AsymmetricKeyAlgorithm::Elliptic(
            EllipticAlgorithm::from_special(SpecialCurve::X448),
        )),
        AsymmetricAlgorithmType::Dsa | AsymmetricAlgorithmType::Dh => {
            tracing::error!(?algorithm_type, "no key generation for this family");
            Err(KeyError::KeyUnsupportedType)
        }
    }
}

/// The cascade order. PKCS#1 comes first so the two-INTEGER public form is
/// never misread as the prefix of something else; SEC1 precedes PKCS#8
/// because its version INTEGER is 1 where PKCS#8's is 0.
const CASCADE: [KeySchema; 5] = [
    KeySchema::Pkcs1,
    KeySchema::Sec1,
    KeySchema::X509,
    KeySchema::Pkcs8,
    KeySchema::Spki,
];

/// Decodes `der` under one schema. `None` means the outer structure is not
/// this schema at all; `Some(Err(..))` is a semantic failure inside a
/// recognized envelope and is final.
fn try_schema(schema: KeySchema, der: &[u8]) -> Option<KeyResult<AsymmetricKeyObject>> {
    match schema {
        KeySchema::Pkcs1 => {
            if let Ok(key) = DerRsaPublicKey::from_pkcs1_der(der) {
                return Some(RsaKeyObject::from_der_public(&key).map(Into::into));
            }
            let key = DerRsaPrivateKey::from_pkcs1_der(der).ok()?;
            Some(RsaKeyObject::from_der_private(&key).map(Into::into))
        }
        KeySchema::Sec1 => {
            let key = DerEcPrivateKey::from_der(der).ok()?;
            Some(EllipticKeyObject::from_sec1(&key).map(Into::into))
        }
        // X.509 certificate: hand back its subject public key.
        KeySchema::X509 => {
            let cert = DerCertificate::from_der(der).ok()?;
            Some(
                DerPublicKeyInfo::from_der(cert.spki_der())
                    .and_then(|info| public_from_info(&info)),
            )
        }
        KeySchema::Pkcs8 => {
            let info = DerPrivateKeyInfo::from_der(der).ok()?;
            Some(private_from_info(&info))
        }
        KeySchema::Spki => {
            let info = DerPublicKeyInfo::from_der(der).ok()?;
            Some(public_from_info(&info))
        }
    }
}

fn run_cascade(der: &[u8]) -> KeyResult<AsymmetricKeyObject> {
    for schema in CASCADE {
        if let Some(result) = try_schema(schema, der) {
            return result;
        }
    }
    tracing::error!("no decoder in the format cascade accepted the input");
    Err(KeyError::KeyUnknownType)
}

/// Dispatches a decoded PKCS#8 `PrivateKeyInfo` on its algorithm OID.
fn private_from_info(info: &DerPrivateKeyInfo) -> KeyResult<AsymmetricKeyObject> {
    if let Some(curve) = SpecialCurve::from_oid(info.algorithm()) {
        // RFC 8410: the privateKey OCTET STRING wraps a second OCTET
        // STRING holding the raw key.
        let seed: &[u8] = crate::der::parse_single(info.private_key())?;
        let algorithm = Arc::new(EllipticAlgorithm::from_special(curve));
        return Ok(
            EllipticKeyObject::private_from_parts(algorithm, seed.to_vec(), None)?.into(),
        );
    }

    match AsymmetricAlgorithmType::from_oid(info.algorithm())? {
        // DSA keys reuse the modular-arithmetic path; their payload is
        // structured like a PKCS#1 private key.
        AsymmetricAlgorithmType::Rsa | AsymmetricAlgorithmType::Dsa => {
            let key = DerRsaPrivateKey::from_pkcs1_der(info.private_key())?;
            Ok(RsaKeyObject::from_der_private(&key)?.into())
        }
        AsymmetricAlgorithmType::Ec => {
            let params_der = info.parameters().ok_or_else(|| {
                tracing::error!("EC PrivateKeyInfo carries no curve parameters");
                KeyError::KeyInvalidParameter
            })?;
            let parameters = DerEcParameters::from_der(params_der)?;
            let algorithm = Arc::new(EllipticAlgorithm::from_parameters(&parameters)?);
            let inner = DerEcPrivateKey::from_der(info.private_key())?;
            Ok(EllipticKeyObject::private_from_parts(
                algorithm,
                inner.private_key().to_vec(),
                inner.public_key().map(<[u8]>::to_vec),
            )?
            .into())
        }
        AsymmetricAlgorithmType::Dh => {
            tracing::error!("finite-field DH keys are not supported");
            Err(KeyError::KeyUnsupportedType)
        }
        // from_oid already produced a special-curve family only when
        // SpecialCurve::from_oid missed, which cannot happen
        _ => Err(KeyError::KeyUnsupportedType),
    }
}

/// Dispatches a decoded `SubjectPublicKeyInfo` on its algorithm OID.
pub(crate) fn public_from_info(info: &DerPublicKeyInfo) -> KeyResult<AsymmetricKeyObject> {
    if let Some(curve) = SpecialCurve::from_oid(info.algorithm()) {
        let algorithm = Arc::new(EllipticAlgorithm::from_special(curve));
        return Ok(
            EllipticKeyObject::public_from_point(algorithm, info.public_key().to_vec())?.into(),
        );
    }

    match AsymmetricAlgorithmType::from_oid(info.algorithm())? {
        AsymmetricAlgorithmType::Rsa | AsymmetricAlgorithmType::Dsa => {
            let key = DerRsaPublicKey::from_pkcs1_der(info.public_key())?;
            Ok(RsaKeyObject::from_der_public(&key)?.into())
        }
        AsymmetricAlgorithmType::Ec => {
            let params_der = info.parameters().ok_or_else(|| {
                tracing::error!("EC SubjectPublicKeyInfo carries no curve parameters");
                KeyError::KeyInvalidParameter
            })?;
            let parameters = DerEcParameters::from_der(params_der)?;
            let algorithm = Arc::new(EllipticAlgorithm::from_parameters(&parameters)?);
            Ok(
                EllipticKeyObject::public_from_point(algorithm, info.public_key().to_vec())?
                    .into(),
            )
        }
        AsymmetricAlgorithmType::Dh => {
            tracing::error!("finite-field DH keys are not supported");
            Err(KeyError::KeyUnsupportedType)
        }
        _ => Err(KeyError::KeyUnsupportedType),
    }
}
