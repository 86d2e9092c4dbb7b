// Copyright (C) Microsoft Corporation. All rights reserved.

use super::testvectors::*;
use super::der_of;
use crate::der::{
    decode_uncompressed_point, encode_uncompressed_point, DerEcParameters, DerEcPrivateKey,
    DerEcdsaSignature, DerPrivateKeyInfo, DerPublicKeyInfo,
};
use crate::oid::{OID_EC_PUBLIC_KEY, OID_SECP256K1};
use crate::KeyError;

#[test]
fn sec1_named_curve_roundtrip() {
    let der = der_of(EC_K256_SEC1_PRIV_PEM);
    let key = DerEcPrivateKey::from_der(&der).unwrap();

    assert_eq!(key.private_key().len(), 32);
    assert_eq!(
        key.parameters(),
        Some(&DerEcParameters::Named(OID_SECP256K1))
    );
    let point = key.public_key().unwrap();
    assert_eq!(point.len(), 65);
    assert_eq!(point[0], 0x04);

    assert_eq!(key.to_der().unwrap(), der);
}

#[test]
fn pkcs8_named_curve_layers() {
    let info = DerPrivateKeyInfo::from_der(&der_of(EC_K256_PKCS8_PRIV_PEM)).unwrap();
    assert_eq!(*info.algorithm(), OID_EC_PUBLIC_KEY);

    let params = DerEcParameters::from_der(info.parameters().unwrap()).unwrap();
    assert_eq!(params, DerEcParameters::Named(OID_SECP256K1));

    // The inner ECPrivateKey of a PKCS#8 key omits the parameters.
    let inner = DerEcPrivateKey::from_der(info.private_key()).unwrap();
    assert!(inner.parameters().is_none());

    let sec1 = DerEcPrivateKey::from_der(&der_of(EC_K256_SEC1_PRIV_PEM)).unwrap();
    assert_eq!(inner.private_key(), sec1.private_key());
    assert_eq!(inner.public_key(), sec1.public_key());
}

#[test]
fn spki_named_curve() {
    let info = DerPublicKeyInfo::from_der(&der_of(EC_K256_SPKI_PUB_PEM)).unwrap();
    assert_eq!(*info.algorithm(), OID_EC_PUBLIC_KEY);
    assert_eq!(
        DerEcParameters::from_der(info.parameters().unwrap()).unwrap(),
        DerEcParameters::Named(OID_SECP256K1)
    );

    let sec1 = DerEcPrivateKey::from_der(&der_of(EC_K256_SEC1_PRIV_PEM)).unwrap();
    assert_eq!(info.public_key(), sec1.public_key().unwrap());
}

#[test]
fn explicit_parameters_decode() {
    let key = DerEcPrivateKey::from_der(&der_of(EC_K256_EXPLICIT_SEC1_PRIV_PEM)).unwrap();

    let params = match key.parameters().unwrap() {
        DerEcParameters::Explicit(p) => p,
        other => panic!("expected explicit parameters, got {other:?}"),
    };

    // secp256k1: p = 2^256 - 2^32 - 977, a = 0, b = 7.
    assert_eq!(params.field_length(), 32);
    assert_eq!(&params.p[..4], &[0xff, 0xff, 0xff, 0xff]);
    assert_eq!(&params.p[28..], &[0xff, 0xff, 0xfc, 0x2f]);
    assert!(params.a.is_empty());
    assert_eq!(params.b, vec![0x07]);
    assert_eq!(params.base.len(), 65);
    assert_eq!(params.order.len(), 32);
    assert_eq!(params.cofactor, Some(vec![0x01]));
}

#[test]
fn explicit_parameters_reencode_verbatim() {
    // The input carries minimal-length curve coefficients and the
    // re-encoded key keeps them exactly as imported, padding nothing.
    let der = der_of(EC_K256_EXPLICIT_SEC1_PRIV_PEM);
    let key = DerEcPrivateKey::from_der(&der).unwrap();
    assert_eq!(key.to_der().unwrap(), der);
}

#[test]
fn explicit_spki_parameters_reexport_verbatim() {
    let info = DerPublicKeyInfo::from_der(&der_of(EC_K256_EXPLICIT_SPKI_PUB_PEM)).unwrap();
    let params = DerEcParameters::from_der(info.parameters().unwrap()).unwrap();
    assert_eq!(params.to_der().unwrap(), info.parameters().unwrap());
}

#[test]
fn explicit_pkcs8_layers() {
    let info = DerPrivateKeyInfo::from_der(&der_of(EC_K256_EXPLICIT_PKCS8_PEM)).unwrap();
    assert_eq!(*info.algorithm(), OID_EC_PUBLIC_KEY);

    let params = DerEcParameters::from_der(info.parameters().unwrap()).unwrap();
    assert!(matches!(params, DerEcParameters::Explicit(_)));

    let inner = DerEcPrivateKey::from_der(info.private_key()).unwrap();
    let sec1 = DerEcPrivateKey::from_der(&der_of(EC_K256_EXPLICIT_SEC1_PRIV_PEM)).unwrap();
    assert_eq!(inner.private_key(), sec1.private_key());
}

#[test]
fn point_codec() {
    let x = [0x12u8; 30];
    let y = [0x34u8; 32];
    let point = encode_uncompressed_point(&x, &y, 32).unwrap();
    assert_eq!(point.len(), 65);
    assert_eq!(point[0], 0x04);
    assert_eq!(&point[1..3], &[0x00, 0x00]);

    let (dx, dy) = decode_uncompressed_point(&point, 32).unwrap();
    assert_eq!(&dx[2..], &x[..]);
    assert_eq!(dy, y);
}

#[test]
fn point_codec_rejects_compressed_and_short() {
    let mut point = vec![0x02];
    point.extend_from_slice(&[0u8; 32]);
    assert_eq!(
        decode_uncompressed_point(&point, 32).unwrap_err(),
        KeyError::EccInvalidPoint
    );
    assert_eq!(
        decode_uncompressed_point(&[0x04; 64], 32).unwrap_err(),
        KeyError::EccInvalidPoint
    );
}

#[test]
fn ecdsa_signature_roundtrip() {
    let sig = DerEcdsaSignature {
        r: vec![0x80; 32],
        s: vec![0x01],
    };
    let der = sig.to_der().unwrap();
    // r has its high bit set, so its INTEGER gains a leading zero octet.
    assert_eq!(der.len(), 2 + 2 + 33 + 2 + 1);
    assert_eq!(DerEcdsaSignature::from_der(&der).unwrap(), sig);
}
