// Copyright (C) Microsoft Corporation. All rights reserved.

//! End-to-end key import: the format cascade over PEM and DER input.

mod common;

use asymkit::pem::parse_pem;
use asymkit::{
    create_asymmetric_key, create_certificate, create_private_key, create_public_key,
    AsymmetricAlgorithmType, ExportOptions, ExportType, KeyError, KeyFormat, KeyInput,
    KeySchema, KeyTypeHint,
};
use common::*;

fn import_any(pem: &str) -> asymkit::AsymmetricKeyObject {
    create_asymmetric_key(&KeyInput::Pem(pem), None, KeyTypeHint::Any).unwrap()
}

#[test]
fn rsa_formats_decode_to_the_same_key() {
    init();
    let pkcs1 = import_any(RSA_PKCS1_PRIV_PEM);
    let pkcs8 = import_any(RSA_PKCS8_PRIV_PEM);
    assert!(pkcs1.equals(&pkcs8));
    assert!(pkcs1.is_private());

    let bare = import_any(RSA_PKCS1_PUB_PEM);
    let spki = import_any(RSA_SPKI_PUB_PEM);
    assert!(bare.equals(&spki));
    assert!(pkcs1.to_public_key().unwrap().equals(&spki));
}

#[test]
fn ec_formats_decode_to_the_same_key() {
    init();
    let sec1 = import_any(EC_K256_SEC1_PRIV_PEM);
    let pkcs8 = import_any(EC_K256_PKCS8_PRIV_PEM);
    assert!(sec1.equals(&pkcs8));
    assert_eq!(sec1.algorithm_type(), AsymmetricAlgorithmType::Ec);

    let spki = import_any(EC_K256_SPKI_PUB_PEM);
    assert!(sec1.to_public_key().unwrap().equals(&spki));
}

#[test]
fn der_input_is_detected_and_matches_pem() {
    init();
    for pem in [
        RSA_PKCS8_PRIV_PEM,
        EC_K256_SEC1_PRIV_PEM,
        X25519_PRIV_A_PEM,
        ED25519_SPKI_PEM,
    ] {
        let der = parse_pem(pem).unwrap().der;
        let input = KeyInput::detect(&der).unwrap();
        let from_der = create_asymmetric_key(&input, None, KeyTypeHint::Any).unwrap();
        assert!(from_der.equals(&import_any(pem)));
    }
}

#[test]
fn explicit_parameters_compile_to_the_registered_curve() {
    init();
    let key = import_any(EC_K256_EXPLICIT_SEC1_PRIV_PEM);
    let elliptic = key.as_elliptic().unwrap();
    assert_eq!(elliptic.curve_name(), Some("secp256k1"));

    // re-export keeps the explicit encoding exactly as imported
    let out = key
        .export(&ExportOptions::new(ExportType::Specific, KeyFormat::Der))
        .unwrap();
    assert_eq!(out, parse_pem(EC_K256_EXPLICIT_SEC1_PRIV_PEM).unwrap().der);
}

#[test]
fn pkcs8_export_reimports_to_an_equal_key() {
    init();
    for pem in [EC_K256_SEC1_PRIV_PEM, X25519_PRIV_A_PEM, ED25519_PKCS8_PEM] {
        let key = import_any(pem);
        let exported = key
            .export(&ExportOptions::new(ExportType::Pkcs8, KeyFormat::Pem))
            .unwrap();
        let text = String::from_utf8(exported).unwrap();
        let back = create_private_key(&KeyInput::Pem(&text)).unwrap();
        assert!(back.equals(&key), "{}", &pem[..40]);
    }
}

#[test]
fn certificates_yield_their_subject_key() {
    init();
    let cert = create_certificate(&KeyInput::Pem(CERT_CA_RSA_PEM)).unwrap();
    assert_eq!(
        cert.public_key().algorithm_type(),
        AsymmetricAlgorithmType::Rsa
    );

    // the cascade arrives at the same key
    let via_cascade = create_public_key(&KeyInput::Pem(CERT_CA_RSA_PEM)).unwrap();
    assert!(cert.public_key().equals(&via_cascade));

    let ec = create_certificate(&KeyInput::Pem(CERT_CA_EC_PEM)).unwrap();
    assert_eq!(
        ec.public_key().algorithm_type(),
        AsymmetricAlgorithmType::Ec
    );
}

#[test]
fn titles_and_hints_are_enforced() {
    init();
    assert_eq!(
        create_private_key(&KeyInput::Pem(RSA_SPKI_PUB_PEM)).unwrap_err(),
        KeyError::PemTitleMismatch
    );
    assert_eq!(
        create_asymmetric_key(&KeyInput::Pem(EC_K256_SEC1_PRIV_PEM), None, KeyTypeHint::Public)
            .unwrap_err(),
        KeyError::PemTitleMismatch
    );

    // DER carries no title; the mismatch shows after decoding
    let der = parse_pem(RSA_SPKI_PUB_PEM).unwrap().der;
    assert_eq!(
        create_asymmetric_key(&KeyInput::Der(&der), None, KeyTypeHint::Private).unwrap_err(),
        KeyError::KeyPrivatePartMissing
    );

    assert_eq!(
        create_certificate(&KeyInput::Pem(RSA_SPKI_PUB_PEM)).unwrap_err(),
        KeyError::PemTitleMismatch
    );
}

#[test]
fn unrecognized_input_exhausts_the_cascade() {
    init();
    assert_eq!(
        create_asymmetric_key(&KeyInput::Der(b"\x02\x01\x00"), None, KeyTypeHint::Any)
            .unwrap_err(),
        KeyError::KeyUnknownType
    );
    assert_eq!(
        create_asymmetric_key(&KeyInput::Der(&[]), None, KeyTypeHint::Any).unwrap_err(),
        KeyError::KeyUnknownType
    );
}

#[test]
fn schema_argument_pins_the_envelope() {
    init();
    let der = parse_pem(EC_K256_SEC1_PRIV_PEM).unwrap().der;
    let pinned =
        create_asymmetric_key(&KeyInput::Der(&der), Some(KeySchema::Sec1), KeyTypeHint::Any)
            .unwrap();
    assert!(pinned.equals(&import_any(EC_K256_SEC1_PRIV_PEM)));

    assert_eq!(
        create_asymmetric_key(&KeyInput::Der(&der), Some(KeySchema::Pkcs8), KeyTypeHint::Any)
            .unwrap_err(),
        KeyError::KeyFormatMismatch
    );
}

#[test]
fn create_public_key_accepts_private_input() {
    init();
    let public = create_public_key(&KeyInput::Pem(RSA_PKCS1_PRIV_PEM)).unwrap();
    assert!(public.is_public());
    assert!(public.equals(&import_any(RSA_SPKI_PUB_PEM)));
}
