// Copyright (C) Microsoft Corporation. All rights reserved.

use super::testvectors::*;
use super::der_of;
use crate::der::{DerCertificate, DerPublicKeyInfo, DerRsaPublicKey};
use crate::oid::OID_EC_PUBLIC_KEY;

#[test]
fn ec_certificate_fields() {
    let cert = DerCertificate::from_der(&der_of(CERT_CA_EC_PEM)).unwrap();

    assert_eq!(cert.version(), 2); // v3
    assert_eq!(cert.serial_number(), &[0x01]);
    // ecdsa-with-SHA256
    assert_eq!(
        *cert.signature_oid(),
        asn1::oid!(1, 2, 840, 10045, 4, 3, 2)
    );
    // Self-signed: issuer and subject names are identical.
    assert_eq!(cert.issuer_der(), cert.subject_der());

    let spki = DerPublicKeyInfo::from_der(cert.spki_der()).unwrap();
    assert_eq!(*spki.algorithm(), OID_EC_PUBLIC_KEY);
    assert_eq!(spki.public_key().len(), 65);
}

#[test]
fn leaf_certificate_differs_from_issuer() {
    let cert = DerCertificate::from_der(&der_of(CERT_LEAF_P192_PEM)).unwrap();
    assert_eq!(cert.serial_number(), &[0x02]);
    assert_ne!(cert.issuer_der(), cert.subject_der());

    // P-192 subject key: 24-byte coordinates.
    let spki = DerPublicKeyInfo::from_der(cert.spki_der()).unwrap();
    assert_eq!(spki.public_key().len(), 49);
}

#[test]
fn rsa_certificate_spki_parses_as_rsa() {
    let cert = DerCertificate::from_der(&der_of(CERT_CA_RSA_PEM)).unwrap();
    let key = DerRsaPublicKey::from_spki_der(cert.spki_der()).unwrap();
    assert_eq!(key.key_size(), 256);
    assert_eq!(key.e(), &[0x01, 0x00, 0x01]);
}
