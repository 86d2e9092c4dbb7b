// Copyright (C) Microsoft Corporation. All rights reserved.

//! Certificate objects.
//!
//! A [`CertificateObject`] pairs the decoded X.509 structure with the
//! subject public key, already dispatched to its algorithm. Certificates
//! are read-only: there is no issuing or re-encoding, and no chain
//! validation; `verify` checks one signature against this certificate's
//! own key.

use crate::der::{DerCertificate, DerPublicKeyInfo};
use crate::hash::HashAlgorithm;
use crate::key::parse::public_from_info;
use crate::key::{unframe, AsymmetricKeyObject, KeyInput, RsaPadding};
use crate::{KeyError, KeyResult};

/// A decoded certificate and its subject public key.
#[derive(Debug)]
pub struct CertificateObject {
    certificate: DerCertificate,
    public_key: AsymmetricKeyObject,
}

/// Imports a certificate from PEM or DER.
///
/// # Errors
///
/// * `KeyError::PemTitleMismatch` - the PEM title is not `CERTIFICATE`
/// * `KeyError::DerAsn1DecodeError` - the DER is not an X.509 certificate
pub fn create_certificate(input: &KeyInput<'_>) -> KeyResult<CertificateObject> {
    let (der, title) = unframe(input)?;
    if let Some(title) = title {
        if title != "CERTIFICATE" {
            tracing::error!(title, "PEM block is not a certificate");
            Err(KeyError::PemTitleMismatch)?;
        }
    }
    let certificate = DerCertificate::from_der(&der)?;
    let info = DerPublicKeyInfo::from_der(certificate.spki_der())?;
    let public_key = public_from_info(&info)?;
    Ok(CertificateObject {
        certificate,
        public_key,
    })
}

impl CertificateObject {
    /// The decoded X.509 structure.
    pub fn certificate(&self) -> &DerCertificate {
        &self.certificate
    }

    /// The subject public key.
    pub fn public_key(&self) -> &AsymmetricKeyObject {
        &self.public_key
    }

    /// Compares the subject public keys of two certificates.
    pub fn equals(&self, other: &Self) -> bool {
        self.public_key.equals(&other.public_key)
    }

    /// Encrypts to the certificate holder. RSA certificates only.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyUnsupportedOperation` - the subject key cannot encrypt
    pub fn public_encrypt(&self, padding: RsaPadding, message: &[u8]) -> KeyResult<Vec<u8>> {
        match &self.public_key {
            AsymmetricKeyObject::Rsa(key) => key.public_encrypt(padding, message),
            AsymmetricKeyObject::Elliptic(_) => {
                tracing::error!("subject key cannot encrypt");
                Err(KeyError::KeyUnsupportedOperation)
            }
        }
    }

    /// Verifies a signature against this certificate's subject key.
    ///
    /// `data` is the precomputed digest for RSA and ECDSA keys and the
    /// message itself for Edwards keys, which ignore `hash`.
    pub fn verify(
        &self,
        hash: &HashAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> KeyResult<bool> {
        match &self.public_key {
            AsymmetricKeyObject::Rsa(key) => key.verify(hash, data, signature),
            AsymmetricKeyObject::Elliptic(key) => key.verify(data, signature),
        }
    }
}
