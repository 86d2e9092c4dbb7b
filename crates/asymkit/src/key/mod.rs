// Copyright (C) Microsoft Corporation. All rights reserved.

//! Key objects and the algorithm layer.
//!
//! An [`AsymmetricKeyObject`] is one half of a key pair: RSA or elliptic
//! (short Weierstrass, Montgomery or Edwards). The algorithm it belongs to
//! is held behind an `Arc` and shared between the two halves of a
//! generated pair, so curve parameters are compiled once.
//!
//! Keys usually enter through the factory functions in [`parse`]:
//! [`create_asymmetric_key`] runs the format cascade over PEM or DER
//! input, [`create_private_key`] / [`create_public_key`] are the typed
//! entry points.

use crate::pem::{encode_pem, parse_pem};
use crate::{KeyError, KeyResult};

pub mod elliptic;
pub mod parse;
pub mod rsa;

pub use crate::oid::AsymmetricAlgorithmType;
pub use elliptic::{EllipticAlgorithm, EllipticKeyObject};
pub use parse::{
    create_asymmetric_algorithm, create_asymmetric_key, create_private_key, create_public_key,
};
pub use rsa::{RsaKeyAlgorithm, RsaKeyObject};

/// Which half of a key pair an object holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// Private key material (the public half may be derivable).
    Private,
    /// Public key material only.
    Public,
}

/// RSA encryption padding selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RsaPadding {
    /// RSAES-OAEP (SHA-1 mask and label hash). The default.
    #[default]
    Oaep,
    /// RSAES-PKCS1-v1_5.
    Pkcs1,
    /// No padding; the message must already be exactly one block.
    None,
}

/// Serialization format of an imported or exported key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFormat {
    /// PEM envelope around DER.
    Pem,
    /// Raw DER.
    Der,
}

/// Outer DER structure to export a key into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportType {
    /// PKCS#8 `PrivateKeyInfo` (private keys only).
    Pkcs8,
    /// The algorithm-specific structure: SEC1 `ECPrivateKey` for short
    /// Weierstrass keys, raw key bytes for the RFC 8410 curves.
    Specific,
    /// X.509 `SubjectPublicKeyInfo`; exports the public half.
    Spki,
}

/// How to export a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// Outer structure.
    pub export_type: ExportType,
    /// PEM or DER framing.
    pub format: KeyFormat,
}

impl ExportOptions {
    /// Export options for the given structure and framing.
    pub fn new(export_type: ExportType, format: KeyFormat) -> Self {
        Self {
            export_type,
            format,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(ExportType::Pkcs8, KeyFormat::Der)
    }
}

/// Key material on its way into the format cascade.
pub enum KeyInput<'a> {
    /// PEM text; the envelope title participates in format detection.
    Pem(&'a str),
    /// Raw DER bytes.
    Der(&'a [u8]),
}

impl<'a> KeyInput<'a> {
    /// Classifies raw bytes as PEM or DER by looking for a PEM envelope.
    ///
    /// # Errors
    ///
    /// `KeyError::PemMalformed` - the input contains a PEM marker but is
    /// not valid UTF-8
    pub fn detect(data: &'a [u8]) -> KeyResult<Self> {
        if crate::pem::looks_like_pem(data) {
            let text = std::str::from_utf8(data).map_err(|_| KeyError::PemMalformed)?;
            Ok(KeyInput::Pem(text))
        } else {
            Ok(KeyInput::Der(data))
        }
    }
}

/// What kind of key the caller expects from the cascade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTypeHint {
    /// Accept whatever decodes first.
    Any,
    /// Only private keys.
    Private,
    /// Only public keys.
    Public,
}

/// A specific outer structure to decode, instead of running the format
/// cascade. Input that does not decode under the named schema fails with
/// [`KeyError::KeyFormatMismatch`](crate::KeyError::KeyFormatMismatch)
/// rather than falling through to the other decoders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySchema {
    /// PKCS#1 `RSAPrivateKey` or `RSAPublicKey`.
    Pkcs1,
    /// SEC1 `ECPrivateKey`.
    Sec1,
    /// PKCS#8 `PrivateKeyInfo`.
    Pkcs8,
    /// X.509 `SubjectPublicKeyInfo`.
    Spki,
    /// X.509 `Certificate`; yields the subject public key.
    X509,
}

/// An asymmetric algorithm instance: the per-family operations plus, for
/// elliptic keys, the compiled curve.
#[derive(Debug)]
pub enum AsymmetricKeyAlgorithm {
    /// RSA.
    Rsa(RsaKeyAlgorithm),
    /// Elliptic: short Weierstrass, Montgomery or Edwards curves.
    Elliptic(EllipticAlgorithm),
}

impl AsymmetricKeyAlgorithm {
    /// Algorithm family.
    pub fn algorithm_type(&self) -> AsymmetricAlgorithmType {
        match self {
            Self::Rsa(_) => AsymmetricAlgorithmType::Rsa,
            Self::Elliptic(ec) => ec.algorithm_type(),
        }
    }

    /// True when keys of this algorithm can sign and verify.
    pub fn signable(&self) -> bool {
        match self {
            Self::Rsa(_) => true,
            Self::Elliptic(ec) => ec.signable(),
        }
    }

    /// True when keys of this algorithm can run Diffie-Hellman.
    pub fn key_agreementable(&self) -> bool {
        match self {
            Self::Rsa(_) => false,
            Self::Elliptic(ec) => ec.key_agreementable(),
        }
    }

    /// True when keys of this algorithm can encrypt and decrypt.
    pub fn cryptable(&self) -> bool {
        matches!(self, Self::Rsa(_))
    }
}

/// One half of an asymmetric key pair.
#[derive(Debug)]
pub enum AsymmetricKeyObject {
    /// RSA key.
    Rsa(RsaKeyObject),
    /// Elliptic key.
    Elliptic(EllipticKeyObject),
}

impl AsymmetricKeyObject {
    /// Which half this object holds.
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Rsa(key) => key.kind(),
            Self::Elliptic(key) => key.kind(),
        }
    }

    /// True when private key material is present.
    pub fn is_private(&self) -> bool {
        self.kind() == KeyKind::Private
    }

    /// True when only public key material is present.
    pub fn is_public(&self) -> bool {
        self.kind() == KeyKind::Public
    }

    /// Algorithm family.
    pub fn algorithm_type(&self) -> AsymmetricAlgorithmType {
        match self {
            Self::Rsa(_) => AsymmetricAlgorithmType::Rsa,
            Self::Elliptic(key) => key.algorithm().algorithm_type(),
        }
    }

    /// The RSA key, if this is one.
    pub fn as_rsa(&self) -> Option<&RsaKeyObject> {
        match self {
            Self::Rsa(key) => Some(key),
            Self::Elliptic(_) => None,
        }
    }

    /// The elliptic key, if this is one.
    pub fn as_elliptic(&self) -> Option<&EllipticKeyObject> {
        match self {
            Self::Rsa(_) => None,
            Self::Elliptic(key) => Some(key),
        }
    }

    /// The public half of this key, derived when necessary.
    pub fn to_public_key(&self) -> KeyResult<Self> {
        match self {
            Self::Rsa(key) => Ok(Self::Rsa(key.to_public_key())),
            Self::Elliptic(key) => Ok(Self::Elliptic(key.to_public_key()?)),
        }
    }

    /// Compares key material: same family, same kind, same components.
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Rsa(a), Self::Rsa(b)) => a.equals(b),
            (Self::Elliptic(a), Self::Elliptic(b)) => a.equals(b),
            _ => false,
        }
    }

    /// Exports the key. RSA export deliberately stays unimplemented.
    pub fn export(&self, options: &ExportOptions) -> KeyResult<Vec<u8>> {
        match self {
            Self::Rsa(key) => key.export(options),
            Self::Elliptic(key) => key.export(options),
        }
    }
}

impl From<RsaKeyObject> for AsymmetricKeyObject {
    fn from(key: RsaKeyObject) -> Self {
        Self::Rsa(key)
    }
}

impl From<EllipticKeyObject> for AsymmetricKeyObject {
    fn from(key: EllipticKeyObject) -> Self {
        Self::Elliptic(key)
    }
}

fn frame(title: &str, der: Vec<u8>, format: KeyFormat) -> Vec<u8> {
    match format {
        KeyFormat::Der => der,
        KeyFormat::Pem => encode_pem(title, &der).into_bytes(),
    }
}

pub(crate) fn unframe<'a>(input: &'a KeyInput<'a>) -> KeyResult<(Vec<u8>, Option<String>)> {
    match input {
        KeyInput::Pem(text) => {
            let block = parse_pem(text)?;
            Ok((block.der, Some(block.title)))
        }
        KeyInput::Der(bytes) => Ok((bytes.to_vec(), None)),
    }
}
