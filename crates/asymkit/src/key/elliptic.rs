// Copyright (C) Microsoft Corporation. All rights reserved.

//! Elliptic algorithm and key objects.
//!
//! One algorithm type covers three curve shapes: short Weierstrass curves
//! (ECDSA + ECDH, named or compiled from explicit parameters), the RFC
//! 7748 Montgomery curves (key agreement only) and the RFC 8032 Edwards
//! curves (signatures only). The shape decides the wire encodings: SEC1 /
//! `id-ecPublicKey` for short curves, RFC 8410 raw byte strings for the
//! special curves.
//!
//! For ECDSA, `sign` and `verify` take a precomputed digest and produce or
//! consume a DER `ECDSA-Sig-Value`. For EdDSA they take the message itself
//! (RFC 8032 hashes internally) and use the raw 64/114-byte signature
//! form.

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;

use super::{frame, ExportOptions, ExportType, KeyFormat, KeyKind};
use crate::curve::{
    compile_short_curve, edwards, mont, short_curve_by_name, short_curve_by_oid, ShortCurve,
    SpecialCurve,
};
use crate::der::{
    decode_uncompressed_point, encode_uncompressed_point, DerEcParameters, DerEcPrivateKey,
    DerEcdsaSignature, DerPrivateKeyInfo, DerPublicKeyInfo,
};
use crate::oid::{AsymmetricAlgorithmType, OID_EC_PUBLIC_KEY};
use crate::{KeyError, KeyResult};

#[derive(Debug)]
enum CurveBackend {
    Short {
        curve: ShortCurve,
        /// Parameters as they arrived, so explicit-parameter keys
        /// re-export the same `ECParameters` they were imported with.
        parameters: DerEcParameters,
    },
    Special(SpecialCurve),
}

/// An elliptic algorithm instance: the compiled curve plus its wire
/// encodings.
#[derive(Debug)]
pub struct EllipticAlgorithm {
    backend: CurveBackend,
}

impl EllipticAlgorithm {
    /// Builds an algorithm from a curve name. Short Weierstrass names
    /// resolve through the curve registry (`secp256k1`, `P-256`, ...);
    /// `x25519`, `x448`, `ed25519` and `ed448` select the special curves.
    pub fn from_named(name: &str) -> KeyResult<Self> {
        let special = match name.to_ascii_lowercase().as_str() {
            "x25519" => Some(SpecialCurve::X25519),
            "x448" => Some(SpecialCurve::X448),
            "ed25519" => Some(SpecialCurve::Ed25519),
            "ed448" => Some(SpecialCurve::Ed448),
            _ => None,
        };
        if let Some(curve) = special {
            return Ok(Self::from_special(curve));
        }
        let curve = short_curve_by_name(name)?.clone();
        let oid = curve.oid().ok_or(KeyError::CurveUnknown)?;
        Ok(Self {
            backend: CurveBackend::Short {
                curve,
                parameters: DerEcParameters::Named(oid),
            },
        })
    }

    /// Builds an algorithm from decoded `ECParameters`, compiling explicit
    /// parameters into a working curve.
    pub fn from_parameters(parameters: &DerEcParameters) -> KeyResult<Self> {
        let curve = match parameters {
            DerEcParameters::Named(oid) => short_curve_by_oid(oid)?.clone(),
            DerEcParameters::Explicit(params) => compile_short_curve(params)?,
        };
        Ok(Self {
            backend: CurveBackend::Short {
                curve,
                parameters: parameters.clone(),
            },
        })
    }

    /// Builds an algorithm for one of the RFC 7748 / RFC 8032 curves.
    pub fn from_special(curve: SpecialCurve) -> Self {
        Self {
            backend: CurveBackend::Special(curve),
        }
    }

    /// Algorithm family, as used for OID dispatch.
    pub fn algorithm_type(&self) -> AsymmetricAlgorithmType {
        match &self.backend {
            CurveBackend::Short { .. } => AsymmetricAlgorithmType::Ec,
            CurveBackend::Special(SpecialCurve::X25519) => AsymmetricAlgorithmType::X25519,
            CurveBackend::Special(SpecialCurve::X448) => AsymmetricAlgorithmType::X448,
            CurveBackend::Special(_) => AsymmetricAlgorithmType::Edwards,
        }
    }

    /// Curve name, when the curve is a registered one.
    pub fn curve_name(&self) -> Option<&'static str> {
        match &self.backend {
            CurveBackend::Short { curve, .. } => curve.name(),
            CurveBackend::Special(curve) => Some(curve.name()),
        }
    }

    /// The `ECParameters` this algorithm serializes with; `None` for the
    /// special curves, which carry no parameters.
    pub fn parameters(&self) -> Option<&DerEcParameters> {
        match &self.backend {
            CurveBackend::Short { parameters, .. } => Some(parameters),
            CurveBackend::Special(_) => None,
        }
    }

    /// True for the curves that sign: short Weierstrass (ECDSA) and
    /// Edwards (EdDSA).
    pub fn signable(&self) -> bool {
        match &self.backend {
            CurveBackend::Short { .. } => true,
            CurveBackend::Special(curve) => curve.is_signing(),
        }
    }

    /// True for the curves that run Diffie-Hellman: short Weierstrass and
    /// Montgomery.
    pub fn key_agreementable(&self) -> bool {
        match &self.backend {
            CurveBackend::Short { .. } => true,
            CurveBackend::Special(curve) => !curve.is_signing(),
        }
    }

    /// Key algorithm OID for PKCS#8 and SPKI envelopes.
    pub fn key_oid(&self) -> asn1::ObjectIdentifier {
        match &self.backend {
            CurveBackend::Short { .. } => OID_EC_PUBLIC_KEY,
            CurveBackend::Special(curve) => curve.oid(),
        }
    }

    /// Private key length in bytes.
    pub fn private_key_length(&self) -> usize {
        match &self.backend {
            CurveBackend::Short { curve, .. } => curve.order_length(),
            CurveBackend::Special(curve) => curve.private_key_length(),
        }
    }

    /// Public key length in bytes: the uncompressed point for short
    /// curves, the raw key for special curves.
    pub fn public_key_length(&self) -> usize {
        match &self.backend {
            CurveBackend::Short { curve, .. } => 1 + 2 * curve.field_length(),
            CurveBackend::Special(curve) => curve.public_key_length(),
        }
    }

    fn short_curve(&self) -> Option<&ShortCurve> {
        match &self.backend {
            CurveBackend::Short { curve, .. } => Some(curve),
            CurveBackend::Special(_) => None,
        }
    }

    fn same_curve(&self, other: &Self) -> bool {
        match (&self.backend, &other.backend) {
            (CurveBackend::Short { curve: a, .. }, CurveBackend::Short { curve: b, .. }) => a == b,
            (CurveBackend::Special(a), CurveBackend::Special(b)) => a == b,
            _ => false,
        }
    }

    /// Generates a key pair. Both halves share `algorithm`.
    ///
    /// # Errors
    ///
    /// `KeyError::RngFailure` - the OS random source failed
    pub fn generate_key_pair(
        algorithm: &Arc<Self>,
    ) -> KeyResult<(EllipticKeyObject, EllipticKeyObject)> {
        let private = match &algorithm.backend {
            CurveBackend::Short { curve, .. } => loop {
                let mut candidate = vec![0u8; curve.order_length()];
                OsRng
                    .try_fill_bytes(&mut candidate)
                    .map_err(|_| KeyError::RngFailure)?;
                if curve.validate_scalar(&candidate).is_ok() {
                    break candidate;
                }
            },
            CurveBackend::Special(curve) => {
                let mut seed = vec![0u8; curve.private_key_length()];
                OsRng
                    .try_fill_bytes(&mut seed)
                    .map_err(|_| KeyError::RngFailure)?;
                seed
            }
        };

        let private_key = EllipticKeyObject {
            algorithm: Arc::clone(algorithm),
            kind: KeyKind::Private,
            private_key: Some(private),
            public_point: None,
        };
        let point = private_key.public_point()?;
        let public_key = EllipticKeyObject {
            algorithm: Arc::clone(algorithm),
            kind: KeyKind::Public,
            private_key: None,
            public_point: Some(point),
        };
        Ok((private_key, public_key))
    }
}

/// One half of an elliptic key pair.
#[derive(Debug)]
pub struct EllipticKeyObject {
    algorithm: Arc<EllipticAlgorithm>,
    kind: KeyKind,
    private_key: Option<Vec<u8>>,
    public_point: Option<Vec<u8>>,
}

impl EllipticKeyObject {
    /// Builds a private key object, validating the scalar (and the public
    /// point when one is supplied).
    pub fn private_from_parts(
        algorithm: Arc<EllipticAlgorithm>,
        private_key: Vec<u8>,
        public_point: Option<Vec<u8>>,
    ) -> KeyResult<Self> {
        match &algorithm.backend {
            CurveBackend::Short { curve, .. } => {
                curve.validate_scalar(&private_key)?;
                if let Some(point) = &public_point {
                    let (x, y) = decode_uncompressed_point(point, curve.field_length())?;
                    curve.validate_point(&x, &y)?;
                }
            }
            CurveBackend::Special(curve) => {
                if private_key.len() != curve.private_key_length() {
                    tracing::error!(len = private_key.len(), "wrong private key length");
                    Err(KeyError::KeyInvalidParameter)?;
                }
                if let Some(point) = &public_point {
                    if point.len() != curve.public_key_length() {
                        tracing::error!(len = point.len(), "wrong public key length");
                        Err(KeyError::EccInvalidPoint)?;
                    }
                }
            }
        }
        Ok(Self {
            algorithm,
            kind: KeyKind::Private,
            private_key: Some(private_key),
            public_point,
        })
    }

    /// Builds a public key object from its encoded point, validating it.
    pub fn public_from_point(
        algorithm: Arc<EllipticAlgorithm>,
        point: Vec<u8>,
    ) -> KeyResult<Self> {
        match &algorithm.backend {
            CurveBackend::Short { curve, .. } => {
                let (x, y) = decode_uncompressed_point(&point, curve.field_length())?;
                curve.validate_point(&x, &y)?;
            }
            CurveBackend::Special(curve) => {
                if point.len() != curve.public_key_length() {
                    tracing::error!(len = point.len(), "wrong public key length");
                    Err(KeyError::EccInvalidPoint)?;
                }
            }
        }
        Ok(Self {
            algorithm,
            kind: KeyKind::Public,
            private_key: None,
            public_point: Some(point),
        })
    }

    /// Builds a private key object from a decoded SEC1 `ECPrivateKey`.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyInvalidParameter` - the structure carries no curve
    /// parameters, so no algorithm can be compiled
    pub fn from_sec1(key: &DerEcPrivateKey) -> KeyResult<Self> {
        let parameters = key.parameters().ok_or_else(|| {
            tracing::error!("ECPrivateKey carries no curve parameters");
            KeyError::KeyInvalidParameter
        })?;
        let algorithm = Arc::new(EllipticAlgorithm::from_parameters(parameters)?);
        Self::private_from_parts(
            algorithm,
            key.private_key().to_vec(),
            key.public_key().map(<[u8]>::to_vec),
        )
    }

    /// Shared algorithm instance.
    pub fn algorithm(&self) -> &Arc<EllipticAlgorithm> {
        &self.algorithm
    }

    /// Which half this object holds.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Curve name, when registered.
    pub fn curve_name(&self) -> Option<&'static str> {
        self.algorithm.curve_name()
    }

    /// Encoded public key: stored if imported with one, derived from the
    /// private scalar otherwise.
    pub fn public_point(&self) -> KeyResult<Vec<u8>> {
        if let Some(point) = &self.public_point {
            return Ok(point.clone());
        }
        let private = self
            .private_key
            .as_ref()
            .ok_or(KeyError::KeyPrivatePartMissing)?;
        match &self.algorithm.backend {
            CurveBackend::Short { curve, .. } => {
                let (x, y) = curve.public_from_scalar(private)?;
                encode_uncompressed_point(&x, &y, curve.field_length())
            }
            CurveBackend::Special(curve) => {
                if curve.is_signing() {
                    edwards::public_key(*curve, private)
                } else {
                    mont::public_key(*curve, private)
                }
            }
        }
    }

    /// The public half of this key, derived when necessary.
    pub fn to_public_key(&self) -> KeyResult<Self> {
        Ok(Self {
            algorithm: Arc::clone(&self.algorithm),
            kind: KeyKind::Public,
            private_key: None,
            public_point: Some(self.public_point()?),
        })
    }

    /// Compares key material. Two private keys compare by scalar, two
    /// public keys by encoded point; a private and a public key never
    /// compare equal.
    pub fn equals(&self, other: &Self) -> bool {
        if self.kind != other.kind || !self.algorithm.same_curve(&other.algorithm) {
            return false;
        }
        match self.kind {
            KeyKind::Private => self.private_key == other.private_key,
            KeyKind::Public => self.public_point == other.public_point,
        }
    }

    /// Signs with the curve's native scheme: ECDSA over a precomputed
    /// digest (DER signature), or EdDSA over the message (raw signature).
    ///
    /// # Errors
    ///
    /// * `KeyError::KeyUnsupportedOperation` - Montgomery curves
    /// * `KeyError::KeyPrivatePartMissing` - public key
    pub fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        if !self.algorithm.signable() {
            tracing::error!("curve cannot sign");
            Err(KeyError::KeyUnsupportedOperation)?;
        }
        let private = self
            .private_key
            .as_ref()
            .ok_or(KeyError::KeyPrivatePartMissing)?;
        match &self.algorithm.backend {
            CurveBackend::Short { curve, .. } => {
                let (r, s) = curve.ecdsa_sign(private, data)?;
                DerEcdsaSignature { r, s }.to_der()
            }
            CurveBackend::Special(curve) => edwards::sign(*curve, private, data),
        }
    }

    /// Verifies a signature produced by [`sign`](Self::sign). Malformed
    /// signatures verify as `false` rather than erroring.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<bool> {
        if !self.algorithm.signable() {
            tracing::error!("curve cannot verify");
            Err(KeyError::KeyUnsupportedOperation)?;
        }
        let point = self.public_point()?;
        match &self.algorithm.backend {
            CurveBackend::Short { curve, .. } => {
                let Ok(sig) = DerEcdsaSignature::from_der(signature) else {
                    return Ok(false);
                };
                let (x, y) = decode_uncompressed_point(&point, curve.field_length())?;
                curve.ecdsa_verify(&x, &y, data, &sig.r, &sig.s)
            }
            CurveBackend::Special(curve) => edwards::verify(*curve, &point, data, signature),
        }
    }

    /// Diffie-Hellman between this private key and a peer public key on
    /// the same curve. Short curves return the X coordinate padded to the
    /// field length; Montgomery curves the RFC 7748 little-endian
    /// coordinate.
    ///
    /// # Errors
    ///
    /// * `KeyError::KeyUnsupportedOperation` - Edwards curves
    /// * `KeyError::KeyInvalidParameter` - the peer is on a different curve
    /// * `KeyError::KeyPrivatePartMissing` - this key is public
    pub fn dh_compute_secret(&self, peer: &EllipticKeyObject) -> KeyResult<Vec<u8>> {
        if !self.algorithm.key_agreementable() {
            tracing::error!("curve cannot run key agreement");
            Err(KeyError::KeyUnsupportedOperation)?;
        }
        if !self.algorithm.same_curve(&peer.algorithm) {
            tracing::error!("peer key is on a different curve");
            Err(KeyError::KeyInvalidParameter)?;
        }
        let private = self
            .private_key
            .as_ref()
            .ok_or(KeyError::KeyPrivatePartMissing)?;
        let peer_point = peer.public_point()?;
        match &self.algorithm.backend {
            CurveBackend::Short { curve, .. } => {
                let (x, y) = decode_uncompressed_point(&peer_point, curve.field_length())?;
                curve.ecdh(private, &x, &y)
            }
            CurveBackend::Special(curve) => mont::diffie_hellman(*curve, private, &peer_point),
        }
    }

    /// Exports the key into the requested envelope and framing.
    pub fn export(&self, options: &ExportOptions) -> KeyResult<Vec<u8>> {
        match options.export_type {
            ExportType::Pkcs8 => self.export_pkcs8(options.format),
            ExportType::Spki => self.export_spki(options.format),
            ExportType::Specific => self.export_specific(options.format),
        }
    }

    fn padded_private_key(&self) -> KeyResult<Vec<u8>> {
        let private = self
            .private_key
            .as_ref()
            .ok_or(KeyError::KeyPrivatePartMissing)?;
        let len = self.algorithm.private_key_length();
        let mut out = vec![0u8; len.saturating_sub(private.len())];
        out.extend_from_slice(private);
        Ok(out)
    }

    fn export_pkcs8(&self, format: KeyFormat) -> KeyResult<Vec<u8>> {
        let private = self.padded_private_key()?;
        let info = match &self.algorithm.backend {
            CurveBackend::Short { parameters, .. } => {
                // The inner ECPrivateKey omits its own parameters; the
                // AlgorithmIdentifier carries them.
                let inner =
                    DerEcPrivateKey::new(private, None, Some(self.public_point()?)).to_der()?;
                DerPrivateKeyInfo::new(
                    self.algorithm.key_oid(),
                    Some(parameters.to_der()?),
                    inner,
                )
            }
            CurveBackend::Special(_) => {
                // RFC 8410: privateKey is an OCTET STRING inside the
                // PrivateKeyInfo OCTET STRING.
                let wrapped = crate::der::write_single(&private.as_slice())?;
                DerPrivateKeyInfo::new(self.algorithm.key_oid(), None, wrapped)
            }
        };
        Ok(frame("PRIVATE KEY", info.to_der()?, format))
    }

    fn export_spki(&self, format: KeyFormat) -> KeyResult<Vec<u8>> {
        let point = self.public_point()?;
        let parameters = match &self.algorithm.backend {
            CurveBackend::Short { parameters, .. } => Some(parameters.to_der()?),
            CurveBackend::Special(_) => None,
        };
        let info = DerPublicKeyInfo::new(self.algorithm.key_oid(), parameters, point);
        Ok(frame("PUBLIC KEY", info.to_der()?, format))
    }

    fn export_specific(&self, format: KeyFormat) -> KeyResult<Vec<u8>> {
        match (&self.algorithm.backend, self.kind) {
            (CurveBackend::Short { parameters, .. }, KeyKind::Private) => {
                let key = DerEcPrivateKey::new(
                    self.padded_private_key()?,
                    Some(parameters.clone()),
                    Some(self.public_point()?),
                );
                Ok(frame("EC PRIVATE KEY", key.to_der()?, format))
            }
            (CurveBackend::Short { .. }, KeyKind::Public) => {
                if format == KeyFormat::Pem {
                    // raw points have no PEM envelope
                    Err(KeyError::KeyUnsupportedOperation)?;
                }
                self.public_point()
            }
            (CurveBackend::Special(_), kind) => {
                if format == KeyFormat::Pem {
                    Err(KeyError::KeyUnsupportedOperation)?;
                }
                match kind {
                    KeyKind::Private => self.padded_private_key(),
                    KeyKind::Public => self.public_point(),
                }
            }
        }
    }
}
