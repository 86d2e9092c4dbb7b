// Copyright (C) Microsoft Corporation. All rights reserved.

//! Elliptic curve registry and arithmetic.
//!
//! Short Weierstrass curves (the NIST primes and secp256k1) live in a
//! lazily built registry and can also be compiled from explicit SEC1
//! domain parameters. The RFC 7748 Montgomery curves and RFC 8032 Edwards
//! curves are fixed algorithms identified by [`SpecialCurve`]; their key
//! material is raw little-endian bytes rather than field coordinates.

use std::sync::OnceLock;

use num_bigint::BigUint;

use crate::der::EcExplicitParams;
use crate::oid::{
    OID_ED25519, OID_ED448, OID_SECP192R1, OID_SECP224R1, OID_SECP256K1, OID_SECP256R1,
    OID_SECP384R1, OID_SECP521R1, OID_X25519, OID_X448,
};
use crate::{KeyError, KeyResult};

pub mod edwards;
pub mod mont;
pub mod short;

pub use short::ShortCurve;

/// One of the fixed-function RFC 7748 / RFC 8032 curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialCurve {
    /// Curve25519 Diffie-Hellman (RFC 7748).
    X25519,
    /// Curve448 Diffie-Hellman (RFC 7748).
    X448,
    /// Edwards25519 signatures (RFC 8032).
    Ed25519,
    /// Edwards448 signatures (RFC 8032).
    Ed448,
}

impl SpecialCurve {
    /// Curve name as used in key serialization APIs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::X25519 => "x25519",
            Self::X448 => "x448",
            Self::Ed25519 => "ed25519",
            Self::Ed448 => "ed448",
        }
    }

    /// RFC 8410 algorithm OID.
    pub fn oid(&self) -> asn1::ObjectIdentifier {
        match self {
            Self::X25519 => OID_X25519,
            Self::X448 => OID_X448,
            Self::Ed25519 => OID_ED25519,
            Self::Ed448 => OID_ED448,
        }
    }

    /// Maps an RFC 8410 algorithm OID to its curve.
    pub fn from_oid(oid: &asn1::ObjectIdentifier) -> Option<Self> {
        if *oid == OID_X25519 {
            Some(Self::X25519)
        } else if *oid == OID_X448 {
            Some(Self::X448)
        } else if *oid == OID_ED25519 {
            Some(Self::Ed25519)
        } else if *oid == OID_ED448 {
            Some(Self::Ed448)
        } else {
            None
        }
    }

    /// Private key length in bytes.
    pub fn private_key_length(&self) -> usize {
        match self {
            Self::X25519 | Self::Ed25519 => 32,
            Self::X448 => 56,
            Self::Ed448 => 57,
        }
    }

    /// Public key length in bytes.
    pub fn public_key_length(&self) -> usize {
        match self {
            Self::X25519 | Self::Ed25519 => 32,
            Self::X448 => 56,
            Self::Ed448 => 57,
        }
    }

    /// True for the signing (Edwards) curves.
    pub fn is_signing(&self) -> bool {
        matches!(self, Self::Ed25519 | Self::Ed448)
    }
}

struct CurveEntry {
    curve: ShortCurve,
    aliases: &'static [&'static str],
}

fn registry() -> &'static Vec<CurveEntry> {
    static REGISTRY: OnceLock<Vec<CurveEntry>> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

fn hex(s: &str) -> BigUint {
    // Registry constants are compile-time literals.
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap_or_default()
}

fn build_registry() -> Vec<CurveEntry> {
    vec![
        CurveEntry {
            aliases: &["prime192v1", "p-192", "nistp192"],
            curve: ShortCurve::new(
                "secp192r1",
                Some(OID_SECP192R1),
                hex("fffffffffffffffffffffffffffffffeffffffffffffffff"),
                hex("fffffffffffffffffffffffffffffffefffffffffffffffc"),
                hex("64210519e59c80e70fa7e9ab72243049feb8deecc146b9b1"),
                hex("188da80eb03090f67cbf20eb43a18800f4ff0afd82ff1012"),
                hex("07192b95ffc8da78631011ed6b24cdd573f977a11e794811"),
                hex("ffffffffffffffffffffffff99def836146bc9b1b4d22831"),
                1,
            ),
        },
        CurveEntry {
            aliases: &["p-224", "nistp224"],
            curve: ShortCurve::new(
                "secp224r1",
                Some(OID_SECP224R1),
                hex("ffffffffffffffffffffffffffffffff000000000000000000000001"),
                hex("fffffffffffffffffffffffffffffffefffffffffffffffffffffffe"),
                hex("b4050a850c04b3abf54132565044b0b7d7bfd8ba270b39432355ffb4"),
                hex("b70e0cbd6bb4bf7f321390b94a03c1d356c21122343280d6115c1d21"),
                hex("bd376388b5f723fb4c22dfe6cd4375a05a07476444d5819985007e34"),
                hex("ffffffffffffffffffffffffffff16a2e0b8f03e13dd29455c5c2a3d"),
                1,
            ),
        },
        CurveEntry {
            aliases: &["prime256v1", "p-256", "nistp256"],
            curve: ShortCurve::new(
                "secp256r1",
                Some(OID_SECP256R1),
                hex("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff"),
                hex("ffffffff00000001000000000000000000000000fffffffffffffffffffffffc"),
                hex("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b"),
                hex("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"),
                hex("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"),
                hex("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"),
                1,
            ),
        },
        CurveEntry {
            aliases: &["p-384", "nistp384"],
            curve: ShortCurve::new(
                "secp384r1",
                Some(OID_SECP384R1),
                hex(
                    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff00\
                     00000000000000ffffffff",
                ),
                hex(
                    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff00\
                     00000000000000fffffffc",
                ),
                hex(
                    "b3312fa7e23ee7e4988e056be3f82d19181d9c6efe8141120314088f5013875ac656398d8a\
                     2ed19d2a85c8edd3ec2aef",
                ),
                hex(
                    "aa87ca22be8b05378eb1c71ef320ad746e1d3b628ba79b9859f741e082542a385502f25dbf\
                     55296c3a545e3872760ab7",
                ),
                hex(
                    "3617de4a96262c6f5d9e98bf9292dc29f8f41dbd289a147ce9da3113b5f0b8c00a60b1ce1d\
                     7e819d7a431d7c90ea0e5f",
                ),
                hex(
                    "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf581a0db248\
                     b0a77aecec196accc52973",
                ),
                1,
            ),
        },
        CurveEntry {
            aliases: &["p-521", "nistp521"],
            curve: ShortCurve::new(
                "secp521r1",
                Some(OID_SECP521R1),
                hex(
                    "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
                     ffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
                ),
                hex(
                    "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff\
                     fffffffffffffffffffffffffffffffffffffffffffffffffffffffc",
                ),
                hex(
                    "0051953eb9618e1c9a1f929a21a0b68540eea2da725b99b315f3b8b489918ef109e156193\
                     951ec7e937b1652c0bd3bb1bf073573df883d2c34f1ef451fd46b503f00",
                ),
                hex(
                    "00c6858e06b70404e9cd9e3ecb662395b4429c648139053fb521f828af606b4d3dbaa14b5\
                     e77efe75928fe1dc127a2ffa8de3348b3c1856a429bf97e7e31c2e5bd66",
                ),
                hex(
                    "011839296a789a3bc0045c8a5fb42c7d1bd998f54449579b446817afbd17273e662c97ee7\
                     2995ef42640c550b9013fad0761353c7086a272c24088be94769fd16650",
                ),
                hex(
                    "01fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffa51868\
                     783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e91386409",
                ),
                1,
            ),
        },
        CurveEntry {
            aliases: &["k-256"],
            curve: ShortCurve::new(
                "secp256k1",
                Some(OID_SECP256K1),
                hex("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"),
                BigUint::default(),
                hex("07"),
                hex("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
                hex("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"),
                hex("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"),
                1,
            ),
        },
    ]
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Looks a short Weierstrass curve up by OID.
///
/// # Errors
///
/// `KeyError::CurveUnknown` - the OID is not in the registry
pub fn short_curve_by_oid(oid: &asn1::ObjectIdentifier) -> KeyResult<&'static ShortCurve> {
    registry()
        .iter()
        .find(|e| e.curve.oid().is_some_and(|o| o == *oid))
        .map(|e| &e.curve)
        .ok_or_else(|| {
            tracing::error!(%oid, "curve OID not in registry");
            KeyError::CurveUnknown
        })
}

/// Looks a short Weierstrass curve up by name. Matching is
/// case-insensitive and ignores hyphens and underscores, so `P-256`,
/// `p256` and `prime256v1` all name the same curve.
pub fn short_curve_by_name(name: &str) -> KeyResult<&'static ShortCurve> {
    let wanted = normalize(name);
    registry()
        .iter()
        .find(|e| {
            e.curve.name().is_some_and(|n| normalize(n) == wanted)
                || e.aliases.iter().any(|a| normalize(a) == wanted)
        })
        .map(|e| &e.curve)
        .ok_or_else(|| {
            tracing::error!(name, "curve name not in registry");
            KeyError::CurveUnknown
        })
}

/// Builds a working curve from explicit SEC1 domain parameters.
///
/// When the parameters coincide with a registered curve the registered
/// entry is returned, so the result keeps its name and OID; otherwise an
/// anonymous curve is compiled and sanity-checked.
///
/// # Errors
///
/// `KeyError::EccInvalidCurveParameters` - the parameters do not describe
/// a usable curve (generator not on the curve, zero order, ...)
pub fn compile_short_curve(params: &EcExplicitParams) -> KeyResult<ShortCurve> {
    let candidate = ShortCurve::from_explicit(params)?;
    for entry in registry() {
        if entry.curve.same_domain(&candidate) {
            return Ok(entry.curve.clone());
        }
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::OID_SECP256R1;

    #[test]
    fn lookup_by_name_is_lenient() {
        let a = short_curve_by_name("secp256r1").unwrap();
        let b = short_curve_by_name("P-256").unwrap();
        let c = short_curve_by_name("prime256v1").unwrap();
        assert_eq!(a.name(), Some("secp256r1"));
        assert_eq!(a.name(), b.name());
        assert_eq!(a.name(), c.name());

        assert_eq!(
            short_curve_by_name("brainpoolP256r1").unwrap_err(),
            KeyError::CurveUnknown
        );
    }

    #[test]
    fn lookup_by_oid() {
        let curve = short_curve_by_oid(&OID_SECP256R1).unwrap();
        assert_eq!(curve.name(), Some("secp256r1"));
        assert_eq!(curve.field_length(), 32);

        assert_eq!(
            short_curve_by_oid(&asn1::oid!(1, 2, 3)).unwrap_err(),
            KeyError::CurveUnknown
        );
    }

    #[test]
    fn registry_curves_are_consistent() {
        for entry in registry() {
            let curve = &entry.curve;
            assert!(curve.generator_on_curve(), "{:?}", curve.name());
        }
    }

    #[test]
    fn special_curve_oids_roundtrip() {
        for curve in [
            SpecialCurve::X25519,
            SpecialCurve::X448,
            SpecialCurve::Ed25519,
            SpecialCurve::Ed448,
        ] {
            assert_eq!(SpecialCurve::from_oid(&curve.oid()), Some(curve));
        }
        assert_eq!(SpecialCurve::from_oid(&OID_SECP256R1), None);
    }
}
