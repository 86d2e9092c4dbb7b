// Copyright (C) Microsoft Corporation. All rights reserved.

//! Short Weierstrass curve arithmetic over prime fields, ECDSA and ECDH.
//!
//! The curve equation is `y^2 = x^3 + ax + b (mod p)`. Points cross the
//! API boundary as big-endian coordinate byte strings; scalars as
//! big-endian byte strings. ECDSA nonces are deterministic per RFC 6979
//! with HMAC-SHA256 regardless of the curve, so signing needs no RNG and
//! never reuses a nonce.

use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::Sha256;

use crate::der::{decode_uncompressed_point, EcExplicitParams};
use crate::{KeyError, KeyResult};

type HmacSha256 = Hmac<Sha256>;

/// An affine point, `None` being the point at infinity.
type Point = Option<(BigUint, BigUint)>;

/// A short Weierstrass curve over a prime field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortCurve {
    name: Option<&'static str>,
    oid: Option<asn1::ObjectIdentifier>,
    p: BigUint,
    a: BigUint,
    b: BigUint,
    gx: BigUint,
    gy: BigUint,
    n: BigUint,
    cofactor: u32,
    field_length: usize,
}

impl ShortCurve {
    /// Builds a registered curve from its domain parameters.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        name: &'static str,
        oid: Option<asn1::ObjectIdentifier>,
        p: BigUint,
        a: BigUint,
        b: BigUint,
        gx: BigUint,
        gy: BigUint,
        n: BigUint,
        cofactor: u32,
    ) -> Self {
        let field_length = ((p.bits() + 7) / 8) as usize;
        ShortCurve {
            name: Some(name),
            oid,
            p,
            a,
            b,
            gx,
            gy,
            n,
            cofactor,
            field_length,
        }
    }

    /// Builds an anonymous curve from explicit SEC1 domain parameters and
    /// sanity-checks them.
    ///
    /// # Errors
    ///
    /// `KeyError::EccInvalidCurveParameters` - degenerate field or order,
    /// or a generator that is not on the curve
    pub(super) fn from_explicit(params: &EcExplicitParams) -> KeyResult<Self> {
        let p = BigUint::from_bytes_be(&params.p);
        let a = BigUint::from_bytes_be(&params.a);
        let b = BigUint::from_bytes_be(&params.b);
        let n = BigUint::from_bytes_be(&params.order);
        let field_length = params.field_length();

        if p.bits() < 16 || !p.bit(0) || n.is_zero() {
            tracing::error!("degenerate explicit curve parameters");
            Err(KeyError::EccInvalidCurveParameters)?;
        }

        let (gx_bytes, gy_bytes) = decode_uncompressed_point(&params.base, field_length)
            .map_err(|_| KeyError::EccInvalidCurveParameters)?;
        let gx = BigUint::from_bytes_be(&gx_bytes);
        let gy = BigUint::from_bytes_be(&gy_bytes);

        let cofactor = params
            .cofactor
            .as_ref()
            .map_or(1, |h| {
                h.iter().fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte))
            });

        let curve = ShortCurve {
            name: None,
            oid: None,
            p,
            a,
            b,
            gx,
            gy,
            n,
            cofactor,
            field_length,
        };
        if !curve.generator_on_curve() {
            tracing::error!("explicit curve generator is not on the curve");
            Err(KeyError::EccInvalidCurveParameters)?;
        }
        Ok(curve)
    }

    /// Registered curve name, if this curve came from (or matched) the
    /// registry.
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// namedCurve OID, if registered.
    pub fn oid(&self) -> Option<asn1::ObjectIdentifier> {
        self.oid.clone()
    }

    /// Coordinate length in bytes.
    pub fn field_length(&self) -> usize {
        self.field_length
    }

    /// Group order length in bytes. Differs from the field length on
    /// curves like P-521 only by integer rounding, but signature
    /// components are sized by this, not by the field.
    pub fn order_length(&self) -> usize {
        ((self.n.bits() + 7) / 8) as usize
    }

    /// Cofactor.
    pub fn cofactor(&self) -> u32 {
        self.cofactor
    }

    /// True when `other` has the same domain parameters, regardless of
    /// name or OID.
    pub(super) fn same_domain(&self, other: &ShortCurve) -> bool {
        self.p == other.p
            && self.a == other.a
            && self.b == other.b
            && self.gx == other.gx
            && self.gy == other.gy
            && self.n == other.n
    }

    pub(super) fn generator_on_curve(&self) -> bool {
        self.contains(&self.gx, &self.gy)
    }

    fn contains(&self, x: &BigUint, y: &BigUint) -> bool {
        if x >= &self.p || y >= &self.p {
            return false;
        }
        let lhs = (y * y) % &self.p;
        let rhs = (x * x * x + &self.a * x + &self.b) % &self.p;
        lhs == rhs
    }

    /// Checks that a public point lies on the curve.
    ///
    /// # Errors
    ///
    /// `KeyError::EccInvalidPoint`
    pub fn validate_point(&self, x: &[u8], y: &[u8]) -> KeyResult<()> {
        let x = BigUint::from_bytes_be(x);
        let y = BigUint::from_bytes_be(y);
        if self.contains(&x, &y) {
            Ok(())
        } else {
            tracing::error!("point is not on the curve");
            Err(KeyError::EccInvalidPoint)
        }
    }

    /// Checks that a private scalar is in `[1, n-1]`.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyInvalidParameter`
    pub fn validate_scalar(&self, scalar: &[u8]) -> KeyResult<()> {
        let d = BigUint::from_bytes_be(scalar);
        if d.is_zero() || d >= self.n {
            tracing::error!("private scalar out of range");
            Err(KeyError::KeyInvalidParameter)?;
        }
        Ok(())
    }

    /// Derives the public point for a private scalar. Both coordinates are
    /// returned padded to the field length.
    pub fn public_from_scalar(&self, scalar: &[u8]) -> KeyResult<(Vec<u8>, Vec<u8>)> {
        self.validate_scalar(scalar)?;
        let d = BigUint::from_bytes_be(scalar);
        let point = self.mul(&d, &(self.gx.clone(), self.gy.clone()));
        match point {
            Some((x, y)) => Ok((self.pad(&x), self.pad(&y))),
            None => Err(KeyError::EccInvalidPoint),
        }
    }

    /// ECDH: multiplies the peer's public point by the local scalar and
    /// returns the X coordinate, padded to the field length.
    ///
    /// # Errors
    ///
    /// `KeyError::EccInvalidPoint` - the peer point is not on the curve or
    /// the product is the point at infinity
    pub fn ecdh(&self, scalar: &[u8], peer_x: &[u8], peer_y: &[u8]) -> KeyResult<Vec<u8>> {
        self.validate_scalar(scalar)?;
        self.validate_point(peer_x, peer_y)?;
        let d = BigUint::from_bytes_be(scalar);
        let q = (BigUint::from_bytes_be(peer_x), BigUint::from_bytes_be(peer_y));
        match self.mul(&d, &q) {
            Some((x, _)) => Ok(self.pad(&x)),
            None => {
                tracing::error!("key agreement produced the point at infinity");
                Err(KeyError::EccInvalidPoint)
            }
        }
    }

    /// ECDSA signature over a precomputed digest, returning `(r, s)` as
    /// minimal big-endian byte strings.
    pub fn ecdsa_sign(&self, scalar: &[u8], digest: &[u8]) -> KeyResult<(Vec<u8>, Vec<u8>)> {
        self.validate_scalar(scalar)?;
        let d = BigUint::from_bytes_be(scalar);
        let e = self.bits2int(digest);

        let mut nonces = NonceGenerator::new(self, &d, digest)?;
        loop {
            let k = nonces.next_candidate()?;
            if k.is_zero() || k >= self.n {
                continue;
            }
            let point = self.mul(&k, &(self.gx.clone(), self.gy.clone()));
            let Some((x, _)) = point else { continue };
            let r = x % &self.n;
            if r.is_zero() {
                continue;
            }
            let k_inv = k.modpow(&(&self.n - 2u32), &self.n);
            let s = (&k_inv * (&e + &d * &r)) % &self.n;
            if s.is_zero() {
                continue;
            }
            return Ok((r.to_bytes_be(), s.to_bytes_be()));
        }
    }

    /// ECDSA verification over a precomputed digest.
    pub fn ecdsa_verify(
        &self,
        pub_x: &[u8],
        pub_y: &[u8],
        digest: &[u8],
        r: &[u8],
        s: &[u8],
    ) -> KeyResult<bool> {
        self.validate_point(pub_x, pub_y)?;
        let r = BigUint::from_bytes_be(r);
        let s = BigUint::from_bytes_be(s);
        if r.is_zero() || r >= self.n || s.is_zero() || s >= self.n {
            return Ok(false);
        }

        let e = self.bits2int(digest);
        let w = s.modpow(&(&self.n - 2u32), &self.n);
        let u1 = (&e * &w) % &self.n;
        let u2 = (&r * &w) % &self.n;

        let q = (BigUint::from_bytes_be(pub_x), BigUint::from_bytes_be(pub_y));
        let lhs = self.mul(&u1, &(self.gx.clone(), self.gy.clone()));
        let rhs = self.mul(&u2, &q);
        match self.add(lhs, rhs) {
            Some((x, _)) => Ok(x % &self.n == r),
            None => Ok(false),
        }
    }

    fn pad(&self, v: &BigUint) -> Vec<u8> {
        let bytes = v.to_bytes_be();
        let mut out = vec![0u8; self.field_length.saturating_sub(bytes.len())];
        out.extend_from_slice(&bytes);
        out
    }

    /// Leftmost `n.bits()` of the digest as an integer (RFC 6979 2.3.2).
    fn bits2int(&self, bytes: &[u8]) -> BigUint {
        let mut v = BigUint::from_bytes_be(bytes);
        let blen = bytes.len() as u64 * 8;
        let qlen = self.n.bits();
        if blen > qlen {
            v >>= blen - qlen;
        }
        v % &self.n
    }

    fn add(&self, p1: Point, p2: Point) -> Point {
        let (x1, y1) = match p1 {
            Some(p) => p,
            None => return p2,
        };
        let (x2, y2) = match p2 {
            Some(p) => p,
            None => return Some((x1, y1)),
        };
        let p = &self.p;

        if x1 == x2 && ((&y1 + &y2) % p).is_zero() {
            return None;
        }

        let lambda = if x1 == x2 && y1 == y2 {
            let num = (3u32 * &x1 * &x1 + &self.a) % p;
            let den = (2u32 * &y1) % p;
            (num * den.modpow(&(p - 2u32), p)) % p
        } else {
            let num = (p + &y2 - &y1) % p;
            let den = (p + &x2 - &x1) % p;
            (num * den.modpow(&(p - 2u32), p)) % p
        };

        let x3 = (&lambda * &lambda + 2u32 * p - &x1 - &x2) % p;
        let y3 = (&lambda * ((p + &x1 - &x3) % p) + p - &y1) % p;
        Some((x3, y3))
    }

    fn mul(&self, k: &BigUint, point: &(BigUint, BigUint)) -> Point {
        let mut result: Point = None;
        let mut base: Point = Some(point.clone());
        for i in 0..k.bits() {
            if k.bit(i) {
                result = self.add(result, base.clone());
            }
            base = self.add(base.clone(), base);
        }
        result
    }
}

/// RFC 6979 deterministic nonce stream (HMAC-SHA256).
struct NonceGenerator<'a> {
    curve: &'a ShortCurve,
    k: Vec<u8>,
    v: Vec<u8>,
    primed: bool,
}

impl<'a> NonceGenerator<'a> {
    fn new(curve: &'a ShortCurve, scalar: &BigUint, digest: &[u8]) -> KeyResult<Self> {
        let qlen = curve.order_length();
        let mut x = vec![0u8; qlen];
        let scalar_bytes = scalar.to_bytes_be();
        x[qlen - scalar_bytes.len()..].copy_from_slice(&scalar_bytes);

        let h = curve.bits2int(digest);
        let mut h_octets = vec![0u8; qlen];
        let h_bytes = h.to_bytes_be();
        h_octets[qlen - h_bytes.len()..].copy_from_slice(&h_bytes);

        let mut k = vec![0u8; 32];
        let mut v = vec![1u8; 32];

        k = Self::mac(&k, &[&v, &[0x00], &x, &h_octets])?;
        v = Self::mac(&k, &[&v])?;
        k = Self::mac(&k, &[&v, &[0x01], &x, &h_octets])?;
        v = Self::mac(&k, &[&v])?;

        Ok(NonceGenerator {
            curve,
            k,
            v,
            primed: false,
        })
    }

    fn next_candidate(&mut self) -> KeyResult<BigUint> {
        if self.primed {
            self.k = Self::mac(&self.k, &[&self.v, &[0x00]])?;
            self.v = Self::mac(&self.k, &[&self.v])?;
        }
        self.primed = true;

        let qlen = self.curve.order_length();
        let mut t = Vec::with_capacity(qlen);
        while t.len() < qlen {
            self.v = Self::mac(&self.k, &[&self.v])?;
            t.extend_from_slice(&self.v);
        }
        t.truncate(qlen);

        let mut candidate = BigUint::from_bytes_be(&t);
        let excess = qlen as u64 * 8 - self.curve.n.bits();
        if excess > 0 {
            candidate >>= excess;
        }
        Ok(candidate)
    }

    fn mac(key: &[u8], parts: &[&[u8]]) -> KeyResult<Vec<u8>> {
        let mut mac =
            HmacSha256::new_from_slice(key).map_err(|_| KeyError::KeyInvalidParameter)?;
        for part in parts {
            mac.update(part);
        }
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
