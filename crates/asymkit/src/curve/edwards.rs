// Copyright (C) Microsoft Corporation. All rights reserved.

//! Ed25519 and Ed448 signatures (RFC 8032).
//!
//! Both are PureEdDSA with an empty context: Ed25519 hashes with SHA-512
//! and no domain prefix, Ed448 with SHAKE256 (114-byte output) under the
//! `SigEd448` dom4 prefix. Keys and signatures are raw little-endian byte
//! strings; points are compressed to the `y` coordinate with the sign of
//! `x` in the top bit.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use sha2::{Digest, Sha512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use super::SpecialCurve;
use crate::{KeyError, KeyResult};

const DOM4: &[u8] = b"SigEd448\x00\x00";

struct EdwardsParams {
    p: BigUint,
    d: BigUint,
    order: BigUint,
    base: (BigUint, BigUint),
    /// true for Ed25519 (a = -1), false for Ed448 (a = 1)
    twisted: bool,
    key_length: usize,
}

fn hx(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap_or_default()
}

fn edwards_params(curve: SpecialCurve) -> KeyResult<EdwardsParams> {
    match curve {
        SpecialCurve::Ed25519 => Ok(EdwardsParams {
            p: (BigUint::one() << 255u32) - 19u32,
            d: hx("52036cee2b6ffe738cc740797779e89800700a4d4141d8ab75eb4dca135978a3"),
            order: hx("1000000000000000000000000000000014def9dea2f79cd65812631a5cf5d3ed"),
            base: (
                hx("216936d3cd6e53fec0a4e231fdd6dc5c692cc7609525a7b2c9562d608f25d51a"),
                hx("6666666666666666666666666666666666666666666666666666666666666658"),
            ),
            twisted: true,
            key_length: 32,
        }),
        SpecialCurve::Ed448 => Ok(EdwardsParams {
            p: (BigUint::one() << 448u32) - (BigUint::one() << 224u32) - 1u32,
            d: hx(
                "fffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff\
                 ffffffffffffffffffffffffffffffffffffffffffff6756",
            ),
            order: hx(
                "3fffffffffffffffffffffffffffffffffffffffffffffffffffffff7cca23e9\
                 c44edb49aed63690216cc2728dc58f552378c292ab5844f3",
            ),
            base: (
                hx(
                    "4f1970c66bed0ded221d15a622bf36da9e146570470f1767ea6de324a3d3a464\
                     12ae1af72ab66511433b80e18b00938e2626a82bc70cc05e",
                ),
                hx(
                    "693f46716eb6bc248876203756c9c7624bea73736ca3984087789c1e05a0c2d7\
                     3ad3ff1ce67c39c4fdbd132c4ed7c8ad9808795bf230fa14",
                ),
            ),
            twisted: false,
            key_length: 57,
        }),
        SpecialCurve::X25519 | SpecialCurve::X448 => {
            tracing::error!("not an Edwards curve");
            Err(KeyError::KeyUnsupportedType)
        }
    }
}

impl EdwardsParams {
    fn identity(&self) -> (BigUint, BigUint) {
        (BigUint::from(0u32), BigUint::one())
    }

    fn add(&self, p1: &(BigUint, BigUint), p2: &(BigUint, BigUint)) -> (BigUint, BigUint) {
        let p = &self.p;
        let (x1, y1) = p1;
        let (x2, y2) = p2;
        let xx = (x1 * x2) % p;
        let yy = (y1 * y2) % p;
        let t = (&self.d * &xx % p) * &yy % p;

        let x_num = (x1 * y2 + y1 * x2) % p;
        let x_den = (BigUint::one() + &t) % p;
        let x3 = (&x_num * x_den.modpow(&(p - 2u32), p)) % p;

        let y_num = if self.twisted {
            (&yy + &xx) % p
        } else {
            (&yy + p - &xx) % p
        };
        let y_den = (BigUint::one() + p - &t) % p;
        let y3 = (&y_num * y_den.modpow(&(p - 2u32), p)) % p;
        (x3, y3)
    }

    fn mul(&self, k: &BigUint, point: &(BigUint, BigUint)) -> (BigUint, BigUint) {
        let mut result = self.identity();
        let mut base = point.clone();
        for i in 0..k.bits() {
            if k.bit(i) {
                result = self.add(&result, &base);
            }
            base = self.add(&base, &base);
        }
        result
    }

    fn compress(&self, point: &(BigUint, BigUint)) -> Vec<u8> {
        let (x, y) = point;
        let mut out = y.to_bytes_le();
        out.resize(self.key_length, 0);
        if x.bit(0) {
            out[self.key_length - 1] |= 0x80;
        }
        out
    }

    fn decompress(&self, bytes: &[u8]) -> Option<(BigUint, BigUint)> {
        if bytes.len() != self.key_length {
            return None;
        }
        let p = &self.p;
        let mut bytes = bytes.to_vec();
        let sign = bytes[self.key_length - 1] >> 7 == 1;
        bytes[self.key_length - 1] &= 0x7f;
        let y = BigUint::from_bytes_le(&bytes);
        if y >= *p {
            return None;
        }

        // x^2 = (y^2 - 1) / (d y^2 +- 1)
        let yy = (&y * &y) % p;
        let u = (&yy + p - 1u32) % p;
        let v = if self.twisted {
            (&self.d * &yy + 1u32) % p
        } else {
            (&self.d * &yy + p - 1u32) % p
        };
        let w = (&u * v.modpow(&(p - 2u32), p)) % p;

        let mut x = if self.twisted {
            // p = 5 (mod 8): candidate root w^((p+3)/8), corrected by
            // sqrt(-1) when needed.
            let mut x = w.modpow(&((p + 3u32) >> 3), p);
            if (&x * &x) % p != w {
                let sqrt_m1 = BigUint::from(2u32).modpow(&((p - 1u32) >> 2), p);
                x = (&x * &sqrt_m1) % p;
                if (&x * &x) % p != w {
                    return None;
                }
            }
            x
        } else {
            // p = 3 (mod 4): w^((p+1)/4) is the root when one exists.
            let x = w.modpow(&((p + 1u32) >> 2), p);
            if (&x * &x) % p != w {
                return None;
            }
            x
        };

        if x.is_zero() && sign {
            return None;
        }
        if x.bit(0) != sign {
            x = p - x;
        }
        Some((x, y))
    }

    fn wide_hash(&self, parts: &[&[u8]]) -> Vec<u8> {
        if self.twisted {
            let mut hasher = Sha512::new();
            for part in parts {
                Digest::update(&mut hasher, part);
            }
            hasher.finalize().to_vec()
        } else {
            let mut hasher = Shake256::default();
            hasher.update(DOM4);
            for part in parts {
                hasher.update(part);
            }
            let mut out = vec![0u8; 114];
            hasher.finalize_xof().read(&mut out);
            out
        }
    }

    /// Secret scalar and signing prefix from the private seed (RFC 8032
    /// key expansion with the per-curve clamping).
    fn expand_seed(&self, seed: &[u8]) -> (BigUint, Vec<u8>) {
        if self.twisted {
            let h = Sha512::digest(seed);
            let mut s = h[..32].to_vec();
            s[0] &= 248;
            s[31] &= 63;
            s[31] |= 64;
            (BigUint::from_bytes_le(&s), h[32..].to_vec())
        } else {
            let mut hasher = Shake256::default();
            hasher.update(seed);
            let mut h = vec![0u8; 114];
            hasher.finalize_xof().read(&mut h);
            let mut s = h[..57].to_vec();
            s[0] &= 252;
            s[56] = 0;
            s[55] |= 0x80;
            (BigUint::from_bytes_le(&s), h[57..].to_vec())
        }
    }

    fn encode_scalar(&self, v: &BigUint) -> Vec<u8> {
        let mut out = v.to_bytes_le();
        out.resize(self.key_length, 0);
        out
    }
}

/// Derives the compressed public key for a private seed.
///
/// # Errors
///
/// `KeyError::KeyInvalidParameter` - wrong seed length
pub fn public_key(curve: SpecialCurve, seed: &[u8]) -> KeyResult<Vec<u8>> {
    let params = edwards_params(curve)?;
    if seed.len() != params.key_length {
        tracing::error!(len = seed.len(), "wrong seed length");
        Err(KeyError::KeyInvalidParameter)?;
    }
    let (s, _) = params.expand_seed(seed);
    Ok(params.compress(&params.mul(&s, &params.base)))
}

/// Signs a message (PureEdDSA, empty context).
pub fn sign(curve: SpecialCurve, seed: &[u8], message: &[u8]) -> KeyResult<Vec<u8>> {
    let params = edwards_params(curve)?;
    if seed.len() != params.key_length {
        tracing::error!(len = seed.len(), "wrong seed length");
        Err(KeyError::KeyInvalidParameter)?;
    }
    let (s, prefix) = params.expand_seed(seed);
    let public = params.compress(&params.mul(&s, &params.base));

    let r = BigUint::from_bytes_le(&params.wide_hash(&[&prefix, message])) % &params.order;
    let r_enc = params.compress(&params.mul(&r, &params.base));
    let k = BigUint::from_bytes_le(&params.wide_hash(&[&r_enc, &public, message]))
        % &params.order;
    let s_val = (&r + &k * &s) % &params.order;

    let mut sig = r_enc;
    sig.extend_from_slice(&params.encode_scalar(&s_val));
    Ok(sig)
}

/// Verifies a signature. Malformed signatures and undecodable points
/// verify as `false` rather than erroring.
pub fn verify(
    curve: SpecialCurve,
    public: &[u8],
    message: &[u8],
    signature: &[u8],
) -> KeyResult<bool> {
    let params = edwards_params(curve)?;
    if signature.len() != 2 * params.key_length {
        return Ok(false);
    }
    let Some(a) = params.decompress(public) else {
        return Ok(false);
    };
    let (r_enc, s_enc) = signature.split_at(params.key_length);
    let Some(r) = params.decompress(r_enc) else {
        return Ok(false);
    };
    let s = BigUint::from_bytes_le(s_enc);
    if s >= params.order {
        return Ok(false);
    }

    let k = BigUint::from_bytes_le(&params.wide_hash(&[r_enc, public, message]))
        % &params.order;
    let lhs = params.mul(&s, &params.base);
    let rhs = params.add(&r, &params.mul(&k, &a));
    Ok(lhs == rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    // RFC 8032 section 7.1, TEST 1 and TEST 2.
    const ED25519_SEED_1: &str =
        "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const ED25519_PUB_1: &str =
        "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const ED25519_SIG_1: &str =
        "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb88215\
         90a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";
    const ED25519_SEED_2: &str =
        "c5aa8df43f9f837bedb7442f31dcb7b166d38535076f094b85ce3a2e0b4458f7";
    const ED25519_SIG_2: &str =
        "ee5c4b8cc5762fbe8b4a856d6cd13f5a69083285b52b4d05f58fb06a1f1aae1f1642df13\
         30ce38dd208fc1eefe2e1a3aff5c35343b850cbb156485a653628905";

    // RFC 8032 section 7.4, blank and 1-octet vectors.
    const ED448_SEED_1: &str =
        "6c82a562cb808d10d632be89c8513ebf6c929f34ddfa8c9f63c9960ef6e348a3\
         528c8a3fcc2f044e39a3fc5b94492f8f032e7549a20098f95b";
    const ED448_PUB_1: &str =
        "5fd7449b59b461fd2ce787ec616ad46a1da1342485a70e1f8a0ea75d80e96778\
         edf124769b46c7061bd6783df1e50f6cd1fa1abeafe8256180";
    const ED448_SIG_1: &str =
        "533a37f6bbe457251f023c0d88f976ae2dfb504a843e34d2074fd823d41a591f\
         2b233f034f628281f2fd7a22ddd47d7828c59bd0a21bfd3980ff0d2028d4b18a\
         9df63e006c5d1c2d345b925d8dc00b4104852db99ac5c7cdda8530a113a0f4db\
         b61149f05a7363268c71d95808ff2e652600";
    const ED448_SEED_2: &str =
        "c4eab05d357007c632f3dbb48489924d552b08fe0c353a0d4a1f00acda2c463a\
         fbea67c5e8d2877c5e3bc397a659949ef8021e954e0a12274e";
    const ED448_SIG_2: &str =
        "26b8f91727bd62897af15e41eb43c377efb9c610d48f2335cb0bd0087810f435\
         2541b143c4b981b7e18f62de8ccdf633fc1bf037ab7cd779805e0dbcc0aae1cb\
         cee1afb2e027df36bc04dcecbf154336c19f0af7e0a6472905e799f1953d2a0f\
         f3348ab21aa4adafd1d234441cf807c03a00";

    #[test]
    fn ed25519_rfc8032_vectors() {
        let seed = h(ED25519_SEED_1);
        assert_eq!(hex::encode(public_key(SpecialCurve::Ed25519, &seed).unwrap()), ED25519_PUB_1);
        let sig = sign(SpecialCurve::Ed25519, &seed, b"").unwrap();
        assert_eq!(hex::encode(&sig), ED25519_SIG_1);
        assert!(verify(SpecialCurve::Ed25519, &h(ED25519_PUB_1), b"", &sig).unwrap());

        let sig2 = sign(SpecialCurve::Ed25519, &h(ED25519_SEED_2), &[0x72]).unwrap();
        assert_eq!(hex::encode(sig2), ED25519_SIG_2);
    }

    #[test]
    fn ed25519_rejects_tampering() {
        let seed = h(ED25519_SEED_2);
        let public = public_key(SpecialCurve::Ed25519, &seed).unwrap();
        let sig = sign(SpecialCurve::Ed25519, &seed, &[0x72]).unwrap();

        assert!(!verify(SpecialCurve::Ed25519, &public, &[0x73], &sig).unwrap());
        let mut bad = sig.clone();
        bad[0] ^= 1;
        assert!(!verify(SpecialCurve::Ed25519, &public, &[0x72], &bad).unwrap());
        assert!(!verify(SpecialCurve::Ed25519, &public, &[0x72], &sig[..63]).unwrap());
    }

    #[test]
    fn ed448_rfc8032_vectors() {
        let seed = h(ED448_SEED_1);
        assert_eq!(hex::encode(public_key(SpecialCurve::Ed448, &seed).unwrap()), ED448_PUB_1);
        let sig = sign(SpecialCurve::Ed448, &seed, b"").unwrap();
        assert_eq!(hex::encode(&sig), ED448_SIG_1);
        assert!(verify(SpecialCurve::Ed448, &h(ED448_PUB_1), b"", &sig).unwrap());

        let sig2 = sign(SpecialCurve::Ed448, &h(ED448_SEED_2), &[0x03]).unwrap();
        assert_eq!(hex::encode(sig2), ED448_SIG_2);
    }

    #[test]
    fn ed448_rejects_tampering() {
        let seed = h(ED448_SEED_2);
        let public = public_key(SpecialCurve::Ed448, &seed).unwrap();
        let sig = sign(SpecialCurve::Ed448, &seed, &[0x03]).unwrap();
        assert!(verify(SpecialCurve::Ed448, &public, &[0x03], &sig).unwrap());
        assert!(!verify(SpecialCurve::Ed448, &public, &[0x04], &sig).unwrap());
    }

    #[test]
    fn wrong_seed_length() {
        assert_eq!(
            sign(SpecialCurve::Ed25519, &[0u8; 57], b"").unwrap_err(),
            KeyError::KeyInvalidParameter
        );
        assert_eq!(
            public_key(SpecialCurve::X25519, &[0u8; 32]).unwrap_err(),
            KeyError::KeyUnsupportedType
        );
    }
}
