// Copyright (C) Microsoft Corporation. All rights reserved.

//! X25519 and X448 key agreement (RFC 7748).
//!
//! Scalars and coordinates are raw little-endian byte strings of the curve
//! length. Scalars are clamped before use, so any byte string of the right
//! length is a valid private key.

use num_bigint::BigUint;
use num_traits::One;

use super::SpecialCurve;
use crate::{KeyError, KeyResult};

struct LadderParams {
    p: BigUint,
    a24: BigUint,
    bits: u64,
    length: usize,
    base_u: u32,
}

fn ladder_params(curve: SpecialCurve) -> KeyResult<LadderParams> {
    match curve {
        SpecialCurve::X25519 => Ok(LadderParams {
            p: (BigUint::one() << 255u32) - 19u32,
            a24: BigUint::from(121665u32),
            bits: 255,
            length: 32,
            base_u: 9,
        }),
        SpecialCurve::X448 => Ok(LadderParams {
            p: (BigUint::one() << 448u32) - (BigUint::one() << 224u32) - 1u32,
            a24: BigUint::from(39081u32),
            bits: 448,
            length: 56,
            base_u: 5,
        }),
        SpecialCurve::Ed25519 | SpecialCurve::Ed448 => {
            tracing::error!("not a Montgomery curve");
            Err(KeyError::KeyUnsupportedType)
        }
    }
}

fn clamp(curve: SpecialCurve, scalar: &[u8]) -> Vec<u8> {
    let mut s = scalar.to_vec();
    match curve {
        SpecialCurve::X25519 => {
            s[0] &= 248;
            s[31] &= 127;
            s[31] |= 64;
        }
        _ => {
            s[0] &= 252;
            s[55] |= 128;
        }
    }
    s
}

fn ladder(params: &LadderParams, scalar: &BigUint, u: &BigUint) -> BigUint {
    let p = &params.p;
    let x1 = u % p;
    let mut x2 = BigUint::one();
    let mut z2 = BigUint::from(0u32);
    let mut x3 = x1.clone();
    let mut z3 = BigUint::one();
    let mut swap = false;

    for t in (0..params.bits).rev() {
        let kt = scalar.bit(t);
        if swap != kt {
            std::mem::swap(&mut x2, &mut x3);
            std::mem::swap(&mut z2, &mut z3);
        }
        swap = kt;

        let a = (&x2 + &z2) % p;
        let aa = (&a * &a) % p;
        let b = (&x2 + p - &z2) % p;
        let bb = (&b * &b) % p;
        let e = (&aa + p - &bb) % p;
        let c = (&x3 + &z3) % p;
        let d = (&x3 + p - &z3) % p;
        let da = (&d * &a) % p;
        let cb = (&c * &b) % p;

        let t0 = (&da + &cb) % p;
        x3 = (&t0 * &t0) % p;
        let t1 = (&da + p - &cb) % p;
        z3 = (&x1 * ((&t1 * &t1) % p)) % p;
        x2 = (&aa * &bb) % p;
        z2 = (&e * ((&aa + &params.a24 * &e) % p)) % p;
    }
    if swap {
        std::mem::swap(&mut x2, &mut x3);
        std::mem::swap(&mut z2, &mut z3);
    }

    (&x2 * z2.modpow(&(p - 2u32), p)) % p
}

fn encode_u(params: &LadderParams, u: &BigUint) -> Vec<u8> {
    let mut out = u.to_bytes_le();
    out.resize(params.length, 0);
    out
}

fn decode_u(params: &LadderParams, bytes: &[u8]) -> KeyResult<BigUint> {
    if bytes.len() != params.length {
        tracing::error!(len = bytes.len(), "wrong coordinate length");
        Err(KeyError::EccInvalidPoint)?;
    }
    let mut bytes = bytes.to_vec();
    // RFC 7748: the unused top bit of an X25519 coordinate is masked.
    if params.length == 32 {
        bytes[31] &= 0x7f;
    }
    Ok(BigUint::from_bytes_le(&bytes))
}

fn decode_scalar(
    curve: SpecialCurve,
    params: &LadderParams,
    scalar: &[u8],
) -> KeyResult<BigUint> {
    if scalar.len() != params.length {
        tracing::error!(len = scalar.len(), "wrong scalar length");
        Err(KeyError::KeyInvalidParameter)?;
    }
    Ok(BigUint::from_bytes_le(&clamp(curve, scalar)))
}

/// Derives the public coordinate for a private scalar.
pub fn public_key(curve: SpecialCurve, scalar: &[u8]) -> KeyResult<Vec<u8>> {
    let params = ladder_params(curve)?;
    let k = decode_scalar(curve, &params, scalar)?;
    let u = ladder(&params, &k, &BigUint::from(params.base_u));
    Ok(encode_u(&params, &u))
}

/// Computes the shared secret between a private scalar and a peer
/// coordinate.
///
/// # Errors
///
/// `KeyError::EccInvalidPoint` - the peer coordinate has the wrong length,
/// or the result is all zeros (the peer point is in the small subgroup)
pub fn diffie_hellman(curve: SpecialCurve, scalar: &[u8], peer_u: &[u8]) -> KeyResult<Vec<u8>> {
    let params = ladder_params(curve)?;
    let k = decode_scalar(curve, &params, scalar)?;
    let u = decode_u(&params, peer_u)?;
    let shared = ladder(&params, &k, &u);
    let out = encode_u(&params, &shared);
    if out.iter().all(|&b| b == 0) {
        tracing::error!("key agreement produced the zero point");
        Err(KeyError::EccInvalidPoint)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn x25519_rfc7748_vector() {
        // RFC 7748 section 5.2, first vector.
        let out = diffie_hellman(
            SpecialCurve::X25519,
            &h("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4"),
            &h("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c"),
        )
        .unwrap();
        assert_eq!(
            hex::encode(out),
            "c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552"
        );
    }

    #[test]
    fn x25519_exchange_is_symmetric() {
        let a = h("901c7b06a7db58364ff07d1fec837eba4eae2229bf2f0677934bb48d4bc9777f");
        let b = h("28db685817aeb0363fff1ceb00ce1c7960eed2b04caa95a86c0e75fcb4c11348");
        let pub_a = public_key(SpecialCurve::X25519, &a).unwrap();
        let pub_b = public_key(SpecialCurve::X25519, &b).unwrap();
        assert_eq!(
            hex::encode(&pub_a),
            "847d46ff4687cfdf7a1eb2afa1a1b920acfa6a0afa9e15a9fcea2bfd81530d05"
        );

        let s1 = diffie_hellman(SpecialCurve::X25519, &a, &pub_b).unwrap();
        let s2 = diffie_hellman(SpecialCurve::X25519, &b, &pub_a).unwrap();
        assert_eq!(s1, s2);
        assert_eq!(
            hex::encode(s1),
            "4ff6d5e5be76a8824ac2a4a78f9c268aee03dcbccf64811f62c11b588bb0243d"
        );
    }

    #[test]
    fn x448_rfc7748_vector() {
        let out = diffie_hellman(
            SpecialCurve::X448,
            &h("3d262fddf9ec8e88495266fea19a34d28882acef045104d0d1aae121700a779c\
                984c24f8cdd78fbff44943eba368f54b29259a4f1c600ad3"),
            &h("06fce640fa3487bfda5f6cf2d5263f8aad88334cbd07437f020f08f9814dc031\
                ddbdc38c19c6da2583fa5429db94ada18aa7a7fb4ef8a086"),
        )
        .unwrap();
        assert_eq!(
            hex::encode(out),
            "ce3e4ff95a60dc6697da1db1d85e6afbdf79b50a2412d7546d5f239fe14fbaad\
             eb445fc66a01b0779d98223961111e21766282f73dd96b6f"
        );
    }

    #[test]
    fn x448_exchange_is_symmetric() {
        let a = vec![0x9au8; 56];
        let b = vec![0x3bu8; 56];
        let pub_a = public_key(SpecialCurve::X448, &a).unwrap();
        let pub_b = public_key(SpecialCurve::X448, &b).unwrap();

        let s1 = diffie_hellman(SpecialCurve::X448, &a, &pub_b).unwrap();
        let s2 = diffie_hellman(SpecialCurve::X448, &b, &pub_a).unwrap();
        assert_eq!(s1, s2);
        assert_eq!(
            hex::encode(s1),
            "2e2c2684384da958699418d43544282cc091bc4eae77a703c295ef8127e2933c\
             53caad414c9264d92c461e7b96fbac9c2d77723c1ac26017"
        );
    }

    #[test]
    fn rejects_small_subgroup_peer() {
        let a = vec![0x11u8; 32];
        assert_eq!(
            diffie_hellman(SpecialCurve::X25519, &a, &[0u8; 32]).unwrap_err(),
            KeyError::EccInvalidPoint
        );
    }

    #[test]
    fn rejects_wrong_lengths() {
        assert_eq!(
            public_key(SpecialCurve::X25519, &[0u8; 31]).unwrap_err(),
            KeyError::KeyInvalidParameter
        );
        assert_eq!(
            diffie_hellman(SpecialCurve::X448, &[0x9au8; 56], &[0u8; 32]).unwrap_err(),
            KeyError::EccInvalidPoint
        );
        assert_eq!(
            public_key(SpecialCurve::Ed25519, &[0u8; 32]).unwrap_err(),
            KeyError::KeyUnsupportedType
        );
    }
}
