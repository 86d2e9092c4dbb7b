// Copyright (C) Microsoft Corporation. All rights reserved.

//! PEM envelope handling.
//!
//! ```text
//! -----BEGIN <TITLE>-----
//! <base64, wrapped at 64 columns>
//! -----END <TITLE>-----
//! ```
//!
//! Only the envelope is handled here; the DER payload is opaque. Encrypted
//! PEM bodies (`Proc-Type`/`DEK-Info` headers) are not supported.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::{KeyError, KeyResult};

const BEGIN_MARK: &str = "-----BEGIN ";
const END_MARK: &str = "-----END ";
const TAIL_MARK: &str = "-----";

/// A decoded PEM block: the envelope title and the DER payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    /// Envelope title, e.g. `RSA PRIVATE KEY`.
    pub title: String,
    /// Decoded DER bytes.
    pub der: Vec<u8>,
}

/// Parses the first PEM block from `text`.
///
/// # Errors
///
/// * `KeyError::PemMalformed` - no BEGIN/END envelope, or the body is not
///   valid base64
/// * `KeyError::PemTitleMismatch` - BEGIN and END titles disagree
pub fn parse_pem(text: &str) -> KeyResult<PemBlock> {
    let begin_at = text.find(BEGIN_MARK).ok_or(KeyError::PemMalformed)?;
    let after_begin = &text[begin_at + BEGIN_MARK.len()..];
    let title_end = after_begin.find(TAIL_MARK).ok_or(KeyError::PemMalformed)?;
    let title = &after_begin[..title_end];

    let body_start = &after_begin[title_end + TAIL_MARK.len()..];
    let end_at = body_start.find(END_MARK).ok_or(KeyError::PemMalformed)?;
    let body = &body_start[..end_at];

    let after_end = &body_start[end_at + END_MARK.len()..];
    let end_title_end = after_end.find(TAIL_MARK).ok_or(KeyError::PemMalformed)?;
    let end_title = &after_end[..end_title_end];

    if title != end_title {
        tracing::error!(begin = title, end = end_title, "PEM titles disagree");
        return Err(KeyError::PemTitleMismatch);
    }

    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let der = BASE64
        .decode(compact.as_bytes())
        .map_err(|_| KeyError::PemMalformed)?;

    Ok(PemBlock {
        title: title.to_string(),
        der,
    })
}

/// Encodes `der` as a PEM block with the given envelope title.
pub fn encode_pem(title: &str, der: &[u8]) -> String {
    let body = BASE64.encode(der);
    let mut out = String::with_capacity(body.len() + body.len() / 64 + title.len() * 2 + 32);
    out.push_str(BEGIN_MARK);
    out.push_str(title);
    out.push_str(TAIL_MARK);
    out.push('\n');
    for chunk in body.as_bytes().chunks(64) {
        // base64 output is always ASCII
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out.push_str(END_MARK);
    out.push_str(title);
    out.push_str(TAIL_MARK);
    out.push('\n');
    out
}

/// Returns true when the input looks like a PEM envelope rather than raw DER.
pub fn looks_like_pem(data: &[u8]) -> bool {
    std::str::from_utf8(data).is_ok_and(|s| s.contains(BEGIN_MARK))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "-----BEGIN PUBLIC KEY-----\n\
MCowBQYDK2VuAyEAhSDwCYkwp1R0i33ctD73Wg2/Og0mOBr066SpjqqbTmo=\n\
-----END PUBLIC KEY-----\n";

    #[test]
    fn parse_roundtrip() {
        let block = parse_pem(SAMPLE).unwrap();
        assert_eq!(block.title, "PUBLIC KEY");
        assert_eq!(block.der[0], 0x30);
        assert_eq!(encode_pem(&block.title, &block.der), SAMPLE);
    }

    #[test]
    fn wraps_at_64_columns() {
        let der = vec![0xabu8; 100];
        let pem = encode_pem("CERTIFICATE", &der);
        let lines: Vec<&str> = pem.lines().collect();
        assert_eq!(lines[0], "-----BEGIN CERTIFICATE-----");
        assert!(lines[1].len() == 64);
        assert_eq!(*lines.last().unwrap(), "-----END CERTIFICATE-----");
        assert_eq!(parse_pem(&pem).unwrap().der, der);
    }

    #[test]
    fn title_mismatch() {
        let bad = SAMPLE.replace("-----END PUBLIC KEY-----", "-----END PRIVATE KEY-----");
        assert_eq!(parse_pem(&bad), Err(KeyError::PemTitleMismatch));
    }

    #[test]
    fn not_pem() {
        assert_eq!(parse_pem("hello"), Err(KeyError::PemMalformed));
        assert!(!looks_like_pem(&[0x30, 0x82]));
        assert!(looks_like_pem(SAMPLE.as_bytes()));
    }

    #[test]
    fn bad_base64_body() {
        let bad = "-----BEGIN X-----\n@@@@\n-----END X-----\n";
        assert_eq!(parse_pem(bad), Err(KeyError::PemMalformed));
    }
}
