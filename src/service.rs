//! Text-level operations shared by the shell and the HTTP layer.
//!
//! Codec bekerja per code point; modul ini menyusun call-call itu untuk
//! satu string utuh atau satu buffer utuh.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{Codec, Decoded, Decoder, Encoder, PositionedError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("invalid hexadecimal value: {0}")]
    InvalidHex(String),

    #[error("Invalid operation. Use 'encode' or 'decode'.")]
    InvalidOperation(String),

    #[error("code point {input} cannot be encoded: {source}")]
    Encode {
        input: String,
        #[source]
        source: crate::codec::CodecError,
    },

    #[error(transparent)]
    Decode(#[from] PositionedError),
}

impl ServiceError {
    /// Codec error tag, if the failure came from the codec.
    pub fn codec_kind(&self) -> Option<&'static str> {
        match self {
            Self::Encode { source, .. } => Some(source.kind()),
            Self::Decode(e) => Some(e.source.kind()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encode,
    Decode,
}

impl FromStr for Operation {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encode" => Ok(Self::Encode),
            "decode" => Ok(Self::Decode),
            other => Err(ServiceError::InvalidOperation(other.to_string())),
        }
    }
}

/// Result payload of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Output {
    Bytes(Vec<u8>),
    Text(String),
}

/// Outcome of walking a buffer. `chars` holds everything decoded before
/// `error`, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub bytes: Vec<u8>,
    pub chars: Vec<Decoded>,
    pub error: Option<PositionedError>,
}

impl DecodeReport {
    /// Decoded text; non-scalar values render as U+FFFD.
    pub fn text(&self) -> String {
        self.chars
            .iter()
            .map(|d| d.as_char().unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }

    pub fn into_result(self) -> Result<Self, ServiceError> {
        match self.error {
            Some(e) => Err(e.into()),
            None => Ok(self),
        }
    }
}

/// UTF-8 bytes of every character of `text`.
pub fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        out.extend_from_slice(&crate::codec::encode_char(c));
    }
    out
}

/// Encode a comma separated list of hex code points (`41, U+20AC, 1F600`).
///
/// Unlike [`encode_text`] the values are arbitrary integers, so the
/// encoder's out-of-range policy applies.
pub fn encode_code_points(encoder: &Encoder, list: &str) -> Result<Vec<u8>, ServiceError> {
    let mut out = Vec::new();
    for part in list.split(',') {
        let trimmed = part.trim();
        let digits = strip_prefix_ci(trimmed, "U+")
            .or_else(|| strip_prefix_ci(trimmed, "0x"))
            .unwrap_or(trimmed);
        let code_point = parse_hex_digits(digits)
            .and_then(|d| i64::from_str_radix(d, 16).ok())
            .ok_or_else(|| ServiceError::InvalidHex(part.to_string()))?;
        encoder
            .encode_into(code_point, &mut out)
            .map_err(|source| ServiceError::Encode {
                input: trimmed.to_string(),
                source,
            })?;
    }
    Ok(out)
}

/// Parse `"48, 65,6C"` into bytes. Every element must be 1-2 hex digits.
pub fn parse_hex_list(list: &str) -> Result<Vec<u8>, ServiceError> {
    list.split(',')
        .map(|part| {
            let trimmed = part.trim();
            let digits = strip_prefix_ci(trimmed, "0x").unwrap_or(trimmed);
            parse_hex_digits(digits)
                .and_then(|d| u8::from_str_radix(d, 16).ok())
                .ok_or_else(|| ServiceError::InvalidHex(part.to_string()))
        })
        .collect()
}

/// Walk `bytes`, keeping the decoded prefix when a bad sequence is hit.
pub fn decode_bytes(decoder: &Decoder, bytes: Vec<u8>) -> DecodeReport {
    let mut chars = Vec::new();
    let mut error = None;
    for item in decoder.iter(&bytes) {
        match item {
            Ok(decoded) => chars.push(decoded),
            Err(e) => error = Some(e),
        }
    }
    DecodeReport {
        bytes,
        chars,
        error,
    }
}

/// Parse a hex list and decode it.
pub fn decode_hex_list(decoder: &Decoder, list: &str) -> Result<DecodeReport, ServiceError> {
    let bytes = parse_hex_list(list)?;
    Ok(decode_bytes(decoder, bytes))
}

/// Run one operation the way the HTTP endpoint exposes it.
pub fn run(op: Operation, input: &str, codec: &Codec) -> Result<Output, ServiceError> {
    match op {
        Operation::Encode => Ok(Output::Bytes(encode_text(input))),
        Operation::Decode => {
            let report = decode_hex_list(&codec.decoder, input)?.into_result()?;
            Ok(Output::Text(report.text()))
        }
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

// from_str_radix menerima tanda '+', jadi cek digit dulu
fn parse_hex_digits(s: &str) -> Option<&str> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(s)
    } else {
        None
    }
}
