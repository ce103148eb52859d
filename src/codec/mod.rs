//! Codec Layer: UTF-8 Encode/Decode
//!
//! Prinsip desain:
//! - Stateless: setiap call murni, aman dipanggil dari thread mana pun
//! - No allocation: encode menulis ke buffer 4 byte di stack
//! - Explicit errors: setiap jenis kegagalan punya variant sendiri
//!
//! The free functions use the strict defaults; build an [`Encoder`] or
//! [`Decoder`] to pick the lenient behaviour.

mod decoder;
mod encoder;
mod error;

pub use decoder::{Conformance, Decoded, DecodeIter, Decoder};
pub use encoder::{encode_char, encoded_len, EncodeMode, Encoder, Utf8Bytes};
pub use error::{CodecError, PositionedError};

/// Largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

#[inline(always)]
pub const fn is_surrogate(code_point: u32) -> bool {
    matches!(code_point, 0xD800..=0xDFFF)
}

/// Encoder and decoder pair as configured by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    pub encoder: Encoder,
    pub decoder: Decoder,
}

impl Codec {
    pub const fn new(mode: EncodeMode, conformance: Conformance) -> Self {
        Self {
            encoder: Encoder::new(mode),
            decoder: Decoder::new(conformance),
        }
    }
}

/// Strict encode of one code point.
#[inline]
pub fn encode(code_point: i64) -> Result<Utf8Bytes, CodecError> {
    Encoder::strict().encode(code_point)
}

/// Strict decode of the sequence at `offset`.
#[inline]
pub fn decode(bytes: &[u8], offset: usize) -> Result<Decoded, CodecError> {
    Decoder::strict().decode(bytes, offset)
}

/// Strict decode reporting failure as zero bytes consumed.
#[inline]
pub fn decode_or_sentinel(bytes: &[u8], offset: usize) -> (u32, usize) {
    Decoder::strict().decode_or_sentinel(bytes, offset)
}
