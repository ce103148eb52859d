//! Zero-Copy UTF-8 Decoder
//!
//! Membaca satu sequence mulai dari offset tertentu. Lead byte menentukan
//! panjang sequence, continuation byte harus berpola `10xxxxxx`.

use serde::{Deserialize, Serialize};

use super::error::{CodecError, PositionedError};
use super::{is_surrogate, MAX_CODE_POINT};

/// Smallest value each sequence length may carry, indexed by length.
const MIN_FOR_LEN: [u32; 5] = [0, 0, 0x80, 0x800, 0x10000];

/// How far the decoder goes beyond the structural checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conformance {
    /// Also reject overlong forms, surrogates and values above U+10FFFF.
    #[default]
    Strict,
    /// Only length and continuation-pattern checks.
    Lenient,
}

/// One decoded code point and how many bytes it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub code_point: u32,
    pub consumed: usize,
}

impl Decoded {
    /// `None` for values that are not scalar values (lenient mode only).
    pub fn as_char(&self) -> Option<char> {
        char::from_u32(self.code_point)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoder {
    conformance: Conformance,
}

impl Decoder {
    pub const fn new(conformance: Conformance) -> Self {
        Self { conformance }
    }

    pub const fn strict() -> Self {
        Self::new(Conformance::Strict)
    }

    pub const fn lenient() -> Self {
        Self::new(Conformance::Lenient)
    }

    pub fn conformance(&self) -> Conformance {
        self.conformance
    }

    /// Decode the sequence starting at `offset`.
    ///
    /// An offset at or past the end is a [`CodecError::TruncatedSequence`]
    /// with nothing available.
    #[inline]
    pub fn decode(&self, bytes: &[u8], offset: usize) -> Result<Decoded, CodecError> {
        let rest = bytes.get(offset..).unwrap_or(&[]);
        let Some(&lead) = rest.first() else {
            return Err(CodecError::TruncatedSequence {
                expected: 1,
                available: 0,
            });
        };

        let (len, lead_bits) = match lead {
            0x00..=0x7F => {
                return Ok(Decoded {
                    code_point: lead as u32,
                    consumed: 1,
                })
            }
            0xC0..=0xDF => (2, lead & 0x1F),
            0xE0..=0xEF => (3, lead & 0x0F),
            0xF0..=0xF7 => (4, lead & 0x07),
            // 0x80..=0xBF adalah continuation, 0xF8.. di luar lead-byte space
            _ => return Err(CodecError::InvalidLeadByte { byte: lead }),
        };

        if rest.len() < len {
            return Err(CodecError::TruncatedSequence {
                expected: len,
                available: rest.len(),
            });
        }

        let mut code_point = lead_bits as u32;
        for (i, &byte) in rest[1..len].iter().enumerate() {
            if byte & 0xC0 != 0x80 {
                return Err(CodecError::InvalidContinuationByte {
                    byte,
                    index: i + 1,
                });
            }
            code_point = (code_point << 6) | (byte & 0x3F) as u32;
        }

        if self.conformance == Conformance::Strict {
            check_scalar(code_point, len)?;
        }

        Ok(Decoded {
            code_point,
            consumed: len,
        })
    }

    /// Legacy contract: `(code_point, consumed)` with `consumed == 0` on any
    /// failure.
    #[inline]
    pub fn decode_or_sentinel(&self, bytes: &[u8], offset: usize) -> (u32, usize) {
        match self.decode(bytes, offset) {
            Ok(d) => (d.code_point, d.consumed),
            Err(_) => (0, 0),
        }
    }

    /// Walk `bytes` from the start. Stops after the first error.
    pub fn iter<'a>(&self, bytes: &'a [u8]) -> DecodeIter<'a> {
        DecodeIter {
            decoder: *self,
            bytes,
            pos: 0,
            failed: false,
        }
    }

    /// Decode a whole buffer into code points.
    pub fn decode_all(&self, bytes: &[u8]) -> Result<Vec<u32>, PositionedError> {
        self.iter(bytes).map(|r| r.map(|d| d.code_point)).collect()
    }
}

fn check_scalar(code_point: u32, len: usize) -> Result<(), CodecError> {
    if code_point < MIN_FOR_LEN[len] {
        return Err(CodecError::Overlong { code_point, len });
    }
    if is_surrogate(code_point) {
        return Err(CodecError::Surrogate { code_point });
    }
    if code_point > MAX_CODE_POINT {
        return Err(CodecError::OutOfRange {
            code_point: code_point as i64,
        });
    }
    Ok(())
}

/// Iterator over the sequences of a buffer
pub struct DecodeIter<'a> {
    decoder: Decoder,
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> DecodeIter<'a> {
    /// Offset of the next sequence.
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Remaining bytes
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }
}

impl<'a> Iterator for DecodeIter<'a> {
    type Item = Result<Decoded, PositionedError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }

        match self.decoder.decode(self.bytes, self.pos) {
            Ok(decoded) => {
                self.pos += decoded.consumed;
                Some(Ok(decoded))
            }
            Err(source) => {
                self.failed = true;
                Some(Err(PositionedError {
                    position: self.pos,
                    source,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        let dec = Decoder::strict();
        assert_eq!(
            dec.decode(b"A", 0),
            Ok(Decoded {
                code_point: 0x41,
                consumed: 1
            })
        );
    }

    #[test]
    fn test_multibyte_at_offset() {
        let dec = Decoder::strict();
        let buf = [0x41, 0xE2, 0x82, 0xAC, 0xF0, 0x9F, 0x98, 0x80];
        assert_eq!(dec.decode(&buf, 1).unwrap().code_point, 0x20AC);
        assert_eq!(dec.decode(&buf, 1).unwrap().consumed, 3);
        assert_eq!(dec.decode(&buf, 4).unwrap().code_point, 0x1F600);
        assert_eq!(dec.decode(&buf, 4).unwrap().consumed, 4);
    }

    #[test]
    fn test_invalid_lead_bytes() {
        let dec = Decoder::lenient();
        assert_eq!(
            dec.decode(&[0x80], 0),
            Err(CodecError::InvalidLeadByte { byte: 0x80 })
        );
        assert_eq!(
            dec.decode(&[0xBF, 0x80], 0),
            Err(CodecError::InvalidLeadByte { byte: 0xBF })
        );
        assert_eq!(
            dec.decode(&[0xF8, 0x80, 0x80, 0x80], 0),
            Err(CodecError::InvalidLeadByte { byte: 0xF8 })
        );
        assert_eq!(
            dec.decode(&[0xFF], 0),
            Err(CodecError::InvalidLeadByte { byte: 0xFF })
        );
    }

    #[test]
    fn test_truncated() {
        let dec = Decoder::strict();
        assert_eq!(
            dec.decode(&[0xE0], 0),
            Err(CodecError::TruncatedSequence {
                expected: 3,
                available: 1
            })
        );
        assert_eq!(
            dec.decode(&[0xF0, 0x9F, 0x98], 0),
            Err(CodecError::TruncatedSequence {
                expected: 4,
                available: 3
            })
        );
        assert_eq!(dec.decode_or_sentinel(&[0xE0], 0), (0, 0));
    }

    #[test]
    fn test_offset_past_end() {
        let dec = Decoder::strict();
        assert_eq!(
            dec.decode(b"ab", 2),
            Err(CodecError::TruncatedSequence {
                expected: 1,
                available: 0
            })
        );
        assert!(dec.decode(b"ab", 99).is_err());
        assert!(dec.decode(&[], 0).is_err());
    }

    #[test]
    fn test_bad_continuation() {
        let dec = Decoder::strict();
        assert_eq!(
            dec.decode(&[0xC2, 0x41], 0),
            Err(CodecError::InvalidContinuationByte {
                byte: 0x41,
                index: 1
            })
        );
        assert_eq!(
            dec.decode(&[0xE2, 0x82, 0xC0], 0),
            Err(CodecError::InvalidContinuationByte {
                byte: 0xC0,
                index: 2
            })
        );
    }

    #[test]
    fn test_overlong() {
        // 2-byte form of '/', 3-byte form of U+007F, 4-byte form of U+FFFF
        let strict = Decoder::strict();
        assert_eq!(
            strict.decode(&[0xC0, 0xAF], 0),
            Err(CodecError::Overlong {
                code_point: 0x2F,
                len: 2
            })
        );
        assert!(strict.decode(&[0xE0, 0x81, 0xBF], 0).is_err());
        assert!(strict.decode(&[0xF0, 0x8F, 0xBF, 0xBF], 0).is_err());

        let lenient = Decoder::lenient();
        assert_eq!(
            lenient.decode(&[0xC0, 0xAF], 0),
            Ok(Decoded {
                code_point: 0x2F,
                consumed: 2
            })
        );
    }

    #[test]
    fn test_surrogate_and_above_max() {
        let strict = Decoder::strict();
        assert_eq!(
            strict.decode(&[0xED, 0xA0, 0x80], 0),
            Err(CodecError::Surrogate { code_point: 0xD800 })
        );
        assert_eq!(
            strict.decode(&[0xF4, 0x90, 0x80, 0x80], 0),
            Err(CodecError::OutOfRange {
                code_point: 0x110000
            })
        );

        let lenient = Decoder::lenient();
        assert_eq!(
            lenient.decode(&[0xF7, 0xBF, 0xBF, 0xBF], 0).unwrap().code_point,
            0x1FFFFF
        );
        assert_eq!(
            lenient.decode(&[0xED, 0xA0, 0x80], 0).unwrap().as_char(),
            None
        );
    }

    #[test]
    fn test_iter_walk() {
        let dec = Decoder::strict();
        let buf = "A€😀".as_bytes();
        let mut iter = dec.iter(buf);
        assert_eq!(iter.next().unwrap().unwrap().code_point, 0x41);
        assert_eq!(iter.position(), 1);
        assert_eq!(iter.next().unwrap().unwrap().code_point, 0x20AC);
        assert_eq!(iter.next().unwrap().unwrap().code_point, 0x1F600);
        assert_eq!(iter.remaining(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_iter_stops_after_error() {
        let dec = Decoder::strict();
        let buf = [0x41, 0x80, 0x42];
        let items: Vec<_> = dec.iter(&buf).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            Err(PositionedError {
                position: 1,
                source: CodecError::InvalidLeadByte { byte: 0x80 }
            })
        );
        assert_eq!(dec.decode_all(&buf).unwrap_err().position, 1);
    }
}
