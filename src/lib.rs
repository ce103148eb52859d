//! utfplay - UTF-8 Encoder/Decoder
//!
//! Arsitektur:
//! - `codec`: encode/decode satu code point, stateless, tanpa I/O
//! - `service`: operasi untuk satu string / satu buffer utuh
//! - `shell`: mode interaktif berbasis baris
//! - `network`: HTTP server (mio) dengan JSON endpoint

pub mod codec;
pub mod config;
pub mod network;
pub mod service;
pub mod shell;

pub use codec::{decode, decode_or_sentinel, encode, CodecError, Decoded, Decoder, Encoder};
