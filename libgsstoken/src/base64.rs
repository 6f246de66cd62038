//! Standard base64 (RFC 1421/2045 alphabet, `=` padded) for context
//! tokens.
//!
//! The codec is a pair of pure functions over caller owned buffers. It
//! keeps no state apart from the decode table, which is built once and
//! never changes, so it can be called from any number of threads.
use bytes::BytesMut;
use lazy_static::lazy_static;
use std::{error, ffi::CStr, fmt};

/// Translation table from RFC 1113
pub const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

pub const PAD: u8 = b'=';

const INVALID: u8 = 0xff;

lazy_static! {
    static ref DECODE: [u8; 256] = {
        let mut table = [INVALID; 256];
        for (i, c) in ALPHABET.iter().enumerate() {
            table[*c as usize] = i as u8;
        }
        table
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// the output string for an input of this many bytes could not be
    /// allocated
    OutOfMemory { input_len: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::OutOfMemory { input_len } => {
                write!(f, "out of memory encoding {} bytes", input_len)
            }
        }
    }
}

impl error::Error for EncodeError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// the input is not made of whole 4 symbol groups
    InvalidLength(usize),
    /// a byte outside the alphabet
    InvalidSymbol { byte: u8, offset: usize },
    /// a pad character outside the trailing pad run, or more than two
    /// of them
    InvalidPadding { offset: usize },
    /// the output buffer can't hold `needed` bytes
    BufferTooSmall { needed: usize, capacity: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidLength(len) => {
                write!(f, "base64 input length {} is not a multiple of 4", len)
            }
            DecodeError::InvalidSymbol { byte, offset } => {
                write!(f, "invalid base64 symbol 0x{:02x} at offset {}", byte, offset)
            }
            DecodeError::InvalidPadding { offset } => {
                write!(f, "misplaced base64 padding at offset {}", offset)
            }
            DecodeError::BufferTooSmall { needed, capacity } => write!(
                f,
                "base64 output needs {} bytes but the buffer holds {}",
                needed, capacity
            ),
        }
    }
}

impl error::Error for DecodeError {}

/// The length of the encoding of `len` input bytes, or `None` if it
/// doesn't fit in a `usize`.
pub fn encoded_len(len: usize) -> Option<usize> {
    let groups = len / 3 + if len % 3 > 0 { 1 } else { 0 };
    groups.checked_mul(4)
}

/// The output capacity `decode_into` requires for `len` input
/// bytes. Every group is written in full before the padding is taken
/// off, so this is 3 bytes per group even when the result is shorter.
pub fn decoded_capacity(len: usize) -> usize {
    len / 4 * 3
}

fn symbol(bits: u8) -> char {
    ALPHABET[(bits & 0x3f) as usize] as char
}

/// Encode `input`. The result is always `encoded_len(input.len())`
/// characters long; padding only ever appears in the last group.
pub fn encode(input: &[u8]) -> Result<String, EncodeError> {
    let oom = EncodeError::OutOfMemory { input_len: input.len() };
    let len = encoded_len(input.len()).ok_or(oom)?;
    let mut out = String::new();
    out.try_reserve_exact(len).map_err(|_| oom)?;
    for group in input.chunks(3) {
        let b0 = group[0];
        let b1 = group.get(1).copied().unwrap_or(0);
        let b2 = group.get(2).copied().unwrap_or(0);
        out.push(symbol(b0 >> 2));
        out.push(symbol((b0 & 0x03) << 4 | b1 >> 4));
        if group.len() > 1 {
            out.push(symbol((b1 & 0x0f) << 2 | b2 >> 6));
        } else {
            out.push(PAD as char);
        }
        if group.len() > 2 {
            out.push(symbol(b2));
        } else {
            out.push(PAD as char);
        }
    }
    Ok(out)
}

/// Encode the bytes of a nul terminated string, not including the
/// terminator.
pub fn encode_c_str(s: &CStr) -> Result<String, EncodeError> {
    encode(s.to_bytes())
}

/// Decode `input` into `out`, returning the number of bytes
/// written. Whitespace is not skipped, strip it first.
///
/// On error `out` may hold the groups decoded before the failure.
pub fn decode_into(input: &[u8], out: &mut [u8]) -> Result<usize, DecodeError> {
    if input.len() % 4 != 0 {
        return Err(DecodeError::InvalidLength(input.len()));
    }
    let pad = input.iter().rev().take_while(|b| **b == PAD).count();
    if pad > 2 {
        return Err(DecodeError::InvalidPadding {
            offset: input.len() - pad,
        });
    }
    let body = input.len() - pad;
    let needed = decoded_capacity(input.len());
    let lookup = |offset: usize| -> Result<u8, DecodeError> {
        if offset >= body {
            return Ok(0);
        }
        let byte = input[offset];
        match DECODE[byte as usize] {
            INVALID if byte == PAD => Err(DecodeError::InvalidPadding { offset }),
            INVALID => Err(DecodeError::InvalidSymbol { byte, offset }),
            v => Ok(v),
        }
    };
    let mut written = 0;
    for start in (0..input.len()).step_by(4) {
        if written + 3 > out.len() {
            return Err(DecodeError::BufferTooSmall {
                needed,
                capacity: out.len(),
            });
        }
        let v0 = lookup(start)?;
        let v1 = lookup(start + 1)?;
        let v2 = lookup(start + 2)?;
        let v3 = lookup(start + 3)?;
        out[written] = v0 << 2 | v1 >> 4;
        out[written + 1] = v1 << 4 | v2 >> 2;
        out[written + 2] = v2 << 6 | v3;
        written += 3;
    }
    // pad > 0 implies at least one full group was written
    Ok(written - pad)
}

/// Decode `input` into a newly allocated buffer.
pub fn decode(input: &[u8]) -> Result<bytes::Bytes, DecodeError> {
    let mut buf = BytesMut::zeroed(decoded_capacity(input.len()));
    let len = decode_into(input, &mut buf)?;
    buf.truncate(len);
    Ok(buf.freeze())
}
