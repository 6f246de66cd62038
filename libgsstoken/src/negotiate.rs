//! Framing for the HTTP `Negotiate` authentication scheme (RFC 4559),
//! where a context token travels as `Negotiate <base64>`.
use crate::{base64, error::Error};

pub const PREFIX: &str = "Negotiate ";

/// Encode `token`, prefixing the scheme label if `negotiate` is set.
pub fn format_token(token: &[u8], negotiate: bool) -> Result<String, Error> {
    let encoded = base64::encode(token)?;
    if negotiate {
        let mut s = String::new();
        s.try_reserve_exact(PREFIX.len() + encoded.len()).map_err(|_| {
            base64::EncodeError::OutOfMemory {
                input_len: token.len(),
            }
        })?;
        s.push_str(PREFIX);
        s.push_str(&encoded);
        Ok(s)
    } else {
        Ok(encoded)
    }
}

/// Remove the scheme label from `line`. The label is matched case
/// insensitively. Without `negotiate` the line is returned as is.
pub fn strip_prefix(line: &str, negotiate: bool) -> Result<&str, Error> {
    if !negotiate {
        return Ok(line);
    }
    match line.get(..PREFIX.len()) {
        Some(label) if label.eq_ignore_ascii_case(PREFIX) => Ok(&line[PREFIX.len()..]),
        _ => Err(Error::MissingNegotiatePrefix),
    }
}
