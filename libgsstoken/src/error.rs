use crate::base64::{DecodeError, EncodeError};
use std::{error, fmt, io};

#[derive(Debug)]
pub enum Error {
    Encode(EncodeError),
    Decode(DecodeError),
    /// an input line didn't fit in the line buffer
    LineTooLong,
    MissingNegotiatePrefix,
    Usage(String),
    /// a gssapi call failed, `message` holds the status messages
    Gss {
        call: &'static str,
        message: String,
    },
    Io(io::Error),
}

/// `GSS_S_FAILURE`, the routine error that only says to look at the
/// minor status.
pub const GSS_S_FAILURE: u32 = 13 << 16;

const GSS_C_ROUTINE_ERROR_MASK: u32 = 0xff << 16;

fn join_status<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_minor_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("gssapi minor") || line.starts_with("gssapi unknown minor")
}

fn strip_status_label(line: &str) -> &str {
    let line = line.trim();
    ["gssapi major error ", "gssapi minor error "]
        .iter()
        .find_map(|label| line.strip_prefix(label))
        .unwrap_or(line)
}

impl Error {
    /// Build the error for a failed gssapi `call` from its `major` and
    /// `minor` status codes and their displayed messages, one per line,
    /// labelled `gssapi major error` or `gssapi minor error`. The
    /// messages kept are joined as
    ///
    /// `gss_accept_sec_context: <message>, <message>`
    ///
    /// When the routine error is `GSS_S_FAILURE` the major message says
    /// nothing useful and is left out in favour of the mechanism
    /// message. A zero minor status has no message worth showing.
    pub fn gss_status(
        call: &'static str,
        major: u32,
        minor: u32,
        detail: impl fmt::Display,
    ) -> Error {
        let detail = detail.to_string();
        let skip_major = (major & GSS_C_ROUTINE_ERROR_MASK) == GSS_S_FAILURE && minor != 0;
        let message = join_status(
            detail
                .lines()
                .filter(|l| if is_minor_line(l) { minor != 0 } else { !skip_major })
                .map(strip_status_label),
        );
        Error::Gss { call, message }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Encode(e) => write!(f, "{}", e),
            Error::Decode(e) => write!(f, "{}", e),
            Error::LineTooLong => write!(f, "Long line, exiting."),
            Error::MissingNegotiatePrefix => {
                write!(f, "Token doesn't begin with \"Negotiate \"")
            }
            Error::Usage(msg) => write!(f, "{}", msg),
            Error::Gss { call, message } if message.is_empty() => write!(f, "{}", call),
            Error::Gss { call, message } => write!(f, "{}: {}", call, message),
            Error::Io(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Encode(e) => Some(e),
            Error::Decode(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::LineTooLong
            | Error::MissingNegotiatePrefix
            | Error::Usage(_)
            | Error::Gss { .. } => None,
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Error::Encode(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
