use crate::error::Error;
use log::trace;
use std::io::{BufRead, Read};

/// The longest line accepted, not counting the line terminator.
pub const MAX_LINE: usize = 65535;

/// Reads tokens from a line oriented stream. A token is one or more
/// non empty lines, concatenated, ended by an empty line or end of
/// input. This is how tokens wrapped by a mail client or pasted into a
/// terminal usually arrive.
#[derive(Debug)]
pub struct TokenReader<R> {
    inner: R,
    eof: bool,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(inner: R) -> TokenReader<R> {
        TokenReader { inner, eof: false }
    }

    /// true once the underlying stream has been read to the end
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    fn read_line(&mut self) -> Result<Option<String>, Error> {
        if self.eof {
            return Ok(None);
        }
        let mut buf = Vec::new();
        let limit = (MAX_LINE + 2) as u64;
        let n = self.inner.by_ref().take(limit).read_until(b'\n', &mut buf)?;
        if n == 0 {
            self.eof = true;
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else if n as u64 == limit {
            return Err(Error::LineTooLong);
        } else {
            // last line, missing its terminator
            self.eof = true;
        }
        if buf.len() > MAX_LINE {
            return Err(Error::LineTooLong);
        }
        trace!("read a {} byte line", buf.len());
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Read the next token. `None` means there was nothing to read,
    /// either because the stream ended or because an empty line came
    /// first. Neither is an error.
    pub fn read_token(&mut self) -> Result<Option<String>, Error> {
        let mut token = String::new();
        while let Some(line) = self.read_line()? {
            if line.is_empty() {
                break;
            }
            token.push_str(&line);
        }
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token))
        }
    }
}
