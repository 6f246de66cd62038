//! The token exchange. One side creates security contexts and writes
//! out their first token, the other reads tokens back in, accepts them,
//! and reports who authenticated.
use crate::{
    base64,
    config::{Mode, Options},
    error::Error,
    negotiate,
    reader::TokenReader,
};
use log::{debug, trace};
use std::io::{BufRead, Write};

/// The largest decoded token accepted.
pub const MAX_TOKEN: usize = 65536;

/// The security mechanism behind the exchange. Implementations own the
/// target or acceptor name they were configured with.
pub trait SecurityProvider {
    /// Create a new initiator context and return its first token.
    fn initiate(&mut self) -> Result<Vec<u8>, Error>;

    /// Accept an initiator token with a new acceptor context, returning
    /// the display name of the authenticated initiator.
    fn accept(&mut self, token: &[u8]) -> Result<String, Error>;
}

/// Write `opts.count` tokens, one per line, separated by empty lines.
pub fn write_tokens<P, W>(provider: &mut P, opts: &Options, out: &mut W) -> Result<(), Error>
where
    P: SecurityProvider + ?Sized,
    W: Write,
{
    for i in 0..opts.count {
        let token = provider.initiate()?;
        debug!("initiated context {}, token is {} bytes", i, token.len());
        let line = negotiate::format_token(&token, opts.negotiate)?;
        if !opts.quiet {
            writeln!(out, "{}", line)?;
        }
        if i + 1 < opts.count {
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn read_one<P, R, W>(
    provider: &mut P,
    opts: &Options,
    reader: &mut TokenReader<R>,
    out: &mut W,
) -> Result<(), Error>
where
    P: SecurityProvider + ?Sized,
    R: BufRead,
    W: Write,
{
    let line = match reader.read_token()? {
        Some(line) => line,
        None => {
            trace!("no token to read");
            return Ok(());
        }
    };
    let encoded = negotiate::strip_prefix(&line, opts.negotiate)?.trim();
    if encoded.is_empty() {
        trace!("empty token");
        return Ok(());
    }
    let mut buf = vec![0u8; MAX_TOKEN];
    let len = base64::decode_into(encoded.as_bytes(), &mut buf)?;
    debug!("read a {} byte token", len);
    let name = provider.accept(&buf[..len])?;
    if !opts.quiet {
        writeln!(out, "Authenticated: {}", name)?;
        out.flush()?;
    }
    Ok(())
}

/// Read and accept up to `opts.count` tokens. With `opts.repeat` this
/// continues batch after batch until the input runs out.
pub fn read_tokens<P, R, W>(
    provider: &mut P,
    opts: &Options,
    reader: &mut TokenReader<R>,
    out: &mut W,
) -> Result<(), Error>
where
    P: SecurityProvider + ?Sized,
    R: BufRead,
    W: Write,
{
    if opts.count == 0 {
        return Ok(());
    }
    loop {
        for _ in 0..opts.count {
            read_one(provider, opts, reader, out)?;
        }
        if !opts.repeat || reader.is_eof() {
            break;
        }
    }
    Ok(())
}

/// Validate `opts` and run the exchange it describes. `input` is only
/// read in accept mode.
pub fn run<P, R, W>(provider: &mut P, opts: &Options, input: R, out: &mut W) -> Result<(), Error>
where
    P: SecurityProvider + ?Sized,
    R: BufRead,
    W: Write,
{
    opts.validate()?;
    match opts.mode {
        Mode::Initiate => write_tokens(provider, opts, out),
        Mode::Accept => read_tokens(provider, opts, &mut TokenReader::new(input), out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[derive(Default)]
    struct Fake {
        initiated: usize,
        accepted: Vec<Vec<u8>>,
    }

    impl SecurityProvider for Fake {
        fn initiate(&mut self) -> Result<Vec<u8>, Error> {
            self.initiated += 1;
            Ok(b"foobar".to_vec())
        }

        fn accept(&mut self, token: &[u8]) -> Result<String, Error> {
            if token == b"bad" {
                return Err(Error::gss_status(
                    "gss_accept_sec_context",
                    9 << 16,
                    0,
                    "gssapi major error Defective token detected",
                ));
            }
            self.accepted.push(token.to_vec());
            Ok("user@EXAMPLE.COM".into())
        }
    }

    fn initiate_opts() -> Options {
        Options {
            service: Some("HTTP@www.example.com".into()),
            ..Options::default()
        }
    }

    fn accept_opts() -> Options {
        Options {
            mode: Mode::Accept,
            ..Options::default()
        }
    }

    fn run_accept(opts: &Options, input: &str, fake: &mut Fake) -> Result<String, Error> {
        let mut out = Vec::new();
        run(fake, opts, Cursor::new(input.as_bytes().to_vec()), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn writes_one_token() {
        let mut fake = Fake::default();
        let mut out = Vec::new();
        run(&mut fake, &initiate_opts(), Cursor::new(Vec::new()), &mut out).unwrap();
        assert_eq!(out, b"Zm9vYmFy\n");
        assert_eq!(fake.initiated, 1);
    }

    #[test]
    fn writes_negotiate_tokens_separated_by_blank_lines() {
        let mut fake = Fake::default();
        let opts = Options {
            negotiate: true,
            count: 3,
            ..initiate_opts()
        };
        let mut out = Vec::new();
        write_tokens(&mut fake, &opts, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Negotiate Zm9vYmFy\n\nNegotiate Zm9vYmFy\n\nNegotiate Zm9vYmFy\n"
        );
        assert_eq!(fake.initiated, 3);
    }

    #[test]
    fn quiet_initiate_still_creates_contexts() {
        let mut fake = Fake::default();
        let opts = Options {
            quiet: true,
            count: 3,
            ..initiate_opts()
        };
        let mut out = Vec::new();
        write_tokens(&mut fake, &opts, &mut out).unwrap();
        // the separators are still written
        assert_eq!(out, b"\n\n");
        assert_eq!(fake.initiated, 3);
    }

    #[test]
    fn quiet_single_token_writes_nothing() {
        let mut fake = Fake::default();
        let opts = Options {
            quiet: true,
            ..initiate_opts()
        };
        let mut out = Vec::new();
        write_tokens(&mut fake, &opts, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn initiate_without_service_is_a_usage_error() {
        let mut fake = Fake::default();
        let mut out = Vec::new();
        let e = run(&mut fake, &Options::default(), Cursor::new(Vec::new()), &mut out)
            .unwrap_err();
        assert!(e.is_usage());
        assert_eq!(fake.initiated, 0);
    }

    #[test]
    fn accepts_a_token() {
        let mut fake = Fake::default();
        let out = run_accept(&accept_opts(), "Zm9vYmFy\n", &mut fake).unwrap();
        assert_eq!(out, "Authenticated: user@EXAMPLE.COM\n");
        assert_eq!(fake.accepted, vec![b"foobar".to_vec()]);
    }

    #[test]
    fn accepts_negotiate_header() {
        let mut fake = Fake::default();
        let opts = Options {
            negotiate: true,
            ..accept_opts()
        };
        run_accept(&opts, "negotiate Zm9vYmFy\n", &mut fake).unwrap();
        assert_eq!(fake.accepted, vec![b"foobar".to_vec()]);
        let e = run_accept(&opts, "Zm9vYmFy\n", &mut fake).unwrap_err();
        assert!(matches!(e, Error::MissingNegotiatePrefix));
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let mut fake = Fake::default();
        assert_eq!(run_accept(&accept_opts(), "", &mut fake).unwrap(), "");
        assert_eq!(run_accept(&accept_opts(), "\n\n", &mut fake).unwrap(), "");
        assert!(fake.accepted.is_empty());
    }

    #[test]
    fn empty_token_is_not_accepted() {
        let mut fake = Fake::default();
        let opts = Options {
            negotiate: true,
            ..accept_opts()
        };
        assert_eq!(run_accept(&opts, "Negotiate \n", &mut fake).unwrap(), "");
        assert_eq!(run_accept(&accept_opts(), "   \n", &mut fake).unwrap(), "");
        let opts = Options {
            repeat: true,
            ..accept_opts()
        };
        let out = run_accept(&opts, " \t\n\nZg==\n", &mut fake).unwrap();
        assert_eq!(out, "Authenticated: user@EXAMPLE.COM\n");
        assert_eq!(fake.accepted, vec![b"f".to_vec()]);
    }

    #[test]
    fn reads_only_count_tokens_without_repeat() {
        let mut fake = Fake::default();
        let opts = Options {
            count: 2,
            ..accept_opts()
        };
        run_accept(&opts, "Zg==\n\nZm8=\n\nZm9v\n", &mut fake).unwrap();
        assert_eq!(fake.accepted, vec![b"f".to_vec(), b"fo".to_vec()]);
    }

    #[test]
    fn repeat_reads_until_eof() {
        let mut fake = Fake::default();
        let opts = Options {
            repeat: true,
            ..accept_opts()
        };
        let out = run_accept(&opts, "Zg==\n\nZm8=\n\nZm9v\n", &mut fake).unwrap();
        assert_eq!(fake.accepted.len(), 3);
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn repeat_stops_at_first_failure() {
        let mut fake = Fake::default();
        let opts = Options {
            repeat: true,
            ..accept_opts()
        };
        // "YmFk" is "bad"
        let e = run_accept(&opts, "Zg==\n\nYmFk\n\nZm9v\n", &mut fake).unwrap_err();
        assert_eq!(
            e.to_string(),
            "gss_accept_sec_context: Defective token detected"
        );
        assert_eq!(fake.accepted, vec![b"f".to_vec()]);
    }

    #[test]
    fn undecodable_token_fails_before_accept() {
        let mut fake = Fake::default();
        let e = run_accept(&accept_opts(), "Zm9v!mFy\n", &mut fake).unwrap_err();
        assert!(matches!(
            e,
            Error::Decode(base64::DecodeError::InvalidSymbol { byte: b'!', offset: 4 })
        ));
        assert!(fake.accepted.is_empty());
    }

    #[test]
    fn oversized_token_is_rejected() {
        let mut fake = Fake::default();
        // 48 bytes a line, so this is just over MAX_TOKEN
        let line = "A".repeat(64);
        let input = vec![line; MAX_TOKEN / 48 + 1].join("\n");
        let e = run_accept(&accept_opts(), &input, &mut fake).unwrap_err();
        assert!(matches!(
            e,
            Error::Decode(base64::DecodeError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn zero_count_with_repeat_terminates() {
        let mut fake = Fake::default();
        let opts = Options {
            count: 0,
            repeat: true,
            ..accept_opts()
        };
        assert_eq!(run_accept(&opts, "Zg==\n", &mut fake).unwrap(), "");
    }
}
