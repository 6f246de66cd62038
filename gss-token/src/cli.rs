use libgsstoken::{Mode, Options};

xflags::xflags! {
    /// Write the first token of a new gssapi security context as base64,
    /// or read such tokens from stdin, accept them, and print who
    /// authenticated.
    cmd gss-token {
        /// Read tokens from stdin and accept them.
        optional -r, --read
        /// Write and expect tokens framed as an HTTP "Negotiate" header value.
        optional -N, --negotiate
        /// Print nothing on success.
        optional -n, --quiet
        /// With --read, keep reading batches of tokens until end of input.
        optional -l, --repeat
        /// How many tokens to write, or read per batch.
        optional -c, --count count: usize
        /// Hostbased service name, e.g. HTTP@www.example.com. Required
        /// unless reading.
        optional service: String
    }
}

impl From<GssToken> for Options {
    fn from(flags: GssToken) -> Options {
        Options {
            mode: if flags.read { Mode::Accept } else { Mode::Initiate },
            negotiate: flags.negotiate,
            quiet: flags.quiet,
            count: flags.count.unwrap_or(1),
            repeat: flags.repeat,
            service: flags.service,
        }
    }
}
