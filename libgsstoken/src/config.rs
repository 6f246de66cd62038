use crate::error::Error;
use log::warn;

pub const USAGE: &str = "usage: gss-token [-Nn] [-c count] service@host\n       \
                         gss-token -r [-Nln] [-c count] [service@host]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// create security contexts and write their first token
    Initiate,
    /// read tokens and accept them
    Accept,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    /// frame tokens as an HTTP `Negotiate` header value
    pub negotiate: bool,
    /// do the work but print nothing on success
    pub quiet: bool,
    /// tokens per batch
    pub count: usize,
    /// in accept mode, keep reading batches until end of input
    pub repeat: bool,
    /// a hostbased service name, e.g. `HTTP@www.example.com`
    pub service: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            mode: Mode::Initiate,
            negotiate: false,
            quiet: false,
            count: 1,
            repeat: false,
            service: None,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), Error> {
        match self.mode {
            Mode::Initiate if self.service.is_none() => Err(Error::Usage(
                "Without -r, hostbased_service must be provided.".into(),
            )),
            Mode::Initiate => {
                if self.repeat {
                    warn!("-l only applies when reading tokens, ignoring it");
                }
                Ok(())
            }
            Mode::Accept => Ok(()),
        }
    }
}
