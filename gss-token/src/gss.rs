use libgssapi::{
    context::{ClientCtx, CtxFlags, SecurityContext, ServerCtx},
    credential::{Cred, CredUsage},
    name::Name,
    oid::GSS_NT_HOSTBASED_SERVICE,
};
use libgsstoken::{Error, SecurityProvider};
use log::debug;

fn failure(call: &'static str, e: libgssapi::error::Error) -> Error {
    Error::gss_status(call, e.major.bits(), e.minor, e)
}

/// A `SecurityProvider` backed by the system gssapi library, using
/// the default mechanism and credentials.
pub struct Gss {
    service: Option<Name>,
}

impl Gss {
    /// Import `service` as a hostbased service name, e.g.
    /// `HTTP@www.example.com`.
    pub fn new(service: Option<&str>) -> Result<Gss, Error> {
        let service = match service {
            None => None,
            Some(s) => {
                let name = Name::new(s.as_bytes(), Some(&GSS_NT_HOSTBASED_SERVICE))
                    .map_err(|e| failure("gss_import_name", e))?;
                debug!("imported service name {}", name);
                Some(name)
            }
        };
        Ok(Gss { service })
    }
}

impl SecurityProvider for Gss {
    fn initiate(&mut self) -> Result<Vec<u8>, Error> {
        let target = match self.service {
            Some(ref name) => name
                .duplicate()
                .map_err(|e| failure("gss_duplicate_name", e))?,
            None => {
                return Err(Error::Usage(
                    "Without -r, hostbased_service must be provided.".into(),
                ))
            }
        };
        // only the first token is wanted, so the context is dropped
        // (and deleted) even if it would continue
        let mut ctx = ClientCtx::new(None, target, CtxFlags::empty(), None);
        let token = ctx
            .step(None, None)
            .map_err(|e| failure("gss_init_sec_context", e))?;
        Ok(token.map(|t| t.to_vec()).unwrap_or_default())
    }

    fn accept(&mut self, token: &[u8]) -> Result<String, Error> {
        let cred = match self.service {
            None => None,
            Some(ref name) => Some(
                Cred::acquire(Some(name), None, CredUsage::Accept, None)
                    .map_err(|e| failure("gss_acquire_cred", e))?,
            ),
        };
        let mut ctx = ServerCtx::new(cred);
        if let Some(reply) = ctx
            .step(token)
            .map_err(|e| failure("gss_accept_sec_context", e))?
        {
            debug!("ignoring a {} byte reply token", reply.len());
        }
        let client = ctx
            .source_name()
            .map_err(|e| failure("gss_inquire_context", e))?;
        let name = client
            .display_name()
            .map_err(|e| failure("gss_display_name", e))?;
        Ok(String::from_utf8_lossy(&name).into_owned())
    }
}
