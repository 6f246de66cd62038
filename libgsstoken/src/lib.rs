//! Tools for moving gssapi context tokens around as text.
//!
//! Tokens are opaque binary blobs produced and consumed by a security
//! mechanism (usually Kerberos 5 or SPNEGO). This crate carries them
//! as standard base64, optionally as the value of an HTTP `Negotiate`
//! authorization header, and drives a simple exchange: write the first
//! token of a new initiator context, or read tokens and accept them.
//! The mechanism itself sits behind the `SecurityProvider` trait.
//!
//! ```
//! use libgsstoken::base64;
//!
//! let encoded = base64::encode(b"foobar").unwrap();
//! assert_eq!(encoded, "Zm9vYmFy");
//! assert_eq!(&base64::decode(encoded.as_bytes()).unwrap()[..], b"foobar");
//! ```
pub mod base64;
pub mod config;
pub mod error;
pub mod negotiate;
pub mod reader;
pub mod session;

pub use config::{Mode, Options};
pub use error::Error;
pub use session::SecurityProvider;
