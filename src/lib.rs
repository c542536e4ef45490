//! Codecs for dynamically-typed RPC values.
//!
//! `xmlrpc` encodes method calls and decodes `<methodResponse>` (and
//! `<methodCall>`) documents; `jsonrpc` decodes and encodes the JSON request
//! form. Both share the `Value` model.

#[macro_use]
extern crate log;

pub mod error;
pub mod jsonrpc;
pub mod value;
pub mod xmlrpc;

pub use crate::error::{DecodeResult, DecoderError, ErrorCode};
pub use crate::value::{Member, Tag, Value};
