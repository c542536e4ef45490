// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

#![forbid(non_camel_case_types)]

//! XML-RPC codec: encoding method calls and decoding responses.
//!
//! Basic documentation found on Wikipedia
//! http://en.wikipedia.org/wiki/XML-RPC
//!
//! Full specification of the XML-RPC protocol is found here:
//! http://xmlrpc.scripting.com/spec.html
//!
//! The `ex:` extension types (`ex:i1`, `ex:i2`, `ex:i8`, `ex:float`,
//! `ex:nil`) follow the Apache XML-RPC extensions. They are accepted with or
//! without the prefix, and no namespace declaration is required.
//!
//! Envelope elements must be where the protocol puts them; value literals
//! are read leniently (see `Value::from_literal`).

pub use self::encoding::{decode, decode_request, decode_response, encode, encode_fault, encode_response};
pub use self::protocol::{Fault, MethodResponse, Request, Response};

pub mod encoding;
pub mod protocol;
