// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use crate::error::DecodeResult;
use crate::jsonrpc;
use crate::value::{Member, Value};
use crate::xmlrpc::encoding;

/// An outbound method call, built one argument at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
}

/// A received response body, kept undecoded until asked for.
#[derive(Debug)]
pub struct Response {
    pub body: Vec<u8>,
}

/// The decoded content of a `<methodResponse>`.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Params(Vec<Value>),
    /// The `<fault>` value, normally a `faultCode`/`faultString` struct.
    Fault(Value),
}

/// An XML-RPC error response.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub code: i32,
    pub string: String,
}

impl Request {
    pub fn new(method: &str) -> Request {
        Request {
            method: method.to_string(),
            params: Vec::new(),
        }
    }

    pub fn argument<T: Into<Value>>(mut self, value: T) -> Request {
        self.params.push(value.into());
        self
    }

    pub fn to_xml(&self) -> Vec<u8> {
        encoding::encode(&self.method, &self.params)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        jsonrpc::encode_request(&self.method, &self.params)
    }

    pub fn from_xml(body: &[u8]) -> DecodeResult<Request> {
        let (method, params) = encoding::decode_request(body)?;
        Ok(Request { method, params })
    }

    pub fn from_json(body: &[u8]) -> DecodeResult<Request> {
        let (method, params) = jsonrpc::decode_request(body)?;
        Ok(Request { method, params })
    }
}

impl Response {
    pub fn new<B: Into<Vec<u8>>>(body: B) -> Response {
        Response { body: body.into() }
    }

    pub fn result(&self) -> DecodeResult<Vec<Value>> {
        encoding::decode(&self.body)
    }

    pub fn parse(&self) -> DecodeResult<MethodResponse> {
        encoding::decode_response(&self.body)
    }
}

impl MethodResponse {
    /// The response values; a fault becomes its single value.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            MethodResponse::Params(values) => values,
            MethodResponse::Fault(value) => vec![value],
        }
    }

    pub fn fault(&self) -> Option<Fault> {
        match *self {
            MethodResponse::Fault(ref value) => Fault::from_value(value),
            MethodResponse::Params(_) => None,
        }
    }
}

impl Fault {
    pub fn new(code: i32, string: &str) -> Fault {
        Fault {
            code,
            string: string.to_string(),
        }
    }

    /// Reads `faultCode` and `faultString` out of a fault struct.
    pub fn from_value(value: &Value) -> Option<Fault> {
        let code = value.find("faultCode")?.as_i32()?;
        let string = value.find("faultString")?.as_str()?;
        Some(Fault::new(code, string))
    }

    pub fn to_value(&self) -> Value {
        Value::Struct(vec![
            Member::new("faultCode", self.code),
            Member::new("faultString", self.string.as_str()),
        ])
    }
}
