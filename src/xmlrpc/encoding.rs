// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use crate::error::DecoderError::SyntaxError;
use crate::error::ErrorCode::*;
use crate::error::{DecodeResult, DecoderError};

use std::fmt;

use quick_xml::escape::partial_escape;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::value::{Member, Rendered, Struct, Tag, Value};
use crate::xmlrpc::protocol::{Fault, MethodResponse};

pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

pub type EncodeResult = fmt::Result;

/// Encodes a `<methodCall>` document. The `<params>` element is left out
/// when `values` is empty.
pub fn encode(method: &str, values: &[Value]) -> Vec<u8> {
    let mut s = String::new();
    {
        let mut encoder = Encoder::new(&mut s);
        let _ = encoder.emit_request(method, values);
    }
    trace!("XMLRPC request body: {}", s);
    s.into_bytes()
}

/// Encodes a successful `<methodResponse>` carrying one value.
pub fn encode_response(value: &Value) -> Vec<u8> {
    let mut s = String::new();
    {
        let mut encoder = Encoder::new(&mut s);
        let _ = encoder.emit_response(value);
    }
    s.into_bytes()
}

/// Encodes a `<methodResponse>` carrying a `<fault>`.
pub fn encode_fault(fault: &Fault) -> Vec<u8> {
    let mut s = String::new();
    {
        let mut encoder = Encoder::new(&mut s);
        let _ = encoder.emit_fault(fault);
    }
    s.into_bytes()
}

/// Decodes a `<methodResponse>` into its values. A fault is returned as its
/// single struct value.
pub fn decode(src: &[u8]) -> DecodeResult<Vec<Value>> {
    decode_response(src).map(MethodResponse::into_values)
}

pub fn decode_response(src: &[u8]) -> DecodeResult<MethodResponse> {
    debug!("Decoding XMLRPC response ({} bytes)", src.len());
    trace!("XMLRPC response body: {}", String::from_utf8_lossy(src));
    Builder::new(src).build_response()
}

/// Decodes a `<methodCall>` into its method name and parameters.
pub fn decode_request(src: &[u8]) -> DecodeResult<(String, Vec<Value>)> {
    debug!("Decoding XMLRPC request ({} bytes)", src.len());
    trace!("XMLRPC request body: {}", String::from_utf8_lossy(src));
    Builder::new(src).build_request()
}

fn escape_str(wr: &mut dyn fmt::Write, v: &str) -> fmt::Result {
    wr.write_str(&partial_escape(v))
}

/// A structure for implementing serialization to XML-RPC.
pub struct Encoder<'a> {
    writer: &'a mut (dyn fmt::Write + 'a),
}

impl<'a> Encoder<'a> {
    /// Creates a new XML-RPC encoder whose output will be written to the writer
    /// specified.
    pub fn new(writer: &'a mut dyn fmt::Write) -> Encoder<'a> {
        Encoder { writer }
    }

    pub fn emit_request(&mut self, method: &str, values: &[Value]) -> EncodeResult {
        self.writer.write_str(XML_HEADER)?;
        self.writer.write_str("<methodCall><methodName>")?;
        escape_str(self.writer, method)?;
        self.writer.write_str("</methodName>")?;
        self.emit_params(values)?;
        self.writer.write_str("</methodCall>")
    }

    pub fn emit_response(&mut self, value: &Value) -> EncodeResult {
        self.writer.write_str(XML_HEADER)?;
        self.writer.write_str("<methodResponse>")?;
        self.emit_params(std::slice::from_ref(value))?;
        self.writer.write_str("</methodResponse>")
    }

    pub fn emit_fault(&mut self, fault: &Fault) -> EncodeResult {
        self.writer.write_str(XML_HEADER)?;
        self.writer.write_str("<methodResponse><fault>")?;
        self.emit_value(&fault.to_value())?;
        self.writer.write_str("</fault></methodResponse>")
    }

    pub fn emit_params(&mut self, values: &[Value]) -> EncodeResult {
        if values.is_empty() {
            return Ok(());
        }
        self.writer.write_str("<params>")?;
        for value in values {
            self.writer.write_str("<param>")?;
            self.emit_value(value)?;
            self.writer.write_str("</param>")?;
        }
        self.writer.write_str("</params>")
    }

    pub fn emit_value(&mut self, value: &Value) -> EncodeResult {
        self.writer.write_str("<value>")?;
        match value.render() {
            (name, Rendered::Literal(text)) => {
                write!(self.writer, "<{}>", name)?;
                escape_str(self.writer, &text)?;
                write!(self.writer, "</{}>", name)?;
            }
            (name, Rendered::Empty) => write!(self.writer, "<{}/>", name)?,
            (_, Rendered::Array(values)) => {
                self.writer.write_str("<array><data>")?;
                for v in values {
                    self.emit_value(v)?;
                }
                self.writer.write_str("</data></array>")?;
            }
            (_, Rendered::Struct(members)) => {
                self.writer.write_str("<struct>")?;
                for member in members {
                    self.emit_member(member)?;
                }
                self.writer.write_str("</struct>")?;
            }
        }
        self.writer.write_str("</value>")
    }

    fn emit_member(&mut self, member: &Member) -> EncodeResult {
        self.writer.write_str("<member><name>")?;
        escape_str(self.writer, &member.name)?;
        self.writer.write_str("</name>")?;
        self.emit_value(&member.value)?;
        self.writer.write_str("</member>")
    }
}

impl fmt::Display for Value {
    /// Encodes the value as its `<value>` element.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Encoder::new(f).emit_value(self)
    }
}

/// One step of the XML token stream.
#[derive(PartialEq, Clone, Debug)]
enum Token {
    Start(String),
    End(String),
    Text(String),
    Eof,
}

fn element_name(name: QName) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn malformed<S: Into<String>>(msg: S) -> DecoderError {
    SyntaxError(MalformedEnvelope, msg.into())
}

fn syntax_error_for_token(token: &Token, expected: &str) -> DecoderError {
    match *token {
        Token::Eof => SyntaxError(EOFWhileParsingValue, format!("expected {}", expected)),
        ref token => SyntaxError(UnexpectedElement, format!("expected {}, got {:?}", expected, token)),
    }
}

/// Deepest array/struct nesting accepted, the same bound serde_json puts on
/// JSON documents.
pub const MAX_DEPTH: usize = 128;

/// Recursive-descent decoder over a quick-xml token stream. The reader is
/// the only cursor; nothing is shared between calls.
struct Builder<'a> {
    reader: Reader<&'a [u8]>,
    /// Arrays and structs currently open.
    depth: usize,
}

impl<'a> Builder<'a> {
    fn new(src: &'a [u8]) -> Builder<'a> {
        let mut reader = Reader::from_reader(src);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;
        config.check_end_names = true;
        Builder { reader, depth: 0 }
    }

    fn next_token(&mut self) -> DecodeResult<Token> {
        loop {
            let token = match self.reader.read_event()? {
                Event::Start(e) => Token::Start(element_name(e.name())),
                Event::End(e) => Token::End(element_name(e.name())),
                Event::Text(e) => Token::Text(e.unescape()?.into_owned()),
                Event::CData(e) => Token::Text(String::from_utf8_lossy(&e).into_owned()),
                Event::Eof => Token::Eof,
                _ => continue,
            };
            return Ok(token);
        }
    }

    /// Next token that is not character data.
    fn next_tag(&mut self) -> DecodeResult<Token> {
        loop {
            match self.next_token()? {
                Token::Text(_) => continue,
                token => return Ok(token),
            }
        }
    }

    /// Skips ahead to the start of `name`. Returns false at end of document.
    fn seek_start(&mut self, name: &str) -> DecodeResult<bool> {
        loop {
            match self.next_token()? {
                Token::Start(ref n) if n == name => return Ok(true),
                Token::Eof => return Ok(false),
                _ => {}
            }
        }
    }

    fn expect_start(&mut self, name: &str) -> DecodeResult<()> {
        match self.next_tag()? {
            Token::Start(ref n) if n == name => Ok(()),
            token => Err(syntax_error_for_token(&token, &format!("<{}>", name))),
        }
    }

    fn expect_end(&mut self, name: &str) -> DecodeResult<()> {
        match self.next_tag()? {
            Token::End(ref n) if n == name => Ok(()),
            token => Err(syntax_error_for_token(&token, &format!("</{}>", name))),
        }
    }

    /// Consumes everything up to and including the end of `name`, whose
    /// start has already been read.
    fn skip_element(&mut self, name: &str) -> DecodeResult<()> {
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::Start(_) => depth += 1,
                Token::End(_) if depth == 0 => return Ok(()),
                Token::End(_) => depth -= 1,
                Token::Text(_) => {}
                Token::Eof => return Err(syntax_error_for_token(&Token::Eof, &format!("</{}>", name))),
            }
        }
    }

    /// Character data up to the end of `name`.
    fn read_literal(&mut self, name: &str) -> DecodeResult<String> {
        let mut literal = String::new();
        loop {
            match self.next_token()? {
                Token::Text(text) => literal.push_str(&text),
                Token::End(_) => return Ok(literal),
                token => return Err(syntax_error_for_token(&token, &format!("</{}>", name))),
            }
        }
    }

    fn build_response(&mut self) -> DecodeResult<MethodResponse> {
        if !self.seek_start("methodResponse")? {
            return Err(malformed("no <methodResponse> element"));
        }

        match self.next_tag()? {
            Token::Start(ref name) if name == "fault" => match self.build_value()? {
                Some(value) => Ok(MethodResponse::Fault(value)),
                None => Err(malformed("<fault> without a value")),
            },
            Token::Start(ref name) if name == "params" => {
                if !self.seek_start("param")? {
                    return Err(malformed("<params> without a <param>"));
                }
                match self.build_value()? {
                    Some(value) => Ok(MethodResponse::Params(vec![value])),
                    None => Err(malformed("<param> without a value")),
                }
            }
            Token::Eof => Err(malformed("no <params> or <fault> element")),
            token => Err(malformed(format!("expected <params> or <fault>, got {:?}", token))),
        }
    }

    fn build_request(&mut self) -> DecodeResult<(String, Vec<Value>)> {
        if !self.seek_start("methodCall")? {
            return Err(malformed("no <methodCall> element"));
        }
        self.expect_start("methodName")?;
        let method = self.read_literal("methodName")?;

        let mut params = Vec::new();
        match self.next_tag()? {
            Token::Start(ref name) if name == "params" => loop {
                match self.next_tag()? {
                    Token::Start(ref name) if name == "param" => {
                        match self.build_value()? {
                            Some(value) => params.push(value),
                            None => return Err(malformed("<param> without a value")),
                        }
                        self.expect_end("param")?;
                    }
                    Token::End(_) => break,
                    token => return Err(syntax_error_for_token(&token, "<param>")),
                }
            },
            Token::End(_) | Token::Eof => {}
            token => return Err(syntax_error_for_token(&token, "<params>")),
        }

        Ok((method, params))
    }

    /// Parses the next `<value>` element.
    ///
    /// Returns None when an end tag (or the end of the document) is reached
    /// before any `<value>` starts, which is how array and member loops learn
    /// there are no more siblings.
    fn build_value(&mut self) -> DecodeResult<Option<Value>> {
        loop {
            match self.next_token()? {
                Token::Start(ref name) if name == "value" => break,
                Token::Start(name) => {
                    debug!("Ignoring <{}> outside of a value", name);
                    self.skip_element(&name)?;
                }
                Token::Text(_) => {}
                Token::End(_) | Token::Eof => return Ok(None),
            }
        }

        // Untyped until a known type element shows up. Bare text is a
        // string; text around a type element is formatting.
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => text.push_str(&t),
                Token::Start(name) => match Tag::from_wire_name(&name) {
                    Some(tag) => {
                        let value = self.build_typed(tag, &name)?;
                        self.finish_value()?;
                        return Ok(Some(value));
                    }
                    None => {
                        debug!("Skipping unknown value type <{}>", name);
                        self.skip_element(&name)?;
                    }
                },
                Token::End(_) | Token::Eof => return Ok(Some(Value::String(text))),
            }
        }
    }

    fn build_typed(&mut self, tag: Tag, name: &str) -> DecodeResult<Value> {
        match tag {
            Tag::Array => self.nested(|b| b.build_array(name)).map(Value::Array),
            Tag::Struct => self.nested(Builder::build_struct).map(Value::Struct),
            _ => {
                let literal = self.read_literal(name)?;
                Ok(Value::from_literal(tag, &literal))
            }
        }
    }

    fn nested<T, F>(&mut self, build: F) -> DecodeResult<T>
    where
        F: FnOnce(&mut Self) -> DecodeResult<T>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(SyntaxError(
                RecursionLimitExceeded,
                format!("more than {} nested arrays or structs", MAX_DEPTH),
            ));
        }
        self.depth += 1;
        let result = build(self);
        self.depth -= 1;
        result
    }

    /// Consumes the `</value>` closing a typed value.
    fn finish_value(&mut self) -> DecodeResult<()> {
        match self.next_tag()? {
            Token::End(_) | Token::Eof => Ok(()),
            token => Err(syntax_error_for_token(&token, "</value>")),
        }
    }

    fn build_array(&mut self, name: &str) -> DecodeResult<Vec<Value>> {
        self.expect_start("data")?;
        let mut values = Vec::new();
        while let Some(value) = self.build_value()? {
            values.push(value);
        }
        match self.next_tag()? {
            Token::End(ref n) if n == name => Ok(values),
            Token::Eof => Err(SyntaxError(EOFWhileParsingArray, format!("expected </{}>", name))),
            token => Err(syntax_error_for_token(&token, &format!("</{}>", name))),
        }
    }

    fn build_struct(&mut self) -> DecodeResult<Struct> {
        let mut members = Vec::new();
        // Some(None) while a <member> is open but has no name/value yet.
        let mut current: Option<Option<Member>> = None;
        loop {
            match self.next_token()? {
                Token::Text(_) => {}
                Token::Start(name) => match name.as_str() {
                    "member" if current.is_none() => current = Some(None),
                    "name" if matches!(current, Some(None)) => {
                        let member_name = self.read_literal("name")?;
                        let value = match self.build_value()? {
                            Some(value) => value,
                            None => {
                                return Err(SyntaxError(
                                    UnhandledStructElement,
                                    format!("member {:?} without a value", member_name),
                                ))
                            }
                        };
                        current = Some(Some(Member { name: member_name, value }));
                    }
                    _ => return Err(SyntaxError(UnhandledStructElement, format!("<{}>", name))),
                },
                Token::End(name) => match (name.as_str(), current.take()) {
                    ("member", Some(Some(member))) => members.push(member),
                    ("struct", None) => return Ok(members),
                    _ => return Err(SyntaxError(UnhandledStructElement, format!("</{}>", name))),
                },
                Token::Eof => {
                    return Err(SyntaxError(EOFWhileParsingObject, "expected </struct>".into()))
                }
            }
        }
    }
}
