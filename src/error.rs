use std::fmt;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type DecodeResult<T> = std::result::Result<T, DecoderError>;

/// Errors surfaced by the `grc` converter.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Decode(#[from] DecoderError),
    #[error("json encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Structural problems found while decoding a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing `methodResponse`/`methodCall`/`params`/`param` anchors.
    MalformedEnvelope,
    UnhandledStructElement,
    UnexpectedElement,
    /// A JSON value object whose key is not a known type.
    InvalidToken,
    UnexpectedToken,
    NotAString,
    NotAnObject,
    EOFWhileParsingValue,
    EOFWhileParsingArray,
    EOFWhileParsingObject,
    /// Arrays and structs nested deeper than the decoder accepts.
    RecursionLimitExceeded,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            ErrorCode::MalformedEnvelope => "malformed envelope",
            ErrorCode::UnhandledStructElement => "unhandled struct element",
            ErrorCode::UnexpectedElement => "unexpected element",
            ErrorCode::InvalidToken => "invalid token",
            ErrorCode::UnexpectedToken => "unexpected token",
            ErrorCode::NotAString => "not a string",
            ErrorCode::NotAnObject => "not an object",
            ErrorCode::EOFWhileParsingValue => "EOF while parsing value",
            ErrorCode::EOFWhileParsingArray => "EOF while parsing array",
            ErrorCode::EOFWhileParsingObject => "EOF while parsing object",
            ErrorCode::RecursionLimitExceeded => "recursion limit exceeded",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum DecoderError {
    /// code, detail
    #[error("{0}: {1}")]
    SyntaxError(ErrorCode, String),
    /// The XML tokenizer rejected the document.
    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The JSON tokenizer rejected the document.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecoderError {
    /// The structural error code, if this is not a tokenizer failure.
    pub fn code(&self) -> Option<ErrorCode> {
        match *self {
            DecoderError::SyntaxError(code, _) => Some(code),
            _ => None,
        }
    }
}
