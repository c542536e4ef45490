//! JSON request codec.
//!
//! A request is `{"methodName": <string>, "params": [<value object>, ...]}`
//! where every value object carries its XML-RPC type as its only key.

pub use self::decoding::decode_request;
pub use self::encoding::encode_request;

pub mod decoding;
pub mod encoding;
pub mod tokens;
