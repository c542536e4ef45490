//! Flattens a JSON document into a linear token stream.
//!
//! serde_json does the lexing; a `Visitor` records what it sees in document
//! order, so object keys keep their order and duplicates survive. Numbers
//! arrive as `f64` whatever their JSON spelling.

use std::fmt;
use std::vec;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};

use crate::error::DecoderError::SyntaxError;
use crate::error::ErrorCode::*;
use crate::error::DecodeResult;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Key(String),
    String(String),
    Number(f64),
    Bool(bool),
    Null,
}

/// Tokenizes one complete JSON document. Anything but whitespace after it
/// is a syntax error.
pub fn tokenize(src: &[u8]) -> DecodeResult<Vec<Token>> {
    let mut de = serde_json::Deserializer::from_slice(src);
    let mut tokens = Vec::new();
    TokenSink { tokens: &mut tokens }.deserialize(&mut de)?;
    de.end()?;
    Ok(tokens)
}

struct TokenSink<'t> {
    tokens: &'t mut Vec<Token>,
}

impl<'de, 't> DeserializeSeed<'de> for TokenSink<'t> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 't> Visitor<'de> for TokenSink<'t> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.tokens.push(Token::Bool(v));
        Ok(())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        self.tokens.push(Token::Number(v as f64));
        Ok(())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        self.tokens.push(Token::Number(v as f64));
        Ok(())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        self.tokens.push(Token::Number(v));
        Ok(())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.tokens.push(Token::String(v.to_string()));
        Ok(())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<(), E> {
        self.tokens.push(Token::String(v));
        Ok(())
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.tokens.push(Token::Null);
        Ok(())
    }

    fn visit_none<E: de::Error>(self) -> Result<(), E> {
        self.visit_unit()
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        let tokens = self.tokens;
        tokens.push(Token::ArrayStart);
        while seq.next_element_seed(TokenSink { tokens: &mut *tokens })?.is_some() {}
        tokens.push(Token::ArrayEnd);
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let tokens = self.tokens;
        tokens.push(Token::ObjectStart);
        while let Some(key) = map.next_key::<String>()? {
            tokens.push(Token::Key(key));
            map.next_value_seed(TokenSink { tokens: &mut *tokens })?;
        }
        tokens.push(Token::ObjectEnd);
        Ok(())
    }
}

/// Read position over a tokenized document.
pub struct TokenCursor {
    tokens: vec::IntoIter<Token>,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> TokenCursor {
        TokenCursor {
            tokens: tokens.into_iter(),
        }
    }

    pub fn next_token(&mut self) -> DecodeResult<Token> {
        self.tokens
            .next()
            .ok_or_else(|| SyntaxError(EOFWhileParsingValue, "end of document".into()))
    }

    pub fn expect(&mut self, expected: Token) -> DecodeResult<()> {
        let token = self.next_token()?;
        if token == expected {
            Ok(())
        } else {
            Err(SyntaxError(
                UnexpectedToken,
                format!("expected {:?}, got {:?}", expected, token),
            ))
        }
    }

    /// Consumes one complete value: a scalar, or a balanced object/array.
    pub fn skip_value(&mut self) -> DecodeResult<()> {
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::ObjectStart | Token::ArrayStart => depth += 1,
                Token::ObjectEnd | Token::ArrayEnd if depth > 0 => depth -= 1,
                token @ Token::ObjectEnd | token @ Token::ArrayEnd => {
                    return Err(SyntaxError(UnexpectedToken, format!("{:?}", token)))
                }
                _ => {}
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_keep_document_order() {
        let tokens = tokenize(br#"{"b": [1, -2.5, true, null], "a": "x", "a": {}}"#).unwrap();
        assert_eq!(
            vec![
                Token::ObjectStart,
                Token::Key("b".into()),
                Token::ArrayStart,
                Token::Number(1.0),
                Token::Number(-2.5),
                Token::Bool(true),
                Token::Null,
                Token::ArrayEnd,
                Token::Key("a".into()),
                Token::String("x".into()),
                Token::Key("a".into()),
                Token::ObjectStart,
                Token::ObjectEnd,
                Token::ObjectEnd,
            ],
            tokens
        );
    }

    #[test]
    fn huge_integers_become_floats() {
        let tokens = tokenize(b"[92233720368547758079223372036854775807]").unwrap();
        assert_eq!(Token::Number(9.223372036854776e37), tokens[1]);
    }

    #[test]
    fn syntax_errors_propagate() {
        assert!(tokenize(b"{\"a\": }").is_err());
        assert!(tokenize(b"{} {}").is_err());
    }

    #[test]
    fn skip_nested_value() {
        let tokens = tokenize(br#"[{"x": [1, {"y": 2}]}, 3]"#).unwrap();
        let mut cursor = TokenCursor::new(tokens);
        cursor.expect(Token::ArrayStart).unwrap();
        cursor.skip_value().unwrap();
        assert_eq!(Token::Number(3.0), cursor.next_token().unwrap());
        assert_eq!(Token::ArrayEnd, cursor.next_token().unwrap());
        assert!(cursor.next_token().is_err());
    }
}
