use crate::error::DecoderError::SyntaxError;
use crate::error::ErrorCode::*;
use crate::error::DecodeResult;
use crate::jsonrpc::tokens::{tokenize, Token, TokenCursor};
use crate::value::{Member, Tag, Value};

/// Decodes `{"methodName": "...", "params": [<value object>, ...]}`.
///
/// Each value object has a single key naming its wire type, e.g.
/// `{"int": 42}`, `{"array": [{"string": "x"}]}` or
/// `{"struct": {"name": {"i8": 3}}}`. Keys other than `methodName` and
/// `params` are skipped.
pub fn decode_request(body: &[u8]) -> DecodeResult<(String, Vec<Value>)> {
    trace!("JSON request body: {}", String::from_utf8_lossy(body));

    let mut cursor = TokenCursor::new(tokenize(body)?);
    let mut method = String::new();
    let mut params = Vec::new();

    match cursor.next_token()? {
        Token::ObjectStart => {}
        token => {
            return Err(SyntaxError(
                NotAnObject,
                format!("request must be an object, got {:?}", token),
            ))
        }
    }

    loop {
        match cursor.next_token()? {
            Token::Key(ref key) if key == "methodName" => match cursor.next_token()? {
                Token::String(name) => method = name,
                token => return Err(SyntaxError(NotAString, format!("methodName is {:?}", token))),
            },
            Token::Key(ref key) if key == "params" => {
                cursor.expect(Token::ArrayStart)?;
                params = parse_values(&mut cursor)?;
            }
            Token::Key(key) => {
                debug!("Skipping unknown request key {:?}", key);
                cursor.skip_value()?;
            }
            Token::ObjectEnd => break,
            token => return Err(SyntaxError(UnexpectedToken, format!("{:?}", token))),
        }
    }

    debug!("Decoded JSON request {:?} with {} params", method, params.len());
    Ok((method, params))
}

/// Reads value objects up to the closing `]`. The opening `[` has been
/// consumed.
fn parse_values(cursor: &mut TokenCursor) -> DecodeResult<Vec<Value>> {
    let mut values = Vec::new();
    loop {
        match cursor.next_token()? {
            Token::ObjectStart => values.push(parse_value_object(cursor)?),
            Token::ArrayEnd => return Ok(values),
            token => {
                return Err(SyntaxError(
                    NotAnObject,
                    format!("array element must be a value object, got {:?}", token),
                ))
            }
        }
    }
}

/// Reads `{"name": <value object>, ...}` up to the closing `}`.
fn parse_members(cursor: &mut TokenCursor) -> DecodeResult<Vec<Member>> {
    cursor.expect(Token::ObjectStart)?;
    let mut members = Vec::new();
    loop {
        match cursor.next_token()? {
            Token::Key(name) => match cursor.next_token()? {
                Token::ObjectStart => {
                    let value = parse_value_object(cursor)?;
                    members.push(Member { name, value });
                }
                token => {
                    return Err(SyntaxError(
                        NotAnObject,
                        format!("member {:?} must be a value object, got {:?}", name, token),
                    ))
                }
            },
            Token::ObjectEnd => return Ok(members),
            token => return Err(SyntaxError(UnexpectedToken, format!("{:?}", token))),
        }
    }
}

/// Reads the rest of a value object after its `{`: the type key, its
/// payload and the closing `}`.
fn parse_value_object(cursor: &mut TokenCursor) -> DecodeResult<Value> {
    let tag = match cursor.next_token()? {
        Token::Key(key) => match Tag::from_wire_name(&key) {
            Some(tag) => tag,
            None => return Err(SyntaxError(InvalidToken, format!("unknown type {:?}", key))),
        },
        Token::ObjectEnd => return Err(SyntaxError(InvalidToken, "empty value object".into())),
        token => return Err(SyntaxError(UnexpectedToken, format!("{:?}", token))),
    };

    let value = match tag {
        Tag::Array => {
            cursor.expect(Token::ArrayStart)?;
            Value::Array(parse_values(cursor)?)
        }
        Tag::Struct => Value::Struct(parse_members(cursor)?),
        _ => match cursor.next_token()? {
            Token::String(ref s) => Value::from_literal(tag, s),
            Token::Number(n) => Value::from_number(tag, n),
            Token::Bool(b) => Value::from_boolean(tag, b),
            Token::Null => tag.zero(),
            token => {
                return Err(SyntaxError(
                    UnexpectedToken,
                    format!("{} payload must be a scalar, got {:?}", tag.wire_name(), token),
                ))
            }
        },
    };

    match cursor.next_token()? {
        Token::ObjectEnd => Ok(value),
        Token::Key(key) => Err(SyntaxError(
            UnexpectedToken,
            format!("value object has a second key {:?}", key),
        )),
        token => Err(SyntaxError(UnexpectedToken, format!("{:?}", token))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecoderError, ErrorCode};
    use time::macros::datetime;

    fn params(json: &str) -> Vec<Value> {
        let body = format!(r#"{{"methodName": "Testing", "params": {}}}"#, json);
        let (method, values) = decode_request(body.as_bytes()).unwrap();
        assert_eq!("Testing", method);
        values
    }

    fn error_code(json: &str) -> Option<ErrorCode> {
        decode_request(json.as_bytes()).unwrap_err().code()
    }

    #[test]
    fn decode_method_and_int() {
        assert_eq!(vec![Value::Int(59392)], params(r#"[{"int": 59392}]"#));
        assert_eq!(vec![Value::Int(-3)], params(r#"[{"i4": "-3"}]"#));
    }

    #[test]
    fn decode_numbers_saturate() {
        assert_eq!(
            vec![Value::Int(i32::MAX)],
            params(r#"[{"int": 9223372036854775807}]"#)
        );
        assert_eq!(
            vec![Value::Long(i64::MAX)],
            params(r#"[{"i8": 9223372036854775807}]"#)
        );
        assert_eq!(vec![Value::Short(i16::MIN)], params(r#"[{"ex:i2": -40000}]"#));
        assert_eq!(vec![Value::Byte(0)], params(r#"[{"i1": -1}]"#));
        assert_eq!(vec![Value::Int(2)], params(r#"[{"int": 2.9}]"#));
    }

    #[test]
    fn decode_floats() {
        assert_eq!(
            vec![Value::Double(2.5), Value::Float(-0.5)],
            params(r#"[{"double": 2.5}, {"ex:float": "-0.5"}]"#)
        );
    }

    #[test]
    fn decode_booleans() {
        assert_eq!(
            vec![
                Value::Boolean(true),
                Value::Boolean(true),
                Value::Boolean(true),
                Value::Boolean(true),
                Value::Boolean(false),
                Value::Boolean(true),
                Value::Boolean(false),
            ],
            params(
                r#"[{"boolean": "TRUE"}, {"boolean": "tRuE"}, {"boolean": "1"},
                    {"boolean": true}, {"boolean": "yes"}, {"boolean": 1}, {"boolean": 0}]"#
            )
        );
    }

    #[test]
    fn decode_strings_dates_and_nil() {
        assert_eq!(
            vec![
                Value::String("hello".into()),
                Value::Base64("aGVsbG8=".into()),
                Value::DateTime(datetime!(2013-12-09 18:33:11 -8)),
                Value::Nil,
                Value::Nil,
            ],
            params(
                r#"[{"string": "hello"}, {"base64": "aGVsbG8="},
                    {"dateTime.iso8601": "2013-12-09T18:33:11-0800"},
                    {"nil": null}, {"ex:nil": "ignored"}]"#
            )
        );
    }

    #[test]
    fn wrong_scalar_kind_is_zero() {
        assert_eq!(
            vec![Value::String(String::new()), Value::Int(0), Value::Int(0)],
            params(r#"[{"string": 12}, {"int": true}, {"int": null}]"#)
        );
    }

    #[test]
    fn decode_nested_arrays() {
        assert_eq!(
            vec![Value::Array(vec![Value::String("x".into())])],
            params(r#"[{"array": [{"string": "x"}]}]"#)
        );
        assert_eq!(
            vec![Value::Array(vec![
                Value::Int(59392),
                Value::Array(vec![Value::String("wheee".into())]),
                Value::Array(vec![]),
            ])],
            params(r#"[{"array": [{"int": 59392}, {"array": [{"string": "wheee"}]}, {"array": []}]}]"#)
        );
    }

    #[test]
    fn decode_struct_keeps_order() {
        let values = params(r#"[{"struct": {"c": {"int": 1}, "a": {"string": "x"}, "c": {"nil": null}}}]"#);
        assert_eq!(
            vec![Value::Struct(vec![
                Member::new("c", 1),
                Member::new("a", "x"),
                Member::new("c", Value::Nil),
            ])],
            values
        );
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let body = br#"{"id": {"deep": [1, {"x": null}]}, "params": [{"int": 1}], "jsonrpc": "2.0", "methodName": "m"}"#;
        assert_eq!(
            ("m".to_string(), vec![Value::Int(1)]),
            decode_request(body).unwrap()
        );
    }

    #[test]
    fn missing_fields_default() {
        assert_eq!((String::new(), vec![]), decode_request(b"{}").unwrap());
        assert_eq!(
            ("Calling".to_string(), vec![]),
            decode_request(br#"{"methodName": "Calling", "params": []}"#).unwrap()
        );
    }

    #[test]
    fn structural_errors() {
        assert_eq!(Some(NotAnObject), error_code(r#"["methodName"]"#));
        assert_eq!(Some(NotAString), error_code(r#"{"methodName": 5}"#));
        assert_eq!(Some(NotAnObject), error_code(r#"{"params": [1]}"#));
        assert_eq!(Some(UnexpectedToken), error_code(r#"{"params": {"int": 1}}"#));
        assert_eq!(Some(InvalidToken), error_code(r#"{"params": [{"integer": 1}]}"#));
        assert_eq!(Some(InvalidToken), error_code(r#"{"params": [{}]}"#));
        assert_eq!(
            Some(UnexpectedToken),
            error_code(r#"{"params": [{"int": 1, "string": "x"}]}"#)
        );
        assert_eq!(Some(UnexpectedToken), error_code(r#"{"params": [{"int": [1]}]}"#));
        assert_eq!(Some(UnexpectedToken), error_code(r#"{"params": [{"array": 1}]}"#));
        assert_eq!(
            Some(NotAnObject),
            error_code(r#"{"params": [{"struct": {"a": 1}}]}"#)
        );
    }

    #[test]
    fn tokenizer_errors_propagate() {
        match decode_request(br#"{"methodName": "m",}"#) {
            Err(DecoderError::Json(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
        match decode_request(br#"{"methodName": "m"} trailing"#) {
            Err(DecoderError::Json(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
