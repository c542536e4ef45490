use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::value::{format_datetime, Member, Value};

/// A value serializes as a one-key object naming its canonical wire type:
/// `{"ex:i8": 3}`, `{"array": [...]}`, `{"struct": {"name": {...}}}`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = self.tag().wire_name();
        let mut map = serializer.serialize_map(Some(1))?;
        match *self {
            Value::Int(v) => map.serialize_entry(name, &v)?,
            Value::Long(v) => map.serialize_entry(name, &v)?,
            Value::Short(v) => map.serialize_entry(name, &v)?,
            Value::Byte(v) => map.serialize_entry(name, &v)?,
            Value::Double(v) => map.serialize_entry(name, &v)?,
            Value::Float(v) => map.serialize_entry(name, &v)?,
            Value::Boolean(v) => map.serialize_entry(name, &v)?,
            Value::String(ref s) | Value::Base64(ref s) => map.serialize_entry(name, s)?,
            Value::DateTime(ref dt) => map.serialize_entry(name, &format_datetime(dt))?,
            Value::Nil => map.serialize_entry(name, &())?,
            Value::Array(ref values) => map.serialize_entry(name, values)?,
            Value::Struct(ref members) => map.serialize_entry(name, &Members(members))?,
        }
        map.end()
    }
}

/// Struct members as a JSON object, in order. Duplicate names are written
/// as duplicate keys.
struct Members<'a>(&'a [Member]);

impl<'a> Serialize for Members<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for member in self.0 {
            map.serialize_entry(&member.name, &member.value)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct JsonRequest<'a> {
    #[serde(rename = "methodName")]
    method_name: &'a str,
    params: &'a [Value],
}

/// Encodes a request in the form `decode_request` reads.
pub fn encode_request(method: &str, params: &[Value]) -> serde_json::Result<Vec<u8>> {
    let body = serde_json::to_vec(&JsonRequest {
        method_name: method,
        params,
    })?;
    trace!("JSON request body: {}", String::from_utf8_lossy(&body));
    Ok(body)
}
