//! The dynamically-typed RPC value shared by the XML-RPC and JSON-RPC codecs.
//!
//! A `Value` holds exactly one of the wire types below. Several wire names
//! may denote the same type; encoders always emit the canonical one
//! returned by `Tag::wire_name`.
//!
//! | Tag      | Payload          | Wire names                                   |
//! |----------|------------------|----------------------------------------------|
//! | Int      | `i32`            | `int`, `i4`                                  |
//! | Long     | `i64`            | `i8`, `long`, `ex:i8`                        |
//! | Short    | `i16`            | `i2`, `short`, `ex:i2`                       |
//! | Byte     | `u8`             | `i1`, `byte`, `ex:i1`                        |
//! | Double   | `f64`            | `double`                                     |
//! | Float    | `f32`            | `float`, `ex:float`                          |
//! | Boolean  | `bool`           | `boolean`                                    |
//! | String   | `String`         | `string`                                     |
//! | DateTime | `OffsetDateTime` | `dateTime.iso8601`, `dateTime`, `dateTime8601` |
//! | Base64   | `String`         | `base64`                                     |
//! | Nil      | none             | `nil`, `ex:nil`, `none`                      |
//! | Array    | `Vec<Value>`     | `array`                                      |
//! | Struct   | `Vec<Member>`    | `struct`                                     |

use std::borrow::Cow;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use num::{Bounded, NumCast, Zero};
use time::format_description::BorrowedFormatItem;
use time::macros::{datetime, format_description};
use time::{OffsetDateTime, PrimitiveDateTime};

/// `YYYY-MM-DDThh:mm:ss±hhmm`
const ISO8601: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

/// The XML-RPC spec's own `YYYYMMDDThh:mm:ss`, which carries no offset.
const ISO8601_COMPACT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]T[hour]:[minute]:[second]");

/// Payload of a `DateTime` whose literal could not be parsed.
pub const ZERO_DATETIME: OffsetDateTime = datetime!(0001-01-01 0:00 UTC);

/// Identifies which variant of `Value` is active.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Tag {
    Int,
    Long,
    Short,
    Byte,
    Double,
    Float,
    Boolean,
    String,
    DateTime,
    Base64,
    Nil,
    Array,
    Struct,
}

impl Tag {
    /// Looks up the tag for an XML element name or JSON object key.
    pub fn from_wire_name(name: &str) -> Option<Tag> {
        match name {
            "int" | "i4" => Some(Tag::Int),
            "i8" | "long" | "ex:i8" => Some(Tag::Long),
            "i2" | "short" | "ex:i2" => Some(Tag::Short),
            "i1" | "byte" | "ex:i1" => Some(Tag::Byte),
            "double" => Some(Tag::Double),
            "float" | "ex:float" => Some(Tag::Float),
            "boolean" => Some(Tag::Boolean),
            "string" => Some(Tag::String),
            "dateTime.iso8601" | "dateTime" | "dateTime8601" => Some(Tag::DateTime),
            "base64" => Some(Tag::Base64),
            "nil" | "ex:nil" | "none" => Some(Tag::Nil),
            "array" => Some(Tag::Array),
            "struct" => Some(Tag::Struct),
            _ => None,
        }
    }

    /// The name emitted when encoding. Extension types always use their
    /// `ex:` form.
    pub fn wire_name(self) -> &'static str {
        match self {
            Tag::Int => "int",
            Tag::Long => "ex:i8",
            Tag::Short => "ex:i2",
            Tag::Byte => "ex:i1",
            Tag::Double => "double",
            Tag::Float => "ex:float",
            Tag::Boolean => "boolean",
            Tag::String => "string",
            Tag::DateTime => "dateTime.iso8601",
            Tag::Base64 => "base64",
            Tag::Nil => "ex:nil",
            Tag::Array => "array",
            Tag::Struct => "struct",
        }
    }

    /// The value a literal of this type falls back to when it cannot be
    /// converted.
    pub fn zero(self) -> Value {
        match self {
            Tag::Int => Value::Int(0),
            Tag::Long => Value::Long(0),
            Tag::Short => Value::Short(0),
            Tag::Byte => Value::Byte(0),
            Tag::Double => Value::Double(0.0),
            Tag::Float => Value::Float(0.0),
            Tag::Boolean => Value::Boolean(false),
            Tag::String => Value::String(String::new()),
            Tag::DateTime => Value::DateTime(ZERO_DATETIME),
            Tag::Base64 => Value::Base64(String::new()),
            Tag::Nil => Value::Nil,
            Tag::Array => Value::Array(Vec::new()),
            Tag::Struct => Value::Struct(Vec::new()),
        }
    }
}

/// Represents an RPC data value
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Int(i32),
    Long(i64),
    Short(i16),
    Byte(u8),
    Double(f64),
    Float(f32),
    Boolean(bool),
    String(String),
    DateTime(OffsetDateTime),
    /// Encoded text, left for the caller to decode.
    Base64(String),
    Nil,
    Array(self::Array),
    Struct(self::Struct),
}

pub type Array = Vec<Value>;
pub type Struct = Vec<Member>;

/// A named struct field. Order within a struct is preserved and names may
/// repeat.
#[derive(Clone, PartialEq, Debug)]
pub struct Member {
    pub name: String,
    pub value: Value,
}

impl Member {
    pub fn new<N: Into<String>, V: Into<Value>>(name: N, value: V) -> Member {
        Member {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What an encoder writes inside a value's type element.
#[derive(Debug, PartialEq)]
pub enum Rendered<'a> {
    Literal(Cow<'a, str>),
    /// No content at all, e.g. `<ex:nil/>`.
    Empty,
    Array(&'a [Value]),
    Struct(&'a [Member]),
}

impl Value {
    pub fn tag(&self) -> Tag {
        match *self {
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Short(_) => Tag::Short,
            Value::Byte(_) => Tag::Byte,
            Value::Double(_) => Tag::Double,
            Value::Float(_) => Tag::Float,
            Value::Boolean(_) => Tag::Boolean,
            Value::String(_) => Tag::String,
            Value::DateTime(_) => Tag::DateTime,
            Value::Base64(_) => Tag::Base64,
            Value::Nil => Tag::Nil,
            Value::Array(_) => Tag::Array,
            Value::Struct(_) => Tag::Struct,
        }
    }

    /// Converts literal text to a value of the given type.
    ///
    /// Never fails: integer overflow saturates to the type's bounds, and any
    /// other unparsable literal yields the type's zero value. Container
    /// tags and `Nil` ignore the literal.
    pub fn from_literal(tag: Tag, literal: &str) -> Value {
        match tag {
            Tag::Int => Value::Int(parse_int(literal)),
            Tag::Long => Value::Long(parse_int(literal)),
            Tag::Short => Value::Short(parse_int(literal)),
            Tag::Byte => Value::Byte(parse_int(literal)),
            Tag::Double => Value::Double(parse_float(literal)),
            Tag::Float => Value::Float(parse_float(literal)),
            Tag::Boolean => Value::Boolean(parse_bool(literal)),
            Tag::String => Value::String(literal.to_string()),
            Tag::Base64 => Value::Base64(literal.to_string()),
            Tag::DateTime => Value::DateTime(parse_datetime(literal)),
            Tag::Nil | Tag::Array | Tag::Struct => tag.zero(),
        }
    }

    /// Converts a JSON number. Integer types truncate toward zero and
    /// saturate at their bounds; NaN becomes 0.
    pub fn from_number(tag: Tag, n: f64) -> Value {
        match tag {
            Tag::Int => Value::Int(cast_number(n)),
            Tag::Long => Value::Long(cast_number(n)),
            Tag::Short => Value::Short(cast_number(n)),
            Tag::Byte => Value::Byte(cast_number(n)),
            Tag::Double => Value::Double(n),
            Tag::Float => Value::Float(n as f32),
            Tag::Boolean => Value::Boolean(n != 0.0),
            _ => tag.zero(),
        }
    }

    /// Converts a JSON boolean. Only `Boolean` takes it; other types keep
    /// their zero value.
    pub fn from_boolean(tag: Tag, b: bool) -> Value {
        match tag {
            Tag::Boolean => Value::Boolean(b),
            _ => tag.zero(),
        }
    }

    /// Returns the canonical wire name and the content to encode for it.
    pub fn render(&self) -> (&'static str, Rendered<'_>) {
        let rendered = match *self {
            Value::Int(v) => Rendered::Literal(v.to_string().into()),
            Value::Long(v) => Rendered::Literal(v.to_string().into()),
            Value::Short(v) => Rendered::Literal(v.to_string().into()),
            Value::Byte(v) => Rendered::Literal(v.to_string().into()),
            Value::Double(v) => Rendered::Literal(v.to_string().into()),
            Value::Float(v) => Rendered::Literal(v.to_string().into()),
            Value::Boolean(b) => Rendered::Literal(Cow::Borrowed(if b { "1" } else { "0" })),
            Value::String(ref s) | Value::Base64(ref s) => Rendered::Literal(Cow::Borrowed(s)),
            Value::DateTime(ref dt) => Rendered::Literal(format_datetime(dt).into()),
            Value::Nil => Rendered::Empty,
            Value::Array(ref values) => Rendered::Array(values),
            Value::Struct(ref members) => Rendered::Struct(members),
        };
        (self.tag().wire_name(), rendered)
    }

    /// If the value is a Struct, returns the value of the first member
    /// named `name`. Returns None otherwise.
    pub fn find<'a>(&'a self, name: &str) -> Option<&'a Value> {
        self.as_struct()?
            .iter()
            .find(|member| member.name == name)
            .map(|member| &member.value)
    }

    /// Follows `names` through nested structs. Returns None as soon as one
    /// of them is missing.
    pub fn find_path<'a>(&'a self, names: &[&str]) -> Option<&'a Value> {
        let mut target = self;
        for name in names {
            target = target.find(name)?;
        }
        Some(target)
    }

    /// Any integer type widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(n) => Some(n.into()),
            Value::Long(n) => Some(n),
            Value::Short(n) => Some(n.into()),
            Value::Byte(n) => Some(n.into()),
            _ => None,
        }
    }

    /// Any integer type that fits in an `i32`.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(num::cast)
    }

    /// If the value is a number, return or cast it to a f64.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Double(n) => Some(n),
            Value::Float(n) => Some(n.into()),
            _ => self.as_i64().and_then(num::cast),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&OffsetDateTime> {
        match *self {
            Value::DateTime(ref dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match *self {
            Value::Array(ref values) => Some(values),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[Member]> {
        match *self {
            Value::Struct(ref members) => Some(members),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        *self == Value::Nil
    }
}

/// Parses an integer literal, saturating on overflow and falling back to
/// zero on anything else.
fn parse_int<T>(literal: &str) -> T
where
    T: FromStr<Err = ParseIntError> + Bounded + Zero,
{
    match literal.trim().parse::<T>() {
        Ok(n) => n,
        Err(e) => {
            trace!("Integer literal {:?} rejected: {}", literal, e);
            match e.kind() {
                IntErrorKind::PosOverflow => T::max_value(),
                IntErrorKind::NegOverflow => T::min_value(),
                _ => T::zero(),
            }
        }
    }
}

fn parse_float<T: FromStr + Zero>(literal: &str) -> T {
    literal.trim().parse().unwrap_or_else(|_| {
        trace!("Float literal {:?} rejected", literal);
        T::zero()
    })
}

/// `"1"` and any casing of `"true"` are true; everything else is false.
fn parse_bool(literal: &str) -> bool {
    let literal = literal.trim();
    literal == "1" || literal.eq_ignore_ascii_case("true")
}

fn cast_number<T: NumCast + Bounded + Zero>(n: f64) -> T {
    match num::cast::<f64, T>(n) {
        Some(v) => v,
        None if n.is_nan() => T::zero(),
        None if n.is_sign_positive() => T::max_value(),
        None => T::min_value(),
    }
}

/// Parses `YYYY-MM-DDThh:mm:ss±hhmm`, or `YYYYMMDDThh:mm:ss` as UTC.
pub fn parse_datetime(literal: &str) -> OffsetDateTime {
    let literal = literal.trim();
    OffsetDateTime::parse(literal, ISO8601)
        .or_else(|_| PrimitiveDateTime::parse(literal, ISO8601_COMPACT).map(|dt| dt.assume_utc()))
        .unwrap_or_else(|e| {
            trace!("DateTime literal {:?} rejected: {}", literal, e);
            ZERO_DATETIME
        })
}

pub fn format_datetime(dt: &OffsetDateTime) -> String {
    // OffsetDateTime carries every component ISO8601 names.
    dt.format(ISO8601).unwrap_or_default()
}

macro_rules! from_impl {
    ($($t:ty => $variant:ident),+) => (
        $(impl From<$t> for Value {
            fn from(v: $t) -> Value { Value::$variant(v) }
        })+
    )
}

from_impl! {
    i32 => Int,
    i64 => Long,
    i16 => Short,
    u8 => Byte,
    f64 => Double,
    f32 => Float,
    bool => Boolean,
    String => String,
    OffsetDateTime => DateTime
}

impl<'a> From<&'a str> for Value {
    fn from(v: &'a str) -> Value {
        Value::String(v.to_string())
    }
}

impl<A: Into<Value>> From<Vec<A>> for Value {
    fn from(v: Vec<A>) -> Value {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Value>> From<Option<A>> for Value {
    fn from(v: Option<A>) -> Value {
        match v {
            None => Value::Nil,
            Some(value) => value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn wire_names_resolve_synonyms() {
        assert_eq!(Some(Tag::Int), Tag::from_wire_name("i4"));
        assert_eq!(Some(Tag::Long), Tag::from_wire_name("ex:i8"));
        assert_eq!(Some(Tag::Byte), Tag::from_wire_name("byte"));
        assert_eq!(Some(Tag::Nil), Tag::from_wire_name("none"));
        assert_eq!(Some(Tag::DateTime), Tag::from_wire_name("dateTime8601"));
        assert_eq!(None, Tag::from_wire_name("i16"));
        assert_eq!(None, Tag::from_wire_name("Int"));
    }

    #[test]
    fn canonical_names_round_trip() {
        let tags = [
            Tag::Int, Tag::Long, Tag::Short, Tag::Byte, Tag::Double, Tag::Float, Tag::Boolean,
            Tag::String, Tag::DateTime, Tag::Base64, Tag::Nil, Tag::Array, Tag::Struct,
        ];
        for tag in tags.iter() {
            assert_eq!(Some(*tag), Tag::from_wire_name(tag.wire_name()));
            assert_eq!(*tag, tag.zero().tag());
        }
        assert_eq!("ex:i1", Tag::Byte.wire_name());
        assert_eq!("ex:float", Tag::Float.wire_name());
    }

    #[test]
    fn integer_literals_saturate() {
        assert_eq!(Value::Int(2147483647), Value::from_literal(Tag::Int, "9223372036854775807"));
        assert_eq!(Value::Int(-2147483648), Value::from_literal(Tag::Int, "-9223372036854775808"));
        assert_eq!(Value::Int(-1), Value::from_literal(Tag::Int, " -1 "));
        assert_eq!(Value::Int(0), Value::from_literal(Tag::Int, ""));
        assert_eq!(Value::Int(0), Value::from_literal(Tag::Int, "12abc"));
        assert_eq!(
            Value::Long(i64::MAX),
            Value::from_literal(Tag::Long, "92233720368547758079223372036854775807")
        );
        assert_eq!(Value::Short(32767), Value::from_literal(Tag::Short, "2147483647"));
        assert_eq!(Value::Short(-32768), Value::from_literal(Tag::Short, "-2147483648"));
        assert_eq!(Value::Byte(255), Value::from_literal(Tag::Byte, "2147483647"));
        assert_eq!(Value::Byte(0), Value::from_literal(Tag::Byte, "-1"));
    }

    #[test]
    fn float_literals() {
        assert_eq!(Value::Double(-1.0), Value::from_literal(Tag::Double, "-1"));
        assert_eq!(Value::Double(0.0), Value::from_literal(Tag::Double, "invalid"));
        assert_eq!(Value::Float(0.12345679), Value::from_literal(Tag::Float, "0.12345679"));
        assert_eq!(Value::Float(0.0), Value::from_literal(Tag::Float, ""));
    }

    #[test]
    fn boolean_literals() {
        for literal in ["1", "true", "TRUE", "tRuE", " True\n"].iter() {
            assert_eq!(Value::Boolean(true), Value::from_literal(Tag::Boolean, literal), "{}", literal);
        }
        for literal in ["0", "false", "yes", "no", "bananas", ""].iter() {
            assert_eq!(Value::Boolean(false), Value::from_literal(Tag::Boolean, literal), "{}", literal);
        }
    }

    #[test]
    fn datetime_literals() {
        let expected = datetime!(2016-04-07 21:13:58 +12:00);
        assert_eq!(
            Value::DateTime(expected),
            Value::from_literal(Tag::DateTime, "2016-04-07T21:13:58+1200")
        );
        assert_eq!(
            Value::DateTime(datetime!(1998-07-17 14:08:55 UTC)),
            Value::from_literal(Tag::DateTime, "19980717T14:08:55")
        );
        assert_eq!(Value::DateTime(ZERO_DATETIME), Value::from_literal(Tag::DateTime, ""));
        assert_eq!("2016-04-07T21:13:58+1200", format_datetime(&expected));
    }

    #[test]
    fn numbers_truncate_and_saturate() {
        assert_eq!(Value::Int(2147483647), Value::from_number(Tag::Int, 9223372036854775807.0));
        assert_eq!(Value::Int(-2147483648), Value::from_number(Tag::Int, -9223372036854775808.0));
        assert_eq!(Value::Int(3), Value::from_number(Tag::Int, 3.99));
        assert_eq!(Value::Int(-3), Value::from_number(Tag::Int, -3.99));
        assert_eq!(Value::Long(i64::MAX), Value::from_number(Tag::Long, 9.3e37));
        assert_eq!(Value::Long(i64::MIN), Value::from_number(Tag::Long, -9223372036854775808.0));
        assert_eq!(Value::Byte(0), Value::from_number(Tag::Byte, -1.0));
        assert_eq!(Value::Short(0), Value::from_number(Tag::Short, f64::NAN));
        assert_eq!(Value::Boolean(true), Value::from_number(Tag::Boolean, 1.0));
        assert_eq!(Value::String(String::new()), Value::from_number(Tag::String, 5.0));
    }

    #[test]
    fn booleans_only_fill_boolean() {
        assert_eq!(Value::Boolean(true), Value::from_boolean(Tag::Boolean, true));
        assert_eq!(Value::Int(0), Value::from_boolean(Tag::Int, true));
    }

    #[test]
    fn render_uses_canonical_names() {
        assert_eq!(("ex:i8", Rendered::Literal("-1".into())), Value::Long(-1).render());
        assert_eq!(("boolean", Rendered::Literal("1".into())), Value::Boolean(true).render());
        assert_eq!(("ex:nil", Rendered::Empty), Value::Nil.render());
        let array = Value::Array(vec![Value::Int(1)]);
        assert_eq!(("array", Rendered::Array(&[Value::Int(1)])), array.render());
    }

    #[test]
    fn find_member_paths() {
        let value = Value::Struct(vec![
            Member::new("zone", Value::Struct(vec![Member::new("id", 42)])),
            Member::new("name", "example.com"),
            Member::new("name", "duplicate"),
        ]);
        assert_eq!(Some("example.com"), value.find("name").and_then(Value::as_str));
        assert_eq!(Some(42), value.find_path(&["zone", "id"]).and_then(Value::as_i32));
        assert_eq!(None, value.find_path(&["zone", "missing"]));
        assert_eq!(None, Value::Int(1).find("name"));
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::Nil, Value::from(None::<i32>));
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
            Value::from(vec![1, 2])
        );
        assert_eq!(Some(7.0), Value::Byte(7).as_f64());
        assert_eq!(None, Value::Long(i64::MAX).as_i32());
        assert_eq!(Some(-3), Value::Long(-3).as_i32());
        assert_eq!(Some(255), Value::Byte(255).as_i32());
    }
}
