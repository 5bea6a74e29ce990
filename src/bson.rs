//! BSON definition

use std::{
    fmt::{self, Display},
    sync::atomic::{AtomicU32, Ordering},
    time::SystemTime,
};

use once_cell::sync::Lazy;
use rand::{Rng, rng};

use crate::{
    binary::Binary, datetime::DateTime, document::Document, oid::ObjectId, spec::ElementType,
};

/// Possible BSON value types.
#[derive(Clone, Debug, PartialEq)]
pub enum Bson {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Array
    Array(Array),
    /// Embedded document
    Document(Document),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(Regex),
    /// JavaScript code
    JavaScriptCode(String),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(Binary),
    /// [ObjectId](http://www.mongodb.com/docs/manual/reference/object-id/)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// DBPointer (deprecated)
    DbPointer(DbPointer),
    /// Undefined value (deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
}

/// Alias for `Vec<Bson>`.
pub type Array = Vec<Bson>;

impl Bson {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        match self {
            Bson::Double(..) => ElementType::Double,
            Bson::String(..) => ElementType::String,
            Bson::Array(..) => ElementType::Array,
            Bson::Document(..) => ElementType::EmbeddedDocument,
            Bson::Boolean(..) => ElementType::Boolean,
            Bson::Null => ElementType::Null,
            Bson::RegularExpression(..) => ElementType::RegularExpression,
            Bson::JavaScriptCode(..) => ElementType::JavaScriptCode,
            Bson::Int32(..) => ElementType::Int32,
            Bson::Int64(..) => ElementType::Int64,
            Bson::Timestamp(..) => ElementType::Timestamp,
            Bson::Binary(..) => ElementType::Binary,
            Bson::ObjectId(..) => ElementType::ObjectId,
            Bson::DateTime(..) => ElementType::DateTime,
            Bson::DbPointer(..) => ElementType::DbPointer,
            Bson::Undefined => ElementType::Undefined,
            Bson::MaxKey => ElementType::MaxKey,
            Bson::MinKey => ElementType::MinKey,
        }
    }

    /// If the value is a `Double`, returns its value. Returns [`None`]
    /// otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// If the value is a `String`, returns its value. Returns [`None`]
    /// otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an `Array`, returns a reference to it. Returns
    /// [`None`] otherwise.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If the value is a `Document`, returns a reference to it. Returns
    /// [`None`] otherwise.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(v) => Some(v),
            _ => None,
        }
    }

    /// If the value is a `Boolean`, returns its value. Returns [`None`]
    /// otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Bson::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// If the value is an `Int32`, returns its value. Returns [`None`]
    /// otherwise.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Bson::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// If the value is an `Int64`, returns its value. Returns [`None`]
    /// otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Bson::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// If the value is an `ObjectId`, returns its value. Returns [`None`]
    /// otherwise.
    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Bson::ObjectId(v) => Some(*v),
            _ => None,
        }
    }

    /// If the value is a `DateTime`, returns its value. Returns [`None`]
    /// otherwise.
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Bson::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// If the value is a `Timestamp`, returns its value. Returns [`None`]
    /// otherwise.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Bson::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// If the value is a `Binary`, returns a reference to it. Returns
    /// [`None`] otherwise.
    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Bson::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// If the value is a `Null`, returns `()`. Returns [`None`] otherwise.
    pub fn as_null(&self) -> Option<()> {
        match self {
            Bson::Null => Some(()),
            _ => None,
        }
    }
}

impl Display for Bson {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bson::Double(v) => write!(fmt, "{}", v),
            Bson::String(s) => write!(fmt, "\"{}\"", s),
            Bson::Array(arr) => {
                fmt.write_str("[")?;

                let mut first = true;
                for bson in arr {
                    if !first {
                        fmt.write_str(", ")?;
                    }
                    write!(fmt, "{}", bson)?;
                    first = false;
                }

                fmt.write_str("]")
            }
            Bson::Document(doc) => write!(fmt, "{}", doc),
            Bson::Boolean(b) => write!(fmt, "{}", b),
            Bson::Null => fmt.write_str("null"),
            Bson::RegularExpression(re) => write!(fmt, "{}", re),
            Bson::JavaScriptCode(code) => fmt.write_str(code),
            Bson::Int32(i) => write!(fmt, "{}", i),
            Bson::Int64(i) => write!(fmt, "{}", i),
            Bson::Timestamp(ts) => write!(fmt, "{}", ts),
            Bson::Binary(bin) => write!(fmt, "{}", bin),
            Bson::ObjectId(id) => write!(fmt, "ObjectId(\"{}\")", id),
            Bson::DateTime(dt) => write!(fmt, "DateTime(\"{}\")", dt),
            Bson::DbPointer(ptr) => write!(fmt, "{}", ptr),
            Bson::Undefined => fmt.write_str("undefined"),
            Bson::MaxKey => fmt.write_str("MaxKey"),
            Bson::MinKey => fmt.write_str("MinKey"),
        }
    }
}

impl From<f32> for Bson {
    fn from(a: f32) -> Bson {
        Bson::Double(a.into())
    }
}

impl From<f64> for Bson {
    fn from(a: f64) -> Bson {
        Bson::Double(a)
    }
}

impl From<&str> for Bson {
    fn from(s: &str) -> Bson {
        Bson::String(s.to_owned())
    }
}

impl From<&String> for Bson {
    fn from(s: &String) -> Bson {
        Bson::String(s.clone())
    }
}

impl From<String> for Bson {
    fn from(s: String) -> Bson {
        Bson::String(s)
    }
}

impl From<bool> for Bson {
    fn from(b: bool) -> Bson {
        Bson::Boolean(b)
    }
}

impl From<i32> for Bson {
    fn from(i: i32) -> Bson {
        Bson::Int32(i)
    }
}

impl From<i64> for Bson {
    fn from(i: i64) -> Bson {
        Bson::Int64(i)
    }
}

impl From<Regex> for Bson {
    fn from(re: Regex) -> Bson {
        Bson::RegularExpression(re)
    }
}

impl From<Timestamp> for Bson {
    fn from(ts: Timestamp) -> Bson {
        Bson::Timestamp(ts)
    }
}

impl From<Binary> for Bson {
    fn from(binary: Binary) -> Bson {
        Bson::Binary(binary)
    }
}

impl From<ObjectId> for Bson {
    fn from(id: ObjectId) -> Bson {
        Bson::ObjectId(id)
    }
}

impl From<DateTime> for Bson {
    fn from(dt: DateTime) -> Bson {
        Bson::DateTime(dt)
    }
}

impl From<DbPointer> for Bson {
    fn from(ptr: DbPointer) -> Bson {
        Bson::DbPointer(ptr)
    }
}

impl From<Document> for Bson {
    fn from(doc: Document) -> Bson {
        Bson::Document(doc)
    }
}

impl<T: Into<Bson>> From<Vec<T>> for Bson {
    fn from(v: Vec<T>) -> Bson {
        Bson::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Bson>> From<&[T]> for Bson {
    fn from(s: &[T]) -> Bson {
        Bson::Array(s.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Bson>> From<Option<T>> for Bson {
    fn from(a: Option<T>) -> Bson {
        match a {
            None => Bson::Null,
            Some(t) => t.into(),
        }
    }
}

/// Represents a BSON regular expression value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Regex {
    /// The regex pattern to match.
    pub pattern: String,

    /// The options for the regex.
    pub options: String,
}

impl Display for Regex {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "/{}/{}", self.pattern, self.options)
    }
}

/// The process-wide counter that orders [`Timestamp`]s taken within the same
/// second. Seeded from a cryptographically secure random value the first
/// time it is read; wraps modulo 2^32.
static TIMESTAMP_COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rng().random()));

/// Represents a BSON timestamp value: an opaque `(seconds, increment)` pair
/// used for internal MongoDB replication bookkeeping.
///
/// On the wire the increment is stored first, then the seconds, both as
/// little-endian `u32`s.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp {
    /// The number of seconds since the Unix epoch.
    pub time: u32,

    /// An incrementing value to order timestamps with the same number of
    /// seconds in the `time` field.
    pub increment: u32,
}

impl Timestamp {
    /// Create a [`Timestamp`] for the current second, with the increment
    /// drawn from the process-wide counter.
    pub fn now() -> Timestamp {
        let time = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system clock is before 1970")
            .as_secs() as u32;

        Timestamp {
            time,
            increment: TIMESTAMP_COUNTER.fetch_add(1, Ordering::SeqCst),
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Timestamp({}, {})", self.time, self.increment)
    }
}

/// Represents a DBPointer (deprecated).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DbPointer {
    /// The namespace the pointer refers to.
    pub namespace: String,

    /// The id of the referenced document.
    pub id: ObjectId,
}

impl Display for DbPointer {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "DbPointer({}, {})", self.namespace, self.id)
    }
}
