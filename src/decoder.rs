//! Decoder

use std::{cell::RefCell, rc::Rc, sync::Arc};

use indexmap::IndexMap;

use crate::{
    binary::Binary,
    bson::{Array, Bson, DbPointer, Regex, Timestamp},
    datetime::DateTime,
    document::Document,
    error::{Error, Result},
    reader::ByteReader,
    spec::{BinarySubtype, ElementType},
    value::Value,
};

/// The smallest well-formed document: a length prefix and a terminator.
const MIN_DOCUMENT_SIZE: i32 = 5;

/// Decode a document from `bytes`, requiring the entire input to be
/// consumed.
pub(crate) fn decode_document(bytes: &[u8]) -> Result<Document> {
    let mut reader = ByteReader::new(bytes);
    let doc = read_document(&mut reader)?;
    if reader.offset() != bytes.len() {
        return Err(Error::malformed_bytes(
            reader.offset(),
            "trailing bytes after document",
        ));
    }
    Ok(doc)
}

fn read_length(reader: &mut ByteReader<'_>) -> Result<usize> {
    let offset = reader.offset();
    let len = reader.read_i32()?;
    if len < MIN_DOCUMENT_SIZE {
        return Err(Error::malformed_bytes(
            offset,
            format!("document length {} too small", len),
        ));
    }
    Ok(len as usize)
}

/// A document ends when a zero tag lands exactly on the byte its length
/// prefix promised.
fn check_frame(reader: &ByteReader<'_>, start: usize, len: usize, tag: u8) -> Result<()> {
    if tag != 0 {
        return Err(Error::malformed_bytes(
            reader.offset(),
            "document missing NUL terminator",
        ));
    }
    if reader.offset() - start != len {
        return Err(Error::malformed_bytes(
            start,
            format!(
                "document length prefix {} does not match its encoded size {}",
                len,
                reader.offset() - start
            ),
        ));
    }
    Ok(())
}

fn read_document(reader: &mut ByteReader<'_>) -> Result<Document> {
    let start = reader.offset();
    let len = read_length(reader)?;

    let mut doc = Document::new();
    let mut tag = reader.read_u8()?;
    while tag != 0 && reader.offset() - start < len {
        let key = reader.read_cstr()?.to_owned();
        let value = read_value(reader, tag).map_err(|e| e.at_key(&key))?;
        doc.insert(key, value);
        tag = reader.read_u8()?;
    }

    check_frame(reader, start, len, tag)?;
    Ok(doc)
}

fn read_array(reader: &mut ByteReader<'_>) -> Result<Array> {
    let start = reader.offset();
    let len = read_length(reader)?;

    let mut arr = Array::new();
    let mut tag = reader.read_u8()?;
    while tag != 0 && reader.offset() - start < len {
        // index keys are read and discarded; elements keep the order they
        // appear in
        reader.read_cstr()?;
        let value = read_value(reader, tag).map_err(|e| e.at_index(arr.len()))?;
        arr.push(value);
        tag = reader.read_u8()?;
    }

    check_frame(reader, start, len, tag)?;
    Ok(arr)
}

fn read_binary(reader: &mut ByteReader<'_>) -> Result<Bson> {
    let length_offset = reader.offset();
    let total = reader.read_i32()?;
    if total < 0 {
        return Err(Error::malformed_bytes(
            length_offset,
            format!("invalid binary length {}", total),
        ));
    }

    let subtype = BinarySubtype::from(reader.read_u8()?);
    let mut len = total as usize;
    if subtype == BinarySubtype::BinaryOld {
        let inner_offset = reader.offset();
        if total < 4 {
            return Err(Error::malformed_bytes(
                length_offset,
                format!("old binary length {} too small for its length prefix", total),
            ));
        }
        let inner = reader.read_i32()?;
        if inner != total - 4 {
            return Err(Error::malformed_bytes(
                inner_offset,
                format!(
                    "old binary inner length {} does not match outer length {}",
                    inner, total
                ),
            ));
        }
        len -= 4;
    }

    let bytes = reader.read_bytes(len)?.to_vec();
    Ok(Bson::Binary(Binary { subtype, bytes }))
}

fn read_value(reader: &mut ByteReader<'_>, tag: u8) -> Result<Bson> {
    let Some(element_type) = ElementType::from_tag(tag) else {
        return Err(Error::malformed_bytes(
            reader.offset(),
            format!("unrecognized element type {:#04x}", tag),
        ));
    };

    match element_type {
        ElementType::Double => Ok(Bson::Double(reader.read_f64()?)),
        ElementType::String => Ok(Bson::String(reader.read_str()?.to_owned())),
        ElementType::EmbeddedDocument => Ok(Bson::Document(read_document(reader)?)),
        ElementType::Array => Ok(Bson::Array(read_array(reader)?)),
        ElementType::Binary => read_binary(reader),
        ElementType::Undefined => Ok(Bson::Undefined),
        ElementType::ObjectId => Ok(Bson::ObjectId(reader.read_object_id()?)),
        ElementType::Boolean => Ok(Bson::Boolean(reader.read_u8()? != 0)),
        ElementType::DateTime => Ok(Bson::DateTime(DateTime::from_millis(reader.read_i64()?))),
        ElementType::Null => Ok(Bson::Null),
        ElementType::RegularExpression => {
            let pattern = reader.read_cstr()?.to_owned();
            let options = reader.read_cstr()?.to_owned();
            Ok(Bson::RegularExpression(Regex { pattern, options }))
        }
        ElementType::DbPointer => {
            let namespace = reader.read_str()?.to_owned();
            let id = reader.read_object_id()?;
            Ok(Bson::DbPointer(DbPointer { namespace, id }))
        }
        ElementType::JavaScriptCode => Ok(Bson::JavaScriptCode(reader.read_str()?.to_owned())),
        // symbols decode as plain strings; the tag is not preserved
        ElementType::Symbol => Ok(Bson::String(reader.read_str()?.to_owned())),
        ElementType::JavaScriptCodeWithScope | ElementType::Decimal128 => Err(
            Error::malformed_bytes(
                reader.offset(),
                format!("no decoder for element type {:#04x}", tag),
            ),
        ),
        ElementType::Int32 => Ok(Bson::Int32(reader.read_i32()?)),
        // the increment precedes the seconds on the wire
        ElementType::Timestamp => {
            let increment = reader.read_u32()?;
            let time = reader.read_u32()?;
            Ok(Bson::Timestamp(Timestamp { time, increment }))
        }
        ElementType::Int64 => Ok(Bson::Int64(reader.read_i64()?)),
        ElementType::MaxKey => Ok(Bson::MaxKey),
        ElementType::MinKey => Ok(Bson::MinKey),
    }
}

/// The position of a value being passed to a [`Reviver`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key<'a> {
    /// The root of the decoded tree.
    Root,
    /// A field inside a document.
    Field(&'a str),
    /// An index inside an array.
    Index(usize),
}

/// The callback invoked for every value produced during decoding.
///
/// Each decoded document field and array element is replaced by the
/// reviver's return value; after the root is fully built, the reviver runs
/// once more with [`Key::Root`] and its return value becomes the result.
pub type Reviver = dyn Fn(Key<'_>, Value) -> Value + Send + Sync;

/// Converts BSON documents into host [`Value`] trees.
///
/// A `Decoder` carries an optional [`Reviver`] threaded through the whole
/// tree; without one, values are lowered structurally.
#[derive(Clone, Default)]
pub struct Decoder {
    reviver: Option<Arc<Reviver>>,
}

impl Decoder {
    /// A decoder with no reviver.
    pub fn new() -> Decoder {
        Decoder::default()
    }

    pub(crate) fn with_reviver(reviver: Option<Arc<Reviver>>) -> Decoder {
        Decoder { reviver }
    }

    /// Decode BSON bytes into a host value tree.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        Ok(self.from_document(decode_document(bytes)?))
    }

    /// Lower a decoded [`Document`] to host values, applying the reviver.
    pub fn from_document(&self, doc: Document) -> Value {
        let root = self.lower(Bson::Document(doc));
        match &self.reviver {
            Some(reviver) => reviver(Key::Root, root),
            None => root,
        }
    }

    fn lower(&self, bson: Bson) -> Value {
        match bson {
            Bson::Document(doc) => {
                let mut entries = IndexMap::with_capacity(doc.len());
                for (key, value) in doc {
                    let mut value = self.lower(value);
                    if let Some(reviver) = &self.reviver {
                        value = reviver(Key::Field(&key), value);
                    }
                    entries.insert(key, value);
                }
                Value::Object(Rc::new(RefCell::new(entries)))
            }
            Bson::Array(arr) => {
                let mut elements = Vec::with_capacity(arr.len());
                for (index, element) in arr.into_iter().enumerate() {
                    let mut element = self.lower(element);
                    if let Some(reviver) = &self.reviver {
                        element = reviver(Key::Index(index), element);
                    }
                    elements.push(element);
                }
                Value::Array(Rc::new(RefCell::new(elements)))
            }
            Bson::Double(d) => Value::Double(d),
            Bson::String(s) => Value::String(s),
            Bson::Boolean(b) => Value::Boolean(b),
            Bson::Null => Value::Null,
            Bson::Int32(n) => Value::Int(n.into()),
            Bson::Int64(n) => Value::Int(n.into()),
            Bson::DateTime(dt) => Value::DateTime(dt),
            Bson::ObjectId(id) => Value::ObjectId(id),
            // values with no natural host equivalent pass through unchanged
            other => Value::Bson(other),
        }
    }
}
