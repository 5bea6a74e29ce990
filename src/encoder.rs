//! Encoder

use std::{rc::Rc, sync::Arc};

use crate::{
    bson::{Array, Bson},
    document::Document,
    error::{Error, Result},
    spec::BinarySubtype,
    value::{Encodable, Value},
    writer::ByteWriter,
};

/// The conversion hook invoked for user-defined objects during encoding.
///
/// The hook receives the object and returns a replacement [`Value`], which
/// is then encoded in its place. When no hook is supplied the object's own
/// [`Encodable::to_bson`] is used.
pub type ToEncodable = dyn Fn(&dyn Encodable) -> Result<Value> + Send + Sync;

/// Number of payload bytes a value occupies on the wire, excluding the
/// element's type byte and key.
pub(crate) fn byte_length(value: &Bson) -> usize {
    match value {
        Bson::Double(_) => 8,
        Bson::String(s) | Bson::JavaScriptCode(s) => 4 + s.len() + 1,
        Bson::Array(arr) => array_byte_length(arr),
        Bson::Document(doc) => document_byte_length(doc),
        Bson::Boolean(_) => 1,
        Bson::Null | Bson::Undefined | Bson::MaxKey | Bson::MinKey => 0,
        Bson::RegularExpression(re) => re.pattern.len() + 1 + re.options.len() + 1,
        Bson::Int32(_) => 4,
        Bson::Int64(_) => 8,
        Bson::Timestamp(_) => 8,
        Bson::Binary(bin) => {
            let old = bin.subtype == BinarySubtype::BinaryOld;
            4 + 1 + if old { 4 } else { 0 } + bin.bytes.len()
        }
        Bson::ObjectId(_) => 12,
        Bson::DateTime(_) => 8,
        Bson::DbPointer(ptr) => 4 + ptr.namespace.len() + 1 + 12,
    }
}

/// Size of a full element: type byte, NUL-terminated key, payload.
fn element_len(key: &str, value: &Bson) -> usize {
    1 + key.len() + 1 + byte_length(value)
}

/// Total encoded size of a document, including the length prefix and the
/// trailing NUL.
pub(crate) fn document_byte_length(doc: &Document) -> usize {
    4 + doc
        .iter()
        .map(|(key, value)| element_len(key, value))
        .sum::<usize>()
        + 1
}

fn array_byte_length(arr: &Array) -> usize {
    4 + arr
        .iter()
        .enumerate()
        .map(|(index, value)| 1 + decimal_digits(index) + 1 + byte_length(value))
        .sum::<usize>()
        + 1
}

/// Number of characters in the decimal form of an array index.
fn decimal_digits(index: usize) -> usize {
    let mut digits = 1;
    let mut index = index;
    while index >= 10 {
        index /= 10;
        digits += 1;
    }
    digits
}

/// Encode `doc` into a freshly allocated buffer of exactly its encoded size.
pub(crate) fn document_to_vec(doc: &Document) -> Vec<u8> {
    let mut writer = ByteWriter::new(document_byte_length(doc));
    encode_document(&mut writer, doc);
    writer.finish()
}

fn encode_document(writer: &mut ByteWriter, doc: &Document) {
    writer.write_i32(document_byte_length(doc) as i32);
    for (key, value) in doc.iter() {
        writer.write_u8(value.element_type() as u8);
        writer.write_cstr(key);
        encode_value(writer, value);
    }
    writer.write_u8(0);
}

fn encode_array(writer: &mut ByteWriter, arr: &Array) {
    writer.write_i32(array_byte_length(arr) as i32);
    for (index, value) in arr.iter().enumerate() {
        writer.write_u8(value.element_type() as u8);
        writer.write_cstr(&index.to_string());
        encode_value(writer, value);
    }
    writer.write_u8(0);
}

fn encode_value(writer: &mut ByteWriter, value: &Bson) {
    match value {
        Bson::Double(v) => writer.write_f64(*v),
        Bson::String(s) | Bson::JavaScriptCode(s) => writer.write_str(s),
        Bson::Array(arr) => encode_array(writer, arr),
        Bson::Document(doc) => encode_document(writer, doc),
        Bson::Boolean(v) => writer.write_u8(*v as u8),
        Bson::Null | Bson::Undefined | Bson::MaxKey | Bson::MinKey => {}
        Bson::RegularExpression(re) => {
            writer.write_cstr(&re.pattern);
            writer.write_cstr(&re.options);
        }
        Bson::Int32(v) => writer.write_i32(*v),
        Bson::Int64(v) => writer.write_i64(*v),
        // the increment precedes the seconds on the wire
        Bson::Timestamp(ts) => {
            writer.write_u32(ts.increment);
            writer.write_u32(ts.time);
        }
        Bson::Binary(bin) => {
            let old = bin.subtype == BinarySubtype::BinaryOld;
            let total = bin.bytes.len() + if old { 4 } else { 0 };
            writer.write_i32(total as i32);
            writer.write_u8(u8::from(bin.subtype));
            if old {
                // the deprecated subtype duplicates its length after the
                // subtype byte
                writer.write_i32(bin.bytes.len() as i32);
            }
            writer.write_bytes(&bin.bytes);
        }
        Bson::ObjectId(id) => writer.write_bytes(&id.bytes()),
        Bson::DateTime(dt) => writer.write_i64(dt.timestamp_millis()),
        Bson::DbPointer(ptr) => {
            writer.write_str(&ptr.namespace);
            writer.write_bytes(&ptr.id.bytes());
        }
    }
}

/// Reference identities of the containers and objects currently being
/// lowered, used to reject cyclic host values. Push on entry, pop on exit;
/// hitting an identity already on the stack means the value contains itself.
struct IdentityStack(Vec<*const ()>);

impl IdentityStack {
    fn new() -> IdentityStack {
        IdentityStack(Vec::new())
    }

    fn enter(&mut self, id: *const ()) -> Result<()> {
        if self.0.contains(&id) {
            return Err(Error::cyclic_value());
        }
        self.0.push(id);
        Ok(())
    }

    fn exit(&mut self) {
        self.0.pop();
    }
}

/// Converts host [`Value`] trees into BSON documents and bytes.
///
/// An `Encoder` carries an optional `to_encodable` hook applied to
/// [`Value::Custom`] objects; everything else is mapped structurally.
#[derive(Clone, Default)]
pub struct Encoder {
    to_encodable: Option<Arc<ToEncodable>>,
}

impl Encoder {
    /// An encoder with no conversion hook: user-defined objects are
    /// converted through their own [`Encodable::to_bson`].
    pub fn new() -> Encoder {
        Encoder::default()
    }

    pub(crate) fn with_hook(to_encodable: Option<Arc<ToEncodable>>) -> Encoder {
        Encoder { to_encodable }
    }

    /// Encode a host value to BSON bytes.
    ///
    /// The value must lower to a document at the top level; no bytes are
    /// produced otherwise.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(document_to_vec(&self.to_document(value)?))
    }

    /// Lower a host value to a [`Document`].
    pub fn to_document(&self, value: &Value) -> Result<Document> {
        let mut in_progress = IdentityStack::new();
        match self.raise(value, &mut in_progress)? {
            Bson::Document(doc) => Ok(doc),
            other => Err(Error::unsupported_value(format!(
                "the top-level value must encode as a document, got {:?}",
                other.element_type()
            ))),
        }
    }

    fn raise(&self, value: &Value, stack: &mut IdentityStack) -> Result<Bson> {
        match value {
            Value::Bson(bson) => Ok(bson.clone()),
            Value::Null => Ok(Bson::Null),
            Value::Boolean(b) => Ok(Bson::Boolean(*b)),
            Value::Int(n) => int_to_bson(*n),
            Value::Double(d) => Ok(Bson::Double(*d)),
            Value::String(s) => Ok(Bson::String(s.clone())),
            Value::DateTime(dt) => Ok(Bson::DateTime(*dt)),
            Value::ObjectId(id) => Ok(Bson::ObjectId(*id)),
            Value::Array(elements) => {
                stack.enter(Rc::as_ptr(elements) as *const ())?;
                let elements = elements.borrow();
                let mut array = Array::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    array.push(self.raise(element, stack).map_err(|e| e.at_index(index))?);
                }
                drop(elements);
                stack.exit();
                Ok(Bson::Array(array))
            }
            Value::Object(entries) => {
                stack.enter(Rc::as_ptr(entries) as *const ())?;
                let entries = entries.borrow();
                let mut doc = Document::new();
                for (key, entry) in entries.iter() {
                    let raised = self.raise(entry, stack).map_err(|e| e.at_key(key))?;
                    doc.insert(key.clone(), raised);
                }
                drop(entries);
                stack.exit();
                Ok(Bson::Document(doc))
            }
            Value::Custom(object) => {
                stack.enter(Rc::as_ptr(object) as *const ())?;
                let result = match self.convert_custom(object.as_ref()) {
                    Ok(replacement) => self.raise(&replacement, stack),
                    Err(cause) => Err(Error::unsupported_value(format!(
                        "{:?} could not be converted to BSON: {}",
                        object, cause
                    ))),
                };
                stack.exit();
                result
            }
        }
    }

    fn convert_custom(&self, object: &dyn Encodable) -> Result<Value> {
        match &self.to_encodable {
            Some(hook) => hook(object),
            None => object.to_bson(),
        }
    }
}

/// Store an integer in the narrowest BSON integer type that fits.
fn int_to_bson(n: i128) -> Result<Bson> {
    if let Ok(v) = i32::try_from(n) {
        Ok(Bson::Int32(v))
    } else if let Ok(v) = i64::try_from(n) {
        Ok(Bson::Int64(v))
    } else {
        Err(Error::integer_overflow(n))
    }
}
