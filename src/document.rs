//! A BSON document represented as an associative map with insertion ordering.

use std::fmt::{self, Debug, Display, Formatter};

use indexmap::IndexMap;
pub use indexmap::map::{IntoIter, Iter, IterMut, Keys, Values};

use crate::{
    binary::Binary,
    bson::{Array, Bson, Timestamp},
    datetime::DateTime,
    error::{Error, Result},
    oid::ObjectId,
    spec::BinarySubtype,
};

/// A BSON document represented as an associative map with insertion ordering.
#[derive(Clone, PartialEq)]
pub struct Document {
    inner: IndexMap<String, Bson>,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Display for Document {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str("{")?;

        let mut first = true;
        for (k, v) in self {
            if first {
                first = false;
                fmt.write_str(" ")?;
            } else {
                fmt.write_str(", ")?;
            }

            write!(fmt, "\"{}\": {}", k, v)?;
        }

        write!(fmt, "{}}}", if !first { " " } else { "" })
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Document({:?})", self.inner)
    }
}

impl IntoIterator for Document {
    type Item = (String, Bson);
    type IntoIter = IntoIter<String, Bson>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Bson);
    type IntoIter = Iter<'a, String, Bson>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<S: Into<String>, B: Into<Bson>> FromIterator<(S, B)> for Document {
    fn from_iter<T: IntoIterator<Item = (S, B)>>(iter: T) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl<S: Into<String>, B: Into<Bson>> Extend<(S, B)> for Document {
    fn extend<T: IntoIterator<Item = (S, B)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl From<IndexMap<String, Bson>> for Document {
    fn from(map: IndexMap<String, Bson>) -> Document {
        Document { inner: map }
    }
}

impl Document {
    /// Creates a new empty Document.
    pub fn new() -> Document {
        Document {
            inner: IndexMap::new(),
        }
    }

    /// Decode a [`Document`] from its BSON byte representation.
    pub fn from_slice(data: &[u8]) -> Result<Document> {
        crate::decoder::decode_document(data)
    }

    /// Encode the document to its BSON byte representation.
    pub fn to_vec(&self) -> Vec<u8> {
        crate::encoder::document_to_vec(self)
    }

    /// Gets an iterator over the entries of the map in insertion order.
    pub fn iter(&self) -> Iter<'_, String, Bson> {
        self.into_iter()
    }

    /// Gets an iterator over pairs of keys and mutable values in insertion
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, String, Bson> {
        self.inner.iter_mut()
    }

    /// Clears the document, removing all values.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Returns a reference to the [`Bson`] corresponding to the key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Bson> {
        self.inner.get(key.as_ref())
    }

    /// Gets a mutable reference to the [`Bson`] corresponding to the key.
    pub fn get_mut(&mut self, key: impl AsRef<str>) -> Option<&mut Bson> {
        self.inner.get_mut(key.as_ref())
    }

    fn get_with<'a, T: 'a>(
        &'a self,
        key: impl AsRef<str>,
        f: impl FnOnce(&'a Bson) -> Option<T>,
    ) -> Result<T> {
        let key = key.as_ref();
        let bson = self
            .get(key)
            .ok_or_else(|| Error::value_access_not_present().with_key(key))?;
        f(bson).ok_or_else(|| Error::value_access_unexpected_type().with_key(key))
    }

    /// Get a floating point value for this key if it exists and has the
    /// correct type.
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<f64> {
        self.get_with(key, Bson::as_f64)
    }

    /// Get a string slice for this key if it exists and has the correct type.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<&str> {
        self.get_with(key, Bson::as_str)
    }

    /// Get a reference to an array for this key if it exists and has the
    /// correct type.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<&Array> {
        self.get_with(key, Bson::as_array)
    }

    /// Get a reference to a document for this key if it exists and has the
    /// correct type.
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<&Document> {
        self.get_with(key, Bson::as_document)
    }

    /// Get a bool value for this key if it exists and has the correct type.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<bool> {
        self.get_with(key, Bson::as_bool)
    }

    /// Returns whether this key has a null value.
    pub fn is_null(&self, key: impl AsRef<str>) -> bool {
        self.get(key) == Some(&Bson::Null)
    }

    /// Get an i32 value for this key if it exists and has the correct type.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<i32> {
        self.get_with(key, Bson::as_i32)
    }

    /// Get an i64 value for this key if it exists and has the correct type.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<i64> {
        self.get_with(key, Bson::as_i64)
    }

    /// Get a timestamp value for this key if it exists and has the correct
    /// type.
    pub fn get_timestamp(&self, key: impl AsRef<str>) -> Result<Timestamp> {
        self.get_with(key, Bson::as_timestamp)
    }

    /// Get a reference to a generic binary value for this key if it exists
    /// and has the correct type.
    pub fn get_binary_generic(&self, key: impl AsRef<str>) -> Result<&Vec<u8>> {
        self.get_with(key, |bson| match bson {
            Bson::Binary(Binary {
                subtype: BinarySubtype::Generic,
                bytes,
            }) => Some(bytes),
            _ => None,
        })
    }

    /// Get an object id value for this key if it exists and has the correct
    /// type.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<ObjectId> {
        self.get_with(key, Bson::as_object_id)
    }

    /// Get a reference to a UTC datetime value for this key if it exists and
    /// has the correct type.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<&DateTime> {
        self.get_with(key, Bson::as_datetime)
    }

    /// Returns true if the map contains a value for the specified key.
    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.inner.contains_key(key.as_ref())
    }

    /// Gets a collection of all keys in the document.
    pub fn keys(&self) -> Keys<'_, String, Bson> {
        self.inner.keys()
    }

    /// Gets a collection of all values in the document.
    pub fn values(&self) -> Values<'_, String, Bson> {
        self.inner.values()
    }

    /// Returns the number of elements in the document.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the document contains no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Sets the value of the entry with the key, and returns the entry's old
    /// value, if any. Accepts any type that can be converted into [`Bson`].
    pub fn insert(&mut self, key: impl Into<String>, val: impl Into<Bson>) -> Option<Bson> {
        self.inner.insert(key.into(), val.into())
    }

    /// Takes the value of the entry out of the document, and returns it.
    /// The order of the remaining entries is preserved.
    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<Bson> {
        self.inner.shift_remove(key.as_ref())
    }
}
