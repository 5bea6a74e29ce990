//! Constants derived from the [BSON Specification](http://bsonspec.org/spec.html).

use std::fmt;

/// Declares the type-tag registry: the enum itself plus the byte-to-variant
/// lookup, generated from one table so the two cannot drift apart.
macro_rules! element_type_registry {
    ($($(#[$attr:meta])* $name:ident = $tag:literal,)+) => {
        /// All available BSON element types.
        ///
        /// Not every element type is representable as a
        /// [`Bson`](crate::Bson) value: `Symbol` values are decoded as plain
        /// strings, and no codec is provided for the reserved
        /// `JavaScriptCodeWithScope` and `Decimal128` entries.
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        #[repr(u8)]
        pub enum ElementType {
            $($(#[$attr])* $name = $tag,)+
        }

        impl ElementType {
            /// Look up the element type selected by a type-tag byte.
            #[inline]
            pub fn from_tag(tag: u8) -> Option<ElementType> {
                match tag {
                    $($tag => Some(ElementType::$name),)+
                    _ => None,
                }
            }
        }
    };
}

element_type_registry! {
    /// 64-bit binary floating point
    Double = 0x01,
    /// UTF-8 string
    String = 0x02,
    /// Embedded document
    EmbeddedDocument = 0x03,
    /// Array
    Array = 0x04,
    /// Binary data
    Binary = 0x05,
    /// Deprecated. Undefined (value)
    Undefined = 0x06,
    /// ObjectId
    ObjectId = 0x07,
    /// Boolean value
    Boolean = 0x08,
    /// UTC datetime
    DateTime = 0x09,
    /// Null value
    Null = 0x0A,
    /// Regular expression
    RegularExpression = 0x0B,
    /// Deprecated. DBPointer
    DbPointer = 0x0C,
    /// JavaScript code
    JavaScriptCode = 0x0D,
    /// Deprecated. Decoded as a plain string value.
    Symbol = 0x0E,
    /// Deprecated. Reserved; no codec is provided.
    JavaScriptCodeWithScope = 0x0F,
    /// 32-bit integer
    Int32 = 0x10,
    /// Timestamp
    Timestamp = 0x11,
    /// 64-bit integer
    Int64 = 0x12,
    /// 128-bit decimal floating point. Reserved; no codec is provided.
    Decimal128 = 0x13,
    /// Max key
    MaxKey = 0x7F,
    /// Min key
    MinKey = 0xFF,
}

/// A one-byte discriminator for the semantic kind of a binary payload.
///
/// Subtype bytes outside the named set round-trip through the
/// `UserDefined` slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BinarySubtype {
    Generic,
    Function,
    BinaryOld,
    UuidOld,
    Uuid,
    Md5,
    UserDefined(u8),
}

impl From<u8> for BinarySubtype {
    #[inline]
    fn from(byte: u8) -> BinarySubtype {
        use self::BinarySubtype::*;
        match byte {
            0x00 => Generic,
            0x01 => Function,
            0x02 => BinaryOld,
            0x03 => UuidOld,
            0x04 => Uuid,
            0x05 => Md5,
            other => UserDefined(other),
        }
    }
}

impl From<BinarySubtype> for u8 {
    #[inline]
    fn from(subtype: BinarySubtype) -> u8 {
        use self::BinarySubtype::*;
        match subtype {
            Generic => 0x00,
            Function => 0x01,
            BinaryOld => 0x02,
            UuidOld => 0x03,
            Uuid => 0x04,
            Md5 => 0x05,
            UserDefined(byte) => byte,
        }
    }
}

impl fmt::LowerHex for BinarySubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&u8::from(*self), f)
    }
}
