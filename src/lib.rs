#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(inline)]
pub use self::{
    binary::Binary,
    bson::{Array, Bson, DbPointer, Regex, Timestamp},
    codec::BsonCodec,
    datetime::DateTime,
    decoder::{Decoder, Key, Reviver},
    document::Document,
    encoder::{Encoder, ToEncodable},
    error::{Error, ErrorKind, Result},
    value::{Encodable, SharedArray, SharedObject, Value},
};

#[macro_use]
mod macros;
pub mod binary;
mod bson;
pub mod codec;
pub mod datetime;
pub mod decoder;
pub mod document;
pub mod encoder;
pub mod error;
pub mod oid;
mod reader;
pub mod spec;
pub mod value;
mod writer;
