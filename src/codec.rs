//! The top-level codec facade.

use std::sync::Arc;

use crate::{
    decoder::{Decoder, Key},
    encoder::Encoder,
    error::Result,
    value::{Encodable, Value},
};

/// A BSON codec with optional conversion hooks.
///
/// The hooks supplied at construction become the codec's defaults; both can
/// be overridden for a single call with [`encode_with`](BsonCodec::encode_with)
/// and [`decode_with`](BsonCodec::decode_with). A codec is immutable once
/// built and can be shared freely between threads.
///
/// ```rust
/// use bson_codec::{doc, BsonCodec, Value};
///
/// let codec = BsonCodec::new();
/// let bytes = codec.encode(&Value::from(doc! { "eventide": true }))?;
/// let value = codec.decode(&bytes)?;
/// assert!(value.as_object().is_some());
/// # Ok::<(), bson_codec::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct BsonCodec {
    encoder: Encoder,
    decoder: Decoder,
}

impl BsonCodec {
    /// A codec with the default hooks: user-defined objects are converted
    /// through their [`Encodable`] implementation, and no reviver runs on
    /// decode.
    pub fn new() -> BsonCodec {
        BsonCodec::default()
    }

    /// Replace the default `to_encodable` hook.
    pub fn to_encodable(
        mut self,
        hook: impl Fn(&dyn Encodable) -> Result<Value> + Send + Sync + 'static,
    ) -> BsonCodec {
        self.encoder = Encoder::with_hook(Some(Arc::new(hook)));
        self
    }

    /// Replace the default reviver.
    pub fn reviver(
        mut self,
        reviver: impl Fn(Key<'_>, Value) -> Value + Send + Sync + 'static,
    ) -> BsonCodec {
        self.decoder = Decoder::with_reviver(Some(Arc::new(reviver)));
        self
    }

    /// Encode a host value to BSON bytes using the codec's default hook.
    ///
    /// The value must lower to a document at the top level; anything else is
    /// an unsupported-value error, reported before any bytes are produced.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        self.encoder.encode(value)
    }

    /// Encode with a one-off `to_encodable` hook overriding the default.
    pub fn encode_with(
        &self,
        value: &Value,
        hook: impl Fn(&dyn Encodable) -> Result<Value> + Send + Sync + 'static,
    ) -> Result<Vec<u8>> {
        Encoder::with_hook(Some(Arc::new(hook))).encode(value)
    }

    /// Decode BSON bytes to a host value using the codec's default reviver.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        self.decoder.decode(bytes)
    }

    /// Decode with a one-off reviver overriding the default.
    pub fn decode_with(
        &self,
        bytes: &[u8],
        reviver: impl Fn(Key<'_>, Value) -> Value + Send + Sync + 'static,
    ) -> Result<Value> {
        Decoder::with_reviver(Some(Arc::new(reviver))).decode(bytes)
    }

    /// The encoder bound to this codec's default hook.
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// The decoder bound to this codec's default reviver.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }
}
