//! Module containing functionality related to BSON binary values.

use std::fmt::{self, Display};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::{
    error::{Error, Result},
    spec::BinarySubtype,
};

/// Represents a BSON binary value.
///
/// For the deprecated `BinaryOld` subtype, `bytes` holds the payload data
/// only; the redundant inner length prefix mandated by that subtype is
/// written and verified by the codec itself.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Binary({:#x}, {})",
            u8::from(self.subtype),
            BASE64.encode(&self.bytes)
        )
    }
}

impl Binary {
    /// Creates a [`Binary`] from a base64 string and optional
    /// [`BinarySubtype`]. If the `subtype` argument is [`None`], the
    /// [`Binary`] constructed will default to [`BinarySubtype::Generic`].
    pub fn from_base64(
        input: impl AsRef<str>,
        subtype: impl Into<Option<BinarySubtype>>,
    ) -> Result<Self> {
        let bytes = BASE64.decode(input.as_ref()).map_err(Error::binary)?;
        let subtype = match subtype.into() {
            Some(s) => s,
            None => BinarySubtype::Generic,
        };
        Ok(Binary { subtype, bytes })
    }
}
