//! Caveats: conditions attached to certificates.
//!
//! A caveat on the wire is just an id and opaque parameter bytes. Its meaning
//! is resolved at validation time by looking the id up in a caveat registry.
//! The built-in kinds have typed payloads described by [`CaveatPayload`].

use bytes::Bytes;
use ciborium::value::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::encode_value;
use crate::error::{Error, Result};
use crate::types::CaveatId;

/// Id of the caveat that is always satisfied.
pub const UNCONSTRAINED_CAVEAT: CaveatId = CaveatId([
    0x4c, 0xa4, 0x8e, 0x9b, 0x2a, 0x11, 0x40, 0x5c, 0x8a, 0x01, 0x6d, 0x3e, 0x00, 0x00, 0x00, 0x01,
]);

/// Id of the caveat restricting the methods a call may invoke.
pub const METHOD_CAVEAT: CaveatId = CaveatId([
    0x4c, 0xa4, 0x8e, 0x9b, 0x2a, 0x11, 0x40, 0x5c, 0x8a, 0x01, 0x6d, 0x3e, 0x00, 0x00, 0x00, 0x02,
]);

/// Id of the caveat bounding the call timestamp.
pub const EXPIRY_CAVEAT: CaveatId = CaveatId([
    0x4c, 0xa4, 0x8e, 0x9b, 0x2a, 0x11, 0x40, 0x5c, 0x8a, 0x01, 0x6d, 0x3e, 0x00, 0x00, 0x00, 0x03,
]);

/// A condition attached to a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caveat {
    /// Which validator interprets `params`.
    pub id: CaveatId,

    /// CBOR-encoded validator parameters.
    pub params: Bytes,
}

/// Typed payloads of the built-in caveat kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaveatPayload {
    /// Always valid.
    Unconstrained,
    /// Valid iff the call's method is one of `methods`.
    Method { methods: Vec<String> },
    /// Valid iff the call's timestamp (Unix ms) is at or before `deadline`.
    Expiry { deadline: i64 },
}

impl CaveatPayload {
    /// The caveat id for this kind.
    pub fn id(&self) -> CaveatId {
        match self {
            CaveatPayload::Unconstrained => UNCONSTRAINED_CAVEAT,
            CaveatPayload::Method { .. } => METHOD_CAVEAT,
            CaveatPayload::Expiry { .. } => EXPIRY_CAVEAT,
        }
    }

    /// Encode into a wire caveat.
    pub fn to_caveat(&self) -> Caveat {
        let value = match self {
            CaveatPayload::Unconstrained => Value::Bool(true),
            CaveatPayload::Method { methods } => {
                Value::Array(methods.iter().cloned().map(Value::Text).collect())
            }
            CaveatPayload::Expiry { deadline } => Value::Integer((*deadline).into()),
        };
        Caveat {
            id: self.id(),
            params: Bytes::from(encode_value(&value)),
        }
    }

    /// Decode a wire caveat into a built-in payload.
    ///
    /// Returns `Ok(None)` for caveat ids that are not built in.
    pub fn from_caveat(caveat: &Caveat) -> Result<Option<Self>> {
        let payload = match caveat.id {
            UNCONSTRAINED_CAVEAT => {
                let _: bool = caveat.decode_params()?;
                CaveatPayload::Unconstrained
            }
            METHOD_CAVEAT => CaveatPayload::Method {
                methods: caveat.decode_params()?,
            },
            EXPIRY_CAVEAT => CaveatPayload::Expiry {
                deadline: caveat.decode_params()?,
            },
            _ => return Ok(None),
        };
        Ok(Some(payload))
    }
}

impl Caveat {
    /// Create a caveat from an id and any serializable parameters.
    pub fn new<P: Serialize>(id: CaveatId, params: &P) -> Result<Self> {
        let mut buf = Vec::new();
        ciborium::into_writer(params, &mut buf).map_err(|e| Error::Encoding(e.to_string()))?;
        Ok(Self {
            id,
            params: Bytes::from(buf),
        })
    }

    /// A caveat that is always satisfied.
    pub fn unconstrained() -> Self {
        CaveatPayload::Unconstrained.to_caveat()
    }

    /// A caveat satisfied only by calls to one of `methods`.
    pub fn method<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CaveatPayload::Method {
            methods: methods.into_iter().map(Into::into).collect(),
        }
        .to_caveat()
    }

    /// A caveat satisfied only by calls made at or before `deadline` (Unix ms).
    pub fn expiry(deadline: i64) -> Self {
        CaveatPayload::Expiry { deadline }.to_caveat()
    }

    /// Decode the parameters into the shape a validator expects.
    pub fn decode_params<P: DeserializeOwned>(&self) -> Result<P> {
        ciborium::from_reader(&self.params[..]).map_err(|e| Error::Decoding(e.to_string()))
    }

    /// The built-in payload, if this is a built-in caveat.
    pub fn payload(&self) -> Option<CaveatPayload> {
        CaveatPayload::from_caveat(self).ok().flatten()
    }
}

impl fmt::Display for Caveat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Some(CaveatPayload::Unconstrained) => f.write_str("unconstrained"),
            Some(CaveatPayload::Method { methods }) => write!(f, "method[{}]", methods.join(",")),
            Some(CaveatPayload::Expiry { deadline }) => write!(f, "expiry[{}]", deadline),
            None => write!(f, "caveat[{}; {} bytes]", self.id, self.params.len()),
        }
    }
}
