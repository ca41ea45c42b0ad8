use thiserror::Error;

/// A frame that could not be turned into an [`InboundMessage`].
///
/// Every variant keeps the raw payload so it can be reported verbatim.
///
/// [`InboundMessage`]: crate::protocol::InboundMessage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {reason}")]
    Decode { reason: String, raw: String },
    #[error("unknown message type `{kind}`")]
    UnknownMessageType { kind: String, raw: String },
    #[error("unexpected binary frame of {len} bytes")]
    BinaryFrame { len: usize, raw: String },
}

impl ProtocolError {
    pub fn decode(raw: &str, reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    pub fn unknown_type(raw: &str, kind: impl Into<String>) -> Self {
        Self::UnknownMessageType {
            kind: kind.into(),
            raw: raw.to_string(),
        }
    }

    /// The protocol is text-only; a binary frame keeps a lossy UTF-8 copy
    /// of its payload for the report.
    pub fn binary(bytes: &[u8]) -> Self {
        Self::BinaryFrame {
            len: bytes.len(),
            raw: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Decode { raw, .. }
            | Self::UnknownMessageType { raw, .. }
            | Self::BinaryFrame { raw, .. } => raw,
        }
    }
}
