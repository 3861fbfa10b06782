use std::fmt::Display;

use thiserror::Error;

use crate::layer::ProtocolKind;

/// Structural failure while decoding a packet.
///
/// Unknown discriminants, confidentiality scheme mismatches and payloads too
/// short for the next layer's fixed header are not errors: they resolve to an
/// opaque data layer. Any `DecodeError` aborts the whole
/// decode call, so a caller either gets a fully linked chain or this value.
///
/// # Examples
/// ```
/// use wiredecode_core::{DecodeError, ProtocolKind};
///
/// let err = DecodeError::TooShort {
///     layer: ProtocolKind::Ethernet,
///     needed: 14,
///     actual: 3,
/// };
/// assert_eq!(err.layer(), ProtocolKind::Ethernet);
/// assert!(err.to_string().contains("need 14 bytes"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{layer}: buffer too short: need {needed} bytes, got {actual}")]
    TooShort {
        layer: ProtocolKind,
        needed: usize,
        actual: usize,
    },
    #[error("{layer}: declared length {declared} does not fit the {available} available bytes")]
    InvalidLength {
        layer: ProtocolKind,
        declared: usize,
        available: usize,
    },
    #[error("{layer}: unsupported version {version}")]
    UnsupportedVersion { layer: ProtocolKind, version: u8 },
    #[error("{layer}: invalid header: {message}")]
    Header {
        layer: ProtocolKind,
        message: String,
    },
    #[error("wep: ICV mismatch: frame carries {expected:#010x}, plaintext hashes to {computed:#010x}")]
    IcvMismatch { expected: u32, computed: u32 },
}

impl DecodeError {
    /// Layer whose decoder reported the failure.
    pub fn layer(&self) -> ProtocolKind {
        match self {
            DecodeError::TooShort { layer, .. }
            | DecodeError::InvalidLength { layer, .. }
            | DecodeError::UnsupportedVersion { layer, .. }
            | DecodeError::Header { layer, .. } => *layer,
            DecodeError::IcvMismatch { .. } => ProtocolKind::Wep,
        }
    }

    pub(crate) fn header(layer: ProtocolKind, err: impl Display) -> Self {
        DecodeError::Header {
            layer,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DecodeError;
    use crate::layer::ProtocolKind;

    #[test]
    fn icv_mismatch_belongs_to_wep() {
        let err = DecodeError::IcvMismatch {
            expected: 1,
            computed: 2,
        };
        assert_eq!(err.layer(), ProtocolKind::Wep);
        assert!(err.to_string().contains("0x00000001"));
    }

    #[test]
    fn header_error_keeps_message() {
        let err = DecodeError::header(ProtocolKind::Ipv4, "bad ihl");
        assert_eq!(err.to_string(), "ipv4: invalid header: bad ihl");
    }
}
