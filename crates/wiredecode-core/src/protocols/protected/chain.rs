use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::layer::{Layer, Protocol};
use crate::protocols::data;

use super::{layout, wep, wpa};

/// Confidentiality scheme of a protected data frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    Wep,
    /// TKIP.
    Wpa,
    /// CCMP.
    Wpa2,
}

impl Scheme {
    /// Order in which schemes claim a protected body.
    pub const CHAIN: [Scheme; 3] = [Scheme::Wep, Scheme::Wpa, Scheme::Wpa2];

    fn attempt(self, body: &Bytes, options: &DecodeOptions) -> Result<Attempt, DecodeError> {
        match self {
            Scheme::Wep => wep::attempt(body, options),
            Scheme::Wpa => wpa::attempt_wpa(body, options),
            Scheme::Wpa2 => wpa::attempt_wpa2(body, options),
        }
    }
}

/// Outcome of offering a protected body to one scheme.
pub(crate) enum Attempt {
    Matched(Layer),
    NotApplicable,
}

/// Run the body through WEP, WPA and WPA2 in turn; the first scheme whose
/// signature matches owns the subtree. Nothing matching leaves the body opaque.
///
/// # Errors
/// `IcvMismatch` under [`crate::IcvPolicy::Verify`], or any error from the
/// decrypted payload's LLC chain.
pub(crate) fn decode_protected(body: Bytes, options: &DecodeOptions) -> Result<Layer, DecodeError> {
    for scheme in Scheme::CHAIN {
        if let Attempt::Matched(layer) = scheme.attempt(&body, options)? {
            return Ok(layer);
        }
    }
    debug!(len = body.len(), "protected body matches no known scheme");
    Ok(data::decode(body))
}

pub(super) fn ext_iv(body: &[u8]) -> bool {
    body.get(layout::KEY_ID_OFFSET)
        .is_some_and(|byte| byte & layout::EXT_IV_FLAG != 0)
}

/// Build the decrypted node: payload as body (decoded as LLC), the last
/// `trailer_len` plaintext bytes as trailer.
pub(super) fn plaintext_child(
    protocol: Protocol,
    plaintext: Bytes,
    trailer_len: usize,
    options: &DecodeOptions,
) -> Result<Layer, DecodeError> {
    let split = plaintext.len().saturating_sub(trailer_len);
    let body = plaintext.slice(..split);
    let child = Decoder::Llc.decode_payload(body.clone(), options)?;
    Ok(Layer::new(protocol, Bytes::new(), body)
        .with_trailer(plaintext.slice(split..))
        .with_child(child))
}
