use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::decoder::DecodeOptions;
use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtectedHeader};
use crate::protocols::data;

use super::chain::{Attempt, Scheme, ext_iv, plaintext_child};
use super::layout;

/// TKIP extended IV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WpaHeader {
    /// 48-bit TKIP sequence counter.
    pub tsc: u64,
    pub key_id: u8,
}

/// CCMP header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wpa2Header {
    /// 48-bit CCMP packet number.
    pub pn: u64,
    pub key_id: u8,
}

pub(super) fn attempt_wpa(body: &Bytes, options: &DecodeOptions) -> Result<Attempt, DecodeError> {
    if !has_ext_iv_header(body) {
        return Ok(Attempt::NotApplicable);
    }
    let seed = (body[0] | layout::TKIP_SEED_OR) & layout::TKIP_SEED_MASK;
    if body[1] != seed {
        return Ok(Attempt::NotApplicable);
    }
    // TSC1, WEP seed, TSC0, key id, TSC2..TSC5
    let header = WpaHeader {
        tsc: u64::from(body[2]) | u64::from(body[0]) << 8 | extended_iv(body) << 16,
        key_id: key_id(body),
    };
    let protocol = Protocol::Protected(ProtectedHeader::Wpa(header));
    envelope(
        Scheme::Wpa,
        protocol,
        ProtectedHeader::WpaData,
        layout::WPA_TRAILER_LEN,
        body,
        options,
    )
}

pub(super) fn attempt_wpa2(body: &Bytes, options: &DecodeOptions) -> Result<Attempt, DecodeError> {
    if !has_ext_iv_header(body) || body[layout::CCMP_RESERVED_OFFSET] != 0 {
        return Ok(Attempt::NotApplicable);
    }
    // PN0, PN1, reserved, key id, PN2..PN5
    let header = Wpa2Header {
        pn: u64::from(body[0]) | u64::from(body[1]) << 8 | extended_iv(body) << 16,
        key_id: key_id(body),
    };
    let protocol = Protocol::Protected(ProtectedHeader::Wpa2(header));
    envelope(
        Scheme::Wpa2,
        protocol,
        ProtectedHeader::Wpa2Data,
        layout::WPA2_TRAILER_LEN,
        body,
        options,
    )
}

fn has_ext_iv_header(body: &[u8]) -> bool {
    body.len() >= layout::EXT_IV_HEADER_LEN && ext_iv(body)
}

fn key_id(body: &[u8]) -> u8 {
    body[layout::KEY_ID_OFFSET] >> layout::KEY_ID_SHIFT
}

fn extended_iv(body: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[..4].copy_from_slice(&body[4..layout::EXT_IV_HEADER_LEN]);
    u64::from_le_bytes(bytes)
}

fn envelope(
    scheme: Scheme,
    protocol: Protocol,
    data_header: ProtectedHeader,
    trailer_len: usize,
    body: &Bytes,
    options: &DecodeOptions,
) -> Result<Attempt, DecodeError> {
    let header = body.slice(..layout::EXT_IV_HEADER_LEN);
    let encrypted = body.slice(layout::EXT_IV_HEADER_LEN..);

    let plaintext = options
        .temporal_key
        .as_ref()
        .and_then(|key| key.decrypt(scheme, &header, &encrypted));
    let child = match plaintext {
        Some(plaintext) if plaintext.len() == encrypted.len() && plaintext.len() >= trailer_len => {
            plaintext_child(
                Protocol::Protected(data_header),
                Bytes::from(plaintext),
                trailer_len,
                options,
            )?
        }
        Some(plaintext) => {
            debug!(
                ?scheme,
                plaintext = plaintext.len(),
                ciphertext = encrypted.len(),
                "decryptor output does not fit the frame"
            );
            data::decode(encrypted.clone())
        }
        None => data::decode(encrypted.clone()),
    };

    Ok(Attempt::Matched(
        Layer::new(protocol, header, encrypted).with_child(child),
    ))
}
