use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::protocols::protected::Scheme;

/// What to do with a WEP payload once it has been decrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IcvPolicy {
    /// Check the CRC-32 ICV; a mismatch fails the decode with
    /// [`DecodeError::IcvMismatch`](crate::DecodeError::IcvMismatch).
    #[default]
    Verify,
    /// Legacy behaviour: decrypt, drop the plaintext and keep the encrypted
    /// body as opaque data, as if verification had always failed.
    Discard,
}

/// Shared WEP secret (the part of the RC4 key that follows the IV).
#[derive(Clone, PartialEq, Eq)]
pub struct WepKey(Vec<u8>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WepKeyError {
    #[error("invalid hex digit in WEP key")]
    InvalidHex,
    #[error("WEP key must be 5 or 13 bytes, got {0}")]
    InvalidLength(usize),
}

impl WepKey {
    /// 40-bit and 104-bit secrets, as used by WEP-64 and WEP-128.
    pub const VALID_LENGTHS: [usize; 2] = [5, 13];

    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, WepKeyError> {
        let secret = secret.into();
        if !Self::VALID_LENGTHS.contains(&secret.len()) {
            return Err(WepKeyError::InvalidLength(secret.len()));
        }
        Ok(Self(secret))
    }

    /// Parse `0102030405` or `01:02:03:04:05`.
    pub fn from_hex(text: &str) -> Result<Self, WepKeyError> {
        let digits: Vec<u8> = text.bytes().filter(|b| *b != b':').collect();
        if digits.len() % 2 != 0 {
            return Err(WepKeyError::InvalidHex);
        }
        let secret = digits
            .chunks(2)
            .map(|pair| {
                let hi = hex_value(pair[0])?;
                let lo = hex_value(pair[1])?;
                Some(hi << 4 | lo)
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or(WepKeyError::InvalidHex)?;
        Self::new(secret)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for WepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WepKey({} bytes)", self.0.len())
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Supplies plaintext for TKIP/CCMP protected frames.
///
/// `header` is the 8-byte IV/extended-IV header, `ciphertext` everything that
/// follows it. Implementations return the decrypted MSDU followed by its
/// integrity trailer (MIC and ICV for WPA, MIC for WPA2), or `None` when the
/// frame cannot be decrypted with the keys they hold. A returned buffer whose
/// length differs from `ciphertext` is ignored.
pub trait TemporalKeyDecryptor: Send + Sync {
    fn decrypt(&self, scheme: Scheme, header: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>>;
}

/// Per-call decode configuration.
///
/// Nothing in here changes during a decode; per-frame wireless state (FCS,
/// QoS, Address-4, protection) travels inside the `Decoder` values instead.
#[derive(Clone)]
pub struct DecodeOptions {
    pub wep_key: Option<WepKey>,
    pub temporal_key: Option<Arc<dyn TemporalKeyDecryptor>>,
    pub icv_policy: IcvPolicy,
    /// FCS assumption for 802.11 frames that are not preceded by RadioTap.
    pub dot11_fcs_at_end: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            wep_key: None,
            temporal_key: None,
            icv_policy: IcvPolicy::default(),
            dot11_fcs_at_end: true,
        }
    }
}

impl DecodeOptions {
    pub fn with_wep_key(mut self, key: WepKey) -> Self {
        self.wep_key = Some(key);
        self
    }

    pub fn with_temporal_key(mut self, decryptor: Arc<dyn TemporalKeyDecryptor>) -> Self {
        self.temporal_key = Some(decryptor);
        self
    }

    pub fn with_icv_policy(mut self, policy: IcvPolicy) -> Self {
        self.icv_policy = policy;
        self
    }

    pub fn with_dot11_fcs_at_end(mut self, fcs_at_end: bool) -> Self {
        self.dot11_fcs_at_end = fcs_at_end;
        self
    }
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("wep_key", &self.wep_key)
            .field("temporal_key", &self.temporal_key.is_some())
            .field("icv_policy", &self.icv_policy)
            .field("dot11_fcs_at_end", &self.dot11_fcs_at_end)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeOptions, IcvPolicy, WepKey, WepKeyError};

    #[test]
    fn wep_key_from_hex_with_separators() {
        let key = WepKey::from_hex("01:02:03:0a:FF").unwrap();
        assert_eq!(key.as_bytes(), &[0x01, 0x02, 0x03, 0x0a, 0xff]);
    }

    #[test]
    fn wep_key_rejects_odd_lengths() {
        assert_eq!(WepKey::from_hex("0102030"), Err(WepKeyError::InvalidHex));
        assert_eq!(WepKey::from_hex("zz02030405"), Err(WepKeyError::InvalidHex));
        assert_eq!(
            WepKey::new(vec![0u8; 8]),
            Err(WepKeyError::InvalidLength(8))
        );
    }

    #[test]
    fn wep_key_debug_hides_secret() {
        let key = WepKey::new(*b"abcde").unwrap();
        assert_eq!(format!("{key:?}"), "WepKey(5 bytes)");
    }

    #[test]
    fn defaults_assume_fcs_and_verify_icv() {
        let options = DecodeOptions::default();
        assert!(options.dot11_fcs_at_end);
        assert_eq!(options.icv_policy, IcvPolicy::Verify);
        assert!(options.wep_key.is_none());
    }
}
