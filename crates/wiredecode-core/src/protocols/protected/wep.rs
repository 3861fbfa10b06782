use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, trace};

use crate::decoder::{DecodeOptions, IcvPolicy, WepKey};
use crate::error::DecodeError;
use crate::layer::{Layer, Protocol, ProtectedHeader};
use crate::protocols::data;

use super::chain::{Attempt, ext_iv, plaintext_child};
use super::icv::crc32;
use super::layout;
use super::rc4::Rc4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WepHeader {
    pub iv: [u8; 3],
    pub key_id: u8,
}

/// WEP header (IV and key id, no ExtIV). Bodies with fewer than eight bytes
/// after the header are never decrypted.
///
/// # Errors
/// `IcvMismatch` when a decrypted body fails its CRC-32 under `Verify`.
pub(super) fn attempt(body: &Bytes, options: &DecodeOptions) -> Result<Attempt, DecodeError> {
    if body.len() < layout::WEP_HEADER_LEN || ext_iv(body) {
        return Ok(Attempt::NotApplicable);
    }
    let mut iv = [0u8; 3];
    iv.copy_from_slice(&body[layout::IV_RANGE]);
    let header = WepHeader {
        iv,
        key_id: body[layout::KEY_ID_OFFSET] >> layout::KEY_ID_SHIFT,
    };
    let encrypted = body.slice(layout::WEP_HEADER_LEN..);

    let child = match &options.wep_key {
        Some(key) if encrypted.len() >= layout::WEP_MIN_DECRYPT_LEN => {
            decrypt(&header, key, encrypted.clone(), options)?
        }
        Some(_) => {
            debug!(len = encrypted.len(), "wep body too short to decrypt");
            data::decode(encrypted.clone())
        }
        None => data::decode(encrypted.clone()),
    };

    let protocol = Protocol::Protected(ProtectedHeader::Wep(header));
    Ok(Attempt::Matched(
        Layer::new(protocol, body.slice(..layout::WEP_HEADER_LEN), encrypted).with_child(child),
    ))
}

fn decrypt(
    header: &WepHeader,
    key: &WepKey,
    encrypted: Bytes,
    options: &DecodeOptions,
) -> Result<Layer, DecodeError> {
    let mut seed = header.iv.to_vec();
    seed.extend_from_slice(key.as_bytes());
    let mut plaintext = encrypted.to_vec();
    Rc4::new(&seed).apply_keystream(&mut plaintext);

    let split = plaintext.len() - layout::ICV_LEN;
    let mut icv = [0u8; layout::ICV_LEN];
    icv.copy_from_slice(&plaintext[split..]);
    let expected = u32::from_le_bytes(icv);
    let computed = crc32(&plaintext[..split]);

    match options.icv_policy {
        IcvPolicy::Discard => {
            trace!("decrypted wep payload discarded by policy");
            Ok(data::decode(encrypted))
        }
        IcvPolicy::Verify if expected != computed => {
            Err(DecodeError::IcvMismatch { expected, computed })
        }
        IcvPolicy::Verify => {
            let protocol = Protocol::Protected(ProtectedHeader::WepData { icv: expected });
            plaintext_child(protocol, Bytes::from(plaintext), layout::ICV_LEN, options)
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::attempt;
    use crate::decoder::{DecodeOptions, IcvPolicy, WepKey};
    use crate::error::DecodeError;
    use crate::layer::{Layer, Protocol, ProtectedHeader, ProtocolKind};
    use crate::protocols::protected::chain::Attempt;
    use crate::protocols::protected::icv::crc32;
    use crate::protocols::protected::rc4::Rc4;

    const SECRET: [u8; 5] = [0x0a, 0x0b, 0x0c, 0x0d, 0x0e];
    const IV: [u8; 3] = [0x11, 0x22, 0x33];
    const PLAINTEXT: &[u8] = &[0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x88, 0xb5, 0xca, 0xfe];

    fn wep_body(icv_delta: u32) -> Bytes {
        let mut payload = PLAINTEXT.to_vec();
        payload.extend_from_slice(&(crc32(PLAINTEXT) ^ icv_delta).to_le_bytes());
        let mut seed = IV.to_vec();
        seed.extend_from_slice(&SECRET);
        Rc4::new(&seed).apply_keystream(&mut payload);

        let mut body = IV.to_vec();
        body.push(0x40);
        body.extend_from_slice(&payload);
        Bytes::from(body)
    }

    fn options(policy: IcvPolicy) -> DecodeOptions {
        DecodeOptions::default()
            .with_wep_key(WepKey::new(SECRET.to_vec()).unwrap())
            .with_icv_policy(policy)
    }

    fn matched(result: Result<Attempt, DecodeError>) -> Layer {
        match result.unwrap() {
            Attempt::Matched(layer) => layer,
            Attempt::NotApplicable => panic!("expected wep to match"),
        }
    }

    #[test]
    fn verified_payload_continues_to_llc() {
        let body = wep_body(0);
        let layer = matched(attempt(&body, &options(IcvPolicy::Verify)));
        assert_eq!(
            layer.kinds(),
            vec![
                ProtocolKind::Wep,
                ProtocolKind::WepData,
                ProtocolKind::Llc,
                ProtocolKind::Snap,
                ProtocolKind::Data
            ]
        );
        let Protocol::Protected(ProtectedHeader::Wep(header)) = layer.protocol() else {
            panic!("expected wep header");
        };
        assert_eq!(header.iv, IV);
        assert_eq!(header.key_id, 1);

        let wep_data = layer.child().unwrap();
        assert_eq!(wep_data.wire_len(), layer.body().len());
        assert_eq!(wep_data.body().as_ref(), PLAINTEXT);
        assert_eq!(wep_data.trailer().as_ref(), &crc32(PLAINTEXT).to_le_bytes());
        assert_eq!(layer.leaf().body().as_ref(), &[0xca, 0xfe]);
    }

    #[test]
    fn corrupted_icv_fails_verification() {
        let body = wep_body(1);
        let err = attempt(&body, &options(IcvPolicy::Verify)).err().unwrap();
        assert_eq!(
            err,
            DecodeError::IcvMismatch {
                expected: crc32(PLAINTEXT) ^ 1,
                computed: crc32(PLAINTEXT),
            }
        );
    }

    #[test]
    fn discard_policy_keeps_ciphertext_opaque() {
        let body = wep_body(0);
        let layer = matched(attempt(&body, &options(IcvPolicy::Discard)));
        assert_eq!(layer.kinds(), vec![ProtocolKind::Wep, ProtocolKind::Data]);
        assert_eq!(layer.child().unwrap().body(), &body.slice(4..));
    }

    #[test]
    fn no_key_means_opaque() {
        let body = wep_body(0);
        let layer = matched(attempt(&body, &DecodeOptions::default()));
        assert_eq!(layer.kinds(), vec![ProtocolKind::Wep, ProtocolKind::Data]);
    }

    #[test]
    fn short_body_is_not_decrypted() {
        let body = Bytes::from_static(&[0x11, 0x22, 0x33, 0x00, 1, 2, 3, 4, 5, 6, 7]);
        let layer = matched(attempt(&body, &options(IcvPolicy::Verify)));
        assert_eq!(layer.kinds(), vec![ProtocolKind::Wep, ProtocolKind::Data]);
        assert_eq!(layer.child().unwrap().wire_len(), 7);
    }

    #[test]
    fn ext_iv_is_not_wep() {
        let body = Bytes::from_static(&[0x00, 0x20, 0x00, 0x20, 0, 0, 0, 0]);
        assert!(matches!(
            attempt(&body, &DecodeOptions::default()),
            Ok(Attempt::NotApplicable)
        ));
    }
}
