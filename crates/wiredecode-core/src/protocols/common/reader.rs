use std::ops::Range;

use crate::error::DecodeError;
use crate::layer::ProtocolKind;

use super::MacAddr;

/// Bounds-checked view over one layer's bytes.
///
/// Every read reports the owning layer in its error so a short buffer can be
/// traced back to the decoder that tripped over it.
pub struct ByteReader<'a> {
    layer: ProtocolKind,
    bytes: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(layer: ProtocolKind, bytes: &'a [u8]) -> Self {
        Self { layer, bytes }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.bytes.len() < needed {
            return Err(self.too_short(needed));
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or_else(|| self.too_short(offset + 1))
    }

    pub fn read_u16_be(&self, range: Range<usize>) -> Result<u16, DecodeError> {
        let bytes = self.read_array::<2>(range)?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_u16_le(&self, range: Range<usize>) -> Result<u16, DecodeError> {
        let bytes = self.read_array::<2>(range)?;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn read_u32_le(&self, range: Range<usize>) -> Result<u32, DecodeError> {
        let bytes = self.read_array::<4>(range)?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_u64_le(&self, range: Range<usize>) -> Result<u64, DecodeError> {
        let bytes = self.read_array::<8>(range)?;
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_array<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| DecodeError::TooShort {
            layer: self.layer,
            needed: N,
            actual: bytes.len(),
        })
    }

    pub fn read_mac(&self, range: Range<usize>) -> Result<MacAddr, DecodeError> {
        self.read_array::<6>(range).map(MacAddr)
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.bytes
            .get(range.clone())
            .ok_or_else(|| self.too_short(range.end))
    }

    fn too_short(&self, needed: usize) -> DecodeError {
        DecodeError::TooShort {
            layer: self.layer,
            needed,
            actual: self.bytes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ByteReader;
    use crate::error::DecodeError;
    use crate::layer::ProtocolKind;

    #[test]
    fn reads_both_endiannesses() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        let reader = ByteReader::new(ProtocolKind::Llc, &bytes);
        assert_eq!(reader.read_u16_be(0..2).unwrap(), 0x1234);
        assert_eq!(reader.read_u16_le(0..2).unwrap(), 0x3412);
        assert_eq!(reader.read_u32_le(0..4).unwrap(), 0x7856_3412);
    }

    #[test]
    fn short_read_names_the_layer() {
        let bytes = [0u8; 3];
        let reader = ByteReader::new(ProtocolKind::Snap, &bytes);
        let err = reader.read_u16_be(2..4).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                layer: ProtocolKind::Snap,
                needed: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn read_u8_past_end() {
        let reader = ByteReader::new(ProtocolKind::Arp, &[]);
        assert!(matches!(
            reader.read_u8(0),
            Err(DecodeError::TooShort { needed: 1, .. })
        ));
    }
}
