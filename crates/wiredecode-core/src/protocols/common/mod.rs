use std::fmt;

use serde::{Serialize, Serializer};

pub(crate) mod reader;

pub(crate) use reader::ByteReader;

/// IEEE 802 hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::MacAddr;

    #[test]
    fn mac_display_is_colon_separated() {
        let mac = MacAddr([0x00, 0x1b, 0x2c, 0x3d, 0x4e, 0xff]);
        assert_eq!(mac.to_string(), "00:1b:2c:3d:4e:ff");
    }

    #[test]
    fn mac_serializes_as_string() {
        let value = serde_json::to_value(MacAddr::BROADCAST).unwrap();
        assert_eq!(value, "ff:ff:ff:ff:ff:ff");
    }
}
