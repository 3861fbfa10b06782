use bytes::Bytes;

use crate::layer::Layer;

/// Wrap whatever is left as a terminal data layer.
pub(crate) fn decode(data: Bytes) -> Layer {
    Layer::opaque(data)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::decode;
    use crate::layer::ProtocolKind;

    #[test]
    fn data_is_terminal() {
        let layer = decode(Bytes::from_static(&[1, 2, 3]));
        assert_eq!(layer.kind(), ProtocolKind::Data);
        assert!(layer.header().is_empty());
        assert_eq!(layer.body().as_ref(), &[1, 2, 3]);
        assert!(layer.child().is_none());
    }

    #[test]
    fn empty_data_is_valid() {
        let layer = decode(Bytes::new());
        assert_eq!(layer.wire_len(), 0);
    }
}
