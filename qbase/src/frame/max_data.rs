use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// MAX_DATA frame.
///
/// See [section-19.9](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.9).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MaxDataFrame {
    pub max_data: VarInt,
}

impl MaxDataFrame {
    pub fn new(max_data: VarInt) -> Self {
        Self { max_data }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            max_data: read_varint(payload, frame_type)?,
        })
    }
}

impl GetFrameType for MaxDataFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::MaxData
    }
}

impl EncodeFrame for MaxDataFrame {
    fn encoding_size(&self) -> usize {
        1 + self.max_data.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<MaxDataFrame> for T {
    fn put_frame(&mut self, frame: &MaxDataFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.max_data);
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::frame::io::WriteFrame as _;

    #[test]
    fn round_trip() {
        let frame = MaxDataFrame::new(VarInt::from_u32(1 << 20));
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);
        let mut payload = buf.freeze();
        payload.advance(1);
        let decoded = MaxDataFrame::parse(&mut payload, FrameType::MaxData).unwrap();
        assert_eq!(decoded, frame);
    }
}
