use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// MAX_STREAM_DATA frame.
///
/// See [section-19.10](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.10).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MaxStreamDataFrame {
    pub stream_id: VarInt,
    pub max_stream_data: VarInt,
}

impl MaxStreamDataFrame {
    pub fn new(stream_id: VarInt, max_stream_data: VarInt) -> Self {
        Self {
            stream_id,
            max_stream_data,
        }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            stream_id: read_varint(payload, frame_type)?,
            max_stream_data: read_varint(payload, frame_type)?,
        })
    }
}

impl GetFrameType for MaxStreamDataFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::MaxStreamData
    }
}

impl EncodeFrame for MaxStreamDataFrame {
    fn encoding_size(&self) -> usize {
        1 + self.stream_id.encoding_size() + self.max_stream_data.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<MaxStreamDataFrame> for T {
    fn put_frame(&mut self, frame: &MaxStreamDataFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.stream_id);
        self.put_varint(&frame.max_stream_data);
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::frame::io::WriteFrame as _;

    #[test]
    fn round_trip() {
        let frame = MaxStreamDataFrame::new(VarInt::from_u32(4), VarInt::from_u32(1024));
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);
        let mut payload = buf.freeze();
        payload.advance(1);
        let decoded = MaxStreamDataFrame::parse(&mut payload, FrameType::MaxStreamData).unwrap();
        assert_eq!(decoded, frame);
    }
}
