use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// RESET_STREAM frame.
///
/// See [section-19.4](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.4).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ResetStreamFrame {
    pub stream_id: VarInt,
    pub error_code: VarInt,
    pub final_size: VarInt,
}

impl ResetStreamFrame {
    pub fn new(stream_id: VarInt, error_code: VarInt, final_size: VarInt) -> Self {
        Self {
            stream_id,
            error_code,
            final_size,
        }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            stream_id: read_varint(payload, frame_type)?,
            error_code: read_varint(payload, frame_type)?,
            final_size: read_varint(payload, frame_type)?,
        })
    }
}

impl GetFrameType for ResetStreamFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::ResetStream
    }
}

impl EncodeFrame for ResetStreamFrame {
    fn encoding_size(&self) -> usize {
        1 + self.stream_id.encoding_size() + self.error_code.encoding_size() + self.final_size.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<ResetStreamFrame> for T {
    fn put_frame(&mut self, frame: &ResetStreamFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.stream_id);
        self.put_varint(&frame.error_code);
        self.put_varint(&frame.final_size);
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::frame::io::WriteFrame as _;

    #[test]
    fn round_trip() {
        let frame = ResetStreamFrame::new(VarInt::from_u32(4), VarInt::from_u32(1), VarInt::from_u32(100));
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);
        let mut payload = buf.freeze();
        payload.advance(1);
        let decoded = ResetStreamFrame::parse(&mut payload, FrameType::ResetStream).unwrap();
        assert_eq!(decoded, frame);
    }
}
