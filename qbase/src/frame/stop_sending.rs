use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// STOP_SENDING frame.
///
/// See [section-19.5](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.5).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StopSendingFrame {
    pub stream_id: VarInt,
    pub error_code: VarInt,
}

impl StopSendingFrame {
    pub fn new(stream_id: VarInt, error_code: VarInt) -> Self {
        Self { stream_id, error_code }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            stream_id: read_varint(payload, frame_type)?,
            error_code: read_varint(payload, frame_type)?,
        })
    }
}

impl GetFrameType for StopSendingFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::StopSending
    }
}

impl EncodeFrame for StopSendingFrame {
    fn encoding_size(&self) -> usize {
        1 + self.stream_id.encoding_size() + self.error_code.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<StopSendingFrame> for T {
    fn put_frame(&mut self, frame: &StopSendingFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.stream_id);
        self.put_varint(&frame.error_code);
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::frame::io::WriteFrame as _;

    #[test]
    fn round_trip() {
        let frame = StopSendingFrame::new(VarInt::from_u32(4), VarInt::from_u32(2));
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);
        let mut payload = buf.freeze();
        payload.advance(1);
        let decoded = StopSendingFrame::parse(&mut payload, FrameType::StopSending).unwrap();
        assert_eq!(decoded, frame);
    }
}
