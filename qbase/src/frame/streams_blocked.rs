use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// STREAMS_BLOCKED frame. `uni` distinguishes the unidirectional (`0x17`) from
/// the bidirectional (`0x16`) wire variant.
///
/// See [section-19.14](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.14).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StreamsBlockedFrame {
    pub uni: bool,
    pub max_streams: VarInt,
}

impl StreamsBlockedFrame {
    pub fn new(uni: bool, max_streams: VarInt) -> Self {
        Self { uni, max_streams }
    }

    pub(super) fn parse(payload: &mut Bytes, uni: bool) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            uni,
            max_streams: read_varint(payload, FrameType::StreamsBlocked(uni))?,
        })
    }
}

impl GetFrameType for StreamsBlockedFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::StreamsBlocked(self.uni)
    }
}

impl EncodeFrame for StreamsBlockedFrame {
    fn encoding_size(&self) -> usize {
        1 + self.max_streams.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<StreamsBlockedFrame> for T {
    fn put_frame(&mut self, frame: &StreamsBlockedFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.max_streams);
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::frame::io::WriteFrame as _;

    #[test]
    fn round_trip_bidi_and_uni() {
        for uni in [false, true] {
            let frame = StreamsBlockedFrame::new(uni, VarInt::from_u32(3));
            let mut buf = BytesMut::new();
            buf.put_frame(&frame);
            let mut payload = buf.freeze();
            payload.advance(1);
            let decoded = StreamsBlockedFrame::parse(&mut payload, uni).unwrap();
            assert_eq!(decoded, frame);
        }
    }
}
