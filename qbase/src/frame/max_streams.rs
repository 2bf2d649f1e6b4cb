use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// MAX_STREAMS frame. `uni` distinguishes the unidirectional (`0x13`) from the
/// bidirectional (`0x12`) wire variant.
///
/// See [section-19.11](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.11).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MaxStreamsFrame {
    pub uni: bool,
    pub max_streams: VarInt,
}

impl MaxStreamsFrame {
    pub fn new(uni: bool, max_streams: VarInt) -> Self {
        Self { uni, max_streams }
    }

    pub(super) fn parse(payload: &mut Bytes, uni: bool) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            uni,
            max_streams: read_varint(payload, FrameType::MaxStreams(uni))?,
        })
    }
}

impl GetFrameType for MaxStreamsFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::MaxStreams(self.uni)
    }
}

impl EncodeFrame for MaxStreamsFrame {
    fn encoding_size(&self) -> usize {
        1 + self.max_streams.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<MaxStreamsFrame> for T {
    fn put_frame(&mut self, frame: &MaxStreamsFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.max_streams);
    }
}
