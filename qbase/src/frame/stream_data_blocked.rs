use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// STREAM_DATA_BLOCKED frame.
///
/// See [section-19.13](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.13).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StreamDataBlockedFrame {
    pub stream_id: VarInt,
    pub max_stream_data: VarInt,
}

impl StreamDataBlockedFrame {
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

impl GetFrameType for StreamDataBlockedFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::StreamDataBlocked
    }
}

impl EncodeFrame for StreamDataBlockedFrame {
    fn encoding_size(&self) -> usize {
        1 + self.stream_id.encoding_size() + self.max_stream_data.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<StreamDataBlockedFrame> for T {
    fn put_frame(&mut self, frame: &StreamDataBlockedFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.stream_id);
        self.put_varint(&frame.max_stream_data);
    }
}
