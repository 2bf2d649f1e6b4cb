use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// DATA_BLOCKED frame.
///
/// See [section-19.12](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.12).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DataBlockedFrame {
    pub max_data: VarInt,
}

impl DataBlockedFrame {
    pub fn new(max_data: VarInt) -> Self {
        Self { max_data }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            max_data: read_varint(payload, frame_type)?,
        })
    }
}

impl GetFrameType for DataBlockedFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::DataBlocked
    }
}

impl EncodeFrame for DataBlockedFrame {
    fn encoding_size(&self) -> usize {
        1 + self.max_data.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<DataBlockedFrame> for T {
    fn put_frame(&mut self, frame: &DataBlockedFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.max_data);
    }
}
