use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::varint::VarInt;

/// RETIRE_CONNECTION_ID frame.
///
/// See [section-19.16](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.16).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RetireConnectionIdFrame {
    pub seqno: VarInt,
}

impl RetireConnectionIdFrame {
    pub fn new(seqno: VarInt) -> Self {
        Self { seqno }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            seqno: read_varint(payload, frame_type)?,
        })
    }
}

impl GetFrameType for RetireConnectionIdFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::RetireConnectionId
    }
}

impl EncodeFrame for RetireConnectionIdFrame {
    fn encoding_size(&self) -> usize {
        1 + self.seqno.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<RetireConnectionIdFrame> for T {
    fn put_frame(&mut self, frame: &RetireConnectionIdFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.seqno);
    }
}
