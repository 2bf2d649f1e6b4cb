use bytes::{Buf, BufMut, Bytes};

use super::{EncodeFrame, FrameType, GetFrameType, io::{WriteFrame, take_array}};
use crate::{limits::Limits, varint::VarInt};

/// PATH_RESPONSE frame.
///
/// See [section-19.18](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.18).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PathResponseFrame {
    pub entropy: [u8; Limits::PATH_ENTROPY_LEN],
}

impl PathResponseFrame {
    pub fn new(entropy: [u8; Limits::PATH_ENTROPY_LEN]) -> Self {
        Self { entropy }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            entropy: take_array::<{ Limits::PATH_ENTROPY_LEN }>(payload, frame_type)?,
        })
    }
}

impl GetFrameType for PathResponseFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::PathResponse
    }
}

impl EncodeFrame for PathResponseFrame {
    fn encoding_size(&self) -> usize {
        1 + Limits::PATH_ENTROPY_LEN
    }
}

impl<T: BufMut> WriteFrame<PathResponseFrame> for T {
    fn put_frame(&mut self, frame: &PathResponseFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_slice(&frame.entropy);
    }
}
