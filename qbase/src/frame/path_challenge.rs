use bytes::{Buf, BufMut, Bytes};

use super::{EncodeFrame, FrameType, GetFrameType, io::{WriteFrame, take_array}};
use crate::{limits::Limits, varint::VarInt};

/// PATH_CHALLENGE frame.
///
/// See [section-19.17](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.17).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PathChallengeFrame {
    pub entropy: [u8; Limits::PATH_ENTROPY_LEN],
}

impl PathChallengeFrame {
    pub fn new(entropy: [u8; Limits::PATH_ENTROPY_LEN]) -> Self {
        Self { entropy }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        Ok(Self {
            entropy: take_array::<{ Limits::PATH_ENTROPY_LEN }>(payload, frame_type)?,
        })
    }
}

impl GetFrameType for PathChallengeFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::PathChallenge
    }
}

impl EncodeFrame for PathChallengeFrame {
    fn encoding_size(&self) -> usize {
        1 + Limits::PATH_ENTROPY_LEN
    }
}

impl<T: BufMut> WriteFrame<PathChallengeFrame> for T {
    fn put_frame(&mut self, frame: &PathChallengeFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_slice(&frame.entropy);
    }
}
