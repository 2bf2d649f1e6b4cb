use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint, take},
};
use crate::varint::VarInt;

/// NEW_TOKEN frame.
///
/// See [section-19.7](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.7).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewTokenFrame {
    pub token: Bytes,
}

impl NewTokenFrame {
    pub fn new(token: Bytes) -> Self {
        Self { token }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, crate::error::QuicError> {
        let length = read_varint(payload, frame_type)?;
        let token = take(payload, length.into_inner() as usize, frame_type)?;
        Ok(Self { token })
    }
}

impl GetFrameType for NewTokenFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::NewToken
    }
}

impl EncodeFrame for NewTokenFrame {
    fn encoding_size(&self) -> usize {
        1 + VarInt::try_from(self.token.len()).unwrap().encoding_size() + self.token.len()
    }
}

impl<T: BufMut> WriteFrame<NewTokenFrame> for T {
    fn put_frame(&mut self, frame: &NewTokenFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&VarInt::try_from(frame.token.len()).expect("token length fits in a varint"));
        self.put_slice(&frame.token);
    }
}
