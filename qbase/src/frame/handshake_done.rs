use bytes::BufMut;

use super::{EncodeFrame, FrameType, GetFrameType, io::WriteFrame};

/// HANDSHAKE_DONE frame: a single type byte, no body.
///
/// See [section-19.20](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.20).
/// Only ever sent by a server.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct HandshakeDoneFrame;

impl GetFrameType for HandshakeDoneFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::HandshakeDone
    }
}

impl EncodeFrame for HandshakeDoneFrame {}

impl<T: BufMut> WriteFrame<HandshakeDoneFrame> for T {
    fn put_frame(&mut self, _frame: &HandshakeDoneFrame) {
        self.put_u8(0x1e);
    }
}
