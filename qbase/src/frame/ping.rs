use bytes::BufMut;

use super::{EncodeFrame, FrameType, GetFrameType, io::WriteFrame};

/// PING frame: a single type byte, no body.
///
/// See [section-19.2](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.2).
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct PingFrame;

impl GetFrameType for PingFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::Ping
    }
}

impl EncodeFrame for PingFrame {}

impl<T: BufMut> WriteFrame<PingFrame> for T {
    fn put_frame(&mut self, _frame: &PingFrame) {
        self.put_u8(0x01);
    }
}
