use bytes::{Buf, BufMut, Bytes};

use super::{EncodeFrame, FrameType, GetFrameType, io::WriteFrame};

/// PADDING frame.
///
/// See [section-19.1](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.1)
/// of [QUIC](https://www.rfc-editor.org/rfc/rfc9000.html).
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct PaddingFrame;

impl PaddingFrame {
    /// Consume every remaining zero byte of `payload`, run-length collapsed into
    /// a single logical PADDING frame.
    pub(super) fn parse(payload: &mut Bytes) -> Self {
        let n = payload.chunk().iter().take_while(|b| **b == 0).count();
        payload.advance(n);
        PaddingFrame
    }
}

impl GetFrameType for PaddingFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::Padding
    }
}

impl EncodeFrame for PaddingFrame {}

impl<T: BufMut> WriteFrame<PaddingFrame> for T {
    fn put_frame(&mut self, _frame: &PaddingFrame) {
        self.put_u8(0x00);
    }
}

/// Write a run of `frame_len` PADDING frames plus the one this call represents.
///
/// Each zero byte on the wire is itself a complete PADDING frame (type `0x00`
/// with no body), so asking to pad by `frame_len` additional frames produces
/// `frame_len + 1` zero bytes in total.
pub fn put_padding<T: BufMut>(buf: &mut T, frame_len: usize) {
    for _ in 0..=frame_len {
        buf.put_u8(0x00);
    }
}
