//! The per-packet frame processing loop: iterate every frame in a decrypted
//! payload, apply its side effects, and accumulate [`PacketInfo`].

use bytes::Bytes;
use qbase::{error::QuicError, frame::FrameReader};

use crate::{collaborators::DecodeCx, decode, packet_info::PacketInfo};

/// Process every frame in `payload` against `cx`, stopping at the first
/// decode error (the outer packet is abandoned, per this core's error model).
pub fn process_frames(payload: Bytes, cx: &DecodeCx<'_>) -> Result<PacketInfo, QuicError> {
    let mut info = PacketInfo::default();
    let mut reader = FrameReader::new(payload);
    for result in &mut reader {
        let (frame, frame_type) = result?;
        decode::apply(cx, &frame)?;
        info.observe(frame_type);
    }
    Ok(info)
}
