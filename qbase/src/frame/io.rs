//! Shared read/write helpers for frame encoding and decoding, plus the
//! per-packet frame dispatcher.

use bytes::{Buf, BufMut, Bytes};

use super::{
    AckFrame, ConnectionCloseFrame, CryptoFrame, DataBlockedFrame, Frame, FrameType,
    GetFrameType, HandshakeDoneFrame, MaxDataFrame, MaxStreamDataFrame, MaxStreamsFrame,
    NewConnectionIdFrame, NewTokenFrame, PaddingFrame, PathChallengeFrame, PathResponseFrame,
    PingFrame, ResetStreamFrame, RetireConnectionIdFrame, StopSendingFrame, StreamDataBlockedFrame,
    StreamFrame, StreamsBlockedFrame,
};
use crate::{
    error::{ErrorKind, QuicError},
    limits::FrameLimits,
    varint::VarInt,
};

/// Read one [`VarInt`] from `buf`, tagging truncation as a [`QuicError`] for `ft`.
pub(crate) fn read_varint(buf: &mut Bytes, ft: FrameType) -> Result<VarInt, QuicError> {
    VarInt::decode(buf).ok_or_else(|| {
        QuicError::new(
            ErrorKind::FrameEncodingError,
            ft,
            "truncated varint in frame",
        )
    })
}

/// Read one byte from `buf`, tagging truncation as a [`QuicError`] for `ft`.
pub(crate) fn read_u8(buf: &mut Bytes, ft: FrameType) -> Result<u8, QuicError> {
    if !buf.has_remaining() {
        return Err(QuicError::new(
            ErrorKind::FrameEncodingError,
            ft,
            "truncated frame",
        ));
    }
    Ok(buf.get_u8())
}

/// Take `n` bytes from the front of `buf` without copying the underlying storage.
pub(crate) fn take(buf: &mut Bytes, n: usize, ft: FrameType) -> Result<Bytes, QuicError> {
    if buf.remaining() < n {
        return Err(QuicError::new(
            ErrorKind::FrameEncodingError,
            ft,
            "frame declares more bytes than remain in the packet",
        ));
    }
    Ok(buf.copy_to_bytes(n))
}

/// Take a fixed-size array of bytes from the front of `buf`.
pub(crate) fn take_array<const N: usize>(buf: &mut Bytes, ft: FrameType) -> Result<[u8; N], QuicError> {
    let bytes = take(buf, N, ft)?;
    let mut array = [0u8; N];
    array.copy_from_slice(&bytes);
    Ok(array)
}

/// Implemented by every frame type (and by the sum type [`Frame`]) to serialize
/// itself onto a [`BufMut`].
pub trait WriteFrame<T> {
    fn put_frame(&mut self, frame: &T);
}

/// Parse exactly one frame from the front of `payload`, consuming its wire bytes.
///
/// Returns the frame and its [`FrameType`]. The caller (typically [`super::FrameReader`])
/// is responsible for stopping the outer loop on error: frames never partially
/// advance past a failure, so `payload` reflects the cursor at the point of failure.
pub fn be_frame(payload: &mut Bytes, limits: FrameLimits) -> Result<(Frame, FrameType), QuicError> {
    let type_byte = read_u8(payload, FrameType::Padding)?;
    let frame_type = FrameType::try_from(type_byte)?;
    let frame = match frame_type {
        FrameType::Padding => Frame::Padding(PaddingFrame::parse(payload)),
        FrameType::Ping => Frame::Ping(PingFrame),
        FrameType::Ack(_) => Frame::Ack(AckFrame::parse(payload, frame_type, limits)?),
        FrameType::ResetStream => Frame::ResetStream(ResetStreamFrame::parse(payload, frame_type)?),
        FrameType::StopSending => Frame::StopSending(StopSendingFrame::parse(payload, frame_type)?),
        FrameType::Crypto => {
            let (frame, data) = CryptoFrame::parse(payload, frame_type)?;
            Frame::Crypto(frame, data)
        }
        FrameType::NewToken => Frame::NewToken(NewTokenFrame::parse(payload, frame_type)?),
        FrameType::Stream(flags) => {
            let (frame, data) = StreamFrame::parse(payload, flags)?;
            Frame::Stream(frame, data)
        }
        FrameType::MaxData => Frame::MaxData(MaxDataFrame::parse(payload, frame_type)?),
        FrameType::MaxStreamData => {
            Frame::MaxStreamData(MaxStreamDataFrame::parse(payload, frame_type)?)
        }
        FrameType::MaxStreams(dir) => Frame::MaxStreams(MaxStreamsFrame::parse(payload, dir)?),
        FrameType::DataBlocked => Frame::DataBlocked(DataBlockedFrame::parse(payload, frame_type)?),
        FrameType::StreamDataBlocked => {
            Frame::StreamDataBlocked(StreamDataBlockedFrame::parse(payload, frame_type)?)
        }
        FrameType::StreamsBlocked(dir) => {
            Frame::StreamsBlocked(StreamsBlockedFrame::parse(payload, dir)?)
        }
        FrameType::NewConnectionId => {
            Frame::NewConnectionId(NewConnectionIdFrame::parse(payload, frame_type)?)
        }
        FrameType::RetireConnectionId => {
            Frame::RetireConnectionId(RetireConnectionIdFrame::parse(payload, frame_type)?)
        }
        FrameType::PathChallenge => {
            Frame::PathChallenge(PathChallengeFrame::parse(payload, frame_type)?)
        }
        FrameType::PathResponse => Frame::PathResponse(PathResponseFrame::parse(payload, frame_type)?),
        FrameType::ConnectionClose(layer) => {
            Frame::ConnectionClose(ConnectionCloseFrame::parse(payload, layer)?)
        }
        FrameType::HandshakeDone => Frame::HandshakeDone(HandshakeDoneFrame),
    };
    debug_assert_eq!(frame.frame_type(), frame_type);
    Ok((frame, frame_type))
}

impl<T: BufMut> WriteFrame<Frame> for T {
    fn put_frame(&mut self, frame: &Frame) {
        match frame {
            Frame::Padding(f) => self.put_frame(f),
            Frame::Ping(f) => self.put_frame(f),
            Frame::Ack(f) => self.put_frame(f),
            Frame::ResetStream(f) => self.put_frame(f),
            Frame::StopSending(f) => self.put_frame(f),
            Frame::Crypto(f, data) => {
                self.put_frame(f);
                self.put_slice(data);
            }
            Frame::NewToken(f) => self.put_frame(f),
            Frame::Stream(f, data) => {
                self.put_frame(f);
                self.put_slice(data);
            }
            Frame::MaxData(f) => self.put_frame(f),
            Frame::MaxStreamData(f) => self.put_frame(f),
            Frame::MaxStreams(f) => self.put_frame(f),
            Frame::DataBlocked(f) => self.put_frame(f),
            Frame::StreamDataBlocked(f) => self.put_frame(f),
            Frame::StreamsBlocked(f) => self.put_frame(f),
            Frame::NewConnectionId(f) => self.put_frame(f),
            Frame::RetireConnectionId(f) => self.put_frame(f),
            Frame::PathChallenge(f) => self.put_frame(f),
            Frame::PathResponse(f) => self.put_frame(f),
            Frame::ConnectionClose(f) => self.put_frame(f),
            Frame::HandshakeDone(f) => self.put_frame(f),
        }
    }
}
