//! Core QUIC frames: the tagged union of ~20 frame kinds this core knows how to
//! encode and decode (RFC 9000 §12–§19), plus the dispatch table that drives
//! per-packet frame iteration.
//!
//! Packet headers, AEAD, and datagram-extension framing are out of scope here;
//! see the crate-level documentation.

use bytes::{Buf, Bytes};

use crate::{error::QuicError, varint::VarInt};

mod ack;
mod connection_close;
mod crypto;
mod data_blocked;
mod handshake_done;
mod max_data;
mod max_stream_data;
mod max_streams;
mod new_connection_id;
mod new_token;
mod padding;
mod path_challenge;
mod path_response;
mod ping;
mod reset_stream;
mod retire_connection_id;
mod stop_sending;
mod stream;
mod stream_data_blocked;
mod streams_blocked;

/// IO module for frame encoding and decoding.
pub mod io;

pub use ack::{AckFrame, GapAckBlock};
pub use connection_close::ConnectionCloseFrame;
pub use crypto::CryptoFrame;
pub use data_blocked::DataBlockedFrame;
pub use handshake_done::HandshakeDoneFrame;
pub use max_data::MaxDataFrame;
pub use max_stream_data::MaxStreamDataFrame;
pub use max_streams::MaxStreamsFrame;
pub use new_connection_id::{ConnIdEntry, NewConnectionIdFrame};
pub use new_token::NewTokenFrame;
pub use padding::PaddingFrame;
pub use path_challenge::PathChallengeFrame;
pub use path_response::PathResponseFrame;
pub use ping::PingFrame;
pub use reset_stream::ResetStreamFrame;
pub use retire_connection_id::RetireConnectionIdFrame;
pub use stop_sending::StopSendingFrame;
pub use stream::{StreamFrame, StreamId};
pub use stream_data_blocked::StreamDataBlockedFrame;
pub use streams_blocked::StreamsBlockedFrame;

/// Define the basic behaviors for all kinds of frames.
pub trait GetFrameType: std::fmt::Debug {
    /// Return the type of frame.
    fn frame_type(&self) -> FrameType;
}

/// Size estimation for a frame's encoding.
pub trait EncodeFrame {
    /// Upper bound on the number of bytes needed to encode this value.
    fn max_encoding_size(&self) -> usize {
        1
    }

    /// The exact number of bytes needed to encode this value.
    fn encoding_size(&self) -> usize {
        1
    }
}

/// The classification bits [table-3](https://www.rfc-editor.org/rfc/rfc9000.html#table-3)
/// of [QUIC](https://www.rfc-editor.org/rfc/rfc9000.html) assigns to each frame type,
/// plus the ack-urgency bit this core's ACK scheduler relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spec {
    /// Receiving this frame does not oblige the peer to eventually send an ACK.
    ///
    /// See [Section 13.2](https://www.rfc-editor.org/rfc/rfc9000.html#generating-acks).
    NonAckEliciting = 1,
    /// A packet containing only frames with this marking can be used to probe
    /// new network paths during connection migration; receiving one does not
    /// by itself confirm the peer's reachability on a new path.
    ///
    /// See [Section 9.1](https://www.rfc-editor.org/rfc/rfc9000.html#probing).
    ProbeOnly = 2,
    /// An ack-eliciting frame of this kind may be acknowledged after the usual
    /// max-ack-delay, rather than demanding an immediate ACK.
    DelayableAck = 4,
}

pub trait ContainSpec {
    fn contain(&self, spec: Spec) -> bool;
}

impl ContainSpec for u8 {
    #[inline]
    fn contain(&self, spec: Spec) -> bool {
        *self & spec as u8 != 0
    }
}

/// The sum type of all the core QUIC frame types this core can encode and decode.
///
/// See [table-3](https://www.rfc-editor.org/rfc/rfc9000.html#table-3) and
/// [frame types and formats](https://www.rfc-editor.org/rfc/rfc9000.html#name-frame-types-and-formats).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameType {
    /// PADDING frame, see [`PaddingFrame`].
    Padding,
    /// PING frame, see [`PingFrame`].
    Ping,
    /// ACK frame, see [`AckFrame`]. The payload carries the ECN flag (always `false` here).
    Ack(bool),
    /// RESET_STREAM frame, see [`ResetStreamFrame`].
    ResetStream,
    /// STOP_SENDING frame, see [`StopSendingFrame`].
    StopSending,
    /// CRYPTO frame, see [`CryptoFrame`].
    Crypto,
    /// NEW_TOKEN frame, see [`NewTokenFrame`].
    NewToken,
    /// STREAM frame, see [`StreamFrame`]. The payload carries the OFF/LEN/FIN subflags.
    Stream(u8),
    /// MAX_DATA frame, see [`MaxDataFrame`].
    MaxData,
    /// MAX_STREAM_DATA frame, see [`MaxStreamDataFrame`].
    MaxStreamData,
    /// MAX_STREAMS frame, see [`MaxStreamsFrame`]. The payload is `true` for unidirectional.
    MaxStreams(bool),
    /// DATA_BLOCKED frame, see [`DataBlockedFrame`].
    DataBlocked,
    /// STREAM_DATA_BLOCKED frame, see [`StreamDataBlockedFrame`].
    StreamDataBlocked,
    /// STREAMS_BLOCKED frame, see [`StreamsBlockedFrame`]. The payload is `true` for unidirectional.
    StreamsBlocked(bool),
    /// NEW_CONNECTION_ID frame, see [`NewConnectionIdFrame`].
    NewConnectionId,
    /// RETIRE_CONNECTION_ID frame, see [`RetireConnectionIdFrame`].
    RetireConnectionId,
    /// PATH_CHALLENGE frame, see [`PathChallengeFrame`].
    PathChallenge,
    /// PATH_RESPONSE frame, see [`PathResponseFrame`].
    PathResponse,
    /// CONNECTION_CLOSE frame, see [`ConnectionCloseFrame`]. The payload is `true` for the
    /// application-layer variant (0x1d).
    ConnectionClose(bool),
    /// HANDSHAKE_DONE frame, see [`HandshakeDoneFrame`].
    HandshakeDone,
}

impl FrameType {
    /// The specification bits this frame type carries, see [`Spec`].
    pub fn specs(&self) -> u8 {
        let (n, p, d) = (
            Spec::NonAckEliciting as u8,
            Spec::ProbeOnly as u8,
            Spec::DelayableAck as u8,
        );
        match self {
            FrameType::Padding => n | p,
            FrameType::Ack(_) => n,
            FrameType::ConnectionClose(_) => n,
            FrameType::PathChallenge | FrameType::PathResponse | FrameType::NewConnectionId => {
                p | d
            }
            FrameType::NewToken
            | FrameType::MaxData
            | FrameType::MaxStreamData
            | FrameType::MaxStreams(_)
            | FrameType::DataBlocked
            | FrameType::StreamDataBlocked
            | FrameType::StreamsBlocked(_)
            | FrameType::RetireConnectionId => d,
            _ => 0,
        }
    }

    /// Whether receiving this frame obliges the peer to eventually emit an ACK.
    ///
    /// All types except PADDING, ACK, and CONNECTION_CLOSE.
    pub fn is_ack_eliciting(&self) -> bool {
        !self.specs().contain(Spec::NonAckEliciting)
    }

    /// Whether this frame demands an immediate ACK rather than tolerating the
    /// usual max-ack-delay. Only meaningful for ack-eliciting frames.
    pub fn is_ack_immediate(&self) -> bool {
        self.is_ack_eliciting() && !self.specs().contain(Spec::DelayableAck)
    }

    /// Whether receipt of this frame from a new address confirms the peer's
    /// reachability on that path.
    ///
    /// All types except PATH_CHALLENGE, PATH_RESPONSE, NEW_CONNECTION_ID, and PADDING.
    pub fn is_non_probing(&self) -> bool {
        !self.specs().contain(Spec::ProbeOnly)
    }
}

impl TryFrom<u8> for FrameType {
    type Error = QuicError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            0x00 => FrameType::Padding,
            0x01 => FrameType::Ping,
            ty @ (0x02 | 0x03) => FrameType::Ack(ty & 0b1 != 0),
            0x04 => FrameType::ResetStream,
            0x05 => FrameType::StopSending,
            0x06 => FrameType::Crypto,
            0x07 => FrameType::NewToken,
            ty @ 0x08..=0x0f => FrameType::Stream(ty & 0b111),
            0x10 => FrameType::MaxData,
            0x11 => FrameType::MaxStreamData,
            ty @ (0x12 | 0x13) => FrameType::MaxStreams(ty & 0b1 != 0),
            0x14 => FrameType::DataBlocked,
            0x15 => FrameType::StreamDataBlocked,
            ty @ (0x16 | 0x17) => FrameType::StreamsBlocked(ty & 0b1 != 0),
            0x18 => FrameType::NewConnectionId,
            0x19 => FrameType::RetireConnectionId,
            0x1a => FrameType::PathChallenge,
            0x1b => FrameType::PathResponse,
            ty @ (0x1c | 0x1d) => FrameType::ConnectionClose(ty & 0x1 != 0),
            0x1e => FrameType::HandshakeDone,
            _ => return Err(QuicError::protocol_violation(format!("unknown frame type 0x{byte:02x}"))),
        })
    }
}

impl From<FrameType> for VarInt {
    fn from(frame_type: FrameType) -> Self {
        VarInt::from_u32(match frame_type {
            FrameType::Padding => 0x00,
            FrameType::Ping => 0x01,
            FrameType::Ack(ecn) => 0x02 | ecn as u32,
            FrameType::ResetStream => 0x04,
            FrameType::StopSending => 0x05,
            FrameType::Crypto => 0x06,
            FrameType::NewToken => 0x07,
            FrameType::Stream(flags) => 0x08 | flags as u32,
            FrameType::MaxData => 0x10,
            FrameType::MaxStreamData => 0x11,
            FrameType::MaxStreams(uni) => 0x12 | uni as u32,
            FrameType::DataBlocked => 0x14,
            FrameType::StreamDataBlocked => 0x15,
            FrameType::StreamsBlocked(uni) => 0x16 | uni as u32,
            FrameType::NewConnectionId => 0x18,
            FrameType::RetireConnectionId => 0x19,
            FrameType::PathChallenge => 0x1a,
            FrameType::PathResponse => 0x1b,
            FrameType::ConnectionClose(app) => 0x1c | app as u32,
            FrameType::HandshakeDone => 0x1e,
        })
    }
}

impl From<FrameType> for u64 {
    fn from(frame_type: FrameType) -> Self {
        VarInt::from(frame_type).into_inner()
    }
}

/// Sum type of all the frames.
///
/// The STREAM and CRYPTO variants carry their data payload alongside the typed
/// header, since the payload is a zero-copy slice of the packet's `Bytes`
/// rather than part of the fixed-size header struct.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Frame {
    Padding(PaddingFrame),
    Ping(PingFrame),
    Ack(AckFrame),
    ResetStream(ResetStreamFrame),
    StopSending(StopSendingFrame),
    Crypto(CryptoFrame, Bytes),
    NewToken(NewTokenFrame),
    Stream(StreamFrame, Bytes),
    MaxData(MaxDataFrame),
    MaxStreamData(MaxStreamDataFrame),
    MaxStreams(MaxStreamsFrame),
    DataBlocked(DataBlockedFrame),
    StreamDataBlocked(StreamDataBlockedFrame),
    StreamsBlocked(StreamsBlockedFrame),
    NewConnectionId(NewConnectionIdFrame),
    RetireConnectionId(RetireConnectionIdFrame),
    PathChallenge(PathChallengeFrame),
    PathResponse(PathResponseFrame),
    ConnectionClose(ConnectionCloseFrame),
    HandshakeDone(HandshakeDoneFrame),
}

impl GetFrameType for Frame {
    fn frame_type(&self) -> FrameType {
        match self {
            Frame::Padding(f) => f.frame_type(),
            Frame::Ping(f) => f.frame_type(),
            Frame::Ack(f) => f.frame_type(),
            Frame::ResetStream(f) => f.frame_type(),
            Frame::StopSending(f) => f.frame_type(),
            Frame::Crypto(f, _) => f.frame_type(),
            Frame::NewToken(f) => f.frame_type(),
            Frame::Stream(f, _) => f.frame_type(),
            Frame::MaxData(f) => f.frame_type(),
            Frame::MaxStreamData(f) => f.frame_type(),
            Frame::MaxStreams(f) => f.frame_type(),
            Frame::DataBlocked(f) => f.frame_type(),
            Frame::StreamDataBlocked(f) => f.frame_type(),
            Frame::StreamsBlocked(f) => f.frame_type(),
            Frame::NewConnectionId(f) => f.frame_type(),
            Frame::RetireConnectionId(f) => f.frame_type(),
            Frame::PathChallenge(f) => f.frame_type(),
            Frame::PathResponse(f) => f.frame_type(),
            Frame::ConnectionClose(f) => f.frame_type(),
            Frame::HandshakeDone(f) => f.frame_type(),
        }
    }
}

/// Reads frames from a packet payload until the buffer is empty.
///
/// `Iterator::next` returns `None` once the payload is fully consumed, or once
/// a decode error occurs (after which the reader should be discarded — the
/// outer packet is abandoned on any frame-level protocol violation).
#[derive(Debug)]
pub struct FrameReader {
    payload: Bytes,
    limits: crate::limits::FrameLimits,
    errored: bool,
}

impl FrameReader {
    /// Creates a [`FrameReader`] over a cleartext packet payload, accepting up
    /// to [`crate::limits::FrameLimits::max_ack_ranges_recv`] gap ack blocks
    /// per ACK frame.
    pub fn new(payload: Bytes) -> Self {
        Self::with_limits(payload, crate::limits::FrameLimits::default())
    }

    /// Creates a [`FrameReader`] with a caller-supplied receive-side [`crate::limits::FrameLimits`].
    pub fn with_limits(payload: Bytes, limits: crate::limits::FrameLimits) -> Self {
        Self {
            payload,
            limits,
            errored: false,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.payload.remaining()
    }
}

impl Iterator for FrameReader {
    type Item = Result<(Frame, FrameType), QuicError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.errored || !self.payload.has_remaining() {
            return None;
        }
        match io::be_frame(&mut self.payload, self.limits) {
            Ok(parsed) => Some(Ok(parsed)),
            Err(e) => {
                self.errored = true;
                Some(Err(e))
            }
        }
    }
}
