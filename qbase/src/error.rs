//! Transport error classification for the frame layer.
//!
//! Mirrors the error code space of
//! [section-20.1](https://www.rfc-editor.org/rfc/rfc9000.html#section-20.1) of
//! [QUIC](https://www.rfc-editor.org/rfc/rfc9000.html), as far as this layer can
//! produce it. Congestion/loss/crypto errors are out of scope and owned by other
//! collaborators.

use std::borrow::Cow;

use crate::frame::FrameType;

/// The RFC 9000 §20.1 transport error codes this layer can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `INTERNAL_ERROR` (0x1) — allocation failure or other implementation bug.
    InternalError,
    /// `PROTOCOL_VIOLATION` (0xa) — a frame violates a MUST in RFC 9000.
    ProtocolViolation,
    /// `FLOW_CONTROL_ERROR` (0x3) — a peer exceeded an advertised data limit.
    FlowControlError,
    /// `STREAM_LIMIT_ERROR` (0x4) — a peer exceeded an advertised stream-count limit.
    StreamLimitError,
    /// `STREAM_STATE_ERROR` (0x5) — a frame is invalid for the stream's current state.
    StreamStateError,
    /// `FINAL_SIZE_ERROR` (0x6) — conflicting final sizes were observed for a stream.
    FinalSizeError,
    /// `FRAME_ENCODING_ERROR` (0x7) — a frame was malformed.
    FrameEncodingError,
    /// `CONNECTION_ID_LIMIT_ERROR` (0x9) — too many connection IDs issued or retired.
    ConnectionIdLimitError,
}

impl ErrorKind {
    /// The wire-level error code RFC 9000 §20.1 assigns to this kind.
    pub const fn code(self) -> u64 {
        match self {
            ErrorKind::InternalError => 0x1,
            ErrorKind::FlowControlError => 0x3,
            ErrorKind::StreamLimitError => 0x4,
            ErrorKind::StreamStateError => 0x5,
            ErrorKind::FinalSizeError => 0x6,
            ErrorKind::FrameEncodingError => 0x7,
            ErrorKind::ConnectionIdLimitError => 0x9,
            ErrorKind::ProtocolViolation => 0xa,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InternalError => "INTERNAL_ERROR",
            ErrorKind::ProtocolViolation => "PROTOCOL_VIOLATION",
            ErrorKind::FlowControlError => "FLOW_CONTROL_ERROR",
            ErrorKind::StreamLimitError => "STREAM_LIMIT_ERROR",
            ErrorKind::StreamStateError => "STREAM_STATE_ERROR",
            ErrorKind::FinalSizeError => "FINAL_SIZE_ERROR",
            ErrorKind::FrameEncodingError => "FRAME_ENCODING_ERROR",
            ErrorKind::ConnectionIdLimitError => "CONNECTION_ID_LIMIT_ERROR",
        };
        write!(f, "{name}")
    }
}

/// An error raised while encoding, decoding, or applying the side effects of a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {reason}{}", frame_type.map(|t| format!(" (frame type {t:?})")).unwrap_or_default())]
pub struct QuicError {
    pub kind: ErrorKind,
    pub frame_type: Option<FrameType>,
    pub reason: Cow<'static, str>,
}

impl QuicError {
    pub fn new(kind: ErrorKind, frame_type: impl Into<Option<FrameType>>, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            frame_type: frame_type.into(),
            reason: reason.into(),
        }
    }

    /// A `PROTOCOL_VIOLATION` with no frame-type context, for errors detected before
    /// the frame type is even known to be valid (e.g. an out-of-range type byte).
    pub fn protocol_violation(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ProtocolViolation, None, reason)
    }
}
