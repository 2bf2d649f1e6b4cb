//! Core QUIC frame codec: encode/decode for the RFC 9000 §12–§19
//! transport-layer frame set, plus the per-packet dispatch table that
//! classifies frames as ack-eliciting, ack-immediate, and non-probing.
//!
//! Packet headers, AEAD, congestion/loss, and userspace connection APIs are
//! external collaborators, not covered by this crate.

pub mod error;
pub mod frame;
pub mod limits;
pub mod varint;
