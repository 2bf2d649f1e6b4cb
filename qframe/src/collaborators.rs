//! Narrow interfaces to the collaborators this core relies on but does not
//! own: the packet-number map, the outbound/inbound queues, the stream table,
//! connection-ID sets, the socket, and the RNG.
//!
//! Production connections wire these to the real state machines (packet
//! protection, congestion control, reassembly, ...); tests substitute
//! recording doubles.

use std::{net::SocketAddr, time::Instant};

use bytes::Bytes;
use qbase::{
    error::QuicError,
    frame::{ConnIdEntry, Frame, GapAckBlock},
    varint::VarInt,
};

/// A gap-free view of a connection's received packet-number space, queried
/// when assembling an outbound ACK.
pub trait PnMap {
    fn max_pn_seen(&self) -> Option<u64>;
    fn min_pn_seen(&self) -> Option<u64>;
    fn max_pn_ts(&self) -> Option<Instant>;
    fn base_pn(&self) -> u64;
    /// Append this packet-number map's gap blocks, highest first, into `out`.
    fn gaps(&self, out: &mut Vec<GapAckBlock>);
}

/// The outbound side of a connection: flow-control state, retransmission
/// feedback, and the queue reciprocal frames are appended to.
pub trait OutQ {
    fn ack_delay_exponent(&self) -> u8;
    fn max_data(&self) -> u64;
    fn data_blocked(&self) -> bool;
    fn set_max_data(&self, value: u64);
    fn clear_data_blocked(&self);
    /// Release packets in `[smallest, largest]` as acknowledged and seed RTT
    /// from `delay` when `ack_pn` names the packet the delay was measured
    /// against (0 for every range after the first in an ACK frame).
    fn retransmit_check(&self, largest: u64, smallest: u64, ack_pn: u64, delay: u64);
    /// Enqueue a reciprocal frame, `urgent` requesting it skip any coalescing
    /// delay other control frames might tolerate.
    fn ctrl_tail(&self, frame: Frame, urgent: bool) -> Result<(), QuicError>;
}

/// The inbound reassembly side of a connection's data stream.
pub trait InQ {
    fn max_bytes(&self) -> u64;
    fn bytes(&self) -> u64;
    fn window(&self) -> u64;
    fn set_max_bytes(&self, value: u64);
    fn reasm_tail(&self, seg: StreamSegment) -> Result<(), QuicError>;
}

/// A contiguous slice of stream data handed to reassembly, tagged with the
/// frame-level metadata the reassembler needs.
#[derive(Debug, Clone)]
pub struct StreamSegment {
    pub stream_id: VarInt,
    pub offset: u64,
    pub fin: bool,
    pub data: Bytes,
}

/// A stream's current send/recv state, as exposed to frame decoders.
pub trait StreamRef {
    fn id(&self) -> VarInt;
    fn send_offset(&self) -> u64;
    fn send_max_bytes(&self) -> u64;
    fn set_send_max_bytes(&self, value: u64);
    fn set_send_reset(&self, error_code: u64);
    fn recv_max_bytes(&self) -> u64;
    fn recv_bytes(&self) -> u64;
    fn recv_window(&self) -> u64;
    fn set_recv_max_bytes(&self, value: u64);
    fn set_recv_reset(&self, final_size: u64, error_code: u64);
}

/// The connection's table of open streams.
pub trait Streams {
    /// Look up (creating if absent) the stream a STREAM frame targets.
    fn recv_get(&self, id: VarInt, is_server: bool) -> Result<Box<dyn StreamRef>, QuicError>;
    /// Look up a stream this side may still be sending on, if any.
    fn send_get(&self, id: VarInt) -> Option<Box<dyn StreamRef>>;
    /// The peer's current limit on streams this side may open, `uni` selecting
    /// the unidirectional or bidirectional count.
    fn max_streams(&self, uni: bool) -> u64;
    /// Raise the limit from a MAX_STREAMS frame and wake anything blocked on
    /// stream creation.
    fn set_max_streams(&self, uni: bool, value: u64);
    /// This side's receive-side limit, as last advertised to the peer.
    fn recv_max_streams(&self, uni: bool) -> u64;
    /// Raise this side's advertised receive limit in response to STREAMS_BLOCKED.
    fn set_recv_max_streams(&self, uni: bool, value: u64);
}

/// One side (source or destination) of a connection-ID rotation set.
pub trait CidSet {
    fn last_seqno(&self) -> u64;
    fn first_seqno(&self) -> u64;
    fn max_count(&self) -> u64;
    fn append(&self, entry: ConnIdEntry) -> Result<(), QuicError>;
    fn remove(&self, seqno: u64);
}

/// Connection-level state transitions the socket/task layer observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    UserClosed,
}

/// The UDP-facing side of a connection: error/state signaling and path
/// rebinding on a confirmed migration.
pub trait Socket {
    fn set_err(&self, err: std::io::ErrorKind);
    fn on_state_change(&self, state: ConnState);
    fn wake_write_space(&self);
    fn rebind(&self, active: SocketAddr);
    /// Compare `entropy` against the most recently issued PATH_CHALLENGE on
    /// this path; if it matches, marks the path validated (rebinding onto it
    /// if it was a migration target) and returns `true`.
    fn validate_path_response(&self, entropy: [u8; 8]) -> bool;
}

/// Cryptographically secure randomness, injected so tests can seed it.
pub trait Random {
    fn fill(&self, buf: &mut [u8]);
}

/// Per-packet constraints the frame encoders must respect.
pub trait PacketCtx {
    fn max_payload(&self) -> usize;
}

/// Bundles every collaborator a decoder might need to apply a frame's side
/// effects, so decode functions take one reference instead of eight.
pub struct DecodeCx<'a> {
    pub is_server: bool,
    pub out_q: &'a dyn OutQ,
    pub in_q: &'a dyn InQ,
    pub streams: &'a dyn Streams,
    pub src_cids: &'a dyn CidSet,
    pub dst_cids: &'a dyn CidSet,
    pub socket: &'a dyn Socket,
    pub random: &'a dyn Random,
}
