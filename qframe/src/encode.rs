//! Collaborator-driven encoders: frames whose contents come from live
//! connection state rather than a caller-supplied payload.

use qbase::{
    error::{ErrorKind, QuicError},
    frame::{AckFrame, FrameType, GapAckBlock, NewConnectionIdFrame, PathChallengeFrame, StreamFrame, StreamsBlockedFrame},
    limits::Limits,
    varint::VarInt,
};

use crate::collaborators::{CidSet, PacketCtx, PnMap, Random};

/// Build an ACK frame from the packet-number map's current view, scaling the
/// real elapsed time since the last-seen packet by `ack_delay_exponent`.
pub fn build_ack(pn_map: &dyn PnMap, now: std::time::Instant, ack_delay_exponent: u8) -> Result<AckFrame, QuicError> {
    let largest = pn_map.max_pn_seen().ok_or_else(|| {
        QuicError::new(ErrorKind::InternalError, FrameType::Ack(false), "no packets seen yet")
    })?;
    let min_seen = pn_map.min_pn_seen().unwrap_or(largest);

    let mut gaps = Vec::new();
    pn_map.gaps(&mut gaps);
    gaps.truncate(Limits::MAX_GABS);

    let delay_ticks = pn_map
        .max_pn_ts()
        .map(|ts| now.saturating_duration_since(ts).as_micros() as u64 >> ack_delay_exponent)
        .unwrap_or(0);
    let delay = VarInt::try_from(delay_ticks)
        .map_err(|_| QuicError::new(ErrorKind::InternalError, FrameType::Ack(false), "ack delay overflowed a varint"))?;

    AckFrame::from_gaps(largest, min_seen, delay, &gaps)
}

/// Build a NEW_CONNECTION_ID frame for `src`, appending the freshly-minted
/// entry to `src` before returning it, matching this core's encode-then-append
/// ordering contract.
pub fn build_new_connection_id(src: &dyn CidSet, random: &dyn Random) -> Result<NewConnectionIdFrame, QuicError> {
    let seqno = VarInt::try_from(src.last_seqno() + 1)
        .map_err(|_| QuicError::new(ErrorKind::InternalError, FrameType::NewConnectionId, "cid seqno overflowed a varint"))?;
    let mut id = [0u8; Limits::CID_LEN];
    random.fill(&mut id);
    let mut reset_token = [0u8; Limits::RESET_TOKEN_LEN];
    random.fill(&mut reset_token);

    let entry = qbase::frame::ConnIdEntry {
        seqno,
        id,
        reset_token,
    };
    let frame = NewConnectionIdFrame::new(seqno, VarInt::from_u32(0), entry);
    src.append(entry)?;
    Ok(frame)
}

/// Build a STREAMS_BLOCKED frame for a local stream creation blocked at
/// `limit`. The stored value is `(limit >> 2) + 1`, not the raw limit — this
/// matches the wire behavior a STREAMS_BLOCKED-sending peer in this lineage
/// actually exhibits, even though RFC 9000 §19.14 specifies the raw stream
/// count. The STREAMS_BLOCKED decoder (see `decode::apply_streams_blocked`)
/// consumes the value as-is without inverting this transform.
pub fn build_streams_blocked(uni: bool, limit: u64) -> Result<StreamsBlockedFrame, QuicError> {
    let encoded = (limit >> 2) + 1;
    let max_streams = VarInt::try_from(encoded)
        .map_err(|_| QuicError::new(ErrorKind::InternalError, FrameType::StreamsBlocked(uni), "streams_blocked limit overflowed a varint"))?;
    Ok(StreamsBlockedFrame::new(uni, max_streams))
}

/// Build a PATH_CHALLENGE frame carrying fresh entropy.
pub fn build_path_challenge(random: &dyn Random) -> PathChallengeFrame {
    let mut entropy = [0u8; Limits::PATH_ENTROPY_LEN];
    random.fill(&mut entropy);
    PathChallengeFrame::new(entropy)
}

/// Build a STREAM frame header for up to `data.len()` bytes at `offset`,
/// clamped to the packet's remaining budget. If clamping would otherwise
/// truncate the final segment of a FIN-carrying write, the FIN bit is instead
/// cleared rather than split across packets silently losing it.
///
/// Returns the header and the (possibly truncated) byte count to send.
pub fn build_stream(
    stream_id: VarInt,
    offset: u64,
    data_len: usize,
    fin: bool,
    packet_ctx: &dyn PacketCtx,
) -> Result<(StreamFrame, usize), QuicError> {
    let offset_varint = VarInt::try_from(offset)
        .map_err(|_| QuicError::new(ErrorKind::InternalError, FrameType::Stream(0), "stream offset overflowed a varint"))?;

    // Reserve space for the largest possible header (type + id + offset + length)
    // before knowing the final length field's own size; a STREAM frame's header
    // never exceeds 1 + 8 + 8 + 8 bytes.
    const MAX_HEADER: usize = 1 + 8 + 8 + 8;
    let budget = packet_ctx.max_payload().saturating_sub(MAX_HEADER);
    let sent_len = data_len.min(budget);
    let sent_fin = fin && sent_len == data_len;

    let header = StreamFrame::new(stream_id, offset_varint, sent_len, sent_fin)?;
    Ok((header, sent_len))
}
