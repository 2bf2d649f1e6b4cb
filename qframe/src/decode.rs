//! Side-effect application for decoded frames: the half of each frame's
//! contract that needs collaborator state and so cannot live in `qbase`'s
//! pure wire parser.

use qbase::{
    error::{ErrorKind, QuicError},
    frame::{
        AckFrame, ConnectionCloseFrame, Frame, FrameType, MaxStreamsFrame, NewConnectionIdFrame,
        RetireConnectionIdFrame, StreamFrame, StreamsBlockedFrame,
    },
    varint::VarInt,
};

use crate::{
    collaborators::{ConnState, DecodeCx, StreamSegment},
    encode,
};

/// Apply a single decoded frame's side effects against the collaborators in
/// `cx`. Frames with no side effects beyond their own wire fields (PADDING,
/// PING, HANDSHAKE_DONE) are no-ops here.
pub fn apply(cx: &DecodeCx<'_>, frame: &Frame) -> Result<(), QuicError> {
    match frame {
        Frame::Padding(_) | Frame::Ping(_) | Frame::HandshakeDone(_) => Ok(()),
        Frame::Ack(ack) => apply_ack(cx, ack),
        Frame::Stream(header, data) => apply_stream(cx, header, data.clone()),
        Frame::ResetStream(reset) => {
            if let Some(stream) = cx.streams.send_get(reset.stream_id) {
                stream.set_recv_reset(reset.final_size.into_inner(), reset.error_code.into_inner());
            }
            Ok(())
        }
        Frame::StopSending(stop) => apply_stop_sending(cx, stop.stream_id, stop.error_code),
        Frame::Crypto(_, _) => Ok(()),
        Frame::NewToken(_) => Ok(()),
        Frame::MaxData(max_data) => {
            if max_data.max_data.into_inner() >= cx.out_q.max_data() {
                cx.out_q.set_max_data(max_data.max_data.into_inner());
                cx.out_q.clear_data_blocked();
            }
            Ok(())
        }
        Frame::MaxStreamData(m) => {
            if let Some(stream) = cx.streams.send_get(m.stream_id) {
                if m.max_stream_data.into_inner() >= stream.send_max_bytes() {
                    stream.set_send_max_bytes(m.max_stream_data.into_inner());
                }
            }
            Ok(())
        }
        Frame::MaxStreams(ms) => apply_max_streams(cx, ms),
        Frame::DataBlocked(_) => apply_data_blocked(cx),
        Frame::StreamDataBlocked(sdb) => apply_stream_data_blocked(cx, sdb.stream_id),
        Frame::StreamsBlocked(sb) => apply_streams_blocked(cx, sb),
        Frame::NewConnectionId(ncid) => apply_new_connection_id(cx, ncid),
        Frame::RetireConnectionId(rcid) => apply_retire_connection_id(cx, rcid),
        Frame::PathChallenge(challenge) => cx
            .out_q
            .ctrl_tail(Frame::PathResponse(qbase::frame::PathResponseFrame::new(challenge.entropy)), true),
        Frame::PathResponse(resp) => {
            cx.socket.validate_path_response(resp.entropy);
            Ok(())
        }
        Frame::ConnectionClose(close) => apply_connection_close(cx, close),
    }
}

fn apply_ack(cx: &DecodeCx<'_>, ack: &AckFrame) -> Result<(), QuicError> {
    let ranges = ack.reconstruct_ranges()?;
    let mut first = true;
    for (largest, smallest) in ranges {
        let ack_pn = if first { ack.largest.into_inner() } else { 0 };
        let delay = if first { ack.delay.into_inner() } else { 0 };
        cx.out_q.retransmit_check(largest, smallest, ack_pn, delay);
        first = false;
    }
    Ok(())
}

fn apply_stream(cx: &DecodeCx<'_>, header: &StreamFrame, data: bytes::Bytes) -> Result<(), QuicError> {
    let _stream = cx.streams.recv_get(header.stream_id, cx.is_server)?;
    cx.in_q.reasm_tail(StreamSegment {
        stream_id: header.stream_id,
        offset: header.offset.into_inner(),
        fin: header.fin,
        data,
    })
}

fn apply_stop_sending(cx: &DecodeCx<'_>, stream_id: VarInt, error_code: VarInt) -> Result<(), QuicError> {
    if let Some(stream) = cx.streams.send_get(stream_id) {
        let final_size = stream.send_offset();
        stream.set_send_reset(error_code.into_inner());
        cx.out_q.ctrl_tail(
            Frame::ResetStream(qbase::frame::ResetStreamFrame::new(
                stream_id,
                error_code,
                VarInt::try_from(final_size).unwrap_or(VarInt::from_u32(0)),
            )),
            true,
        )?;
    }
    Ok(())
}

fn apply_data_blocked(cx: &DecodeCx<'_>) -> Result<(), QuicError> {
    let new_max = cx.in_q.bytes() + cx.in_q.window();
    let prior = cx.in_q.max_bytes();
    cx.in_q.set_max_bytes(new_max);
    let outcome = cx.out_q.ctrl_tail(
        Frame::MaxData(qbase::frame::MaxDataFrame::new(
            VarInt::try_from(new_max).unwrap_or(VarInt::from_u32(0)),
        )),
        false,
    );
    if outcome.is_err() {
        cx.in_q.set_max_bytes(prior);
    }
    outcome
}

fn apply_stream_data_blocked(cx: &DecodeCx<'_>, stream_id: VarInt) -> Result<(), QuicError> {
    let Some(stream) = cx.streams.send_get(stream_id) else {
        return Ok(());
    };
    let new_max = stream.recv_bytes() + stream.recv_window();
    let prior = stream.recv_max_bytes();
    if new_max == prior {
        return Ok(());
    }
    stream.set_recv_max_bytes(new_max);
    let outcome = cx.out_q.ctrl_tail(
        Frame::MaxStreamData(qbase::frame::MaxStreamDataFrame::new(
            stream_id,
            VarInt::try_from(new_max).unwrap_or(VarInt::from_u32(0)),
        )),
        false,
    );
    if outcome.is_err() {
        stream.set_recv_max_bytes(prior);
    }
    outcome
}

fn apply_max_streams(cx: &DecodeCx<'_>, ms: &MaxStreamsFrame) -> Result<(), QuicError> {
    let new_max = ms.max_streams.into_inner();
    if new_max >= cx.streams.max_streams(ms.uni) {
        cx.streams.set_max_streams(ms.uni, new_max);
        cx.socket.wake_write_space();
    }
    Ok(())
}

fn apply_streams_blocked(cx: &DecodeCx<'_>, sb: &StreamsBlockedFrame) -> Result<(), QuicError> {
    let declared = sb.max_streams.into_inner();
    if declared < cx.streams.recv_max_streams(sb.uni) {
        return Ok(());
    }
    cx.streams.set_recv_max_streams(sb.uni, declared);
    let max_streams = VarInt::try_from(declared)
        .map_err(|_| QuicError::new(ErrorKind::InternalError, FrameType::MaxStreams(sb.uni), "stream count overflowed a varint"))?;
    cx.out_q
        .ctrl_tail(Frame::MaxStreams(MaxStreamsFrame::new(sb.uni, max_streams)), false)
}

fn apply_new_connection_id(cx: &DecodeCx<'_>, ncid: &NewConnectionIdFrame) -> Result<(), QuicError> {
    let frame_type = FrameType::NewConnectionId;
    if ncid.seqno.into_inner() != cx.dst_cids.last_seqno() + 1 {
        return Err(QuicError::new(
            ErrorKind::ProtocolViolation,
            frame_type,
            "new_connection_id seqno is not the next expected sequence number",
        ));
    }
    cx.dst_cids.append(ncid.entry)?;

    let first = cx.dst_cids.first_seqno();
    for seqno in first..ncid.retire_prior_to.into_inner() {
        cx.out_q.ctrl_tail(
            Frame::RetireConnectionId(RetireConnectionIdFrame::new(VarInt::try_from(seqno).map_err(|_| {
                QuicError::new(ErrorKind::InternalError, frame_type, "retired seqno overflowed a varint")
            })?)),
            false,
        )?;
    }
    Ok(())
}

fn apply_retire_connection_id(cx: &DecodeCx<'_>, rcid: &RetireConnectionIdFrame) -> Result<(), QuicError> {
    let frame_type = FrameType::RetireConnectionId;
    let seqno = rcid.seqno.into_inner();
    if seqno != cx.src_cids.first_seqno() || seqno == cx.src_cids.last_seqno() {
        return Err(QuicError::new(
            ErrorKind::ProtocolViolation,
            frame_type,
            "retire_connection_id seqno is not the oldest active, non-final sequence number",
        ));
    }
    cx.src_cids.remove(seqno);

    if cx.src_cids.last_seqno() - seqno < cx.src_cids.max_count() {
        let frame = encode::build_new_connection_id(cx.src_cids, cx.random)?;
        cx.out_q.ctrl_tail(Frame::NewConnectionId(frame), false)?;
    }
    Ok(())
}

fn apply_connection_close(cx: &DecodeCx<'_>, _close: &ConnectionCloseFrame) -> Result<(), QuicError> {
    cx.socket.on_state_change(ConnState::UserClosed);
    cx.socket.set_err(std::io::ErrorKind::BrokenPipe);
    cx.socket.wake_write_space();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use qbase::frame::{MaxStreamsFrame, NewConnectionIdFrame, RetireConnectionIdFrame, StreamsBlockedFrame};

    use super::*;
    use crate::collaborators::{CidSet, OutQ, Streams};

    #[derive(Default)]
    struct RecordingOutQ {
        tail: RefCell<Vec<Frame>>,
        max_data: Cell<u64>,
    }
    impl OutQ for RecordingOutQ {
        fn ack_delay_exponent(&self) -> u8 {
            3
        }
        fn max_data(&self) -> u64 {
            self.max_data.get()
        }
        fn data_blocked(&self) -> bool {
            false
        }
        fn set_max_data(&self, value: u64) {
            self.max_data.set(value);
        }
        fn clear_data_blocked(&self) {}
        fn retransmit_check(&self, _largest: u64, _smallest: u64, _ack_pn: u64, _delay: u64) {}
        fn ctrl_tail(&self, frame: Frame, _urgent: bool) -> Result<(), QuicError> {
            self.tail.borrow_mut().push(frame);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeCidSet {
        last: Cell<u64>,
        first: Cell<u64>,
        max_count: Cell<u64>,
        appended: RefCell<Vec<qbase::frame::ConnIdEntry>>,
        removed: RefCell<Vec<u64>>,
    }
    impl CidSet for FakeCidSet {
        fn last_seqno(&self) -> u64 {
            self.last.get()
        }
        fn first_seqno(&self) -> u64 {
            self.first.get()
        }
        fn max_count(&self) -> u64 {
            self.max_count.get()
        }
        fn append(&self, entry: qbase::frame::ConnIdEntry) -> Result<(), QuicError> {
            self.last.set(entry.seqno.into_inner());
            self.appended.borrow_mut().push(entry);
            Ok(())
        }
        fn remove(&self, seqno: u64) {
            self.removed.borrow_mut().push(seqno);
            self.first.set(seqno + 1);
        }
    }

    struct FakeStreams {
        max_streams: Cell<u64>,
        recv_max_streams: Cell<u64>,
    }
    impl Streams for FakeStreams {
        fn recv_get(&self, _id: VarInt, _is_server: bool) -> Result<Box<dyn crate::collaborators::StreamRef>, QuicError> {
            Err(QuicError::protocol_violation("not exercised in these tests"))
        }
        fn send_get(&self, _id: VarInt) -> Option<Box<dyn crate::collaborators::StreamRef>> {
            None
        }
        fn max_streams(&self, _uni: bool) -> u64 {
            self.max_streams.get()
        }
        fn set_max_streams(&self, _uni: bool, value: u64) {
            self.max_streams.set(value);
        }
        fn recv_max_streams(&self, _uni: bool) -> u64 {
            self.recv_max_streams.get()
        }
        fn set_recv_max_streams(&self, _uni: bool, value: u64) {
            self.recv_max_streams.set(value);
        }
    }

    #[derive(Default)]
    struct NullInQ;
    impl crate::collaborators::InQ for NullInQ {
        fn max_bytes(&self) -> u64 {
            0
        }
        fn bytes(&self) -> u64 {
            0
        }
        fn window(&self) -> u64 {
            0
        }
        fn set_max_bytes(&self, _value: u64) {}
        fn reasm_tail(&self, _seg: StreamSegment) -> Result<(), QuicError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSocket {
        woken: Cell<bool>,
    }
    impl crate::collaborators::Socket for RecordingSocket {
        fn set_err(&self, _err: std::io::ErrorKind) {}
        fn on_state_change(&self, _state: ConnState) {}
        fn wake_write_space(&self) {
            self.woken.set(true);
        }
        fn rebind(&self, _active: std::net::SocketAddr) {}
        fn validate_path_response(&self, _entropy: [u8; 8]) -> bool {
            true
        }
    }

    struct ZeroRandom;
    impl crate::collaborators::Random for ZeroRandom {
        fn fill(&self, buf: &mut [u8]) {
            buf.fill(0);
        }
    }

    fn cx<'a>(
        out_q: &'a RecordingOutQ,
        in_q: &'a NullInQ,
        streams: &'a FakeStreams,
        src: &'a FakeCidSet,
        dst: &'a FakeCidSet,
        socket: &'a RecordingSocket,
        random: &'a ZeroRandom,
    ) -> DecodeCx<'a> {
        DecodeCx {
            is_server: true,
            out_q,
            in_q,
            streams,
            src_cids: src,
            dst_cids: dst,
            socket,
            random,
        }
    }

    #[test]
    fn new_connection_id_out_of_sequence_is_rejected() {
        let out_q = RecordingOutQ::default();
        let in_q = NullInQ;
        let streams = FakeStreams {
            max_streams: Cell::new(0),
            recv_max_streams: Cell::new(0),
        };
        let src = FakeCidSet::default();
        let dst = FakeCidSet::default();
        let socket = RecordingSocket::default();
        let random = ZeroRandom;

        let ncid = NewConnectionIdFrame::new(
            VarInt::from_u32(5),
            VarInt::from_u32(0),
            qbase::frame::ConnIdEntry {
                seqno: VarInt::from_u32(5),
                id: [0; 8],
                reset_token: [0; 16],
            },
        );
        let err = apply_new_connection_id(&cx(&out_q, &in_q, &streams, &src, &dst, &socket, &random), &ncid);
        assert!(err.is_err());
    }

    #[test]
    fn new_connection_id_with_retire_prior_to_emits_retire_frames() {
        let out_q = RecordingOutQ::default();
        let in_q = NullInQ;
        let streams = FakeStreams {
            max_streams: Cell::new(0),
            recv_max_streams: Cell::new(0),
        };
        let src = FakeCidSet::default();
        let dst = FakeCidSet::default();
        let socket = RecordingSocket::default();
        let random = ZeroRandom;

        let ncid = NewConnectionIdFrame::new(
            VarInt::from_u32(1),
            VarInt::from_u32(1),
            qbase::frame::ConnIdEntry {
                seqno: VarInt::from_u32(1),
                id: [0; 8],
                reset_token: [0; 16],
            },
        );
        apply_new_connection_id(&cx(&out_q, &in_q, &streams, &src, &dst, &socket, &random), &ncid).unwrap();
        assert_eq!(out_q.tail.borrow().len(), 1);
        assert!(matches!(&out_q.tail.borrow()[0], Frame::RetireConnectionId(r) if r.seqno == VarInt::from_u32(0)));
    }

    #[test]
    fn retire_connection_id_requires_oldest_active_seqno() {
        let out_q = RecordingOutQ::default();
        let in_q = NullInQ;
        let streams = FakeStreams {
            max_streams: Cell::new(0),
            recv_max_streams: Cell::new(0),
        };
        let src = FakeCidSet::default();
        src.last.set(3);
        src.first.set(0);
        let dst = FakeCidSet::default();
        let socket = RecordingSocket::default();
        let random = ZeroRandom;

        let rcid = RetireConnectionIdFrame::new(VarInt::from_u32(1));
        let err = apply_retire_connection_id(&cx(&out_q, &in_q, &streams, &src, &dst, &socket, &random), &rcid);
        assert!(err.is_err());
    }

    #[test]
    fn retire_connection_id_replenishes_when_below_max_count() {
        let out_q = RecordingOutQ::default();
        let in_q = NullInQ;
        let streams = FakeStreams {
            max_streams: Cell::new(0),
            recv_max_streams: Cell::new(0),
        };
        let src = FakeCidSet::default();
        src.last.set(1);
        src.first.set(0);
        src.max_count.set(8);
        let dst = FakeCidSet::default();
        let socket = RecordingSocket::default();
        let random = ZeroRandom;

        let rcid = RetireConnectionIdFrame::new(VarInt::from_u32(0));
        apply_retire_connection_id(&cx(&out_q, &in_q, &streams, &src, &dst, &socket, &random), &rcid).unwrap();
        assert_eq!(src.removed.borrow().as_slice(), &[0]);
        assert_eq!(out_q.tail.borrow().len(), 1);
        assert!(matches!(&out_q.tail.borrow()[0], Frame::NewConnectionId(_)));
    }

    #[test]
    fn max_streams_ignores_a_lower_limit_than_already_known() {
        let out_q = RecordingOutQ::default();
        let in_q = NullInQ;
        let streams = FakeStreams {
            max_streams: Cell::new(10),
            recv_max_streams: Cell::new(0),
        };
        let src = FakeCidSet::default();
        let dst = FakeCidSet::default();
        let socket = RecordingSocket::default();
        let random = ZeroRandom;

        let ms = MaxStreamsFrame::new(false, VarInt::from_u32(5));
        apply_max_streams(&cx(&out_q, &in_q, &streams, &src, &dst, &socket, &random), &ms).unwrap();
        assert_eq!(streams.max_streams.get(), 10);
        assert!(!socket.woken.get());
    }

    #[test]
    fn max_streams_raises_the_limit_and_wakes_writers() {
        let out_q = RecordingOutQ::default();
        let in_q = NullInQ;
        let streams = FakeStreams {
            max_streams: Cell::new(10),
            recv_max_streams: Cell::new(0),
        };
        let src = FakeCidSet::default();
        let dst = FakeCidSet::default();
        let socket = RecordingSocket::default();
        let random = ZeroRandom;

        let ms = MaxStreamsFrame::new(false, VarInt::from_u32(20));
        apply_max_streams(&cx(&out_q, &in_q, &streams, &src, &dst, &socket, &random), &ms).unwrap();
        assert_eq!(streams.max_streams.get(), 20);
        assert!(socket.woken.get());
    }

    #[test]
    fn streams_blocked_at_or_above_current_limit_emits_max_streams() {
        let out_q = RecordingOutQ::default();
        let in_q = NullInQ;
        let streams = FakeStreams {
            max_streams: Cell::new(0),
            recv_max_streams: Cell::new(10),
        };
        let src = FakeCidSet::default();
        let dst = FakeCidSet::default();
        let socket = RecordingSocket::default();
        let random = ZeroRandom;

        let sb = StreamsBlockedFrame::new(true, VarInt::from_u32(10));
        apply_streams_blocked(&cx(&out_q, &in_q, &streams, &src, &dst, &socket, &random), &sb).unwrap();
        assert_eq!(streams.recv_max_streams.get(), 10);
        assert_eq!(out_q.tail.borrow().len(), 1);
        assert!(matches!(&out_q.tail.borrow()[0], Frame::MaxStreams(m) if m.uni && m.max_streams == VarInt::from_u32(10)));
    }

    #[test]
    fn streams_blocked_below_current_limit_is_a_no_op() {
        let out_q = RecordingOutQ::default();
        let in_q = NullInQ;
        let streams = FakeStreams {
            max_streams: Cell::new(0),
            recv_max_streams: Cell::new(10),
        };
        let src = FakeCidSet::default();
        let dst = FakeCidSet::default();
        let socket = RecordingSocket::default();
        let random = ZeroRandom;

        let sb = StreamsBlockedFrame::new(false, VarInt::from_u32(5));
        apply_streams_blocked(&cx(&out_q, &in_q, &streams, &src, &dst, &socket, &random), &sb).unwrap();
        assert!(out_q.tail.borrow().is_empty());
    }
}
