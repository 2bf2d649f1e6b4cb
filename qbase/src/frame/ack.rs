use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint},
};
use crate::{
    error::{ErrorKind, QuicError},
    limits::FrameLimits,
    varint::VarInt,
};

/// A contiguous range of packet numbers, inclusive on both ends, that the local
/// `PnMap` has *not* seen — the gap between two runs of received packets.
///
/// `end >= start` always holds.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GapAckBlock {
    pub start: u64,
    pub end: u64,
}

impl GapAckBlock {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(end >= start, "gap ack block end must not precede start");
        Self { start, end }
    }
}

/// ACK frame.
///
/// See [section-19.3](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.3)
/// of [QUIC](https://www.rfc-editor.org/rfc/rfc9000.html). This core never
/// produces the ECN-carrying variant (type `0x03`) — it has no ECN counters to
/// report — but a decoder must still be able to consume one from a peer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AckFrame {
    pub largest: VarInt,
    pub delay: VarInt,
    pub first_range: VarInt,
    /// Additional `(Gap, ACK Range Length)` pairs, in the wire order: highest
    /// acknowledged range first, descending.
    pub ranges: Vec<(VarInt, VarInt)>,
    /// `(ECT0, ECT1, ECN-CE)` counts, present only for the `0x03` wire variant.
    pub ecn: Option<(VarInt, VarInt, VarInt)>,
}

impl AckFrame {
    /// Build an ACK frame from the acknowledged packet-number window
    /// `[min_seen, largest]` and the gap blocks missing from it.
    ///
    /// `gaps` must be sorted ascending by position (the lowest gap first) and
    /// contain at most [`crate::limits::Limits::MAX_GABS`] entries.
    pub fn from_gaps(
        largest: u64,
        min_seen: u64,
        delay: VarInt,
        gaps: &[GapAckBlock],
    ) -> Result<Self, QuicError> {
        let bad_range = || {
            QuicError::new(
                ErrorKind::InternalError,
                FrameType::Ack(false),
                "ack range arithmetic underflowed while encoding",
            )
        };

        let top_of_gaps = gaps.last().map(|g| g.end + 1).unwrap_or(min_seen);
        let first_range = largest
            .checked_sub(top_of_gaps)
            .ok_or_else(bad_range)?;

        let mut ranges = Vec::with_capacity(gaps.len());
        for (i, gap) in gaps.iter().enumerate().rev() {
            let gap_len = gap.end.checked_sub(gap.start).ok_or_else(bad_range)?;
            let range_len = if i > 0 {
                gap.start
                    .checked_sub(gaps[i - 1].end)
                    .and_then(|v| v.checked_sub(2))
                    .ok_or_else(bad_range)?
            } else {
                gap.start
                    .checked_sub(min_seen)
                    .and_then(|v| v.checked_sub(1))
                    .ok_or_else(bad_range)?
            };
            ranges.push((
                VarInt::try_from(gap_len).map_err(|_| bad_range())?,
                VarInt::try_from(range_len).map_err(|_| bad_range())?,
            ));
        }

        Ok(Self {
            largest: VarInt::try_from(largest).map_err(|_| bad_range())?,
            delay,
            first_range: VarInt::try_from(first_range).map_err(|_| bad_range())?,
            ranges,
            ecn: None,
        })
    }

    /// Reconstruct the `(largest, smallest)` acknowledged sub-ranges this frame
    /// encodes, highest first. Every range is disjoint from and below the
    /// previous one.
    pub fn reconstruct_ranges(&self) -> Result<Vec<(u64, u64)>, QuicError> {
        let bad_range = || {
            QuicError::new(
                ErrorKind::ProtocolViolation,
                self.frame_type(),
                "ack range arithmetic underflowed while decoding",
            )
        };

        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        let mut largest = self.largest.into_inner();
        let mut smallest = largest
            .checked_sub(self.first_range.into_inner())
            .ok_or_else(bad_range)?;
        out.push((largest, smallest));

        for (gap, range) in &self.ranges {
            let next_largest = smallest
                .checked_sub(gap.into_inner())
                .and_then(|v| v.checked_sub(2))
                .ok_or_else(bad_range)?;
            let next_smallest = next_largest
                .checked_sub(range.into_inner())
                .ok_or_else(bad_range)?;
            out.push((next_largest, next_smallest));
            largest = next_largest;
            smallest = next_smallest;
        }
        let _ = largest;
        Ok(out)
    }

    pub(super) fn parse(
        payload: &mut Bytes,
        frame_type: FrameType,
        limits: FrameLimits,
    ) -> Result<Self, QuicError> {
        let largest = read_varint(payload, frame_type)?;
        let delay = read_varint(payload, frame_type)?;
        let count = read_varint(payload, frame_type)?.into_inner();
        if count > limits.max_ack_ranges_recv as u64 {
            return Err(QuicError::new(
                ErrorKind::ProtocolViolation,
                frame_type,
                "ack frame declares more gap ack blocks than this core accepts",
            ));
        }
        let first_range = read_varint(payload, frame_type)?;

        let mut ranges = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let gap = read_varint(payload, frame_type)?;
            let range = read_varint(payload, frame_type)?;
            ranges.push((gap, range));
        }

        let ecn = if matches!(frame_type, FrameType::Ack(true)) {
            let ect0 = read_varint(payload, frame_type)?;
            let ect1 = read_varint(payload, frame_type)?;
            let ce = read_varint(payload, frame_type)?;
            // TODO: this core does not track ECN counters; the values are
            // observed only for diagnostics.
            tracing::trace!(
                ect0 = ect0.into_inner(),
                ect1 = ect1.into_inner(),
                ce = ce.into_inner(),
                "discarding ecn counts from ack frame"
            );
            Some((ect0, ect1, ce))
        } else {
            None
        };

        Ok(Self {
            largest,
            delay,
            first_range,
            ranges,
            ecn,
        })
    }
}

impl GetFrameType for AckFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::Ack(self.ecn.is_some())
    }
}

impl EncodeFrame for AckFrame {
    fn max_encoding_size(&self) -> usize {
        1 + 8 + 8 + 8 + 8 + self.ranges.len() * 16 + self.ecn.map(|_| 24).unwrap_or(0)
    }

    fn encoding_size(&self) -> usize {
        let mut n = VarInt::from(self.frame_type()).encoding_size()
            + self.largest.encoding_size()
            + self.delay.encoding_size()
            + VarInt::try_from(self.ranges.len()).unwrap().encoding_size()
            + self.first_range.encoding_size();
        for (gap, range) in &self.ranges {
            n += gap.encoding_size() + range.encoding_size();
        }
        if let Some((ect0, ect1, ce)) = self.ecn {
            n += ect0.encoding_size() + ect1.encoding_size() + ce.encoding_size();
        }
        n
    }
}

impl<T: BufMut> WriteFrame<AckFrame> for T {
    fn put_frame(&mut self, frame: &AckFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.largest);
        self.put_varint(&frame.delay);
        self.put_varint(&VarInt::try_from(frame.ranges.len()).expect("ranges.len() <= MAX_GABS"));
        self.put_varint(&frame.first_range);
        for (gap, range) in &frame.ranges {
            self.put_varint(gap);
            self.put_varint(range);
        }
        if let Some((ect0, ect1, ce)) = frame.ecn {
            self.put_varint(&ect0);
            self.put_varint(&ect1);
            self.put_varint(&ce);
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::varint::WriteVarInt;

    #[test]
    fn single_packet_ack_round_trip() {
        // PnMap has only pn=7: largest == min_seen == 7.
        let frame = AckFrame::from_gaps(7, 7, VarInt::from_u32(0), &[]).unwrap();
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);
        assert_eq!(&buf[..], &[0x02, 0x07, 0x00, 0x00, 0x00]);

        let mut payload = buf.freeze();
        payload.advance(1);
        let decoded = AckFrame::parse(&mut payload, FrameType::Ack(false), FrameLimits::default()).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.reconstruct_ranges().unwrap(), vec![(7, 7)]);
    }

    #[test]
    fn one_gap_round_trip() {
        // Received pn 0..=3 and 6..=9, missing 4..=5.
        let gaps = [GapAckBlock::new(4, 5)];
        let frame = AckFrame::from_gaps(9, 0, VarInt::from_u32(0), &gaps).unwrap();
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);

        let mut payload = buf.freeze();
        payload.advance(1);
        let decoded = AckFrame::parse(&mut payload, FrameType::Ack(false), FrameLimits::default()).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.reconstruct_ranges().unwrap(), vec![(9, 6), (3, 0)]);
    }

    #[test]
    fn sixteen_gaps_accepted_seventeen_rejected() {
        let gaps: Vec<GapAckBlock> = (0..16)
            .map(|i| GapAckBlock::new(i * 4 + 2, i * 4 + 3))
            .collect();
        let frame = AckFrame::from_gaps(1000, 0, VarInt::from_u32(0), &gaps).unwrap();
        assert_eq!(frame.ranges.len(), 16);

        let mut buf = BytesMut::new();
        buf.put_frame(&frame);
        let mut payload = buf.freeze();
        payload.advance(1);
        assert!(AckFrame::parse(&mut payload, FrameType::Ack(false), FrameLimits::default()).is_ok());

        // Hand-craft a 17-range frame to exercise the receive-side rejection.
        let mut buf = BytesMut::new();
        buf.put_u8(0x02);
        buf.put_varint(&VarInt::from_u32(1000));
        buf.put_varint(&VarInt::from_u32(0));
        buf.put_varint(&VarInt::from_u32(17));
        buf.put_varint(&VarInt::from_u32(0));
        for _ in 0..17 {
            buf.put_varint(&VarInt::from_u32(0));
            buf.put_varint(&VarInt::from_u32(0));
        }
        let mut payload = buf.freeze();
        payload.advance(1);
        assert!(AckFrame::parse(&mut payload, FrameType::Ack(false), FrameLimits::default()).is_err());
    }

    #[test]
    fn recv_ceiling_is_enforced_independently_of_emission_bound() {
        // Five ranges is under Limits::MAX_GABS but over a tightened receive ceiling.
        let gaps: Vec<GapAckBlock> = (0..5).map(|i| GapAckBlock::new(i * 4 + 2, i * 4 + 3)).collect();
        let frame = AckFrame::from_gaps(100, 0, VarInt::from_u32(0), &gaps).unwrap();
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);

        let mut payload = buf.freeze();
        payload.advance(1);
        let tight = FrameLimits { max_ack_ranges_recv: 4 };
        assert!(AckFrame::parse(&mut payload, FrameType::Ack(false), tight).is_err());
    }

    #[test]
    fn ecn_variant_is_parsed_and_discarded() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x03);
        buf.put_varint(&VarInt::from_u32(5));
        buf.put_varint(&VarInt::from_u32(0));
        buf.put_varint(&VarInt::from_u32(0));
        buf.put_varint(&VarInt::from_u32(5));
        buf.put_varint(&VarInt::from_u32(1)); // ect0
        buf.put_varint(&VarInt::from_u32(2)); // ect1
        buf.put_varint(&VarInt::from_u32(3)); // ce
        let mut payload = buf.freeze();
        payload.advance(1);
        let decoded = AckFrame::parse(&mut payload, FrameType::Ack(true), FrameLimits::default()).unwrap();
        assert_eq!(
            decoded.ecn,
            Some((VarInt::from_u32(1), VarInt::from_u32(2), VarInt::from_u32(3)))
        );
        assert!(payload.is_empty());
    }
}
