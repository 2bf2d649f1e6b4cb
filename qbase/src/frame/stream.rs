use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint, take},
};
use crate::{error::QuicError, varint::VarInt};

/// A QUIC stream identifier. Low two bits carry initiator (client/server) and
/// directionality (bidi/uni); this layer treats it as an opaque wire value and
/// leaves interpretation to the `Streams` collaborator.
pub type StreamId = VarInt;

/// STREAM frame header. The data payload travels alongside, as `Frame::Stream(_, Bytes)`.
///
/// See [section-19.8](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.8).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StreamFrame {
    pub stream_id: StreamId,
    pub offset: VarInt,
    /// Whether the OFF bit was set. This core always omits it when `offset == 0`.
    pub off: bool,
    /// The LEN field's value; only meaningful when `len_present` is set.
    pub length: VarInt,
    /// Whether the LEN bit was set. This core always sets it on encode.
    pub len_present: bool,
    pub fin: bool,
}

impl StreamFrame {
    /// Build a header for `data_len` bytes of stream data, with the LEN bit
    /// always present, matching this core's emission policy.
    pub fn new(stream_id: StreamId, offset: VarInt, data_len: usize, fin: bool) -> Result<Self, QuicError> {
        Ok(Self {
            stream_id,
            offset,
            off: offset.into_inner() > 0,
            length: VarInt::try_from(data_len).map_err(|_| {
                QuicError::new(
                    crate::error::ErrorKind::InternalError,
                    FrameType::Stream(0),
                    "stream payload too large to encode",
                )
            })?,
            len_present: true,
            fin,
        })
    }

    fn flags(&self) -> u8 {
        (self.off as u8) << 2 | (self.len_present as u8) << 1 | self.fin as u8
    }

    pub(super) fn parse(payload: &mut Bytes, flags: u8) -> Result<(Self, Bytes), QuicError> {
        let frame_type = FrameType::Stream(flags);
        let stream_id = read_varint(payload, frame_type)?;
        let off = flags & 0x04 != 0;
        let offset = if off {
            read_varint(payload, frame_type)?
        } else {
            VarInt::from_u32(0)
        };
        let len_present = flags & 0x02 != 0;
        let length = if len_present {
            read_varint(payload, frame_type)?
        } else {
            VarInt::try_from(payload.remaining()).map_err(|_| {
                QuicError::new(
                    crate::error::ErrorKind::FrameEncodingError,
                    frame_type,
                    "stream frame implicit length exceeds varint range",
                )
            })?
        };
        let fin = flags & 0x01 != 0;
        let data = take(payload, length.into_inner() as usize, frame_type)?;

        Ok((
            Self {
                stream_id,
                offset,
                off,
                length,
                len_present,
                fin,
            },
            data,
        ))
    }
}

impl GetFrameType for StreamFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::Stream(self.flags())
    }
}

impl EncodeFrame for StreamFrame {
    fn encoding_size(&self) -> usize {
        1 + self.stream_id.encoding_size()
            + if self.off { self.offset.encoding_size() } else { 0 }
            + if self.len_present { self.length.encoding_size() } else { 0 }
    }
}

impl<T: BufMut> WriteFrame<StreamFrame> for T {
    fn put_frame(&mut self, frame: &StreamFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.stream_id);
        if frame.off {
            self.put_varint(&frame.offset);
        }
        if frame.len_present {
            self.put_varint(&frame.length);
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::frame::io::WriteFrame as _;
    use crate::varint::WriteVarInt;

    #[test]
    fn stream_with_fin_matches_wire_bytes() {
        // id=4, offset=0, payload "hi", FIN set.
        let header = StreamFrame::new(VarInt::from_u32(4), VarInt::from_u32(0), 2, true).unwrap();
        assert_eq!(header.frame_type(), FrameType::Stream(0x03));

        let mut buf = BytesMut::new();
        buf.put_frame(&header);
        buf.put_slice(b"hi");
        assert_eq!(&buf[..], b"\x0b\x04\x02hi");
    }

    #[test]
    fn round_trip_with_offset() {
        let header = StreamFrame::new(VarInt::from_u32(9), VarInt::from_u32(42), 3, false).unwrap();
        let mut buf = BytesMut::new();
        buf.put_frame(&header);
        buf.put_slice(b"abc");

        let mut payload = buf.freeze();
        let flags = payload.get_u8() & 0b111;
        let (decoded, data) = StreamFrame::parse(&mut payload, flags).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(&data[..], b"abc");
    }

    #[test]
    fn implicit_length_consumes_remainder() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x08); // no OFF, no LEN, no FIN
        buf.put_varint(&VarInt::from_u32(1));
        buf.put_slice(b"tail");
        let mut payload = buf.freeze();
        let flags = payload.get_u8() & 0b111;
        let (decoded, data) = StreamFrame::parse(&mut payload, flags).unwrap();
        assert!(!decoded.len_present);
        assert_eq!(&data[..], b"tail");
        assert!(payload.is_empty());
    }
}
