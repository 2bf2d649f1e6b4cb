use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint, take},
};
use crate::{
    error::{ErrorKind, QuicError},
    varint::VarInt,
};

/// The TLS `NewSessionTicket` handshake message type, the only payload this
/// core ever carries inside a CRYPTO frame.
const TLS_NEW_SESSION_TICKET: u8 = 4;

/// CRYPTO frame header. The data payload travels alongside, as `Frame::Crypto(_, Bytes)`.
///
/// This core only ever emits session-ticket CRYPTO frames post-handshake, always
/// at `offset == 0`; it rejects any other offset on decode.
///
/// See [section-19.6](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.6).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CryptoFrame {
    pub offset: VarInt,
    pub length: VarInt,
}

impl CryptoFrame {
    pub fn new(data_len: usize) -> Result<Self, QuicError> {
        Ok(Self {
            offset: VarInt::from_u32(0),
            length: VarInt::try_from(data_len).map_err(|_| {
                QuicError::new(
                    ErrorKind::InternalError,
                    FrameType::Crypto,
                    "crypto payload too large to encode",
                )
            })?,
        })
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<(Self, Bytes), QuicError> {
        let offset = read_varint(payload, frame_type)?;
        if offset.into_inner() != 0 {
            return Err(QuicError::new(
                ErrorKind::ProtocolViolation,
                frame_type,
                "this core only accepts crypto frames at offset 0",
            ));
        }
        let length = read_varint(payload, frame_type)?;
        let data = take(payload, length.into_inner() as usize, frame_type)?;
        if data.first() != Some(&TLS_NEW_SESSION_TICKET) {
            return Err(QuicError::new(
                ErrorKind::ProtocolViolation,
                frame_type,
                "crypto frame does not carry a NewSessionTicket message",
            ));
        }
        Ok((Self { offset, length }, data))
    }
}

impl GetFrameType for CryptoFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::Crypto
    }
}

impl EncodeFrame for CryptoFrame {
    fn encoding_size(&self) -> usize {
        1 + self.offset.encoding_size() + self.length.encoding_size()
    }
}

impl<T: BufMut> WriteFrame<CryptoFrame> for T {
    fn put_frame(&mut self, frame: &CryptoFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.offset);
        self.put_varint(&frame.length);
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::frame::io::WriteFrame as _;
    use crate::varint::WriteVarInt;

    #[test]
    fn round_trip_session_ticket() {
        let data = Bytes::from_static(&[4, 1, 2, 3]);
        let header = CryptoFrame::new(data.len()).unwrap();
        let mut buf = BytesMut::new();
        buf.put_frame(&header);
        buf.put_slice(&data);

        let mut payload = buf.freeze();
        payload.advance(1);
        let (decoded, decoded_data) = CryptoFrame::parse(&mut payload, FrameType::Crypto).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded_data, data);
    }

    #[test]
    fn nonzero_offset_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_varint(&VarInt::from_u32(1));
        buf.put_varint(&VarInt::from_u32(1));
        buf.put_u8(4);
        let mut payload = buf.freeze();
        assert!(CryptoFrame::parse(&mut payload, FrameType::Crypto).is_err());
    }

    #[test]
    fn missing_session_ticket_marker_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_varint(&VarInt::from_u32(0));
        buf.put_varint(&VarInt::from_u32(1));
        buf.put_u8(9);
        let mut payload = buf.freeze();
        assert!(CryptoFrame::parse(&mut payload, FrameType::Crypto).is_err());
    }
}
