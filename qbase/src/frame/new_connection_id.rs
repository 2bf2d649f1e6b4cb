use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint, take_array},
};
use crate::{
    error::{ErrorKind, QuicError},
    limits::Limits,
    varint::VarInt,
};

/// A connection ID entry as carried on the wire by NEW_CONNECTION_ID: a sequence
/// number, the ID bytes, and the stateless reset token that accompanies it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ConnIdEntry {
    pub seqno: VarInt,
    pub id: [u8; Limits::CID_LEN],
    pub reset_token: [u8; Limits::RESET_TOKEN_LEN],
}

/// NEW_CONNECTION_ID frame.
///
/// This core always issues [`Limits::CID_LEN`]-byte connection IDs; a peer is
/// free to send a different length, which is preserved verbatim up to the wire
/// maximum of 20 bytes (RFC 9000 §19.15), but the collaborator-facing
/// [`ConnIdEntry`] this core builds is fixed-width, so only `CID_LEN`-byte IDs
/// decode successfully here.
///
/// See [section-19.15](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.15).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct NewConnectionIdFrame {
    pub seqno: VarInt,
    pub retire_prior_to: VarInt,
    pub entry: ConnIdEntry,
}

impl NewConnectionIdFrame {
    pub fn new(seqno: VarInt, retire_prior_to: VarInt, entry: ConnIdEntry) -> Self {
        Self {
            seqno,
            retire_prior_to,
            entry,
        }
    }

    pub(super) fn parse(payload: &mut Bytes, frame_type: FrameType) -> Result<Self, QuicError> {
        let seqno = read_varint(payload, frame_type)?;
        let retire_prior_to = read_varint(payload, frame_type)?;
        if retire_prior_to.into_inner() > seqno.into_inner() {
            return Err(QuicError::new(
                ErrorKind::FrameEncodingError,
                frame_type,
                "new_connection_id retire_prior_to exceeds seqno",
            ));
        }
        let length = super::io::read_u8(payload, frame_type)?;
        if length as usize != Limits::CID_LEN {
            return Err(QuicError::new(
                ErrorKind::FrameEncodingError,
                frame_type,
                "this core only accepts connection ids of its own generated length",
            ));
        }
        let id = take_array::<{ Limits::CID_LEN }>(payload, frame_type)?;
        let reset_token = take_array::<{ Limits::RESET_TOKEN_LEN }>(payload, frame_type)?;

        Ok(Self {
            seqno,
            retire_prior_to,
            entry: ConnIdEntry {
                seqno,
                id,
                reset_token,
            },
        })
    }
}

impl GetFrameType for NewConnectionIdFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::NewConnectionId
    }
}

impl EncodeFrame for NewConnectionIdFrame {
    fn encoding_size(&self) -> usize {
        1 + self.seqno.encoding_size()
            + self.retire_prior_to.encoding_size()
            + 1
            + Limits::CID_LEN
            + Limits::RESET_TOKEN_LEN
    }
}

impl<T: BufMut> WriteFrame<NewConnectionIdFrame> for T {
    fn put_frame(&mut self, frame: &NewConnectionIdFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.seqno);
        self.put_varint(&frame.retire_prior_to);
        self.put_u8(Limits::CID_LEN as u8);
        self.put_slice(&frame.entry.id);
        self.put_slice(&frame.entry.reset_token);
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::frame::io::WriteFrame as _;

    fn sample_entry(seqno: u32) -> ConnIdEntry {
        ConnIdEntry {
            seqno: VarInt::from_u32(seqno),
            id: [seqno as u8; Limits::CID_LEN],
            reset_token: [0xaa; Limits::RESET_TOKEN_LEN],
        }
    }

    #[test]
    fn round_trip() {
        let frame = NewConnectionIdFrame::new(VarInt::from_u32(1), VarInt::from_u32(0), sample_entry(1));
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);
        let mut payload = buf.freeze();
        payload.advance(1);
        let decoded = NewConnectionIdFrame::parse(&mut payload, FrameType::NewConnectionId).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn retire_prior_to_exceeding_seqno_is_rejected() {
        let frame = NewConnectionIdFrame::new(VarInt::from_u32(1), VarInt::from_u32(2), sample_entry(1));
        let mut buf = BytesMut::new();
        buf.put_frame(&frame);
        let mut payload = buf.freeze();
        payload.advance(1);
        assert!(NewConnectionIdFrame::parse(&mut payload, FrameType::NewConnectionId).is_err());
    }
}
