use std::borrow::Cow;

use bytes::{Buf, BufMut, Bytes};

use super::{
    EncodeFrame, FrameType, GetFrameType,
    io::{WriteFrame, read_varint, take},
};
use crate::{
    error::{ErrorKind, QuicError},
    limits::Limits,
    varint::VarInt,
};

/// CONNECTION_CLOSE frame. `is_app` selects the `0x1d` application-layer
/// variant; the `0x1c` transport-layer variant additionally names the frame
/// type that triggered the close.
///
/// The reason phrase is carried NUL-terminated, including the trailing NUL in
/// its on-wire length, matching this core's storage convention; an empty
/// phrase encodes as zero bytes with no NUL.
///
/// See [section-19.19](https://www.rfc-editor.org/rfc/rfc9000.html#section-19.19).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConnectionCloseFrame {
    pub is_app: bool,
    pub error_code: VarInt,
    pub frame_type: Option<VarInt>,
    pub reason: Cow<'static, str>,
}

impl ConnectionCloseFrame {
    pub fn app(error_code: VarInt, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            is_app: true,
            error_code,
            frame_type: None,
            reason: reason.into(),
        }
    }

    pub fn transport(error_code: VarInt, triggering_frame_type: VarInt, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            is_app: false,
            error_code,
            frame_type: Some(triggering_frame_type),
            reason: reason.into(),
        }
    }

    fn phrase_wire_len(&self) -> usize {
        if self.reason.is_empty() { 0 } else { self.reason.len() + 1 }
    }

    pub(super) fn parse(payload: &mut Bytes, is_app: bool) -> Result<Self, QuicError> {
        let frame_type = FrameType::ConnectionClose(is_app);
        let error_code = read_varint(payload, frame_type)?;
        let triggering = if is_app {
            None
        } else {
            Some(read_varint(payload, frame_type)?)
        };
        let phrase_len = read_varint(payload, frame_type)?.into_inner() as usize;
        if phrase_len > Limits::MAX_CLOSE_PHRASE_LEN {
            return Err(QuicError::new(
                ErrorKind::FrameEncodingError,
                frame_type,
                "connection_close reason phrase exceeds the accepted length",
            ));
        }
        let phrase_bytes = take(payload, phrase_len, frame_type)?;
        let reason = if phrase_len == 0 {
            Cow::Borrowed("")
        } else {
            if phrase_bytes[phrase_len - 1] != 0 {
                return Err(QuicError::new(
                    ErrorKind::FrameEncodingError,
                    frame_type,
                    "connection_close reason phrase is not nul-terminated",
                ));
            }
            let text = std::str::from_utf8(&phrase_bytes[..phrase_len - 1]).map_err(|_| {
                QuicError::new(
                    ErrorKind::FrameEncodingError,
                    frame_type,
                    "connection_close reason phrase is not valid utf-8",
                )
            })?;
            Cow::Owned(text.to_owned())
        };

        Ok(Self {
            is_app,
            error_code,
            frame_type: triggering,
            reason,
        })
    }
}

impl GetFrameType for ConnectionCloseFrame {
    fn frame_type(&self) -> FrameType {
        FrameType::ConnectionClose(self.is_app)
    }
}

impl EncodeFrame for ConnectionCloseFrame {
    fn encoding_size(&self) -> usize {
        let phrase_len = self.phrase_wire_len();
        1 + self.error_code.encoding_size()
            + self.frame_type.map(|ft| ft.encoding_size()).unwrap_or(0)
            + VarInt::try_from(phrase_len).unwrap().encoding_size()
            + phrase_len
    }
}

impl<T: BufMut> WriteFrame<ConnectionCloseFrame> for T {
    fn put_frame(&mut self, frame: &ConnectionCloseFrame) {
        use crate::varint::WriteVarInt;
        self.put_varint(&VarInt::from(frame.frame_type()));
        self.put_varint(&frame.error_code);
        if let Some(triggering) = frame.frame_type {
            self.put_varint(&triggering);
        }
        let phrase_len = frame.phrase_wire_len();
        self.put_varint(&VarInt::try_from(phrase_len).expect("reason phrase fits in a varint"));
        if phrase_len > 0 {
            self.put_slice(frame.reason.as_bytes());
            self.put_u8(0);
        }
    }
}
