//! QUIC variable-length integer codec.
//!
//! See [section-16](https://www.rfc-editor.org/rfc/rfc9000.html#section-16) of
//! [QUIC](https://www.rfc-editor.org/rfc/rfc9000.html) for the wire format: the
//! two most-significant bits of the first byte select one of four lengths
//! (1/2/4/8 bytes), the remaining 6/14/30/62 bits (big-endian) carry the value.

use bytes::{Buf, BufMut};

/// The largest value a [`VarInt`] can represent, `2^62 - 1`.
pub const VARINT_MAX: u64 = (1 << 62) - 1;

/// A QUIC variable-length integer in `[0, 2^62)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(u64);

/// Error returned when a value does not fit in a [`VarInt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value {0} exceeds the varint range of [0, 2^62)")]
pub struct VarIntBoundsError(pub u64);

impl VarInt {
    /// The length class of the encoding, in bytes: 1, 2, 4, or 8.
    pub fn encoding_size(self) -> usize {
        match self.0 {
            0..=0x3f => 1,
            0x40..=0x3fff => 2,
            0x4000..=0x3fff_ffff => 4,
            _ => 8,
        }
    }

    /// Build a [`VarInt`] from a `u32`, which always fits.
    pub const fn from_u32(value: u32) -> Self {
        Self(value as u64)
    }

    /// Build a [`VarInt`] from a `u64`, failing if it does not fit in 62 bits.
    pub const fn try_from_u64(value: u64) -> Result<Self, VarIntBoundsError> {
        if value > VARINT_MAX {
            Err(VarIntBoundsError(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Unwrap to the underlying `u64`.
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Encode into `buf`, choosing the shortest length class that holds the value.
    pub fn encode<T: BufMut>(self, buf: &mut T) {
        match self.encoding_size() {
            1 => buf.put_u8(self.0 as u8),
            2 => buf.put_u16(self.0 as u16 | 0x4000),
            4 => buf.put_u32(self.0 as u32 | 0x8000_0000),
            8 => buf.put_u64(self.0 | 0xc000_0000_0000_0000),
            _ => unreachable!("varint encoding size is always 1, 2, 4, or 8"),
        }
    }

    /// Decode a [`VarInt`] from `buf`, returning `None` if `buf` is truncated.
    ///
    /// On success, the consumed bytes are advanced out of `buf`.
    pub fn decode<T: Buf>(buf: &mut T) -> Option<Self> {
        if !buf.has_remaining() {
            return None;
        }
        let first = buf.chunk()[0];
        let len = 1usize << (first >> 6);
        if buf.remaining() < len {
            return None;
        }
        let value = match len {
            1 => (buf.get_u8() & 0x3f) as u64,
            2 => (buf.get_u16() & 0x3fff) as u64,
            4 => (buf.get_u32() & 0x3fff_ffff) as u64,
            8 => buf.get_u64() & 0x3fff_ffff_ffff_ffff,
            _ => unreachable!("length class is derived from a 2-bit field"),
        };
        Some(Self(value))
    }
}

impl From<u8> for VarInt {
    fn from(value: u8) -> Self {
        Self(value as u64)
    }
}

impl From<u16> for VarInt {
    fn from(value: u16) -> Self {
        Self(value as u64)
    }
}

impl From<u32> for VarInt {
    fn from(value: u32) -> Self {
        Self(value as u64)
    }
}

impl TryFrom<u64> for VarInt {
    type Error = VarIntBoundsError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::try_from_u64(value)
    }
}

impl TryFrom<usize> for VarInt {
    type Error = VarIntBoundsError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::try_from_u64(value as u64)
    }
}

impl From<VarInt> for u64 {
    fn from(value: VarInt) -> Self {
        value.0
    }
}

impl From<VarInt> for usize {
    fn from(value: VarInt) -> Self {
        value.0 as usize
    }
}

/// `BufMut` extension so a [`VarInt`] can be written without importing [`VarInt::encode`] directly.
pub trait WriteVarInt {
    /// Write `value` to `self` using the shortest valid encoding.
    fn put_varint(&mut self, value: &VarInt);
}

impl<T: BufMut> WriteVarInt for T {
    fn put_varint(&mut self, value: &VarInt) {
        value.encode(self);
    }
}
