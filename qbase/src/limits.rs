//! Compile-time and runtime knobs owned by the frame layer.

/// Compile-time bounds baked into the wire format this core produces.
pub struct Limits;

impl Limits {
    /// Maximum number of gap ACK blocks this core will ever *emit* in one ACK frame.
    pub const MAX_GABS: usize = 16;
    /// Length, in bytes, of connection IDs this core generates via NEW_CONNECTION_ID.
    pub const CID_LEN: usize = 8;
    /// Length, in bytes, of a stateless reset token.
    pub const RESET_TOKEN_LEN: usize = 16;
    /// Length, in bytes, of PATH_CHALLENGE/PATH_RESPONSE entropy.
    pub const PATH_ENTROPY_LEN: usize = 8;
    /// Maximum length of a CONNECTION_CLOSE reason phrase, including the trailing NUL.
    pub const MAX_CLOSE_PHRASE_LEN: usize = 80;
}

/// Runtime-configurable limits, distinct from the compile-time [`Limits`] emission bounds.
///
/// `max_ack_ranges_recv` is independent of [`Limits::MAX_GABS`]: a connection may want
/// to tolerate more (or fewer) gap blocks on receive than it ever emits, see the
/// discussion in the design notes about keeping the receive ceiling configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    pub max_ack_ranges_recv: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_ack_ranges_recv: Limits::MAX_GABS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        assert_eq!(Limits::MAX_GABS, 16);
        assert_eq!(Limits::CID_LEN, 8);
        assert_eq!(Limits::RESET_TOKEN_LEN, 16);
        assert_eq!(Limits::MAX_CLOSE_PHRASE_LEN, 80);
        assert_eq!(FrameLimits::default().max_ack_ranges_recv, 16);
    }

    #[test]
    fn recv_ceiling_is_independently_overridable() {
        let limits = FrameLimits {
            max_ack_ranges_recv: 4,
        };
        assert_eq!(limits.max_ack_ranges_recv, 4);
        assert_eq!(Limits::MAX_GABS, 16);
    }
}
