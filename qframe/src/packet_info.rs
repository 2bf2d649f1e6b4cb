use qbase::frame::FrameType;

/// Per-received-packet accumulator the ACK scheduler consults once the frame
/// loop finishes. Flags are set-only: once raised by one frame in the packet,
/// nothing later in the same packet can clear them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PacketInfo {
    pub ack_eliciting: bool,
    pub ack_immediate: bool,
    pub non_probing: bool,
}

impl PacketInfo {
    pub fn observe(&mut self, frame_type: FrameType) {
        if frame_type.is_ack_eliciting() {
            self.ack_eliciting = true;
            if frame_type.is_ack_immediate() {
                self.ack_immediate = true;
            }
        }
        if frame_type.is_non_probing() {
            self.non_probing = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_sets_eliciting_and_non_probing_only() {
        let mut info = PacketInfo::default();
        info.observe(FrameType::Ping);
        assert_eq!(
            info,
            PacketInfo {
                ack_eliciting: true,
                ack_immediate: false,
                non_probing: true,
            }
        );
    }

    #[test]
    fn path_challenge_is_probing_and_eliciting() {
        let mut info = PacketInfo::default();
        info.observe(FrameType::PathChallenge);
        assert!(info.ack_eliciting);
        assert!(!info.non_probing);
    }

    #[test]
    fn flags_never_clear_within_a_packet() {
        let mut info = PacketInfo::default();
        info.observe(FrameType::Stream(0));
        info.observe(FrameType::Padding);
        assert!(info.ack_eliciting);
        assert!(info.non_probing);
    }
}
