//! Frame-driven connection control core: applies the side effects of decoded
//! QUIC frames against a small set of collaborator traits, and builds the
//! frames whose contents depend on live connection state rather than a
//! caller-supplied payload.
//!
//! The wire codec itself lives in `qbase`; this crate is the layer above it
//! that knows how a [`collaborators::PnMap`], an [`collaborators::OutQ`], a
//! stream table, and so on, react to what's on the wire.

pub mod collaborators;
pub mod decode;
pub mod encode;
pub mod packet_info;
pub mod process;

pub use collaborators::DecodeCx;
pub use packet_info::PacketInfo;
pub use process::process_frames;
