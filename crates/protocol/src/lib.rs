//! Wire types shared by the EMSG event channel and its collaborators.

pub mod constants;
pub mod envelope;
pub mod messages;

// Re-export primary types for convenience.
pub use constants::EventKind;
pub use envelope::ChannelEvent;
pub use messages::{Message, OutboundMessage};
