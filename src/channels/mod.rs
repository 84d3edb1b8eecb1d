//! Stream channels and the orchestrator that fans them out

pub mod orchestrator;
pub mod receiver;
pub mod sender;
pub mod state;

pub use orchestrator::{ChannelEvent, ChannelRole, StreamOrchestrator};
pub use receiver::{ReceiveChannel, ReceiveChannelStats, Shown};
pub use sender::{SendChannel, SendChannelStats};
pub use state::ChannelState;
