//! Channel lifecycle

use crate::error::ChannelError;

/// Channel lifecycle states
///
/// ```text
/// Unbound ──bind ok──▶ Bound ──run──▶ Running ──stop──▶ Stopped
///    │                   │                                 ▲
///    └──bind failed──▶ Failed          └──────stop─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Unbound,
    Bound,
    Running,
    Stopped,
    Failed,
}

impl ChannelState {
    pub fn can_transition_to(self, next: ChannelState) -> bool {
        use ChannelState::*;
        matches!(
            (self, next),
            (Unbound, Bound) | (Unbound, Failed) | (Bound, Running) | (Bound, Stopped) | (Running, Stopped)
        )
    }

    /// Move to `next`, or report the illegal transition
    pub fn transition(&mut self, next: ChannelState) -> Result<(), ChannelError> {
        if !self.can_transition_to(next) {
            return Err(ChannelError::InvalidTransition { from: *self, to: next });
        }
        *self = next;
        Ok(())
    }
}
