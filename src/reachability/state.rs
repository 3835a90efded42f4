//! Operator-facing network states.

use std::borrow::Cow;
use std::fmt;

/// Coarse reachability state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkState {
    /// Running in hidden mode; not published.
    Hidden,
    /// Reachability not determined yet.
    Testing,
    /// Inbound connections are blocked.
    Firewalled,
    /// Reachable.
    Running,
    /// Working, with a configuration the operator should review.
    Warn,
    /// A local or network fault needs attention.
    Error,
    /// Peers report our clock is off.
    ClockSkew,
    /// The engine runs without a networked comm system.
    NoCommSystem,
}

impl NetworkState {
    /// Returns a short stable label (SCREAMING_SNAKE_CASE).
    pub fn as_label(self) -> &'static str {
        match self {
            NetworkState::Hidden => "HIDDEN",
            NetworkState::Testing => "TESTING",
            NetworkState::Firewalled => "FIREWALLED",
            NetworkState::Running => "RUNNING",
            NetworkState::Warn => "WARN",
            NetworkState::Error => "ERROR",
            NetworkState::ClockSkew => "CLOCKSKEW",
            NetworkState::NoCommSystem => "NOCOMMSYSTEM",
        }
    }
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// A network state together with its operator message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    state: NetworkState,
    text: Cow<'static, str>,
}

impl StatusMessage {
    /// Pairs `state` with `text`.
    pub fn new(state: NetworkState, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            state,
            text: text.into(),
        }
    }

    /// The classified state.
    pub fn state(&self) -> NetworkState {
        self.state
    }

    /// The operator message.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}; {})", self.state, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pairs_state_and_text() {
        let msg = StatusMessage::new(NetworkState::Warn, "WARN-Firewalled and Floodfill");
        assert_eq!(msg.to_string(), "(WARN; WARN-Firewalled and Floodfill)");
    }
}
