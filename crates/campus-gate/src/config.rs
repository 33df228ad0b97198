//! Gate configuration.

use serde::{Deserialize, Serialize};

/// Settings for a running gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Capacity of the gate's command channel. Senders wait when it is
    /// full (bounded channel).
    pub channel_size: usize,

    /// Whether a token refresh for the same user looks the role up again.
    ///
    /// The role is read fresh on every sign-in regardless; this only
    /// controls the periodic refresh events. The last known role stays
    /// in effect while the lookup runs.
    pub refresh_role_on_token_refresh: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            channel_size: 64,
            refresh_role_on_token_refresh: true,
        }
    }
}

impl GateConfig {
    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// Called by [`Gate::start`](crate::Gate::start). A zero
    /// `channel_size` is raised to 1 (Tokio rejects empty channels).
    pub fn validated(mut self) -> Self {
        if self.channel_size == 0 {
            tracing::warn!("channel_size of 0 is not allowed, using 1");
            self.channel_size = 1;
        }
        self
    }
}
