use std::time::Duration;

/// Configuration for session behavior.
///
/// ```rust
/// use std::time::Duration;
/// use warren_session::SessionConfig;
///
/// let config = SessionConfig {
///     command_delay: Duration::ZERO,
///     ..Default::default()
/// };
/// assert_eq!(config.prompt, "> ");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum time between two accepted input lines. Faster input is
    /// held back, never dropped.
    ///
    /// Default: 200ms. `Duration::ZERO` disables throttling.
    pub command_delay: Duration,

    /// The prompt shown when waiting for a command.
    pub prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_delay: Duration::from_millis(200),
            prompt: "> ".to_string(),
        }
    }
}
