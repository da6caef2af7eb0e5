use std::fmt;

/// Lifecycle of the accept loop, published through a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for the next connection
    Accepting,
    /// Serving a connection
    InProgress,
    /// Stop requested; the accept loop has not finished yet
    Stopping,
    Stopped,
}

impl ServerState {
    pub fn is_shutting_down(&self) -> bool {
        matches!(self, ServerState::Stopping | ServerState::Stopped)
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Accepting => "accepting",
            ServerState::InProgress => "in progress",
            ServerState::Stopping => "stopping",
            ServerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
