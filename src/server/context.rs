use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use log::debug;
use tokio::sync::watch;
use crate::server::state::ServerState;

/// Server-wide state shared by the accept loop, sessions and the console.
pub struct ServerContext {
    state: watch::Sender<ServerState>,

    /// Last stream id handed out by createStream
    next_stream_id: AtomicU32,

    connection_counter: AtomicU64,
}

impl Default for ServerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerContext {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ServerState::Accepting);
        ServerContext {
            state,
            next_stream_id: AtomicU32::new(0),
            connection_counter: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Next stream id, starting at 1 and never reused while the process lives.
    pub fn allocate_stream_id(&self) -> u32 {
        self.next_stream_id.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    pub fn generate_connection_id(&self) -> String {
        let id = self.connection_counter.fetch_add(1, Ordering::SeqCst);
        format!("conn-{}", id)
    }

    /// `Accepting` -> `InProgress`. Returns false when a stop got there first.
    pub fn begin_session(&self) -> bool {
        self.transition(ServerState::Accepting, ServerState::InProgress)
    }

    /// `InProgress` -> `Accepting`. A pending stop is left in place.
    pub fn end_session(&self) -> bool {
        self.transition(ServerState::InProgress, ServerState::Accepting)
    }

    /// Ask the accept loop to stop. Returns the state seen before the request.
    pub fn request_stop(&self) -> ServerState {
        let mut previous = ServerState::Stopped;
        self.state.send_if_modified(|state| {
            previous = *state;
            if state.is_shutting_down() {
                return false;
            }
            *state = ServerState::Stopping;
            true
        });
        debug!("Stop requested while {}", previous);
        previous
    }

    pub fn mark_stopped(&self) {
        self.state.send_replace(ServerState::Stopped);
    }

    pub async fn wait_stopped(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in self, so the channel cannot close under us.
        let _ = rx.wait_for(|state| *state == ServerState::Stopped).await;
    }

    fn transition(&self, from: ServerState, to: ServerState) -> bool {
        self.state.send_if_modified(|state| {
            if *state != from {
                return false;
            }
            *state = to;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_stream_ids_start_at_one() {
        let ctx = ServerContext::new();
        assert_eq!(ctx.allocate_stream_id(), 1);
        assert_eq!(ctx.allocate_stream_id(), 2);
        assert_eq!(ctx.allocate_stream_id(), 3);
    }

    #[test]
    fn test_connection_ids() {
        let ctx = ServerContext::new();
        assert_eq!(ctx.generate_connection_id(), "conn-0");
        assert_eq!(ctx.generate_connection_id(), "conn-1");
    }

    #[test]
    fn test_session_transitions() {
        let ctx = ServerContext::new();
        assert!(!ctx.end_session());
        assert!(ctx.begin_session());
        assert_eq!(ctx.state(), ServerState::InProgress);
        assert!(!ctx.begin_session());
        assert!(ctx.end_session());
        assert_eq!(ctx.state(), ServerState::Accepting);
    }

    #[test]
    fn test_stop_during_session_survives_end() {
        let ctx = ServerContext::new();
        ctx.begin_session();
        assert_eq!(ctx.request_stop(), ServerState::InProgress);
        assert!(!ctx.end_session());
        assert_eq!(ctx.state(), ServerState::Stopping);
        assert!(!ctx.begin_session());
    }

    #[test]
    fn test_request_stop_is_idempotent() {
        let ctx = ServerContext::new();
        assert_eq!(ctx.request_stop(), ServerState::Accepting);
        assert_eq!(ctx.request_stop(), ServerState::Stopping);
        ctx.mark_stopped();
        assert_eq!(ctx.request_stop(), ServerState::Stopped);
        assert_eq!(ctx.state(), ServerState::Stopped);
    }

    #[tokio::test]
    async fn test_wait_stopped_wakes_on_mark() {
        let ctx = Arc::new(ServerContext::new());
        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.wait_stopped().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        ctx.request_stop();
        ctx.mark_stopped();
        tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let ctx = ServerContext::new();
        let mut rx = ctx.subscribe();
        ctx.begin_session();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ServerState::InProgress);
    }
}
