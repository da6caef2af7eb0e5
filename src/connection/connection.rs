use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info, warn};
use crate::connection::context::SessionContext;
use crate::connection::session::Session;
use crate::connection::transport::Transport;
use crate::message::{DispatchOutcome, PacketDispatcher};
use crate::server::ServerContext;

/// One accepted connection, served from readiness wait to teardown.
pub struct Connection<T: Transport> {
    id: String,
    transport: T,
    server: Arc<ServerContext>,
    dispatcher: Arc<PacketDispatcher>,
    ready_timeout: Duration,
}

impl<T: Transport> Connection<T> {
    pub fn new(
        id: String,
        transport: T,
        server: Arc<ServerContext>,
        dispatcher: Arc<PacketDispatcher>,
        ready_timeout: Duration,
    ) -> Self {
        Connection {
            id,
            transport,
            server,
            dispatcher,
            ready_timeout,
        }
    }

    /// Serve the connection to completion.
    ///
    /// Never fails: every per-connection error is logged and ends the
    /// session, after which the server goes back to accepting.
    pub async fn process(mut self) {
        if !self.server.begin_session() {
            info!("Connection {}: server stopping, closing at once", self.id);
            self.transport.close().await;
            return;
        }

        match self.transport.wait_ready(self.ready_timeout).await {
            Ok(true) => {
                let mut session = Session::new(self.id.clone());
                match self.transport.handshake().await {
                    Ok(format) => {
                        debug!("Connection {}: handshake done ({:?})", self.id, format);
                        self.serve_packets(&mut session).await;
                    }
                    Err(e) => error!("Connection {}: handshake failed: {}", self.id, e),
                }

                info!("Closing connection {}", self.id);
                self.transport.close().await;
                drop(session);
                info!("Closing connection {}... done", self.id);
            }
            Ok(false) => {
                error!("Connection {}: request timeout, no data within {:?}", self.id, self.ready_timeout);
                self.transport.close().await;
            }
            Err(e) => {
                error!("Connection {}: request timeout/error: {}", self.id, e);
                self.transport.close().await;
            }
        }

        self.server.end_session();
    }

    /// Packet loop.
    ///
    /// A stop request preempts the session: it ends while idle or at the
    /// next packet boundary instead of shutdown waiting for the peer to
    /// hang up.
    async fn serve_packets(&mut self, session: &mut Session) {
        let mut state_rx = self.server.subscribe();

        while self.transport.is_connected() {
            let read = tokio::select! {
                read = self.transport.read_packet() => read,
                _ = state_rx.wait_for(|state| state.is_shutting_down()) => {
                    info!("Connection {}: server stopping", self.id);
                    break;
                }
            };

            let packet = match read {
                Ok(Some(packet)) => packet,
                Ok(None) => continue,
                Err(e) if e.is_disconnect() => {
                    debug!("Connection {}: peer disconnected", self.id);
                    break;
                }
                Err(e) => {
                    warn!("Connection {}: read failed: {}", self.id, e);
                    break;
                }
            };

            let mut ctx = SessionContext::new(session, &mut self.transport, &self.server);
            match self.dispatcher.dispatch(packet, &mut ctx).await {
                Ok(DispatchOutcome::Continue) => {}
                Ok(DispatchOutcome::Close) => break,
                Err(e) => {
                    error!("Connection {}: failed to send reply: {}", self.id, e);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::transport::mock::MockTransport;
    use crate::handlers::test_support::{invoke_packet, raw_packet};
    use crate::server::ServerState;
    use crate::{Amf0Value, RtmpCommand};

    fn fixture(transport: MockTransport) -> (Connection<MockTransport>, Arc<ServerContext>) {
        let server = Arc::new(ServerContext::new());
        let conn = Connection::new(
            "conn-0".to_string(),
            transport,
            server.clone(),
            Arc::new(PacketDispatcher::new()),
            Duration::from_millis(50),
        );
        (conn, server)
    }

    #[tokio::test]
    async fn test_silent_peer_abandoned_without_handshake() {
        let mut transport = MockTransport::new(vec![]);
        transport.ready = false;
        let record = transport.record.clone();
        let (conn, server) = fixture(transport);

        conn.process().await;

        let record = record.lock().unwrap();
        assert_eq!(record.handshakes, 0);
        assert!(record.closed);
        assert_eq!(server.state(), ServerState::Accepting);
    }

    #[tokio::test]
    async fn test_connection_after_stop_request_closed_at_once() {
        let connect = RtmpCommand::connect("live", "rtmp://localhost/live");
        let transport = MockTransport::new(vec![Some(invoke_packet(&connect))]);
        let record = transport.record.clone();
        let (conn, server) = fixture(transport);

        server.request_stop();
        conn.process().await;

        let record = record.lock().unwrap();
        assert_eq!(record.handshakes, 0);
        assert!(record.sent.is_empty());
        assert!(record.closed);
        assert_eq!(server.state(), ServerState::Stopping);
    }

    #[tokio::test]
    async fn test_handshake_failure_skips_packet_loop() {
        let connect = RtmpCommand::connect("live", "rtmp://localhost/live");
        let mut transport = MockTransport::new(vec![Some(invoke_packet(&connect))]);
        transport.fail_handshake = true;
        let record = transport.record.clone();
        let (conn, server) = fixture(transport);

        conn.process().await;

        let record = record.lock().unwrap();
        assert_eq!(record.handshakes, 1);
        assert!(record.sent.is_empty());
        assert!(record.closed);
        assert_eq!(server.state(), ServerState::Accepting);
    }

    #[tokio::test]
    async fn test_fragments_and_unknown_packets_skipped() {
        let connect = RtmpCommand::connect("live", "rtmp://localhost/live");
        let transport = MockTransport::new(vec![
            None,
            Some(raw_packet(0x02, vec![0, 0, 0, 3])),
            None,
            Some(invoke_packet(&connect)),
        ]);
        let record = transport.record.clone();
        let (conn, _server) = fixture(transport);

        conn.process().await;

        let record = record.lock().unwrap();
        assert_eq!(record.sent.len(), 1);
        assert!(record.closed);
    }

    #[tokio::test]
    async fn test_play_ends_session() {
        let play = RtmpCommand::play("clip", 0.0);
        let create = RtmpCommand::create_stream(2.0);
        let transport = MockTransport::new(vec![
            Some(invoke_packet(&play)),
            Some(invoke_packet(&create)),
        ]);
        let record = transport.record.clone();
        let (conn, server) = fixture(transport);

        conn.process().await;

        // createStream after play is never read.
        assert!(record.lock().unwrap().sent.is_empty());
        assert_eq!(server.allocate_stream_id(), 1);
    }

    #[tokio::test]
    async fn test_send_failure_ends_session() {
        let connect = RtmpCommand::connect("live", "rtmp://localhost/live");
        let create = RtmpCommand::create_stream(2.0);
        let mut transport = MockTransport::new(vec![
            Some(invoke_packet(&connect)),
            Some(invoke_packet(&create)),
        ]);
        transport.fail_send = true;
        let record = transport.record.clone();
        let (conn, server) = fixture(transport);

        conn.process().await;

        assert!(record.lock().unwrap().closed);
        // The second request was never dispatched.
        assert_eq!(server.allocate_stream_id(), 1);
    }

    #[tokio::test]
    async fn test_stop_request_interrupts_idle_session() {
        let mut transport = MockTransport::new(vec![]);
        transport.hang_when_drained = true;
        let record = transport.record.clone();
        let (conn, server) = fixture(transport);

        let task = tokio::spawn(conn.process());
        let mut rx = server.subscribe();
        rx.wait_for(|state| *state == ServerState::InProgress).await.unwrap();

        server.request_stop();
        task.await.unwrap();

        assert!(record.lock().unwrap().closed);
        // Stopping is left for the accept loop to finish.
        assert_eq!(server.state(), ServerState::Stopping);
    }

    #[tokio::test]
    async fn test_flex_message_does_not_end_session() {
        let play = RtmpCommand::play("clip", 0.0).encode().unwrap();
        let mut body = vec![0x00];
        body.extend_from_slice(&play);
        let connect = RtmpCommand::connect("live", "rtmp://localhost/live")
            .with_argument(Amf0Value::Null);
        let transport = MockTransport::new(vec![
            Some(raw_packet(crate::MSG_TYPE_COMMAND_AMF3, body)),
            Some(invoke_packet(&connect)),
        ]);
        let record = transport.record.clone();
        let (conn, _server) = fixture(transport);

        conn.process().await;

        assert_eq!(record.lock().unwrap().sent.len(), 1);
    }
}
