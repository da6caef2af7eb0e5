// Shared helpers for the end-to-end tests: a local server and a minimal client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use rtmp::{
    client_handshake, ChunkReader, ChunkWriter, InvocationRequest, RtmpCommand, RtmpHeader,
    RtmpPacket, RtmpServer, ServerConfig, ServerState,
};

pub const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind on an ephemeral loopback port and start the accept loop.
#[allow(dead_code)]
pub async fn start_server(ready_timeout: Duration) -> (Arc<RtmpServer>, JoinHandle<rtmp::Result<()>>) {
    let config = ServerConfig::builder()
        .host("127.0.0.1")
        .port(0)
        .ready_timeout(ready_timeout)
        .build()
        .expect("valid test config");
    let server = Arc::new(RtmpServer::bind(config).await.expect("bind test server"));

    let handle = {
        let server = server.clone();
        tokio::spawn(async move { server.run().await })
    };
    (server, handle)
}

#[allow(dead_code)]
pub async fn wait_for_state(server: &RtmpServer, wanted: ServerState) {
    let mut rx = server.context().subscribe();
    tokio::time::timeout(IO_TIMEOUT, rx.wait_for(|state| *state == wanted))
        .await
        .expect("state change timed out")
        .expect("state channel closed");
}

/// Plays the client role over a real socket.
pub struct TestClient {
    stream: TcpStream,
    reader: ChunkReader,
    writer: ChunkWriter,
}

#[allow(dead_code)]
impl TestClient {
    /// Connect and complete the handshake.
    pub async fn connect(addr: SocketAddr) -> Self {
        let mut stream = TcpStream::connect(addr).await.expect("connect to test server");
        {
            let (mut rd, mut wr) = stream.split();
            tokio::time::timeout(IO_TIMEOUT, client_handshake(&mut rd, &mut wr))
                .await
                .expect("handshake timed out")
                .expect("handshake failed");
        }
        Self::from_stream(stream)
    }

    /// Wrap a socket without handshaking.
    pub fn from_stream(stream: TcpStream) -> Self {
        TestClient {
            stream,
            reader: ChunkReader::new(),
            writer: ChunkWriter::new(),
        }
    }

    pub async fn send_packet(&mut self, packet: &RtmpPacket) {
        self.writer
            .write_packet(packet, &mut self.stream)
            .await
            .expect("send packet");
    }

    pub async fn send_command(&mut self, command: &RtmpCommand) {
        self.send_body(command.encode().expect("encode command")).await;
    }

    /// Send an invoke with an arbitrary body.
    pub async fn send_body(&mut self, body: Vec<u8>) {
        let header = RtmpHeader::command(0, body.len() as u32, 0);
        self.send_packet(&RtmpPacket::new(header, body)).await;
    }

    /// Next complete packet from the server.
    pub async fn read_packet(&mut self) -> RtmpPacket {
        let read = async {
            loop {
                if let Some(packet) = self.reader.read_chunk(&mut self.stream).await.expect("read reply") {
                    return packet;
                }
            }
        };
        tokio::time::timeout(IO_TIMEOUT, read).await.expect("reply timed out")
    }

    pub async fn read_reply(&mut self) -> InvocationRequest {
        let packet = self.read_packet().await;
        InvocationRequest::decode(&packet.payload).expect("decode reply")
    }

    /// Whether the server has closed its side, with nothing left unread.
    pub async fn is_closed_by_server(&mut self) -> bool {
        let mut buf = [0u8; 1];
        match tokio::time::timeout(IO_TIMEOUT, self.stream.read(&mut buf)).await {
            Ok(Ok(0)) | Ok(Err(_)) => true,
            Ok(Ok(_)) | Err(_) => false,
        }
    }

    pub async fn shutdown(mut self) {
        let _ = self.stream.shutdown().await;
    }
}
