use std::io::{self, Read};
use std::sync::Arc;
use std::thread;
use log::{debug, info, warn};
use tokio::runtime::Handle;
use crate::server::server::RtmpServer;

/// Why the console stopped reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Shutdown,
    InputClosed,
}

/// Reads single-character commands from a byte stream, normally stdin.
///
/// `q` stops the server. Whitespace is skipped and anything else is
/// reported and ignored.
pub struct ControlConsole {
    server: Arc<RtmpServer>,
    runtime: Handle,
}

impl ControlConsole {
    pub fn new(server: Arc<RtmpServer>, runtime: Handle) -> Self {
        ControlConsole { server, runtime }
    }

    /// Run on a dedicated thread over stdin.
    pub fn spawn(self) -> io::Result<thread::JoinHandle<ConsoleExit>> {
        thread::Builder::new()
            .name("rtmp-console".to_string())
            .spawn(move || self.run(io::stdin().lock()))
    }

    /// Blocks the calling thread; must not run on a runtime worker.
    pub fn run<R: Read>(&self, input: R) -> ConsoleExit {
        for byte in input.bytes() {
            let byte = match byte {
                Ok(byte) => byte,
                Err(e) => {
                    debug!("Console input failed: {}", e);
                    return ConsoleExit::InputClosed;
                }
            };

            match byte {
                b'q' => {
                    info!("Exiting");
                    self.runtime.block_on(self.server.stop());
                    return ConsoleExit::Shutdown;
                }
                b if b.is_ascii_whitespace() => {}
                other => warn!("Unknown command '{}', ignoring", other as char),
            }
        }

        debug!("Console input closed");
        ConsoleExit::InputClosed
    }
}
