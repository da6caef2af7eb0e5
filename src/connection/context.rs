use crate::connection::session::Session;
use crate::connection::transport::Transport;
use crate::server::ServerContext;

/// Everything a handler may touch while serving one packet.
pub struct SessionContext<'a> {
    pub session: &'a mut Session,
    pub transport: &'a mut dyn Transport,
    pub server: &'a ServerContext,
}

impl<'a> SessionContext<'a> {
    pub fn new(
        session: &'a mut Session,
        transport: &'a mut dyn Transport,
        server: &'a ServerContext,
    ) -> Self {
        SessionContext {
            session,
            transport,
            server,
        }
    }
}
