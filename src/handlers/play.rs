use log::info;
use crate::Result;
use crate::connection::SessionContext;
use crate::handlers::{CommandHandler, InvokeOutcome, Method};
use crate::protocol::InvocationRequest;

/// Records what the client asked to play, then ends the session.
pub struct PlayHandler;

#[async_trait::async_trait]
impl CommandHandler for PlayHandler {
    fn method(&self) -> Method {
        Method::Play
    }

    async fn handle(
        &self,
        request: &InvocationRequest,
        ctx: &mut SessionContext<'_>,
    ) -> Result<InvokeOutcome> {
        let session = &mut *ctx.session;
        session.link.playpath = request.string_at(3).map(String::from);
        session.seek_time = request.number_at(4).unwrap_or(0.0);
        if request.len() > 5 {
            session.length = Some(request.number_at(5).unwrap_or(0.0));
        }

        info!(
            "Session {}: play {:?} from {}ms",
            session.id, session.link.playpath, session.seek_time
        );

        Ok(InvokeOutcome::Close)
    }
}
