use log::debug;
use crate::Result;
use crate::connection::SessionContext;
use crate::handlers::{CommandHandler, InvokeOutcome, Method, ResponseEncoder};
use crate::protocol::InvocationRequest;

pub struct CreateStreamHandler;

#[async_trait::async_trait]
impl CommandHandler for CreateStreamHandler {
    fn method(&self) -> Method {
        Method::CreateStream
    }

    async fn handle(
        &self,
        request: &InvocationRequest,
        ctx: &mut SessionContext<'_>,
    ) -> Result<InvokeOutcome> {
        let stream_id = ctx.server.allocate_stream_id();
        debug!("Session {}: created stream {}", ctx.session.id, stream_id);

        let body = ResponseEncoder::encode_create_stream_result(request.transaction_id(), stream_id)?;
        ctx.transport.send_packet(&ResponseEncoder::reply_packet(body)).await?;

        Ok(InvokeOutcome::Continue)
    }
}
