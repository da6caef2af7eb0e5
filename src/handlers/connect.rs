use log::{debug, info};
use crate::Result;
use crate::amf::Amf0Value;
use crate::connection::{Link, SessionContext};
use crate::handlers::{CommandHandler, InvokeOutcome, Method, ResponseEncoder};
use crate::protocol::InvocationRequest;

pub struct ConnectHandler;

impl ConnectHandler {
    fn link_field<'a>(link: &'a mut Link, name: &str) -> Option<&'a mut Option<String>> {
        match name {
            "app" => Some(&mut link.app),
            "flashVer" => Some(&mut link.flash_ver),
            "swfUrl" => Some(&mut link.swf_url),
            "tcUrl" => Some(&mut link.tc_url),
            "pageUrl" => Some(&mut link.page_url),
            _ => None,
        }
    }

    fn apply_property(ctx: &mut SessionContext<'_>, name: &str, value: &Amf0Value) {
        if let Some(field) = Self::link_field(&mut ctx.session.link, name) {
            *field = value.as_string().map(String::from);
            return;
        }

        let Some(number) = value.as_number() else {
            return;
        };
        match name {
            "audioCodecs" => ctx.session.audio_codecs = number,
            "videoCodecs" => ctx.session.video_codecs = number,
            "objectEncoding" => ctx.session.object_encoding = number,
            _ => {}
        }
    }
}

#[async_trait::async_trait]
impl CommandHandler for ConnectHandler {
    fn method(&self) -> Method {
        Method::Connect
    }

    async fn handle(
        &self,
        request: &InvocationRequest,
        ctx: &mut SessionContext<'_>,
    ) -> Result<InvokeOutcome> {
        if let Some(properties) = request.object_at(2) {
            for (name, value) in properties {
                Self::apply_property(ctx, name, value);
            }
        }

        info!(
            "Session {}: connect app={:?} tcUrl={:?}",
            ctx.session.id, ctx.session.link.app, ctx.session.link.tc_url
        );

        let body = ResponseEncoder::encode_connect_result(
            request.transaction_id(),
            ctx.session.object_encoding,
        )?;
        ctx.transport.send_packet(&ResponseEncoder::reply_packet(body)).await?;
        debug!("Session {}: sent connect result", ctx.session.id);

        Ok(InvokeOutcome::Continue)
    }
}
