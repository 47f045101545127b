use crate::config::PluginConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::event::{WebhookEvent, dispatch};

#[derive(Debug, Clone)]
pub struct HandleCommandArgs {
    pub event_type: String,
    pub payload: Vec<u8>,
}

pub async fn run(
    ctx: &AppContext,
    config: &PluginConfig,
    args: HandleCommandArgs,
) -> AppResult<()> {
    let event = WebhookEvent::parse(&args.event_type, &args.payload)?;
    dispatch(ctx, config, event).await
}
