use std::sync::Arc;

use probot_botapi::{BotApi, RawBotApi, StructuredBotApi};
use probot_config::{RelayConfig, ResponseMode};

/// Shared server state, wrapped in `Arc` for use across connection tasks.
///
/// Everything here is immutable: connections share configuration and the bot
/// client handle, never mutable data.
pub struct GatewayState {
    pub config: RelayConfig,
    pub bot: Arc<dyn BotApi>,
}

impl GatewayState {
    pub fn new(config: RelayConfig, bot: Arc<dyn BotApi>) -> Arc<Self> {
        Arc::new(Self { config, bot })
    }

    /// Build the state with the bot client variant the config selects.
    pub fn from_config(config: RelayConfig) -> probot_botapi::Result<Arc<Self>> {
        let bot: Arc<dyn BotApi> = match config.response_mode {
            ResponseMode::Structured => Arc::new(StructuredBotApi::new(config.bot_api_url.as_str())?),
            ResponseMode::Raw => Arc::new(RawBotApi::new(config.bot_api_url.as_str())?),
        };
        Ok(Self::new(config, bot))
    }
}
