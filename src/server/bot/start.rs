use serenity::all::{Client, GatewayIntents};

use crate::server::{
    bot::handler::Handler,
    config::{Config, ShardMode},
    error::AppError,
    state::{BotState, DiscordHandles},
};

/// Gateway intents the handlers depend on.
///
/// GUILD_MEMBERS, GUILD_PRESENCES and MESSAGE_CONTENT are privileged and must be enabled in
/// the Discord Developer Portal.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MODERATION
        | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
        | GatewayIntents::GUILD_WEBHOOKS
        | GatewayIntents::GUILD_PRESENCES
}

/// Builds the Discord client without connecting.
///
/// The returned handles share the client's HTTP client, cache and shard manager, so the
/// dashboard and the scheduler can use them while the client runs in its own task.
pub async fn init_bot(config: &Config, state: BotState) -> Result<(Client, DiscordHandles), AppError> {
    let client = Client::builder(&config.discord_bot_token, intents())
        .event_handler(Handler::new(state))
        .await?;

    let handles = DiscordHandles {
        http: client.http.clone(),
        cache: client.cache.clone(),
        shard_manager: client.shard_manager.clone(),
    };

    Ok((client, handles))
}

/// Connects every shard and runs until the shard manager shuts down.
pub async fn start_bot(mut client: Client, shard_mode: ShardMode) -> Result<(), AppError> {
    match shard_mode {
        ShardMode::Auto => {
            tracing::info!("Starting Discord bot with recommended shard count");
            client.start_autosharded().await?;
        }
        ShardMode::Fixed(count) => {
            tracing::info!("Starting Discord bot with {} shards", count);
            client.start_shards(count).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_privileged_intents() {
        let intents = intents();

        assert!(intents.contains(GatewayIntents::GUILD_PRESENCES));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::GUILD_MODERATION));
    }
}
