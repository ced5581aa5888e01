use std::time::Instant;

use serenity::all::{Context, Interaction};

use super::record_timing;
use crate::server::{
    bot::command::{self, threat_dashboard},
    error::log_bot_error,
    service::threat_dashboard::REFRESH_BUTTON_ID,
    state::BotState,
};

/// Routes slash commands to their handlers and dashboard buttons to their refresh.
pub async fn handle_interaction(state: &BotState, ctx: Context, interaction: Interaction) {
    match interaction {
        Interaction::Command(command) => command::dispatch(&ctx, state, &command).await,
        Interaction::Component(component)
            if component.data.custom_id == REFRESH_BUTTON_ID =>
        {
            let started = Instant::now();
            if let Err(e) = threat_dashboard::refresh(&ctx, state, &component).await {
                log_bot_error("Threat dashboard refresh failed", &e);
            }
            record_timing(state, "dashboard_refresh", started).await;
        }
        _ => {}
    }
}
