use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    model::dashboard::BotStatsDto,
    server::{
        service::stats::{dashboard_stats, shard_latency_ms, CacheCounts},
        state::AppState,
    },
};

pub static STATS_TAG: &str = "stats";

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = STATS_TAG,
    responses(
        (status = 200, description = "Bot-wide statistics", body = BotStatsDto),
    ),
)]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let counts = CacheCounts::from_cache(&state.discord.cache);
    let uptime = state.performance.uptime().num_seconds().max(0) as u64;
    let ping = shard_latency_ms(&state.discord.shard_manager).await;

    (StatusCode::OK, Json(dashboard_stats(counts, uptime, ping)))
}
