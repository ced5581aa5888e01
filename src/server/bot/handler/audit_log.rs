//! Audit log feed for the anti-nuke detector.
//!
//! Audit log entries name the executor, unlike the plain create/delete gateway events, so
//! they are the only source counted against thresholds.

use std::time::Instant;

use chrono::Utc;
use serenity::all::{AuditLogEntry, Context, GuildId};

use super::record_timing;
use crate::server::{
    error::log_bot_error,
    model::antinuke::ActionKind,
    service::antinuke::{tracker::Executor, AntiNukeService, MonitoredAction},
    state::BotState,
};

pub async fn handle_audit_log_entry(
    state: &BotState,
    ctx: Context,
    entry: AuditLogEntry,
    guild_id: GuildId,
) {
    let Some(kind) = ActionKind::from_audit_action(&entry.action) else {
        return;
    };

    let started = Instant::now();
    let owner_id = ctx.cache.guild(guild_id).map(|guild| guild.owner_id.get());
    let bot_user_id = ctx.cache.current_user().id.get();

    let action = MonitoredAction {
        guild_id: guild_id.get(),
        owner_id,
        executor: Executor::User(entry.user_id.get()),
        kind,
        details: audit_details(
            entry.target_id.map(|id| id.get()),
            entry.reason.as_deref(),
        ),
        at: Utc::now(),
    };

    let service = AntiNukeService::new(
        &state.db,
        &ctx.http,
        &state.configs,
        &state.tracker,
        &state.alerts,
        bot_user_id,
    );

    if let Err(e) = service.monitor_action(&action).await {
        log_bot_error(
            &format!("Anti-nuke monitoring failed in guild {}", guild_id),
            &e,
        );
    }

    record_timing(state, "audit_log_entry", started).await;
}

pub fn audit_details(target_id: Option<u64>, reason: Option<&str>) -> String {
    let target = target_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match reason.filter(|r| !r.trim().is_empty()) {
        Some(reason) => format!("target {}, reason: {}", target, reason),
        None => format!("target {}", target),
    }
}
