//! Phishing filter.
//!
//! Every guild message from a human is scanned when the guild has the filter enabled. A
//! detection removes the message, warns the author briefly, records a phishing threat and
//! alerts the operator. Crossing the critical violation count raises one extra alert.

use std::time::{Duration, Instant};

use serde_json::json;
use serenity::all::{Context, Embed, Message};

use super::record_timing;
use crate::server::{
    data::threat::ThreatRepository,
    error::{log_bot_error, AppError},
    model::threat::{CreateThreatParam, Severity, THREAT_PHISHING},
    service::{
        alert::{Alert, AlertChannel, COLOR_CRITICAL, COLOR_WARNING},
        integrity::{ScanResult, CRITICAL_VIOLATIONS},
    },
    state::BotState,
    util::format::truncate,
};

const WARNING_LIFETIME: Duration = Duration::from_secs(10);

pub async fn handle_message(state: &BotState, ctx: Context, message: Message) {
    let Some(guild_id) = message.guild_id else {
        return;
    };
    if message.author.bot {
        return;
    }

    let config = match state.configs.get(guild_id.get()).await {
        Ok(config) => config,
        Err(e) => {
            log_bot_error(&format!("Failed to load config of guild {}", guild_id), &e);
            return;
        }
    };
    if !config.phishing_filter_enabled {
        return;
    }

    let started = Instant::now();
    let text = message_text(&message.content, &message.embeds);
    let scan = state.integrity.scan(&text);

    if scan.is_phishing {
        if let Err(e) = respond_to_phishing(state, &ctx, &message, &text, &scan).await {
            log_bot_error(
                &format!("Failed to handle phishing in guild {}", guild_id),
                &e,
            );
        }
    }

    record_timing(state, "message_scan", started).await;
}

/// Message content followed by the text of its embeds.
pub fn message_text(content: &str, embeds: &[Embed]) -> String {
    let mut parts = vec![content.to_string()];

    for embed in embeds {
        parts.extend(embed.title.clone());
        parts.extend(embed.description.clone());
        parts.extend(embed.url.clone());
        for field in &embed.fields {
            parts.push(field.name.clone());
            parts.push(field.value.clone());
        }
    }

    parts.retain(|p| !p.is_empty());
    parts.join("\n")
}

async fn respond_to_phishing(
    state: &BotState,
    ctx: &Context,
    message: &Message,
    text: &str,
    scan: &ScanResult,
) -> Result<(), AppError> {
    let guild_id = message.guild_id.map(|id| id.get()).unwrap_or_default();
    let author_id = message.author.id.get();

    tracing::warn!(
        "Phishing from {} in guild {} ({:.0}% confidence)",
        author_id,
        guild_id,
        scan.confidence * 100.0
    );

    if let Err(e) = message.delete(&ctx.http).await {
        log_bot_error("Failed to delete phishing message", &AppError::from(e));
    }

    match message
        .channel_id
        .say(
            &ctx.http,
            format!(
                "⚠️ <@{}>, your message was removed because it looks like a phishing attempt.",
                author_id
            ),
        )
        .await
    {
        Ok(warning) => {
            let http = ctx.http.clone();
            tokio::spawn(async move {
                tokio::time::sleep(WARNING_LIFETIME).await;
                if let Err(e) = warning.delete(&http).await {
                    tracing::debug!("Failed to delete phishing warning: {}", e);
                }
            });
        }
        Err(e) => tracing::debug!("Failed to post phishing warning: {}", e),
    }

    ThreatRepository::new(&state.db)
        .create(CreateThreatParam {
            guild_id,
            user_id: Some(author_id),
            threat_type: THREAT_PHISHING.to_string(),
            severity: Severity::High,
            details: json!({
                "channel_id": message.channel_id.get(),
                "confidence": scan.confidence,
                "indicators": scan.indicators,
                "content": truncate(text, 500),
            }),
        })
        .await?;

    let violation = state.integrity.record_violation(guild_id);
    let server = message
        .guild_id
        .and_then(|id| ctx.cache.guild(id).map(|guild| guild.name.clone()))
        .unwrap_or_else(|| guild_id.to_string());

    state
        .alerts
        .send(
            &Alert::new(AlertChannel::Phishing, "🎣 Phishing Blocked")
                .description(truncate(text, 1000))
                .color(COLOR_WARNING)
                .field("Server", format!("{} ({})", server, guild_id), true)
                .field("User", format!("<@{}> ({})", author_id, author_id), true)
                .field(
                    "Confidence",
                    format!("{:.0}%", scan.confidence * 100.0),
                    true,
                )
                .field("Indicators", truncate(&scan.indicators.join("\n"), 1000), false),
        )
        .await;

    if violation.crossed_critical {
        state
            .alerts
            .send(
                &Alert::new(AlertChannel::Security, "🚨 Repeated Phishing")
                    .description(format!(
                        "{} has blocked more than {} phishing messages. Monitoring continues.",
                        server, CRITICAL_VIOLATIONS
                    ))
                    .color(COLOR_CRITICAL)
                    .field("Violations", violation.count.to_string(), true),
            )
            .await;
    }

    Ok(())
}
