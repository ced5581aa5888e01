//! Threat dashboard embeds: live status, recent history and all-time statistics.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;
use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, Timestamp};

use crate::server::{
    data::{
        lockdown::LockdownRepository, moderation_case::ModerationCaseRepository,
        threat::ThreatRepository, whitelist::WhitelistRepository,
    },
    error::AppError,
    model::{
        moderation::ModerationCase,
        threat::{Severity, Threat},
    },
    service::{antinuke::tracker::ActionTracker, performance::PerformanceMonitor},
    util::format::{format_uptime, truncate},
};

pub const REFRESH_BUTTON_ID: &str = "refresh_dashboard";

pub const COLOR_LIVE: u32 = 0x00ff00;
pub const COLOR_LOCKDOWN: u32 = 0xff0000;
pub const COLOR_REPORT: u32 = 0x5865f2;

pub const DEFAULT_HISTORY_HOURS: i64 = 24;
pub const MAX_HISTORY_HOURS: i64 = 168;

const LIVE_THREAT_LIMIT: u64 = 5;
const HISTORY_CASE_LIMIT: usize = 20;
const TOP_TYPES: usize = 5;
const FIELD_LIMIT: usize = 1024;

/// `max(0, 100 - min(100, threats * 2))`
pub fn security_score(threat_count: usize) -> u8 {
    let penalty = threat_count.saturating_mul(2).min(100);
    (100 - penalty) as u8
}

pub fn score_indicator(score: u8) -> (&'static str, &'static str) {
    if score >= 80 {
        ("🟢", "Excellent security")
    } else if score >= 60 {
        ("🟡", "Good security, room for improvement")
    } else {
        ("🔴", "Needs attention")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn from_threats(threats: &[Threat]) -> Self {
        let mut counts = Self::default();
        for threat in threats {
            match threat.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }
}

/// Most frequent threat types, ties broken by name.
pub fn top_threat_types(threats: &[Threat], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for threat in threats {
        *counts.entry(threat.threat_type.as_str()).or_default() += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(kind, count)| (kind.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(limit);
    sorted
}

/// Case count per action, sorted by action name.
pub fn case_summary(cases: &[ModerationCase]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for case in cases {
        *counts.entry(case.action.as_str()).or_default() += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(action, count)| (action.to_string(), count))
        .collect();
    sorted.sort();
    sorted
}

/// Average threats per day since the oldest threat.
///
/// Spans shorter than a day count as one day.
pub fn threats_per_day(threats: &[Threat], now: DateTime<Utc>) -> f64 {
    let Some(oldest) = threats.iter().map(|t| t.reported_at).min() else {
        return 0.0;
    };

    let days = (now - oldest).num_seconds() as f64 / 86_400.0;
    threats.len() as f64 / days.max(1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLine {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Up to three threats and three cases, merged newest first and cut to five.
pub fn recent_activity(threats: &[Threat], cases: &[ModerationCase]) -> Vec<ActivityLine> {
    let mut lines: Vec<ActivityLine> = threats
        .iter()
        .take(3)
        .map(|t| ActivityLine {
            at: t.reported_at,
            text: format!("⚠️ {} threat ({})", t.threat_type, t.severity),
        })
        .chain(cases.iter().take(3).map(|c| ActivityLine {
            at: c.created_at,
            text: format!("⚖️ {} - <@{}>", c.action, c.user_id),
        }))
        .collect();

    lines.sort_by(|a, b| b.at.cmp(&a.at));
    lines.truncate(5);
    lines
}

fn bullet_list(entries: &[(String, usize)]) -> String {
    entries
        .iter()
        .map(|(name, count)| format!("• {}: {}", name, count))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Everything the live view shows.
#[derive(Debug, Clone)]
pub struct LiveStatus {
    pub anti_nuke_enabled: bool,
    pub locked_down: bool,
    pub whitelisted: usize,
    pub tracked_executors: usize,
    pub recent_threats: Vec<Threat>,
    pub memory_mb: Option<f64>,
    pub uptime_secs: u64,
}

pub fn live_embed(guild_name: &str, status: &LiveStatus) -> CreateEmbed {
    let color = if status.locked_down {
        COLOR_LOCKDOWN
    } else {
        COLOR_LIVE
    };
    let anti_nuke = if status.locked_down {
        "🔴 **LOCKDOWN ACTIVE**"
    } else if status.anti_nuke_enabled {
        "🟢 **Active & Monitoring**"
    } else {
        "⚪ **Disabled**"
    };

    let mut embed = CreateEmbed::new()
        .title("🛡️ Live Threat Dashboard")
        .description(format!("Real-time security monitoring for **{}**", guild_name))
        .color(color)
        .field("🛡️ Anti-Nuke Status", anti_nuke, true)
        .field(
            "📊 Whitelisted Users",
            format!("{} users", status.whitelisted),
            true,
        )
        .field(
            "🔍 Actions Monitored",
            format!("{} active executors", status.tracked_executors),
            true,
        );

    if status.recent_threats.is_empty() {
        embed = embed.field(
            "✅ No Recent Threats",
            "No threats detected in the last 24 hours",
            false,
        );
    } else {
        let lines = status
            .recent_threats
            .iter()
            .map(|t| {
                let user = t
                    .user_id
                    .map(|id| format!("<@{}>", id))
                    .unwrap_or_else(|| "unknown".to_string());
                format!("• {} (Severity: {}) - {}", t.threat_type, t.severity, user)
            })
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field(
            "⚠️ Recent Threats Detected",
            truncate(&lines, FIELD_LIMIT),
            false,
        );
    }

    let memory = status
        .memory_mb
        .map(|mb| format!("{:.2} MB", mb))
        .unwrap_or_else(|| "unavailable".to_string());
    embed
        .field(
            "⚡ Bot Performance",
            format!(
                "**Memory:** {}\n**Uptime:** {}",
                memory,
                format_uptime(status.uptime_secs)
            ),
            true,
        )
        .timestamp(Timestamp::now())
}

pub fn refresh_button() -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new(REFRESH_BUTTON_ID)
        .label("Refresh")
        .style(ButtonStyle::Primary)
        .emoji('🔄')])
}

/// `threats` and `cases` are newest first.
pub fn history_embed(
    guild_name: &str,
    hours: i64,
    threats: &[Threat],
    cases: &[ModerationCase],
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("📊 Threat History (Last {}h)", hours))
        .description(format!("Security activity for **{}**", guild_name))
        .color(COLOR_REPORT)
        .timestamp(Timestamp::now());

    if threats.is_empty() {
        embed = embed.field(
            "✅ No Threats Detected",
            format!("No security threats in the last {} hours", hours),
            false,
        );
    } else {
        let counts = SeverityCounts::from_threats(threats);
        embed = embed
            .field(
                "⚠️ Threats Detected",
                format!(
                    "**Total:** {}\n**Critical:** {} | **High:** {} | **Medium:** {} | **Low:** {}",
                    threats.len(),
                    counts.critical,
                    counts.high,
                    counts.medium,
                    counts.low
                ),
                false,
            )
            .field(
                "🔝 Top Threat Types",
                bullet_list(&top_threat_types(threats, TOP_TYPES)),
                true,
            );
    }

    let cases = &cases[..cases.len().min(HISTORY_CASE_LIMIT)];
    if !cases.is_empty() {
        embed = embed.field(
            "⚖️ Moderation Actions",
            format!(
                "**Total:** {}\n{}",
                cases.len(),
                bullet_list(&case_summary(cases))
            ),
            true,
        );
    }

    let activity = recent_activity(threats, cases);
    if !activity.is_empty() {
        let lines = activity
            .iter()
            .map(|line| format!("<t:{}:R> {}", line.at.timestamp(), line.text))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("🕐 Recent Activity", truncate(&lines, FIELD_LIMIT), false);
    }

    embed
}

pub fn stats_embed(
    guild_name: &str,
    member_count: u64,
    threats: &[Threat],
    case_count: usize,
    now: DateTime<Utc>,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("📈 Security Statistics")
        .description(format!("All-time security stats for **{}**", guild_name))
        .color(COLOR_REPORT)
        .field(
            "📊 Overall Statistics",
            format!(
                "**Threats Detected:** {}\n**Moderation Actions:** {}\n**Total Users:** {}",
                threats.len(),
                case_count,
                member_count
            ),
            false,
        )
        .field(
            "⚡ Threat Density",
            format!("{:.2} threats/day average", threats_per_day(threats, now)),
            true,
        );

    let top = top_threat_types(threats, TOP_TYPES);
    if !top.is_empty() {
        embed = embed.field("🔝 Most Common Threats", bullet_list(&top), true);
    }

    let score = security_score(threats.len());
    let (emoji, label) = score_indicator(score);
    embed
        .field(
            "🛡️ Security Score",
            format!("{} **{}/100**\n{}", emoji, score, label),
            false,
        )
        .timestamp(Timestamp::now())
}

/// Loads the data behind each dashboard view.
pub struct ThreatDashboardService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ThreatDashboardService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn live_status(
        &self,
        guild_id: u64,
        anti_nuke_enabled: bool,
        tracker: &ActionTracker,
        performance: &PerformanceMonitor,
        now: DateTime<Utc>,
    ) -> Result<LiveStatus, AppError> {
        let locked_down = LockdownRepository::new(self.db)
            .find_by_guild_id(guild_id)
            .await?
            .is_some();
        let whitelisted = WhitelistRepository::new(self.db)
            .get_by_guild(guild_id)
            .await?
            .len();

        let mut recent_threats = ThreatRepository::new(self.db)
            .get_since(guild_id, now - Duration::hours(24))
            .await?;
        recent_threats.truncate(LIVE_THREAT_LIMIT as usize);

        let stats = performance.stats().await;

        Ok(LiveStatus {
            anti_nuke_enabled,
            locked_down,
            whitelisted,
            tracked_executors: tracker.tracked_executors(),
            recent_threats,
            memory_mb: stats.memory_mb,
            uptime_secs: stats.uptime.num_seconds().max(0) as u64,
        })
    }

    /// Threats and cases of the last `hours`, newest first.
    pub async fn history(
        &self,
        guild_id: u64,
        hours: i64,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Threat>, Vec<ModerationCase>), AppError> {
        let since = now - Duration::hours(hours.clamp(1, MAX_HISTORY_HOURS));

        let threats = ThreatRepository::new(self.db)
            .get_since(guild_id, since)
            .await?;
        let cases = ModerationCaseRepository::new(self.db)
            .get_since(guild_id, since)
            .await?;

        Ok((threats, cases))
    }

    /// Every threat and the total case count.
    pub async fn all_time(&self, guild_id: u64) -> Result<(Vec<Threat>, usize), AppError> {
        let threats = ThreatRepository::new(self.db)
            .get_since(guild_id, DateTime::UNIX_EPOCH)
            .await?;
        let cases = ModerationCaseRepository::new(self.db)
            .get_since(guild_id, DateTime::UNIX_EPOCH)
            .await?;

        Ok((threats, cases.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use test_utils::{builder::TestBuilder, factory};

    fn threat(kind: &str, severity: Severity, hours_ago: i64) -> Threat {
        Threat {
            id: 0,
            guild_id: 1,
            user_id: Some(2),
            threat_type: kind.to_string(),
            severity,
            details: "{}".to_string(),
            reported_at: Utc::now() - Duration::hours(hours_ago),
        }
    }

    fn case(action: &str, hours_ago: i64) -> ModerationCase {
        ModerationCase {
            id: 0,
            guild_id: 1,
            user_id: 3,
            moderator_id: 4,
            action: action.to_string(),
            reason: None,
            created_at: Utc::now() - Duration::hours(hours_ago),
        }
    }

    /// Tests the score formula and its color bands.
    ///
    /// Expected: 2 points per threat, floored at 0
    #[test]
    fn scores_threat_counts() {
        assert_eq!(security_score(0), 100);
        assert_eq!(security_score(10), 80);
        assert_eq!(security_score(11), 78);
        assert_eq!(security_score(500), 0);

        assert_eq!(score_indicator(80).0, "🟢");
        assert_eq!(score_indicator(60).0, "🟡");
        assert_eq!(score_indicator(59).0, "🔴");
    }

    #[test]
    fn counts_severities_and_top_types() {
        let threats = vec![
            threat("phishing", Severity::High, 1),
            threat("phishing", Severity::High, 2),
            threat("nuke_attempt", Severity::Critical, 3),
            threat("suspicious_activity", Severity::Low, 4),
        ];

        let counts = SeverityCounts::from_threats(&threats);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.low, 1);

        let top = top_threat_types(&threats, 2);
        assert_eq!(
            top,
            vec![("phishing".to_string(), 2), ("nuke_attempt".to_string(), 1)]
        );
    }

    /// Tests density over a short history.
    ///
    /// Expected: spans under one day divide by one
    #[test]
    fn density_uses_at_least_one_day() {
        let now = Utc::now();
        assert_eq!(threats_per_day(&[], now), 0.0);

        let recent = vec![threat("phishing", Severity::High, 1); 3];
        assert_eq!(threats_per_day(&recent, now), 3.0);

        let spread = vec![
            threat("phishing", Severity::High, 0),
            threat("phishing", Severity::High, 96),
        ];
        let per_day = threats_per_day(&spread, now);
        assert!((per_day - 0.5).abs() < 0.01);
    }

    #[test]
    fn merges_recent_activity_newest_first() {
        let threats = vec![
            threat("phishing", Severity::High, 1),
            threat("phishing", Severity::High, 5),
        ];
        let cases = vec![case("ban", 2), case("kick", 3), case("kick", 4), case("ban", 6)];

        let activity = recent_activity(&threats, &cases);

        assert_eq!(activity.len(), 5);
        assert!(activity[0].text.starts_with("⚠️ phishing"));
        assert_eq!(activity[1].text, "⚖️ ban - <@3>");
        assert!(activity.windows(2).all(|w| w[0].at >= w[1].at));
    }

    #[test]
    fn history_embed_without_threats() {
        let embed = serde_json::to_value(history_embed("Guild", 24, &[], &[])).unwrap();

        assert_eq!(embed["title"], "📊 Threat History (Last 24h)");
        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0]["name"], "✅ No Threats Detected");
    }

    #[test]
    fn stats_embed_shows_score() {
        let threats = vec![threat("phishing", Severity::High, 30); 15];

        let embed = serde_json::to_value(stats_embed("Guild", 42, &threats, 3, Utc::now())).unwrap();

        let score = embed["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "🛡️ Security Score")
            .and_then(|f| f["value"].as_str().map(str::to_string))
            .unwrap();
        assert_eq!(score, "🟡 **70/100**\nGood security, room for improvement");
        assert_eq!(embed["color"], Value::from(COLOR_REPORT));
    }

    /// Tests that history only loads rows inside the requested window.
    ///
    /// Expected: one threat and one case from the last 24 hours
    #[tokio::test]
    async fn history_filters_by_window() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_guild_tables()
            .with_log_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let guild = factory::create_guild(db).await?;
        let now = Utc::now();

        factory::threat::ThreatFactory::new(db, &guild.guild_id)
            .build()
            .await?;
        factory::threat::ThreatFactory::new(db, &guild.guild_id)
            .reported_at(now - Duration::hours(48))
            .build()
            .await?;
        factory::create_moderation_case(db, &guild.guild_id).await?;
        factory::moderation_case::ModerationCaseFactory::new(db, &guild.guild_id)
            .created_at(now - Duration::hours(30))
            .build()
            .await?;

        let guild_id: u64 = guild.guild_id.parse().unwrap();
        let service = ThreatDashboardService::new(db);
        let (threats, cases) = service.history(guild_id, 24, now).await?;
        let (all_threats, case_count) = service.all_time(guild_id).await?;

        assert_eq!(threats.len(), 1);
        assert_eq!(cases.len(), 1);
        assert_eq!(all_threats.len(), 2);
        assert_eq!(case_count, 2);

        Ok(())
    }
}
