//! Command usage report printed by the `analyze_usage` binary.

use std::{collections::HashSet, fmt::Write};

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::command_usage::CommandUsageRepository,
    error::AppError,
    model::usage::CommandUsage,
    util::{
        ansi::{BOLD, CYAN, GREEN, RED, RESET, YELLOW},
        format::hour_label,
    },
};

pub const REPORT_DAYS: i64 = 7;

const BAR_WIDTH: u64 = 40;
const RANKED_HOURS: usize = 5;
const MAINTENANCE_HOURS: u32 = 2;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourUsage {
    pub hour: u32,
    pub commands: u64,
    pub servers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    MaintenanceWindow { start: u32, end: u32 },
    AvoidWindow { start: u32, end: u32 },
    WeekendsBusiest,
    AveragePerDay { total: u64, per_day: u64 },
}

impl Recommendation {
    pub fn message(&self) -> String {
        match self {
            Self::MaintenanceWindow { start, end } => format!(
                "✅ Best maintenance window: {} - {}",
                hour_label(*start),
                hour_label(*end)
            ),
            Self::AvoidWindow { start, end } => format!(
                "❌ Avoid updates during: {} - {}",
                hour_label(*start),
                hour_label(*end)
            ),
            Self::WeekendsBusiest => {
                "⚠️  Weekends are busiest - schedule updates for weekdays if possible".to_string()
            }
            Self::AveragePerDay { total, per_day } => format!(
                "📈 Current usage: {} commands in {} days (~{} per day)",
                total, REPORT_DAYS, per_day
            ),
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Self::MaintenanceWindow { .. } => GREEN,
            Self::AvoidWindow { .. } => RED,
            Self::WeekendsBusiest => YELLOW,
            Self::AveragePerDay { .. } => CYAN,
        }
    }
}

/// Bar color relative to the busiest hour.
pub fn bar_color(commands: u64, peak: u64) -> &'static str {
    let share = if peak == 0 {
        0.0
    } else {
        commands as f64 / peak as f64
    };

    if share > 0.7 {
        RED
    } else if share > 0.4 {
        YELLOW
    } else {
        GREEN
    }
}

pub fn bar_length(commands: u64, peak: u64) -> usize {
    if peak == 0 {
        return 0;
    }
    (commands * BAR_WIDTH / peak) as usize
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    pub total: u64,
    /// All 24 hours in order.
    pub hourly: [HourUsage; 24],
    /// Commands per weekday, Monday first.
    pub by_weekday: [u64; 7],
}

impl UsageReport {
    pub fn from_usage(usage: &[CommandUsage]) -> Self {
        let mut hourly: [HourUsage; 24] = std::array::from_fn(|hour| HourUsage {
            hour: hour as u32,
            ..Default::default()
        });
        let mut servers: Vec<HashSet<u64>> = vec![HashSet::new(); 24];
        let mut by_weekday = [0u64; 7];

        for entry in usage {
            let hour = entry.used_at.hour() as usize;
            hourly[hour].commands += 1;
            if let Some(guild_id) = entry.guild_id {
                servers[hour].insert(guild_id);
            }
            by_weekday[entry.used_at.weekday().num_days_from_monday() as usize] += 1;
        }

        for (slot, guilds) in hourly.iter_mut().zip(&servers) {
            slot.servers = guilds.len() as u64;
        }

        Self {
            total: usage.len() as u64,
            hourly,
            by_weekday,
        }
    }

    pub fn peak(&self) -> u64 {
        self.hourly.iter().map(|h| h.commands).max().unwrap_or(0)
    }

    /// Busiest hours, earlier hour first on ties.
    pub fn peak_hours(&self) -> Vec<HourUsage> {
        let mut hours: Vec<HourUsage> = self
            .hourly
            .iter()
            .copied()
            .filter(|h| h.commands > 0)
            .collect();
        hours.sort_by(|a, b| b.commands.cmp(&a.commands).then(a.hour.cmp(&b.hour)));
        hours.truncate(RANKED_HOURS);
        hours
    }

    /// Quietest hours, including hours without any commands.
    pub fn quiet_hours(&self) -> Vec<HourUsage> {
        let mut hours: Vec<HourUsage> = self.hourly.to_vec();
        hours.sort_by(|a, b| a.commands.cmp(&b.commands).then(a.hour.cmp(&b.hour)));
        hours.truncate(RANKED_HOURS);
        hours
    }

    /// Weekdays with commands, busiest first.
    pub fn weekday_ranking(&self) -> Vec<(Weekday, u64)> {
        let mut days: Vec<(Weekday, u64)> = WEEKDAYS
            .into_iter()
            .zip(self.by_weekday)
            .filter(|(_, count)| *count > 0)
            .collect();
        days.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then(a.0.num_days_from_monday().cmp(&b.0.num_days_from_monday()))
        });
        days
    }

    /// Weekend traffic per day above the weekday average.
    pub fn weekends_busiest(&self) -> bool {
        let weekday_avg = self.by_weekday[..5].iter().sum::<u64>() as f64 / 5.0;
        let weekend_avg = self.by_weekday[5..].iter().sum::<u64>() as f64 / 2.0;
        weekend_avg > weekday_avg
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        if self.total == 0 {
            return Vec::new();
        }

        let mut recommendations = Vec::new();

        if let Some(quietest) = self.quiet_hours().first() {
            recommendations.push(Recommendation::MaintenanceWindow {
                start: quietest.hour,
                end: (quietest.hour + MAINTENANCE_HOURS) % 24,
            });
        }
        if let Some(busiest) = self.peak_hours().first() {
            recommendations.push(Recommendation::AvoidWindow {
                start: busiest.hour,
                end: (busiest.hour + MAINTENANCE_HOURS) % 24,
            });
        }
        if self.weekends_busiest() {
            recommendations.push(Recommendation::WeekendsBusiest);
        }
        recommendations.push(Recommendation::AveragePerDay {
            total: self.total,
            per_day: self.total / REPORT_DAYS as u64,
        });

        recommendations
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_report(&mut out);
        out
    }

    fn write_report(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "\n{BOLD}{CYAN}🔍 NEXUS USAGE ANALYSIS{RESET}\n")?;
        writeln!(out, "Analyzing last {} days of activity...\n", REPORT_DAYS)?;
        writeln!(
            out,
            "{BOLD}📊 Total Commands ({} days): {GREEN}{}{RESET}\n",
            REPORT_DAYS, self.total
        )?;

        if self.total == 0 {
            writeln!(out, "No commands recorded in this period.")?;
            return Ok(());
        }

        writeln!(out, "{BOLD}⏰ HOURLY USAGE BREAKDOWN:{RESET}\n")?;
        let peak = self.peak();
        for hour in self.hourly.iter().filter(|h| h.commands > 0) {
            writeln!(
                out,
                "{} | {}{}{RESET} {} commands ({} servers)",
                hour_label(hour.hour),
                bar_color(hour.commands, peak),
                "█".repeat(bar_length(hour.commands, peak)),
                hour.commands,
                hour.servers
            )?;
        }

        writeln!(out, "\n{BOLD}{RED}🔴 PEAK HOURS (Avoid maintenance):{RESET}\n")?;
        for (i, hour) in self.peak_hours().iter().enumerate() {
            writeln!(
                out,
                "{}. {} - {RED}{} commands{RESET}",
                i + 1,
                hour_label(hour.hour),
                hour.commands
            )?;
        }

        writeln!(out, "\n{BOLD}{GREEN}🟢 QUIET HOURS (Best for maintenance):{RESET}\n")?;
        for (i, hour) in self.quiet_hours().iter().enumerate() {
            writeln!(
                out,
                "{}. {} - {GREEN}{} commands{RESET}",
                i + 1,
                hour_label(hour.hour),
                hour.commands
            )?;
        }

        writeln!(out, "\n{BOLD}📅 USAGE BY DAY OF WEEK:{RESET}\n")?;
        for (day, count) in self.weekday_ranking() {
            writeln!(
                out,
                "{:<10} - {CYAN}{} commands{RESET}",
                weekday_name(day),
                count
            )?;
        }

        writeln!(out, "\n{BOLD}{CYAN}💡 RECOMMENDATIONS:{RESET}\n")?;
        for recommendation in self.recommendations() {
            writeln!(
                out,
                "{}{}{RESET}",
                recommendation.color(),
                recommendation.message()
            )?;
        }

        Ok(())
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Builds the report over the last seven days.
pub async fn weekly_report(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<UsageReport, AppError> {
    let usage = CommandUsageRepository::new(db)
        .get_since(now - Duration::days(REPORT_DAYS))
        .await?;

    Ok(UsageReport::from_usage(&usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_utils::{builder::TestBuilder, factory};

    fn usage(guild_id: u64, at: DateTime<Utc>) -> CommandUsage {
        CommandUsage {
            command: "bulk".to_string(),
            guild_id: Some(guild_id),
            user_id: 1,
            duration_ms: 10,
            success: true,
            used_at: at,
        }
    }

    /// 2024-06-03 is a Monday.
    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn colors_bars_relative_to_peak() {
        assert_eq!(bar_color(80, 100), RED);
        assert_eq!(bar_color(70, 100), YELLOW);
        assert_eq!(bar_color(40, 100), GREEN);
        assert_eq!(bar_length(100, 100), 40);
        assert_eq!(bar_length(50, 100), 20);
        assert_eq!(bar_length(5, 0), 0);
    }

    #[test]
    fn buckets_by_hour_and_weekday() {
        let report = UsageReport::from_usage(&[
            usage(1, at(3, 14)),
            usage(2, at(3, 14)),
            usage(1, at(4, 14)),
            usage(1, at(8, 2)),
        ]);

        assert_eq!(report.total, 4);
        assert_eq!(report.hourly[14].commands, 3);
        assert_eq!(report.hourly[14].servers, 2);
        assert_eq!(report.by_weekday, [2, 1, 0, 0, 0, 1, 0]);
        assert_eq!(report.peak_hours()[0].hour, 14);
        assert_eq!(report.quiet_hours()[0].commands, 0);
        assert_eq!(
            report.weekday_ranking(),
            vec![(Weekday::Mon, 2), (Weekday::Tue, 1), (Weekday::Sat, 1)]
        );
    }

    /// Tests recommendations for weekend-heavy traffic.
    ///
    /// Expected: maintenance at the first empty hour, weekend warning, daily average
    #[test]
    fn recommends_windows_and_weekend_warning() {
        let mut entries = vec![usage(1, at(3, 0))];
        entries.extend((0..10).map(|_| usage(1, at(8, 20))));
        let report = UsageReport::from_usage(&entries);

        let recommendations = report.recommendations();

        assert_eq!(
            recommendations,
            vec![
                Recommendation::MaintenanceWindow { start: 1, end: 3 },
                Recommendation::AvoidWindow { start: 20, end: 22 },
                Recommendation::WeekendsBusiest,
                Recommendation::AveragePerDay {
                    total: 11,
                    per_day: 1
                },
            ]
        );
    }

    #[test]
    fn empty_report_has_no_recommendations() {
        let report = UsageReport::from_usage(&[]);

        assert!(report.recommendations().is_empty());
        assert!(report.render().contains("No commands recorded"));
    }

    #[tokio::test]
    async fn weekly_report_ignores_older_usage() -> Result<(), AppError> {
        let test = TestBuilder::new().with_log_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let now = Utc::now();

        factory::create_command_usage(db, now - Duration::hours(1)).await?;
        factory::create_command_usage(db, now - Duration::days(8)).await?;

        let report = weekly_report(db, now).await?;

        assert_eq!(report.total, 1);

        Ok(())
    }
}
