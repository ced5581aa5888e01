//! Phishing detection for guild messages.

use std::sync::Arc;

use dashmap::DashMap;
use regex::{Regex, RegexBuilder};
use url::Url;

/// Above this many detections in one guild a critical alert is raised.
pub const CRITICAL_VIOLATIONS: u64 = 50;

const PHISHING_PATTERNS: &[&str] = &[
    // Fake verification and login flows
    r"discord[-\s]*verify",
    r"discord[-\s]*login",
    r"discord[-\s]*auth",
    r"discord[-\s]*security",
    r"verify[-\s]*discord",
    // Lookalike domains
    r"discord[^.\s/]+\.(tk|ml|ga|cf|gq|xyz|click|top|online|site|website)\b",
    r"\bdiscord-?(nitro|gifts?|airdrop|promo)\.[a-z]{2,}",
    r"\b(dlscord|disc0rd|discorcl|dicsord|discrod|d1scord|discordd)\.[a-z]{2,}",
    r"\b(steamcommunlty|steamcommnuity|stearncommunity|steamcomminuty|steamcommunity-[a-z0-9]+)\.[a-z]{2,}",
    // Nitro bait
    r"free\s+(discord\s+)?nitro",
    r"nitro\s+for\s+free",
    r"claim\s+your\s+(free\s+)?nitro",
    // Token grabbing
    r"bearer\s+[\w\-.]{20,}",
    r"mfa\.[\w-]{84}",
    r"[\w-]{24}\.[\w-]{6}\.[\w-]{27}",
    // Pressure phrasing
    r"verify\s+your\s+account",
    r"suspended\s+account",
    r"account\s+disabled",
    r"click\s+to\s+verify",
    r"verify\s+now",
    r"urgent.*verification",
    // Shortened Discord bait
    r"bit\.ly\S*discord",
    r"tinyurl\S*discord",
    r"short\.link\S*discord",
];

/// Links naming Discord alongside login wording. Official Discord hosts are left to
/// [`analyze_url`], which knows their standard paths.
const SUSPICIOUS_LINK: &str = r"discord\S*(verify|login|auth|security|suspended|disabled)";

const URL_SHORTENERS: [&str; 6] = [
    "bit.ly",
    "tinyurl.com",
    "t.co",
    "goo.gl",
    "short.link",
    "is.gd",
];

const DISCORD_DOMAINS: [&str; 3] = ["discord.com", "discordapp.com", "discord.gg"];

const STANDARD_DISCORD_PATHS: [&str; 6] =
    ["/api", "/oauth2", "/invite", "/channels", "/users", "/guilds"];

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub is_phishing: bool,
    pub confidence: f64,
    pub indicators: Vec<String>,
}

impl ScanResult {
    fn from_indicators(indicators: Vec<String>) -> Self {
        let confidence = if indicators.is_empty() {
            0.0
        } else {
            (0.5 + 0.1 * indicators.len() as f64).min(0.9)
        };

        Self {
            is_phishing: !indicators.is_empty(),
            confidence,
            indicators,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlVerdict {
    pub safe: bool,
    pub reason: Option<&'static str>,
}

impl UrlVerdict {
    fn safe() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }

    fn unsafe_because(reason: &'static str) -> Self {
        Self {
            safe: false,
            reason: Some(reason),
        }
    }
}

/// Result of recording a detection against a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub count: u64,
    /// True only for the detection that moves the guild past [`CRITICAL_VIOLATIONS`].
    pub crossed_critical: bool,
}

#[derive(Clone)]
pub struct IntegrityGuard {
    patterns: Arc<Vec<Regex>>,
    url_pattern: Arc<Regex>,
    link_pattern: Arc<Regex>,
    violations: Arc<DashMap<u64, u64>>,
}

impl IntegrityGuard {
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = PHISHING_PATTERNS
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns: Arc::new(patterns),
            url_pattern: Arc::new(Regex::new(r"https?://[^\s<>()]+")?),
            link_pattern: Arc::new(
                RegexBuilder::new(SUSPICIOUS_LINK)
                    .case_insensitive(true)
                    .build()?,
            ),
            violations: Arc::new(DashMap::new()),
        })
    }

    /// Scans message text (content plus any embed text) for phishing indicators.
    ///
    /// Each matching pattern and each unsafe link counts as one indicator.
    pub fn scan(&self, text: &str) -> ScanResult {
        if text.trim().is_empty() {
            return ScanResult::from_indicators(Vec::new());
        }

        let lowered = text.to_lowercase();
        let mut indicators: Vec<String> = self
            .patterns
            .iter()
            .filter(|p| p.is_match(&lowered))
            .map(|p| p.as_str().to_string())
            .collect();

        let mentions_discord = lowered.contains("discord");
        for link in self.url_pattern.find_iter(text) {
            let verdict = analyze_url(link.as_str());
            let shortened_discord_bait = mentions_discord && is_shortener(link.as_str());

            if let Some(reason) = verdict.reason.filter(|_| !verdict.safe) {
                indicators.push(format!("{}: {}", reason, link.as_str()));
            } else if !is_official_discord(link.as_str())
                && self.link_pattern.is_match(link.as_str())
            {
                indicators.push(format!("Discord login wording in link: {}", link.as_str()));
            } else if shortened_discord_bait {
                indicators.push(format!(
                    "URL shortener in a message mentioning Discord: {}",
                    link.as_str()
                ));
            }
        }

        ScanResult::from_indicators(indicators)
    }

    /// Counts a detection for `guild_id`.
    pub fn record_violation(&self, guild_id: u64) -> Violation {
        let mut count = self.violations.entry(guild_id).or_insert(0);
        *count += 1;

        Violation {
            count: *count,
            crossed_critical: *count == CRITICAL_VIOLATIONS + 1,
        }
    }

    pub fn violations(&self, guild_id: u64) -> u64 {
        self.violations.get(&guild_id).map(|c| *c).unwrap_or(0)
    }
}

fn is_shortener(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .is_some_and(|host| {
            URL_SHORTENERS
                .iter()
                .any(|s| host == *s || host.ends_with(&format!(".{}", s)))
        })
}

/// Classifies a single URL.
///
/// - unparsable URLs are unsafe
/// - Discord domains are safe unless a non-standard path mentions verify/login/auth/security
/// - other hosts containing "discord" are lookalikes
/// - shorteners whose URL mentions Discord are unsafe
fn is_discord_host(host: &str) -> bool {
    DISCORD_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
}

fn is_official_discord(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .is_some_and(|host| is_discord_host(&host))
}

pub fn analyze_url(url: &str) -> UrlVerdict {
    let Ok(parsed) = Url::parse(url) else {
        return UrlVerdict::unsafe_because("Invalid URL format");
    };
    let Some(host) = parsed.host_str().map(str::to_lowercase) else {
        return UrlVerdict::unsafe_because("Invalid URL format");
    };

    if is_discord_host(&host) {
        let path = parsed.path().to_lowercase();
        let standard = STANDARD_DISCORD_PATHS.iter().any(|p| path.starts_with(p));
        let suspicious = ["verify", "login", "auth", "security"]
            .iter()
            .any(|word| path.contains(word));

        if !standard && suspicious {
            return UrlVerdict::unsafe_because("Suspicious Discord URL path");
        }
        return UrlVerdict::safe();
    }

    if host.contains("discord") {
        return UrlVerdict::unsafe_because("Suspicious domain mimicking Discord");
    }

    if is_shortener(url) && url.to_lowercase().contains("discord") {
        return UrlVerdict::unsafe_because("URL shortener used with Discord-related content");
    }

    UrlVerdict::safe()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> IntegrityGuard {
        IntegrityGuard::new().unwrap()
    }

    #[test]
    fn clean_text_is_not_phishing() {
        let result =
            guard().scan("anyone up for raids tonight? https://discord.com/channels/1/2");

        assert!(!result.is_phishing);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn detects_nitro_bait() {
        let result = guard().scan("FREE NITRO for everyone: https://discord-nitro.gift/claim");

        assert!(result.is_phishing);
        assert!(result.confidence >= 0.6);
    }

    #[test]
    fn confidence_is_capped() {
        let result = guard().scan(
            "URGENT verification: verify your account now, click to verify at \
             https://dlscord.com/login or your account disabled. free nitro!",
        );

        assert!(result.indicators.len() > 4);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn plain_mention_of_token_is_not_phishing() {
        assert!(!guard().scan("the bot token goes in your .env file").is_phishing);
    }

    #[test]
    fn flags_lookalike_hosts() {
        let verdict = analyze_url("https://discordgift.site/xyz");
        assert!(!verdict.safe);
        assert_eq!(verdict.reason, Some("Suspicious domain mimicking Discord"));
    }

    #[test]
    fn discord_standard_paths_are_safe() {
        assert!(analyze_url("https://discord.com/oauth2/authorize?client_id=1").safe);
        assert!(analyze_url("https://discord.gg/abc").safe);
    }

    /// Tests that a bot invite link passes the message scan.
    ///
    /// Expected: the `/oauth2/authorize` path is not read as login bait
    #[test]
    fn bot_invite_link_is_not_phishing() {
        let result = guard().scan(
            "invite me: https://discord.com/oauth2/authorize?client_id=1&scope=bot",
        );

        assert!(!result.is_phishing, "{:?}", result.indicators);
    }

    #[test]
    fn login_wording_on_foreign_host_is_flagged() {
        let result = guard().scan("https://example.com/discord-login-reward");

        assert!(result.is_phishing);
        assert!(result
            .indicators
            .iter()
            .any(|i| i.starts_with("Discord login wording in link")));
    }

    #[test]
    fn discord_nonstandard_verify_path_is_unsafe() {
        let verdict = analyze_url("https://discord.com/verify-account");
        assert_eq!(verdict.reason, Some("Suspicious Discord URL path"));
    }

    #[test]
    fn invalid_url_is_unsafe() {
        assert!(!analyze_url("not a url").safe);
    }

    #[test]
    fn shortener_in_discord_message_is_flagged() {
        let result = guard().scan("new discord event, sign up here https://bit.ly/3abc");

        assert!(result.is_phishing);
        assert!(result.indicators.iter().any(|i| i.contains("shortener")));
    }

    #[test]
    fn critical_threshold_is_crossed_once() {
        let guard = guard();

        let crossings = (0..60)
            .map(|_| guard.record_violation(7))
            .filter(|v| v.crossed_critical)
            .count();

        assert_eq!(crossings, 1);
        assert_eq!(guard.violations(7), 60);
        assert_eq!(guard.violations(8), 0);
    }
}
