//! Webhook alerts for the bot operator.
//!
//! Alerts go out through Serenity's webhook client first. If that fails, the same embed is
//! posted as raw JSON with reqwest so a broken webhook lookup does not swallow the alert.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serenity::{
    all::{CreateEmbed, CreateEmbedFooter, ExecuteWebhook, Webhook},
    http::Http,
};

use crate::server::{error::AppError, util::format::truncate};

pub const COLOR_CRITICAL: u32 = 0xff0000;
pub const COLOR_WARNING: u32 = 0xffa500;

/// Which configured webhook an alert is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChannel {
    /// Anti-nuke breaches and other guild security events.
    Security,
    /// Phishing detections; falls back to the security webhook.
    Phishing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub channel: AlertChannel,
    pub username: String,
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<AlertField>,
    pub footer: String,
}

impl Alert {
    pub fn new(channel: AlertChannel, title: impl Into<String>) -> Self {
        let (username, footer) = match channel {
            AlertChannel::Security => ("Nexus Security", "Nexus Anti-Nuke Protection"),
            AlertChannel::Phishing => ("Nexus Anti-Phishing", "Nexus Anti-Phishing Protection"),
        };

        Self {
            channel,
            username: username.to_string(),
            title: title.into(),
            description: String::new(),
            color: COLOR_CRITICAL,
            fields: Vec::new(),
            footer: footer.to_string(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Adds a field; embed values are capped at 1024 characters by Discord.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let value: String = value.into();
        self.fields.push(AlertField {
            name: name.into(),
            value: truncate(&value, 1024),
            inline,
        });
        self
    }

    pub fn to_embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .title(&self.title)
            .description(&self.description)
            .color(self.color)
            .footer(CreateEmbedFooter::new(&self.footer))
            .timestamp(serenity::all::Timestamp::now());

        for field in &self.fields {
            embed = embed.field(&field.name, &field.value, field.inline);
        }

        embed
    }

    /// Raw webhook payload used by the reqwest fallback.
    pub fn to_payload(&self) -> WebhookPayload {
        WebhookPayload {
            username: self.username.clone(),
            embeds: vec![EmbedPayload {
                title: self.title.clone(),
                description: self.description.clone(),
                color: self.color,
                fields: self
                    .fields
                    .iter()
                    .map(|f| FieldPayload {
                        name: f.name.clone(),
                        value: f.value.clone(),
                        inline: f.inline,
                    })
                    .collect(),
                footer: FooterPayload {
                    text: self.footer.clone(),
                },
                timestamp: Utc::now().to_rfc3339(),
            }],
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    pub username: String,
    pub embeds: Vec<EmbedPayload>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmbedPayload {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<FieldPayload>,
    pub footer: FooterPayload,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FieldPayload {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FooterPayload {
    pub text: String,
}

#[derive(Clone)]
pub struct AlertService {
    http_client: reqwest::Client,
    /// Token-less client; webhook URLs carry their own token.
    webhook_http: Arc<Http>,
    admin_webhook_url: Option<String>,
    phishing_webhook_url: Option<String>,
}

impl AlertService {
    pub fn new(
        http_client: reqwest::Client,
        admin_webhook_url: Option<String>,
        phishing_webhook_url: Option<String>,
    ) -> Self {
        Self {
            http_client,
            webhook_http: Arc::new(Http::new("")),
            admin_webhook_url,
            phishing_webhook_url,
        }
    }

    pub fn webhook_url(&self, channel: AlertChannel) -> Option<&str> {
        match channel {
            AlertChannel::Security => self.admin_webhook_url.as_deref(),
            AlertChannel::Phishing => self
                .phishing_webhook_url
                .as_deref()
                .or(self.admin_webhook_url.as_deref()),
        }
    }

    /// Sends an alert, returning whether any delivery path succeeded.
    ///
    /// Never fails: delivery errors are logged.
    pub async fn send(&self, alert: &Alert) -> bool {
        let Some(url) = self.webhook_url(alert.channel) else {
            tracing::info!(
                "Alert (no webhook configured): {} - {}",
                alert.title,
                alert.description
            );
            return false;
        };

        match self.send_with_serenity(url, alert).await {
            Ok(()) => return true,
            Err(e) => tracing::debug!("Webhook client failed, falling back to HTTP: {}", e),
        }

        match self.send_with_reqwest(url, alert).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to deliver alert '{}': {}", alert.title, e);
                false
            }
        }
    }

    async fn send_with_serenity(&self, url: &str, alert: &Alert) -> Result<(), AppError> {
        let webhook = Webhook::from_url(&self.webhook_http, url).await?;
        webhook
            .execute(
                &self.webhook_http,
                false,
                ExecuteWebhook::new()
                    .username(&alert.username)
                    .embed(alert.to_embed()),
            )
            .await?;

        Ok(())
    }

    async fn send_with_reqwest(&self, url: &str, alert: &Alert) -> Result<(), AppError> {
        self.http_client
            .post(url)
            .json(&alert.to_payload())
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
