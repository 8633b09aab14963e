use anyhow::{Context, Result};
use dotenvy::dotenv;
use mailgun::MailgunOptions;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub allowed_origins: Vec<String>,
    pub mailgun_api_key: Option<String>,
    pub mailgun_domain: Option<String>,
    pub mailgun_sender: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "lifeline-api".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            mailgun_api_key: env::var("MAILGUN_API_KEY").ok(),
            mailgun_domain: env::var("MAILGUN_DOMAIN").ok(),
            mailgun_sender: env::var("MAILGUN_SENDER").ok(),
        })
    }

    /// Mailgun credentials, when all three settings are present.
    ///
    /// Email delivery is optional: without credentials the notifier still
    /// writes in-app notifications and only skips the outbound email.
    pub fn mailgun_options(&self) -> Option<MailgunOptions> {
        match (
            &self.mailgun_api_key,
            &self.mailgun_domain,
            &self.mailgun_sender,
        ) {
            (Some(api_key), Some(domain), Some(sender)) => Some(MailgunOptions {
                api_key: api_key.clone(),
                domain: domain.clone(),
                sender: sender.clone(),
            }),
            _ => None,
        }
    }
}
