use anyhow::{anyhow, Result};
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/games.db";
pub const DEFAULT_HTTP_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let http_port = match env::var("HTTP_PORT") {
            Ok(port) if !port.trim().is_empty() => port
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT '{}'", port.trim()))?,
            _ => DEFAULT_HTTP_PORT,
        };

        Ok(Config {
            telegram_bot_token: token.trim().to_string(),
            database_url: Self::database_url_from_env(),
            http_port,
        })
    }

    /// `DATABASE_URL`, falling back to the bundled SQLite file. Needs no bot token.
    pub fn database_url_from_env() -> String {
        env::var("DATABASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }
}
