use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

use crate::database::models::{RosterLimits, SessionDefaults};
use crate::utils::validation::{validate_session_place, validate_session_time};

pub const DEFAULT_DATA_PATH: &str = "./data/training_data.json";
pub const DEFAULT_SCHEDULE_INFO: &str = "Tuesday: 20:45\nSaturday: 09:00";

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub admin_id: i64,
    pub data_path: PathBuf,
    pub http_port: u16,
    pub limits: RosterLimits,
    pub defaults: SessionDefaults,
    pub bot: BotSettings,
}

/// Static texts the handlers need besides the roster itself.
#[derive(Debug, Clone, Default)]
pub struct BotSettings {
    /// Regular weekly schedule shown by /schedule.
    pub schedule_info: String,
    /// Where users can reach the administrator, e.g. a t.me link.
    pub admin_contact: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let admin_id = env::var("ADMIN_ID")
            .map_err(|_| anyhow!("ADMIN_ID must be set"))?
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid ADMIN_ID"))?;

        let data_path = non_blank_var("ROSTER_DATA_PATH")
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string())
            .into();

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let test_mode = non_blank_var("ROSTER_TEST_MODE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let base = if test_mode { RosterLimits::TEST } else { RosterLimits::STANDARD };
        let limits = RosterLimits {
            max_main: limit_var("MAX_MAIN", base.max_main)?,
            max_reserve: limit_var("MAX_RESERVE", base.max_reserve)?,
        };

        let mut defaults = SessionDefaults::default();
        if let Some(time) = non_blank_var("DEFAULT_TIME") {
            let parsed = validate_session_time(&time).map_err(|_| anyhow!("Invalid DEFAULT_TIME"))?;
            defaults.time = parsed.format("%H:%M").to_string();
        }
        if let Some(place) = non_blank_var("DEFAULT_PLACE") {
            defaults.place = validate_session_place(&place)
                .map_err(|_| anyhow!("Invalid DEFAULT_PLACE"))?
                .to_string();
        }

        let bot = BotSettings {
            schedule_info: non_blank_var("SCHEDULE_INFO")
                .map(|s| s.replace("\\n", "\n"))
                .unwrap_or_else(|| DEFAULT_SCHEDULE_INFO.to_string()),
            admin_contact: non_blank_var("ADMIN_CONTACT"),
        };

        Ok(Config {
            telegram_bot_token: token,
            admin_id,
            data_path,
            http_port,
            limits,
            defaults,
            bot,
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn limit_var(key: &str, default: usize) -> Result<usize> {
    match non_blank_var(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(anyhow!("Invalid {key}: must be a positive number")),
        },
    }
}
