use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, ensure};
use chrono::FixedOffset;

use crate::engine::AttendancePolicy;
use crate::utils::timestamp::parse_utc_offset;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Attendance tolerances
    pub outer_grace_minutes: i64,
    pub early_departure_minutes: i64,

    /// Company clock that zoned timestamps are read on
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", 1000)?,

            outer_grace_minutes: minutes_or(
                "ATTENDANCE_OUTER_GRACE_MINUTES",
                AttendancePolicy::DEFAULT_OUTER_GRACE_MINUTES,
            )?,
            early_departure_minutes: minutes_or(
                "ATTENDANCE_EARLY_LEAVE_MINUTES",
                AttendancePolicy::DEFAULT_EARLY_DEPARTURE_MINUTES,
            )?,

            utc_offset: utc_offset_or_utc("ATTENDANCE_TZ_OFFSET")?,
        })
    }

    pub fn attendance_policy(&self) -> AttendancePolicy {
        AttendancePolicy {
            outer_grace_minutes: self.outer_grace_minutes,
            early_departure_minutes: self.early_departure_minutes,
        }
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn utc_offset_or_utc(key: &str) -> Result<FixedOffset> {
    let raw = env::var(key).unwrap_or_else(|_| "+00:00".to_string());
    parse_utc_offset(&raw).with_context(|| format!("{key} must look like +06:00, got {raw:?}"))
}

fn minutes_or(key: &str, default: i64) -> Result<i64> {
    non_negative(key, parse_or(key, default)?)
}

fn non_negative(key: &str, minutes: i64) -> Result<i64> {
    ensure!(minutes >= 0, "{key} must not be negative, got {minutes}");
    Ok(minutes)
}
