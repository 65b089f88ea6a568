use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use tracing::info;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Config {
    /// Reads `DIET_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: load("DIET_HOST", "0.0.0.0")?,
            port: load("DIET_PORT", "3333")?,
            db_path: load("DIET_DB_PATH", "daily-diet.db")?,
        })
    }
}

fn load<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value '{raw}': {e}"))
}
