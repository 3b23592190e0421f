use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{debug, info, warn};
use trends::WeekStart;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub server_url: String,
    pub week_start: WeekStart,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> Self {
        let port: u16 = try_load("RUST_PORT", "3000");

        Self {
            port,
            data_dir: try_load("DATA_DIR", "data"),
            uploads_dir: try_load("UPLOADS_DIR", "uploads"),
            server_url: try_load("SERVER_URL", &format!("http://localhost:{port}")),
            week_start: try_load("WEEK_START", "sunday"),
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760"),
        }
    }

    pub fn upload_url(&self, filename: &str) -> String {
        format!("{}/uploads/{filename}", self.server_url.trim_end_matches('/'))
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|e| {
        debug!("Environment variable {key}: {e}");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    parse_value(
        key,
        var(key).unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }),
    )
    .expect("Environment misconfigured!")
}

fn parse_value<T: FromStr>(key: &str, raw: String) -> Result<T, ()>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
    })
}
