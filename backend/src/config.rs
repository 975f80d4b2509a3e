use std::path::PathBuf;

use anyhow::Context;

/// Which persistence adapter backs the `Store`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; everything is lost on restart.
    Memory,
    /// Process memory mirrored to a JSON snapshot after every write.
    File(PathBuf),
    Postgres { database_url: String },
}

impl StorageBackend {
    fn from_env() -> anyhow::Result<Self> {
        let kind = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "memory".into());
        match kind.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => {
                let path = std::env::var("DATA_FILE")
                    .context("DATA_FILE must be set when STORAGE_BACKEND=file")?;
                Ok(Self::File(PathBuf::from(path)))
            }
            "postgres" => Ok(Self::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL must be set when STORAGE_BACKEND=postgres")?,
            }),
            other => anyhow::bail!(
                "Unknown STORAGE_BACKEND '{}' (expected memory, file or postgres)",
                other
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub listen_addr: String,
    pub cors_origins: Vec<String>,
    pub enable_debug_routes: bool,
    pub json_logs: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters for security");
        }
        if jwt_secret.contains("change_me") {
            anyhow::bail!("JWT_SECRET contains placeholder value; set a real secret before running");
        }

        Ok(Self {
            storage: StorageBackend::from_env()?,
            jwt_secret,
            jwt_expiry_hours: parse_expiry_hours(std::env::var("JWT_EXPIRY_HOURS").ok())?,
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            enable_debug_routes: env_flag("ENABLE_DEBUG_ROUTES"),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }
}

/// Session lifetime is capped at one year.
const MAX_EXPIRY_HOURS: u64 = 24 * 366;

fn parse_expiry_hours(raw: Option<String>) -> anyhow::Result<u64> {
    let Some(raw) = raw else {
        return Ok(24);
    };
    let hours: u64 = raw
        .trim()
        .parse()
        .context("JWT_EXPIRY_HOURS must be a number")?;
    if !(1..=MAX_EXPIRY_HOURS).contains(&hours) {
        anyhow::bail!("JWT_EXPIRY_HOURS must be between 1 and {}", MAX_EXPIRY_HOURS);
    }
    Ok(hours)
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
