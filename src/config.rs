use anyhow::{Context, Result, anyhow, bail};
use std::net::SocketAddr;

pub const DEFAULT_DB_NAME: &str = "coursesDb";
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";

/// How a lookup that matches no course is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundPolicy {
    /// Retrieve answers `200 null`, delete always reports success.
    #[default]
    Lenient,
    /// Missing courses answer `404` on retrieve, update and delete.
    Strict,
}

impl std::str::FromStr for NotFoundPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(anyhow!(
                "Unknown COURSE_NOT_FOUND policy '{}' (expected 'lenient' or 'strict')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub db_name: String,
    pub server_addr: SocketAddr,
    pub not_found: NotFoundPolicy,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_uri = match lookup("MONGODB_URI") {
            Some(uri) if !uri.trim().is_empty() => uri,
            _ => bail!("MONGODB_URI is not set. Add your MongoDB URI to the environment or .env"),
        };

        let db_name = lookup("MONGODB_DB")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let server_addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("SERVER_ADDR is not a valid socket address")?;

        let not_found = match lookup("COURSE_NOT_FOUND") {
            Some(v) => v.parse()?,
            None => NotFoundPolicy::default(),
        };

        Ok(Self {
            mongodb_uri,
            db_name,
            server_addr,
            not_found,
        })
    }
}
