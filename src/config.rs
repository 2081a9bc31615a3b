use std::net::SocketAddr;

use anyhow::{Context, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Base for the `url` fields and `Location` headers.
    pub public_url: String,
}

impl Config {
    /// Reads `DATABASE_URL`, `BIND_ADDR` and `PUBLIC_URL`, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind.parse().with_context(|| format!("invalid BIND_ADDR {bind:?}"))?;
        let public_url = lookup("PUBLIC_URL").unwrap_or_else(|| format!("http://{bind_addr}"));
        Ok(Self { database_url, bind_addr, public_url })
    }
}
