//! Startup configuration resolution.
//!
//! All environment lookups happen here, once, producing an immutable `Config`
//! that is passed down. `DATABASE_URL` is the single canonical source for the
//! store location; when unset, a SQLite file under the data directory is used.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    /// Connection URL for the relational store.
    pub database_url: String,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => {
                let data_dir = std::env::var("SETUP_ASSISTANT_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| std::env::temp_dir().join("notion-setup-assistant"));
                std::fs::create_dir_all(&data_dir).ok();
                format!("sqlite:{}?mode=rwc", data_dir.join("integrations.db").display())
            }
        };

        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|addr| addr.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 5000)));

        Self {
            database_url,
            bind_addr,
        }
    }
}
