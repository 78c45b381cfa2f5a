// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Server configuration — loaded once at startup from an optional JSON file,
// then patched from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use reportwerk_core::LayoutConfig;
use reportwerk_core::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Path of the JSON configuration file.
pub const CONFIG_ENV: &str = "REPORTWERK_CONFIG";
/// Overrides [`ServerConfig::port`].
pub const PORT_ENV: &str = "REPORTWERK_PORT";
/// Overrides [`ServerConfig::logo_path`].
pub const LOGO_ENV: &str = "REPORTWERK_LOGO";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Requests with a larger body are refused with 413.
    pub max_request_bytes: usize,
    /// Logo drawn in every page header; a placeholder is shown when missing.
    pub logo_path: PathBuf,
    pub company_name: String,
    /// Optional right-aligned footer text.
    pub footer_annotation: Option<String>,
    pub layout: LayoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            max_request_bytes: 50 * 1024 * 1024,
            logo_path: PathBuf::from("assets/logo.png"),
            company_name: "Reportwerk".into(),
            footer_annotation: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from `REPORTWERK_CONFIG` (if set) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        info!(path = %path.display(), "Loaded server configuration");
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port.trim().parse().map_err(|err| {
                ReportError::Server(format!("invalid {PORT_ENV} value {port:?}: {err}"))
            })?;
        }
        if let Some(logo) = lookup(LOGO_ENV) {
            self.logo_path = PathBuf::from(logo);
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}
