//! Service settings loaded from the environment

use std::env;
use std::net::SocketAddr;

use model_sdk::config::{EnvConfigProvider, GeminiConfig};
use model_sdk::Result;
use tracing::warn;

/// Prefix of the bind address variables
const SERVICE_NAME: &str = "CONTRACT_AUDIT";

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 3000;

/// Everything the binary needs to start
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub bind_addr: SocketAddr,
    pub gemini: GeminiConfig,
}

impl ServiceSettings {
    /// Read `CONTRACT_AUDIT_SERVICE_ADDR` / `CONTRACT_AUDIT_SERVICE_PORT` and
    /// the `GEMINI_*` model settings
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: bind_address(SERVICE_NAME, DEFAULT_PORT),
            gemini: GeminiConfig::from_provider(&EnvConfigProvider::new())?,
        })
    }
}

/// Port from `{SERVICE}_SERVICE_PORT`, or `default_port`
pub fn service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    match env::var(&var_name) {
        Ok(value) => value.trim().parse::<u16>().unwrap_or_else(|_| {
            warn!("Invalid port in {}, using default {}", var_name, default_port);
            default_port
        }),
        Err(_) => default_port,
    }
}

/// Bind address from `{SERVICE}_SERVICE_ADDR` (`host:port`, optionally with an
/// `http://` scheme), else all interfaces on the configured port
pub fn bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        let trimmed = addr_str
            .trim()
            .trim_start_matches("http://")
            .trim_start_matches("https://");
        match trimmed.parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => warn!("Invalid address format in {}, using default", var_name),
        }
    }

    SocketAddr::from(([0, 0, 0, 0], service_port(service_name, default_port)))
}
