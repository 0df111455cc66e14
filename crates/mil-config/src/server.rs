//! Dashboard HTTP service configuration.

use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8123
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind host for the dashboard service.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the dashboard service.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Socket address string for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
