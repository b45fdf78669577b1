//! `[serve]` section configuration.
//!
//! Contains WebSocket listener settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # Listener port
//! path = "/ws"                # Upgrade path accepted by the listener
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the stream reachable from LAN.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// WebSocket listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// Listener port. `0` picks an ephemeral port.
    pub port: u16,

    /// Request path accepted for the WebSocket upgrade.
    pub path: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            path: "/ws".to_string(),
        }
    }
}

impl ServeConfig {
    const PATH: FieldPath = FieldPath::new("serve.path");

    /// Socket address the listener binds to.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.interface, self.port)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.path.starts_with('/') {
            diag.error_with_hint(
                Self::PATH,
                format!("`{}` is not an absolute request path", self.path),
                "use a path like \"/ws\"",
            );
        }
    }
}
