use std::net::SocketAddr;
use tracing::warn;

/// Environment variable holding the listen address.
pub const ADDR_ENV: &str = "MEASURE_BACKEND_ADDR";

pub const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(DEFAULT_ADDR),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ADDR_ENV).ok().as_deref())
    }

    /// Invalid addresses are logged and replaced by the default.
    fn from_value(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };
        match raw.parse::<SocketAddr>() {
            Ok(addr) => Self { addr },
            Err(e) => {
                warn!("Ignoring {}={:?}: {}", ADDR_ENV, raw, e);
                Self::default()
            }
        }
    }
}
