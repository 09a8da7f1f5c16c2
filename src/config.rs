//! Server configuration from environment variables.

use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 7377;
const DEFAULT_COMMIT_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// How many times a room operation reloads and retries after losing a
    /// commit race before giving up.
    pub commit_retries: u32,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let addr = std::env::var("SPYROOM_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));
        let commit_retries = std::env::var("SPYROOM_COMMIT_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COMMIT_RETRIES);
        Self {
            addr,
            commit_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_unset() {
        let config = ServerConfig::from_env();
        assert_eq!(config.addr.port(), DEFAULT_PORT);
        assert_eq!(config.commit_retries, DEFAULT_COMMIT_RETRIES);
    }
}
