//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                | Default                 |
//! |-------------------------|-------------------------|
//! | `LISTEN_ADDR`           | `0.0.0.0:5000`          |
//! | `FRONTEND_URL`          | `http://localhost:3000` |
//! | `ROOM_MAX_PARTICIPANTS` | `0` (unlimited)         |
//! | `ROOM_REPLAY_CAPACITY`  | `0` (disabled)          |
//! | `OUTBOX_CAPACITY`       | `256`                   |

use std::net::SocketAddr;

use anyhow::Context;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Browser origin allowed by CORS. `*` allows any origin.
    pub frontend_url: String,

    /// Maximum connections per interview room (0 = unlimited).
    pub max_room_participants: usize,

    /// Recent events kept per room for late joiners (0 = no replay).
    pub room_replay_capacity: usize,

    /// Events queued per connection before it counts as lagging (min 1).
    pub outbox_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            frontend_url: "http://localhost:3000".to_string(),
            max_room_participants: 0,
            room_replay_capacity: 0,
            outbox_capacity: 256,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid LISTEN_ADDR {raw:?}"))?,
            Err(_) => defaults.listen_addr,
        };

        let frontend_url = std::env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url);

        Ok(Self {
            listen_addr,
            frontend_url,
            max_room_participants: parse_env("ROOM_MAX_PARTICIPANTS", 0),
            room_replay_capacity: parse_env("ROOM_REPLAY_CAPACITY", 0),
            outbox_capacity: parse_env("OUTBOX_CAPACITY", defaults.outbox_capacity).max(1),
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_behaviour() {
        let config = RelayConfig::default();
        assert_eq!(config.listen_addr.port(), 5000);
        assert_eq!(config.max_room_participants, 0);
        assert_eq!(config.room_replay_capacity, 0);
        assert_eq!(config.outbox_capacity, 256);
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        let value: usize = parse_env("INTERVIEW_RELAY_TEST_UNSET_KEY", 7);
        assert_eq!(value, 7);
    }
}
