//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::util::time::DEFAULT_FRAME_RATE;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// WebSocket endpoint of the game server
    pub game_server_url: String,
    /// Base URL of the REST api (`/api/user`, `/api/rooms`)
    pub api_base_url: String,
    /// Bearer token issued at login
    pub auth_token: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Local diagnostics endpoint binding address
    pub diagnostics_addr: SocketAddr,

    /// Frames scheduled per second
    pub frame_rate: u32,
    /// Distance moved per tick at full intent
    pub move_speed: f32,
    /// Virtual joystick travel in pixels
    pub joystick_max_radius: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let diagnostics_addr =
            env::var("DIAGNOSTICS_ADDR").unwrap_or_else(|_| "127.0.0.1:7070".to_string());

        Ok(Self {
            game_server_url: env::var("GAME_SERVER_URL")
                .map_err(|_| ConfigError::Missing("GAME_SERVER_URL"))?,
            api_base_url: env::var("API_BASE_URL")
                .map_err(|_| ConfigError::Missing("API_BASE_URL"))?,
            auth_token: env::var("AUTH_TOKEN").map_err(|_| ConfigError::Missing("AUTH_TOKEN"))?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            diagnostics_addr: diagnostics_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            frame_rate: parse_or("FRAME_RATE", DEFAULT_FRAME_RATE)?,
            move_speed: parse_or("MOVE_SPEED", 0.5)?,
            joystick_max_radius: parse_or("JOYSTICK_MAX_RADIUS", 40.0)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid diagnostics address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_overrides_are_parsed() {
        env::set_var("TAG_TEST_FRAME_RATE", " 30 ");
        assert_eq!(parse_or("TAG_TEST_FRAME_RATE", 60u32).unwrap(), 30);

        env::set_var("TAG_TEST_BAD_SPEED", "fast");
        assert!(matches!(
            parse_or("TAG_TEST_BAD_SPEED", 0.5f32),
            Err(ConfigError::Invalid("TAG_TEST_BAD_SPEED"))
        ));

        assert_eq!(parse_or("TAG_TEST_UNSET_KEY", 40.0f32).unwrap(), 40.0);
    }
}
