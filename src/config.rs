//! Configuration management for trackport.
//!
//! Values are read from environment variables, which may be provided through
//! a `.env` file in the local data directory. Command line flags override
//! what is read here.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Command line flags (highest priority)
//! 2. Environment variables
//! 3. `.env` file in the local data directory
//! 4. Application defaults

use std::{env, path::PathBuf, time::Duration};

use crate::warning;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8765";
pub const DEFAULT_STRATEGY: &str = "stream-track";

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 2_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 45_000;
pub const MIN_PACING_MS: u64 = 1_500;
pub const DEFAULT_AUTH_POLL_MS: u64 = 2_000;
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 120_000;
pub const PROGRESS_POLL_MS: u64 = 1_000;
/// Floor for timeouts and the poll interval. Zero would spin.
pub const MIN_WAIT_MS: u64 = 1;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives at:
/// - Linux: `~/.local/share/trackport/.env`
/// - macOS: `~/Library/Application Support/trackport/.env`
/// - Windows: `%LOCALAPPDATA%/trackport/.env`
///
/// A missing file is not an error, every setting has a default.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or if an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("trackport/.env");
    path
}

/// Returns the base URL of the resolution service.
///
/// The value is the full origin including any API path segment, e.g.
/// `http://127.0.0.1:8000/api`. Endpoint paths are appended to it as-is.
pub fn service_url() -> String {
    env::var("TRACKPORT_SERVICE_URL").unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string())
}

/// Returns the address the local progress server binds to.
pub fn server_addr() -> String {
    env::var("TRACKPORT_SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Returns the ordered list of acquisition endpoints.
///
/// Read from `TRACKPORT_STRATEGIES` as a comma separated list, the first entry
/// is tried first. Blank entries are ignored.
///
/// ```text
/// TRACKPORT_STRATEGIES=stream-track,stream-track-alt
/// ```
pub fn strategies() -> Vec<String> {
    let raw = env::var("TRACKPORT_STRATEGIES").unwrap_or_default();
    let parsed = parse_list(&raw);
    if parsed.is_empty() {
        vec![DEFAULT_STRATEGY.to_string()]
    } else {
        parsed
    }
}

pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn max_retries() -> u32 {
    let value = env_number("TRACKPORT_MAX_RETRIES", DEFAULT_MAX_RETRIES as u64);
    value.clamp(1, u32::MAX as u64) as u32
}

pub fn base_delay() -> Duration {
    env_millis("TRACKPORT_BASE_DELAY_MS", DEFAULT_BASE_DELAY_MS)
}

pub fn request_timeout() -> Duration {
    env_millis_at_least("TRACKPORT_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS, MIN_WAIT_MS)
}

/// Returns the pause between two tracks. Never shorter than 1500 ms.
pub fn pacing_delay() -> Duration {
    env_millis_at_least("TRACKPORT_PACING_MS", MIN_PACING_MS, MIN_PACING_MS)
}

pub fn auth_poll_interval() -> Duration {
    env_millis_at_least("TRACKPORT_AUTH_POLL_MS", DEFAULT_AUTH_POLL_MS, MIN_WAIT_MS)
}

pub fn auth_timeout() -> Duration {
    env_millis_at_least("TRACKPORT_AUTH_TIMEOUT_MS", DEFAULT_AUTH_TIMEOUT_MS, MIN_WAIT_MS)
}

/// Returns the directory exported tracks are written to.
///
/// Defaults to `~/Downloads/trackport` when `TRACKPORT_DOWNLOAD_DIR` is unset.
pub fn download_dir() -> PathBuf {
    if let Ok(dir) = env::var("TRACKPORT_DOWNLOAD_DIR") {
        return PathBuf::from(dir);
    }

    let mut path = dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push("trackport");
    path
}

fn env_millis(key: &str, default: u64) -> Duration {
    Duration::from_millis(env_number(key, default))
}

fn env_millis_at_least(key: &str, default: u64, min: u64) -> Duration {
    Duration::from_millis(env_number(key, default).max(min))
}

fn env_number(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                warning!("Ignoring invalid value {:?} for {}, using {}", raw, key, default);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_keeps_order_and_skips_blanks() {
        assert_eq!(
            parse_list(" stream-track, ,stream-track-alt,"),
            vec!["stream-track".to_string(), "stream-track-alt".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn zero_waits_are_raised_to_the_floor() {
        // SAFETY: no other test reads these variables.
        unsafe {
            env::set_var("TRACKPORT_AUTH_POLL_MS", "0");
            env::set_var("TRACKPORT_AUTH_TIMEOUT_MS", "0");
            env::set_var("TRACKPORT_REQUEST_TIMEOUT_MS", "0");
            env::set_var("TRACKPORT_PACING_MS", "10");
        }

        assert_eq!(auth_poll_interval(), Duration::from_millis(MIN_WAIT_MS));
        assert_eq!(auth_timeout(), Duration::from_millis(MIN_WAIT_MS));
        assert_eq!(request_timeout(), Duration::from_millis(MIN_WAIT_MS));
        assert_eq!(pacing_delay(), Duration::from_millis(MIN_PACING_MS));
    }
}
