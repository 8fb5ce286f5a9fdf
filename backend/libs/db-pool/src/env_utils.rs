//! Environment variable parsing helpers shared by service configuration

use std::str::FromStr;

/// Parse an environment variable strictly
///
/// Missing variables yield `default`; present but unparseable values are an
/// error naming the variable.
pub fn parse_env_strict<T: FromStr>(key: &str, default: T) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}
