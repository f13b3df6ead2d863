//! Environment variable helpers shared by the binaries.

use std::str::FromStr;

use anyhow::{Context as _, anyhow};

/// Read a required env var.
pub fn required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing required env var {key}"))
}

/// Read an optional env var and parse it, falling back to `default` when unset.
///
/// A value that is present but unparsable is an error rather than a silent default.
pub fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Read an optional string env var, falling back to `default` when unset or blank.
pub fn string_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}
