//! Environment lookup helpers shared by the config sections.

use std::str::FromStr;
use std::time::Duration;

/// Source of configuration values. `from_env()` constructors use the process
/// environment; tests pass a map.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub(crate) fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Non-empty value for `key`.
pub(crate) fn string(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn string_or(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    string(lookup, key).unwrap_or_else(|| default.to_string())
}

pub(crate) fn parse_or<T: FromStr>(lookup: Lookup<'_>, key: &str, default: T) -> T {
    string(lookup, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub(crate) fn duration_or(lookup: Lookup<'_>, key: &str, default: Duration) -> Duration {
    string(lookup, key)
        .and_then(|v| parse_duration(&v))
        .unwrap_or(default)
}

pub(crate) fn bool_or(lookup: Lookup<'_>, key: &str, default: bool) -> bool {
    match string(lookup, key).map(|v| v.to_ascii_lowercase()) {
        Some(v) if v == "false" || v == "0" || v == "no" => false,
        Some(v) if v == "true" || v == "1" || v == "yes" => true,
        _ => default,
    }
}

/// Parses `15s`, `2m`, `1h`, `500ms`, compound values such as `1m30s`, or a bare
/// number of seconds.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits == 0 {
            return None;
        }
        let amount: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let step = match unit {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount.checked_mul(60)?),
            "h" => Duration::from_secs(amount.checked_mul(3600)?),
            _ => return None,
        };
        total = total.checked_add(step)?;
    }
    Some(total)
}
