// Utility helpers shared by the resolvers

use chrono::{DateTime, Utc};
use ethers::types::U256;

use crate::{
    constants::TIMESTAMP_FORMAT,
    error::{AppError, Result},
};

/// Parses a JSON-RPC hex quantity (`0x1a`) into a U256.
pub fn parse_hex_quantity(value: &str) -> Result<U256> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| AppError::Parse(format!("Quantity is not 0x-prefixed: {}", trimmed)))?;
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    if digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::Parse(format!("Invalid hex quantity: {}", trimmed)));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| AppError::Parse(format!("Invalid hex quantity {}: {:?}", trimmed, e)))
}

/// Parses a hex quantity that must fit in a u64 (nonces, counters).
pub fn parse_hex_u64(value: &str) -> Result<u64> {
    let quantity = parse_hex_quantity(value)?;
    if quantity > U256::from(u64::MAX) {
        return Err(AppError::Parse(format!("Quantity overflows u64: {}", value)));
    }
    Ok(quantity.as_u64())
}

/// Renders `value` base units with `decimals` as a decimal string with
/// exactly `precision` fraction digits, rounding half-up.
pub fn format_units_fixed(value: U256, decimals: usize, precision: usize) -> String {
    if precision >= decimals {
        let scale = U256::exp10(decimals);
        let whole = value / scale;
        let frac = value % scale;
        let frac = format!("{:0>width$}", frac.to_string(), width = decimals);
        if precision == 0 {
            return whole.to_string();
        }
        return format!("{}.{:0<width$}", whole, frac, width = precision);
    }

    let drop = U256::exp10(decimals - precision);
    let half = drop / 2;
    let scaled = value.saturating_add(half) / drop;
    if precision == 0 {
        return scaled.to_string();
    }
    let unit = U256::exp10(precision);
    let whole = scaled / unit;
    let frac = scaled % unit;
    format!(
        "{}.{:0>width$}",
        whole,
        frac.to_string(),
        width = precision
    )
}

/// Parses explorer `timeStamp` fields (unix seconds as a decimal string).
pub fn parse_unix_seconds(value: &str) -> Result<DateTime<Utc>> {
    let seconds = value
        .trim()
        .parse::<i64>()
        .map_err(|e| AppError::Parse(format!("Invalid unix timestamp {}: {}", value, e)))?;
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AppError::Parse(format!("Unix timestamp out of range: {}", seconds)))
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Joins a base URL and a path segment without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
