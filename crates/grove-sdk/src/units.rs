//! Conversions between ETH amounts typed by users and on-chain wei, plus the
//! small formatting helpers the views share.

use ethers::types::U256;

use crate::error::{Error, FormError, Result};

const WEI_DECIMALS: usize = 18;
/// Display precision for ETH amounts.
pub const DISPLAY_DECIMALS: usize = 5;

/// Parse a positive ETH amount into wei, flooring anything past 18 decimals.
pub fn eth_to_wei(amount: &str) -> Result<U256> {
    let trimmed = amount.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| Error::Validation(vec![FormError::InvalidPrize]))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(vec![FormError::InvalidPrize]));
    }

    // Exponent notation goes through the float once; plain decimals stay exact.
    let decimal = if trimmed.contains(|c: char| c == 'e' || c == 'E') {
        format!("{value:.18}")
    } else {
        trimmed.trim_start_matches('+').to_string()
    };

    let (whole, fraction) = decimal.split_once('.').unwrap_or((decimal.as_str(), ""));
    let whole = if whole.is_empty() { "0" } else { whole };
    let mut fraction: String = fraction.chars().take(WEI_DECIMALS).collect();
    while fraction.len() < WEI_DECIMALS {
        fraction.push('0');
    }

    let wei = U256::from_dec_str(&format!("{whole}{fraction}"))
        .map_err(|_| Error::Validation(vec![FormError::InvalidPrize]))?;
    if wei.is_zero() {
        return Err(Error::Validation(vec![FormError::InvalidPrize]));
    }
    Ok(wei)
}

/// Wei as ETH rounded to [`DISPLAY_DECIMALS`] places.
pub fn format_eth(wei: U256) -> String {
    let step = U256::exp10(WEI_DECIMALS - DISPLAY_DECIMALS);
    let scale = U256::exp10(DISPLAY_DECIMALS);
    let scaled = wei.saturating_add(step / 2) / step;
    let whole = scaled / scale;
    let fraction = (scaled % scale).as_u64();
    format!("{whole}.{fraction:0width$}", width = DISPLAY_DECIMALS)
}

/// Human readable time remaining until `deadline`.
pub fn time_left(deadline: u64, now: u64) -> String {
    if now > deadline {
        return "ended".to_string();
    }
    let secs = deadline - now;
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h left")
    } else if hours > 0 {
        format!("{hours}h {minutes}m left")
    } else if minutes > 0 {
        format!("{minutes}m left")
    } else {
        "less than a minute left".to_string()
    }
}

/// `0x1234…abcd` form for display.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
