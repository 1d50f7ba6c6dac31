//! Display Number Formatting
//!
//! The display buffer is the single source of truth for the operand being
//! typed, so formatting and parsing must round-trip exactly: whatever
//! [`format_number`] writes, [`parse_display`] reads back as the same `f64`.

/// Default cap on significant digits a user can type into the display
pub const DEFAULT_MAX_DIGITS: usize = 15;

/// Largest digit cap accepted from configuration
///
/// Seventeen significant digits are enough to identify any `f64`.
pub const MAX_DIGITS_LIMIT: usize = 17;

/// Render a value the way the display shows it
///
/// Integral values have no decimal point. Everything else uses the shortest
/// decimal expansion that parses back to the same value, never an exponent.
/// Negative zero renders as "0".
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Parse a display string back into a number
///
/// Accepts in-progress literals such as "12." and "-0.5".
#[must_use]
pub fn parse_display(display: &str) -> Option<f64> {
    display.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Count the digits of a display literal, ignoring sign and decimal point
#[must_use]
pub fn digit_count(display: &str) -> usize {
    display.chars().filter(char::is_ascii_digit).count()
}

/// Render a value for a chat reply, rounded to at most four decimals
#[must_use]
pub fn format_for_reply(value: f64) -> String {
    if value.fract() == 0.0 {
        return format_number(value);
    }
    let fixed = format!("{value:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
