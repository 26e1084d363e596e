//! core::codec::duration
//!
//! Textual duration format shared with the rest of the device software.
//!
//! Durations are stored in the document as strings such as `"5m0s"`,
//! `"1h30m0s"`, `"500ms"` or `"1.5s"`. Parsing accepts any sequence of
//! `<number><unit>` pairs (units `ns`, `us`, `µs`, `μs`, `ms`, `s`, `m`, `h`),
//! optionally with a fractional part, plus the bare string `"0"`.
//!
//! Formatting always produces the canonical form, so
//! `parse(&format(d)) == d` for every duration.
//!
//! # Example
//!
//! ```
//! use cacophony_config::core::codec::duration;
//! use std::time::Duration;
//!
//! let d = duration::parse("10m4s").unwrap();
//! assert_eq!(d, Duration::from_secs(604));
//! assert_eq!(duration::format(d), "10m4s");
//! ```

use std::time::Duration;

use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// Errors from parsing duration text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("negative duration '{0}' is not supported")]
    Negative(String),

    #[error("invalid duration '{0}'")]
    Invalid(String),

    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),

    #[error("unknown unit '{unit}' in duration '{input}'")]
    UnknownUnit { unit: String, input: String },

    #[error("duration '{0}' overflows")]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(NANOS_PER_MIN),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

/// Parse duration text like `"1h15m30.5s"`.
///
/// # Errors
///
/// Returns a [`DurationError`] for empty, negative, malformed or
/// overflowing input.
pub fn parse(input: &str) -> Result<Duration, DurationError> {
    let text = input.trim();
    let text = match text.strip_prefix('+') {
        Some(rest) => rest,
        None => text,
    };
    if text.starts_with('-') {
        return Err(DurationError::Negative(input.to_string()));
    }
    if text.is_empty() {
        return Err(DurationError::Empty);
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = text;
    while !rest.is_empty() {
        let int_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let int_part = &rest[..int_len];
        rest = &rest[int_len..];

        let mut frac_part = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_dot.len());
            frac_part = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DurationError::Invalid(input.to_string()));
        }

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| DurationError::Overflow(input.to_string()))?
        };
        let mut value = whole
            .checked_mul(scale)
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;

        if !frac_part.is_empty() {
            // Digits beyond nanosecond resolution cannot contribute.
            let digits = &frac_part[..frac_part.len().min(18)];
            let numerator: u128 = digits
                .parse()
                .map_err(|_| DurationError::Invalid(input.to_string()))?;
            let denominator = 10u128.pow(digits.len() as u32);
            value = value
                .checked_add(numerator * scale / denominator)
                .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
        }

        total = total
            .checked_add(value)
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC)
        .map_err(|_| DurationError::Overflow(input.to_string()))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Format a duration in canonical text form.
///
/// Sub-second durations use the largest fitting unit (`"1.5ms"`); longer
/// ones are written as hours, minutes and seconds (`"1h0m0s"`).
pub fn format(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{}ns", nanos);
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", with_fraction(nanos, NANOS_PER_MICRO, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", with_fraction(nanos, NANOS_PER_MILLI, 6));
    }

    let hours = nanos / NANOS_PER_HOUR;
    let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MIN;
    let seconds = nanos % NANOS_PER_MIN;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&with_fraction(seconds, NANOS_PER_SEC, 9));
    out.push('s');
    out
}

fn with_fraction(value: u128, unit: u128, width: usize) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", rem, width = width);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compound() {
        assert_eq!(parse("10m4s").unwrap(), Duration::from_secs(604));
        assert_eq!(parse("1h0m0s").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse("2h45m").unwrap(), Duration::from_secs(9900));
    }

    #[test]
    fn parse_small_units() {
        assert_eq!(parse("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse("3us").unwrap(), Duration::from_micros(3));
        assert_eq!(parse("3µs").unwrap(), Duration::from_micros(3));
        assert_eq!(parse("42ns").unwrap(), Duration::from_nanos(42));
    }

    #[test]
    fn parse_fractions() {
        assert_eq!(parse("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse(".5m").unwrap(), Duration::from_secs(30));
        assert_eq!(parse("1.000000001s").unwrap(), Duration::new(1, 1));
    }

    #[test]
    fn fraction_overflow_is_an_error() {
        let input = "340282366920938463463374607431.999999999s";
        assert!(matches!(parse(input), Err(DurationError::Overflow(_))));
        assert!(matches!(
            parse("99999999999999999999h"),
            Err(DurationError::Overflow(_))
        ));
    }

    #[test]
    fn parse_zero_and_sign() {
        assert_eq!(parse("0").unwrap(), Duration::ZERO);
        assert_eq!(parse("0s").unwrap(), Duration::ZERO);
        assert_eq!(parse("+30m").unwrap(), Duration::from_secs(1800));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(parse(""), Err(DurationError::Empty));
        assert!(matches!(parse("-30m"), Err(DurationError::Negative(_))));
        assert!(matches!(parse("12"), Err(DurationError::MissingUnit(_))));
        assert!(matches!(
            parse("3days"),
            Err(DurationError::UnknownUnit { .. })
        ));
        assert!(matches!(parse("m"), Err(DurationError::Invalid(_))));
        assert!(parse("1.s.2").is_err());
    }

    #[test]
    fn format_canonical() {
        assert_eq!(format(Duration::ZERO), "0s");
        assert_eq!(format(Duration::from_nanos(100)), "100ns");
        assert_eq!(format(Duration::from_nanos(1500)), "1.5µs");
        assert_eq!(format(Duration::from_micros(2500)), "2.5ms");
        assert_eq!(format(Duration::from_secs(21)), "21s");
        assert_eq!(format(Duration::from_secs(300)), "5m0s");
        assert_eq!(format(Duration::from_secs(86400)), "24h0m0s");
        assert_eq!(format(Duration::new(61, 500_000_000)), "1m1.5s");
    }

    #[test]
    fn format_then_parse_is_identity() {
        for d in [
            Duration::from_nanos(1),
            Duration::from_nanos(999_999_999),
            Duration::new(3601, 7),
            Duration::from_secs(10 * 60 + 4),
            Duration::from_secs(123_456_789),
        ] {
            assert_eq!(parse(&format(d)).unwrap(), d, "round trip of {:?}", d);
        }
    }
}
