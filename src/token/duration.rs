//! Duration strings as stored in stream records
//!
//! The accepted syntax is a signed sequence of decimal numbers, each with an
//! optional fraction and a mandatory unit: `"300ms"`, `"-1.5h"`, `"2h45m"`.
//! Valid units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m`, `h`. The bare
//! string `"0"` is also accepted.

use crate::{Error, Result};
use chrono::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

// Fraction digits beyond this cannot change a nanosecond result.
const MAX_FRACTION_DIGITS: usize = 18;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(3_600 * NANOS_PER_SECOND),
        _ => None,
    }
}

/// Parse a duration string such as `"1h"` or `"1h30m"`
pub fn parse_duration(value: &str) -> Result<Duration> {
    let invalid = |reason: &str| Error::invalid_duration(value, reason);

    let (negative, mut rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after_int) = rest.split_at(int_len);
        rest = after_int;

        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_digits = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid("expected a number"));
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(invalid("missing unit"));
        }
        let (unit, after_unit) = rest.split_at(unit_len);
        rest = after_unit;

        let scale =
            unit_nanos(unit).ok_or_else(|| invalid(&format!("unknown unit \"{}\"", unit)))?;

        let whole: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| invalid("value out of range"))?
        };

        let mut component = whole
            .checked_mul(scale)
            .ok_or_else(|| invalid("value out of range"))?;

        if !frac_digits.is_empty() {
            let mut fraction: u128 = 0;
            let mut denominator: u128 = 1;
            for digit in frac_digits.bytes().take(MAX_FRACTION_DIGITS) {
                fraction = fraction * 10 + u128::from(digit - b'0');
                denominator *= 10;
            }
            component = component
                .checked_add(fraction * scale / denominator)
                .ok_or_else(|| invalid("value out of range"))?;
        }

        total = total
            .checked_add(component)
            .filter(|t| *t <= i64::MAX as u128)
            .ok_or_else(|| invalid("value out of range"))?;
    }

    let nanos = total as i64;
    Ok(Duration::nanoseconds(if negative { -nanos } else { nanos }))
}
