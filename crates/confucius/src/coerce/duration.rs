//! Duration literal parsing.
//!
//! Literals are handed to `humantime`, so `1h30m`, `300ms` or `2h 5min` all
//! work. On top of that a component may carry a fraction (`1.5h`, `.5s`), a
//! leading `+` is dropped, `µs` is read as `us`, and a bare `0` needs no unit.
//! Negative durations cannot be represented by `std::time::Duration` and are
//! rejected.

use std::sync::LazyLock;
use std::time::Duration;

use regex_lite::Regex;

use super::CoerceError;

/// One `<whole>.<fraction><unit>` component.
static FRACTIONAL_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*([0-9]*)\.([0-9]*)([a-zA-Z]+)|\s*([0-9]+)([a-zA-Z]+)")
        .expect("fractional component pattern is valid")
});

/// Fractional digits beyond this are ignored; they are below nanosecond precision.
const MAX_FRACTION_DIGITS: usize = 18;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a duration literal.
pub fn parse_duration(raw: &str) -> Result<Duration, CoerceError> {
    let fail = |reason: &str| CoerceError::Duration {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let literal = raw.trim();
    let literal = literal.strip_prefix('+').unwrap_or(literal);
    if let Some(unsigned) = literal.strip_prefix('-') {
        if unsigned == "0" {
            return Ok(Duration::ZERO);
        }
        return Err(fail("negative durations are not supported"));
    }
    if literal == "0" {
        return Ok(Duration::ZERO);
    }
    if literal.is_empty() {
        return Err(fail("empty duration"));
    }

    let literal = literal.replace(['µ', 'μ'], "u");
    if !literal.contains('.') {
        return humantime::parse_duration(&literal).map_err(|err| fail(&err.to_string()));
    }
    parse_fractional(&literal).map_err(|reason| fail(&reason))
}

/// Sum the components of a literal where at least one has a fraction.
fn parse_fractional(literal: &str) -> Result<Duration, String> {
    let mut total = Duration::ZERO;
    let mut end = 0;

    for caps in FRACTIONAL_COMPONENT.captures_iter(literal) {
        let Some(component) = caps.get(0) else {
            continue;
        };
        if component.start() != end {
            return Err(format!("unexpected {:?}", &literal[end..component.start()]));
        }
        end = component.end();

        let part = match (caps.get(3), caps.get(5)) {
            (Some(unit), _) => {
                let whole = caps.get(1).map_or("", |m| m.as_str());
                let fraction = caps.get(2).map_or("", |m| m.as_str());
                fractional_part(whole, fraction, unit.as_str())?
            }
            (None, Some(unit)) => {
                let whole = caps.get(4).map_or("", |m| m.as_str());
                unit_multiple(whole, unit.as_str())?
            }
            (None, None) => continue,
        };
        total = total
            .checked_add(part)
            .ok_or_else(|| "quantity overflows".to_string())?;
    }

    if end != literal.len() {
        return Err(format!("unexpected {:?}", &literal[end..]));
    }
    Ok(total)
}

fn unit_multiple(whole: &str, unit: &str) -> Result<Duration, String> {
    humantime::parse_duration(&format!("{whole}{unit}")).map_err(|err| err.to_string())
}

fn fractional_part(whole: &str, fraction: &str, unit: &str) -> Result<Duration, String> {
    if whole.is_empty() && fraction.is_empty() {
        return Err("expected a number".to_string());
    }
    let scale = unit_multiple("1", unit)?.as_nanos();
    let whole = if whole.is_empty() {
        Duration::ZERO
    } else {
        unit_multiple(whole, unit)?
    };

    let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if digits.is_empty() {
        return Ok(whole);
    }
    let numerator: u128 = digits
        .parse()
        .map_err(|_| "invalid fraction".to_string())?;
    let nanos = numerator
        .checked_mul(scale)
        .ok_or_else(|| "quantity overflows".to_string())?
        / 10u128.pow(digits.len() as u32);
    let secs = u64::try_from(nanos / NANOS_PER_SEC).map_err(|_| "quantity overflows".to_string())?;
    whole
        .checked_add(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
        .ok_or_else(|| "quantity overflows".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_single_units() {
        assert_eq!(parse_duration("5h").unwrap(), Duration::from_secs(5 * 3600));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
        assert_eq!(parse_duration("7us").unwrap(), Duration::from_micros(7));
        assert_eq!(parse_duration("7µs").unwrap(), Duration::from_micros(7));
        assert_eq!(parse_duration("9ns").unwrap(), Duration::from_nanos(9));
    }

    #[test]
    fn test_parse_duration_compound_and_fractional() {
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            Duration::from_secs(90 * 60)
        );
        assert_eq!(
            parse_duration("1.5h").unwrap(),
            Duration::from_secs(90 * 60)
        );
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(
            parse_duration("1h0.5m").unwrap(),
            Duration::from_secs(3630)
        );
        assert_eq!(
            parse_duration("+2m3s").unwrap(),
            Duration::from_secs(123)
        );
    }

    #[test]
    fn test_parse_duration_accepts_long_unit_names() {
        assert_eq!(
            parse_duration("2h 5min").unwrap(),
            Duration::from_secs(2 * 3600 + 300)
        );
        assert_eq!(parse_duration("1day").unwrap(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_parse_duration_zero_without_unit() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_rejects_malformed() {
        for raw in ["", "5", "5decades", "h", "-5s", "1.h2", "1..5s", "ms", ".s"] {
            let err = parse_duration(raw).unwrap_err();
            assert!(
                matches!(err, CoerceError::Duration { .. }),
                "{raw:?} should fail, got {err}"
            );
        }
    }

    #[test]
    fn test_parse_duration_overflow_is_an_error() {
        let raw = format!("{}h", u64::MAX);
        assert!(parse_duration(&raw).is_err());
        let raw = format!("{}.5h", u64::MAX);
        assert!(parse_duration(&raw).is_err());
    }
}
