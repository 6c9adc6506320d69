//! Duration strings (`H:M:S`, `M:S`, `S`) to whole seconds.

use tracing::{debug, warn};

/// Duration assumed when the episode duration is missing or unusable.
pub const DEFAULT_DURATION_SECS: u32 = 3600;

/// Parses `text` into a positive number of seconds.
///
/// Each `:`-separated part is read like a leading integer (`"07"` is 7,
/// `"5s"` is 5, `"x"` is 0). One part is seconds, two are minutes and
/// seconds, three are hours, minutes and seconds. Any other shape, or a
/// total that is not positive, yields `fallback`.
pub fn parse_duration(text: &str, fallback: u32) -> u32 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        debug!("empty duration; using fallback");
        return fallback;
    }

    let parts: Vec<i64> = trimmed.split(':').map(leading_integer).collect();
    let seconds = match parts.as_slice() {
        [secs] => *secs,
        [minutes, secs] => minutes.saturating_mul(60).saturating_add(*secs),
        [hours, minutes, secs] => hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(*secs),
        _ => {
            warn!(duration = %trimmed, parts = parts.len(), "unexpected duration format");
            return fallback;
        }
    };

    if seconds > 0 {
        u32::try_from(seconds).unwrap_or(u32::MAX)
    } else {
        debug!(duration = %trimmed, "non-positive duration; using fallback");
        fallback
    }
}

/// Reads an optional sign followed by decimal digits; anything else is 0.
fn leading_integer(part: &str) -> i64 {
    let part = part.trim_start();
    let (negative, digits) = match part.as_bytes().first() {
        Some(b'-') => (true, &part[1..]),
        Some(b'+') => (false, &part[1..]),
        _ => (false, part),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });
    if negative {
        -value
    } else {
        value
    }
}

/// Formats whole seconds as `H:MM:SS` (or `M:SS` under an hour).
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let (hours, minutes, secs) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_duration("1:23:45", DEFAULT_DURATION_SECS), 5025);
        assert_eq!(parse_duration("12:45", DEFAULT_DURATION_SECS), 765);
        assert_eq!(parse_duration("45", DEFAULT_DURATION_SECS), 45);
    }

    #[test]
    fn zero_and_empty_fall_back() {
        assert_eq!(parse_duration("", DEFAULT_DURATION_SECS), 3600);
        assert_eq!(parse_duration("0:00", DEFAULT_DURATION_SECS), 3600);
        assert_eq!(parse_duration("   ", DEFAULT_DURATION_SECS), 3600);
    }

    #[test]
    fn malformed_parts_read_as_zero() {
        assert_eq!(parse_duration("abc:30", DEFAULT_DURATION_SECS), 30);
        assert_eq!(parse_duration("2:xx", DEFAULT_DURATION_SECS), 120);
        assert_eq!(parse_duration("5s", DEFAULT_DURATION_SECS), 5);
        assert_eq!(parse_duration("nonsense", DEFAULT_DURATION_SECS), 3600);
    }

    #[test]
    fn unexpected_part_counts_fall_back() {
        assert_eq!(parse_duration("1:2:3:4", DEFAULT_DURATION_SECS), 3600);
        assert_eq!(parse_duration("1:2:3:4", 90), 90);
    }

    #[test]
    fn negative_totals_fall_back() {
        assert_eq!(parse_duration("-5", DEFAULT_DURATION_SECS), 3600);
        assert_eq!(parse_duration("1:-90", DEFAULT_DURATION_SECS), 3600);
    }

    #[test]
    fn always_positive() {
        for raw in ["", ":", "::", ":::", "0", "-0:0", "99999999999999:0:0", "1:2"] {
            assert!(parse_duration(raw, DEFAULT_DURATION_SECS) > 0, "{raw}");
        }
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(5025.4), "1:23:45");
        assert_eq!(format_clock(65.0), "1:05");
    }
}
