//! Time windows bounding randomized timestamps.

use crate::error::ConfigError;
use chrono::{DateTime, Duration, Utc};

/// An `(earliest, latest)` pair of absolute instants.
///
/// Randomized timestamp tokens land somewhere in `[earliest, latest]`.
/// A zero-width window always yields `latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, rejecting `latest < earliest`.
    pub fn new(earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Result<Self, ConfigError> {
        if latest < earliest {
            return Err(ConfigError::InvalidWindow {
                earliest: earliest.to_rfc3339(),
                latest: latest.to_rfc3339(),
            });
        }
        Ok(Self { earliest, latest })
    }

    /// A zero-width window pinned to `instant`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            earliest: instant,
            latest: instant,
        }
    }

    pub fn earliest(&self) -> DateTime<Utc> {
        self.earliest
    }

    pub fn latest(&self) -> DateTime<Utc> {
        self.latest
    }

    /// Width of the window (never negative).
    pub fn span(&self) -> Duration {
        self.latest - self.earliest
    }

    /// Whether `instant` falls inside the window, bounds included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.earliest <= instant && instant <= self.latest
    }
}

/// Resolve a time specification against `now`.
///
/// Accepts `now`, signed relative offsets such as `-15m`, `-1h` or `+2d`
/// (units `s`, `m`, `h`, `d`, `w`) and RFC 3339 instants.
pub fn resolve_time(spec: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
    let spec = spec.trim();
    if spec.is_empty() || spec.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    if let Some(offset) = parse_offset(spec) {
        return now
            .checked_add_signed(offset)
            .ok_or_else(|| ConfigError::InvalidTime(spec.to_string()));
    }

    DateTime::parse_from_rfc3339(spec)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ConfigError::InvalidTime(spec.to_string()))
}

/// Parse `[+-]<n><unit>` into a signed duration.
fn parse_offset(spec: &str) -> Option<Duration> {
    let (negative, rest) = match spec.as_bytes().first()? {
        b'-' => (true, &spec[1..]),
        b'+' => (false, &spec[1..]),
        _ => return None,
    };

    let unit_at = rest.find(|c: char| !c.is_ascii_digit())?;
    let (digits, unit) = rest.split_at(unit_at);
    let amount: i64 = digits.parse().ok()?;

    let seconds_per_unit = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 604_800,
        _ => return None,
    };

    let seconds = amount.checked_mul(seconds_per_unit)?;
    let duration = Duration::try_seconds(seconds)?;
    Some(if negative { -duration } else { duration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        let now = fixed_now();
        let result = TimeWindow::new(now, now - Duration::seconds(1));
        assert!(matches!(result, Err(ConfigError::InvalidWindow { .. })));
    }

    #[test]
    fn test_zero_width_window() {
        let window = TimeWindow::at(fixed_now());
        assert_eq!(window.span(), Duration::zero());
        assert_eq!(window.earliest(), window.latest());
    }

    #[test]
    fn test_resolve_relative_times() {
        let now = fixed_now();
        assert_eq!(resolve_time("now", now).unwrap(), now);
        assert_eq!(
            resolve_time("-1h", now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap()
        );
        assert_eq!(
            resolve_time("+2d", now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
        );
        assert_eq!(
            resolve_time("-30s", now).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 11, 59, 30).unwrap()
        );
    }

    #[test]
    fn test_resolve_absolute_time() {
        let resolved = resolve_time("2020-01-01T00:00:00Z", fixed_now()).unwrap();
        assert_eq!(resolved, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(matches!(
            resolve_time("-5y", fixed_now()),
            Err(ConfigError::InvalidTime(_))
        ));
        assert!(matches!(
            resolve_time("yesterday", fixed_now()),
            Err(ConfigError::InvalidTime(_))
        ));
    }
}
