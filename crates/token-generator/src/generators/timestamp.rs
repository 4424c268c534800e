//! Timestamp value generators.
//!
//! A timestamp token draws an instant in the time window once per shared
//! choice slot and stores it as nanoseconds since the epoch, so every token
//! handed the same slot renders the same instant.

use crate::error::TokenError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use token_core::{ChoiceSlot, TimeWindow, TimestampEncoding, Token};

/// Instant for this token: reused from `slot`, or drawn from `window` and stored.
///
/// The draw is a uniform offset in `[0, latest - earliest]` subtracted from
/// `latest`, so a zero-width window yields `latest`.
pub fn select_instant<R: Rng>(
    token: &Token,
    slot: &mut ChoiceSlot,
    window: &TimeWindow,
    rng: &mut R,
) -> Result<DateTime<Utc>, TokenError> {
    let out_of_range = || TokenError::TimestampOutOfRange {
        token: token.name.clone(),
    };

    let nanos = slot.get_or_select_with(|| {
        let span = window.span().num_nanoseconds().ok_or_else(out_of_range)?;
        let offset = if span > 0 {
            rng.random_range(0..=span)
        } else {
            0
        };
        let instant = window.latest() - Duration::nanoseconds(offset);
        instant.timestamp_nanos_opt().ok_or_else(out_of_range)
    })?;

    Ok(DateTime::from_timestamp_nanos(nanos))
}

/// Render `instant` in the requested encoding.
pub fn render_timestamp(
    token: &Token,
    instant: DateTime<Utc>,
    encoding: TimestampEncoding,
    format: &str,
) -> Result<String, TokenError> {
    match encoding {
        TimestampEncoding::Epoch => Ok(instant.timestamp().to_string()),
        TimestampEncoding::Strftime => render_strftime(token, instant, format),
        TimestampEncoding::Layout => render_strftime(token, instant, &layout_to_strftime(format)),
    }
}

fn render_strftime(
    token: &Token,
    instant: DateTime<Utc>,
    format: &str,
) -> Result<String, TokenError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(TokenError::InvalidToken {
            sample: token.sample.clone(),
            token: token.name.clone(),
            reason: format!("invalid timestamp format '{format}'"),
        });
    }
    Ok(instant.format_with_items(items.iter()).to_string())
}

/// Reference-time layout elements and their strftime equivalents.
///
/// Order matters: longer elements sharing a prefix come first. Zone elements
/// assume UTC rendering.
const LAYOUT_ELEMENTS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Jan", "%b"),
    ("Monday", "%A"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("2006", "%Y"),
    ("002", "%j"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("_2", "%e"),
    ("15", "%H"),
    ("1", "%-m"),
    ("2", "%-d"),
    ("3", "%-I"),
    ("4", "%-M"),
    ("5", "%-S"),
    ("PM", "%p"),
    ("pm", "%P"),
    ("Z07:00", "Z"),
    ("Z0700", "Z"),
    ("Z07", "Z"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("-07", "%:::z"),
    (".000000000", "%.9f"),
    (".000000", "%.6f"),
    (".000", "%.3f"),
];

/// Translate a reference-time layout (`2006-01-02 15:04:05`) into strftime.
pub fn layout_to_strftime(layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;

    'scan: while let Some(c) = rest.chars().next() {
        for (element, spec) in LAYOUT_ELEMENTS {
            if let Some(tail) = rest.strip_prefix(element) {
                out.push_str(spec);
                rest = tail;
                continue 'scan;
            }
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use token_core::TokenValue;

    fn token(encoding: TimestampEncoding, format: &str) -> Token {
        Token::template(
            "ts",
            "%ts%",
            TokenValue::Timestamp {
                encoding,
                format: format.to_string(),
            },
        )
        .unwrap()
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap() + Duration::milliseconds(26)
    }

    #[test]
    fn test_select_instant_within_window() {
        let mut rng = StdRng::seed_from_u64(42);
        let latest = instant();
        let window = TimeWindow::new(latest - Duration::hours(1), latest).unwrap();
        let t = token(TimestampEncoding::Epoch, "");

        for _ in 0..100 {
            let mut slot = ChoiceSlot::new();
            let selected = select_instant(&t, &mut slot, &window, &mut rng).unwrap();
            assert!(window.contains(selected));
            assert_eq!(slot.selected(), selected.timestamp_nanos_opt());
        }
    }

    #[test]
    fn test_zero_width_window_yields_latest() {
        let mut rng = StdRng::seed_from_u64(42);
        let window = TimeWindow::at(instant());
        let mut slot = ChoiceSlot::new();
        let t = token(TimestampEncoding::Epoch, "");

        assert_eq!(
            select_instant(&t, &mut slot, &window, &mut rng).unwrap(),
            instant()
        );
    }

    #[test]
    fn test_preselected_instant_is_reused() {
        let mut rng = StdRng::seed_from_u64(42);
        let stored = Utc.with_ymd_and_hms(2001, 9, 9, 1, 46, 40).unwrap();
        let mut slot = ChoiceSlot::Selected(stored.timestamp_nanos_opt().unwrap());
        let window = TimeWindow::at(instant());
        let t = token(TimestampEncoding::Epoch, "");

        assert_eq!(select_instant(&t, &mut slot, &window, &mut rng).unwrap(), stored);
    }

    #[test]
    fn test_render_encodings() {
        let t = token(TimestampEncoding::Strftime, "%Y-%m-%d %H:%M:%S");
        assert_eq!(
            render_timestamp(&t, instant(), TimestampEncoding::Strftime, "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            "2024-03-05 14:07:09"
        );
        assert_eq!(
            render_timestamp(&t, instant(), TimestampEncoding::Epoch, "").unwrap(),
            instant().timestamp().to_string()
        );
        assert_eq!(
            render_timestamp(
                &t,
                instant(),
                TimestampEncoding::Layout,
                "2006-01-02T15:04:05.000Z07:00"
            )
            .unwrap(),
            "2024-03-05T14:07:09.026Z"
        );
    }

    #[test]
    fn test_invalid_strftime_is_error() {
        let t = token(TimestampEncoding::Strftime, "%Y");
        assert!(matches!(
            render_timestamp(&t, instant(), TimestampEncoding::Strftime, "%Q%"),
            Err(TokenError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_layout_translation() {
        assert_eq!(layout_to_strftime("2006-01-02 15:04:05"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(layout_to_strftime("Jan _2 15:04:05"), "%b %e %H:%M:%S");
        assert_eq!(layout_to_strftime("Monday, January 2"), "%A, %B %-d");
        assert_eq!(layout_to_strftime("3:04PM -0700"), "%-I:%M%p %z");
        assert_eq!(layout_to_strftime("100% done"), "%-m00%% done");
    }

    #[test]
    fn test_layout_rendering() {
        let t = token(TimestampEncoding::Layout, "x");
        assert_eq!(
            render_timestamp(&t, instant(), TimestampEncoding::Layout, "02/Jan/2006:15:04:05 -0700")
                .unwrap(),
            "05/Mar/2024:14:07:09 +0000"
        );
    }
}
