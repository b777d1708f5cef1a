//! Decomposition of a remaining duration into zero-padded components and the token template
//! used to render them.
//!
//! A template may contain any number of the placeholders `dd` (days), `hh` (hours), `mm`
//! (minutes), `ss` (seconds) and `ms` (tenths of a second), matched case-insensitively.
//! Anything else in the template is copied through untouched.
//!
//! ```
//! use tminus_core::format::{Template, TimeParts};
//!
//! let template = Template::parse("DD days, hh:mm:ss");
//! let parts = TimeParts::from_millis(90_061_000, true);
//! assert_eq!(template.render(&parts), "01 days, 01:01:01");
//! ```

use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const MILLIS_PER_DAY: i64 = 86_400_000;
pub const MILLIS_PER_HOUR: i64 = 3_600_000;
pub const MILLIS_PER_MINUTE: i64 = 60_000;
pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_TENTH: i64 = 100;

/// How often a countdown advances and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickUnit {
    /// Advance every 1000 ms.
    #[default]
    Seconds,

    /// Advance every 100 ms and report the tenths-of-a-second component.
    Centiseconds,
}

impl TickUnit {
    pub const fn interval_millis(self) -> i64 {
        match self {
            TickUnit::Seconds => MILLIS_PER_SECOND,
            TickUnit::Centiseconds => MILLIS_PER_TENTH,
        }
    }

    pub const fn interval(self) -> Duration {
        Duration::from_millis(self.interval_millis() as u64)
    }
}

impl Display for TickUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TickUnit::Seconds => write!(f, "seconds"),
            TickUnit::Centiseconds => write!(f, "centiseconds"),
        }
    }
}

/// Left-pads `n` with `0` to a width of two. Wider values are left intact.
pub fn pad2(n: i64) -> String {
    format!("{n:02}")
}

/// A remaining duration broken into calendar-free components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    /// `None` when days are not shown; hours then accumulate past 23.
    pub days: Option<i64>,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub centiseconds: i64,
}

impl TimeParts {
    pub fn from_millis(remaining: i64, show_days: bool) -> Self {
        let total_hours = remaining.div_euclid(MILLIS_PER_HOUR);

        let (days, hours) = if show_days {
            (
                Some(remaining.div_euclid(MILLIS_PER_DAY)),
                total_hours.rem_euclid(24),
            )
        } else {
            (None, total_hours)
        };

        Self {
            days,
            hours,
            minutes: remaining.div_euclid(MILLIS_PER_MINUTE).rem_euclid(60),
            seconds: remaining.div_euclid(MILLIS_PER_SECOND).rem_euclid(60),
            centiseconds: remaining.rem_euclid(MILLIS_PER_SECOND) / MILLIS_PER_TENTH,
        }
    }

    /// Padded components in the order `[day?, hour, minute, second, centisecond?]`. The
    /// centisecond slot is only present for [`TickUnit::Centiseconds`].
    pub fn to_parts(&self, unit: TickUnit) -> Vec<String> {
        let mut parts = Vec::with_capacity(5);

        if let Some(days) = self.days {
            parts.push(pad2(days));
        }
        parts.push(pad2(self.hours));
        parts.push(pad2(self.minutes));
        parts.push(pad2(self.seconds));
        if unit == TickUnit::Centiseconds {
            parts.push(pad2(self.centiseconds));
        }

        parts
    }
}

/// The value reported on each tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormattedTime {
    /// Output of a [`Template`].
    Text(String),

    /// Padded components when no template was given.
    Parts(Vec<String>),
}

impl Display for FormattedTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormattedTime::Text(text) => write!(f, "{text}"),
            FormattedTime::Parts(parts) => write!(f, "{}", parts.join(":")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Days,
    Hours,
    Minutes,
    Seconds,
    Tenths,
}

impl Token {
    const SEARCH_ORDER: [Token; 5] = [
        Token::Days,
        Token::Hours,
        Token::Minutes,
        Token::Seconds,
        Token::Tenths,
    ];

    const fn pattern(self) -> &'static [u8] {
        match self {
            Token::Days => b"dd",
            Token::Hours => b"hh",
            Token::Minutes => b"mm",
            Token::Seconds => b"ss",
            Token::Tenths => b"ms",
        }
    }

    fn write_to(self, parts: &TimeParts, out: &mut String) {
        let value = match self {
            Token::Days => match parts.days {
                Some(days) => days,
                None => return,
            },
            Token::Hours => parts.hours,
            Token::Minutes => parts.minutes,
            Token::Seconds => parts.seconds,
            Token::Tenths => parts.centiseconds,
        };
        out.push_str(&pad2(value));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Token(Token),
}

/// A compiled duration template.
///
/// Tokens are located once, in the fixed order `dd`, `hh`, `mm`, `ss`, `ms`, and each search
/// only looks at literal text left over by the previous ones. Substituted values are never
/// re-scanned, so `"hh:hh"` renders both hours identically and a `dd` rendered as empty cannot
/// glue `"m"` and `"s"` into a `ms` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let mut pieces = vec![Piece::Literal(source.to_string())];

        for token in Token::SEARCH_ORDER {
            pieces = pieces
                .into_iter()
                .flat_map(|piece| match piece {
                    Piece::Literal(text) => split_on_token(&text, token),
                    token_piece => vec![token_piece],
                })
                .collect();
        }

        pieces.retain(|piece| !matches!(piece, Piece::Literal(text) if text.is_empty()));

        Self {
            source: source.to_string(),
            pieces,
        }
    }

    pub fn render(&self, parts: &TimeParts) -> String {
        let mut out = String::with_capacity(self.source.len());

        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Token(token) => token.write_to(parts, &mut out),
            }
        }

        out
    }

    /// True if at least one placeholder was found.
    pub fn has_tokens(&self) -> bool {
        self.pieces
            .iter()
            .any(|piece| matches!(piece, Piece::Token(_)))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Template {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Template::parse(s))
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

// Tokens are ASCII, so every match offset is also a char boundary.
fn split_on_token(text: &str, token: Token) -> Vec<Piece> {
    let pattern = token.pattern();
    let bytes = text.as_bytes();

    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut idx = 0;

    while idx + pattern.len() <= bytes.len() {
        if bytes[idx..idx + pattern.len()].eq_ignore_ascii_case(pattern) {
            pieces.push(Piece::Literal(text[literal_start..idx].to_string()));
            pieces.push(Piece::Token(token));
            idx += pattern.len();
            literal_start = idx;
        } else {
            idx += 1;
        }
    }

    pieces.push(Piece::Literal(text[literal_start..].to_string()));
    pieces
}

/// Formats `remaining` milliseconds the way a countdown tick reports it.
pub fn format_remaining(
    remaining: i64,
    template: Option<&Template>,
    unit: TickUnit,
    show_days: bool,
) -> FormattedTime {
    let parts = TimeParts::from_millis(remaining, show_days);

    match template {
        Some(template) => FormattedTime::Text(template.render(&parts)),
        None => FormattedTime::Parts(parts.to_parts(unit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWENTY_FIVE_HOURS: i64 = 90_000_000;

    fn text(remaining: i64, template: &str, unit: TickUnit, show_days: bool) -> String {
        let template = Template::parse(template);
        match format_remaining(remaining, Some(&template), unit, show_days) {
            FormattedTime::Text(s) => s,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn padding() {
        assert_eq!(pad2(0), "00");
        assert_eq!(pad2(7), "07");
        assert_eq!(pad2(42), "42");
        assert_eq!(pad2(100), "100");
        assert_eq!(pad2(12345), "12345");
    }

    #[test]
    fn every_small_component_is_two_chars() {
        let under_a_day = (0..200_000).step_by(100);
        let days = (1..100).map(|d| d * MILLIS_PER_DAY + 23 * MILLIS_PER_HOUR + 59_900);

        for remaining in under_a_day.chain(days) {
            let parts = TimeParts::from_millis(remaining, true);
            let tuple = parts.to_parts(TickUnit::Centiseconds);
            assert_eq!(tuple.len(), 5);
            assert!(tuple.iter().all(|p| p.len() == 2), "{remaining}: {tuple:?}");

            let parts = TimeParts::from_millis(remaining, false);
            if parts.hours < 100 {
                let tuple = parts.to_parts(TickUnit::Centiseconds);
                assert_eq!(tuple.len(), 4);
                assert!(tuple.iter().all(|p| p.len() == 2), "{remaining}: {tuple:?}");
            }
        }
    }

    #[test]
    fn twenty_five_hours_without_days() {
        let parts = TimeParts::from_millis(TWENTY_FIVE_HOURS, false);
        assert_eq!(parts.days, None);
        assert_eq!(parts.hours, 25);

        let tuple = parts.to_parts(TickUnit::Seconds);
        assert_eq!(tuple, vec!["25", "00", "00"]);
    }

    #[test]
    fn twenty_five_hours_with_days() {
        let parts = TimeParts::from_millis(TWENTY_FIVE_HOURS, true);
        assert_eq!(parts.days, Some(1));
        assert_eq!(parts.hours, 1);

        let tuple = parts.to_parts(TickUnit::Seconds);
        assert_eq!(tuple, vec!["01", "01", "00", "00"]);
    }

    #[test]
    fn wide_values_are_not_truncated() {
        let parts = TimeParts::from_millis(123 * MILLIS_PER_DAY, true);
        assert_eq!(parts.to_parts(TickUnit::Seconds)[0], "123");

        let parts = TimeParts::from_millis(123 * MILLIS_PER_HOUR, false);
        assert_eq!(parts.to_parts(TickUnit::Seconds)[0], "123");
    }

    #[test]
    fn centiseconds_component() {
        let parts = TimeParts::from_millis(61_750, true);
        assert_eq!(parts.minutes, 1);
        assert_eq!(parts.seconds, 1);
        assert_eq!(parts.centiseconds, 7);

        assert_eq!(
            parts.to_parts(TickUnit::Centiseconds),
            vec!["00", "00", "01", "01", "07"]
        );
        assert_eq!(
            parts.to_parts(TickUnit::Seconds),
            vec!["00", "00", "01", "01"]
        );
    }

    #[test]
    fn all_tokens() {
        let remaining = 2 * MILLIS_PER_DAY + 3 * MILLIS_PER_HOUR + 4 * MILLIS_PER_MINUTE + 5_600;
        assert_eq!(
            text(remaining, "dd hh:mm:ss.ms", TickUnit::Centiseconds, true),
            "02 03:04:05.06"
        );
    }

    #[test]
    fn tenths_token_under_seconds() {
        // `ms` is the tenths component whatever the tick unit, so whole seconds show `00`
        assert_eq!(text(5_000, "ss.ms", TickUnit::Seconds, true), "05.00");
        assert_eq!(text(5_000, "ss.ms", TickUnit::Centiseconds, true), "05.00");
        assert_eq!(text(5_300, "ss.ms", TickUnit::Seconds, true), "05.03");
    }

    #[test]
    fn tokens_are_case_insensitive() {
        let remaining = 3 * MILLIS_PER_HOUR + 4 * MILLIS_PER_MINUTE + 5_000;
        assert_eq!(
            text(remaining, "HH:Mm:sS", TickUnit::Seconds, true),
            "03:04:05"
        );
    }

    #[test]
    fn repeated_token_replaced_identically() {
        let remaining = 7 * MILLIS_PER_HOUR;
        assert_eq!(text(remaining, "hh:hh", TickUnit::Seconds, true), "07:07");
        assert_eq!(text(remaining, "hhHHhh", TickUnit::Seconds, true), "070707");
    }

    #[test]
    fn days_token_empty_without_days() {
        assert_eq!(
            text(TWENTY_FIVE_HOURS, "[dd]hh", TickUnit::Seconds, false),
            "[]25"
        );
    }

    #[test]
    fn empty_days_do_not_create_new_tokens() {
        // Removing `dd` leaves "m" next to "s"; that must not become a `ms` token
        assert_eq!(text(5_500, "mdds", TickUnit::Centiseconds, false), "ms");
        assert_eq!(text(5_500, "mdds", TickUnit::Centiseconds, true), "m00s");
    }

    #[test]
    fn search_order_decides_overlaps() {
        // `ss` is searched before `ms`, so "mss" is "m" followed by seconds
        assert_eq!(text(5_500, "mss", TickUnit::Centiseconds, true), "m05");
        // `mm` is searched before `ms`
        assert_eq!(text(65_500, "mms", TickUnit::Centiseconds, true), "01s");
        // odd runs leave a literal tail
        assert_eq!(
            text(2 * MILLIS_PER_DAY, "ddd", TickUnit::Seconds, true),
            "02d"
        );
    }

    #[test]
    fn unknown_text_passes_through() {
        let template = Template::parse("T-minus {x}!");
        assert!(!template.has_tokens());
        assert_eq!(
            template.render(&TimeParts::from_millis(5_000, true)),
            "T-minus {x}!"
        );

        assert_eq!(text(1_000, "", TickUnit::Seconds, true), "");
    }

    #[test]
    fn non_ascii_literals() {
        assert_eq!(
            text(61_000, "还剩 mm 分 ss 秒", TickUnit::Seconds, true),
            "还剩 01 分 01 秒"
        );
    }

    #[test]
    fn template_round_trips_source() {
        let template: Template = "hh:mm".parse().unwrap();
        assert_eq!(template.as_str(), "hh:mm");
        assert_eq!(template.to_string(), "hh:mm");
    }

    #[test]
    fn formatted_time_display() {
        let parts = FormattedTime::Parts(vec!["01".into(), "02".into(), "03".into()]);
        assert_eq!(parts.to_string(), "01:02:03");

        let text = FormattedTime::Text("T-03".into());
        assert_eq!(text.to_string(), "T-03");
    }

    #[test]
    fn formatted_time_serializes_untagged() {
        let parts = FormattedTime::Parts(vec!["00".into(), "05".into()]);
        assert_eq!(serde_json::to_string(&parts).unwrap(), r#"["00","05"]"#);

        let text = FormattedTime::Text("05".into());
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""05""#);
    }

    #[test]
    fn tick_unit_interval_and_display() {
        assert_eq!(TickUnit::Seconds.interval(), Duration::from_secs(1));
        assert_eq!(
            TickUnit::Centiseconds.interval(),
            Duration::from_millis(100)
        );
        assert_eq!(TickUnit::Seconds.to_string(), "seconds");
        assert_eq!(TickUnit::Centiseconds.to_string(), "centiseconds");
    }
}
