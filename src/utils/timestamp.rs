use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, de::Error};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A timestamp as received, before it is placed on the company clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// RFC 3339 value naming an instant.
    Zoned(DateTime<FixedOffset>),
    /// Naive value, already company wall-clock time.
    Naive(NaiveDateTime),
}

impl Timestamp {
    pub fn parse(value: &str) -> Option<Self> {
        if let Ok(zoned) = DateTime::parse_from_rfc3339(value) {
            return Some(Self::Zoned(zoned));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(Self::Naive)
    }

    /// Wall-clock reading at `company_offset`.
    pub fn wall_clock(self, company_offset: FixedOffset) -> NaiveDateTime {
        match self {
            Self::Zoned(instant) => instant.with_timezone(&company_offset).naive_local(),
            Self::Naive(local) => local,
        }
    }
}

/// Parses `+HH:MM`, `-HH:MM`, `+HH` or `Z`/`UTC`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match value.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((hours, minutes)) => (hours.parse::<i32>().ok()?, minutes.parse::<i32>().ok()?),
        None => (rest.parse::<i32>().ok()?, 0),
    };
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// `deserialize_with` helper; blank strings and `null` read as absent.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Timestamp::parse(value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {value}"))),
    }
}
