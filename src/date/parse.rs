//! Date string parsing used by every resolution tier.
//!
//! Two rules are applied to a candidate string, in order:
//! 1. EXIF-style prefix (`YYYY:MM:DD`): the first ten characters are normalised to
//!    `YYYY-MM-DD` and the whole string is handed to a flexible date/time parser.
//! 2. Date search: the first `YYYYMMDD`, `YYYY-MM-DD` or `YYYY/MM/DD` substring is
//!    parsed strictly against three templates, picked by `MatchStrategy`.
//!
//! Neither rule panics or errors; a failed rule yields `None` and the caller moves on.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, trace};

static EXIF_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}:\d{2}:\d{2}").expect("valid EXIF prefix regex"));

static DATE_SHAPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{8}|\d{4}-\d{2}-\d{2}|\d{4}/\d{2}/\d{2}").expect("valid date search regex")
});

/// Strict templates tried against a date-shaped substring.
const DATE_TEMPLATES: [&str; 3] = ["%Y%m%d", "%Y-%m-%d", "%Y/%m/%d"];

/// Timestamp layouts accepted with a trailing UTC offset (`Z`, `+02`, `+0200`, `+02:00`).
const OFFSET_LAYOUTS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Timestamp layouts without an offset.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Which template wins when several parse the same substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Stop at the first template that parses.
    #[default]
    FirstMatch,
    /// Try every template and keep the last one that parsed.
    LastMatch,
}

impl MatchStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-match" | "firstmatch" => Some(MatchStrategy::FirstMatch),
            "last" | "last-match" | "lastmatch" => Some(MatchStrategy::LastMatch),
            _ => None,
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchStrategy::FirstMatch => "first",
            MatchStrategy::LastMatch => "last",
        })
    }
}

impl FromStr for MatchStrategy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid date match strategy: '{s}'"))
    }
}

/// Parse a candidate string into a calendar date using both rules.
pub fn parse_candidate(candidate: &str, strategy: MatchStrategy) -> Option<NaiveDate> {
    let mut haystack = candidate.to_string();

    if EXIF_PREFIX.is_match(candidate) {
        haystack = normalize_exif_prefix(candidate);
        if let Some(date) = parse_flexible(&haystack) {
            trace!(candidate, %date, "parsed EXIF-style timestamp");
            return Some(date);
        }
        trace!(candidate, "EXIF-style prefix present but timestamp did not parse");
    }

    let Some(found) = DATE_SHAPED.find(&haystack) else {
        debug!(candidate, "no date-shaped substring");
        return None;
    };
    parse_with_templates(found.as_str(), strategy)
}

/// Replace the `:` separators of the leading `YYYY:MM:DD` with `-`.
/// Callers guarantee the prefix matched, so the first ten bytes are ASCII.
fn normalize_exif_prefix(s: &str) -> String {
    let (head, tail) = s.split_at(10);
    format!("{}{}", head.replace(':', "-"), tail)
}

/// Lenient timestamp parser. Returns the calendar date as written, without
/// converting between timezones.
pub fn parse_flexible(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(s, layout) {
            return Some(dt.date_naive());
        }
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Strictly parse a date-shaped substring against the templates.
fn parse_with_templates(found: &str, strategy: MatchStrategy) -> Option<NaiveDate> {
    let mut attempts = DATE_TEMPLATES
        .iter()
        .filter_map(|template| NaiveDate::parse_from_str(found, template).ok());

    let date = match strategy {
        MatchStrategy::FirstMatch => attempts.next(),
        MatchStrategy::LastMatch => attempts.last(),
    };
    if date.is_none() {
        debug!(found, "date-shaped substring is not a valid calendar date");
    }
    date
}
