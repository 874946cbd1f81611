//! Capture-date resolution.
//!
//! A file's date is looked up through a fixed chain of tiers, stopping at the first
//! one that yields a valid calendar date:
//!
//! 1. `EXIF:CreateDate` (+ its offset when present), else `QuickTime:CreateDate`,
//!    else `XMP:CreateDate`
//! 2. `File:FileModifyDate`
//! 3. `File:FileName`
//!
//! Each tier produces an `Option`; nothing in the chain raises.

mod parse;

pub use parse::{MatchStrategy, parse_candidate, parse_flexible};

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::metadata::{self, MetadataRecord};

/// A resolved calendar date (year, month, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedDate(NaiveDate);

impl ResolvedDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Directory relative to the destination root: `YYYY/MM/DD`.
    /// The year is written in full; month and day are zero-padded to two digits.
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(self.year().to_string())
            .join(format!("{:02}", self.month()))
            .join(format!("{:02}", self.day()))
    }
}

impl From<NaiveDate> for ResolvedDate {
    fn from(d: NaiveDate) -> Self {
        Self(d)
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Metadata source a date was taken from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    CreateDate,
    ModifyDate,
    FileName,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::CreateDate, Tier::ModifyDate, Tier::FileName];

    /// Candidate string this tier hands to the parser, if the record carries it.
    pub fn candidate(&self, record: &MetadataRecord) -> Option<String> {
        match self {
            Tier::CreateDate => {
                let (key, created) = record.create_date()?;
                // Container and XMP dates carry their own zone, if any.
                let offset = match key {
                    metadata::CREATE_DATE => record.create_date_offset().unwrap_or_default(),
                    _ => "",
                };
                Some(format!("{created}{offset}"))
            }
            Tier::ModifyDate => record.get(metadata::FILE_MODIFY_DATE).map(str::to_owned),
            Tier::FileName => record.get(metadata::FILE_NAME).map(str::to_owned),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::CreateDate => "create_date",
            Tier::ModifyDate => "modify_date",
            Tier::FileName => "file_name",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully resolved date together with the tier that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub date: ResolvedDate,
    pub tier: Tier,
}

/// Resolves a file's capture date from its metadata record.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateResolver {
    strategy: MatchStrategy,
}

impl DateResolver {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Try each tier in order; `None` means the date is unresolved.
    pub fn resolve(&self, record: &MetadataRecord) -> Option<Resolution> {
        Tier::ALL.iter().find_map(|tier| self.attempt(*tier, record))
    }

    /// Run a single tier against the record.
    pub fn attempt(&self, tier: Tier, record: &MetadataRecord) -> Option<Resolution> {
        let candidate = tier.candidate(record)?;
        match parse_candidate(&candidate, self.strategy) {
            Some(date) => Some(Resolution {
                date: date.into(),
                tier,
            }),
            None => {
                debug!(%tier, candidate = %candidate, "tier did not yield a date");
                None
            }
        }
    }
}
