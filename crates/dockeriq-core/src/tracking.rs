//! Tracking numbers of the form `PREFIX + YYYYMMDD + NNNNNN`, e.g. `DKIQ20240115000001`.
//!
//! The sequence is derived, not stored: the next value for a day is one more
//! than the largest suffix already persisted under that day's prefix.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use thiserror::Error;

use crate::error::ApiError;
use crate::store::TrackingNumberSource;

pub const PREFIX_LEN: usize = 4;
pub const DAY_KEY_LEN: usize = 8;
pub const SEQUENCE_LEN: usize = 6;
pub const TRACKING_NUMBER_LEN: usize = PREFIX_LEN + DAY_KEY_LEN + SEQUENCE_LEN;

const MAX_SEQUENCE: u32 = 999_999;

static TRACKING_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{4}\d{8}\d{6}$").expect("tracking number regex is valid")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error("Invalid tracking number format: {0}")]
    InvalidFormat(String),

    #[error("Tracking number sequence exhausted for {0}")]
    SequenceExhausted(String),
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        match err {
            TrackingError::InvalidFormat(_) => ApiError::BadRequest(err.to_string()),
            TrackingError::SequenceExhausted(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Mints tracking numbers for one fixed prefix.
#[derive(Debug, Clone)]
pub struct TrackingNumberGenerator {
    prefix: String,
}

impl TrackingNumberGenerator {
    /// `prefix` is expected to be four uppercase ASCII letters (checked by `Config::validate`).
    pub fn new(prefix: impl Into<String>) -> Self {
        TrackingNumberGenerator {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Next tracking number for today's local date.
    pub async fn generate<S>(&self, source: &S) -> Result<String, ApiError>
    where
        S: TrackingNumberSource + ?Sized,
    {
        self.generate_for(source, Local::now().date_naive()).await
    }

    /// Next tracking number for `day`.
    pub async fn generate_for<S>(&self, source: &S, day: NaiveDate) -> Result<String, ApiError>
    where
        S: TrackingNumberSource + ?Sized,
    {
        let day_prefix = format!("{}{}", self.prefix, day_key(day));
        let existing = source.tracking_numbers_with_prefix(&day_prefix).await?;

        let next = next_sequence(&day_prefix, existing.iter().map(String::as_str));
        if next > MAX_SEQUENCE {
            return Err(TrackingError::SequenceExhausted(day_prefix).into());
        }

        let tracking_number = format!("{}{:06}", day_prefix, next);
        tracing::debug!(%tracking_number, existing = existing.len(), "generated tracking number");
        Ok(tracking_number)
    }
}

/// `YYYYMMDD` for `day`.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// One more than the largest sequence suffix among `existing`.
///
/// Suffixes that do not parse as a number count as zero.
pub fn next_sequence<'a>(day_prefix: &str, existing: impl Iterator<Item = &'a str>) -> u32 {
    existing
        .map(|id| {
            id.strip_prefix(day_prefix)
                .and_then(|suffix| suffix.parse::<u32>().ok())
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

/// Whether `id` has the exact tracking-number shape.
pub fn validate_format(id: &str) -> bool {
    id.len() >= TRACKING_NUMBER_LEN && TRACKING_NUMBER_REGEX.is_match(id)
}

/// Date segment of a tracking number as `YYYY-MM-DD`.
pub fn extract_date(id: &str) -> Result<String, TrackingError> {
    if !validate_format(id) {
        return Err(TrackingError::InvalidFormat(id.to_string()));
    }

    let digits = &id[PREFIX_LEN..PREFIX_LEN + DAY_KEY_LEN];
    Ok(format!("{}-{}-{}", &digits[0..4], &digits[4..6], &digits[6..8]))
}
