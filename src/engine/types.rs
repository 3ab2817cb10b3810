//! Data types flowing through the derivation pipeline.

use crate::error::MomentError;
use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Label used for places without a popularity schedule. Never a sentiment label.
pub const NO_POPULARITY_DATA: &str = "No Popularity Data";

/// The fixed weekday vocabulary used as keys of `popular_times`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Exact match against the canonical name, as used for snapshot keys.
    pub fn from_key(key: &str) -> Option<Self> {
        Weekday::ALL.into_iter().find(|d| d.as_str() == key)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = MomentError;

    /// Case-insensitive, for user input. Snapshot keys go through [`Weekday::from_key`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| MomentError::UnknownWeekday(s.to_string()))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Weekday::ALL[day.num_days_from_monday() as usize]
    }
}

/// The "current moment" supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Moment {
    pub day: Weekday,
    pub hour: u8,
}

impl Moment {
    pub fn new(day: Weekday, hour: u32) -> Result<Self, MomentError> {
        if hour > 23 {
            return Err(MomentError::InvalidHour(hour));
        }
        Ok(Self {
            day,
            hour: hour as u8,
        })
    }

    /// Builds a moment from a wall-clock reading. The engine itself never reads a clock.
    pub fn from_datetime<T: Datelike + Timelike>(at: &T) -> Self {
        Self {
            day: at.weekday().into(),
            hour: at.hour() as u8,
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}:00", self.day, self.hour)
    }
}

/// One `{hour, percentage}` entry of a weekly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourSlot {
    pub hour: u8,
    pub percentage: u8,
}

/// Sentiment derived from `sentiment_score` via {1: Negative, 2: Neutral, 3: Positive}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
    /// The score was missing or outside {1, 2, 3}.
    Unmapped,
}

impl SentimentLabel {
    pub fn from_score(score: Option<i64>) -> Self {
        match score {
            Some(1) => SentimentLabel::Negative,
            Some(2) => SentimentLabel::Neutral,
            Some(3) => SentimentLabel::Positive,
            _ => SentimentLabel::Unmapped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Unmapped => "Unmapped",
        }
    }

    pub fn is_mapped(&self) -> bool {
        !matches!(self, SentimentLabel::Unmapped)
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation grouping for a place: its sentiment, or the no-data sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapCategory {
    Sentiment(SentimentLabel),
    NoPopularityData,
}

impl MapCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapCategory::Sentiment(label) => label.as_str(),
            MapCategory::NoPopularityData => NO_POPULARITY_DATA,
        }
    }
}

impl fmt::Display for MapCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MapCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A normalized place. Immutable for the lifetime of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sentiment_score: Option<i64>,
    pub sentiment_label: SentimentLabel,
    pub has_live_data: bool,
    /// Slots per day, kept in source order.
    pub popular_times: BTreeMap<Weekday, Vec<HourSlot>>,
    pub summary: Option<String>,
    pub topics: Vec<String>,
    pub timestamp: Option<String>,
}

impl PlaceRecord {
    /// Schedule for `day`, empty when absent.
    pub fn schedule(&self, day: Weekday) -> &[HourSlot] {
        self.popular_times
            .get(&day)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Per-place output of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedPlace {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_live_data: bool,
    pub current_busy_level: u8,
    pub sentiment_label: SentimentLabel,
    pub map_category: MapCategory,
    pub recommended_quiet_hour: Option<HourSlot>,
}

/// The single busiest open place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusiestPlace {
    pub name: String,
    pub level: u8,
}

/// City-wide summary of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityMetrics {
    pub total: usize,
    pub with_live_data: usize,
    /// Floor of the mean busy level over places with level > 0.
    pub mean_busyness: u8,
    pub busiest: Option<BusiestPlace>,
}

/// Everything an evaluation produces for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub moment: Moment,
    pub places: Vec<DerivedPlace>,
    pub city: CityMetrics,
}
