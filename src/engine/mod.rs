//! Busyness derivation and city-wide aggregation.
//!
//! Every function here is pure: a normalized snapshot and a [`types::Moment`]
//! go in, derived places and a [`types::CityMetrics`] summary come out.

pub mod aggregate;
pub mod derive;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate_city, evaluate, find_place, latest_timestamp, quiet_hour_for};
pub use derive::{classify_map_category, derive_place, lookup_busyness, recommend_quiet_hour};
pub use types::{
    BusiestPlace, CityMetrics, DerivedPlace, Evaluation, HourSlot, MapCategory, Moment,
    NO_POPULARITY_DATA, PlaceRecord, SentimentLabel, Weekday,
};
