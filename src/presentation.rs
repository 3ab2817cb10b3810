//! Presentation hints re-derived from engine output.
//!
//! Nothing here feeds back into the engine.

use crate::engine::types::{DerivedPlace, MapCategory, Moment, PlaceRecord, SentimentLabel, Weekday};
use serde::Serialize;

/// Marker color for places without popularity data.
pub const NO_DATA_COLOR: &str = "#9E9E9E";

/// Fixed marker size for places without popularity data.
pub const NO_DATA_MARKER_SIZE: u8 = 8;

/// Added to the busy level so closed places stay visible on the map.
pub const MARKER_SIZE_OFFSET: u8 = 10;

/// Hex color for a sentiment label. Unmapped labels have none.
pub fn color_code(label: SentimentLabel) -> Option<&'static str> {
    match label {
        SentimentLabel::Negative => Some("#FF4B4B"),
        SentimentLabel::Neutral => Some("#FFC107"),
        SentimentLabel::Positive => Some("#09AB3B"),
        SentimentLabel::Unmapped => None,
    }
}

pub fn category_color(category: MapCategory) -> Option<&'static str> {
    match category {
        MapCategory::Sentiment(label) => color_code(label),
        MapCategory::NoPopularityData => Some(NO_DATA_COLOR),
    }
}

/// Map marker size: busy level plus a visibility offset, or a small fixed size
/// when there is no live data.
pub fn map_size(place: &DerivedPlace) -> u8 {
    if place.has_live_data {
        place.current_busy_level.saturating_add(MARKER_SIZE_OFFSET)
    } else {
        NO_DATA_MARKER_SIZE
    }
}

/// One bar of a day's popularity chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub hour: u8,
    pub percentage: u8,
    /// The bar for the current hour, only set when charting the current day.
    pub highlighted: bool,
}

/// Bars for `day` in schedule order. Empty without live data or a schedule.
pub fn day_chart(record: &PlaceRecord, day: Weekday, moment: Moment) -> Vec<ChartBar> {
    if !record.has_live_data {
        return Vec::new();
    }

    let slots = record.schedule(day);
    let highlight = if day == moment.day {
        slots.iter().position(|s| s.hour == moment.hour)
    } else {
        None
    };

    slots
        .iter()
        .enumerate()
        .map(|(i, s)| ChartBar {
            hour: s.hour,
            percentage: s.percentage,
            highlighted: highlight == Some(i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::HourSlot;
    use std::collections::BTreeMap;

    #[test]
    fn test_colors() {
        assert_eq!(color_code(SentimentLabel::Negative), Some("#FF4B4B"));
        assert_eq!(color_code(SentimentLabel::Unmapped), None);
        assert_eq!(category_color(MapCategory::NoPopularityData), Some(NO_DATA_COLOR));
        assert_eq!(
            category_color(MapCategory::Sentiment(SentimentLabel::Positive)),
            Some("#09AB3B")
        );
    }

    #[test]
    fn test_map_size() {
        let mut place = DerivedPlace {
            name: "Alun-alun".to_string(),
            latitude: None,
            longitude: None,
            has_live_data: true,
            current_busy_level: 0,
            sentiment_label: SentimentLabel::Neutral,
            map_category: MapCategory::Sentiment(SentimentLabel::Neutral),
            recommended_quiet_hour: None,
        };
        assert_eq!(map_size(&place), 10);

        place.current_busy_level = 65;
        assert_eq!(map_size(&place), 75);

        place.has_live_data = false;
        place.current_busy_level = 0;
        assert_eq!(map_size(&place), NO_DATA_MARKER_SIZE);
    }

    #[test]
    fn test_day_chart_highlights_current_hour_on_current_day() {
        let record = record_with(&[(9, 40), (10, 10), (10, 90)]);
        let moment = Moment::new(Weekday::Monday, 10).unwrap();

        let bars = day_chart(&record, Weekday::Monday, moment);
        let highlighted: Vec<bool> = bars.iter().map(|b| b.highlighted).collect();
        assert_eq!(highlighted, vec![false, true, false]);

        let other_day = Moment::new(Weekday::Tuesday, 10).unwrap();
        let bars = day_chart(&record, Weekday::Monday, other_day);
        assert_eq!(bars.len(), 3);
        assert!(bars.iter().all(|b| !b.highlighted));
    }

    #[test]
    fn test_day_chart_empty_without_data() {
        let mut record = record_with(&[(9, 40)]);
        let moment = Moment::new(Weekday::Monday, 9).unwrap();
        assert!(day_chart(&record, Weekday::Sunday, moment).is_empty());

        record.has_live_data = false;
        assert!(day_chart(&record, Weekday::Monday, moment).is_empty());
    }

    // Helper functions for tests
    fn record_with(monday: &[(u8, u8)]) -> PlaceRecord {
        let mut popular_times = BTreeMap::new();
        popular_times.insert(
            Weekday::Monday,
            monday
                .iter()
                .map(|&(hour, percentage)| HourSlot { hour, percentage })
                .collect(),
        );
        PlaceRecord {
            name: "Alun-alun".to_string(),
            latitude: None,
            longitude: None,
            sentiment_score: Some(2),
            sentiment_label: SentimentLabel::Neutral,
            has_live_data: true,
            popular_times,
            summary: None,
            topics: vec![],
            timestamp: None,
        }
    }
}
