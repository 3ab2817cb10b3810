use crate::engine::types::{DerivedPlace, HourSlot, MapCategory, Moment, PlaceRecord, Weekday};

/// First hour considered for a quiet-hour recommendation.
pub const QUIET_WINDOW_START: u8 = 7;
/// Last hour (inclusive) considered for a quiet-hour recommendation.
pub const QUIET_WINDOW_END: u8 = 21;

/// Busy percentage of `record` at `(day, hour)`.
///
/// Returns 0 both when the place has no live data and when no slot is recorded
/// for that hour; callers disambiguate through [`PlaceRecord::has_live_data`].
/// Duplicate slots for one hour resolve to the first one in schedule order.
pub fn lookup_busyness(record: &PlaceRecord, day: Weekday, hour: u8) -> u8 {
    if !record.has_live_data {
        return 0;
    }
    record
        .schedule(day)
        .iter()
        .find(|slot| slot.hour == hour)
        .map_or(0, |slot| slot.percentage)
}

/// Quietest measured slot on `day` within business hours (7 to 21 inclusive).
///
/// Slots at 0% are treated as closed, not quiet. Ties keep the first slot in
/// schedule order.
pub fn recommend_quiet_hour(record: &PlaceRecord, day: Weekday) -> Option<HourSlot> {
    if !record.has_live_data {
        return None;
    }
    record
        .schedule(day)
        .iter()
        .filter(|slot| {
            (QUIET_WINDOW_START..=QUIET_WINDOW_END).contains(&slot.hour) && slot.percentage > 0
        })
        .fold(None, |quietest: Option<&HourSlot>, slot| match quietest {
            Some(q) if q.percentage <= slot.percentage => Some(q),
            _ => Some(slot),
        })
        .copied()
}

pub fn classify_map_category(record: &PlaceRecord) -> MapCategory {
    if record.has_live_data {
        MapCategory::Sentiment(record.sentiment_label)
    } else {
        MapCategory::NoPopularityData
    }
}

/// Computes every per-place field for `moment`. No cross-place dependency.
pub fn derive_place(record: &PlaceRecord, moment: Moment) -> DerivedPlace {
    DerivedPlace {
        name: record.name.clone(),
        latitude: record.latitude,
        longitude: record.longitude,
        has_live_data: record.has_live_data,
        current_busy_level: lookup_busyness(record, moment.day, moment.hour),
        sentiment_label: record.sentiment_label,
        map_category: classify_map_category(record),
        recommended_quiet_hour: recommend_quiet_hour(record, moment.day),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{NO_POPULARITY_DATA, SentimentLabel};
    use std::collections::BTreeMap;

    #[test]
    fn test_lookup_matching_hour() {
        let record = place_with(Weekday::Monday, &[(9, 40), (10, 10)]);
        assert_eq!(lookup_busyness(&record, Weekday::Monday, 10), 10);
        assert_eq!(lookup_busyness(&record, Weekday::Monday, 9), 40);
    }

    #[test]
    fn test_lookup_missing_hour_or_day_is_zero() {
        let record = place_with(Weekday::Monday, &[(9, 40)]);
        assert_eq!(lookup_busyness(&record, Weekday::Monday, 3), 0);
        assert_eq!(lookup_busyness(&record, Weekday::Tuesday, 9), 0);
    }

    #[test]
    fn test_lookup_first_duplicate_wins() {
        let record = place_with(Weekday::Friday, &[(18, 55), (18, 90)]);
        assert_eq!(lookup_busyness(&record, Weekday::Friday, 18), 55);
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let record = place_with(Weekday::Sunday, &[(12, 70)]);
        let first = lookup_busyness(&record, Weekday::Sunday, 12);
        let second = lookup_busyness(&record, Weekday::Sunday, 12);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_live_data_is_always_zero_and_no_quiet_hour() {
        let mut record = place_with(Weekday::Monday, &[(9, 40)]);
        record.has_live_data = false;

        for day in Weekday::ALL {
            assert_eq!(recommend_quiet_hour(&record, day), None);
            for hour in 0..24 {
                assert_eq!(lookup_busyness(&record, day, hour), 0);
            }
        }
    }

    #[test]
    fn test_quiet_hour_picks_minimum() {
        let record = place_with(Weekday::Monday, &[(9, 40), (10, 10)]);
        assert_eq!(
            recommend_quiet_hour(&record, Weekday::Monday),
            Some(HourSlot {
                hour: 10,
                percentage: 10
            })
        );
    }

    #[test]
    fn test_quiet_hour_excludes_zero_and_out_of_window() {
        let record = place_with(
            Weekday::Wednesday,
            &[(6, 5), (8, 0), (12, 35), (21, 30), (22, 2)],
        );
        assert_eq!(
            recommend_quiet_hour(&record, Weekday::Wednesday),
            Some(HourSlot {
                hour: 21,
                percentage: 30
            })
        );
    }

    #[test]
    fn test_quiet_hour_window_bounds_inclusive() {
        let record = place_with(Weekday::Monday, &[(7, 20), (21, 20), (14, 60)]);
        assert_eq!(
            recommend_quiet_hour(&record, Weekday::Monday),
            Some(HourSlot {
                hour: 7,
                percentage: 20
            })
        );
    }

    #[test]
    fn test_quiet_hour_tie_keeps_schedule_order() {
        let record = place_with(Weekday::Saturday, &[(15, 25), (9, 25), (11, 40)]);
        assert_eq!(
            recommend_quiet_hour(&record, Weekday::Saturday),
            Some(HourSlot {
                hour: 15,
                percentage: 25
            })
        );
    }

    #[test]
    fn test_quiet_hour_none_when_nothing_qualifies() {
        let record = place_with(Weekday::Monday, &[(3, 10), (12, 0)]);
        assert_eq!(recommend_quiet_hour(&record, Weekday::Monday), None);
        assert_eq!(recommend_quiet_hour(&record, Weekday::Tuesday), None);
    }

    #[test]
    fn test_map_category() {
        let record = place_with(Weekday::Monday, &[(9, 40)]);
        assert_eq!(
            classify_map_category(&record),
            MapCategory::Sentiment(SentimentLabel::Positive)
        );

        let mut no_data = record.clone();
        no_data.has_live_data = false;
        no_data.popular_times.clear();
        assert_eq!(classify_map_category(&no_data), MapCategory::NoPopularityData);
        assert_eq!(classify_map_category(&no_data).as_str(), NO_POPULARITY_DATA);
    }

    #[test]
    fn test_derive_place() {
        let record = place_with(Weekday::Monday, &[(9, 40), (10, 10)]);
        let moment = Moment::new(Weekday::Monday, 9).unwrap();
        let derived = derive_place(&record, moment);

        assert_eq!(derived.name, "Stasiun Serpong");
        assert!(derived.has_live_data);
        assert_eq!(derived.current_busy_level, 40);
        assert_eq!(derived.sentiment_label, SentimentLabel::Positive);
        assert_eq!(
            derived.recommended_quiet_hour,
            Some(HourSlot {
                hour: 10,
                percentage: 10
            })
        );
    }

    // Helper functions for tests
    fn place_with(day: Weekday, slots: &[(u8, u8)]) -> PlaceRecord {
        let mut popular_times = BTreeMap::new();
        popular_times.insert(
            day,
            slots
                .iter()
                .map(|&(hour, percentage)| HourSlot { hour, percentage })
                .collect(),
        );
        PlaceRecord {
            name: "Stasiun Serpong".to_string(),
            latitude: Some(-6.32),
            longitude: Some(106.66),
            sentiment_score: Some(3),
            sentiment_label: SentimentLabel::Positive,
            has_live_data: true,
            popular_times,
            summary: None,
            topics: vec![],
            timestamp: None,
        }
    }
}
