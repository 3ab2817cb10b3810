//! Output formatting and persistence for evaluations.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::types::{DerivedPlace, Evaluation};
use crate::presentation::map_size;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Flat CSV row for one derived place.
#[derive(Debug, Serialize)]
pub struct PlaceRow<'a> {
    pub name: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_live_data: bool,
    pub current_busy_level: u8,
    pub sentiment_label: &'static str,
    pub map_category: &'static str,
    pub quiet_hour: Option<u8>,
    pub quiet_percentage: Option<u8>,
    pub map_size: u8,
}

impl<'a> From<&'a DerivedPlace> for PlaceRow<'a> {
    fn from(place: &'a DerivedPlace) -> Self {
        Self {
            name: &place.name,
            latitude: place.latitude,
            longitude: place.longitude,
            has_live_data: place.has_live_data,
            current_busy_level: place.current_busy_level,
            sentiment_label: place.sentiment_label.as_str(),
            map_category: place.map_category.as_str(),
            quiet_hour: place.recommended_quiet_hour.map(|s| s.hour),
            quiet_percentage: place.recommended_quiet_hour.map(|s| s.percentage),
            map_size: map_size(place),
        }
    }
}

/// Logs an evaluation using Rust's debug pretty-print format.
pub fn print_pretty(evaluation: &Evaluation) {
    debug!("{:#?}", evaluation);
}

/// Logs an evaluation as pretty-printed JSON.
pub fn print_json(evaluation: &Evaluation) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(evaluation)?);
    Ok(())
}

/// Appends one CSV row per place.
///
/// Creates the file with headers if it does not already exist.
pub fn append_rows(path: &Path, places: &[DerivedPlace]) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, rows = places.len(), "Appending CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for place in places {
        writer.serialize(PlaceRow::from(place))?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{
        CityMetrics, HourSlot, MapCategory, Moment, SentimentLabel, Weekday,
    };
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&evaluation());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&evaluation()).unwrap();
    }

    #[test]
    fn test_row_flattens_quiet_hour() {
        let evaluation = evaluation();
        let row = PlaceRow::from(&evaluation.places[0]);
        assert_eq!(row.quiet_hour, Some(10));
        assert_eq!(row.quiet_percentage, Some(10));
        assert_eq!(row.map_category, "Positive");
        assert_eq!(row.map_size, 50);

        let row = PlaceRow::from(&evaluation.places[1]);
        assert_eq!(row.quiet_hour, None);
        assert_eq!(row.map_category, "No Popularity Data");
        assert_eq!(row.map_size, 8);
    }

    #[test]
    fn test_append_rows_writes_header_once() {
        let path = temp_path("busyness_rater_test_header.csv");
        let _ = fs::remove_file(&path);

        let evaluation = evaluation();
        append_rows(&path, &evaluation.places).unwrap();
        append_rows(&path, &evaluation.places).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content
            .lines()
            .filter(|l| l.starts_with("name,"))
            .count();
        assert_eq!(header_count, 1);

        // 1 header + 2 appends of 2 rows
        assert_eq!(content.lines().count(), 5);

        fs::remove_file(&path).unwrap();
    }

    // Helper functions for tests
    fn evaluation() -> Evaluation {
        Evaluation {
            moment: Moment::new(Weekday::Monday, 9).unwrap(),
            places: vec![
                DerivedPlace {
                    name: "Stasiun Jurangmangu".to_string(),
                    latitude: Some(-6.2887),
                    longitude: Some(106.7293),
                    has_live_data: true,
                    current_busy_level: 40,
                    sentiment_label: SentimentLabel::Positive,
                    map_category: MapCategory::Sentiment(SentimentLabel::Positive),
                    recommended_quiet_hour: Some(HourSlot {
                        hour: 10,
                        percentage: 10,
                    }),
                },
                DerivedPlace {
                    name: "Kantor Kelurahan".to_string(),
                    latitude: None,
                    longitude: None,
                    has_live_data: false,
                    current_busy_level: 0,
                    sentiment_label: SentimentLabel::Unmapped,
                    map_category: MapCategory::NoPopularityData,
                    recommended_quiet_hour: None,
                },
            ],
            city: CityMetrics {
                total: 2,
                with_live_data: 1,
                mean_busyness: 40,
                busiest: None,
            },
        }
    }
}
