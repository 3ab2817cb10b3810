use crate::engine::derive::{derive_place, recommend_quiet_hour};
use crate::engine::types::{
    BusiestPlace, CityMetrics, DerivedPlace, Evaluation, HourSlot, Moment, PlaceRecord, Weekday,
};
use crate::engine::utility::floor_mean;
use tracing::debug;

/// Reduces derived places into a [`CityMetrics`] summary.
///
/// Only places that are open right now (busy level > 0) feed the mean and the
/// busiest place. Ties for busiest go to the earliest place in input order.
pub fn aggregate_city(places: &[DerivedPlace]) -> CityMetrics {
    let with_live_data = places.iter().filter(|p| p.has_live_data).count();

    let open: Vec<&DerivedPlace> = places
        .iter()
        .filter(|p| p.current_busy_level > 0)
        .collect();

    let levels: Vec<u8> = open.iter().map(|p| p.current_busy_level).collect();

    let busiest = open
        .iter()
        .fold(None, |best: Option<&DerivedPlace>, &p| match best {
            Some(b) if b.current_busy_level >= p.current_busy_level => Some(b),
            _ => Some(p),
        })
        .map(|p| BusiestPlace {
            name: p.name.clone(),
            level: p.current_busy_level,
        });

    CityMetrics {
        total: places.len(),
        with_live_data,
        mean_busyness: floor_mean(&levels),
        busiest,
    }
}

/// Runs the full pipeline for one moment: derive every place, then aggregate.
#[tracing::instrument(skip_all, fields(places = records.len(), moment = %moment))]
pub fn evaluate(records: &[PlaceRecord], moment: Moment) -> Evaluation {
    let places: Vec<DerivedPlace> = records.iter().map(|r| derive_place(r, moment)).collect();
    let city = aggregate_city(&places);

    debug!(
        total = city.total,
        with_live_data = city.with_live_data,
        mean_busyness = city.mean_busyness,
        "City metrics computed"
    );

    Evaluation {
        moment,
        places,
        city,
    }
}

/// First record named `name`.
pub fn find_place<'a>(records: &'a [PlaceRecord], name: &str) -> Option<&'a PlaceRecord> {
    records.iter().find(|r| r.name == name)
}

/// Quiet-hour recommendation for one named place. `None` for unknown names.
pub fn quiet_hour_for(records: &[PlaceRecord], name: &str, day: Weekday) -> Option<HourSlot> {
    find_place(records, name).and_then(|r| recommend_quiet_hour(r, day))
}

/// Latest capture label across the snapshot, compared as strings.
pub fn latest_timestamp(records: &[PlaceRecord]) -> Option<&str> {
    records
        .iter()
        .filter_map(|r| r.timestamp.as_deref())
        .filter(|t| !t.is_empty())
        .max()
}
