//! CLI entry point for the busyness rater.
//!
//! Loads a scraped place snapshot, derives busyness and sentiment fields for
//! a given moment, and reports city-wide metrics or a single place's detail.

use anyhow::{Context, Result};
use busyness_rater::{
    config::Settings,
    engine::{
        Evaluation, Moment, PlaceRecord, Weekday, evaluate, find_place, latest_timestamp,
        quiet_hour_for,
    },
    loader::SnapshotCache,
    normalize::normalize,
    output::{append_rows, print_json, print_pretty},
    presentation::{category_color, color_code, day_chart, map_size},
};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "busyness_rater")]
#[command(about = "Derive busyness and sentiment metrics from a place snapshot", long_about = None)]
struct Cli {
    /// Snapshot JSON file (defaults to BUSYNESS_DATA_PATH)
    #[arg(short, long, global = true, value_name = "FILE")]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Moment to evaluate. Omitted parts come from the local clock.
#[derive(Args)]
struct MomentArgs {
    /// Weekday name (Monday..Sunday)
    #[arg(short, long)]
    day: Option<Weekday>,

    /// Hour of day (0-23)
    #[arg(long)]
    hour: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive per-place fields and city metrics
    Derive {
        #[command(flatten)]
        moment: MomentArgs,

        /// CSV file to append derived rows to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log the full evaluation as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show city-wide metrics only
    Summary {
        #[command(flatten)]
        moment: MomentArgs,
    },
    /// Show detail for a single place
    Place {
        /// Place name as it appears in the snapshot
        name: String,

        #[command(flatten)]
        moment: MomentArgs,

        /// Day to chart and recommend a quiet hour for (defaults to the moment's day)
        #[arg(long)]
        chart_day: Option<Weekday>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();
    let _file_guard = init_logging(&settings.log_file_path)?;

    let cli = Cli::parse();
    let source = cli.source.unwrap_or(settings.data_path);

    let mut cache = SnapshotCache::new();
    let raw = cache
        .load(&source)
        .with_context(|| format!("cannot load snapshot {}", source.display()))?;

    let normalized = normalize(&raw);
    if !normalized.rejected.is_empty() {
        warn!(
            rejected = normalized.rejected.len(),
            "Some records were skipped"
        );
    }
    let records = normalized.records;

    match cli.command {
        Commands::Derive {
            moment,
            output,
            json,
        } => {
            let evaluation = evaluate(&records, resolve_moment(&moment)?);
            report_city(&evaluation, &records);

            for place in &evaluation.places {
                info!(
                    place = %place.name,
                    busy = place.current_busy_level,
                    category = %place.map_category,
                    color = category_color(place.map_category).unwrap_or("-"),
                    size = map_size(place),
                    quiet_hour = ?place.recommended_quiet_hour.map(|s| s.hour),
                    "Place"
                );
            }

            print_pretty(&evaluation);
            if json {
                print_json(&evaluation)?;
            }
            if let Some(path) = output {
                append_rows(&path, &evaluation.places)?;
                info!(path = %path.display(), rows = evaluation.places.len(), "CSV rows appended");
            }
        }
        Commands::Summary { moment } => {
            let evaluation = evaluate(&records, resolve_moment(&moment)?);
            report_city(&evaluation, &records);
        }
        Commands::Place {
            name,
            moment,
            chart_day,
        } => {
            let moment = resolve_moment(&moment)?;
            let record = find_place(&records, &name)
                .with_context(|| format!("no place named '{name}' in snapshot"))?;
            report_place(&records, record, moment, chart_day.unwrap_or(moment.day));
        }
    }

    Ok(())
}

/// Colored stderr output plus a JSON rolling log file.
fn init_logging(log_file_path: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("busyness_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Fills in whatever the caller left out from the local clock.
fn resolve_moment(args: &MomentArgs) -> Result<Moment> {
    let now = Moment::from_datetime(&chrono::Local::now());
    let day = args.day.unwrap_or(now.day);
    let hour = args.hour.unwrap_or(u32::from(now.hour));
    Ok(Moment::new(day, hour)?)
}

fn report_city(evaluation: &Evaluation, records: &[PlaceRecord]) {
    let city = &evaluation.city;
    info!(
        moment = %evaluation.moment,
        data_as_of = latest_timestamp(records).unwrap_or("-"),
        total = city.total,
        with_live_data = city.with_live_data,
        mean_busyness = city.mean_busyness,
        busiest = city.busiest.as_ref().map_or("-", |b| b.name.as_str()),
        busiest_level = city.busiest.as_ref().map(|b| b.level),
        "City summary"
    );
}

fn report_place(
    records: &[PlaceRecord],
    record: &PlaceRecord,
    moment: Moment,
    chart_day: Weekday,
) {
    let evaluation = evaluate(std::slice::from_ref(record), moment);
    let place = &evaluation.places[0];

    if place.has_live_data {
        info!(
            place = %place.name,
            moment = %moment,
            busy = place.current_busy_level,
            "Current busyness"
        );
    } else {
        info!(place = %place.name, "No popularity data available");
    }

    info!(
        sentiment = %place.sentiment_label,
        color = color_code(place.sentiment_label).unwrap_or("-"),
        captured = record.timestamp.as_deref().unwrap_or("-"),
        "Public sentiment"
    );

    let bars = day_chart(record, chart_day, moment);
    if place.has_live_data && bars.is_empty() {
        info!(day = %chart_day, "Closed or no data on this day");
    }
    for bar in &bars {
        info!(
            day = %chart_day,
            hour = bar.hour,
            percentage = bar.percentage,
            now = bar.highlighted,
            "Chart"
        );
    }

    match quiet_hour_for(records, &record.name, chart_day) {
        Some(slot) => info!(
            day = %chart_day,
            hour = slot.hour,
            percentage = slot.percentage,
            "Quietest hour"
        ),
        None => info!(day = %chart_day, "No quiet hour recommendation"),
    }

    info!(summary = record.summary.as_deref().unwrap_or("-"), "Summary");
    if record.topics.is_empty() {
        info!("Topics: -");
    } else {
        info!(topics = %record.topics.join(", "), "Topics");
    }
}
