//! `series`: daily conversion time series.

use chrono::NaiveDate;
use tabled::Tabled;

use referly_core::{Dashboard, TimeSeriesPoint, earliest_start_date};

use crate::cli::{GlobalOpts, SeriesArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "SIGNUPS")]
    signups: u64,
    #[tabled(rename = "TRIALS")]
    trials: u64,
    #[tabled(rename = "PURCHASES")]
    purchases: u64,
    #[tabled(rename = "OTHER")]
    other: u64,
}

impl SeriesRow {
    fn from_point(point: &TimeSeriesPoint) -> Self {
        let signups = point.count("signup");
        let trials = point.count("free_trial");
        let purchases = point.count("purchase");
        let total: u64 = point.event_counts.values().sum();
        Self {
            date: point.date.format("%Y-%m-%d").to_string(),
            signups,
            trials,
            purchases,
            other: total - signups - trials - purchases,
        }
    }
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("expected YYYY-MM-DD, got '{value}'"),
    })
}

pub async fn handle(
    dashboard: &Dashboard,
    args: &SeriesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let start = if args.from_code_history {
        earliest_start_date(&dashboard.store().codes()).map(|dt| dt.date_naive())
    } else {
        args.start
            .as_deref()
            .map(|s| parse_date(s, "--start"))
            .transpose()?
    };
    let end = args
        .end
        .as_deref()
        .map(|s| parse_date(s, "--end"))
        .transpose()?;

    // Explicit bounds need a rebuild; otherwise the connect-time refresh
    // already populated the store.
    let series: Vec<TimeSeriesPoint> = if start.is_some() || end.is_some() {
        dashboard.series_with_range(start, end).await?
    } else {
        dashboard.store().series().as_ref().clone()
    };

    let out = output::render_list(
        &global.output,
        &series,
        SeriesRow::from_point,
        |p| p.date.format("%Y-%m-%d").to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
