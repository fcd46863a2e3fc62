//! `stats`: aggregated dashboard summary.

use std::fmt::Write as _;

use serde::Serialize;

use referly_core::{Dashboard, DashboardStats, EventUnionMap, display_label};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Stats plus the event display-name union, serialized together.
#[derive(Serialize)]
struct StatsView<'a> {
    #[serde(flatten)]
    stats: &'a DashboardStats,
    event_meta: &'a EventUnionMap,
}

pub fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = dashboard.store().stats();
    let union = dashboard.store().event_union();

    let view = StatsView {
        stats: &stats,
        event_meta: &union,
    };

    let out = output::render_single(
        &global.output,
        &view,
        |v| render_detail(v.stats, v.event_meta),
        |v| format!("{:.2}", v.stats.total_earnings.total),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_detail(stats: &DashboardStats, union: &EventUnionMap) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "Codes     {} total ({} active, {} inactive, {} exhausted)",
        stats.total_codes, stats.active_codes, stats.inactive_codes, stats.exhausted_codes
    );
    let _ = writeln!(
        s,
        "Earnings  {:.2} {}",
        stats.total_earnings.total, stats.total_earnings.currency
    );
    for (event, amount) in &stats.total_earnings.breakdown {
        let _ = writeln!(s, "  {:<24} {:>10.2}", display_label(union, event), amount);
    }
    let _ = writeln!(s, "Events");
    for (event, count) in &stats.event_stats {
        let _ = writeln!(s, "  {:<24} {:>10}", display_label(union, event), count);
    }
    s.truncate(s.trim_end().len());
    s
}
