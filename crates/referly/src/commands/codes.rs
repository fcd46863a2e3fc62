//! `codes`: filterable, sortable referral-code listing.

use tabled::Tabled;

use referly_core::{
    Dashboard, FilterKey, ReferralCode, SortConfig, SortDirection, SortKey, filter_codes,
    sort_codes,
};

use crate::cli::{CodesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

const FILTER_KEYS: &[FilterKey] = &[FilterKey::Code, FilterKey::Id, FilterKey::Status];

#[derive(Tabled)]
struct CodeRow {
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "SIGNUPS")]
    signups: u64,
    #[tabled(rename = "CONVERSIONS")]
    conversions: u64,
    #[tabled(rename = "EARNINGS")]
    earnings: String,
    #[tabled(rename = "QUOTA")]
    quota: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

impl CodeRow {
    fn from_code(code: &ReferralCode, color: bool) -> Self {
        Self {
            code: code.code.clone(),
            status: output::paint_status(code.status, color),
            signups: code.signups(),
            conversions: code.total_conversions(),
            earnings: format!("{:.2} {}", code.earnings.total, code.earnings.currency),
            quota: code.quota.map_or_else(|| "-".into(), |q| q.to_string()),
            created: code.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

pub fn handle(
    dashboard: &Dashboard,
    args: &CodesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = dashboard.store().codes();

    let mut codes: Vec<ReferralCode> = match &args.filter {
        Some(term) => filter_codes(&snapshot, term, FILTER_KEYS),
        None => snapshot.as_ref().clone(),
    };

    if let Some(ref sort) = args.sort {
        let key: SortKey = sort.parse().map_err(|_| CliError::Validation {
            field: "--sort".into(),
            reason: format!(
                "unknown sort key '{sort}' (expected one of: code, status, created-at, \
                 signups, total-conversions, earnings, total-referrals, quota, \
                 start-date, end-date)"
            ),
        })?;
        let mut config = SortConfig::new(key);
        if args.desc {
            config.direction = SortDirection::Descending;
        }
        sort_codes(&mut codes, config);
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &codes,
        |c| CodeRow::from_code(c, color),
        |c| c.code.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
