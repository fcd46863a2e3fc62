//! Domain layer between `referly-api` and UI consumers.
//!
//! This crate owns the business logic, domain model, and reactive data
//! infrastructure for the affiliate dashboard workspace:
//!
//! - **[`Dashboard`]** — Central facade managing the session lifecycle:
//!   [`connect()`](Dashboard::connect) authenticates, performs an initial
//!   refresh, then optionally spawns a periodic refresh task.
//!
//! - **[`DataStore`]** — Reactive storage built on generation-tagged
//!   `tokio::sync::watch` slots. Out-of-order refresh results are
//!   discarded rather than applied last-resolved-wins.
//!
//! - **Transform pipeline** — Pure, synchronous functions: the raw-record
//!   converter ([`convert`]), earnings calculator ([`earnings`]),
//!   dashboard aggregator ([`aggregate`]), event normalizer and
//!   display-name union ([`events`]), daily time-series builder
//!   ([`timeseries`]), and table filter/sort engine ([`filter`]).
//!
//! - **Domain model** ([`model`]) — Canonical types (`ReferralCode`,
//!   `DashboardStats`, `TimeSeriesPoint`, `NormalizedEvent`, ...) with an
//!   open string event vocabulary: new commission-earning activities
//!   arrive through backend configuration, never code changes here.

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod earnings;
pub mod error;
pub mod events;
pub mod filter;
pub mod model;
pub mod store;
pub mod timeseries;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::earliest_start_date;
pub use config::{AuthCredentials, DashboardConfig};
pub use dashboard::{AffiliateIdentity, ConnectionState, Dashboard};
pub use earnings::{calculate_earnings, calculate_total_earnings};
pub use error::CoreError;
pub use events::{build_event_union, display_label, format_event_label};
pub use filter::{FilterKey, SortConfig, SortDirection, SortKey, filter_codes, sort_codes};
pub use store::DataStore;
pub use timeseries::{DateRange, build_time_series, resolve_date_range};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CommissionRule, DashboardStats, EarningsBreakdown, EventMeta, EventSource, EventUnionMap,
    NormalizedEvent, NormalizedUser, ReferralCode, ReferralStatus, TimeSeriesPoint,
};
