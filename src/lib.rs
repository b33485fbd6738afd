//! # Rental Finance Engine
//!
//! Derives the numbers a small-landlord dashboard shows from a snapshot of
//! rental records: properties, rooms, tenants, suppliers and transactions.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: The complete record set, passed explicitly to every computation
//! - **Period**: Month to date, the previous full month, or the whole history
//! - **Obligation**: Rent or a scheduled bill expected on a due day of each month
//! - **Alerts**: Obligations of the current month already past their due day and unpaid
//! - **Forecast**: Obligations falling due in the next few days with nothing recorded yet
//!
//! Everything takes `today` as an argument; nothing reads the system clock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rental_finance_engine::*;
//! use chrono::NaiveDate;
//!
//! let snapshot = Snapshot::from_json(&std::fs::read_to_string("backup.json")?)?;
//! let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
//!
//! let engine = DashboardEngine::new(DashboardConfig::default())?;
//! let state = engine.derive(&snapshot, today);
//!
//! println!("{}: profit {:.2}", state.period.label, state.stats.profit);
//! for alert in &state.alerts.alerts {
//!     println!("overdue: {} ({})", alert.title, alert.amount);
//! }
//!
//! let draft = engine.prefill(&snapshot, TransactionType::Revenue, today);
//! ```

pub mod aggregator;
pub mod alerts;
pub mod backup;
pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod interval;
pub mod period;
pub mod predictor;
pub mod schema;
pub mod seed;
pub mod trend;
pub mod utils;

#[cfg(feature = "remote")]
pub mod sync;

pub use aggregator::{
    compute_dashboard_stats, Aggregator, DashboardStats, Occupancy, PeriodTotals,
};
pub use alerts::{detect_overdue, Alert, AlertKind, AlertReport, LinkedEntity};
pub use backup::SnapshotPatch;
pub use config::DashboardConfig;
pub use error::{RentalFinanceError, Result};
pub use export::write_tsv;
pub use forecast::{build_forecast, ForecastItem, DEFAULT_FORECAST_WINDOW_DAYS};
pub use interval::{days_in_period, intersection_days};
pub use period::{resolve_period, PeriodMode, ResolvedPeriod};
pub use predictor::{predict_next_transaction, TransactionDraft};
pub use schema::*;
pub use seed::SeedGenerator;
pub use trend::{build_trend, TrendPoint};
pub use utils::*;

#[cfg(feature = "remote")]
pub use sync::RemoteSource;

use chrono::NaiveDate;
use log::{debug, info};
use rand::Rng;
use serde::Serialize;

/// Everything the dashboard screen shows for one property filter and period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    pub period: ResolvedPeriod,
    pub stats: DashboardStats,
    /// Transactions in the period, newest first.
    pub movements: Vec<Transaction>,
    pub alerts: AlertReport,
    pub forecast: Vec<ForecastItem>,
}

pub struct DashboardEngine {
    config: DashboardConfig,
}

impl DashboardEngine {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn derive(&self, snapshot: &Snapshot, today: NaiveDate) -> DashboardState {
        let filter = &self.config.property_filter;
        let period = resolve_period(self.config.period_mode, today);

        info!(
            "Deriving dashboard for {:?} over '{}' ({} to {}) as of {}",
            filter, period.label, period.start, period.end, today
        );

        let aggregator = Aggregator::new(snapshot, filter, today);
        let stats = aggregator.stats(&period);
        let movements = aggregator.movements(&period);
        let alerts = detect_overdue(snapshot, filter, today);
        let forecast = build_forecast(snapshot, filter, today, self.config.forecast_window_days);

        debug!(
            "{} movements, {} alerts (pending {:.2}), {} forecast entries",
            movements.len(),
            alerts.alerts.len(),
            alerts.pending_total,
            forecast.len()
        );

        DashboardState {
            period,
            stats,
            movements,
            alerts,
            forecast,
        }
    }

    /// Prefilled form for the next transaction of `kind`.
    pub fn prefill(
        &self,
        snapshot: &Snapshot,
        kind: TransactionType,
        today: NaiveDate,
    ) -> TransactionDraft {
        predict_next_transaction(snapshot, kind, today)
    }

    /// Demo history for `snapshot`, newest first.
    pub fn seed<R: Rng + ?Sized>(
        &self,
        snapshot: &Snapshot,
        today: NaiveDate,
        rng: &mut R,
    ) -> Vec<Transaction> {
        SeedGenerator::new(self.config.seed_supplier_start).generate(snapshot, today, rng)
    }
}

pub fn derive_dashboard(
    snapshot: &Snapshot,
    config: &DashboardConfig,
    today: NaiveDate,
) -> Result<DashboardState> {
    let engine = DashboardEngine::new(config.clone())?;
    Ok(engine.derive(snapshot, today))
}
