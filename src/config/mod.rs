//! Tariff dataset loading and indexing.
//!
//! The raw [`TariffDataset`] is loaded once (see [`ConfigLoader`]) and turned
//! into a read-only [`TariffIndex`] that every calculation queries.
//!
//! # Example
//!
//! ```no_run
//! use tariff_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/tariff.json").unwrap();
//! println!("Weekly hours: {}", config.index().weekly_hours());
//! ```

mod index;
mod loader;
mod series;
mod types;

pub use index::{ResolvedRate, TariffIndex};
pub use loader::ConfigLoader;
pub use series::{DatedSeries, resolve_position};
pub use types::{
    DatedAmount, LevelFactors, OnCallRateVersion, OnCallRates, TariffDataset, WageTable,
    WageTableVersion,
};
