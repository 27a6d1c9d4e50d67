//! Domain types and pure logic for location-aware listing resolution.
//!
//! Everything here is synchronous and side-effect free apart from
//! [`load_app_config`], which reads the process environment.

pub mod app_config;
pub mod classify;
pub mod config;
pub mod filter;
pub mod geo;
pub mod hours;
pub mod optimistic;
pub mod record;
pub mod sort;

#[cfg(test)]
mod testing;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use classify::{classify, provenance_for, within_radius};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{LocationFilter, SortKey, ALL_CATEGORIES};
pub use geo::{distance_km, GeoPoint, EARTH_RADIUS_KM};
pub use hours::{DayHours, HoursError, WeeklySchedule};
pub use optimistic::{reduce, LikeSnapshot, LikeState, ToggleAction, TogglePhase};
pub use record::{ListingKind, LocatableRecord, Provenance, RatingSummary, ResolvedRecord};
pub use sort::sort_records;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sort key: {0}")]
    InvalidSortKey(String),
}
