#![deny(warnings)]

//! Maintenance economics for the fleet simulator.
//!
//! This crate provides:
//! - Strategy policies and their cost, failure-rate and life multipliers
//! - The wear & failure model projecting one asset to a horizon month
//! - Fleet KPI aggregation, including ROI against a reactive baseline

pub mod kpi;
pub mod strategy;
pub mod wear;

pub use kpi::{aggregate, reactive_baseline, return_on_investment};
pub use strategy::{ParseStrategyError, Strategy, StrategyPolicy};
pub use wear::{age_factor, cumulative_risk, health_percent, monthly_failure_probability, WearModel};

use fleet_core::ValidationError;
use thiserror::Error;

/// Errors produced while projecting assets.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// Requested horizon lies outside `[0, max]`.
    #[error("horizon of {requested} months is outside [0, {max}]")]
    InvalidHorizon { requested: u32, max: u32 },
    /// Catalog or configuration problem, e.g. a missing fault table.
    #[error(transparent)]
    Configuration(#[from] ValidationError),
}
