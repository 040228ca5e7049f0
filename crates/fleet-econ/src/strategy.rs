//! Maintenance strategies and the multipliers they apply.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Health restored per month by condition-based interventions.
const PREDICTIVE_RESTORE_PER_MONTH: f64 = 0.2;
/// Health lost per month to skipped lubrication and tuning.
const REACTIVE_NEGLECT_PER_MONTH: f64 = 0.5;

/// A named maintenance policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Run to failure; almost no planned spend.
    Reactive,
    /// Calendar-based service.
    #[default]
    Preventive,
    /// Condition monitoring with targeted interventions.
    Predictive,
}

/// Multipliers a strategy applies to spend, failure rate and useful life.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyPolicy {
    pub strategy: Strategy,
    /// Scales the monthly preventive budget.
    pub preventive_cost_multiplier: Decimal,
    /// Scales the monthly failure probability.
    pub failure_rate_multiplier: f64,
    /// Scales useful life for wear purposes.
    pub life_extension_factor: f64,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Reactive, Strategy::Preventive, Strategy::Predictive];

    pub fn policy(self) -> StrategyPolicy {
        let (pm, failure, life) = match self {
            Strategy::Reactive => (Decimal::new(1, 1), 2.5, 0.8),
            Strategy::Preventive => (Decimal::ONE, 1.0, 1.0),
            // sensors and analytics cost more up front
            Strategy::Predictive => (Decimal::new(14, 1), 0.2, 1.25),
        };
        StrategyPolicy {
            strategy: self,
            preventive_cost_multiplier: pm,
            failure_rate_multiplier: failure,
            life_extension_factor: life,
        }
    }

    /// Linear health correction accumulated over `months`.
    pub fn health_correction(self, months: u32) -> f64 {
        let m = f64::from(months);
        match self {
            Strategy::Reactive => -m * REACTIVE_NEGLECT_PER_MONTH,
            Strategy::Preventive => 0.0,
            Strategy::Predictive => m * PREDICTIVE_RESTORE_PER_MONTH,
        }
    }

    /// Whether the strategy pays for scheduled service and a preventive budget.
    pub fn funds_preventive_maintenance(self) -> bool {
        self != Strategy::Reactive
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Reactive => "REACTIVE",
            Strategy::Preventive => "PREVENTIVE",
            Strategy::Predictive => "PREDICTIVE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown strategy: {0} (expected reactive, preventive or predictive)")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reactive" => Ok(Strategy::Reactive),
            "preventive" => Ok(Strategy::Preventive),
            "predictive" => Ok(Strategy::Predictive),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}
