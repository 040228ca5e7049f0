//! Engine constants, overridable from a scenario file.

use crate::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunable constants of the wear, cost and playback models.
///
/// Every field has a default, so a scenario only needs to list overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nominal operating hours added per simulated month.
    pub hours_per_month: u32,
    /// Nominal operating hours per year, used to back-date purchases.
    pub annual_utilization_hours: u32,
    /// Lower bound (inclusive) of the generated share of useful life consumed.
    pub utilization_ratio_min: f64,
    /// Upper bound (exclusive) of the generated share of useful life consumed.
    pub utilization_ratio_max: f64,
    /// Last service dates are drawn from this many days before generation.
    pub service_window_days: u32,
    /// Furthest month the horizon may reach.
    pub max_horizon_months: u32,
    /// Cumulative risk above which a low-health asset fails.
    pub failure_risk_threshold: f64,
    /// Health below which an asset is eligible to fail.
    pub failure_health_threshold: f64,
    /// Health below which a maintained asset is in service.
    pub maintenance_health_threshold: f64,
    /// Flat cost of a standard service visit.
    pub standard_service_cost: Decimal,
    /// Monthly preventive budget per asset before the strategy multiplier.
    pub preventive_budget_per_month: Decimal,
    /// Lost-production multiplier applied to downtime hours.
    pub downtime_loss_multiplier: Decimal,
    /// Share of the hourly rate spent on fuel and fluids.
    pub fuel_cost_fraction: Decimal,
    /// Monthly cost of an all-reactive fleet, the ROI reference.
    pub reactive_baseline_per_month: Decimal,
    /// Auto-advance period at 1x speed, in milliseconds.
    pub base_tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hours_per_month: 200,
            annual_utilization_hours: 2000,
            utilization_ratio_min: 0.1,
            utilization_ratio_max: 0.6,
            service_window_days: 90,
            max_horizon_months: 36,
            failure_risk_threshold: 0.7,
            failure_health_threshold: 40.0,
            maintenance_health_threshold: 60.0,
            standard_service_cost: Decimal::new(2000, 0),
            preventive_budget_per_month: Decimal::new(500, 0),
            downtime_loss_multiplier: Decimal::new(3, 0),
            fuel_cost_fraction: Decimal::new(1, 1), // 0.1
            reactive_baseline_per_month: Decimal::new(65_000, 0),
            base_tick_interval_ms: 600,
        }
    }
}

/// Validate engine configuration ranges.
pub fn validate_config(c: &EngineConfig) -> Result<(), ValidationError> {
    if c.hours_per_month == 0 {
        return Err(ValidationError::InvalidConfig("hours_per_month must be > 0"));
    }
    if c.annual_utilization_hours == 0 {
        return Err(ValidationError::InvalidConfig(
            "annual_utilization_hours must be > 0",
        ));
    }
    let (lo, hi) = (c.utilization_ratio_min, c.utilization_ratio_max);
    if !(lo.is_finite() && hi.is_finite()) || lo < 0.0 || lo >= hi {
        return Err(ValidationError::InvalidConfig(
            "utilization ratio range must satisfy 0 <= min < max",
        ));
    }
    if c.max_horizon_months == 0 {
        return Err(ValidationError::InvalidConfig("max_horizon_months must be > 0"));
    }
    if !(0.0..=1.0).contains(&c.failure_risk_threshold) {
        return Err(ValidationError::InvalidConfig(
            "failure_risk_threshold must be within [0,1]",
        ));
    }
    if !(c.failure_health_threshold.is_finite() && c.maintenance_health_threshold.is_finite()) {
        return Err(ValidationError::InvalidConfig("health thresholds must be finite"));
    }
    for money in [
        c.standard_service_cost,
        c.preventive_budget_per_month,
        c.downtime_loss_multiplier,
        c.fuel_cost_fraction,
        c.reactive_baseline_per_month,
    ] {
        if money < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney("engine config".into()));
        }
    }
    if c.base_tick_interval_ms == 0 {
        return Err(ValidationError::InvalidConfig("base_tick_interval_ms must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        validate_config(&EngineConfig::default()).unwrap();
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{"hours_per_month": 160}"#).unwrap();
        assert_eq!(c.hours_per_month, 160);
        assert_eq!(c.max_horizon_months, 36);
        assert_eq!(c.standard_service_cost, Decimal::new(2000, 0));
    }

    #[test]
    fn inverted_ratio_range_rejected() {
        let c = EngineConfig {
            utilization_ratio_min: 0.6,
            utilization_ratio_max: 0.1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            validate_config(&c),
            Err(ValidationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn nan_risk_threshold_rejected() {
        let c = EngineConfig {
            failure_risk_threshold: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(validate_config(&c).is_err());
    }
}
