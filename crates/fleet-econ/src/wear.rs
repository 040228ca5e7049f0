//! Wear & failure model.
//!
//! Projects a single asset to a horizon month as a pure function of the
//! asset, the strategy and the month count. The only randomness is the fault
//! pick for a failed asset, taken from the caller's RNG, so a seeded RNG per
//! `(asset, month)` makes any horizon point exactly reproducible.

use crate::{ModelError, Strategy};
use fleet_core::{
    AssetTemplate, Condition, EngineConfig, FaultTable, OperationalStatus, ProjectedAssetState,
    SimulatedAsset,
};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;

/// Health lost per month at the lowest wear tier, before acceleration.
const NOMINAL_DEGRADATION_PERCENT: f64 = 0.5;

/// Wear acceleration tier: 1.0 below half life, 1.5 below 80%, 3.0 beyond.
pub fn age_factor(life_ratio: f64) -> f64 {
    if life_ratio < 0.5 {
        1.0
    } else if life_ratio < 0.8 {
        1.5
    } else {
        3.0
    }
}

/// Health in [0, 100] from the life ratio plus a strategy correction.
pub fn health_percent(life_ratio: f64, correction: f64) -> f64 {
    let h = 100.0 - life_ratio * 100.0 + correction;
    if h.is_nan() {
        return 0.0;
    }
    h.clamp(0.0, 100.0)
}

/// Monthly failure probability: inverse health per mille, scaled by the
/// strategy's failure-rate multiplier and capped at 1.
pub fn monthly_failure_probability(health_percent: f64, failure_rate_multiplier: f64) -> f64 {
    ((100.0 - health_percent) / 1000.0 * failure_rate_multiplier).clamp(0.0, 1.0)
}

/// Probability of at least one failure in `months` independent months.
pub fn cumulative_risk(monthly_probability: f64, months: u32) -> f64 {
    let survive = (1.0 - monthly_probability).powi(months.min(i32::MAX as u32) as i32);
    (1.0 - survive).clamp(0.0, 1.0)
}

/// Projects assets with a fixed configuration and fault table.
#[derive(Clone, Copy, Debug)]
pub struct WearModel<'a> {
    config: &'a EngineConfig,
    faults: &'a FaultTable,
}

impl<'a> WearModel<'a> {
    pub fn new(config: &'a EngineConfig, faults: &'a FaultTable) -> Self {
        Self { config, faults }
    }

    /// Baseline hours plus nominal utilization over `months`.
    pub fn total_hours(&self, asset: &SimulatedAsset, months: u32) -> f64 {
        f64::from(asset.baseline_usage_hours) + f64::from(months) * f64::from(self.config.hours_per_month)
    }

    /// Total hours over strategy-adjusted useful life; 0 when the adjusted
    /// life is not positive.
    pub fn life_ratio(
        &self,
        asset: &SimulatedAsset,
        template: &AssetTemplate,
        strategy: Strategy,
        months: u32,
    ) -> f64 {
        let effective_life =
            f64::from(template.useful_life_hours) * strategy.policy().life_extension_factor;
        if effective_life <= 0.0 {
            return 0.0;
        }
        self.total_hours(asset, months) / effective_life
    }

    /// Baseline hours over nominal useful life, ignoring strategy.
    fn baseline_ratio(&self, asset: &SimulatedAsset, template: &AssetTemplate) -> f64 {
        if template.useful_life_hours == 0 {
            return 0.0;
        }
        f64::from(asset.baseline_usage_hours) / f64::from(template.useful_life_hours)
    }

    /// Project `asset` to `months` under `strategy`.
    ///
    /// Month 0 is the reset state: health from baseline hours against nominal
    /// life (the same under every strategy),
    /// operational, no cost. `rng` is consulted only to pick the fault of a
    /// failed asset.
    pub fn project<R: Rng + ?Sized>(
        &self,
        asset: &SimulatedAsset,
        template: &AssetTemplate,
        strategy: Strategy,
        months: u32,
        rng: &mut R,
    ) -> Result<ProjectedAssetState, ModelError> {
        let max = self.config.max_horizon_months;
        if months > max {
            return Err(ModelError::InvalidHorizon {
                requested: months,
                max,
            });
        }
        let policy = strategy.policy();
        let total_hours = self.total_hours(asset, months);
        let life_ratio = self.life_ratio(asset, template, strategy, months);
        let age = age_factor(life_ratio);
        let over_life = total_hours > f64::from(template.useful_life_hours);
        let run_to_failure = !strategy.funds_preventive_maintenance();

        if months == 0 {
            let health = health_percent(self.baseline_ratio(asset, template), 0.0);
            let status = OperationalStatus::Operational;
            return Ok(ProjectedAssetState {
                asset_id: asset.id.clone(),
                model: asset.model.clone(),
                asset_type: asset.asset_type,
                total_hours,
                life_ratio,
                age_factor: age,
                monthly_degradation_percent: NOMINAL_DEGRADATION_PERCENT * age,
                health_percent: health,
                cumulative_risk: 0.0,
                status,
                active_fault: None,
                accumulated_cost: Decimal::ZERO,
                downtime_cost: Decimal::ZERO,
                over_life,
                condition: Condition::classify(status, health, run_to_failure),
            });
        }

        let health = health_percent(life_ratio, strategy.health_correction(months));
        let p = monthly_failure_probability(health, policy.failure_rate_multiplier);
        let risk = cumulative_risk(p, months);

        let cfg = self.config;
        let rate = template.cost_per_operating_hour;
        let months_dec = Decimal::from(months);
        let mut cost =
            Decimal::from(cfg.hours_per_month) * months_dec * rate * cfg.fuel_cost_fraction;
        let mut downtime_cost = Decimal::ZERO;
        let mut active_fault = None;

        let status = if risk > cfg.failure_risk_threshold && health < cfg.failure_health_threshold {
            let faults = self.faults.resolve(asset.asset_type)?;
            let fault = faults[rng.gen_range(0..faults.len())].clone();
            downtime_cost = rate * Decimal::from(fault.downtime_hours) * cfg.downtime_loss_multiplier;
            cost += fault.repair_cost + downtime_cost;
            debug!(asset = %asset.id, code = %fault.code, months, health, risk, "asset failed");
            active_fault = Some(fault);
            OperationalStatus::Down
        } else if health < cfg.maintenance_health_threshold && !run_to_failure {
            cost += cfg.standard_service_cost;
            OperationalStatus::Maintenance
        } else {
            OperationalStatus::Operational
        };

        if !run_to_failure {
            cost += months_dec * cfg.preventive_budget_per_month * policy.preventive_cost_multiplier;
        }

        Ok(ProjectedAssetState {
            asset_id: asset.id.clone(),
            model: asset.model.clone(),
            asset_type: asset.asset_type,
            total_hours,
            life_ratio,
            age_factor: age,
            monthly_degradation_percent: NOMINAL_DEGRADATION_PERCENT * age,
            health_percent: health,
            cumulative_risk: risk,
            status,
            active_fault,
            accumulated_cost: cost,
            downtime_cost,
            over_life,
            condition: Condition::classify(status, health, run_to_failure),
        })
    }
}
