//! Fleet KPI aggregation.

use fleet_core::{EngineConfig, FleetKpis, OperationalStatus, ProjectedAssetState};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Cost an all-reactive fleet is assumed to incur over `months`.
pub fn reactive_baseline(months: u32, config: &EngineConfig) -> Decimal {
    Decimal::from(months) * config.reactive_baseline_per_month
}

/// ROI in percent: (baseline - cost) / cost * 100.
///
/// Returns 0 when `total_cost` is zero or the ratio is not representable.
///
/// Example:
/// let roi = return_on_investment(Decimal::new(150, 0), Decimal::new(100, 0));
/// assert_eq!(roi, 50.0);
pub fn return_on_investment(baseline: Decimal, total_cost: Decimal) -> f64 {
    if total_cost.is_zero() {
        return 0.0;
    }
    (baseline - total_cost)
        .checked_div(total_cost)
        .and_then(|r| r.to_f64())
        .map(|r| r * 100.0)
        .unwrap_or(0.0)
}

/// Reduce per-asset states at horizon `months` into fleet KPIs.
///
/// An empty fleet yields all-zero KPIs.
pub fn aggregate(states: &[ProjectedAssetState], months: u32, config: &EngineConfig) -> FleetKpis {
    if states.is_empty() {
        return FleetKpis::default();
    }
    let mut accumulated = Decimal::ZERO;
    let mut downtime = Decimal::ZERO;
    let mut critical: u32 = 0;
    let mut health_sum = 0.0;
    for s in states {
        accumulated += s.accumulated_cost;
        health_sum += s.health_percent;
        if s.status == OperationalStatus::Down {
            downtime += s.downtime_cost;
            critical = critical.saturating_add(1);
        }
    }
    let opex = accumulated - downtime;
    let total = opex + downtime;
    let avg = (health_sum / states.len() as f64).floor().clamp(0.0, 100.0) as u32;

    FleetKpis {
        total_operating_expense: opex,
        total_downtime_cost: downtime,
        total_cost: total,
        return_on_investment_percent: return_on_investment(reactive_baseline(months, config), total),
        critical_event_count: critical,
        average_fleet_health_percent: avg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Strategy, WearModel};
    use chrono::NaiveDate;
    use fleet_core::{generate_fleet, Catalog};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn project_all(seed: u64, strategy: Strategy, months: u32) -> Vec<ProjectedAssetState> {
        let catalog = Catalog::standard();
        let cfg = EngineConfig::default();
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let fleet = generate_fleet(&catalog.templates, 16, Some(seed), as_of, &cfg).unwrap();
        let model = WearModel::new(&cfg, &catalog.faults);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        fleet
            .iter()
            .map(|a| {
                let t = catalog.template_for(a).unwrap();
                model.project(a, t, strategy, months, &mut rng).unwrap()
            })
            .collect()
    }

    #[test]
    fn roi_examples() {
        assert_eq!(
            return_on_investment(Decimal::new(150, 0), Decimal::new(100, 0)),
            50.0
        );
        assert_eq!(return_on_investment(Decimal::ZERO, Decimal::ZERO), 0.0);
        assert!(return_on_investment(Decimal::new(50, 0), Decimal::new(100, 0)) < 0.0);
    }

    #[test]
    fn empty_fleet_is_all_zero() {
        let k = aggregate(&[], 12, &EngineConfig::default());
        assert_eq!(k, FleetKpis::default());
    }

    #[test]
    fn month_zero_roi_is_zero() {
        let states = project_all(42, Strategy::Predictive, 0);
        let k = aggregate(&states, 0, &EngineConfig::default());
        assert_eq!(k.return_on_investment_percent, 0.0);
        assert_eq!(k.total_cost, Decimal::ZERO);
        assert_eq!(k.critical_event_count, 0);
    }

    #[test]
    fn single_asset_roi_matches_hand_calculation() {
        let states = project_all(3, Strategy::Preventive, 12);
        let one = &states[..1];
        let k = aggregate(one, 12, &EngineConfig::default());
        let cost = one[0].accumulated_cost.to_f64().unwrap();
        let expected = (12.0 * 65_000.0 - cost) / cost * 100.0;
        assert!((k.return_on_investment_percent - expected).abs() < 1e-6);
    }

    #[test]
    fn average_health_is_floored() {
        let mut states = project_all(5, Strategy::Preventive, 6);
        states.truncate(2);
        states[0].health_percent = 50.9;
        states[1].health_percent = 50.0;
        let k = aggregate(&states, 6, &EngineConfig::default());
        assert_eq!(k.average_fleet_health_percent, 50);
    }

    #[test]
    fn reactive_fleet_at_full_horizon_has_critical_events() {
        let states = project_all(11, Strategy::Reactive, 36);
        let k = aggregate(&states, 36, &EngineConfig::default());
        let down: Vec<_> = states
            .iter()
            .filter(|s| s.status == OperationalStatus::Down)
            .collect();
        assert!(!down.is_empty());
        assert_eq!(k.critical_event_count as usize, down.len());
        let dt: Decimal = down.iter().map(|s| s.downtime_cost).sum();
        assert_eq!(k.total_downtime_cost, dt);
        assert!(k.total_downtime_cost > Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn totals_reconcile(
            seed in any::<u64>(),
            months in 0u32..=36,
            strategy in prop::sample::select(Strategy::ALL.to_vec()),
        ) {
            let states = project_all(seed, strategy, months);
            let k = aggregate(&states, months, &EngineConfig::default());
            let sum: Decimal = states.iter().map(|s| s.accumulated_cost).sum();
            prop_assert_eq!(k.total_cost, sum);
            prop_assert_eq!(k.total_operating_expense + k.total_downtime_cost, sum);
            prop_assert!(k.average_fleet_health_percent <= 100);
            if months == 0 {
                prop_assert_eq!(k.return_on_investment_percent, 0.0);
            }
        }
    }
}
