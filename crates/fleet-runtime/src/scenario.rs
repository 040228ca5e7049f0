//! YAML scenario files: fleet size, seed, strategy, horizon and overrides.

use crate::{ControllerError, HorizonController};
use chrono::NaiveDate;
use fleet_core::{generate_fleet, Catalog, EngineConfig};
use fleet_econ::Strategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const DEFAULT_FLEET_SIZE: usize = 16;

/// Inputs for one simulation session.
///
/// Missing fields fall back to defaults; an absent catalog means the
/// standard eight-template catalog.
///
/// Example:
/// let s = Scenario::from_yaml_str("seed: 7\nstrategy: REACTIVE\n")?;
/// let ctl = s.build(as_of)?;
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: Option<String>,
    /// Seeds both fleet generation and fault draws. Unseeded runs are not
    /// reproducible.
    pub seed: Option<u64>,
    pub fleet_size: usize,
    pub strategy: Strategy,
    pub horizon_months: u32,
    pub engine: EngineConfig,
    pub catalog: Catalog,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: None,
            seed: None,
            fleet_size: DEFAULT_FLEET_SIZE,
            strategy: Strategy::default(),
            horizon_months: 0,
            engine: EngineConfig::default(),
            catalog: Catalog::standard(),
        }
    }
}

impl Scenario {
    pub fn from_yaml_str(s: &str) -> Result<Self, ControllerError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ControllerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scenario = Self::from_yaml_str(&text)?;
        info!(path = %path.display(), name = ?scenario.name, "loaded scenario");
        Ok(scenario)
    }

    /// Generate the fleet and hand it to a controller positioned at the
    /// scenario's strategy and horizon.
    pub fn build(&self, as_of: NaiveDate) -> Result<HorizonController, ControllerError> {
        let draw_seed = self.seed.unwrap_or_else(rand::random);
        let fleet = generate_fleet(
            &self.catalog.templates,
            self.fleet_size,
            Some(draw_seed),
            as_of,
            &self.engine,
        )?;
        let mut ctl = HorizonController::new(
            self.catalog.clone(),
            fleet,
            self.engine.clone(),
            as_of,
            draw_seed,
        )?;
        if self.strategy != ctl.strategy() {
            ctl.set_strategy(self.strategy)?;
        }
        if self.horizon_months != 0 {
            ctl.set_horizon(self.horizon_months)?;
        }
        Ok(ctl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::ValidationError;
    use fleet_econ::ModelError;
    use rust_decimal::Decimal;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn loads_default_scenario_asset() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/scenarios/default.yaml");
        let s = Scenario::load(path).expect("load default scenario");
        assert_eq!(s.seed, Some(20240501));
        assert_eq!(s.fleet_size, 16);
        assert_eq!(s.strategy, Strategy::Preventive);
        assert_eq!(s.catalog, Catalog::standard());
        let ctl = s.build(as_of()).unwrap();
        assert_eq!(ctl.fleet().len(), 16);
        assert_eq!(ctl.horizon(), s.horizon_months);
    }

    #[test]
    fn lighting_only_catalog_falls_back_to_heavy_machinery_faults() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../assets/scenarios/lighting_retrofit.yaml"
        );
        let s = Scenario::load(path).unwrap();
        assert_eq!(s.catalog.templates.len(), 1);
        let ctl = s.build(as_of()).unwrap();
        assert_eq!(ctl.fleet()[0].id.0, "MUS-1000");
        assert_eq!(ctl.horizon(), 24);
        for state in &ctl.projection().per_asset {
            if let Some(f) = &state.active_fault {
                assert!(f.code == "E04" || f.code == "E12");
            }
        }
    }

    #[test]
    fn empty_document_uses_defaults() {
        let s = Scenario::from_yaml_str("{}").unwrap();
        assert_eq!(s, Scenario::default());
    }

    #[test]
    fn engine_overrides_are_partial() {
        let s = Scenario::from_yaml_str(
            "seed: 3\nengine:\n  hours_per_month: 160\n  standard_service_cost: 2500\n",
        )
        .unwrap();
        assert_eq!(s.engine.hours_per_month, 160);
        assert_eq!(s.engine.standard_service_cost, Decimal::new(2500, 0));
        assert_eq!(s.engine.max_horizon_months, 36);
    }

    #[test]
    fn same_seed_builds_same_session() {
        let s = Scenario::from_yaml_str("seed: 99\nstrategy: REACTIVE\nhorizon_months: 18\n").unwrap();
        let a = s.build(as_of()).unwrap();
        let b = s.build(as_of()).unwrap();
        assert_eq!(a.fleet(), b.fleet());
        assert_eq!(a.projection(), b.projection());
        assert_eq!(a.projection().strategy, Strategy::Reactive);
    }

    #[test]
    fn malformed_yaml_is_a_scenario_error() {
        let err = Scenario::from_yaml_str("fleet_size: [oops").unwrap_err();
        assert!(matches!(err, ControllerError::Scenario(_)));
        let err = Scenario::from_yaml_str("strategy: SOMETIMES").unwrap_err();
        assert!(matches!(err, ControllerError::Scenario(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Scenario::load("/nonexistent/fleet.yaml").unwrap_err();
        assert!(matches!(err, ControllerError::Io(_)));
    }

    #[test]
    fn horizon_beyond_max_fails_build() {
        let s = Scenario::from_yaml_str("seed: 1\nhorizon_months: 48\n").unwrap();
        assert!(matches!(
            s.build(as_of()),
            Err(ControllerError::Model(ModelError::InvalidHorizon { requested: 48, .. }))
        ));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let s = Scenario::from_yaml_str("seed: 1\ncatalog:\n  templates: []\n  faults: {}\n").unwrap();
        assert!(matches!(
            s.build(as_of()),
            Err(ControllerError::Validation(ValidationError::EmptyCatalog))
        ));
    }
}
