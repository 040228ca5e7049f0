#![deny(warnings)]

//! Core domain models and invariants for the fleet lifecycle simulator.
//!
//! This crate defines the serializable asset catalog, fault tables, engine
//! configuration and the derived per-asset / fleet-level result types, with
//! validation helpers that guard the catalog before any simulation run.

pub mod catalog;
pub mod config;
pub mod generator;

pub use catalog::{Catalog, FaultTable, FALLBACK_ASSET_TYPE};
pub use config::{validate_config, EngineConfig};
pub use generator::{generate_fleet, generate_fleet_with_rng};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Catalog model identifier, e.g. "CAT 320 GC".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelId(pub String);

/// Unique identifier of a simulated asset, e.g. "CAT-1000".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Broad asset classes; each class owns a fault table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    /// Excavators, dozers, haulers, lifts.
    HeavyMachinery,
    /// Compressors, generators and other plant equipment.
    FixedEquipment,
    /// Building services such as chillers and switchgear.
    Building,
    /// Site and facility lighting.
    Lighting,
}

impl AssetType {
    /// All asset types in declaration order.
    pub const ALL: [AssetType; 4] = [
        AssetType::HeavyMachinery,
        AssetType::FixedEquipment,
        AssetType::Building,
        AssetType::Lighting,
    ];
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetType::HeavyMachinery => "HEAVY_MACHINERY",
            AssetType::FixedEquipment => "FIXED_EQUIPMENT",
            AssetType::Building => "BUILDING",
            AssetType::Lighting => "LIGHTING",
        };
        f.write_str(s)
    }
}

/// Immutable catalog entry describing an asset model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetTemplate {
    /// Model identifier, unique within a catalog.
    pub model: ModelId,
    /// Human-readable name, e.g. "Hydraulic Excavator".
    pub display_name: String,
    /// Asset class used to pick the fault table.
    pub asset_type: AssetType,
    /// Running cost per operating hour (>= 0).
    pub cost_per_operating_hour: Decimal,
    /// Cost of a like-for-like replacement (>= 0).
    pub replacement_cost: Decimal,
    /// Nominal useful life in operating hours (> 0).
    pub useful_life_hours: u32,
}

/// A failure mode with its direct repair cost and downtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaultDefinition {
    /// Short fault code, e.g. "E04".
    pub code: String,
    /// Description shown alongside the code.
    pub description: String,
    /// Direct repair cost (>= 0).
    pub repair_cost: Decimal,
    /// Hours out of service (> 0).
    pub downtime_hours: u32,
}

/// An asset instance produced by the fleet generator. Never mutated by the
/// simulation; projections are derived from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulatedAsset {
    /// Unique asset id.
    pub id: AssetId,
    /// Reference to the catalog template.
    pub model: ModelId,
    /// Copied from the template for display.
    pub display_name: String,
    /// Copied from the template; selects the fault table.
    pub asset_type: AssetType,
    /// Display-only serial number.
    pub serial_number: String,
    /// Display-only location tag, e.g. "Zone B-02".
    pub location: String,
    /// Operating hours accumulated before the simulation starts.
    pub baseline_usage_hours: u32,
    /// Derived from baseline hours at the nominal annual utilization.
    pub purchase_date: NaiveDate,
    /// Most recent service, within the service window before generation.
    pub last_service_date: NaiveDate,
}

/// Operational status of an asset at a horizon point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationalStatus {
    Operational,
    Maintenance,
    Down,
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationalStatus::Operational => "OPERATIONAL",
            OperationalStatus::Maintenance => "MAINTENANCE",
            OperationalStatus::Down => "DOWN",
        };
        f.write_str(s)
    }
}

/// Coarse health banding used by display layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthBand {
    /// Health above 80%.
    Good,
    /// Health above 40%.
    Watch,
    /// Health at or below 40%.
    Critical,
}

impl HealthBand {
    pub fn from_health(health_percent: f64) -> Self {
        if health_percent > 80.0 {
            Self::Good
        } else if health_percent > 40.0 {
            Self::Watch
        } else {
            Self::Critical
        }
    }
}

/// One-line condition summary for an asset at a horizon point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    /// The asset is down with an active fault.
    Failed,
    /// Health above 90%.
    Optimal,
    /// Health above 60%.
    StandardWear,
    /// Low health under a run-to-failure policy.
    AcceleratedDegradation,
    /// Low health under a policy that schedules service.
    MaintenanceDue,
}

impl Condition {
    /// Classify from status and health. `run_to_failure` is true for the
    /// reactive strategy.
    pub fn classify(status: OperationalStatus, health_percent: f64, run_to_failure: bool) -> Self {
        if status == OperationalStatus::Down {
            Self::Failed
        } else if health_percent > 90.0 {
            Self::Optimal
        } else if health_percent > 60.0 {
            Self::StandardWear
        } else if run_to_failure {
            Self::AcceleratedDegradation
        } else {
            Self::MaintenanceDue
        }
    }
}

/// Derived state of one asset for a `(asset, strategy, months)` triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedAssetState {
    pub asset_id: AssetId,
    pub model: ModelId,
    pub asset_type: AssetType,
    /// Baseline hours plus projected operating hours.
    pub total_hours: f64,
    /// Total hours over strategy-adjusted useful life; may exceed 1.0.
    pub life_ratio: f64,
    /// Wear acceleration tier for the current life ratio.
    pub age_factor: f64,
    /// Nominal monthly degradation scaled by the age factor.
    pub monthly_degradation_percent: f64,
    /// Health in [0, 100].
    pub health_percent: f64,
    /// Probability of at least one failure over the elapsed horizon.
    pub cumulative_risk: f64,
    pub status: OperationalStatus,
    /// Present only when `status` is `Down`.
    pub active_fault: Option<FaultDefinition>,
    /// All cost attributable to the asset at this horizon point.
    pub accumulated_cost: Decimal,
    /// Lost-production share of `accumulated_cost`; zero unless down.
    pub downtime_cost: Decimal,
    /// Total hours exceed the template's nominal useful life.
    pub over_life: bool,
    pub condition: Condition,
}

impl ProjectedAssetState {
    pub fn health_band(&self) -> HealthBand {
        HealthBand::from_health(self.health_percent)
    }
}

/// Fleet-wide KPIs at a horizon point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetKpis {
    /// Accumulated cost excluding lost-production downtime.
    pub total_operating_expense: Decimal,
    /// Lost-production cost of assets that are down.
    pub total_downtime_cost: Decimal,
    /// Operating expense plus downtime cost.
    pub total_cost: Decimal,
    /// Savings against the reactive baseline, in percent of total cost.
    pub return_on_investment_percent: f64,
    /// Number of assets that are down.
    pub critical_event_count: u32,
    /// Mean health, floored.
    pub average_fleet_health_percent: u32,
}

/// Validation errors for catalog, configuration and fleet invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// No templates were supplied but assets were requested.
    #[error("asset catalog is empty")]
    EmptyCatalog,
    /// Model, code or name must not be blank.
    #[error("identifier must not be empty")]
    EmptyIdentifier,
    /// Useful life must be strictly positive.
    #[error("useful life of {0} must be > 0 hours")]
    NonPositiveLife(String),
    /// Price or cost must be non-negative.
    #[error("negative monetary value in {0}")]
    NegativeMoney(String),
    /// Fault downtime must be strictly positive.
    #[error("downtime of fault {0} must be > 0 hours")]
    NonPositiveDowntime(String),
    /// Two templates share a model id.
    #[error("duplicate model: {0}")]
    DuplicateModel(String),
    /// An asset references a model absent from the catalog.
    #[error("unknown model: {0}")]
    UnknownModel(String),
    /// Neither the asset type nor the fallback type has fault definitions.
    #[error("no fault table for {0} and no fallback table available")]
    MissingFaultTable(AssetType),
    /// Engine configuration is out of range.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(&'static str),
    /// A derived date fell outside the representable range.
    #[error("date out of range")]
    DateOutOfRange,
}

/// Validate a template.
pub fn validate_template(t: &AssetTemplate) -> Result<(), ValidationError> {
    if t.model.0.trim().is_empty() || t.display_name.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }
    if t.useful_life_hours == 0 {
        return Err(ValidationError::NonPositiveLife(t.model.0.clone()));
    }
    if t.cost_per_operating_hour < Decimal::ZERO || t.replacement_cost < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(t.model.0.clone()));
    }
    Ok(())
}

/// Validate a fault definition.
pub fn validate_fault(f: &FaultDefinition) -> Result<(), ValidationError> {
    if f.code.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }
    if f.repair_cost < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(f.code.clone()));
    }
    if f.downtime_hours == 0 {
        return Err(ValidationError::NonPositiveDowntime(f.code.clone()));
    }
    Ok(())
}

/// Validate the catalog, including that every template's asset type resolves
/// to a fault table (directly or through the fallback).
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    let mut models: BTreeSet<&ModelId> = BTreeSet::new();
    for t in &catalog.templates {
        validate_template(t)?;
        if !models.insert(&t.model) {
            return Err(ValidationError::DuplicateModel(t.model.0.clone()));
        }
    }
    for faults in catalog.faults.tables().values() {
        for f in faults {
            validate_fault(f)?;
        }
    }
    let used: BTreeSet<AssetType> = catalog.templates.iter().map(|t| t.asset_type).collect();
    for ty in used {
        if !catalog.faults.has_own_table(ty) {
            tracing::warn!(asset_type = %ty, fallback = %FALLBACK_ASSET_TYPE, "asset type has no fault table; using fallback");
        }
        catalog.faults.resolve(ty)?;
    }
    Ok(())
}

/// Validate that every asset in a fleet references a catalog template.
pub fn validate_fleet(catalog: &Catalog, fleet: &[SimulatedAsset]) -> Result<(), ValidationError> {
    for a in fleet {
        catalog.template_for(a)?;
    }
    Ok(())
}
