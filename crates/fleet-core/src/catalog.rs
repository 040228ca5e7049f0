//! Static reference data: asset templates and per-type fault tables.

use crate::{AssetTemplate, AssetType, FaultDefinition, ModelId, SimulatedAsset, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Asset type whose fault table is used when a type has none of its own.
pub const FALLBACK_ASSET_TYPE: AssetType = AssetType::HeavyMachinery;

/// Fault definitions grouped by asset type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaultTable(BTreeMap<AssetType, Vec<FaultDefinition>>);

impl FaultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the definitions for `asset_type`.
    pub fn insert(&mut self, asset_type: AssetType, faults: Vec<FaultDefinition>) {
        self.0.insert(asset_type, faults);
    }

    pub fn tables(&self) -> &BTreeMap<AssetType, Vec<FaultDefinition>> {
        &self.0
    }

    /// Whether `asset_type` has a non-empty table of its own.
    pub fn has_own_table(&self, asset_type: AssetType) -> bool {
        self.0.get(&asset_type).is_some_and(|v| !v.is_empty())
    }

    /// Fault definitions for `asset_type`, falling back to the heavy machinery
    /// table when the type has none.
    pub fn resolve(&self, asset_type: AssetType) -> Result<&[FaultDefinition], ValidationError> {
        let own = self.0.get(&asset_type).filter(|v| !v.is_empty());
        let table = own.or_else(|| self.0.get(&FALLBACK_ASSET_TYPE).filter(|v| !v.is_empty()));
        table
            .map(Vec::as_slice)
            .ok_or(ValidationError::MissingFaultTable(asset_type))
    }
}

/// Templates plus fault tables: everything the engine treats as configuration data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub templates: Vec<AssetTemplate>,
    pub faults: FaultTable,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Built-in catalog of real-world equipment models.
    pub fn standard() -> Self {
        use AssetType::*;
        let templates = vec![
            template("CAT 320 GC", "Hydraulic Excavator", HeavyMachinery, 150, 220_000, 12_000),
            template("Komatsu D155AX", "Crawler Dozer", HeavyMachinery, 180, 350_000, 15_000),
            template("Volvo A40G", "Articulated Hauler", HeavyMachinery, 140, 400_000, 14_000),
            template("Atlas Copco GA 75", "Rotary Screw Compressor", FixedEquipment, 45, 35_000, 40_000),
            template("Carrier 30XA", "Air-Cooled Chiller", Building, 80, 85_000, 60_000),
            template("JCB 3CX", "Backhoe Loader", HeavyMachinery, 95, 110_000, 10_000),
            template("Genie Z-45", "Articulating Boom Lift", HeavyMachinery, 65, 75_000, 8_000),
            template("Cummins C2500D5", "Diesel Generator 2500kVA", FixedEquipment, 200, 180_000, 20_000),
        ];

        let mut faults = FaultTable::new();
        faults.insert(
            HeavyMachinery,
            vec![
                fault("E04", "Hydraulic Pump Cavitation", 12_500, 48),
                fault("E12", "Engine Cylinder Misfire", 8_500, 24),
                fault("H09", "Transmission Overheat", 18_000, 72),
                fault("U02", "Undercarriage Track Split", 22_000, 96),
            ],
        );
        faults.insert(
            FixedEquipment,
            vec![
                fault("C01", "Compressor Motor Burnout", 5_500, 36),
                fault("V05", "Valve Seal Leakage", 2_200, 12),
                fault("B02", "Bearing Seizure", 4_500, 24),
            ],
        );
        faults.insert(
            Building,
            vec![
                fault("HVC-02", "Chiller Unit Failure", 15_000, 72),
                fault("ELE-09", "Main Breaker Trip", 3_500, 4),
            ],
        );

        Self { templates, faults }
    }

    /// Look up a template by model id.
    pub fn template(&self, model: &ModelId) -> Option<&AssetTemplate> {
        self.templates.iter().find(|t| &t.model == model)
    }

    /// Template referenced by `asset`.
    pub fn template_for(&self, asset: &SimulatedAsset) -> Result<&AssetTemplate, ValidationError> {
        self.template(&asset.model)
            .ok_or_else(|| ValidationError::UnknownModel(asset.model.0.clone()))
    }
}

fn template(
    model: &str,
    name: &str,
    asset_type: AssetType,
    cost_per_hour: i64,
    replacement: i64,
    life_hours: u32,
) -> AssetTemplate {
    AssetTemplate {
        model: ModelId(model.to_string()),
        display_name: name.to_string(),
        asset_type,
        cost_per_operating_hour: Decimal::new(cost_per_hour, 0),
        replacement_cost: Decimal::new(replacement, 0),
        useful_life_hours: life_hours,
    }
}

fn fault(code: &str, description: &str, repair_cost: i64, downtime_hours: u32) -> FaultDefinition {
    FaultDefinition {
        code: code.to_string(),
        description: description.to_string(),
        repair_cost: Decimal::new(repair_cost, 0),
        downtime_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_has_two_to_four_faults() {
        let c = Catalog::standard();
        for (ty, faults) in c.faults.tables() {
            assert!((2..=4).contains(&faults.len()), "{ty} has {} faults", faults.len());
        }
    }

    #[test]
    fn lighting_falls_back_to_heavy_machinery() {
        let c = Catalog::standard();
        assert!(!c.faults.has_own_table(AssetType::Lighting));
        let lighting = c.faults.resolve(AssetType::Lighting).unwrap();
        let heavy = c.faults.resolve(AssetType::HeavyMachinery).unwrap();
        assert_eq!(lighting, heavy);
    }

    #[test]
    fn empty_own_table_counts_as_missing() {
        let mut c = Catalog::standard();
        c.faults.insert(AssetType::Building, vec![]);
        let resolved = c.faults.resolve(AssetType::Building).unwrap();
        assert_eq!(resolved[0].code, "E04");
    }

    #[test]
    fn missing_fallback_is_an_error() {
        let mut faults = FaultTable::new();
        faults.insert(AssetType::Building, vec![fault("ELE-09", "Main Breaker Trip", 3_500, 4)]);
        assert_eq!(
            faults.resolve(AssetType::Lighting),
            Err(ValidationError::MissingFaultTable(AssetType::Lighting))
        );
        assert!(faults.resolve(AssetType::Building).is_ok());
    }

    #[test]
    fn template_lookup_by_model() {
        let c = Catalog::standard();
        let t = c.template(&ModelId("CAT 320 GC".into())).unwrap();
        assert_eq!(t.cost_per_operating_hour, Decimal::new(150, 0));
        assert_eq!(t.useful_life_hours, 12_000);
        assert!(c.template(&ModelId("nope".into())).is_none());
    }

    #[test]
    fn fault_table_serializes_by_type_name() {
        let c = Catalog::standard();
        let s = serde_json::to_string(&c.faults).unwrap();
        assert!(s.contains("\"FIXED_EQUIPMENT\""));
        let back: FaultTable = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c.faults);
    }
}
