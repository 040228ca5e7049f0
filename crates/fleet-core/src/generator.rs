//! Synthetic fleet generation from catalog templates.

use crate::{
    validate_config, AssetId, AssetTemplate, EngineConfig, SimulatedAsset, ValidationError,
};
use chrono::{Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const SERIAL_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SERIAL_LEN: usize = 8;
const DAYS_PER_YEAR: f64 = 365.25;

/// Generate `count` assets by cycling through `templates`.
///
/// With a seed the result is reproducible; without one the generator draws
/// from OS entropy. `as_of` anchors purchase and service dates.
pub fn generate_fleet(
    templates: &[AssetTemplate],
    count: usize,
    seed: Option<u64>,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> Result<Vec<SimulatedAsset>, ValidationError> {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    let fleet = generate_fleet_with_rng(templates, count, as_of, config, &mut rng)?;
    debug!(count, ?seed, %as_of, "generated fleet");
    Ok(fleet)
}

/// Same as [`generate_fleet`] but drawing from a caller-supplied RNG.
pub fn generate_fleet_with_rng<R: Rng + ?Sized>(
    templates: &[AssetTemplate],
    count: usize,
    as_of: NaiveDate,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<Vec<SimulatedAsset>, ValidationError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if templates.is_empty() {
        return Err(ValidationError::EmptyCatalog);
    }
    validate_config(config)?;

    let mut fleet = Vec::with_capacity(count);
    for i in 0..count {
        let template = &templates[i % templates.len()];

        let ratio: f64 = rng.gen_range(config.utilization_ratio_min..config.utilization_ratio_max);
        let baseline = (f64::from(template.useful_life_hours) * ratio).floor() as u32;

        let years_old = f64::from(baseline) / f64::from(config.annual_utilization_hours);
        let age_days = (years_old * DAYS_PER_YEAR).round() as u64;
        let purchase_date = as_of
            .checked_sub_days(Days::new(age_days))
            .ok_or(ValidationError::DateOutOfRange)?;

        let serial_number = format!("{}-{}", model_prefix(template), serial_suffix(rng));

        let since_service = rng.gen_range(0..=config.service_window_days);
        let last_service_date = as_of
            .checked_sub_days(Days::new(u64::from(since_service)))
            .ok_or(ValidationError::DateOutOfRange)?;

        fleet.push(SimulatedAsset {
            id: asset_id(template, i),
            model: template.model.clone(),
            display_name: template.display_name.clone(),
            asset_type: template.asset_type,
            serial_number,
            location: location_tag(i),
            baseline_usage_hours: baseline,
            purchase_date,
            last_service_date,
        });
    }
    Ok(fleet)
}

fn asset_id(template: &AssetTemplate, index: usize) -> AssetId {
    let prefix: String = template.model.0.chars().take(3).collect();
    AssetId(format!("{}-{}", prefix.to_uppercase(), 1000 + index))
}

fn model_prefix(template: &AssetTemplate) -> &str {
    template
        .model
        .0
        .split_whitespace()
        .next()
        .unwrap_or(template.model.0.as_str())
}

fn serial_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SERIAL_LEN)
        .map(|_| SERIAL_ALPHABET[rng.gen_range(0..SERIAL_ALPHABET.len())] as char)
        .collect()
}

// Zones A-D, slots 1-5.
fn location_tag(index: usize) -> String {
    let zone = (b'A' + (index % 4) as u8) as char;
    format!("Zone {}-0{}", zone, index % 5 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;
    use proptest::prelude::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn same_seed_same_fleet() {
        let c = Catalog::standard();
        let cfg = EngineConfig::default();
        let a = generate_fleet(&c.templates, 16, Some(42), as_of(), &cfg).unwrap();
        let b = generate_fleet(&c.templates, 16, Some(42), as_of(), &cfg).unwrap();
        assert_eq!(a, b);
        let other = generate_fleet(&c.templates, 16, Some(43), as_of(), &cfg).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn templates_cycle_round_robin() {
        let c = Catalog::standard();
        let fleet =
            generate_fleet(&c.templates, 20, Some(7), as_of(), &EngineConfig::default()).unwrap();
        assert_eq!(fleet.len(), 20);
        for (i, a) in fleet.iter().enumerate() {
            assert_eq!(a.model, c.templates[i % c.templates.len()].model);
        }
        assert_eq!(fleet[0].id, AssetId("CAT-1000".into()));
        assert_eq!(fleet[5].id, AssetId("JCB-1005".into()));
        assert!(fleet[0].serial_number.starts_with("CAT-"));
        assert_eq!(fleet[0].serial_number.len(), "CAT-".len() + SERIAL_LEN);
    }

    #[test]
    fn location_tags_cover_zones_and_slots() {
        assert_eq!(location_tag(0), "Zone A-01");
        assert_eq!(location_tag(3), "Zone D-04");
        assert_eq!(location_tag(4), "Zone A-05");
        assert_eq!(location_tag(5), "Zone B-01");
    }

    #[test]
    fn ids_are_unique() {
        let c = Catalog::standard();
        let fleet =
            generate_fleet(&c.templates, 64, Some(1), as_of(), &EngineConfig::default()).unwrap();
        let ids: std::collections::BTreeSet<_> = fleet.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids.len(), fleet.len());
    }

    #[test]
    fn empty_inputs() {
        let cfg = EngineConfig::default();
        assert!(generate_fleet(&[], 0, None, as_of(), &cfg).unwrap().is_empty());
        assert_eq!(
            generate_fleet(&[], 3, None, as_of(), &cfg),
            Err(ValidationError::EmptyCatalog)
        );
    }

    #[test]
    fn unseeded_generation_still_respects_shape() {
        let c = Catalog::standard();
        let fleet =
            generate_fleet(&c.templates, 8, None, as_of(), &EngineConfig::default()).unwrap();
        assert_eq!(fleet.len(), 8);
    }

    proptest! {
        #[test]
        fn baseline_and_dates_within_bounds(seed in any::<u64>()) {
            let c = Catalog::standard();
            let cfg = EngineConfig::default();
            let fleet = generate_fleet(&c.templates, 16, Some(seed), as_of(), &cfg).unwrap();
            for a in &fleet {
                let t = c.template_for(a).unwrap();
                let life = f64::from(t.useful_life_hours);
                let hours = f64::from(a.baseline_usage_hours);
                prop_assert!(hours >= (life * 0.1).floor());
                prop_assert!(hours < life * 0.6);
                prop_assert!(a.purchase_date <= as_of());
                prop_assert!(a.last_service_date <= as_of());
                prop_assert!((as_of() - a.last_service_date).num_days() <= 90);
                // yearsOld = hours / 2000, within a day of rounding
                let expected = (hours / 2000.0 * 365.25).round() as i64;
                prop_assert_eq!((as_of() - a.purchase_date).num_days(), expected);
            }
        }
    }
}
