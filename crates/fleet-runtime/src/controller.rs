//! Horizon controller: scrub and auto-advance over the simulated horizon.

use crate::ControllerError;
use bevy_ecs::prelude::*;
use chrono::{Months, NaiveDate};
use fleet_core::{
    validate_catalog, validate_config, validate_fleet, AssetId, Catalog, EngineConfig, FleetKpis,
    ProjectedAssetState, SimulatedAsset, ValidationError,
};
use fleet_econ::{aggregate, ModelError, Strategy, WearModel};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Everything the display layer needs for one horizon point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub per_asset: Vec<ProjectedAssetState>,
    pub kpis: FleetKpis,
    pub horizon_months: u32,
    pub strategy: Strategy,
    /// Calendar month the horizon corresponds to.
    pub projected_date: NaiveDate,
}

/// Auto-advance speed multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    #[default]
    X1,
    X2,
    X4,
    X8,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::X1,
        PlaybackSpeed::X2,
        PlaybackSpeed::X4,
        PlaybackSpeed::X8,
    ];

    pub fn multiplier(self) -> u32 {
        match self {
            PlaybackSpeed::X1 => 1,
            PlaybackSpeed::X2 => 2,
            PlaybackSpeed::X4 => 4,
            PlaybackSpeed::X8 => 8,
        }
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unsupported playback speed: {0} (expected 1, 2, 4 or 8)")]
pub struct ParsePlaybackSpeedError(pub String);

impl FromStr for PlaybackSpeed {
    type Err = ParsePlaybackSpeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches(['x', 'X']);
        let speed = match digits {
            "1" => PlaybackSpeed::X1,
            "2" => PlaybackSpeed::X2,
            "4" => PlaybackSpeed::X4,
            "8" => PlaybackSpeed::X8,
            _ => return Err(ParsePlaybackSpeedError(s.to_string())),
        };
        Ok(speed)
    }
}

#[derive(Resource)]
struct Fleet(Vec<SimulatedAsset>);

#[derive(Resource)]
struct CatalogData(Catalog);

#[derive(Resource)]
struct Config(EngineConfig);

#[derive(Resource)]
struct DrawSeed(u64);

#[derive(Resource)]
struct AsOf(NaiveDate);

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
struct Settings {
    strategy: Strategy,
    horizon_months: u32,
}

#[derive(Resource, Debug, Default)]
struct Playback {
    playing: bool,
    speed: PlaybackSpeed,
    // wall-clock time not yet converted into ticks
    pending: Duration,
}

#[derive(Resource)]
struct ProjectionState {
    current: Projection,
    error: Option<ModelError>,
}

/// Project every asset of `fleet` to `months` under `strategy`.
///
/// Each asset draws from its own RNG seeded by `(draw_seed, asset id, months)`,
/// so a horizon point is reproducible no matter how it was reached and the
/// draw is shared across strategies.
pub fn project_fleet(
    fleet: &[SimulatedAsset],
    catalog: &Catalog,
    config: &EngineConfig,
    strategy: Strategy,
    months: u32,
    draw_seed: u64,
) -> Result<Vec<ProjectedAssetState>, ModelError> {
    let model = WearModel::new(config, &catalog.faults);
    fleet
        .iter()
        .map(|asset| {
            let template = catalog.template_for(asset)?;
            let mut rng = draw_rng(draw_seed, &asset.id, months);
            model.project(asset, template, strategy, months, &mut rng)
        })
        .collect()
}

fn draw_rng(seed: u64, id: &AssetId, months: u32) -> ChaCha8Rng {
    // FNV-1a over the id, then a splitmix64 finalizer over the combined key
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in id.0.as_bytes() {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let mut z = seed ^ h ^ (u64::from(months) << 32);
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    ChaCha8Rng::seed_from_u64(z ^ (z >> 31))
}

fn recompute_projection(
    fleet: Res<Fleet>,
    catalog: Res<CatalogData>,
    config: Res<Config>,
    seed: Res<DrawSeed>,
    as_of: Res<AsOf>,
    settings: Res<Settings>,
    mut out: ResMut<ProjectionState>,
) {
    if !settings.is_changed() && !fleet.is_changed() {
        return;
    }
    let Settings {
        strategy,
        horizon_months,
    } = *settings;
    let projected = project_fleet(
        &fleet.0,
        &catalog.0,
        &config.0,
        strategy,
        horizon_months,
        seed.0,
    )
    .and_then(|per_asset| {
        let date = as_of
            .0
            .checked_add_months(Months::new(horizon_months))
            .ok_or(ModelError::Configuration(ValidationError::DateOutOfRange))?;
        Ok((per_asset, date))
    });
    match projected {
        Ok((per_asset, projected_date)) => {
            let kpis = aggregate(&per_asset, horizon_months, &config.0);
            debug!(
                %strategy,
                horizon_months,
                critical = kpis.critical_event_count,
                health = kpis.average_fleet_health_percent,
                "recomputed projection"
            );
            out.current = Projection {
                per_asset,
                kpis,
                horizon_months,
                strategy,
                projected_date,
            };
            out.error = None;
        }
        Err(e) => {
            warn!(error = %e, horizon_months, "projection failed");
            out.error = Some(e);
        }
    }
}

/// Owns the fleet, strategy and horizon; exposes them only through the
/// scrub / playback operations and recomputes on every change.
pub struct HorizonController {
    world: World,
    schedule: Schedule,
}

impl HorizonController {
    /// Validate inputs and compute the month-0 projection.
    ///
    /// A catalog whose asset types cannot resolve a fault table is rejected
    /// here, before any simulation run.
    pub fn new(
        catalog: Catalog,
        fleet: Vec<SimulatedAsset>,
        config: EngineConfig,
        as_of: NaiveDate,
        draw_seed: u64,
    ) -> Result<Self, ControllerError> {
        validate_config(&config)?;
        validate_catalog(&catalog)?;
        validate_fleet(&catalog, &fleet)?;
        for asset in &fleet {
            catalog.faults.resolve(asset.asset_type)?;
        }

        let strategy = Strategy::default();
        let mut world = World::new();
        world.insert_resource(ProjectionState {
            current: Projection {
                per_asset: Vec::new(),
                kpis: FleetKpis::default(),
                horizon_months: 0,
                strategy,
                projected_date: as_of,
            },
            error: None,
        });
        world.insert_resource(Fleet(fleet));
        world.insert_resource(CatalogData(catalog));
        world.insert_resource(Config(config));
        world.insert_resource(DrawSeed(draw_seed));
        world.insert_resource(AsOf(as_of));
        world.insert_resource(Settings {
            strategy,
            horizon_months: 0,
        });
        world.insert_resource(Playback::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(recompute_projection);

        let mut ctl = Self { world, schedule };
        ctl.recompute()?;
        info!(
            assets = ctl.projection().per_asset.len(),
            %strategy,
            "horizon controller ready"
        );
        Ok(ctl)
    }

    fn recompute(&mut self) -> Result<(), ControllerError> {
        self.schedule.run(&mut self.world);
        match self.world.resource_mut::<ProjectionState>().error.take() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Latest projection at the current horizon and strategy.
    pub fn projection(&self) -> &Projection {
        &self.world.resource::<ProjectionState>().current
    }

    pub fn fleet(&self) -> &[SimulatedAsset] {
        &self.world.resource::<Fleet>().0
    }

    pub fn config(&self) -> &EngineConfig {
        &self.world.resource::<Config>().0
    }

    pub fn strategy(&self) -> Strategy {
        self.world.resource::<Settings>().strategy
    }

    pub fn horizon(&self) -> u32 {
        self.world.resource::<Settings>().horizon_months
    }

    pub fn max_horizon(&self) -> u32 {
        self.config().max_horizon_months
    }

    pub fn is_playing(&self) -> bool {
        self.world.resource::<Playback>().playing
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.world.resource::<Playback>().speed
    }

    /// Switch strategy, keeping the current horizon.
    pub fn set_strategy(&mut self, strategy: Strategy) -> Result<(), ControllerError> {
        info!(%strategy, horizon = self.horizon(), "strategy selected");
        let next = Settings {
            strategy,
            ..*self.world.resource::<Settings>()
        };
        self.apply(next)
    }

    /// Scrub to `months`; months beyond the maximum horizon are refused.
    pub fn set_horizon(&mut self, months: u32) -> Result<(), ControllerError> {
        let max = self.max_horizon();
        if months > max {
            return Err(ModelError::InvalidHorizon {
                requested: months,
                max,
            }
            .into());
        }
        let next = Settings {
            horizon_months: months,
            ..*self.world.resource::<Settings>()
        };
        self.apply(next)
    }

    // Settings only stick when the projection for them could be computed.
    fn apply(&mut self, next: Settings) -> Result<(), ControllerError> {
        let prev = *self.world.resource::<Settings>();
        *self.world.resource_mut::<Settings>() = next;
        if let Err(e) = self.recompute() {
            *self.world.resource_mut::<Settings>() = prev;
            return Err(e);
        }
        Ok(())
    }

    /// Scrub to `months`, clamped to the maximum horizon. Returns the
    /// horizon actually applied.
    pub fn set_horizon_clamped(&mut self, months: u32) -> Result<u32, ControllerError> {
        let applied = months.min(self.max_horizon());
        self.set_horizon(applied)?;
        Ok(applied)
    }

    /// Start auto-advance at `speed`.
    pub fn play(&mut self, speed: PlaybackSpeed) {
        let mut pb = self.world.resource_mut::<Playback>();
        pb.playing = true;
        pb.speed = speed;
        pb.pending = Duration::ZERO;
        info!(%speed, "playback started");
    }

    /// Stop auto-advance; computed state is left untouched.
    pub fn pause(&mut self) {
        let mut pb = self.world.resource_mut::<Playback>();
        pb.playing = false;
        pb.pending = Duration::ZERO;
        info!("playback paused");
    }

    /// Stop playback and return to the month-0 baseline.
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        self.pause();
        self.set_horizon(0)
    }

    /// Timer period at the current speed.
    pub fn tick_interval(&self) -> Duration {
        let base = self.config().base_tick_interval_ms;
        Duration::from_millis(base / u64::from(self.speed().multiplier()))
    }

    /// One auto-advance step. Advances a month while playing and stops
    /// playback once the maximum horizon is reached. Returns whether the
    /// horizon moved.
    pub fn tick(&mut self) -> Result<bool, ControllerError> {
        if !self.is_playing() {
            return Ok(false);
        }
        let max = self.max_horizon();
        let current = self.horizon();
        if current >= max {
            self.pause();
            return Ok(false);
        }
        self.set_horizon(current + 1)?;
        if current + 1 >= max {
            info!(horizon = max, "playback reached end of horizon");
            self.pause();
        }
        Ok(true)
    }

    /// Feed elapsed wall-clock time to the playback timer, firing as many
    /// ticks as fit. Returns the number of months advanced.
    pub fn advance(&mut self, elapsed: Duration) -> Result<u32, ControllerError> {
        if !self.is_playing() {
            return Ok(0);
        }
        let interval = self.tick_interval();
        self.world.resource_mut::<Playback>().pending += elapsed;
        let mut advanced = 0;
        while self.is_playing() && self.world.resource::<Playback>().pending >= interval {
            self.world.resource_mut::<Playback>().pending -= interval;
            if self.tick()? {
                advanced += 1;
            }
        }
        Ok(advanced)
    }
}
