#![deny(warnings)]

//! Horizon controller runtime for the fleet simulator.
//!
//! The controller owns an ECS world holding the fleet, catalog and current
//! settings. Every scrub, playback tick or strategy change funnels into one
//! recompute system that re-derives the whole projection from scratch.

pub mod controller;
pub mod scenario;

pub use controller::{
    project_fleet, HorizonController, ParsePlaybackSpeedError, PlaybackSpeed, Projection,
};
pub use scenario::Scenario;

use fleet_core::ValidationError;
use fleet_econ::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid scenario: {0}")]
    Scenario(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ControllerError {
    fn from(e: std::io::Error) -> Self {
        ControllerError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ControllerError {
    fn from(e: serde_yaml::Error) -> Self {
        ControllerError::Scenario(e.to_string())
    }
}
