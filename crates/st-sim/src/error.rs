use thiserror::Error;

use st_core::SteerError;
use st_schedule::ScheduleError;
use st_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] SteerError),

    #[error("scheduler error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),
}

pub type WorldResult<T> = Result<T, WorldError>;
