//! Crate-level error type

use thiserror::Error;

use crate::map::MapError;
use crate::renderer::GeoError;
use crate::sim::PoolError;
use crate::tuning::TuningError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Geometry(#[from] GeoError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
