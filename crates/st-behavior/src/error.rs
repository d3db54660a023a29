use thiserror::Error;

use st_core::{EntityId, SteerError};

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("behavior configuration error: {0}")]
    Config(String),

    #[error("{follower} is not in the formation led by {leader}")]
    NotInFormation { leader: EntityId, follower: EntityId },

    #[error(transparent)]
    Core(#[from] SteerError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
