use thiserror::Error;

use crate::database::DatabaseError;
use crate::types::EntityKind;
use crate::warehouse::permission::Action;

/// Outcomes of warehouse operations other than success.
///
/// The first four are expected results the caller can act on; the last two are
/// infrastructure faults passed through unchanged.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("Invalid {} code", .0.noun())]
    InvalidCode(EntityKind),

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("{0} already exists")]
    AlreadyExists(EntityKind),

    #[error("User does not have permission to {}", .0.describe())]
    Forbidden(Action),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),

    #[error("Image store unavailable: {0}")]
    ImageStoreUnavailable(#[from] std::io::Error),
}

pub type WarehouseResult<T> = Result<T, WarehouseError>;
