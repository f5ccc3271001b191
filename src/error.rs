use crate::nws::error::NwsApiError;
use crate::store::StoreError;
use thiserror::Error;

/// Top-level error for the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Api(#[from] NwsApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
