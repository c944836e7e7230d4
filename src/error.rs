use crate::catalog::error::CatalogError;
use crate::dap::error::DapError;
use crate::reshape::error::ReshapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErddapError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Dap(#[from] DapError),

    #[error(transparent)]
    Reshape(#[from] ReshapeError),
}
