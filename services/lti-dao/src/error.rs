/// Errors surfaced by the auth code and site copy job stores.
#[derive(Debug, thiserror::Error)]
pub enum DaoError {
    /// A required identifier was absent. Raised before the store is touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The underlying persistence provider failed. The context chain keeps the cause.
    #[error("persistence failed: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl DaoError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Persistence(_) => "PERSISTENCE",
        }
    }
}
