/// Convenience result type used across Tides.
pub type TidesResult<T> = Result<T, TidesError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TidesError {
    /// Invalid manifest, option, or other caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A mount point or static wiring is missing for one controller or illustration.
    #[error("setup error: {0}")]
    Setup(String),

    /// A controller failed inside `mount`, `update`, `unmount` or `destroy`.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// A dataset could not be fetched or parsed.
    #[error("data error: {0}")]
    Data(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TidesError {
    /// Build a [`TidesError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TidesError::Setup`] value.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Build a [`TidesError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`TidesError::Data`] value.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Build a [`TidesError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
