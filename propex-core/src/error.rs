use propex_model::ModelError;

/// Error taxonomy shared by the core services.
///
/// `Dependency` is special: the search composer degrades it to an absent
/// field instead of failing the page, and `Publish` is logged at the
/// mutation site without undoing the committed write.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Deliberately detail-free so callers cannot distinguish which
    /// credential check failed.
    #[error("unauthorized")]
    Unauthorized,

    #[error("dependency error: {0}")]
    Dependency(String),

    #[error("publish error: {0}")]
    Publish(#[from] lapin::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(String),
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
