use thiserror::Error;

/// Hard failures. User-input rejections are [`crate::Notice`]s, not errors.
#[derive(Debug, Error)]
pub enum EngageError {
    #[error(transparent)]
    Store(#[from] reviewkit_store::StoreError),

    #[error("invalid countdown window: {0}")]
    InvalidWindow(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode export: {0}")]
    Export(#[from] serde_json::Error),
}
