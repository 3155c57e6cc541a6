use thiserror::Error;

/// Failures that callers need to tell apart from plain I/O errors.
///
/// Everything else travels as `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum FinderError {
    #[error("malformed coordinates: {path}")]
    MalformedCoordinates { path: String },

    #[error("class not found: {key}")]
    NotFound { key: String },

    #[error("could not find Java version in output: {output}")]
    VersionDetection { output: String },

    #[error("selection cancelled")]
    SelectionCancelled,
}

/// Returns true when `err` (or anything in its chain) is a [`FinderError::NotFound`].
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<FinderError>(),
            Some(FinderError::NotFound { .. })
        )
    })
}

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<FinderError>(),
            Some(FinderError::SelectionCancelled)
        )
    })
}
