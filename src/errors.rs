use std::fmt;

/// Error types surfaced by the façade.
#[derive(Debug)]
pub enum AdsError {
    /// Invalid caller-supplied configuration (selector, entity config, chunk size).
    /// Always raised before any remote call is issued.
    Configuration(String),
    /// A remote capability (get, mutate, report download) failed.
    RemoteCall {
        /// Remote service the call was addressed to, e.g. `CampaignService`.
        service: String,
        /// Remote operation, e.g. `get` or `mutate`.
        operation: String,
        /// Failure description as reported by the transport or the service.
        message: String,
    },
    /// A mutate chunk failed; earlier chunks were already applied remotely.
    ChunkFailed {
        /// Index of the chunk whose submission failed.
        chunk_index: usize,
        /// Number of chunks that were successfully applied before the failure.
        applied_chunks: usize,
        /// The underlying remote failure.
        source: Box<AdsError>,
    },
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AdsError>,
        /// Additional context message.
        context: String,
    },
}

impl AdsError {
    /// Shorthand for building a `RemoteCall` error.
    pub fn remote(
        service: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AdsError::RemoteCall {
            service: service.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors raised before anything was sent to the remote service.
    pub fn is_configuration(&self) -> bool {
        match self {
            AdsError::Configuration(_) => true,
            AdsError::WithContext { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

impl fmt::Display for AdsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdsError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AdsError::RemoteCall {
                service,
                operation,
                message,
            } => write!(f, "Remote call {}.{} failed: {}", service, operation, message),
            AdsError::ChunkFailed {
                chunk_index,
                applied_chunks,
                source,
            } => write!(
                f,
                "Mutate chunk {} failed ({} chunks already applied): {}",
                chunk_index, applied_chunks, source
            ),
            AdsError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AdsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdsError::ChunkFailed { source, .. } | AdsError::WithContext { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AdsError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AdsError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AdsError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AdsError> {
    fn context(self, context: impl Into<String>) -> Result<T, AdsError> {
        self.map_err(|e| AdsError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AdsError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AdsError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
