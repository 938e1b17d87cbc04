use super::ProviderFamily;

/// Failures of the narrative-generation call. These are the only errors a
/// diagnosis run propagates to its caller.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("missing API key: set the {0} environment variable")]
    MissingCredential(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("{provider} returned HTTP {status}: {message}")]
    Status {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("invalid response from {0}: {1}")]
    InvalidResponse(&'static str, String),

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("no backend configured for provider {0}")]
    Unavailable(ProviderFamily),
}
