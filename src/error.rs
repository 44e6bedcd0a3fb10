use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// Every async failure is caught at the session-controller boundary and
/// converted into a user-visible notice plus a deterministic state change;
/// nothing here escapes to the presentation layer as a panic.
#[derive(Debug, Error)]
pub enum SonharioError {
    /// Microphone missing or permission denied. The session stays where it is.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The hosted provider rejected or failed the request. `status` is the
    /// HTTP status when one was received; transport failures carry `None`.
    #[error("provider request failed (status {status:?}): {message}")]
    Provider {
        status: Option<u16>,
        message: String,
    },

    /// The provider answered 2xx but the expected field was absent.
    #[error("provider returned an unexpected response shape: {0}")]
    MalformedResponse(String),

    /// Missing or invalid startup configuration. Fatal before any request.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SonharioError {
    /// Transport-level failures (DNS, connect, body read) have no HTTP status.
    pub fn transport(err: reqwest::Error) -> Self {
        SonharioError::Provider {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SonharioError>;
