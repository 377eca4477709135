// Error types shared by the update checker, the handler workflow and the
// preference store.
//
// `Display` output is what ends up in front of the user (the `Failed` status
// text or an activity log line), so every message is a readable sentence.

use thiserror::Error;

/// Why a release check failed.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// DNS, TLS, connection refused, timeout...
    #[error("Could not reach the update server: {message}")]
    Transport { message: String },

    /// Connected, but the body could not be read to the end.
    #[error("The update server response could not be read.")]
    Read {
        #[source]
        source: std::io::Error,
    },

    /// HTTP 403 / 429. GitHub answers 403 once the anonymous quota is used up.
    #[error("The request was refused by GitHub (the API rate limit may have been reached).")]
    RateLimited,

    /// HTTP 404: the repository has no published release.
    #[error("No published release was found.")]
    NotFound,

    /// Any other non-2xx status.
    #[error("The update request failed (HTTP {0}).")]
    Http(u16),

    /// The body was not a release object.
    #[error("The release information could not be read.")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl UpdateError {
    /// Map a non-2xx status code to its error.
    pub fn from_status(code: u16) -> Self {
        match code {
            403 | 429 => Self::RateLimited,
            404 => Self::NotFound,
            other => Self::Http(other),
        }
    }
}

/// A failed write to the OS handler registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} (OSStatus={code})", .message.as_deref().unwrap_or("unknown error"))]
pub struct PlatformError {
    /// Raw platform status code (`OSStatus` on macOS).
    pub code: i32,
    /// Human-readable description, when the platform has one.
    pub message: Option<String>,
}

impl PlatformError {
    pub fn new(code: i32, message: Option<String>) -> Self {
        Self { code, message }
    }
}

/// Errors from the default-handler workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("The extension .{extension} does not map to a known content type.")]
    UnknownContentType { extension: String },

    /// The picked path is not an application bundle with an identifier.
    #[error("Cannot read the bundle identifier of {}.", .path.display())]
    MissingBundleIdentifier { path: std::path::PathBuf },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Errors from a preference store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Preference file I/O failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Preference data is not valid JSON")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}
