//! Error type for document source operations

/// Failure to obtain a document from ArticleMeta.
///
/// "Not found" is not an error here; sources return `Ok(None)` for it.
#[derive(Debug)]
pub enum SourceError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Socket-level failure (connect, read, write, timeout)
    Io(std::io::Error),
    /// The server answered with something we cannot interpret
    Protocol(String),
    /// The server reported an internal failure
    Remote(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::Remote(msg) => write!(f, "server error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Transport failures stay retryable; anything the peer sent that we could
/// not decode is a protocol error.
impl From<thrift::Error> for SourceError {
    fn from(e: thrift::Error) -> Self {
        match e {
            thrift::Error::Transport(t) => Self::Io(std::io::Error::other(t.message)),
            thrift::Error::Application(a) => {
                Self::Protocol(format!("application exception: {}", a.message))
            }
            other => Self::Protocol(other.to_string()),
        }
    }
}

impl SourceError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl exporter_core::Retryable for SourceError {
    fn is_retryable(&self) -> bool {
        match self {
            // Connection refused, timeout, ... have no status
            Self::Http { status, .. } => {
                matches!(status, None | Some(429) | Some(500..=599))
            }
            Self::Io(_) | Self::Remote(_) => true,
            Self::Protocol(_) => false,
        }
    }
}
