/// Failure of a single fetch-and-decode attempt against the workflow engine.
///
/// Cloneable so the latest error can sit in published poll state next to
/// the last good payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The engine answered with a non-2xx status code.
    #[error("HTTP {status}")]
    Transport { status: u16 },

    /// The response body was not the expected JSON shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The request never produced a response (refused, timed out, DNS...).
    #[error("Network error: {0}")]
    Network(String),
}

impl FetchError {
    /// HTTP status code, when the engine produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of the one-shot `POST /workflow` call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// Operator input was rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The creation request failed at the transport or decode layer.
    #[error(transparent)]
    Failed(#[from] FetchError),
}
