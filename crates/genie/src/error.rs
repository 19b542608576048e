use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenieError {
    /// Transport, auth or HTTP status failure talking to the workspace.
    #[error("Genie request failed: {0}")]
    Request(String),

    #[error("Genie query timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// The backend reported a terminal failure status for the message.
    #[error("Genie query ended with status {status}")]
    JobFailed { status: String },

    #[error("Unexpected Genie response: {0}")]
    MalformedResponse(String),
}

impl GenieError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GenieError::Timeout(_))
    }
}
