use thiserror::Error;

/// Failures surfaced to the person using a client front end.
///
/// `Api` carries the booking service's own message so it can be shown as-is;
/// transport failures collapse into one generic message.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unable to reach the booking service")]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from the booking service: {0}")]
    Decode(String),

    /// A local precondition on seat, bus or QR input was not met.
    #[error("{0}")]
    Selection(String),

    /// A business rule checked before contacting the server.
    #[error("{0}")]
    Policy(String),

    #[error("{0}")]
    QrDecode(String),

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Please sign in first")]
    NotSignedIn,
}

impl ClientError {
    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
