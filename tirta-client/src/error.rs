use thiserror::Error;
use tirta_core::CommandError;

/// Failure classes of the platform client.
///
/// `Api` is the backend saying no (business rule, missing row, refused
/// command); `Transport` is the network saying nothing useful; `Decode`
/// is a payload that does not match the contract; `Validation` never
/// left this process.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Api {
        /// HTTP status when the error came over the wire; `None` from the
        /// in-process backend.
        status: Option<u16>,
        message: Box<str>,
    },
    #[error("decode error: {0}")]
    Decode(Box<str>),
    #[error(transparent)]
    Validation(#[from] CommandError),
}

impl ClientError {
    /// Backend-reported error without an HTTP layer underneath.
    pub fn api(message: impl Into<Box<str>>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    /// The backend's business message, when there is one to show verbatim.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string().into())
    }
}
