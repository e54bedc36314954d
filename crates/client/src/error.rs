use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("No signer configured")]
    NoSigner,
    #[error("Registration {phase}: {source}")]
    Registration {
        phase: RegistrationPhase,
        #[source]
        source: Box<Error>,
    },
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Response status {status} ({message})")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Signature error: {0}")]
    Signature(#[from] quarry_signature::SignatureError),
    #[error("Unexpected register result: {0:?}")]
    UnexpectedResult(String),
}

impl Error {
    pub(crate) fn registration(phase: RegistrationPhase, source: Error) -> Self {
        Self::Registration {
            phase,
            source: Box::new(source),
        }
    }
}

/// Step of the registration handshake an error surfaced from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationPhase {
    Apply,
    ChallengeSigning,
    Register,
}

impl fmt::Display for RegistrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply => write!(f, "application"),
            Self::ChallengeSigning => write!(f, "challenge signing"),
            Self::Register => write!(f, "confirmation"),
        }
    }
}
