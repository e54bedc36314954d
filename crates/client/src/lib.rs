mod client;
mod constants;
pub mod error;
mod registration;
mod signer;
mod transport;
mod types;

pub use client::{QuarryClient, QuarryClientBuilder};
pub use constants::DEFAULT_BUILDER_API_URL;
pub use signer::{LocalSigner, Signer};

pub mod prelude {
    pub use crate::{
        LocalSigner, QuarryClient, QuarryClientBuilder, Signer,
        error::{Error, RegistrationPhase, Result},
    };
    pub use quarry_types::{BuildBlockRequest, BuildBlockResponse, RegisterChallenge};
}
