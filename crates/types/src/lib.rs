mod build;
mod encoding;
mod register;
pub mod serde_base64;

pub use build::{BuildBlockRequest, BuildBlockResponse};
pub use register::RegisterChallenge;
