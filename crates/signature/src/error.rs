#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("invalid signature length: expected {expected} bytes, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("signature scheme does not match key")]
    SchemeMismatch,
    #[error("invalid hex key encoding: {0}")]
    Hex(#[from] hex::FromHexError),
    #[cfg(feature = "ed25519")]
    #[error("ed25519: {0}")]
    Ed25519(#[from] ed25519_dalek::SignatureError),
    #[cfg(feature = "secp256k1")]
    #[error("secp256k1: {0}")]
    Secp256k1(#[from] secp256k1::Error),
}
