use quarry_signature::{SignatureError, SigningKey, sign};
use quarry_types::{BuildBlockRequest, RegisterChallenge};

/// Consumer contract for the client: one signing operation per signable
/// message type, implemented by the embedding validator's key management.
/// Each operation fills in the message's signature field, computed over the
/// message's canonical sign bytes.
pub trait Signer: Send + Sync {
    fn sign_build_block_request(
        &self,
        request: &mut BuildBlockRequest,
    ) -> Result<(), SignatureError>;

    fn sign_register_challenge(
        &self,
        challenge: &mut RegisterChallenge,
    ) -> Result<(), SignatureError>;
}

/// [`Signer`] backed by a key held in process.
pub struct LocalSigner {
    key: SigningKey,
}

impl LocalSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }
}

impl Signer for LocalSigner {
    fn sign_build_block_request(
        &self,
        request: &mut BuildBlockRequest,
    ) -> Result<(), SignatureError> {
        let signature = sign(&self.key, &request.sign_bytes())?;
        request.signature = signature.bytes;
        Ok(())
    }

    fn sign_register_challenge(
        &self,
        challenge: &mut RegisterChallenge,
    ) -> Result<(), SignatureError> {
        let signature = sign(&self.key, &challenge.sign_bytes())?;
        challenge.signature = signature.bytes;
        Ok(())
    }
}
