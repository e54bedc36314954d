use crate::encoding::{Encoder, REGISTER_CHALLENGE_TAG};

/// Server-issued challenge a validator signs during registration to prove
/// ownership of its key. The challenge id travels separately; only the
/// challenge bytes are signed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterChallenge {
    pub bytes: Vec<u8>,
    pub signature: Vec<u8>,
}

impl RegisterChallenge {
    /// Canonical bytes signed by the validator and verified by the service.
    pub fn sign_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::tagged(REGISTER_CHALLENGE_TAG);
        enc.put_bytes(&self.bytes);
        enc.finish()
    }
}
