use crate::{
    encoding::{BUILD_BLOCK_REQUEST_TAG, Encoder},
    serde_base64,
};
use serde::{Deserialize, Serialize};

/// A request from a proposing validator to the build endpoint of the builder
/// API. The `signature` field must be set by the caller's signer before the
/// request is sent; see [`BuildBlockRequest::sign_bytes`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildBlockRequest {
    pub chain_id: String,
    pub height: i64,
    pub validator_address: String,
    pub max_bytes: i64,
    pub max_gas: i64,
    #[serde(with = "serde_base64::byte_seq")]
    pub txs: Vec<Vec<u8>>,

    #[serde(with = "serde_base64::bytes")]
    pub signature: Vec<u8>,
}

impl BuildBlockRequest {
    /// Canonical bytes signed by the validator and verified by the service.
    /// The signature field is never part of its own input.
    ///
    /// XXX: Changing the order or the set of encoded fields breaks
    /// verification unless signer and verifier are updated together.
    pub fn sign_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::tagged(BUILD_BLOCK_REQUEST_TAG);
        enc.put_bytes(self.chain_id.as_bytes());
        enc.put_i64(self.height);
        enc.put_bytes(self.validator_address.as_bytes());
        enc.put_i64(self.max_bytes);
        enc.put_i64(self.max_gas);
        enc.put_byte_seq(&self.txs);
        enc.finish()
    }
}

/// Returned by the build endpoint. The transaction order is chosen by the
/// service and must be preserved by callers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildBlockResponse {
    #[serde(with = "serde_base64::byte_seq")]
    pub txs: Vec<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_payment: Option<String>,
}
