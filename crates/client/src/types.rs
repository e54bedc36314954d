//! Wire types for the registration handshake. Both phases post to the same
//! endpoint; the service tells them apart by body shape.

use quarry_types::serde_base64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ApplyRequest {
    pub chain_id: String,
    pub validator_address: String,
    pub payment_address: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyResponse {
    pub challenge_id: String,
    #[serde(with = "serde_base64::bytes")]
    pub challenge: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest {
    pub challenge_id: String,
    #[serde(with = "serde_base64::bytes")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterResponse {
    pub result: String,
}
