use crate::{
    client::QuarryClient,
    constants::{REGISTER_PATH, REGISTER_RESULT_SUCCESS},
    error::{Error, RegistrationPhase, Result},
    types::{ApplyRequest, ApplyResponse, RegisterRequest, RegisterResponse},
};
use quarry_types::RegisterChallenge;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// One-time gate around the registration handshake.
///
/// `registered` is monotonic: it flips false -> true only after a full
/// apply/sign/register exchange succeeds, and never reverts. The mutex is
/// held only while a handshake is in flight; build requests after
/// registration go through the lock-free fast path.
pub(crate) struct RegistrationGate {
    registered: AtomicBool,
    handshake: Mutex<()>,
}

impl RegistrationGate {
    pub(crate) fn new() -> Self {
        Self {
            registered: AtomicBool::new(false),
            handshake: Mutex::new(()),
        }
    }

    pub(crate) fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    fn mark_registered(&self) {
        self.registered.store(true, Ordering::Release);
    }
}

impl QuarryClient {
    /// Registers this validator with the builder service. The handshake runs
    /// at most once per client: once it has succeeded, every subsequent call
    /// returns immediately without I/O. Safe to call from any number of
    /// tasks concurrently; [`QuarryClient::build_block`] calls it lazily.
    ///
    /// A failed attempt leaves the client unregistered and may be retried;
    /// each retry applies for a fresh challenge, since the service discards
    /// a challenge id after one register attempt.
    pub async fn register(&self) -> Result<()> {
        let gate = &self.inner.registration;

        if gate.is_registered() {
            return Ok(());
        }

        let _handshake = gate.handshake.lock().await;

        // A concurrent caller may have just finished the handshake.
        if gate.is_registered() {
            return Ok(());
        }

        let apply = ApplyRequest {
            chain_id: self.inner.chain_id.clone(),
            validator_address: self.inner.validator_address.clone(),
            payment_address: self.inner.payment_address.clone(),
        };
        let issued: ApplyResponse = self
            .inner
            .send(REGISTER_PATH, &apply)
            .await
            .map_err(|error| Error::registration(RegistrationPhase::Apply, error))?;

        let mut challenge = RegisterChallenge {
            bytes: issued.challenge,
            signature: Vec::new(),
        };
        self.inner
            .signer
            .sign_register_challenge(&mut challenge)
            .map_err(|error| {
                Error::registration(RegistrationPhase::ChallengeSigning, error.into())
            })?;

        let confirm = RegisterRequest {
            challenge_id: issued.challenge_id,
            signature: challenge.signature,
        };
        let response: RegisterResponse = self
            .inner
            .send(REGISTER_PATH, &confirm)
            .await
            .map_err(|error| Error::registration(RegistrationPhase::Register, error))?;

        if response.result != REGISTER_RESULT_SUCCESS {
            return Err(Error::UnexpectedResult(response.result));
        }

        gate.mark_registered();
        tracing::info!(
            chain_id = %self.inner.chain_id,
            validator_address = %self.inner.validator_address,
            "registered validator with builder service"
        );
        Ok(())
    }
}
