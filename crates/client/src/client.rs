use crate::{
    constants::{BUILD_PATH, DEFAULT_BUILDER_API_URL, DEFAULT_TIMEOUT},
    error::{Error, Result},
    registration::RegistrationGate,
    signer::Signer,
};
use quarry_types::{BuildBlockRequest, BuildBlockResponse};
use reqwest::{ClientBuilder, Url};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

#[derive(Default)]
pub struct QuarryClientBuilder {
    base_url: String,
    chain_id: String,
    validator_address: String,
    payment_address: String,
    signer: Option<Box<dyn Signer>>,
    timeout: Duration,
    compression: bool,
}

impl QuarryClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BUILDER_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            ..Default::default()
        }
    }

    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn chain_id<S: Into<String>>(mut self, chain_id: S) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    /// The proposing validator's on-chain address, as represented on chain
    /// (normally uppercase hex).
    pub fn validator_address<S: Into<String>>(mut self, address: S) -> Self {
        self.validator_address = address.into();
        self
    }

    /// Address credited with builder payments for this validator.
    pub fn payment_address<S: Into<String>>(mut self, address: S) -> Self {
        self.payment_address = address.into();
        self
    }

    pub fn signer<S: Signer + 'static>(mut self, signer: S) -> Self {
        self.signer = Some(Box::new(signer));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Gzip request bodies. Can be flipped later with
    /// [`QuarryClient::set_compression`].
    pub fn compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    pub fn build(self) -> Result<QuarryClient> {
        let base_url =
            Url::parse(&self.base_url).map_err(|error| Error::InvalidUrl(error.to_string()))?;
        let http_client = ClientBuilder::new().timeout(self.timeout).build()?;
        let signer = self.signer.ok_or(Error::NoSigner)?;

        Ok(QuarryClient {
            inner: Arc::new(QuarryClientInner {
                client: http_client,
                base_url,
                signer,
                chain_id: self.chain_id,
                validator_address: self.validator_address,
                payment_address: self.payment_address,
                compression: AtomicBool::new(self.compression),
                registration: RegistrationGate::new(),
            }),
        })
    }
}

/// Client for the builder API, held by a proposing validator. Cheap to clone
/// and safe to share across tasks; registration state is per client instance
/// and carries over to clones.
#[derive(Clone)]
pub struct QuarryClient {
    pub(crate) inner: Arc<QuarryClientInner>,
}

pub(crate) struct QuarryClientInner {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) signer: Box<dyn Signer>,
    pub(crate) chain_id: String,
    pub(crate) validator_address: String,
    pub(crate) payment_address: String,
    pub(crate) compression: AtomicBool,
    pub(crate) registration: RegistrationGate,
}

impl QuarryClient {
    pub fn builder() -> QuarryClientBuilder {
        QuarryClientBuilder::new()
    }

    pub fn chain_id(&self) -> &str {
        &self.inner.chain_id
    }

    pub fn validator_address(&self) -> &str {
        &self.inner.validator_address
    }

    pub fn payment_address(&self) -> &str {
        &self.inner.payment_address
    }

    /// Whether this client has completed the registration handshake. Never
    /// reverts to false once set.
    pub fn is_registered(&self) -> bool {
        self.inner.registration.is_registered()
    }

    pub fn compression_enabled(&self) -> bool {
        self.inner.compression.load(Ordering::Relaxed)
    }

    /// Toggles gzip request bodies. In-flight calls keep the value they read
    /// at their start, so headers and body framing always agree.
    pub fn set_compression(&self, enabled: bool) {
        self.inner.compression.store(enabled, Ordering::Relaxed);
    }

    /// Submits a signed build request to the builder service, registering
    /// this validator first if it has not been registered yet. The signer
    /// fills in `request.signature` before the request goes out.
    pub async fn build_block(
        &self,
        request: &mut BuildBlockRequest,
    ) -> Result<BuildBlockResponse> {
        self.register().await?;

        self.inner.signer.sign_build_block_request(request)?;

        self.inner.send(BUILD_PATH, request).await
    }
}
