#[cfg(feature = "ed25519")]
use ed25519_dalek::{Signer as _, Verifier as _};
#[cfg(feature = "secp256k1")]
use secp256k1::{Message, Secp256k1, ecdsa::Signature as SecpSignature};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

mod error;
pub use error::SignatureError;

#[cfg(feature = "secp256k1")]
static SECP256K1_SIGNING: std::sync::LazyLock<Secp256k1<secp256k1::SignOnly>> =
    std::sync::LazyLock::new(Secp256k1::signing_only);
#[cfg(feature = "secp256k1")]
static SECP256K1_VERIFY: std::sync::LazyLock<Secp256k1<secp256k1::VerifyOnly>> =
    std::sync::LazyLock::new(Secp256k1::verification_only);

/// Number of leading bytes of the public key hash that form an account
/// address.
const ADDRESS_LEN: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureScheme {
    #[cfg(feature = "ed25519")]
    Ed25519,
    #[cfg(feature = "secp256k1")]
    Secp256k1,
}

#[derive(Clone, Debug)]
pub enum SigningKey {
    #[cfg(feature = "ed25519")]
    Ed25519(ed25519_dalek::SigningKey),
    #[cfg(feature = "secp256k1")]
    Secp256k1(secp256k1::SecretKey),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum VerifyingKey {
    #[cfg(feature = "ed25519")]
    Ed25519(ed25519_dalek::VerifyingKey),
    #[cfg(feature = "secp256k1")]
    Secp256k1(secp256k1::PublicKey),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signature {
    pub bytes: Vec<u8>,
    pub scheme: SignatureScheme,
}

impl Signature {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub fn default_scheme() -> SignatureScheme {
    #[cfg(feature = "ed25519")]
    {
        SignatureScheme::Ed25519
    }
    #[cfg(all(feature = "secp256k1", not(feature = "ed25519")))]
    {
        SignatureScheme::Secp256k1
    }
    #[cfg(not(any(feature = "ed25519", feature = "secp256k1")))]
    {
        compile_error!("At least one signature scheme feature must be enabled");
    }
}

impl SigningKey {
    pub fn from_bytes(scheme: SignatureScheme, bytes: &[u8]) -> Result<Self, SignatureError> {
        match scheme {
            #[cfg(feature = "ed25519")]
            SignatureScheme::Ed25519 => {
                let secret: &[u8; ed25519_dalek::SECRET_KEY_LENGTH] =
                    bytes
                        .try_into()
                        .map_err(|_| SignatureError::InvalidKeyLength {
                            expected: ed25519_dalek::SECRET_KEY_LENGTH,
                            actual: bytes.len(),
                        })?;
                Ok(Self::Ed25519(ed25519_dalek::SigningKey::from_bytes(secret)))
            }
            #[cfg(feature = "secp256k1")]
            SignatureScheme::Secp256k1 => {
                Ok(Self::Secp256k1(secp256k1::SecretKey::from_slice(bytes)?))
            }
        }
    }

    pub fn from_bytes_default(bytes: &[u8]) -> Result<Self, SignatureError> {
        Self::from_bytes(default_scheme(), bytes)
    }
}

impl FromStr for SigningKey {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes_default(&hex::decode(s)?)
    }
}

impl VerifyingKey {
    pub fn from_bytes(scheme: SignatureScheme, bytes: &[u8]) -> Result<Self, SignatureError> {
        match scheme {
            #[cfg(feature = "ed25519")]
            SignatureScheme::Ed25519 => {
                let public: &[u8; ed25519_dalek::PUBLIC_KEY_LENGTH] =
                    bytes
                        .try_into()
                        .map_err(|_| SignatureError::InvalidKeyLength {
                            expected: ed25519_dalek::PUBLIC_KEY_LENGTH,
                            actual: bytes.len(),
                        })?;
                Ok(Self::Ed25519(ed25519_dalek::VerifyingKey::from_bytes(
                    public,
                )?))
            }
            #[cfg(feature = "secp256k1")]
            SignatureScheme::Secp256k1 => {
                Ok(Self::Secp256k1(secp256k1::PublicKey::from_slice(bytes)?))
            }
        }
    }

    pub fn from_bytes_default(bytes: &[u8]) -> Result<Self, SignatureError> {
        Self::from_bytes(default_scheme(), bytes)
    }

    pub fn from_signing_key(signing_key: &SigningKey) -> Self {
        match signing_key {
            #[cfg(feature = "ed25519")]
            SigningKey::Ed25519(key) => Self::Ed25519(key.verifying_key()),
            #[cfg(feature = "secp256k1")]
            SigningKey::Secp256k1(key) => Self::Secp256k1(secp256k1::PublicKey::from_secret_key(
                &SECP256K1_SIGNING,
                key,
            )),
        }
    }
}

pub fn sign(signing_key: &SigningKey, msg: &[u8]) -> Result<Signature, SignatureError> {
    match signing_key {
        #[cfg(feature = "ed25519")]
        SigningKey::Ed25519(key) => Ok(Signature {
            bytes: key.sign(msg).to_bytes().to_vec(),
            scheme: SignatureScheme::Ed25519,
        }),
        #[cfg(feature = "secp256k1")]
        SigningKey::Secp256k1(key) => {
            let digest = Sha256::digest(msg);
            let message = Message::from_digest_slice(digest.as_slice())?;
            let signature = SECP256K1_SIGNING.sign_ecdsa(&message, key);
            Ok(Signature {
                bytes: signature.serialize_compact().to_vec(),
                scheme: SignatureScheme::Secp256k1,
            })
        }
    }
}

pub fn verify(
    verifying_key: &VerifyingKey,
    msg: &[u8],
    signature: &Signature,
) -> Result<(), SignatureError> {
    match (verifying_key, signature.scheme) {
        #[cfg(feature = "ed25519")]
        (VerifyingKey::Ed25519(key), SignatureScheme::Ed25519) => {
            let bytes: &[u8; ed25519_dalek::SIGNATURE_LENGTH] =
                signature.bytes.as_slice().try_into().map_err(|_| {
                    SignatureError::InvalidSignatureLength {
                        expected: ed25519_dalek::SIGNATURE_LENGTH,
                        actual: signature.bytes.len(),
                    }
                })?;
            key.verify(msg, &ed25519_dalek::Signature::from_bytes(bytes))
                .map_err(|_| SignatureError::VerificationFailed)
        }
        #[cfg(feature = "secp256k1")]
        (VerifyingKey::Secp256k1(key), SignatureScheme::Secp256k1) => {
            let digest = Sha256::digest(msg);
            let message = Message::from_digest_slice(digest.as_slice())?;
            let signature = SecpSignature::from_compact(&signature.bytes)?;
            SECP256K1_VERIFY
                .verify_ecdsa(&message, &signature, key)
                .map_err(|_| SignatureError::VerificationFailed)
        }
        #[cfg(all(feature = "ed25519", feature = "secp256k1"))]
        _ => Err(SignatureError::SchemeMismatch),
    }
}

/// Derives the on-chain account address for a public key: the leading 20
/// bytes of its SHA-256 hash, uppercase hex encoded.
pub fn validator_address(verifying_key: &VerifyingKey) -> String {
    let digest = match verifying_key {
        #[cfg(feature = "ed25519")]
        VerifyingKey::Ed25519(key) => Sha256::digest(key.to_bytes()),
        #[cfg(feature = "secp256k1")]
        VerifyingKey::Secp256k1(key) => Sha256::digest(key.serialize()),
    };
    hex::encode_upper(&digest[..ADDRESS_LEN])
}
