//! Per-feed signing identities derived from one process-wide secret.
//!
//! A feed's key is `HMAC-SHA256(secret, feed_url)`, read as a secp256k1
//! secret key. Nothing is stored: the same secret and URL always give back
//! the same key, across restarts and machines.

use hmac::{Hmac, Mac};
use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly, XOnlyPublicKey};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Key pair belonging to one feed.
///
/// The private half is never printed by `Debug`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FeedKeys {
    secret_key: SecretKey,
    public_key: XOnlyPublicKey,
}

impl FeedKeys {
    /// Builds keys from raw secret-key bytes, or `None` if the bytes are not
    /// a valid secp256k1 scalar (zero, or not below the curve order).
    pub fn from_secret_bytes(bytes: &[u8]) -> Option<Self> {
        let secret_key = SecretKey::from_slice(bytes).ok()?;
        Some(Self::from_secret_key(&Secp256k1::signing_only(), secret_key))
    }

    fn from_secret_key(secp: &Secp256k1<SignOnly>, secret_key: SecretKey) -> Self {
        let (public_key, _parity) =
            PublicKey::from_secret_key(secp, &secret_key).x_only_public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    /// The 32 private-key bytes.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret_key.secret_bytes()
    }

    /// Lowercase hex of the private key, as handed to a signer.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Lowercase hex of the x-only public key; the `pubkey` of every event
    /// published for this feed.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }
}

impl std::fmt::Debug for FeedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedKeys")
            .field("secret_key", &"[REDACTED]")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Derives [`FeedKeys`] for feed URLs from an injected secret.
///
/// Constructed once at startup and shared read-only; derivation itself is a
/// pure function of the secret and the URL.
pub struct IdentityDeriver {
    secret: SecretString,
    secp: Secp256k1<SignOnly>,
}

impl IdentityDeriver {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            secp: Secp256k1::signing_only(),
        }
    }

    /// Returns the keys for `feed_url`. Never fails.
    pub fn derive(&self, feed_url: &str) -> FeedKeys {
        derive_with(&self.secp, self.secret.expose_secret().as_bytes(), feed_url)
    }
}

impl std::fmt::Debug for IdentityDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityDeriver")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Derives the keys for `feed_url` from raw secret bytes.
///
/// Prefer [`IdentityDeriver`] when deriving repeatedly; it reuses its
/// secp256k1 context.
pub fn derive_identity(secret: &[u8], feed_url: &str) -> FeedKeys {
    derive_with(&Secp256k1::signing_only(), secret, feed_url)
}

fn derive_with(secp: &Secp256k1<SignOnly>, secret: &[u8], feed_url: &str) -> FeedKeys {
    let mut digest = hmac_sha256(secret, feed_url.as_bytes());

    // A digest of zero or >= the curve order (probability ~2^-128) is not a
    // valid key; re-key deterministically until it is.
    loop {
        match SecretKey::from_slice(&digest) {
            Ok(secret_key) => return FeedKeys::from_secret_key(secp, secret_key),
            Err(_) => {
                tracing::warn!(url = %feed_url, "Derived digest outside key range, re-keying");
                digest = hmac_sha256(secret, &digest);
            }
        }
    }
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}
