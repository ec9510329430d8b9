//! Detached Ed25519 signatures over upload messages.
//!
//! Signatures and public keys travel hex-encoded with an optional `0x` prefix.

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use photoguard_core::constants::{MIN_PUBLIC_KEY_BYTES, MIN_SIGNATURE_BYTES};
use photoguard_core::AppError;

/// Decode hex, tolerating a leading `0x`/`0X`.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = value.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(stripped)
}

/// Verify `signature_hex` over the UTF-8 bytes of `message` against `public_key_hex`.
///
/// Never errors: every decode failure, length problem or mismatch yields `false`
/// and a debug log line saying why.
pub fn verify(message: &str, signature_hex: &str, public_key_hex: &str) -> bool {
    match try_verify(message, signature_hex, public_key_hex) {
        Ok(()) => true,
        Err(reason) => {
            tracing::debug!(reason = %reason, "Signature rejected");
            false
        }
    }
}

fn try_verify(message: &str, signature_hex: &str, public_key_hex: &str) -> Result<(), String> {
    if message.is_empty() {
        return Err("empty message".to_string());
    }

    let sig_bytes =
        decode_hex(signature_hex).map_err(|e| format!("bad signature encoding: {e}"))?;
    if sig_bytes.len() < MIN_SIGNATURE_BYTES {
        return Err(format!(
            "signature too short: {} bytes, need {}",
            sig_bytes.len(),
            MIN_SIGNATURE_BYTES
        ));
    }

    let pk_bytes =
        decode_hex(public_key_hex).map_err(|e| format!("bad public key encoding: {e}"))?;
    if pk_bytes.len() < MIN_PUBLIC_KEY_BYTES {
        return Err(format!(
            "public key too short: {} bytes, need {}",
            pk_bytes.len(),
            MIN_PUBLIC_KEY_BYTES
        ));
    }

    let sig_bytes: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| "signature must be exactly 64 bytes".to_string())?;
    let pk_bytes: [u8; 32] = pk_bytes
        .try_into()
        .map_err(|_| "public key must be exactly 32 bytes".to_string())?;

    let verifying_key =
        VerifyingKey::from_bytes(&pk_bytes).map_err(|e| format!("invalid public key: {e}"))?;
    let signature = Signature::from_bytes(&sig_bytes);

    verifying_key
        .verify_strict(message.as_bytes(), &signature)
        .map_err(|e| format!("signature verification failed: {e}"))
}

/// Hex-encoded output of a [`MessageSigner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub signature: String,
    pub public_key: String,
}

/// Capability that signs raw message bytes on behalf of an identity.
///
/// Injected wherever signing is needed; wallets and hardware keys implement it
/// outside this crate.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    async fn sign(&self, message: &[u8]) -> Result<SignedMessage, AppError>;
}

/// In-process Ed25519 signer.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Load a 32-byte secret key from hex.
    pub fn from_hex(secret_hex: &str) -> Result<Self, AppError> {
        let bytes = decode_hex(secret_hex)
            .map_err(|e| AppError::InvalidInput(format!("secret key is not hex: {e}")))?;
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AppError::InvalidInput("secret key must be 32 bytes".to_string()))?;
        Ok(Self::from_bytes(&secret))
    }

    /// Fresh key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let secret: [u8; 32] = rand::random();
        Self::from_bytes(&secret)
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn sign_bytes(&self, message: &[u8]) -> SignedMessage {
        SignedMessage {
            signature: hex::encode(self.signing_key.sign(message).to_bytes()),
            public_key: self.public_key_hex(),
        }
    }
}

#[async_trait]
impl MessageSigner for Ed25519Signer {
    async fn sign(&self, message: &[u8]) -> Result<SignedMessage, AppError> {
        Ok(self.sign_bytes(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &str = "upload_image:abcd:1700000000:0xABC";

    fn signer() -> Ed25519Signer {
        Ed25519Signer::from_bytes(&[7u8; 32])
    }

    fn flip_hex_bit(value: &str, byte: usize) -> String {
        let mut bytes = hex::decode(value).unwrap();
        bytes[byte] ^= 0x01;
        hex::encode(bytes)
    }

    #[test]
    fn accepts_valid_signature() {
        let signed = signer().sign_bytes(MESSAGE.as_bytes());
        assert!(verify(MESSAGE, &signed.signature, &signed.public_key));
    }

    #[test]
    fn accepts_0x_prefixes() {
        let signed = signer().sign_bytes(MESSAGE.as_bytes());
        assert!(verify(
            MESSAGE,
            &format!("0x{}", signed.signature),
            &format!("0x{}", signed.public_key)
        ));
    }

    #[test]
    fn rejects_mutated_message() {
        let signed = signer().sign_bytes(MESSAGE.as_bytes());
        let mut mutated = MESSAGE.as_bytes().to_vec();
        mutated[5] ^= 0x01;
        let mutated = String::from_utf8(mutated).unwrap();
        assert!(!verify(&mutated, &signed.signature, &signed.public_key));
    }

    #[test]
    fn rejects_mutated_signature() {
        let signed = signer().sign_bytes(MESSAGE.as_bytes());
        for byte in [0, 31, 63] {
            let sig = flip_hex_bit(&signed.signature, byte);
            assert!(!verify(MESSAGE, &sig, &signed.public_key));
        }
    }

    #[test]
    fn rejects_mutated_public_key() {
        let signed = signer().sign_bytes(MESSAGE.as_bytes());
        let pk = flip_hex_bit(&signed.public_key, 3);
        assert!(!verify(MESSAGE, &signed.signature, &pk));
    }

    #[test]
    fn rejects_other_signer() {
        let signed = signer().sign_bytes(MESSAGE.as_bytes());
        let other = Ed25519Signer::from_bytes(&[9u8; 32]);
        assert!(!verify(MESSAGE, &signed.signature, &other.public_key_hex()));
    }

    #[test]
    fn rejects_short_and_malformed_inputs() {
        let signed = signer().sign_bytes(MESSAGE.as_bytes());
        assert!(!verify(MESSAGE, &signed.signature[..126], &signed.public_key));
        assert!(!verify(MESSAGE, &signed.signature, &signed.public_key[..62]));
        assert!(!verify(MESSAGE, "zz", &signed.public_key));
        assert!(!verify("", &signed.signature, &signed.public_key));
        assert!(!verify(MESSAGE, &format!("{}00", signed.signature), &signed.public_key));
    }

    #[test]
    fn hex_round_trip_of_secret() {
        let original = signer();
        let restored = Ed25519Signer::from_hex(&original.secret_key_hex()).unwrap();
        assert_eq!(original.public_key_hex(), restored.public_key_hex());
        assert!(Ed25519Signer::from_hex("abcd").is_err());
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(
            Ed25519Signer::generate().public_key_hex(),
            Ed25519Signer::generate().public_key_hex()
        );
    }
}
