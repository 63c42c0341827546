use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::error::{Result, VerifyError};

const PUBLIC_LABEL: &str = "CASK PUBLIC KEY";
const SECRET_LABEL: &str = "CASK SIGNING KEY";

/// Ed25519 public key used to verify manifest signatures.
#[derive(Debug, Clone)]
pub struct PublicKey(VerifyingKey);

/// Ed25519 signing key used to produce release signatures.
///
/// Only the release side holds one of these; downloaders work with
/// [`PublicKey`] alone.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl PublicKey {
    pub fn from_armored(armored: &str) -> Result<Self> {
        let raw = dearmor(armored, PUBLIC_LABEL)?;
        let bytes: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| VerifyError::InvalidKey(format!("expected 32 bytes, got {}", raw.len())))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| VerifyError::InvalidKey(e.to_string()))?;
        Ok(Self(key))
    }

    pub fn to_armored(&self) -> String {
        armor(self.0.as_bytes(), PUBLIC_LABEL)
    }

    /// Checks a detached signature over `message`.
    pub fn verify_detached(&self, signature: &[u8], message: &[u8]) -> Result<()> {
        let sig = Signature::from_slice(signature)
            .map_err(|e| VerifyError::InvalidSignature(e.to_string()))?;
        self.0
            .verify_strict(message, &sig)
            .map_err(|_| VerifyError::SignatureMismatch)
    }
}

impl SecretKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(SigningKey::from_bytes(&bytes))
    }

    pub fn from_armored(armored: &str) -> Result<Self> {
        let raw = dearmor(armored, SECRET_LABEL)?;
        let bytes: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| VerifyError::InvalidKey(format!("expected 32 bytes, got {}", raw.len())))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn to_armored(&self) -> String {
        armor(&self.0.to_bytes(), SECRET_LABEL)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Produces a detached signature over `message`.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.0.sign(message).to_bytes().to_vec()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

fn armor(bytes: &[u8], label: &str) -> String {
    format!(
        "-----BEGIN {label}-----\n{}\n-----END {label}-----\n",
        BASE64.encode(bytes)
    )
}

fn dearmor(armored: &str, label: &str) -> Result<Vec<u8>> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");

    let mut body = String::new();
    let mut in_body = false;
    let mut seen_end = false;
    for line in armored.lines().map(str::trim) {
        if line == begin {
            in_body = true;
        } else if line == end {
            seen_end = true;
            break;
        } else if in_body && !line.is_empty() {
            body.push_str(line);
        }
    }
    if !in_body || !seen_end {
        return Err(VerifyError::InvalidKey(format!("missing {label} armor")));
    }
    BASE64
        .decode(body.as_bytes())
        .map_err(|e| VerifyError::InvalidKey(e.to_string()))
}
