use bip39::{Language, Mnemonic};
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Keccak256};
use tiny_hderive::bip32::ExtendedPrivKey;

use crate::error::{Result, WalletError};

/// BIP-44 path of the first external address on coin type 60.
pub const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

pub const PRIVATE_KEY_LEN: usize = 32;

/// secp256k1 key pair plus the account address derived from it.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    address: String,
}

impl KeyPair {
    /// Derive the wallet key from raw seed bytes.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        if seed.is_empty() {
            return Err(WalletError::InvalidArgument("seed must not be empty".to_string()));
        }
        let ext = ExtendedPrivKey::derive(seed, DERIVATION_PATH)
            .map_err(|e| WalletError::InvalidArgument(format!("seed derivation failed: {:?}", e)))?;
        Self::from_private_key(&ext.secret())
    }

    /// Generate a new 12-word mnemonic
    pub fn generate_mnemonic() -> Result<String> {
        let mut entropy = [0u8; 16];
        OsRng.fill_bytes(&mut entropy);
        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| WalletError::InvalidArgument(format!("mnemonic generation failed: {}", e)))?;
        Ok(mnemonic.to_string())
    }

    /// BIP-39 seed bytes for a mnemonic phrase (empty passphrase).
    pub fn seed_from_mnemonic(phrase: &str) -> Result<[u8; 64]> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase.trim())
            .map_err(|e| WalletError::InvalidArgument(format!("invalid mnemonic: {}", e)))?;
        Ok(mnemonic.to_seed(""))
    }

    pub fn from_private_key(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(WalletError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_LEN,
                bytes.len()
            )));
        }
        // Rejects zero and values not below the curve order.
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| WalletError::InvalidPrivateKey("scalar out of range".to_string()))?;
        let address = address_of(&signing_key);
        Ok(KeyPair { signing_key, address })
    }

    /// Lowercase, 0x-prefixed account address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Uncompressed SEC1 public key, 0x-prefixed.
    pub fn public_key_hex(&self) -> String {
        let point = self.signing_key.verifying_key().as_affine().to_encoded_point(false);
        format!("0x{}", hex::encode(point.as_bytes()))
    }

    /// Private scalar as bare hex (no prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Sign a 32-byte digest, returning the low-S signature and its recovery id.
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<(Signature, RecoveryId)> {
        self.signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| WalletError::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

fn address_of(signing_key: &SigningKey) -> String {
    let point = signing_key.verifying_key().as_affine().to_encoded_point(false);
    // Skip the 0x04 SEC1 tag; the address is the hash tail.
    let hash = keccak256(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Decode a hex private key (optional 0x prefix) and check it is a valid scalar.
pub fn parse_private_key(input: &str) -> Result<[u8; PRIVATE_KEY_LEN]> {
    let trimmed = input.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(stripped)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("bad hex: {}", e)))?;
    let key: [u8; PRIVATE_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
        WalletError::InvalidPrivateKey(format!("expected {} bytes, got {}", PRIVATE_KEY_LEN, bytes.len()))
    })?;
    SigningKey::from_slice(&key)
        .map_err(|_| WalletError::InvalidPrivateKey("scalar out of range".to_string()))?;
    Ok(key)
}

pub fn private_key_to_address(key: &[u8]) -> Result<String> {
    Ok(KeyPair::from_private_key(key)?.address().to_string())
}
