//! Key material, fingerprint envelope, and the HMAC over the signing
//! record. The server runs the mirror image of everything here; one byte of
//! divergence invalidates every request.

use crate::error::WardenError;
use crate::probes::EvidenceBag;
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

pub const HEADER_TIMESTAMP: &str = "X-Hive-Timestamp";
pub const HEADER_NONCE: &str = "X-Hive-Nonce";
pub const HEADER_SIGNATURE: &str = "X-Hive-Signature";
pub const HEADER_TOKEN: &str = "X-Hive-Token";
pub const HEADER_RISK_SCORE: &str = "X-Hive-RiskScore";
pub const HEADER_FINGERPRINT: &str = "X-Hive-Fingerprint-Json";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const NONCE_SUFFIX_LEN: usize = 8;

/// HMAC key and AES key/IV derived from one 64-hex session key: the full 32
/// bytes for both ciphers, the first 32 hex characters as the 16-byte IV.
#[derive(Clone)]
pub struct SessionKeyMaterial {
    key: [u8; 32],
    iv: [u8; 16],
}

impl SessionKeyMaterial {
    pub fn parse(hex_key: &str) -> Result<Self, WardenError> {
        let bytes = hex::decode(hex_key)
            .map_err(|e| WardenError::SigningFailed(format!("session key is not hex: {e}")))?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| {
            WardenError::SigningFailed("session key must be 64 hex characters".to_string())
        })?;
        // hex::decode already proved the string is ASCII, so the slice is safe
        let iv_bytes = hex::decode(&hex_key[..32])
            .map_err(|e| WardenError::SigningFailed(format!("session key is not hex: {e}")))?;
        let iv: [u8; 16] = iv_bytes.try_into().map_err(|_| {
            WardenError::SigningFailed("session key too short for IV derivation".to_string())
        })?;
        Ok(Self { key, iv })
    }

    /// AES-256-CBC/PKCS7 over the raw fingerprint JSON, base64-encoded.
    pub fn seal_envelope(&self, plaintext: &str) -> String {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        BASE64.encode(ciphertext)
    }

    /// The server-side mirror of [`Self::seal_envelope`]; also exercised by
    /// integration tests to prove the round trip.
    pub fn open_envelope(&self, encoded: &str) -> Result<String, WardenError> {
        let ciphertext = BASE64
            .decode(encoded)
            .map_err(|e| WardenError::SigningFailed(format!("envelope is not base64: {e}")))?;
        let plaintext = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| WardenError::SigningFailed("envelope padding invalid".to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|e| WardenError::SigningFailed(format!("envelope is not UTF-8: {e}")))
    }

    /// Lowercase-hex HMAC-SHA256 of the signing record.
    pub fn sign_record(&self, record: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(record.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of a lowercase-hex signature against the record.
    pub fn verify_record(&self, record: &str, signature_hex: &str) -> bool {
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(record.as_bytes());
        mac.verify_slice(&signature).is_ok()
    }
}

impl std::fmt::Debug for SessionKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // key bytes stay out of logs
        f.debug_struct("SessionKeyMaterial").finish_non_exhaustive()
    }
}

/// `<timestamp>||<nonce>||<METHOD>||<path>||<params>||<score>||<rawFp>`
pub fn signing_record(
    timestamp: i64,
    nonce: &str,
    method: &str,
    path: &str,
    serialized_params: &str,
    risk_score: u32,
    raw_fingerprint_json: &str,
) -> String {
    format!(
        "{}||{}||{}||{}||{}||{}||{}",
        timestamp,
        nonce,
        method.to_uppercase(),
        path,
        serialized_params,
        risk_score,
        raw_fingerprint_json
    )
}

/// `<timestamp>-<8 random base36 chars>`
pub fn nonce(timestamp: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..NONCE_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", timestamp, suffix)
}

/// The plaintext the server decrypts and re-signs. Field order is part of
/// the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFingerprint {
    pub platform: String,
    pub renderer: String,
    pub audio: String,
}

impl RawFingerprint {
    /// Absent platform or renderer evidence reads "N/A"; an absent audio
    /// entry reads as the missing-constructor sentinel.
    pub fn from_evidence(bag: &EvidenceBag) -> Self {
        Self {
            platform: bag
                .platform()
                .map(|p| p.platform.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            renderer: bag
                .webgl()
                .map(|w| w.renderer.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            audio: bag
                .audio_value()
                .unwrap_or("err_no_offline_context")
                .to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, WardenError> {
        serde_json::to_string(self)
            .map_err(|e| WardenError::SigningFailed(format!("fingerprint serialization: {e}")))
    }
}

/// Everything the adapter needs to stamp one outbound request.
#[derive(Debug, Clone, Serialize)]
pub struct SignaturePackage {
    pub signature: String,
    pub timestamp: i64,
    pub nonce: String,
    pub risk_score: u32,
    pub token: String,
    /// Base64 AES envelope of the raw fingerprint JSON
    pub encrypted_fingerprint: String,
}

impl SignaturePackage {
    pub fn header_bundle(&self) -> [(&'static str, String); 6] {
        [
            (HEADER_TIMESTAMP, self.timestamp.to_string()),
            (HEADER_NONCE, self.nonce.clone()),
            (HEADER_SIGNATURE, self.signature.clone()),
            (HEADER_TOKEN, self.token.clone()),
            (HEADER_RISK_SCORE, self.risk_score.to_string()),
            (HEADER_FINGERPRINT, self.encrypted_fingerprint.clone()),
        ]
    }
}
