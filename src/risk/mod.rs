//! Risk scoring and request signing (the risk matrix).

pub mod canonical;
mod engine;
mod signing;

pub use engine::{score_evidence, RiskMatrix};
pub use signing::{
    nonce, signing_record, RawFingerprint, SessionKeyMaterial, SignaturePackage,
    HEADER_FINGERPRINT, HEADER_NONCE, HEADER_RISK_SCORE, HEADER_SIGNATURE, HEADER_TIMESTAMP,
    HEADER_TOKEN,
};
