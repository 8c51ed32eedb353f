//! Risk scoring over gathered evidence, and the signing pipeline that turns
//! one outbound request into a signature package.

use super::canonical;
use super::signing::{self, RawFingerprint, SessionKeyMaterial, SignaturePackage};
use crate::error::WardenError;
use crate::policy::Policy;
use crate::probes::{DataLoom, EvidenceBag};
use crate::session::SessionVault;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Fold one evidence bag into an integer risk score in [0, 100].
pub fn score_evidence(bag: &EvidenceBag, policy: &Policy) -> u32 {
    let mut score = 0.0_f64;

    let w = policy.anomaly_weight();
    if let Some(report) = bag.anomaly() {
        if report.webdriver {
            score += w;
        }
        if report.webdriver_tampered {
            score += 1.2 * w;
        }
        if report.tostring_tampered {
            score += 1.1 * w;
        }
        if report.stack_anomaly.is_anomalous() {
            score += 0.7 * w;
        }
        if report.permissions == crate::anomaly::PermissionSignal::Denied {
            score += 5.0;
        }
    }

    let t = policy.trajectory_weight();
    let touch_points = bag.platform().map(|p| p.touch_points).unwrap_or(0);
    let mut trajectory_points = 0;
    if let Some(report) = bag.trajectory() {
        trajectory_points = report.points.len();
        if trajectory_points == 0 {
            score += 3.0;
        } else if trajectory_points < 5 {
            score += 2.0;
        }
        if report.analysis.is_straight_line {
            // Touch devices draw straight lines naturally
            score += if touch_points > 0 { t * 0.1 } else { t * 0.7 };
        } else if report.analysis.regularity_score > 0.5 {
            score += t * 0.5;
        }
    }

    if let Some(platform) = bag.platform() {
        if platform.click_count == 0 {
            score += 1.0;
        }
        if platform.click_count > 5 && trajectory_points > 20 {
            score -= 5.0;
        }
    }

    if let Some(perf) = bag.performance() {
        // transfer_size 0 on a navigate entry means a cached page load
        if perf.transfer_size == 0 && perf.entry_type == "navigate" {
            score -= 5.0;
        }
    }

    let sentinels = bag.sentinel_count();
    if sentinels > 2 {
        score += (2 * sentinels) as f64;
    }

    score.round().clamp(0.0, 100.0) as u32
}

/// The risk matrix: gathers evidence per policy, scores it, seals the
/// fingerprint, and signs the canonical record with the session key.
pub struct RiskMatrix {
    vault: Arc<SessionVault>,
    loom: Arc<DataLoom>,
    policy: Arc<Policy>,
}

impl RiskMatrix {
    pub fn new(vault: Arc<SessionVault>, loom: Arc<DataLoom>, policy: Arc<Policy>) -> Self {
        Self { vault, loom, policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Sign one request. `path` must already be the bare URL path; `params`
    /// are the query map for GET and the body map otherwise.
    pub fn sign_request(
        &self,
        method: &str,
        path: &str,
        params: &Map<String, Value>,
    ) -> Result<SignaturePackage, WardenError> {
        let key = self.vault.current_key()?;
        let token = self
            .vault
            .current_token()
            .ok_or(WardenError::SessionKeyUnavailable)?;
        let material = SessionKeyMaterial::parse(&key)?;

        let bag = self.loom.gather(&self.policy);
        let risk_score = score_evidence(&bag, &self.policy);

        let raw_fingerprint = RawFingerprint::from_evidence(&bag).to_json()?;
        let encrypted_fingerprint = material.seal_envelope(&raw_fingerprint);

        let timestamp = Utc::now().timestamp_millis();
        let nonce = signing::nonce(timestamp);
        let serialized_params = canonical::serialize_params(method, params);
        let record = signing::signing_record(
            timestamp,
            &nonce,
            method,
            path,
            &serialized_params,
            risk_score,
            &raw_fingerprint,
        );
        let signature = material.sign_record(&record);

        debug!(
            path,
            risk_score,
            sentinels = bag.sentinel_count(),
            "request signed"
        );

        Ok(SignaturePackage {
            signature,
            timestamp,
            nonce,
            risk_score,
            token,
            encrypted_fingerprint,
        })
    }
}
