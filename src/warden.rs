//! The warden container: collaborators wired once at init, handed back as a
//! single handle. Construction runs the capability scan, builds the policy,
//! and performs the first (fatal-on-failure) session fetch.

use crate::adapter::{ApiSentinel, OutboundRequest};
use crate::config::WardenConfig;
use crate::error::WardenError;
use crate::host::{CapabilitySnapshot, HostEnvironment};
use crate::policy::Policy;
use crate::probes::{DataLoom, TrajectoryRecorder};
use crate::risk::{RiskMatrix, SignaturePackage};
use crate::session::SessionVault;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

pub struct Warden {
    config: WardenConfig,
    capabilities: CapabilitySnapshot,
    policy: Arc<Policy>,
    vault: Arc<SessionVault>,
    trajectory: Arc<TrajectoryRecorder>,
    engine: Arc<RiskMatrix>,
    sentinel: ApiSentinel,
}

impl Warden {
    /// Wire everything and acquire the first session. Fails on a missing
    /// `api_base_url` or an unreachable session endpoint; a handle you can
    /// hold implies a session was acquired.
    pub fn initialize(
        config: WardenConfig,
        host: Arc<dyn HostEnvironment>,
    ) -> Result<Self, WardenError> {
        if config.api_base_url.trim().is_empty() {
            return Err(WardenError::ConfigMissing);
        }

        let capabilities = host.capabilities();
        let policy = Arc::new(Policy::from_capabilities(&capabilities));

        let vault = Arc::new(SessionVault::new(&config)?);
        vault.initialize()?;

        let trajectory = Arc::new(TrajectoryRecorder::new());
        let loom = Arc::new(DataLoom::new(host, trajectory.clone()));
        let engine = Arc::new(RiskMatrix::new(vault.clone(), loom, policy.clone()));
        let sentinel = ApiSentinel::new(engine.clone(), config.api_base_url.clone());
        sentinel.attach();

        info!(
            collectors = policy.collectors.len(),
            "warden initialized"
        );

        Ok(Self {
            config,
            capabilities,
            policy,
            vault,
            trajectory,
            engine,
            sentinel,
        })
    }

    /// Stamp (or pass through, or cancel) one outbound request.
    pub fn process_request(&self, request: &mut OutboundRequest) -> Result<(), WardenError> {
        self.sentinel.process(request)
    }

    /// Sign directly, bypassing the adapter's URL handling. `path` must be
    /// the bare URL path.
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        params: &Map<String, Value>,
    ) -> Result<SignaturePackage, WardenError> {
        self.engine.sign_request(method, path, params)
    }

    /// The mouse recorder; embedder event glue feeds it pointer events.
    pub fn trajectory(&self) -> &TrajectoryRecorder {
        &self.trajectory
    }

    pub fn capabilities(&self) -> &CapabilitySnapshot {
        &self.capabilities
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn vault(&self) -> &SessionVault {
        &self.vault
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }
}
