// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and lifecycle shared by every external integration.

use async_trait::async_trait;

use crate::error::PaddyError;
use crate::types::{AdapterType, HealthStatus};

/// Common surface of the messaging channel and the drive backend.
///
/// `paddy doctor` reports [`health_check`](Self::health_check) results;
/// `paddy serve` calls [`shutdown`](Self::shutdown) once the dispatcher
/// has drained.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Short name used in logs, e.g. `telegram` or `google-drive`.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Probes the remote service. Unreachable services are reported as
    /// [`HealthStatus::Unhealthy`], not as errors.
    async fn health_check(&self) -> Result<HealthStatus, PaddyError>;

    async fn shutdown(&self) -> Result<(), PaddyError>;
}
