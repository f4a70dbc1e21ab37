// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::sync::Arc;

use crate::app::ports::ConnectivityServicePort;
use crate::app::types::{Capability, NetworkCapabilitySnapshot, ProviderKind};

/// Answers "is an internet-capable network active right now".
///
/// Every call reads fresh state through the connectivity port. Failures to
/// read that state count as "not reachable" and are only logged.
pub trait ReachabilityProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn snapshot(&self) -> NetworkCapabilitySnapshot;

    fn is_internet_reachable(&self) -> bool {
        self.snapshot().is_internet_reachable()
    }
}

/// Uses the active network's capability set.
pub struct CapabilityReachability {
    service: Arc<dyn ConnectivityServicePort>,
}

impl CapabilityReachability {
    pub fn new(service: Arc<dyn ConnectivityServicePort>) -> Self {
        Self { service }
    }
}

impl ReachabilityProvider for CapabilityReachability {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Capability
    }

    fn snapshot(&self) -> NetworkCapabilitySnapshot {
        let network = match self.service.active_network() {
            Ok(Some(network)) => network,
            Ok(None) => {
                tracing::debug!("no active network");
                return NetworkCapabilitySnapshot::disconnected();
            }
            Err(err) => {
                tracing::debug!(error = %err, "active network query failed");
                return NetworkCapabilitySnapshot::disconnected();
            }
        };

        let has_internet_capability = match self.service.capabilities(&network) {
            Ok(Some(caps)) => {
                tracing::debug!(
                    interface = %network.interface,
                    family = %network.family,
                    transport = caps.transport.as_str(),
                    capabilities = %caps.capabilities,
                    "active network capabilities"
                );
                caps.has(Capability::Internet)
            }
            Ok(None) => {
                tracing::debug!(interface = %network.interface, "no capabilities reported");
                false
            }
            Err(err) => {
                tracing::debug!(
                    interface = %network.interface,
                    error = %err,
                    "capability query failed"
                );
                false
            }
        };

        NetworkCapabilitySnapshot {
            has_active_network: true,
            has_internet_capability,
        }
    }
}

/// Falls back to the "is connected" flag of the active connection.
/// Best effort: a connected interface is taken as internet-capable.
pub struct LegacyReachability {
    service: Arc<dyn ConnectivityServicePort>,
}

impl LegacyReachability {
    pub fn new(service: Arc<dyn ConnectivityServicePort>) -> Self {
        Self { service }
    }
}

impl ReachabilityProvider for LegacyReachability {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Legacy
    }

    fn snapshot(&self) -> NetworkCapabilitySnapshot {
        match self.service.active_network_info() {
            Ok(Some(info)) => {
                tracing::debug!(
                    interface = %info.interface,
                    connected = info.is_connected,
                    "active network info"
                );
                NetworkCapabilitySnapshot {
                    has_active_network: true,
                    has_internet_capability: info.is_connected,
                }
            }
            Ok(None) => {
                tracing::debug!("no active network info");
                NetworkCapabilitySnapshot::disconnected()
            }
            Err(err) => {
                tracing::debug!(error = %err, "active network info query failed");
                NetworkCapabilitySnapshot::disconnected()
            }
        }
    }
}

/// Picks the provider variant once, at startup.
pub fn select_provider(
    kind: ProviderKind,
    service: Arc<dyn ConnectivityServicePort>,
) -> Arc<dyn ReachabilityProvider> {
    let resolved = match kind {
        ProviderKind::Auto => {
            if service.capability_api_available() {
                ProviderKind::Capability
            } else {
                ProviderKind::Legacy
            }
        }
        other => other,
    };
    tracing::info!(
        requested = kind.as_str(),
        selected = resolved.as_str(),
        "reachability provider selected"
    );
    match resolved {
        ProviderKind::Legacy => Arc::new(LegacyReachability::new(service)),
        _ => Arc::new(CapabilityReachability::new(service)),
    }
}
