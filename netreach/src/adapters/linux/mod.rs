// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;

use crate::app::errors::{AppError, AppErrorKind, AppResult, codes};
use crate::app::ports::ConnectivityServicePort;
use crate::app::types::{
    Capability, CapabilitySet, LegacyNetworkInfo, NetworkCapabilities, NetworkHandle, Transport,
};

pub mod iface;
pub mod route;

use route::DefaultRoute;

pub const DEFAULT_PROCFS_ROOT: &str = "/proc";
pub const DEFAULT_SYSFS_ROOT: &str = "/sys";

#[derive(ThisError, Debug)]
pub enum LinuxNetError {
    #[error("couldn't read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

fn map_net_error(err: LinuxNetError) -> AppError {
    match &err {
        LinuxNetError::Read { path, .. } => AppError::with_message(
            AppErrorKind::Unavailable,
            codes::OS_QUERY_FAILED,
            err.to_string(),
        )
        .with_context(path.display().to_string()),
    }
}

/// Connectivity service backed by the kernel routing table and the
/// `net` class in sysfs.
#[derive(Debug, Clone)]
pub struct LinuxConnectivity {
    procfs_root: PathBuf,
    sysfs_root: PathBuf,
}

impl Default for LinuxConnectivity {
    fn default() -> Self {
        Self::new(DEFAULT_PROCFS_ROOT, DEFAULT_SYSFS_ROOT)
    }
}

impl LinuxConnectivity {
    pub fn new(procfs_root: impl Into<PathBuf>, sysfs_root: impl Into<PathBuf>) -> Self {
        Self {
            procfs_root: procfs_root.into(),
            sysfs_root: sysfs_root.into(),
        }
    }

    fn ipv4_route_path(&self) -> PathBuf {
        self.procfs_root.join("net").join("route")
    }

    fn ipv6_route_path(&self) -> PathBuf {
        self.procfs_root.join("net").join("ipv6_route")
    }

    fn default_routes(&self) -> Result<Vec<DefaultRoute>, LinuxNetError> {
        let mut routes = Vec::new();
        if let Some(contents) = read_optional(&self.ipv4_route_path())? {
            routes.extend(route::ipv4_default_routes(&contents));
        }
        if let Some(contents) = read_optional(&self.ipv6_route_path())? {
            routes.extend(route::ipv6_default_routes(&contents));
        }
        Ok(routes)
    }

    fn interface(&self, name: &str) -> Result<Option<iface::InterfaceState>, LinuxNetError> {
        iface::read_interface(&self.sysfs_root, name).map_err(|source| LinuxNetError::Read {
            path: iface::net_class_dir(&self.sysfs_root).join(name),
            source,
        })
    }

    fn find_active_network(&self) -> Result<Option<NetworkHandle>, LinuxNetError> {
        let mut best: Option<DefaultRoute> = None;
        for candidate in self.default_routes()? {
            let operational = match self.interface(&candidate.interface) {
                Ok(state) => {
                    state.is_some_and(|state| state.is_operational() && !state.is_loopback())
                }
                Err(err) => {
                    tracing::debug!(interface = %candidate.interface, "skipping default route: {err}");
                    continue;
                }
            };
            if !operational {
                tracing::trace!(interface = %candidate.interface, "default route on inactive interface");
                continue;
            }
            let better = match &best {
                Some(current) => {
                    (candidate.metric, candidate.family) < (current.metric, current.family)
                }
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }
        Ok(best.map(|route| NetworkHandle {
            interface: route.interface,
            family: route.family,
            metric: route.metric,
        }))
    }

    fn find_capabilities(
        &self,
        network: &NetworkHandle,
    ) -> Result<Option<NetworkCapabilities>, LinuxNetError> {
        let Some(state) = self.interface(&network.interface)? else {
            return Ok(None);
        };
        let transport = state.transport();
        let operational = state.is_operational();
        let mut capabilities = CapabilitySet::empty();
        if operational {
            capabilities.insert(Capability::Running);
        }
        if transport != Transport::Vpn {
            capabilities.insert(Capability::NotVpn);
        }
        if operational && transport != Transport::Loopback {
            let routed = self
                .default_routes()?
                .iter()
                .any(|route| route.interface == network.interface);
            if routed {
                capabilities.insert(Capability::Internet);
            }
        }
        Ok(Some(NetworkCapabilities {
            transport,
            capabilities,
        }))
    }

    fn find_active_network_info(&self) -> Result<Option<LegacyNetworkInfo>, LinuxNetError> {
        let names = iface::list_interfaces(&self.sysfs_root).map_err(|source| {
            LinuxNetError::Read {
                path: iface::net_class_dir(&self.sysfs_root),
                source,
            }
        })?;
        // Prefer the interface actually carrying traffic; an up bridge with no
        // carrier (docker0, virbr0) must not shadow the uplink.
        let mut fallback: Option<LegacyNetworkInfo> = None;
        for name in names {
            let state = match self.interface(&name) {
                Ok(Some(state)) => state,
                Ok(None) => continue,
                Err(err) => {
                    tracing::debug!(interface = %name, "skipping interface: {err}");
                    continue;
                }
            };
            if state.is_loopback() || !state.is_up() {
                continue;
            }
            if state.is_operational() {
                return Ok(Some(LegacyNetworkInfo {
                    interface: state.name,
                    is_connected: true,
                }));
            }
            if fallback.is_none() {
                fallback = Some(LegacyNetworkInfo {
                    interface: state.name,
                    is_connected: false,
                });
            }
        }
        Ok(fallback)
    }
}

impl ConnectivityServicePort for LinuxConnectivity {
    fn capability_api_available(&self) -> bool {
        self.ipv4_route_path().exists()
    }

    fn active_network(&self) -> AppResult<Option<NetworkHandle>> {
        self.find_active_network().map_err(map_net_error)
    }

    fn capabilities(&self, network: &NetworkHandle) -> AppResult<Option<NetworkCapabilities>> {
        self.find_capabilities(network).map_err(map_net_error)
    }

    fn active_network_info(&self) -> AppResult<Option<LegacyNetworkInfo>> {
        self.find_active_network_info().map_err(map_net_error)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, LinuxNetError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LinuxNetError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
