// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use crate::app::errors::AppResult;
use crate::app::types::{LegacyNetworkInfo, NetworkCapabilities, NetworkHandle};

/// Boundary to the host's connectivity service.
///
/// Implementations read state the OS already tracks; none of these calls
/// may generate network traffic.
pub trait ConnectivityServicePort: Send + Sync {
    /// Whether the host exposes per-network capability sets. When it does
    /// not, only `active_network_info` is meaningful.
    fn capability_api_available(&self) -> bool;

    fn active_network(&self) -> AppResult<Option<NetworkHandle>>;

    fn capabilities(&self, network: &NetworkHandle) -> AppResult<Option<NetworkCapabilities>>;

    fn active_network_info(&self) -> AppResult<Option<LegacyNetworkInfo>>;
}
