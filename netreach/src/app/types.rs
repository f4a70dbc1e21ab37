// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "ipv4"),
            AddressFamily::V6 => write!(f, "ipv6"),
        }
    }
}

/// The network the OS would use for outbound traffic right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHandle {
    pub interface: String,
    pub family: AddressFamily,
    pub metric: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Internet,
    NotVpn,
    Running,
}

impl Capability {
    const ALL: [Capability; 3] = [Capability::Internet, Capability::NotVpn, Capability::Running];

    fn bit(self) -> u8 {
        match self {
            Capability::Internet => 1 << 0,
            Capability::NotVpn => 1 << 1,
            Capability::Running => 1 << 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Internet => "internet",
            Capability::NotVpn => "not_vpn",
            Capability::Running => "running",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Capability::as_str).collect();
        write!(f, "[{}]", names.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Ethernet,
    Wifi,
    Vpn,
    Loopback,
    Other,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Ethernet => "ethernet",
            Transport::Wifi => "wifi",
            Transport::Vpn => "vpn",
            Transport::Loopback => "loopback",
            Transport::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkCapabilities {
    pub transport: Transport,
    pub capabilities: CapabilitySet,
}

impl NetworkCapabilities {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Connection info as reported by hosts without a capability API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyNetworkInfo {
    pub interface: String,
    pub is_connected: bool,
}

/// Point-in-time read of the host's network state. Built per check and
/// dropped once the boolean answer is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkCapabilitySnapshot {
    pub has_active_network: bool,
    pub has_internet_capability: bool,
}

impl NetworkCapabilitySnapshot {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_internet_reachable(&self) -> bool {
        self.has_active_network && self.has_internet_capability
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Auto,
    Capability,
    Legacy,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Auto => "auto",
            ProviderKind::Capability => "capability",
            ProviderKind::Legacy => "legacy",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProviderKindError(pub String);

impl fmt::Display for ParseProviderKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown provider '{}' (expected auto, capability or legacy)",
            self.0
        )
    }
}

impl std::error::Error for ParseProviderKindError {}

impl FromStr for ProviderKind {
    type Err = ParseProviderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ProviderKind::Auto),
            "capability" => Ok(ProviderKind::Capability),
            "legacy" => Ok(ProviderKind::Legacy),
            _ => Err(ParseProviderKindError(s.to_string())),
        }
    }
}
