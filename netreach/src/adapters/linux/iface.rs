// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app::types::Transport;

const IFF_UP: u32 = 0x1;
const IFF_LOOPBACK: u32 = 0x8;
const IFF_RUNNING: u32 = 0x40;
const ARPHRD_ETHER: u32 = 1;
const ARPHRD_LOOPBACK: u32 = 772;
const ARPHRD_NONE: u32 = 65534;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperState {
    Up,
    Down,
    Dormant,
    Unknown,
    Other,
}

impl OperState {
    fn parse(raw: &str) -> Self {
        match raw.trim() {
            "up" => OperState::Up,
            "down" | "lowerlayerdown" | "notpresent" => OperState::Down,
            "dormant" => OperState::Dormant,
            "unknown" | "" => OperState::Unknown,
            _ => OperState::Other,
        }
    }
}

/// Interface state read from `<sysfs>/class/net/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceState {
    pub name: String,
    pub operstate: OperState,
    pub flags: u32,
    pub carrier: Option<bool>,
    pub arp_type: Option<u32>,
    pub wireless: bool,
    pub tun: bool,
    pub devtype: Option<String>,
}

impl InterfaceState {
    pub fn is_up(&self) -> bool {
        self.flags & IFF_UP != 0
    }

    pub fn is_loopback(&self) -> bool {
        self.flags & IFF_LOOPBACK != 0 || self.arp_type == Some(ARPHRD_LOOPBACK)
    }

    /// Up at the link layer and passing traffic. Drivers that never report
    /// an operstate leave it `unknown`; the flags decide for those.
    pub fn is_operational(&self) -> bool {
        if self.carrier == Some(false) {
            return false;
        }
        match self.operstate {
            OperState::Up => true,
            OperState::Unknown => self.flags & (IFF_UP | IFF_RUNNING) == (IFF_UP | IFF_RUNNING),
            _ => false,
        }
    }

    pub fn transport(&self) -> Transport {
        if self.is_loopback() {
            return Transport::Loopback;
        }
        if self.wireless || self.devtype.as_deref() == Some("wlan") {
            return Transport::Wifi;
        }
        if self.tun
            || matches!(self.devtype.as_deref(), Some("wireguard") | Some("tun"))
            || self.arp_type == Some(ARPHRD_NONE)
        {
            return Transport::Vpn;
        }
        if self.arp_type == Some(ARPHRD_ETHER) {
            return Transport::Ethernet;
        }
        Transport::Other
    }
}

pub fn net_class_dir(sysfs_root: &Path) -> PathBuf {
    sysfs_root.join("class").join("net")
}

/// Interface names under the net class directory, sorted. A missing
/// directory yields an empty list.
pub fn list_interfaces(sysfs_root: &Path) -> io::Result<Vec<String>> {
    let dir = net_class_dir(sysfs_root);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        // bonding_masters and friends are plain files
        if !entry.path().is_dir() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}

/// Reads one interface. `Ok(None)` when the interface does not exist.
pub fn read_interface(sysfs_root: &Path, name: &str) -> io::Result<Option<InterfaceState>> {
    let dir = net_class_dir(sysfs_root).join(name);
    if !dir.is_dir() {
        return Ok(None);
    }

    let operstate = read_attr(&dir, "operstate")?
        .map(|raw| OperState::parse(&raw))
        .unwrap_or(OperState::Unknown);
    let flags = read_attr(&dir, "flags")?
        .and_then(|raw| parse_hex(&raw))
        .unwrap_or(0);
    let carrier = read_optional_attr(&dir, "carrier").and_then(|raw| match raw.trim() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    });
    let arp_type = read_attr(&dir, "type")?.and_then(|raw| raw.trim().parse::<u32>().ok());
    let devtype = read_optional_attr(&dir, "uevent").and_then(|raw| {
        raw.lines()
            .find_map(|line| line.strip_prefix("DEVTYPE="))
            .map(|value| value.trim().to_string())
    });

    Ok(Some(InterfaceState {
        name: name.to_string(),
        operstate,
        flags,
        carrier,
        arp_type,
        wireless: dir.join("wireless").exists() || dir.join("phy80211").exists(),
        tun: dir.join("tun_flags").exists(),
        devtype,
    }))
}

fn parse_hex(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(digits, 16).ok()
}

fn read_attr(dir: &Path, attr: &str) -> io::Result<Option<String>> {
    match fs::read_to_string(dir.join(attr)) {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

// carrier reads fail with EINVAL while the interface is administratively down.
fn read_optional_attr(dir: &Path, attr: &str) -> Option<String> {
    fs::read_to_string(dir.join(attr)).ok()
}
