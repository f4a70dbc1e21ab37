// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::fs;
use std::path::Path;
use std::sync::Arc;

use netreach::adapters::linux::LinuxConnectivity;
use netreach::app::channel::{
    CHECK_NETWORK_CONNECTIVITY, MethodCall, MethodResponse, network_channel,
};
use netreach::app::services::select_provider;
use netreach::app::types::ProviderKind;
use serde_json::Value;
use tempfile::TempDir;

const ROUTE_HEADER: &str =
    "Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT\n";

struct Host {
    dir: TempDir,
}

impl Host {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("sys/class/net")).expect("sysfs");
        let host = Self { dir };
        host.iface("lo", "unknown", "0x49", "772");
        host
    }

    fn with_route_table(self, lines: &[&str]) -> Self {
        fs::create_dir_all(self.dir.path().join("proc/net")).expect("procfs");
        let mut contents = ROUTE_HEADER.to_string();
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        fs::write(self.dir.path().join("proc/net/route"), contents).expect("route table");
        self
    }

    fn iface(&self, name: &str, operstate: &str, flags: &str, arp_type: &str) -> &Self {
        let dir = self.dir.path().join("sys/class/net").join(name);
        fs::create_dir_all(&dir).expect("iface dir");
        write(&dir, "operstate", operstate);
        write(&dir, "flags", flags);
        write(&dir, "type", arp_type);
        self
    }

    fn wireless(&self, name: &str) {
        let dir = self.dir.path().join("sys/class/net").join(name);
        fs::create_dir_all(dir.join("wireless")).expect("wireless dir");
    }

    fn check(&self, kind: ProviderKind) -> MethodResponse {
        self.call(kind, CHECK_NETWORK_CONNECTIVITY)
    }

    fn call(&self, kind: ProviderKind, method: &str) -> MethodResponse {
        let service = Arc::new(LinuxConnectivity::new(
            self.dir.path().join("proc"),
            self.dir.path().join("sys"),
        ));
        let channel = network_channel(select_provider(kind, service));
        channel.invoke(&MethodCall::new(method))
    }
}

fn write(dir: &Path, attr: &str, value: &str) {
    fs::write(dir.join(attr), format!("{value}\n")).expect("attr");
}

fn reachable(value: bool) -> MethodResponse {
    MethodResponse::Success(Value::Bool(value))
}

#[test]
fn no_interfaces_up_is_not_reachable() {
    let host = Host::new().with_route_table(&[]);
    host.iface("eth0", "down", "0x1002", "1");
    assert_eq!(host.check(ProviderKind::Auto), reachable(false));
    assert_eq!(host.check(ProviderKind::Legacy), reachable(false));
}

#[test]
fn wifi_with_default_route_is_reachable() {
    let host = Host::new().with_route_table(&[
        "wlan0\t00000000\t0102A8C0\t0003\t0\t0\t600\t00000000\t0\t0\t0",
        "wlan0\t0002A8C0\t00000000\t0001\t0\t0\t600\t00FFFFFF\t0\t0\t0",
    ]);
    host.iface("wlan0", "up", "0x1043", "1");
    host.wireless("wlan0");
    assert_eq!(host.check(ProviderKind::Auto), reachable(true));
}

#[test]
fn airplane_mode_is_not_reachable() {
    let host = Host::new().with_route_table(&[]);
    host.iface("wlan0", "down", "0x1002", "1");
    host.wireless("wlan0");
    assert_eq!(host.check(ProviderKind::Capability), reachable(false));
}

#[test]
fn link_without_default_route_is_not_reachable() {
    let host = Host::new()
        .with_route_table(&["eth0\t0002A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\t0\t0\t0"]);
    host.iface("eth0", "up", "0x1043", "1");
    assert_eq!(host.check(ProviderKind::Capability), reachable(false));
}

#[test]
fn default_route_on_downed_interface_is_not_reachable() {
    let host = Host::new()
        .with_route_table(&["eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0"]);
    host.iface("eth0", "down", "0x1002", "1");
    assert_eq!(host.check(ProviderKind::Capability), reachable(false));
}

#[test]
fn missing_route_table_falls_back_to_connected_flag() {
    let host = Host::new();
    host.iface("eth0", "up", "0x1043", "1");
    assert_eq!(host.check(ProviderKind::Auto), reachable(true));
    assert_eq!(host.check(ProviderKind::Capability), reachable(false));
}

#[test]
fn repeated_checks_return_the_same_answer() {
    let host = Host::new()
        .with_route_table(&["eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0"]);
    host.iface("eth0", "up", "0x1043", "1");
    let first = host.check(ProviderKind::Auto);
    for _ in 0..5 {
        assert_eq!(host.check(ProviderKind::Auto), first);
    }
    assert_eq!(first, reachable(true));
}

#[test]
fn unsupported_method_is_not_implemented() {
    let host = Host::new().with_route_table(&[]);
    assert_eq!(
        host.call(ProviderKind::Auto, "getBatteryLevel"),
        MethodResponse::NotImplemented
    );
}

#[test]
fn state_changes_are_seen_on_next_check() {
    let host = Host::new()
        .with_route_table(&["eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0"]);
    host.iface("eth0", "up", "0x1043", "1");
    assert_eq!(host.check(ProviderKind::Capability), reachable(true));
    host.iface("eth0", "down", "0x1002", "1");
    assert_eq!(host.check(ProviderKind::Capability), reachable(false));
}

#[test]
fn legacy_check_ignores_bonding_masters_file() {
    let host = Host::new();
    host.iface("eth0", "up", "0x1043", "1");
    fs::write(
        host.dir.path().join("sys/class/net/bonding_masters"),
        "\n",
    )
    .expect("bonding_masters");
    assert_eq!(host.check(ProviderKind::Legacy), reachable(true));
}

#[test]
fn legacy_check_sees_uplink_behind_idle_bridge() {
    let host = Host::new();
    host.iface("docker0", "down", "0x1003", "1");
    host.iface("wlan0", "up", "0x1043", "1");
    host.wireless("wlan0");
    assert_eq!(host.check(ProviderKind::Legacy), reachable(true));
}
