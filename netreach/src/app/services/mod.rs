// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

pub mod reachability;

pub use reachability::{
    CapabilityReachability, LegacyReachability, ReachabilityProvider, select_provider,
};
