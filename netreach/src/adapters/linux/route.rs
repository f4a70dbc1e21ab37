// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use thiserror::Error as ThisError;

use crate::app::types::AddressFamily;

const RTF_UP: u32 = 0x0001;
const RTF_REJECT: u32 = 0x0200;
const LOOPBACK_IFACE: &str = "lo";

/// A default route found in the kernel routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRoute {
    pub interface: String,
    pub family: AddressFamily,
    pub metric: u32,
}

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum RouteParseError {
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("invalid {field} value '{value}'")]
    InvalidField { field: &'static str, value: String },
}

fn hex_u32(field: &'static str, value: &str) -> Result<u32, RouteParseError> {
    u32::from_str_radix(value, 16).map_err(|_| RouteParseError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Parse one data line of `/proc/net/route`.
///
/// Returns `Ok(None)` for lines that are valid but not a usable default route.
pub fn parse_ipv4_route_line(line: &str) -> Result<Option<DefaultRoute>, RouteParseError> {
    const EXPECTED: usize = 8;

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < EXPECTED {
        return Err(RouteParseError::MissingFields {
            expected: EXPECTED,
            found: fields.len(),
        });
    }

    let interface = fields[0];
    let destination = hex_u32("destination", fields[1])?;
    let flags = hex_u32("flags", fields[3])?;
    let metric = fields[6]
        .parse::<u32>()
        .map_err(|_| RouteParseError::InvalidField {
            field: "metric",
            value: fields[6].to_string(),
        })?;
    let mask = hex_u32("mask", fields[7])?;

    if destination != 0 || mask != 0 || !usable(flags, interface) {
        return Ok(None);
    }
    Ok(Some(DefaultRoute {
        interface: interface.to_string(),
        family: AddressFamily::V4,
        metric,
    }))
}

/// Parse one line of `/proc/net/ipv6_route`.
pub fn parse_ipv6_route_line(line: &str) -> Result<Option<DefaultRoute>, RouteParseError> {
    const EXPECTED: usize = 10;

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < EXPECTED {
        return Err(RouteParseError::MissingFields {
            expected: EXPECTED,
            found: fields.len(),
        });
    }

    let destination = fields[0];
    if destination.len() != 32 || !destination.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RouteParseError::InvalidField {
            field: "destination",
            value: destination.to_string(),
        });
    }
    let prefix_len = hex_u32("prefix length", fields[1])?;
    let metric = hex_u32("metric", fields[5])?;
    let flags = hex_u32("flags", fields[8])?;
    let interface = fields[9];

    let is_default = destination.chars().all(|c| c == '0') && prefix_len == 0;
    if !is_default || !usable(flags, interface) {
        return Ok(None);
    }
    Ok(Some(DefaultRoute {
        interface: interface.to_string(),
        family: AddressFamily::V6,
        metric,
    }))
}

fn usable(flags: u32, interface: &str) -> bool {
    flags & RTF_UP != 0 && flags & RTF_REJECT == 0 && interface != LOOPBACK_IFACE
}

/// Default routes in `/proc/net/route` contents. The header line and
/// malformed lines are skipped.
pub fn ipv4_default_routes(contents: &str) -> Vec<DefaultRoute> {
    contents
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_ipv4_route_line(line) {
            Ok(route) => route,
            Err(err) => {
                tracing::trace!("skipping ipv4 route line '{line}': {err}");
                None
            }
        })
        .collect()
}

/// Default routes in `/proc/net/ipv6_route` contents (no header).
pub fn ipv6_default_routes(contents: &str) -> Vec<DefaultRoute> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_ipv6_route_line(line) {
            Ok(route) => route,
            Err(err) => {
                tracing::trace!("skipping ipv6 route line '{line}': {err}");
                None
            }
        })
        .collect()
}
