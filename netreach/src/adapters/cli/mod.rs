// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser};

use crate::app::channel::CHECK_NETWORK_CONNECTIVITY;
use crate::app::types::ProviderKind;

#[derive(Parser, Debug)]
#[command(
    name = "netreach",
    version,
    about,
    long_about = None,
    after_help = "Reports whether the host has an active network the OS considers internet-capable.\n\
No traffic is sent; the answer comes from the routing table and interface state.\n\
\n\
Configuration precedence: defaults < config file < command-line flags.\n\
Config path precedence: defaults < NETREACH_CONFIG_PATH < command-line flags."
)]
pub struct Opts {
    #[arg(
        value_name = "METHOD",
        default_value = CHECK_NETWORK_CONNECTIVITY,
        help = "Method to invoke on the network channel."
    )]
    pub method: String,
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Path to a TOML config file. When omitted, netreach uses NETREACH_CONFIG_PATH if set, otherwise the default config file location if available."
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PROVIDER",
        help = "Reachability provider: auto, capability or legacy. Overrides `provider` from the config file."
    )]
    pub provider: Option<ProviderKind>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Root of the proc filesystem. Overrides `procfs_root` from the config file."
    )]
    pub procfs_root: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Root of the sys filesystem. Overrides `sysfs_root` from the config file."
    )]
    pub sysfs_root: Option<PathBuf>,
    #[arg(long, help = "Print the response as JSON.")]
    pub json: bool,
    #[arg(
        short,
        long,
        action = clap::ArgAction::SetTrue,
        help = "Enable debug logging. Overrides `verbose` from the config file."
    )]
    pub verbose: bool,
}

pub struct ParsedOpts {
    pub opts: Opts,
    pub verbose_override: Option<bool>,
}

const HELP_TEMPLATE: &str = "{before-help}{about-with-newline}{usage-heading} {usage}
{after-help}

{all-args}
";

pub fn cli_command() -> clap::Command {
    Opts::command().help_template(HELP_TEMPLATE)
}

pub fn parse_opts() -> ParsedOpts {
    let matches = cli_command().get_matches();
    parsed_from_matches(&matches)
}

fn parsed_from_matches(matches: &clap::ArgMatches) -> ParsedOpts {
    let verbose_override = if matches.get_flag("verbose") {
        Some(true)
    } else {
        None
    };
    let opts = Opts::from_arg_matches(matches).unwrap_or_else(|err| err.exit());
    ParsedOpts {
        opts,
        verbose_override,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ParsedOpts {
        let matches = cli_command()
            .try_get_matches_from(args.iter().copied())
            .expect("arguments should parse");
        parsed_from_matches(&matches)
    }

    #[test]
    fn defaults_to_connectivity_check() {
        let parsed = parse(&["netreach"]);
        assert_eq!(parsed.opts.method, CHECK_NETWORK_CONNECTIVITY);
        assert!(parsed.opts.provider.is_none());
        assert!(!parsed.opts.json);
        assert_eq!(parsed.verbose_override, None);
    }

    #[test]
    fn parses_overrides() {
        let parsed = parse(&[
            "netreach",
            "--provider",
            "legacy",
            "--sysfs-root",
            "/tmp/sys",
            "--json",
            "-v",
            "otherMethod",
        ]);
        assert_eq!(parsed.opts.method, "otherMethod");
        assert_eq!(parsed.opts.provider, Some(ProviderKind::Legacy));
        assert_eq!(parsed.opts.sysfs_root, Some(PathBuf::from("/tmp/sys")));
        assert!(parsed.opts.json);
        assert_eq!(parsed.verbose_override, Some(true));
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(
            cli_command()
                .try_get_matches_from(["netreach", "--provider", "modern"])
                .is_err()
        );
    }

    #[test]
    fn command_definition_is_consistent() {
        cli_command().debug_assert();
    }
}
