// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::process::ExitCode;
use std::sync::Arc;

use netreach::adapters;
use netreach::adapters::linux::LinuxConnectivity;
use netreach::app::channel::{MethodCall, network_channel};
use netreach::app::services::select_provider;
use netreach::config;
use netreach::logging;

fn log_config_report(report: &config::ConfigReport) {
    match (&report.config_path, report.config_path_source) {
        (Some(path), Some(source)) => {
            tracing::info!(
                "config path: {} (source={}, present={})",
                path.display(),
                source.as_str(),
                report.config_file_present
            );
        }
        (Some(path), None) => {
            tracing::info!(
                "config path: {} (present={})",
                path.display(),
                report.config_file_present
            );
        }
        (None, _) => {
            tracing::info!("config path: (none)");
        }
    }
    tracing::info!(
        "config provider: {} (source={})",
        report.provider.value,
        report.provider.source.as_str()
    );
    tracing::info!(
        "config procfs_root: {} (source={})",
        report.procfs_root.value.display(),
        report.procfs_root.source.as_str()
    );
    tracing::info!(
        "config sysfs_root: {} (source={})",
        report.sysfs_root.value.display(),
        report.sysfs_root.source.as_str()
    );
    tracing::info!(
        "config verbose: {} (source={})",
        report.verbose.value,
        report.verbose.source.as_str()
    );
}

fn main() -> anyhow::Result<ExitCode> {
    let parsed = adapters::cli::parse_opts();
    let opts = parsed.opts;
    let config::LoadResult { config, report } = config::load_with_report(
        opts.config,
        config::Overrides {
            provider: opts.provider,
            procfs_root: opts.procfs_root,
            sysfs_root: opts.sysfs_root,
            verbose: parsed.verbose_override,
        },
    )?;
    let _log_guard = logging::init(config.verbose);
    log_config_report(&report);

    let service = Arc::new(LinuxConnectivity::new(
        config.procfs_root,
        config.sysfs_root,
    ));
    let provider = select_provider(config.provider, service);
    let channel = network_channel(provider);

    let response = channel.invoke(&MethodCall::new(opts.method.as_str()));
    let rendered = adapters::presentation::render(&opts.method, &response, opts.json);
    if let Some(text) = rendered.stdout {
        println!("{text}");
    }
    if let Some(text) = rendered.stderr {
        eprintln!("{text}");
    }
    // Returning instead of exiting lets the log guard flush the file writer.
    Ok(ExitCode::from(u8::try_from(rendered.exit_code).unwrap_or(1)))
}
