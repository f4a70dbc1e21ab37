// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::adapters::linux::{DEFAULT_PROCFS_ROOT, DEFAULT_SYSFS_ROOT};
use crate::app::types::ProviderKind;

const APP_DIR_NAME: &str = "netreach";
const CONFIG_FILE_NAME: &str = "netreach.toml";
const CONFIG_ENV_VAR: &str = "NETREACH_CONFIG_PATH";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    provider: Option<ProviderKind>,
    procfs_root: Option<String>,
    sysfs_root: Option<String>,
    verbose: Option<bool>,
}

#[derive(Debug)]
pub struct Config {
    pub provider: ProviderKind,
    pub procfs_root: PathBuf,
    pub sysfs_root: PathBuf,
    pub verbose: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Override,
    Env,
    ConfigFile,
    Default,
}

impl ConfigSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigSource::Override => "override",
            ConfigSource::Env => "env",
            ConfigSource::ConfigFile => "config",
            ConfigSource::Default => "default",
        }
    }
}

#[derive(Debug)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

#[derive(Debug)]
pub struct ConfigReport {
    pub config_path: Option<PathBuf>,
    pub config_path_source: Option<ConfigSource>,
    pub config_file_present: bool,
    pub provider: ConfigValue<ProviderKind>,
    pub procfs_root: ConfigValue<PathBuf>,
    pub sysfs_root: ConfigValue<PathBuf>,
    pub verbose: ConfigValue<bool>,
}

#[derive(Debug)]
pub struct LoadResult {
    pub config: Config,
    pub report: ConfigReport,
}

#[derive(Debug, Default)]
pub struct Overrides {
    pub provider: Option<ProviderKind>,
    pub procfs_root: Option<PathBuf>,
    pub sysfs_root: Option<PathBuf>,
    pub verbose: Option<bool>,
}

pub fn load(config_path_override: Option<PathBuf>, overrides: Overrides) -> Result<Config> {
    Ok(load_with_report(config_path_override, overrides)?.config)
}

pub fn load_with_report(
    config_path_override: Option<PathBuf>,
    overrides: Overrides,
) -> Result<LoadResult> {
    let (config_path, config_path_source, required) = match config_path_override {
        Some(path) => (Some(expand_path(path)), Some(ConfigSource::Override), true),
        None => match config_path_from_env()? {
            Some(path) => (Some(expand_path(path)), Some(ConfigSource::Env), true),
            None => match default_config_path().ok() {
                Some(path) => (Some(path), Some(ConfigSource::Default), false),
                None => (None, None, false),
            },
        },
    };
    let config_file_present = config_path
        .as_deref()
        .map(|path| path.exists())
        .unwrap_or(false);

    let file_config = match config_path.as_deref() {
        Some(path) => read_config_file(path, required)?,
        None => FileConfig::default(),
    };
    let config_dir = config_path.as_deref().and_then(|path| path.parent());

    let (provider, provider_source) = match overrides.provider {
        Some(provider) => (provider, ConfigSource::Override),
        None => match file_config.provider {
            Some(provider) => (provider, ConfigSource::ConfigFile),
            None => (ProviderKind::default(), ConfigSource::Default),
        },
    };

    let (procfs_root, procfs_source) = resolve_root(
        overrides.procfs_root,
        file_config.procfs_root.as_deref(),
        config_dir,
        DEFAULT_PROCFS_ROOT,
    );
    let (sysfs_root, sysfs_source) = resolve_root(
        overrides.sysfs_root,
        file_config.sysfs_root.as_deref(),
        config_dir,
        DEFAULT_SYSFS_ROOT,
    );

    let (verbose, verbose_source) = match overrides.verbose {
        Some(verbose) => (verbose, ConfigSource::Override),
        None => match file_config.verbose {
            Some(verbose) => (verbose, ConfigSource::ConfigFile),
            None => (false, ConfigSource::Default),
        },
    };

    let config = Config {
        provider,
        procfs_root,
        sysfs_root,
        verbose,
        config_path: config_path.clone(),
    };

    let report = ConfigReport {
        config_path,
        config_path_source,
        config_file_present,
        provider: ConfigValue {
            value: config.provider,
            source: provider_source,
        },
        procfs_root: ConfigValue {
            value: config.procfs_root.clone(),
            source: procfs_source,
        },
        sysfs_root: ConfigValue {
            value: config.sysfs_root.clone(),
            source: sysfs_source,
        },
        verbose: ConfigValue {
            value: config.verbose,
            source: verbose_source,
        },
    };

    Ok(LoadResult { config, report })
}

fn resolve_root(
    flag: Option<PathBuf>,
    from_file: Option<&str>,
    config_dir: Option<&Path>,
    default: &str,
) -> (PathBuf, ConfigSource) {
    match flag {
        Some(path) => (expand_path(path), ConfigSource::Override),
        None => match from_file {
            Some(raw) => (resolve_path(raw, config_dir), ConfigSource::ConfigFile),
            None => (PathBuf::from(default), ConfigSource::Default),
        },
    }
}

fn read_config_file(path: &Path, required: bool) -> Result<FileConfig> {
    if !path.exists() {
        if required {
            anyhow::bail!("config file not found at {}", path.display());
        }
        return Ok(FileConfig::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn resolve_path(raw: &str, base_dir: Option<&Path>) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        return path;
    }
    match base_dir {
        Some(dir) => dir.join(path),
        None => path,
    }
}

fn expand_path(path: PathBuf) -> PathBuf {
    let path_string = path.to_string_lossy().to_string();
    let expanded = shellexpand::tilde(&path_string);
    PathBuf::from(expanded.as_ref())
}

fn config_path_from_env() -> Result<Option<PathBuf>> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(value) => {
            if value.is_empty() {
                anyhow::bail!("{CONFIG_ENV_VAR} is set but empty");
            }
            Ok(Some(PathBuf::from(value)))
        }
        None => Ok(None),
    }
}

fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("failed to resolve config directory")?;
    Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvVarGuard {
        key: &'static str,
        prev: Option<OsString>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prev = std::env::var_os(key);
            // SAFETY: tests serialize env mutations with ENV_LOCK.
            unsafe {
                std::env::set_var(key, value);
            }
            Self { key, prev }
        }

        fn clear(key: &'static str) -> Self {
            let prev = std::env::var_os(key);
            // SAFETY: tests serialize env mutations with ENV_LOCK.
            unsafe {
                std::env::remove_var(key);
            }
            Self { key, prev }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match &self.prev {
                Some(value) => {
                    // SAFETY: tests serialize env mutations with ENV_LOCK.
                    unsafe {
                        std::env::set_var(self.key, value);
                    }
                }
                None => {
                    // SAFETY: tests serialize env mutations with ENV_LOCK.
                    unsafe {
                        std::env::remove_var(self.key);
                    }
                }
            }
        }
    }

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let config_dir = dir.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        let config_path = config_dir.join("netreach.toml");
        fs::write(&config_path, contents).unwrap();
        config_path
    }

    #[test]
    fn missing_optional_config_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let cfg = read_config_file(&dir.path().join("missing.toml"), false).unwrap();
        assert!(cfg.provider.is_none());
        assert!(cfg.sysfs_root.is_none());
    }

    #[test]
    fn missing_required_config_file_errors() {
        let dir = TempDir::new().unwrap();
        let err = load(Some(dir.path().join("missing.toml")), Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "check_host = \"1.1.1.1\"\n");
        let err = load(Some(config_path), Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn resolves_relative_roots_from_config_dir() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            "provider = \"legacy\"\nprocfs_root = \"fixtures/proc\"\nsysfs_root = \"/srv/sys\"\n",
        );
        let LoadResult { config, report } =
            load_with_report(Some(config_path.clone()), Overrides::default()).unwrap();
        let config_dir = dir.path().join("config");
        assert_eq!(config.provider, ProviderKind::Legacy);
        assert_eq!(config.procfs_root, config_dir.join("fixtures").join("proc"));
        assert_eq!(config.sysfs_root, PathBuf::from("/srv/sys"));
        assert!(!config.verbose);
        assert_eq!(config.config_path, Some(config_path));
        assert!(report.config_file_present);
        assert_eq!(report.provider.source, ConfigSource::ConfigFile);
        assert_eq!(report.verbose.source, ConfigSource::Default);
    }

    #[test]
    fn cli_overrides_take_precedence_over_file_config() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            "provider = \"legacy\"\nsysfs_root = \"sys\"\nverbose = false\n",
        );
        let LoadResult { config, report } = load_with_report(
            Some(config_path),
            Overrides {
                provider: Some(ProviderKind::Capability),
                procfs_root: None,
                sysfs_root: Some(PathBuf::from("/tmp/sys")),
                verbose: Some(true),
            },
        )
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Capability);
        assert_eq!(config.sysfs_root, PathBuf::from("/tmp/sys"));
        assert_eq!(config.procfs_root, PathBuf::from(DEFAULT_PROCFS_ROOT));
        assert!(config.verbose);
        assert_eq!(report.sysfs_root.source, ConfigSource::Override);
        assert_eq!(report.procfs_root.source, ConfigSource::Default);
    }

    #[test]
    fn env_config_path_is_used_when_no_flag() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "provider = \"capability\"\n");
        let _guard = EnvVarGuard::set(CONFIG_ENV_VAR, config_path.to_str().unwrap());
        let LoadResult { config, report } = load_with_report(None, Overrides::default()).unwrap();
        assert_eq!(config.provider, ProviderKind::Capability);
        assert_eq!(report.config_path_source, Some(ConfigSource::Env));
    }

    #[test]
    fn empty_env_config_path_errors() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvVarGuard::set(CONFIG_ENV_VAR, "");
        let err = load(None, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("is set but empty"));
    }

    #[test]
    fn defaults_apply_without_any_config() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvVarGuard::clear(CONFIG_ENV_VAR);
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "");
        let config = load(Some(config_path), Overrides::default()).unwrap();
        assert_eq!(config.provider, ProviderKind::Auto);
        assert_eq!(config.procfs_root, PathBuf::from(DEFAULT_PROCFS_ROOT));
        assert_eq!(config.sysfs_root, PathBuf::from(DEFAULT_SYSFS_ROOT));
    }
}
