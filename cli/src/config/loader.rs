//! Configuration file discovery and loading

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use voquest_core::VoConfig;

const ENV_REGISTRY_URL: &str = "VOQUEST_REGISTRY_URL";
const ENV_TIMEOUT: &str = "VOQUEST_TIMEOUT";
const ENV_USER_AGENT: &str = "VOQUEST_USER_AGENT";
const ENV_MAXREC: &str = "VOQUEST_MAXREC";

/// Resolves the effective [`VoConfig`] for a CLI invocation.
///
/// The first configuration file found wins; only when no file exists do
/// the `VOQUEST_*` environment variables fill in over the built-in
/// defaults. Command-line flags are applied by the caller on top of the
/// result.
pub struct CliConfigLoader {
    explicit_path: Option<PathBuf>,
}

impl CliConfigLoader {
    /// Create a loader, optionally pinned to an explicit file path.
    ///
    /// `~` in the path is expanded.
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        let explicit_path = explicit_path
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()));
        Self { explicit_path }
    }

    /// Load the configuration.
    ///
    /// Without an explicit path the loader tries `./voquest.json`,
    /// `./.voquest/config.json`, and the user configuration directory
    /// (`~/.config/voquest/config.json` on Linux) in that order, reading
    /// the environment only when none exists. An explicit path that cannot
    /// be read is an error rather than a silent fallback.
    pub fn load(&self) -> Result<VoConfig> {
        if let Some(path) = &self.explicit_path {
            return Self::load_file(path);
        }
        if let Some(path) = Self::find_config_file() {
            return Self::load_file(&path);
        }
        debug!("no configuration file found, reading the environment");
        Ok(Self::load_env_only())
    }

    fn find_config_file() -> Option<PathBuf> {
        for candidate in Self::search_paths() {
            if candidate.is_file() {
                debug!("using configuration file {}", candidate.display());
                return Some(candidate);
            }
        }
        None
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("voquest.json"),
            PathBuf::from(".voquest/config.json"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("voquest").join("config.json"));
        }
        paths
    }

    fn load_file(path: &Path) -> Result<VoConfig> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("cannot parse configuration file {}", path.display()))?;
        Ok(config)
    }

    /// Build a configuration from `VOQUEST_*` variables over the defaults
    fn load_env_only() -> VoConfig {
        let mut config = VoConfig::default();
        if let Ok(url) = std::env::var(ENV_REGISTRY_URL) {
            config.registry_base_url = url;
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT) {
            match secs.parse() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => warn!("ignoring non-numeric {}: {}", ENV_TIMEOUT, secs),
            }
        }
        if let Ok(agent) = std::env::var(ENV_USER_AGENT) {
            config.user_agent = agent;
        }
        if let Ok(maxrec) = std::env::var(ENV_MAXREC) {
            match maxrec.parse() {
                Ok(maxrec) => config.max_records = Some(maxrec),
                Err(_) => warn!("ignoring non-numeric {}: {}", ENV_MAXREC, maxrec),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test covers file loading, errors, and the env-only fallback so
    // the VOQUEST_* variables are never touched from two tests at once.
    #[test]
    fn test_explicit_file_env_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voquest.json");
        std::fs::write(&path, r#"{"timeout_secs": 12}"#).unwrap();

        let config = CliConfigLoader::new(Some(path.clone())).load().unwrap();
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(
            config.registry_base_url,
            VoConfig::default().registry_base_url
        );

        std::fs::write(&path, "{nope").unwrap();
        assert!(CliConfigLoader::new(Some(path.clone())).load().is_err());

        let missing = dir.path().join("missing.json");
        assert!(CliConfigLoader::new(Some(missing)).load().is_err());

        std::fs::write(&path, r#"{"timeout_secs": 12}"#).unwrap();
        std::env::set_var(ENV_TIMEOUT, "7");
        std::env::set_var(ENV_MAXREC, "99");
        // a loaded file shuts the environment out entirely
        let from_file = CliConfigLoader::new(Some(path)).load();
        // without a file the environment fills in over the defaults
        let from_env = CliConfigLoader::load_env_only();
        std::env::remove_var(ENV_TIMEOUT);
        std::env::remove_var(ENV_MAXREC);

        let from_file = from_file.unwrap();
        assert_eq!(from_file.timeout_secs, 12);
        assert_eq!(from_file.max_records, None);

        assert_eq!(from_env.timeout_secs, 7);
        assert_eq!(from_env.max_records, Some(99));
        assert_eq!(from_env.user_agent, VoConfig::default().user_agent);
    }

    #[test]
    fn test_search_paths_start_in_cwd() {
        let paths = CliConfigLoader::search_paths();
        assert_eq!(paths[0], PathBuf::from("voquest.json"));
        assert_eq!(paths[1], PathBuf::from(".voquest/config.json"));
    }
}
