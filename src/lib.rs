//! netprop
//!
//! Seed-based network propagation on protein/gene interaction networks:
//! - Edge-list loading into a petgraph interaction graph
//! - Seed identifier reconciliation (canonical, prefix, version-suffix)
//! - DIAMOnD module expansion driven by hypergeometric tests
//! - Random walk with restart over sparse or dense transition operators
//! - Module tables, gene lists and run summaries for downstream analysis

pub mod error;
pub mod graph;
pub mod pipeline;
pub mod propagation;
pub mod report;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{ErrorKind, PropagationError, Result};

use serde::Deserialize;
use std::path::{Path, PathBuf};

use propagation::{DiamondConfig, RwrConfig};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "netprop.yaml";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub diamond: DiamondConfig,
    pub rwr: RwrConfig,
    pub output: OutputYamlConfig,
}

/// Output configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputYamlConfig {
    pub dir: PathBuf,
}

impl Default for OutputYamlConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub diamond: DiamondConfig,
    pub rwr: RwrConfig,
    /// Directory result files are written into
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let yaml = YamlConfig::default();
        Self {
            diamond: yaml.diamond,
            rwr: yaml.rwr,
            output_dir: yaml.output.dir,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| PropagationError::InvalidConfig(format!("{name}={raw:?}: {e}")))
}

impl Config {
    /// Load configuration from `netprop.yaml` (if present) and env vars.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries `netprop.yaml` in CWD and falls back to
    /// defaults when it is missing or unparsable. An explicitly given file
    /// that cannot be read or parsed is an error.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path)?;

        // 2. Apply env var overrides
        let mut config = Self {
            diamond: yaml.diamond,
            rwr: yaml.rwr,
            output_dir: yaml.output.dir,
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Override fields from `NETPROP_*` variables returned by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        macro_rules! override_from {
            ($var:literal, $field:expr) => {
                if let Some(raw) = lookup($var) {
                    $field = parse_env($var, &raw)?;
                }
            };
        }

        override_from!("NETPROP_SIGNIFICANCE_CUTOFF", self.diamond.significance_cutoff);
        override_from!("NETPROP_DIAMOND_MAX_ADDED", self.diamond.max_added);
        override_from!("NETPROP_DIAMOND_MAX_ITERATIONS", self.diamond.max_iterations);
        override_from!("NETPROP_RESTART_PROBABILITY", self.rwr.restart_probability);
        override_from!("NETPROP_TOLERANCE", self.rwr.tolerance);
        override_from!("NETPROP_RWR_MAX_ITERATIONS", self.rwr.max_iterations);
        override_from!("NETPROP_TOP_K", self.rwr.top_k);
        override_from!("NETPROP_OPERATOR", self.rwr.operator);
        override_from!("NETPROP_DENSE_THRESHOLD", self.rwr.dense_threshold);
        if let Some(dir) = lookup("NETPROP_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Check every parameter range.
    pub fn validate(&self) -> Result<()> {
        self.diamond.validate()?;
        self.rwr.validate()
    }

    /// Load and parse a YAML config file.
    fn load_yaml(yaml_path: Option<&Path>) -> Result<YamlConfig> {
        if let Some(path) = yaml_path {
            let contents =
                std::fs::read_to_string(path).map_err(|source| PropagationError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            let config = serde_yaml::from_str(&contents).map_err(|e| {
                PropagationError::InvalidConfig(format!("{}: {}", path.display(), e))
            })?;
            tracing::info!("Loaded config from {}", path.display());
            return Ok(config);
        }

        let path = Path::new(DEFAULT_CONFIG_FILE);
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    Ok(config)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Ok(YamlConfig::default())
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                Ok(YamlConfig::default())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::propagation::OperatorKind;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
diamond:
  significance_cutoff: 0.01
  max_added: 50

rwr:
  restart_probability: 0.3
  top_k: 20
  operator: dense

output:
  dir: /tmp/netprop-out
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert!((config.diamond.significance_cutoff - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.diamond.max_added, 50);
        assert_eq!(config.diamond.max_iterations, 200);
        assert!((config.rwr.restart_probability - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.rwr.top_k, 20);
        assert_eq!(config.rwr.operator, OperatorKind::Dense);
        assert_eq!(config.output.dir, PathBuf::from("/tmp/netprop-out"));
    }

    #[test]
    fn test_yaml_defaults() {
        let config = Config::default();
        assert_eq!(config.diamond, DiamondConfig::default());
        assert_eq!(config.rwr, RwrConfig::default());
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_yaml() {
        let mut config = Config::default();
        config
            .apply_env_overrides(lookup(&[
                ("NETPROP_SIGNIFICANCE_CUTOFF", "0.1"),
                ("NETPROP_TOP_K", " 7 "),
                ("NETPROP_OPERATOR", "sparse"),
                ("NETPROP_OUTPUT_DIR", "out/run1"),
            ]))
            .unwrap();
        assert!((config.diamond.significance_cutoff - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.rwr.top_k, 7);
        assert_eq!(config.rwr.operator, OperatorKind::Sparse);
        assert_eq!(config.output_dir, PathBuf::from("out/run1"));
        assert_eq!(config.diamond.max_added, 100);
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(lookup(&[("NETPROP_DIAMOND_MAX_ADDED", "lots")]))
            .unwrap_err();
        assert!(matches!(err, PropagationError::InvalidConfig(_)));
        assert!(err.to_string().contains("NETPROP_DIAMOND_MAX_ADDED"));
    }

    #[test]
    fn test_explicit_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("netprop.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(b"rwr:\n  max_iterations: 30\n").unwrap();

        let yaml = Config::load_yaml(Some(&file_path)).unwrap();
        assert_eq!(yaml.rwr.max_iterations, 30);
        assert_eq!(yaml.diamond, DiamondConfig::default());
    }

    #[test]
    fn test_explicit_yaml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let err = Config::load_yaml(Some(&missing)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);

        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "diamond: [not, a, map]\n").unwrap();
        let err = Config::load_yaml(Some(&broken)).unwrap_err();
        assert!(matches!(err, PropagationError::InvalidConfig(_)));
    }
}
