//! Engine configuration, persisted as TOML.
//!
//! Every field has a default, so an empty or missing file yields the reference
//! behavior. The two open design choices (confidence floor and adjacency scope)
//! are explicit settings rather than hard-coded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::reach::MAX_REACH_DEPTH;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// How stale confidences are kept above zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceFloor {
    /// The decay term never drops below 0.001, so confidence stays positive.
    #[default]
    Epsilon,
    /// No decay floor; the final confidence is clamped at 0.0.
    Zero,
}

/// Which triples contribute edges to the generic graph.
///
/// The Markov model always uses `follows` edges only, regardless of this setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyScope {
    /// Every predicate is an edge (`follows` and `leads_to`).
    #[default]
    AllPredicates,
    /// Only sequential `follows` edges.
    FollowsOnly,
}

/// Configuration for the iteration pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub confidence_floor: ConfidenceFloor,
    /// Confidence lost per iteration since a fact was last seen.
    #[serde(default = "default_decay")]
    pub decay_per_iteration: f64,
    #[serde(default)]
    pub adjacency_scope: AdjacencyScope,
    /// Hop limit for influence scoring.
    #[serde(default = "default_reach_depth")]
    pub reach_depth: usize,
    /// Stride prime for each generation step after the seed.
    #[serde(default = "default_walk_primes")]
    pub walk_primes: Vec<u64>,
    /// Number of inference records reported as samples.
    #[serde(default = "default_sample_limit")]
    pub inference_sample_limit: usize,
    /// Number of nodes reported by influence ranking.
    #[serde(default = "default_influence_top_k")]
    pub influence_top_k: usize,
}

fn default_decay() -> f64 {
    0.01
}
fn default_reach_depth() -> usize {
    3
}
fn default_walk_primes() -> Vec<u64> {
    vec![7, 11, 13]
}
fn default_sample_limit() -> usize {
    10
}
fn default_influence_top_k() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_floor: ConfidenceFloor::default(),
            decay_per_iteration: default_decay(),
            adjacency_scope: AdjacencyScope::default(),
            reach_depth: default_reach_depth(),
            walk_primes: default_walk_primes(),
            inference_sample_limit: default_sample_limit(),
            influence_top_k: default_influence_top_k(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=MAX_REACH_DEPTH).contains(&self.reach_depth) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "reach_depth must be between 1 and {MAX_REACH_DEPTH}, got {}",
                    self.reach_depth
                ),
            });
        }
        if !self.decay_per_iteration.is_finite() || self.decay_per_iteration < 0.0 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "decay_per_iteration must be a finite value >= 0, got {}",
                    self.decay_per_iteration
                ),
            });
        }
        if let Some(p) = self.walk_primes.iter().find(|&&p| p < 2) {
            return Err(ConfigError::Invalid {
                message: format!("walk_primes must all be > 1, got {p}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = EngineConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.walk_primes, vec![7, 11, 13]);
        assert_eq!(config.confidence_floor, ConfidenceFloor::Epsilon);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "confidence_floor = \"zero\"\nadjacency_scope = \"follows_only\"\n",
        )
        .unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.confidence_floor, ConfidenceFloor::Zero);
        assert_eq!(config.adjacency_scope, AdjacencyScope::FollowsOnly);
        assert_eq!(config.reach_depth, 3);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = EngineConfig {
            reach_depth: 6,
            walk_primes: vec![3, 5],
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn unrepresentable_value_fails_to_save() {
        // TOML integers are signed 64-bit.
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = EngineConfig {
            walk_primes: vec![u64::MAX],
            ..Default::default()
        };
        assert!(matches!(
            config.save(&path),
            Err(ConfigError::Serialize { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reach_depth = [").unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn out_of_range_depth_rejected() {
        let config = EngineConfig {
            reach_depth: 7,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
        let config = EngineConfig {
            reach_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unit_stride_rejected() {
        let config = EngineConfig {
            walk_primes: vec![7, 1],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
