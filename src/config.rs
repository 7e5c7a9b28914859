use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Graph identity and persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Logical graph name, used for the snapshot and export file names.
    #[serde(default = "default_graph_name")]
    pub name: String,
    /// Directory where snapshots and exports are written.
    #[serde(default = "default_persist_dir")]
    pub persist_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Extraction tuning configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Characters of surrounding text captured as entity context.
    #[serde(default = "default_entity_context")]
    pub entity_context_chars: usize,
    /// Characters of surrounding text captured as relationship context.
    #[serde(default = "default_relationship_context")]
    pub relationship_context_chars: usize,
    /// Entities shorter than this are dropped as artifacts.
    #[serde(default = "default_min_entity_length")]
    pub min_entity_length: usize,
}

/// Query defaults
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Default result cap for similar-case lookups.
    #[serde(default = "default_similar_case_limit")]
    pub similar_case_limit: usize,
    /// Default hop bound for multi-hop traversal.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
}

fn default_graph_name() -> String {
    "enforcement_knowledge_graph".to_string()
}

fn default_persist_dir() -> PathBuf {
    PathBuf::from("./data/graphs")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_entity_context() -> usize {
    50
}

fn default_relationship_context() -> usize {
    100
}

fn default_min_entity_length() -> usize {
    3
}

fn default_similar_case_limit() -> usize {
    5
}

fn default_max_hops() -> usize {
    2
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name: default_graph_name(),
            persist_dir: default_persist_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            entity_context_chars: default_entity_context(),
            relationship_context_chars: default_relationship_context(),
            min_entity_length: default_min_entity_length(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            similar_case_limit: default_similar_case_limit(),
            max_hops: default_max_hops(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graph: GraphConfig::default(),
            extraction: ExtractionConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// Looks for the config file in this order:
    /// 1. Path specified in REGGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("REGGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration if a config file is present, otherwise use defaults.
    ///
    /// Binaries use this so the graph can be built without any config file;
    /// REGGRAPH_CONFIG always takes precedence when set.
    pub fn load_or_default() -> Result<Self> {
        let explicit = std::env::var("REGGRAPH_CONFIG").is_ok();
        if explicit || Path::new("config.toml").exists() {
            Self::load()
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.graph.name.trim().is_empty() {
            anyhow::bail!("graph.name must not be empty");
        }

        if self.extraction.entity_context_chars == 0 {
            anyhow::bail!("extraction.entity_context_chars must be greater than 0");
        }

        if self.extraction.relationship_context_chars == 0 {
            anyhow::bail!("extraction.relationship_context_chars must be greater than 0");
        }

        if self.extraction.min_entity_length == 0 {
            anyhow::bail!("extraction.min_entity_length must be greater than 0");
        }

        if self.query.similar_case_limit == 0 {
            anyhow::bail!("query.similar_case_limit must be greater than 0");
        }

        Ok(())
    }

    /// Path of the snapshot artifact for this graph
    pub fn snapshot_path(&self) -> PathBuf {
        self.graph
            .persist_dir
            .join(format!("{}.json", self.graph.name))
    }

    /// Path of the node-link visualization export for this graph
    pub fn export_path(&self) -> PathBuf {
        self.graph
            .persist_dir
            .join(format!("{}_visualization.json", self.graph.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn with_config_env(config_path: Option<&Path>, f: impl FnOnce()) {
        let original = std::env::var("REGGRAPH_CONFIG").ok();
        match config_path {
            Some(p) => std::env::set_var("REGGRAPH_CONFIG", p.to_str().unwrap()),
            None => std::env::remove_var("REGGRAPH_CONFIG"),
        }
        f();
        std::env::remove_var("REGGRAPH_CONFIG");
        if let Some(val) = original {
            std::env::set_var("REGGRAPH_CONFIG", val);
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.graph.name, "enforcement_knowledge_graph");
        assert_eq!(config.extraction.entity_context_chars, 50);
        assert_eq!(config.extraction.relationship_context_chars, 100);
        assert_eq!(config.extraction.min_entity_length, 3);
        assert_eq!(config.query.similar_case_limit, 5);
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[graph]
name = "test_graph"
persist_dir = "./graphs"
log_level = "debug"

[extraction]
entity_context_chars = 40
relationship_context_chars = 80
min_entity_length = 2

[query]
similar_case_limit = 10
max_hops = 3
"#,
        )
        .unwrap();

        with_config_env(Some(config_path.as_path()), || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.graph.name, "test_graph");
            assert_eq!(config.graph.log_level, "debug");
            assert_eq!(config.extraction.entity_context_chars, 40);
            assert_eq!(config.query.similar_case_limit, 10);
        });
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[graph]\nname = \"partial\"\n").unwrap();

        with_config_env(Some(config_path.as_path()), || {
            let config = Config::load().unwrap();
            assert_eq!(config.graph.name, "partial");
            assert_eq!(config.extraction.entity_context_chars, 50);
            assert_eq!(config.query.max_hops, 2);
        });
    }

    #[test]
    fn test_config_rejects_zero_context() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[extraction]\nentity_context_chars = 0\n",
        )
        .unwrap();

        with_config_env(Some(config_path.as_path()), || {
            let config = Config::load();
            assert!(config.is_err());
            assert!(config
                .unwrap_err()
                .to_string()
                .contains("entity_context_chars"));
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_config_env(Some(Path::new("nonexistent.toml")), || {
            let config = Config::load();
            assert!(config.is_err());
        });
    }

    #[test]
    fn test_snapshot_path_uses_graph_name() {
        let config = Config::default();
        let path = config.snapshot_path();
        assert!(path
            .to_string_lossy()
            .ends_with("enforcement_knowledge_graph.json"));
    }
}
