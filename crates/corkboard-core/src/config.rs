//! Board-level configuration.
//!
//! Loaded from a TOML file or built from [`BoardConfig::default`]. Every
//! section and field has a default, so a partial file (or none at all)
//! yields a working configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub conflict: ConflictConfig,
    #[serde(default)]
    pub columns: ColumnConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            graph: GraphConfig::default(),
            conflict: ConflictConfig::default(),
            columns: ColumnConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Also guard `parent_child` edges against cycles, so a card can never
    /// become its own ancestor. `blocks` edges are always guarded.
    #[serde(default = "default_true")]
    pub parent_cycle_guard: bool,
    /// Upper bound on relationships touching a single card.
    #[serde(default = "default_max_edges_per_card")]
    pub max_edges_per_card: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            parent_cycle_guard: default_true(),
            max_edges_per_card: default_max_edges_per_card(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictConfig {
    /// Commit stale edits whose fields are disjoint from the concurrent
    /// remote changes instead of surfacing a conflict case.
    #[serde(default)]
    pub auto_merge_disjoint_fields: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            auto_merge_disjoint_fields: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Columns that count as finished work. A blocks edge whose target sits
    /// in one of these no longer blocks its source.
    #[serde(default = "default_terminal_columns")]
    pub terminal: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            terminal: default_terminal_columns(),
        }
    }
}

impl ColumnConfig {
    #[must_use]
    pub fn is_terminal(&self, column: &str) -> bool {
        self.terminal.iter().any(|c| c == column)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_edges_per_card() -> usize {
    256
}

fn default_terminal_columns() -> Vec<String> {
    vec!["done".to_string(), "archived".to_string()]
}

impl BoardConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first TOML syntax or type problem.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse board config TOML")
    }

    /// Load a configuration file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read board config at {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let config = BoardConfig::default();
        assert!(config.graph.parent_cycle_guard);
        assert_eq!(config.graph.max_edges_per_card, 256);
        assert!(!config.conflict.auto_merge_disjoint_fields);
        assert!(config.columns.is_terminal("done"));
        assert!(config.columns.is_terminal("archived"));
        assert!(!config.columns.is_terminal("doing"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = BoardConfig::from_toml_str(
            r#"
            [conflict]
            auto_merge_disjoint_fields = true
            "#,
        )
        .expect("parse");

        assert!(config.conflict.auto_merge_disjoint_fields);
        // Untouched sections keep their defaults.
        assert!(config.graph.parent_cycle_guard);
        assert!(config.columns.is_terminal("done"));
    }

    #[test]
    fn full_file_overrides_everything() {
        let config = BoardConfig::from_toml_str(
            r#"
            [graph]
            parent_cycle_guard = false
            max_edges_per_card = 8

            [conflict]
            auto_merge_disjoint_fields = true

            [columns]
            terminal = ["shipped"]
            "#,
        )
        .expect("parse");

        assert!(!config.graph.parent_cycle_guard);
        assert_eq!(config.graph.max_edges_per_card, 8);
        assert!(config.columns.is_terminal("shipped"));
        assert!(!config.columns.is_terminal("done"));
    }

    #[test]
    fn bad_toml_is_an_error() {
        let err = BoardConfig::from_toml_str("[graph\nparent_cycle_guard = ").unwrap_err();
        assert!(err.to_string().contains("parse board config"), "err: {err:#}");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = BoardConfig::load(&dir.path().join("board.toml")).expect("load");
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("board.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "[graph]\nmax_edges_per_card = 32").expect("write");

        let config = BoardConfig::load(&path).expect("load");
        assert_eq!(config.graph.max_edges_per_card, 32);
    }
}
