//! Viewer configuration (`orrery.toml`, environment overrides)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::DEFAULT_NODE_BUDGET;
use crate::error::ConfigError;
use crate::model::{LayoutConfig, LayoutMode, Viewport};

/// Config file looked up at the repository root.
pub const CONFIG_FILE: &str = "orrery.toml";

/// Every recognized option, with defaults for anything left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrreryConfig {
    pub layout_mode: LayoutMode,
    pub spacing_factor: f64,
    pub link_distance: f64,
    pub show_labels: bool,
    pub curved_links: bool,
    pub node_budget: usize,
    pub blast_radius_cap: usize,
    pub drag_threshold_px: u32,
    pub viewport: Viewport,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        OrreryConfig {
            layout_mode: layout.mode,
            spacing_factor: layout.spacing_factor,
            link_distance: layout.link_distance,
            show_labels: layout.show_labels,
            curved_links: layout.curved_links,
            node_budget: DEFAULT_NODE_BUDGET,
            blast_radius_cap: 50,
            drag_threshold_px: 5,
            viewport: Viewport::default(),
        }
    }
}

impl OrreryConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: OrreryConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `root/orrery.toml` if present, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = config_path(root);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `ORRERY_*` overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("ORRERY_LAYOUT_MODE") {
            self.layout_mode = mode.parse().map_err(|reason| ConfigError::Invalid {
                key: "layout_mode",
                reason,
            })?;
        }
        if let Some(budget) = lookup("ORRERY_NODE_BUDGET") {
            self.node_budget = budget.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: "node_budget",
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(spacing) = lookup("ORRERY_SPACING_FACTOR") {
            self.spacing_factor = spacing.trim().parse().map_err(|e: std::num::ParseFloatError| {
                ConfigError::Invalid {
                    key: "spacing_factor",
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("spacing_factor", self.spacing_factor)?;
        positive("link_distance", self.link_distance)?;
        positive("viewport.width", self.viewport.width)?;
        positive("viewport.height", self.viewport.height)?;
        if self.node_budget == 0 {
            return Err(ConfigError::Invalid {
                key: "node_budget",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            mode: self.layout_mode,
            spacing_factor: self.spacing_factor,
            link_distance: self.link_distance,
            show_labels: self.show_labels,
            curved_links: self.curved_links,
        }
    }
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("expected a positive number, got {value}"),
        })
    }
}
