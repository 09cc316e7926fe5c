//! Configuration types for reading Harmony scenes.
//!
//! This module provides the configuration structures that control which scene
//! of a document is read and how its node graph is assembled. All types
//! implement [`serde::Deserialize`] so they can be loaded from TOML.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining scene and graph settings.
//! - [`SceneConfig`] - Selects the scene of the document.
//! - [`GraphConfig`] - Controls container detection, path formatting and
//!   default link ports.
//!
//! # Example
//!
//! ```
//! # use xstage::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.scene().name(), "Top");
//! assert_eq!(config.graph().path_separator(), "/");
//! assert!(config.graph().is_container_kind("group"));
//! ```

use serde::Deserialize;

/// Top-level configuration combining scene and graph settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Scene selection section.
    #[serde(default)]
    scene: SceneConfig,

    /// Graph construction section.
    #[serde(default)]
    graph: GraphConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(scene: SceneConfig, graph: GraphConfig) -> Self {
        Self { scene, graph }
    }

    /// Returns the scene configuration.
    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    /// Returns the graph configuration.
    pub fn graph(&self) -> &GraphConfig {
        &self.graph
    }
}

/// Which `project/scenes/scene` a document is read from.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    /// Value of the scene's `name` attribute.
    #[serde(default = "default_scene_name")]
    name: String,
}

fn default_scene_name() -> String {
    "Top".to_string()
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: default_scene_name(),
        }
    }
}

impl SceneConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Settings of the graph builder.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Node kinds that own a nested sub-graph, compared ignoring ASCII case.
    #[serde(default = "default_container_kinds")]
    container_kinds: Vec<String>,

    /// Separator placed between path segments.
    #[serde(default = "default_path_separator")]
    path_separator: String,

    /// Port used by link endpoints that name no port.
    #[serde(default = "default_port")]
    default_port: String,
}

fn default_container_kinds() -> Vec<String> {
    vec!["GROUP".to_string()]
}

fn default_path_separator() -> String {
    "/".to_string()
}

fn default_port() -> String {
    "0".to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            container_kinds: default_container_kinds(),
            path_separator: default_path_separator(),
            default_port: default_port(),
        }
    }
}

impl GraphConfig {
    /// Creates a new [`GraphConfig`].
    ///
    /// # Arguments
    ///
    /// * `container_kinds` - Node kinds that own a nested sub-graph.
    /// * `path_separator` - Separator placed between path segments.
    /// * `default_port` - Port used by link endpoints that name no port.
    pub fn new(
        container_kinds: Vec<String>,
        path_separator: impl Into<String>,
        default_port: impl Into<String>,
    ) -> Self {
        Self {
            container_kinds,
            path_separator: path_separator.into(),
            default_port: default_port.into(),
        }
    }

    pub fn container_kinds(&self) -> &[String] {
        &self.container_kinds
    }

    /// Returns `true` if nodes of `kind` own a nested sub-graph.
    pub fn is_container_kind(&self, kind: &str) -> bool {
        self.container_kinds
            .iter()
            .any(|container| container.eq_ignore_ascii_case(kind))
    }

    pub fn path_separator(&self) -> &str {
        &self.path_separator
    }

    pub fn default_port(&self) -> &str {
        &self.default_port
    }
}
