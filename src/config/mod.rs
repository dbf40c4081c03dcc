//! Configuration loading for sitepress.
//!
//! A site is a directory holding `config.json`, `content/`, `themes/` and
//! the generated `output/`. The site config and the selected theme's
//! `config.json` merge into one [`DataTree`] under the `site` and `theme`
//! keys; that tree is the base render context for every template.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::data::DataTree;
use crate::warn;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("config file {0} must contain a JSON object")]
    NotAnObject(PathBuf),

    #[error("missing mandatory config field '{0}'")]
    MissingField(&'static str),
}

/// The merged site and theme configuration, plus the directory layout
/// derived from the config file's location.
#[derive(Debug, Clone)]
pub struct Config {
    site_dir: PathBuf,
    theme_dir: PathBuf,
    data: DataTree,
}

impl Config {
    /// Load the site config and the theme config it names.
    ///
    /// The site directory is the config file's parent; the theme lives at
    /// `<site>/themes/<site.theme>` with its own `config.json`. Both
    /// `site.url` and `site.theme` are mandatory.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let site_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut data = DataTree::new();
        data.set(&["site"], read_json_object(config_path)?);

        if !data.has(&["site", "url"]) {
            return Err(ConfigError::MissingField("site.url"));
        }
        let theme = data
            .get_str(&["site", "theme"])
            .ok_or(ConfigError::MissingField("site.theme"))?
            .to_string();

        let theme_dir = site_dir.join("themes").join(&theme);
        data.set(&["theme"], read_json_object(&theme_dir.join("config.json"))?);

        if !data.has(&["theme", "default"]) {
            warn!(
                "theme '{}' declares no default template; pages must name one in frontmatter",
                theme
            );
        }

        Ok(Self {
            site_dir,
            theme_dir,
            data,
        })
    }

    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }

    pub fn theme_dir(&self) -> &Path {
        &self.theme_dir
    }

    pub fn content_dir(&self) -> PathBuf {
        self.site_dir.join("content")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.site_dir.join("output")
    }

    /// The merged config/content tree.
    pub fn data(&self) -> &DataTree {
        &self.data
    }

    /// Mutable handle for the single-threaded validation and directive
    /// phases. Worker pools only ever see `data()`.
    pub fn data_mut(&mut self) -> &mut DataTree {
        &mut self.data
    }

    pub fn site_url(&self) -> &str {
        // presence enforced by load(); empty string only if the config
        // held a non-string, which read_json_object rules out for objects
        self.data.get_str(&["site", "url"]).unwrap_or_default()
    }

    /// Template name used when a page's frontmatter has none.
    pub fn default_template(&self) -> Option<&str> {
        self.data.get_str(&["theme", "default"])
    }

    /// Directive configurations, site entries first. A theme entry is
    /// dropped when the site config declares the same directive name.
    pub fn directives(&self) -> Vec<Value> {
        let site = directive_list(&self.data, &["site", "directives"]);
        let mut merged = site.clone();
        for entry in directive_list(&self.data, &["theme", "directives"]) {
            let name = entry.get("name").and_then(Value::as_str);
            let shadowed = name.is_some_and(|n| {
                site.iter()
                    .any(|s| s.get("name").and_then(Value::as_str) == Some(n))
            });
            if !shadowed {
                merged.push(entry);
            }
        }
        merged
    }
}

fn directive_list(data: &DataTree, path: &[&str]) -> Vec<Value> {
    data.get(path)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn read_json_object(path: &Path) -> Result<Value, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if !value.is_object() {
        return Err(ConfigError::NotAnObject(path.to_path_buf()));
    }
    Ok(value)
}
