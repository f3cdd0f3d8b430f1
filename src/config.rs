// Copyright 2026 Sift Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::registry::TypeRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_per_page: usize,
    pub default_max_matches: usize,
    /// Custom token pattern used when starring is requested without one.
    pub star_token: Option<String>,
    pub types: Vec<TypeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_per_page: 20,
            default_max_matches: 1000,
            star_token: None,
            types: Vec::new(),
        }
    }
}

impl Config {
    pub fn registry(&self) -> TypeRegistry {
        TypeRegistry::from_config(&self.types)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeConfig {
    pub name: String,
    pub attributes: Vec<String>,
    pub sortable_fields: Vec<String>,
    pub latitude_attr: Option<String>,
    pub longitude_attr: Option<String>,
    pub subtypes: Vec<String>,
    /// `[core, delta]`; derived from the name when absent.
    pub indexes: Option<Vec<String>>,
}

fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(PathBuf::from(profile).join("AppData").join("Roaming"));
        }
        return None;
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support"),
        );
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("sift").join("sift.toml"))
}

pub fn load_global_config() -> Result<Config> {
    let Some(path) = global_config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    read_config(&path)
}

/// Explicit path wins; otherwise the global config, or defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => read_config(path),
        None => load_global_config(),
    }
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: Config = toml::from_str(&text).context("parse sift.toml")?;
    validate(&config).with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.default_per_page == 0 {
        anyhow::bail!("default_per_page must be greater than zero");
    }
    for ty in &config.types {
        if ty.name.trim().is_empty() {
            anyhow::bail!("type entries require a name");
        }
        if let Some(indexes) = &ty.indexes
            && indexes.len() != 2
        {
            anyhow::bail!(
                "type {} must list exactly two indexes (core, delta), got {}",
                ty.name,
                indexes.len()
            );
        }
    }
    Ok(())
}
