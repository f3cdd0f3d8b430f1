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

//! Type metadata: fingerprints, physical index names, sortable and geo
//! attributes, and the subtype graph used for class restriction.

use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

use serde::Serialize;

use crate::config::TypeConfig;
use crate::error::Error;
use crate::error::Result;

pub const CLASS_ATTRIBUTE: &str = "class_crc";
pub const DELETED_ATTRIBUTE: &str = "sphinx_deleted";
pub const ID_ATTRIBUTE: &str = "sphinx_internal_id";

const SORTABLE_SUFFIX: &str = "_sort";
const LATITUDE_CANDIDATES: [&str; 2] = ["lat", "latitude"];
const LONGITUDE_CANDIDATES: [&str; 3] = ["lng", "lon", "longitude"];

/// CRC32 of the type name; the daemon reports it in `class_crc`.
pub fn fingerprint(name: &str) -> u32 {
    crc32fast::hash(name.as_bytes())
}

/// `Admin::BlogPost` -> `admin_blog_post`, `HTMLParser` -> `html_parser`.
pub fn index_prefix(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let prev = idx.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(idx + 1);
            let boundary = match prev {
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                Some(p) => p.is_alphanumeric(),
                None => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeMeta {
    pub name: String,
    pub fingerprint: u32,
    pub core_index: String,
    pub delta_index: String,
    pub attributes: Vec<String>,
    pub sortable_fields: Vec<String>,
    pub latitude_attr: Option<String>,
    pub longitude_attr: Option<String>,
    pub subtypes: Vec<String>,
}

impl TypeMeta {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let prefix = index_prefix(&name);
        Self {
            fingerprint: fingerprint(&name),
            core_index: format!("{prefix}_core"),
            delta_index: format!("{prefix}_delta"),
            name,
            attributes: Vec::new(),
            sortable_fields: Vec::new(),
            latitude_attr: None,
            longitude_attr: None,
            subtypes: Vec::new(),
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn with_sortable_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_geo_attributes(
        mut self,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        self.latitude_attr = Some(latitude.into());
        self.longitude_attr = Some(longitude.into());
        self
    }

    pub fn with_subtypes<I, S>(mut self, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtypes.extend(subtypes.into_iter().map(Into::into));
        self
    }

    pub fn with_indexes(mut self, core: impl Into<String>, delta: impl Into<String>) -> Self {
        self.core_index = core.into();
        self.delta_index = delta.into();
        self
    }

    pub fn index_names(&self) -> [&str; 2] {
        [self.core_index.as_str(), self.delta_index.as_str()]
    }

    /// Shadow attribute to sort on in place of `field`, if it has one.
    pub fn sortable_attribute(&self, field: &str) -> Option<String> {
        self.sortable_fields
            .iter()
            .any(|f| f == field)
            .then(|| format!("{field}{SORTABLE_SUFFIX}"))
    }

    /// Latitude/longitude attribute names: declared names first, then the
    /// conventional candidates among the type's known attributes.
    pub fn geo_attributes(&self) -> Option<(String, String)> {
        let lat = self
            .latitude_attr
            .clone()
            .or_else(|| self.first_known(&LATITUDE_CANDIDATES))?;
        let lng = self
            .longitude_attr
            .clone()
            .or_else(|| self.first_known(&LONGITUDE_CANDIDATES))?;
        Some((lat, lng))
    }

    fn first_known(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find(|c| self.attributes.iter().any(|a| a == *c))
            .map(|c| c.to_string())
    }
}

impl From<&TypeConfig> for TypeMeta {
    fn from(cfg: &TypeConfig) -> Self {
        let mut meta = TypeMeta::new(cfg.name.clone())
            .with_attributes(cfg.attributes.iter().cloned())
            .with_sortable_fields(cfg.sortable_fields.iter().cloned())
            .with_subtypes(cfg.subtypes.iter().cloned());
        meta.latitude_attr = cfg.latitude_attr.clone();
        meta.longitude_attr = cfg.longitude_attr.clone();
        if let Some([core, delta]) = cfg.indexes.as_deref() {
            meta = meta.with_indexes(core.clone(), delta.clone());
        }
        meta
    }
}

/// Built once at composition time and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<TypeMeta>,
    by_name: HashMap<String, usize>,
    by_fingerprint: HashMap<u32, usize>,
}

impl TypeRegistry {
    pub fn new(types: impl IntoIterator<Item = TypeMeta>) -> Self {
        let mut registry = Self::default();
        for meta in types {
            registry.register(meta);
        }
        registry
    }

    pub fn from_config(types: &[TypeConfig]) -> Self {
        Self::new(types.iter().map(TypeMeta::from))
    }

    /// Re-registering a name replaces the earlier entry.
    pub fn register(&mut self, meta: TypeMeta) {
        if let Some(&idx) = self.by_name.get(&meta.name) {
            self.by_fingerprint.remove(&self.types[idx].fingerprint);
            self.by_fingerprint.insert(meta.fingerprint, idx);
            self.types[idx] = meta;
            return;
        }
        let idx = self.types.len();
        self.by_name.insert(meta.name.clone(), idx);
        self.by_fingerprint.insert(meta.fingerprint, idx);
        self.types.push(meta);
    }

    pub fn types(&self) -> &[TypeMeta] {
        &self.types
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TypeMeta> {
        self.by_name.get(name).map(|&idx| &self.types[idx])
    }

    pub fn require(&self, name: &str) -> Result<&TypeMeta> {
        self.get(name).ok_or_else(|| Error::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn by_fingerprint(&self, fingerprint: u32) -> Result<&TypeMeta> {
        self.by_fingerprint
            .get(&fingerprint)
            .map(|&idx| &self.types[idx])
            .ok_or(Error::UnknownFingerprint { fingerprint })
    }

    /// Every registered type reachable through `subtypes`, breadth-first,
    /// excluding `name` itself.
    pub fn descendants(&self, name: &str) -> Result<Vec<&TypeMeta>> {
        let root = self.require(name)?;
        let mut out = Vec::new();
        let mut seen = HashSet::from([root.name.as_str()]);
        let mut queue = VecDeque::from([root]);
        while let Some(meta) = queue.pop_front() {
            for sub in &meta.subtypes {
                let Some(child) = self.get(sub) else {
                    tracing::debug!(parent = %meta.name, subtype = %sub, "subtype not registered");
                    continue;
                };
                if seen.insert(child.name.as_str()) {
                    out.push(child);
                    queue.push_back(child);
                }
            }
        }
        Ok(out)
    }

    /// Fingerprints for a class restriction: descendants of each class, then
    /// the class itself, without duplicates.
    pub fn class_fingerprints(&self, classes: &[String]) -> Result<Vec<u32>> {
        let mut out = Vec::new();
        for class in classes {
            let meta = self.require(class)?;
            for sub in self.descendants(class)? {
                if !out.contains(&sub.fingerprint) {
                    out.push(sub.fingerprint);
                }
            }
            if !out.contains(&meta.fingerprint) {
                out.push(meta.fingerprint);
            }
        }
        Ok(out)
    }
}
