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

//! Contracts for the two collaborators a search talks to: the daemon that
//! answers queries and the per-type stores that turn ids into records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::model::SearchRequest;
use crate::registry::CLASS_ATTRIBUTE;
use crate::registry::ID_ATTRIBUTE;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
    Multi(Vec<i64>),
}

impl AttrValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen; strings and multi-values do not convert.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// One raw match. `id` and `fingerprint` are lifted out of the attribute map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub id: u64,
    pub fingerprint: u32,
    pub attributes: BTreeMap<String, AttrValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl MatchRecord {
    pub fn from_attributes(
        attributes: BTreeMap<String, AttrValue>,
        weight: Option<i64>,
    ) -> Result<Self> {
        let id = required_int(&attributes, ID_ATTRIBUTE)?;
        let id = u64::try_from(id).map_err(|_| Error::MalformedMatch {
            message: format!("{ID_ATTRIBUTE} is negative: {id}"),
        })?;
        let fingerprint = required_int(&attributes, CLASS_ATTRIBUTE)?;
        let fingerprint = u32::try_from(fingerprint).map_err(|_| Error::MalformedMatch {
            message: format!("{CLASS_ATTRIBUTE} out of range: {fingerprint}"),
        })?;
        Ok(Self {
            id,
            fingerprint,
            attributes,
            weight,
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}

fn required_int(attributes: &BTreeMap<String, AttrValue>, name: &str) -> Result<i64> {
    attributes
        .get(name)
        .and_then(AttrValue::as_i64)
        .ok_or_else(|| Error::MalformedMatch {
            message: format!("missing integer attribute {name}"),
        })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResponse {
    pub matches: Vec<MatchRecord>,
    pub total_found: u64,
}

pub trait DaemonClient {
    fn query(&self, request: &SearchRequest) -> anyhow::Result<QueryResponse>;
}

/// A loaded record knows its own id so the merger can put it back in place.
pub trait Record {
    fn record_id(&self) -> u64;
}

pub trait ObjectStore<T> {
    /// Records for the given ids in any order; missing ids are omitted.
    fn find_by_ids(&self, ids: &[u64]) -> anyhow::Result<Vec<T>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, AttrValue)]) -> BTreeMap<String, AttrValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn lifts_id_and_fingerprint() {
        let record = MatchRecord::from_attributes(
            attrs(&[
                (ID_ATTRIBUTE, AttrValue::Int(12)),
                (CLASS_ATTRIBUTE, AttrValue::Int(3_000_000_000)),
                ("@count", AttrValue::Int(4)),
            ]),
            Some(21),
        )
        .unwrap();
        assert_eq!(record.id, 12);
        assert_eq!(record.fingerprint, 3_000_000_000);
        assert_eq!(record.attribute("@count"), Some(&AttrValue::Int(4)));
        assert_eq!(record.weight, Some(21));
    }

    #[test]
    fn missing_class_is_malformed() {
        let err = MatchRecord::from_attributes(attrs(&[(ID_ATTRIBUTE, AttrValue::Int(1))]), None)
            .unwrap_err();
        assert_eq!(err.code(), "malformed_match");
    }

    #[test]
    fn float_view_widens_ints() {
        assert_eq!(AttrValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(AttrValue::Str("x".into()).as_f64(), None);
    }
}
