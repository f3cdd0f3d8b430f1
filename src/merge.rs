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

//! Reconciles daemon matches with stored records: one batch fetch per type,
//! then every record goes back to the slot its match occupied.

use std::collections::HashMap;
use std::sync::Arc;

use crate::client::MatchRecord;
use crate::client::ObjectStore;
use crate::client::Record;
use crate::error::Error;
use crate::error::Result;
use crate::registry::TypeRegistry;

pub type StoreMap<T> = HashMap<String, Arc<dyn ObjectStore<T>>>;

struct Partition<'a> {
    type_name: &'a str,
    ids: Vec<u64>,
}

pub struct ResultMerger<'a, T> {
    registry: &'a TypeRegistry,
    stores: &'a StoreMap<T>,
}

impl<'a, T> ResultMerger<'a, T>
where
    T: Record + Clone,
{
    pub fn new(registry: &'a TypeRegistry, stores: &'a StoreMap<T>) -> Self {
        Self { registry, stores }
    }

    /// A match whose record the store did not return fails the whole merge
    /// with `MissingRecord`; slots are never dropped or shifted.
    pub fn merge(&self, matches: &[MatchRecord]) -> Result<Vec<T>> {
        let partitions = self.partition(matches)?;

        let mut loaded: HashMap<&str, HashMap<u64, T>> = HashMap::new();
        for part in &partitions {
            let store = self
                .stores
                .get(part.type_name)
                .ok_or_else(|| Error::MissingStore {
                    type_name: part.type_name.to_string(),
                })?;
            let records = store
                .find_by_ids(&part.ids)
                .map_err(|err| Error::StoreFetchFailed {
                    type_name: part.type_name.to_string(),
                    message: format!("{err:#}"),
                })?;
            tracing::debug!(
                type_name = part.type_name,
                requested = part.ids.len(),
                returned = records.len(),
                "fetched records"
            );
            let by_id = records.into_iter().map(|r| (r.record_id(), r)).collect();
            loaded.insert(part.type_name, by_id);
        }

        let mut out = Vec::with_capacity(matches.len());
        for (position, m) in matches.iter().enumerate() {
            let type_name = self.registry.by_fingerprint(m.fingerprint)?.name.as_str();
            let record = loaded
                .get(type_name)
                .and_then(|by_id| by_id.get(&m.id))
                .ok_or_else(|| Error::MissingRecord {
                    type_name: type_name.to_string(),
                    id: m.id,
                    position,
                })?;
            out.push(record.clone());
        }
        Ok(out)
    }

    /// Ids grouped by type, types in order of first appearance.
    fn partition(&self, matches: &[MatchRecord]) -> Result<Vec<Partition<'a>>> {
        let mut partitions: Vec<Partition<'a>> = Vec::new();
        for m in matches {
            let type_name = self.registry.by_fingerprint(m.fingerprint)?.name.as_str();
            match partitions.iter_mut().find(|p| p.type_name == type_name) {
                Some(part) => part.ids.push(m.id),
                None => partitions.push(Partition {
                    type_name,
                    ids: vec![m.id],
                }),
            }
        }
        Ok(partitions)
    }
}
