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

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::client::AttrValue;
use crate::client::DaemonClient;
use crate::client::ObjectStore;
use crate::client::QueryResponse;
use crate::client::Record;
use crate::collection::COUNT_ATTRIBUTE;
use crate::collection::GROUPBY_ATTRIBUTE;
use crate::collection::SearchResults;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::merge::ResultMerger;
use crate::merge::StoreMap;
use crate::model::GroupFunction;
use crate::model::SearchRequest;
use crate::options::SearchOptions;
use crate::registry::ID_ATTRIBUTE;
use crate::registry::TypeRegistry;
use crate::request::RequestBuilder;

/// Ids in daemon order, without loading any records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchIds {
    pub ids: Vec<u64>,
    pub total_found: u64,
}

/// Grouped counts for one attribute, in daemon order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub attribute: String,
    pub values: Vec<FacetValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetValue {
    pub value: AttrValue,
    pub count: i64,
}

const FACET_ORDER: &str = "@count desc";

/// Entry point: owns configuration, the type registry, and the collaborators.
pub struct Searcher<T> {
    config: Config,
    registry: TypeRegistry,
    client: Arc<dyn DaemonClient>,
    stores: StoreMap<T>,
}

impl<T> Searcher<T>
where
    T: Record + Clone,
{
    /// The registry is built from `config.types`; use `with_registry` to
    /// supply one directly.
    pub fn new(config: Config, client: Arc<dyn DaemonClient>) -> Self {
        let registry = config.registry();
        Self {
            config,
            registry,
            client,
            stores: HashMap::new(),
        }
    }

    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_store(
        mut self,
        type_name: impl Into<String>,
        store: Arc<dyn ObjectStore<T>>,
    ) -> Self {
        self.stores.insert(type_name.into(), store);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn search(&self, options: SearchOptions) -> SearchResults<'_, T> {
        SearchResults::new(self, options)
    }

    pub fn search_for_ids(&self, options: &SearchOptions) -> Result<MatchIds> {
        let request = self.build_request(options)?;
        let response = self.query(&request)?;
        Ok(MatchIds {
            ids: response.matches.iter().map(|m| m.id).collect(),
            total_found: response.total_found,
        })
    }

    pub fn search_for_id(&self, id: u64, type_name: &str, options: SearchOptions) -> Result<bool> {
        let attr_id = i64::try_from(id)
            .map_err(|_| Error::unsupported(ID_ATTRIBUTE, format!("id {id} exceeds i64")))?;
        let options = options.class(type_name).with(ID_ATTRIBUTE, attr_id);
        let found = self.search_for_ids(&options)?;
        Ok(found.ids.contains(&id))
    }

    pub fn count(&self, options: &SearchOptions) -> Result<u64> {
        Ok(self.search_for_ids(options)?.total_found)
    }

    /// One grouped query per attribute. The caller's filters and text apply
    /// to every facet; grouping and paging are replaced.
    pub fn facets<I, S>(&self, options: &SearchOptions, attributes: I) -> Result<Vec<Facet>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let max_matches = options
            .max_matches
            .unwrap_or(self.config.default_max_matches);
        let mut facets = Vec::new();
        for attribute in attributes {
            let attribute = attribute.into();
            let mut grouped = options.clone();
            grouped.group = None;
            grouped.group_by = Some(attribute.clone());
            grouped.group_function = Some(GroupFunction::Attr);
            grouped.group_clause = options
                .group_clause
                .clone()
                .or_else(|| Some(FACET_ORDER.to_string()));
            grouped.page = Some(1);
            grouped.per_page = None;
            grouped.offset = None;
            grouped.limit = Some(max_matches);

            let request = self.build_request(&grouped)?;
            let response = self.query(&request)?;
            let values = response
                .matches
                .iter()
                .map(|m| {
                    let value = m.attribute(GROUPBY_ATTRIBUTE).cloned();
                    let count = m.attribute(COUNT_ATTRIBUTE).and_then(AttrValue::as_i64);
                    match (value, count) {
                        (Some(value), Some(count)) => Ok(FacetValue { value, count }),
                        _ => Err(Error::MalformedMatch {
                            message: format!(
                                "facet {attribute} match {} lacks {GROUPBY_ATTRIBUTE} or {COUNT_ATTRIBUTE}",
                                m.id
                            ),
                        }),
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            tracing::debug!(attribute = %attribute, values = values.len(), "facet resolved");
            facets.push(Facet { attribute, values });
        }
        Ok(facets)
    }

    pub fn build_request(&self, options: &SearchOptions) -> Result<SearchRequest> {
        RequestBuilder::new(&self.config, &self.registry).build(options)
    }

    pub(crate) fn query(&self, request: &SearchRequest) -> Result<QueryResponse> {
        let response = self
            .client
            .query(request)
            .map_err(|err| Error::DaemonQueryFailed {
                message: format!("{err:#}"),
            })?;
        tracing::debug!(
            matches = response.matches.len(),
            total_found = response.total_found,
            "daemon answered"
        );
        Ok(response)
    }

    pub(crate) fn merger(&self) -> ResultMerger<'_, T> {
        ResultMerger::new(&self.registry, &self.stores)
    }
}
