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

//! Caller-facing search options. Every field is optional; the request
//! configurator fills the gaps from `Config` and the type registry.

use crate::filter::FilterValue;
use crate::model::GroupFunction;
use crate::model::MatchMode;
use crate::model::SortMode;
use crate::query_text::Condition;
use crate::query_text::Star;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    /// A bare attribute name; sorts with `attr_asc` unless a mode is given.
    Attribute(String),
    /// A free-form sort clause such as `created_at ASC, name DESC`.
    Clause(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightTarget {
    Index(String),
    /// Expands to the type's core and delta indexes.
    Type(String),
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub text: Vec<String>,
    pub conditions: Vec<Condition>,
    pub star: Star,
    pub with: Vec<(String, FilterValue)>,
    pub without: Vec<(String, FilterValue)>,
    pub with_all: Vec<(String, FilterValue)>,
    pub without_ids: Vec<u64>,
    pub classes: Vec<String>,
    pub include_deleted: bool,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub order: Option<Order>,
    pub sort_mode: Option<SortMode>,
    pub match_mode: Option<MatchMode>,
    pub group: Option<String>,
    pub group_by: Option<String>,
    pub group_function: Option<GroupFunction>,
    pub group_clause: Option<String>,
    pub group_distinct: Option<String>,
    pub geo: Option<(f64, f64)>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub latitude_attr: Option<String>,
    pub longitude_attr: Option<String>,
    pub index_weights: Vec<(WeightTarget, i64)>,
    pub index: Option<Vec<String>>,
    pub max_matches: Option<usize>,
    pub comment: Option<String>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text.push(text.into());
        self
    }

    pub fn condition<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.push(Condition::new(field, values));
        self
    }

    pub fn star(mut self, star: Star) -> Self {
        self.star = star;
        self
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with.push((attribute.into(), value.into()));
        self
    }

    pub fn without(mut self, attribute: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.without.push((attribute.into(), value.into()));
        self
    }

    pub fn with_all(mut self, attribute: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with_all.push((attribute.into(), value.into()));
        self
    }

    pub fn without_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.without_ids.extend(ids);
        self
    }

    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.classes.push(name.into());
        self
    }

    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, attribute: impl Into<String>) -> Self {
        self.order = Some(Order::Attribute(attribute.into()));
        self
    }

    pub fn order_clause(mut self, clause: impl Into<String>) -> Self {
        self.order = Some(Order::Clause(clause.into()));
        self
    }

    pub fn sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = Some(mode);
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = Some(mode);
        self
    }

    pub fn group(mut self, attribute: impl Into<String>) -> Self {
        self.group = Some(attribute.into());
        self
    }

    pub fn group_by(mut self, attribute: impl Into<String>) -> Self {
        self.group_by = Some(attribute.into());
        self
    }

    pub fn group_function(mut self, function: GroupFunction) -> Self {
        self.group_function = Some(function);
        self
    }

    pub fn group_clause(mut self, clause: impl Into<String>) -> Self {
        self.group_clause = Some(clause.into());
        self
    }

    pub fn group_distinct(mut self, attribute: impl Into<String>) -> Self {
        self.group_distinct = Some(attribute.into());
        self
    }

    /// Anchor point in radians, as the daemon expects.
    pub fn geo(mut self, latitude: f64, longitude: f64) -> Self {
        self.geo = Some((latitude, longitude));
        self
    }

    pub fn lat(mut self, latitude: f64) -> Self {
        self.lat = Some(latitude);
        self
    }

    pub fn lng(mut self, longitude: f64) -> Self {
        self.lng = Some(longitude);
        self
    }

    pub fn geo_attributes(
        mut self,
        latitude_attr: impl Into<String>,
        longitude_attr: impl Into<String>,
    ) -> Self {
        self.latitude_attr = Some(latitude_attr.into());
        self.longitude_attr = Some(longitude_attr.into());
        self
    }

    pub fn index_weight(mut self, index: impl Into<String>, weight: i64) -> Self {
        self.index_weights
            .push((WeightTarget::Index(index.into()), weight));
        self
    }

    pub fn type_weight(mut self, type_name: impl Into<String>, weight: i64) -> Self {
        self.index_weights
            .push((WeightTarget::Type(type_name.into()), weight));
        self
    }

    pub fn index<I, S>(mut self, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index = Some(indexes.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = Some(max_matches);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn has_conditions(&self) -> bool {
        self.conditions.iter().any(|c| !c.values.is_empty())
    }
}
