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

//! Resolves `SearchOptions` into a complete `SearchRequest`. Pure: reads
//! only the options, `Config`, and the type registry.

use serde::Serialize;

use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::filter::normalize_filters;
use crate::model::GeoAnchor;
use crate::model::GroupFunction;
use crate::model::IndexWeight;
use crate::model::MatchMode;
use crate::model::SearchRequest;
use crate::model::SortMode;
use crate::options::Order;
use crate::options::SearchOptions;
use crate::options::WeightTarget;
use crate::query_text::Star;
use crate::query_text::build_query;
use crate::registry::TypeMeta;
use crate::registry::TypeRegistry;

pub const ALL_INDEXES: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub offset: usize,
}

impl Pagination {
    /// `limit` beats `per_page`; an explicit offset beats the page offset.
    pub fn resolve(opts: &SearchOptions, config: &Config) -> Self {
        let page = opts.page.unwrap_or(1);
        let per_page = opts
            .limit
            .or(opts.per_page)
            .unwrap_or(config.default_per_page);
        let offset = opts
            .offset
            .unwrap_or_else(|| page.saturating_sub(1).saturating_mul(per_page));
        Self {
            page,
            per_page,
            offset,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            return Err(Error::InvalidPagination {
                message: "page size must be greater than zero".to_string(),
            });
        }
        if self.page == 0 {
            return Err(Error::InvalidPagination {
                message: "pages are numbered from 1".to_string(),
            });
        }
        Ok(())
    }
}

pub struct RequestBuilder<'a> {
    config: &'a Config,
    registry: &'a TypeRegistry,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(config: &'a Config, registry: &'a TypeRegistry) -> Self {
        Self { config, registry }
    }

    pub fn build(&self, opts: &SearchOptions) -> Result<SearchRequest> {
        let pagination = Pagination::resolve(opts, self.config);
        pagination.validate()?;

        let classes = opts
            .classes
            .iter()
            .map(|name| self.registry.require(name))
            .collect::<Result<Vec<_>>>()?;

        let query = build_query(&opts.text, &opts.conditions, &self.star(opts))?;
        let filters = normalize_filters(opts, self.registry)?;
        let (sort_mode, sort_by) = resolve_sort(opts, &classes);
        let (group_by, group_function) = resolve_group(opts);

        let request = SearchRequest {
            query,
            indexes: resolve_indexes(opts, &classes),
            comment: opts.comment.clone().unwrap_or_default(),
            match_mode: resolve_match_mode(opts),
            limit: pagination.per_page,
            offset: pagination.offset,
            max_matches: opts
                .max_matches
                .unwrap_or(self.config.default_max_matches),
            sort_mode,
            sort_by,
            group_by,
            group_function,
            group_clause: opts.group_clause.clone(),
            group_distinct: opts.group_distinct.clone(),
            index_weights: self.index_weights(opts)?,
            anchor: self.anchor(opts, &classes),
            filters,
        };

        tracing::debug!(
            query = %request.query,
            indexes = %request.index_list(),
            limit = request.limit,
            offset = request.offset,
            sort_mode = request.sort_mode.as_str(),
            filters = request.filters.len(),
            "resolved search request"
        );
        Ok(request)
    }

    /// A bare `Star::Default` picks up the configured token pattern.
    fn star(&self, opts: &SearchOptions) -> Star {
        match (&opts.star, &self.config.star_token) {
            (Star::Default, Some(token)) => Star::Pattern(token.clone()),
            (star, _) => star.clone(),
        }
    }

    fn index_weights(&self, opts: &SearchOptions) -> Result<Vec<IndexWeight>> {
        let mut weights = Vec::new();
        for (target, weight) in &opts.index_weights {
            match target {
                WeightTarget::Index(index) => weights.push(IndexWeight {
                    index: index.clone(),
                    weight: *weight,
                }),
                WeightTarget::Type(name) => {
                    let meta = self.registry.require(name)?;
                    for index in meta.index_names() {
                        weights.push(IndexWeight {
                            index: index.to_string(),
                            weight: *weight,
                        });
                    }
                }
            }
        }
        Ok(weights)
    }

    /// Geo anchor from `geo` or `lat`/`lng`. Attribute names come from the
    /// options, else from the first candidate type exposing both.
    fn anchor(&self, opts: &SearchOptions, classes: &[&TypeMeta]) -> Option<GeoAnchor> {
        let (latitude, longitude) = opts.geo.or_else(|| opts.lat.zip(opts.lng))?;

        let candidates: Vec<&TypeMeta> = if classes.is_empty() {
            self.registry.types().iter().collect()
        } else {
            classes.to_vec()
        };
        let detected = candidates.iter().find_map(|meta| meta.geo_attributes());
        let (detected_lat, detected_lng) = detected.unzip();

        let latitude_attr = opts.latitude_attr.clone().or(detected_lat);
        let longitude_attr = opts.longitude_attr.clone().or(detected_lng);
        match (latitude_attr, longitude_attr) {
            (Some(latitude_attr), Some(longitude_attr)) => Some(GeoAnchor {
                latitude_attr,
                longitude_attr,
                latitude,
                longitude,
            }),
            _ => {
                tracing::debug!(
                    types = candidates.len(),
                    "no latitude/longitude attributes found; skipping geo anchor"
                );
                None
            }
        }
    }
}

fn resolve_match_mode(opts: &SearchOptions) -> MatchMode {
    opts.match_mode.unwrap_or(if opts.has_conditions() {
        MatchMode::Extended
    } else {
        MatchMode::All
    })
}

fn resolve_sort(opts: &SearchOptions, classes: &[&TypeMeta]) -> (SortMode, String) {
    match &opts.order {
        Some(Order::Attribute(attribute)) => (
            opts.sort_mode.unwrap_or(SortMode::AttrAsc),
            sortable_field(attribute, classes).unwrap_or_else(|| attribute.clone()),
        ),
        Some(Order::Clause(clause)) => (
            opts.sort_mode.unwrap_or(SortMode::Extended),
            sortable_clause(clause, classes),
        ),
        None => (opts.sort_mode.unwrap_or(SortMode::Relevance), String::new()),
    }
}

fn sortable_field(field: &str, classes: &[&TypeMeta]) -> Option<String> {
    classes
        .iter()
        .find_map(|meta| meta.sortable_attribute(field))
}

/// Swaps field names for their sortable shadows in place. Tokens are runs
/// between whitespace and commas; separators are copied through untouched.
pub fn sortable_clause(clause: &str, classes: &[&TypeMeta]) -> String {
    let mut out = String::with_capacity(clause.len() + 8);
    let mut token_start = None;
    for (idx, ch) in clause.char_indices() {
        if ch.is_whitespace() || ch == ',' {
            if let Some(start) = token_start.take() {
                push_sort_token(&mut out, &clause[start..idx], classes);
            }
            out.push(ch);
        } else if token_start.is_none() {
            token_start = Some(idx);
        }
    }
    if let Some(start) = token_start {
        push_sort_token(&mut out, &clause[start..], classes);
    }
    out
}

fn push_sort_token(out: &mut String, token: &str, classes: &[&TypeMeta]) {
    let direction = token.eq_ignore_ascii_case("asc") || token.eq_ignore_ascii_case("desc");
    match sortable_field(token, classes).filter(|_| !direction) {
        Some(shadow) => out.push_str(&shadow),
        None => out.push_str(token),
    }
}

fn resolve_group(opts: &SearchOptions) -> (Option<String>, Option<GroupFunction>) {
    let group_by = opts.group_by.clone().or_else(|| opts.group.clone());
    let group_function = opts
        .group_function
        .or(opts.group.as_ref().map(|_| GroupFunction::Attr));
    (group_by, group_function)
}

fn resolve_indexes(opts: &SearchOptions, classes: &[&TypeMeta]) -> Vec<String> {
    if let Some(indexes) = &opts.index {
        return indexes.clone();
    }
    if classes.is_empty() {
        return vec![ALL_INDEXES.to_string()];
    }
    let mut out: Vec<String> = Vec::new();
    for meta in classes {
        for index in meta.index_names() {
            if !out.iter().any(|i| i == index) {
                out.push(index.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        TypeRegistry::new([
            TypeMeta::new("Alpha")
                .with_attributes(["lat", "lng", "name_sort"])
                .with_sortable_fields(["name"]),
            TypeMeta::new("Beta").with_attributes(["lat", "lon"]),
            TypeMeta::new("Person").with_attributes(["latitude", "longitude"]),
            TypeMeta::new("Friendship").with_geo_attributes("person_id", "person_id"),
        ])
    }

    fn build(opts: SearchOptions) -> SearchRequest {
        let config = Config::default();
        let registry = registry();
        RequestBuilder::new(&config, &registry)
            .build(&opts)
            .expect("build request")
    }

    #[test]
    fn pagination_defaults() {
        let req = build(SearchOptions::new());
        assert_eq!(req.limit, 20);
        assert_eq!(req.offset, 0);
    }

    #[test]
    fn pagination_offsets_by_page() {
        assert_eq!(build(SearchOptions::new().per_page(30)).limit, 30);
        assert_eq!(build(SearchOptions::new().page(3)).offset, 40);
        assert_eq!(build(SearchOptions::new().page(3).per_page(30)).offset, 60);
        assert_eq!(build(SearchOptions::new().page(2).per_page(25)).offset, 25);
    }

    #[test]
    fn limit_overrides_per_page() {
        let opts = SearchOptions::new().per_page(30).limit(40);
        let pagination = Pagination::resolve(&opts, &Config::default());
        assert_eq!(pagination.per_page, 40);
    }

    #[test]
    fn explicit_offset_wins() {
        let req = build(SearchOptions::new().page(3).offset(5));
        assert_eq!(req.offset, 5);
    }

    #[test]
    fn zero_page_size_is_invalid() {
        let config = Config::default();
        let registry = registry();
        let err = RequestBuilder::new(&config, &registry)
            .build(&SearchOptions::new().per_page(0))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_pagination");
    }

    #[test]
    fn sort_mode_resolution() {
        assert_eq!(build(SearchOptions::new()).sort_mode, SortMode::Relevance);
        assert_eq!(
            build(SearchOptions::new().order_by("created_at")).sort_mode,
            SortMode::AttrAsc
        );
        assert_eq!(
            build(
                SearchOptions::new()
                    .order_by("created_at")
                    .sort_mode(SortMode::AttrDesc)
            )
            .sort_mode,
            SortMode::AttrDesc
        );
        assert_eq!(
            build(SearchOptions::new().order_clause("created_at ASC")).sort_mode,
            SortMode::Extended
        );
        assert_eq!(
            build(
                SearchOptions::new()
                    .order_clause("created_at ASC")
                    .sort_mode(SortMode::Expr)
            )
            .sort_mode,
            SortMode::Expr
        );
        assert_eq!(
            build(
                SearchOptions::new()
                    .order_clause("created_at")
                    .sort_mode(SortMode::AttrDesc)
            )
            .sort_mode,
            SortMode::AttrDesc
        );
    }

    #[test]
    fn sort_by_uses_sortable_shadows() {
        assert_eq!(
            build(SearchOptions::new().order_by("created_at")).sort_by,
            "created_at"
        );
        assert_eq!(
            build(SearchOptions::new().order_by("name").class("Alpha")).sort_by,
            "name_sort"
        );
        assert_eq!(
            build(
                SearchOptions::new()
                    .order_clause("created_at ASC, name DESC")
                    .class("Alpha")
            )
            .sort_by,
            "created_at ASC, name_sort DESC"
        );
    }

    #[test]
    fn sortable_clause_keeps_separators() {
        let registry = registry();
        let alpha = registry.get("Alpha").unwrap();
        assert_eq!(
            sortable_clause("name ASC,created_at  DESC", &[alpha]),
            "name_sort ASC,created_at  DESC"
        );
        assert_eq!(
            sortable_clause(" name desc ,  name", &[alpha]),
            " name_sort desc ,  name_sort"
        );
        assert_eq!(sortable_clause("", &[alpha]), "");
    }

    #[test]
    fn sort_by_without_classes_is_untouched() {
        assert_eq!(build(SearchOptions::new().order_by("name")).sort_by, "name");
    }

    #[test]
    fn match_mode_resolution() {
        assert_eq!(build(SearchOptions::new()).match_mode, MatchMode::All);
        let conditions = SearchOptions::new()
            .text("general")
            .condition("foo", ["word"])
            .condition("bar", ["word"]);
        assert_eq!(build(conditions.clone()).match_mode, MatchMode::Extended);
        assert_eq!(
            build(conditions.match_mode(MatchMode::Extended2)).match_mode,
            MatchMode::Extended2
        );
    }

    #[test]
    fn group_shorthand() {
        let req = build(SearchOptions::new().group("edition"));
        assert_eq!(req.group_by.as_deref(), Some("edition"));
        assert_eq!(req.group_function, Some(GroupFunction::Attr));
    }

    #[test]
    fn explicit_grouping_passes_through() {
        let req = build(
            SearchOptions::new()
                .group_by("created_at")
                .group_function(GroupFunction::Attr)
                .group_clause("clause")
                .group_distinct("distinct"),
        );
        assert_eq!(req.group_by.as_deref(), Some("created_at"));
        assert_eq!(req.group_function, Some(GroupFunction::Attr));
        assert_eq!(req.group_clause.as_deref(), Some("clause"));
        assert_eq!(req.group_distinct.as_deref(), Some("distinct"));
    }

    fn anchor_attrs(opts: SearchOptions) -> (String, String) {
        let anchor = build(opts).anchor.expect("anchor");
        (anchor.latitude_attr, anchor.longitude_attr)
    }

    #[test]
    fn geo_attributes_are_detected_per_type() {
        let geo = || SearchOptions::new().geo(1.0, -1.0);
        assert_eq!(
            anchor_attrs(geo().class("Alpha")),
            ("lat".into(), "lng".into())
        );
        assert_eq!(
            anchor_attrs(geo().class("Beta")),
            ("lat".into(), "lon".into())
        );
        assert_eq!(
            anchor_attrs(geo().class("Person")),
            ("latitude".into(), "longitude".into())
        );
        assert_eq!(
            anchor_attrs(geo().class("Friendship")),
            ("person_id".into(), "person_id".into())
        );
        assert_eq!(
            anchor_attrs(geo().class("Alpha").geo_attributes("updown", "leftright")),
            ("updown".into(), "leftright".into())
        );
    }

    #[test]
    fn geo_first_matching_type_wins() {
        let opts = SearchOptions::new()
            .geo(1.0, -1.0)
            .class("Beta")
            .class("Alpha");
        assert_eq!(anchor_attrs(opts), ("lat".into(), "lon".into()));
    }

    #[test]
    fn geo_values_from_either_form() {
        let anchor = build(SearchOptions::new().geo(1.0, -1.0).class("Alpha"))
            .anchor
            .unwrap();
        assert_eq!((anchor.latitude, anchor.longitude), (1.0, -1.0));
        let anchor = build(SearchOptions::new().lat(1.0).lng(-1.0).class("Alpha"))
            .anchor
            .unwrap();
        assert_eq!((anchor.latitude, anchor.longitude), (1.0, -1.0));
    }

    #[test]
    fn geo_without_attributes_is_silently_dropped() {
        let config = Config::default();
        let registry = TypeRegistry::new([TypeMeta::new("Plain")]);
        let req = RequestBuilder::new(&config, &registry)
            .build(&SearchOptions::new().geo(1.0, -1.0).class("Plain"))
            .unwrap();
        assert!(req.anchor.is_none());
    }

    #[test]
    fn index_weights_expand_types() {
        let req = build(SearchOptions::new().index_weight("foo", 100));
        assert_eq!(req.index_weight("foo"), Some(100));

        let req = build(SearchOptions::new().type_weight("Alpha", 100));
        assert_eq!(
            req.index_weights,
            vec![
                IndexWeight {
                    index: "alpha_core".into(),
                    weight: 100
                },
                IndexWeight {
                    index: "alpha_delta".into(),
                    weight: 100
                },
            ]
        );
    }

    #[test]
    fn max_matches_and_comment_defaults() {
        let req = build(SearchOptions::new());
        assert_eq!(req.max_matches, 1000);
        assert_eq!(req.comment, "");
        let req = build(SearchOptions::new().max_matches(2000).comment("custom log"));
        assert_eq!(req.max_matches, 2000);
        assert_eq!(req.comment, "custom log");
    }

    #[test]
    fn indexes_follow_classes() {
        assert_eq!(build(SearchOptions::new()).indexes, vec!["*"]);
        assert_eq!(
            build(SearchOptions::new().class("Alpha").class("Beta")).index_list(),
            "alpha_core,alpha_delta,beta_core,beta_delta"
        );
        assert_eq!(
            build(SearchOptions::new().class("Alpha").index(["custom"])).indexes,
            vec!["custom"]
        );
    }

    #[test]
    fn configured_star_token_applies_to_default_star() {
        let config = Config {
            star_token: Some(r"[\w@.]+".to_string()),
            ..Config::default()
        };
        let registry = registry();
        let req = RequestBuilder::new(&config, &registry)
            .build(&SearchOptions::new().text("foo@bar.com").star(Star::Default))
            .unwrap();
        assert_eq!(req.query, "*foo@bar.com*");
    }
}
