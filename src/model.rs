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

//! Shared request types handed from the configurator to the daemon client.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

/// Values a single attribute filter matches against. Ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterValues {
    Set { values: Vec<Scalar> },
    Range { min: i64, max: i64 },
    FloatRange { min: f64, max: f64 },
}

impl FilterValues {
    pub fn set<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        FilterValues::Set {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn as_set(&self) -> Option<&[Scalar]> {
        match self {
            FilterValues::Set { values } => Some(values),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeFilter {
    pub attribute: String,
    pub values: FilterValues,
    pub exclude: bool,
}

impl AttributeFilter {
    pub fn include(attribute: impl Into<String>, values: FilterValues) -> Self {
        Self {
            attribute: attribute.into(),
            values,
            exclude: false,
        }
    }

    pub fn exclude(attribute: impl Into<String>, values: FilterValues) -> Self {
        Self {
            attribute: attribute.into(),
            values,
            exclude: true,
        }
    }
}

impl fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.exclude { "NOT IN" } else { "IN" };
        match &self.values {
            FilterValues::Set { values } => {
                let list = values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{} {} ({})", self.attribute, op, list)
            }
            FilterValues::Range { min, max } => {
                write!(f, "{} {} {}..={}", self.attribute, op, min, max)
            }
            FilterValues::FloatRange { min, max } => {
                write!(f, "{} {} {}..={}", self.attribute, op, min, max)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    All,
    Any,
    Phrase,
    Boolean,
    Extended,
    Extended2,
    Fullscan,
}

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::All => "all",
            MatchMode::Any => "any",
            MatchMode::Phrase => "phrase",
            MatchMode::Boolean => "boolean",
            MatchMode::Extended => "extended",
            MatchMode::Extended2 => "extended2",
            MatchMode::Fullscan => "fullscan",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "all" => Some(MatchMode::All),
            "any" => Some(MatchMode::Any),
            "phrase" => Some(MatchMode::Phrase),
            "boolean" => Some(MatchMode::Boolean),
            "extended" => Some(MatchMode::Extended),
            "extended2" => Some(MatchMode::Extended2),
            "fullscan" => Some(MatchMode::Fullscan),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Relevance,
    AttrDesc,
    AttrAsc,
    TimeSegments,
    Extended,
    Expr,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::AttrDesc => "attr_desc",
            SortMode::AttrAsc => "attr_asc",
            SortMode::TimeSegments => "time_segments",
            SortMode::Extended => "extended",
            SortMode::Expr => "expr",
        }
    }

    /// Accepts the daemon's mode names plus the `asc`/`desc` shorthands.
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "relevance" => Some(SortMode::Relevance),
            "desc" | "attr_desc" => Some(SortMode::AttrDesc),
            "asc" | "attr_asc" => Some(SortMode::AttrAsc),
            "time_segments" => Some(SortMode::TimeSegments),
            "extended" => Some(SortMode::Extended),
            "expr" => Some(SortMode::Expr),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupFunction {
    Day,
    Week,
    Month,
    Year,
    Attr,
    AttrPair,
}

impl GroupFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupFunction::Day => "day",
            GroupFunction::Week => "week",
            GroupFunction::Month => "month",
            GroupFunction::Year => "year",
            GroupFunction::Attr => "attr",
            GroupFunction::AttrPair => "attrpair",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "day" => Some(GroupFunction::Day),
            "week" => Some(GroupFunction::Week),
            "month" => Some(GroupFunction::Month),
            "year" => Some(GroupFunction::Year),
            "attr" => Some(GroupFunction::Attr),
            "attrpair" | "attr_pair" => Some(GroupFunction::AttrPair),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexWeight {
    pub index: String,
    pub weight: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoAnchor {
    pub latitude_attr: String,
    pub longitude_attr: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything the daemon client needs for one query call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub indexes: Vec<String>,
    pub comment: String,
    pub match_mode: MatchMode,
    pub limit: usize,
    pub offset: usize,
    pub max_matches: usize,
    pub sort_mode: SortMode,
    pub sort_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_function: Option<GroupFunction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_clause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_distinct: Option<String>,
    pub index_weights: Vec<IndexWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<GeoAnchor>,
    pub filters: Vec<AttributeFilter>,
}

impl SearchRequest {
    /// Comma-joined index list as the daemon protocol expects it.
    pub fn index_list(&self) -> String {
        self.indexes.join(",")
    }

    pub fn index_weight(&self, index: &str) -> Option<i64> {
        self.index_weights
            .iter()
            .find(|w| w.index == index)
            .map(|w| w.weight)
    }
}
