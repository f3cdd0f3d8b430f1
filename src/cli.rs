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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use sift::FilterValue;
use sift::SearchOptions;
use sift::Star;
use sift::model::GroupFunction;
use sift::model::MatchMode;
use sift::model::Scalar;
use sift::model::SortMode;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Parser, Debug)]
#[command(
    name = "sift",
    version,
    about = "Build and inspect search daemon requests"
)]
pub struct Cli {
    /// Config file (defaults to the global sift.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve options into the request sent to the daemon
    Request(RequestArgs),

    /// List registered types
    Types {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the global config path
    Path,
}

#[derive(Args, Debug, Default)]
pub struct RequestArgs {
    /// Free-text query tokens
    pub text: Vec<String>,

    /// Field condition, `field=word word`
    #[arg(long = "condition", value_parser = parse_condition)]
    pub conditions: Vec<(String, Vec<String>)>,

    /// Include filter, `attr=value`
    #[arg(long, value_parser = parse_filter)]
    pub with: Vec<(String, FilterValue)>,

    /// Exclude filter, `attr=value`
    #[arg(long, value_parser = parse_filter)]
    pub without: Vec<(String, FilterValue)>,

    /// Require every listed value, `attr=1,2,3`
    #[arg(long, value_parser = parse_filter)]
    pub with_all: Vec<(String, FilterValue)>,

    /// Record ids to exclude
    #[arg(long, value_delimiter = ',')]
    pub without_ids: Vec<u64>,

    /// Restrict to a type and its subtypes
    #[arg(long = "class")]
    pub classes: Vec<String>,

    /// Keep records flagged as deleted
    #[arg(long)]
    pub include_deleted: bool,

    /// Wrap query words in wildcards
    #[arg(long)]
    pub star: bool,

    /// Token pattern for starring (implies --star)
    #[arg(long)]
    pub star_token: Option<String>,

    #[arg(long)]
    pub page: Option<usize>,

    #[arg(long)]
    pub per_page: Option<usize>,

    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long)]
    pub offset: Option<usize>,

    /// Sort by a single attribute
    #[arg(long, conflicts_with = "order_clause")]
    pub order: Option<String>,

    /// Sort by a clause such as `created_at DESC, name ASC`
    #[arg(long)]
    pub order_clause: Option<String>,

    #[arg(long, value_parser = parse_sort_mode)]
    pub sort_mode: Option<SortMode>,

    #[arg(long, value_parser = parse_match_mode)]
    pub match_mode: Option<MatchMode>,

    /// Group by attribute value
    #[arg(long)]
    pub group: Option<String>,

    #[arg(long)]
    pub group_by: Option<String>,

    #[arg(long, value_parser = parse_group_function)]
    pub group_function: Option<GroupFunction>,

    #[arg(long)]
    pub group_clause: Option<String>,

    #[arg(long)]
    pub group_distinct: Option<String>,

    /// Anchor point in radians, `lat,lng`
    #[arg(long, value_parser = parse_geo, allow_hyphen_values = true)]
    pub geo: Option<(f64, f64)>,

    #[arg(long)]
    pub latitude_attr: Option<String>,

    #[arg(long)]
    pub longitude_attr: Option<String>,

    /// Per-index weight, `index=N`
    #[arg(long, value_parser = parse_weight)]
    pub index_weight: Vec<(String, i64)>,

    /// Per-type weight applied to its core and delta indexes, `Type=N`
    #[arg(long, value_parser = parse_weight)]
    pub type_weight: Vec<(String, i64)>,

    /// Explicit index list
    #[arg(long, value_delimiter = ',')]
    pub index: Vec<String>,

    #[arg(long)]
    pub max_matches: Option<usize>,

    #[arg(long)]
    pub comment: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

impl RequestArgs {
    pub fn to_options(&self) -> SearchOptions {
        let mut opts = SearchOptions::new();
        opts.text = self.text.clone();
        for (field, values) in &self.conditions {
            opts = opts.condition(field.clone(), values.iter().cloned());
        }
        opts.star = match (&self.star_token, self.star) {
            (Some(token), _) => Star::Pattern(token.clone()),
            (None, true) => Star::Default,
            (None, false) => Star::Off,
        };
        opts.with = self.with.clone();
        opts.without = self.without.clone();
        opts.with_all = self.with_all.clone();
        opts.without_ids = self.without_ids.clone();
        opts.classes = self.classes.clone();
        opts.include_deleted = self.include_deleted;
        opts.page = self.page;
        opts.per_page = self.per_page;
        opts.limit = self.limit;
        opts.offset = self.offset;
        if let Some(order) = &self.order {
            opts = opts.order_by(order.clone());
        }
        if let Some(clause) = &self.order_clause {
            opts = opts.order_clause(clause.clone());
        }
        opts.sort_mode = self.sort_mode;
        opts.match_mode = self.match_mode;
        opts.group = self.group.clone();
        opts.group_by = self.group_by.clone();
        opts.group_function = self.group_function;
        opts.group_clause = self.group_clause.clone();
        opts.group_distinct = self.group_distinct.clone();
        opts.geo = self.geo;
        opts.latitude_attr = self.latitude_attr.clone();
        opts.longitude_attr = self.longitude_attr.clone();
        for (index, weight) in &self.index_weight {
            opts = opts.index_weight(index.clone(), *weight);
        }
        for (type_name, weight) in &self.type_weight {
            opts = opts.type_weight(type_name.clone(), *weight);
        }
        if !self.index.is_empty() {
            opts = opts.index(self.index.iter().cloned());
        }
        opts.max_matches = self.max_matches;
        opts.comment = self.comment.clone();
        opts
    }
}

fn split_pair(input: &str) -> Result<(&str, &str), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(format!("expected `name=value`, got `{input}`")),
    }
}

pub fn parse_condition(input: &str) -> Result<(String, Vec<String>), String> {
    let (field, words) = split_pair(input)?;
    Ok((
        field.to_string(),
        words.split_whitespace().map(str::to_string).collect(),
    ))
}

pub fn parse_filter(input: &str) -> Result<(String, FilterValue), String> {
    let (attribute, value) = split_pair(input)?;
    Ok((attribute.to_string(), parse_filter_value(value)?))
}

/// `1`, `1,2,3`, `1.5`, `true`, `10..20`, `1.5..2.5`, or two RFC 3339
/// timestamps joined by `..`. Ranges are inclusive.
pub fn parse_filter_value(input: &str) -> Result<FilterValue, String> {
    if let Some((start, end)) = input.split_once("..") {
        return parse_range(start.trim(), end.trim());
    }
    if input.contains(',') {
        let values = input
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(parse_scalar)
            .collect::<Vec<_>>();
        return Ok(FilterValue::List(values));
    }
    Ok(FilterValue::Scalar(parse_scalar(input)))
}

fn parse_range(start: &str, end: &str) -> Result<FilterValue, String> {
    if let (Ok(start), Ok(end)) = (start.parse::<i64>(), end.parse::<i64>()) {
        return Ok(FilterValue::IntRange {
            start,
            end,
            inclusive: true,
        });
    }
    if let (Ok(min), Ok(max)) = (start.parse::<f64>(), end.parse::<f64>()) {
        return Ok(FilterValue::FloatRange { min, max });
    }
    match (
        OffsetDateTime::parse(start, &Rfc3339),
        OffsetDateTime::parse(end, &Rfc3339),
    ) {
        (Ok(start), Ok(end)) => Ok(FilterValue::TimeRange {
            start,
            end,
            inclusive: true,
        }),
        _ => Err(format!("unsupported range `{start}..{end}`")),
    }
}

fn parse_scalar(input: &str) -> Scalar {
    if let Ok(v) = input.parse::<i64>() {
        return Scalar::Int(v);
    }
    if let Ok(v) = input.parse::<f64>() {
        return Scalar::Float(v);
    }
    match input {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        other => Scalar::Str(other.to_string()),
    }
}

fn parse_geo(input: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = input
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lng`, got `{input}`"))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let lng = lng.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((lat, lng))
}

fn parse_weight(input: &str) -> Result<(String, i64), String> {
    let (name, weight) = split_pair(input)?;
    let weight = weight.parse::<i64>().map_err(|e| e.to_string())?;
    Ok((name.to_string(), weight))
}

fn parse_sort_mode(input: &str) -> Result<SortMode, String> {
    SortMode::parse(input).ok_or_else(|| format!("unknown sort mode `{input}`"))
}

fn parse_match_mode(input: &str) -> Result<MatchMode, String> {
    MatchMode::parse(input).ok_or_else(|| format!("unknown match mode `{input}`"))
}

fn parse_group_function(input: &str) -> Result<GroupFunction, String> {
    GroupFunction::parse(input).ok_or_else(|| format!("unknown group function `{input}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_filters() {
        assert_eq!(
            parse_filter("age=30").unwrap(),
            ("age".to_string(), FilterValue::Scalar(Scalar::Int(30)))
        );
        assert_eq!(
            parse_filter_value("1.5").unwrap(),
            FilterValue::Scalar(Scalar::Float(1.5))
        );
        assert_eq!(
            parse_filter_value("true").unwrap(),
            FilterValue::Scalar(Scalar::Bool(true))
        );
    }

    #[test]
    fn list_filters() {
        assert_eq!(
            parse_filter_value("1, 2,3").unwrap(),
            FilterValue::List(vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)])
        );
    }

    #[test]
    fn range_filters() {
        assert_eq!(
            parse_filter_value("10..20").unwrap(),
            FilterValue::IntRange {
                start: 10,
                end: 20,
                inclusive: true
            }
        );
        assert_eq!(
            parse_filter_value("0.5..1.5").unwrap(),
            FilterValue::FloatRange { min: 0.5, max: 1.5 }
        );
        let FilterValue::TimeRange { start, end, .. } =
            parse_filter_value("2026-01-01T00:00:00Z..2026-01-02T00:00:00Z").unwrap()
        else {
            panic!("expected a time range");
        };
        assert_eq!(end.unix_timestamp() - start.unix_timestamp(), 86_400);
    }

    #[test]
    fn bad_range_is_rejected() {
        assert!(parse_filter_value("a..b").is_err());
        assert!(parse_filter("=1").is_err());
    }

    #[test]
    fn conditions_split_words() {
        assert_eq!(
            parse_condition("title=rust search").unwrap(),
            (
                "title".to_string(),
                vec!["rust".to_string(), "search".to_string()]
            )
        );
    }

    #[test]
    fn star_token_implies_star() {
        let args = RequestArgs {
            star_token: Some("[\\w.]+".to_string()),
            ..RequestArgs::default()
        };
        assert_eq!(args.to_options().star, Star::Pattern("[\\w.]+".to_string()));
    }

    #[test]
    fn geo_parses_signed_pairs() {
        assert_eq!(parse_geo("0.5,-1.25").unwrap(), (0.5, -1.25));
    }
}
