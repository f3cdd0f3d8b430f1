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

use std::ops::Range;
use std::ops::RangeInclusive;

use time::OffsetDateTime;

use crate::error::Error;
use crate::error::Result;
use crate::model::AttributeFilter;
use crate::model::FilterValues;
use crate::model::Scalar;
use crate::options::SearchOptions;
use crate::registry::CLASS_ATTRIBUTE;
use crate::registry::DELETED_ATTRIBUTE;
use crate::registry::ID_ATTRIBUTE;
use crate::registry::TypeRegistry;

/// Accepted input shapes for `with`, `without` and `with_all`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    IntRange {
        start: i64,
        end: i64,
        inclusive: bool,
    },
    FloatRange {
        min: f64,
        max: f64,
    },
    TimeRange {
        start: OffsetDateTime,
        end: OffsetDateTime,
        inclusive: bool,
    },
    /// Untyped input, validated when normalized.
    Json(serde_json::Value),
}

impl FilterValue {
    fn normalize(&self, attribute: &str) -> Result<FilterValues> {
        match self {
            FilterValue::Scalar(v) => Ok(FilterValues::Set {
                values: vec![v.clone()],
            }),
            FilterValue::List(values) => {
                if values.is_empty() {
                    return Err(Error::unsupported(attribute, "empty list"));
                }
                Ok(FilterValues::Set {
                    values: values.clone(),
                })
            }
            FilterValue::IntRange {
                start,
                end,
                inclusive,
            } => int_range(attribute, *start, *end, *inclusive),
            FilterValue::FloatRange { min, max } => {
                if min.is_nan() || max.is_nan() || min > max {
                    return Err(Error::unsupported(attribute, "empty float range"));
                }
                Ok(FilterValues::FloatRange {
                    min: *min,
                    max: *max,
                })
            }
            FilterValue::TimeRange {
                start,
                end,
                inclusive,
            } => int_range(
                attribute,
                start.unix_timestamp(),
                end.unix_timestamp(),
                *inclusive,
            ),
            FilterValue::Json(value) => json_values(attribute, value),
        }
    }

    /// One value set per element for `with_all`; non-list shapes stay whole.
    fn explode(&self, attribute: &str) -> Result<Vec<FilterValues>> {
        match self.normalize(attribute)? {
            FilterValues::Set { values } => Ok(values
                .into_iter()
                .map(|v| FilterValues::Set { values: vec![v] })
                .collect()),
            other => Ok(vec![other]),
        }
    }
}

fn int_range(attribute: &str, start: i64, end: i64, inclusive: bool) -> Result<FilterValues> {
    let max = if inclusive { Some(end) } else { end.checked_sub(1) };
    match max {
        Some(max) if start <= max => Ok(FilterValues::Range { min: start, max }),
        _ => Err(Error::unsupported(attribute, "empty range")),
    }
}

fn json_scalar(attribute: &str, value: &serde_json::Value) -> Result<Scalar> {
    match value {
        serde_json::Value::Bool(b) => Ok(Scalar::Bool(*b)),
        serde_json::Value::String(s) => Ok(Scalar::Str(s.clone())),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Scalar::Float(f))
            } else {
                Err(Error::unsupported(attribute, format!("number {n} out of range")))
            }
        }
        serde_json::Value::Null => Err(Error::unsupported(attribute, "null")),
        serde_json::Value::Array(_) => Err(Error::unsupported(attribute, "nested array")),
        serde_json::Value::Object(_) => Err(Error::unsupported(attribute, "object")),
    }
}

fn json_values(attribute: &str, value: &serde_json::Value) -> Result<FilterValues> {
    match value {
        serde_json::Value::Array(items) => {
            if items.is_empty() {
                return Err(Error::unsupported(attribute, "empty list"));
            }
            let values = items
                .iter()
                .map(|item| json_scalar(attribute, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(FilterValues::Set { values })
        }
        other => Ok(FilterValues::Set {
            values: vec![json_scalar(attribute, other)?],
        }),
    }
}

macro_rules! scalar_filter_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    FilterValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_filter_value!(i64, i32, u32, f64, bool, &str, String, Scalar);

impl<T: Into<Scalar>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>, const N: usize> From<[T; N]> for FilterValue {
    fn from(values: [T; N]) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<RangeInclusive<i64>> for FilterValue {
    fn from(range: RangeInclusive<i64>) -> Self {
        let (start, end) = range.into_inner();
        FilterValue::IntRange {
            start,
            end,
            inclusive: true,
        }
    }
}

impl From<Range<i64>> for FilterValue {
    fn from(range: Range<i64>) -> Self {
        FilterValue::IntRange {
            start: range.start,
            end: range.end,
            inclusive: false,
        }
    }
}

impl From<RangeInclusive<f64>> for FilterValue {
    fn from(range: RangeInclusive<f64>) -> Self {
        let (min, max) = range.into_inner();
        FilterValue::FloatRange { min, max }
    }
}

impl From<RangeInclusive<OffsetDateTime>> for FilterValue {
    fn from(range: RangeInclusive<OffsetDateTime>) -> Self {
        let (start, end) = range.into_inner();
        FilterValue::TimeRange {
            start,
            end,
            inclusive: true,
        }
    }
}

impl From<Range<OffsetDateTime>> for FilterValue {
    fn from(range: Range<OffsetDateTime>) -> Self {
        FilterValue::TimeRange {
            start: range.start,
            end: range.end,
            inclusive: false,
        }
    }
}

impl From<serde_json::Value> for FilterValue {
    fn from(value: serde_json::Value) -> Self {
        FilterValue::Json(value)
    }
}

/// Filters in daemon order: class restriction, soft-delete, `with`,
/// `without`, exploded `with_all`, then `without_ids`.
pub fn normalize_filters(
    opts: &SearchOptions,
    registry: &TypeRegistry,
) -> Result<Vec<AttributeFilter>> {
    let mut filters = Vec::new();

    if !opts.classes.is_empty() {
        let crcs = registry.class_fingerprints(&opts.classes)?;
        filters.push(AttributeFilter::include(
            CLASS_ATTRIBUTE,
            FilterValues::set(crcs),
        ));
    }

    if !opts.include_deleted {
        filters.push(AttributeFilter::include(
            DELETED_ATTRIBUTE,
            FilterValues::set([0i64]),
        ));
    }

    for (attribute, value) in &opts.with {
        filters.push(AttributeFilter::include(
            attribute.clone(),
            value.normalize(attribute)?,
        ));
    }

    for (attribute, value) in &opts.without {
        filters.push(AttributeFilter::exclude(
            attribute.clone(),
            value.normalize(attribute)?,
        ));
    }

    for (attribute, value) in &opts.with_all {
        for values in value.explode(attribute)? {
            filters.push(AttributeFilter::include(attribute.clone(), values));
        }
    }

    if !opts.without_ids.is_empty() {
        let ids = opts
            .without_ids
            .iter()
            .map(|&id| i64::try_from(id).map(Scalar::Int))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::unsupported(ID_ATTRIBUTE, "id exceeds i64 range"))?;
        filters.push(AttributeFilter::exclude(
            ID_ATTRIBUTE,
            FilterValues::Set { values: ids },
        ));
    }

    Ok(filters)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::Duration;
    use time::macros::datetime;

    use super::*;
    use crate::registry::TypeMeta;
    use crate::registry::fingerprint;

    fn registry() -> TypeRegistry {
        TypeRegistry::new([TypeMeta::new("Alpha"), TypeMeta::new("Beta")])
    }

    fn last(opts: SearchOptions) -> AttributeFilter {
        normalize_filters(&opts, &registry())
            .unwrap()
            .pop()
            .expect("at least one filter")
    }

    #[test]
    fn soft_delete_filter_is_always_present() {
        let filters = normalize_filters(&SearchOptions::new(), &registry()).unwrap();
        assert_eq!(
            filters,
            vec![AttributeFilter::include(
                "sphinx_deleted",
                FilterValues::set([0i64])
            )]
        );
    }

    #[test]
    fn soft_delete_filter_can_be_disabled() {
        let opts = SearchOptions::new().include_deleted(true);
        assert!(normalize_filters(&opts, &registry()).unwrap().is_empty());
    }

    #[test]
    fn with_scalars_are_inclusive_single_values() {
        let f = last(SearchOptions::new().with("int", 1i64));
        assert_eq!(f, AttributeFilter::include("int", FilterValues::set([1i64])));

        let f = last(SearchOptions::new().with("float", 1.5));
        assert_eq!(f.values, FilterValues::set([1.5]));

        let f = last(SearchOptions::new().with("boolean", true));
        assert_eq!(f.values, FilterValues::set([true]));
        assert!(!f.exclude);
    }

    #[test]
    fn without_scalars_are_exclusive() {
        let f = last(SearchOptions::new().without("int", 1i64));
        assert_eq!(f, AttributeFilter::exclude("int", FilterValues::set([1i64])));
    }

    #[test]
    fn arrays_keep_their_order() {
        let f = last(SearchOptions::new().with("ints", [3i64, 1, 2]));
        assert_eq!(f.values, FilterValues::set([3i64, 1, 2]));
        let f = last(SearchOptions::new().without("ints", vec![1i64, 2, 3]));
        assert!(f.exclude);
        assert_eq!(f.values, FilterValues::set([1i64, 2, 3]));
    }

    #[test]
    fn time_ranges_become_epoch_seconds() {
        let last_time = datetime!(2024-03-08 12:00 UTC);
        let first_time = last_time - Duration::weeks(1);
        let f = last(SearchOptions::new().with("time", first_time..=last_time));
        assert_eq!(
            f.values,
            FilterValues::Range {
                min: first_time.unix_timestamp(),
                max: last_time.unix_timestamp(),
            }
        );
        let f = last(SearchOptions::new().without("time", first_time..=last_time));
        assert!(f.exclude);
    }

    #[test]
    fn half_open_ranges_are_stored_inclusive() {
        let f = last(SearchOptions::new().with("n", 1i64..5));
        assert_eq!(f.values, FilterValues::Range { min: 1, max: 4 });
    }

    #[test]
    fn with_all_explodes_per_value() {
        let opts = SearchOptions::new().with_all("ints", [1i64, 2, 3]);
        let filters = normalize_filters(&opts, &registry()).unwrap();
        let tail = &filters[filters.len() - 3..];
        for (filter, expected) in tail.iter().zip([1i64, 2, 3]) {
            assert_eq!(filter.attribute, "ints");
            assert!(!filter.exclude);
            assert_eq!(filter.values, FilterValues::set([expected]));
        }
    }

    #[test]
    fn without_ids_target_internal_id() {
        let f = last(SearchOptions::new().without_ids([4, 5, 6]));
        assert_eq!(
            f,
            AttributeFilter::exclude("sphinx_internal_id", FilterValues::set([4i64, 5, 6]))
        );
    }

    #[test]
    fn class_filter_comes_first() {
        let opts = SearchOptions::new()
            .class("Alpha")
            .class("Beta")
            .with("int", 1i64);
        let filters = normalize_filters(&opts, &registry()).unwrap();
        let attrs: Vec<&str> = filters.iter().map(|f| f.attribute.as_str()).collect();
        assert_eq!(attrs, vec!["class_crc", "sphinx_deleted", "int"]);
        assert_eq!(
            filters[0].values,
            FilterValues::set([fingerprint("Alpha"), fingerprint("Beta")])
        );
    }

    #[test]
    fn with_entries_precede_without_and_with_all() {
        let opts = SearchOptions::new()
            .without_ids([9])
            .with_all("tags", [1i64, 2])
            .without("b", 2i64)
            .with("a", 1i64);
        let filters = normalize_filters(&opts, &registry()).unwrap();
        let attrs: Vec<&str> = filters.iter().map(|f| f.attribute.as_str()).collect();
        assert_eq!(
            attrs,
            vec!["sphinx_deleted", "a", "b", "tags", "tags", "sphinx_internal_id"]
        );
    }

    #[test]
    fn json_values_are_validated() {
        let f = last(SearchOptions::new().with("ints", json!([1, 2.5, "x", true])));
        assert_eq!(
            f.values,
            FilterValues::Set {
                values: vec![
                    Scalar::Int(1),
                    Scalar::Float(2.5),
                    Scalar::Str("x".into()),
                    Scalar::Bool(true)
                ]
            }
        );

        for bad in [json!(null), json!({"a": 1}), json!([[1]]), json!([])] {
            let opts = SearchOptions::new().with("attr", bad);
            let err = normalize_filters(&opts, &registry()).unwrap_err();
            assert_eq!(err.code(), "unsupported_filter_value");
        }
    }

    #[test]
    fn unknown_class_fails() {
        let opts = SearchOptions::new().class("Ghost");
        let err = normalize_filters(&opts, &registry()).unwrap_err();
        assert_eq!(err.code(), "unknown_type");
    }
}
