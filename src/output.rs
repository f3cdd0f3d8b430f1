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

use anyhow::Result;
use serde::Serialize;
use sift::TypeMeta;
use sift::model::SearchRequest;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct JsonResponse {
    pub ok: bool,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<SearchRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<TypeMeta>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

impl JsonResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            schema_version: "1".to_string(),
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            schema_version: "1".to_string(),
            error: Some(ErrorOut {
                code: code.to_string(),
                message: message.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn with_request(mut self, request: SearchRequest) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_types(mut self, types: Vec<TypeMeta>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub fn print_json(resp: &JsonResponse) -> Result<()> {
    let text = serde_json::to_string_pretty(resp)?;
    println!("{text}");
    Ok(())
}

/// Plain-text rendering of a resolved request, one setting per line.
pub fn render_request(request: &SearchRequest) -> String {
    let mut lines = vec![
        format!("query: {}", request.query),
        format!("indexes: {}", request.index_list()),
        format!("match_mode: {}", request.match_mode.as_str()),
        format!("sort_mode: {}", request.sort_mode.as_str()),
    ];
    if !request.sort_by.is_empty() {
        lines.push(format!("sort_by: {}", request.sort_by));
    }
    lines.push(format!("limit: {}", request.limit));
    lines.push(format!("offset: {}", request.offset));
    lines.push(format!("max_matches: {}", request.max_matches));
    if let Some(group_by) = &request.group_by {
        let function = request.group_function.map(|f| f.as_str()).unwrap_or("attr");
        lines.push(format!("group_by: {group_by} ({function})"));
    }
    if let Some(anchor) = &request.anchor {
        lines.push(format!(
            "anchor: {}={} {}={}",
            anchor.latitude_attr, anchor.latitude, anchor.longitude_attr, anchor.longitude
        ));
    }
    for weight in &request.index_weights {
        lines.push(format!("weight: {}={}", weight.index, weight.weight));
    }
    for filter in &request.filters {
        lines.push(format!("filter: {filter}"));
    }
    if !request.comment.is_empty() {
        lines.push(format!("comment: {}", request.comment));
    }
    lines.join("\n")
}
