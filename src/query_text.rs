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

//! Builds the daemon query string from free text, field conditions, and
//! optional auto-starring.

use regex::Regex;

use crate::error::Result;

pub const DEFAULT_STAR_TOKEN: &str = r"\w+";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Star {
    #[default]
    Off,
    /// Star every `\w+` run.
    Default,
    /// Star every run of the given token pattern.
    Pattern(String),
}

impl Star {
    fn token(&self) -> Option<&str> {
        match self {
            Star::Off => None,
            Star::Default => Some(DEFAULT_STAR_TOKEN),
            Star::Pattern(pattern) => Some(pattern.as_str()),
        }
    }
}

/// `@field value...` fragment appended after the free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub values: Vec<String>,
}

impl Condition {
    pub fn new<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn build_query(tokens: &[String], conditions: &[Condition], star: &Star) -> Result<String> {
    let mut query = tokens.join(" ");
    for cond in conditions {
        if cond.values.is_empty() {
            continue;
        }
        query.push_str(" @");
        query.push_str(&cond.field);
        for value in &cond.values {
            query.push(' ');
            query.push_str(value);
        }
    }

    let query = match star.token() {
        Some(token) => star_query(&query, token)?,
        None => query,
    };
    Ok(query.trim().to_string())
}

/// Wraps every token run in `*` except quoted phrases, operator arguments
/// (`@field`, `~N`, `/N`, `@(fields)`), and runs already touching a `*`.
/// Runs never start at `!` or `-` so negation stays outside the stars.
pub fn star_query(query: &str, token: &str) -> Result<String> {
    let pattern = format!(r#""(?:{token})(?:.*?(?:{token}))?"|(?:{token})"#);
    let re = Regex::new(&pattern)?;

    let mut out = String::with_capacity(query.len() * 2);
    let mut copied = 0usize;
    let mut pos = 0usize;
    while pos <= query.len() {
        let Some(m) = re.find_at(query, pos) else {
            break;
        };
        if m.is_empty() {
            pos = next_char_boundary(query, m.end());
            continue;
        }
        let proper = m.as_str();
        if proper.starts_with(['!', '-']) {
            pos = next_char_boundary(query, m.start());
            continue;
        }

        let pre = &query[..m.start()];
        let post = &query[m.end()..];
        out.push_str(&query[copied..m.start()]);
        if is_operator_argument(pre) || is_quoted(proper) || pre.ends_with('*') || post.starts_with('*')
        {
            out.push_str(proper);
        } else {
            out.push('*');
            out.push_str(proper);
            out.push('*');
        }
        copied = m.end();
        pos = m.end();
    }
    out.push_str(&query[copied..]);
    Ok(out)
}

fn next_char_boundary(text: &str, idx: usize) -> usize {
    text[idx..]
        .chars()
        .next()
        .map(|c| idx + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn preceded_by_boundary(text: &str, idx: usize) -> bool {
    text[..idx].chars().next_back().is_none_or(|c| !is_word_char(c))
}

fn is_operator_argument(pre: &str) -> bool {
    if let Some(last) = pre.chars().next_back()
        && matches!(last, '@' | '~' | '/')
        && preceded_by_boundary(pre, pre.len() - last.len_utf8())
    {
        return true;
    }
    // Inside an unterminated `@(field, field)` list.
    pre.match_indices("@(")
        .any(|(idx, _)| preceded_by_boundary(pre, idx) && !pre[idx..].contains(')'))
}

fn is_quoted(proper: &str) -> bool {
    proper.starts_with('"') && proper.ends_with('"')
}
