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

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised while building a request, querying the daemon, or
/// reconciling matches. Clonable so an executed collection can keep handing
/// out the failure it captured.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unsupported value for filter attribute `{attribute}`: {message}")]
    UnsupportedFilterValue { attribute: String, message: String },
    #[error("no {type_name} record with id {id} for match at position {position}")]
    MissingRecord {
        type_name: String,
        id: u64,
        position: usize,
    },
    #[error("search daemon query failed: {message}")]
    DaemonQueryFailed { message: String },
    #[error("invalid pagination: {message}")]
    InvalidPagination { message: String },
    #[error("invalid star token pattern: {message}")]
    InvalidStarPattern { message: String },
    #[error("unknown type `{name}`")]
    UnknownType { name: String },
    #[error("no registered type has fingerprint {fingerprint}")]
    UnknownFingerprint { fingerprint: u32 },
    #[error("no object store registered for type `{type_name}`")]
    MissingStore { type_name: String },
    #[error("object store fetch for `{type_name}` failed: {message}")]
    StoreFetchFailed { type_name: String, message: String },
    #[error("malformed match: {message}")]
    MalformedMatch { message: String },
}

impl Error {
    /// Stable short code used in JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnsupportedFilterValue { .. } => "unsupported_filter_value",
            Error::MissingRecord { .. } => "missing_record",
            Error::DaemonQueryFailed { .. } => "daemon_query_failed",
            Error::InvalidPagination { .. } => "invalid_pagination",
            Error::InvalidStarPattern { .. } => "invalid_star_pattern",
            Error::UnknownType { .. } => "unknown_type",
            Error::UnknownFingerprint { .. } => "unknown_fingerprint",
            Error::MissingStore { .. } => "missing_store",
            Error::StoreFetchFailed { .. } => "store_fetch_failed",
            Error::MalformedMatch { .. } => "malformed_match",
        }
    }

    pub(crate) fn unsupported(attribute: &str, message: impl Into<String>) -> Self {
        Error::UnsupportedFilterValue {
            attribute: attribute.to_string(),
            message: message.into(),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidStarPattern {
            message: err.to_string(),
        }
    }
}
