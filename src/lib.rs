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

//! Query side of a full-text search daemon integration: builds daemon
//! requests from high-level options and turns the daemon's matches back into
//! stored records, lazily and in daemon order.

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod filter;
pub mod merge;
pub mod model;
pub mod options;
pub mod query_text;
pub mod registry;
pub mod request;
pub mod searcher;

pub use client::AttrValue;
pub use client::DaemonClient;
pub use client::MatchRecord;
pub use client::ObjectStore;
pub use client::QueryResponse;
pub use client::Record;
pub use collection::Paginated;
pub use collection::ResultSequence;
pub use collection::SearchResults;
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use filter::FilterValue;
pub use options::SearchOptions;
pub use query_text::Star;
pub use registry::TypeMeta;
pub use registry::TypeRegistry;
pub use searcher::Facet;
pub use searcher::FacetValue;
pub use searcher::MatchIds;
pub use searcher::Searcher;
