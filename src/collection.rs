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

//! Lazy search results. Nothing touches the daemon until data is read; the
//! first read runs the whole pipeline once and the outcome, success or
//! failure, is kept for the life of the collection.

use std::cell::OnceCell;

use crate::client::AttrValue;
use crate::client::MatchRecord;
use crate::client::Record;
use crate::error::Result;
use crate::options::SearchOptions;
use crate::request::Pagination;
use crate::searcher::Searcher;

pub const GROUPBY_ATTRIBUTE: &str = "@groupby";
pub const COUNT_ATTRIBUTE: &str = "@count";
pub const GEODIST_ATTRIBUTE: &str = "@geodist";

/// Ordered access to loaded records. Every accessor executes on first use.
pub trait ResultSequence {
    type Item;

    fn as_slice(&self) -> Result<&[Self::Item]>;

    fn get(&self, index: usize) -> Result<Option<&Self::Item>> {
        Ok(self.as_slice()?.get(index))
    }

    fn len(&self) -> Result<usize> {
        Ok(self.as_slice()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.as_slice()?.is_empty())
    }

    fn iter(&self) -> Result<std::slice::Iter<'_, Self::Item>> {
        Ok(self.as_slice()?.iter())
    }

    fn first(&self) -> Result<Option<&Self::Item>> {
        self.get(0)
    }
}

/// Page metadata. Only the methods returning `Result` need the daemon.
pub trait Paginated {
    fn current_page(&self) -> usize;

    fn per_page(&self) -> usize;

    fn offset(&self) -> usize;

    fn total_entries(&self) -> Result<u64>;

    fn total_pages(&self) -> Result<u64> {
        let total = self.total_entries()?;
        let per_page = self.per_page() as u64;
        if per_page == 0 {
            return Ok(0);
        }
        Ok(total.div_ceil(per_page))
    }

    fn next_page(&self) -> Result<Option<usize>> {
        let current = self.current_page();
        Ok(((current as u64) < self.total_pages()?).then(|| current + 1))
    }

    fn previous_page(&self) -> Option<usize> {
        let current = self.current_page();
        (current > 1).then(|| current - 1)
    }
}

#[derive(Debug)]
struct Outcome<T> {
    records: Vec<T>,
    matches: Vec<MatchRecord>,
    total_found: u64,
}

pub struct SearchResults<'s, T> {
    searcher: &'s Searcher<T>,
    options: SearchOptions,
    pagination: Pagination,
    outcome: OnceCell<Result<Outcome<T>>>,
}

impl<'s, T> SearchResults<'s, T>
where
    T: Record + Clone,
{
    pub(crate) fn new(searcher: &'s Searcher<T>, options: SearchOptions) -> Self {
        let pagination = Pagination::resolve(&options, searcher.config());
        Self {
            searcher,
            options,
            pagination,
            outcome: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn is_executed(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// Raw daemon matches, aligned by position with the records.
    pub fn matches(&self) -> Result<&[MatchRecord]> {
        Ok(&self.outcome()?.matches)
    }

    pub fn iter_with_weight(&self) -> Result<impl Iterator<Item = (&T, Option<i64>)>> {
        Ok(self.paired()?.map(|(record, m)| (record, m.weight)))
    }

    pub fn iter_with_groupby(&self) -> Result<impl Iterator<Item = (&T, Option<&AttrValue>)>> {
        Ok(self
            .paired()?
            .map(|(record, m)| (record, m.attribute(GROUPBY_ATTRIBUTE))))
    }

    pub fn iter_with_count(&self) -> Result<impl Iterator<Item = (&T, Option<i64>)>> {
        Ok(self.paired()?.map(|(record, m)| {
            let count = m.attribute(COUNT_ATTRIBUTE).and_then(AttrValue::as_i64);
            (record, count)
        }))
    }

    pub fn iter_with_groupby_and_count(
        &self,
    ) -> Result<impl Iterator<Item = (&T, Option<&AttrValue>, Option<i64>)>> {
        Ok(self.paired()?.map(|(record, m)| {
            let count = m.attribute(COUNT_ATTRIBUTE).and_then(AttrValue::as_i64);
            (record, m.attribute(GROUPBY_ATTRIBUTE), count)
        }))
    }

    pub fn iter_with_geodist(&self) -> Result<impl Iterator<Item = (&T, Option<f64>)>> {
        Ok(self.paired()?.map(|(record, m)| {
            let distance = m.attribute(GEODIST_ATTRIBUTE).and_then(AttrValue::as_f64);
            (record, distance)
        }))
    }

    fn paired(&self) -> Result<impl Iterator<Item = (&T, &MatchRecord)>> {
        let outcome = self.outcome()?;
        Ok(outcome.records.iter().zip(outcome.matches.iter()))
    }

    fn outcome(&self) -> Result<&Outcome<T>> {
        self.outcome
            .get_or_init(|| self.execute())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn execute(&self) -> Result<Outcome<T>> {
        let result = self.run();
        if let Err(err) = &result {
            tracing::warn!(code = err.code(), error = %err, "search failed");
        }
        result
    }

    fn run(&self) -> Result<Outcome<T>> {
        let request = self.searcher.build_request(&self.options)?;
        let response = self.searcher.query(&request)?;
        let records = self.searcher.merger().merge(&response.matches)?;
        Ok(Outcome {
            records,
            matches: response.matches,
            total_found: response.total_found,
        })
    }
}

impl<T> ResultSequence for SearchResults<'_, T>
where
    T: Record + Clone,
{
    type Item = T;

    fn as_slice(&self) -> Result<&[T]> {
        Ok(&self.outcome()?.records)
    }
}

impl<T> Paginated for SearchResults<'_, T>
where
    T: Record + Clone,
{
    fn current_page(&self) -> usize {
        self.pagination.page
    }

    fn per_page(&self) -> usize {
        self.pagination.per_page
    }

    fn offset(&self) -> usize {
        self.pagination.offset
    }

    fn total_entries(&self) -> Result<u64> {
        Ok(self.outcome()?.total_found)
    }
}
